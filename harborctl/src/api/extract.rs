//! Request-body extraction in the service's error shape.

use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::Error;

/// JSON body extractor and response wrapper.
///
/// Delegates to [`axum::Json`], but turns extraction failures (malformed
/// JSON, missing or mistyped fields) into [`Error::BadRequest`], so clients
/// get the uniform 400 `{"message": ...}` shape instead of axum's
/// plain-text 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(Error::BadRequest {
                message: rejection.body_text(),
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::create_test_app;

    #[test_log::test(tokio::test)]
    async fn test_missing_body_fields_are_bad_request() {
        let server = create_test_app();

        let response = server.post("/auth/login").json(&json!({})).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_json_is_bad_request() {
        let server = create_test_app();

        let response = server
            .post("/auth/login")
            .text("{not json")
            .content_type("application/json")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }
}
