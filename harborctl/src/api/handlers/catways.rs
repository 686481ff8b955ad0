//! Berth (catway) management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::PgConnection;

use crate::{
    AppState,
    api::extract::Json,
    api::models::catways::{CatwayCreate, CatwayResponse, CatwayStateUpdate, CatwayType},
    config::HarborConfig,
    db::{
        errors::DbError,
        handlers::{catways::Catways, repository::Repository},
        models::catways::{CatwayCreateDBRequest, CatwayDBResponse, CatwayUpdateDBRequest},
    },
    errors::Error,
    types::CatwayNumber,
};

fn validate_number(number: CatwayNumber, harbor: &HarborConfig) -> Result<(), Error> {
    if number < 1 || number > harbor.capacity {
        return Err(Error::BadRequest {
            message: format!("catway number must be between 1 and {}", harbor.capacity),
        });
    }
    Ok(())
}

/// Return the berth, provisioning it when it does not exist yet.
///
/// Auto-provisioned berths get a type derived from their number and the
/// configured placeholder state. Numbers outside harbor capacity are rejected.
pub(crate) async fn ensure_exists(
    conn: &mut PgConnection,
    number: CatwayNumber,
    harbor: &HarborConfig,
) -> Result<CatwayDBResponse, Error> {
    validate_number(number, harbor)?;

    let mut repo = Catways::new(conn);
    if let Some(catway) = repo.get_by_id(number).await? {
        return Ok(catway);
    }

    let request = CatwayCreateDBRequest {
        number,
        catway_type: CatwayType::for_number(number, harbor.long_type_threshold),
        state: harbor.default_state.clone(),
    };

    match repo.create(&request).await {
        Ok(catway) => Ok(catway),
        // Lost a provisioning race; the row exists now
        Err(DbError::UniqueViolation { .. }) => repo.get_by_id(number).await?.ok_or(Error::Internal {
            operation: "re-fetch catway after provisioning race".to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// List all catways
#[utoipa::path(
    get,
    path = "/catways",
    tag = "catways",
    responses(
        (status = 200, description = "All catways", body = Vec<CatwayResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_catways(State(state): State<AppState>) -> Result<Json<Vec<CatwayResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let catways = Catways::new(&mut conn).list().await?;

    Ok(Json(catways.into_iter().map(CatwayResponse::from).collect()))
}

/// Get a catway by number
#[utoipa::path(
    get,
    path = "/catways/{number}",
    tag = "catways",
    params(("number" = i32, Path, description = "Catway number")),
    responses(
        (status = 200, description = "The catway", body = CatwayResponse),
        (status = 404, description = "No such catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn get_catway(State(state): State<AppState>, Path(number): Path<CatwayNumber>) -> Result<Json<CatwayResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let catway = Catways::new(&mut conn)
        .get_by_id(number)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "catway".to_string(),
            id: number.to_string(),
        })?;

    Ok(Json(CatwayResponse::from(catway)))
}

/// Create a catway explicitly
#[utoipa::path(
    post,
    path = "/catways",
    request_body = CatwayCreate,
    tag = "catways",
    responses(
        (status = 201, description = "Catway created", body = CatwayResponse),
        (status = 400, description = "Invalid number or state"),
        (status = 409, description = "Catway number already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_catway(
    State(state): State<AppState>,
    Json(request): Json<CatwayCreate>,
) -> Result<(StatusCode, Json<CatwayResponse>), Error> {
    validate_number(request.number, &state.config.harbor)?;
    if request.state.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "state must not be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let catway = Catways::new(&mut conn).create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(CatwayResponse::from(catway))))
}

/// Update a catway's state. Number and type are immutable.
#[utoipa::path(
    put,
    path = "/catways/{number}",
    request_body = CatwayStateUpdate,
    tag = "catways",
    params(("number" = i32, Path, description = "Catway number")),
    responses(
        (status = 200, description = "Updated catway", body = CatwayResponse),
        (status = 400, description = "Empty state"),
        (status = 404, description = "No such catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn update_catway(
    State(state): State<AppState>,
    Path(number): Path<CatwayNumber>,
    Json(request): Json<CatwayStateUpdate>,
) -> Result<Json<CatwayResponse>, Error> {
    if request.state.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "state must not be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let catway = Catways::new(&mut conn)
        .update(number, &CatwayUpdateDBRequest { state: request.state })
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::NotFound {
                resource: "catway".to_string(),
                id: number.to_string(),
            },
            other => other.into(),
        })?;

    Ok(Json(CatwayResponse::from(catway)))
}

/// Delete a catway. Its reservations are left in place but become
/// unreachable through the catway-scoped routes.
#[utoipa::path(
    delete,
    path = "/catways/{number}",
    tag = "catways",
    params(("number" = i32, Path, description = "Catway number")),
    responses(
        (status = 200, description = "Catway deleted"),
        (status = 404, description = "No such catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn delete_catway(State(state): State<AppState>, Path(number): Path<CatwayNumber>) -> Result<Json<serde_json::Value>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = Catways::new(&mut conn).delete(number).await?;

    if !deleted {
        return Err(Error::NotFound {
            resource: "catway".to_string(),
            id: number.to_string(),
        });
    }

    Ok(Json(serde_json::json!({ "message": "catway deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarborConfig;

    #[test]
    fn test_number_outside_capacity_rejected() {
        let harbor = HarborConfig::default();

        // Default capacity is 24
        assert!(validate_number(25, &harbor).is_err());
        assert!(validate_number(0, &harbor).is_err());
        assert!(validate_number(-3, &harbor).is_err());
        assert!(validate_number(1, &harbor).is_ok());
        assert!(validate_number(24, &harbor).is_ok());
    }
}
