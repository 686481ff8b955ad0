//! Staff user management handlers. Users are addressed by email.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::extract::Json,
    api::models::users::{UserCreate, UserResponse, UserUpdate},
    auth::password::{self, Argon2Params},
    config::PasswordConfig,
    db::{
        handlers::{repository::Repository, users::Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
};

fn validate_password(password: &str, config: &PasswordConfig) -> Result<(), Error> {
    if password.len() < config.min_length {
        return Err(Error::BadRequest {
            message: format!("password must be at least {} characters", config.min_length),
        });
    }
    if password.len() > config.max_length {
        return Err(Error::BadRequest {
            message: format!("password must be no more than {} characters", config.max_length),
        });
    }
    Ok(())
}

/// Hash a password on a blocking thread with the configured argon2 cost.
async fn hash_password(password: String, config: &PasswordConfig) -> Result<String, Error> {
    let params = Argon2Params::from(config);
    tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/users/{email}",
    tag = "users",
    params(("email" = String, Path, description = "User email address")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "No such user"),
    )
)]
#[tracing::instrument(skip_all, fields(email = %email))]
pub async fn get_user(State(state): State<AppState>, Path(email): Path<String>) -> Result<Json<UserResponse>, Error> {
    let email = email.to_lowercase();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "user".to_string(),
            id: email.clone(),
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreate,
    tag = "users",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let email = request.email.trim().to_lowercase();
    if request.username.trim().is_empty() || email.is_empty() {
        return Err(Error::BadRequest {
            message: "username and email are required".to_string(),
        });
    }
    validate_password(&request.password, &state.config.auth.password)?;

    let password_hash = hash_password(request.password, &state.config.auth.password).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: request.username,
            email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Update a user's username and/or password
#[utoipa::path(
    put,
    path = "/users/{email}",
    request_body = UserUpdate,
    tag = "users",
    params(("email" = String, Path, description = "User email address")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "No such user"),
    )
)]
#[tracing::instrument(skip_all, fields(email = %email))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    let email = email.to_lowercase();

    if let Some(username) = &request.username
        && username.trim().is_empty()
    {
        return Err(Error::BadRequest {
            message: "username must not be empty".to_string(),
        });
    }

    let password_hash = match request.password {
        Some(password) => {
            validate_password(&password, &state.config.auth.password)?;
            Some(hash_password(password, &state.config.auth.password).await?)
        }
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);
    let user = repo.get_by_email(&email).await?.ok_or_else(|| Error::NotFound {
        resource: "user".to_string(),
        id: email.clone(),
    })?;

    let updated = repo
        .update(
            user.id,
            &UserUpdateDBRequest {
                username: request.username,
                password_hash,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user by email
#[utoipa::path(
    delete,
    path = "/users/{email}",
    tag = "users",
    params(("email" = String, Path, description = "User email address")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user"),
    )
)]
#[tracing::instrument(skip_all, fields(email = %email))]
pub async fn delete_user(State(state): State<AppState>, Path(email): Path<String>) -> Result<Json<serde_json::Value>, Error> {
    let email = email.to_lowercase();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = Users::new(&mut conn).delete_by_email(&email).await?;

    if !deleted {
        return Err(Error::NotFound {
            resource: "user".to_string(),
            id: email,
        });
    }

    Ok(Json(serde_json::json!({ "message": "user deleted" })))
}
