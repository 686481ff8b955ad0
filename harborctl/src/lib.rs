//! # harborctl: Harbor Management Service
//!
//! `harborctl` is a small control layer for a marina: it tracks berths
//! ("catways"), their bookings ("reservations"), and the staff users who
//! manage them, behind a token-gated REST API.
//!
//! ## Overview
//!
//! The substantive behavior lives in three places. The **availability check**
//! treats reservation date ranges as inclusive on both ends, so a booking that
//! ends on a given day still occupies the berth that day; on update a
//! reservation is excluded from the check by its id, never by value. The
//! **authentication layer** ([`auth`]) hashes passwords with argon2id and
//! issues self-contained JWT session tokens; every non-auth route sits behind
//! one uniform bearer-token guard. The **reservation lifecycle** provisions
//! berths lazily: booking a berth that was never created explicitly brings it
//! into existence, as long as its number is within harbor capacity.
//!
//! The **API layer** ([`api`]) follows RESTful conventions with users
//! addressed by email, catways by number, and reservations by id scoped under
//! their catway. The **database layer** ([`db`]) uses the repository pattern
//! over PostgreSQL; a `btree_gist` EXCLUDE constraint enforces the no-overlap
//! invariant at the storage layer, so racing writers cannot double-book.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use harborctl::{Application, config::{Args, Config}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     harborctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::{middleware::require_auth, password},
    db::handlers::{repository::Repository, users::Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
};
use axum::http::HeaderValue;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CatwayNumber, ReservationId, UserId};

/// Application state shared across all request handlers.
///
/// Read-only after startup: a PostgreSQL pool and the loaded configuration.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the harborctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial staff user if it doesn't exist.
///
/// Idempotent: creates the user on first startup, or refreshes its password
/// when one is configured. Returns the user id either way.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let email = email.trim().to_lowercase();

    let password_hash = match password {
        Some(pwd) => Some(password::hash_password(pwd).map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing) = user_repo.get_by_email(&email).await? {
        if let Some(password_hash) = password_hash {
            user_repo
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        username: None,
                        password_hash: Some(password_hash),
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    let password_hash = match password_hash {
        Some(hash) => hash,
        // No password configured: hash a random throwaway so the account
        // exists but cannot be logged into until a password is set.
        None => password::hash_password(&uuid::Uuid::new_v4().to_string())
            .map_err(|e| anyhow::anyhow!("hash placeholder password: {e}"))?,
    };

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: email.clone(),
            email,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial admin user {}", created.email);
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed_origins = &config.auth.security.cors.allowed_origins;

    // tower-http refuses a literal "*" inside AllowOrigin::list; the wildcard
    // must go through AllowOrigin::any instead.
    let mut cors = if allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let mut origins = Vec::new();
        for origin in allowed_origins {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        CorsLayer::new().allow_origin(origins)
    };

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// Login, logout, the health probe, and the API docs are open; every other
/// route sits behind the bearer-token guard, applied as a single route layer.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", get(api::handlers::auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        // Staff users, addressed by email
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{email}", get(api::handlers::users::get_user))
        .route("/users/{email}", put(api::handlers::users::update_user))
        .route("/users/{email}", delete(api::handlers::users::delete_user))
        // Catways
        .route("/catways", get(api::handlers::catways::list_catways))
        .route("/catways", post(api::handlers::catways::create_catway))
        .route("/catways/{number}", get(api::handlers::catways::get_catway))
        .route("/catways/{number}", put(api::handlers::catways::update_catway))
        .route("/catways/{number}", delete(api::handlers::catways::delete_catway))
        // Reservations, scoped under their catway
        .route(
            "/catways/{number}/reservations",
            get(api::handlers::reservations::list_reservations),
        )
        .route(
            "/catways/{number}/reservations",
            post(api::handlers::reservations::create_reservation),
        )
        .route(
            "/catways/{number}/reservations/{id}",
            get(api::handlers::reservations::get_reservation),
        )
        .route(
            "/catways/{number}/reservations/{id}",
            put(api::handlers::reservations::update_reservation),
        )
        .route(
            "/catways/{number}/reservations/{id}",
            delete(api::handlers::reservations::delete_reservation),
        )
        .route("/reservations", get(api::handlers::reservations::list_all_reservations))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to PostgreSQL, runs
///    migrations, and seeds the initial admin user.
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting harborctl with configuration: {:#?}", config);

        let pool = PgPool::connect(&config.database_url).await?;
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("harborctl listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
