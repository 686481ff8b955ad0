//! Shared helpers for tests.

use axum_test::TestServer;
use sqlx::PgPool;

use crate::{AppState, Config, build_router};

/// A config with a signing secret and cheap argon2 parameters so tests run fast.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.secret_key = Some("test-secret-key".to_string());
    config.auth.password.argon2_memory_kib = 8;
    config.auth.password.argon2_iterations = 1;
    config
}

/// A test server over the full router.
///
/// The pool is lazy: no connection is opened until a handler actually hits
/// the database, so guard-level tests need no PostgreSQL at all.
pub fn create_test_app() -> TestServer {
    let config = create_test_config();
    let pool = PgPool::connect_lazy(&config.database_url).expect("lazy pool construction should not fail");
    let state = AppState::builder().db(pool).config(config).build();
    let router = build_router(state).expect("router should build");

    TestServer::new(router).expect("Failed to create test server")
}
