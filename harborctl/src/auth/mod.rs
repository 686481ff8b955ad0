//! Authentication and authorization system.
//!
//! Authentication is stateless bearer-token auth:
//! - Staff log in via `POST /auth/login` with email/password
//! - The server returns a signed JWT with a configurable expiry (default 1h)
//! - The token is presented as `Authorization: Bearer <token>` on every
//!   protected request and verified without a database lookup
//!
//! There is no role or permission distinction: any valid token grants access
//! to every gated operation, and tokens cannot be revoked before expiry.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`middleware`]: Route protection middleware
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod session;
