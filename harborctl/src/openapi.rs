//! OpenAPI documentation, served by Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api::models::{
    auth::{LoginRequest, LoginResponse, LogoutResponse, UserSummary},
    catways::{CatwayCreate, CatwayResponse, CatwayStateUpdate, CatwayType},
    reservations::{ReservationCreate, ReservationResponse, ReservationUpdate},
    users::{CurrentUser, UserCreate, UserResponse, UserUpdate},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "harborctl",
        description = "Harbor management API: catways, reservations, and staff users."
    ),
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::create_user,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::catways::list_catways,
        crate::api::handlers::catways::get_catway,
        crate::api::handlers::catways::create_catway,
        crate::api::handlers::catways::update_catway,
        crate::api::handlers::catways::delete_catway,
        crate::api::handlers::reservations::list_all_reservations,
        crate::api::handlers::reservations::list_reservations,
        crate::api::handlers::reservations::get_reservation,
        crate::api::handlers::reservations::create_reservation,
        crate::api::handlers::reservations::update_reservation,
        crate::api::handlers::reservations::delete_reservation,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        LogoutResponse,
        UserSummary,
        CurrentUser,
        UserCreate,
        UserUpdate,
        UserResponse,
        CatwayType,
        CatwayCreate,
        CatwayStateUpdate,
        CatwayResponse,
        ReservationCreate,
        ReservationUpdate,
        ReservationResponse,
    )),
    tags(
        (name = "authentication", description = "Login and logout"),
        (name = "users", description = "Staff user management"),
        (name = "catways", description = "Berth management"),
        (name = "reservations", description = "Reservation lifecycle"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_builds() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().expect("spec should serialize");
        assert!(json.contains("/catways/{number}/reservations"));
        assert!(json.contains("/auth/login"));
    }
}
