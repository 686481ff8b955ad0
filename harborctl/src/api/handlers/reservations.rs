//! Reservation lifecycle handlers, scoped under their catway.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::Connection;

use crate::{
    AppState,
    api::extract::Json,
    api::handlers::catways::ensure_exists,
    api::models::reservations::{DateRange, ReservationCreate, ReservationResponse, ReservationUpdate},
    db::{
        handlers::{catways::Catways, repository::Repository, reservations::Reservations},
        models::reservations::{ReservationCreateDBRequest, ReservationDBResponse, ReservationUpdateDBRequest},
    },
    errors::Error,
    types::{CatwayNumber, ReservationId},
};

fn reservation_not_found(id: ReservationId) -> Error {
    Error::NotFound {
        resource: "reservation".to_string(),
        id: id.to_string(),
    }
}

fn conflict() -> Error {
    Error::Conflict {
        message: "The catway is already reserved for part of this period".to_string(),
    }
}

/// Check a fetched reservation belongs to the catway in the URL.
/// A mismatched scope is reported as absence, not as forbidden.
fn check_scope(
    reservation: Option<ReservationDBResponse>,
    catway_number: CatwayNumber,
    id: ReservationId,
) -> Result<ReservationDBResponse, Error> {
    let reservation = reservation.ok_or_else(|| reservation_not_found(id))?;
    if reservation.catway_number != catway_number {
        return Err(reservation_not_found(id));
    }
    Ok(reservation)
}

async fn get_scoped(
    repo: &mut Reservations<'_>,
    catway_number: CatwayNumber,
    id: ReservationId,
) -> Result<ReservationDBResponse, Error> {
    check_scope(repo.get_by_id(id).await?, catway_number, id)
}

/// List all reservations across catways
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    responses(
        (status = 200, description = "All reservations", body = Vec<ReservationResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_all_reservations(State(state): State<AppState>) -> Result<Json<Vec<ReservationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let reservations = Reservations::new(&mut conn).list().await?;

    Ok(Json(reservations.into_iter().map(ReservationResponse::from).collect()))
}

/// List the reservations on one catway
#[utoipa::path(
    get,
    path = "/catways/{number}/reservations",
    tag = "reservations",
    params(("number" = i32, Path, description = "Catway number")),
    responses(
        (status = 200, description = "Reservations on the catway", body = Vec<ReservationResponse>),
        (status = 404, description = "No such catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn list_reservations(
    State(state): State<AppState>,
    Path(number): Path<CatwayNumber>,
) -> Result<Json<Vec<ReservationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Catways::new(&mut conn)
        .get_by_id(number)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "catway".to_string(),
            id: number.to_string(),
        })?;

    let reservations = Reservations::new(&mut conn).list_for_catway(number).await?;

    Ok(Json(reservations.into_iter().map(ReservationResponse::from).collect()))
}

/// Get one reservation on a catway
#[utoipa::path(
    get,
    path = "/catways/{number}/reservations/{id}",
    tag = "reservations",
    params(
        ("number" = i32, Path, description = "Catway number"),
        ("id" = uuid::Uuid, Path, description = "Reservation id"),
    ),
    responses(
        (status = 200, description = "The reservation", body = ReservationResponse),
        (status = 404, description = "Absent, or booked on a different catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path((number, id)): Path<(CatwayNumber, ReservationId)>,
) -> Result<Json<ReservationResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut conn);
    let reservation = get_scoped(&mut repo, number, id).await?;

    Ok(Json(ReservationResponse::from(reservation)))
}

/// Book a catway
#[utoipa::path(
    post,
    path = "/catways/{number}/reservations",
    request_body = ReservationCreate,
    tag = "reservations",
    params(("number" = i32, Path, description = "Catway number")),
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Invalid fields or dates"),
        (status = 409, description = "Dates overlap an existing reservation"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn create_reservation(
    State(state): State<AppState>,
    Path(number): Path<CatwayNumber>,
    Json(request): Json<ReservationCreate>,
) -> Result<(StatusCode, Json<ReservationResponse>), Error> {
    if request.client_name.trim().is_empty() || request.boat_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "client_name and boat_name are required".to_string(),
        });
    }

    let range = DateRange {
        start: request.start_date,
        end: request.end_date,
    };
    if !range.is_valid() {
        return Err(Error::BadRequest {
            message: "start_date must be before end_date".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Provision before the booking transaction begins: a booking rejected for
    // a conflict must not undo the berth it brought into existence.
    ensure_exists(&mut conn, number, &state.config.harbor).await?;

    let mut tx = Connection::begin(&mut *conn).await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut tx);
    if repo.has_conflict(number, &range, None).await? {
        return Err(conflict());
    }

    // The EXCLUDE constraint backstops a racing writer between the check and
    // this insert; a loser gets an ExclusionViolation mapped to 409.
    let reservation = repo
        .create(&ReservationCreateDBRequest {
            catway_number: number,
            client_name: request.client_name,
            boat_name: request.boat_name,
            start_date: request.start_date,
            end_date: request.end_date,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(ReservationResponse::from(reservation))))
}

/// Update a reservation. Unset fields keep their stored values.
#[utoipa::path(
    put,
    path = "/catways/{number}/reservations/{id}",
    request_body = ReservationUpdate,
    tag = "reservations",
    params(
        ("number" = i32, Path, description = "Catway number"),
        ("id" = uuid::Uuid, Path, description = "Reservation id"),
    ),
    responses(
        (status = 200, description = "Updated reservation", body = ReservationResponse),
        (status = 400, description = "Invalid fields or merged dates"),
        (status = 404, description = "Absent, or booked on a different catway"),
        (status = 409, description = "Dates overlap another reservation"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn update_reservation(
    State(state): State<AppState>,
    Path((number, id)): Path<(CatwayNumber, ReservationId)>,
    Json(request): Json<ReservationUpdate>,
) -> Result<Json<ReservationResponse>, Error> {
    if let Some(client_name) = &request.client_name
        && client_name.trim().is_empty()
    {
        return Err(Error::BadRequest {
            message: "client_name must not be empty".to_string(),
        });
    }
    if let Some(boat_name) = &request.boat_name
        && boat_name.trim().is_empty()
    {
        return Err(Error::BadRequest {
            message: "boat_name must not be empty".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut tx);

    let stored = get_scoped(&mut repo, number, id).await?;

    // Merge requested dates over the stored ones and re-validate the pair
    let merged = request.merged_range(&DateRange {
        start: stored.start_date,
        end: stored.end_date,
    });
    if !merged.is_valid() {
        return Err(Error::BadRequest {
            message: "start_date must be before end_date".to_string(),
        });
    }

    // Re-check availability excluding this reservation by id, so an
    // unchanged booking never conflicts with itself
    if repo.has_conflict(number, &merged, Some(id)).await? {
        return Err(conflict());
    }

    let updated = repo
        .update(
            id,
            &ReservationUpdateDBRequest {
                client_name: request.client_name,
                boat_name: request.boat_name,
                start_date: request.start_date,
                end_date: request.end_date,
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ReservationResponse::from(updated)))
}

/// Cancel a reservation
#[utoipa::path(
    delete,
    path = "/catways/{number}/reservations/{id}",
    tag = "reservations",
    params(
        ("number" = i32, Path, description = "Catway number"),
        ("id" = uuid::Uuid, Path, description = "Reservation id"),
    ),
    responses(
        (status = 200, description = "Reservation deleted"),
        (status = 404, description = "Absent, or booked on a different catway"),
    )
)]
#[tracing::instrument(skip_all, fields(number = number))]
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path((number, id)): Path<(CatwayNumber, ReservationId)>,
) -> Result<Json<serde_json::Value>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut conn);

    get_scoped(&mut repo, number, id).await?;
    repo.delete(id).await?;

    Ok(Json(serde_json::json!({ "message": "reservation deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn stored_reservation(id: ReservationId, catway_number: CatwayNumber) -> ReservationDBResponse {
        ReservationDBResponse {
            id,
            catway_number,
            client_name: "A. Mariner".to_string(),
            boat_name: "Petrel".to_string(),
            start_date: "2024-06-01".parse().unwrap(),
            end_date: "2024-06-05".parse().unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_absent_reservation_is_not_found() {
        // Deleting or fetching an id that was never booked reads as 404
        let id = Uuid::new_v4();
        let result = check_scope(None, 3, id);

        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_wrong_catway_reads_as_not_found() {
        // A real reservation reached through another berth's URL is reported
        // as absent, so ids don't leak across berths
        let id = Uuid::new_v4();
        let result = check_scope(Some(stored_reservation(id, 3)), 7, id);

        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_matching_catway_passes_through() {
        let id = Uuid::new_v4();
        let reservation = check_scope(Some(stored_reservation(id, 3)), 3, id).unwrap();

        assert_eq!(reservation.id, id);
        assert_eq!(reservation.catway_number, 3);
    }
}
