//! Database repository for reservations.

use crate::api::models::reservations::DateRange;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::reservations::{
        ReservationCreateDBRequest, ReservationDBResponse, ReservationUpdateDBRequest,
    },
};
use crate::types::{CatwayNumber, ReservationId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

const RESERVATION_COLUMNS: &str =
    "id, catway_number, client_name, boat_name, start_date, end_date, created_at, updated_at";

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List the reservations booked against one catway.
    #[instrument(skip(self), err)]
    pub async fn list_for_catway(
        &mut self,
        catway_number: CatwayNumber,
    ) -> Result<Vec<ReservationDBResponse>> {
        let reservations = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE catway_number = $1 ORDER BY start_date"
        ))
        .bind(catway_number)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    /// Whether `range` overlaps any reservation on the given catway.
    ///
    /// Bounds are inclusive on both sides, so touching endpoints conflict.
    /// When re-validating an update, `exclude` removes the reservation's own
    /// row by id, never by value.
    #[instrument(skip(self), err)]
    pub async fn has_conflict(
        &mut self,
        catway_number: CatwayNumber,
        range: &DateRange,
        exclude: Option<ReservationId>,
    ) -> Result<bool> {
        let conflict: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE catway_number = $1
                  AND start_date <= $3
                  AND end_date >= $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(catway_number)
        .bind(range.start)
        .bind(range.end)
        .bind(exclude)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(conflict)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Reservations<'c> {
    type CreateRequest = ReservationCreateDBRequest;
    type UpdateRequest = ReservationUpdateDBRequest;
    type Response = ReservationDBResponse;
    type Id = ReservationId;

    #[instrument(skip(self, request), fields(catway_number = request.catway_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let reservation_id = Uuid::new_v4();

        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            r#"
            INSERT INTO reservations (id, catway_number, client_name, boat_name, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(reservation_id)
        .bind(request.catway_number)
        .bind(&request.client_name)
        .bind(&request.boat_name)
        .bind(request.start_date)
        .bind(request.end_date)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let reservations = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY start_date"
        ))
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(&format!(
            r#"
            UPDATE reservations
            SET client_name = COALESCE($2, client_name),
                boat_name = COALESCE($3, boat_name),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = now()
            WHERE id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.client_name)
        .bind(&request.boat_name)
        .bind(request.start_date)
        .bind(request.end_date)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }
}
