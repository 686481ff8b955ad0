//! Database repository for catways.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::catways::{CatwayCreateDBRequest, CatwayDBResponse, CatwayUpdateDBRequest},
};
use crate::types::CatwayNumber;
use sqlx::PgConnection;
use tracing::instrument;

const CATWAY_COLUMNS: &str = "number, catway_type, state, created_at, updated_at";

pub struct Catways<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Catways<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Catways<'c> {
    type CreateRequest = CatwayCreateDBRequest;
    type UpdateRequest = CatwayUpdateDBRequest;
    type Response = CatwayDBResponse;
    type Id = CatwayNumber;

    #[instrument(skip(self, request), fields(number = request.number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let catway = sqlx::query_as::<_, CatwayDBResponse>(&format!(
            r#"
            INSERT INTO catways (number, catway_type, state)
            VALUES ($1, $2, $3)
            RETURNING {CATWAY_COLUMNS}
            "#
        ))
        .bind(request.number)
        .bind(request.catway_type)
        .bind(&request.state)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(catway)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let catway = sqlx::query_as::<_, CatwayDBResponse>(&format!(
            "SELECT {CATWAY_COLUMNS} FROM catways WHERE number = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(catway)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let catways = sqlx::query_as::<_, CatwayDBResponse>(&format!(
            "SELECT {CATWAY_COLUMNS} FROM catways ORDER BY number"
        ))
        .fetch_all(&mut *self.db)
        .await?;

        Ok(catways)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM catways WHERE number = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let catway = sqlx::query_as::<_, CatwayDBResponse>(&format!(
            r#"
            UPDATE catways
            SET state = $2, updated_at = now()
            WHERE number = $1
            RETURNING {CATWAY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.state)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(catway)
    }
}
