//! Item requests repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::RequestsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{ItemRequest, NewItemRequest},
        Pagination,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestsStore for RequestsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest> {
        sqlx::query_as::<_, ItemRequest>(
            "SELECT id, description, requester_id, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    async fn create(&self, request: &NewItemRequest) -> AppResult<ItemRequest> {
        let row = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO requests (description, requester_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requester_id, created
            "#,
        )
        .bind(&request.description)
        .bind(request.requester_id)
        .bind(request.created)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let rows = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requester_id, created FROM requests
            WHERE requester_id = $1
            ORDER BY created DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_others(&self, requester_id: i64, page: Pagination) -> AppResult<Vec<ItemRequest>> {
        let query = format!(
            r#"
            SELECT id, description, requester_id, created FROM requests
            WHERE requester_id != $1
            ORDER BY created DESC{}
            "#,
            page.to_sql()
        );
        let rows = sqlx::query_as::<_, ItemRequest>(&query)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
