//! Comments repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::CommentsStore;
use crate::{
    error::AppResult,
    models::comment::{CommentDetails, NewComment},
};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentsStore for CommentsRepository {
    async fn create(&self, comment: &NewComment) -> AppResult<CommentDetails> {
        let row = sqlx::query_as::<_, CommentDetails>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (text, item_id, author_id, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, item_id, text, author_id, created
            )
            SELECT c.id, c.item_id, c.text, u.name AS author_name, c.created
            FROM inserted c
            JOIN users u ON c.author_id = u.id
            "#,
        )
        .bind(&comment.text)
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(comment.created)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<CommentDetails>> {
        let rows = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.item_id, c.text, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = $1
            ORDER BY c.created
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>> {
        let rows = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.item_id, c.text, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = ANY($1)
            ORDER BY c.item_id, c.created
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
