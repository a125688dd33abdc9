//! Items repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::ItemsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        item::{Item, NewItem, UpdateItem},
        Pagination,
    },
};

const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// `%text%` pattern with LIKE wildcards in the user's text escaped
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ItemsStore for ItemsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    async fn list_by_owner(&self, owner_id: i64, page: Pagination) -> AppResult<Vec<Item>> {
        let query = format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY id{}",
            ITEM_COLUMNS,
            page.to_sql()
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn search(&self, text: &str, page: Pagination) -> AppResult<Vec<Item>> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE available = TRUE
              AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY id{}
            "#,
            ITEM_COLUMNS,
            page.to_sql()
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(like_pattern(text))
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE request_id = ANY($1) ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let row = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .bind(item.owner_id)
        .bind(item.request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &UpdateItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                available = COALESCE($3, available)
            WHERE id = $4
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("drill"), "%drill%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
