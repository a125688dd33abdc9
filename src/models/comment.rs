//! Item comments

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;
use crate::error::AppResult;

/// Comment joined with its author's name
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentDetails {
    pub id: i64,
    pub item_id: i64,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}

/// Comment as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    #[schema(value_type = String)]
    pub created: NaiveDateTime,
}

impl From<CommentDetails> for CommentDto {
    fn from(comment: CommentDetails) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author_name: comment.author_name,
            created: comment.created,
        }
    }
}

/// Create comment request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(
        required(message = "Comment text is required"),
        custom(function = "not_blank", message = "Comment text must not be blank")
    )]
    pub text: Option<String>,
}

/// Validated comment ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub item_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: NaiveDateTime,
}

impl NewComment {
    pub fn new(item_id: i64, author_id: i64, data: CreateComment, created: NaiveDateTime) -> AppResult<Self> {
        data.validate()?;
        Ok(Self {
            item_id,
            author_id,
            text: data.text.unwrap_or_default(),
            created,
        })
    }
}
