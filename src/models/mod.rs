//! Data models for ShareIt

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::ValidationError;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingDto, BookingShort, BookingState, BookingStatus};
pub use comment::{CommentDetails, CommentDto};
pub use item::{Item, ItemDto};
pub use request::{ItemRequest, ItemRequestDto, ItemResponseDto};
pub use user::User;

/// Current wall clock as a zone-less UTC timestamp, the representation used on the wire and in the database
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// `from`/`size` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Index of the first element (default: 0)
    pub from: Option<i64>,
    /// Page size (default: unbounded)
    pub size: Option<i64>,
}

/// Validated offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: Option<i64>,
}

impl Pagination {
    pub const ALL: Pagination = Pagination { offset: 0, limit: None };

    /// Offset window: skip `from` rows, return at most `size`
    pub fn offset(query: PageQuery) -> AppResult<Self> {
        let from = query.from.unwrap_or(0);
        if from < 0 {
            return Err(AppError::Validation("Parameter 'from' must not be negative".to_string()));
        }
        if let Some(size) = query.size {
            if size <= 0 {
                return Err(AppError::Validation("Parameter 'size' must be positive".to_string()));
            }
        }
        Ok(Self { offset: from, limit: query.size })
    }

    /// Page window: the page containing row `from`, `size` rows per page
    pub fn page(from: i64, size: i64) -> AppResult<Self> {
        if from < 0 || size <= 0 {
            return Err(AppError::Validation("Invalid pagination parameters".to_string()));
        }
        Ok(Self {
            offset: (from / size) * size,
            limit: Some(size),
        })
    }

    /// SQL `LIMIT`/`OFFSET` suffix; both values are validated integers
    pub fn to_sql(&self) -> String {
        match self.limit {
            Some(limit) => format!(" LIMIT {} OFFSET {}", limit, self.offset),
            None => format!(" OFFSET {}", self.offset),
        }
    }
}
