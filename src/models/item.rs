//! Item model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{booking::BookingShort, comment::CommentDto, not_blank};
use crate::error::AppResult;

/// Item row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

impl Item {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

/// Item as returned by the API.
///
/// `last_booking`/`next_booking` are only filled in for the owner; `comments`
/// are filled in for everybody on the item endpoints and left empty when the
/// item is nested in a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            last_booking: None,
            next_booking: None,
            comments: Vec::new(),
        }
    }
}

impl ItemDto {
    pub fn with_bookings(mut self, last: Option<BookingShort>, next: Option<BookingShort>) -> Self {
        self.last_booking = last;
        self.next_booking = next;
        self
    }

    pub fn with_comments(mut self, comments: Vec<CommentDto>) -> Self {
        self.comments = comments;
        self
    }
}

/// Create item request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(
        required(message = "Name is required"),
        custom(function = "not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Description is required"),
        custom(function = "not_blank", message = "Description must not be blank")
    )]
    pub description: Option<String>,
    #[validate(required(message = "Availability must be specified"))]
    pub available: Option<bool>,
    /// Request this item answers, if any
    pub request_id: Option<i64>,
}

/// Update item request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    #[validate(custom(function = "not_blank", message = "Name must not be blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "Description must not be blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Validated item ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

impl NewItem {
    pub fn new(owner_id: i64, data: CreateItem) -> AppResult<Self> {
        data.validate()?;
        Ok(Self {
            name: data.name.unwrap_or_default(),
            description: data.description.unwrap_or_default(),
            available: data.available.unwrap_or_default(),
            owner_id,
            request_id: data.request_id,
        })
    }
}

/// Query string of `GET /items/search`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}
