//! Item requests: a user's ask for something nobody lists yet

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{item::Item, not_blank};
use crate::error::AppResult;

/// Request row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

/// Item listed in answer to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponseDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: i64,
    pub owner_id: i64,
}

/// Request as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestDto {
    pub id: i64,
    pub description: String,
    #[schema(value_type = String)]
    pub created: NaiveDateTime,
    pub items: Vec<ItemResponseDto>,
}

impl ItemRequestDto {
    pub fn new(request: ItemRequest, items: &[Item]) -> Self {
        Self {
            items: items
                .iter()
                .map(|item| ItemResponseDto {
                    id: item.id,
                    name: item.name.clone(),
                    description: item.description.clone(),
                    available: item.available,
                    request_id: request.id,
                    owner_id: item.owner_id,
                })
                .collect(),
            id: request.id,
            description: request.description,
            created: request.created,
        }
    }

    /// Attach items to their requests, keeping the request order
    pub fn group(requests: Vec<ItemRequest>, items: Vec<Item>) -> Vec<Self> {
        let mut by_request: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in items {
            if let Some(request_id) = item.request_id {
                by_request.entry(request_id).or_default().push(item);
            }
        }

        requests
            .into_iter()
            .map(|request| {
                let items = by_request.remove(&request.id).unwrap_or_default();
                Self::new(request, &items)
            })
            .collect()
    }
}

/// Create request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(
        required(message = "Description is required"),
        custom(function = "not_blank", message = "Description must not be blank")
    )]
    pub description: Option<String>,
}

/// Validated request ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

impl NewItemRequest {
    pub fn new(requester_id: i64, data: CreateItemRequest, created: NaiveDateTime) -> AppResult<Self> {
        data.validate()?;
        Ok(Self {
            description: data.description.unwrap_or_default(),
            requester_id,
            created,
        })
    }
}
