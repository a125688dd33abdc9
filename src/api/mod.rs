//! API handlers for ShareIt REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{get, post},
    Router,
};

use crate::{error::AppError, AppState};

/// Header carrying the calling user's id
pub const SHARER_HEADER: &str = "X-Sharer-User-Id";

/// Extractor for the caller identity sent in `X-Sharer-User-Id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SHARER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Validation(format!("Missing {} header", SHARER_HEADER)))?;

        let id = value
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("Invalid {} header: {}", SHARER_HEADER, value)))?;

        Ok(SharerId(id))
    }
}

/// `Json` whose rejections render as `AppError::Validation`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections render as `AppError::Validation`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` whose rejections render as `AppError::Validation`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// All ShareIt routes bound to the application state
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Users
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        )
        // Items
        .route("/items", post(items::create_item).get(items::list_items))
        .route("/items/search", get(items::search_items))
        .route("/items/:id", get(items::get_item).patch(items::update_item))
        .route("/items/:id/comment", post(items::add_comment))
        // Bookings
        .route("/bookings", post(bookings::create_booking).get(bookings::list_booker_bookings))
        .route("/bookings/owner", get(bookings::list_owner_bookings))
        .route("/bookings/:id", get(bookings::get_booking).patch(bookings::decide_booking))
        // Requests
        .route("/requests", post(requests::create_request).get(requests::list_own_requests))
        .route("/requests/all", get(requests::list_all_requests))
        .route("/requests/:id", get(requests::get_request))
        .with_state(state)
}
