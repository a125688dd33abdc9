//! Validating gateway in front of the ShareIt server
//!
//! Every route checks the caller header and the request shape, then hands the
//! request to [`GatewayClient`] which relays the server's answer verbatim.

pub mod client;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::Method,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::{
    api::{health, AppJson, AppPath, AppQuery, SharerId},
    error::AppResult,
    models::{
        booking::{ApprovalQuery, BookingListQuery, CreateBooking},
        comment::CreateComment,
        item::{CreateItem, SearchQuery, UpdateItem},
        now,
        request::CreateItemRequest,
        user::{CreateUser, UpdateUser},
        PageQuery,
    },
};

pub use client::GatewayClient;

/// Gateway state shared across handlers
#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<GatewayClient>,
}

/// All forwarded routes, mirroring the server's
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(forward_open))
        // Users
        .route("/users", post(create_user).get(forward_open))
        .route("/users/:id", get(forward_open).patch(update_user).delete(forward_open))
        // Items
        .route("/items", post(create_item).get(list_items))
        .route("/items/search", get(search_items))
        .route("/items/:id", get(forward_identified).patch(update_item))
        .route("/items/:id/comment", post(add_comment))
        // Bookings
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/owner", get(list_bookings))
        .route("/bookings/:id", get(forward_identified).patch(decide_booking))
        // Requests
        .route("/requests", post(create_request).get(forward_identified))
        .route("/requests/all", get(list_all_requests))
        .route("/requests/:id", get(forward_identified))
        .with_state(state)
}

/// Bodyless request that needs no caller header
async fn forward_open(
    State(state): State<GatewayState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Response> {
    state.client.forward(method, &uri, None).await
}

/// Bodyless request from an identified caller
async fn forward_identified(
    State(state): State<GatewayState>,
    sharer: SharerId,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Response> {
    state.client.forward(method, &uri, Some(sharer)).await
}

async fn create_user(
    State(state): State<GatewayState>,
    OriginalUri(uri): OriginalUri,
    AppJson(user): AppJson<CreateUser>,
) -> AppResult<Response> {
    validation::payload(&user)?;
    state.client.forward_json(Method::POST, &uri, None, &user).await
}

async fn update_user(
    State(state): State<GatewayState>,
    OriginalUri(uri): OriginalUri,
    AppPath(_id): AppPath<i64>,
    AppJson(patch): AppJson<UpdateUser>,
) -> AppResult<Response> {
    validation::payload(&patch)?;
    state.client.forward_json(Method::PATCH, &uri, None, &patch).await
}

async fn create_item(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppJson(item): AppJson<CreateItem>,
) -> AppResult<Response> {
    validation::payload(&item)?;
    state.client.forward_json(Method::POST, &uri, Some(sharer), &item).await
}

async fn update_item(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppPath(_id): AppPath<i64>,
    AppJson(patch): AppJson<UpdateItem>,
) -> AppResult<Response> {
    validation::payload(&patch)?;
    state.client.forward_json(Method::PATCH, &uri, Some(sharer), &patch).await
}

async fn list_items(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Response> {
    validation::offset_window(query)?;
    state.client.forward(Method::GET, &uri, Some(sharer)).await
}

async fn search_items(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppQuery(query): AppQuery<SearchQuery>,
) -> AppResult<Response> {
    validation::offset_window(PageQuery {
        from: query.from,
        size: query.size,
    })?;
    state.client.forward(Method::GET, &uri, Some(sharer)).await
}

async fn add_comment(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppPath(_id): AppPath<i64>,
    AppJson(comment): AppJson<CreateComment>,
) -> AppResult<Response> {
    validation::payload(&comment)?;
    state.client.forward_json(Method::POST, &uri, Some(sharer), &comment).await
}

async fn create_booking(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppJson(booking): AppJson<CreateBooking>,
) -> AppResult<Response> {
    validation::booking(&booking, now())?;
    state.client.forward_json(Method::POST, &uri, Some(sharer), &booking).await
}

async fn decide_booking(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppPath(_id): AppPath<i64>,
    AppQuery(_query): AppQuery<ApprovalQuery>,
) -> AppResult<Response> {
    state.client.forward(Method::PATCH, &uri, Some(sharer)).await
}

/// Booker and owner listings share the same query rules
async fn list_bookings(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> AppResult<Response> {
    validation::state_filter(query.state.as_deref())?;
    validation::offset_window(PageQuery {
        from: query.from,
        size: query.size,
    })?;
    state.client.forward(Method::GET, &uri, Some(sharer)).await
}

async fn create_request(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppJson(request): AppJson<CreateItemRequest>,
) -> AppResult<Response> {
    validation::payload(&request)?;
    state.client.forward_json(Method::POST, &uri, Some(sharer), &request).await
}

async fn list_all_requests(
    State(state): State<GatewayState>,
    sharer: SharerId,
    OriginalUri(uri): OriginalUri,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Response> {
    validation::page_window(query)?;
    state.client.forward(Method::GET, &uri, Some(sharer)).await
}
