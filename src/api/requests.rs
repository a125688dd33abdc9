//! Item request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        request::{CreateItemRequest, ItemRequestDto},
        PageQuery, Pagination,
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Ask for an item nobody lists yet
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requester user ID")
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request created", body = ItemRequestDto),
        (status = 400, description = "Blank description", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    SharerId(requester_id): SharerId,
    AppJson(request): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestDto>)> {
    let created = state.services.requests.create(requester_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// The caller's own requests with the items answering them
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requester user ID")
    ),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<ItemRequestDto>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    SharerId(requester_id): SharerId,
) -> AppResult<Json<Vec<ItemRequestDto>>> {
    let requests = state.services.requests.find_own(requester_id).await?;
    Ok(Json(requests))
}

/// Other users' requests, a page at a time
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<ItemRequestDto>),
        (status = 400, description = "Invalid pagination", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_all_requests(
    State(state): State<AppState>,
    SharerId(caller_id): SharerId,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Json<Vec<ItemRequestDto>>> {
    let page = Pagination::page(query.from.unwrap_or(0), query.size.unwrap_or(DEFAULT_PAGE_SIZE))?;
    let requests = state.services.requests.find_all(caller_id, page).await?;
    Ok(Json(requests))
}

/// Get a request with its items
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        ("id" = i64, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = ItemRequestDto),
        (status = 404, description = "User or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    SharerId(caller_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemRequestDto>> {
    let request = state.services.requests.find_by_id(caller_id, id).await?;
    Ok(Json(request))
}
