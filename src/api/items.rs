//! Item endpoints: listing, search and comments

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        comment::{CommentDto, CreateComment},
        item::{CreateItem, ItemDto, SearchQuery, UpdateItem},
        PageQuery, Pagination,
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

/// List the caller's own items with bookings and comments
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Owner's items ordered by id", body = Vec<ItemDto>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Json<Vec<ItemDto>>> {
    let page = Pagination::offset(query)?;
    let items = state.services.items.find_all_by_owner(owner_id, page).await?;
    Ok(Json(items))
}

/// Get an item; the owner also sees last and next bookings
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDto),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    SharerId(caller_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemDto>> {
    let item = state.services.items.find_by_id(caller_id, id).await?;
    Ok(Json(item))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID")
    ),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemDto),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Owner or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppJson(item): AppJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemDto>)> {
    let created = state.services.items.create(owner_id, item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update an item
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemDto),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<UpdateItem>,
) -> AppResult<Json<ItemDto>> {
    let updated = state.services.items.update(owner_id, id, patch).await?;
    Ok(Json(updated))
}

/// Search available items by name or description
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        SearchQuery
    ),
    responses(
        (status = 200, description = "Matching available items", body = Vec<ItemDto>)
    )
)]
pub async fn search_items(
    State(state): State<AppState>,
    SharerId(_caller_id): SharerId,
    AppQuery(query): AppQuery<SearchQuery>,
) -> AppResult<Json<Vec<ItemDto>>> {
    let page = Pagination::offset(PageQuery {
        from: query.from,
        size: query.size,
    })?;
    let text = query.text.unwrap_or_default();
    let items = state.services.items.search(&text, page).await?;
    Ok(Json(items))
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Author user ID"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 400, description = "No completed booking or blank text", body = crate::error::ErrorResponse),
        (status = 404, description = "Item or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    SharerId(author_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppJson(comment): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let created = state.services.items.add_comment(author_id, id, comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
