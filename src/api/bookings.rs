//! Booking endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        booking::{ApprovalQuery, BookingDto, BookingListQuery, BookingState, CreateBooking},
        PageQuery, Pagination,
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

/// Parsed state filter and window of a booking list query
fn list_filter(query: BookingListQuery) -> AppResult<(BookingState, Pagination)> {
    let state = match query.state.as_deref() {
        Some(state) => state.parse()?,
        None => BookingState::All,
    };
    let page = Pagination::offset(PageQuery {
        from: query.from,
        size: query.size,
    })?;
    Ok((state, page))
}

/// Book an item
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker user ID")
    ),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created, waiting for approval", body = BookingDto),
        (status = 400, description = "Invalid dates or item unavailable", body = crate::error::ErrorResponse),
        (status = 403, description = "Owner cannot book own item", body = crate::error::ErrorResponse),
        (status = 404, description = "User or item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    SharerId(booker_id): SharerId,
    AppJson(booking): AppJson<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDto>)> {
    let created = state.services.bookings.create(booker_id, booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Approve or reject a waiting booking
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner user ID"),
        ("id" = i64, Path, description = "Booking ID"),
        ApprovalQuery
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingDto),
        (status = 400, description = "Booking already decided", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the item owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn decide_booking(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<ApprovalQuery>,
) -> AppResult<Json<BookingDto>> {
    let booking = state.services.bookings.approve(owner_id, id, query.approved).await?;
    Ok(Json(booking))
}

/// Get a booking as its booker or item owner
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        ("id" = i64, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDto),
        (status = 403, description = "Caller is neither booker nor owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    SharerId(caller_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookingDto>> {
    let booking = state.services.bookings.find_by_id(caller_id, id).await?;
    Ok(Json(booking))
}

/// Bookings made by the caller
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker user ID"),
        BookingListQuery
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingDto>),
        (status = 400, description = "Unknown state", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_booker_bookings(
    State(state): State<AppState>,
    SharerId(booker_id): SharerId,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> AppResult<Json<Vec<BookingDto>>> {
    let (filter, page) = list_filter(query)?;
    let bookings = state
        .services
        .bookings
        .find_all_by_booker(booker_id, filter, page)
        .await?;
    Ok(Json(bookings))
}

/// Bookings of the caller's items
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID"),
        BookingListQuery
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingDto>),
        (status = 400, description = "Unknown state", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    SharerId(owner_id): SharerId,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> AppResult<Json<Vec<BookingDto>>> {
    let (filter, page) = list_filter(query)?;
    let bookings = state
        .services
        .bookings
        .find_all_by_owner(owner_id, filter, page)
        .await?;
    Ok(Json(bookings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_list_filter_defaults_to_all() {
        let (state, page) = list_filter(BookingListQuery::default()).unwrap();
        assert_eq!(state, BookingState::All);
        assert_eq!(page, Pagination::ALL);
    }

    #[test]
    fn test_list_filter_rejects_unknown_state() {
        let query = BookingListQuery {
            state: Some("UNSUPPORTED_STATUS".into()),
            ..Default::default()
        };
        assert!(matches!(list_filter(query), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn test_list_filter_rejects_bad_window() {
        let query = BookingListQuery {
            state: Some("past".into()),
            from: Some(-1),
            size: Some(10),
        };
        assert!(matches!(list_filter(query), Err(AppError::Validation(_))));
    }
}
