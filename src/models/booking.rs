//! Booking model, status machine and list filters

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{item::Item, user::User, ItemDto};
use crate::error::{AppError, AppResult};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// Outcome of an owner decision on a waiting booking
    pub fn decided(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion: statuses are stored as TEXT
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Filter accepted by the booking list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Whether the filter compares against the current time
    pub fn uses_clock(&self) -> bool {
        matches!(self, BookingState::Current | BookingState::Past | BookingState::Future)
    }
}

impl Default for BookingState {
    fn default() -> Self {
        BookingState::All
    }
}

impl std::str::FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(AppError::InvalidState(format!("Unknown state: {}", s))),
        }
    }
}

/// Booking row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    #[sqlx(rename = "start_date")]
    pub start: NaiveDateTime,
    #[sqlx(rename = "end_date")]
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Booking with its item and booker loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub item: Item,
    pub booker: User,
}

impl BookingDetails {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.item.owner_id == user_id
    }

    pub fn is_visible_to(&self, user_id: i64) -> bool {
        self.booker.id == user_id || self.is_owned_by(user_id)
    }
}

/// Flat row produced by the booking/item/booker join
#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: BookingStatus,
    pub item_id: i64,
    pub item_name: String,
    pub item_description: String,
    pub item_available: bool,
    pub item_owner_id: i64,
    pub item_request_id: Option<i64>,
    pub booker_id: i64,
    pub booker_name: String,
    pub booker_email: String,
}

impl From<BookingRow> for BookingDetails {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            status: row.status,
            item: Item {
                id: row.item_id,
                name: row.item_name,
                description: row.item_description,
                available: row.item_available,
                owner_id: row.item_owner_id,
                request_id: row.item_request_id,
            },
            booker: User {
                id: row.booker_id,
                name: row.booker_name,
                email: row.booker_email,
            },
        }
    }
}

/// Booking as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    #[schema(value_type = String, example = "2030-01-01T10:00:00")]
    pub start: NaiveDateTime,
    #[schema(value_type = String, example = "2030-01-01T12:00:00")]
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub item: ItemDto,
    pub booker: User,
}

impl From<BookingDetails> for BookingDto {
    fn from(details: BookingDetails) -> Self {
        Self {
            id: details.id,
            start: details.start,
            end: details.end,
            status: details.status,
            item: ItemDto::from(details.item),
            booker: details.booker,
        }
    }
}

/// Last/next booking attached to an item for its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    #[sqlx(rename = "start_date")]
    #[schema(value_type = String)]
    pub start: NaiveDateTime,
    #[sqlx(rename = "end_date")]
    #[schema(value_type = String)]
    pub end: NaiveDateTime,
}

impl From<&Booking> for BookingShort {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            booker_id: booking.booker_id,
            start: booking.start,
            end: booking.end,
        }
    }
}

fn end_after_start(data: &CreateBooking) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (data.start, data.end) {
        if end <= start {
            let mut err = ValidationError::new("end_before_start");
            err.message = Some("Booking end must be after its start".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Create booking request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "end_after_start", skip_on_field_errors = true))]
pub struct CreateBooking {
    #[validate(required(message = "Item id is required"))]
    pub item_id: Option<i64>,
    #[validate(required(message = "Booking start is required"))]
    #[schema(value_type = Option<String>, example = "2030-01-01T10:00:00")]
    pub start: Option<NaiveDateTime>,
    #[validate(required(message = "Booking end is required"))]
    #[schema(value_type = Option<String>, example = "2030-01-01T12:00:00")]
    pub end: Option<NaiveDateTime>,
}

impl CreateBooking {
    /// Shape checks plus the clock check: a booking cannot start in the past
    pub fn validate_at(&self, now: NaiveDateTime) -> AppResult<()> {
        self.validate()?;
        if let Some(start) = self.start {
            if start < now {
                return Err(AppError::Validation(
                    "Booking start must not be in the past".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Validated booking ready for insertion, always created as WAITING
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
}

impl NewBooking {
    pub fn new(booker_id: i64, data: &CreateBooking, now: NaiveDateTime) -> AppResult<Self> {
        data.validate_at(now)?;
        match (data.item_id, data.start, data.end) {
            (Some(item_id), Some(start), Some(end)) => Ok(Self {
                item_id,
                booker_id,
                start,
                end,
                status: BookingStatus::Waiting,
            }),
            _ => Err(AppError::Validation("Incomplete booking".to_string())),
        }
    }
}

/// Query string of `PATCH /bookings/{id}`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalQuery {
    pub approved: bool,
}

/// Query string of the booking list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED (default: ALL)
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_parsing_is_case_insensitive() {
        assert_eq!("all".parse::<BookingState>().unwrap(), BookingState::All);
        assert_eq!("Current".parse::<BookingState>().unwrap(), BookingState::Current);
        assert_eq!("REJECTED".parse::<BookingState>().unwrap(), BookingState::Rejected);
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        match "UNSUPPORTED_STATUS".parse::<BookingState>() {
            Err(AppError::InvalidState(msg)) => assert_eq!(msg, "Unknown state: UNSUPPORTED_STATUS"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            BookingStatus::Waiting,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert_eq!(BookingStatus::decided(true), BookingStatus::Approved);
        assert_eq!(BookingStatus::decided(false), BookingStatus::Rejected);
    }

    #[test]
    fn test_new_booking_rules() {
        let now = crate::models::now();
        let ok = CreateBooking {
            item_id: Some(3),
            start: Some(now + Duration::hours(1)),
            end: Some(now + Duration::hours(2)),
        };
        let booking = NewBooking::new(7, &ok, now).unwrap();
        assert_eq!(booking.status, BookingStatus::Waiting);
        assert_eq!(booking.booker_id, 7);

        let in_past = CreateBooking { start: Some(now - Duration::hours(1)), ..ok.clone() };
        assert!(matches!(NewBooking::new(7, &in_past, now), Err(AppError::Validation(_))));

        let reversed = CreateBooking {
            start: Some(now + Duration::hours(2)),
            end: Some(now + Duration::hours(1)),
            ..ok.clone()
        };
        assert!(matches!(NewBooking::new(7, &reversed, now), Err(AppError::Validation(_))));

        let same = CreateBooking { end: ok.start, ..ok.clone() };
        assert!(matches!(NewBooking::new(7, &same, now), Err(AppError::Validation(_))));

        let missing_item = CreateBooking { item_id: None, ..ok };
        assert!(matches!(NewBooking::new(7, &missing_item, now), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_dto_uses_camel_case_and_local_timestamps() {
        let json = r#"{"itemId":4,"start":"2030-01-01T10:00:00","end":"2030-01-01T12:00:00"}"#;
        let data: CreateBooking = serde_json::from_str(json).unwrap();
        assert_eq!(data.item_id, Some(4));
        assert!(data.validate().is_ok());
    }
}
