//! Shape checks the gateway runs before forwarding

use chrono::NaiveDateTime;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{booking::CreateBooking, BookingState, PageQuery, Pagination},
};

/// Field rules declared on the payload type
pub fn payload<T: Validate>(value: &T) -> AppResult<()> {
    value.validate()?;
    Ok(())
}

/// Field rules plus the booking window: start not in the past, end after start
pub fn booking(data: &CreateBooking, now: NaiveDateTime) -> AppResult<()> {
    data.validate_at(now)
}

/// `from` >= 0 and `size` > 0 when present
pub fn offset_window(query: PageQuery) -> AppResult<()> {
    Pagination::offset(query)?;
    Ok(())
}

/// Page window of `/requests/all`; absent values take the server defaults
pub fn page_window(query: PageQuery) -> AppResult<()> {
    Pagination::page(query.from.unwrap_or(0), query.size.unwrap_or(10))?;
    Ok(())
}

/// Known booking list filter, case-insensitive
pub fn state_filter(state: Option<&str>) -> AppResult<()> {
    if let Some(state) = state {
        state.parse::<BookingState>()?;
    }
    Ok(())
}
