//! Bookings repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use super::BookingsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails, BookingRow, BookingShort, BookingState, BookingStatus, NewBooking},
        Pagination,
    },
};

/// Booking joined with its item and booker, flattened for `BookingRow`
const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id,
           i.request_id AS item_request_id,
           u.id AS booker_id, u.name AS booker_name, u.email AS booker_email
    FROM bookings b
    JOIN items i ON b.item_id = i.id
    JOIN users u ON b.booker_id = u.id
"#;

/// SQL predicate for a list filter; `$2` is the current time
fn state_clause(state: BookingState) -> &'static str {
    match state {
        BookingState::All => "",
        BookingState::Current => " AND b.start_date < $2 AND b.end_date > $2",
        BookingState::Past => " AND b.end_date < $2",
        BookingState::Future => " AND b.start_date > $2",
        BookingState::Waiting => " AND b.status = 'WAITING'",
        BookingState::Rejected => " AND b.status = 'REJECTED'",
    }
}

/// Full list query for one party column (`b.booker_id` or `i.owner_id`)
fn list_query(party_column: &str, state: BookingState, page: Pagination) -> String {
    format!(
        "{} WHERE {} = $1{} ORDER BY b.start_date DESC{}",
        BOOKING_SELECT,
        party_column,
        state_clause(state),
        page.to_sql()
    )
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn list_for(
        &self,
        party_column: &str,
        party_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Pagination,
    ) -> AppResult<Vec<BookingDetails>> {
        let query = list_query(party_column, state, page);
        let mut builder = sqlx::query_as::<_, BookingRow>(&query).bind(party_id);
        if state.uses_clock() {
            builder = builder.bind(now);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }
}

#[async_trait]
impl BookingsStore for BookingsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<BookingDetails> {
        sqlx::query_as::<_, BookingRow>(&format!("{} WHERE b.id = $1", BOOKING_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookingDetails::from)
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    async fn create(&self, booking: &NewBooking) -> AppResult<BookingDetails> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(booking.status)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    async fn decide(&self, id: i64, status: BookingStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2 AND status = 'WAITING'")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Pagination,
    ) -> AppResult<Vec<BookingDetails>> {
        self.list_for("b.booker_id", booker_id, state, now, page).await
    }

    async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Pagination,
    ) -> AppResult<Vec<BookingDetails>> {
        self.list_for("i.owner_id", owner_id, state, now, page).await
    }

    async fn last_approved(&self, item_id: i64, now: NaiveDateTime) -> AppResult<Option<BookingShort>> {
        let booking = sqlx::query_as::<_, BookingShort>(
            r#"
            SELECT id, booker_id, start_date, end_date FROM bookings
            WHERE item_id = $1 AND status = 'APPROVED' AND start_date < $2
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn next_approved(&self, item_id: i64, now: NaiveDateTime) -> AppResult<Option<BookingShort>> {
        let booking = sqlx::query_as::<_, BookingShort>(
            r#"
            SELECT id, booker_id, start_date, end_date FROM bookings
            WHERE item_id = $1 AND status = 'APPROVED' AND start_date > $2
            ORDER BY start_date ASC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status FROM bookings
            WHERE item_id = ANY($1) AND status = 'APPROVED'
            ORDER BY item_id, start_date ASC
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn has_finished_approved(&self, booker_id: i64, item_id: i64, now: NaiveDateTime) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2
                  AND status = 'APPROVED' AND end_date < $3
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
