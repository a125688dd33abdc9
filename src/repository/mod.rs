//! Repository layer for database operations
//!
//! Every table is reached through a store trait so services only depend on
//! the operations they use; `Repository::new` wires the PostgreSQL
//! implementations, tests wire mocks.

pub mod bookings;
pub mod comments;
pub mod items;
pub mod requests;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        booking::{Booking, BookingDetails, BookingShort, BookingState, BookingStatus, NewBooking},
        comment::{CommentDetails, NewComment},
        item::{Item, NewItem, UpdateItem},
        request::{ItemRequest, NewItemRequest},
        user::{NewUser, UpdateUser, User},
        Pagination,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Get user by ID, `NotFound` if absent
    async fn get_by_id(&self, id: i64) -> AppResult<User>;
    /// All users ordered by id
    async fn list(&self) -> AppResult<Vec<User>>;
    /// Case-insensitive email lookup, optionally ignoring one user
    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool>;
    async fn create(&self, user: &NewUser) -> AppResult<User>;
    async fn update(&self, id: i64, patch: &UpdateUser) -> AppResult<User>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<Item>;
    async fn list_by_owner(&self, owner_id: i64, page: Pagination) -> AppResult<Vec<Item>>;
    /// Available items whose name or description contains `text`
    async fn search(&self, text: &str, page: Pagination) -> AppResult<Vec<Item>>;
    async fn list_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<Item>>;
    async fn create(&self, item: &NewItem) -> AppResult<Item>;
    async fn update(&self, id: i64, patch: &UpdateItem) -> AppResult<Item>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookingsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<BookingDetails>;
    async fn create(&self, booking: &NewBooking) -> AppResult<BookingDetails>;
    /// Move a WAITING booking to `status`; false when it was no longer WAITING
    async fn decide(&self, id: i64, status: BookingStatus) -> AppResult<bool>;
    async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Pagination,
    ) -> AppResult<Vec<BookingDetails>>;
    async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Pagination,
    ) -> AppResult<Vec<BookingDetails>>;
    /// Latest approved booking started before `now`
    async fn last_approved(&self, item_id: i64, now: NaiveDateTime) -> AppResult<Option<BookingShort>>;
    /// Earliest approved booking starting after `now`
    async fn next_approved(&self, item_id: i64, now: NaiveDateTime) -> AppResult<Option<BookingShort>>;
    /// Approved bookings of several items, ordered by item then start
    async fn approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>>;
    /// Whether `booker_id` has an approved booking of `item_id` that ended before `now`
    async fn has_finished_approved(&self, booker_id: i64, item_id: i64, now: NaiveDateTime) -> AppResult<bool>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommentsStore: Send + Sync {
    async fn create(&self, comment: &NewComment) -> AppResult<CommentDetails>;
    async fn list_by_item(&self, item_id: i64) -> AppResult<Vec<CommentDetails>>;
    async fn list_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentDetails>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestsStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest>;
    async fn create(&self, request: &NewItemRequest) -> AppResult<ItemRequest>;
    /// Requests of one user, newest first
    async fn list_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;
    /// Requests of everybody but `requester_id`, newest first
    async fn list_others(&self, requester_id: i64, page: Pagination) -> AppResult<Vec<ItemRequest>>;
}

/// Aggregate of all stores handed to the services
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersStore>,
    pub items: Arc<dyn ItemsStore>,
    pub bookings: Arc<dyn BookingsStore>,
    pub comments: Arc<dyn CommentsStore>,
    pub requests: Arc<dyn RequestsStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            items: Arc::new(items::ItemsRepository::new(pool.clone())),
            bookings: Arc::new(bookings::BookingsRepository::new(pool.clone())),
            comments: Arc::new(comments::CommentsRepository::new(pool.clone())),
            requests: Arc::new(requests::RequestsRepository::new(pool)),
        }
    }
}

/// Mock stores; tests set expectations on the fields they need, then build a `Repository`
#[cfg(test)]
#[derive(Default)]
pub struct MockStores {
    pub users: MockUsersStore,
    pub items: MockItemsStore,
    pub bookings: MockBookingsStore,
    pub comments: MockCommentsStore,
    pub requests: MockRequestsStore,
}

#[cfg(test)]
impl MockStores {
    pub fn into_repository(self) -> Repository {
        Repository {
            users: Arc::new(self.users),
            items: Arc::new(self.items),
            bookings: Arc::new(self.bookings),
            comments: Arc::new(self.comments),
            requests: Arc::new(self.requests),
        }
    }
}
