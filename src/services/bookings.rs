//! Booking service: creation, owner decisions and listings

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingDto, BookingState, BookingStatus, CreateBooking, NewBooking},
        now, Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Book an item; the booking starts WAITING for the owner's decision
    pub async fn create(&self, booker_id: i64, data: CreateBooking) -> AppResult<BookingDto> {
        let booking = NewBooking::new(booker_id, &data, now())?;

        self.repository.users.get_by_id(booker_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;

        if !item.available {
            return Err(AppError::Unavailable(format!(
                "Item with id {} is not available for booking",
                item.id
            )));
        }
        if item.is_owned_by(booker_id) {
            tracing::warn!(item_id = item.id, user_id = booker_id, "Owner tried to book own item");
            return Err(AppError::AccessDenied("Owners cannot book their own items".to_string()));
        }

        let created = self.repository.bookings.create(&booking).await?;
        tracing::info!(booking_id = created.id, item_id = item.id, booker_id, "Booking created");
        Ok(BookingDto::from(created))
    }

    /// Owner approves or rejects a waiting booking
    pub async fn approve(&self, owner_id: i64, booking_id: i64, approved: bool) -> AppResult<BookingDto> {
        let mut booking = self.repository.bookings.get_by_id(booking_id).await?;

        if !booking.is_owned_by(owner_id) {
            tracing::warn!(booking_id, user_id = owner_id, "Rejected decision by non-owner");
            return Err(AppError::AccessDenied(format!(
                "User with id {} is not the owner of the booked item",
                owner_id
            )));
        }
        if booking.status != BookingStatus::Waiting {
            return Err(AppError::InvalidState(format!(
                "Booking with id {} was already decided",
                booking_id
            )));
        }

        let status = BookingStatus::decided(approved);
        if !self.repository.bookings.decide(booking_id, status).await? {
            // Another decision landed between the read and the update
            return Err(AppError::InvalidState(format!(
                "Booking with id {} was already decided",
                booking_id
            )));
        }

        booking.status = status;
        tracing::info!(booking_id, status = %status, "Booking decided");
        Ok(BookingDto::from(booking))
    }

    /// Booking visible to its booker and the item owner only
    pub async fn find_by_id(&self, user_id: i64, booking_id: i64) -> AppResult<BookingDto> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        if !booking.is_visible_to(user_id) {
            tracing::warn!(booking_id, user_id, "Rejected booking read by unrelated user");
            return Err(AppError::AccessDenied(format!(
                "User with id {} may not view booking with id {}",
                user_id, booking_id
            )));
        }
        Ok(BookingDto::from(booking))
    }

    /// Bookings made by `booker_id`, newest start first
    pub async fn find_all_by_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        page: Pagination,
    ) -> AppResult<Vec<BookingDto>> {
        self.repository.users.get_by_id(booker_id).await?;
        let bookings = self
            .repository
            .bookings
            .list_for_booker(booker_id, state, now(), page)
            .await?;
        Ok(bookings.into_iter().map(BookingDto::from).collect())
    }

    /// Bookings of items owned by `owner_id`, newest start first
    pub async fn find_all_by_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        page: Pagination,
    ) -> AppResult<Vec<BookingDto>> {
        self.repository.users.get_by_id(owner_id).await?;
        let bookings = self
            .repository
            .bookings
            .list_for_owner(owner_id, state, now(), page)
            .await?;
        Ok(bookings.into_iter().map(BookingDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::booking::BookingDetails,
        repository::MockStores,
        services::fixtures::{self, BOOKER, OWNER, STRANGER},
    };
    use chrono::Duration;

    fn request(item_id: i64) -> CreateBooking {
        let now = now();
        CreateBooking {
            item_id: Some(item_id),
            start: Some(now + Duration::hours(1)),
            end: Some(now + Duration::hours(2)),
        }
    }

    fn stored(booking: &NewBooking) -> BookingDetails {
        BookingDetails {
            id: 1,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            item: fixtures::item(booking.item_id, OWNER, true),
            booker: fixtures::user(booking.booker_id),
        }
    }

    #[tokio::test]
    async fn test_create_booking_is_waiting() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores
            .bookings
            .expect_create()
            .withf(|b| b.booker_id == BOOKER && b.status == BookingStatus::Waiting)
            .returning(|b| Ok(stored(b)));

        let service = BookingsService::new(stores.into_repository());
        let dto = service.create(BOOKER, request(10)).await.unwrap();
        assert_eq!(dto.status, BookingStatus::Waiting);
        assert_eq!(dto.item.id, 10);
        assert_eq!(dto.booker.id, BOOKER);
    }

    #[tokio::test]
    async fn test_create_booking_of_unavailable_item() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, false)));
        stores.bookings.expect_create().never();

        let service = BookingsService::new(stores.into_repository());
        let result = service.create(BOOKER, request(10)).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_book_own_item() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.bookings.expect_create().never();

        let service = BookingsService::new(stores.into_repository());
        let result = service.create(OWNER, request(10)).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_create_booking_in_past_skips_lookups() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().never();

        let service = BookingsService::new(stores.into_repository());
        let now = now();
        let data = CreateBooking {
            item_id: Some(10),
            start: Some(now - Duration::days(1)),
            end: Some(now + Duration::days(1)),
        };
        assert!(matches!(service.create(BOOKER, data).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_waiting_booking() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Waiting, now())));
        stores
            .bookings
            .expect_decide()
            .withf(|id, status| *id == 1 && *status == BookingStatus::Approved)
            .returning(|_, _| Ok(true));

        let service = BookingsService::new(stores.into_repository());
        let dto = service.approve(OWNER, 1, true).await.unwrap();
        assert_eq!(dto.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_waiting_booking() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Waiting, now())));
        stores.bookings.expect_decide().returning(|_, _| Ok(true));

        let service = BookingsService::new(stores.into_repository());
        let dto = service.approve(OWNER, 1, false).await.unwrap();
        assert_eq!(dto.status, BookingStatus::Rejected);
    }

    #[tokio::test]
    async fn test_approve_by_booker_is_denied() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Waiting, now())));
        stores.bookings.expect_decide().never();

        let service = BookingsService::new(stores.into_repository());
        let result = service.approve(BOOKER, 1, true).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_second_decision_is_rejected() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Approved, now())));
        stores.bookings.expect_decide().never();

        let service = BookingsService::new(stores.into_repository());
        let result = service.approve(OWNER, 1, false).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_concurrent_decision_loses() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Waiting, now())));
        stores.bookings.expect_decide().returning(|_, _| Ok(false));

        let service = BookingsService::new(stores.into_repository());
        let result = service.approve(OWNER, 1, true).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_booking_hidden_from_strangers() {
        let mut stores = MockStores::default();
        stores
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(fixtures::booking(id, BookingStatus::Waiting, now())));

        let service = BookingsService::new(stores.into_repository());
        assert!(service.find_by_id(BOOKER, 1).await.is_ok());
        assert!(service.find_by_id(OWNER, 1).await.is_ok());
        assert!(matches!(
            service.find_by_id(STRANGER, 1).await,
            Err(AppError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_list_for_unknown_owner() {
        let mut stores = MockStores::default();
        stores
            .users
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));
        stores.bookings.expect_list_for_owner().never();

        let service = BookingsService::new(stores.into_repository());
        let result = service.find_all_by_owner(99, BookingState::All, Pagination::ALL).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_for_booker_passes_filter() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores
            .bookings
            .expect_list_for_booker()
            .withf(|booker, state, _, page| {
                *booker == BOOKER && *state == BookingState::Waiting && page.limit == Some(5)
            })
            .returning(|_, _, now, _| Ok(vec![fixtures::booking(1, BookingStatus::Waiting, now)]));

        let service = BookingsService::new(stores.into_repository());
        let page = Pagination { offset: 0, limit: Some(5) };
        let list = service.find_all_by_booker(BOOKER, BookingState::Waiting, page).await.unwrap();
        assert_eq!(list.len(), 1);
    }
}
