//! Item listing, search and comment service

use std::collections::HashMap;

use chrono::NaiveDateTime;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingShort},
        comment::{CommentDetails, CommentDto, CreateComment, NewComment},
        item::{CreateItem, Item, ItemDto, NewItem, UpdateItem},
        now, Pagination,
    },
    repository::Repository,
};

/// Last booking started before `now` and next booking starting after it.
/// `bookings` must all be approved bookings of the same item.
pub fn last_and_next(bookings: &[Booking], now: NaiveDateTime) -> (Option<BookingShort>, Option<BookingShort>) {
    let last = bookings
        .iter()
        .filter(|b| b.start < now)
        .max_by_key(|b| b.start)
        .map(BookingShort::from);
    let next = bookings
        .iter()
        .filter(|b| b.start > now)
        .min_by_key(|b| b.start)
        .map(BookingShort::from);
    (last, next)
}

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a new item owned by `owner_id`
    pub async fn create(&self, owner_id: i64, data: CreateItem) -> AppResult<ItemDto> {
        let item = NewItem::new(owner_id, data)?;
        self.repository.users.get_by_id(owner_id).await?;
        if let Some(request_id) = item.request_id {
            self.repository.requests.get_by_id(request_id).await?;
        }

        let created = self.repository.items.create(&item).await?;
        tracing::info!(item_id = created.id, owner_id, "Item created");
        Ok(ItemDto::from(created))
    }

    /// Patch name/description/availability; owner only
    pub async fn update(&self, owner_id: i64, item_id: i64, patch: UpdateItem) -> AppResult<ItemDto> {
        patch.validate()?;
        self.repository.users.get_by_id(owner_id).await?;
        let existing = self.repository.items.get_by_id(item_id).await?;

        if !existing.is_owned_by(owner_id) {
            tracing::warn!(item_id, user_id = owner_id, "Rejected item update by non-owner");
            return Err(AppError::AccessDenied(format!(
                "User with id {} is not the owner of item with id {}",
                owner_id, item_id
            )));
        }

        let updated = self.repository.items.update(item_id, &patch).await?;
        tracing::info!(item_id, "Item updated");
        Ok(ItemDto::from(updated))
    }

    /// Item with its comments; the owner also sees the last and next approved bookings
    pub async fn find_by_id(&self, caller_id: i64, item_id: i64) -> AppResult<ItemDto> {
        let item = self.repository.items.get_by_id(item_id).await?;
        let comments = self.repository.comments.list_by_item(item_id).await?;
        let is_owner = item.is_owned_by(caller_id);

        let mut dto = ItemDto::from(item)
            .with_comments(comments.into_iter().map(CommentDto::from).collect());

        if is_owner {
            let now = now();
            let last = self.repository.bookings.last_approved(item_id, now).await?;
            let next = self.repository.bookings.next_approved(item_id, now).await?;
            dto = dto.with_bookings(last, next);
        }

        tracing::debug!(item_id, caller_id, "Item fetched");
        Ok(dto)
    }

    /// All items of an owner, enriched with bookings and comments
    pub async fn find_all_by_owner(&self, owner_id: i64, page: Pagination) -> AppResult<Vec<ItemDto>> {
        self.repository.users.get_by_id(owner_id).await?;
        let items = self.repository.items.list_by_owner(owner_id, page).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let bookings = self.repository.bookings.approved_for_items(&ids).await?;
        let comments = self.repository.comments.list_by_items(&ids).await?;

        Ok(enrich_all(items, bookings, comments, now()))
    }

    /// Case-insensitive search among available items; blank text finds nothing
    pub async fn search(&self, text: &str, page: Pagination) -> AppResult<Vec<ItemDto>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items = self.repository.items.search(text, page).await?;
        Ok(items.into_iter().map(ItemDto::from).collect())
    }

    /// Comment on an item the author has finished renting
    pub async fn add_comment(&self, author_id: i64, item_id: i64, data: CreateComment) -> AppResult<CommentDto> {
        let now = now();
        let comment = NewComment::new(item_id, author_id, data, now)?;

        self.repository.items.get_by_id(item_id).await?;
        self.repository.users.get_by_id(author_id).await?;

        if !self
            .repository
            .bookings
            .has_finished_approved(author_id, item_id, now)
            .await?
        {
            tracing::warn!(item_id, author_id, "Rejected comment without completed booking");
            return Err(AppError::CommentNotAllowed(format!(
                "User with id {} cannot comment on item with id {}",
                author_id, item_id
            )));
        }

        let created = self.repository.comments.create(&comment).await?;
        tracing::info!(comment_id = created.id, item_id, author_id, "Comment added");
        Ok(CommentDto::from(created))
    }
}

/// Attach bookings and comments loaded for a batch of items
fn enrich_all(
    items: Vec<Item>,
    bookings: Vec<Booking>,
    comments: Vec<CommentDetails>,
    now: NaiveDateTime,
) -> Vec<ItemDto> {
    let mut bookings_by_item: HashMap<i64, Vec<Booking>> = HashMap::new();
    for booking in bookings {
        bookings_by_item.entry(booking.item_id).or_default().push(booking);
    }
    let mut comments_by_item: HashMap<i64, Vec<CommentDto>> = HashMap::new();
    for comment in comments {
        comments_by_item
            .entry(comment.item_id)
            .or_default()
            .push(CommentDto::from(comment));
    }

    items
        .into_iter()
        .map(|item| {
            let (last, next) = bookings_by_item
                .get(&item.id)
                .map(|b| last_and_next(b, now))
                .unwrap_or((None, None));
            let comments = comments_by_item.remove(&item.id).unwrap_or_default();
            ItemDto::from(item).with_bookings(last, next).with_comments(comments)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::booking::BookingStatus,
        repository::MockStores,
        services::fixtures::{self, BOOKER, OWNER, STRANGER},
    };
    use chrono::Duration;

    fn approved(id: i64, item_id: i64, start: NaiveDateTime) -> Booking {
        Booking {
            id,
            start,
            end: start + Duration::hours(1),
            item_id,
            booker_id: BOOKER,
            status: BookingStatus::Approved,
        }
    }

    fn comment_data(text: &str) -> CreateComment {
        CreateComment { text: Some(text.to_string()) }
    }

    #[test]
    fn test_last_and_next_pick_closest_around_now() {
        let now = now();
        let bookings = vec![
            approved(1, 10, now - Duration::days(3)),
            approved(2, 10, now - Duration::days(1)),
            approved(3, 10, now + Duration::days(2)),
            approved(4, 10, now + Duration::days(1)),
        ];
        let (last, next) = last_and_next(&bookings, now);
        assert_eq!(last.map(|b| b.id), Some(2));
        assert_eq!(next.map(|b| b.id), Some(4));
    }

    #[test]
    fn test_last_and_next_empty() {
        assert_eq!(last_and_next(&[], now()), (None, None));
    }

    #[test]
    fn test_enrich_all_groups_by_item() {
        let now = now();
        let items = vec![fixtures::item(10, OWNER, true), fixtures::item(11, OWNER, false)];
        let bookings = vec![approved(1, 10, now - Duration::hours(5)), approved(2, 11, now + Duration::hours(5))];
        let comments = vec![CommentDetails {
            id: 7,
            item_id: 11,
            text: "Great".into(),
            author_name: "user2".into(),
            created: now,
        }];

        let enriched = enrich_all(items, bookings, comments, now);
        assert_eq!(enriched[0].last_booking.as_ref().map(|b| b.id), Some(1));
        assert!(enriched[0].next_booking.is_none());
        assert!(enriched[0].comments.is_empty());
        assert_eq!(enriched[1].next_booking.as_ref().map(|b| b.id), Some(2));
        assert_eq!(enriched[1].comments[0].author_name, "user2");
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_denied() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.items.expect_update().never();

        let service = ItemsService::new(stores.into_repository());
        let patch = UpdateItem { available: Some(false), ..Default::default() };
        let result = service.update(STRANGER, 10, patch).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.items.expect_update().returning(|id, patch| {
            let mut item = fixtures::item(id, OWNER, true);
            if let Some(available) = patch.available {
                item.available = available;
            }
            Ok(item)
        });

        let service = ItemsService::new(stores.into_repository());
        let patch = UpdateItem { available: Some(false), ..Default::default() };
        let dto = service.update(OWNER, 10, patch).await.unwrap();
        assert!(!dto.available);
    }

    #[tokio::test]
    async fn test_create_with_unknown_request() {
        let mut stores = MockStores::default();
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores
            .requests
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Request with id {} not found", id))));
        stores.items.expect_create().never();

        let service = ItemsService::new(stores.into_repository());
        let data = CreateItem {
            name: Some("Tent".into()),
            description: Some("Two person tent".into()),
            available: Some(true),
            request_id: Some(99),
        };
        assert!(matches!(service.create(OWNER, data).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_id_hides_bookings_from_non_owner() {
        let mut stores = MockStores::default();
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.comments.expect_list_by_item().returning(|_| Ok(Vec::new()));
        stores.bookings.expect_last_approved().never();
        stores.bookings.expect_next_approved().never();

        let service = ItemsService::new(stores.into_repository());
        let dto = service.find_by_id(BOOKER, 10).await.unwrap();
        assert!(dto.last_booking.is_none());
        assert!(dto.next_booking.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_enriches_for_owner() {
        let mut stores = MockStores::default();
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.comments.expect_list_by_item().returning(|_| Ok(Vec::new()));
        stores.bookings.expect_last_approved().returning(|_, now| {
            Ok(Some(BookingShort {
                id: 5,
                booker_id: BOOKER,
                start: now - Duration::days(2),
                end: now - Duration::days(1),
            }))
        });
        stores.bookings.expect_next_approved().returning(|_, _| Ok(None));

        let service = ItemsService::new(stores.into_repository());
        let dto = service.find_by_id(OWNER, 10).await.unwrap();
        assert_eq!(dto.last_booking.map(|b| b.id), Some(5));
        assert!(dto.next_booking.is_none());
    }

    #[tokio::test]
    async fn test_search_with_blank_text_skips_store() {
        let mut stores = MockStores::default();
        stores.items.expect_search().never();

        let service = ItemsService::new(stores.into_repository());
        assert!(service.search("  ", Pagination::ALL).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_requires_finished_booking() {
        let mut stores = MockStores::default();
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores.bookings.expect_has_finished_approved().returning(|_, _, _| Ok(false));
        stores.comments.expect_create().never();

        let service = ItemsService::new(stores.into_repository());
        let result = service.add_comment(BOOKER, 10, comment_data("Nice drill")).await;
        assert!(matches!(result, Err(AppError::CommentNotAllowed(_))));
    }

    #[tokio::test]
    async fn test_comment_after_finished_booking() {
        let mut stores = MockStores::default();
        stores.items.expect_get_by_id().returning(|id| Ok(fixtures::item(id, OWNER, true)));
        stores.users.expect_get_by_id().returning(|id| Ok(fixtures::user(id)));
        stores
            .bookings
            .expect_has_finished_approved()
            .withf(|booker, item, _| *booker == BOOKER && *item == 10)
            .returning(|_, _, _| Ok(true));
        stores.comments.expect_create().returning(|c| {
            Ok(CommentDetails {
                id: 1,
                item_id: c.item_id,
                text: c.text.clone(),
                author_name: "user2".into(),
                created: c.created,
            })
        });

        let service = ItemsService::new(stores.into_repository());
        let comment = service.add_comment(BOOKER, 10, comment_data("Nice drill")).await.unwrap();
        assert_eq!(comment.text, "Nice drill");
        assert_eq!(comment.author_name, "user2");
    }

    #[tokio::test]
    async fn test_blank_comment_rejected_before_lookups() {
        let mut stores = MockStores::default();
        stores.items.expect_get_by_id().never();

        let service = ItemsService::new(stores.into_repository());
        let result = service.add_comment(BOOKER, 10, comment_data("   ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
