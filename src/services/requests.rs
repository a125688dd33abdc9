//! Item request service

use crate::{
    error::AppResult,
    models::{
        now,
        request::{CreateItemRequest, ItemRequest, ItemRequestDto, NewItemRequest},
        Pagination,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, requester_id: i64, data: CreateItemRequest) -> AppResult<ItemRequestDto> {
        let request = NewItemRequest::new(requester_id, data, now())?;
        self.repository.users.get_by_id(requester_id).await?;

        let created = self.repository.requests.create(&request).await?;
        tracing::info!(request_id = created.id, requester_id, "Item request created");
        Ok(ItemRequestDto::new(created, &[]))
    }

    /// The caller's own requests, newest first, with the items answering them
    pub async fn find_own(&self, requester_id: i64) -> AppResult<Vec<ItemRequestDto>> {
        self.repository.users.get_by_id(requester_id).await?;
        let requests = self.repository.requests.list_by_requester(requester_id).await?;
        self.with_items(requests).await
    }

    /// Everybody else's requests, one page at a time
    pub async fn find_all(&self, requester_id: i64, page: Pagination) -> AppResult<Vec<ItemRequestDto>> {
        self.repository.users.get_by_id(requester_id).await?;
        let requests = self.repository.requests.list_others(requester_id, page).await?;
        self.with_items(requests).await
    }

    pub async fn find_by_id(&self, user_id: i64, request_id: i64) -> AppResult<ItemRequestDto> {
        self.repository.users.get_by_id(user_id).await?;
        let request = self.repository.requests.get_by_id(request_id).await?;
        let items = self.repository.items.list_by_request_ids(&[request_id]).await?;
        Ok(ItemRequestDto::new(request, &items))
    }

    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<ItemRequestDto>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let items = self.repository.items.list_by_request_ids(&ids).await?;
        Ok(ItemRequestDto::group(requests, items))
    }
}
