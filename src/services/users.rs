//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a user; emails are unique across users
    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        let user = NewUser::new(data)?;

        if self.repository.users.email_exists(&user.email, None).await? {
            tracing::warn!("Rejected registration: email {} already in use", user.email);
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }

        let created = self.repository.users.create(&user).await?;
        tracing::info!(user_id = created.id, "User created");
        Ok(created)
    }

    /// Update name and/or email of an existing user
    pub async fn update(&self, id: i64, patch: UpdateUser) -> AppResult<User> {
        patch.validate()?;
        let patch = patch.normalized();
        let existing = self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = patch.email {
            if !email.eq_ignore_ascii_case(&existing.email)
                && self.repository.users.email_exists(email, Some(id)).await?
            {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }

        let updated = self.repository.users.update(id, &patch).await?;
        tracing::info!(user_id = id, "User updated");
        Ok(updated)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
