use std::sync::Arc;

use validator::Validate;

use crate::{
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole, UserStatus},
        dto::{
            request::{RegisterUserRequest, UpdateUserRequest, UserListQuery},
            response::{DeleteResponse, PaginatedUsers, PaginationMetadata, UserDto},
        },
    },
    repositories::Repositories,
    services::realtime::RealtimeService,
};

pub struct UserService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

impl UserService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    /// Profile behind an auth provider uid.
    pub async fn role_for_uid(&self, uid: &str) -> AppResult<User> {
        if uid.trim().is_empty() {
            return Err(AppError::BadRequest("Missing uid".to_string()));
        }

        self.repos
            .users
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No profile for uid '{}'", uid)))
    }

    pub async fn register(&self, request: RegisterUserRequest) -> AppResult<User> {
        request.validate()?;

        if request.role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        if self.repos.users.find_by_uid(&request.uid).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "A profile for uid '{}' already exists",
                request.uid
            )));
        }

        let user = User::new(&request.uid, &request.name, &request.email, request.role);
        let created = self.repos.users.create(user).await?;

        log::info!("Registered {} '{}' pending approval", created.role, created.id);
        self.realtime.refresh(CollectionName::Users).await;
        Ok(created)
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    pub async fn list_users(&self, query: &UserListQuery) -> AppResult<PaginatedUsers> {
        let (offset, limit) = (query.offset(), query.limit());
        let (users, total) = self
            .repos
            .users
            .find_paginated(query.role, query.status, offset, limit)
            .await?;

        Ok(PaginatedUsers {
            items: users.into_iter().map(UserDto::from).collect(),
            pagination: PaginationMetadata::new(offset, limit, total),
        })
    }

    pub async fn list_pending(&self) -> AppResult<Vec<UserDto>> {
        let users = self.repos.users.find_by_status(UserStatus::Pending).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn approve(&self, id: &str) -> AppResult<User> {
        self.set_status(id, UserStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> AppResult<User> {
        self.set_status(id, UserStatus::Rejected).await
    }

    async fn set_status(&self, id: &str, status: UserStatus) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        user.status = status;
        user.touch();

        let updated = self.repos.users.update(user).await?;
        log::info!("User '{}' is now {}", updated.id, status);
        self.realtime.refresh(CollectionName::Users).await;
        Ok(updated)
    }

    pub async fn update_role(&self, id: &str, role: UserRole) -> AppResult<User> {
        let mut user = self.get_user(id).await?;

        // Students are the only members of class rosters.
        if user.role == UserRole::Student && role != UserRole::Student {
            let removed = self.repos.classes.remove_student_everywhere(id).await?;
            user.class_ids.clear();
            if removed > 0 {
                self.realtime.refresh(CollectionName::Classes).await;
            }
        }

        user.role = role;
        user.touch();
        let updated = self.repos.users.update(user).await?;

        self.realtime.refresh(CollectionName::Users).await;
        Ok(updated)
    }

    pub async fn update_profile(&self, id: &str, request: UpdateUserRequest) -> AppResult<User> {
        request.validate()?;

        let mut user = self.get_user(id).await?;
        if let Some(name) = request.name {
            user.name = name;
        }
        if let Some(email) = request.email {
            user.email = email;
        }
        user.touch();

        let updated = self.repos.users.update(user).await?;
        self.realtime.refresh(CollectionName::Users).await;
        Ok(updated)
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<DeleteResponse> {
        self.repos.users.delete(id).await?;
        let pulled = self.repos.classes.remove_student_everywhere(id).await?;
        log::info!("Deleted user '{}' and removed them from {} classes", id, pulled);

        self.realtime
            .refresh_all(&[CollectionName::Users, CollectionName::Classes])
            .await;

        Ok(DeleteResponse {
            message: format!("User '{}' deleted", id),
        })
    }
}
