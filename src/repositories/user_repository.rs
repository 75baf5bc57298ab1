use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReplaceOptions,
    Collection,
};

use crate::{
    db::{CollectionName, Database},
    errors::{AppError, AppResult},
    models::domain::{User, UserRole, UserStatus},
    repositories::{ensure_unique_id_index, insert_error, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>>;
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn find_by_status(&self, status: UserStatus) -> AppResult<Vec<User>>;
    async fn find_paginated(
        &self,
        role: Option<UserRole>,
        status: Option<UserStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn add_class(&self, user_id: &str, class_id: &str) -> AppResult<()>;
    async fn remove_class(&self, user_id: &str, class_id: &str) -> AppResult<()>;
    async fn remove_class_everywhere(&self, class_id: &str) -> AppResult<u64>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Users.as_str());
        Self { collection }
    }
}

fn user_filter(role: Option<UserRole>, status: Option<UserStatus>) -> Document {
    let mut filter = doc! {};
    if let Some(role) = role {
        filter.insert("role", role.as_str());
    }
    if let Some(status) = status {
        filter.insert("status", status.as_str());
    }
    filter
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| insert_error(e, format!("User with uid '{}' already exists", user.uid)))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "uid": uid }).await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(user_filter(None, Some(status)))
            .sort(doc! { "name": 1 })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_paginated(
        &self,
        role: Option<UserRole>,
        status: Option<UserStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let filter = user_filter(role, status);

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let users = self
            .collection
            .find(filter)
            .sort(doc! { "name": 1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((users, total))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        Ok(user)
    }

    async fn add_class(&self, user_id: &str, class_id: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": user_id },
                doc! { "$addToSet": { "class_ids": class_id } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user_id
            )));
        }
        Ok(())
    }

    async fn remove_class(&self, user_id: &str, class_id: &str) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": user_id },
                doc! { "$pull": { "class_ids": class_id } },
            )
            .await?;
        Ok(())
    }

    async fn remove_class_everywhere(&self, class_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "class_ids": class_id },
                doc! { "$pull": { "class_ids": class_id } },
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("User with id '{}' not found", id)));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(doc! { "uid": 1 }, "uid_unique", true))
            .await?;
        self.collection
            .create_index(named_index(doc! { "role": 1, "status": 1 }, "role_status", false))
            .await?;

        log::info!("Ensured indexes for users collection");
        Ok(())
    }
}
