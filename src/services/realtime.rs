use std::{collections::HashMap, future::Future, sync::Arc};

use serde::Serialize;
use tokio::sync::watch;

use crate::{
    db::CollectionName,
    errors::{AppError, AppResult},
    models::dto::response::UserDto,
    repositories::Repositories,
};

/// Full contents of one collection at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    pub collection: CollectionName,
    pub version: u64,
    pub documents: Vec<serde_json::Value>,
}

impl CollectionSnapshot {
    fn empty(collection: CollectionName) -> Self {
        Self {
            collection,
            version: 0,
            documents: Vec::new(),
        }
    }
}

/// One watch channel per collection.
pub struct SnapshotHub {
    channels: HashMap<CollectionName, watch::Sender<Arc<CollectionSnapshot>>>,
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotHub {
    pub fn new() -> Self {
        let channels = CollectionName::ALL
            .into_iter()
            .map(|name| {
                let (sender, _) = watch::channel(Arc::new(CollectionSnapshot::empty(name)));
                (name, sender)
            })
            .collect();

        Self { channels }
    }

    fn sender(
        &self,
        collection: CollectionName,
    ) -> AppResult<&watch::Sender<Arc<CollectionSnapshot>>> {
        self.channels.get(&collection).ok_or_else(|| {
            AppError::InternalError(format!("No snapshot channel for '{}'", collection))
        })
    }

    pub fn subscribe(
        &self,
        collection: CollectionName,
    ) -> AppResult<watch::Receiver<Arc<CollectionSnapshot>>> {
        Ok(self.sender(collection)?.subscribe())
    }

    pub fn has_subscribers(&self, collection: CollectionName) -> bool {
        self.channels
            .get(&collection)
            .map(|sender| sender.receiver_count() > 0)
            .unwrap_or(false)
    }

    pub fn latest(&self, collection: CollectionName) -> AppResult<Arc<CollectionSnapshot>> {
        Ok(self.sender(collection)?.borrow().clone())
    }

    pub fn publish<T: Serialize>(
        &self,
        collection: CollectionName,
        documents: &[T],
    ) -> AppResult<Arc<CollectionSnapshot>> {
        let sender = self.sender(collection)?;
        let documents = documents
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let version = sender.borrow().version + 1;
        let snapshot = Arc::new(CollectionSnapshot {
            collection,
            version,
            documents,
        });
        sender.send_replace(Arc::clone(&snapshot));

        log::debug!("Published {} snapshot v{}", collection, version);
        Ok(snapshot)
    }

    /// Reloads and publishes only while someone is listening. Failures are
    /// logged and swallowed so the write that triggered them still succeeds.
    pub async fn refresh<T, F, Fut>(&self, collection: CollectionName, load: F)
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Vec<T>>>,
    {
        if !self.has_subscribers(collection) {
            return;
        }

        match load().await {
            Ok(documents) => {
                if let Err(e) = self.publish(collection, &documents) {
                    log::warn!("Failed to publish {} snapshot: {}", collection, e);
                }
            }
            Err(e) => log::warn!("Failed to reload {} for snapshot: {}", collection, e),
        }
    }
}

/// Connects the snapshot channels to the collections they mirror.
pub struct RealtimeService {
    hub: SnapshotHub,
    repositories: Repositories,
}

impl RealtimeService {
    pub fn new(repositories: Repositories) -> Self {
        Self {
            hub: SnapshotHub::new(),
            repositories,
        }
    }

    pub fn hub(&self) -> &SnapshotHub {
        &self.hub
    }

    pub fn subscribe(
        &self,
        collection: CollectionName,
    ) -> AppResult<watch::Receiver<Arc<CollectionSnapshot>>> {
        self.hub.subscribe(collection)
    }

    /// Called after every write that touches `collection`.
    pub async fn refresh(&self, collection: CollectionName) {
        let repos = &self.repositories;
        match collection {
            CollectionName::Users => {
                self.hub
                    .refresh(collection, || async {
                        let users = repos.users.find_all().await?;
                        Ok::<_, AppError>(users.into_iter().map(UserDto::from).collect::<Vec<_>>())
                    })
                    .await
            }
            CollectionName::Classes => {
                self.hub.refresh(collection, || repos.classes.find_all()).await
            }
            CollectionName::Courses => {
                self.hub.refresh(collection, || repos.courses.find_all()).await
            }
            CollectionName::Quizzes => {
                self.hub.refresh(collection, || repos.quizzes.find_all()).await
            }
            CollectionName::Submissions => {
                self.hub
                    .refresh(collection, || repos.submissions.find_all())
                    .await
            }
            CollectionName::Attendance => {
                self.hub
                    .refresh(collection, || repos.attendance.find_all())
                    .await
            }
        }
    }

    pub async fn refresh_all(&self, collections: &[CollectionName]) {
        for collection in collections {
            self.refresh(*collection).await;
        }
    }

    /// Loads and publishes the current contents regardless of listeners.
    pub async fn publish_current(
        &self,
        collection: CollectionName,
    ) -> AppResult<Arc<CollectionSnapshot>> {
        let repos = &self.repositories;
        match collection {
            CollectionName::Users => {
                let users: Vec<UserDto> = repos
                    .users
                    .find_all()
                    .await?
                    .into_iter()
                    .map(UserDto::from)
                    .collect();
                self.hub.publish(collection, &users)
            }
            CollectionName::Classes => {
                self.hub.publish(collection, &repos.classes.find_all().await?)
            }
            CollectionName::Courses => {
                self.hub.publish(collection, &repos.courses.find_all().await?)
            }
            CollectionName::Quizzes => {
                self.hub.publish(collection, &repos.quizzes.find_all().await?)
            }
            CollectionName::Submissions => self
                .hub
                .publish(collection, &repos.submissions.find_all().await?),
            CollectionName::Attendance => self
                .hub
                .publish(collection, &repos.attendance.find_all().await?),
        }
    }
}
