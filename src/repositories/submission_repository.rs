use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};

use crate::{
    db::{CollectionName, Database},
    errors::{AppError, AppResult},
    models::domain::Submission,
    repositories::{ensure_unique_id_index, insert_error, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: Submission) -> AppResult<Submission>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>>;
    async fn find_all(&self) -> AppResult<Vec<Submission>>;
    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Submission>>;
    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Submission>>;
    async fn count_student_attempts(&self, student_id: &str, quiz_id: &str) -> AppResult<usize>;
    async fn update(&self, submission: Submission) -> AppResult<Submission>;
    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSubmissionRepository {
    collection: Collection<Submission>,
}

impl MongoSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Submissions.as_str());
        Self { collection }
    }
}

#[async_trait]
impl SubmissionRepository for MongoSubmissionRepository {
    async fn create(&self, submission: Submission) -> AppResult<Submission> {
        self.collection.insert_one(&submission).await.map_err(|e| {
            insert_error(
                e,
                format!("Submission with id '{}' already exists", submission.id),
            )
        })?;
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Submission>> {
        let submission = self.collection.find_one(doc! { "id": id }).await?;
        Ok(submission)
    }

    async fn find_all(&self) -> AppResult<Vec<Submission>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "submitted_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Submission>> {
        let cursor = self
            .collection
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "submitted_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Submission>> {
        let cursor = self
            .collection
            .find(doc! { "student_id": student_id })
            .sort(doc! { "submitted_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_student_attempts(&self, student_id: &str, quiz_id: &str) -> AppResult<usize> {
        let count = self
            .collection
            .count_documents(doc! { "student_id": student_id, "quiz_id": quiz_id })
            .await?;
        Ok(count as usize)
    }

    async fn update(&self, submission: Submission) -> AppResult<Submission> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &submission.id }, &submission)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Submission with id '{}' not found",
                submission.id
            )));
        }

        Ok(submission)
    }

    async fn delete_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "quiz_id": quiz_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(
                doc! { "student_id": 1, "quiz_id": 1 },
                "student_quiz",
                false,
            ))
            .await?;
        self.collection
            .create_index(named_index(doc! { "quiz_id": 1 }, "quiz_id", false))
            .await?;

        log::info!("Ensured indexes for submissions collection");
        Ok(())
    }
}
