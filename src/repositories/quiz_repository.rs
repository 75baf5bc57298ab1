use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};

use crate::{
    db::{CollectionName, Database},
    errors::{AppError, AppResult},
    models::domain::Quiz,
    repositories::{ensure_unique_id_index, insert_error, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    async fn find_all(&self) -> AppResult<Vec<Quiz>>;
    async fn find_by_creator(&self, user_id: &str) -> AppResult<Vec<Quiz>>;
    /// Quizzes attached to any of the classes or courses.
    async fn find_for_audience(
        &self,
        class_ids: &[String],
        course_ids: &[String],
    ) -> AppResult<Vec<Quiz>>;
    async fn update(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Quizzes.as_str());
        Self { collection }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection
            .insert_one(&quiz)
            .await
            .map_err(|e| insert_error(e, format!("Quiz with id '{}' already exists", quiz.id)))?;
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_creator(&self, user_id: &str) -> AppResult<Vec<Quiz>> {
        let cursor = self
            .collection
            .find(doc! { "created_by": user_id })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_for_audience(
        &self,
        class_ids: &[String],
        course_ids: &[String],
    ) -> AppResult<Vec<Quiz>> {
        let filter = doc! {
            "$or": [
                { "class_ids": { "$in": class_ids.to_vec() } },
                { "course_id": { "$in": course_ids.to_vec() } },
            ]
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &quiz.id }, &quiz)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz.id
            )));
        }

        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(doc! { "created_by": 1 }, "created_by", false))
            .await?;
        self.collection
            .create_index(named_index(doc! { "course_id": 1 }, "course_id", false))
            .await?;

        log::info!("Ensured indexes for quizzes collection");
        Ok(())
    }
}
