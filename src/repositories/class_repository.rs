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
    models::domain::Class,
    repositories::{ensure_unique_id_index, insert_error, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn create(&self, class: Class) -> AppResult<Class>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Class>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Class>>;
    async fn find_all(&self) -> AppResult<Vec<Class>>;
    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Class>>;
    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>>;
    async fn update(&self, class: Class) -> AppResult<Class>;
    async fn add_course(&self, class_id: &str, course_id: &str) -> AppResult<()>;
    async fn add_student(&self, class_id: &str, student_id: &str) -> AppResult<()>;
    async fn remove_course_everywhere(&self, course_id: &str) -> AppResult<u64>;
    async fn remove_student_everywhere(&self, student_id: &str) -> AppResult<u64>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoClassRepository {
    collection: Collection<Class>,
}

impl MongoClassRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Classes.as_str());
        Self { collection }
    }

    /// Matches a reference stored either as a bare id or as `{ id, .. }`.
    fn ref_filter(field: &str, id: &str) -> Document {
        doc! {
            "$or": [
                { field: id },
                { format!("{}.id", field): id },
            ]
        }
    }

    async fn array_union(&self, class_id: &str, field: &str, id: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "id": class_id }, doc! { "$addToSet": { field: id } })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Class with id '{}' not found",
                class_id
            )));
        }
        Ok(())
    }

    async fn pull_everywhere(&self, field: &str, id: &str) -> AppResult<u64> {
        let bare = self
            .collection
            .update_many(Self::ref_filter(field, id), doc! { "$pull": { field: id } })
            .await?;
        let embedded = self
            .collection
            .update_many(
                Self::ref_filter(field, id),
                doc! { "$pull": { field: { "id": id } } },
            )
            .await?;
        Ok(bare.modified_count + embedded.modified_count)
    }
}

#[async_trait]
impl ClassRepository for MongoClassRepository {
    async fn create(&self, class: Class) -> AppResult<Class> {
        self.collection
            .insert_one(&class)
            .await
            .map_err(|e| insert_error(e, format!("Class with id '{}' already exists", class.id)))?;
        Ok(class)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Class>> {
        let class = self.collection.find_one(doc! { "id": id }).await?;
        Ok(class)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Class>> {
        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Class>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<Class>> {
        let cursor = self
            .collection
            .find(Self::ref_filter("students", student_id))
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Class>> {
        let cursor = self
            .collection
            .find(doc! { "teacher_ids": teacher_id })
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, class: Class) -> AppResult<Class> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &class.id }, &class)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Class with id '{}' not found",
                class.id
            )));
        }

        Ok(class)
    }

    async fn add_course(&self, class_id: &str, course_id: &str) -> AppResult<()> {
        self.array_union(class_id, "courses", course_id).await
    }

    async fn add_student(&self, class_id: &str, student_id: &str) -> AppResult<()> {
        self.array_union(class_id, "students", student_id).await
    }

    async fn remove_course_everywhere(&self, course_id: &str) -> AppResult<u64> {
        self.pull_everywhere("courses", course_id).await
    }

    async fn remove_student_everywhere(&self, student_id: &str) -> AppResult<u64> {
        self.pull_everywhere("students", student_id).await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Class with id '{}' not found", id)));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(doc! { "students": 1 }, "students", false))
            .await?;

        log::info!("Ensured indexes for classes collection");
        Ok(())
    }
}
