use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};

use crate::{
    db::{CollectionName, Database},
    errors::{AppError, AppResult},
    models::domain::Course,
    repositories::{ensure_unique_id_index, insert_error, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: Course) -> AppResult<Course>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Course>>;
    async fn find_all(&self) -> AppResult<Vec<Course>>;
    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Course>>;
    async fn update(&self, course: Course) -> AppResult<Course>;
    async fn add_class(&self, course_id: &str, class_id: &str) -> AppResult<()>;
    async fn remove_class(&self, course_id: &str, class_id: &str) -> AppResult<()>;
    async fn remove_class_everywhere(&self, class_id: &str) -> AppResult<u64>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCourseRepository {
    collection: Collection<Course>,
}

impl MongoCourseRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Courses.as_str());
        Self { collection }
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        self.collection
            .insert_one(&course)
            .await
            .map_err(|e| insert_error(e, format!("Course with id '{}' already exists", course.id)))?;
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let course = self.collection.find_one(doc! { "id": id }).await?;
        Ok(course)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Course>> {
        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Course>> {
        let cursor = self
            .collection
            .find(doc! { "teacher_id": teacher_id })
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &course.id }, &course)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course.id
            )));
        }

        Ok(course)
    }

    async fn add_class(&self, course_id: &str, class_id: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": course_id },
                doc! { "$addToSet": { "class_ids": class_id } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course_id
            )));
        }
        Ok(())
    }

    async fn remove_class(&self, course_id: &str, class_id: &str) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": course_id },
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
            return Err(AppError::NotFound(format!("Course with id '{}' not found", id)));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(doc! { "teacher_id": 1 }, "teacher_id", false))
            .await?;

        log::info!("Ensured indexes for courses collection");
        Ok(())
    }
}
