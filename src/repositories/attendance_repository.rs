use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::ReplaceOptions, Collection};

use crate::{
    db::{CollectionName, Database},
    errors::{AppError, AppResult},
    models::domain::AttendanceRecord,
    repositories::{ensure_unique_id_index, named_index},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Inserts or replaces the sheet for the record's class and date.
    async fn upsert(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<AttendanceRecord>>;
    async fn find_all(&self) -> AppResult<Vec<AttendanceRecord>>;
    async fn find_by_class(&self, class_id: &str) -> AppResult<Vec<AttendanceRecord>>;
    async fn find_by_class_and_date(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>>;
    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoAttendanceRepository {
    collection: Collection<AttendanceRecord>,
}

impl MongoAttendanceRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(CollectionName::Attendance.as_str());
        Self { collection }
    }
}

#[async_trait]
impl AttendanceRepository for MongoAttendanceRepository {
    async fn upsert(&self, record: AttendanceRecord) -> AppResult<AttendanceRecord> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "id": &record.id }, &record)
            .with_options(options)
            .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AttendanceRecord>> {
        let record = self.collection.find_one(doc! { "id": id }).await?;
        Ok(record)
    }

    async fn find_all(&self) -> AppResult<Vec<AttendanceRecord>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "date": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_class(&self, class_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        let cursor = self
            .collection
            .find(doc! { "class_id": class_id })
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_class_and_date(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        let record = self
            .collection
            .find_one(doc! { "id": AttendanceRecord::record_id(class_id, date) })
            .await?;
        Ok(record)
    }

    async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        let cursor = self
            .collection
            .find(doc! { "entries.student_id": student_id })
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Attendance record with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        ensure_unique_id_index(&self.collection).await?;
        self.collection
            .create_index(named_index(
                doc! { "class_id": 1, "date": -1 },
                "class_date",
                false,
            ))
            .await?;
        self.collection
            .create_index(named_index(
                doc! { "entries.student_id": 1 },
                "entry_student",
                false,
            ))
            .await?;

        log::info!("Ensured indexes for attendance collection");
        Ok(())
    }
}
