pub mod attendance_repository;
pub mod class_repository;
pub mod course_repository;
pub mod quiz_repository;
pub mod submission_repository;
pub mod user_repository;

pub use attendance_repository::{AttendanceRepository, MongoAttendanceRepository};
pub use class_repository::{ClassRepository, MongoClassRepository};
pub use course_repository::{CourseRepository, MongoCourseRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use submission_repository::{MongoSubmissionRepository, SubmissionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

use std::sync::Arc;

use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
};

/// One handle per collection, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub classes: Arc<dyn ClassRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            classes: Arc::new(MongoClassRepository::new(db)),
            courses: Arc::new(MongoCourseRepository::new(db)),
            quizzes: Arc::new(MongoQuizRepository::new(db)),
            submissions: Arc::new(MongoSubmissionRepository::new(db)),
            attendance: Arc::new(MongoAttendanceRepository::new(db)),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.users.ensure_indexes().await?;
        self.classes.ensure_indexes().await?;
        self.courses.ensure_indexes().await?;
        self.quizzes.ensure_indexes().await?;
        self.submissions.ensure_indexes().await?;
        self.attendance.ensure_indexes().await?;
        Ok(())
    }
}

const DUPLICATE_KEY_CODE: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

/// Maps a failed insert, turning unique-index violations into `AlreadyExists`.
pub(crate) fn insert_error(err: mongodb::error::Error, what: String) -> AppError {
    if is_duplicate_key(&err) {
        AppError::AlreadyExists(what)
    } else {
        err.into()
    }
}

pub(crate) async fn ensure_unique_id_index<T>(collection: &Collection<T>) -> AppResult<()>
where
    T: Send + Sync,
{
    let id_index = IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name("id_unique".to_string())
                .build(),
        )
        .build();

    collection.create_index(id_index).await?;
    Ok(())
}

pub(crate) fn named_index(keys: mongodb::bson::Document, name: &str, unique: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(unique)
                .name(name.to_string())
                .build(),
        )
        .build()
}
