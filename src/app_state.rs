use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::{AppError, AppResult},
    repositories::Repositories,
    services::{
        AttendanceService, ClassService, CourseService, QuizService, RealtimeService,
        SubmissionService, UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub class_service: Arc<ClassService>,
    pub course_service: Arc<CourseService>,
    pub quiz_service: Arc<QuizService>,
    pub submission_service: Arc<SubmissionService>,
    pub attendance_service: Arc<AttendanceService>,
    pub realtime: Arc<RealtimeService>,
    pub jwt_service: Arc<JwtService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let repositories = Repositories::mongo(&db);
        repositories.ensure_indexes().await?;

        Ok(Self::from_repositories(config, repositories, Some(db)))
    }

    /// Wires services over the given repositories. `db` is only used for
    /// readiness checks.
    pub fn from_repositories(
        config: Config,
        repositories: Repositories,
        db: Option<Database>,
    ) -> Self {
        let realtime = Arc::new(RealtimeService::new(repositories.clone()));
        let jwt_service = Arc::new(JwtService::new(
            &config.session_secret,
            config.session_expiration_hours,
        ));

        Self {
            user_service: Arc::new(UserService::new(repositories.clone(), realtime.clone())),
            class_service: Arc::new(ClassService::new(repositories.clone(), realtime.clone())),
            course_service: Arc::new(CourseService::new(repositories.clone(), realtime.clone())),
            quiz_service: Arc::new(QuizService::new(repositories.clone(), realtime.clone())),
            submission_service: Arc::new(SubmissionService::new(
                repositories.clone(),
                realtime.clone(),
            )),
            attendance_service: Arc::new(AttendanceService::new(repositories, realtime.clone())),
            realtime,
            jwt_service,
            db,
            config: Arc::new(config),
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        match &self.db {
            Some(db) => db.health_check().await,
            None => Err(AppError::InternalError(
                "No database connection configured".to_string(),
            )),
        }
    }
}
