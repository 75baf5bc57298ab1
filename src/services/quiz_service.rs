use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_owner_or_admin, require_staff, Claims},
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{Quiz, QuizQuestion, QuizStatus, UserRole},
        dto::{
            quiz_dto::QuizForTaking,
            request::{CreateQuizRequest, QuizQuestionInput, UpdateQuizRequest},
            response::DeleteResponse,
        },
    },
    repositories::Repositories,
    services::{
        associations::{dedup_ids, ensure_all_found, student_audience},
        realtime::RealtimeService,
    },
};

pub struct QuizService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

/// Edited questions keep their id so existing submissions can still be marked.
/// A supplied id must name one of `existing`, at most once.
fn build_questions(
    inputs: Vec<QuizQuestionInput>,
    existing: &[QuizQuestion],
) -> AppResult<Vec<QuizQuestion>> {
    let mut kept: Vec<&str> = Vec::new();
    for id in inputs.iter().filter_map(|q| q.id.as_deref()) {
        if !existing.iter().any(|q| q.id == id) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is not part of this quiz",
                id
            )));
        }
        if kept.contains(&id) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is listed more than once",
                id
            )));
        }
        kept.push(id);
    }

    let questions: Vec<QuizQuestion> = inputs.into_iter().map(QuizQuestion::from).collect();
    for question in &questions {
        question.validate_shape()?;
    }
    Ok(questions)
}

impl QuizService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    async fn ensure_classes_exist(&self, class_ids: &[String]) -> AppResult<()> {
        if class_ids.is_empty() {
            return Ok(());
        }
        let classes = self.repos.classes.find_by_ids(class_ids).await?;
        let found: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
        ensure_all_found(class_ids, &found, "Class")
    }

    pub async fn create_quiz(&self, actor: &Claims, request: CreateQuizRequest) -> AppResult<Quiz> {
        require_staff(actor)?;
        request.validate()?;

        self.repos
            .courses
            .find_by_id(&request.course_id)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Course with id '{}' does not exist",
                    request.course_id
                ))
            })?;

        let class_ids = dedup_ids(&request.class_ids);
        self.ensure_classes_exist(&class_ids).await?;

        let questions = build_questions(request.questions, &[])?;

        let mut quiz = Quiz::new(&request.title, &request.course_id, &actor.sub, questions);
        quiz.description = request.description;
        quiz.class_ids = class_ids;
        quiz.due_at = request.due_at;
        if let Some(limit) = request.attempt_limit {
            quiz.attempt_limit = limit;
        }
        if let Some(status) = request.status {
            quiz.status = status;
        }

        let created = self.repos.quizzes.create(quiz).await?;
        log::info!(
            "Quiz '{}' created by '{}' with {} questions",
            created.id,
            actor.sub,
            created.questions.len()
        );
        self.realtime.refresh(CollectionName::Quizzes).await;
        Ok(created)
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.repos
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    /// Full quiz, answers included, for its author or an admin.
    pub async fn get_quiz_for_staff(&self, actor: &Claims, id: &str) -> AppResult<Quiz> {
        let quiz = self.get_quiz(id).await?;
        require_owner_or_admin(actor, &quiz.created_by)?;
        Ok(quiz)
    }

    /// Admins see every quiz, teachers their own.
    pub async fn list_quizzes(&self, actor: &Claims) -> AppResult<Vec<Quiz>> {
        require_staff(actor)?;
        match actor.role {
            UserRole::Admin => self.repos.quizzes.find_all().await,
            _ => self.repos.quizzes.find_by_creator(&actor.sub).await,
        }
    }

    /// Published quizzes that reach the student through a class or course.
    pub async fn quizzes_for_student(&self, student_id: &str) -> AppResult<Vec<QuizForTaking>> {
        let audience = student_audience(self.repos.classes.as_ref(), student_id).await?;
        if audience.class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let quizzes = self
            .repos
            .quizzes
            .find_for_audience(&audience.class_ids, &audience.course_ids)
            .await?;

        Ok(quizzes
            .into_iter()
            .filter(|q| q.status == QuizStatus::Published)
            .filter(|q| q.is_visible_to(&audience.class_ids, &audience.course_ids))
            .map(QuizForTaking::from_quiz)
            .collect())
    }

    /// A quiz the student may see, or `NotFound` when it is hidden from them.
    pub async fn visible_quiz(&self, student_id: &str, quiz_id: &str) -> AppResult<Quiz> {
        let quiz = self.get_quiz(quiz_id).await?;
        let audience = student_audience(self.repos.classes.as_ref(), student_id).await?;

        if quiz.status != QuizStatus::Published
            || !quiz.is_visible_to(&audience.class_ids, &audience.course_ids)
        {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz_id
            )));
        }
        Ok(quiz)
    }

    pub async fn quiz_for_taking(&self, student_id: &str, quiz_id: &str) -> AppResult<QuizForTaking> {
        let quiz = self.visible_quiz(student_id, quiz_id).await?;
        Ok(QuizForTaking::from_quiz(quiz))
    }

    pub async fn update_quiz(
        &self,
        actor: &Claims,
        id: &str,
        request: UpdateQuizRequest,
    ) -> AppResult<Quiz> {
        request.validate()?;

        let mut quiz = self.get_quiz(id).await?;
        require_owner_or_admin(actor, &quiz.created_by)?;

        if let Some(title) = request.title {
            quiz.title = title;
        }
        if let Some(description) = request.description {
            quiz.description = Some(description);
        }
        if let Some(class_ids) = request.class_ids {
            let class_ids = dedup_ids(&class_ids);
            self.ensure_classes_exist(&class_ids).await?;
            quiz.class_ids = class_ids;
        }
        if let Some(questions) = request.questions {
            quiz.questions = build_questions(questions, &quiz.questions)?;
        }
        if let Some(limit) = request.attempt_limit {
            quiz.attempt_limit = limit;
        }
        if let Some(status) = request.status {
            quiz.status = status;
        }
        if let Some(due_at) = request.due_at {
            quiz.due_at = Some(due_at);
        }
        quiz.touch();

        let updated = self.repos.quizzes.update(quiz).await?;
        self.realtime.refresh(CollectionName::Quizzes).await;
        Ok(updated)
    }

    pub async fn delete_quiz(&self, actor: &Claims, id: &str) -> AppResult<DeleteResponse> {
        let quiz = self.get_quiz(id).await?;
        require_owner_or_admin(actor, &quiz.created_by)?;

        self.repos.quizzes.delete(id).await?;
        let removed = self.repos.submissions.delete_by_quiz(id).await?;
        log::info!("Deleted quiz '{}' and {} submissions", id, removed);

        self.realtime
            .refresh_all(&[CollectionName::Quizzes, CollectionName::Submissions])
            .await;

        Ok(DeleteResponse {
            message: format!("Quiz '{}' deleted", id),
        })
    }
}
