use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{require_owner_or_admin, require_role, require_staff, Claims},
    db::CollectionName,
    errors::{AppError, AppResult},
    models::{
        domain::{ids::generate_id, Submission, SubmissionAnswer, SubmissionStatus, UserRole},
        dto::request::{EvaluateSubmissionRequest, SubmitQuizRequest},
    },
    repositories::Repositories,
    services::{
        associations::student_audience, grading::grade_answers, realtime::RealtimeService,
    },
};

pub struct SubmissionService {
    repos: Repositories,
    realtime: Arc<RealtimeService>,
}

impl SubmissionService {
    pub fn new(repos: Repositories, realtime: Arc<RealtimeService>) -> Self {
        Self { repos, realtime }
    }

    pub async fn submit(
        &self,
        actor: &Claims,
        quiz_id: &str,
        request: SubmitQuizRequest,
    ) -> AppResult<Submission> {
        require_role(actor, UserRole::Student)?;
        request.validate()?;

        let quiz = self
            .repos
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        let now = Utc::now();
        if !quiz.accepts_attempts_at(now) {
            let reason = if quiz.due_at.map(|due| now > due).unwrap_or(false) {
                "is past its due date"
            } else {
                "is not open for attempts"
            };
            return Err(AppError::BadRequest(format!("Quiz '{}' {}", quiz_id, reason)));
        }

        let audience = student_audience(self.repos.classes.as_ref(), &actor.sub).await?;
        if !quiz.is_visible_to(&audience.class_ids, &audience.course_ids) {
            return Err(AppError::Forbidden(format!(
                "Quiz '{}' is not assigned to any of your classes",
                quiz_id
            )));
        }

        let previous = self
            .repos
            .submissions
            .count_student_attempts(&actor.sub, quiz_id)
            .await?;
        if previous >= quiz.attempt_limit.max(0) as usize {
            return Err(AppError::BadRequest(format!(
                "Attempt limit of {} reached for quiz '{}'",
                quiz.attempt_limit, quiz_id
            )));
        }

        let answers = grade_answers(&quiz, &request.answers)?;
        let auto_score: i32 = answers.iter().filter_map(|a| a.points_awarded).sum();
        let fully_graded = !quiz.needs_manual_review();

        let submission = Submission {
            id: generate_id(),
            quiz_id: quiz.id.clone(),
            student_id: actor.sub.clone(),
            course_id: quiz.course_id.clone(),
            attempt_number: (previous + 1) as i16,
            answers,
            status: if fully_graded {
                SubmissionStatus::Evaluated
            } else {
                SubmissionStatus::Submitted
            },
            auto_score,
            score: fully_graded.then_some(auto_score),
            total_possible: quiz.total_points(),
            feedback: None,
            evaluated_by: None,
            submitted_at: now,
            evaluated_at: fully_graded.then_some(now),
        };

        let created = self.repos.submissions.create(submission).await?;
        log::info!(
            "Student '{}' submitted attempt {} of quiz '{}' ({}/{})",
            actor.sub,
            created.attempt_number,
            quiz_id,
            created.auto_score,
            created.total_possible
        );
        self.realtime.refresh(CollectionName::Submissions).await;
        Ok(created)
    }

    /// Applies per-question marks. Concurrent evaluations overwrite each other.
    pub async fn evaluate(
        &self,
        actor: &Claims,
        submission_id: &str,
        request: EvaluateSubmissionRequest,
    ) -> AppResult<Submission> {
        require_staff(actor)?;
        request.validate()?;

        let mut submission = self.get(submission_id).await?;
        let quiz = self
            .repos
            .quizzes
            .find_by_id(&submission.quiz_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Quiz with id '{}' not found", submission.quiz_id))
            })?;
        require_owner_or_admin(actor, &quiz.created_by)?;

        for mark in &request.marks {
            let question = quiz.question(&mark.question_id).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Question '{}' is not part of this quiz",
                    mark.question_id
                ))
            })?;

            if mark.points_awarded > question.points {
                return Err(AppError::ValidationError(format!(
                    "Question '{}' is worth at most {} points",
                    question.id, question.points
                )));
            }

            let is_correct = mark
                .is_correct
                .unwrap_or(mark.points_awarded == question.points);
            match submission.answer_mut(&mark.question_id) {
                Some(answer) => {
                    answer.points_awarded = Some(mark.points_awarded);
                    answer.is_correct = Some(is_correct);
                }
                None => submission.answers.push(SubmissionAnswer {
                    question_id: mark.question_id.clone(),
                    selected_option_ids: Vec::new(),
                    text_answer: None,
                    is_correct: Some(is_correct),
                    points_awarded: Some(mark.points_awarded),
                }),
            }
        }

        submission.score = Some(submission.awarded_points());
        submission.status = SubmissionStatus::Evaluated;
        submission.evaluated_by = Some(actor.sub.clone());
        submission.evaluated_at = Some(Utc::now());
        if request.feedback.is_some() {
            submission.feedback = request.feedback;
        }

        let updated = self.repos.submissions.update(submission).await?;
        log::info!(
            "Submission '{}' evaluated by '{}': {:?}/{}",
            updated.id,
            actor.sub,
            updated.score,
            updated.total_possible
        );
        self.realtime.refresh(CollectionName::Submissions).await;
        Ok(updated)
    }

    async fn get(&self, id: &str) -> AppResult<Submission> {
        self.repos
            .submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission with id '{}' not found", id)))
    }

    /// Students read their own submissions, teachers those of their quizzes.
    pub async fn get_submission(&self, actor: &Claims, id: &str) -> AppResult<Submission> {
        let submission = self.get(id).await?;

        match actor.role {
            UserRole::Student => require_owner_or_admin(actor, &submission.student_id)?,
            _ => {
                require_staff(actor)?;
                if actor.role == UserRole::Teacher {
                    let quiz = self.repos.quizzes.find_by_id(&submission.quiz_id).await?;
                    let owner = quiz.map(|q| q.created_by).unwrap_or_default();
                    require_owner_or_admin(actor, &owner)?;
                }
            }
        }

        Ok(submission)
    }

    pub async fn submissions_for_quiz(
        &self,
        actor: &Claims,
        quiz_id: &str,
    ) -> AppResult<Vec<Submission>> {
        require_staff(actor)?;
        let quiz = self
            .repos
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;
        require_owner_or_admin(actor, &quiz.created_by)?;

        self.repos.submissions.find_by_quiz(quiz_id).await
    }

    pub async fn submissions_for_student(&self, student_id: &str) -> AppResult<Vec<Submission>> {
        self.repos.submissions.find_by_student(student_id).await
    }

    pub async fn list_all(&self, actor: &Claims) -> AppResult<Vec<Submission>> {
        crate::auth::require_admin(actor)?;
        self.repos.submissions.find_all().await
    }
}
