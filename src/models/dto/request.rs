use async_graphql::InputObject;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{
    AttendanceStatus, QuizQuestionType, QuizStatus, UserRole, UserStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRoleQuery {
    pub uid: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub uid: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl UserListQuery {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[serde(default)]
    pub course_ids: Vec<String>,

    #[serde(default)]
    pub student_ids: Vec<String>,

    #[serde(default)]
    pub teacher_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub teacher_ids: Option<Vec<String>>,
}

/// Body of the add-member endpoints (`/courses`, `/students`).
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRequest {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub teacher_id: Option<String>,

    #[serde(default)]
    pub class_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizOptionInput {
    #[validate(length(min = 1, max = 500))]
    pub text: String,

    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizQuestionInput {
    /// Id of an existing question being edited; new questions omit it.
    #[serde(default)]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,

    pub question_type: QuizQuestionType,

    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<QuizOptionInput>,

    #[validate(range(min = 0, max = 100))]
    pub points: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub course_id: String,

    #[serde(default)]
    pub class_ids: Vec<String>,

    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Vec<QuizQuestionInput>,

    #[validate(range(min = 1, max = 10))]
    pub attempt_limit: Option<i16>,

    pub status: Option<QuizStatus>,

    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub class_ids: Option<Vec<String>>,

    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Option<Vec<QuizQuestionInput>>,

    #[validate(range(min = 1, max = 10))]
    pub attempt_limit: Option<i16>,

    pub status: Option<QuizStatus>,

    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct AnswerInput {
    pub question_id: String,

    #[serde(default)]
    #[graphql(default)]
    pub selected_option_ids: Vec<String>,

    #[validate(length(max = 10000))]
    pub text_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SubmitQuizRequest {
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct AnswerMarkInput {
    pub question_id: String,

    #[validate(range(min = 0))]
    pub points_awarded: i32,

    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct EvaluateSubmissionRequest {
    #[validate(nested)]
    pub marks: Vec<AnswerMarkInput>,

    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct AttendanceEntryInput {
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct MarkAttendanceRequest {
    pub class_id: String,
    pub course_id: Option<String>,
    pub date: NaiveDate,

    #[validate(length(min = 1))]
    pub entries: Vec<AttendanceEntryInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceQuery {
    pub class_id: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSummaryQuery {
    pub class_id: Option<String>,
}
