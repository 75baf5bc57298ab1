use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Submission {
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub course_id: String,
    pub attempt_number: i16,
    pub answers: Vec<SubmissionAnswer>,
    pub status: SubmissionStatus,
    pub auto_score: i32,
    pub score: Option<i32>,
    pub total_possible: i32,
    pub feedback: Option<String>,
    pub evaluated_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct SubmissionAnswer {
    pub question_id: String,
    #[serde(default)]
    pub selected_option_ids: Vec<String>,
    pub text_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub points_awarded: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Evaluated,
}

impl Submission {
    pub fn is_evaluated(&self) -> bool {
        self.status == SubmissionStatus::Evaluated
    }

    pub fn answer_mut(&mut self, question_id: &str) -> Option<&mut SubmissionAnswer> {
        self.answers.iter_mut().find(|a| a.question_id == question_id)
    }

    /// Sum of awarded points; ungraded answers count as zero.
    pub fn awarded_points(&self) -> i32 {
        self.answers.iter().filter_map(|a| a.points_awarded).sum()
    }
}
