use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{ids::generate_id, quiz_question::QuizQuestion};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub course_id: String,
    #[serde(default)]
    pub class_ids: Vec<String>,
    pub created_by: String, // teacher user id
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    pub attempt_limit: i16,
    pub status: QuizStatus,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Draft,
    Published,
    Closed,
}

impl Quiz {
    pub fn new(title: &str, course_id: &str, created_by: &str, questions: Vec<QuizQuestion>) -> Self {
        Quiz {
            id: generate_id(),
            title: title.to_string(),
            description: None,
            course_id: course_id.to_string(),
            class_ids: Vec::new(),
            created_by: created_by.to_string(),
            questions,
            attempt_limit: 1,
            status: QuizStatus::Published,
            due_at: None,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn total_points(&self) -> i32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn needs_manual_review(&self) -> bool {
        self.questions
            .iter()
            .any(|q| !q.question_type.is_auto_graded())
    }

    /// Whether a student may start an attempt at `now`.
    pub fn accepts_attempts_at(&self, now: DateTime<Utc>) -> bool {
        self.status == QuizStatus::Published && self.due_at.map(|due| now <= due).unwrap_or(true)
    }

    /// A quiz reaches a student through a shared class, or through its course
    /// when it names no classes of its own.
    pub fn is_visible_to(&self, student_class_ids: &[String], student_course_ids: &[String]) -> bool {
        if self.class_ids.is_empty() {
            return student_course_ids.iter().any(|id| id == &self.course_id);
        }
        self.class_ids
            .iter()
            .any(|id| student_class_ids.contains(id))
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::quiz_question::{QuizQuestionOption, QuizQuestionType};
    use chrono::Duration;

    fn sample_quiz() -> Quiz {
        let questions = vec![
            QuizQuestion {
                id: "q1".to_string(),
                prompt: "2 + 2".to_string(),
                question_type: QuizQuestionType::Single,
                options: vec![
                    QuizQuestionOption { id: "a".to_string(), text: "4".to_string(), correct: true },
                    QuizQuestionOption { id: "b".to_string(), text: "5".to_string(), correct: false },
                ],
                points: 2,
            },
            QuizQuestion {
                id: "q2".to_string(),
                prompt: "Explain".to_string(),
                question_type: QuizQuestionType::Text,
                options: vec![],
                points: 3,
            },
        ];
        Quiz::new("Arithmetic", "crs-1", "tch-1", questions)
    }

    #[test]
    fn total_points_sums_questions() {
        let quiz = sample_quiz();
        assert_eq!(quiz.total_points(), 5);
        assert!(quiz.needs_manual_review());
        assert!(quiz.question("q2").is_some());
    }

    #[test]
    fn past_due_quiz_rejects_attempts() {
        let mut quiz = sample_quiz();
        let now = Utc::now();
        quiz.due_at = Some(now - Duration::hours(1));
        assert!(!quiz.accepts_attempts_at(now));

        quiz.due_at = Some(now + Duration::hours(1));
        assert!(quiz.accepts_attempts_at(now));

        quiz.status = QuizStatus::Draft;
        assert!(!quiz.accepts_attempts_at(now));
    }

    #[test]
    fn visibility_prefers_explicit_classes() {
        let mut quiz = sample_quiz();
        let classes = vec!["cls-1".to_string()];
        let courses = vec!["crs-1".to_string()];

        assert!(quiz.is_visible_to(&[], &courses));

        quiz.class_ids = vec!["cls-2".to_string()];
        assert!(!quiz.is_visible_to(&classes, &courses));

        quiz.class_ids.push("cls-1".to_string());
        assert!(quiz.is_visible_to(&classes, &[]));
    }
}
