use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    ids::generate_id, Quiz, QuizQuestion, QuizQuestionOption, QuizQuestionType,
};
use crate::models::dto::request::QuizQuestionInput;

/// Student-facing view of a quiz: correct flags are stripped.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizForTaking {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub course_id: String,
    pub attempt_limit: i16,
    pub due_at: Option<DateTime<Utc>>,
    pub total_points: i32,
    pub questions: Vec<QuestionForTaking>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionForTaking {
    pub id: String,
    pub prompt: String,
    pub question_type: QuizQuestionType,
    pub options: Vec<OptionForTaking>,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct OptionForTaking {
    pub id: String,
    pub text: String,
}

impl QuizForTaking {
    pub fn from_quiz(quiz: Quiz) -> Self {
        let total_points = quiz.total_points();
        QuizForTaking {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            course_id: quiz.course_id,
            attempt_limit: quiz.attempt_limit,
            due_at: quiz.due_at,
            total_points,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| QuestionForTaking {
                    id: q.id,
                    prompt: q.prompt,
                    question_type: q.question_type,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| OptionForTaking { id: o.id, text: o.text })
                        .collect(),
                    points: q.points,
                })
                .collect(),
        }
    }
}

impl From<QuizQuestionInput> for QuizQuestion {
    fn from(input: QuizQuestionInput) -> Self {
        QuizQuestion {
            id: input.id.unwrap_or_else(generate_id),
            prompt: input.prompt,
            question_type: input.question_type,
            options: input
                .options
                .into_iter()
                .enumerate()
                .map(|(index, option)| QuizQuestionOption {
                    id: format!("opt{}", index + 1),
                    text: option.text,
                    correct: option.correct,
                })
                .collect(),
            points: input.points,
        }
    }
}
