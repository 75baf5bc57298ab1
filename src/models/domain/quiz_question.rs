use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub question_type: QuizQuestionType,
    #[serde(default)]
    pub options: Vec<QuizQuestionOption>,
    pub points: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuizQuestionOption {
    pub id: String,
    pub text: String,
    pub correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum QuizQuestionType {
    Single, // exactly one correct option
    Multi,  // one or more correct options
    Bool,   // true/false
    Text,   // free text, marked by a teacher
}

impl QuizQuestionType {
    pub fn is_auto_graded(&self) -> bool {
        !matches!(self, QuizQuestionType::Text)
    }
}

impl QuizQuestion {
    pub fn correct_option_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|opt| opt.correct)
            .map(|opt| opt.id.as_str())
            .collect()
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == option_id)
    }

    /// Checks that the options agree with the question type.
    pub fn validate_shape(&self) -> AppResult<()> {
        let correct = self.options.iter().filter(|opt| opt.correct).count();
        let invalid = |reason: &str| {
            Err(AppError::ValidationError(format!(
                "Question '{}' {}",
                self.prompt, reason
            )))
        };

        if self.points < 0 {
            return invalid("cannot have negative points");
        }

        match self.question_type {
            QuizQuestionType::Text => {
                if !self.options.is_empty() {
                    return invalid("is a text question and cannot have options");
                }
            }
            QuizQuestionType::Bool => {
                if self.options.len() != 2 {
                    return invalid("must have exactly two options");
                }
                if correct != 1 {
                    return invalid("must have exactly one correct option");
                }
            }
            QuizQuestionType::Single => {
                if self.options.len() < 2 {
                    return invalid("must have at least two options");
                }
                if correct != 1 {
                    return invalid("must have exactly one correct option");
                }
            }
            QuizQuestionType::Multi => {
                if self.options.len() < 2 {
                    return invalid("must have at least two options");
                }
                if correct == 0 {
                    return invalid("must have at least one correct option");
                }
            }
        }

        Ok(())
    }
}
