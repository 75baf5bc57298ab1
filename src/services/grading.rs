use std::collections::HashSet;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Quiz, QuizQuestion, QuizQuestionType, SubmissionAnswer},
        dto::request::AnswerInput,
    },
};

/// Grade a choice question. Text questions are never auto-graded.
pub fn grade_question(question: &QuizQuestion, selected_option_ids: &[String]) -> Option<(bool, i32)> {
    let correct_option_ids = question.correct_option_ids();

    let is_correct = match question.question_type {
        QuizQuestionType::Single | QuizQuestionType::Bool => {
            // Exactly one option selected and it is the correct one
            selected_option_ids.len() == 1
                && correct_option_ids.len() == 1
                && selected_option_ids[0] == correct_option_ids[0]
        }
        QuizQuestionType::Multi => {
            // All correct options selected and no incorrect ones
            let has_all_correct = correct_option_ids
                .iter()
                .all(|id| selected_option_ids.iter().any(|s| s == id));
            let has_no_incorrect = selected_option_ids
                .iter()
                .all(|id| correct_option_ids.contains(&id.as_str()));
            !correct_option_ids.is_empty() && has_all_correct && has_no_incorrect
        }
        QuizQuestionType::Text => return None,
    };

    Some((is_correct, if is_correct { question.points } else { 0 }))
}

/// Turns submitted answers into graded answers covering every question of the
/// quiz, in question order. Questions left unanswered get an empty answer.
pub fn grade_answers(quiz: &Quiz, submitted: &[AnswerInput]) -> AppResult<Vec<SubmissionAnswer>> {
    let mut seen: HashSet<&str> = HashSet::new();

    for answer in submitted {
        let question = quiz.question(&answer.question_id).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Question '{}' is not part of this quiz",
                answer.question_id
            ))
        })?;

        if !seen.insert(answer.question_id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Question '{}' was answered more than once",
                answer.question_id
            )));
        }

        if let Some(foreign) = answer
            .selected_option_ids
            .iter()
            .find(|id| !question.has_option(id))
        {
            return Err(AppError::ValidationError(format!(
                "Option '{}' does not belong to question '{}'",
                foreign, answer.question_id
            )));
        }
    }

    let answers = quiz
        .questions
        .iter()
        .map(|question| {
            let input = submitted.iter().find(|a| a.question_id == question.id);
            let selected_option_ids = input
                .map(|a| a.selected_option_ids.clone())
                .unwrap_or_default();
            let text_answer = input.and_then(|a| a.text_answer.clone());
            let graded = grade_question(question, &selected_option_ids);

            SubmissionAnswer {
                question_id: question.id.clone(),
                selected_option_ids,
                text_answer,
                is_correct: graded.map(|(correct, _)| correct),
                points_awarded: graded.map(|(_, points)| points),
            }
        })
        .collect();

    Ok(answers)
}
