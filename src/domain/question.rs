//! Single-select questions and exercise completion rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of positional question identifiers
pub const QUESTION_ID_PREFIX: &str = "ejemplo_Q";

/// A multiple-choice question with exactly one correct answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Positional identifier (prefix + first row index)
    pub id: String,

    /// Question text
    pub question: String,

    /// Candidate answers in sheet order
    pub all_answers: Vec<String>,

    /// Text of the correct answer (empty when none was highlighted)
    pub correct_answer: String,
}

/// Why a question cannot be published as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("question text is empty")]
    EmptyText,

    #[error("question has no answers")]
    NoAnswers,

    #[error("no answer is marked correct")]
    NoCorrectAnswer,

    #[error("correct answer is not one of the candidates")]
    CorrectAnswerNotListed,
}

impl Question {
    /// Create a question whose id is derived from the row it starts on
    pub fn new(
        row: usize,
        question: impl Into<String>,
        all_answers: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{}{}", QUESTION_ID_PREFIX, row),
            question: question.into(),
            all_answers,
            correct_answer: correct_answer.into(),
        }
    }

    /// Check the single-select invariant
    pub fn validate(&self) -> Result<(), QuestionDefect> {
        if self.question.trim().is_empty() {
            return Err(QuestionDefect::EmptyText);
        }
        if self.all_answers.is_empty() {
            return Err(QuestionDefect::NoAnswers);
        }
        if self.correct_answer.is_empty() {
            return Err(QuestionDefect::NoCorrectAnswer);
        }
        if !self.all_answers.contains(&self.correct_answer) {
            return Err(QuestionDefect::CorrectAnswerNotListed);
        }
        Ok(())
    }
}

/// Completion policy for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasteryModel {
    /// Learner must get `m` of the last `n` questions right
    #[serde(rename = "m_of_n")]
    MOfN,
}

/// Exercise settings sent alongside the questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseData {
    pub mastery_model: MasteryModel,
    pub m: u32,
    pub n: u32,

    /// Show questions in random order on each attempt
    pub randomize: bool,
}

impl Default for ExerciseData {
    /// Two out of three correct, shuffled
    fn default() -> Self {
        Self {
            mastery_model: MasteryModel::MOfN,
            m: 2,
            n: 3,
            randomize: true,
        }
    }
}
