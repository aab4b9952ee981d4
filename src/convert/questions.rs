//! Quiz extraction from a spreadsheet.
//!
//! The quiz template stores one question per block in column A:
//!
//! ```text
//! row  A
//! 0    ¿Cuál es la capital de Chile?      <- question
//! 1    Lima                               <- answer (plain)
//! 2    Santiago                           <- answer (highlighted = correct)
//! 3                                       <- blank row closes the block
//! 4    ¿...?                              <- next question
//! ```

use std::path::Path;

use tracing::debug;

use super::settings::{HighlightMode, QuestionSettings};
use crate::domain::Question;
use crate::spreadsheet::{Sheet, Workbook, WorkbookError};

/// Parse every question of the first sheet of an `.xls` file
pub fn parse_questions(
    path: &Path,
    settings: &QuestionSettings,
) -> Result<Vec<Question>, WorkbookError> {
    let workbook = Workbook::open(path)?;
    let sheet = workbook.first_sheet()?;
    if sheet.nrows() == 0 {
        return Err(WorkbookError::Empty);
    }

    Ok(questions_from_sheet(&workbook, sheet, settings))
}

/// Whether a cell with this XF index marks the correct answer
pub fn is_highlighted(workbook: &Workbook, xf: u16, settings: &QuestionSettings) -> bool {
    match settings.highlight {
        HighlightMode::FillPattern => match workbook.format(xf) {
            Some(format) => format.is_filled(),
            None => xf != settings.plain_xf_index,
        },
        HighlightMode::XfIndex => xf != settings.plain_xf_index,
    }
}

/// A question whose block has not been closed yet
struct OpenQuestion {
    row: usize,
    text: String,
    answers: Vec<String>,
    correct: String,
}

impl OpenQuestion {
    fn finish(self) -> Question {
        Question::new(self.row, self.text, self.answers, self.correct)
    }
}

/// Walk column A of `sheet` and rebuild the question blocks
///
/// A row counts as blank when its text is empty after trimming, so a
/// whitespace-only row closes a block. The quiz template itself only treats
/// truly empty cells as separators and would read such a row as an answer.
///
/// Questions without answers or without a highlighted answer are returned
/// as-is; callers decide whether to publish them.
pub fn questions_from_sheet(
    workbook: &Workbook,
    sheet: &Sheet,
    settings: &QuestionSettings,
) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut open: Option<OpenQuestion> = None;

    for row in 0..sheet.nrows() {
        let text = sheet.text(row, 0);
        let blank = text.trim().is_empty();

        match open.take() {
            None => {
                if !blank {
                    open = Some(OpenQuestion {
                        row,
                        text,
                        answers: Vec::new(),
                        correct: String::new(),
                    });
                }
            }
            Some(question) if blank => questions.push(question.finish()),
            Some(mut question) => {
                let highlighted = sheet
                    .xf(row, 0)
                    .is_some_and(|xf| is_highlighted(workbook, xf, settings));
                if highlighted {
                    if !question.correct.is_empty() {
                        debug!(row, "Several answers highlighted, keeping the last one");
                    }
                    question.correct = text.clone();
                }
                question.answers.push(text);
                open = Some(question);
            }
        }
    }

    // No trailing blank row after the last block
    if let Some(question) = open {
        questions.push(question.finish());
    }

    questions
}
