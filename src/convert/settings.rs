//! Settings the converter is built with.
//!
//! `BuildSettings` is assembled once from the resolved configuration and
//! handed to [`ChannelBuilder`](super::ChannelBuilder); nothing in the
//! converter reads configuration from anywhere else.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ExerciseData, License};

/// Direction in which course and unit directories are visited
///
/// Both directions are found in deployed channels; pick one explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "asc")]
    Ascending,

    #[serde(alias = "desc")]
    Descending,
}

impl SortOrder {
    /// Sort directory names in this direction
    pub fn sort(&self, names: &mut [String]) {
        names.sort_by(|a, b| self.compare(a, b));
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            _ => anyhow::bail!("Unknown sort order: {}", s),
        }
    }
}

/// How a correct answer is recognised in the quiz sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// Any XF index other than the template's plain one
    ///
    /// Existing quiz workbooks are graded this way, including answers whose
    /// non-plain format carries no visible fill.
    #[default]
    XfIndex,

    /// The cell's format has a fill; falls back to `XfIndex` for cells whose
    /// format is missing from the workbook
    FillPattern,
}

/// What to do with a question that breaks the single-select invariant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidQuestionPolicy {
    /// Fail the build
    #[default]
    Reject,

    /// Publish it unchanged and log a warning
    Keep,
}

/// Quiz sheet interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSettings {
    pub highlight: HighlightMode,

    /// XF index the source template uses for unhighlighted answers
    pub plain_xf_index: u16,

    pub on_invalid: InvalidQuestionPolicy,
}

/// XF index of plain answer cells in the original quiz template
pub const TEMPLATE_PLAIN_XF_INDEX: u16 = 21;

impl Default for QuestionSettings {
    fn default() -> Self {
        Self {
            highlight: HighlightMode::default(),
            plain_xf_index: TEMPLATE_PLAIN_XF_INDEX,
            on_invalid: InvalidQuestionPolicy::default(),
        }
    }
}

/// Everything node construction needs
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    /// Namespace for content ids (derived from the channel's source domain)
    pub namespace: Uuid,

    /// Language tag stamped on every node and file
    pub language: String,

    /// Author of exercises
    pub author: String,

    pub license: License,

    pub sort_order: SortOrder,

    pub questions: QuestionSettings,

    pub exercise: ExerciseData,
}
