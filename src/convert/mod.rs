//! Conversion of a course directory into a channel tree.
//!
//! Data flows bottom-up:
//! - `tree`: walks `base/course/unit/` and assembles topics
//! - `classify`: turns one file into one node
//! - `title`, `questions`, `package`: helpers used by the classifier
//!
//! Everything runs on the calling thread; a build either produces a whole
//! channel or fails on the first unreadable input.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ResolvedConfig;
use crate::domain::{ChannelInfo, QuestionDefect};
use crate::spreadsheet::WorkbookError;

pub mod classify;
pub mod package;
pub mod questions;
pub mod settings;
pub mod title;
pub mod tree;

// Re-export commonly used items
pub use package::{find_embedded_video, PackageError};
pub use questions::{parse_questions, questions_from_sheet};
pub use settings::{
    BuildSettings, HighlightMode, InvalidQuestionPolicy, QuestionSettings, SortOrder,
};
pub use title::normalize_title;

/// Errors that abort a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: WorkbookError,
    },

    #[error("Unreadable package {path}: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: PackageError,
    },

    #[error("Invalid question {id} in {path}: {defect}")]
    InvalidQuestion {
        path: PathBuf,
        id: String,
        defect: QuestionDefect,
    },
}

/// Builds channel trees from course directories
///
/// Holds the channel metadata and build settings; every node it creates gets
/// its language, license and ids from here.
#[derive(Debug, Clone)]
pub struct ChannelBuilder {
    info: ChannelInfo,
    settings: BuildSettings,
}

impl ChannelBuilder {
    pub fn new(info: ChannelInfo, settings: BuildSettings) -> Self {
        Self { info, settings }
    }

    /// Builder for a resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.channel.clone(), config.build_settings())
    }

    pub fn info(&self) -> &ChannelInfo {
        &self.info
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }
}
