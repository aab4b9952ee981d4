//! Configuration for coursechef.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of the resolved config)
//! 2. Environment variables (COURSECHEF_BASE_PATH, COURSECHEF_SORT_ORDER)
//! 3. Config file (--config, else .coursechef/config.yaml, else the user config dir)
//! 4. Defaults (the AIEP channel)
//!
//! Config file discovery:
//! - Searches current directory and parents for .coursechef/config.yaml
//! - Falls back to <config_dir>/coursechef/config.yaml
//! - A relative base_path is resolved against the project root (the parent of
//!   .coursechef/) or, for other files, against the file's directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::convert::{
    BuildSettings, HighlightMode, InvalidQuestionPolicy, QuestionSettings, SortOrder,
};
use crate::domain::{ChannelInfo, ExerciseData, License};

/// Default course directory, relative to the working directory
pub const DEFAULT_BASE_PATH: &str = "./AIEPOneDrive";

/// Default author of generated exercises
pub const DEFAULT_AUTHOR: &str = "Equipo de AIEP";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub channel: ChannelInfo,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub questions: QuestionsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Directory holding one subdirectory per course
    pub base_path: Option<String>,
    /// Direction for course and unit ordering
    pub sort_order: Option<SortOrder>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionsConfig {
    pub highlight: Option<HighlightMode>,
    pub plain_xf_index: Option<u16>,
    pub on_invalid: Option<InvalidQuestionPolicy>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub channel: ChannelInfo,
    pub license: License,
    /// Absolute or working-directory-relative course directory
    pub base_path: PathBuf,
    pub sort_order: SortOrder,
    pub author: String,
    pub questions: QuestionSettings,
    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// The immutable settings handed to the channel builder
    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            namespace: self.channel.namespace(),
            language: self.channel.language.clone(),
            author: self.author.clone(),
            license: self.license.clone(),
            sort_order: self.sort_order,
            questions: self.questions,
            exercise: ExerciseData::default(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".coursechef").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Per-user config file, if present
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("coursechef").join("config.yaml");
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Directory that relative paths in a config file are resolved against
fn config_base_dir(config_path: &Path) -> PathBuf {
    let parent = config_path.parent().unwrap_or(Path::new("."));
    if parent.file_name().is_some_and(|name| name == ".coursechef") {
        parent.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// Resolve a path that may be relative to the config file's base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge a parsed config file and the environment into a resolved config
fn resolve(
    file: Option<(ConfigFile, PathBuf)>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let (config, config_file) = match file {
        Some((config, path)) => (Some(config), Some(path)),
        None => (None, None),
    };

    let channel = config
        .as_ref()
        .map(|c| c.channel.clone())
        .unwrap_or_default();

    let license = config
        .as_ref()
        .and_then(|c| c.license.clone())
        .unwrap_or_default();
    license.validate().context("Invalid license in configuration")?;

    let base_path = if let Some(env_path) = env("COURSECHEF_BASE_PATH") {
        PathBuf::from(env_path)
    } else if let (Some(path_str), Some(path)) = (
        config.as_ref().and_then(|c| c.content.base_path.as_deref()),
        config_file.as_ref(),
    ) {
        resolve_path(&config_base_dir(path), path_str)
    } else {
        PathBuf::from(DEFAULT_BASE_PATH)
    };

    let sort_order = if let Some(env_order) = env("COURSECHEF_SORT_ORDER") {
        env_order
            .parse()
            .context("Invalid COURSECHEF_SORT_ORDER")?
    } else {
        config
            .as_ref()
            .and_then(|c| c.content.sort_order)
            .unwrap_or_default()
    };

    let author = config
        .as_ref()
        .and_then(|c| c.content.author.clone())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let defaults = QuestionSettings::default();
    let questions = config
        .as_ref()
        .map(|c| QuestionSettings {
            highlight: c.questions.highlight.unwrap_or(defaults.highlight),
            plain_xf_index: c
                .questions
                .plain_xf_index
                .unwrap_or(defaults.plain_xf_index),
            on_invalid: c.questions.on_invalid.unwrap_or(defaults.on_invalid),
        })
        .unwrap_or(defaults);

    Ok(ResolvedConfig {
        channel,
        license,
        base_path,
        sort_order,
        author,
        questions,
        config_file,
    })
}

/// Load configuration from all sources
///
/// `explicit` is a config file named on the command line; it must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file().or_else(user_config_file),
    };

    let file = match config_path {
        Some(path) => Some((load_config_file(&path)?, path)),
        None => None,
    };

    resolve(file, |key| std::env::var(key).ok())
}
