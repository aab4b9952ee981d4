//! Command-line interface for coursechef.
//!
//! Provides commands for building a channel from a course directory,
//! inspecting a built channel, and checking single quiz or package files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::{load_config, ResolvedConfig};
use crate::convert::{find_embedded_video, parse_questions, ChannelBuilder, SortOrder};
use crate::domain::{Channel, NodeKind};

/// coursechef - Course directory to channel tree converter
#[derive(Parser, Debug)]
#[command(name = "coursechef")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to .coursechef/config.yaml, searched upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the channel tree from a course directory
    Build {
        /// Directory holding one subdirectory per course
        #[arg(short, long)]
        base_path: Option<PathBuf>,

        /// Order in which courses and units are visited
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,

        /// Where to write the channel JSON
        #[arg(short, long, default_value = "channel.json")]
        output: PathBuf,
    },

    /// Print the tree of a built channel
    Show {
        /// Channel JSON written by `build`
        path: PathBuf,
    },

    /// Parse the questions of a single quiz workbook
    Questions {
        /// `.xls` file
        path: PathBuf,
    },

    /// Check whether a package bundles a single video
    Inspect {
        /// `.h5p` file
        path: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Sort order for CLI (maps to SortOrder)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Ascending by name
    Asc,

    /// Descending by name
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Asc => SortOrder::Ascending,
            SortArg::Desc => SortOrder::Descending,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        match self.command {
            Commands::Build {
                base_path,
                sort,
                output,
            } => build_channel(config, base_path, sort, &output),
            Commands::Show { path } => show_channel(&path),
            Commands::Questions { path } => show_questions(&config, &path),
            Commands::Inspect { path } => inspect_package(&path),
            Commands::Config => show_config(&config),
        }
    }
}

/// Build the channel and write it as JSON
fn build_channel(
    mut config: ResolvedConfig,
    base_path: Option<PathBuf>,
    sort: Option<SortArg>,
    output: &Path,
) -> Result<()> {
    if let Some(path) = base_path {
        config.base_path = path;
    }
    if let Some(sort) = sort {
        config.sort_order = sort.into();
    }

    let builder = ChannelBuilder::from_config(&config);
    let channel = builder
        .build_channel(&config.base_path)
        .with_context(|| format!("Failed to build channel from {}", config.base_path.display()))?;

    channel.save(output)?;
    info!(output = %output.display(), "Channel written");

    print_stats(&channel);
    Ok(())
}

fn print_stats(channel: &Channel) {
    let stats = channel.stats();

    println!("Channel: {} ({})", channel.info.title, channel.channel_id);
    println!("Courses: {}", channel.len());
    println!("Nodes:   {}", stats.total());
    for kind in [
        NodeKind::Topic,
        NodeKind::Document,
        NodeKind::InteractivePackage,
        NodeKind::Video,
        NodeKind::Exercise,
    ] {
        println!("  {:<20} {}", format!("{}:", kind), stats.count(kind));
    }
    println!("Questions: {}", stats.questions);
}

/// Print a built channel as an indented tree
fn show_channel(path: &Path) -> Result<()> {
    let channel = Channel::load(path)?;

    println!("{} [{}]", channel.info.title, channel.built_at.format("%Y-%m-%d %H:%M"));
    channel.walk(|node, depth| {
        let indent = "  ".repeat(depth + 1);
        match node.kind() {
            NodeKind::Topic => println!("{}{}/", indent, node.title()),
            kind => println!("{}{} ({})", indent, node.title(), kind),
        }
    });

    Ok(())
}

/// Parse a quiz workbook and print its questions
fn show_questions(config: &ResolvedConfig, path: &Path) -> Result<()> {
    let questions = parse_questions(path, &config.questions)
        .with_context(|| format!("Failed to parse questions: {}", path.display()))?;

    if questions.is_empty() {
        println!("No questions found.");
        return Ok(());
    }

    for question in &questions {
        println!("{}: {}", question.id, question.question);
        for answer in &question.all_answers {
            let marker = if *answer == question.correct_answer { "*" } else { " " };
            println!("  {} {}", marker, answer);
        }
        if let Err(defect) = question.validate() {
            println!("  ! {}", defect);
        }
        println!();
    }

    println!("{} question(s)", questions.len());
    Ok(())
}

/// Report whether a package would be published as a video
fn inspect_package(path: &Path) -> Result<()> {
    let video = find_embedded_video(path)
        .with_context(|| format!("Failed to read package: {}", path.display()))?;

    match video {
        Some(video) => {
            println!("Embedded video: {}", video.display());
            println!("(extracted to a temporary directory; remove it when done)");
        }
        None => println!("No single embedded video; published as an interactive package"),
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Config file: {}", config.config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none - using defaults)".to_string()));
    println!();
    println!("Channel:");
    println!("  Title:         {}", config.channel.title);
    println!("  Source domain: {}", config.channel.source_domain);
    println!("  Source id:     {}", config.channel.source_id);
    println!("  Language:      {}", config.channel.language);
    println!("  Channel id:    {}", config.channel.channel_id());
    println!();
    println!("Content:");
    println!("  Base path:  {}", config.base_path.display());
    println!("  Sort order: {}", config.sort_order);
    println!("  Author:     {}", config.author);
    println!();
    println!("License:");
    println!("  Kind:             {}", config.license.kind);
    println!("  Copyright holder: {}", config.license.copyright_holder);
    println!("  Description:      {}", config.license.description);
    println!();
    println!("Questions:");
    println!("  Highlight:      {:?}", config.questions.highlight);
    println!("  Plain XF index: {}", config.questions.plain_xf_index);
    println!("  On invalid:     {:?}", config.questions.on_invalid);

    Ok(())
}
