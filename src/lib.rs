//! coursechef - Course directory to channel tree converter
//!
//! Turns a directory of course materials into the content tree of a learning
//! channel, ready to hand to a publisher.
//!
//! # Layout
//!
//! ```text
//! <base>/<course>/<unit>/<files>
//! ```
//!
//! - `.pdf` files become documents
//! - `.h5p` packages become interactive packages, or videos when they bundle
//!   a single clip
//! - `.xls` quiz templates become exercises
//!
//! # Modules
//!
//! - `domain`: Data structures (Channel, ContentNode, Question, License)
//! - `spreadsheet`: Legacy `.xls` reader with cell formats
//! - `convert`: Directory walking, classification and question parsing
//! - `config`: Config file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build the channel from the configured course directory
//! coursechef build -o channel.json
//!
//! # Print the tree of a built channel
//! coursechef show channel.json
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod domain;
pub mod spreadsheet;

// Re-export main types at crate root for convenience
pub use config::{load_config, ResolvedConfig};
pub use convert::{BuildError, BuildSettings, ChannelBuilder, SortOrder};
pub use domain::{Channel, ChannelInfo, ContentNode, License, NodeKind, Question};
pub use spreadsheet::{Workbook, WorkbookError};
