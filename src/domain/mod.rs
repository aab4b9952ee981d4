//! Domain types for the channel tree.
//!
//! This module contains the data handed to the publisher:
//! - Channel: the root, with channel-level metadata
//! - ContentNode: topics, documents, packages, videos and exercises
//! - Question: single-select questions of an exercise
//! - License and NodeFile: what every leaf carries

pub mod channel;
pub mod file;
pub mod license;
pub mod node;
pub mod question;

// Re-export commonly used types
pub use channel::{Channel, ChannelInfo, ChannelStats};
pub use file::{FilePreset, NodeFile};
pub use license::{License, LicenseError, LicenseKind};
pub use node::{ContentNode, ExerciseNode, NodeKind, NodeMeta, ResourceNode, TopicNode};
pub use question::{ExerciseData, MasteryModel, Question, QuestionDefect};
