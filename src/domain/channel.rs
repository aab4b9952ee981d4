//! Root of the content tree handed to the publisher.
//!
//! The channel is written as a single JSON document that the upload harness
//! reads back.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::file::{content_id, domain_namespace};
use super::node::{ContentNode, NodeKind};

/// Channel-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelInfo {
    pub title: String,

    /// Domain that owns the content; seeds every content id
    pub source_domain: String,

    pub source_id: String,

    pub language: String,

    /// Thumbnail URL
    pub thumbnail: String,

    pub description: String,
}

impl Default for ChannelInfo {
    fn default() -> Self {
        Self {
            title: "Canal de AIEP".to_string(),
            source_domain: "www.aiep.cl".to_string(),
            source_id: "aiep".to_string(),
            language: "es".to_string(),
            thumbnail: "https://www.aiep.cl/img/logo-400x140.png".to_string(),
            description: "Cursos preparados por AIEP  (Chile)".to_string(),
        }
    }
}

impl ChannelInfo {
    /// Namespace used to mint content ids
    pub fn namespace(&self) -> Uuid {
        domain_namespace(&self.source_domain)
    }

    /// Stable id of the channel itself
    pub fn channel_id(&self) -> Uuid {
        content_id(&self.namespace(), &self.source_id)
    }
}

/// A complete channel tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Document format version
    pub version: u32,

    pub info: ChannelInfo,

    pub channel_id: Uuid,

    /// When the tree was assembled
    pub built_at: DateTime<Utc>,

    /// Course topics
    pub children: Vec<ContentNode>,
}

impl Channel {
    /// Create an empty channel
    pub fn new(info: ChannelInfo) -> Self {
        Self {
            version: 1,
            channel_id: info.channel_id(),
            info,
            built_at: Utc::now(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: ContentNode) {
        self.children.push(child);
    }

    /// Load a channel from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read channel: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse channel JSON")
    }

    /// Write the channel as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write channel: {}", path.display()))?;

        Ok(())
    }

    /// Visit every node depth-first; depth 0 is a course
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a ContentNode, usize)) {
        fn descend<'a>(
            node: &'a ContentNode,
            depth: usize,
            visit: &mut impl FnMut(&'a ContentNode, usize),
        ) {
            visit(node, depth);
            for child in node.children() {
                descend(child, depth + 1, visit);
            }
        }

        for child in &self.children {
            descend(child, 0, &mut visit);
        }
    }

    /// Find a node by source id
    pub fn find(&self, source_id: &str) -> Option<&ContentNode> {
        let mut found = None;
        self.walk(|node, _| {
            if found.is_none() && node.source_id() == source_id {
                found = Some(node);
            }
        });
        found
    }

    /// Node and question counts
    pub fn stats(&self) -> ChannelStats {
        let mut stats = ChannelStats::default();
        self.walk(|node, _| {
            *stats.nodes.entry(node.kind()).or_insert(0) += 1;
            if let ContentNode::Exercise(exercise) = node {
                stats.questions += exercise.questions.len();
            }
        });
        stats
    }

    /// Number of courses
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Summary of a built channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub nodes: BTreeMap<NodeKind, usize>,
    pub questions: usize,
}

impl ChannelStats {
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.nodes.values().sum()
    }
}
