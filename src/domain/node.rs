//! Content nodes of the channel tree.
//!
//! Every node is built exactly once by the converter and never mutated after
//! it has been attached to its parent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::file::{content_id, NodeFile};
use super::license::License;
use super::question::{ExerciseData, Question};

/// Fields shared by every node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Stable identifier derived from directory and file names
    pub source_id: String,

    /// UUIDv5 of `source_id` in the channel's domain namespace
    pub content_id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Language tag (e.g. "es")
    pub language: String,
}

impl NodeMeta {
    pub fn new(
        namespace: &Uuid,
        source_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let source_id = source_id.into();
        Self {
            content_id: content_id(namespace, &source_id),
            source_id,
            title: title.into(),
            description: description.into(),
            language: language.into(),
        }
    }
}

/// Kind of a node, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Topic,
    Document,
    InteractivePackage,
    Video,
    Exercise,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Topic => write!(f, "topic"),
            NodeKind::Document => write!(f, "document"),
            NodeKind::InteractivePackage => write!(f, "h5p"),
            NodeKind::Video => write!(f, "video"),
            NodeKind::Exercise => write!(f, "exercise"),
        }
    }
}

/// A node of the channel tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    Topic(TopicNode),
    Document(ResourceNode),
    InteractivePackage(ResourceNode),
    Video(ResourceNode),
    Exercise(ExerciseNode),
}

impl ContentNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ContentNode::Topic(_) => NodeKind::Topic,
            ContentNode::Document(_) => NodeKind::Document,
            ContentNode::InteractivePackage(_) => NodeKind::InteractivePackage,
            ContentNode::Video(_) => NodeKind::Video,
            ContentNode::Exercise(_) => NodeKind::Exercise,
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        match self {
            ContentNode::Topic(topic) => &topic.meta,
            ContentNode::Document(node)
            | ContentNode::InteractivePackage(node)
            | ContentNode::Video(node) => &node.meta,
            ContentNode::Exercise(exercise) => &exercise.meta,
        }
    }

    pub fn title(&self) -> &str {
        &self.meta().title
    }

    pub fn source_id(&self) -> &str {
        &self.meta().source_id
    }

    /// Child nodes (empty for leaves)
    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::Topic(topic) => &topic.children,
            _ => &[],
        }
    }

    /// Files attached to a leaf
    pub fn files(&self) -> &[NodeFile] {
        match self {
            ContentNode::Document(node)
            | ContentNode::InteractivePackage(node)
            | ContentNode::Video(node) => &node.files,
            _ => &[],
        }
    }
}

/// Folder-like node grouping other nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicNode {
    #[serde(flatten)]
    pub meta: NodeMeta,

    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl TopicNode {
    pub fn new(meta: NodeMeta) -> Self {
        Self {
            meta,
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: ContentNode) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Leaf node backed by one or more files (document, package, video)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    #[serde(flatten)]
    pub meta: NodeMeta,

    #[serde(default)]
    pub author: String,

    pub license: License,

    pub files: Vec<NodeFile>,
}

/// Quiz leaf node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseNode {
    #[serde(flatten)]
    pub meta: NodeMeta,

    #[serde(default)]
    pub author: String,

    pub license: License,

    pub exercise_data: ExerciseData,

    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::file::domain_namespace;

    fn meta(source_id: &str, title: &str) -> NodeMeta {
        NodeMeta::new(&domain_namespace("www.aiep.cl"), source_id, title, "", "es")
    }

    #[test]
    fn test_topic_children() {
        let mut topic = TopicNode::new(meta("Unidad 1_id", "Unidad 1"));
        assert!(topic.is_empty());

        topic.add_child(ContentNode::Exercise(ExerciseNode {
            meta: meta("Unidad 1/quiz.xls", "Ejercicios de Unidad 1"),
            author: "Equipo de AIEP".to_string(),
            license: License::default(),
            exercise_data: ExerciseData::default(),
            questions: vec![],
        }));

        let node = ContentNode::Topic(topic);
        assert_eq!(node.kind(), NodeKind::Topic);
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].source_id(), "Unidad 1/quiz.xls");
        assert!(node.files().is_empty());
    }

    #[test]
    fn test_node_json_is_tagged() {
        let node = ContentNode::Document(ResourceNode {
            meta: meta("Unidad 1/guia.pdf", "Guia"),
            author: String::new(),
            license: License::default(),
            files: vec![],
        });

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "document");
        assert_eq!(json["title"], "Guia");
        assert_eq!(json["license"]["kind"], "Special Permissions");

        let parsed: ContentNode = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, node);
    }
}
