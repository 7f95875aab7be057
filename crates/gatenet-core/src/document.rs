//! Persisted document model.
//!
//! A [`Document`] is the serialized form of a [`Graph`]: the `.circuit`
//! file payload and the undo history snapshot. Field names and layout are
//! fixed by the file format:
//!
//! ```json
//! {
//!     "nodes": [{"id": "…", "type": "InputNode", "pos_x": 0.0, "pos_y": 0.0, "value": "1"}],
//!     "connections": [{"source_node": "…", "source_socket": 0, "dest_node": "…", "dest_socket": 0}]
//! }
//! ```
//!
//! Loading is tolerant: records that cannot be applied are skipped and
//! listed in a [`LoadReport`] instead of failing the whole load.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GraphError;
use crate::graph::{Graph, Node, NodeId, Position, SocketRef};
use crate::kind::NodeKind;
use crate::limits::Limits;

/// Serialized graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// Serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
    /// `"0"` or `"1"`; present on InputNode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Serialized connection, by node ID and socket index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub source_node: String,
    pub source_socket: i64,
    pub dest_node: String,
    pub dest_socket: i64,
}

/// A record skipped while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Skipped {
    /// Node with an unrecognized type name.
    UnknownKind { id: String, kind: String },
    /// Node whose ID was already loaded.
    DuplicateNode { id: String },
    /// Node beyond the graph's size limit.
    NodeLimit { id: String },
    /// Connection referencing a node that was not loaded.
    MissingNode(ConnectionRecord),
    /// Connection with a negative or out-of-range socket index.
    SocketOutOfRange(ConnectionRecord),
    /// Connection the graph rejected (occupied input, same node).
    Rejected {
        record: ConnectionRecord,
        reason: GraphError,
    },
}

/// Outcome of a tolerant load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub skipped: Vec<Skipped>,
}

impl LoadReport {
    /// Check if every record was applied.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, skipped: Skipped) {
        warn!(?skipped, "skipping malformed record");
        self.skipped.push(skipped);
    }
}

/// Parse the persisted `value` field. Only `"1"` means true.
pub fn parse_value(text: &str) -> bool {
    text.trim() == "1"
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let position = node.position();
        Self {
            id: node.id().to_string(),
            kind: node.kind().type_name().to_owned(),
            pos_x: position.x,
            pos_y: position.y,
            value: (node.kind() == NodeKind::Input)
                .then(|| String::from(if node.value() { "1" } else { "0" })),
        }
    }
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

/// # Serialization
impl Graph {
    /// Serialize nodes (insertion order) and connections.
    pub fn to_document(&self) -> Document {
        Document {
            nodes: self.nodes().map(NodeRecord::from).collect(),
            connections: self
                .connections()
                .map(|c| ConnectionRecord {
                    source_node: c.source.node.to_string(),
                    source_socket: c.source.index as i64,
                    dest_node: c.dest.node.to_string(),
                    dest_socket: c.dest.index as i64,
                })
                .collect(),
        }
    }

    /// Rebuild a graph from a document with default limits.
    pub fn from_document(document: &Document) -> (Graph, LoadReport) {
        Self::from_document_with_limits(document, Limits::default())
    }

    /// Rebuild a graph from a document.
    ///
    /// Nodes are created first with the IDs from the payload, then
    /// connections are restored by ID and socket index. Output displays are
    /// refreshed once the wiring is complete.
    pub fn from_document_with_limits(document: &Document, limits: Limits) -> (Graph, LoadReport) {
        let mut graph = Graph::with_limits(limits);
        let mut report = LoadReport::default();

        for record in &document.nodes {
            let Ok(kind) = record.kind.parse::<NodeKind>() else {
                report.skip(Skipped::UnknownKind {
                    id: record.id.clone(),
                    kind: record.kind.clone(),
                });
                continue;
            };
            let value = record.value.as_deref().is_some_and(parse_value);
            let node = Node::new(
                NodeId::from(record.id.as_str()),
                kind,
                Position::new(record.pos_x, record.pos_y),
            )
            .with_value(kind == NodeKind::Input && value);
            match graph.insert_node(node) {
                Ok(_) => {}
                Err(GraphError::DuplicateNode(_)) => report.skip(Skipped::DuplicateNode {
                    id: record.id.clone(),
                }),
                Err(_) => report.skip(Skipped::NodeLimit {
                    id: record.id.clone(),
                }),
            }
        }

        for record in &document.connections {
            let source_id = NodeId::from(record.source_node.as_str());
            let dest_id = NodeId::from(record.dest_node.as_str());
            let (Some(source), Some(dest)) = (graph.node(&source_id), graph.node(&dest_id)) else {
                report.skip(Skipped::MissingNode(record.clone()));
                continue;
            };
            let in_range = |index: i64, count: usize| usize::try_from(index).is_ok_and(|i| i < count);
            if !in_range(record.source_socket, source.kind().output_count())
                || !in_range(record.dest_socket, dest.kind().input_count())
            {
                report.skip(Skipped::SocketOutOfRange(record.clone()));
                continue;
            }
            let result = graph.connect(
                SocketRef::output(source_id, record.source_socket as usize),
                SocketRef::input(dest_id, record.dest_socket as usize),
            );
            if let Err(reason) = result {
                report.skip(Skipped::Rejected {
                    record: record.clone(),
                    reason,
                });
            }
        }

        graph.refresh_all_displays();
        (graph, report)
    }
}
