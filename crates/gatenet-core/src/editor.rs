//! Editing session for one document.
//!
//! The [`Editor`] is the surface a presentation layer drives. Every
//! successful mutation records a snapshot in the [`History`], keeps Output
//! displays current, marks the document dirty and reports an
//! [`EditorEvent`] to the registered [`EditorListener`].
//!
//! ```
//! use gatenet_core::{Editor, NodeKind, Position, SocketRef, Tri};
//!
//! let mut editor = Editor::new();
//! let a = editor.add_node(NodeKind::Input, Position::new(0.0, 0.0)).unwrap();
//! let not = editor.add_node(NodeKind::Not, Position::new(100.0, 0.0)).unwrap();
//! let out = editor.add_node(NodeKind::Output, Position::new(200.0, 0.0)).unwrap();
//! editor.connect(SocketRef::output(a.clone(), 0), SocketRef::input(not.clone(), 0)).unwrap();
//! editor.connect(SocketRef::output(not, 0), SocketRef::input(out.clone(), 0)).unwrap();
//!
//! assert_eq!(editor.display_value(&out), Some(Tri::True));
//! editor.set_input_value(&a, true).unwrap();
//! assert_eq!(editor.display_value(&out), Some(Tri::False));
//!
//! editor.undo();
//! assert_eq!(editor.display_value(&out), Some(Tri::True));
//! ```

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{Document, LoadReport};
use crate::equation::{derive_equation, Equation};
use crate::error::{EquationError, EvalError, GraphError};
use crate::eval;
use crate::graph::{Connection, Graph, Node, NodeId, Position, SocketRef};
use crate::history::History;
use crate::kind::{NodeKind, Tri};
use crate::limits::Limits;

/// Offset applied to pasted nodes when the caller has no preference.
pub const PASTE_OFFSET: Position = Position { x: 20.0, y: 20.0 };

/// A change made through the [`Editor`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The document was reset to an empty graph.
    Cleared,
    NodeAdded(NodeId),
    NodesRemoved(Vec<NodeId>),
    Connected(Connection),
    Disconnected(Connection),
    InputChanged { node: NodeId, value: bool },
    NodeMoved { node: NodeId, position: Position },
    Pasted(Vec<NodeId>),
    /// The graph was rebuilt from the history at `cursor`.
    Restored { cursor: usize },
    /// A document was loaded, replacing the graph and history.
    Loaded { skipped: usize },
}

/// Receives editor events after each successful mutation.
pub trait EditorListener {
    fn on_event(&mut self, event: &EditorEvent);
}

impl<F: FnMut(&EditorEvent)> EditorListener for F {
    fn on_event(&mut self, event: &EditorEvent) {
        self(event)
    }
}

/// Clipboard entry: what a pasted node is rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClipboardEntry {
    kind: NodeKind,
    position: Position,
}

/// Editing session: graph, history, clipboard and dirty flag.
pub struct Editor {
    graph: Graph,
    history: History,
    clipboard: Vec<ClipboardEntry>,
    unsaved: bool,
    limits: Limits,
    listener: Option<Box<dyn EditorListener>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("graph", &self.graph)
            .field("history", &self.history)
            .field("clipboard", &self.clipboard)
            .field("unsaved", &self.unsaved)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// # Session
impl Editor {
    /// Create an editor over an empty graph with default limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create an editor over an empty graph.
    ///
    /// The empty graph is the first history entry, so the first mutation
    /// can be undone.
    pub fn with_limits(limits: Limits) -> Self {
        let graph = Graph::with_limits(limits);
        let mut history = History::new(limits.history_depth);
        history.push(graph.to_document());
        Self {
            graph,
            history,
            clipboard: Vec::new(),
            unsaved: false,
            limits,
            listener: None,
        }
    }

    /// Register the listener notified after each mutation.
    pub fn set_listener(&mut self, listener: impl EditorListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Remove the listener.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Check if the document changed since it was last loaded or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Mark the current state as persisted.
    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Reset to an empty graph with a fresh history.
    pub fn new_graph(&mut self) {
        self.graph = Graph::with_limits(self.limits);
        self.history.clear();
        self.history.push(self.graph.to_document());
        self.unsaved = false;
        debug!("new graph");
        self.emit(EditorEvent::Cleared);
    }

    fn emit(&mut self, event: EditorEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
    }

    /// Snapshot the graph, mark dirty and notify.
    fn commit(&mut self, event: EditorEvent) {
        self.history.push(self.graph.to_document());
        self.unsaved = true;
        debug!(cursor = self.history.cursor(), ?event, "commit");
        self.emit(event);
    }
}

/// # Mutation
impl Editor {
    /// Add a node with a generated id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, GraphError> {
        let id = self.graph.add_node(kind, position)?;
        self.commit(EditorEvent::NodeAdded(id.clone()));
        Ok(id)
    }

    /// Delete the given nodes and every connection touching them.
    ///
    /// Unknown ids are ignored. Returns the ids actually removed.
    pub fn delete_selection(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let removed: Vec<NodeId> = ids
            .iter()
            .filter_map(|id| self.graph.remove_node(id).ok())
            .map(|node| node.id().clone())
            .collect();
        if !removed.is_empty() {
            self.commit(EditorEvent::NodesRemoved(removed.clone()));
        }
        removed
    }

    /// Connect an output socket to an input socket.
    pub fn connect(&mut self, source: SocketRef, dest: SocketRef) -> Result<Connection, GraphError> {
        let connection = self.graph.connect(source, dest)?;
        self.commit(EditorEvent::Connected(connection.clone()));
        Ok(connection)
    }

    /// Remove a connection. Returns `false` if it no longer exists.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        if !self.graph.disconnect(connection) {
            return false;
        }
        self.commit(EditorEvent::Disconnected(connection.clone()));
        true
    }

    /// Set an Input node's value. Returns whether it changed.
    ///
    /// Setting the current value is not recorded in the history.
    pub fn set_input_value(&mut self, id: &NodeId, value: bool) -> Result<bool, GraphError> {
        let changed = self.graph.set_input_value(id, value)?;
        if changed {
            self.commit(EditorEvent::InputChanged {
                node: id.clone(),
                value,
            });
        }
        Ok(changed)
    }

    /// Move a node on the canvas. Returns whether it moved.
    ///
    /// Moving to the current position is not recorded in the history.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<bool, GraphError> {
        let moved = self.graph.set_position(id, position)?;
        if moved {
            self.commit(EditorEvent::NodeMoved {
                node: id.clone(),
                position,
            });
        }
        Ok(moved)
    }
}

/// # History
impl Editor {
    /// Step back one snapshot. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let (graph, _) = Graph::from_document_with_limits(snapshot, self.limits);
        self.restore(graph);
        true
    }

    /// Step forward one snapshot. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let (graph, _) = Graph::from_document_with_limits(snapshot, self.limits);
        self.restore(graph);
        true
    }

    fn restore(&mut self, graph: Graph) {
        self.graph = graph;
        self.unsaved = true;
        let cursor = self.history.cursor();
        debug!(cursor, "restore snapshot");
        self.emit(EditorEvent::Restored { cursor });
    }
}

/// # Clipboard
impl Editor {
    /// Copy the kind and position of the given nodes.
    ///
    /// Connections are not copied. Returns the number of nodes copied; an
    /// empty selection leaves the clipboard untouched.
    pub fn copy(&mut self, ids: &[NodeId]) -> usize {
        let entries: Vec<ClipboardEntry> = ids
            .iter()
            .filter_map(|id| self.graph.node(id))
            .map(|node| ClipboardEntry {
                kind: node.kind(),
                position: node.position(),
            })
            .collect();
        if !entries.is_empty() {
            self.clipboard = entries;
        }
        self.clipboard.len()
    }

    /// Copy then delete the given nodes.
    pub fn cut(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        self.copy(ids);
        self.delete_selection(ids)
    }

    /// Create fresh nodes from the clipboard, shifted by `offset`.
    ///
    /// Returns the new ids. Pasting an empty clipboard does nothing.
    pub fn paste(&mut self, offset: Position) -> Result<Vec<NodeId>, GraphError> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        if self.graph.node_count() + self.clipboard.len() > self.limits.max_nodes {
            return Err(GraphError::MaxNodesExceeded(self.limits.max_nodes));
        }
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for entry in &self.clipboard {
            let node = Node::new(NodeId::generate(), entry.kind, entry.position.offset(offset));
            pasted.push(self.graph.insert_node(node)?);
        }
        self.commit(EditorEvent::Pasted(pasted.clone()));
        Ok(pasted)
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }
}

/// # Documents and queries
impl Editor {
    /// Serialize the current graph.
    pub fn save_document(&self) -> Document {
        self.graph.to_document()
    }

    /// Replace the graph with a document. History restarts at the loaded
    /// state and the document is marked clean.
    pub fn load_document(&mut self, document: &Document) -> LoadReport {
        let (graph, report) = Graph::from_document_with_limits(document, self.limits);
        self.graph = graph;
        self.history.clear();
        self.history.push(self.graph.to_document());
        self.unsaved = false;
        debug!(
            nodes = self.graph.node_count(),
            skipped = report.skipped.len(),
            "load document"
        );
        self.emit(EditorEvent::Loaded {
            skipped: report.skipped.len(),
        });
        report
    }

    /// Value shown for a node.
    ///
    /// Output nodes report their stored display, other nodes their first
    /// output socket. `None` for unknown ids.
    pub fn display_value(&self, id: &NodeId) -> Option<Tri> {
        let node = self.graph.node(id)?;
        if node.kind().is_output() {
            return Some(node.display());
        }
        Some(self.graph.output_value(id, 0).unwrap_or_default())
    }

    /// Derive the boolean expression feeding an Output node.
    pub fn derive_equation(&self, output: &NodeId) -> Result<Equation, EquationError> {
        derive_equation(&self.graph, output)
    }

    /// Evaluate every Output node.
    pub fn evaluate(&self) -> Result<IndexMap<NodeId, Tri>, EvalError> {
        eval::evaluate(&self.graph)
    }
}
