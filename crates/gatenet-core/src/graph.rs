//! Circuit graph: nodes, sockets and connections.
//!
//! Nodes live in a [`StableGraph`] arena whose edges are connections. Every
//! cross reference (socket to node, connection to socket) is an id or arena
//! index, never an owning pointer. Node ids are kept in an [`IndexMap`] so
//! iteration and serialization follow insertion order.

use std::fmt;

use indexmap::IndexMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction as Flow;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ConnectionFault, GraphError};
use crate::kind::{Direction, NodeKind, Tri};
use crate::limits::Limits;

/// Stable node identifier (unique within a graph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position shifted by `offset`.
    pub fn offset(self, offset: Position) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

/// A vertex in the circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    position: Position,
    /// Stored value; meaningful for Input nodes only.
    value: bool,
    /// Last shown value; meaningful for Output kinds only.
    display: Tri,
}

impl Node {
    /// Create a node with the given id.
    pub fn new(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            value: false,
            display: Tri::Unknown,
        }
    }

    /// Builder-style setter for an Input node's value.
    pub fn with_value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Stored value of an Input node (`false` for other kinds).
    pub fn value(&self) -> bool {
        self.value
    }

    /// Last displayed value of an Output node.
    pub fn display(&self) -> Tri {
        self.display
    }

    pub(crate) fn set_display(&mut self, display: Tri) {
        self.display = display;
    }
}

/// Address of a socket: owning node, direction and positional index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node: NodeId,
    pub direction: Direction,
    pub index: usize,
}

impl SocketRef {
    /// Input socket `index` of `node`.
    pub fn input(node: impl Into<NodeId>, index: usize) -> Self {
        Self {
            node: node.into(),
            direction: Direction::Input,
            index,
        }
    }

    /// Output socket `index` of `node`.
    pub fn output(node: impl Into<NodeId>, index: usize) -> Self {
        Self {
            node: node.into(),
            direction: Direction::Output,
            index,
        }
    }
}

/// A directed link from an output socket to an input socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: SocketRef,
    pub dest: SocketRef,
}

/// Edge weight: socket indices at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wire {
    pub(crate) source: usize,
    pub(crate) dest: usize,
}

/// The circuit for one document.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) pg: StableGraph<Node, Wire>,
    pub(crate) index: IndexMap<NodeId, NodeIndex>,
    limits: Limits,
}

/// # Construction
impl Graph {
    /// Create an empty graph with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Add a fresh node with a generated id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, GraphError> {
        self.insert_node(Node::new(NodeId::generate(), kind, position))
    }

    /// Insert a fully specified node, keeping its id.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        if self.index.len() >= self.limits.max_nodes {
            return Err(GraphError::MaxNodesExceeded(self.limits.max_nodes));
        }
        let id = node.id.clone();
        debug!(node = %id, kind = %node.kind, "add node");
        let ix = self.pg.add_node(node);
        self.index.insert(id.clone(), ix);
        Ok(id)
    }

    /// Remove a node and every connection touching it.
    ///
    /// Outputs that were fed through the node are refreshed.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node, GraphError> {
        let ix = self
            .ix(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        let mut fed: Vec<NodeId> = self
            .targets(ix)
            .map(|target| self.pg[target].id.clone())
            .collect();
        fed.sort();
        fed.dedup();
        let severed = self.pg.edges_directed(ix, Flow::Incoming).count()
            + self.pg.edges_directed(ix, Flow::Outgoing).count();
        debug!(node = %id, severed, "remove node");

        self.index.shift_remove(id);
        let node = self
            .pg
            .remove_node(ix)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        for target in &fed {
            self.refresh_from(target);
        }
        Ok(node)
    }

    /// Remove every node and connection.
    pub fn clear(&mut self) {
        self.pg.clear();
        self.index.clear();
    }
}

/// # Queries
impl Graph {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.ix(id).map(|ix| &self.pg[ix])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.index.values().map(move |&ix| &self.pg[ix])
    }

    /// All Output and WriteOutput nodes in insertion order.
    pub fn output_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|node| node.kind.is_output())
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn connection_count(&self) -> usize {
        self.pg.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All connections.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.pg
            .edge_references()
            .map(|e| self.connection(e.source(), e.target(), *e.weight()))
    }

    /// The connection held by an input socket, if any.
    pub fn incoming(&self, socket: &SocketRef) -> Option<Connection> {
        if socket.direction != Direction::Input {
            return None;
        }
        let ix = self.ix(&socket.node)?;
        self.pg
            .edges_directed(ix, Flow::Incoming)
            .find(|e| e.weight().dest == socket.index)
            .map(|e| self.connection(e.source(), e.target(), *e.weight()))
    }

    /// All connections attached to a socket.
    pub fn connections_of(&self, socket: &SocketRef) -> Vec<Connection> {
        let Some(ix) = self.ix(&socket.node) else {
            return Vec::new();
        };
        match socket.direction {
            Direction::Input => self.incoming(socket).into_iter().collect(),
            Direction::Output => self
                .pg
                .edges_directed(ix, Flow::Outgoing)
                .filter(|e| e.weight().source == socket.index)
                .map(|e| self.connection(e.source(), e.target(), *e.weight()))
                .collect(),
        }
    }

    pub fn is_connected(&self, socket: &SocketRef) -> bool {
        !self.connections_of(socket).is_empty()
    }

    pub(crate) fn ix(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Source node and socket feeding input `socket` of `ix`.
    pub(crate) fn source_of(&self, ix: NodeIndex, socket: usize) -> Option<(NodeIndex, usize)> {
        self.pg
            .edges_directed(ix, Flow::Incoming)
            .find(|e| e.weight().dest == socket)
            .map(|e| (e.source(), e.weight().source))
    }

    /// Nodes fed directly by `ix`.
    pub(crate) fn targets(&self, ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.pg
            .edges_directed(ix, Flow::Outgoing)
            .map(|e| e.target())
    }

    fn connection(&self, source: NodeIndex, dest: NodeIndex, wire: Wire) -> Connection {
        Connection {
            source: SocketRef::output(self.pg[source].id.clone(), wire.source),
            dest: SocketRef::input(self.pg[dest].id.clone(), wire.dest),
        }
    }
}

/// # Mutation
impl Graph {
    /// Connect an output socket to an input socket.
    ///
    /// The destination, if it is an Output, and every Output downstream of
    /// it are refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is unknown, a socket has the wrong
    /// direction or an out-of-range index, both sockets belong to the same
    /// node, or the input already holds a connection. The graph is left
    /// unchanged on error.
    pub fn connect(
        &mut self,
        source: SocketRef,
        dest: SocketRef,
    ) -> Result<Connection, GraphError> {
        if source.direction != Direction::Output {
            return Err(ConnectionFault::SourceNotOutput.into());
        }
        if dest.direction != Direction::Input {
            return Err(ConnectionFault::DestinationNotInput.into());
        }
        let src_ix = self
            .ix(&source.node)
            .ok_or_else(|| GraphError::UnknownNode(source.node.clone()))?;
        let dst_ix = self
            .ix(&dest.node)
            .ok_or_else(|| GraphError::UnknownNode(dest.node.clone()))?;

        for (ix, socket) in [(src_ix, &source), (dst_ix, &dest)] {
            if socket.index >= self.pg[ix].kind.socket_count(socket.direction) {
                return Err(ConnectionFault::SocketOutOfRange {
                    node: socket.node.clone(),
                    index: socket.index,
                }
                .into());
            }
        }
        if src_ix == dst_ix {
            return Err(ConnectionFault::SameNode(source.node).into());
        }
        if self.source_of(dst_ix, dest.index).is_some() {
            return Err(ConnectionFault::DestinationOccupied {
                node: dest.node,
                index: dest.index,
            }
            .into());
        }

        let wire = Wire {
            source: source.index,
            dest: dest.index,
        };
        self.pg.add_edge(src_ix, dst_ix, wire);
        debug!(
            source = %source.node,
            source_socket = source.index,
            dest = %dest.node,
            dest_socket = dest.index,
            "connect"
        );
        self.refresh_from(&dest.node);
        Ok(Connection { source, dest })
    }

    /// Remove a connection from both endpoints and refresh the Outputs it
    /// fed.
    ///
    /// Returns `false` if the connection no longer exists.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let (Some(src_ix), Some(dst_ix)) =
            (self.ix(&connection.source.node), self.ix(&connection.dest.node))
        else {
            return false;
        };
        let edge = self
            .pg
            .edges_directed(dst_ix, Flow::Incoming)
            .find(|e| {
                e.source() == src_ix
                    && e.weight().source == connection.source.index
                    && e.weight().dest == connection.dest.index
            })
            .map(|e| e.id());
        match edge {
            Some(edge) => {
                self.pg.remove_edge(edge);
                debug!(
                    source = %connection.source.node,
                    dest = %connection.dest.node,
                    "disconnect"
                );
                self.refresh_from(&connection.dest.node);
                true
            }
            None => false,
        }
    }

    /// Move a node on the canvas. Returns whether the position changed.
    pub fn set_position(&mut self, id: &NodeId, position: Position) -> Result<bool, GraphError> {
        let ix = self
            .ix(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        let node = &mut self.pg[ix];
        if node.position == position {
            return Ok(false);
        }
        node.position = position;
        Ok(true)
    }

    /// Set an Input node's value.
    ///
    /// Returns whether the value changed. A change refreshes the display of
    /// every Output node reachable downstream.
    pub fn set_input_value(&mut self, id: &NodeId, value: bool) -> Result<bool, GraphError> {
        let ix = self
            .ix(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        let node = &mut self.pg[ix];
        if node.kind != NodeKind::Input {
            return Err(GraphError::NotAnInput(id.clone()));
        }
        if node.value == value {
            return Ok(false);
        }
        node.value = value;
        debug!(node = %id, value, "input value changed");
        self.propagate_from(id);
        Ok(true)
    }
}
