//! Error types for circuit mutation, evaluation and equation derivation.

use thiserror::Error;

use crate::graph::NodeId;

/// Why a proposed connection was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionFault {
    /// The source socket is not an output.
    #[error("source socket is not an output")]
    SourceNotOutput,

    /// The destination socket is not an input.
    #[error("destination socket is not an input")]
    DestinationNotInput,

    /// Socket index exceeds the node's arity.
    #[error("socket index {index} out of range for node {node}")]
    SocketOutOfRange { node: NodeId, index: usize },

    /// Both sockets belong to the same node.
    #[error("cannot connect node {0} to itself")]
    SameNode(NodeId),

    /// The destination input already holds a connection.
    #[error("input {index} of node {node} is already connected")]
    DestinationOccupied { node: NodeId, index: usize },
}

/// Errors that can occur while mutating a graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Referenced a node that is not in the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Attempted to insert a node whose ID already exists.
    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    /// Connection rejected; the graph is unchanged.
    #[error("invalid connection: {0}")]
    InvalidConnection(#[from] ConnectionFault),

    /// Value edit on a node that is not an Input.
    #[error("node {0} is not an input node")]
    NotAnInput(NodeId),

    /// Maximum node count exceeded.
    #[error("maximum nodes exceeded ({0})")]
    MaxNodesExceeded(usize),
}

/// Errors that can occur during evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Referenced a node that is not in the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Socket index exceeds the node's arity.
    #[error("socket index {index} out of range for node {node}")]
    SocketOutOfRange { node: NodeId, index: usize },

    /// Evaluation re-entered a node already on the active path.
    #[error("cyclic wiring through node {0}")]
    Cycle(NodeId),

    /// Nested evaluation exceeded the configured depth.
    #[error("recursion limit exceeded ({0})")]
    RecursionLimit(usize),
}

/// Errors that can occur during equation derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EquationError {
    /// Referenced a node that is not in the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Derivation starts from Output or WriteOutput nodes only.
    #[error("node {0} is not an output node")]
    NotAnOutput(NodeId),

    /// The output's input socket is unconnected.
    #[error("No connected circuit")]
    NotConnected,

    /// The subgraph is deeper than the configured depth.
    #[error("recursion limit exceeded ({0})")]
    RecursionLimit(usize),
}
