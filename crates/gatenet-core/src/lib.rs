//! gatenet: logic-gate circuit engine
//!
//! The evaluation and consistency core of a visual logic-gate editor.
//!
//! # Overview
//!
//! A [`Graph`] holds gate nodes wired output-to-input. Key properties:
//!
//! - **Pull-based evaluation**: values are computed on demand from the
//!   sources, never cached
//! - **Three-valued logic**: unconnected inputs read as [`Tri::Unknown`]
//! - **Hardened recursion**: cyclic wiring is reported, not looped on
//! - **Snapshot history**: undo/redo restores complete documents
//!
//! # Example
//!
//! ```
//! use gatenet_core::{derive_equation, Graph, NodeKind, Position, SocketRef, Tri};
//!
//! // output = A AND B
//! let mut graph = Graph::new();
//! let a = graph.add_node(NodeKind::Input, Position::new(0.0, 0.0)).unwrap();
//! let b = graph.add_node(NodeKind::Input, Position::new(0.0, 60.0)).unwrap();
//! let and = graph.add_node(NodeKind::And, Position::new(120.0, 30.0)).unwrap();
//! let out = graph.add_node(NodeKind::Output, Position::new(240.0, 30.0)).unwrap();
//!
//! graph.connect(SocketRef::output(a.clone(), 0), SocketRef::input(and.clone(), 0)).unwrap();
//! graph.connect(SocketRef::output(b.clone(), 0), SocketRef::input(and.clone(), 1)).unwrap();
//! graph.connect(SocketRef::output(and, 0), SocketRef::input(out.clone(), 0)).unwrap();
//!
//! graph.set_input_value(&a, true).unwrap();
//! graph.set_input_value(&b, true).unwrap();
//! assert_eq!(graph.node(&out).unwrap().display(), Tri::True);
//!
//! let equation = derive_equation(&graph, &out).unwrap();
//! assert_eq!(equation.to_string(), "A * B");
//! ```
//!
//! # Editing sessions
//!
//! [`Editor`] wraps a graph with undo/redo, a clipboard and change
//! notifications for a presentation layer.

pub mod document;
pub mod editor;
pub mod equation;
pub mod error;
pub mod eval;
pub mod graph;
pub mod history;
pub mod kind;
pub mod limits;
mod propagate;

pub use document::{ConnectionRecord, Document, LoadReport, NodeRecord, Skipped};
pub use editor::{Editor, EditorEvent, EditorListener, PASTE_OFFSET};
pub use equation::{derive_equation, Equation, CYCLE_MARKER};
pub use error::{ConnectionFault, EquationError, EvalError, GraphError};
pub use eval::{evaluate, Evaluator};
pub use graph::{Connection, Graph, Node, NodeId, Position, SocketRef};
pub use history::History;
pub use kind::{Direction, NodeKind, Tri};
pub use limits::Limits;
