//! Pull-based tri-state evaluator.
//!
//! Values are computed on demand by walking from the queried node back to
//! its transitive sources. Nothing is memoized. The evaluator tracks the
//! nodes on the active path so cyclic wiring is reported as
//! [`EvalError::Cycle`] and nesting beyond [`Limits::max_depth`] as
//! [`EvalError::RecursionLimit`].
//!
//! [`Limits::max_depth`]: crate::limits::Limits::max_depth

use std::collections::HashSet;

use indexmap::IndexMap;
use petgraph::stable_graph::NodeIndex;

use crate::error::EvalError;
use crate::graph::{Graph, NodeId};
use crate::kind::{NodeKind, Tri};

/// Evaluate every Output and WriteOutput node of a graph.
///
/// # Returns
///
/// Map from output node IDs (in insertion order) to the value on their
/// input socket.
///
/// # Errors
///
/// Returns an error if the wiring feeding an output is cyclic or deeper
/// than the graph's depth limit.
pub fn evaluate(graph: &Graph) -> Result<IndexMap<NodeId, Tri>, EvalError> {
    let mut evaluator = Evaluator::new(graph);
    let mut outputs = IndexMap::new();
    for node in graph.output_nodes() {
        let value = evaluator.input_value(node.id(), 0)?;
        outputs.insert(node.id().clone(), value);
    }
    Ok(outputs)
}

/// Recursive evaluator over a borrowed graph.
#[derive(Debug)]
pub struct Evaluator<'g> {
    graph: &'g Graph,
    /// Nodes currently being evaluated.
    path: HashSet<NodeIndex>,
    max_depth: usize,
}

impl<'g> Evaluator<'g> {
    /// Create an evaluator using the graph's own limits.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            path: HashSet::new(),
            max_depth: graph.limits().max_depth,
        }
    }

    /// Value produced on output socket `socket` of node `id`.
    pub fn output_value(&mut self, id: &NodeId, socket: usize) -> Result<Tri, EvalError> {
        let ix = self.lookup(id)?;
        self.output_at(ix, socket)
    }

    /// Value arriving on input socket `socket` of node `id`.
    ///
    /// `Unknown` if the socket is unconnected.
    pub fn input_value(&mut self, id: &NodeId, socket: usize) -> Result<Tri, EvalError> {
        let ix = self.lookup(id)?;
        self.input_at(ix, socket)
    }

    fn lookup(&self, id: &NodeId) -> Result<NodeIndex, EvalError> {
        self.graph
            .ix(id)
            .ok_or_else(|| EvalError::UnknownNode(id.clone()))
    }

    fn output_at(&mut self, ix: NodeIndex, socket: usize) -> Result<Tri, EvalError> {
        let graph = self.graph;
        let node = &graph.pg[ix];
        let kind = node.kind();
        if socket >= kind.output_count() {
            return Err(EvalError::SocketOutOfRange {
                node: node.id().clone(),
                index: socket,
            });
        }
        if kind == NodeKind::Input {
            return Ok(Tri::from(node.value()));
        }

        if self.path.len() >= self.max_depth {
            return Err(EvalError::RecursionLimit(self.max_depth));
        }
        if !self.path.insert(ix) {
            return Err(EvalError::Cycle(node.id().clone()));
        }
        let result = self.gate_output(ix, kind);
        self.path.remove(&ix);
        result
    }

    fn gate_output(&mut self, ix: NodeIndex, kind: NodeKind) -> Result<Tri, EvalError> {
        let mut inputs = [Tri::Unknown; 2];
        for (socket, slot) in inputs.iter_mut().enumerate().take(kind.input_count()) {
            *slot = self.input_at(ix, socket)?;
        }
        Ok(kind.eval(&inputs[..kind.input_count()]))
    }

    fn input_at(&mut self, ix: NodeIndex, socket: usize) -> Result<Tri, EvalError> {
        let graph = self.graph;
        let node = &graph.pg[ix];
        if socket >= node.kind().input_count() {
            return Err(EvalError::SocketOutOfRange {
                node: node.id().clone(),
                index: socket,
            });
        }
        match graph.source_of(ix, socket) {
            Some((source, source_socket)) => self.output_at(source, source_socket),
            None => Ok(Tri::Unknown),
        }
    }
}

/// # Evaluation
impl Graph {
    /// Value produced on an output socket.
    pub fn output_value(&self, id: &NodeId, socket: usize) -> Result<Tri, EvalError> {
        Evaluator::new(self).output_value(id, socket)
    }

    /// Value arriving on an input socket.
    pub fn input_value(&self, id: &NodeId, socket: usize) -> Result<Tri, EvalError> {
        Evaluator::new(self).input_value(id, socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Position, SocketRef};
    use crate::limits::Limits;

    fn gate_with_inputs(kind: NodeKind, a: bool, b: bool) -> (Graph, NodeId) {
        let mut graph = Graph::new();
        let gate = graph.add_node(kind, Position::default()).unwrap();
        for (socket, value) in [a, b].into_iter().enumerate().take(kind.input_count()) {
            let input = graph.add_node(NodeKind::Input, Position::default()).unwrap();
            graph.set_input_value(&input, value).unwrap();
            graph
                .connect(SocketRef::output(input, 0), SocketRef::input(gate.clone(), socket))
                .unwrap();
        }
        (graph, gate)
    }

    #[test]
    fn test_gate_truth_tables() {
        let cases = [(false, false), (false, true), (true, false), (true, true)];
        for kind in NodeKind::ALL.into_iter().filter(|k| k.is_gate()) {
            for (a, b) in cases {
                let (graph, gate) = gate_with_inputs(kind, a, b);
                let expected = Tri::from(kind.apply(a, b));
                assert_eq!(
                    graph.output_value(&gate, 0).unwrap(),
                    expected,
                    "{} failed for a={}, b={}",
                    kind,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_unconnected_input_is_unknown() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        let gate = graph.add_node(NodeKind::And, Position::default()).unwrap();
        graph
            .connect(SocketRef::output(a, 0), SocketRef::input(gate.clone(), 0))
            .unwrap();
        assert_eq!(graph.input_value(&gate, 1), Ok(Tri::Unknown));
        assert_eq!(graph.output_value(&gate, 0), Ok(Tri::Unknown));
    }

    #[test]
    fn test_input_node_always_resolved() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        assert_eq!(graph.output_value(&a, 0), Ok(Tri::False));
    }

    #[test]
    fn test_socket_out_of_range() {
        let mut graph = Graph::new();
        let out = graph.add_node(NodeKind::Output, Position::default()).unwrap();
        assert_eq!(
            graph.output_value(&out, 0),
            Err(EvalError::SocketOutOfRange { node: out, index: 0 })
        );
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = Graph::new();
        let x = graph.add_node(NodeKind::Or, Position::default()).unwrap();
        let y = graph.add_node(NodeKind::Or, Position::default()).unwrap();
        let a = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        graph
            .connect(SocketRef::output(a.clone(), 0), SocketRef::input(x.clone(), 0))
            .unwrap();
        graph
            .connect(SocketRef::output(a, 0), SocketRef::input(y.clone(), 0))
            .unwrap();
        graph
            .connect(SocketRef::output(x.clone(), 0), SocketRef::input(y.clone(), 1))
            .unwrap();
        graph
            .connect(SocketRef::output(y, 0), SocketRef::input(x.clone(), 1))
            .unwrap();

        assert_eq!(graph.output_value(&x, 0), Err(EvalError::Cycle(x)));
    }

    #[test]
    fn test_recursion_limit() {
        let mut graph = Graph::with_limits(Limits::new(64, 4, 20));
        let mut prev = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        for _ in 0..6 {
            let not = graph.add_node(NodeKind::Not, Position::default()).unwrap();
            graph
                .connect(SocketRef::output(prev, 0), SocketRef::input(not.clone(), 0))
                .unwrap();
            prev = not;
        }
        assert_eq!(graph.output_value(&prev, 0), Err(EvalError::RecursionLimit(4)));
    }

    #[test]
    fn test_evaluate_all_outputs() {
        let (mut graph, gate) = gate_with_inputs(NodeKind::Xor, true, false);
        let out = graph.add_node(NodeKind::Output, Position::default()).unwrap();
        let dangling = graph.add_node(NodeKind::WriteOutput, Position::default()).unwrap();
        graph
            .connect(SocketRef::output(gate, 0), SocketRef::input(out.clone(), 0))
            .unwrap();

        let values = evaluate(&graph).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[&out], Tri::True);
        assert_eq!(values[&dangling], Tri::Unknown);
    }
}
