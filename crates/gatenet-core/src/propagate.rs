//! Display refresh for Output nodes.
//!
//! Output and WriteOutput nodes keep the last value they showed. Evaluation
//! never depends on it; these passes only keep the shown values current
//! after a mutation.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use tracing::{trace, warn};

use crate::graph::{Graph, NodeId};
use crate::kind::Tri;

impl Graph {
    /// Re-read the input of an Output node and store it as its display value.
    ///
    /// Returns the new display value, or `None` if `id` is not an Output
    /// node in this graph. Evaluation errors display as `Unknown`.
    pub fn refresh_display(&mut self, id: &NodeId) -> Option<Tri> {
        let ix = self.ix(id)?;
        self.refresh_at(ix)
    }

    /// Refresh the display of every Output node.
    pub fn refresh_all_displays(&mut self) {
        let outputs: Vec<NodeIndex> = self
            .index
            .values()
            .copied()
            .filter(|&ix| self.pg[ix].kind().is_output())
            .collect();
        for ix in outputs {
            self.refresh_at(ix);
        }
    }

    /// Refresh every Output node reachable downstream of `id`.
    ///
    /// Returns the IDs of the refreshed nodes.
    pub fn propagate_from(&mut self, id: &NodeId) -> Vec<NodeId> {
        let reachable = self.downstream(id);
        let mut refreshed = Vec::new();
        for node in reachable {
            if let Some(ix) = self.ix(&node) {
                if self.pg[ix].kind().is_output() {
                    self.refresh_at(ix);
                    refreshed.push(node);
                }
            }
        }
        trace!(source = %id, refreshed = refreshed.len(), "propagate");
        refreshed
    }

    /// Refresh `id` itself if it is an Output, then every Output downstream.
    pub(crate) fn refresh_from(&mut self, id: &NodeId) {
        self.refresh_display(id);
        self.propagate_from(id);
    }

    /// All nodes transitively reachable through outgoing connections of
    /// `id`, excluding `id` itself unless it sits on a cycle.
    pub fn downstream(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(start) = self.ix(id) else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<NodeIndex> = self.targets(start).collect();
        while let Some(ix) = stack.pop() {
            if !visited.insert(ix) {
                continue;
            }
            order.push(self.pg[ix].id().clone());
            stack.extend(self.targets(ix));
        }
        order
    }

    fn refresh_at(&mut self, ix: NodeIndex) -> Option<Tri> {
        if !self.pg[ix].kind().is_output() {
            return None;
        }
        let id = self.pg[ix].id().clone();
        let value = self.input_value(&id, 0).unwrap_or_else(|err| {
            warn!(node = %id, error = %err, "output refresh failed");
            Tri::Unknown
        });
        self.pg[ix].set_display(value);
        Some(value)
    }
}
