//! Resource limits for graph size, evaluation depth and undo history.

/// Resource limits for a circuit document.
///
/// Evaluation and equation derivation recurse through the graph without
/// memoization; `max_depth` bounds that recursion so deep or cyclic wiring
/// is reported instead of exhausting the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nodes in the graph.
    pub max_nodes: usize,
    /// Maximum nesting of node visits during a single evaluation.
    pub max_depth: usize,
    /// Number of snapshots retained by the undo history.
    pub history_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: 4096,
            max_depth: 1024,
            history_depth: 20,
        }
    }
}

impl Limits {
    /// Create limits with custom values.
    pub fn new(max_nodes: usize, max_depth: usize, history_depth: usize) -> Self {
        Self {
            max_nodes,
            max_depth,
            history_depth,
        }
    }

    /// Permissive limits for testing and batch tools.
    pub fn permissive() -> Self {
        Self {
            max_nodes: 65536,
            max_depth: 4096,
            history_depth: 100,
        }
    }

    /// Strict limits for embedded hosts with small stacks.
    pub fn strict() -> Self {
        Self {
            max_nodes: 256,
            max_depth: 64,
            history_depth: 10,
        }
    }
}
