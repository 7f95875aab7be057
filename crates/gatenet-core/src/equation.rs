//! Symbolic equation derivation.
//!
//! Rebuilds the boolean expression computed by the subgraph feeding an
//! Output node. Input nodes are labelled `A`..`Z` in first-encounter order,
//! then `Input_27`, `Input_28`, and so on.
//!
//! | gate | expression        |
//! |------|-------------------|
//! | And  | `x * y`           |
//! | Or   | `x + y`           |
//! | Not  | `!x`              |
//! | Nand | `!(x * y)`        |
//! | Nor  | `!(x + y)`        |
//! | Xor  | `x ^ y`           |
//! | Xnor | `!(x ^ y)`        |

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use petgraph::stable_graph::NodeIndex;
use tracing::debug;

use crate::error::EquationError;
use crate::graph::{Graph, NodeId};
use crate::kind::NodeKind;

/// Placeholder emitted when a node reappears on its own path.
pub const CYCLE_MARKER: &str = "(...)";

/// A derived boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    /// Rendered expression, e.g. `!(A * B)`.
    pub expression: String,
    /// Input node IDs with their assigned labels, in label order.
    pub variables: Vec<(NodeId, String)>,
}

impl Equation {
    /// Label assigned to an Input node, if it takes part in the expression.
    pub fn label_of(&self, id: &NodeId) -> Option<&str> {
        self.variables
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, label)| label.as_str())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Derive the equation feeding an Output or WriteOutput node.
///
/// # Errors
///
/// Returns an error if the node is unknown, is not an output kind, or its
/// input is unconnected, or if the subgraph is deeper than the graph's
/// depth limit.
pub fn derive_equation(graph: &Graph, output: &NodeId) -> Result<Equation, EquationError> {
    let ix = graph
        .ix(output)
        .ok_or_else(|| EquationError::UnknownNode(output.clone()))?;
    if !graph.pg[ix].kind().is_output() {
        return Err(EquationError::NotAnOutput(output.clone()));
    }
    let (source, _) = graph.source_of(ix, 0).ok_or(EquationError::NotConnected)?;

    let mut deriver = Deriver {
        graph,
        labels: IndexMap::new(),
        max_depth: graph.limits().max_depth,
    };
    let term = deriver.build(source, HashSet::new())?;
    debug!(output = %output, expression = %term.text, "derived equation");

    Ok(Equation {
        expression: term.text,
        variables: deriver
            .labels
            .into_iter()
            .map(|(ix, label)| (graph.pg[ix].id().clone(), label))
            .collect(),
    })
}

/// An intermediate expression.
#[derive(Debug, Clone)]
struct Term {
    text: String,
    /// Top level is an unnegated `^` chain.
    xor_chain: bool,
}

impl Term {
    fn atom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            xor_chain: false,
        }
    }

    fn is_compound(&self) -> bool {
        self.text.contains(' ')
    }

    /// Text to splice into an operator position.
    fn operand(&self) -> String {
        if self.is_compound() && !fully_parenthesized(&self.text) {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }

    /// Operand for an xor fold; xor chains splice unwrapped.
    fn xor_operand(&self) -> String {
        if self.xor_chain {
            self.text.clone()
        } else {
            self.operand()
        }
    }

    fn negated(&self) -> Self {
        if self.is_compound() {
            Term::atom(format!("!({})", self.text))
        } else {
            Term::atom(format!("!{}", self.text))
        }
    }
}

/// Check if the outer parentheses of `text` enclose all of it.
fn fully_parenthesized(text: &str) -> bool {
    if !(text.starts_with('(') && text.ends_with(')')) {
        return false;
    }
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i + 1 < text.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

struct Deriver<'g> {
    graph: &'g Graph,
    /// Input node labels, shared across the whole derivation.
    labels: IndexMap<NodeIndex, String>,
    max_depth: usize,
}

impl Deriver<'_> {
    /// Build the term for `ix`.
    ///
    /// `visited` holds the nodes on the current path only; each branch gets
    /// its own copy so siblings do not see each other.
    fn build(&mut self, ix: NodeIndex, mut visited: HashSet<NodeIndex>) -> Result<Term, EquationError> {
        if visited.contains(&ix) {
            return Ok(Term::atom(CYCLE_MARKER));
        }
        if visited.len() >= self.max_depth {
            return Err(EquationError::RecursionLimit(self.max_depth));
        }
        visited.insert(ix);

        let graph = self.graph;
        let node = &graph.pg[ix];
        let kind = node.kind();
        if kind == NodeKind::Input {
            return Ok(Term::atom(self.label(ix)));
        }
        if kind.is_output() {
            let prefix: String = node.id().as_str().chars().take(4).collect();
            return Ok(Term::atom(format!("Node_{}", prefix)));
        }

        let mut inputs = Vec::with_capacity(kind.input_count());
        for socket in 0..kind.input_count() {
            if let Some((source, _)) = graph.source_of(ix, socket) {
                inputs.push(self.build(source, visited.clone())?);
            }
        }

        let term = match kind {
            NodeKind::And => join(&inputs, " * ").unwrap_or_else(|| Term::atom("0")),
            NodeKind::Or => join(&inputs, " + ").unwrap_or_else(|| Term::atom("0")),
            NodeKind::Nand => join(&inputs, " * ")
                .map(|t| Term::atom(format!("!({})", t.text)))
                .unwrap_or_else(|| Term::atom("1")),
            NodeKind::Nor => join(&inputs, " + ")
                .map(|t| Term::atom(format!("!({})", t.text)))
                .unwrap_or_else(|| Term::atom("1")),
            NodeKind::Not => inputs
                .first()
                .map(Term::negated)
                .unwrap_or_else(|| Term::atom("1")),
            NodeKind::Xor => xor_fold(&inputs, false).unwrap_or_else(|| Term::atom("0")),
            NodeKind::Xnor => xor_fold(&inputs, true).unwrap_or_else(|| Term::atom("1")),
            NodeKind::Input | NodeKind::Output | NodeKind::WriteOutput => {
                unreachable!("terminals handled above")
            }
        };
        Ok(term)
    }

    fn label(&mut self, ix: NodeIndex) -> String {
        let next = self.labels.len();
        self.labels
            .entry(ix)
            .or_insert_with(|| match u8::try_from(next) {
                Ok(n) if n < 26 => char::from(b'A' + n).to_string(),
                _ => format!("Input_{}", next + 1),
            })
            .clone()
    }
}

/// Join operands with `separator`, wrapping compound ones.
fn join(inputs: &[Term], separator: &str) -> Option<Term> {
    match inputs {
        [] => None,
        [single] => Some(single.clone()),
        _ => Some(Term::atom(
            inputs
                .iter()
                .map(Term::operand)
                .collect::<Vec<_>>()
                .join(separator),
        )),
    }
}

/// Pairwise `^` fold; with `negate_last` only the final step is negated.
fn xor_fold(inputs: &[Term], negate_last: bool) -> Option<Term> {
    let (first, rest) = inputs.split_first()?;
    if rest.is_empty() {
        return Some(if negate_last {
            first.negated()
        } else {
            first.clone()
        });
    }
    let mut acc = first.clone();
    for (i, next) in rest.iter().enumerate() {
        let text = format!("{} ^ {}", acc.xor_operand(), next.xor_operand());
        acc = if negate_last && i + 1 == rest.len() {
            Term::atom(format!("!({})", text))
        } else {
            Term {
                text,
                xor_chain: true,
            }
        };
    }
    Some(acc)
}
