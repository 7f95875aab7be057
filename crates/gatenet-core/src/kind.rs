//! Node kinds and the tri-state logic value.
//!
//! Every node in a circuit is one of a closed, finite set of kinds. Each
//! kind carries a small strategy table: socket arity, persisted type name,
//! display symbol and the boolean function it computes.

use std::fmt;
use std::str::FromStr;

/// Three-valued logic result.
///
/// `Unknown` means "not resolvable yet" because some upstream input is
/// unconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tri {
    /// Logical true.
    True,
    /// Logical false.
    False,
    /// Not yet wired.
    #[default]
    Unknown,
}

impl Tri {
    /// Convert to a plain boolean, if resolved.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Tri::True => Some(true),
            Tri::False => Some(false),
            Tri::Unknown => None,
        }
    }

    /// Check if the value is resolved.
    pub fn is_known(self) -> bool {
        self != Tri::Unknown
    }

    /// Digit shown by output nodes. Unknown shows as `0`.
    pub fn digit(self) -> char {
        if self == Tri::True {
            '1'
        } else {
            '0'
        }
    }
}

impl From<bool> for Tri {
    fn from(value: bool) -> Self {
        if value {
            Tri::True
        } else {
            Tri::False
        }
    }
}

impl From<Option<bool>> for Tri {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Tri::Unknown, Tri::from)
    }
}

impl fmt::Display for Tri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tri::True => write!(f, "1"),
            Tri::False => write!(f, "0"),
            Tri::Unknown => write!(f, "?"),
        }
    }
}

/// Socket direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Consumes a value; holds at most one connection.
    Input,
    /// Produces a value; fans out to any number of connections.
    Output,
}

/// The kind of a circuit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // === Terminals ===
    /// User-controlled boolean source.
    Input,
    /// Displays the value on its single input.
    Output,
    /// Output that can also export its value and equation.
    WriteOutput,

    // === Gates ===
    /// A ∧ B
    And,
    /// A ∨ B
    Or,
    /// ¬A
    Not,
    /// ¬(A ∧ B)
    Nand,
    /// ¬(A ∨ B)
    Nor,
    /// A ⊕ B
    Xor,
    /// ¬(A ⊕ B)
    Xnor,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Input,
        NodeKind::Output,
        NodeKind::WriteOutput,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Nand,
        NodeKind::Nor,
        NodeKind::Xor,
        NodeKind::Xnor,
    ];

    /// Number of input sockets.
    pub fn input_count(self) -> usize {
        match self {
            NodeKind::Input => 0,
            NodeKind::Output | NodeKind::WriteOutput | NodeKind::Not => 1,
            _ => 2,
        }
    }

    /// Number of output sockets.
    pub fn output_count(self) -> usize {
        match self {
            NodeKind::Output | NodeKind::WriteOutput => 0,
            _ => 1,
        }
    }

    /// Number of sockets in the given direction.
    pub fn socket_count(self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.input_count(),
            Direction::Output => self.output_count(),
        }
    }

    /// Check if this kind displays a value (Output or WriteOutput).
    pub fn is_output(self) -> bool {
        matches!(self, NodeKind::Output | NodeKind::WriteOutput)
    }

    /// Check if this kind is a logic gate.
    pub fn is_gate(self) -> bool {
        !matches!(
            self,
            NodeKind::Input | NodeKind::Output | NodeKind::WriteOutput
        )
    }

    /// Name used in the persisted document format.
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::Input => "InputNode",
            NodeKind::Output => "OutputNode",
            NodeKind::WriteOutput => "WriteOutputNode",
            NodeKind::And => "AndNode",
            NodeKind::Or => "OrNode",
            NodeKind::Not => "NotNode",
            NodeKind::Nand => "NandNode",
            NodeKind::Nor => "NorNode",
            NodeKind::Xor => "XorNode",
            NodeKind::Xnor => "XnorNode",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            NodeKind::Input => "Input",
            NodeKind::Output => "Output",
            NodeKind::WriteOutput => "Write Output",
            NodeKind::And => "AND",
            NodeKind::Or => "OR",
            NodeKind::Not => "NOT",
            NodeKind::Nand => "NAND",
            NodeKind::Nor => "NOR",
            NodeKind::Xor => "XOR",
            NodeKind::Xnor => "XNOR",
        }
    }

    /// Gate symbol, if this kind is a gate.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            NodeKind::And => Some("∧"),
            NodeKind::Or => Some("∨"),
            NodeKind::Not => Some("¬"),
            NodeKind::Nand => Some("⊼"),
            NodeKind::Nor => Some("⊽"),
            NodeKind::Xor => Some("⊕"),
            NodeKind::Xnor => Some("⊙"),
            _ => None,
        }
    }

    /// Apply this gate's function to resolved inputs.
    ///
    /// Returns `None` for terminals, which do not compute from inputs.
    #[inline]
    pub fn apply(self, a: bool, b: bool) -> Option<bool> {
        match self {
            NodeKind::And => Some(a && b),
            NodeKind::Or => Some(a || b),
            NodeKind::Not => Some(!a),
            NodeKind::Nand => Some(!(a && b)),
            NodeKind::Nor => Some(!(a || b)),
            NodeKind::Xor => Some(a != b),
            NodeKind::Xnor => Some(a == b),
            NodeKind::Input | NodeKind::Output | NodeKind::WriteOutput => None,
        }
    }

    /// Evaluate this gate over tri-state inputs.
    ///
    /// Any `Unknown` among the required inputs makes the result `Unknown`.
    pub fn eval(self, inputs: &[Tri]) -> Tri {
        let arity = self.input_count();
        if !self.is_gate() || inputs.len() < arity {
            return Tri::Unknown;
        }
        let mut resolved = [false; 2];
        for (slot, value) in resolved.iter_mut().zip(&inputs[..arity]) {
            match value.as_bool() {
                Some(b) => *slot = b,
                None => return Tri::Unknown,
            }
        }
        Tri::from(self.apply(resolved[0], resolved[1]))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| format!("unknown node kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truth(kind: NodeKind) -> [bool; 4] {
        let cases = [(false, false), (false, true), (true, false), (true, true)];
        cases.map(|(a, b)| kind.apply(a, b).unwrap())
    }

    #[test]
    fn test_binary_truth_tables() {
        assert_eq!(truth(NodeKind::And), [false, false, false, true]);
        assert_eq!(truth(NodeKind::Or), [false, true, true, true]);
        assert_eq!(truth(NodeKind::Nand), [true, true, true, false]);
        assert_eq!(truth(NodeKind::Nor), [true, false, false, false]);
        assert_eq!(truth(NodeKind::Xor), [false, true, true, false]);
        assert_eq!(truth(NodeKind::Xnor), [true, false, false, true]);
    }

    #[test]
    fn test_not_gate() {
        assert_eq!(NodeKind::Not.eval(&[Tri::True]), Tri::False);
        assert_eq!(NodeKind::Not.eval(&[Tri::False]), Tri::True);
        assert_eq!(NodeKind::Not.eval(&[Tri::Unknown]), Tri::Unknown);
    }

    #[test]
    fn test_unknown_propagates() {
        assert_eq!(NodeKind::And.eval(&[Tri::True, Tri::Unknown]), Tri::Unknown);
        // No short circuit on a dominating operand.
        assert_eq!(NodeKind::And.eval(&[Tri::False, Tri::Unknown]), Tri::Unknown);
        assert_eq!(NodeKind::Or.eval(&[Tri::Unknown, Tri::True]), Tri::Unknown);
    }

    #[test]
    fn test_terminals_do_not_compute() {
        assert_eq!(NodeKind::Input.apply(true, true), None);
        assert_eq!(NodeKind::Output.eval(&[Tri::True]), Tri::Unknown);
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(
            (NodeKind::Input.input_count(), NodeKind::Input.output_count()),
            (0, 1)
        );
        assert_eq!(
            (
                NodeKind::WriteOutput.input_count(),
                NodeKind::WriteOutput.output_count()
            ),
            (1, 0)
        );
        assert_eq!(
            (NodeKind::Not.input_count(), NodeKind::Not.output_count()),
            (1, 1)
        );
        assert_eq!(
            (NodeKind::Xnor.input_count(), NodeKind::Xnor.output_count()),
            (2, 1)
        );
    }

    #[test]
    fn test_type_name_parse() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.type_name().parse::<NodeKind>(), Ok(kind));
        }
        assert!("BufferNode".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_tri_conversions() {
        assert_eq!(Tri::from(true), Tri::True);
        assert_eq!(Tri::from(None), Tri::Unknown);
        assert_eq!(Tri::False.as_bool(), Some(false));
        assert_eq!(Tri::Unknown.digit(), '0');
        assert_eq!(Tri::True.digit(), '1');
    }
}
