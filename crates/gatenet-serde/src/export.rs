//! Plain-text export of an output value and its equation.
//!
//! ```text
//! Logic Gate Output: 1
//!
//! Logic Equation: A * B
//! ```

use std::fs;
use std::path::Path;

use gatenet_core::{derive_equation, Equation, Graph, NodeId, Tri};
use tracing::{debug, warn};

use crate::error::{Result, SerdeError};

/// Render the export text. The equation line is omitted when `None`.
pub fn render_export(value: bool, equation: Option<&str>) -> String {
    let mut text = format!("Logic Gate Output: {}\n\n", u8::from(value));
    if let Some(equation) = equation {
        text.push_str("Logic Equation: ");
        text.push_str(equation);
    }
    text
}

/// Write the export file for an output value.
///
/// # Errors
///
/// Returns [`SerdeError::UnresolvedOutput`] if `value` is unknown, or an
/// I/O error if the file cannot be written.
pub fn export_equation(
    path: &Path,
    output: &NodeId,
    value: Tri,
    equation: Option<&Equation>,
) -> Result<()> {
    let value = value
        .as_bool()
        .ok_or_else(|| SerdeError::UnresolvedOutput(output.clone()))?;
    let text = render_export(value, equation.map(|e| e.expression.as_str()));
    fs::write(path, text).map_err(|e| SerdeError::write(path, e))?;
    debug!(path = %path.display(), output = %output, "exported equation");
    Ok(())
}

/// Export the displayed value of an Output node and its derived equation.
pub fn export_output(path: &Path, graph: &Graph, output: &NodeId) -> Result<()> {
    let node = graph
        .node(output)
        .ok_or_else(|| SerdeError::UnknownNode(output.clone()))?;
    let equation = match derive_equation(graph, output) {
        Ok(equation) => Some(equation),
        Err(err) => {
            warn!(output = %output, error = %err, "exporting without equation");
            None
        }
    };
    export_equation(path, output, node.display(), equation.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatenet_core::{NodeKind, Position, SocketRef};

    #[test]
    fn test_render() {
        assert_eq!(
            render_export(true, Some("!(A * B)")),
            "Logic Gate Output: 1\n\nLogic Equation: !(A * B)"
        );
        assert_eq!(render_export(false, None), "Logic Gate Output: 0\n\n");
    }

    #[test]
    fn test_export_output() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        let b = graph.add_node(NodeKind::Input, Position::default()).unwrap();
        let or = graph.add_node(NodeKind::Or, Position::default()).unwrap();
        let out = graph.add_node(NodeKind::Output, Position::default()).unwrap();
        graph
            .connect(SocketRef::output(a.clone(), 0), SocketRef::input(or.clone(), 0))
            .unwrap();
        graph
            .connect(SocketRef::output(b, 0), SocketRef::input(or.clone(), 1))
            .unwrap();
        graph
            .connect(SocketRef::output(or, 0), SocketRef::input(out.clone(), 0))
            .unwrap();
        graph.set_input_value(&a, true).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        export_output(&path, &graph, &out).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Logic Gate Output: 1\n\nLogic Equation: A + B"
        );
    }

    #[test]
    fn test_unresolved_output_not_written() {
        let mut graph = Graph::new();
        let out = graph.add_node(NodeKind::Output, Position::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let err = export_output(&path, &graph, &out).unwrap_err();
        assert!(matches!(err, SerdeError::UnresolvedOutput(id) if id == out));
        assert!(!path.exists());

        let missing = NodeId::from("missing");
        assert!(matches!(
            export_output(&path, &graph, &missing),
            Err(SerdeError::UnknownNode(_))
        ));
    }
}
