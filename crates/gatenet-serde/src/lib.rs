//! Circuit file persistence for gatenet.
//!
//! `.circuit` files hold a [`Document`] as JSON pretty-printed with a
//! 4-space indent. Reads are all-or-nothing at the file level: an I/O or
//! syntax error leaves the caller's state untouched, while individual bad
//! records inside a well-formed document are skipped and reported by
//! [`LoadReport`].
//!
//! ```
//! use gatenet_core::{Graph, NodeKind, Position};
//!
//! let mut graph = Graph::new();
//! graph.add_node(NodeKind::Input, Position::new(0.0, 0.0)).unwrap();
//!
//! let text = gatenet_serde::encode(&graph.to_document()).unwrap();
//! assert!(text.starts_with("{\n    \"nodes\": ["));
//!
//! let document = gatenet_serde::decode(&text).unwrap();
//! assert_eq!(document, graph.to_document());
//! ```

pub mod error;
pub mod export;

use std::fs;
use std::path::{Path, PathBuf};

use gatenet_core::{Document, Editor, Graph, Limits, LoadReport};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

pub use error::{Result, SerdeError};
pub use export::{export_equation, export_output, render_export};

/// File extension for circuit documents.
pub const CIRCUIT_EXTENSION: &str = "circuit";

/// File filter description for dialog boxes.
pub const CIRCUIT_FILE_FILTER: &str = "Circuit Files (*.circuit)";

const INDENT: &[u8] = b"    ";

/// Encode a document as 4-space indented JSON.
pub fn encode(document: &Document) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

/// Decode a document from JSON text.
pub fn decode(text: &str) -> Result<Document> {
    Ok(serde_json::from_str(text)?)
}

/// `path` with the `.circuit` extension if it has no extension.
pub fn with_circuit_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(CIRCUIT_EXTENSION)
    }
}

/// Write a document to `path`.
pub fn write_document(path: &Path, document: &Document) -> Result<()> {
    let text = encode(document)?;
    fs::write(path, text).map_err(|e| SerdeError::write(path, e))?;
    debug!(
        path = %path.display(),
        nodes = document.nodes.len(),
        connections = document.connections.len(),
        "wrote circuit"
    );
    Ok(())
}

/// Read a document from `path`.
pub fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).map_err(|e| SerdeError::read(path, e))?;
    decode(&text)
}

/// Save a graph as a `.circuit` file.
pub fn save_circuit(path: &Path, graph: &Graph) -> Result<()> {
    write_document(path, &graph.to_document())
}

/// Load a graph from a `.circuit` file with default limits.
pub fn load_circuit(path: &Path) -> Result<(Graph, LoadReport)> {
    load_circuit_with_limits(path, Limits::default())
}

/// Load a graph from a `.circuit` file.
pub fn load_circuit_with_limits(path: &Path, limits: Limits) -> Result<(Graph, LoadReport)> {
    let document = read_document(path)?;
    Ok(Graph::from_document_with_limits(&document, limits))
}

/// Save an editor's document and mark it clean.
pub fn save_session(path: &Path, editor: &mut Editor) -> Result<()> {
    write_document(path, &editor.save_document())?;
    editor.mark_saved();
    info!(path = %path.display(), "saved circuit");
    Ok(())
}

/// Open a `.circuit` file into an editor.
///
/// The editor is only touched once the file has been read and parsed.
pub fn open_session(path: &Path, editor: &mut Editor) -> Result<LoadReport> {
    let document = read_document(path)?;
    let report = editor.load_document(&document);
    info!(
        path = %path.display(),
        skipped = report.skipped.len(),
        "opened circuit"
    );
    Ok(report)
}
