//! Golden circuit integration tests.
//!
//! These tests drive complete circuits through wiring, evaluation,
//! equation derivation, history and document round trips.

use gatenet_core::{
    derive_equation, evaluate, ConnectionFault, Document, Editor, EquationError, EvalError, Graph,
    GraphError, NodeId, NodeKind, Position, SocketRef, Tri, CYCLE_MARKER,
};

/// Wire `source` output 0 into input `socket` of `dest`.
fn wire(graph: &mut Graph, source: &NodeId, dest: &NodeId, socket: usize) {
    graph
        .connect(
            SocketRef::output(source.clone(), 0),
            SocketRef::input(dest.clone(), socket),
        )
        .expect("connection should be accepted");
}

fn add(graph: &mut Graph, kind: NodeKind) -> NodeId {
    graph
        .add_node(kind, Position::default())
        .expect("node should be added")
}

/// Test case: Allow if Admin OR (Owner XOR Public)
///
/// Inputs: admin, owner, public
/// Gates: xor = owner XOR public, or = admin OR xor
#[test]
fn test_admin_or_owner_xor_public() {
    let mut graph = Graph::new();
    let admin = add(&mut graph, NodeKind::Input);
    let owner = add(&mut graph, NodeKind::Input);
    let public = add(&mut graph, NodeKind::Input);
    let xor = add(&mut graph, NodeKind::Xor);
    let or = add(&mut graph, NodeKind::Or);
    let out = add(&mut graph, NodeKind::Output);
    wire(&mut graph, &owner, &xor, 0);
    wire(&mut graph, &public, &xor, 1);
    wire(&mut graph, &admin, &or, 0);
    wire(&mut graph, &xor, &or, 1);
    wire(&mut graph, &or, &out, 0);

    let test_cases = [
        ((false, false, false), false),
        ((false, false, true), true),
        ((false, true, false), true),
        ((false, true, true), false),
        ((true, false, false), true),
        ((true, false, true), true),
        ((true, true, false), true),
        ((true, true, true), true),
    ];
    for ((a, o, p), expected) in test_cases {
        graph.set_input_value(&admin, a).unwrap();
        graph.set_input_value(&owner, o).unwrap();
        graph.set_input_value(&public, p).unwrap();
        assert_eq!(
            evaluate(&graph).unwrap()[&out],
            Tri::from(expected),
            "admin={}, owner={}, public={}",
            a,
            o,
            p
        );
        assert_eq!(graph.node(&out).unwrap().display(), Tri::from(expected));
    }

    let equation = derive_equation(&graph, &out).unwrap();
    assert_eq!(equation.expression, "A + (B ^ C)");
    assert_eq!(equation.label_of(&admin), Some("A"));
    assert_eq!(equation.label_of(&owner), Some("B"));
    assert_eq!(equation.label_of(&public), Some("C"));
}

#[test]
fn test_nand_equation_and_value() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Input);
    let b = add(&mut graph, NodeKind::Input);
    let nand = add(&mut graph, NodeKind::Nand);
    let out = add(&mut graph, NodeKind::WriteOutput);
    wire(&mut graph, &a, &nand, 0);
    wire(&mut graph, &b, &nand, 1);
    wire(&mut graph, &nand, &out, 0);

    assert_eq!(derive_equation(&graph, &out).unwrap().to_string(), "!(A * B)");
    assert_eq!(graph.input_value(&out, 0), Ok(Tri::True));
    graph.set_input_value(&a, true).unwrap();
    graph.set_input_value(&b, true).unwrap();
    assert_eq!(graph.input_value(&out, 0), Ok(Tri::False));
}

#[test]
fn test_xor_daisy_chain() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Input);
    let b = add(&mut graph, NodeKind::Input);
    let c = add(&mut graph, NodeKind::Input);
    let first = add(&mut graph, NodeKind::Xor);
    let second = add(&mut graph, NodeKind::Xor);
    let out = add(&mut graph, NodeKind::Output);
    wire(&mut graph, &a, &first, 0);
    wire(&mut graph, &b, &first, 1);
    wire(&mut graph, &first, &second, 0);
    wire(&mut graph, &c, &second, 1);
    wire(&mut graph, &second, &out, 0);

    assert_eq!(derive_equation(&graph, &out).unwrap().expression, "A ^ B ^ C");

    // Odd parity.
    for bits in 0u8..8 {
        let values = [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0];
        for (id, value) in [&a, &b, &c].into_iter().zip(values) {
            graph.set_input_value(id, value).unwrap();
        }
        let parity = values.iter().filter(|v| **v).count() % 2 == 1;
        assert_eq!(graph.node(&out).unwrap().display(), Tri::from(parity));
    }
}

#[test]
fn test_occupied_input_keeps_prior_connection() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Input);
    let b = add(&mut graph, NodeKind::Input);
    let out = add(&mut graph, NodeKind::Output);
    wire(&mut graph, &a, &out, 0);

    let err = graph
        .connect(SocketRef::output(b, 0), SocketRef::input(out.clone(), 0))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::InvalidConnection(ConnectionFault::DestinationOccupied {
            node: out.clone(),
            index: 0
        })
    );
    let incoming = graph.incoming(&SocketRef::input(out, 0)).unwrap();
    assert_eq!(incoming.source.node, a);
}

#[test]
fn test_cycle_reported_by_evaluator_and_deriver() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Input);
    let or = add(&mut graph, NodeKind::Or);
    let not = add(&mut graph, NodeKind::Not);
    let out = add(&mut graph, NodeKind::Output);
    wire(&mut graph, &a, &or, 0);
    wire(&mut graph, &or, &not, 0);
    wire(&mut graph, &not, &or, 1);
    wire(&mut graph, &or, &out, 0);

    assert!(matches!(evaluate(&graph), Err(EvalError::Cycle(_))));
    let equation = derive_equation(&graph, &out).unwrap();
    assert!(equation.expression.contains(CYCLE_MARKER));
    assert_eq!(graph.node(&out).unwrap().display(), Tri::Unknown);
}

#[test]
fn test_unconnected_output() {
    let mut graph = Graph::new();
    let out = add(&mut graph, NodeKind::Output);
    assert_eq!(derive_equation(&graph, &out), Err(EquationError::NotConnected));
    assert_eq!(evaluate(&graph).unwrap()[&out], Tri::Unknown);
}

#[test]
fn test_document_json_round_trip() {
    let mut graph = Graph::new();
    let a = graph
        .add_node(NodeKind::Input, Position::new(12.5, -4.0))
        .unwrap();
    let not = graph.add_node(NodeKind::Not, Position::new(80.0, 0.0)).unwrap();
    let out = graph
        .add_node(NodeKind::Output, Position::new(160.0, 0.0))
        .unwrap();
    wire(&mut graph, &a, &not, 0);
    wire(&mut graph, &not, &out, 0);
    graph.set_input_value(&a, true).unwrap();

    let json = serde_json::to_string(&graph.to_document()).unwrap();
    let document: Document = serde_json::from_str(&json).unwrap();
    let (loaded, report) = Graph::from_document(&document);

    assert!(report.is_clean());
    let ids: Vec<_> = loaded.nodes().map(|n| n.id().clone()).collect();
    assert_eq!(ids, vec![a.clone(), not, out.clone()]);
    assert_eq!(loaded.node(&a).unwrap().position(), Position::new(12.5, -4.0));
    assert!(loaded.node(&a).unwrap().value());
    assert_eq!(loaded.connection_count(), 2);
    assert_eq!(loaded.node(&out).unwrap().display(), Tri::False);
}

#[test]
fn test_editor_session() {
    let mut editor = Editor::new();
    let a = editor.add_node(NodeKind::Input, Position::default()).unwrap();
    let b = editor.add_node(NodeKind::Input, Position::default()).unwrap();
    let and = editor.add_node(NodeKind::And, Position::default()).unwrap();
    let out = editor.add_node(NodeKind::Output, Position::default()).unwrap();
    for (source, socket) in [(&a, 0), (&b, 1)] {
        editor
            .connect(
                SocketRef::output(source.clone(), 0),
                SocketRef::input(and.clone(), socket),
            )
            .unwrap();
    }
    editor
        .connect(SocketRef::output(and.clone(), 0), SocketRef::input(out.clone(), 0))
        .unwrap();
    editor.set_input_value(&a, true).unwrap();
    editor.set_input_value(&b, true).unwrap();
    assert_eq!(editor.display_value(&out), Some(Tri::True));

    let saved = editor.save_document();
    editor.delete_selection(&[and.clone()]);
    assert_eq!(editor.graph().connection_count(), 0);
    assert_eq!(editor.display_value(&out), Some(Tri::Unknown));

    assert!(editor.undo());
    assert_eq!(editor.save_document(), saved);
    assert_eq!(editor.display_value(&out), Some(Tri::True));
    assert_eq!(editor.derive_equation(&out).unwrap().expression, "A * B");
}
