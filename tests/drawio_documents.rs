// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use proteus::document::Document;
use proteus::model::{CellId, DiagramId, Shape, Subprocess};
use proteus::ops::{EditOp, EditSet};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("drawio")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
}

fn did(value: &str) -> DiagramId {
    DiagramId::new(value).expect("diagram id")
}

fn cid(value: &str) -> CellId {
    CellId::new(value).expect("cell id")
}

fn assert_claims_flow_graph(document: &Document) {
    let graph = document.graph().expect("canonical graph");
    assert_eq!(graph.diagram_id().as_str(), "Claims flow");

    let labels: Vec<&str> = graph.nodes().iter().map(|node| node.label()).collect();
    assert_eq!(labels, ["Receive claim", "Assess damage", "Archive report"]);

    let shapes: Vec<Shape> = graph.nodes().iter().map(|node| node.shape()).collect();
    assert_eq!(shapes, [Shape::Rectangle, Shape::Decision, Shape::Document]);

    assert_eq!(graph.connections().len(), 2);
    let styled = &graph.connections()[1];
    assert_eq!(styled.style().dashed, Some(true));
    assert_eq!(styled.style().stroke_color.as_deref(), Some("#9673a6"));
}

#[test]
fn compressed_and_plain_exports_parse_to_the_same_graph() {
    let compressed = Document::from_text(did("fallback"), read_fixture("claims_flow_compressed.drawio"));
    let plain = Document::from_text(did("fallback"), read_fixture("claims_flow_plain.drawio"));

    assert_claims_flow_graph(&compressed);
    assert_claims_flow_graph(&plain);
    assert_eq!(compressed.graph(), plain.graph());
}

#[test]
fn editing_a_compressed_export_keeps_the_wrapper_and_the_framing() {
    let original = read_fixture("claims_flow_compressed.drawio");
    let mut document = Document::from_text(did("fallback"), original.clone());

    let edits: EditSet = [
        EditOp::SetNodeLabel {
            node_id: cid("2"),
            label: "Register claim".to_owned(),
        },
        EditOp::AddSubprocess {
            owner_id: cid("3"),
            subprocess: Subprocess::new("Request photos"),
        },
    ]
    .into_iter()
    .collect();
    document.apply(&edits).expect("apply");

    let text = document.text();
    // The outer wrapper survives byte-exact; only the payload changed.
    assert!(text.starts_with("<mxfile host=\"app.diagrams.net\" modified=\"2026-02-11T09:14:02.511Z\""));
    assert!(text.contains("<diagram id=\"kD2hFQn5xbPQzkYTsmvg\" name=\"Claims flow\">"));
    assert!(text.ends_with("</diagram></mxfile>"));
    // Still compressed: the model is not stored in the clear.
    assert!(!text.contains("<mxGraphModel"));
    assert_ne!(text, original);

    let graph = document.graph().expect("canonical graph");
    assert!(graph.nodes().iter().any(|node| node.label() == "Register claim"));
    assert!(graph.nodes().iter().any(|node| node.label() == "Request photos"));
    assert_eq!(graph.connections().len(), 3);
}

#[test]
fn reapplied_subprocess_edit_is_idempotent_for_nodes() {
    let mut document =
        Document::from_text(did("fallback"), read_fixture("claims_flow_plain.drawio"));

    let edits: EditSet = [EditOp::AddSubprocess {
        owner_id: cid("3"),
        subprocess: Subprocess::new("Request photos"),
    }]
    .into_iter()
    .collect();

    document.apply(&edits).expect("first apply");
    let nodes_after_first = document.graph().expect("graph").nodes().len();
    let connections_after_first = document.graph().expect("graph").connections().len();

    document.apply(&edits).expect("second apply");
    let graph = document.graph().expect("graph");

    assert_eq!(graph.nodes().len(), nodes_after_first);
    assert_eq!(graph.connections().len(), connections_after_first + 1);
}
