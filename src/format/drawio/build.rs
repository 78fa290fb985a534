// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::model::{Connection, GraphModel, Shape};

pub(crate) const NODE_WIDTH: f64 = 120.0;
pub(crate) const NODE_HEIGHT: f64 = 60.0;

pub(crate) const DEFAULT_EDGE_STYLE: &str =
    "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;";

/// Style string a shape category builds to.
///
/// Each style round-trips through shape inference back to the same category.
pub(crate) fn style_for_shape(shape: Shape) -> &'static str {
    match shape {
        Shape::Rectangle => "rounded=0;whiteSpace=wrap;html=1;",
        Shape::Ellipse => "ellipse;whiteSpace=wrap;html=1;",
        Shape::Decision => "rhombus;whiteSpace=wrap;html=1;",
        Shape::Data => {
            "shape=parallelogram;perimeter=parallelogramPerimeter;whiteSpace=wrap;html=1;"
        }
        Shape::Document => "shape=document;whiteSpace=wrap;html=1;boundedLbl=1;",
        Shape::SubprocessContainer => "swimlane;whiteSpace=wrap;html=1;startSize=20;",
    }
}

/// Escape the five reserved markup characters for attribute/text content.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn connection_style_string(connection: &Connection) -> String {
    let mut style = DEFAULT_EDGE_STYLE.to_owned();
    let attrs = connection.style();
    if let Some(width) = attrs.stroke_width {
        let _ = write!(style, "strokeWidth={width};");
    }
    if let Some(color) = attrs.stroke_color.as_deref() {
        let _ = write!(style, "strokeColor={color};");
    }
    if let Some(arrow) = attrs.start_arrow.as_deref() {
        let _ = write!(style, "startArrow={arrow};");
    }
    if let Some(arrow) = attrs.end_arrow.as_deref() {
        let _ = write!(style, "endArrow={arrow};");
    }
    if let Some(dashed) = attrs.dashed {
        let _ = write!(style, "dashed={};", if dashed { 1 } else { 0 });
    }
    if let Some(pattern) = attrs.dash_pattern.as_deref() {
        let _ = write!(style, "dashPattern={pattern};");
    }
    style
}

/// Synthesize a fresh, minimal document from a canonical graph.
///
/// Only used when no prior document exists; an existing document is always
/// patched in place instead so unmodeled content survives.
pub fn build_document(graph: &GraphModel) -> String {
    let mut out = String::new();
    out.push_str("<mxGraphModel dx=\"800\" dy=\"600\" grid=\"1\" gridSize=\"10\">\n");
    out.push_str("  <root>\n");
    out.push_str("    <mxCell id=\"0\" />\n");
    out.push_str("    <mxCell id=\"1\" parent=\"0\" />\n");

    for node in graph.nodes() {
        let _ = write!(
            out,
            "    <mxCell id=\"{id}\" value=\"{value}\" style=\"{style}\" vertex=\"1\" parent=\"1\">\n      <mxGeometry x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" as=\"geometry\" />\n    </mxCell>\n",
            id = escape_xml(node.id().as_str()),
            value = escape_xml(node.label()),
            style = style_for_shape(node.shape()),
            x = node.x(),
            y = node.y(),
            w = NODE_WIDTH,
            h = NODE_HEIGHT,
        );
    }

    let mut ordinals = BTreeMap::<(&str, &str), usize>::new();
    for connection in graph.connections() {
        let key = (connection.from().as_str(), connection.to().as_str());
        let ordinal = ordinals.entry(key).or_insert(0);
        let _ = write!(
            out,
            "    <mxCell id=\"edge-{from}-{to}-{ordinal}\" style=\"{style}\" edge=\"1\" parent=\"1\" source=\"{from}\" target=\"{to}\">\n      <mxGeometry relative=\"1\" as=\"geometry\" />\n    </mxCell>\n",
            from = escape_xml(connection.from().as_str()),
            to = escape_xml(connection.to().as_str()),
            ordinal = ordinal,
            style = connection_style_string(connection),
        );
        *ordinal += 1;
    }

    out.push_str("  </root>\n");
    out.push_str("</mxGraphModel>\n");
    out
}
