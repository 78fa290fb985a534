// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{
    CellId, Connection, ConnectionStyle, DiagramId, GraphModel, Node, Shape,
};

use super::cells::{classify, collect_cells, infer_shape, is_truthy_flag, CellKind, RawCell};
use super::framing::{decode_payload, is_framed, DecodeError, Framing};

/// Hop bound when resolving a vertex's owning container through `parent`
/// references; malformed documents can make the chain self-referential.
const MAX_PARENT_HOPS: usize = 32;

#[derive(Debug)]
pub enum ParseError {
    Decode(DecodeError),
    Xml(roxmltree::Error),
    /// The document parsed, but no model root container was found anywhere.
    MissingModelRoot,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(source) => write!(f, "cannot decode framed payload: {source}"),
            Self::Xml(source) => write!(f, "cannot parse document text: {source}"),
            Self::MissingModelRoot => f.write_str("document has no mxGraphModel container"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(source) => Some(source),
            Self::Xml(source) => Some(source),
            Self::MissingModelRoot => None,
        }
    }
}

impl From<DecodeError> for ParseError {
    fn from(source: DecodeError) -> Self {
        Self::Decode(source)
    }
}

/// Parse document text — framed or plain — into the canonical graph.
///
/// `fallback_diagram_id` is used when the document carries no explicit
/// wrapper name.
pub fn parse_document(
    text: &str,
    fallback_diagram_id: &DiagramId,
) -> Result<GraphModel, ParseError> {
    let (inner, framed_name) = if is_framed(text) {
        let framing = Framing::strip(text);
        let name = framing.name().map(ToOwned::to_owned);
        (decode_payload(framing.payload())?, name)
    } else {
        (text.to_owned(), None)
    };

    let doc = roxmltree::Document::parse(&inner).map_err(ParseError::Xml)?;
    let model = doc
        .descendants()
        .find(|node| node.has_tag_name("mxGraphModel"))
        .ok_or(ParseError::MissingModelRoot)?;

    let document_name = framed_name.or_else(|| {
        doc.descendants()
            .find(|node| node.has_tag_name("diagram"))
            .and_then(|node| node.attribute("name"))
            .map(ToOwned::to_owned)
    });
    let diagram_id = document_name
        .and_then(|name| DiagramId::new(name).ok())
        .unwrap_or_else(|| fallback_diagram_id.clone());

    let cells = collect_cells(model);
    Ok(assemble(diagram_id, &cells))
}

fn assemble(diagram_id: DiagramId, cells: &[RawCell]) -> GraphModel {
    let mut graph = GraphModel::new(diagram_id);

    for cell in cells {
        match classify(cell) {
            CellKind::Vertex => {
                let Ok(id) = CellId::new(cell.id.clone()) else {
                    continue;
                };
                let mut node = Node::new_with(
                    id,
                    vertex_label(cell).unwrap_or_default(),
                    infer_shape(cell.style.as_deref()),
                    cell.x.unwrap_or(0.0),
                    cell.y.unwrap_or(0.0),
                );
                node.set_actor(owning_actor(cell, cells));
                graph.nodes_mut().push(node);
            }
            CellKind::Edge => {
                let (Some(source), Some(target)) = (cell.source.as_deref(), cell.target.as_deref())
                else {
                    // Endpoint-less edge records are dropped, never an error.
                    tracing::debug!(id = %cell.id, "dropping edge cell without both endpoints");
                    continue;
                };
                let (Ok(from), Ok(to)) = (CellId::new(source), CellId::new(target)) else {
                    continue;
                };
                graph.connections_mut().push(Connection::new_with(
                    from,
                    to,
                    CellId::new(cell.id.clone()).ok(),
                    connection_style(cell.style.as_deref()),
                ));
            }
            CellKind::Root | CellKind::Unknown => {}
        }
    }

    graph
}

/// Label candidates in priority order: wrapper label, wrapper value, cell
/// value.
fn vertex_label(cell: &RawCell) -> Option<String> {
    cell.wrapper_label
        .clone()
        .or_else(|| cell.wrapper_value.clone())
        .or_else(|| cell.value.clone())
}

/// The label of the nearest enclosing subprocess-container vertex, resolved
/// through the `parent` reference chain.
fn owning_actor(cell: &RawCell, cells: &[RawCell]) -> Option<String> {
    let mut parent_id = cell.parent.as_deref()?;

    for _ in 0..MAX_PARENT_HOPS {
        let parent = cells.iter().find(|candidate| candidate.id == parent_id)?;
        if classify(parent) == CellKind::Vertex
            && infer_shape(parent.style.as_deref()) == Shape::SubprocessContainer
        {
            return vertex_label(parent);
        }
        parent_id = parent.parent.as_deref()?;
    }

    None
}

fn connection_style(style: Option<&str>) -> ConnectionStyle {
    let mut out = ConnectionStyle::default();
    let Some(style) = style else {
        return out;
    };

    for token in style.split(';') {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "strokeWidth" => out.stroke_width = value.parse().ok(),
            "strokeColor" => out.stroke_color = Some(value.to_owned()),
            "startArrow" => out.start_arrow = Some(value.to_owned()),
            "endArrow" => out.end_arrow = Some(value.to_owned()),
            "dashed" => out.dashed = Some(is_truthy_flag(value)),
            "dashPattern" => out.dash_pattern = Some(value.to_owned()),
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{parse_document, ParseError};
    use crate::format::drawio::framing::encode_payload;
    use crate::model::{DiagramId, Shape};

    fn did(value: &str) -> DiagramId {
        DiagramId::new(value).expect("diagram id")
    }

    const MINIMAL: &str = r#"<mxGraphModel><root><mxCell id="0"/><mxCell id="1" parent="0"/><mxCell id="2" vertex="1" parent="1" value="Start"><mxGeometry x="0" y="0"/></mxCell></root></mxGraphModel>"#;

    #[test]
    fn framed_minimal_document_parses_to_one_rectangle() {
        let framed = format!(
            "<mxfile host=\"app\"><diagram id=\"p1\" name=\"flow-7\">{}</diagram></mxfile>",
            encode_payload(MINIMAL)
        );

        let graph = parse_document(&framed, &did("fallback")).expect("parse");
        assert_eq!(graph.diagram_id().as_str(), "flow-7");
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.connections().is_empty());

        let node = &graph.nodes()[0];
        assert_eq!(node.id().as_str(), "2");
        assert_eq!(node.label(), "Start");
        assert_eq!(node.shape(), Shape::Rectangle);
        assert_eq!((node.x(), node.y()), (0.0, 0.0));
    }

    #[test]
    fn plain_document_uses_fallback_diagram_id() {
        let graph = parse_document(MINIMAL, &did("fallback")).expect("parse");
        assert_eq!(graph.diagram_id().as_str(), "fallback");
    }

    #[test]
    fn uncompressed_wrapper_name_wins_over_fallback() {
        let text = format!(
            "<mxfile><diagram name=\"named\">{MINIMAL}</diagram></mxfile>"
        );
        let graph = parse_document(&text, &did("fallback")).expect("parse");
        assert_eq!(graph.diagram_id().as_str(), "named");
    }

    #[test]
    fn missing_model_root_is_a_format_error() {
        let err = parse_document("<svg><g/></svg>", &did("d")).unwrap_err();
        assert!(matches!(err, ParseError::MissingModelRoot));
    }

    #[test]
    fn malformed_xml_is_an_error_not_a_panic() {
        let err = parse_document("<mxGraphModel><root>", &did("d")).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn endpoint_less_edges_are_dropped_silently() {
        let text = r#"<mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <mxCell id="2" vertex="1" parent="1" value="A"/>
            <mxCell id="3" vertex="1" parent="1" value="B"/>
            <mxCell id="4" edge="1" parent="1" source="2" target="3"/>
            <mxCell id="5" edge="1" parent="1" source="2"/>
            <mxCell id="6" edge="1" parent="1"/>
        </root></mxGraphModel>"#;

        let graph = parse_document(text, &did("d")).expect("parse");
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connections()[0].from().as_str(), "2");
        assert_eq!(graph.connections()[0].to().as_str(), "3");
    }

    #[test]
    fn phantom_connections_survive_parsing() {
        let text = r#"<mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <mxCell id="2" vertex="1" parent="1" value="A"/>
            <mxCell id="4" edge="1" parent="1" source="2" target="99"/>
        </root></mxGraphModel>"#;

        let graph = parse_document(text, &did("d")).expect("parse");
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connections()[0].to().as_str(), "99");
    }

    #[test]
    fn edge_style_attributes_come_from_the_style_string() {
        let text = r#"<mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <mxCell id="2" vertex="1" parent="1" value="A"/>
            <mxCell id="3" vertex="1" parent="1" value="B"/>
            <mxCell id="4" edge="1" parent="1" source="2" target="3"
                    style="strokeWidth=3;strokeColor=#ff0000;startArrow=oval;endArrow=block;dashed=1;dashPattern=8 8;html=1"/>
        </root></mxGraphModel>"#;

        let graph = parse_document(text, &did("d")).expect("parse");
        let style = graph.connections()[0].style();
        assert_eq!(style.stroke_width, Some(3.0));
        assert_eq!(style.stroke_color.as_deref(), Some("#ff0000"));
        assert_eq!(style.start_arrow.as_deref(), Some("oval"));
        assert_eq!(style.end_arrow.as_deref(), Some("block"));
        assert_eq!(style.dashed, Some(true));
        assert_eq!(style.dash_pattern.as_deref(), Some("8 8"));
    }

    #[test]
    fn wrapped_vertex_label_beats_cell_value() {
        let text = r#"<mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <object id="5" label="Wrapper label">
              <mxCell vertex="1" parent="1" value="Cell value"/>
            </object>
        </root></mxGraphModel>"#;

        let graph = parse_document(text, &did("d")).expect("parse");
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].label(), "Wrapper label");
    }

    #[test]
    fn vertex_inside_swimlane_reports_its_owning_actor() {
        let text = r#"<mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <mxCell id="10" vertex="1" parent="1" value="Back office" style="swimlane;startSize=20"/>
            <mxCell id="11" vertex="1" parent="10" value="Approve"/>
            <mxCell id="12" vertex="1" parent="1" value="Outside"/>
        </root></mxGraphModel>"#;

        let graph = parse_document(text, &did("d")).expect("parse");
        let approve = graph
            .nodes()
            .iter()
            .find(|node| node.label() == "Approve")
            .expect("approve node");
        assert_eq!(approve.actor(), Some("Back office"));

        let outside = graph
            .nodes()
            .iter()
            .find(|node| node.label() == "Outside")
            .expect("outside node");
        assert_eq!(outside.actor(), None);
    }
}
