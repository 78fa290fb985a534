// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cell extraction and classification.
//!
//! Extraction flattens the parsed document tree into an ordered list of
//! identity-bearing elements, merging "business object" wrappers
//! (`<object>`, `<UserObject>`, arbitrary foreign tags) with the `mxCell`
//! they carry. Classification tags each extracted cell exactly once as
//! vertex, edge, root, or unknown; downstream code switches on the tag
//! instead of re-probing attributes.

use crate::model::Shape;

/// Nesting bound for the recursive walk. Parsed trees cannot be cyclic, but
/// documents from drifted tool versions nest wrappers arbitrarily deep and
/// the walk must not be the thing that blows the stack.
const MAX_DEPTH: usize = 64;

/// One identity-bearing element, flattened.
///
/// For a wrapped cell the identity and `label`/`value` come from the wrapper
/// while flags, style, endpoints, and geometry come from the inner `mxCell`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawCell {
    pub id: String,
    pub style: Option<String>,
    pub value: Option<String>,
    pub vertex: Option<String>,
    pub edge: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub parent: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub wrapper_label: Option<String>,
    pub wrapper_value: Option<String>,
    /// No attribute besides the identity, and no inner cell.
    pub bare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    Vertex,
    Edge,
    /// Structural cell (identity "0"/"1", or identity-only): never emitted.
    Root,
    /// Explicitly contradictory flags; ignored.
    Unknown,
}

/// Flags arrive as numeric `1`, string `"1"`, or boolean `true` depending on
/// which tool version wrote the document; all three spellings are truthy.
pub(crate) fn is_truthy_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

pub(crate) fn classify(cell: &RawCell) -> CellKind {
    if cell.id == "0" || cell.id == "1" || cell.bare {
        return CellKind::Root;
    }
    if cell.vertex.as_deref().is_some_and(is_truthy_flag) {
        return CellKind::Vertex;
    }
    if cell.edge.as_deref().is_some_and(is_truthy_flag) {
        return CellKind::Edge;
    }
    if cell.vertex.is_none() && cell.edge.is_none() {
        // Malformed record fallback: endpoint references decide.
        if cell.source.is_none() && cell.target.is_none() {
            return CellKind::Vertex;
        }
        return CellKind::Edge;
    }
    CellKind::Unknown
}

/// Infer the shape category from a cell's style text.
///
/// First match wins; the rule order is the deliberate tie-break for style
/// strings carrying several keywords and must not be reordered.
pub(crate) fn infer_shape(style: Option<&str>) -> Shape {
    let Some(style) = style else {
        return Shape::Rectangle;
    };
    let style = style.to_ascii_lowercase();

    if style.contains("ellipse") {
        Shape::Ellipse
    } else if style.contains("rhombus") || style.contains("diamond") {
        Shape::Decision
    } else if style.contains("parallelogram") {
        Shape::Data
    } else if style.contains("document") {
        Shape::Document
    } else if style.contains("swimlane") || style.contains("subprocess") {
        Shape::SubprocessContainer
    } else {
        Shape::Rectangle
    }
}

/// Collect every cell-like element under `scope` in document order.
pub(crate) fn collect_cells(scope: roxmltree::Node<'_, '_>) -> Vec<RawCell> {
    let mut out = Vec::new();
    walk(scope, 0, &mut out);
    out
}

fn walk(node: roxmltree::Node<'_, '_>, depth: usize, out: &mut Vec<RawCell>) {
    if depth > MAX_DEPTH {
        return;
    }

    for child in node.children().filter(|child| child.is_element()) {
        if child.tag_name().name() == "mxCell" {
            if child.has_attribute("id") {
                out.push(cell_record(child, None));
            }
            walk(child, depth + 1, out);
            continue;
        }

        if child.has_attribute("id") {
            // Business-object wrapper: merge its identity-bearing fields with
            // the inner cell (which may sit one or two levels down), then
            // keep extracting beneath the inner cell.
            if let Some(inner) = find_inner_cell(child) {
                out.push(cell_record(inner, Some(child)));
                if inner.has_attribute("id") && inner.attribute("id") != child.attribute("id") {
                    out.push(cell_record(inner, None));
                }
                walk(inner, depth + 1, out);
            } else {
                out.push(cell_record(child, None));
                walk(child, depth + 1, out);
            }
            continue;
        }

        walk(child, depth + 1, out);
    }
}

fn find_inner_cell<'a, 'input>(
    wrapper: roxmltree::Node<'a, 'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    let mut elements = wrapper.children().filter(|child| child.is_element());
    if let Some(cell) = elements.clone().find(|el| el.tag_name().name() == "mxCell") {
        return Some(cell);
    }
    elements.find_map(|el| {
        el.children()
            .filter(|child| child.is_element())
            .find(|grand| grand.tag_name().name() == "mxCell")
    })
}

fn cell_record(
    cell: roxmltree::Node<'_, '_>,
    wrapper: Option<roxmltree::Node<'_, '_>>,
) -> RawCell {
    let identity_carrier = wrapper.unwrap_or(cell);
    let id = identity_carrier
        .attribute("id")
        .or_else(|| cell.attribute("id"))
        .unwrap_or_default()
        .to_owned();

    let own = |key: &str| cell.attribute(key).map(ToOwned::to_owned);
    let geometry = cell
        .children()
        .filter(|child| child.is_element())
        .find(|child| child.tag_name().name() == "mxGeometry");

    let attr_count = identity_carrier.attributes().count()
        + match wrapper {
            Some(_) => cell.attributes().count(),
            None => 0,
        };

    // A foreign tag emitted on its own still carries its label/value the way
    // a wrapper would.
    let standalone_wrapper = wrapper.is_none() && cell.tag_name().name() != "mxCell";
    let wrapper_label = match wrapper {
        Some(w) => w.attribute("label").map(ToOwned::to_owned),
        None if standalone_wrapper => own("label"),
        None => None,
    };
    let wrapper_value = match wrapper {
        Some(w) => w.attribute("value").map(ToOwned::to_owned),
        None => None,
    };

    RawCell {
        id,
        style: own("style"),
        value: own("value"),
        vertex: own("vertex"),
        edge: own("edge"),
        source: own("source"),
        target: own("target"),
        parent: own("parent")
            .or_else(|| wrapper.and_then(|w| w.attribute("parent").map(ToOwned::to_owned))),
        x: geometry.and_then(|g| g.attribute("x")).and_then(|v| v.parse().ok()),
        y: geometry.and_then(|g| g.attribute("y")).and_then(|v| v.parse().ok()),
        wrapper_label,
        wrapper_value,
        bare: attr_count <= 1 && wrapper.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, collect_cells, infer_shape, is_truthy_flag, CellKind, RawCell};
    use crate::model::Shape;
    use rstest::rstest;

    fn parse(xml: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(xml).expect("fixture xml")
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("", false)]
    #[case("yes", false)]
    fn flag_truthiness(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_truthy_flag(value), expected);
    }

    #[rstest]
    #[case(Some("ellipse;whiteSpace=wrap"), Shape::Ellipse)]
    #[case(Some("rhombus;html=1"), Shape::Decision)]
    #[case(Some("shape=DIAMOND"), Shape::Decision)]
    #[case(Some("shape=parallelogram;perimeter=parallelogramPerimeter"), Shape::Data)]
    #[case(Some("shape=document"), Shape::Document)]
    #[case(Some("swimlane;startSize=20"), Shape::SubprocessContainer)]
    #[case(Some("subprocess=1"), Shape::SubprocessContainer)]
    #[case(Some("rounded=0"), Shape::Rectangle)]
    #[case(None, Shape::Rectangle)]
    // The fixed priority order is the oracle: ellipse beats rhombus when a
    // style carries both keywords.
    #[case(Some("rhombus;ellipse"), Shape::Ellipse)]
    #[case(Some("ellipse;rhombus"), Shape::Ellipse)]
    #[case(Some("swimlane;document"), Shape::Document)]
    fn shape_inference(#[case] style: Option<&str>, #[case] expected: Shape) {
        assert_eq!(infer_shape(style), expected);
    }

    #[test]
    fn classifies_flagged_and_fallback_cells() {
        let vertex = RawCell {
            id: "2".to_owned(),
            vertex: Some("1".to_owned()),
            ..RawCell::default()
        };
        assert_eq!(classify(&vertex), CellKind::Vertex);

        let edge = RawCell {
            id: "7".to_owned(),
            edge: Some("true".to_owned()),
            ..RawCell::default()
        };
        assert_eq!(classify(&edge), CellKind::Edge);

        // No flags, no endpoints: malformed vertex record.
        let bare_vertexish = RawCell {
            id: "9".to_owned(),
            value: Some("Step".to_owned()),
            ..RawCell::default()
        };
        assert_eq!(classify(&bare_vertexish), CellKind::Vertex);

        // No flags, one endpoint: edge-shaped, even though the assembler
        // will drop it for the missing endpoint.
        let half_edge = RawCell {
            id: "10".to_owned(),
            source: Some("2".to_owned()),
            value: Some("x".to_owned()),
            ..RawCell::default()
        };
        assert_eq!(classify(&half_edge), CellKind::Edge);

        // Explicitly falsy flag with the opposite flag absent.
        let contradictory = RawCell {
            id: "11".to_owned(),
            vertex: Some("0".to_owned()),
            value: Some("x".to_owned()),
            ..RawCell::default()
        };
        assert_eq!(classify(&contradictory), CellKind::Unknown);
    }

    #[test]
    fn structural_cells_are_root() {
        for id in ["0", "1"] {
            let cell = RawCell {
                id: id.to_owned(),
                vertex: Some("1".to_owned()),
                ..RawCell::default()
            };
            assert_eq!(classify(&cell), CellKind::Root);
        }

        let identity_only = RawCell {
            id: "55".to_owned(),
            bare: true,
            ..RawCell::default()
        };
        assert_eq!(classify(&identity_only), CellKind::Root);
    }

    #[test]
    fn extraction_collects_plain_cells_in_document_order() {
        let doc = parse(
            r#"<mxGraphModel><root>
                <mxCell id="0"/>
                <mxCell id="1" parent="0"/>
                <mxCell id="2" vertex="1" parent="1" value="Start" style="ellipse">
                  <mxGeometry x="40" y="80" as="geometry"/>
                </mxCell>
                <mxCell id="3" edge="1" source="2" target="4"/>
            </root></mxGraphModel>"#,
        );

        let cells = collect_cells(doc.root_element());
        let ids: Vec<&str> = cells.iter().map(|cell| cell.id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "2", "3"]);

        let start = &cells[2];
        assert_eq!(start.value.as_deref(), Some("Start"));
        assert_eq!(start.style.as_deref(), Some("ellipse"));
        assert_eq!((start.x, start.y), (Some(40.0), Some(80.0)));
        assert_eq!(cells[3].source.as_deref(), Some("2"));
    }

    #[test]
    fn extraction_merges_wrapped_cells() {
        let doc = parse(
            r#"<mxGraphModel><root>
                <object id="5" label="Review order">
                  <mxCell style="rhombus" vertex="1" parent="1">
                    <mxGeometry x="200" y="120" as="geometry"/>
                  </mxCell>
                </object>
            </root></mxGraphModel>"#,
        );

        let cells = collect_cells(doc.root_element());
        assert_eq!(cells.len(), 1);
        let cell = &cells[0];
        assert_eq!(cell.id, "5");
        assert_eq!(cell.wrapper_label.as_deref(), Some("Review order"));
        assert_eq!(cell.style.as_deref(), Some("rhombus"));
        assert_eq!(classify(cell), CellKind::Vertex);
        assert_eq!((cell.x, cell.y), (Some(200.0), Some(120.0)));
    }

    #[test]
    fn extraction_reaches_cells_nested_two_wrapper_levels_down() {
        let doc = parse(
            r#"<mxGraphModel><root>
                <businessObject id="8" label="Deep">
                  <detail>
                    <mxCell vertex="1" style="shape=document" parent="1"/>
                  </detail>
                </businessObject>
            </root></mxGraphModel>"#,
        );

        let cells = collect_cells(doc.root_element());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].id, "8");
        assert_eq!(infer_shape(cells[0].style.as_deref()), Shape::Document);
    }

    #[test]
    fn extraction_continues_beneath_the_inner_cell() {
        let doc = parse(
            r#"<mxGraphModel><root>
                <object id="5" label="Outer">
                  <mxCell vertex="1" parent="1">
                    <mxCell id="6" vertex="1" parent="5" value="Nested"/>
                  </mxCell>
                </object>
            </root></mxGraphModel>"#,
        );

        let cells = collect_cells(doc.root_element());
        let ids: Vec<&str> = cells.iter().map(|cell| cell.id.as_str()).collect();
        assert_eq!(ids, ["5", "6"]);
    }

    #[test]
    fn wrapper_without_inner_cell_is_collected_on_its_own() {
        let doc = parse(
            r#"<mxGraphModel><root>
                <object id="12" label="Floating note"/>
            </root></mxGraphModel>"#,
        );

        let cells = collect_cells(doc.root_element());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].id, "12");
        // Label sits on `label` for foreign tags even without a cell.
        assert_eq!(cells[0].wrapper_label.as_deref(), Some("Floating note"));
        assert_eq!(classify(&cells[0]), CellKind::Vertex);
    }
}
