// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-place document update.
//!
//! Edits are applied by patching the stored text, not by reparse-and-rebuild:
//! everything the codec does not model (tool metadata, formatting, cell
//! ordering) must survive an edit byte-for-byte. The price is string surgery
//! against known attribute shapes; the whole mechanism stays behind
//! [`apply_edits`] so a tree-editing implementation could replace it without
//! touching callers.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fmt::Write as _;

use memchr::memmem;
use regex::Regex;

use crate::model::{CellId, DiagramId, SubprocessParent};
use crate::ops::EditSet;

use super::build::{escape_xml, style_for_shape, NODE_HEIGHT, NODE_WIDTH};
use super::framing::{
    attribute_value, decode_payload, encode_payload, is_framed, DecodeError, Framing,
};
use super::parse::parse_document;

/// Allocation offset past the highest observed identity. Host-tool ids are
/// small decimals assigned from 2 upward; starting this far above them keeps
/// synthesized ids out of the range the tool will hand out next.
pub(crate) const ID_ALLOC_OFFSET: u64 = 100_000;

const SUBPROCESS_H_OFFSET: f64 = 180.0;
const SUBPROCESS_V_SPACING: f64 = 80.0;
const COLLISION_PADDING: f64 = 20.0;
const SHIFT_DOWN: f64 = 40.0;
const SHIFT_RIGHT: f64 = 60.0;
const SHIFT_RIGHT_EVERY: usize = 8;
const PLACEMENT_ATTEMPTS: usize = 200;

/// Label-carrying attribute shapes, in the order they are tried: the
/// wrapped-object `label`, then the inline cell `value`. Both the label
/// editor and the subprocess reuse search follow this one order.
const LABEL_ATTRIBUTE_SHAPES: [&str; 2] = ["label", "value"];

const OWNER_CONNECTOR_STYLE: &str = "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;exitX=1;exitY=0.5;exitDx=0;exitDy=0;entryX=0;entryY=0.5;entryDx=0;entryDy=0;";
const SIBLING_CONNECTOR_STYLE: &str = "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;exitX=0.5;exitY=1;exitDx=0;exitDy=0;entryX=0.5;entryY=0;entryDx=0;entryDy=0;";

/// First allocator candidate for a document whose highest decimal identity
/// is `max_observed`. Shared with the connection repair pass so identities
/// synthesized for pending subprocesses can be recomputed.
pub(crate) fn allocator_seed(max_observed: u64) -> u64 {
    max_observed.saturating_add(ID_ALLOC_OFFSET)
}

#[derive(Debug)]
pub enum UpdateError {
    Decode(DecodeError),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(source) => write!(f, "cannot decode framed payload: {source}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(source) => Some(source),
        }
    }
}

impl From<DecodeError> for UpdateError {
    fn from(source: DecodeError) -> Self {
        Self::Decode(source)
    }
}

/// Apply an edit set to document text, preserving unmodeled content.
///
/// The result stays in the input's framing family: a compressed document
/// comes back compressed inside its original wrapper, byte-exact outside the
/// payload. A patched result that fails the post-edit sanity check is
/// discarded and the input text returned unchanged — a corrupted stored
/// document is worse than a stale one.
pub fn apply_edits(text: &str, edits: &EditSet) -> Result<String, UpdateError> {
    let framing = is_framed(text).then(|| Framing::strip(text));
    let original_inner = match &framing {
        Some(framing) => decode_payload(framing.payload())?,
        None => text.to_owned(),
    };

    let mut inner = original_inner.clone();

    for (node_id, label) in edits.label_edits() {
        inner = apply_label_edit(&inner, node_id, label);
    }

    let additions = edits.subprocess_additions();
    if !additions.is_empty() {
        inner = materialize_subprocesses(inner, &additions);
    }

    inner = ensure_edge_geometry(&inner);

    if !passes_validation(&inner) {
        tracing::warn!("patched document failed validation; rolling back to original text");
        return Ok(text.to_owned());
    }

    Ok(match framing {
        Some(framing) => framing.rewrap(&encode_payload(&inner)),
        None => inner,
    })
}

/// Every identity value appearing anywhere in the text, regardless of the
/// element shape carrying it. This is the authoritative collision-check set
/// for id allocation.
struct IdRegistry {
    seen: HashSet<String>,
    max_numeric: u64,
}

impl IdRegistry {
    fn scan(text: &str) -> Self {
        let pattern =
            Regex::new(r#"id="([^"]*)""#).expect("hard-coded registry pattern is valid");
        let mut seen = HashSet::new();
        let mut max_numeric = 0u64;
        for capture in pattern.captures_iter(text) {
            let id = capture[1].to_owned();
            if let Ok(numeric) = id.parse::<u64>() {
                max_numeric = max_numeric.max(numeric);
            }
            seen.insert(id);
        }
        Self { seen, max_numeric }
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn insert(&mut self, id: String) {
        self.seen.insert(id);
    }
}

/// Monotone id allocator; each candidate is re-checked against the registry
/// and advanced past collisions before use.
struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    fn seeded(registry: &IdRegistry) -> Self {
        Self {
            next: allocator_seed(registry.max_numeric),
        }
    }

    fn alloc(&mut self, registry: &mut IdRegistry) -> String {
        loop {
            let candidate = self.next.to_string();
            self.next += 1;
            if !registry.contains(&candidate) {
                registry.insert(candidate.clone());
                return candidate;
            }
        }
    }
}

/// Replace the label carried by the element with the given identity.
///
/// Tried in order: a wrapped-object `label="…"`, an inline cell `value="…"` —
/// first match wins. An id matching no label-carrying shape leaves the text
/// untouched; that is expected, not an error.
fn apply_label_edit(text: &str, node_id: &CellId, label: &str) -> String {
    let pattern = Regex::new(&format!(
        r#"<[A-Za-z][^>]*\sid="{}"[^>]*>"#,
        regex::escape(node_id.as_str())
    ))
    .expect("escaped id pattern is valid");

    let Some(found) = pattern.find(text) else {
        return text.to_owned();
    };

    let escaped = escape_xml(label);
    for attr in LABEL_ATTRIBUTE_SHAPES {
        if let Some(patched_tag) = replace_attribute(found.as_str(), attr, &escaped) {
            let mut out = String::with_capacity(text.len() + escaped.len());
            out.push_str(&text[..found.start()]);
            out.push_str(&patched_tag);
            out.push_str(&text[found.end()..]);
            return out;
        }
    }

    text.to_owned()
}

/// Swap the value of `key="…"` inside a single tag's text. The attribute
/// must be preceded by whitespace so `value=` never matches inside e.g.
/// `defaultvalue=`.
fn replace_attribute(tag: &str, key: &str, new_value: &str) -> Option<String> {
    let needle = format!("{key}=\"");
    let mut search_from = 0;
    loop {
        let idx = tag[search_from..].find(&needle)? + search_from;
        if idx == 0 || !tag.as_bytes()[idx - 1].is_ascii_whitespace() {
            search_from = idx + needle.len();
            continue;
        }
        let start = idx + needle.len();
        let end = tag[start..].find('"')? + start;
        return Some(format!("{}{}{}", &tag[..start], new_value, &tag[end..]));
    }
}

fn materialize_subprocesses(
    inner: String,
    additions: &[(&CellId, Vec<&crate::model::Subprocess>)],
) -> String {
    let mut registry = IdRegistry::scan(&inner);
    let mut allocator = IdAllocator::seeded(&registry);

    let positions = known_positions(&inner);
    let mut occupied: Vec<(f64, f64)> = positions.values().copied().collect();

    // Ids assigned earlier in this same application, so a name repeated
    // within one edit set still maps to a single node.
    let mut pending = BTreeMap::<String, String>::new();

    let mut node_fragments = String::new();
    let mut edge_fragments = String::new();

    for (owner_id, subs) in additions {
        let (owner_x, owner_y) = positions
            .get(owner_id.as_str())
            .copied()
            .unwrap_or((0.0, 0.0));

        // Materialized ids in list order; sibling parent indices point here.
        let mut materialized: Vec<String> = Vec::new();

        for (index, sub) in subs.iter().enumerate() {
            let reused = pending
                .get(sub.name())
                .cloned()
                .or_else(|| find_existing_node_id(&inner, sub.name()));

            let sub_id = match reused {
                Some(id) => {
                    tracing::debug!(name = sub.name(), id = %id, "reusing existing node for subprocess");
                    id
                }
                None => {
                    let id = allocator.alloc(&mut registry);
                    let (x, y) = place_clear_of(
                        owner_x + SUBPROCESS_H_OFFSET,
                        owner_y + index as f64 * SUBPROCESS_V_SPACING,
                        &occupied,
                    );
                    occupied.push((x, y));
                    let _ = write!(
                        node_fragments,
                        "\n    <mxCell id=\"{id}\" value=\"{value}\" style=\"{style}\" vertex=\"1\" parent=\"1\">\n      <mxGeometry x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" as=\"geometry\" />\n    </mxCell>",
                        value = escape_xml(sub.name()),
                        style = style_for_shape(sub.shape()),
                        w = NODE_WIDTH,
                        h = NODE_HEIGHT,
                    );
                    pending.insert(sub.name().to_owned(), id.clone());
                    id
                }
            };

            // Connectors accumulate: every application adds a fresh one even
            // when an identical (parent, subprocess) pair is already wired.
            let edge_id = allocator.alloc(&mut registry);
            let (source, connector_style) = match sub.parent() {
                SubprocessParent::OwningNode => {
                    (owner_id.as_str().to_owned(), OWNER_CONNECTOR_STYLE)
                }
                SubprocessParent::Sibling(sibling) => match materialized.get(sibling) {
                    Some(sibling_id) => (sibling_id.clone(), SIBLING_CONNECTOR_STYLE),
                    // Not an earlier sibling; hang off the owning node.
                    None => (owner_id.as_str().to_owned(), OWNER_CONNECTOR_STYLE),
                },
            };
            let _ = write!(
                edge_fragments,
                "\n    <mxCell id=\"{edge_id}\" style=\"{connector_style}\" edge=\"1\" parent=\"1\" source=\"{source}\" target=\"{target}\">\n      <mxGeometry relative=\"1\" as=\"geometry\" />\n    </mxCell>",
                target = sub_id,
            );

            materialized.push(sub_id);
        }
    }

    splice_fragments(&inner, &node_fragments, &edge_fragments)
}

/// Identity of an existing node whose label/value equals `name` exactly.
fn find_existing_node_id(text: &str, name: &str) -> Option<String> {
    let escaped = regex::escape(&escape_xml(name));
    for attr in LABEL_ATTRIBUTE_SHAPES {
        let pattern = Regex::new(&format!(r#"<[A-Za-z][^>]*\s{attr}="{escaped}"[^>]*>"#))
            .expect("escaped name pattern is valid");
        for found in pattern.find_iter(text) {
            if let Some(id) = attribute_value(found.as_str(), "id") {
                return Some(id);
            }
        }
    }
    None
}

fn known_positions(inner: &str) -> BTreeMap<String, (f64, f64)> {
    let fallback = DiagramId::new("document").expect("hard-coded fallback diagram id is valid");
    match parse_document(inner, &fallback) {
        Ok(graph) => graph
            .nodes()
            .iter()
            .map(|node| (node.id().as_str().to_owned(), (node.x(), node.y())))
            .collect(),
        Err(err) => {
            tracing::debug!(%err, "cannot derive node positions; placing from origin");
            BTreeMap::new()
        }
    }
}

fn overlaps(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < NODE_WIDTH + COLLISION_PADDING
        && (a.1 - b.1).abs() < NODE_HEIGHT + COLLISION_PADDING
}

/// Shift a candidate position down, and periodically right, until it clears
/// every known node box. Exhausting the attempt budget is a soft failure:
/// the last candidate is used as-is.
fn place_clear_of(x0: f64, y0: f64, occupied: &[(f64, f64)]) -> (f64, f64) {
    let (mut x, mut y) = (x0, y0);
    for attempt in 1..=PLACEMENT_ATTEMPTS {
        if !occupied.iter().any(|other| overlaps((x, y), *other)) {
            return (x, y);
        }
        y += SHIFT_DOWN;
        if attempt % SHIFT_RIGHT_EVERY == 0 {
            x += SHIFT_RIGHT;
        }
    }
    tracing::warn!(x, y, "placement attempt budget exhausted; keeping last candidate");
    (x, y)
}

/// Insert serialized fragments immediately after the last closing cell tag
/// before the closing root tag, nodes preceding edges.
fn splice_fragments(inner: &str, node_fragments: &str, edge_fragments: &str) -> String {
    if node_fragments.is_empty() && edge_fragments.is_empty() {
        return inner.to_owned();
    }

    let bytes = inner.as_bytes();
    let insert_at = match memmem::find(bytes, b"</root>") {
        Some(root_close) => memmem::rfind(&bytes[..root_close], b"</mxCell>")
            .map(|found| found + b"</mxCell>".len())
            .unwrap_or(root_close),
        None => inner.len(),
    };

    let mut out =
        String::with_capacity(inner.len() + node_fragments.len() + edge_fragments.len());
    out.push_str(&inner[..insert_at]);
    out.push_str(node_fragments);
    out.push_str(edge_fragments);
    out.push_str(&inner[insert_at..]);
    out
}

/// Give every edge-like element an `<mxGeometry>` child so each connector
/// renders independently of its neighbors.
fn ensure_edge_geometry(inner: &str) -> String {
    let pattern = Regex::new(r#"<([A-Za-z][\w.:-]*)\b[^>]*\sedge="(?:1|true|TRUE|True)"[^>]*>"#)
        .expect("hard-coded edge tag pattern is valid");

    let found: Vec<(std::ops::Range<usize>, String)> = pattern
        .captures_iter(inner)
        .map(|capture| {
            let whole = capture.get(0).expect("capture 0 always present");
            (whole.range(), capture[1].to_owned())
        })
        .collect();

    let mut out = inner.to_owned();
    // Patch back-to-front so earlier ranges stay valid.
    for (range, tag_name) in found.into_iter().rev() {
        let tag_text = out[range.clone()].to_owned();
        if tag_text.ends_with("/>") {
            let open = tag_text[..tag_text.len() - 2].trim_end();
            let replacement = format!(
                "{open}>\n      <mxGeometry relative=\"1\" as=\"geometry\" />\n    </{tag_name}>"
            );
            out.replace_range(range, &replacement);
            continue;
        }

        let body_start = range.end;
        let close = format!("</{tag_name}>");
        let Some(close_at) = out[body_start..].find(&close) else {
            continue;
        };
        if out[body_start..body_start + close_at].contains("<mxGeometry") {
            continue;
        }
        out.insert_str(
            body_start,
            "\n      <mxGeometry relative=\"1\" as=\"geometry\" />",
        );
    }

    out
}

/// Post-edit sanity check: reject anything that lost its model root or its
/// root container.
fn passes_validation(inner: &str) -> bool {
    !inner.trim().is_empty()
        && inner.contains("<mxGraphModel")
        && inner.contains("<root")
        && inner.contains("</root>")
}
