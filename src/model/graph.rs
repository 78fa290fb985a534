// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ids::{CellId, DiagramId};

/// The shape category persisted for a node.
///
/// Closed set: everything the host tool can draw is folded into one of these
/// six categories, and `Rectangle` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Rectangle,
    Ellipse,
    Decision,
    Data,
    Document,
    SubprocessContainer,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Decision => "decision",
            Self::Data => "data",
            Self::Document => "document",
            Self::SubprocessContainer => "subprocess-container",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseShapeError {
    value: String,
}

impl ParseShapeError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown shape category: {:?}", self.value)
    }
}

impl std::error::Error for ParseShapeError {}

impl std::str::FromStr for Shape {
    type Err = ParseShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(Self::Rectangle),
            "ellipse" => Ok(Self::Ellipse),
            "decision" => Ok(Self::Decision),
            "data" => Ok(Self::Data),
            "document" => Ok(Self::Document),
            "subprocess-container" => Ok(Self::SubprocessContainer),
            _ => Err(ParseShapeError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Where a subprocess connector originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubprocessParent {
    /// The node the subprocess decomposes; the connector leaves its right
    /// face and enters the subprocess's left face.
    OwningNode,
    /// An earlier sibling subprocess, by position in the owning node's list;
    /// the connector leaves its bottom face and enters the top face.
    Sibling(usize),
}

/// A dependent decomposition step attached to a [`Node`].
///
/// A subprocess materializes into a cell of its own only when persisted into
/// document text; until then it exists purely inside the canonical graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Subprocess {
    name: String,
    shape: Shape,
    parent: SubprocessParent,
}

impl Subprocess {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Rectangle,
            parent: SubprocessParent::OwningNode,
        }
    }

    pub fn new_with(name: impl Into<String>, shape: Shape, parent: SubprocessParent) -> Self {
        Self {
            name: name.into(),
            shape,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn parent(&self) -> SubprocessParent {
        self.parent
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn set_parent(&mut self, parent: SubprocessParent) {
        self.parent = parent;
    }
}

/// A vertex in the canonical graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: CellId,
    label: String,
    shape: Shape,
    x: f64,
    y: f64,
    actor: Option<String>,
    subprocesses: Vec<Subprocess>,
}

impl Node {
    pub fn new(id: CellId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            shape: Shape::Rectangle,
            x: 0.0,
            y: 0.0,
            actor: None,
            subprocesses: Vec::new(),
        }
    }

    pub fn new_with(id: CellId, label: impl Into<String>, shape: Shape, x: f64, y: f64) -> Self {
        Self {
            id,
            label: label.into(),
            shape,
            x,
            y,
            actor: None,
            subprocesses: Vec::new(),
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn subprocesses(&self) -> &[Subprocess] {
        &self.subprocesses
    }

    pub fn subprocesses_mut(&mut self) -> &mut Vec<Subprocess> {
        &mut self.subprocesses
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_actor<T: Into<String>>(&mut self, actor: Option<T>) {
        self.actor = actor.map(Into::into);
    }
}

/// Optional connector style attributes carried on a [`Connection`].
///
/// Every field mirrors a `key=value` token of the host tool's style string;
/// absent means "tool default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStyle {
    pub stroke_width: Option<f64>,
    pub stroke_color: Option<String>,
    pub start_arrow: Option<String>,
    pub end_arrow: Option<String>,
    pub dashed: Option<bool>,
    pub dash_pattern: Option<String>,
}

impl ConnectionStyle {
    pub fn is_empty(&self) -> bool {
        self.stroke_width.is_none()
            && self.stroke_color.is_none()
            && self.start_arrow.is_none()
            && self.end_arrow.is_none()
            && self.dashed.is_none()
            && self.dash_pattern.is_none()
    }
}

/// A directed connection between two node identities.
///
/// Endpoints are *not* validated against the node set; a connection whose
/// endpoint no longer resolves is a phantom connection, repairable via
/// [`crate::ops::strip_phantom_connections`] but never auto-removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    from: CellId,
    to: CellId,
    id: Option<CellId>,
    style: ConnectionStyle,
}

impl Connection {
    pub fn new(from: CellId, to: CellId) -> Self {
        Self {
            from,
            to,
            id: None,
            style: ConnectionStyle::default(),
        }
    }

    pub fn new_with(from: CellId, to: CellId, id: Option<CellId>, style: ConnectionStyle) -> Self {
        Self {
            from,
            to,
            id,
            style,
        }
    }

    pub fn from(&self) -> &CellId {
        &self.from
    }

    pub fn to(&self) -> &CellId {
        &self.to
    }

    pub fn id(&self) -> Option<&CellId> {
        self.id.as_ref()
    }

    pub fn style(&self) -> &ConnectionStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut ConnectionStyle {
        &mut self.style
    }

    pub fn set_id(&mut self, id: Option<CellId>) {
        self.id = id;
    }
}

/// The normalized, storage-facing graph view of one document.
///
/// Derived, never independently authored: it is regenerated whenever the
/// underlying document text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    diagram_id: DiagramId,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl GraphModel {
    pub fn new(diagram_id: DiagramId) -> Self {
        Self {
            diagram_id,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn diagram_id(&self) -> &DiagramId {
        &self.diagram_id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }

    pub fn node(&self, id: &CellId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Largest decimal node identity in the graph, 0 when none parse.
    ///
    /// This feeds the same arithmetic the updater's id allocator is seeded
    /// with, so repair and update agree on synthesized identities.
    pub fn max_numeric_id(&self) -> u64 {
        self.nodes
            .iter()
            .filter_map(|node| node.id().numeric())
            .max()
            .unwrap_or(0)
    }
}

/// Merge a re-parsed connection list with the previously cached one.
///
/// The merge key is `(from, to)`: re-parsed connections are authoritative for
/// existence and keep their own style attributes; a re-parsed copy with no
/// style attributes adopts them from the cached connection with the same key.
/// Parallel edges between the same pair collapse to the first occurrence and
/// the dropped copy's style metadata is discarded — a known fidelity gap kept
/// for compatibility with stored documents.
pub fn reconcile_connections(
    previous: &[Connection],
    reparsed: Vec<Connection>,
) -> Vec<Connection> {
    let mut cached_styles = BTreeMap::<(&str, &str), &ConnectionStyle>::new();
    for connection in previous {
        cached_styles
            .entry((connection.from().as_str(), connection.to().as_str()))
            .or_insert_with(|| connection.style());
    }

    let mut seen = BTreeSet::<(String, String)>::new();
    let mut merged = Vec::with_capacity(reparsed.len());
    for mut connection in reparsed {
        let key = (
            connection.from().as_str().to_owned(),
            connection.to().as_str().to_owned(),
        );
        if !seen.insert(key) {
            continue;
        }

        if connection.style().is_empty() {
            if let Some(style) =
                cached_styles.get(&(connection.from().as_str(), connection.to().as_str()))
            {
                *connection.style_mut() = (*style).clone();
            }
        }
        merged.push(connection);
    }

    merged
}
