// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storage-facing JSON shape of the canonical graph.
//!
//! The persistence layer stores `{diagramId, nodes, connections}` documents;
//! these DTOs pin that wire shape independently of the domain types so model
//! refactors cannot silently change what is on disk.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::graph::{
    Connection, ConnectionStyle, GraphModel, Node, Shape, Subprocess, SubprocessParent,
};
use super::ids::{CellId, DiagramId, IdError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphModelJson {
    pub diagram_id: String,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
    #[serde(default)]
    pub connections: Vec<ConnectionJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeJson {
    pub id: String,
    pub label: String,
    pub shape: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subprocesses: Vec<SubprocessJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubprocessJson {
    pub name: String,
    pub shape: String,
    /// Index of the earlier sibling the connector hangs off; absent means
    /// the owning node itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionJson {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_arrow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_arrow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_pattern: Option<String>,
}

#[derive(Debug)]
pub enum WireError {
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    InvalidShape {
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::InvalidShape { field, value } => {
                write!(f, "invalid shape for {field}: {value:?}")
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            Self::InvalidShape { .. } => None,
        }
    }
}

pub fn graph_to_json(graph: &GraphModel) -> GraphModelJson {
    GraphModelJson {
        diagram_id: graph.diagram_id().as_str().to_owned(),
        nodes: graph.nodes().iter().map(node_to_json).collect(),
        connections: graph.connections().iter().map(connection_to_json).collect(),
    }
}

pub fn graph_from_json(json: GraphModelJson) -> Result<GraphModel, WireError> {
    let diagram_id: DiagramId = parse_id("diagramId", json.diagram_id)?;
    let mut graph = GraphModel::new(diagram_id);

    for node_json in json.nodes {
        graph.nodes_mut().push(node_from_json(node_json)?);
    }
    for connection_json in json.connections {
        graph
            .connections_mut()
            .push(connection_from_json(connection_json)?);
    }

    Ok(graph)
}

fn node_to_json(node: &Node) -> NodeJson {
    NodeJson {
        id: node.id().as_str().to_owned(),
        label: node.label().to_owned(),
        shape: node.shape().as_str().to_owned(),
        x: node.x(),
        y: node.y(),
        actor: node.actor().map(ToOwned::to_owned),
        subprocesses: node
            .subprocesses()
            .iter()
            .map(|sub| SubprocessJson {
                name: sub.name().to_owned(),
                shape: sub.shape().as_str().to_owned(),
                parent: match sub.parent() {
                    SubprocessParent::OwningNode => None,
                    SubprocessParent::Sibling(index) => Some(index),
                },
            })
            .collect(),
    }
}

fn node_from_json(json: NodeJson) -> Result<Node, WireError> {
    let id: CellId = parse_id("node.id", json.id)?;
    let shape = parse_shape("node.shape", &json.shape)?;
    let mut node = Node::new_with(id, json.label, shape, json.x, json.y);
    node.set_actor(json.actor);

    for sub_json in json.subprocesses {
        let shape = parse_shape("subprocess.shape", &sub_json.shape)?;
        let parent = match sub_json.parent {
            None => SubprocessParent::OwningNode,
            Some(index) => SubprocessParent::Sibling(index),
        };
        node.subprocesses_mut()
            .push(Subprocess::new_with(sub_json.name, shape, parent));
    }

    Ok(node)
}

fn connection_to_json(connection: &Connection) -> ConnectionJson {
    let style = connection.style();
    ConnectionJson {
        from: connection.from().as_str().to_owned(),
        to: connection.to().as_str().to_owned(),
        id: connection.id().map(|id| id.as_str().to_owned()),
        stroke_width: style.stroke_width,
        stroke_color: style.stroke_color.clone(),
        start_arrow: style.start_arrow.clone(),
        end_arrow: style.end_arrow.clone(),
        dashed: style.dashed,
        dash_pattern: style.dash_pattern.clone(),
    }
}

fn connection_from_json(json: ConnectionJson) -> Result<Connection, WireError> {
    let from: CellId = parse_id("connection.from", json.from)?;
    let to: CellId = parse_id("connection.to", json.to)?;
    let id = match json.id {
        Some(value) => Some(parse_id("connection.id", value)?),
        None => None,
    };

    Ok(Connection::new_with(
        from,
        to,
        id,
        ConnectionStyle {
            stroke_width: json.stroke_width,
            stroke_color: json.stroke_color,
            start_arrow: json.start_arrow,
            end_arrow: json.end_arrow,
            dashed: json.dashed,
            dash_pattern: json.dash_pattern,
        },
    ))
}

fn parse_id<T, V: Into<String>>(
    field: &'static str,
    value: V,
) -> Result<super::ids::Id<T>, WireError> {
    let value = value.into();
    super::ids::Id::new(value.clone()).map_err(|source| WireError::InvalidId {
        field,
        value,
        source,
    })
}

fn parse_shape(field: &'static str, value: &str) -> Result<Shape, WireError> {
    value.parse().map_err(|_| WireError::InvalidShape {
        field,
        value: value.to_owned(),
    })
}
