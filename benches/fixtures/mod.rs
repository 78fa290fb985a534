// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use proteus::model::{CellId, Connection, DiagramId, GraphModel, Node, Shape};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    MediumDense,
    LargeLongLabels,
}

impl Case {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumDense => "medium_dense",
            Self::LargeLongLabels => "large_long_labels",
        }
    }
}

fn cid(value: String) -> CellId {
    CellId::new(value).expect("cell id")
}

fn shape_for(index: usize) -> Shape {
    match index % 5 {
        0 => Shape::Rectangle,
        1 => Shape::Ellipse,
        2 => Shape::Decision,
        3 => Shape::Data,
        _ => Shape::Document,
    }
}

pub fn graph(case: Case) -> GraphModel {
    let (node_count, edges_per_node, label_pad) = match case {
        Case::Small => (8, 1, 0),
        Case::MediumDense => (60, 4, 0),
        Case::LargeLongLabels => (400, 2, 120),
    };

    let mut graph = GraphModel::new(DiagramId::new("bench").expect("diagram id"));

    for index in 0..node_count {
        let id = cid(format!("{}", index + 2));
        let mut label = format!("Step {index}");
        for _ in 0..label_pad {
            label.push('x');
        }
        graph.nodes_mut().push(Node::new_with(
            id,
            label,
            shape_for(index),
            (index % 10) as f64 * 180.0,
            (index / 10) as f64 * 120.0,
        ));
    }

    for index in 0..node_count {
        for hop in 1..=edges_per_node {
            let target = (index + hop) % node_count;
            if target == index {
                continue;
            }
            graph.connections_mut().push(Connection::new(
                cid(format!("{}", index + 2)),
                cid(format!("{}", target + 2)),
            ));
        }
    }

    graph
}

/// Cheap structural checksum so benchmark results cannot be optimized away.
pub fn checksum(graph: &GraphModel) -> u64 {
    let mut sum = 0u64;
    for node in graph.nodes() {
        sum = sum
            .wrapping_mul(31)
            .wrapping_add(node.label().len() as u64)
            .wrapping_add(node.shape().as_str().len() as u64);
    }
    for connection in graph.connections() {
        sum = sum
            .wrapping_mul(31)
            .wrapping_add(connection.from().as_str().len() as u64)
            .wrapping_add(connection.to().as_str().len() as u64);
    }
    sum
}
