// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical graph model.
//!
//! Documents are parsed into a `GraphModel` (nodes, connections, diagram id);
//! `wire` pins the JSON shape the persistence layer stores.

pub mod graph;
pub mod ids;
pub mod wire;

pub use graph::{
    reconcile_connections, Connection, ConnectionStyle, GraphModel, Node, ParseShapeError, Shape,
    Subprocess, SubprocessParent,
};
pub use ids::{CellId, DiagramId, Id, IdError};
pub use wire::{
    graph_from_json, graph_to_json, ConnectionJson, GraphModelJson, NodeJson, SubprocessJson,
    WireError,
};
