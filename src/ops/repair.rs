// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use crate::format::drawio::allocator_seed;
use crate::model::GraphModel;

/// Drop connections whose endpoints resolve to no known identity.
///
/// The valid set is every node id plus the identities subprocesses would
/// materialize under: starting at the allocator seed for the graph's highest
/// decimal id, one per subprocess, counted in node order. Connections to
/// those identities are legitimate even before the subprocess cells exist in
/// the document text.
///
/// This is an explicit repair pass; phantom connections are otherwise left
/// in place.
pub fn strip_phantom_connections(graph: &mut GraphModel) {
    let mut valid: HashSet<String> = graph
        .nodes()
        .iter()
        .map(|node| node.id().as_str().to_owned())
        .collect();

    let mut next = allocator_seed(graph.max_numeric_id());
    for node in graph.nodes() {
        for _ in node.subprocesses() {
            valid.insert(next.to_string());
            next += 1;
        }
    }

    let before = graph.connections().len();
    graph
        .connections_mut()
        .retain(|connection| {
            valid.contains(connection.from().as_str()) && valid.contains(connection.to().as_str())
        });

    let dropped = before - graph.connections().len();
    if dropped > 0 {
        tracing::debug!(dropped, "stripped phantom connections");
    }
}
