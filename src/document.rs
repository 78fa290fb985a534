// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Document lifecycle: text plus the derived canonical graph.
//!
//! A `Document` is created once from externally supplied text (or built from
//! a graph when no text exists yet); every structural edit patches the text
//! and re-derives the graph. Text without a graph is a valid state — parse
//! failures are expected with tool-version-drifted documents.

use crate::format::drawio::{apply_edits, build_document, parse_document, UpdateError};
use crate::model::{DiagramId, GraphModel};
use crate::ops::EditSet;

/// One stored diagram document.
///
/// Edits take `&mut self`: the registries and allocators behind an edit are
/// call-local, so distinct documents parallelize freely, but edits against
/// the *same* document must be serialized — exclusive access is the caller's
/// obligation and the borrow here enforces it. Share a document across
/// threads behind a lock.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    diagram_id: DiagramId,
    text: String,
    graph: Option<GraphModel>,
}

impl Document {
    /// Create a document from external text and derive its graph.
    ///
    /// `diagram_id` is the fallback when the text carries no wrapper name.
    /// Unparseable text is kept as-is with no graph.
    pub fn from_text(diagram_id: DiagramId, text: impl Into<String>) -> Self {
        let text = text.into();
        let graph = match parse_document(&text, &diagram_id) {
            Ok(graph) => Some(graph),
            Err(err) => {
                tracing::debug!(%err, "storing document text without canonical graph");
                None
            }
        };
        Self {
            diagram_id,
            text,
            graph,
        }
    }

    /// Synthesize a fresh document for a graph that has no prior text.
    pub fn from_graph(graph: GraphModel) -> Self {
        Self {
            diagram_id: graph.diagram_id().clone(),
            text: build_document(&graph),
            graph: Some(graph),
        }
    }

    pub fn diagram_id(&self) -> &DiagramId {
        &self.diagram_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn graph(&self) -> Option<&GraphModel> {
        self.graph.as_ref()
    }

    /// Bulk overwrite: replace the cached graph without touching the text.
    pub fn overwrite_graph(&mut self, graph: GraphModel) {
        self.graph = Some(graph);
    }

    /// Patch the document text with `edits`, then re-derive the graph.
    ///
    /// A re-derive failure leaves the document text-only; the patched text
    /// is kept either way.
    pub fn apply(&mut self, edits: &EditSet) -> Result<(), UpdateError> {
        self.text = apply_edits(&self.text, edits)?;
        self.graph = match parse_document(&self.text, &self.diagram_id) {
            Ok(graph) => Some(graph),
            Err(err) => {
                tracing::debug!(%err, "patched document no longer parses; dropping graph");
                None
            }
        };
        Ok(())
    }
}
