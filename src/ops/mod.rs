// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural edits against a stored document.
//!
//! An [`EditSet`] is the unit the in-place updater consumes: label changes
//! plus subprocess additions, applied in one pass against the document text.

mod repair;

pub use repair::strip_phantom_connections;

use crate::model::{CellId, Subprocess};

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Replace the label of an existing node. A node id that matches no
    /// label-carrying attribute in the text is left untouched.
    SetNodeLabel { node_id: CellId, label: String },
    /// Materialize a subprocess under `owner_id`, reusing an existing
    /// same-named node when the document already has one.
    AddSubprocess {
        owner_id: CellId,
        subprocess: Subprocess,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSet {
    ops: Vec<EditOp>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: EditOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn label_edits(&self) -> Vec<(&CellId, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                EditOp::SetNodeLabel { node_id, label } => Some((node_id, label.as_str())),
                EditOp::AddSubprocess { .. } => None,
            })
            .collect()
    }

    /// Subprocess additions grouped by owner, preserving both the owners'
    /// first-appearance order and the per-owner op order. Sibling parent
    /// indices refer to positions within the returned per-owner list.
    pub(crate) fn subprocess_additions(&self) -> Vec<(&CellId, Vec<&Subprocess>)> {
        let mut grouped: Vec<(&CellId, Vec<&Subprocess>)> = Vec::new();
        for op in &self.ops {
            let EditOp::AddSubprocess {
                owner_id,
                subprocess,
            } = op
            else {
                continue;
            };
            match grouped.iter_mut().find(|(owner, _)| *owner == owner_id) {
                Some((_, subs)) => subs.push(subprocess),
                None => grouped.push((owner_id, vec![subprocess])),
            }
        }
        grouped
    }
}

impl FromIterator<EditOp> for EditSet {
    fn from_iter<I: IntoIterator<Item = EditOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
