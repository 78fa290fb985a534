// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus — graph codec for draw.io/mxGraph diagram documents.
//!
//! The crate converts between a normalized canonical graph
//! (`{diagram_id, nodes, connections}`) and the draw.io interchange format:
//! nested XML, optionally deflate-compressed and percent-encoded inside an
//! `<mxfile><diagram>` wrapper. Structural edits (label changes, injected
//! subprocess nodes) are applied directly onto the stored document text so
//! that tool metadata, formatting, and ordering the codec does not model
//! survive a round trip.

pub mod document;
pub mod format;
pub mod model;
pub mod ops;
