// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! draw.io/mxGraph document codec.
//!
//! Read path: payload → framing codec (when compressed) → document text →
//! cell extraction → classification → canonical graph.
//! Write path: canonical-graph edit → in-place text patch → framing codec →
//! stored document. [`build_document`] synthesizes fresh documents and is
//! only used when no prior document exists.

pub mod build;
pub(crate) mod cells;
pub mod framing;
pub mod parse;
pub mod update;

pub use build::build_document;
pub use framing::{decode_payload, encode_payload, is_framed, DecodeError, Framing};
pub use parse::{parse_document, ParseError};
pub use update::{apply_edits, UpdateError};

pub(crate) use update::allocator_seed;
