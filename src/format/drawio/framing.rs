// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Compression framing: the reversible transform between an opaque payload
//! (`base64(deflate(percent_encode(xml)))`) and plain document text, plus the
//! `<mxfile><diagram>` wrapper bookkeeping the in-place updater needs to
//! re-wrap patched text byte-identically.

use std::fmt;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const MODEL_ROOT_TAG: &str = "<mxGraphModel";

/// `encodeURIComponent` leaves `- _ . ! ~ * ' ( )` unescaped; everything else
/// outside `[A-Za-z0-9]` is percent-escaped. The host tool decodes with the
/// same set, so the encoder must match it exactly.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug)]
pub enum DecodeError {
    Base64(base64::DecodeError),
    /// Both the raw-deflate and the zlib-framed inflate strategies failed.
    Inflate,
    Encoding(std::str::Utf8Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(source) => write!(f, "payload is not valid base64: {source}"),
            Self::Inflate => f.write_str("payload inflates with neither raw deflate nor zlib"),
            Self::Encoding(source) => {
                write!(f, "inflated payload is not valid UTF-8: {source}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(source) => Some(source),
            Self::Inflate => None,
            Self::Encoding(source) => Some(source),
        }
    }
}

/// Whether a stored payload is compression-framed.
///
/// Plain documents either start with the model root tag or contain it
/// somewhere inside an uncompressed wrapper; anything else is treated as an
/// opaque payload.
pub fn is_framed(text: &str) -> bool {
    let trimmed = text.trim_start();
    !trimmed.starts_with(MODEL_ROOT_TAG) && !text.contains(MODEL_ROOT_TAG)
}

/// Decode an opaque payload into plain document text.
///
/// Base64-decodes, inflates (raw deflate first, zlib-framed second — exports
/// from older tool versions use the latter), then percent-decodes the result
/// as UTF-8. Failure of both inflate strategies is an error; garbage is never
/// returned.
pub fn decode_payload(payload: &str) -> Result<String, DecodeError> {
    let compact: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
    let compressed = BASE64.decode(compact.as_bytes()).map_err(DecodeError::Base64)?;

    let inflated = inflate_raw(&compressed)
        .or_else(|| inflate_zlib(&compressed))
        .ok_or(DecodeError::Inflate)?;

    let encoded = std::str::from_utf8(&inflated).map_err(DecodeError::Encoding)?;
    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(DecodeError::Encoding)?;
    Ok(decoded.into_owned())
}

/// Encode plain document text into an opaque payload.
pub fn encode_payload(text: &str) -> String {
    let encoded = utf8_percent_encode(text, COMPONENT).to_string();

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(encoded.as_bytes())
        .expect("deflate into Vec cannot fail");
    let compressed = encoder.finish().expect("deflate into Vec cannot fail");

    BASE64.encode(compressed)
}

fn inflate_raw(compressed: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(compressed).read_to_end(&mut out).ok()?;
    Some(out)
}

fn inflate_zlib(compressed: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed).read_to_end(&mut out).ok()?;
    Some(out)
}

/// The dissected outer wrapper of a framed document.
///
/// `prefix` and `suffix` are kept byte-exact so [`Framing::rewrap`] restores
/// everything around the payload — tool metadata on `<mxfile>`, page
/// attributes on `<diagram>` — without the codec modeling any of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framing {
    prefix: String,
    payload: String,
    suffix: String,
    name: Option<String>,
}

impl Framing {
    /// Split a framed document into wrapper and payload.
    ///
    /// Without a recognizable `<diagram>` element the whole text is the
    /// payload (bare payloads occur when callers store the compressed blob
    /// directly) and the wrapper is empty.
    pub fn strip(text: &str) -> Framing {
        let Some(open_start) = text.find("<diagram") else {
            return Framing {
                prefix: String::new(),
                payload: text.to_owned(),
                suffix: String::new(),
                name: None,
            };
        };

        let Some(open_end) = text[open_start..].find('>').map(|i| open_start + i + 1) else {
            return Framing {
                prefix: String::new(),
                payload: text.to_owned(),
                suffix: String::new(),
                name: None,
            };
        };

        let close_start = text[open_end..]
            .find("</diagram>")
            .map(|i| open_end + i)
            .unwrap_or(text.len());

        Framing {
            prefix: text[..open_end].to_owned(),
            payload: text[open_end..close_start].to_owned(),
            suffix: text[close_start..].to_owned(),
            name: attribute_value(&text[open_start..open_end], "name"),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The wrapper's `name` attribute, used as the diagram id when present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rewrap(&self, payload: &str) -> String {
        let mut out =
            String::with_capacity(self.prefix.len() + payload.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(payload);
        out.push_str(&self.suffix);
        out
    }
}

/// First `key="value"` occurrence inside a single tag's text. The key must
/// be preceded by whitespace so `id=` never matches inside e.g. `gridid=`.
pub(crate) fn attribute_value(tag: &str, key: &str) -> Option<String> {
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
        return Some(tag[start..end].to_owned());
    }
}
