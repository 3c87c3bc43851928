//! Flat text persistence for rings.
//!
//! Each node becomes one record:
//!
//! ```text
//! [[nodes]]
//! data = "state1"
//! hash = "<64 hex chars>"
//! next_hash = "<64 hex chars>"
//! ```
//!
//! Text chunks are written as basic strings escaping `\\`, `"`, `\n`, `\r`,
//! `\t` and remaining control characters as `\uXXXX`.  Byte and lane chunks
//! are preceded by `encoding = "hex"` and store the hex of their encoding; they
//! reload as byte chunks with the same digest.
//!
//! `hash` and `next_hash` are informational.  Reloading recomputes both from
//! `data`; stored values that disagree are logged and discarded.

use core::fmt::Write as _;

use tracing::warn;

use super::Ring;
use crate::chunk::Chunk;
use crate::hash::{Digest, HashAlgorithm};
use crate::{HashTreeError, HashTreeResult, MalformedReason};

const RECORD_HEADER: &str = "[[nodes]]";
const LEGACY_HEADER: &str = "[nodes]";
const HEX_ENCODING: &str = "hex";
const UTF8_ENCODING: &str = "utf8";

/// Renders `ring` in the record format.
pub fn serialize(ring: &Ring) -> String {
    let mut out = String::new();
    for node in ring.nodes() {
        out.push_str(RECORD_HEADER);
        out.push('\n');
        match node.chunk() {
            Chunk::Text(text) => {
                out.push_str("data = ");
                push_quoted(&mut out, text);
            }
            Chunk::Bytes(bytes) => push_hex_data(&mut out, bytes),
            Chunk::Lanes(_) => push_hex_data(&mut out, node.lanes().unwrap_or_default()),
        }
        out.push('\n');
        let _ = writeln!(out, "hash = \"{}\"", node.digest());
        let _ = writeln!(out, "next_hash = \"{}\"", node.next_digest());
    }
    out
}

fn push_hex_data(out: &mut String, bytes: &[u8]) {
    let _ = writeln!(out, "encoding = \"{}\"", HEX_ENCODING);
    out.push_str("data = \"");
    out.push_str(&hex::encode(bytes));
    out.push('"');
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

/// Fields collected for one record.
#[derive(Default)]
struct Record {
    data: Option<String>,
    encoding: Option<String>,
    hash: Option<String>,
    next_hash: Option<String>,
}

impl Record {
    fn into_chunk(self, record: usize) -> HashTreeResult<(Chunk, Option<String>, Option<String>)> {
        let malformed = |reason| HashTreeError::MalformedRing { record, reason };
        let data = self.data.ok_or_else(|| malformed(MalformedReason::MissingData))?;
        let chunk = match self.encoding.as_deref() {
            None | Some(UTF8_ENCODING) => Chunk::Text(data),
            Some(HEX_ENCODING) => Chunk::Bytes(
                hex::decode(&data).map_err(|_| malformed(MalformedReason::InvalidHex))?,
            ),
            Some(other) => {
                return Err(malformed(MalformedReason::UnknownEncoding(other.to_owned())))
            }
        };
        Ok((chunk, self.hash, self.next_hash))
    }
}

/// Parses the record format and rebuilds the ring with `algorithm`.
///
/// Lines are scanned for `key = "value"` pairs inside `[[nodes]]` records.
/// Unknown keys, blank lines and `#` comments are ignored.
pub fn deserialize(text: &str, algorithm: HashAlgorithm) -> HashTreeResult<Ring> {
    let mut records: Vec<Record> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line == LEGACY_HEADER {
            continue;
        }
        if line == RECORD_HEADER {
            records.push(Record::default());
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let index = records.len().saturating_sub(1);
        let malformed = |reason| HashTreeError::MalformedRing {
            record: index,
            reason,
        };
        let record = records
            .last_mut()
            .ok_or_else(|| malformed(MalformedReason::OrphanField))?;
        let key = key.trim();
        let slot = match key {
            "data" => &mut record.data,
            "encoding" => &mut record.encoding,
            "hash" => &mut record.hash,
            "next_hash" => &mut record.next_hash,
            _ => continue,
        };
        if slot.is_some() {
            return Err(malformed(MalformedReason::DuplicateField(key.to_owned())));
        }
        *slot = Some(parse_quoted(value.trim()).map_err(malformed)?);
    }

    let mut chunks = Vec::with_capacity(records.len());
    let mut advisory = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let (chunk, hash, next_hash) = record.into_chunk(index)?;
        chunks.push(chunk);
        advisory.push((hash, next_hash));
    }

    let ring = Ring::build(chunks, algorithm)?;
    for (index, (node, (hash, next_hash))) in ring.nodes().iter().zip(advisory).enumerate() {
        check_advisory(index, "hash", hash.as_deref(), node.digest());
        check_advisory(index, "next_hash", next_hash.as_deref(), node.next_digest());
    }
    Ok(ring)
}

fn check_advisory(record: usize, field: &str, stored: Option<&str>, computed: &Digest) {
    let Some(stored) = stored else {
        return;
    };
    match stored.parse::<Digest>() {
        Ok(digest) if digest == *computed => {}
        _ => warn!(
            record,
            field,
            stored,
            computed = %computed,
            "stored digest disagrees with recomputed value; using recomputed digest"
        ),
    }
}

/// Decodes a double-quoted basic string occupying the whole value.
fn parse_quoted(value: &str) -> Result<String, MalformedReason> {
    let body = value
        .strip_prefix('"')
        .ok_or(MalformedReason::UnterminatedString)?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                return if chars.as_str().trim().is_empty() {
                    Ok(out)
                } else {
                    Err(MalformedReason::UnterminatedString)
                };
            }
            '\\' => out.push(parse_escape(&mut chars)?),
            ch => out.push(ch),
        }
    }
    Err(MalformedReason::UnterminatedString)
}

fn parse_escape(chars: &mut core::str::Chars<'_>) -> Result<char, MalformedReason> {
    match chars.next() {
        Some('\\') => Ok('\\'),
        Some('"') => Ok('"'),
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('u') => {
            let code: String = chars.by_ref().take(4).collect();
            if code.len() != 4 {
                return Err(MalformedReason::InvalidEscape);
            }
            u32::from_str_radix(&code, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or(MalformedReason::InvalidEscape)
        }
        _ => Err(MalformedReason::InvalidEscape),
    }
}
