//! Input chunks and their canonical byte encodings.
//!
//! A chunk is one of three variants:
//!
//! * `Bytes` – an opaque byte sequence, encoded as-is.
//! * `Text` – a UTF-8 string, encoded as its UTF-8 bytes.
//! * `Lanes` – a homogeneous sequence of fixed-width numbers. Each lane is
//!   encoded little-endian and the lanes are concatenated in order, which keeps
//!   equal-length lane buffers comparable byte for byte.

use core::fmt;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Homogeneous sequence of fixed-width values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lane", content = "values", rename_all = "snake_case")]
pub enum LaneData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl LaneData {
    /// Width in bytes of a single lane.
    pub const fn lane_width(&self) -> usize {
        match self {
            LaneData::U8(_) => 1,
            LaneData::U16(_) => 2,
            LaneData::U32(_) | LaneData::F32(_) => 4,
            LaneData::U64(_) | LaneData::F64(_) => 8,
        }
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        match self {
            LaneData::U8(values) => values.len(),
            LaneData::U16(values) => values.len(),
            LaneData::U32(values) => values.len(),
            LaneData::U64(values) => values.len(),
            LaneData::F32(values) => values.len(),
            LaneData::F64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packs every lane little-endian into one contiguous buffer.
    ///
    /// NaN lanes are rejected: their payload bits are not canonical, so two
    /// "equal" sequences could otherwise hash differently.
    pub fn pack(&self) -> Result<Vec<u8>, ChunkError> {
        let mut out = Vec::with_capacity(self.len() * self.lane_width());
        match self {
            LaneData::U8(values) => out.extend_from_slice(values),
            LaneData::U16(values) => values
                .iter()
                .for_each(|value| out.extend_from_slice(&value.to_le_bytes())),
            LaneData::U32(values) => values
                .iter()
                .for_each(|value| out.extend_from_slice(&value.to_le_bytes())),
            LaneData::U64(values) => values
                .iter()
                .for_each(|value| out.extend_from_slice(&value.to_le_bytes())),
            LaneData::F32(values) => {
                for (position, value) in values.iter().enumerate() {
                    if value.is_nan() {
                        return Err(ChunkError::NanLane { position });
                    }
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
            LaneData::F64(values) => {
                for (position, value) in values.iter().enumerate() {
                    if value.is_nan() {
                        return Err(ChunkError::NanLane { position });
                    }
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for LaneData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneData::U8(values) => write!(f, "{:?}", values),
            LaneData::U16(values) => write!(f, "{:?}", values),
            LaneData::U32(values) => write!(f, "{:?}", values),
            LaneData::U64(values) => write!(f, "{:?}", values),
            LaneData::F32(values) => write!(f, "{:?}", values),
            LaneData::F64(values) => write!(f, "{:?}", values),
        }
    }
}

/// Opaque unit of input data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chunk {
    Bytes(Vec<u8>),
    Text(String),
    Lanes(LaneData),
}

impl Chunk {
    /// Canonical byte encoding hashed by leaf and ring nodes.
    pub fn encode(&self) -> Result<Cow<'_, [u8]>, ChunkError> {
        match self {
            Chunk::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Chunk::Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
            Chunk::Lanes(lanes) => lanes.pack().map(Cow::Owned),
        }
    }

    pub fn as_lanes(&self) -> Option<&LaneData> {
        match self {
            Chunk::Lanes(lanes) => Some(lanes),
            _ => None,
        }
    }

    /// Short human readable rendering, at most `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        self.to_string().chars().take(max_chars).collect()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
            Chunk::Text(text) => f.write_str(text),
            Chunk::Lanes(lanes) => fmt::Display::fmt(lanes, f),
        }
    }
}

impl From<&str> for Chunk {
    fn from(value: &str) -> Self {
        Chunk::Text(value.to_owned())
    }
}

impl From<String> for Chunk {
    fn from(value: String) -> Self {
        Chunk::Text(value)
    }
}

impl From<&[u8]> for Chunk {
    fn from(value: &[u8]) -> Self {
        Chunk::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Chunk {
    fn from(value: &[u8; N]) -> Self {
        Chunk::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(value: Vec<u8>) -> Self {
        Chunk::Bytes(value)
    }
}

impl From<LaneData> for Chunk {
    fn from(value: LaneData) -> Self {
        Chunk::Lanes(value)
    }
}

impl From<Vec<u16>> for Chunk {
    fn from(value: Vec<u16>) -> Self {
        Chunk::Lanes(LaneData::U16(value))
    }
}

impl From<Vec<u32>> for Chunk {
    fn from(value: Vec<u32>) -> Self {
        Chunk::Lanes(LaneData::U32(value))
    }
}

impl From<Vec<u64>> for Chunk {
    fn from(value: Vec<u64>) -> Self {
        Chunk::Lanes(LaneData::U64(value))
    }
}

impl From<Vec<f32>> for Chunk {
    fn from(value: Vec<f32>) -> Self {
        Chunk::Lanes(LaneData::F32(value))
    }
}

impl From<Vec<f64>> for Chunk {
    fn from(value: Vec<f64>) -> Self {
        Chunk::Lanes(LaneData::F64(value))
    }
}

/// Failure to encode a chunk into its canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    /// A floating-point lane held NaN.
    NanLane { position: usize },
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::NanLane { position } => {
                write!(f, "lane {} is NaN and has no canonical encoding", position)
            }
        }
    }
}

impl std::error::Error for ChunkError {}
