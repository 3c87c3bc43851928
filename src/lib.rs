//! Content-addressed hash trees with a parallel leaf pipeline and circular
//! hash rings.
//!
//! The crate is organised bottom-up:
//!
//! * [`hash`] – 256-bit digests and the selectable hash algorithms.
//! * [`chunk`] – the closed set of input chunk variants and their encodings.
//! * [`merkle`] – leaf and internal nodes, the tree builder and the verifier.
//! * [`utils`] – the bounded worker pool used for leaf construction and
//!   partitioned reductions.
//! * [`ring`] – the circular chain of nodes and its flat text persistence.
//! * [`visual`] – diagnostic dumps of trees and rings.
//! * [`config`] – validated construction settings.
//!
//! Everything is stateless apart from the data handed in by the caller.

pub mod chunk;
pub mod config;
pub mod hash;
pub mod merkle;
pub mod ring;
pub mod utils;
pub mod visual;

use core::fmt;
use std::io;

pub use chunk::{Chunk, ChunkError, LaneData};
pub use config::{ConfigError, TreeConfig, TreeConfigBuilder};
pub use hash::{Digest, HashAlgorithm};
pub use merkle::{lane_xor, LeafNode, Node, Tree};
pub use ring::{Ring, RingNode};
pub use utils::parallel::{aggregate_xor, parallel_reduce};
pub use visual::{print_ring, print_tree, render_ring, render_tree, VisualOptions};

/// Result type used throughout the library.
pub type HashTreeResult<T> = core::result::Result<T, HashTreeError>;

/// A leaf that could not be constructed, tagged with its chunk index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFailure {
    /// Position of the offending chunk in the caller's input.
    pub index: usize,
    /// Encoding failure reported by the worker.
    pub error: ChunkError,
}

impl fmt::Display for LeafFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}: {}", self.index, self.error)
    }
}

/// Reasons a persisted ring record is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The record has no `data` field.
    MissingData,
    /// A quoted value was not terminated on its line.
    UnterminatedString,
    /// A backslash escape was not recognised.
    InvalidEscape,
    /// A `hex` encoded value did not decode.
    InvalidHex,
    /// The `encoding` field named an unknown encoding.
    UnknownEncoding(String),
    /// A key/value line appeared before the first record header.
    OrphanField,
    /// The same field appeared twice in one record.
    DuplicateField(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingData => write!(f, "missing `data` field"),
            MalformedReason::UnterminatedString => write!(f, "unterminated string"),
            MalformedReason::InvalidEscape => write!(f, "invalid escape sequence"),
            MalformedReason::InvalidHex => write!(f, "invalid hex payload"),
            MalformedReason::UnknownEncoding(name) => write!(f, "unknown encoding `{}`", name),
            MalformedReason::OrphanField => write!(f, "field outside of a [[nodes]] record"),
            MalformedReason::DuplicateField(key) => write!(f, "duplicate `{}` field", key),
        }
    }
}

/// Error enumeration for tree and ring construction.
#[derive(Debug)]
pub enum HashTreeError {
    /// Construction was attempted with zero chunks.
    EmptyInput,
    /// One or more leaf computations failed; every failure is listed.
    WorkerFailure(Vec<LeafFailure>),
    /// A ring chunk could not be encoded.
    InvalidChunk(LeafFailure),
    /// A persisted ring record could not be reloaded.
    MalformedRing {
        /// Zero-based record number.
        record: usize,
        reason: MalformedReason,
    },
    /// The supplied configuration was rejected.
    InvalidConfig(ConfigError),
    /// An algorithm identifier was not recognised.
    UnsupportedAlgorithm(String),
    /// The worker pool could not be started.
    WorkerPool(String),
    /// Reading or writing a ring file failed.
    Io(io::Error),
}

impl fmt::Display for HashTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashTreeError::EmptyInput => write!(f, "no chunks supplied"),
            HashTreeError::WorkerFailure(failures) => {
                write!(f, "{} leaf computation(s) failed", failures.len())?;
                for failure in failures {
                    write!(f, "; {}", failure)?;
                }
                Ok(())
            }
            HashTreeError::InvalidChunk(failure) => write!(f, "invalid chunk: {}", failure),
            HashTreeError::MalformedRing { record, reason } => {
                write!(f, "malformed ring record {}: {}", record, reason)
            }
            HashTreeError::InvalidConfig(err) => write!(f, "invalid configuration: {}", err),
            HashTreeError::UnsupportedAlgorithm(id) => {
                write!(f, "unsupported hashing algorithm: {}", id)
            }
            HashTreeError::WorkerPool(reason) => {
                write!(f, "failed to start worker pool: {}", reason)
            }
            HashTreeError::Io(err) => write!(f, "ring file i/o failed: {}", err),
        }
    }
}

impl std::error::Error for HashTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HashTreeError::InvalidConfig(err) => Some(err),
            HashTreeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for HashTreeError {
    fn from(err: ConfigError) -> Self {
        HashTreeError::InvalidConfig(err)
    }
}

impl From<io::Error> for HashTreeError {
    fn from(err: io::Error) -> Self {
        HashTreeError::Io(err)
    }
}

/// Builds a hash tree from `chunks`.
///
/// `algorithm` defaults to SHA-256 and `workers` to the host's available
/// parallelism. Leaves are hashed concurrently but always assembled in input
/// order, so the root digest does not depend on the worker count.
pub fn build_tree<I>(
    chunks: I,
    algorithm: Option<HashAlgorithm>,
    workers: Option<usize>,
) -> HashTreeResult<Tree>
where
    I: IntoIterator,
    I::Item: Into<Chunk>,
{
    let chunks: Vec<Chunk> = chunks.into_iter().map(Into::into).collect();
    Tree::build(chunks, algorithm.unwrap_or_default(), workers)
}

/// Rebuilds a tree from `reference_chunks` and compares root digests.
///
/// A mismatch, or a reference set that cannot be built at all, yields
/// `false`.
pub fn verify(tree: &Tree, reference_chunks: &[Chunk]) -> bool {
    merkle::verify::verify(tree, reference_chunks)
}

/// Builds a hash ring, linking every node to the digest of its successor.
pub fn build_ring<I>(chunks: I, algorithm: Option<HashAlgorithm>) -> HashTreeResult<Ring>
where
    I: IntoIterator,
    I::Item: Into<Chunk>,
{
    let chunks: Vec<Chunk> = chunks.into_iter().map(Into::into).collect();
    Ring::build(chunks, algorithm.unwrap_or_default())
}
