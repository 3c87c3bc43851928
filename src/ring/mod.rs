//! Circular chain of hashed nodes.
//!
//! Every node stores its own digest and the digest of the cyclically next
//! node, so a ring of `N` nodes returns to its starting digest after `N`
//! links.  Rings are built in two passes (hash, then link) and are read-only
//! afterwards.  The flat text persistence lives in [`ser`].

mod ser;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::chunk::Chunk;
use crate::hash::{Digest, HashAlgorithm};
use crate::{HashTreeError, HashTreeResult, LeafFailure};

pub use ser::{deserialize, serialize};

/// Ring member.
#[derive(Debug, Clone, PartialEq)]
pub struct RingNode {
    chunk: Chunk,
    digest: Digest,
    next_digest: Digest,
    lanes: Option<Box<[u8]>>,
}

impl RingNode {
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Digest of the cyclically next node.
    pub fn next_digest(&self) -> &Digest {
        &self.next_digest
    }

    pub(crate) fn lanes(&self) -> Option<&[u8]> {
        self.lanes.as_deref()
    }
}

/// Ordered, circular sequence of [`RingNode`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    nodes: Vec<RingNode>,
    algorithm: HashAlgorithm,
}

impl Ring {
    /// Hashes every chunk in order, then links each node to its successor.
    pub fn build(chunks: Vec<Chunk>, algorithm: HashAlgorithm) -> HashTreeResult<Self> {
        if chunks.is_empty() {
            return Err(HashTreeError::EmptyInput);
        }

        let mut nodes = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            let failure = |error| HashTreeError::InvalidChunk(LeafFailure { index, error });
            let (digest, lanes) = match &chunk {
                Chunk::Lanes(data) => {
                    let packed = data.pack().map_err(failure)?;
                    (algorithm.digest(&packed), Some(packed.into_boxed_slice()))
                }
                other => (algorithm.digest(&other.encode().map_err(failure)?), None),
            };
            nodes.push(RingNode {
                chunk,
                digest,
                next_digest: digest,
                lanes,
            });
        }

        let count = nodes.len();
        for index in 0..count {
            nodes[index].next_digest = nodes[(index + 1) % count].digest;
        }
        debug!(nodes = count, %algorithm, "hash ring linked");
        Ok(Self { nodes, algorithm })
    }

    pub fn nodes(&self) -> &[RingNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: rings are built from at least one chunk.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Position of the node after `index`, wrapping at the end.
    pub fn successor(&self, index: usize) -> usize {
        (index + 1) % self.nodes.len()
    }

    /// Follows the `next_digest` link of the node at `index`.
    ///
    /// The search starts right after `index` and wraps, so rings holding
    /// repeated chunks still resolve to the nearest matching node.
    pub fn follow_link(&self, index: usize) -> Option<usize> {
        let count = self.nodes.len();
        let target = self.nodes.get(index)?.next_digest;
        (1..=count)
            .map(|step| (index + step) % count)
            .find(|&candidate| self.nodes[candidate].digest == target)
    }

    /// Endless walk around the ring starting at `start`.
    pub fn walk(&self, start: usize) -> impl Iterator<Item = &RingNode> + '_ {
        let offset = start % self.nodes.len().max(1);
        self.nodes.iter().cycle().skip(offset)
    }

    /// `true` when every node links to its successor's digest.
    pub fn is_linked(&self) -> bool {
        (0..self.nodes.len())
            .all(|index| self.nodes[index].next_digest == self.nodes[self.successor(index)].digest)
    }

    /// Flat text form, one `[[nodes]]` record per node.
    pub fn serialize(&self) -> String {
        ser::serialize(self)
    }

    /// Reloads a ring, recomputing every digest and link from `data`.
    pub fn deserialize(text: &str, algorithm: HashAlgorithm) -> HashTreeResult<Self> {
        ser::deserialize(text, algorithm)
    }

    /// Writes [`Ring::serialize`] output to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> HashTreeResult<()> {
        let path = path.as_ref();
        fs::write(path, self.serialize())?;
        debug!(path = %path.display(), nodes = self.len(), "ring saved");
        Ok(())
    }

    /// Reads and deserializes a ring file.
    pub fn load(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> HashTreeResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::deserialize(&text, algorithm)
    }
}
