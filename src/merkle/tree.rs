use tracing::debug;

use super::lane::lane_xor;
use super::types::{InternalNode, LeafNode, Node};
use crate::chunk::Chunk;
use crate::config::TreeConfig;
use crate::hash::{Digest, HashAlgorithm};
use crate::utils::parallel::WorkerPool;
use crate::{HashTreeError, HashTreeResult, LeafFailure};

/// Folds `nodes` level by level until a single root remains.
///
/// Pairs are formed left to right; a trailing unpaired node is wrapped in a
/// single-child [`InternalNode`]. A one-element input is its own root.
pub fn build_from_nodes(nodes: Vec<Node>, algorithm: HashAlgorithm) -> HashTreeResult<Node> {
    if nodes.is_empty() {
        return Err(HashTreeError::EmptyInput);
    }

    let mut current = nodes;
    let mut level = 0usize;
    while current.len() > 1 {
        let mut next = Vec::with_capacity(current.len().div_ceil(2));
        let mut iter = current.into_iter();
        while let Some(left) = iter.next() {
            let right = iter.next();
            next.push(Node::from(InternalNode::combine(left, right, algorithm)));
        }
        level += 1;
        debug!(level, nodes = next.len(), "folded tree level");
        current = next;
    }

    current.pop().ok_or(HashTreeError::EmptyInput)
}

/// Hash tree over an ordered list of chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
    algorithm: HashAlgorithm,
    leaf_count: usize,
}

impl Tree {
    /// Hashes every chunk on a worker pool, then assembles the levels.
    ///
    /// Leaf failures are collected from all workers and reported together;
    /// no partial tree is returned.
    #[tracing::instrument(skip_all, fields(chunks = chunks.len(), %algorithm))]
    pub fn build(
        chunks: Vec<Chunk>,
        algorithm: HashAlgorithm,
        workers: Option<usize>,
    ) -> HashTreeResult<Self> {
        if chunks.is_empty() {
            return Err(HashTreeError::EmptyInput);
        }
        let pool = WorkerPool::new(workers)?;
        debug!(workers = pool.workers(), "hashing leaves");

        let results = pool.map_ordered(chunks, |chunk| LeafNode::new(chunk, algorithm));
        let mut leaves = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(leaf) => leaves.push(Node::Leaf(leaf)),
                Err(error) => failures.push(LeafFailure { index, error }),
            }
        }
        if !failures.is_empty() {
            return Err(HashTreeError::WorkerFailure(failures));
        }

        let leaf_count = leaves.len();
        let root = build_from_nodes(leaves, algorithm)?;
        debug!(root = %root.digest(), leaf_count, "hash tree built");
        Ok(Self {
            root,
            algorithm,
            leaf_count,
        })
    }

    /// Builds with the algorithm and worker count from `config`.
    pub fn build_with(chunks: Vec<Chunk>, config: &TreeConfig) -> HashTreeResult<Self> {
        Self::build(chunks, config.algorithm(), config.workers())
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_digest(&self) -> &Digest {
        self.root.digest()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of levels, counting the leaf level.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Leaves in their original input order.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        self.root.leaves()
    }

    /// [`lane_xor`] over the leaves at positions `a` and `b`.
    pub fn lane_xor(&self, a: usize, b: usize) -> Option<Digest> {
        let leaves = self.leaves();
        let left = leaves.get(a)?;
        let right = leaves.get(b)?;
        Some(lane_xor(left, right, self.algorithm))
    }
}
