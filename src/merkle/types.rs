use crate::chunk::{Chunk, ChunkError};
use crate::hash::{Digest, HashAlgorithm};

/// Tree node wrapping one input chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    chunk: Chunk,
    digest: Digest,
    lanes: Option<Box<[u8]>>,
}

impl LeafNode {
    /// Encodes and hashes `chunk`.
    pub fn new(chunk: Chunk, algorithm: HashAlgorithm) -> Result<Self, ChunkError> {
        let (digest, lanes) = match &chunk {
            Chunk::Lanes(data) => {
                let packed = data.pack()?;
                (algorithm.digest(&packed), Some(packed.into_boxed_slice()))
            }
            other => (algorithm.digest(&other.encode()?), None),
        };
        Ok(Self {
            chunk,
            digest,
            lanes,
        })
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Packed little-endian lane buffer, present only for lane chunks.
    pub fn lanes(&self) -> Option<&[u8]> {
        self.lanes.as_deref()
    }
}

/// Node whose digest is derived from one or two children.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalNode {
    left: Node,
    right: Option<Node>,
    digest: Digest,
}

impl InternalNode {
    /// Combines `left` and an optional `right` sibling.
    pub fn combine(left: Node, right: Option<Node>, algorithm: HashAlgorithm) -> Self {
        let digest = match &right {
            Some(right) => algorithm.digest_concat(&[
                left.digest().as_bytes().as_slice(),
                right.digest().as_bytes().as_slice(),
            ]),
            None => algorithm.digest(left.digest().as_bytes()),
        };
        Self {
            left,
            right,
            digest,
        }
    }

    pub fn left(&self) -> &Node {
        &self.left
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_ref()
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}

/// Either kind of tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(LeafNode),
    Internal(Box<InternalNode>),
}

impl Node {
    pub fn digest(&self) -> &Digest {
        match self {
            Node::Leaf(leaf) => leaf.digest(),
            Node::Internal(internal) => internal.digest(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of levels below and including this node.
    pub fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal(internal) => {
                let right = internal.right().map(Node::height).unwrap_or(0);
                1 + internal.left().height().max(right)
            }
        }
    }

    /// Leaves under this node, left to right.
    pub fn leaves(&self) -> Vec<&LeafNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(leaf) => out.push(leaf),
                Node::Internal(internal) => {
                    if let Some(right) = internal.right() {
                        stack.push(right);
                    }
                    stack.push(internal.left());
                }
            }
        }
        out
    }
}

impl From<LeafNode> for Node {
    fn from(leaf: LeafNode) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<InternalNode> for Node {
    fn from(internal: InternalNode) -> Self {
        Node::Internal(Box::new(internal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> LeafNode {
        LeafNode::new(Chunk::from(text), HashAlgorithm::Sha256).unwrap()
    }

    #[test]
    fn leaf_digest_hashes_the_encoding() {
        let node = leaf("apple");
        assert_eq!(*node.digest(), HashAlgorithm::Sha256.digest(b"apple"));
        assert!(node.lanes().is_none());
    }

    #[test]
    fn lane_leaf_keeps_packed_buffer() {
        let node = LeafNode::new(Chunk::from(vec![1u32, 2, 3]), HashAlgorithm::Sha256).unwrap();
        let packed = node.lanes().unwrap();
        assert_eq!(packed.len(), 12);
        assert_eq!(*node.digest(), HashAlgorithm::Sha256.digest(packed));
    }

    #[test]
    fn combine_hashes_raw_child_digests() {
        let a = leaf("a");
        let b = leaf("b");
        let mut concat = a.digest().as_bytes().to_vec();
        concat.extend_from_slice(b.digest().as_bytes());
        let expected = HashAlgorithm::Sha256.digest(&concat);
        let parent = InternalNode::combine(a.into(), Some(b.into()), HashAlgorithm::Sha256);
        assert_eq!(*parent.digest(), expected);
    }

    #[test]
    fn single_child_is_rehashed_not_duplicated() {
        let a = leaf("a");
        let expected = HashAlgorithm::Sha256.digest(a.digest().as_bytes());
        let duplicated = InternalNode::combine(
            a.clone().into(),
            Some(a.clone().into()),
            HashAlgorithm::Sha256,
        );
        let promoted = InternalNode::combine(a.into(), None, HashAlgorithm::Sha256);
        assert_eq!(*promoted.digest(), expected);
        assert_ne!(promoted.digest(), duplicated.digest());
    }

    #[test]
    fn leaves_are_listed_left_to_right() {
        let left = InternalNode::combine(leaf("a").into(), Some(leaf("b").into()), HashAlgorithm::Sha256);
        let right = InternalNode::combine(leaf("c").into(), None, HashAlgorithm::Sha256);
        let root: Node = InternalNode::combine(left.into(), Some(right.into()), HashAlgorithm::Sha256).into();
        let texts: Vec<String> = root.leaves().iter().map(|l| l.chunk().to_string()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert_eq!(root.height(), 3);
    }
}
