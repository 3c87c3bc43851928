//! Binary hash tree over ordered chunks.
//!
//! The module fixes the following rules:
//!
//! * **Leaves:** `digest = H(encode(chunk))`, computed once when the leaf is
//!   created.  Lane chunks additionally keep their packed buffer for
//!   [`lane_xor`].
//! * **Internal nodes:** `digest = H(left ++ right)` over the raw child digest
//!   bytes, or `H(left)` when the node has no right child.
//! * **Odd levels:** a trailing node is promoted through a single-child
//!   internal node.  It is never duplicated.
//! * **Ordering:** leaves keep the caller's order on every level, so the root
//!   digest is a pure function of the ordered chunks and the algorithm.
//!
//! Leaf hashing is delegated to the worker pool in
//! [`utils::parallel`](crate::utils::parallel); level assembly is sequential.

mod lane;
mod tree;
mod types;
pub mod verify;

pub use lane::lane_xor;
pub use tree::{build_from_nodes, Tree};
pub use types::{InternalNode, LeafNode, Node};
pub use verify::{mismatched_leaves, verify_with_workers};
