//! Integrity checks against reference data.
//!
//! A mismatch is an expected outcome and is reported as `false` or as a list of
//! differing leaf positions, never as an error.

use tracing::debug;

use super::tree::Tree;
use crate::chunk::Chunk;

/// Rebuilds a tree from `reference_chunks` and compares root digests.
pub fn verify(tree: &Tree, reference_chunks: &[Chunk]) -> bool {
    verify_with_workers(tree, reference_chunks, None)
}

/// [`verify`] with an explicit worker count for the rebuild.
pub fn verify_with_workers(tree: &Tree, reference_chunks: &[Chunk], workers: Option<usize>) -> bool {
    match Tree::build(reference_chunks.to_vec(), tree.algorithm(), workers) {
        Ok(rebuilt) => rebuilt.root_digest() == tree.root_digest(),
        Err(err) => {
            debug!(%err, "reference chunks could not be rebuilt");
            false
        }
    }
}

/// Positions whose leaf digest differs from the reference chunk's digest.
///
/// Positions present on only one side are reported as mismatches as well. A
/// reference chunk that cannot be encoded counts as a mismatch at its index.
pub fn mismatched_leaves(tree: &Tree, reference_chunks: &[Chunk]) -> Vec<usize> {
    let algorithm = tree.algorithm();
    let leaves = tree.leaves();
    let longest = leaves.len().max(reference_chunks.len());
    (0..longest)
        .filter(|&index| {
            match (leaves.get(index), reference_chunks.get(index)) {
                (Some(leaf), Some(chunk)) => match chunk.encode() {
                    Ok(encoded) => algorithm.digest(&encoded) != *leaf.digest(),
                    Err(_) => true,
                },
                _ => true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;

    fn chunks(items: &[&str]) -> Vec<Chunk> {
        items.iter().map(|item| Chunk::from(*item)).collect()
    }

    #[test]
    fn identical_reference_verifies() {
        let data = chunks(&["apple", "banana", "cherry"]);
        let tree = Tree::build(data.clone(), HashAlgorithm::Sha3_256, Some(2)).unwrap();
        assert!(verify(&tree, &data));
        assert!(mismatched_leaves(&tree, &data).is_empty());
    }

    #[test]
    fn empty_reference_is_a_mismatch() {
        let tree = Tree::build(chunks(&["apple"]), HashAlgorithm::Sha256, Some(1)).unwrap();
        assert!(!verify(&tree, &[]));
    }

    #[test]
    fn mismatches_point_at_changed_and_missing_leaves() {
        let tree = Tree::build(chunks(&["a", "b", "c", "d"]), HashAlgorithm::Sha256, Some(2))
            .unwrap();
        let reference = chunks(&["a", "B", "c"]);
        assert_eq!(mismatched_leaves(&tree, &reference), [1, 3]);
        assert!(!verify(&tree, &reference));
    }

    #[test]
    fn rebuild_uses_the_tree_algorithm() {
        let data = chunks(&["x", "y"]);
        let tree = Tree::build(data.clone(), HashAlgorithm::Blake3, Some(1)).unwrap();
        assert!(verify_with_workers(&tree, &data, Some(4)));
        let sha_tree = Tree::build(data.clone(), HashAlgorithm::Sha256, Some(1)).unwrap();
        assert_ne!(sha_tree.root_digest(), tree.root_digest());
    }
}
