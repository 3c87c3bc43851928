use super::types::LeafNode;
use crate::hash::{Digest, HashAlgorithm};

/// Hashes the byte-wise XOR of two leaves' lane buffers.
///
/// Defined for lane leaves whose packed buffers have equal length. Any other
/// pair falls back to `H(a.digest ++ b.digest)`; the fallback is ordered and
/// therefore not symmetric.
pub fn lane_xor(a: &LeafNode, b: &LeafNode, algorithm: HashAlgorithm) -> Digest {
    match (a.lanes(), b.lanes()) {
        (Some(left), Some(right)) if left.len() == right.len() => {
            let xored: Vec<u8> = left.iter().zip(right).map(|(x, y)| x ^ y).collect();
            algorithm.digest(&xored)
        }
        _ => algorithm.digest_concat(&[
            a.digest().as_bytes().as_slice(),
            b.digest().as_bytes().as_slice(),
        ]),
    }
}
