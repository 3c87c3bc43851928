//! Digest primitives shared by the tree and ring layers.
//!
//! Every supported algorithm produces a 256-bit digest, so the crate uses a
//! single fixed-width [`Digest`] type regardless of the selected
//! [`HashAlgorithm`].  The submodules cover:
//!
//! * [`algorithm`] – the algorithm selector and its textual identifiers.
//! * [`digest`] – the digest value type and its hexadecimal forms.
//! * [`hasher`] – a streaming hasher dispatching over the selector.

pub mod algorithm;
pub mod digest;
pub mod hasher;

pub use algorithm::HashAlgorithm;
pub use digest::{Digest, HexOutput, DIGEST_SIZE};
pub use hasher::Hasher;

/// Hashes `input` with the default algorithm ([`HashAlgorithm::Sha256`]).
pub fn hash(input: &[u8]) -> Digest {
    HashAlgorithm::default().digest(input)
}
