use blake2::Blake2s256;
use sha2::Digest as _;
use sha2::Sha256;
use sha3::Sha3_256;

use super::algorithm::HashAlgorithm;
use super::digest::{Digest, DIGEST_SIZE};

/// Streaming hasher dispatching over the [`HashAlgorithm`] selector.
#[derive(Clone)]
pub struct Hasher {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Sha256(Sha256),
    Sha3_256(Sha3_256),
    Blake2s256(Blake2s256),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    /// Creates a fresh hasher for `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let backend = match algorithm {
            HashAlgorithm::Sha256 => Backend::Sha256(Sha256::new()),
            HashAlgorithm::Sha3_256 => Backend::Sha3_256(Sha3_256::new()),
            HashAlgorithm::Blake2s256 => Backend::Blake2s256(Blake2s256::new()),
            HashAlgorithm::Blake3 => Backend::Blake3(Box::new(blake3::Hasher::new())),
        };
        Self { backend }
    }

    /// Absorbs additional bytes into the hasher state.
    pub fn update(&mut self, bytes: &[u8]) {
        match &mut self.backend {
            Backend::Sha256(inner) => inner.update(bytes),
            Backend::Sha3_256(inner) => inner.update(bytes),
            Backend::Blake2s256(inner) => inner.update(bytes),
            Backend::Blake3(inner) => {
                inner.update(bytes);
            }
        }
    }

    /// Finalises the hasher and returns the 32-byte digest.
    pub fn finalize(self) -> Digest {
        let mut out = [0u8; DIGEST_SIZE];
        match self.backend {
            Backend::Sha256(inner) => out.copy_from_slice(&inner.finalize()),
            Backend::Sha3_256(inner) => out.copy_from_slice(&inner.finalize()),
            Backend::Blake2s256(inner) => out.copy_from_slice(&inner.finalize()),
            Backend::Blake3(inner) => out.copy_from_slice(inner.finalize().as_bytes()),
        }
        Digest::from_bytes(out)
    }
}
