use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::digest::Digest;
use super::hasher::Hasher;
use crate::HashTreeError;

/// Hash algorithms accepted by the tree and ring builders.
///
/// | Variant | Identifier | Digest Bits |
/// |---------|------------|-------------|
/// | `Sha256` | `sha256` | 256 |
/// | `Sha3_256` | `sha3_256` | 256 |
/// | `Blake2s256` | `blake2s256` | 256 |
/// | `Blake3` | `blake3` | 256 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(non_camel_case_types)]
pub enum HashAlgorithm {
    /// SHA-256 from the SHA-2 family.
    #[default]
    Sha256,
    /// SHA3-256 (Keccak based).
    Sha3_256,
    /// BLAKE2s with a 32-byte output.
    Blake2s256,
    /// BLAKE3 in its default hashing mode.
    Blake3,
}

impl HashAlgorithm {
    /// Every selectable algorithm in identifier order.
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Blake2s256,
        HashAlgorithm::Blake3,
    ];

    /// Returns the stable textual identifier.
    pub const fn id(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3_256",
            HashAlgorithm::Blake2s256 => "blake2s256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hashes a single byte sequence.
    pub fn digest(self, input: &[u8]) -> Digest {
        let mut hasher = Hasher::new(self);
        hasher.update(input);
        hasher.finalize()
    }

    /// Hashes the concatenation of `parts` without materialising it.
    pub fn digest_concat(self, parts: &[&[u8]]) -> Digest {
        let mut hasher = Hasher::new(self);
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize()
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.id() == s)
            .ok_or_else(|| HashTreeError::UnsupportedAlgorithm(s.to_owned()))
    }
}
