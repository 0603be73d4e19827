//! Message digests used by the canonicalizer and the context cache.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Digest used to hash blank node neighbourhoods during canonicalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `data`.
    pub fn hex_digest(self, data: &[u8]) -> String {
        match self {
            Self::Sha1 => hex_encode(&Sha1::digest(data)),
            Self::Sha256 => hex_encode(&Sha256::digest(data)),
        }
    }
}

/// Lowercase hex SHA-256 of `data`.
pub(crate) fn sha256_hex(data: &[u8]) -> String {
    HashAlgorithm::Sha256.hex_digest(data)
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            HashAlgorithm::Sha1.hex_digest(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            HashAlgorithm::Sha256.hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn algorithm_names() {
        let parsed: HashAlgorithm = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha256);
        assert_eq!(serde_json::to_string(&HashAlgorithm::Sha1).unwrap(), "\"sha1\"");
    }
}
