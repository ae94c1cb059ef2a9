//! Keccak-256 hashing.
//!
//! Keccak-256 (the pre-standardization SHA-3 variant) is the only hash the
//! wire format uses: transaction hashes, signing digests, address
//! derivation, and ABI function selectors all run through it. We keep this
//! module tiny on purpose — one hash function, two entry points.

use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of the input data.
///
/// Returns a fixed 32-byte digest. Note that this is *Keccak*-256, not
/// NIST SHA3-256 — the padding differs, and mixing the two is a classic
/// interoperability bug.
///
/// # Example
///
/// ```
/// use vela_sdk::crypto::keccak256;
///
/// let digest = keccak256(b"");
/// assert_eq!(
///     hex::encode(digest),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Keccak256::digest(data));
    output
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeds the parts sequentially into one hasher state. Used for the typed
/// transaction encodings where a tag byte is prepended to an RLP payload —
/// `keccak256_multi(&[tag, payload])` avoids the temporary buffer.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_known_vectors() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn keccak256_is_not_sha3_256() {
        // SHA3-256("") = a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a.
        // If this assertion ever fails, the wrong hash is wired in.
        assert_ne!(
            hex::encode(keccak256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn multi_matches_concatenation() {
        let joined = keccak256(b"hello world");
        let parts = keccak256_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn deterministic() {
        assert_eq!(keccak256(b"vela"), keccak256(b"vela"));
        assert_ne!(keccak256(b"vela"), keccak256(b"Vela"));
    }
}
