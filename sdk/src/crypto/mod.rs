//! # Cryptographic Primitives
//!
//! Everything the codec layers need from cryptography, and nothing more:
//!
//! ```text
//! hash.rs      — Keccak-256 digests
//! keys.rs      — secp256k1 keypairs, public keys, and address derivation
//! signature.rs — recoverable (v, r, s) signatures and public-key recovery
//! ```
//!
//! The VELA wire format is built on secp256k1 recoverable ECDSA and
//! Keccak-256 throughout: transaction signing digests are Keccak-256 of an
//! RLP structure, signatures carry a recovery id so the signer's public key
//! (and therefore address) can be reconstructed from the signature alone,
//! and an address is the last 20 bytes of the Keccak-256 of the
//! uncompressed public key.
//!
//! Signing is deterministic (RFC 6979) — the same key and digest always
//! produce the same signature, so golden-vector tests are possible and no
//! RNG is consulted at signing time.

pub mod hash;
pub mod keys;
pub mod signature;

pub use hash::{keccak256, keccak256_multi};
pub use keys::{Address, KeyError, PrivateKey, PublicKey};
pub use signature::{recover, SignatureData, SignatureError};
