//! # Key Management
//!
//! secp256k1 keypair handling and address derivation for VELA identities.
//!
//! Every address on the network is derived from a secp256k1 public key:
//! take the uncompressed point (64 bytes of x ‖ y, without the 0x04 SEC1
//! prefix), Keccak-256 it, and keep the last 20 bytes. The private key is a
//! 32-byte scalar; signing is deterministic per RFC 6979.
//!
//! ## Security considerations
//!
//! - Key generation uses the OS CSPRNG (`OsRng`). If your OS RNG is broken,
//!   you have bigger problems than VELA.
//! - Private key bytes are never logged and never appear in `Debug` output.
//! - Public key bytes are validated on construction — a 64-byte blob that
//!   is not a point on the curve is rejected, not stored.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::crypto::hash::keccak256;

/// Errors that can occur during key and address operations.
///
/// These are deliberately vague about *why* key material was rejected —
/// leaking details about secrets through error messages is a classic
/// footgun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid private key bytes: wrong length or not a valid scalar")]
    InvalidPrivateKey,

    #[error("invalid public key bytes: not a point on the secp256k1 curve")]
    InvalidPublicKey,

    #[error("invalid address: expected 20 bytes of hex, got {0:?}")]
    InvalidAddress(String),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// The text form at every API boundary is `0x` followed by 40 lowercase hex
/// characters. Parsing accepts mixed case; printing always normalizes to
/// lowercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The all-zero address. Appears on-chain only in special positions
    /// (e.g. an unset fee payer before the fee payer signs).
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Builds an address from a slice, validating the length.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 20] = slice
            .try_into()
            .map_err(|_| KeyError::InvalidAddress(hex::encode(slice)))?;
        Ok(Self(bytes))
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `true` for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(stripped).map_err(|_| KeyError::InvalidAddress(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(KeyError::InvalidAddress(s.to_string()));
        }
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A validated secp256k1 public key, stored as the 64-byte uncompressed
/// point (x ‖ y, no SEC1 prefix).
///
/// This is what account keys register on-chain and what signature recovery
/// produces. Construction always goes through curve validation — there is
/// no way to hold a `PublicKey` whose bytes are not a real point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; 64],
}

impl PublicKey {
    /// Parses a public key from any of the accepted wire forms:
    ///
    /// - 33 bytes — SEC1 compressed (`02`/`03` prefix), the on-chain form,
    /// - 65 bytes — SEC1 uncompressed (`04` prefix),
    /// - 64 bytes — uncompressed point without the prefix.
    ///
    /// The point is validated on the curve; the identity point is rejected
    /// (SEC1 cannot even represent it in these forms).
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let verifying_key = match slice.len() {
            33 | 65 => {
                VerifyingKey::from_sec1_bytes(slice).map_err(|_| KeyError::InvalidPublicKey)?
            }
            64 => {
                let mut sec1 = [0u8; 65];
                sec1[0] = 0x04;
                sec1[1..].copy_from_slice(slice);
                VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| KeyError::InvalidPublicKey)?
            }
            _ => return Err(KeyError::InvalidPublicKey),
        };
        Ok(Self::from_verifying_key(&verifying_key))
    }

    /// Parses a `0x`-prefixed hex public key in any accepted wire form.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_slice(&bytes)
    }

    /// Wraps a k256 verifying key.
    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&point.as_bytes()[1..]);
        Self { bytes }
    }

    /// Converts back to a k256 verifying key for curve arithmetic.
    pub(crate) fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        let mut sec1 = [0u8; 65];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(&self.bytes);
        VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// The 64-byte uncompressed point.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    /// The 33-byte SEC1 compressed form — what account keys carry in their
    /// RLP encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        // The stored bytes were validated at construction, so re-encoding
        // cannot fail.
        let key = self
            .to_verifying_key()
            .expect("stored public key is a valid point");
        let point = key.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Derives the account address: last 20 bytes of Keccak-256 of the
    /// uncompressed point.
    pub fn to_address(&self) -> Address {
        let digest = keccak256(&self.bytes);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        Address::new(addr)
    }

    /// `0x`-prefixed lowercase hex of the uncompressed point.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &self.to_hex()[..18])
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 signing key.
///
/// The atomic unit of authority on the network: whoever holds this scalar
/// controls the derived address. Intentionally does NOT implement
/// `Serialize`/`Clone`-into-logs conveniences — exporting secret material is
/// a deliberate act via [`to_bytes`](Self::to_bytes).
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generates a fresh key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstructs a key from its 32-byte scalar.
    ///
    /// Rejects zero and out-of-order scalars — those are not valid keys,
    /// and accepting them would produce unverifiable signatures.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstructs a key from a `0x`-prefixed hex scalar.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPrivateKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        Self::from_bytes(&arr)
    }

    /// The public half of this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Exports the raw 32-byte scalar. Handle with care: this is the only
    /// secret standing between an attacker and the derived address.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Access to the underlying k256 key for the signature module.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print scalar material, not even partially.
        write!(f, "PrivateKey(address={})", self.address())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
