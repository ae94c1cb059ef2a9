//! Recoverable ECDSA signatures.
//!
//! A signature on the wire is the classic `(v, r, s)` tuple: two 32-byte
//! scalars plus a recovery value that lets a verifier reconstruct the
//! signer's public key from the digest and the signature alone. Three `v`
//! conventions coexist, depending on the transaction variant:
//!
//! - `chain_id * 2 + 35 + rec_id` — chain-bound typed and legacy
//!   transactions (replay protection),
//! - `27 + rec_id` — pre-replay-protection legacy transactions,
//! - `rec_id` itself (0 or 1) — the Ethereum typed-envelope variant, which
//!   carries a bare parity bit.
//!
//! [`SignatureData::recovery_id`] normalizes all three back to the raw
//! recovery id. Signing is deterministic (RFC 6979) with low-`s`
//! normalization, so signatures are canonical and reproducible.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use thiserror::Error;

use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::rlp::{RlpError, RlpItem};

/// Errors from signature construction, decoding, and public-key recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// r or s is zero or not a canonical scalar within the curve order.
    #[error("invalid signature scalars: r and s must be non-zero and within the curve order")]
    InvalidScalars,

    /// The `v` value does not fit any supported recovery-id convention.
    #[error("invalid recovery value v = {0}")]
    InvalidRecoveryId(u64),

    /// The (digest, signature) pair does not recover to a point on the curve.
    #[error("public key recovery failed")]
    RecoveryFailed,

    /// The signature's RLP shape was wrong.
    #[error(transparent)]
    Rlp(#[from] RlpError),
}

// ---------------------------------------------------------------------------
// SignatureData
// ---------------------------------------------------------------------------

/// A single `(v, r, s)` signature as carried in a transaction's signature
/// list.
///
/// `r` and `s` are stored as full 32-byte words; the RLP encoding strips
/// leading zeros per the canonical integer convention and decoding pads
/// them back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignatureData {
    /// Recovery value, in one of the three conventions described in the
    /// module docs.
    pub v: u64,
    /// First signature scalar, big-endian.
    pub r: [u8; 32],
    /// Second signature scalar, big-endian, low-s normalized.
    pub s: [u8; 32],
}

impl std::fmt::Debug for SignatureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureData")
            .field("v", &format_args!("{:#x}", self.v))
            .field("r", &format_args!("0x{}", hex::encode(self.r)))
            .field("s", &format_args!("0x{}", hex::encode(self.s)))
            .finish()
    }
}

impl SignatureData {
    /// Assembles a signature from its raw parts.
    pub fn new(v: u64, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// Wraps a raw `(rec_id, r, s)` as a chain-bound signature:
    /// `v = chain_id * 2 + 35 + rec_id`.
    pub fn chain_bound(rec_id: u8, r: [u8; 32], s: [u8; 32], chain_id: u64) -> Self {
        Self {
            v: chain_id * 2 + 35 + u64::from(rec_id),
            r,
            s,
        }
    }

    /// Wraps a raw `(rec_id, r, s)` as a bare-parity signature (`v` ∈
    /// {0, 1}), the Ethereum typed-envelope convention.
    pub fn parity(rec_id: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self {
            v: u64::from(rec_id),
            r,
            s,
        }
    }

    /// Normalizes `v` back to the raw recovery id (0 or 1).
    pub fn recovery_id(&self) -> Result<u8, SignatureError> {
        match self.v {
            0 | 1 => Ok(self.v as u8),
            27 | 28 => Ok((self.v - 27) as u8),
            v if v >= 35 => Ok(((v - 35) % 2) as u8),
            v => Err(SignatureError::InvalidRecoveryId(v)),
        }
    }

    /// The chain id folded into `v`, when the chain-bound convention is in
    /// use. `None` for bare-parity and 27/28-style values.
    pub fn chain_id(&self) -> Option<u64> {
        if self.v >= 35 {
            Some((self.v - 35) / 2)
        } else {
            None
        }
    }

    /// The signature as an RLP item: `[v, r, s]` with canonical integer
    /// encoding for each component.
    pub fn to_rlp(&self) -> RlpItem {
        RlpItem::list(vec![
            RlpItem::uint(self.v.into()),
            scalar_item(&self.r),
            scalar_item(&self.s),
        ])
    }

    /// Parses a signature from its `[v, r, s]` RLP item.
    pub fn from_rlp(item: &RlpItem) -> Result<Self, SignatureError> {
        let fields = item.as_list_of(3)?;
        Ok(Self {
            v: fields[0].as_u64()?,
            r: fields[1].as_word("r")?,
            s: fields[2].as_word("s")?,
        })
    }

    /// Encodes an ordered signature sequence as an RLP list.
    pub fn list_to_rlp(signatures: &[SignatureData]) -> RlpItem {
        RlpItem::list(signatures.iter().map(SignatureData::to_rlp).collect())
    }

    /// Decodes an ordered signature sequence, preserving order.
    pub fn list_from_rlp(item: &RlpItem) -> Result<Vec<SignatureData>, SignatureError> {
        item.as_list()?.iter().map(SignatureData::from_rlp).collect()
    }
}

/// Canonical integer item for a 32-byte scalar: leading zeros stripped,
/// zero as the empty string.
fn scalar_item(word: &[u8; 32]) -> RlpItem {
    let start = word.iter().position(|&b| b != 0).unwrap_or(word.len());
    RlpItem::Bytes(word[start..].to_vec())
}

// ---------------------------------------------------------------------------
// Signing and recovery
// ---------------------------------------------------------------------------

/// Output of a raw signing operation, before a `v` convention is applied.
#[derive(Debug, Clone, Copy)]
pub struct RawSignature {
    pub rec_id: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Signs a 32-byte digest, producing a deterministic low-s signature with
/// its recovery id.
pub fn sign_digest(key: &PrivateKey, digest: &[u8; 32]) -> Result<RawSignature, SignatureError> {
    let (signature, rec_id): (EcdsaSignature, RecoveryId) = key
        .signing_key()
        .sign_prehash_recoverable(digest)
        .map_err(|_| SignatureError::InvalidScalars)?;
    Ok(RawSignature {
        rec_id: rec_id.to_byte(),
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
    })
}

/// Recovers the public key that produced `signature` over `digest`.
///
/// Rejects zero or out-of-order scalars and unusable recovery values. This
/// is the primitive behind every "recover the signers of this transaction"
/// operation.
pub fn recover(digest: &[u8; 32], signature: &SignatureData) -> Result<PublicKey, SignatureError> {
    let ecdsa = EcdsaSignature::from_scalars(signature.r, signature.s)
        .map_err(|_| SignatureError::InvalidScalars)?;
    let rec_id = RecoveryId::from_byte(signature.recovery_id()?)
        .ok_or(SignatureError::RecoveryFailed)?;
    let verifying_key = VerifyingKey::recover_from_prehash(digest, &ecdsa, rec_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(PublicKey::from_verifying_key(&verifying_key))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
