//! # Account Keys
//!
//! How an address authorizes transactions. On VELA an account's key is not
//! necessarily "the public key whose hash is the address" — an account can
//! be updated on-chain to any of the variants in [`AccountKey`]:
//!
//! - **Nil** — a placeholder inside role-based updates ("leave this role
//!   unchanged"). Never a standalone account key.
//! - **Legacy** — the address is still coupled to its original key; a
//!   signature is valid if the recovered key hashes to the account address.
//! - **Public** — a single registered public key, decoupled from the
//!   address.
//! - **Fail** — the account can never sign anything (used to permanently
//!   disable direct transactions from contract accounts).
//! - **WeightedMultiSig** — up to ten weighted keys with a threshold; a
//!   transaction is authorized once the distinct signers' weights sum to at
//!   least the threshold.
//! - **RoleBased** — a composite assigning one of the above per role
//!   (transaction / account-update / fee-payer).
//!
//! ## Encoding
//!
//! Every variant encodes as a leading tag byte followed by an RLP payload
//! (Nil is the bare RLP empty string). Decoding re-runs the same invariant
//! validation as programmatic construction — corrupted or malicious RLP can
//! never produce an `AccountKey` value that violates the multisig bounds.

use std::fmt;

use thiserror::Error;

use crate::crypto::keys::{KeyError, PublicKey};
use crate::rlp::{self, RlpError, RlpItem};

// ---------------------------------------------------------------------------
// Constants and errors
// ---------------------------------------------------------------------------

/// Tag bytes of the wire encoding. Fixed by the chain, not negotiable.
pub const TAG_LEGACY: u8 = 0x01;
pub const TAG_PUBLIC: u8 = 0x02;
pub const TAG_FAIL: u8 = 0x03;
pub const TAG_WEIGHTED_MULTISIG: u8 = 0x04;
pub const TAG_ROLE_BASED: u8 = 0x05;

/// RLP empty string; the entire encoding of the Nil key.
const NIL_ENCODING: u8 = 0x80;

/// Upper bound on keys in a weighted multisig.
pub const MAX_WEIGHTED_KEYS: usize = 10;

/// Upper bound on a single key's weight.
pub const MAX_KEY_WEIGHT: u32 = 255;

/// Number of roles a role-based key can assign.
pub const ROLE_COUNT: usize = 3;

/// Errors from account key construction, decoding, and signer validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountKeyError {
    /// The weighted multisig bounds were violated. Raised identically for
    /// programmatic construction and RLP decode.
    #[error(
        "threshold violation: threshold {threshold} with {key_count} keys summing to {weight_sum}"
    )]
    ThresholdViolation {
        threshold: u32,
        weight_sum: u32,
        key_count: usize,
    },

    /// A key weight was zero or above [`MAX_KEY_WEIGHT`].
    #[error("invalid key weight {0}: must be in 1..=255")]
    InvalidWeight(u32),

    /// The leading tag byte named no known variant.
    #[error("unknown account key tag {0:#04x}")]
    UnknownTag(u8),

    /// A role-based key held no roles or more than [`ROLE_COUNT`].
    #[error("invalid role count {0}: must be in 1..=3")]
    InvalidRoleCount(usize),

    /// A role-based key may not contain another role-based key.
    #[error("role-based keys cannot nest")]
    NestedRoleBased,

    /// The account key can never authorize (Fail key, or Nil outside a
    /// role-based update).
    #[error("account key never authorizes transactions")]
    NeverAuthorizes,

    /// A recovered signer is not among the registered keys.
    #[error("signer {0} is not a registered key for this account")]
    UnknownSigner(String),

    /// The matched signers' weights did not reach the threshold.
    #[error("signature weight {got} below threshold {required}")]
    InsufficientWeight { required: u32, got: u32 },

    /// No signatures were supplied to validate.
    #[error("no signers supplied")]
    NoSigners,

    #[error(transparent)]
    Rlp(#[from] RlpError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The three authorization roles a role-based key distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Ordinary transactions sent from the account.
    Transaction,
    /// Account-key update transactions.
    AccountUpdate,
    /// Fee-payer co-signatures on fee-delegated transactions.
    FeePayer,
}

impl Role {
    fn index(self) -> usize {
        match self {
            Self::Transaction => 0,
            Self::AccountUpdate => 1,
            Self::FeePayer => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// WeightedPublicKey / WeightedMultiSig
// ---------------------------------------------------------------------------

/// One key in a weighted multisig: a public key and its voting weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPublicKey {
    pub key: PublicKey,
    pub weight: u32,
}

/// A threshold multisig over up to ten weighted public keys.
///
/// Construction enforces the invariants; the fields stay private so no
/// in-bounds value can later be mutated out of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedMultiSig {
    threshold: u32,
    keys: Vec<WeightedPublicKey>,
}

impl WeightedMultiSig {
    /// Builds a weighted multisig, validating:
    ///
    /// - `1 <= keys.len() <= 10`,
    /// - every weight in `1..=255`,
    /// - `1 <= threshold <= sum(weights)`.
    ///
    /// A threshold above the weight sum would make the account permanently
    /// unusable, which is why it is rejected here rather than discovered at
    /// validation time.
    pub fn new(threshold: u32, keys: Vec<WeightedPublicKey>) -> Result<Self, AccountKeyError> {
        if keys.is_empty() || keys.len() > MAX_WEIGHTED_KEYS {
            return Err(AccountKeyError::ThresholdViolation {
                threshold,
                weight_sum: 0,
                key_count: keys.len(),
            });
        }
        for key in &keys {
            if key.weight == 0 || key.weight > MAX_KEY_WEIGHT {
                return Err(AccountKeyError::InvalidWeight(key.weight));
            }
        }
        // 10 keys * 255 max weight fits comfortably in u32.
        let weight_sum: u32 = keys.iter().map(|k| k.weight).sum();
        if threshold == 0 || threshold > weight_sum {
            return Err(AccountKeyError::ThresholdViolation {
                threshold,
                weight_sum,
                key_count: keys.len(),
            });
        }
        Ok(Self { threshold, keys })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn keys(&self) -> &[WeightedPublicKey] {
        &self.keys
    }
}

// ---------------------------------------------------------------------------
// RoleBasedKey
// ---------------------------------------------------------------------------

/// A composite key assigning a (possibly different) key per role.
///
/// Holds one to three role keys in the fixed order transaction /
/// account-update / fee-payer. When fewer than three are present, lookups
/// for the missing roles fall back to the transaction role key, matching
/// the chain's semantics for accounts updated with a partial role list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBasedKey {
    roles: Vec<AccountKey>,
}

impl RoleBasedKey {
    /// Builds a role-based key, rejecting empty or oversized role lists and
    /// nested role-based keys.
    pub fn new(roles: Vec<AccountKey>) -> Result<Self, AccountKeyError> {
        if roles.is_empty() || roles.len() > ROLE_COUNT {
            return Err(AccountKeyError::InvalidRoleCount(roles.len()));
        }
        if roles.iter().any(|k| matches!(k, AccountKey::RoleBased(_))) {
            return Err(AccountKeyError::NestedRoleBased);
        }
        Ok(Self { roles })
    }

    /// The key governing `role`, falling back to the transaction role when
    /// the requested role was not set.
    pub fn role(&self, role: Role) -> &AccountKey {
        self.roles.get(role.index()).unwrap_or(&self.roles[0])
    }

    pub fn roles(&self) -> &[AccountKey] {
        &self.roles
    }
}

// ---------------------------------------------------------------------------
// AccountKey
// ---------------------------------------------------------------------------

/// The authorization rule registered for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKey {
    Nil,
    Legacy,
    Public(PublicKey),
    Fail,
    WeightedMultiSig(WeightedMultiSig),
    RoleBased(RoleBasedKey),
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "Nil"),
            Self::Legacy => write!(f, "Legacy"),
            Self::Public(_) => write!(f, "Public"),
            Self::Fail => write!(f, "Fail"),
            Self::WeightedMultiSig(m) => {
                write!(f, "WeightedMultiSig({}-of-{})", m.threshold(), m.keys().len())
            }
            Self::RoleBased(r) => write!(f, "RoleBased({} roles)", r.roles().len()),
        }
    }
}

impl AccountKey {
    /// Encodes the key to its tagged wire bytes.
    pub fn to_rlp_bytes(&self) -> Vec<u8> {
        match self {
            Self::Nil => vec![NIL_ENCODING],
            Self::Legacy => tagged(TAG_LEGACY, &RlpItem::list(vec![])),
            Self::Fail => tagged(TAG_FAIL, &RlpItem::list(vec![])),
            Self::Public(key) => tagged(TAG_PUBLIC, &RlpItem::bytes(key.to_compressed())),
            Self::WeightedMultiSig(multisig) => {
                let keys = multisig
                    .keys()
                    .iter()
                    .map(|wk| {
                        RlpItem::list(vec![
                            RlpItem::uint(wk.weight.into()),
                            RlpItem::bytes(wk.key.to_compressed()),
                        ])
                    })
                    .collect();
                tagged(
                    TAG_WEIGHTED_MULTISIG,
                    &RlpItem::list(vec![
                        RlpItem::uint(multisig.threshold().into()),
                        RlpItem::List(keys),
                    ]),
                )
            }
            Self::RoleBased(role_based) => {
                let roles = role_based
                    .roles()
                    .iter()
                    .map(|key| RlpItem::Bytes(key.to_rlp_bytes()))
                    .collect();
                tagged(TAG_ROLE_BASED, &RlpItem::List(roles))
            }
        }
    }

    /// Decodes a tagged wire encoding, re-validating every construction
    /// invariant. Decode failure is mandatory for out-of-bounds input, not
    /// advisory.
    pub fn decode(bytes: &[u8]) -> Result<Self, AccountKeyError> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or(AccountKeyError::Rlp(RlpError::UnexpectedEnd { position: 0 }))?;

        match tag {
            NIL_ENCODING if payload.is_empty() => Ok(Self::Nil),
            TAG_LEGACY => {
                rlp::decode(payload)?.as_list_of(0)?;
                Ok(Self::Legacy)
            }
            TAG_FAIL => {
                rlp::decode(payload)?.as_list_of(0)?;
                Ok(Self::Fail)
            }
            TAG_PUBLIC => {
                let item = rlp::decode(payload)?;
                Ok(Self::Public(PublicKey::from_slice(item.as_bytes()?)?))
            }
            TAG_WEIGHTED_MULTISIG => {
                let item = rlp::decode(payload)?;
                let fields = item.as_list_of(2)?;
                let threshold = u32::try_from(fields[0].as_uint()?)
                    .map_err(|_| RlpError::InvalidInteger("threshold wider than 32 bits"))?;
                let mut keys = Vec::new();
                for entry in fields[1].as_list()? {
                    let pair = entry.as_list_of(2)?;
                    let weight = u32::try_from(pair[0].as_uint()?)
                        .map_err(|_| RlpError::InvalidInteger("weight wider than 32 bits"))?;
                    let key = PublicKey::from_slice(pair[1].as_bytes()?)?;
                    keys.push(WeightedPublicKey { key, weight });
                }
                Ok(Self::WeightedMultiSig(WeightedMultiSig::new(
                    threshold, keys,
                )?))
            }
            TAG_ROLE_BASED => {
                let item = rlp::decode(payload)?;
                let mut roles = Vec::new();
                for entry in item.as_list()? {
                    roles.push(Self::decode(entry.as_bytes()?)?);
                }
                Ok(Self::RoleBased(RoleBasedKey::new(roles)?))
            }
            other => Err(AccountKeyError::UnknownTag(other)),
        }
    }

    /// Checks that `signers` (recovered from a transaction's signature
    /// list) jointly satisfy this key for `role`.
    ///
    /// This is the explicit, layered validation step — it is never run
    /// implicitly during decode or recovery:
    ///
    /// - **Legacy** accepts any non-empty signer set; the caller is
    ///   responsible for comparing the recovered address to the account
    ///   address, which is the actual legacy rule.
    /// - **Public** requires every signer to be the registered key.
    /// - **WeightedMultiSig** sums the weights of *distinct* matched
    ///   signers and compares against the threshold; a signer not in the
    ///   key set is an error, and duplicated signatures count once.
    /// - **RoleBased** recurses into the key for `role`.
    /// - **Fail** and **Nil** never authorize.
    pub fn validate_signers(
        &self,
        role: Role,
        signers: &[PublicKey],
    ) -> Result<(), AccountKeyError> {
        if signers.is_empty() {
            return Err(AccountKeyError::NoSigners);
        }
        match self {
            Self::Nil | Self::Fail => Err(AccountKeyError::NeverAuthorizes),
            Self::Legacy => Ok(()),
            Self::Public(key) => {
                for signer in signers {
                    if signer != key {
                        return Err(AccountKeyError::UnknownSigner(signer.to_hex()));
                    }
                }
                Ok(())
            }
            Self::WeightedMultiSig(multisig) => {
                let mut matched: Vec<&WeightedPublicKey> = Vec::new();
                for signer in signers {
                    let entry = multisig
                        .keys()
                        .iter()
                        .find(|wk| &wk.key == signer)
                        .ok_or_else(|| AccountKeyError::UnknownSigner(signer.to_hex()))?;
                    if !matched.iter().any(|wk| wk.key == entry.key) {
                        matched.push(entry);
                    }
                }
                let got: u32 = matched.iter().map(|wk| wk.weight).sum();
                if got < multisig.threshold() {
                    return Err(AccountKeyError::InsufficientWeight {
                        required: multisig.threshold(),
                        got,
                    });
                }
                Ok(())
            }
            Self::RoleBased(role_based) => role_based.role(role).validate_signers(role, signers),
        }
    }
}

/// Tag byte followed by the RLP encoding of `payload`.
fn tagged(tag: u8, payload: &RlpItem) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(rlp::encode(payload));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
