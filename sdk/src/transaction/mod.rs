//! # Transaction Type System
//!
//! Construction, signing, encoding, and decoding for every transaction
//! kind the network supports.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — Tag bytes, FeeRatio, AccessList wire values
//! typed.rs    — Native tagged transactions (value transfer, deploy,
//!               execution, account update, cancel, anchoring — each with
//!               fee-delegated and ratio counterparts)
//! builder.rs  — Fluent TransactionBuilder for the typed variants
//! legacy.rs   — Untagged legacy transactions
//! ethereum.rs — Ethereum-compatible access-list transactions (0x78 envelope)
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** — assemble fields with [`TransactionBuilder`] or the struct
//!    literals.
//! 2. **Sign** — `sign_as_sender` computes the variant's signing digest and
//!    appends a sender signature; fee-delegated variants additionally take
//!    `sign_as_fee_payer`.
//! 3. **Encode** — `encode()` produces the raw wire bytes for submission.
//!    Unsigned encodings are valid too (empty signature list).
//! 4. **Decode** — [`Transaction::decode`] dispatches on the leading byte
//!    and reproduces the exact value; `recover_*` operations rebuild the
//!    signer public keys from the signatures alone.
//!
//! ## Digest rules
//!
//! Every variant owns its field order. The sender digest for a typed
//! transaction is the Keccak-256 of
//! `rlp([rlp([tag, fields…]), chain_id, 0, 0])` — all fields except the
//! signature lists and the fee payer. The fee payer digest additionally
//! folds the fee payer address in:
//! `rlp([rlp([tag, fields…]), fee_payer, chain_id, 0, 0])`. Signing and
//! encoding never touch the network; this module is pure computation.

pub mod builder;
pub mod ethereum;
pub mod legacy;
pub mod typed;
pub mod types;

pub use builder::TransactionBuilder;
pub use ethereum::EthereumAccessListTransaction;
pub use legacy::LegacyTransaction;
pub use typed::{FeeDelegation, TxPayload, TypedTransaction};
pub use types::{AccessList, AccessTuple, FeeRatio, TxType};

use thiserror::Error;

use crate::account::AccountKeyError;
use crate::crypto::keys::KeyError;
use crate::crypto::signature::SignatureError;
use crate::rlp::RlpError;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from transaction construction, signing, encoding, and decoding.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The leading byte named no known transaction type.
    #[error("unsupported transaction type tag {0:#04x}")]
    UnsupportedTxType(u8),

    /// The decoded field list had the wrong element count for the
    /// dispatched type.
    #[error("wrong field count for {tx_type}: expected {expected}, got {got}")]
    FieldCount {
        tx_type: TxType,
        expected: usize,
        got: usize,
    },

    /// A fee ratio outside `1..=99`.
    #[error("invalid fee ratio {0}: must be in 1..=99")]
    InvalidFeeRatio(u8),

    /// A required field was never set before signing or encoding.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A fee-payer operation was attempted on a non-delegated transaction.
    #[error("transaction type is not fee-delegated")]
    NotFeeDelegated,

    /// The signing key's address does not match the transaction's `from`
    /// (or fee payer) field.
    #[error("signer address {actual} does not match the transaction's {field} field {expected}")]
    SignerMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// The variant admits exactly one signature and already has it.
    #[error("{0} cannot carry more than one signature")]
    SignatureLimit(TxType),

    /// A decoded field held a value the type forbids (e.g. a non-empty
    /// recipient on a contract deploy).
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Rlp(#[from] RlpError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    AccountKey(#[from] AccountKeyError),
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Any decodable transaction, dispatched on its leading byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Untagged legacy transaction (leading byte ≥ 0xc0, i.e. a bare RLP
    /// list).
    Legacy(LegacyTransaction),
    /// Native tagged transaction.
    Typed(TypedTransaction),
    /// Ethereum-compatible access-list transaction (0x78 envelope).
    EthereumAccessList(EthereumAccessListTransaction),
}

impl Transaction {
    /// Decodes any raw transaction, routing on the leading byte:
    /// a native tag dispatches to the matching typed parser, `0x78` to the
    /// Ethereum envelope, and anything that parses as a bare RLP list to
    /// the legacy parser. Unknown tags fail closed.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        let first = *bytes
            .first()
            .ok_or(TransactionError::Rlp(RlpError::UnexpectedEnd { position: 0 }))?;

        if first >= 0xc0 {
            return Ok(Self::Legacy(LegacyTransaction::decode(bytes)?));
        }
        if first == types::ETHEREUM_ENVELOPE_PREFIX {
            return Ok(Self::EthereumAccessList(
                EthereumAccessListTransaction::decode(bytes)?,
            ));
        }
        if TxType::from_native_tag(first).is_some() {
            return Ok(Self::Typed(TypedTransaction::decode(bytes)?));
        }
        Err(TransactionError::UnsupportedTxType(first))
    }

    /// The raw wire bytes of this transaction.
    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        match self {
            Self::Legacy(tx) => tx.encode(),
            Self::Typed(tx) => tx.encode(),
            Self::EthereumAccessList(tx) => tx.encode(),
        }
    }

    /// Keccak-256 of the full encoding — the hash the network knows the
    /// transaction by.
    pub fn transaction_hash(&self) -> Result<[u8; 32], TransactionError> {
        match self {
            Self::Legacy(tx) => tx.transaction_hash(),
            Self::Typed(tx) => tx.transaction_hash(),
            Self::EthereumAccessList(tx) => tx.transaction_hash(),
        }
    }

    /// This transaction's type discriminant.
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::Typed(tx) => tx.tx_type(),
            Self::EthereumAccessList(_) => TxType::EthereumAccessList,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_fails_closed() {
        // 0x05 is in the sub-0xc0 range but maps to no native type.
        let err = Transaction::decode(&[0x05, 0xc0]).unwrap_err();
        assert!(matches!(err, TransactionError::UnsupportedTxType(0x05)));
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        assert!(matches!(
            Transaction::decode(&[]).unwrap_err(),
            TransactionError::Rlp(RlpError::UnexpectedEnd { .. })
        ));
    }
}
