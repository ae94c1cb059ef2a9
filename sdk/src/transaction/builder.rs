//! Fluent construction of typed transactions.
//!
//! The builder exists because a [`TypedTransaction`] has enough fields
//! that positional construction is error-prone, and because some of them
//! (chain id, nonce) are often filled in from a node later than the
//! payload is decided. `build()` is where "required field never set"
//! becomes an error instead of a silently wrong transaction.

use crate::crypto::keys::Address;
use crate::crypto::signature::SignatureData;
use crate::transaction::typed::{FeeDelegation, TxPayload, TypedTransaction};
use crate::transaction::types::FeeRatio;
use crate::transaction::TransactionError;

/// Builder for [`TypedTransaction`] values.
///
/// # Example
///
/// ```
/// use vela_sdk::crypto::keys::PrivateKey;
/// use vela_sdk::transaction::{TransactionBuilder, TxPayload};
///
/// let key = PrivateKey::generate();
/// let mut tx = TransactionBuilder::new(TxPayload::Cancel)
///     .nonce(7)
///     .gas_price(25_000_000_000)
///     .gas(21_000)
///     .chain_id(1001)
///     .from(key.address())
///     .build()
///     .unwrap();
/// tx.sign_as_sender(&key).unwrap();
/// assert_eq!(tx.signatures.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    payload: TxPayload,
    delegation: FeeDelegation,
    nonce: Option<u64>,
    gas_price: Option<u128>,
    gas: Option<u64>,
    chain_id: Option<u64>,
    from: Option<Address>,
    fee_payer: Option<Address>,
    signatures: Vec<SignatureData>,
    fee_payer_signatures: Vec<SignatureData>,
}

impl TransactionBuilder {
    /// Starts a builder for the given payload, sender-pays by default.
    pub fn new(payload: TxPayload) -> Self {
        Self {
            payload,
            delegation: FeeDelegation::None,
            nonce: None,
            gas_price: None,
            gas: None,
            chain_id: None,
            from: None,
            fee_payer: None,
            signatures: Vec::new(),
            fee_payer_signatures: Vec::new(),
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Switches to full fee delegation.
    pub fn fee_delegated(mut self) -> Self {
        self.delegation = FeeDelegation::Delegated;
        self
    }

    /// Switches to partial fee delegation with the given split.
    pub fn fee_ratio(mut self, ratio: FeeRatio) -> Self {
        self.delegation = FeeDelegation::PartialDelegated(ratio);
        self
    }

    /// Pre-sets the fee payer address (otherwise it is filled in when the
    /// fee payer signs).
    pub fn fee_payer(mut self, fee_payer: Address) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Seeds existing signatures, e.g. when reassembling a transaction
    /// gathered from several signers.
    pub fn signatures(mut self, signatures: Vec<SignatureData>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn fee_payer_signatures(mut self, signatures: Vec<SignatureData>) -> Self {
        self.fee_payer_signatures = signatures;
        self
    }

    /// Assembles the transaction, verifying every required field was set
    /// and that fee-payer material only appears on delegated types.
    pub fn build(self) -> Result<TypedTransaction, TransactionError> {
        let delegated = !matches!(self.delegation, FeeDelegation::None);
        if !delegated && (self.fee_payer.is_some() || !self.fee_payer_signatures.is_empty()) {
            return Err(TransactionError::NotFeeDelegated);
        }
        Ok(TypedTransaction {
            payload: self.payload,
            delegation: self.delegation,
            nonce: self.nonce.ok_or(TransactionError::MissingField("nonce"))?,
            gas_price: self
                .gas_price
                .ok_or(TransactionError::MissingField("gas_price"))?,
            gas: self.gas.ok_or(TransactionError::MissingField("gas"))?,
            chain_id: self
                .chain_id
                .ok_or(TransactionError::MissingField("chain_id"))?,
            from: self.from.ok_or(TransactionError::MissingField("from"))?,
            signatures: self.signatures,
            fee_payer: self.fee_payer,
            fee_payer_signatures: self.fee_payer_signatures,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
