//! Native tagged transactions.
//!
//! One struct covers the whole native family: a kind-specific
//! [`TxPayload`], the common fields every kind shares, and a
//! [`FeeDelegation`] mode. The (payload, delegation) pair determines the
//! [`TxType`] tag, and with it the exact field order of both the signing
//! digest and the final encoding.
//!
//! The field orders are fixed by the chain (`TxHashRLP = tag ++
//! rlp([fields…, senderSigs, (feePayer, feePayerSigs)])`):
//!
//! ```text
//! value transfer        [nonce, gasPrice, gas, to, value, from, (ratio)]
//! value transfer memo   [nonce, gasPrice, gas, to, value, from, input, (ratio)]
//! contract deploy       [nonce, gasPrice, gas, to, value, from, input,
//!                        humanReadable, (ratio), codeFormat]
//! contract execution    [nonce, gasPrice, gas, to, value, from, input, (ratio)]
//! account update        [nonce, gasPrice, gas, from, rlpEncodedKey, (ratio)]
//! cancel                [nonce, gasPrice, gas, from, (ratio)]
//! chain data anchoring  [nonce, gasPrice, gas, from, anchoredData, (ratio)]
//! ```
//!
//! The ratio slot sits immediately before the signature list for every
//! kind except contract deploy, where it precedes the code-format field.
//! Getting this one quirk wrong produces signatures the chain rejects,
//! which is why the digest tests below pin exact byte sequences.

use crate::account::AccountKey;
use crate::crypto::hash::{keccak256, keccak256_multi};
use crate::crypto::keys::{Address, PrivateKey, PublicKey};
use crate::crypto::signature::{self, SignatureData};
use crate::rlp::{self, RlpItem};
use crate::transaction::types::{FeeRatio, TxType};
use crate::transaction::TransactionError;

// ---------------------------------------------------------------------------
// TxPayload / FeeDelegation
// ---------------------------------------------------------------------------

/// The kind-specific fields of a native transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxPayload {
    /// Plain value transfer to an account.
    ValueTransfer { to: Address, value: u128 },
    /// Value transfer carrying an arbitrary memo.
    ValueTransferMemo {
        to: Address,
        value: u128,
        input: Vec<u8>,
    },
    /// Contract creation. The recipient slot is empty on the wire; the
    /// code and constructor arguments travel in `input`.
    SmartContractDeploy {
        value: u128,
        input: Vec<u8>,
        human_readable: bool,
        code_format: u8,
    },
    /// Call into a deployed contract.
    SmartContractExecution {
        to: Address,
        value: u128,
        input: Vec<u8>,
    },
    /// Replace the account's authorization key.
    AccountUpdate { key: AccountKey },
    /// Cancel a pending transaction with the same nonce.
    Cancel,
    /// Anchor service-chain data onto the main chain.
    ChainDataAnchoring { input: Vec<u8> },
}

/// Who pays the gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeDelegation {
    /// The sender pays.
    None,
    /// A fee payer co-signs and pays everything.
    Delegated,
    /// A fee payer co-signs and pays the given percentage.
    PartialDelegated(FeeRatio),
}

impl FeeDelegation {
    fn is_delegated(self) -> bool {
        !matches!(self, Self::None)
    }

    fn ratio(self) -> Option<FeeRatio> {
        match self {
            Self::PartialDelegated(ratio) => Some(ratio),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TypedTransaction
// ---------------------------------------------------------------------------

/// A native tagged transaction in any signing state.
///
/// Unsigned values are legal — they encode with empty signature lists and
/// become submittable once `sign_as_sender` (and, for delegated types,
/// `sign_as_fee_payer`) has run.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTransaction {
    pub payload: TxPayload,
    pub delegation: FeeDelegation,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: u64,
    /// Chain id folded into every signature's `v`. Required before
    /// signing; recovered from the signatures on decode.
    pub chain_id: u64,
    pub from: Address,
    /// Sender signatures, in append order.
    pub signatures: Vec<SignatureData>,
    /// Fee payer address; meaningful only for delegated types and `None`
    /// until the fee payer signs (or sets it explicitly).
    pub fee_payer: Option<Address>,
    /// Fee payer signatures, in append order.
    pub fee_payer_signatures: Vec<SignatureData>,
}

impl TypedTransaction {
    /// The tag this (payload, delegation) combination encodes under.
    pub fn tx_type(&self) -> TxType {
        use self::FeeDelegation as D;
        use self::TxPayload as P;
        match (&self.payload, self.delegation) {
            (P::ValueTransfer { .. }, D::None) => TxType::ValueTransfer,
            (P::ValueTransfer { .. }, D::Delegated) => TxType::FeeDelegatedValueTransfer,
            (P::ValueTransfer { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedValueTransferWithRatio
            }
            (P::ValueTransferMemo { .. }, D::None) => TxType::ValueTransferMemo,
            (P::ValueTransferMemo { .. }, D::Delegated) => TxType::FeeDelegatedValueTransferMemo,
            (P::ValueTransferMemo { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedValueTransferMemoWithRatio
            }
            (P::AccountUpdate { .. }, D::None) => TxType::AccountUpdate,
            (P::AccountUpdate { .. }, D::Delegated) => TxType::FeeDelegatedAccountUpdate,
            (P::AccountUpdate { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedAccountUpdateWithRatio
            }
            (P::SmartContractDeploy { .. }, D::None) => TxType::SmartContractDeploy,
            (P::SmartContractDeploy { .. }, D::Delegated) => {
                TxType::FeeDelegatedSmartContractDeploy
            }
            (P::SmartContractDeploy { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedSmartContractDeployWithRatio
            }
            (P::SmartContractExecution { .. }, D::None) => TxType::SmartContractExecution,
            (P::SmartContractExecution { .. }, D::Delegated) => {
                TxType::FeeDelegatedSmartContractExecution
            }
            (P::SmartContractExecution { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedSmartContractExecutionWithRatio
            }
            (P::Cancel, D::None) => TxType::Cancel,
            (P::Cancel, D::Delegated) => TxType::FeeDelegatedCancel,
            (P::Cancel, D::PartialDelegated(_)) => TxType::FeeDelegatedCancelWithRatio,
            (P::ChainDataAnchoring { .. }, D::None) => TxType::ChainDataAnchoring,
            (P::ChainDataAnchoring { .. }, D::Delegated) => {
                TxType::FeeDelegatedChainDataAnchoring
            }
            (P::ChainDataAnchoring { .. }, D::PartialDelegated(_)) => {
                TxType::FeeDelegatedChainDataAnchoringWithRatio
            }
        }
    }

    // -- Field assembly -----------------------------------------------------

    /// The digest/body fields in this variant's exact order: everything
    /// except the signature lists and the fee payer.
    fn body_fields(&self) -> Vec<RlpItem> {
        let mut fields = vec![
            RlpItem::uint(self.nonce.into()),
            RlpItem::uint(self.gas_price),
            RlpItem::uint(self.gas.into()),
        ];
        let ratio = self.delegation.ratio();
        let push_ratio = |fields: &mut Vec<RlpItem>| {
            if let Some(ratio) = ratio {
                fields.push(RlpItem::uint(ratio.percent().into()));
            }
        };

        match &self.payload {
            TxPayload::ValueTransfer { to, value } => {
                fields.push(RlpItem::bytes(to.as_bytes()));
                fields.push(RlpItem::uint(*value));
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                push_ratio(&mut fields);
            }
            TxPayload::ValueTransferMemo { to, value, input } => {
                fields.push(RlpItem::bytes(to.as_bytes()));
                fields.push(RlpItem::uint(*value));
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                fields.push(RlpItem::bytes(input));
                push_ratio(&mut fields);
            }
            TxPayload::SmartContractDeploy {
                value,
                input,
                human_readable,
                code_format,
            } => {
                // Deploy has no recipient; the slot is the empty string.
                fields.push(RlpItem::bytes([]));
                fields.push(RlpItem::uint(*value));
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                fields.push(RlpItem::bytes(input));
                fields.push(RlpItem::uint(u128::from(*human_readable)));
                // The one kind where the ratio does not sit last: it goes
                // between humanReadable and codeFormat.
                push_ratio(&mut fields);
                fields.push(RlpItem::uint((*code_format).into()));
            }
            TxPayload::SmartContractExecution { to, value, input } => {
                fields.push(RlpItem::bytes(to.as_bytes()));
                fields.push(RlpItem::uint(*value));
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                fields.push(RlpItem::bytes(input));
                push_ratio(&mut fields);
            }
            TxPayload::AccountUpdate { key } => {
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                fields.push(RlpItem::Bytes(key.to_rlp_bytes()));
                push_ratio(&mut fields);
            }
            TxPayload::Cancel => {
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                push_ratio(&mut fields);
            }
            TxPayload::ChainDataAnchoring { input } => {
                fields.push(RlpItem::bytes(self.from.as_bytes()));
                fields.push(RlpItem::bytes(input));
                push_ratio(&mut fields);
            }
        }
        fields
    }

    /// `rlp([tag, fields…])` — the inner byte string both digests wrap.
    fn digest_inner(&self) -> Vec<u8> {
        let mut items = vec![RlpItem::bytes(self.tx_type().tag())];
        items.extend(self.body_fields());
        rlp::encode(&RlpItem::List(items))
    }

    fn require_chain_id(&self) -> Result<u64, TransactionError> {
        if self.chain_id == 0 {
            return Err(TransactionError::MissingField("chain_id"));
        }
        Ok(self.chain_id)
    }

    // -- Digests ------------------------------------------------------------

    /// The byte string the sender signs:
    /// `rlp([rlp([tag, fields…]), chain_id, 0, 0])`.
    pub fn sender_sig_rlp(&self) -> Result<Vec<u8>, TransactionError> {
        let chain_id = self.require_chain_id()?;
        Ok(rlp::encode(&RlpItem::list(vec![
            RlpItem::Bytes(self.digest_inner()),
            RlpItem::uint(chain_id.into()),
            RlpItem::uint(0),
            RlpItem::uint(0),
        ])))
    }

    /// Keccak-256 of [`sender_sig_rlp`](Self::sender_sig_rlp).
    pub fn sender_sign_digest(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.sender_sig_rlp()?))
    }

    /// The byte string the fee payer signs:
    /// `rlp([rlp([tag, fields…]), fee_payer, chain_id, 0, 0])`.
    pub fn fee_payer_sig_rlp(&self) -> Result<Vec<u8>, TransactionError> {
        if !self.delegation.is_delegated() {
            return Err(TransactionError::NotFeeDelegated);
        }
        let fee_payer = self
            .fee_payer
            .ok_or(TransactionError::MissingField("fee_payer"))?;
        let chain_id = self.require_chain_id()?;
        Ok(rlp::encode(&RlpItem::list(vec![
            RlpItem::Bytes(self.digest_inner()),
            RlpItem::bytes(fee_payer.as_bytes()),
            RlpItem::uint(chain_id.into()),
            RlpItem::uint(0),
            RlpItem::uint(0),
        ])))
    }

    /// Keccak-256 of [`fee_payer_sig_rlp`](Self::fee_payer_sig_rlp).
    pub fn fee_payer_sign_digest(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.fee_payer_sig_rlp()?))
    }

    // -- Signing ------------------------------------------------------------

    /// Signs as the sender and appends the signature.
    ///
    /// The key must control the transaction's `from` address — signing
    /// with an unrelated key would produce a transaction the chain
    /// rejects, so it is refused here.
    pub fn sign_as_sender(&mut self, key: &PrivateKey) -> Result<&mut Self, TransactionError> {
        if key.address() != self.from {
            return Err(TransactionError::SignerMismatch {
                field: "from",
                expected: self.from.to_hex(),
                actual: key.address().to_hex(),
            });
        }
        let digest = self.sender_sign_digest()?;
        let raw = signature::sign_digest(key, &digest)?;
        self.signatures.push(SignatureData::chain_bound(
            raw.rec_id,
            raw.r,
            raw.s,
            self.chain_id,
        ));
        Ok(self)
    }

    /// Signs as the fee payer and appends the signature. Sets the fee
    /// payer address from the key when it was not set before.
    pub fn sign_as_fee_payer(&mut self, key: &PrivateKey) -> Result<&mut Self, TransactionError> {
        if !self.delegation.is_delegated() {
            return Err(TransactionError::NotFeeDelegated);
        }
        match self.fee_payer {
            None => self.fee_payer = Some(key.address()),
            Some(expected) if expected != key.address() => {
                return Err(TransactionError::SignerMismatch {
                    field: "fee_payer",
                    expected: expected.to_hex(),
                    actual: key.address().to_hex(),
                });
            }
            Some(_) => {}
        }
        let digest = self.fee_payer_sign_digest()?;
        let raw = signature::sign_digest(key, &digest)?;
        self.fee_payer_signatures.push(SignatureData::chain_bound(
            raw.rec_id,
            raw.r,
            raw.s,
            self.chain_id,
        ));
        Ok(self)
    }

    // -- Encoding -----------------------------------------------------------

    /// The raw wire bytes: `tag ++ rlp([fields…, senderSigs, (feePayer,
    /// feePayerSigs)])`. Valid in any signing state.
    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        let mut items = self.body_fields();
        items.push(SignatureData::list_to_rlp(&self.signatures));
        if self.delegation.is_delegated() {
            items.push(match self.fee_payer {
                Some(addr) => RlpItem::bytes(addr.as_bytes()),
                None => RlpItem::bytes([]),
            });
            items.push(SignatureData::list_to_rlp(&self.fee_payer_signatures));
        }
        let mut out = self.tx_type().tag().to_vec();
        out.extend(rlp::encode(&RlpItem::List(items)));
        Ok(out)
    }

    /// Keccak-256 of the full encoding.
    pub fn transaction_hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.encode()?))
    }

    /// The sender-scoped transaction hash of a fee-delegated transaction:
    /// Keccak-256 over the encoding *without* the fee payer material. For
    /// non-delegated types this is the plain transaction hash.
    pub fn sender_tx_hash(&self) -> Result<[u8; 32], TransactionError> {
        if !self.delegation.is_delegated() {
            return self.transaction_hash();
        }
        let mut items = self.body_fields();
        items.push(SignatureData::list_to_rlp(&self.signatures));
        Ok(keccak256_multi(&[
            self.tx_type().tag(),
            &rlp::encode(&RlpItem::List(items)),
        ]))
    }

    // -- Decoding -----------------------------------------------------------

    /// Decodes a native tagged encoding back into the exact value.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or(TransactionError::UnsupportedTxType(0))?;
        let tx_type =
            TxType::from_native_tag(tag).ok_or(TransactionError::UnsupportedTxType(tag))?;

        let item = rlp::decode(rest)?;
        let fields = item.as_list()?;

        let base = base_field_count(tx_type);
        let expected = base
            + usize::from(tx_type.has_fee_ratio())
            + 1
            + if tx_type.is_fee_delegated() { 2 } else { 0 };
        if fields.len() != expected {
            return Err(TransactionError::FieldCount {
                tx_type,
                expected,
                got: fields.len(),
            });
        }

        let nonce = fields[0].as_u64()?;
        let gas_price = fields[1].as_uint()?;
        let gas = fields[2].as_u64()?;

        let (payload, ratio, mut index) = decode_payload(tx_type, fields)?;
        let from = Address::from_slice(fields[from_field_index(tx_type)].as_bytes()?)?;

        let delegation = match (tx_type.is_fee_delegated(), ratio) {
            (false, _) => FeeDelegation::None,
            (true, None) => FeeDelegation::Delegated,
            (true, Some(ratio)) => FeeDelegation::PartialDelegated(ratio),
        };

        let signatures = SignatureData::list_from_rlp(&fields[index])?;
        index += 1;

        let (fee_payer, fee_payer_signatures) = if tx_type.is_fee_delegated() {
            let payer_bytes = fields[index].as_bytes()?;
            let fee_payer = if payer_bytes.is_empty() {
                None
            } else {
                Some(Address::from_slice(payer_bytes)?)
            };
            let fee_payer_signatures = SignatureData::list_from_rlp(&fields[index + 1])?;
            (fee_payer, fee_payer_signatures)
        } else {
            (None, Vec::new())
        };

        // The chain id is not a wire field of its own — recover it from
        // whichever signature carries one.
        let chain_id = signatures
            .iter()
            .chain(&fee_payer_signatures)
            .find_map(SignatureData::chain_id)
            .unwrap_or(0);

        Ok(Self {
            payload,
            delegation,
            nonce,
            gas_price,
            gas,
            chain_id,
            from,
            signatures,
            fee_payer,
            fee_payer_signatures,
        })
    }

    // -- Recovery -----------------------------------------------------------

    /// Recovers one public key per sender signature, in signature order.
    pub fn recover_sender_keys(&self) -> Result<Vec<PublicKey>, TransactionError> {
        if self.signatures.is_empty() {
            return Err(TransactionError::MissingField("signatures"));
        }
        let digest = self.sender_sign_digest()?;
        self.signatures
            .iter()
            .map(|sig| signature::recover(&digest, sig).map_err(TransactionError::from))
            .collect()
    }

    /// Recovers one public key per fee payer signature, in signature order.
    pub fn recover_fee_payer_keys(&self) -> Result<Vec<PublicKey>, TransactionError> {
        if self.fee_payer_signatures.is_empty() {
            return Err(TransactionError::MissingField("fee_payer_signatures"));
        }
        let digest = self.fee_payer_sign_digest()?;
        self.fee_payer_signatures
            .iter()
            .map(|sig| signature::recover(&digest, sig).map_err(TransactionError::from))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Per-kind decode tables
// ---------------------------------------------------------------------------

/// Number of body fields (excluding ratio, signature lists, fee payer).
fn base_field_count(tx_type: TxType) -> usize {
    use crate::transaction::types::TxType as T;
    match tx_type {
        T::ValueTransfer | T::FeeDelegatedValueTransfer | T::FeeDelegatedValueTransferWithRatio => 6,
        T::ValueTransferMemo
        | T::FeeDelegatedValueTransferMemo
        | T::FeeDelegatedValueTransferMemoWithRatio => 7,
        // nonce, gasPrice, gas, to, value, from, input, humanReadable,
        // codeFormat.
        T::SmartContractDeploy
        | T::FeeDelegatedSmartContractDeploy
        | T::FeeDelegatedSmartContractDeployWithRatio => 9,
        T::SmartContractExecution
        | T::FeeDelegatedSmartContractExecution
        | T::FeeDelegatedSmartContractExecutionWithRatio => 7,
        T::AccountUpdate | T::FeeDelegatedAccountUpdate | T::FeeDelegatedAccountUpdateWithRatio => 5,
        T::Cancel | T::FeeDelegatedCancel | T::FeeDelegatedCancelWithRatio => 4,
        T::ChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoringWithRatio => 5,
        T::Legacy | T::EthereumAccessList => unreachable!("not native tagged types"),
    }
}

/// Index of the `from` field within the body for each kind.
fn from_field_index(tx_type: TxType) -> usize {
    use crate::transaction::types::TxType as T;
    match tx_type {
        T::AccountUpdate
        | T::FeeDelegatedAccountUpdate
        | T::FeeDelegatedAccountUpdateWithRatio
        | T::Cancel
        | T::FeeDelegatedCancel
        | T::FeeDelegatedCancelWithRatio
        | T::ChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoringWithRatio => 3,
        _ => 5,
    }
}

/// Parses the kind-specific fields, returning the payload, the ratio (for
/// with-ratio types), and the index of the signature list.
fn decode_payload(
    tx_type: TxType,
    fields: &[RlpItem],
) -> Result<(TxPayload, Option<FeeRatio>, usize), TransactionError> {
    use crate::transaction::types::TxType as T;

    let ratio_at = |index: usize| -> Result<Option<FeeRatio>, TransactionError> {
        if !tx_type.has_fee_ratio() {
            return Ok(None);
        }
        let raw = fields[index].as_u64()?;
        let percent = u8::try_from(raw).map_err(|_| TransactionError::InvalidField {
            field: "fee_ratio",
            reason: "must fit in one byte",
        })?;
        Ok(Some(FeeRatio::new(percent)?))
    };

    match tx_type {
        T::ValueTransfer | T::FeeDelegatedValueTransfer | T::FeeDelegatedValueTransferWithRatio => {
            let payload = TxPayload::ValueTransfer {
                to: Address::from_slice(fields[3].as_bytes()?)?,
                value: fields[4].as_uint()?,
            };
            let ratio = ratio_at(6)?;
            Ok((payload, ratio, 6 + usize::from(ratio.is_some())))
        }
        T::ValueTransferMemo
        | T::FeeDelegatedValueTransferMemo
        | T::FeeDelegatedValueTransferMemoWithRatio => {
            let payload = TxPayload::ValueTransferMemo {
                to: Address::from_slice(fields[3].as_bytes()?)?,
                value: fields[4].as_uint()?,
                input: fields[6].as_bytes()?.to_vec(),
            };
            let ratio = ratio_at(7)?;
            Ok((payload, ratio, 7 + usize::from(ratio.is_some())))
        }
        T::SmartContractDeploy
        | T::FeeDelegatedSmartContractDeploy
        | T::FeeDelegatedSmartContractDeployWithRatio => {
            if !fields[3].as_bytes()?.is_empty() {
                return Err(TransactionError::InvalidField {
                    field: "to",
                    reason: "must be empty for a contract deploy",
                });
            }
            let human_readable = match fields[7].as_uint()? {
                0 => false,
                1 => true,
                _ => {
                    return Err(TransactionError::InvalidField {
                        field: "human_readable",
                        reason: "must be 0 or 1",
                    })
                }
            };
            let ratio = ratio_at(8)?;
            let code_format_index = 8 + usize::from(ratio.is_some());
            let code_format = u8::try_from(fields[code_format_index].as_uint()?).map_err(|_| {
                TransactionError::InvalidField {
                    field: "code_format",
                    reason: "must fit in one byte",
                }
            })?;
            let payload = TxPayload::SmartContractDeploy {
                value: fields[4].as_uint()?,
                input: fields[6].as_bytes()?.to_vec(),
                human_readable,
                code_format,
            };
            Ok((payload, ratio, code_format_index + 1))
        }
        T::SmartContractExecution
        | T::FeeDelegatedSmartContractExecution
        | T::FeeDelegatedSmartContractExecutionWithRatio => {
            let payload = TxPayload::SmartContractExecution {
                to: Address::from_slice(fields[3].as_bytes()?)?,
                value: fields[4].as_uint()?,
                input: fields[6].as_bytes()?.to_vec(),
            };
            let ratio = ratio_at(7)?;
            Ok((payload, ratio, 7 + usize::from(ratio.is_some())))
        }
        T::AccountUpdate | T::FeeDelegatedAccountUpdate | T::FeeDelegatedAccountUpdateWithRatio => {
            let payload = TxPayload::AccountUpdate {
                key: AccountKey::decode(fields[4].as_bytes()?)?,
            };
            let ratio = ratio_at(5)?;
            Ok((payload, ratio, 5 + usize::from(ratio.is_some())))
        }
        T::Cancel | T::FeeDelegatedCancel | T::FeeDelegatedCancelWithRatio => {
            let ratio = ratio_at(4)?;
            Ok((TxPayload::Cancel, ratio, 4 + usize::from(ratio.is_some())))
        }
        T::ChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoring
        | T::FeeDelegatedChainDataAnchoringWithRatio => {
            let payload = TxPayload::ChainDataAnchoring {
                input: fields[4].as_bytes()?.to_vec(),
            };
            let ratio = ratio_at(5)?;
            Ok((payload, ratio, 5 + usize::from(ratio.is_some())))
        }
        T::Legacy | T::EthereumAccessList => unreachable!("not native tagged types"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
