//! Untagged legacy transactions.
//!
//! The oldest wire format on the network: no leading type byte, just a
//! bare RLP list, which is how the decoder recognizes it — a list header
//! byte is always ≥ 0xc0, safely above every native tag. A legacy
//! transaction admits exactly one signature, carried inline as the
//! trailing `v, r, s` fields rather than as a signature list.
//!
//! Replay protection follows the classic scheme: the signing digest folds
//! `[chain_id, 0, 0]` into the field list and the chain id comes back out
//! of `v`. Signatures with `v` of 27/28 (no chain id) are still decodable
//! and recoverable for compatibility with pre-protection material.

use crate::crypto::hash::keccak256;
use crate::crypto::keys::{Address, PrivateKey, PublicKey};
use crate::crypto::signature::{self, SignatureData};
use crate::rlp::{self, RlpItem};
use crate::transaction::types::TxType;
use crate::transaction::TransactionError;

/// An untagged legacy transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas: u64,
    /// Recipient; `None` deploys the `input` as contract code.
    pub to: Option<Address>,
    pub value: u128,
    pub input: Vec<u8>,
    /// Required before signing; recovered from `v` on decode when present.
    pub chain_id: u64,
    /// At most one signature — enforced by [`sign`](Self::sign) and
    /// [`append_signature`](Self::append_signature).
    pub signatures: Vec<SignatureData>,
}

impl LegacyTransaction {
    fn to_item(&self) -> RlpItem {
        match self.to {
            Some(addr) => RlpItem::bytes(addr.as_bytes()),
            None => RlpItem::bytes([]),
        }
    }

    fn base_fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::uint(self.nonce.into()),
            RlpItem::uint(self.gas_price),
            RlpItem::uint(self.gas.into()),
            self.to_item(),
            RlpItem::uint(self.value),
            RlpItem::bytes(&self.input),
        ]
    }

    /// The signing digest: Keccak-256 of
    /// `rlp([nonce, gasPrice, gas, to, value, input, chain_id, 0, 0])`.
    pub fn sign_digest(&self) -> Result<[u8; 32], TransactionError> {
        if self.chain_id == 0 {
            return Err(TransactionError::MissingField("chain_id"));
        }
        let mut fields = self.base_fields();
        fields.push(RlpItem::uint(self.chain_id.into()));
        fields.push(RlpItem::uint(0));
        fields.push(RlpItem::uint(0));
        Ok(keccak256(&rlp::encode(&RlpItem::List(fields))))
    }

    /// Pre-replay-protection digest: Keccak-256 of the bare six fields.
    /// Used only to recover signatures whose `v` carries no chain id.
    fn sign_digest_unprotected(&self) -> [u8; 32] {
        keccak256(&rlp::encode(&RlpItem::List(self.base_fields())))
    }

    /// Signs the transaction. Legacy transactions identify their sender
    /// purely through the signature, so any key may sign — but only once.
    pub fn sign(&mut self, key: &PrivateKey) -> Result<&mut Self, TransactionError> {
        if !self.signatures.is_empty() {
            return Err(TransactionError::SignatureLimit(TxType::Legacy));
        }
        let digest = self.sign_digest()?;
        let raw = signature::sign_digest(key, &digest)?;
        self.signatures.push(SignatureData::chain_bound(
            raw.rec_id,
            raw.r,
            raw.s,
            self.chain_id,
        ));
        Ok(self)
    }

    /// Appends an externally produced signature, refusing a second one.
    pub fn append_signature(&mut self, sig: SignatureData) -> Result<(), TransactionError> {
        if !self.signatures.is_empty() {
            return Err(TransactionError::SignatureLimit(TxType::Legacy));
        }
        self.signatures.push(sig);
        Ok(())
    }

    /// The raw wire bytes. Signed transactions append the inline
    /// `v, r, s`; unsigned ones are the bare six-field list.
    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        let mut fields = self.base_fields();
        if let Some(sig) = self.signatures.first() {
            fields.push(RlpItem::uint(sig.v.into()));
            fields.push(scalar_field(&sig.r));
            fields.push(scalar_field(&sig.s));
        }
        Ok(rlp::encode(&RlpItem::List(fields)))
    }

    /// Keccak-256 of the full encoding.
    pub fn transaction_hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.encode()?))
    }

    /// Decodes a bare-list legacy encoding (6 fields unsigned, 9 signed).
    pub fn decode(bytes: &[u8]) -> Result<Self, TransactionError> {
        let item = rlp::decode(bytes)?;
        let fields = item.as_list()?;
        if fields.len() != 6 && fields.len() != 9 {
            return Err(TransactionError::FieldCount {
                tx_type: TxType::Legacy,
                expected: 9,
                got: fields.len(),
            });
        }

        let to_bytes = fields[3].as_bytes()?;
        let to = if to_bytes.is_empty() {
            None
        } else {
            Some(Address::from_slice(to_bytes)?)
        };

        let signatures = if fields.len() == 9 {
            vec![SignatureData {
                v: fields[6].as_u64()?,
                r: fields[7].as_word("r")?,
                s: fields[8].as_word("s")?,
            }]
        } else {
            Vec::new()
        };
        let chain_id = signatures
            .first()
            .and_then(SignatureData::chain_id)
            .unwrap_or(0);

        Ok(Self {
            nonce: fields[0].as_u64()?,
            gas_price: fields[1].as_uint()?,
            gas: fields[2].as_u64()?,
            to,
            value: fields[4].as_uint()?,
            input: fields[5].as_bytes()?.to_vec(),
            chain_id,
            signatures,
        })
    }

    /// Recovers the signer's public key from the inline signature,
    /// handling both chain-bound and pre-protection `v` values.
    pub fn recover_sender_keys(&self) -> Result<Vec<PublicKey>, TransactionError> {
        let sig = self
            .signatures
            .first()
            .ok_or(TransactionError::MissingField("signatures"))?;
        let digest = if sig.chain_id().is_some() {
            self.sign_digest()?
        } else {
            self.sign_digest_unprotected()
        };
        Ok(vec![signature::recover(&digest, sig)?])
    }
}

/// r/s as canonical minimal-big-endian integer fields.
fn scalar_field(word: &[u8; 32]) -> RlpItem {
    let start = word.iter().position(|&b| b != 0).unwrap_or(word.len());
    RlpItem::Bytes(word[start..].to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
