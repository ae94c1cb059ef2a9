//! Transaction type discriminants and shared wire value types.
//!
//! Every transaction kind on the network maps to a fixed tag byte that
//! leads its encoding; the tag is what the decoder dispatches on. The
//! native range groups each kind with its fee-delegated and
//! partial-fee-delegated (ratio) counterparts. Legacy transactions carry no
//! tag at all — they are recognized structurally because a bare RLP list
//! starts at `0xc0` or above — and the Ethereum-compatible access-list
//! variant lives behind the reserved `0x78` envelope prefix, outside the
//! native range.

use std::fmt;

use crate::crypto::keys::Address;
use crate::rlp::{RlpError, RlpItem};
use crate::transaction::TransactionError;

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Discriminant for every supported transaction kind.
///
/// The enum is closed on purpose: an unrecognized tag byte is an
/// [`TransactionError::UnsupportedTxType`] at decode time, never a
/// best-effort fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    Legacy,
    ValueTransfer,
    FeeDelegatedValueTransfer,
    FeeDelegatedValueTransferWithRatio,
    ValueTransferMemo,
    FeeDelegatedValueTransferMemo,
    FeeDelegatedValueTransferMemoWithRatio,
    AccountUpdate,
    FeeDelegatedAccountUpdate,
    FeeDelegatedAccountUpdateWithRatio,
    SmartContractDeploy,
    FeeDelegatedSmartContractDeploy,
    FeeDelegatedSmartContractDeployWithRatio,
    SmartContractExecution,
    FeeDelegatedSmartContractExecution,
    FeeDelegatedSmartContractExecutionWithRatio,
    Cancel,
    FeeDelegatedCancel,
    FeeDelegatedCancelWithRatio,
    ChainDataAnchoring,
    FeeDelegatedChainDataAnchoring,
    FeeDelegatedChainDataAnchoringWithRatio,
    EthereumAccessList,
}

/// First byte of the Ethereum-compatible envelope (`0x78 0x01 …`).
pub const ETHEREUM_ENVELOPE_PREFIX: u8 = 0x78;

/// Inner EIP-2930 envelope tag for the access-list variant.
pub const ETHEREUM_ACCESS_LIST_TAG: u8 = 0x01;

impl TxType {
    /// The leading tag bytes of this type's encoding. Empty for legacy
    /// transactions, two bytes for the Ethereum envelope, one byte for
    /// every native kind.
    pub fn tag(self) -> &'static [u8] {
        match self {
            Self::Legacy => &[],
            Self::ValueTransfer => &[0x08],
            Self::FeeDelegatedValueTransfer => &[0x09],
            Self::FeeDelegatedValueTransferWithRatio => &[0x0a],
            Self::ValueTransferMemo => &[0x10],
            Self::FeeDelegatedValueTransferMemo => &[0x11],
            Self::FeeDelegatedValueTransferMemoWithRatio => &[0x12],
            Self::AccountUpdate => &[0x20],
            Self::FeeDelegatedAccountUpdate => &[0x21],
            Self::FeeDelegatedAccountUpdateWithRatio => &[0x22],
            Self::SmartContractDeploy => &[0x28],
            Self::FeeDelegatedSmartContractDeploy => &[0x29],
            Self::FeeDelegatedSmartContractDeployWithRatio => &[0x2a],
            Self::SmartContractExecution => &[0x30],
            Self::FeeDelegatedSmartContractExecution => &[0x31],
            Self::FeeDelegatedSmartContractExecutionWithRatio => &[0x32],
            Self::Cancel => &[0x38],
            Self::FeeDelegatedCancel => &[0x39],
            Self::FeeDelegatedCancelWithRatio => &[0x3a],
            Self::ChainDataAnchoring => &[0x48],
            Self::FeeDelegatedChainDataAnchoring => &[0x49],
            Self::FeeDelegatedChainDataAnchoringWithRatio => &[0x4a],
            Self::EthereumAccessList => &[ETHEREUM_ENVELOPE_PREFIX, ETHEREUM_ACCESS_LIST_TAG],
        }
    }

    /// Resolves a native tag byte to its type. `None` for anything outside
    /// the native range (legacy and Ethereum-envelope bytes included).
    pub fn from_native_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0x08 => Self::ValueTransfer,
            0x09 => Self::FeeDelegatedValueTransfer,
            0x0a => Self::FeeDelegatedValueTransferWithRatio,
            0x10 => Self::ValueTransferMemo,
            0x11 => Self::FeeDelegatedValueTransferMemo,
            0x12 => Self::FeeDelegatedValueTransferMemoWithRatio,
            0x20 => Self::AccountUpdate,
            0x21 => Self::FeeDelegatedAccountUpdate,
            0x22 => Self::FeeDelegatedAccountUpdateWithRatio,
            0x28 => Self::SmartContractDeploy,
            0x29 => Self::FeeDelegatedSmartContractDeploy,
            0x2a => Self::FeeDelegatedSmartContractDeployWithRatio,
            0x30 => Self::SmartContractExecution,
            0x31 => Self::FeeDelegatedSmartContractExecution,
            0x32 => Self::FeeDelegatedSmartContractExecutionWithRatio,
            0x38 => Self::Cancel,
            0x39 => Self::FeeDelegatedCancel,
            0x3a => Self::FeeDelegatedCancelWithRatio,
            0x48 => Self::ChainDataAnchoring,
            0x49 => Self::FeeDelegatedChainDataAnchoring,
            0x4a => Self::FeeDelegatedChainDataAnchoringWithRatio,
            _ => return None,
        })
    }

    /// `true` for every variant that carries a fee payer (with or without
    /// a ratio split).
    pub fn is_fee_delegated(self) -> bool {
        matches!(
            self,
            Self::FeeDelegatedValueTransfer
                | Self::FeeDelegatedValueTransferWithRatio
                | Self::FeeDelegatedValueTransferMemo
                | Self::FeeDelegatedValueTransferMemoWithRatio
                | Self::FeeDelegatedAccountUpdate
                | Self::FeeDelegatedAccountUpdateWithRatio
                | Self::FeeDelegatedSmartContractDeploy
                | Self::FeeDelegatedSmartContractDeployWithRatio
                | Self::FeeDelegatedSmartContractExecution
                | Self::FeeDelegatedSmartContractExecutionWithRatio
                | Self::FeeDelegatedCancel
                | Self::FeeDelegatedCancelWithRatio
                | Self::FeeDelegatedChainDataAnchoring
                | Self::FeeDelegatedChainDataAnchoringWithRatio
        )
    }

    /// `true` for the partial-fee-delegation variants that carry a fee
    /// ratio field.
    pub fn has_fee_ratio(self) -> bool {
        matches!(
            self,
            Self::FeeDelegatedValueTransferWithRatio
                | Self::FeeDelegatedValueTransferMemoWithRatio
                | Self::FeeDelegatedAccountUpdateWithRatio
                | Self::FeeDelegatedSmartContractDeployWithRatio
                | Self::FeeDelegatedSmartContractExecutionWithRatio
                | Self::FeeDelegatedCancelWithRatio
                | Self::FeeDelegatedChainDataAnchoringWithRatio
        )
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------------------------------------------------
// FeeRatio
// ---------------------------------------------------------------------------

/// The fee payer's share of the gas cost on a partial-fee-delegation
/// transaction, as a percentage.
///
/// Valid values are `1..=99`. 0 would mean "no delegation at all" and 100
/// "full delegation", both of which have their own transaction types, so
/// the boundary values are rejected at construction rather than at
/// submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRatio(u8);

impl FeeRatio {
    pub fn new(percent: u8) -> Result<Self, TransactionError> {
        if (1..=99).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(TransactionError::InvalidFeeRatio(percent))
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FeeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccessList
// ---------------------------------------------------------------------------

/// One entry of an access list: an address and the storage slots the
/// transaction pre-declares it will touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTuple {
    pub address: Address,
    pub storage_keys: Vec<[u8; 32]>,
}

impl AccessTuple {
    pub fn new(address: Address, storage_keys: Vec<[u8; 32]>) -> Self {
        Self {
            address,
            storage_keys,
        }
    }

    fn to_rlp(&self) -> RlpItem {
        RlpItem::list(vec![
            RlpItem::bytes(self.address.as_bytes()),
            RlpItem::List(
                self.storage_keys
                    .iter()
                    .map(|key| RlpItem::bytes(key))
                    .collect(),
            ),
        ])
    }

    fn from_rlp(item: &RlpItem) -> Result<Self, TransactionError> {
        let fields = item.as_list_of(2)?;
        let address = Address::from_slice(fields[0].as_bytes()?)?;
        let mut storage_keys = Vec::new();
        for key in fields[1].as_list()? {
            let bytes = key.as_bytes()?;
            let word: [u8; 32] = bytes.try_into().map_err(|_| {
                TransactionError::Rlp(RlpError::WrongLength {
                    field: "storage key",
                    expected: 32,
                    found: bytes.len(),
                })
            })?;
            storage_keys.push(word);
        }
        Ok(Self {
            address,
            storage_keys,
        })
    }
}

/// The ordered access list of an Ethereum-compatible transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessList(pub Vec<AccessTuple>);

impl AccessList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_rlp(&self) -> RlpItem {
        RlpItem::List(self.0.iter().map(AccessTuple::to_rlp).collect())
    }

    pub fn from_rlp(item: &RlpItem) -> Result<Self, TransactionError> {
        let tuples = item
            .as_list()?
            .iter()
            .map(AccessTuple::from_rlp)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(tuples))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
