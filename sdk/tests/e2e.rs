//! End-to-end integration tests for the VELA client SDK.
//!
//! These tests exercise the full client-side lifecycle across module
//! boundaries: key generation, transaction construction, signing (sender
//! and fee payer), wire encoding, decoding, signer recovery, weighted
//! multi-signature validation, ABI call-data construction, and receipt
//! confirmation against a simulated chain.
//!
//! Each test stands alone. No shared state, no ordering dependencies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vela_sdk::abi::{AbiFunction, AbiType, AbiValue};
use vela_sdk::account::{
    AccountKey, Role, RoleBasedKey, WeightedMultiSig, WeightedPublicKey,
};
use vela_sdk::confirm::{
    ConfirmError, ConfirmationSink, FetchError, ImmediateReceiptProcessor, PollingConfig,
    PollingReceiptProcessor, QueuingConfig, QueuingReceiptProcessor, ReceiptFetcher,
    ReceiptProcessor, TransactionReceipt,
};
use vela_sdk::crypto::keys::PrivateKey;
use vela_sdk::transaction::{
    FeeDelegation, FeeRatio, Transaction, TransactionBuilder, TxPayload, TxType,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A minimal simulated chain: transactions become "mined" after a fixed
/// number of receipt fetches.
struct SimulatedChain {
    /// Hash → (fetches so far, fetches needed before the receipt exists).
    ledger: Mutex<HashMap<String, (u32, u32)>>,
}

impl SimulatedChain {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            ledger: Mutex::new(HashMap::new()),
        })
    }

    /// Registers a submitted hash that will be mined after `delay`
    /// fetches (0 = immediately visible).
    fn submit(&self, tx_hash: &str, delay: u32) {
        self.ledger
            .lock()
            .insert(tx_hash.to_string(), (0, delay));
    }
}

#[async_trait]
impl ReceiptFetcher for SimulatedChain {
    async fn receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>, FetchError> {
        let mut ledger = self.ledger.lock();
        match ledger.get_mut(tx_hash) {
            None => Err(FetchError(format!("unknown transaction {tx_hash}"))),
            Some((fetches, delay)) => {
                *fetches += 1;
                if *fetches > *delay {
                    Ok(Some(TransactionReceipt {
                        transaction_hash: tx_hash.to_string(),
                        block_hash: Some("0xfeed".to_string()),
                        block_number: Some("0x10".to_string()),
                        status: Some("0x1".to_string()),
                        ..TransactionReceipt::default()
                    }))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    confirmed: Mutex<Vec<TransactionReceipt>>,
    failed: Mutex<Vec<(String, ConfirmError)>>,
}

impl ConfirmationSink for RecordingSink {
    fn confirmed(&self, receipt: TransactionReceipt) {
        self.confirmed.lock().push(receipt);
    }
    fn failed(&self, tx_hash: &str, error: ConfirmError) {
        self.failed.lock().push((tx_hash.to_string(), error));
    }
}

fn hex_hash(hash: [u8; 32]) -> String {
    format!("0x{}", hex::encode(hash))
}

// ---------------------------------------------------------------------------
// 1. Full sign → encode → decode → recover lifecycle
// ---------------------------------------------------------------------------

#[test]
fn value_transfer_full_lifecycle() {
    let sender = PrivateKey::generate();
    let receiver = PrivateKey::generate();

    let mut tx = TransactionBuilder::new(TxPayload::ValueTransfer {
        to: receiver.address(),
        value: 1_000_000_000,
    })
    .nonce(0)
    .gas_price(25_000_000_000)
    .gas(21_000)
    .chain_id(1001)
    .from(sender.address())
    .build()
    .unwrap();

    tx.sign_as_sender(&sender).unwrap();
    let raw = tx.encode().unwrap();

    // The generic decoder dispatches on the tag byte.
    let decoded = Transaction::decode(&raw).unwrap();
    assert_eq!(decoded.tx_type(), TxType::ValueTransfer);
    let Transaction::Typed(decoded) = decoded else {
        panic!("expected a typed transaction");
    };
    assert_eq!(decoded, tx);

    // The signature alone identifies the sender.
    let signers = decoded.recover_sender_keys().unwrap();
    assert_eq!(signers.len(), 1);
    assert_eq!(signers[0].to_address(), sender.address());
}

// ---------------------------------------------------------------------------
// 2. Weighted multisig: multiple signers against a registered key
// ---------------------------------------------------------------------------

#[test]
fn weighted_multisig_transaction_validation() {
    let alice = PrivateKey::generate();
    let bob = PrivateKey::generate();
    let carol = PrivateKey::generate();
    let account_address = alice.address();

    // 2-of-{1,1,2}: alice+bob reach the threshold, carol alone does too.
    let registered = AccountKey::WeightedMultiSig(
        WeightedMultiSig::new(
            2,
            vec![
                WeightedPublicKey {
                    key: alice.public_key(),
                    weight: 1,
                },
                WeightedPublicKey {
                    key: bob.public_key(),
                    weight: 1,
                },
                WeightedPublicKey {
                    key: carol.public_key(),
                    weight: 2,
                },
            ],
        )
        .unwrap(),
    );

    let mut tx = TransactionBuilder::new(TxPayload::ValueTransfer {
        to: bob.address(),
        value: 7,
    })
    .nonce(3)
    .gas_price(25)
    .gas(21_000)
    .chain_id(1001)
    .from(account_address)
    .build()
    .unwrap();

    // Multisig members sign on the account's behalf: the digest binds
    // the account's from address, not the members' own.
    let digest = tx.sender_sign_digest().unwrap();
    for key in [&alice, &bob] {
        let raw = vela_sdk::crypto::signature::sign_digest(key, &digest).unwrap();
        tx.signatures.push(
            vela_sdk::crypto::signature::SignatureData::chain_bound(raw.rec_id, raw.r, raw.s, 1001),
        );
    }

    // Recovery preserves signature order, then the explicit weighted
    // check runs against the registered key.
    let decoded = match Transaction::decode(&tx.encode().unwrap()).unwrap() {
        Transaction::Typed(t) => t,
        other => panic!("unexpected variant {other:?}"),
    };
    let signers = decoded.recover_sender_keys().unwrap();
    assert_eq!(signers[0], alice.public_key());
    assert_eq!(signers[1], bob.public_key());

    registered
        .validate_signers(Role::Transaction, &signers)
        .unwrap();

    // One weight-1 signer alone falls short.
    let err = registered
        .validate_signers(Role::Transaction, &signers[..1])
        .unwrap_err();
    assert!(matches!(
        err,
        vela_sdk::account::AccountKeyError::InsufficientWeight { required: 2, got: 1 }
    ));
}

// ---------------------------------------------------------------------------
// 3. Fee delegation: both signers, both recoverable
// ---------------------------------------------------------------------------

#[test]
fn fee_delegated_contract_execution_lifecycle() {
    let sender = PrivateKey::generate();
    let fee_payer = PrivateKey::generate();
    let contract = PrivateKey::generate().address();

    // Call data built by the ABI layer rides in the execution payload.
    let transfer = AbiFunction::new(
        "transfer",
        vec![AbiType::Address, AbiType::Uint(256)],
        vec![AbiType::Bool],
    );
    let call_data = transfer
        .encode_call(&[
            AbiValue::Address(fee_payer.address()),
            AbiValue::uint(500),
        ])
        .unwrap();

    let mut tx = TransactionBuilder::new(TxPayload::SmartContractExecution {
        to: contract,
        value: 0,
        input: call_data,
    })
    .nonce(9)
    .gas_price(25_000_000_000)
    .gas(300_000)
    .chain_id(1001)
    .from(sender.address())
    .fee_ratio(FeeRatio::new(70).unwrap())
    .build()
    .unwrap();

    tx.sign_as_sender(&sender).unwrap();
    tx.sign_as_fee_payer(&fee_payer).unwrap();
    assert_eq!(
        tx.tx_type(),
        TxType::FeeDelegatedSmartContractExecutionWithRatio
    );

    let decoded = match Transaction::decode(&tx.encode().unwrap()).unwrap() {
        Transaction::Typed(t) => t,
        other => panic!("unexpected variant {other:?}"),
    };
    assert_eq!(decoded, tx);
    assert_eq!(decoded.delegation, FeeDelegation::PartialDelegated(FeeRatio::new(70).unwrap()));

    assert_eq!(
        decoded.recover_sender_keys().unwrap()[0].to_address(),
        sender.address()
    );
    assert_eq!(
        decoded.recover_fee_payer_keys().unwrap()[0].to_address(),
        fee_payer.address()
    );

    // The sender-scoped hash is stable across fee payer signing; the full
    // hash is not.
    assert_ne!(
        decoded.sender_tx_hash().unwrap(),
        decoded.transaction_hash().unwrap()
    );
}

// ---------------------------------------------------------------------------
// 4. Account update to a role-based key
// ---------------------------------------------------------------------------

#[test]
fn account_update_roundtrips_role_based_key() {
    let owner = PrivateKey::generate();
    let tx_role = PrivateKey::generate();
    let fee_role = PrivateKey::generate();

    let new_key = AccountKey::RoleBased(
        RoleBasedKey::new(vec![
            AccountKey::Public(tx_role.public_key()),
            AccountKey::Nil,
            AccountKey::Public(fee_role.public_key()),
        ])
        .unwrap(),
    );

    let mut tx = TransactionBuilder::new(TxPayload::AccountUpdate {
        key: new_key.clone(),
    })
    .nonce(1)
    .gas_price(25)
    .gas(50_000)
    .chain_id(1001)
    .from(owner.address())
    .build()
    .unwrap();
    tx.sign_as_sender(&owner).unwrap();

    let decoded = match Transaction::decode(&tx.encode().unwrap()).unwrap() {
        Transaction::Typed(t) => t,
        other => panic!("unexpected variant {other:?}"),
    };
    let TxPayload::AccountUpdate { key } = &decoded.payload else {
        panic!("expected an account update payload");
    };
    assert_eq!(key, &new_key);
}

// ---------------------------------------------------------------------------
// 5. Every wire family decodes through the one dispatcher
// ---------------------------------------------------------------------------

#[test]
fn dispatcher_routes_all_three_families() {
    let key = PrivateKey::generate();

    // Native typed.
    let mut typed = TransactionBuilder::new(TxPayload::Cancel)
        .nonce(1)
        .gas_price(25)
        .gas(21_000)
        .chain_id(1001)
        .from(key.address())
        .build()
        .unwrap();
    typed.sign_as_sender(&key).unwrap();
    assert!(matches!(
        Transaction::decode(&typed.encode().unwrap()).unwrap(),
        Transaction::Typed(_)
    ));

    // Legacy (bare RLP list).
    let mut legacy = vela_sdk::transaction::LegacyTransaction {
        nonce: 1,
        gas_price: 25,
        gas: 21_000,
        to: Some(key.address()),
        value: 1,
        input: vec![],
        chain_id: 1001,
        signatures: vec![],
    };
    legacy.sign(&key).unwrap();
    assert!(matches!(
        Transaction::decode(&legacy.encode().unwrap()).unwrap(),
        Transaction::Legacy(_)
    ));

    // Ethereum envelope.
    let mut ethereum = vela_sdk::transaction::EthereumAccessListTransaction {
        chain_id: 1001,
        nonce: 1,
        gas_price: 25,
        gas: 21_000,
        to: Some(key.address()),
        value: 1,
        input: vec![],
        access_list: Default::default(),
        signatures: vec![],
    };
    ethereum.sign(&key).unwrap();
    assert!(matches!(
        Transaction::decode(&ethereum.encode().unwrap()).unwrap(),
        Transaction::EthereumAccessList(_)
    ));
}

// ---------------------------------------------------------------------------
// 6. Submit-then-confirm with the polling strategy
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn polling_confirms_a_submitted_transaction() {
    let sender = PrivateKey::generate();
    let mut tx = TransactionBuilder::new(TxPayload::ValueTransfer {
        to: sender.address(),
        value: 1,
    })
    .nonce(5)
    .gas_price(25)
    .gas(21_000)
    .chain_id(1001)
    .from(sender.address())
    .build()
    .unwrap();
    tx.sign_as_sender(&sender).unwrap();
    let tx_hash = hex_hash(tx.transaction_hash().unwrap());

    // "Submit": the chain will mine it after two absent fetches.
    let chain = SimulatedChain::new();
    chain.submit(&tx_hash, 2);

    let processor = PollingReceiptProcessor::new(
        chain,
        PollingConfig {
            interval: Duration::from_millis(100),
            attempts: 5,
        },
    );
    let receipt = processor.await_receipt(&tx_hash).await.unwrap();
    assert!(receipt.is_final());
    assert_eq!(receipt.transaction_hash, tx_hash);
}

#[tokio::test(start_paused = true)]
async fn polling_times_out_on_an_unmined_transaction() {
    let chain = SimulatedChain::new();
    chain.submit("0xslow", u32::MAX);

    let processor = PollingReceiptProcessor::new(
        chain,
        PollingConfig {
            interval: Duration::from_millis(100),
            attempts: 3,
        },
    );
    let err = processor.await_receipt("0xslow").await.unwrap_err();
    assert!(matches!(
        err,
        ConfirmError::Timeout { attempts: 3, .. }
    ));
}

// ---------------------------------------------------------------------------
// 7. Queuing strategy with mixed outcomes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn queuing_resolves_mixed_submissions_independently() {
    let chain = SimulatedChain::new();
    chain.submit("0xfast", 0);
    chain.submit("0xslow", u32::MAX); // never mined → attempts exhausted
    // "0xunknown" is never submitted → fetch error path.

    let sink = Arc::new(RecordingSink::default());
    let processor = QueuingReceiptProcessor::new(
        chain,
        Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
        QueuingConfig {
            sweep_interval: Duration::from_millis(100),
            attempts_per_hash: 3,
        },
        tokio::runtime::Handle::current(),
    );

    // Enqueue never blocks; each call returns a placeholder.
    for hash in ["0xfast", "0xslow", "0xunknown"] {
        let placeholder = processor.await_receipt(hash).await.unwrap();
        assert!(!placeholder.is_final());
    }
    assert_eq!(processor.pending_count(), 3);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let confirmed = sink.confirmed.lock();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].transaction_hash, "0xfast");

    let failed = sink.failed.lock();
    assert_eq!(failed.len(), 2);
    let unknown = failed.iter().find(|(h, _)| h == "0xunknown").unwrap();
    assert!(matches!(unknown.1, ConfirmError::Fetch(_)));
    let slow = failed.iter().find(|(h, _)| h == "0xslow").unwrap();
    assert!(matches!(
        slow.1,
        ConfirmError::AttemptsExhausted { attempts: 3, .. }
    ));

    assert_eq!(processor.pending_count(), 0);
}

// ---------------------------------------------------------------------------
// 8. Immediate strategy is an honest placeholder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn immediate_strategy_returns_non_final_placeholder() {
    let receipt = ImmediateReceiptProcessor
        .await_receipt("0xanything")
        .await
        .unwrap();
    assert_eq!(receipt.transaction_hash, "0xanything");
    assert!(!receipt.is_final(), "a placeholder must not look mined");
}
