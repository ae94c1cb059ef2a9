//! Walkthrough of the client SDK's core flows: keys and addresses,
//! building and signing every flavor of transaction, wire round-trips,
//! signer recovery, weighted multisig validation, ABI call data, and
//! receipt confirmation against a fake chain.
//!
//! Run with:
//!   cargo run --example demo -p vela-sdk

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vela_sdk::abi::{AbiFunction, AbiType, AbiValue};
use vela_sdk::account::{AccountKey, Role, WeightedMultiSig, WeightedPublicKey};
use vela_sdk::confirm::{
    FetchError, PollingConfig, PollingReceiptProcessor, ReceiptFetcher, ReceiptProcessor,
    TransactionReceipt,
};
use vela_sdk::crypto::keys::PrivateKey;
use vela_sdk::transaction::{FeeRatio, Transaction, TransactionBuilder, TxPayload};

/// A chain that mines everything on the second look.
struct ToyChain {
    seen: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl ReceiptFetcher for ToyChain {
    async fn receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>, FetchError> {
        let mut seen = self.seen.lock();
        let count = seen.entry(tx_hash.to_string()).or_insert(0);
        *count += 1;
        if *count >= 2 {
            Ok(Some(TransactionReceipt {
                transaction_hash: tx_hash.to_string(),
                block_hash: Some("0xdecafbad".to_string()),
                block_number: Some("0x2a".to_string()),
                status: Some("0x1".to_string()),
                ..TransactionReceipt::default()
            }))
        } else {
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("vela_sdk=debug")
        .init();

    // -- Keys and addresses --------------------------------------------------
    let sender = PrivateKey::generate();
    let fee_payer = PrivateKey::generate();
    let receiver = PrivateKey::generate();
    println!("sender     {}", sender.address());
    println!("fee payer  {}", fee_payer.address());

    // -- A fee-delegated value transfer, signed by both parties --------------
    let mut tx = TransactionBuilder::new(TxPayload::ValueTransfer {
        to: receiver.address(),
        value: 1_000_000_000,
    })
    .nonce(0)
    .gas_price(25_000_000_000)
    .gas(21_000)
    .chain_id(1001)
    .from(sender.address())
    .fee_ratio(FeeRatio::new(30)?)
    .build()?;

    tx.sign_as_sender(&sender)?;
    tx.sign_as_fee_payer(&fee_payer)?;

    let raw = tx.encode()?;
    let tx_hash = format!("0x{}", hex::encode(tx.transaction_hash()?));
    println!("type       {}", tx.tx_type());
    println!("raw        0x{}…", hex::encode(&raw[..24]));
    println!("hash       {tx_hash}");

    // -- Round-trip and recovery ---------------------------------------------
    let decoded = match Transaction::decode(&raw)? {
        Transaction::Typed(decoded) => decoded,
        other => anyhow::bail!("unexpected variant {other:?}"),
    };
    let signer = decoded.recover_sender_keys()?[0].to_address();
    let payer = decoded.recover_fee_payer_keys()?[0].to_address();
    println!("recovered  sender={signer} fee_payer={payer}");
    assert_eq!(signer, sender.address());
    assert_eq!(payer, fee_payer.address());

    // -- Weighted multisig validation ----------------------------------------
    let registered = AccountKey::WeightedMultiSig(WeightedMultiSig::new(
        2,
        vec![
            WeightedPublicKey {
                key: sender.public_key(),
                weight: 1,
            },
            WeightedPublicKey {
                key: fee_payer.public_key(),
                weight: 2,
            },
        ],
    )?);
    registered.validate_signers(Role::Transaction, &[fee_payer.public_key()])?;
    println!("multisig   weight threshold satisfied");

    // -- ABI call data -------------------------------------------------------
    let transfer = AbiFunction::new(
        "transfer",
        vec![AbiType::Address, AbiType::Uint(256)],
        vec![AbiType::Bool],
    );
    let call = transfer.encode_call(&[
        AbiValue::Address(receiver.address()),
        AbiValue::uint(500),
    ])?;
    println!(
        "call data  selector=0x{} ({} bytes total)",
        hex::encode(&call[..4]),
        call.len()
    );

    // -- Confirmation --------------------------------------------------------
    let chain = Arc::new(ToyChain {
        seen: Mutex::new(HashMap::new()),
    });
    let processor = PollingReceiptProcessor::new(
        chain,
        PollingConfig {
            interval: Duration::from_millis(50),
            attempts: 10,
        },
    );
    let receipt = processor.await_receipt(&tx_hash).await?;
    println!(
        "confirmed  block={} status={}",
        receipt.block_hash.as_deref().unwrap_or("?"),
        receipt.status.as_deref().unwrap_or("?"),
    );

    Ok(())
}
