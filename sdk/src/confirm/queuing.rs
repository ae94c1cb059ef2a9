//! The non-blocking queued-sweep strategy.
//!
//! `await_receipt` only enqueues the hash and hands back a placeholder —
//! the real answer arrives later through a [`ConfirmationSink`]. A single
//! background task, spawned on an explicitly injected runtime handle,
//! sweeps every pending hash once per tick in insertion order:
//!
//! - receipt present  → removed, delivered via `confirmed`,
//! - fetch error      → removed, delivered via `failed` (no retry),
//! - still absent     → per-hash attempt counter incremented; once it
//!   reaches the bound, removed and delivered via `failed`.
//!
//! Each hash is resolved independently — one hash failing, erroring, or
//! exhausting its attempts never blocks or removes its neighbours in the
//! same sweep (partial-failure isolation). A pending hash can be
//! [`cancel`](QueuingReceiptProcessor::cancel)led any time before a sweep
//! resolves it.
//!
//! ## Pending state
//!
//! Two indices guard the pending set, the same shape the mempool-style
//! pools use: a `DashMap` keyed by hash for O(1) membership and attempt
//! counts, plus a lock-protected `Vec` preserving insertion order for the
//! sweep. Enqueues and sweep-driven removals may interleave freely; no
//! lock is ever held across a fetch await.
//!
//! ## Lifetime
//!
//! The sweep task is tied to the processor: `shutdown()` (or dropping the
//! processor) stops it via a watch channel. The runtime handle is a
//! constructor argument on purpose — the caller owns the scheduler, not a
//! hidden global.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::confirm::{
    ConfirmError, FetchError, ReceiptFetcher, ReceiptProcessor, TransactionReceipt,
};

// ---------------------------------------------------------------------------
// Configuration and callback sink
// ---------------------------------------------------------------------------

/// Tunable parameters for the queuing strategy.
#[derive(Debug, Clone)]
pub struct QueuingConfig {
    /// Period of the background sweep.
    pub sweep_interval: Duration,
    /// Sweeps a hash may stay absent before it fails out.
    pub attempts_per_hash: u32,
}

impl Default for QueuingConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(1),
            attempts_per_hash: 15,
        }
    }
}

/// Asynchronous delivery target for sweep outcomes.
pub trait ConfirmationSink: Send + Sync {
    /// A receipt was observed for a pending hash.
    fn confirmed(&self, receipt: TransactionReceipt);
    /// A pending hash failed out: fetch error or attempts exhausted.
    fn failed(&self, tx_hash: &str, error: ConfirmError);
}

// ---------------------------------------------------------------------------
// Pending state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PendingState {
    /// Hash → sweeps already spent absent.
    entries: DashMap<String, u32>,
    /// Insertion order for the sweep.
    order: Mutex<Vec<String>>,
}

impl PendingState {
    fn enqueue(&self, tx_hash: &str) {
        if self.entries.insert(tx_hash.to_string(), 0).is_none() {
            self.order.lock().push(tx_hash.to_string());
        }
    }

    fn remove(&self, tx_hash: &str) -> bool {
        let removed = self.entries.remove(tx_hash).is_some();
        if removed {
            self.order.lock().retain(|hash| hash != tx_hash);
        }
        removed
    }

    fn snapshot(&self) -> Vec<String> {
        self.order.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// QueuingReceiptProcessor
// ---------------------------------------------------------------------------

/// Queued-sweep receipt processor.
pub struct QueuingReceiptProcessor {
    pending: Arc<PendingState>,
    shutdown: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl QueuingReceiptProcessor {
    /// Builds the processor and spawns its sweep task on `runtime`.
    ///
    /// Outcomes flow to `sink`; the fetch boundary is `fetcher`. The task
    /// runs until [`shutdown`](Self::shutdown) or drop.
    pub fn new(
        fetcher: Arc<dyn ReceiptFetcher>,
        sink: Arc<dyn ConfirmationSink>,
        config: QueuingConfig,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let pending = Arc::new(PendingState::default());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task_pending = Arc::clone(&pending);
        let sweeper = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(config.sweep_interval);
            // The first tick of a tokio interval fires immediately; skip
            // it so hashes enqueued right after construction get a full
            // period before their first sweep.
            ticker.tick().await;
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep(&task_pending, &*fetcher, &*sink, config.attempts_per_hash).await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("queuing receipt sweep shutting down");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            pending,
            shutdown: shutdown_tx,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Number of hashes currently awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.pending.entries.len()
    }

    /// Removes a pending hash before the next sweep observes it. Returns
    /// `false` when the hash was not pending (already resolved, failed
    /// out, or never enqueued).
    pub fn cancel(&self, tx_hash: &str) -> bool {
        let removed = self.pending.remove(tx_hash);
        if removed {
            debug!(tx_hash, "pending receipt cancelled");
        }
        removed
    }

    /// Stops the background sweep. Pending hashes are dropped without
    /// callbacks; enqueueing after shutdown parks hashes forever, so
    /// treat this as the end of the processor's life.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for QueuingReceiptProcessor {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        // The task exits at its next loop turn; aborting as well covers
        // runtimes that are already winding down.
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl ReceiptProcessor for QueuingReceiptProcessor {
    /// Enqueues the hash and returns a placeholder receipt immediately.
    /// The real outcome is delivered later through the sink.
    async fn await_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, ConfirmError> {
        self.pending.enqueue(tx_hash);
        debug!(tx_hash, pending = self.pending_count(), "receipt enqueued");
        Ok(TransactionReceipt::placeholder(tx_hash))
    }
}

// ---------------------------------------------------------------------------
// The sweep
// ---------------------------------------------------------------------------

/// One pass over the pending set in insertion order. Every hash is
/// resolved on its own; nothing a single hash does can touch the others.
async fn sweep(
    pending: &PendingState,
    fetcher: &dyn ReceiptFetcher,
    sink: &dyn ConfirmationSink,
    attempts_per_hash: u32,
) {
    for tx_hash in pending.snapshot() {
        // Skip hashes cancelled since the snapshot.
        if !pending.entries.contains_key(&tx_hash) {
            continue;
        }

        match fetcher.receipt(&tx_hash).await {
            Ok(Some(receipt)) => {
                if pending.remove(&tx_hash) {
                    info!(tx_hash, "receipt confirmed");
                    sink.confirmed(receipt);
                }
            }
            Ok(None) => {
                let exhausted = match pending.entries.get_mut(&tx_hash) {
                    Some(mut count) => {
                        *count += 1;
                        *count >= attempts_per_hash
                    }
                    // Cancelled while the fetch was in flight.
                    None => false,
                };
                if exhausted && pending.remove(&tx_hash) {
                    warn!(tx_hash, attempts_per_hash, "receipt attempts exhausted");
                    sink.failed(
                        &tx_hash,
                        ConfirmError::AttemptsExhausted {
                            tx_hash: tx_hash.clone(),
                            attempts: attempts_per_hash,
                        },
                    );
                }
            }
            Err(error) => {
                if pending.remove(&tx_hash) {
                    warn!(tx_hash, %error, "receipt fetch failed");
                    sink.failed(&tx_hash, ConfirmError::Fetch(error));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Per-hash scripted fetch behaviour.
    enum Script {
        /// Never produce a receipt.
        Never,
        /// Produce the receipt on the n-th fetch call for this hash.
        PresentOnCall(u32),
        /// Fail the fetch on the n-th call (absent before that).
        ErrorOnCall(u32),
    }

    struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, (u32, Script)>>,
    }

    impl ScriptedFetcher {
        fn new(scripts: Vec<(&str, Script)>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(
                    scripts
                        .into_iter()
                        .map(|(hash, script)| (hash.to_string(), (0, script)))
                        .collect(),
                ),
            })
        }
    }

    #[async_trait]
    impl ReceiptFetcher for ScriptedFetcher {
        async fn receipt(
            &self,
            tx_hash: &str,
        ) -> Result<Option<TransactionReceipt>, FetchError> {
            let mut scripts = self.scripts.lock();
            let (calls, script) = scripts
                .get_mut(tx_hash)
                .unwrap_or_else(|| panic!("unscripted hash {tx_hash}"));
            *calls += 1;
            match script {
                Script::Never => Ok(None),
                Script::PresentOnCall(n) if *calls >= *n => Ok(Some(TransactionReceipt {
                    transaction_hash: tx_hash.to_string(),
                    block_hash: Some("0xblock".to_string()),
                    ..TransactionReceipt::default()
                })),
                Script::PresentOnCall(_) => Ok(None),
                Script::ErrorOnCall(n) if *calls >= *n => {
                    Err(FetchError("node unreachable".to_string()))
                }
                Script::ErrorOnCall(_) => Ok(None),
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

    fn config(attempts_per_hash: u32) -> QueuingConfig {
        QueuingConfig {
            sweep_interval: Duration::from_millis(100),
            attempts_per_hash,
        }
    }

    /// Lets the paused clock run long enough for `n` sweep ticks.
    async fn run_sweeps(n: u32) {
        tokio::time::sleep(Duration::from_millis(100 * u64::from(n) + 50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_returns_placeholder_without_blocking() {
        let fetcher = ScriptedFetcher::new(vec![("0xh1", Script::Never)]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            sink,
            config(5),
            tokio::runtime::Handle::current(),
        );

        let receipt = processor.await_receipt("0xh1").await.unwrap();
        assert_eq!(receipt.transaction_hash, "0xh1");
        assert!(!receipt.is_final());
        assert_eq!(processor.pending_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn one_hash_failing_never_blocks_another() {
        // H1 stays absent past its attempt budget; H2 lands on sweep 2.
        let fetcher = ScriptedFetcher::new(vec![
            ("0xh1", Script::Never),
            ("0xh2", Script::PresentOnCall(2)),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(3),
            tokio::runtime::Handle::current(),
        );

        processor.await_receipt("0xh1").await.unwrap();
        processor.await_receipt("0xh2").await.unwrap();
        run_sweeps(5).await;

        let confirmed = sink.confirmed.lock();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].transaction_hash, "0xh2");

        let failed = sink.failed.lock();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "0xh1");
        assert!(matches!(
            failed[0].1,
            ConfirmError::AttemptsExhausted { attempts: 3, .. }
        ));

        assert_eq!(processor.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_fails_only_the_erroring_hash() {
        let fetcher = ScriptedFetcher::new(vec![
            ("0xbad", Script::ErrorOnCall(1)),
            ("0xgood", Script::PresentOnCall(2)),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let _processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(10),
            tokio::runtime::Handle::current(),
        );

        _processor.await_receipt("0xbad").await.unwrap();
        _processor.await_receipt("0xgood").await.unwrap();
        run_sweeps(3).await;

        let failed = sink.failed.lock();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "0xbad");
        assert!(matches!(failed[0].1, ConfirmError::Fetch(_)));

        let confirmed = sink.confirmed.lock();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].transaction_hash, "0xgood");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_the_sweep_suppresses_delivery() {
        let fetcher = ScriptedFetcher::new(vec![("0xh1", Script::PresentOnCall(1))]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(5),
            tokio::runtime::Handle::current(),
        );

        processor.await_receipt("0xh1").await.unwrap();
        assert!(processor.cancel("0xh1"));
        assert!(!processor.cancel("0xh1"), "second cancel finds nothing");
        run_sweeps(3).await;

        assert!(sink.confirmed.lock().is_empty());
        assert!(sink.failed.lock().is_empty());
        assert_eq!(processor.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_enqueue_is_tracked_once() {
        let fetcher = ScriptedFetcher::new(vec![("0xh1", Script::PresentOnCall(1))]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(5),
            tokio::runtime::Handle::current(),
        );

        processor.await_receipt("0xh1").await.unwrap();
        processor.await_receipt("0xh1").await.unwrap();
        assert_eq!(processor.pending_count(), 1);
        run_sweeps(2).await;

        assert_eq!(sink.confirmed.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_sweep() {
        let fetcher = ScriptedFetcher::new(vec![("0xh1", Script::PresentOnCall(1))]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(5),
            tokio::runtime::Handle::current(),
        );

        processor.await_receipt("0xh1").await.unwrap();
        processor.shutdown();
        run_sweeps(3).await;

        // The sweep died before resolving anything.
        assert!(sink.confirmed.lock().is_empty());
        assert_eq!(processor.pending_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_process_in_insertion_order() {
        // Both land on their first sweep; delivery order must match
        // enqueue order.
        let fetcher = ScriptedFetcher::new(vec![
            ("0xfirst", Script::PresentOnCall(1)),
            ("0xsecond", Script::PresentOnCall(1)),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let processor = QueuingReceiptProcessor::new(
            fetcher,
            Arc::clone(&sink) as Arc<dyn ConfirmationSink>,
            config(5),
            tokio::runtime::Handle::current(),
        );

        processor.await_receipt("0xfirst").await.unwrap();
        processor.await_receipt("0xsecond").await.unwrap();
        run_sweeps(2).await;

        let confirmed = sink.confirmed.lock();
        assert_eq!(confirmed.len(), 2);
        assert_eq!(confirmed[0].transaction_hash, "0xfirst");
        assert_eq!(confirmed[1].transaction_hash, "0xsecond");
    }
}
