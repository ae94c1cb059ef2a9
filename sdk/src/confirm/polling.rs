//! The blocking poll-until-found strategy.
//!
//! One fetch per attempt, a fixed sleep between attempts, a hard attempt
//! bound: `await_receipt` blocks its caller for at most roughly
//! `interval × attempts` and makes *exactly* `attempts` fetch calls
//! before giving up with a timeout. There is no mid-wait cancellation —
//! the attempt counter is the only bound.
//!
//! The strategy holds no state across calls, so one processor can serve
//! any number of concurrent awaits for different hashes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::confirm::{ConfirmError, ReceiptFetcher, ReceiptProcessor, TransactionReceipt};

/// Tunable parameters for the polling strategy.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Sleep between consecutive fetches.
    pub interval: Duration,
    /// Total number of fetch calls before timing out.
    pub attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            attempts: 15,
        }
    }
}

/// Poll-until-found receipt processor.
pub struct PollingReceiptProcessor {
    fetcher: Arc<dyn ReceiptFetcher>,
    config: PollingConfig,
}

impl PollingReceiptProcessor {
    pub fn new(fetcher: Arc<dyn ReceiptFetcher>, config: PollingConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl ReceiptProcessor for PollingReceiptProcessor {
    /// Fetches until the receipt appears, sleeping `interval` between
    /// attempts.
    ///
    /// - Receipt present on attempt `n ≤ attempts` — returns it after
    ///   exactly `n` fetch calls.
    /// - Never present — [`ConfirmError::Timeout`] after exactly
    ///   `attempts` calls, carrying the elapsed duration.
    /// - Fetch error — propagated immediately, no retry.
    async fn await_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, ConfirmError> {
        let started = Instant::now();
        for attempt in 1..=self.config.attempts {
            match self.fetcher.receipt(tx_hash).await? {
                Some(receipt) => {
                    debug!(tx_hash, attempt, "receipt observed");
                    return Ok(receipt);
                }
                None => {
                    debug!(tx_hash, attempt, "receipt not yet available");
                    if attempt < self.config.attempts {
                        tokio::time::sleep(self.config.interval).await;
                    }
                }
            }
        }
        let elapsed = started.elapsed();
        warn!(tx_hash, attempts = self.config.attempts, ?elapsed, "polling timed out");
        Err(ConfirmError::Timeout {
            tx_hash: tx_hash.to_string(),
            attempts: self.config.attempts,
            elapsed,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fetch stub: absent until call number `present_on` (0 = never),
    /// counting every call.
    struct CountingFetcher {
        present_on: u32,
        calls: AtomicU32,
    }

    impl CountingFetcher {
        fn new(present_on: u32) -> Self {
            Self {
                present_on,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReceiptFetcher for CountingFetcher {
        async fn receipt(
            &self,
            tx_hash: &str,
        ) -> Result<Option<TransactionReceipt>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.present_on != 0 && call >= self.present_on {
                Ok(Some(TransactionReceipt {
                    transaction_hash: tx_hash.to_string(),
                    block_hash: Some("0xblock".to_string()),
                    ..TransactionReceipt::default()
                }))
            } else {
                Ok(None)
            }
        }
    }

    /// Fetch stub that always fails.
    struct FailingFetcher {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReceiptFetcher for FailingFetcher {
        async fn receipt(
            &self,
            _tx_hash: &str,
        ) -> Result<Option<TransactionReceipt>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError("connection refused".to_string()))
        }
    }

    fn config(attempts: u32) -> PollingConfig {
        PollingConfig {
            interval: Duration::from_millis(100),
            attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_receipt_after_exactly_n_calls() {
        let fetcher = Arc::new(CountingFetcher::new(3));
        let processor = PollingReceiptProcessor::new(fetcher.clone(), config(5));

        let receipt = processor.await_receipt("0xaaaa").await.unwrap();
        assert!(receipt.is_final());
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_hit_needs_no_sleep() {
        let fetcher = Arc::new(CountingFetcher::new(1));
        let processor = PollingReceiptProcessor::new(fetcher.clone(), config(5));

        processor.await_receipt("0xaaaa").await.unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_exactly_the_configured_attempts() {
        let fetcher = Arc::new(CountingFetcher::new(0));
        let processor = PollingReceiptProcessor::new(fetcher.clone(), config(4));

        let err = processor.await_receipt("0xbbbb").await.unwrap_err();
        match err {
            ConfirmError::Timeout {
                tx_hash, attempts, ..
            } => {
                assert_eq!(tx_hash, "0xbbbb");
                assert_eq!(attempts, 4);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(fetcher.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_reports_the_elapsed_wait() {
        let processor =
            PollingReceiptProcessor::new(Arc::new(CountingFetcher::new(0)), config(4));

        let err = processor.await_receipt("0xcccc").await.unwrap_err();
        match err {
            ConfirmError::Timeout { elapsed, .. } => {
                // Three sleeps of 100ms separate the four attempts.
                assert!(elapsed >= Duration::from_millis(300));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_propagates_without_retry() {
        let fetcher = Arc::new(FailingFetcher {
            calls: AtomicU32::new(0),
        });
        let processor = PollingReceiptProcessor::new(fetcher.clone(), config(10));

        let err = processor.await_receipt("0xdddd").await.unwrap_err();
        assert!(matches!(err, ConfirmError::Fetch(_)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_awaits_are_independent() {
        let processor = Arc::new(PollingReceiptProcessor::new(
            Arc::new(CountingFetcher::new(2)),
            config(5),
        ));

        let a = tokio::spawn({
            let p = Arc::clone(&processor);
            async move { p.await_receipt("0x01").await }
        });
        let b = tokio::spawn({
            let p = Arc::clone(&processor);
            async move { p.await_receipt("0x02").await }
        });

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
    }
}
