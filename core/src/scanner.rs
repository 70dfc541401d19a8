//! The **parallel subnet scanner**.
//!
//! Fans a [`Prober`] out across every candidate host and reports the first
//! reachable one *in enumeration order*. All probes are allowed to settle
//! before the winner is picked, so the answer does not depend on which host
//! happened to answer fastest.
//!
//! Three limits keep a scan bounded:
//! * at most `max_in_flight` connection attempts are open at once,
//! * the whole scan stops at its wall-clock deadline, keeping the best host
//!   seen so far,
//! * a [`CancellationToken`] aborts every outstanding probe and yields nothing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pawprobe_common::config::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_SCAN_DEADLINE_MS, ResolverConfig};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decides whether a single host answers on a port.
///
/// Implementations must not fail: every error collapses to `false`.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, port: u16) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct ParallelScanner {
    max_in_flight: usize,
    deadline: Duration,
}

impl Default for ParallelScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT, Duration::from_millis(DEFAULT_SCAN_DEADLINE_MS))
    }
}

impl ParallelScanner {
    pub fn new(max_in_flight: usize, deadline: Duration) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            deadline,
        }
    }

    pub fn from_config(cfg: &ResolverConfig) -> Self {
        Self::new(cfg.max_in_flight, cfg.scan_deadline())
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Probes every candidate on `port` and returns the earliest reachable one.
    pub async fn scan<I>(
        &self,
        candidates: I,
        prober: Arc<dyn Prober>,
        port: u16,
        cancel: &CancellationToken,
    ) -> Option<String>
    where
        I: IntoIterator<Item = String>,
    {
        if cancel.is_cancelled() {
            return None;
        }

        let permits: Arc<Semaphore> = Arc::new(Semaphore::new(self.max_in_flight));
        let mut probes: JoinSet<Option<(usize, String)>> = JoinSet::new();

        for (idx, host) in candidates.into_iter().enumerate() {
            let prober: Arc<dyn Prober> = Arc::clone(&prober);
            let permits: Arc<Semaphore> = Arc::clone(&permits);
            probes.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                prober.probe(&host, port).await.then_some((idx, host))
            });
        }

        if probes.is_empty() {
            debug!("No candidates to scan");
            return None;
        }
        debug!("Probing {} candidates on port {port}", probes.len());

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let mut best: Option<(usize, String)> = None;
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Scan cancelled, dropping {} pending probes", probes.len());
                    return None;
                }

                _ = &mut deadline => {
                    warn!(
                        "Scan deadline of {}ms reached with {} probes pending",
                        self.deadline.as_millis(),
                        probes.len()
                    );
                    break;
                }

                joined = probes.join_next() => match joined {
                    Some(Ok(Some((idx, host)))) => {
                        debug!("{host} answered on port {port}");
                        if best.as_ref().is_none_or(|(best_idx, _)| idx < *best_idx) {
                            best = Some((idx, host));
                        }
                    }
                    Some(Ok(None)) => {}
                    Some(Err(e)) => debug!("Probe task failed: {e}"),
                    None => break,
                }
            }
        }

        best.map(|(_, host)| host)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
