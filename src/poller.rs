// src/poller.rs
//
// Timer-driven polling, one loop per registered data source. Each tick
// issues a sequence number and fires the fetch as its own task, so a slow
// response never delays the next cycle; results fan out to the UI loop
// over a channel. Loops are bound to the lifetime of the view that
// spawned them: cancelling the set stops the timers and makes any
// still-in-flight response discard itself instead of publishing.

use crate::api_client::{ApiClient, FetchError};
use crate::types::{AnalyticsSnapshot, LaneSignalState, PerLane, PollingConfig};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// One fetched result, tagged with the sequence number issued when its
/// request went out. The snapshot stores use the tag to drop stale
/// responses.
#[derive(Debug)]
pub enum PollUpdate {
    Analytics { seq: u64, snapshot: AnalyticsSnapshot },
    TrafficStates { seq: u64, states: PerLane<LaneSignalState> },
    VehicleCounts { seq: u64, counts: PerLane<u32> },
    Ambulance { seq: u64, flags: PerLane<bool> },
}

/// Monotonic issue counter for one data source. Lives for the whole
/// process (not one mount), so a straggler from a previous mount can
/// never outrank data fetched after a remount.
#[derive(Debug, Clone, Default)]
pub struct Sequencer(Arc<AtomicU64>);

impl Sequencer {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// One sequencer per registered source.
#[derive(Debug, Clone, Default)]
pub struct Sequencers {
    pub analytics: Sequencer,
    pub traffic_states: Sequencer,
    pub vehicle_counts: Sequencer,
    pub ambulance: Sequencer,
}

/// Cooperative cancellation signal shared between a poller set and its
/// in-flight fetches. Checked before any result is published.
#[derive(Debug, Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The poll loops owned by one mounted view.
pub struct PollerSet {
    cancel: CancelFlag,
    tasks: Vec<JoinHandle<()>>,
}

impl PollerSet {
    /// The three live-view sources, all on the live cadence.
    pub fn spawn_live(
        client: Arc<ApiClient>,
        polling: &PollingConfig,
        seqs: &Sequencers,
        tx: mpsc::UnboundedSender<PollUpdate>,
    ) -> Self {
        let cancel = CancelFlag::new();
        let every = Duration::from_millis(polling.live_interval_ms.max(1));
        let tasks = vec![
            spawn_source(
                "traffic_states",
                client.clone(),
                every,
                seqs.traffic_states.clone(),
                cancel.clone(),
                tx.clone(),
                |c| async move { c.fetch_traffic_states().await },
                |seq, states| PollUpdate::TrafficStates { seq, states },
            ),
            spawn_source(
                "vehicle_counts",
                client.clone(),
                every,
                seqs.vehicle_counts.clone(),
                cancel.clone(),
                tx.clone(),
                |c| async move { c.fetch_vehicle_counts().await },
                |seq, counts| PollUpdate::VehicleCounts { seq, counts },
            ),
            spawn_source(
                "ambulance_status",
                client,
                every,
                seqs.ambulance.clone(),
                cancel.clone(),
                tx,
                |c| async move { c.fetch_ambulance_status().await },
                |seq, flags| PollUpdate::Ambulance { seq, flags },
            ),
        ];
        Self { cancel, tasks }
    }

    /// The analytics aggregate, on its own slower cadence.
    pub fn spawn_analytics(
        client: Arc<ApiClient>,
        polling: &PollingConfig,
        seqs: &Sequencers,
        tx: mpsc::UnboundedSender<PollUpdate>,
    ) -> Self {
        let cancel = CancelFlag::new();
        let every = Duration::from_millis(polling.analytics_interval_ms.max(1));
        let tasks = vec![spawn_source(
            "traffic_data",
            client,
            every,
            seqs.analytics.clone(),
            cancel.clone(),
            tx,
            |c| async move { c.fetch_analytics().await },
            |seq, snapshot| PollUpdate::Analytics { seq, snapshot },
        )];
        Self { cancel, tasks }
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for PollerSet {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_source<T, F, Fut, M>(
    name: &'static str,
    client: Arc<ApiClient>,
    every: Duration,
    seq: Sequencer,
    cancel: CancelFlag,
    tx: mpsc::UnboundedSender<PollUpdate>,
    fetch: F,
    make: M,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(Arc<ApiClient>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    M: Fn(u64, T) -> PollUpdate + Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the view already primed
        // itself on activation, so consume it and start at +interval.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if cancel.is_cancelled() {
                break;
            }

            let seq_no = seq.next();
            debug!("{}: issuing poll #{}", name, seq_no);

            let client = client.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            let fetch = fetch.clone();
            let make = make.clone();
            // Fire-and-forget: the fetch runs as its own task so the next
            // tick is never serialized behind this response.
            tokio::spawn(async move {
                match fetch(client).await {
                    Ok(payload) => {
                        if cancel.is_cancelled() {
                            debug!("{}: discarding response #{} issued before teardown", name, seq_no);
                            return;
                        }
                        let _ = tx.send(make(seq_no, payload));
                    }
                    Err(e) => warn!("{}: poll #{} failed: {}", name, seq_no, e),
                }
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_is_monotonic() {
        let seq = Sequencer::default();
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
        let clone = seq.clone();
        assert_eq!(clone.next(), 3);
        assert_eq!(seq.next(), 4);
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_set_stops_publishing() {
        // A cancelled set must not publish even if a response was already
        // on its way: the flag is checked on the response path.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();
        cancel.cancel();

        // Simulate the response path of an in-flight fetch.
        if !cancel.is_cancelled() {
            let _ = tx.send(PollUpdate::VehicleCounts {
                seq: 1,
                counts: PerLane::default(),
            });
        }
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
