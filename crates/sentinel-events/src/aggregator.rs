//! The detection aggregator.

use crate::stats::{self, StatsSnapshot};
use chrono::Utc;
use sentinel_core::{DetectionEvent, ScanSource, Store};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default retention cap for the event log.
pub const DEFAULT_RETENTION: usize = 1000;

/// Badge/indicator update receiver.
///
/// Recording a detection pushes the new "today" count here so the
/// boundary layer can refresh its badge. The default is a no-op.
pub trait IndicatorSink: Send + Sync {
    /// Called after each recorded event with the fresh today-count.
    fn update_badge(&self, today_count: u64);
}

/// Indicator sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl IndicatorSink for NoopIndicator {
    fn update_badge(&self, _today_count: u64) {}
}

struct AggregatorState {
    events: Vec<DetectionEvent>,
    /// (source, content fingerprint) pairs already recorded this session
    seen: HashSet<(ScanSource, String)>,
    /// Sequence number of `events[0]` in the persisted log
    first_seq: u64,
    next_seq: u64,
}

/// Sole writer to the detection event log.
///
/// Appends events, persists them through the [`Store`] capability
/// (failures are logged no-ops), enforces the retention cap, and
/// derives rolling statistics on demand.
pub struct DetectionAggregator {
    state: Mutex<AggregatorState>,
    store: Arc<dyn Store>,
    indicator: Arc<dyn IndicatorSink>,
    retention: usize,
}

impl DetectionAggregator {
    /// Create an aggregator over the given store with the default
    /// retention cap and a no-op indicator.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            state: Mutex::new(AggregatorState {
                events: Vec::new(),
                seen: HashSet::new(),
                first_seq: 0,
                next_seq: 0,
            }),
            store,
            indicator: Arc::new(NoopIndicator),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Set the indicator sink that receives badge updates.
    #[must_use]
    pub fn with_indicator(mut self, indicator: Arc<dyn IndicatorSink>) -> Self {
        self.indicator = indicator;
        self
    }

    /// Override the retention cap.
    #[must_use]
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    /// Load previously persisted events from the store.
    ///
    /// A store failure leaves the log empty; the aggregator still works
    /// in memory.
    pub async fn load(&self) {
        let persisted = match self.store.scan("event:").await {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!("Failed to load persisted events: {e}");
                return;
            }
        };

        let mut state = self.state.lock().await;
        for (key, value) in persisted {
            match serde_json::from_str::<DetectionEvent>(&value) {
                Ok(event) => {
                    if let Some(seq) = key
                        .strip_prefix("event:")
                        .and_then(|s| s.parse::<u64>().ok())
                    {
                        if state.events.is_empty() {
                            state.first_seq = seq;
                        }
                        state.next_seq = seq + 1;
                    }
                    state.events.push(event);
                }
                Err(e) => tracing::warn!("Skipping undecodable event {key}: {e}"),
            }
        }
        tracing::debug!("Loaded {} persisted detection events", state.events.len());
    }

    /// Record a completed scan's detection event.
    ///
    /// `dedup_key` is the scan's content fingerprint; an event with the
    /// same (source, fingerprint) pair already recorded this session is
    /// dropped. Returns whether the event was recorded. Persistence
    /// failures do not prevent the in-memory record or the badge
    /// update.
    pub async fn record(&self, event: DetectionEvent, dedup_key: &str) -> bool {
        let today = {
            let mut state = self.state.lock().await;

            let session_key = (event.source, dedup_key.to_string());
            if !state.seen.insert(session_key) {
                tracing::debug!("Duplicate detection for {:?}, not recorded", event.source);
                return false;
            }

            let seq = state.next_seq;
            state.next_seq += 1;

            let key = format!("event:{seq:012}");
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if let Err(e) = self.store.set(&key, &json).await {
                        tracing::warn!("Failed to persist detection event: {e}");
                    }
                }
                Err(e) => tracing::warn!("Failed to encode detection event: {e}"),
            }

            state.events.push(event);

            // Retention: evict oldest beyond the cap, in memory and in
            // the store
            while state.events.len() > self.retention {
                state.events.remove(0);
                let evicted_key = format!("event:{:012}", state.first_seq);
                state.first_seq += 1;
                if let Err(e) = self.store.delete(&evicted_key).await {
                    tracing::warn!("Failed to delete evicted event {evicted_key}: {e}");
                }
            }

            stats::compute(&state.events, Utc::now()).today
        };

        self.indicator.update_badge(today);
        true
    }

    /// Compute the current statistics snapshot from the event log.
    pub async fn statistics(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        stats::compute(&state.events, Utc::now())
    }

    /// Number of events currently retained.
    pub async fn event_count(&self) -> usize {
        self.state.lock().await.events.len()
    }

    /// Snapshot of the retained event log, oldest first.
    pub async fn events(&self) -> Vec<DetectionEvent> {
        self.state.lock().await.events.clone()
    }

    /// Discard the entire event log, in memory and in the store.
    ///
    /// Destructive and irreversible; the user confirmation happens at
    /// the boundary layer, not here.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.events.clear();
        state.seen.clear();
        state.first_seq = 0;
        state.next_seq = 0;
        drop(state);

        match self.store.scan("event:").await {
            Ok(pairs) => {
                for (key, _) in pairs {
                    if let Err(e) = self.store.delete(&key).await {
                        tracing::warn!("Failed to delete persisted event {key}: {e}");
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to enumerate persisted events for clear: {e}"),
        }

        self.indicator.update_badge(0);
    }
}
