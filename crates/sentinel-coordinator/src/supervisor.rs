//! Configuration reload supervision.
//!
//! A coordinator never observes a configuration change mid-flight: the
//! supervisor builds a replacement from the new snapshot, swaps it in,
//! and tears the old one down. Scans already in flight resolve against
//! the snapshot they started with and drop their side effects if they
//! land after teardown.

use crate::coordinator::ScanCoordinator;
use crate::observation::{Observation, ObservationSource};
use sentinel_core::MonitorConfig;
use sentinel_events::DetectionAggregator;
use sentinel_notify::{NoopNotifier, NotificationSink};
use sentinel_verify::Verifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Owns the active [`ScanCoordinator`] for one page context and
/// rebuilds it on configuration changes.
pub struct CoordinatorSupervisor {
    verifier: Arc<dyn Verifier>,
    aggregator: Arc<DetectionAggregator>,
    notifier: Arc<dyn NotificationSink>,
    page_url: String,
    debounce_quiet: Duration,
    throttle_window: Duration,
    current: RwLock<Arc<ScanCoordinator>>,
}

impl CoordinatorSupervisor {
    /// Build a supervisor with an initial configuration snapshot.
    #[must_use]
    pub fn new(
        config: MonitorConfig,
        page_url: impl Into<String>,
        verifier: Arc<dyn Verifier>,
        aggregator: Arc<DetectionAggregator>,
    ) -> Self {
        let page_url = page_url.into();
        let notifier: Arc<dyn NotificationSink> = Arc::new(NoopNotifier);
        let coordinator = Arc::new(
            ScanCoordinator::new(
                config,
                page_url.clone(),
                verifier.clone(),
                aggregator.clone(),
            )
            .with_notifier(notifier.clone()),
        );

        Self {
            verifier,
            aggregator,
            notifier,
            page_url,
            debounce_quiet: crate::coordinator::DEBOUNCE_QUIET,
            throttle_window: crate::coordinator::THROTTLE_WINDOW,
            current: RwLock::new(coordinator),
        }
    }

    /// Set the notification sink coordinators report through.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self.rebuild_current();
        self
    }

    /// Override the scheduling parameters.
    #[must_use]
    pub fn with_timing(mut self, debounce_quiet: Duration, throttle_window: Duration) -> Self {
        self.debounce_quiet = debounce_quiet;
        self.throttle_window = throttle_window;
        self.rebuild_current();
        self
    }

    /// Rebuild the held coordinator during construction, before any
    /// entry point can race with it.
    fn rebuild_current(&mut self) {
        let config = self.current.get_mut().config().clone();
        *self.current.get_mut() = Arc::new(
            ScanCoordinator::new(
                config,
                self.page_url.clone(),
                self.verifier.clone(),
                self.aggregator.clone(),
            )
            .with_notifier(self.notifier.clone())
            .with_debounce(self.debounce_quiet)
            .with_throttle_window(self.throttle_window),
        );
    }

    /// The active coordinator.
    pub async fn current(&self) -> Arc<ScanCoordinator> {
        self.current.read().await.clone()
    }

    /// Apply a new configuration: tear down the active coordinator and
    /// swap in a fresh one built from the new snapshot. Atomic from the
    /// pipeline's perspective — entry points see either the old
    /// coordinator or the new one, never a half-applied mix.
    pub async fn reload(&self, config: MonitorConfig) {
        let replacement = Arc::new(
            ScanCoordinator::new(
                config,
                self.page_url.clone(),
                self.verifier.clone(),
                self.aggregator.clone(),
            )
            .with_notifier(self.notifier.clone())
            .with_debounce(self.debounce_quiet)
            .with_throttle_window(self.throttle_window),
        );

        let mut current = self.current.write().await;
        let old = std::mem::replace(&mut *current, replacement);
        drop(current);

        old.teardown();
        tracing::debug!("Coordinator reloaded for {}", self.page_url);
    }

    /// Page unload or explicit pause: tear the active coordinator down
    /// without replacement. Entry points become no-ops until the next
    /// [`reload`](Self::reload).
    pub async fn shutdown(&self) {
        self.current.read().await.teardown();
    }

    /// Drive an observation source to completion, dispatching each
    /// observation to the active coordinator's entry point.
    pub async fn drive<S: ObservationSource>(&self, mut source: S) {
        while let Some(observation) = source.next().await {
            let coordinator = self.current().await;
            if coordinator.is_destroyed() {
                break;
            }
            match observation {
                Observation::FieldInput(input) => coordinator.on_field_input(input),
                Observation::FieldBlur { field_id } => coordinator.on_field_blur(&field_id),
                Observation::FormSubmit(submission) => {
                    let _ = coordinator.on_form_submit(submission).await;
                }
                Observation::PageLoad { text } => {
                    let _ = coordinator.on_page_load(&text).await;
                }
                Observation::Mutations(batch) => {
                    let _ = coordinator.on_mutation_batch(batch);
                }
                Observation::Request(request) => {
                    let _ = coordinator.on_request(request).await;
                }
            }
        }
        source.cancel();
    }
}
