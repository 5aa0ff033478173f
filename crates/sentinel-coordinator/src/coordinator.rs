//! The per-page scan coordinator.

use crate::observation::{
    host_of, is_password_key, FieldInput, FieldKind, FormSubmission, MutationBatch,
    OutboundRequest,
};
use crate::sample::page_sample;
use crate::throttle::{ScannedNodes, ThrottleGate};
use sentinel_core::{DetectionEvent, DetectionMode, MonitorConfig, RuleMatch, ScanSource};
use sentinel_events::DetectionAggregator;
use sentinel_filter::QuickFilter;
use sentinel_notify::{
    categorize, should_notify, HighlightState, NoopNotifier, NotificationRequest,
    NotificationSink, SubmitDecision,
};
use sentinel_verify::{ResponseCache, Verifier};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default quiet period before a field scan fires.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(500);

/// Default page-level mutation throttle window.
pub const THROTTLE_WINDOW: Duration = Duration::from_secs(3);

/// Result of one resolved scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The resolved match set
    pub matches: Vec<RuleMatch>,
    /// Whether the matches were API-verified or client-only
    pub mode: DetectionMode,
    /// Whether the notification policy fired for this match set
    pub notify: bool,
}

struct FieldState {
    generation: u64,
    pending: String,
}

/// Coordinates scanning for one page context.
///
/// Holds an immutable configuration snapshot for its whole lifetime; a
/// configuration change is applied by tearing this coordinator down and
/// building a new one (see
/// [`CoordinatorSupervisor`](crate::supervisor::CoordinatorSupervisor)).
pub struct ScanCoordinator {
    config: MonitorConfig,
    page_url: String,
    filter: QuickFilter,
    verifier: Arc<dyn Verifier>,
    aggregator: Arc<DetectionAggregator>,
    notifier: Arc<dyn NotificationSink>,
    debounce_quiet: Duration,
    throttle: ThrottleGate,
    scanned_nodes: ScannedNodes,
    fields: Mutex<HashMap<String, FieldState>>,
    highlights: Mutex<HashMap<String, HighlightState>>,
    destroyed: AtomicBool,
}

impl ScanCoordinator {
    /// Create a coordinator for the page at `page_url` from a
    /// configuration snapshot.
    #[must_use]
    pub fn new(
        config: MonitorConfig,
        page_url: impl Into<String>,
        verifier: Arc<dyn Verifier>,
        aggregator: Arc<DetectionAggregator>,
    ) -> Self {
        Self {
            config,
            page_url: page_url.into(),
            filter: QuickFilter::new(),
            verifier,
            aggregator,
            notifier: Arc::new(NoopNotifier),
            debounce_quiet: DEBOUNCE_QUIET,
            throttle: ThrottleGate::new(THROTTLE_WINDOW),
            scanned_nodes: ScannedNodes::new(),
            fields: Mutex::new(HashMap::new()),
            highlights: Mutex::new(HashMap::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Set the sink that receives fire-and-forget notifications.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Override the debounce quiet period.
    #[must_use]
    pub fn with_debounce(mut self, quiet: Duration) -> Self {
        self.debounce_quiet = quiet;
        self
    }

    /// Override the mutation throttle window.
    #[must_use]
    pub fn with_throttle_window(mut self, window: Duration) -> Self {
        self.throttle = ThrottleGate::new(window);
        self
    }

    /// The configuration snapshot this coordinator was built from.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Handle one input event on a form field.
    ///
    /// Resets the field's debounce timer; the scan fires only after the
    /// quiet period passes with no further input, and sees the value
    /// from the last event. Password-typed fields are never scanned,
    /// regardless of configuration.
    pub fn on_field_input(self: &Arc<Self>, input: FieldInput) {
        if self.is_destroyed() || !self.config.monitoring.forms {
            return;
        }
        if input.kind == FieldKind::Password {
            return;
        }

        let generation = {
            let Ok(mut fields) = self.fields.lock() else {
                return;
            };
            let state = fields.entry(input.field_id.clone()).or_insert(FieldState {
                generation: 0,
                pending: String::new(),
            });
            state.generation += 1;
            state.pending = input.value;
            state.generation
        };

        let this = Arc::clone(self);
        let field_id = input.field_id;
        tokio::spawn(async move {
            tokio::time::sleep(this.debounce_quiet).await;
            if this.is_destroyed() {
                return;
            }

            // A newer input invalidated this timer
            let value = {
                let Ok(fields) = this.fields.lock() else {
                    return;
                };
                match fields.get(&field_id) {
                    Some(state) if state.generation == generation => state.pending.clone(),
                    _ => return,
                }
            };

            let url = this.page_url.clone();
            if let Some(outcome) = this
                .scan_candidate(&value, ScanSource::Form, &url, true)
                .await
            {
                if !outcome.matches.is_empty() {
                    this.set_highlight(&field_id, HighlightState::Flagged);
                }
            }
        });
    }

    /// Handle a field losing focus: clear its highlight, independent of
    /// any pending scan timers.
    pub fn on_field_blur(&self, field_id: &str) {
        if let Ok(mut highlights) = self.highlights.lock() {
            highlights.remove(field_id);
        }
    }

    /// Current highlight state for a field.
    #[must_use]
    pub fn highlight_of(&self, field_id: &str) -> HighlightState {
        self.highlights
            .lock()
            .ok()
            .and_then(|h| h.get(field_id).copied())
            .unwrap_or(HighlightState::Clear)
    }

    fn set_highlight(&self, field_id: &str, state: HighlightState) {
        if let Ok(mut highlights) = self.highlights.lock() {
            highlights.insert(field_id.to_string(), state);
        }
    }

    /// Scan a form about to be submitted.
    ///
    /// Password fields (by type or by name) never reach the filter. The
    /// boundary must hold the submission on `Confirm` and cancel it if
    /// the user declines; no system notification is fired for this path
    /// since the confirmation itself is the interruption.
    pub async fn on_form_submit(&self, submission: FormSubmission) -> SubmitDecision {
        if self.is_destroyed() || !self.config.monitoring.forms {
            return SubmitDecision::Allow;
        }

        let text = submission
            .fields
            .iter()
            .filter(|(name, kind, _)| *kind != FieldKind::Password && !is_password_key(name))
            .map(|(_, _, value)| value.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return SubmitDecision::Allow;
        }

        let url = self.page_url.clone();
        match self
            .scan_candidate(&text, ScanSource::Form, &url, false)
            .await
        {
            Some(outcome) if outcome.notify => SubmitDecision::Confirm {
                summary: categorize(&outcome.matches),
            },
            _ => SubmitDecision::Allow,
        }
    }

    /// Scan the initial full-page content. Unthrottled, runs once per
    /// page; oversized text is sampled deterministically.
    pub async fn on_page_load(&self, text: &str) -> Option<ScanOutcome> {
        if self.is_destroyed() || !self.config.monitoring.dom {
            return None;
        }

        let sampled = page_sample(text);
        let url = self.page_url.clone();
        self.scan_candidate(&sampled, ScanSource::DomInitial, &url, true)
            .await
    }

    /// Handle a batch of DOM mutations.
    ///
    /// At most one scan per throttle window; batches arriving while the
    /// gate is closed are dropped without marking their nodes, so their
    /// text stays eligible for the next window. Returns whether a scan
    /// was scheduled.
    pub fn on_mutation_batch(self: &Arc<Self>, batch: MutationBatch) -> bool {
        if self.is_destroyed() || !self.config.monitoring.dom {
            return false;
        }

        if !self.throttle.try_begin() {
            tracing::debug!("Mutation batch dropped by throttle gate");
            return false;
        }

        // Only nodes not seen by a previous scan contribute text
        let text = batch
            .nodes
            .iter()
            .filter(|node| self.scanned_nodes.mark(node.node_id))
            .map(|node| node.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            // Nothing new to scan; give the window back
            self.throttle.abort();
            return false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let url = this.page_url.clone();
            let _ = this
                .scan_candidate(&text, ScanSource::DomMutation, &url, true)
                .await;
            this.throttle.finish();
        });
        true
    }

    /// Inspect an outbound request body.
    ///
    /// Only POST bodies are considered; password-named pairs are
    /// stripped and undecodable raw segments skipped before the text
    /// reaches the filter.
    pub async fn on_request(&self, request: OutboundRequest) -> Option<ScanOutcome> {
        if self.is_destroyed() || !self.config.monitoring.network {
            return None;
        }

        let text = request.scannable_text()?;
        self.scan_candidate(&text, ScanSource::Network, &request.url, true)
            .await
    }

    /// Detach this coordinator: no deferred callback past this point
    /// mutates shared state, and in-flight verification results are
    /// dropped on arrival.
    pub fn teardown(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        if let Ok(mut fields) = self.fields.lock() {
            fields.clear();
        }
        if let Ok(mut highlights) = self.highlights.lock() {
            highlights.clear();
        }
        self.scanned_nodes.reset();
        tracing::debug!("Scan coordinator for {} torn down", self.page_url);
    }

    /// The shared funnel behind every entry point.
    ///
    /// Quick-Filter boolean gate, per-invocation whitelist check,
    /// verification with client-only fallback, aggregation, and the
    /// notification decision.
    async fn scan_candidate(
        &self,
        text: &str,
        source: ScanSource,
        url: &str,
        surface_notification: bool,
    ) -> Option<ScanOutcome> {
        if self.is_destroyed() {
            return None;
        }
        if !self.filter.contains_pii(text) {
            return None;
        }

        // Whitelist is evaluated per invocation, never cached across
        // navigations
        let origin = host_of(&self.page_url);
        if self.config.is_whitelisted(origin) {
            tracing::debug!("Origin {origin} is whitelisted, scan aborted");
            return None;
        }

        let namespaces: Vec<String> = self
            .config
            .verification
            .namespaces
            .iter()
            .cloned()
            .collect();

        let (matches, mode) = match self
            .verifier
            .verify(text, &namespaces, self.config.verification.max_matches)
            .await
        {
            Ok(verified) => (verified, DetectionMode::ApiVerified),
            Err(e) => {
                tracing::warn!("Verification degraded to client-only: {e}");
                (self.filter.scan(text), DetectionMode::ClientOnly)
            }
        };

        // A verification result arriving after teardown must not leave
        // side effects
        if self.is_destroyed() {
            return None;
        }
        if matches.is_empty() {
            return None;
        }

        let event = DetectionEvent::from_matches(source, url, &matches, mode)?;
        let dedup_key = ResponseCache::fingerprint(&namespaces, text);
        self.aggregator.record(event, &dedup_key).await;

        let notify = should_notify(&matches, &self.config.notifications);
        if notify && surface_notification {
            self.notifier.notify(NotificationRequest::from_matches(&matches));
        }

        Some(ScanOutcome {
            matches,
            mode,
            notify,
        })
    }
}
