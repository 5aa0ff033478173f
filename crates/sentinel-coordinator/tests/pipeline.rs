//! End-to-end pipeline tests against fake verifiers and the in-memory
//! store.

use async_trait::async_trait;
use sentinel_coordinator::{
    FieldInput, FieldKind, FormSubmission, MutationBatch, OutboundRequest, RequestBody,
    ScanCoordinator, TextNode,
};
use sentinel_core::{
    DetectionMode, MemoryStore, MonitorConfig, PiiCategory, RuleMatch, Severity,
};
use sentinel_events::DetectionAggregator;
use sentinel_filter::QuickFilter;
use sentinel_notify::{categorize, SubmitDecision};
use sentinel_verify::{Verifier, VerifyError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Verifier that always fails, forcing client-only fallback. Records
/// every text it was asked to verify.
#[derive(Default)]
struct OfflineVerifier {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl Verifier for OfflineVerifier {
    async fn verify(
        &self,
        text: &str,
        _namespaces: &[String],
        _max_matches: u32,
    ) -> Result<Vec<RuleMatch>, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .lock()
            .expect("texts mutex")
            .push(text.to_string());
        Err(VerifyError::ServiceUnavailable {
            reason: "offline".to_string(),
        })
    }
}

/// Verifier that confirms a fixed match set.
struct ConfirmingVerifier {
    matches: Vec<RuleMatch>,
}

#[async_trait]
impl Verifier for ConfirmingVerifier {
    async fn verify(
        &self,
        _text: &str,
        _namespaces: &[String],
        _max_matches: u32,
    ) -> Result<Vec<RuleMatch>, VerifyError> {
        Ok(self.matches.clone())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn coordinator_with(
    config: MonitorConfig,
    verifier: Arc<dyn Verifier>,
) -> (Arc<ScanCoordinator>, Arc<DetectionAggregator>) {
    init_tracing();
    let aggregator = Arc::new(DetectionAggregator::new(Arc::new(MemoryStore::new())));
    let coordinator = Arc::new(ScanCoordinator::new(
        config,
        "https://example.com/contact",
        verifier,
        aggregator.clone(),
    ));
    (coordinator, aggregator)
}

#[tokio::test]
async fn test_offline_page_scan_end_to_end() {
    let (coordinator, aggregator) =
        coordinator_with(MonitorConfig::default(), Arc::new(OfflineVerifier::default()));

    let outcome = coordinator
        .on_page_load("Contact me at jane@example.com or 555-123-4567")
        .await
        .expect("scan should yield matches");

    assert_eq!(outcome.mode, DetectionMode::ClientOnly);
    assert_eq!(outcome.matches.len(), 2);
    assert!(outcome.matches.iter().all(|m| !m.verified));
    assert_eq!(outcome.matches[0].category, PiiCategory::Email);
    assert_eq!(outcome.matches[1].category, PiiCategory::Phone);

    let stats = aggregator.statistics().await;
    assert_eq!(stats.today, 1);
    assert_eq!(
        stats.top_categories,
        vec![(PiiCategory::Email, 1), (PiiCategory::Phone, 1)]
    );
}

#[tokio::test]
async fn test_clean_text_produces_nothing() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, aggregator) =
        coordinator_with(MonitorConfig::default(), verifier.clone());

    let outcome = coordinator.on_page_load("nothing sensitive here").await;
    assert!(outcome.is_none());
    // The quick-filter gate must stop the pipeline before verification
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(aggregator.statistics().await.total, 0);
}

#[tokio::test]
async fn test_fallback_mode_everywhere_when_service_down() {
    let mut config = MonitorConfig::default();
    config.monitoring.network = true;
    let (coordinator, aggregator) =
        coordinator_with(config, Arc::new(OfflineVerifier::default()));

    coordinator.on_page_load("jane@example.com").await;
    coordinator
        .on_request(OutboundRequest {
            url: "https://api.example.com/submit".to_string(),
            method: "POST".to_string(),
            body: Some(RequestBody::FormPairs(vec![(
                "contact".to_string(),
                "bob@example.org".to_string(),
            )])),
        })
        .await;

    let events = aggregator.events().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.mode == DetectionMode::ClientOnly));
    assert_eq!(aggregator.statistics().await.total, 2);
}

#[tokio::test]
async fn test_whitelisted_origin_never_scanned() {
    let mut config = MonitorConfig::default();
    config.whitelist.insert("example.com".to_string());
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, aggregator) = coordinator_with(config, verifier.clone());

    let outcome = coordinator
        .on_page_load("ssn 123-45-6789 and jane@example.com")
        .await;

    assert!(outcome.is_none());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(aggregator.statistics().await.total, 0);
}

#[tokio::test]
async fn test_password_value_never_reaches_scanning() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, _aggregator) =
        coordinator_with(MonitorConfig::default(), verifier.clone());

    // Live input on a password field is ignored entirely
    coordinator.on_field_input(FieldInput {
        field_id: "pw".to_string(),
        kind: FieldKind::Password,
        value: "secret123@example.com".to_string(),
    });

    // Submit-time scan sees only the non-password values
    let decision = coordinator
        .on_form_submit(FormSubmission {
            fields: vec![
                ("username".to_string(), FieldKind::Text, "bob".to_string()),
                (
                    "password".to_string(),
                    FieldKind::Password,
                    "secret123".to_string(),
                ),
            ],
        })
        .await;

    assert_eq!(decision, SubmitDecision::Allow);
    for text in verifier.texts.lock().expect("texts mutex").iter() {
        assert!(!text.contains("secret123"));
    }
}

#[tokio::test]
async fn test_submit_confirmation_at_threshold() {
    // Default threshold is High; an SSN (critical) must trigger the
    // confirmation, a bare email (medium) must not.
    let (coordinator, _) = coordinator_with(
        MonitorConfig::default(),
        Arc::new(OfflineVerifier::default()),
    );

    let harmless = coordinator
        .on_form_submit(FormSubmission {
            fields: vec![(
                "contact".to_string(),
                FieldKind::Email,
                "jane@example.com".to_string(),
            )],
        })
        .await;
    assert_eq!(harmless, SubmitDecision::Allow);

    let sensitive = coordinator
        .on_form_submit(FormSubmission {
            fields: vec![(
                "ssn".to_string(),
                FieldKind::Text,
                "123-45-6789".to_string(),
            )],
        })
        .await;
    match sensitive {
        SubmitDecision::Confirm { summary } => {
            assert_eq!(summary.get(&PiiCategory::Ssn), Some(&1));
            // The confirm summary is the category summary of the
            // fallback scan over the same text
            let expected = categorize(&QuickFilter::new().scan("123-45-6789"));
            assert_eq!(summary, expected);
        }
        SubmitDecision::Allow => panic!("critical match must require confirmation"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_debounce_scans_once_with_last_value() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, _) = coordinator_with(MonitorConfig::default(), verifier.clone());

    for i in 0..5 {
        coordinator.on_field_input(FieldInput {
            field_id: "email".to_string(),
            kind: FieldKind::Email,
            value: format!("draft{i}@example.com"),
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    coordinator.on_field_input(FieldInput {
        field_id: "email".to_string(),
        kind: FieldKind::Email,
        value: "final@example.com".to_string(),
    });

    // Let the quiet period elapse and the deferred scan resolve
    tokio::time::sleep(Duration::from_millis(700)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    let texts = verifier.texts.lock().expect("texts mutex");
    assert_eq!(texts.as_slice(), ["final@example.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_independent_fields_scan_independently() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, _) = coordinator_with(MonitorConfig::default(), verifier.clone());

    for field in ["a", "b", "c"] {
        coordinator.on_field_input(FieldInput {
            field_id: field.to_string(),
            kind: FieldKind::Text,
            value: format!("{field}@example.com"),
        });
    }

    tokio::time::sleep(Duration::from_millis(700)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(verifier.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_admits_one_scan_per_window() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, _) = coordinator_with(MonitorConfig::default(), verifier.clone());

    let batch = |id: u64| MutationBatch {
        nodes: vec![TextNode {
            node_id: id,
            text: format!("update {id}: jane@example.com"),
        }],
    };

    assert!(coordinator.on_mutation_batch(batch(1)));
    for id in 2..6 {
        assert!(!coordinator.on_mutation_batch(batch(id)));
    }

    tokio::time::sleep(Duration::from_millis(3100)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // Just past window expiry: exactly one new scan is admitted
    assert!(coordinator.on_mutation_batch(batch(6)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scanned_nodes_not_rescanned() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, _) = coordinator_with(MonitorConfig::default(), verifier.clone());

    let node = TextNode {
        node_id: 7,
        text: "jane@example.com".to_string(),
    };
    assert!(coordinator.on_mutation_batch(MutationBatch {
        nodes: vec![node.clone()],
    }));

    tokio::time::sleep(Duration::from_millis(3100)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // Same node again after the window: nothing new to scan, and the
    // no-op admission must not consume the window
    assert!(!coordinator.on_mutation_batch(MutationBatch { nodes: vec![node] }));
    assert!(coordinator.on_mutation_batch(MutationBatch {
        nodes: vec![TextNode {
            node_id: 8,
            text: "bob@example.org".to_string(),
        }],
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_drops_pending_scans() {
    let verifier = Arc::new(OfflineVerifier::default());
    let (coordinator, aggregator) =
        coordinator_with(MonitorConfig::default(), verifier.clone());

    coordinator.on_field_input(FieldInput {
        field_id: "email".to_string(),
        kind: FieldKind::Email,
        value: "jane@example.com".to_string(),
    });

    // Torn down before the quiet period elapses
    coordinator.teardown();

    tokio::time::sleep(Duration::from_secs(1)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(aggregator.statistics().await.total, 0);
    assert!(coordinator.on_page_load("jane@example.com").await.is_none());
}

#[tokio::test]
async fn test_verified_matches_keep_api_mode() {
    let confirmed = vec![RuleMatch {
        category: PiiCategory::Email,
        severity: Severity::Medium,
        rule_id: "comm/email".to_string(),
        span_len: 0,
        verified: true,
    }];
    let (coordinator, aggregator) = coordinator_with(
        MonitorConfig::default(),
        Arc::new(ConfirmingVerifier { matches: confirmed }),
    );

    let outcome = coordinator
        .on_page_load("jane@example.com")
        .await
        .expect("verified scan");

    assert_eq!(outcome.mode, DetectionMode::ApiVerified);
    assert!(outcome.matches[0].verified);
    assert_eq!(
        aggregator.events().await[0].mode,
        DetectionMode::ApiVerified
    );
}

#[tokio::test]
async fn test_duplicate_content_recorded_once() {
    let (coordinator, aggregator) = coordinator_with(
        MonitorConfig::default(),
        Arc::new(OfflineVerifier::default()),
    );

    coordinator.on_page_load("jane@example.com").await;
    coordinator.on_page_load("jane@example.com").await;

    assert_eq!(aggregator.statistics().await.total, 1);
}
