//! Concurrency checks for the admission gate over the in-memory cache.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use gatekeeper::domain::idempotency::{RejectReason, RetryReason};
use gatekeeper::domain::{
    AdmissionOutcome, FinalizeOutcome, IdempotencyConfig, IdempotencyGate, IdempotencyKey,
    Payload,
};
use gatekeeper::domain::ports::{CacheLookup, IdempotencyCache};
use gatekeeper::outbound::cache::InMemoryIdempotencyCache;
use gatekeeper::test_support::MutableClock;
use rstest::{fixture, rstest};
use serde_json::json;

type Gate = IdempotencyGate<InMemoryIdempotencyCache>;

#[fixture]
fn gate() -> Arc<Gate> {
    let cache = Arc::new(InMemoryIdempotencyCache::new(Arc::new(MutableClock::fixed())));
    Arc::new(Gate::with_noop_metrics(
        cache,
        IdempotencyConfig::with_ttl(Duration::from_secs(60)),
    ))
}

async fn admit_many(gate: &Arc<Gate>, attempts: usize) -> Vec<AdmissionOutcome> {
    let key = IdempotencyKey::new("order-42").expect("valid key");
    let payload = json!({"items": [{"sku": "A", "qty": 2}]});
    let handles = (0..attempts).map(|_| {
        let gate = Arc::clone(gate);
        let key = key.clone();
        let payload = payload.clone();
        tokio::spawn(async move { gate.admit(Some(&key), Payload::Json(&payload)).await })
    });
    join_all(handles)
        .await
        .into_iter()
        .map(|joined| {
            joined
                .expect("admission task completes")
                .expect("admission succeeds")
        })
        .collect()
}

async fn stored_record(
    cache: &InMemoryIdempotencyCache,
    cache_name: &str,
    key: &IdempotencyKey,
) -> CacheLookup {
    cache
        .get(cache_name, key.as_ref())
        .await
        .expect("cache read succeeds")
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_concurrent_attempt_proceeds(gate: Arc<Gate>) {
    let outcomes = admit_many(&gate, 32).await;

    let proceeded = outcomes
        .iter()
        .filter(|outcome| **outcome == AdmissionOutcome::Proceed)
        .count();
    assert_eq!(proceeded, 1);
    assert!(
        outcomes.iter().all(|outcome| matches!(
            outcome,
            AdmissionOutcome::Proceed | AdmissionOutcome::Retry(RetryReason::InProgress)
        )),
        "losers must be told to retry: {outcomes:?}"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completed_record_is_replayed_to_every_later_attempt(gate: Arc<Gate>) {
    let key = IdempotencyKey::new("order-42").expect("valid key");
    let first = admit_many(&gate, 1).await;
    assert_eq!(first, vec![AdmissionOutcome::Proceed]);

    let finalized = gate
        .finalize(Some(&key), 201, Some(r#"{"orderId":7}"#))
        .await
        .expect("finalize succeeds");
    assert_eq!(finalized, FinalizeOutcome::Completed);

    let replays = admit_many(&gate, 8).await;
    assert!(replays.iter().all(|outcome| *outcome
        == AdmissionOutcome::Replay {
            status_code: 201,
            body: Some(r#"{"orderId":7}"#.to_owned()),
        }));
}

#[rstest]
#[tokio::test]
async fn repeating_a_successful_finalize_leaves_the_same_record() {
    let cache = Arc::new(InMemoryIdempotencyCache::new(Arc::new(MutableClock::fixed())));
    let config = IdempotencyConfig::with_ttl(Duration::from_secs(60));
    let cache_name = config.cache_name().to_owned();
    let gate = Arc::new(Gate::with_noop_metrics(Arc::clone(&cache), config));
    let key = IdempotencyKey::new("order-42").expect("valid key");
    assert_eq!(admit_many(&gate, 1).await, vec![AdmissionOutcome::Proceed]);

    let body = Some(r#"{"orderId":7}"#);
    let first = gate.finalize(Some(&key), 201, body).await.expect("finalize succeeds");
    let after_first = stored_record(&cache, &cache_name, &key).await;
    let second = gate.finalize(Some(&key), 201, body).await.expect("finalize succeeds");
    let after_second = stored_record(&cache, &cache_name, &key).await;

    assert_eq!(first, FinalizeOutcome::Completed);
    assert_eq!(second, FinalizeOutcome::Completed);
    assert!(matches!(after_first, CacheLookup::Hit(_)));
    assert_eq!(after_first, after_second);
}

#[rstest]
#[tokio::test]
async fn failed_execution_frees_the_key_for_a_retry(gate: Arc<Gate>) {
    let key = IdempotencyKey::new("order-42").expect("valid key");
    assert_eq!(admit_many(&gate, 1).await, vec![AdmissionOutcome::Proceed]);

    let finalized = gate
        .finalize(Some(&key), 503, None)
        .await
        .expect("finalize succeeds");
    assert_eq!(finalized, FinalizeOutcome::Cleared);

    assert_eq!(admit_many(&gate, 1).await, vec![AdmissionOutcome::Proceed]);
}

#[rstest]
#[tokio::test]
async fn different_payload_under_a_claimed_key_is_rejected(gate: Arc<Gate>) {
    let key = IdempotencyKey::new("order-42").expect("valid key");
    assert_eq!(admit_many(&gate, 1).await, vec![AdmissionOutcome::Proceed]);

    let other = json!({"items": [{"sku": "B", "qty": 1}]});
    let outcome = gate
        .admit(Some(&key), Payload::Json(&other))
        .await
        .expect("admission succeeds");

    assert_eq!(
        outcome,
        AdmissionOutcome::Reject(RejectReason::PayloadMismatch)
    );
}
