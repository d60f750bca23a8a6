//! Unit tests for idempotency primitives.

use std::collections::HashMap;
use std::time::Duration;

use rstest::rstest;
use serde_json::json;

use super::*;

// IdempotencyKey

#[rstest]
#[case("abc")]
#[case("550e8400-e29b-41d4-a716-446655440000")]
#[case("order/2024/0042#retry")]
fn key_accepts_opaque_values(#[case] raw: &str) {
    let key = IdempotencyKey::new(raw).expect("key should be accepted");
    assert_eq!(key.as_ref(), raw);
}

#[rstest]
#[case("", IdempotencyKeyValidationError::EmptyKey)]
#[case(" abc", IdempotencyKeyValidationError::SurroundingWhitespace)]
#[case("abc\t", IdempotencyKeyValidationError::SurroundingWhitespace)]
#[case("ab\u{7}c", IdempotencyKeyValidationError::ControlCharacter)]
fn key_rejects_invalid_values(#[case] raw: &str, #[case] expected: IdempotencyKeyValidationError) {
    assert_eq!(IdempotencyKey::new(raw), Err(expected));
}

#[test]
fn key_rejects_overlong_values() {
    let raw = "k".repeat(IdempotencyKey::MAX_LEN + 1);
    assert_eq!(
        IdempotencyKey::new(raw),
        Err(IdempotencyKeyValidationError::TooLong {
            max: IdempotencyKey::MAX_LEN,
            actual: IdempotencyKey::MAX_LEN + 1,
        })
    );
}

#[rstest]
#[case(None)]
#[case(Some(""))]
fn parse_optional_treats_missing_and_empty_as_no_key(#[case] raw: Option<&str>) {
    assert_eq!(IdempotencyKey::parse_optional(raw), Ok(None));
}

#[test]
fn parse_optional_validates_present_values() {
    assert!(IdempotencyKey::parse_optional(Some(" padded ")).is_err());
    let key = IdempotencyKey::parse_optional(Some("abc"))
        .expect("valid")
        .expect("present");
    assert_eq!(key.to_string(), "abc");
}

#[test]
fn key_deserialisation_applies_validation() {
    let parsed: Result<IdempotencyKey, _> = serde_json::from_str("\"\"");
    assert!(parsed.is_err());
}

#[test]
fn random_keys_are_distinct() {
    assert_ne!(IdempotencyKey::random(), IdempotencyKey::random());
}

// PayloadHash and fingerprints

#[test]
fn payload_hash_hex_is_lowercase_and_64_chars() {
    let hex = PayloadHash::from_bytes([0xAB; 32]).to_hex();
    assert_eq!(hex.len(), 64);
    assert_eq!(hex, "ab".repeat(32));
}

#[test]
fn payload_hash_parses_its_own_hex() {
    let hash = PayloadHash::of_bytes(b"payload");
    assert_eq!(PayloadHash::from_hex(&hash.to_hex()), Ok(hash));
}

#[rstest]
#[case("abcd", PayloadHashError::InvalidLength { expected: 32, actual: 2 })]
fn payload_hash_rejects_short_hex(#[case] raw: &str, #[case] expected: PayloadHashError) {
    assert_eq!(PayloadHash::from_hex(raw), Err(expected));
}

#[test]
fn payload_hash_rejects_non_hex_characters() {
    let raw = "g".repeat(64);
    assert!(matches!(
        PayloadHash::from_hex(&raw),
        Err(PayloadHashError::InvalidHex { .. })
    ));
}

#[test]
fn sha256_of_empty_input_matches_known_digest() {
    assert_eq!(
        PayloadHash::of_bytes(b"").to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn json_fingerprint_ignores_key_order_at_every_depth() {
    let a = json!({"order": {"qty": 2, "sku": "GOAT-1"}, "note": null});
    let b = json!({"note": null, "order": {"sku": "GOAT-1", "qty": 2}});
    assert_eq!(Payload::Json(&a).fingerprint(), Payload::Json(&b).fingerprint());
}

#[test]
fn json_fingerprint_is_sensitive_to_array_order() {
    let a = json!({"items": ["a", "b"]});
    let b = json!({"items": ["b", "a"]});
    assert_ne!(canonicalize_and_hash(&a), canonicalize_and_hash(&b));
}

#[test]
fn json_fingerprint_hashes_compact_canonical_text() {
    let value = json!({"name": "G1"});
    assert_eq!(
        canonicalize_and_hash(&value),
        PayloadHash::of_bytes(br#"{"name":"G1"}"#)
    );
}

#[test]
fn byte_fingerprint_hashes_verbatim() {
    let raw: &[u8] = b"{ \"name\" : \"G1\" }";
    assert_eq!(Payload::from(raw).fingerprint(), PayloadHash::of_bytes(raw));
}

// IdempotencyRecord wire format

fn sample_hash() -> PayloadHash {
    PayloadHash::of_bytes(b"sample")
}

#[test]
fn in_progress_record_wire_shape() {
    let wire = IdempotencyRecord::in_progress(sample_hash()).to_wire();
    let value: serde_json::Value = serde_json::from_str(&wire).expect("valid json");
    assert_eq!(
        value,
        json!({"hash": sample_hash().to_hex(), "inProgress": true})
    );
}

#[test]
fn completed_record_wire_shape() {
    let wire = IdempotencyRecord::completed(sample_hash(), 201, Some(r#"{"id":"g"}"#.to_owned()))
        .to_wire();
    let value: serde_json::Value = serde_json::from_str(&wire).expect("valid json");
    assert_eq!(
        value,
        json!({
            "hash": sample_hash().to_hex(),
            "inProgress": false,
            "statusCode": 201,
            "result": "{\"id\":\"g\"}"
        })
    );
}

#[test]
fn decoding_accepts_records_without_in_progress_flag() {
    let raw = format!(
        r#"{{"hash":"{}","statusCode":200,"result":"ok"}}"#,
        sample_hash().to_hex()
    );
    let record = IdempotencyRecord::from_wire(&raw).expect("record decodes");
    assert_eq!(
        record.state,
        RecordState::Completed {
            status_code: 200,
            body: Some("ok".to_owned())
        }
    );
    assert!(!record.is_in_progress());
}

#[test]
fn decoding_preserves_body_text_exactly() {
    let body = "{ \"spaced\" :  true }\n";
    let wire = IdempotencyRecord::completed(sample_hash(), 200, Some(body.to_owned())).to_wire();
    let record = IdempotencyRecord::from_wire(&wire).expect("record decodes");
    assert_eq!(
        record.state,
        RecordState::Completed {
            status_code: 200,
            body: Some(body.to_owned())
        }
    );
}

#[rstest]
#[case::not_json("{", "Malformed")]
#[case::missing_hash(r#"{"inProgress":true}"#, "Malformed")]
#[case::short_hash(r#"{"hash":"ab","inProgress":true}"#, "Hash")]
fn decoding_rejects_invalid_records(#[case] raw: &str, #[case] variant: &str) {
    let err = IdempotencyRecord::from_wire(raw).expect_err("record must not decode");
    let matched = match err {
        RecordDecodeError::Malformed { .. } => "Malformed",
        RecordDecodeError::Hash(_) => "Hash",
        RecordDecodeError::MissingStatusCode => "MissingStatusCode",
    };
    assert_eq!(matched, variant);
}

#[test]
fn decoding_rejects_completed_records_without_status() {
    let raw = format!(r#"{{"hash":"{}","inProgress":false}}"#, sample_hash().to_hex());
    assert_eq!(
        IdempotencyRecord::from_wire(&raw),
        Err(RecordDecodeError::MissingStatusCode)
    );
}

// Outcomes

#[rstest]
#[case(AdmissionOutcome::Proceed, None, None)]
#[case(
    AdmissionOutcome::Retry(RetryReason::InProgress),
    Some(202),
    Some(REQUEST_IN_PROGRESS_MESSAGE)
)]
#[case(
    AdmissionOutcome::Reject(RejectReason::PayloadMismatch),
    Some(400),
    Some(PAYLOAD_MISMATCH_MESSAGE)
)]
#[case(AdmissionOutcome::Replay { status_code: 201, body: None }, Some(201), None)]
fn outcomes_map_to_status_and_message(
    #[case] outcome: AdmissionOutcome,
    #[case] status: Option<u16>,
    #[case] message: Option<&str>,
) {
    assert_eq!(outcome.status_code(), status);
    assert_eq!(outcome.message(), message);
}

#[rstest]
#[case(199, false)]
#[case(201, false)]
#[case(399, false)]
#[case(400, true)]
#[case(503, true)]
fn failure_threshold_is_400(#[case] status: u16, #[case] failed: bool) {
    assert_eq!(is_failure_status(status), failed);
}

// Configuration

struct MapEnv(HashMap<&'static str, &'static str>);

impl IdempotencyEnv for MapEnv {
    fn string(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|value| (*value).to_owned())
    }
}

fn env(pairs: &[(&'static str, &'static str)]) -> MapEnv {
    MapEnv(pairs.iter().copied().collect())
}

#[test]
fn config_defaults_apply_when_env_is_empty() {
    let config = IdempotencyConfig::from_env_with(&env(&[]));
    assert_eq!(config.ttl(), Duration::from_secs(3600));
    assert_eq!(config.cache_name(), IdempotencyConfig::DEFAULT_CACHE_NAME);
}

#[rstest]
#[case("120", 120)]
#[case(" 45 ", 45)]
#[case("0", 1)]
#[case("99999999", 604_800)]
#[case("soon", 3600)]
fn config_ttl_is_parsed_and_clamped(#[case] raw: &'static str, #[case] seconds: u64) {
    let config = IdempotencyConfig::from_env_with(&env(&[(IDEMPOTENCY_CACHE_TTL_SECONDS_ENV, raw)]));
    assert_eq!(config.ttl(), Duration::from_secs(seconds));
}

#[rstest]
#[case("orders", "orders")]
#[case("  ", IdempotencyConfig::DEFAULT_CACHE_NAME)]
fn config_cache_name_falls_back_when_blank(#[case] raw: &'static str, #[case] expected: &str) {
    let config = IdempotencyConfig::from_env_with(&env(&[(IDEMPOTENCY_CACHE_NAME_ENV, raw)]));
    assert_eq!(config.cache_name(), expected);
}
