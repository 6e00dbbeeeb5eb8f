//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{timestamp}.{payload}"` with the endpoint signing secret,
//! plus a timestamp window against replays.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` entry. Stripe sends several while a secret is being rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>[,v1=...][,v0=<legacy>]`.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    secret: Secret<String>,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
        }
    }

    /// Verifies the signature against the current time and parses the event.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_and_parse_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify_and_parse`](Self::verify_and_parse) with an explicit
    /// notion of "now" in Unix seconds.
    ///
    /// # Errors
    ///
    /// - `ParseError` - header or JSON payload malformed
    /// - `TimestampOutOfRange` - signed more than 5 minutes ago
    /// - `InvalidTimestamp` - signed in the future beyond skew tolerance
    /// - `InvalidSignature` - no v1 signature matches
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        validate_timestamp(header.timestamp, now)?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    let age = now - timestamp;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a `Stripe-Signature` header value for `payload`.
///
/// Used by local tooling and tests to produce deliveries the verifier accepts.
pub fn compute_signature_header(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, WebhookError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_704_067_200;

    fn signed(secret: &str, timestamp: i64, payload: &str) -> String {
        compute_signature_header(secret, timestamp, payload.as_bytes()).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_v1_only() {
        let header_str = format!("t=1234567890,v1={}", "a".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_header_collects_multiple_v1_and_ignores_v0() {
        let header_str = format!(
            "t=1234567890,v1={},v1={},v0={}",
            "a".repeat(64),
            "b".repeat(64),
            "c".repeat(64)
        );

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        let result = SignatureHeader::parse("t=1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        let result = SignatureHeader::parse("t=1234567890,v1=not_valid_hex");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_no_equals_fails() {
        let result = SignatureHeader::parse("t1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_test123","type":"checkout.session.completed","created":1704067200,"data":{"object":{}}}"#;
        let header = signed(TEST_SECRET, NOW, payload);

        let event = verifier
            .verify_and_parse_at(payload.as_bytes(), &header, NOW)
            .unwrap();

        assert_eq!(event.id, "evt_test123");
    }

    #[test]
    fn verify_accepts_any_matching_v1() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_roll","type":"x","created":1,"data":{"object":{}}}"#;
        let good = signed(TEST_SECRET, NOW, payload);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "0".repeat(64), good_sig);

        assert!(verifier
            .verify_and_parse_at(payload.as_bytes(), &header, NOW)
            .is_ok());
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = StripeWebhookVerifier::new("whsec_other");
        let payload = r#"{"id":"evt_test"}"#;
        let header = signed(TEST_SECRET, NOW, payload);

        let result = verifier.verify_and_parse_at(payload.as_bytes(), &header, NOW);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let header = signed(TEST_SECRET, NOW, r#"{"id":"evt_test"}"#);

        let result = verifier.verify_and_parse_at(br#"{"id":"evt_hacked"}"#, &header, NOW);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_invalid_json_fails_after_signature_check() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = "not valid json";
        let header = signed(TEST_SECRET, NOW, payload);

        let result = verifier.verify_and_parse_at(payload.as_bytes(), &header, NOW);

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_at_boundary_succeeds() {
        assert!(validate_timestamp(NOW - 300, NOW).is_ok());
    }

    #[test]
    fn timestamp_just_past_boundary_fails() {
        assert!(matches!(
            validate_timestamp(NOW - 301, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn timestamp_from_future_within_skew_succeeds() {
        assert!(validate_timestamp(NOW + 30, NOW).is_ok());
    }

    #[test]
    fn timestamp_from_future_beyond_skew_fails() {
        assert!(matches!(
            validate_timestamp(NOW + 120, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn stale_but_correctly_signed_event_is_rejected() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_old"}"#;
        let header = signed(TEST_SECRET, NOW - 600, payload);

        let result = verifier.verify_and_parse_at(payload.as_bytes(), &header, NOW);

        assert!(matches!(result, Err(WebhookError::TimestampOutOfRange)));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    proptest! {
        #[test]
        fn header_parsing_never_panics(header in ".{0,200}") {
            let _ = SignatureHeader::parse(&header);
        }

        #[test]
        fn signed_header_always_parses(timestamp in 0i64..4_000_000_000, body in ".{0,100}") {
            let header = signed(TEST_SECRET, timestamp, &body);
            let parsed = SignatureHeader::parse(&header).unwrap();
            prop_assert_eq!(parsed.timestamp, timestamp);
            prop_assert_eq!(parsed.v1_signatures.len(), 1);
        }
    }
}
