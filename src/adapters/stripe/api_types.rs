//! Stripe REST response bodies.
//!
//! Only the fields the gate reads are modelled; everything else in the
//! response is ignored by serde.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,

    /// Hosted payment page. Absent only for embedded sessions.
    #[serde(default)]
    pub url: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_tolerates_missing_fields() {
        let body: StripeErrorBody =
            serde_json::from_str(r#"{"error":{"type":"invalid_request_error"}}"#).unwrap();
        assert_eq!(body.error.error_type.as_deref(), Some("invalid_request_error"));
        assert!(body.error.message.is_none());
    }

    #[test]
    fn checkout_session_reads_hosted_url() {
        let session: StripeCheckoutSession = serde_json::from_str(
            r#"{"id":"cs_test_1","object":"checkout.session","url":"https://checkout.stripe.com/c/pay/cs_test_1"}"#,
        )
        .unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert!(session.url.unwrap().starts_with("https://checkout.stripe.com"));
    }
}
