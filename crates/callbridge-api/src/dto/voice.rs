//! Voice webhook DTOs
//!
//! The telephony provider posts form-encoded fields with PascalCase names.

use callbridge_core::models::CallEvent;
use serde::Deserialize;

/// Inbound/outbound voice webhook payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceRequest {
    /// Destination to dial
    #[serde(rename = "To")]
    pub to: Option<String>,

    /// Caller identity
    #[serde(rename = "From")]
    pub from: Option<String>,

    /// Provider call-session identifier; present only on inbound calls
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

impl From<VoiceRequest> for CallEvent {
    fn from(req: VoiceRequest) -> Self {
        Self {
            to: req.to.filter(|t| !t.is_empty()),
            from: req.from.filter(|f| !f.is_empty()),
            call_sid: req.call_sid.filter(|s| !s.is_empty()),
        }
    }
}

/// Call-status push-back payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusCallbackRequest {
    /// Provider call-session identifier
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,

    /// Reported call status (initiated, ringing, answered, completed, ...)
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_request_field_renames() {
        let req: VoiceRequest = serde_json::from_value(serde_json::json!({
            "To": "client:bob",
            "From": "client:alice",
            "CallSid": "CA1234567890abcdef",
        }))
        .unwrap();

        assert_eq!(req.to.as_deref(), Some("client:bob"));
        assert_eq!(req.from.as_deref(), Some("client:alice"));
        assert_eq!(req.call_sid.as_deref(), Some("CA1234567890abcdef"));
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let req: VoiceRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.to.is_none());
        assert!(req.from.is_none());
        assert!(req.call_sid.is_none());
    }

    #[test]
    fn test_empty_strings_become_absent_fields() {
        let req = VoiceRequest {
            to: Some(String::new()),
            from: Some(String::new()),
            call_sid: Some(String::new()),
        };
        let event = CallEvent::from(req);
        assert!(event.to.is_none());
        assert!(event.from.is_none());
        assert!(event.call_sid.is_none());
    }
}
