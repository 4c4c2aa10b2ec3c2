//! Call routing
//!
//! Turns a raw call event into a declarative connection instruction (or a
//! spoken fallback). Three stages, leaf-first:
//!
//! 1. `classify_destination` - what kind of endpoint is being dialed
//! 2. `resolve_caller_id` - which identity to present to the far end
//! 3. `CallRouter::route` - orchestrates both and applies the inbound/outbound
//!    mode rules
//!
//! Routing is total: every event produces a renderable outcome, never an
//! error. The telephony configuration is injected at construction so the
//! router stays a pure function of its inputs.

use callbridge_core::config::TelephonyConfig;
use callbridge_core::models::{
    CallEvent, CallOutcome, ConnectionInstruction, RoutingDecision, SpokenMessage, StatusCallback,
    TargetKind,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::constants::{
    ANONYMOUS_CALLER, CLIENT_PREFIX, NO_DESTINATION_MESSAGE, NO_ONE_AVAILABLE_MESSAGE, SIP_PREFIX,
};

// International number: optional +, first digit 1-9, 2-15 digits total
static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").unwrap());

/// Classify a raw destination string.
///
/// Every input classifies; `Unspecified` is the only "no destination" signal.
/// Strings that match none of the recognized shapes are treated as bare
/// client identifiers. That fallback is deliberate: it silently accepts
/// malformed destinations as client names rather than rejecting the call.
pub fn classify_destination(to: Option<&str>) -> (TargetKind, String) {
    let to = match to {
        Some(value) if !value.is_empty() => value,
        _ => return (TargetKind::Unspecified, String::new()),
    };

    if let Some(client) = to.strip_prefix(CLIENT_PREFIX) {
        (TargetKind::Client, client.to_string())
    } else if to.starts_with(SIP_PREFIX) {
        (TargetKind::Sip, to.to_string())
    } else if PHONE_NUMBER.is_match(to) {
        (TargetKind::Phone, to.to_string())
    } else {
        (TargetKind::Client, to.to_string())
    }
}

/// Result of caller-identity resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdResolution {
    /// The identity presented to the far end
    pub caller_id: String,
    /// Set when a PSTN call proceeds without a verified caller ID;
    /// the provider may reject such calls
    pub unverified_pstn: bool,
}

/// Choose the caller ID to present for the classified target.
///
/// Two stages: an identity-aware fallback (internal client identities are not
/// real phone numbers, so swap in the verified number when one exists), then
/// a target-aware override (PSTN calls must present a verified number).
pub fn resolve_caller_id(
    from: &str,
    target_kind: TargetKind,
    verified_caller_id: Option<&str>,
) -> CallerIdResolution {
    let resolved = if from.starts_with(CLIENT_PREFIX) {
        verified_caller_id.unwrap_or(from)
    } else {
        from
    };

    if target_kind == TargetKind::Phone {
        match verified_caller_id {
            Some(verified) => CallerIdResolution {
                caller_id: verified.to_string(),
                unverified_pstn: false,
            },
            None => CallerIdResolution {
                caller_id: resolved.to_string(),
                unverified_pstn: true,
            },
        }
    } else {
        CallerIdResolution {
            caller_id: resolved.to_string(),
            unverified_pstn: false,
        }
    }
}

/// Call router
///
/// Produces connection instructions for the telephony provider. Holds no
/// mutable state; safe to share across concurrent call handlers.
#[derive(Debug, Clone)]
pub struct CallRouter {
    config: TelephonyConfig,
}

impl CallRouter {
    /// Create a router with the given telephony configuration
    pub fn new(config: TelephonyConfig) -> Self {
        Self { config }
    }

    /// Route a call event to an outcome.
    ///
    /// A present `call_sid` switches the router into inbound mode, where only
    /// client targets are dialed; anything else hears the "no one available"
    /// message. Outbound events with no destination hear "no destination".
    pub fn route(&self, event: &CallEvent) -> CallOutcome {
        let from = event.from.as_deref().unwrap_or(ANONYMOUS_CALLER);
        let (target_kind, target_address) = classify_destination(event.to.as_deref());

        debug!(%target_kind, %target_address, "Classified call destination");

        if let Some(call_sid) = event.call_sid.as_deref() {
            // Inbound provider-originated call; sid and caller are logged for
            // audit but never persisted here
            info!(call_sid, from, %target_kind, "Handling inbound call");

            if target_kind != TargetKind::Client {
                return self.fallback(NO_ONE_AVAILABLE_MESSAGE);
            }

            return self.connect(target_kind, target_address, from);
        }

        if target_kind == TargetKind::Unspecified {
            return self.fallback(NO_DESTINATION_MESSAGE);
        }

        self.connect(target_kind, target_address, from)
    }

    /// Build the spoken fallback played when no connection is attempted
    pub fn fallback(&self, message: &str) -> CallOutcome {
        CallOutcome::Fallback(SpokenMessage {
            language: self.config.voice_language.clone(),
            message: message.to_string(),
        })
    }

    fn connect(&self, target_kind: TargetKind, target_address: String, from: &str) -> CallOutcome {
        let resolution =
            resolve_caller_id(from, target_kind, self.config.verified_caller_id.as_deref());

        if resolution.unverified_pstn {
            warn!(
                caller_id = %resolution.caller_id,
                "No verified caller ID configured for PSTN call; provider may reject it"
            );
        }

        let decision = RoutingDecision {
            target_kind,
            target_address,
            caller_id: resolution.caller_id,
        };

        info!(
            target_kind = %decision.target_kind,
            target_address = %decision.target_address,
            caller_id = %decision.caller_id,
            "Connecting call"
        );

        // Status push-backs only make sense for PSTN legs
        let status_callback = if target_kind == TargetKind::Phone {
            self.config
                .status_callback_url
                .as_deref()
                .map(StatusCallback::new)
        } else {
            None
        };

        CallOutcome::Connect(ConnectionInstruction {
            target_kind: decision.target_kind,
            target_address: decision.target_address,
            caller_id: decision.caller_id,
            timeout_seconds: self.config.dial_timeout_secs,
            answer_on_bridge: true,
            status_callback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(verified: Option<&str>, callback: Option<&str>) -> CallRouter {
        CallRouter::new(TelephonyConfig {
            verified_caller_id: verified.map(str::to_string),
            status_callback_url: callback.map(str::to_string),
            ..TelephonyConfig::default()
        })
    }

    #[test]
    fn test_classify_client_prefix() {
        let (kind, address) = classify_destination(Some("client:alice"));
        assert_eq!(kind, TargetKind::Client);
        assert_eq!(address, "alice");
    }

    #[test]
    fn test_classify_sip() {
        let (kind, address) = classify_destination(Some("sip:bob@example.com"));
        assert_eq!(kind, TargetKind::Sip);
        // Full URI retained
        assert_eq!(address, "sip:bob@example.com");
    }

    #[test]
    fn test_classify_phone() {
        let (kind, address) = classify_destination(Some("+14155551234"));
        assert_eq!(kind, TargetKind::Phone);
        assert_eq!(address, "+14155551234");

        let (kind, _) = classify_destination(Some("14155551234"));
        assert_eq!(kind, TargetKind::Phone);
    }

    #[test]
    fn test_classify_rejects_bad_numbers() {
        // Leading zero is not a valid international number
        let (kind, _) = classify_destination(Some("+0123456"));
        assert_eq!(kind, TargetKind::Client);

        // Too short (a single digit)
        let (kind, _) = classify_destination(Some("7"));
        assert_eq!(kind, TargetKind::Client);

        // Too long (16 digits)
        let (kind, _) = classify_destination(Some("1234567890123456"));
        assert_eq!(kind, TargetKind::Client);
    }

    #[test]
    fn test_classify_bare_identifier_falls_back_to_client() {
        let (kind, address) = classify_destination(Some("abc"));
        assert_eq!(kind, TargetKind::Client);
        assert_eq!(address, "abc");
    }

    #[test]
    fn test_classify_empty_is_unspecified() {
        assert_eq!(classify_destination(None).0, TargetKind::Unspecified);
        assert_eq!(classify_destination(Some("")).0, TargetKind::Unspecified);
    }

    #[test]
    fn test_resolve_client_caller_without_verified_number() {
        let resolution = resolve_caller_id("client:alice", TargetKind::Phone, None);
        assert_eq!(resolution.caller_id, "client:alice");
        assert!(resolution.unverified_pstn);
    }

    #[test]
    fn test_resolve_client_caller_with_verified_number() {
        let resolution =
            resolve_caller_id("client:alice", TargetKind::Phone, Some("+14155550100"));
        assert_eq!(resolution.caller_id, "+14155550100");
        assert!(!resolution.unverified_pstn);
    }

    #[test]
    fn test_resolve_client_target_keeps_identity() {
        // Non-PSTN targets take the resolved value as-is
        let resolution = resolve_caller_id("+14155550123", TargetKind::Client, None);
        assert_eq!(resolution.caller_id, "+14155550123");
        assert!(!resolution.unverified_pstn);

        // Client identity swaps to the verified number even for client targets
        let resolution =
            resolve_caller_id("client:alice", TargetKind::Client, Some("+14155550100"));
        assert_eq!(resolution.caller_id, "+14155550100");
    }

    #[test]
    fn test_route_no_destination() {
        let outcome = router(None, None).route(&CallEvent::default());

        let message = outcome.fallback().expect("expected fallback");
        assert_eq!(message.message, "No destination specified.");
        assert_eq!(message.language, "en-US");
        assert!(outcome.instruction().is_none());
    }

    #[test]
    fn test_route_outbound_client() {
        let event = CallEvent {
            to: Some("client:bob".to_string()),
            from: Some("client:alice".to_string()),
            call_sid: None,
        };
        let outcome = router(None, None).route(&event);

        let instruction = outcome.instruction().expect("expected connect");
        assert_eq!(instruction.target_kind, TargetKind::Client);
        assert_eq!(instruction.target_address, "bob");
        assert_eq!(instruction.caller_id, "client:alice");
        assert_eq!(instruction.timeout_seconds, 20);
        assert!(instruction.answer_on_bridge);
        assert!(instruction.status_callback.is_none());
    }

    #[test]
    fn test_route_outbound_phone_with_callback() {
        let event = CallEvent {
            to: Some("+14155551234".to_string()),
            from: Some("client:alice".to_string()),
            call_sid: None,
        };
        let outcome = router(
            Some("+14155550100"),
            Some("https://example.com/voice/status"),
        )
        .route(&event);

        let instruction = outcome.instruction().expect("expected connect");
        assert_eq!(instruction.target_kind, TargetKind::Phone);
        assert_eq!(instruction.caller_id, "+14155550100");

        let callback = instruction.status_callback.as_ref().expect("callback");
        assert_eq!(callback.url, "https://example.com/voice/status");
        assert_eq!(
            callback.events,
            vec!["initiated", "ringing", "answered", "completed"]
        );
    }

    #[test]
    fn test_route_phone_without_verified_number_still_connects() {
        let event = CallEvent {
            to: Some("+14155551234".to_string()),
            from: Some("client:alice".to_string()),
            call_sid: None,
        };
        let outcome = router(None, None).route(&event);

        // Degrades to the raw identity instead of failing the call
        let instruction = outcome.instruction().expect("expected connect");
        assert_eq!(instruction.caller_id, "client:alice");
    }

    #[test]
    fn test_route_missing_from_defaults_to_anonymous() {
        let event = CallEvent {
            to: Some("client:bob".to_string()),
            from: None,
            call_sid: None,
        };
        let outcome = router(None, None).route(&event);

        let instruction = outcome.instruction().expect("expected connect");
        assert_eq!(instruction.caller_id, "client:anonymous");
    }

    #[test]
    fn test_route_inbound_client_connects() {
        let event = CallEvent {
            to: Some("client:support".to_string()),
            from: Some("+14155559999".to_string()),
            call_sid: Some("CA1234567890abcdef".to_string()),
        };
        let outcome = router(None, None).route(&event);

        let instruction = outcome.instruction().expect("expected connect");
        assert_eq!(instruction.target_kind, TargetKind::Client);
        assert_eq!(instruction.target_address, "support");
    }

    #[test]
    fn test_route_inbound_non_client_gets_no_one_available() {
        let event = CallEvent {
            to: Some("+14155551234".to_string()),
            from: Some("+14155559999".to_string()),
            call_sid: Some("CA1234567890abcdef".to_string()),
        };
        let outcome = router(Some("+14155550100"), None).route(&event);

        let message = outcome.fallback().expect("expected fallback");
        assert!(message.message.contains("No one is available"));
    }

    #[test]
    fn test_route_inbound_unspecified_gets_no_one_available() {
        let event = CallEvent {
            to: None,
            from: Some("+14155559999".to_string()),
            call_sid: Some("CA1234567890abcdef".to_string()),
        };
        let outcome = router(None, None).route(&event);

        assert!(outcome.fallback().is_some());
    }
}
