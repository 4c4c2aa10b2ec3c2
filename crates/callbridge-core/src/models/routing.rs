//! Call routing models
//!
//! Transient, per-call values: an inbound call event is classified into a
//! routing decision and turned into either a connection instruction or a
//! spoken fallback message. None of these are persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call progress events pushed back to the status callback for PSTN dials
pub const STATUS_CALLBACK_EVENTS: [&str; 4] = ["initiated", "ringing", "answered", "completed"];

/// How a destination should be dialed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Internal client identity registered with the telephony provider
    Client,
    /// Direct SIP URI
    Sip,
    /// Public telephone number
    Phone,
    /// No destination was supplied
    Unspecified,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Client => write!(f, "client"),
            TargetKind::Sip => write!(f, "sip"),
            TargetKind::Phone => write!(f, "phone"),
            TargetKind::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Inbound/outbound call event as delivered by the telephony provider.
///
/// `call_sid` is present only for provider-originated inbound calls; its
/// presence is what switches the router into inbound mode.
#[derive(Debug, Clone, Default)]
pub struct CallEvent {
    pub to: Option<String>,
    pub from: Option<String>,
    pub call_sid: Option<String>,
}

/// Routing decision produced by the classifier and caller-identity resolver.
///
/// Owned by the single call-handling invocation that created it; consumed
/// immediately to build a connection instruction, then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub target_kind: TargetKind,
    pub target_address: String,
    pub caller_id: String,
}

/// Status push-back target attached to PSTN dials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCallback {
    pub url: String,
    pub events: Vec<String>,
}

impl StatusCallback {
    /// Callback carrying the standard call progress events
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            events: STATUS_CALLBACK_EVENTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Declarative instruction telling the telephony provider how to connect a call
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInstruction {
    pub target_kind: TargetKind,
    pub target_address: String,
    pub caller_id: String,
    pub timeout_seconds: u32,
    pub answer_on_bridge: bool,
    pub status_callback: Option<StatusCallback>,
}

/// Spoken message played to the caller when no connection is attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpokenMessage {
    pub language: String,
    pub message: String,
}

/// Outcome of a routing decision: connect the call, or speak a fallback.
///
/// Routing is total; there is no error variant. Any condition that prevents
/// building an instruction degrades to a `Fallback`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    Connect(ConnectionInstruction),
    Fallback(SpokenMessage),
}

impl CallOutcome {
    /// The connection instruction, when one was produced
    pub fn instruction(&self) -> Option<&ConnectionInstruction> {
        match self {
            CallOutcome::Connect(instruction) => Some(instruction),
            CallOutcome::Fallback(_) => None,
        }
    }

    /// The fallback message, when no connection was attempted
    pub fn fallback(&self) -> Option<&SpokenMessage> {
        match self {
            CallOutcome::Connect(_) => None,
            CallOutcome::Fallback(message) => Some(message),
        }
    }
}
