//! Call-control document rendering
//!
//! Serializes a routing outcome into the TwiML-style XML document the
//! telephony provider consumes. Rendering is total: any outcome, including
//! a malformed instruction, produces a playable document rather than an
//! error reaching the far end.

use callbridge_core::models::{CallOutcome, ConnectionInstruction, SpokenMessage, TargetKind};

/// Language used when an outcome carries no usable language of its own
const FALLBACK_LANGUAGE: &str = "en-US";

/// Apology played when an instruction cannot be rendered as a dial
const APOLOGY_MESSAGE: &str = "An application error has occurred. Goodbye.";

/// A dialable endpoint inside a `Dial` verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialTarget {
    /// Internal client identity
    Client(String),
    /// SIP URI
    Sip(String),
    /// PSTN number, optionally with status push-backs
    Number {
        /// The number to dial
        number: String,
        /// Status callback URL, when configured
        status_callback: Option<String>,
        /// Events pushed to the callback
        events: Vec<String>,
    },
}

/// A single instruction verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Speak a message to the caller
    Say {
        /// Spoken language tag (e.g. "en-US")
        language: String,
        /// The message text
        message: String,
    },
    /// Connect the caller to a target
    Dial {
        /// Caller ID presented to the far end
        caller_id: String,
        /// Seconds to ring before giving up
        timeout_seconds: u32,
        /// Only bridge audio once the far end answers
        answer_on_bridge: bool,
        /// The endpoint to dial
        target: DialTarget,
    },
}

/// An ordered call-control document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwimlDocument {
    verbs: Vec<Verb>,
}

impl TwimlDocument {
    /// Empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `Say` verb
    pub fn say(mut self, language: impl Into<String>, message: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            language: language.into(),
            message: message.into(),
        });
        self
    }

    /// Append a `Dial` verb
    pub fn dial(
        mut self,
        caller_id: impl Into<String>,
        timeout_seconds: u32,
        answer_on_bridge: bool,
        target: DialTarget,
    ) -> Self {
        self.verbs.push(Verb::Dial {
            caller_id: caller_id.into(),
            timeout_seconds,
            answer_on_bridge,
            target,
        });
        self
    }

    /// Render the document as XML
    pub fn render(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);

        for verb in &self.verbs {
            match verb {
                Verb::Say { language, message } => {
                    xml.push_str(&format!(
                        r#"<Say language="{}">{}</Say>"#,
                        escape(language),
                        escape(message)
                    ));
                }
                Verb::Dial {
                    caller_id,
                    timeout_seconds,
                    answer_on_bridge,
                    target,
                } => {
                    xml.push_str(&format!(
                        r#"<Dial callerId="{}" timeout="{}" answerOnBridge="{}">"#,
                        escape(caller_id),
                        timeout_seconds,
                        answer_on_bridge
                    ));
                    match target {
                        DialTarget::Client(name) => {
                            xml.push_str(&format!("<Client>{}</Client>", escape(name)));
                        }
                        DialTarget::Sip(uri) => {
                            xml.push_str(&format!("<Sip>{}</Sip>", escape(uri)));
                        }
                        DialTarget::Number {
                            number,
                            status_callback,
                            events,
                        } => match status_callback {
                            Some(url) => xml.push_str(&format!(
                                r#"<Number statusCallback="{}" statusCallbackEvent="{}" statusCallbackMethod="POST">{}</Number>"#,
                                escape(url),
                                escape(&events.join(" ")),
                                escape(number)
                            )),
                            None => {
                                xml.push_str(&format!("<Number>{}</Number>", escape(number)));
                            }
                        },
                    }
                    xml.push_str("</Dial>");
                }
            }
        }

        xml.push_str("</Response>");
        xml
    }
}

impl From<&SpokenMessage> for TwimlDocument {
    fn from(message: &SpokenMessage) -> Self {
        TwimlDocument::new().say(&message.language, &message.message)
    }
}

impl From<&CallOutcome> for TwimlDocument {
    fn from(outcome: &CallOutcome) -> Self {
        match outcome {
            CallOutcome::Fallback(message) => message.into(),
            CallOutcome::Connect(instruction) => match dial_target(instruction) {
                Some(target) => TwimlDocument::new().dial(
                    &instruction.caller_id,
                    instruction.timeout_seconds,
                    instruction.answer_on_bridge,
                    target,
                ),
                // An instruction with no dialable target degrades to an
                // audible apology, never a protocol error
                None => TwimlDocument::new().say(FALLBACK_LANGUAGE, APOLOGY_MESSAGE),
            },
        }
    }
}

fn dial_target(instruction: &ConnectionInstruction) -> Option<DialTarget> {
    match instruction.target_kind {
        TargetKind::Client => Some(DialTarget::Client(instruction.target_address.clone())),
        TargetKind::Sip => Some(DialTarget::Sip(instruction.target_address.clone())),
        TargetKind::Phone => Some(DialTarget::Number {
            number: instruction.target_address.clone(),
            status_callback: instruction
                .status_callback
                .as_ref()
                .map(|cb| cb.url.clone()),
            events: instruction
                .status_callback
                .as_ref()
                .map(|cb| cb.events.clone())
                .unwrap_or_default(),
        }),
        TargetKind::Unspecified => None,
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use callbridge_core::models::StatusCallback;

    #[test]
    fn test_render_say() {
        let xml = TwimlDocument::new()
            .say("en-US", "No destination specified.")
            .render();

        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Say language="en-US">No destination specified.</Say></Response>"#
        );
    }

    #[test]
    fn test_render_client_dial() {
        let xml = TwimlDocument::new()
            .dial("client:alice", 20, true, DialTarget::Client("bob".to_string()))
            .render();

        assert!(xml.contains(r#"<Dial callerId="client:alice" timeout="20" answerOnBridge="true">"#));
        assert!(xml.contains("<Client>bob</Client>"));
    }

    #[test]
    fn test_render_number_with_status_callback() {
        let xml = TwimlDocument::new()
            .dial(
                "+14155550100",
                20,
                true,
                DialTarget::Number {
                    number: "+14155551234".to_string(),
                    status_callback: Some("https://example.com/voice/status".to_string()),
                    events: vec![
                        "initiated".to_string(),
                        "ringing".to_string(),
                        "answered".to_string(),
                        "completed".to_string(),
                    ],
                },
            )
            .render();

        assert!(xml.contains(r#"statusCallback="https://example.com/voice/status""#));
        assert!(xml.contains(r#"statusCallbackEvent="initiated ringing answered completed""#));
        assert!(xml.contains(r#"statusCallbackMethod="POST""#));
        assert!(xml.contains("<Number"));
        assert!(xml.contains("+14155551234"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let xml = TwimlDocument::new()
            .say("en-US", r#"Tom & Jerry <say> "hi""#)
            .render();

        assert!(xml.contains("Tom &amp; Jerry &lt;say&gt; &quot;hi&quot;"));
    }

    #[test]
    fn test_outcome_conversion_for_sip() {
        let outcome = CallOutcome::Connect(ConnectionInstruction {
            target_kind: TargetKind::Sip,
            target_address: "sip:bob@example.com".to_string(),
            caller_id: "client:alice".to_string(),
            timeout_seconds: 20,
            answer_on_bridge: true,
            status_callback: None,
        });

        let xml = TwimlDocument::from(&outcome).render();
        assert!(xml.contains("<Sip>sip:bob@example.com</Sip>"));
    }

    #[test]
    fn test_outcome_conversion_phone_carries_callback() {
        let outcome = CallOutcome::Connect(ConnectionInstruction {
            target_kind: TargetKind::Phone,
            target_address: "+14155551234".to_string(),
            caller_id: "+14155550100".to_string(),
            timeout_seconds: 20,
            answer_on_bridge: true,
            status_callback: Some(StatusCallback::new("https://example.com/voice/status")),
        });

        let xml = TwimlDocument::from(&outcome).render();
        assert!(xml.contains(r#"statusCallbackEvent="initiated ringing answered completed""#));
    }

    #[test]
    fn test_unrenderable_instruction_degrades_to_apology() {
        let outcome = CallOutcome::Connect(ConnectionInstruction {
            target_kind: TargetKind::Unspecified,
            target_address: String::new(),
            caller_id: String::new(),
            timeout_seconds: 20,
            answer_on_bridge: true,
            status_callback: None,
        });

        let xml = TwimlDocument::from(&outcome).render();
        assert!(xml.contains("An application error has occurred."));
        assert!(!xml.contains("<Dial"));
    }
}
