//! Cross-context reporting protocol
//!
//! The rendering context (producer) and the controlling panel (consumers)
//! share nothing but these message shapes. Messages travel as an
//! [`Envelope`]: an event name plus a JSON payload, so any number of
//! independent consumers can read the same channel and ignore what they
//! do not understand.

use crate::error::ProtocolError;
use crate::report::{AuditMeta, ReportOutcome, ReportStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Addon namespace
pub const ADDON_ID: &str = "accesslint/a11y";
/// Panel registration id
pub const PANEL_ID: &str = "accesslint/a11y/panel";
/// Test-provider registration id
pub const TEST_PROVIDER_ID: &str = "accesslint/a11y/test-provider";
/// Status type id for sidebar dots
pub const STATUS_TYPE_ID: &str = "accesslint/a11y/status";

/// Producer → consumers: one audit outcome
pub const RESULT_EVENT: &str = "accesslint/a11y/result";
/// Producer → consumers: legacy aggregate summary
pub const META_EVENT: &str = "accesslint/a11y/meta";
/// Consumer → overlay: show highlight
pub const HIGHLIGHT_ADD_EVENT: &str = "accesslint/a11y/highlight/add";
/// Consumer → overlay: remove highlight
pub const HIGHLIGHT_REMOVE_EVENT: &str = "accesslint/a11y/highlight/remove";

/// Payload of [`RESULT_EVENT`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    /// Story the result belongs to, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    /// Audit outcome
    pub result: ReportOutcome,
    /// Verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

/// Inline style applied to highlighted elements
pub type HighlightStyle = BTreeMap<String, String>;

/// Payload of [`HIGHLIGHT_ADD_EVENT`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// Overlay id; one id is reused so requests supersede each other
    pub id: String,
    /// Local (non-piercing) selectors
    pub selectors: Vec<String>,
    /// Style applied to matches
    #[serde(default, alias = "styles")]
    pub style: HighlightStyle,
}

/// Payload of [`HIGHLIGHT_REMOVE_EVENT`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRemoval {
    /// Overlay id to remove
    pub id: String,
}

/// Raw message on the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name
    pub event: String,
    /// JSON payload
    pub payload: serde_json::Value,
}

/// Typed protocol message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Audit outcome for one story
    Result(ResultPayload),
    /// Aggregate summary
    Meta(AuditMeta),
    /// Show highlight
    HighlightAdd(HighlightRequest),
    /// Remove highlight
    HighlightRemove(HighlightRemoval),
}

impl Message {
    /// Event name this message travels under
    #[must_use]
    pub fn event(&self) -> &'static str {
        match self {
            Self::Result(_) => RESULT_EVENT,
            Self::Meta(_) => META_EVENT,
            Self::HighlightAdd(_) => HIGHLIGHT_ADD_EVENT,
            Self::HighlightRemove(_) => HIGHLIGHT_REMOVE_EVENT,
        }
    }

    /// Encode into an envelope
    ///
    /// # Errors
    /// `ProtocolError::MalformedPayload` if the payload cannot be serialized
    pub fn encode(&self) -> Result<Envelope, ProtocolError> {
        let event = self.event();
        let payload = match self {
            Self::Result(p) => serde_json::to_value(p),
            Self::Meta(m) => serde_json::to_value(m),
            Self::HighlightAdd(r) => serde_json::to_value(r),
            Self::HighlightRemove(r) => serde_json::to_value(r),
        }
        .map_err(|source| ProtocolError::MalformedPayload {
            event: event.to_string(),
            source,
        })?;

        Ok(Envelope {
            event: event.to_string(),
            payload,
        })
    }

    /// Decode an envelope
    ///
    /// # Errors
    /// - `ProtocolError::UnknownEvent` for events outside this protocol
    /// - `ProtocolError::MalformedPayload` when the payload shape is wrong
    ///   (e.g. a result without `result`)
    pub fn decode(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let malformed = |source: serde_json::Error| ProtocolError::MalformedPayload {
            event: envelope.event.clone(),
            source,
        };
        let payload = envelope.payload.clone();
        match envelope.event.as_str() {
            RESULT_EVENT => serde_json::from_value(payload)
                .map(Self::Result)
                .map_err(malformed),
            META_EVENT => serde_json::from_value(payload)
                .map(Self::Meta)
                .map_err(malformed),
            HIGHLIGHT_ADD_EVENT => serde_json::from_value(payload)
                .map(Self::HighlightAdd)
                .map_err(malformed),
            HIGHLIGHT_REMOVE_EVENT => serde_json::from_value(payload)
                .map(Self::HighlightRemove)
                .map_err(malformed),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{AuditResult, SkippedAudit};
    use serde_json::json;

    #[test]
    fn result_payload_omits_absent_story() {
        let msg = Message::Result(ResultPayload {
            story_id: None,
            result: ReportOutcome::Audited(AuditResult::clean(4)),
            status: Some(ReportStatus::Passed),
        });
        let env = msg.encode().unwrap();
        assert_eq!(env.event, RESULT_EVENT);
        assert_eq!(
            env.payload,
            json!({ "result": { "violations": [], "ruleCount": 4 }, "status": "passed" })
        );
        assert_eq!(Message::decode(&env).unwrap(), msg);
    }

    #[test]
    fn result_without_result_field_is_malformed() {
        let env = Envelope {
            event: RESULT_EVENT.to_string(),
            payload: json!({ "storyId": "button--primary" }),
        };
        let err = Message::decode(&env).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPayload { .. }));
        assert!(!err.is_foreign());
    }

    #[test]
    fn foreign_event_is_reported_as_unknown() {
        let env = Envelope {
            event: "storybook/docs/render".to_string(),
            payload: json!({}),
        };
        assert!(Message::decode(&env).unwrap_err().is_foreign());
    }

    #[test]
    fn unknown_event_in_own_namespace_is_not_foreign() {
        let env = Envelope {
            event: format!("{ADDON_ID}/results"),
            payload: json!([]),
        };
        let err = Message::decode(&env).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownEvent(_)));
        assert!(!err.is_foreign());
    }

    #[test]
    fn highlight_accepts_styles_alias() {
        let env = Envelope {
            event: HIGHLIGHT_ADD_EVENT.to_string(),
            payload: json!({
                "id": "accesslint",
                "selectors": ["#a"],
                "styles": { "outline": "2px solid red" }
            }),
        };
        let Message::HighlightAdd(req) = Message::decode(&env).unwrap() else {
            panic!("expected highlight add");
        };
        assert_eq!(req.style["outline"], "2px solid red");
    }

    #[test]
    fn skipped_result_round_trips_through_envelope() {
        let msg = Message::Result(ResultPayload {
            story_id: Some("card--wip".into()),
            result: ReportOutcome::Skipped(SkippedAudit::new("no-a11y")),
            status: Some(ReportStatus::Passed),
        });
        let env = msg.encode().unwrap();
        assert_eq!(env.payload["result"]["skipped"], true);
        assert_eq!(env.payload["storyId"], "card--wip");
    }
}
