//! The unit of work handed to the dispatcher and what it hands back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::command::SlashCommand;
use super::event::EventCallback;
use super::interaction::{BlockOptionsRequest, InteractionPayload, OptionsRequest};
use super::response::{
    BlockOptionsResponse, DialogError, MessageResponse, OptionsResponse, SlashCommandResponse,
    ViewSubmissionResponse,
};

/// The `url_verification` handshake sent when an events URL is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlVerification {
    pub challenge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Payload family of a raw inbound JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// `event_callback`.
    EventCallback,
    /// `url_verification`.
    UrlVerification,
    /// Anything posted to the interactivity URL except option loads.
    Interaction,
    /// `block_suggestion`.
    BlockSuggestion,
    /// Legacy `interactive_message` / `dialog_suggestion` option loads.
    LegacyOptions,
    /// A slash command form body.
    SlashCommand,
}

/// One inbound payload, already decoded.
#[derive(Debug, Clone)]
pub enum InboundRequest {
    Event(EventCallback),
    UrlVerification(UrlVerification),
    Interaction(InteractionPayload),
    BlockOptions(BlockOptionsRequest),
    LegacyOptions(OptionsRequest),
    SlashCommand(SlashCommand),
}

impl InboundRequest {
    /// Decodes `value` as a payload of the given family.
    pub fn decode(kind: PayloadKind, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            PayloadKind::EventCallback => Self::Event(serde_json::from_value(value)?),
            PayloadKind::UrlVerification => Self::UrlVerification(serde_json::from_value(value)?),
            PayloadKind::Interaction => Self::Interaction(serde_json::from_value(value)?),
            PayloadKind::BlockSuggestion => Self::BlockOptions(serde_json::from_value(value)?),
            PayloadKind::LegacyOptions => Self::LegacyOptions(serde_json::from_value(value)?),
            PayloadKind::SlashCommand => Self::SlashCommand(serde_json::from_value(value)?),
        })
    }

    /// Short label used in logs and spans.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Event(_) => "event_callback",
            Self::UrlVerification(_) => "url_verification",
            Self::Interaction(payload) => payload.payload_type(),
            Self::BlockOptions(_) => "block_suggestion",
            Self::LegacyOptions(_) => "options",
            Self::SlashCommand(_) => "slash_command",
        }
    }
}

impl From<EventCallback> for InboundRequest {
    fn from(callback: EventCallback) -> Self {
        Self::Event(callback)
    }
}

impl From<InteractionPayload> for InboundRequest {
    fn from(payload: InteractionPayload) -> Self {
        Self::Interaction(payload)
    }
}

impl From<SlashCommand> for InboundRequest {
    fn from(command: SlashCommand) -> Self {
        Self::SlashCommand(command)
    }
}

/// The synchronous answer to an inbound payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DispatchResponse {
    /// Plain acknowledgement with an empty body.
    #[default]
    Ack,
    /// Echo of a `url_verification` challenge.
    Challenge(String),
    BlockOptions(BlockOptionsResponse),
    ViewSubmission(ViewSubmissionResponse),
    SlashCommand(SlashCommandResponse),
    Message(MessageResponse),
    Options(OptionsResponse),
    /// Validation errors for a legacy dialog; empty means accepted.
    DialogErrors(Vec<DialogError>),
}

impl DispatchResponse {
    /// The response body, or `None` when an empty acknowledgement suffices.
    pub fn body(&self) -> serde_json::Result<Option<Value>> {
        let value = match self {
            Self::Ack => return Ok(None),
            Self::Challenge(challenge) => serde_json::json!({ "challenge": challenge }),
            Self::BlockOptions(r) => serde_json::to_value(r)?,
            Self::ViewSubmission(r) => serde_json::to_value(r)?,
            Self::SlashCommand(r) => serde_json::to_value(r)?,
            Self::Message(r) => serde_json::to_value(r)?,
            Self::Options(r) => serde_json::to_value(r)?,
            Self::DialogErrors(errors) if errors.is_empty() => return Ok(None),
            Self::DialogErrors(errors) => serde_json::json!({ "errors": errors }),
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_selects_family() {
        let request = InboundRequest::decode(
            PayloadKind::SlashCommand,
            json!({ "command": "/echo", "text": "hi" }),
        )
        .unwrap();
        assert_eq!(request.kind(), "slash_command");
        assert!(matches!(request, InboundRequest::SlashCommand(ref c) if c.command == "/echo"));
    }

    #[test]
    fn response_bodies() {
        assert_eq!(DispatchResponse::Ack.body().unwrap(), None);
        assert_eq!(DispatchResponse::DialogErrors(Vec::new()).body().unwrap(), None);
        assert_eq!(
            DispatchResponse::Challenge("abc".into()).body().unwrap(),
            Some(json!({ "challenge": "abc" }))
        );
        assert_eq!(
            DispatchResponse::DialogErrors(vec![DialogError::new("email", "bad")])
                .body()
                .unwrap(),
            Some(json!({ "errors": [{ "name": "email", "error": "bad" }] }))
        );
    }
}
