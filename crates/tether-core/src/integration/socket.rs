//! Socket-mode envelopes.
//!
//! In socket mode every payload arrives wrapped in an envelope and must be
//! acknowledged by echoing its `envelope_id`. The websocket connection and
//! its reconnect loop belong to the host; a [`SocketModeClient`] only turns
//! one received text frame into the acknowledgement to send back.
//!
//! The platform expects the acknowledgement within a few seconds, so hosts
//! should hand frames to [`SocketModeClient::handle_envelope_with`] and send
//! the acknowledgement from its responder. That way a handler that responds
//! early and keeps working does not hold up the acknowledgement.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchResult;
use crate::responder::Responder;

/// One socket-mode frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Absent on `hello` and `disconnect` frames.
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: EnvelopeType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub accepts_response_payload: bool,
    #[serde(default)]
    pub retry_attempt: u32,
    #[serde(default)]
    pub retry_reason: Option<String>,
}

/// The `type` of a socket-mode frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeType {
    Hello,
    Disconnect,
    EventsApi,
    Interactive,
    SlashCommands,
    #[serde(other)]
    Unknown,
}

/// The frame sent back for an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub envelope_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Acknowledgement {
    /// An acknowledgement without a response payload.
    pub fn new(envelope_id: impl Into<String>) -> Self {
        Self {
            envelope_id: envelope_id.into(),
            payload: None,
        }
    }
}

/// Handles socket-mode frames.
#[async_trait]
pub trait SocketModeClient: Send + Sync {
    /// Processes one text frame, passing its acknowledgement to `ack` as soon
    /// as it is known.
    ///
    /// `ack` is called at most once. It is never called for frames that are
    /// not acknowledged (`hello`, `disconnect`).
    async fn handle_envelope_with(
        &self,
        frame: &str,
        ack: Responder<Acknowledgement>,
    ) -> DispatchResult<()>;

    /// Processes one text frame and returns its acknowledgement once the
    /// handlers are done.
    async fn handle_envelope(&self, frame: &str) -> DispatchResult<Option<Acknowledgement>> {
        let sent = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&sent);
        let ack = Responder::new(move |acknowledgement| {
            sink.lock().get_or_insert(acknowledgement);
            async { Ok(()) }
        });

        self.handle_envelope_with(frame, ack).await?;
        let acknowledgement = sent.lock().take();
        Ok(acknowledgement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "envelope_id": "e1",
            "type": "slash_commands",
            "payload": { "command": "/echo" },
            "accepts_response_payload": true
        }))
        .unwrap();

        assert_eq!(envelope.kind, EnvelopeType::SlashCommands);
        assert_eq!(envelope.envelope_id.as_deref(), Some("e1"));
        assert!(envelope.accepts_response_payload);
    }

    #[test]
    fn unknown_envelope_type_is_tolerated() {
        let envelope: Envelope =
            serde_json::from_value(json!({ "type": "something_new" })).unwrap();
        assert_eq!(envelope.kind, EnvelopeType::Unknown);
    }

    #[test]
    fn acknowledgement_omits_empty_payload() {
        assert_eq!(
            serde_json::to_value(Acknowledgement::new("e1")).unwrap(),
            json!({ "envelope_id": "e1" })
        );
    }
}
