//! Socket-mode envelope handling on top of the dispatcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use tether_core::{
    Acknowledgement, DispatchError, DispatchResponse, DispatchResult, Envelope, EnvelopeType,
    InboundRequest, PayloadKind, Responder, SocketModeClient,
};

use crate::dispatcher::Dispatcher;

/// Unwraps socket-mode envelopes and dispatches their payloads.
///
/// Every dispatched envelope is acknowledged exactly once, carrying the
/// handler's response when the envelope accepts one.
#[derive(Debug, Clone)]
pub struct DefaultSocketModeClient {
    dispatcher: Dispatcher,
}

impl DefaultSocketModeClient {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl SocketModeClient for DefaultSocketModeClient {
    /// Sends the acknowledgement through `ack` as soon as a handler responds.
    async fn handle_envelope_with(
        &self,
        frame: &str,
        ack: Responder<Acknowledgement>,
    ) -> DispatchResult<()> {
        let envelope: Envelope = serde_json::from_str(frame)?;

        let request = match envelope.kind {
            EnvelopeType::Hello => {
                info!("Socket mode connection established");
                return Ok(());
            }
            EnvelopeType::Disconnect => {
                info!(payload = %envelope.payload, "Socket mode disconnect requested");
                return Ok(());
            }
            EnvelopeType::Unknown => {
                debug!(payload = %envelope.payload, "Acknowledging unknown envelope");
                return match envelope.envelope_id {
                    Some(id) => ack
                        .respond(Acknowledgement::new(id))
                        .await
                        .map_err(DispatchError::Handler),
                    None => Ok(()),
                };
            }
            EnvelopeType::SlashCommands => {
                InboundRequest::decode(PayloadKind::SlashCommand, envelope.payload)?
            }
            EnvelopeType::EventsApi | EnvelopeType::Interactive => {
                self.dispatcher.decode(envelope.payload)?
            }
        };

        let envelope_id = envelope
            .envelope_id
            .ok_or_else(|| DispatchError::payload("envelope without envelope_id"))?;
        if envelope.retry_attempt > 0 {
            debug!(
                envelope_id = %envelope_id,
                retry_attempt = envelope.retry_attempt,
                retry_reason = envelope.retry_reason.as_deref(),
                "Envelope redelivered"
            );
        }

        let accepts_payload = envelope.accepts_response_payload;
        let acked = Arc::new(AtomicBool::new(false));
        let respond = Responder::new(move |response: DispatchResponse| {
            let first = !acked.swap(true, Ordering::SeqCst);
            let ack = ack.clone();
            let envelope_id = envelope_id.clone();
            async move {
                if !first {
                    return Ok(());
                }
                let mut acknowledgement = Acknowledgement::new(envelope_id);
                if accepts_payload {
                    acknowledgement.payload = response.body()?;
                }
                ack.respond(acknowledgement).await
            }
        });

        self.dispatcher.dispatch_with(request, respond).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;
    use tether_core::{BoxError, EventCallback, SlashCommand, SlashCommandResponse};

    use crate::handler::{AsyncSlashCommandHandler, EventHandler};
    use crate::service::ServiceConfiguration;
    use crate::source::HandlerSource;

    struct Echo;

    #[async_trait]
    impl AsyncSlashCommandHandler for Echo {
        async fn handle(
            &self,
            command: &SlashCommand,
            respond: Responder<SlashCommandResponse>,
        ) -> Result<(), BoxError> {
            respond
                .respond(SlashCommandResponse::text(command.text.clone()))
                .await
        }
    }

    #[derive(Default)]
    struct Seen(Mutex<Vec<String>>);

    #[async_trait]
    impl EventHandler for Seen {
        async fn handle(&self, callback: &EventCallback) -> Result<(), BoxError> {
            self.0.lock().push(callback.event.event_type().to_string());
            Ok(())
        }
    }

    fn client(seen: Arc<Seen>) -> DefaultSocketModeClient {
        let mut config = ServiceConfiguration::new();
        config
            .register_event_handler(HandlerSource::shared(seen))
            .register_async_slash_command_handler("/echo", HandlerSource::instance(Echo))
            .unwrap();
        DefaultSocketModeClient::new(config.build().dispatcher())
    }

    #[tokio::test]
    async fn hello_is_not_acknowledged() {
        let client = client(Arc::default());
        let ack = client
            .handle_envelope(r#"{"type":"hello","num_connections":1}"#)
            .await
            .unwrap();
        assert!(ack.is_none());
    }

    #[tokio::test]
    async fn slash_command_ack_carries_response() {
        let client = client(Arc::default());
        let frame = json!({
            "envelope_id": "env-1",
            "type": "slash_commands",
            "accepts_response_payload": true,
            "payload": { "command": "/echo", "text": "hi" }
        });

        let ack = client
            .handle_envelope(&frame.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ack.envelope_id, "env-1");
        assert_eq!(ack.payload.unwrap()["text"], "hi");
    }

    #[tokio::test]
    async fn event_is_dispatched_and_acknowledged() {
        let seen = Arc::new(Seen::default());
        let client = client(seen.clone());
        let frame = json!({
            "envelope_id": "env-2",
            "type": "events_api",
            "accepts_response_payload": false,
            "payload": {
                "type": "event_callback",
                "team_id": "T1",
                "event": { "type": "app_mention", "user": "U1", "text": "hey", "channel": "C1", "ts": "1.0" }
            }
        });

        let ack = client.handle_envelope(&frame.to_string()).await.unwrap();
        assert_eq!(ack, Some(Acknowledgement::new("env-2")));
        assert_eq!(*seen.0.lock(), vec!["app_mention"]);
    }

    #[tokio::test]
    async fn malformed_frame_is_a_payload_error() {
        let client = client(Arc::default());
        let err = client.handle_envelope("{").await.unwrap_err();
        assert!(matches!(err, DispatchError::Payload(_)));
    }

    struct Lingering {
        release: Arc<Notify>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl AsyncSlashCommandHandler for Lingering {
        async fn handle(
            &self,
            _command: &SlashCommand,
            respond: Responder<SlashCommandResponse>,
        ) -> Result<(), BoxError> {
            respond.respond(SlashCommandResponse::text("working")).await?;
            self.release.notified().await;
            self.log.lock().push("handler done");
            Ok(())
        }
    }

    #[tokio::test]
    async fn early_response_is_acknowledged_before_handler_finishes() {
        let release = Arc::new(Notify::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut config = ServiceConfiguration::new();
        config
            .register_async_slash_command_handler(
                "/slow",
                HandlerSource::instance(Lingering {
                    release: release.clone(),
                    log: log.clone(),
                }),
            )
            .unwrap();
        let client = DefaultSocketModeClient::new(config.build().dispatcher());

        let ack_log = log.clone();
        let ack = Responder::new(move |acknowledgement: Acknowledgement| {
            assert_eq!(acknowledgement.envelope_id, "env-9");
            ack_log.lock().push("ack");
            release.notify_one();
            async { Ok(()) }
        });
        let frame = json!({
            "envelope_id": "env-9",
            "type": "slash_commands",
            "payload": { "command": "/slow", "text": "" }
        });

        timeout(Duration::from_secs(5), client.handle_envelope_with(&frame.to_string(), ack))
            .await
            .expect("acknowledgement waited for the handler")
            .unwrap();
        assert_eq!(*log.lock(), vec!["ack", "handler done"]);
    }
}
