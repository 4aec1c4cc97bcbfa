//! Runtime orchestration.
//!
//! [`TetherRuntime`] turns a [`TetherConfig`] and the application's handler
//! registrations into a built [`ServiceProvider`]:
//!
//! 1. load and validate the configuration;
//! 2. install the logging subscriber;
//! 3. apply the API settings (base URL, token, HTTP transport when the
//!    `http-client` feature is on);
//! 4. let the application register handlers and override services;
//! 5. build the provider.
//!
//! ```rust,ignore
//! let runtime = TetherRuntime::builder()
//!     .profile("production")
//!     .build(|services| {
//!         services.register_slash_command_handler("/echo", HandlerSource::instance(Echo))?;
//!         Ok(())
//!     })?;
//!
//! runtime.run_socket_mode(frames, |ack| send(ack)).await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use tether_core::{Acknowledgement, BaseUrlBuilder, BoxError, Responder, SocketModeClient};
use tether_framework::{Dispatcher, ServiceConfiguration, ServiceProvider};

use crate::config::{ConfigLoader, TetherConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// A configured application: its settings and the built service provider.
#[derive(Debug)]
pub struct TetherRuntime {
    config: TetherConfig,
    provider: ServiceProvider,
}

impl TetherRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Builds a runtime from an already loaded configuration.
    ///
    /// `configure` runs after the configuration has been applied, so services
    /// it sets take precedence.
    pub fn from_config<F>(config: TetherConfig, configure: F) -> RuntimeResult<Self>
    where
        F: FnOnce(&mut ServiceConfiguration) -> tether_core::ConfigResult<()>,
    {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let mut services = ServiceConfiguration::new();
        apply_config(&config, &mut services)?;
        configure(&mut services)?;
        let provider = services.build();

        info!(
            base_url = %config.api.base_url,
            socket_mode = config.socket_mode.enabled,
            log_level = %config.logging.level,
            "Runtime initialized"
        );
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.provider.dispatcher()
    }

    pub fn socket_mode_client(&self) -> Arc<dyn SocketModeClient> {
        self.provider.socket_mode_client()
    }

    /// Feeds socket-mode text frames to the socket-mode client and hands each
    /// acknowledgement to `send`.
    ///
    /// Every frame is dispatched on its own task, and its acknowledgement is
    /// sent as soon as a handler responds, so a slow handler holds up neither
    /// its own acknowledgement nor later frames. Runs until the frame stream
    /// ends and every dispatch has finished, or until Ctrl+C is received,
    /// which aborts the dispatches still running. A frame that fails to
    /// dispatch is logged and skipped; a failed `send` stops the loop.
    pub async fn run_socket_mode<S, F, Fut>(&self, frames: S, mut send: F) -> RuntimeResult<()>
    where
        S: Stream<Item = String>,
        F: FnMut(Acknowledgement) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let client = self.socket_mode_client();
        let (ack_tx, mut acks) = mpsc::unbounded_channel::<Acknowledgement>();
        let mut in_flight = JoinSet::new();
        let mut frames = std::pin::pin!(frames);
        let mut frames_done = false;
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut listen_for_signal = true;

        info!("Socket mode loop started");
        while !(frames_done && in_flight.is_empty()) {
            tokio::select! {
                biased;
                Some(ack) = acks.recv() => send_ack(&mut send, ack).await?,
                signal = &mut shutdown, if listen_for_signal => match signal {
                    Ok(()) => {
                        info!(in_flight = in_flight.len(), "Shutdown signal received");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(error = %e, "Cannot listen for Ctrl+C");
                        listen_for_signal = false;
                    }
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Failed to handle socket mode frame"),
                    Err(e) => warn!(error = %e, "Socket mode dispatch task failed"),
                },
                frame = frames.next(), if !frames_done => match frame {
                    Some(frame) => {
                        let client = Arc::clone(&client);
                        let ack = forward_to(ack_tx.clone());
                        in_flight.spawn(async move {
                            client.handle_envelope_with(&frame, ack).await
                        });
                    }
                    None => {
                        info!("Frame stream ended");
                        frames_done = true;
                    }
                },
            }
        }

        // Finished dispatches have already queued their acknowledgements.
        while let Ok(ack) = acks.try_recv() {
            send_ack(&mut send, ack).await?;
        }
        Ok(())
    }
}

/// A responder queueing acknowledgements for the socket-mode loop.
fn forward_to(acks: mpsc::UnboundedSender<Acknowledgement>) -> Responder<Acknowledgement> {
    Responder::new(move |ack: Acknowledgement| {
        let queued = acks
            .send(ack)
            .map_err(|_| BoxError::from("socket mode loop has stopped"));
        async move { queued }
    })
}

async fn send_ack<F, Fut>(send: &mut F, ack: Acknowledgement) -> RuntimeResult<()>
where
    F: FnMut(Acknowledgement) -> Fut,
    Fut: Future<Output = Result<(), BoxError>>,
{
    debug!(envelope_id = %ack.envelope_id, "Sending acknowledgement");
    send(ack)
        .await
        .map_err(|e| RuntimeError::Acknowledge(e.to_string()))
}

fn apply_config(config: &TetherConfig, services: &mut ServiceConfiguration) -> RuntimeResult<()> {
    services.use_url_builder(Arc::new(BaseUrlBuilder::new(config.api.base_url.as_str())));
    if let Some(token) = &config.api.token {
        services.use_api_token(token.as_str());
    }

    #[cfg(feature = "http-client")]
    {
        let transport = tether_transport::ReqwestTransport::new(config.api.timeout())?;
        services.use_http_transport(Arc::new(transport));
        debug!("Registered reqwest HTTP transport");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Chooses where the configuration comes from.
pub struct RuntimeBuilder {
    loader: ConfigLoader,
    config: Option<TetherConfig>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            config: None,
        }
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.file(path.into());
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.search_path(path.into());
        self
    }

    /// Skips loading and uses `config` as is.
    pub fn config(mut self, config: TetherConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build<F>(self, configure: F) -> RuntimeResult<TetherRuntime>
    where
        F: FnOnce(&mut ServiceConfiguration) -> tether_core::ConfigResult<()>,
    {
        let config = match self.config {
            Some(config) => config,
            None => self.loader.load()?,
        };
        TetherRuntime::from_config(config, configure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tether_core::{
        ConfigError as RegistrationError, Responder, SlashCommand, SlashCommandResponse,
    };
    use tether_framework::{AsyncSlashCommandHandler, HandlerSource};

    struct Echo;

    #[async_trait]
    impl AsyncSlashCommandHandler for Echo {
        async fn handle(
            &self,
            command: &SlashCommand,
            respond: Responder<SlashCommandResponse>,
        ) -> Result<(), BoxError> {
            respond
                .respond(SlashCommandResponse::text(command.text.to_uppercase()))
                .await
        }
    }

    fn echo_runtime() -> TetherRuntime {
        TetherRuntime::builder()
            .config(TetherConfig::default())
            .build(|services| {
                services
                    .register_async_slash_command_handler("/echo", HandlerSource::instance(Echo))?;
                Ok(())
            })
            .unwrap()
    }

    #[test]
    fn api_settings_reach_provider() {
        let mut config = TetherConfig::default();
        config.api.base_url = "https://api.example.test/v1".into();
        config.api.token = Some("xoxb-test".into());

        let runtime = TetherRuntime::from_config(config, |_| Ok(())).unwrap();
        let provider = runtime.provider();
        assert_eq!(provider.api_token(), Some("xoxb-test"));
        assert_eq!(
            provider.url_builder().url("chat.postMessage"),
            "https://api.example.test/v1/chat.postMessage"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = TetherConfig::default();
        config.api.timeout_ms = 0;
        let err = TetherRuntime::from_config(config, |_| Ok(())).unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[test]
    fn registration_errors_surface() {
        let err = TetherRuntime::from_config(TetherConfig::default(), |services| {
            services.register_async_slash_command_handler("echo", HandlerSource::instance(Echo))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Registration(RegistrationError::InvalidArgument { param: "command", .. })
        ));
    }

    #[tokio::test]
    async fn socket_mode_loop_acknowledges_frames() {
        let runtime = echo_runtime();
        let frames = futures::stream::iter(vec![
            json!({ "type": "hello" }).to_string(),
            "garbage".to_string(),
            json!({
                "envelope_id": "env-7",
                "type": "slash_commands",
                "accepts_response_payload": true,
                "payload": { "command": "/echo", "text": "quiet" }
            })
            .to_string(),
        ]);

        let acks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&acks);
        runtime
            .run_socket_mode(frames, move |ack| {
                sink.lock().unwrap().push(ack);
                async { Ok(()) }
            })
            .await
            .unwrap();

        let acks = acks.lock().unwrap();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].envelope_id, "env-7");
        assert_eq!(acks[0].payload.as_ref().unwrap()["text"], "QUIET");
    }

    #[tokio::test]
    async fn failed_send_stops_loop() {
        let runtime = echo_runtime();
        let frames = futures::stream::iter(vec![
            json!({
                "envelope_id": "env-1",
                "type": "slash_commands",
                "payload": { "command": "/echo", "text": "a" }
            })
            .to_string(),
        ]);

        let err = runtime
            .run_socket_mode(frames, |_| async { Err::<(), BoxError>("socket closed".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Acknowledge(_)));
    }

    struct Lingering {
        release: Arc<Notify>,
        log: Arc<Mutex<Vec<String>>>,
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
            self.log.lock().unwrap().push("slow done".into());
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_handler_does_not_delay_later_acknowledgements() {
        let release = Arc::new(Notify::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = Lingering {
            release: release.clone(),
            log: log.clone(),
        };
        let runtime = TetherRuntime::builder()
            .config(TetherConfig::default())
            .build(|services| {
                services
                    .register_async_slash_command_handler(
                        "/slow",
                        HandlerSource::instance(handler),
                    )?
                    .register_async_slash_command_handler("/echo", HandlerSource::instance(Echo))?;
                Ok(())
            })
            .unwrap();

        let frames = futures::stream::iter(vec![
            json!({
                "envelope_id": "e1",
                "type": "slash_commands",
                "payload": { "command": "/slow", "text": "" }
            })
            .to_string(),
            json!({
                "envelope_id": "e2",
                "type": "slash_commands",
                "payload": { "command": "/echo", "text": "fast" }
            })
            .to_string(),
        ]);

        let sink = Arc::clone(&log);
        let run = runtime.run_socket_mode(frames, move |ack| {
            if ack.envelope_id == "e2" {
                release.notify_one();
            }
            sink.lock().unwrap().push(ack.envelope_id);
            async { Ok(()) }
        });
        tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("acknowledgements waited for the slow handler")
            .unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert!(log[..2].contains(&"e1".to_string()));
        assert!(log[..2].contains(&"e2".to_string()));
        assert_eq!(log[2], "slow done");
    }
}
