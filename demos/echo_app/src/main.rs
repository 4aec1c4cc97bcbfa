//! Echo App Example
//!
//! Reads one JSON document per line from stdin, dispatches it and prints the
//! response.
//!
//! - Default mode: each line is an HTTP request body (event callback,
//!   interaction payload or slash command); the response body is printed.
//! - `--socket`: each line is a socket-mode envelope; acknowledgements are
//!   printed.
//!
//! # Handlers
//!
//! ```text
//! /echo <text>        → replies with <text>
//! /ping               → replies "Pong!"
//! app_mention event   → logged, counted in the shared Stats service
//! "approve" button    → logged
//! ```
//!
//! # Usage
//!
//! ```bash
//! echo '{"command":"/echo","text":"hi"}' | cargo run --package echo-app
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use clap::Parser;
use futures::stream;
use tether::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "echo-app", about = "Dispatches JSON payloads read from stdin")]
struct Cli {
    /// Configuration file (defaults to tether.toml in the current directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(short, long)]
    profile: Option<String>,

    /// Treat input lines as socket-mode envelopes.
    #[arg(long)]
    socket: bool,
}

// ============================================================================
// Services
// ============================================================================

/// Process-wide counters, registered as a singleton.
#[derive(Default)]
struct Stats {
    mentions: AtomicUsize,
}

// ============================================================================
// Handlers
// ============================================================================

struct Echo;

#[async_trait]
impl SlashCommandHandler for Echo {
    async fn handle(
        &self,
        command: &SlashCommand,
    ) -> Result<Option<SlashCommandResponse>, BoxError> {
        let reply = match command.command.as_str() {
            "/ping" => "Pong!".to_string(),
            _ if command.text.trim().is_empty() => return Ok(None),
            _ => command.text.clone(),
        };
        Ok(Some(SlashCommandResponse::text(reply)))
    }
}

struct MentionLogger {
    stats: Arc<Stats>,
}

#[async_trait]
impl TypedEventHandler<AppMention> for MentionLogger {
    async fn handle(&self, mention: &AppMention) -> Result<(), BoxError> {
        let total = self.stats.mentions.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            user = %mention.user,
            channel = %mention.channel,
            total,
            "Mentioned: {}",
            mention.text
        );
        Ok(())
    }
}

struct Approve;

#[async_trait]
impl BlockActionHandler for Approve {
    async fn handle(&self, request: &BlockActionRequest) -> Result<(), BoxError> {
        info!(user = %request.user.id, "Request approved");
        Ok(())
    }
}

fn register(services: &mut ServiceConfiguration) -> Result<(), ConfigError> {
    let container = Container::builder()
        .with_singleton(|_| Stats::default())
        .build();
    services.use_resolver(Arc::new(container));

    services
        .register_slash_command_handler("/echo", HandlerSource::instance(Echo))?
        .register_slash_command_handler("/ping", HandlerSource::instance(Echo))?;

    services
        .register_typed_event_handler::<AppMention>(HandlerSource::try_from_fn(|ctx| {
            let stats = ctx.resolve::<Stats>()?;
            Ok(Arc::new(MentionLogger { stats }) as Arc<dyn TypedEventHandler<AppMention>>)
        }))
        .register_keyed_block_action_handler("approve", HandlerSource::instance(Approve));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = TetherRuntime::builder();
    if let Some(path) = cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = cli.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build(register)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if cli.socket {
        let frames = stream::unfold(lines, |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((line, lines)),
                _ => None,
            }
        });
        runtime
            .run_socket_mode(frames, |ack| async move {
                println!("{}", serde_json::to_string(&ack)?);
                Ok(())
            })
            .await?;
        return Ok(());
    }

    let dispatcher = runtime.dispatcher();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match dispatcher.dispatch_json(&line).await {
            Ok(response) => match response.body()? {
                Some(body) => println!("{body}"),
                None => println!("(ack)"),
            },
            Err(e) => warn!(error = %e, "Dispatch failed"),
        }
    }
    Ok(())
}
