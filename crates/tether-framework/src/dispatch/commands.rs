use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tether_core::{BoxError, Responder, SlashCommand, SlashCommandResponse};

use super::SlashCommandIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::AsyncSlashCommandHandler;

/// Routes slash commands by the command name, leading `/` included.
pub struct SlashCommandDispatch {
    ctx: WeakRequestContext,
    index: Arc<SlashCommandIndex>,
}

impl SlashCommandDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<SlashCommandIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl AsyncSlashCommandHandler for SlashCommandDispatch {
    async fn handle(
        &self,
        command: &SlashCommand,
        respond: Responder<SlashCommandResponse>,
    ) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        match self.index.resolve_keyed(&ctx, &command.command)? {
            Some(handler) => handler.handle(command, respond).await,
            None => {
                debug!(command = %command.command, "No handler for slash command");
                Ok(())
            }
        }
    }
}
