use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use tether_core::{BlockAction, BlockActionRequest, BoxError, Responder};

use super::BlockActionIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::AsyncBlockActionHandler;

/// Routes block actions by the first action's id, falling back to its type.
pub struct BlockActionDispatch {
    ctx: WeakRequestContext,
    index: Arc<BlockActionIndex>,
}

impl BlockActionDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<BlockActionIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl AsyncBlockActionHandler for BlockActionDispatch {
    async fn handle(
        &self,
        request: &BlockActionRequest,
        respond: Responder,
    ) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        let action = request.action();
        let key = action.map(BlockAction::action_id);
        let tag = action.and_then(BlockAction::type_tag);
        let handlers = self.index.resolve(&ctx, key, tag)?;

        trace!(
            action_id = key,
            action_type = tag,
            handlers = handlers.len(),
            "Dispatching block action"
        );

        if let Some(handler) = &handlers.sync {
            handler.handle(request).await?;
        }
        if let Some(handler) = &handlers.async_ {
            handler.handle(request, respond.clone()).await?;
        }
        for handler in handlers.generic_sync.iter() {
            handler.handle(request).await?;
        }
        for handler in handlers.generic_async.iter() {
            handler.handle(request, respond.clone()).await?;
        }
        Ok(())
    }
}
