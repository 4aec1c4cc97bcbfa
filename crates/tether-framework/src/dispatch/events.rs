use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use tether_core::{BoxError, EventCallback};

use super::EventIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::EventHandler;

/// Routes an event callback to its typed handler and every generic one.
pub struct EventDispatch {
    ctx: WeakRequestContext,
    index: Arc<EventIndex>,
}

impl EventDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<EventIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl EventHandler for EventDispatch {
    async fn handle(&self, callback: &EventCallback) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        let tag = callback.event.type_tag();
        let typed = self.index.resolve_claimed(&ctx, None, tag)?;
        let generic = self.index.resolve_generic(&ctx)?;

        trace!(
            event_type = callback.event.event_type(),
            typed = typed.is_some(),
            generic = generic.len(),
            "Dispatching event"
        );

        if let Some(handler) = typed {
            handler.handle(callback).await?;
        }
        for handler in generic.iter() {
            handler.handle(callback).await?;
        }
        Ok(())
    }
}
