use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{BoxError, GlobalShortcut, MessageShortcut, Responder};

use super::{GlobalShortcutIndex, MessageShortcutIndex};
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::{AsyncGlobalShortcutHandler, AsyncMessageShortcutHandler};

/// Routes message shortcuts by `callback_id`.
pub struct MessageShortcutDispatch {
    ctx: WeakRequestContext,
    index: Arc<MessageShortcutIndex>,
}

impl MessageShortcutDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<MessageShortcutIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl AsyncMessageShortcutHandler for MessageShortcutDispatch {
    async fn handle(
        &self,
        shortcut: &MessageShortcut,
        respond: Responder,
    ) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        let handlers = self
            .index
            .resolve(&ctx, Some(&shortcut.callback_id), None)?;

        if let Some(handler) = &handlers.sync {
            handler.handle(shortcut).await?;
        }
        if let Some(handler) = &handlers.async_ {
            handler.handle(shortcut, respond.clone()).await?;
        }
        for handler in handlers.generic_sync.iter() {
            handler.handle(shortcut).await?;
        }
        for handler in handlers.generic_async.iter() {
            handler.handle(shortcut, respond.clone()).await?;
        }
        Ok(())
    }
}

/// Routes global shortcuts by `callback_id`.
pub struct GlobalShortcutDispatch {
    ctx: WeakRequestContext,
    index: Arc<GlobalShortcutIndex>,
}

impl GlobalShortcutDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<GlobalShortcutIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl AsyncGlobalShortcutHandler for GlobalShortcutDispatch {
    async fn handle(&self, shortcut: &GlobalShortcut, respond: Responder) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        let handlers = self
            .index
            .resolve(&ctx, Some(&shortcut.callback_id), None)?;

        if let Some(handler) = &handlers.sync {
            handler.handle(shortcut).await?;
        }
        if let Some(handler) = &handlers.async_ {
            handler.handle(shortcut, respond.clone()).await?;
        }
        for handler in handlers.generic_sync.iter() {
            handler.handle(shortcut).await?;
        }
        for handler in handlers.generic_async.iter() {
            handler.handle(shortcut, respond.clone()).await?;
        }
        Ok(())
    }
}
