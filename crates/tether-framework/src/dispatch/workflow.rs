use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{BoxError, Responder, WorkflowStepEdit};

use super::WorkflowStepEditIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::AsyncWorkflowStepEditHandler;

/// Routes workflow step edits by `callback_id`.
pub struct WorkflowStepEditDispatch {
    ctx: WeakRequestContext,
    index: Arc<WorkflowStepEditIndex>,
}

impl WorkflowStepEditDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<WorkflowStepEditIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl AsyncWorkflowStepEditHandler for WorkflowStepEditDispatch {
    async fn handle(&self, edit: &WorkflowStepEdit, respond: Responder) -> Result<(), BoxError> {
        let ctx = self.ctx.upgrade()?;
        let handlers = self.index.resolve(&ctx, Some(&edit.callback_id), None)?;

        if let Some(handler) = &handlers.sync {
            handler.handle(edit).await?;
        }
        if let Some(handler) = &handlers.async_ {
            handler.handle(edit, respond.clone()).await?;
        }
        for handler in handlers.generic_sync.iter() {
            handler.handle(edit).await?;
        }
        for handler in handlers.generic_async.iter() {
            handler.handle(edit, respond.clone()).await?;
        }
        Ok(())
    }
}
