//! Legacy attachment, options and dialog payloads.

use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{
    BoxError, DialogCancellation, DialogError, DialogSubmission, InteractiveMessage,
    MessageResponse, OptionsRequest, OptionsResponse,
};

use super::{DialogSubmissionIndex, InteractiveMessageIndex, OptionIndex};
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::{DialogSubmissionHandler, InteractiveMessageHandler, OptionProvider};

/// Routes interactive messages by the first action's `name`.
pub struct InteractiveMessageDispatch {
    ctx: WeakRequestContext,
    index: Arc<InteractiveMessageIndex>,
}

impl InteractiveMessageDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<InteractiveMessageIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl InteractiveMessageHandler for InteractiveMessageDispatch {
    async fn handle(
        &self,
        message: &InteractiveMessage,
    ) -> Result<Option<MessageResponse>, BoxError> {
        let Some(action) = message.action() else {
            return Ok(None);
        };
        let ctx = self.ctx.upgrade()?;
        match self.index.resolve_keyed(&ctx, &action.name)? {
            Some(handler) => handler.handle(message).await,
            None => Ok(None),
        }
    }
}

/// Routes legacy option requests by menu `name`.
pub struct OptionDispatch {
    ctx: WeakRequestContext,
    index: Arc<OptionIndex>,
}

impl OptionDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<OptionIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl OptionProvider for OptionDispatch {
    async fn get_options(&self, request: &OptionsRequest) -> Result<OptionsResponse, BoxError> {
        let ctx = self.ctx.upgrade()?;
        match self.index.resolve_keyed(&ctx, &request.name)? {
            Some(provider) => provider.get_options(request).await,
            None => Ok(OptionsResponse::default()),
        }
    }
}

/// Routes dialog submissions and cancellations by `callback_id`.
pub struct DialogSubmissionDispatch {
    ctx: WeakRequestContext,
    index: Arc<DialogSubmissionIndex>,
}

impl DialogSubmissionDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<DialogSubmissionIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }

    fn resolve(
        &self,
        callback_id: &str,
    ) -> Result<Option<Arc<dyn DialogSubmissionHandler>>, BoxError> {
        let ctx = self.ctx.upgrade()?;
        Ok(self.index.resolve_keyed(&ctx, callback_id)?)
    }
}

#[async_trait]
impl DialogSubmissionHandler for DialogSubmissionDispatch {
    async fn handle(&self, submission: &DialogSubmission) -> Result<Vec<DialogError>, BoxError> {
        match self.resolve(&submission.callback_id)? {
            Some(handler) => handler.handle(submission).await,
            None => Ok(Vec::new()),
        }
    }

    async fn handle_cancel(&self, cancellation: &DialogCancellation) -> Result<(), BoxError> {
        match self.resolve(&cancellation.callback_id)? {
            Some(handler) => handler.handle_cancel(cancellation).await,
            None => Ok(()),
        }
    }
}
