use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{BoxError, Responder, ViewClosed, ViewSubmission, ViewSubmissionResponse};

use super::ViewSubmissionIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::AsyncViewSubmissionHandler;

/// Routes view submissions and closes by `view.callback_id`.
///
/// Both resolve the same slot, so submit and close reach one instance per
/// request.
pub struct ViewSubmissionDispatch {
    ctx: WeakRequestContext,
    index: Arc<ViewSubmissionIndex>,
}

impl ViewSubmissionDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<ViewSubmissionIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }

    fn resolve(
        &self,
        callback_id: &str,
    ) -> Result<Option<Arc<dyn AsyncViewSubmissionHandler>>, BoxError> {
        let ctx = self.ctx.upgrade()?;
        Ok(self.index.resolve_keyed(&ctx, callback_id)?)
    }
}

#[async_trait]
impl AsyncViewSubmissionHandler for ViewSubmissionDispatch {
    async fn handle(
        &self,
        submission: &ViewSubmission,
        respond: Responder<ViewSubmissionResponse>,
    ) -> Result<(), BoxError> {
        match self.resolve(&submission.view.callback_id)? {
            Some(handler) => handler.handle(submission, respond).await,
            None => Ok(()),
        }
    }

    async fn handle_close(&self, closed: &ViewClosed, respond: Responder) -> Result<(), BoxError> {
        match self.resolve(&closed.view.callback_id)? {
            Some(handler) => handler.handle_close(closed, respond).await,
            None => Ok(()),
        }
    }
}
