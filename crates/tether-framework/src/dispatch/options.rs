use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{BlockOptionsRequest, BlockOptionsResponse, BoxError};

use super::BlockOptionIndex;
use crate::context::{RequestContext, WeakRequestContext};
use crate::handler::BlockOptionProvider;

/// Routes external-select option requests by `action_id`.
///
/// An unregistered id yields an empty option list.
pub struct BlockOptionDispatch {
    ctx: WeakRequestContext,
    index: Arc<BlockOptionIndex>,
}

impl BlockOptionDispatch {
    pub fn new(ctx: &RequestContext, index: Arc<BlockOptionIndex>) -> Self {
        Self {
            ctx: ctx.downgrade(),
            index,
        }
    }
}

#[async_trait]
impl BlockOptionProvider for BlockOptionDispatch {
    async fn get_options(
        &self,
        request: &BlockOptionsRequest,
    ) -> Result<BlockOptionsResponse, BoxError> {
        let ctx = self.ctx.upgrade()?;
        match self.index.resolve_keyed(&ctx, &request.action_id)? {
            Some(provider) => provider.get_options(request).await,
            None => Ok(BlockOptionsResponse::default()),
        }
    }
}
