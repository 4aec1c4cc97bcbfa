//! Request entry point.
//!
//! The [`Dispatcher`] owns nothing but handles to provider services. For
//! every inbound payload it:
//!
//! 1. answers `url_verification` directly, without a request context;
//! 2. creates a [`RequestContext`] and begins it with the request listener;
//! 3. asks the [`HandlerFactory`] for the payload's category handler and
//!    invokes it, forwarding responses to the caller's responder;
//! 4. ends the request (also when a handler fails) and acknowledges
//!    payloads nobody responded to.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{Instrument, debug, debug_span};

use tether_core::{
    DispatchError, DispatchResponse, DispatchResult, InboundRequest, InteractionPayload,
    Responder, TypeResolver,
};

use crate::context::{RequestContext, RequestContextFactory};
use crate::factory::HandlerFactory;
use crate::listener::RequestListener;

/// Routes inbound payloads to their category handlers.
#[derive(Clone)]
pub struct Dispatcher {
    contexts: Arc<dyn RequestContextFactory>,
    listener: Arc<dyn RequestListener>,
    handlers: Arc<dyn HandlerFactory>,
    types: Arc<dyn TypeResolver>,
}

impl Dispatcher {
    pub fn new(
        contexts: Arc<dyn RequestContextFactory>,
        listener: Arc<dyn RequestListener>,
        handlers: Arc<dyn HandlerFactory>,
        types: Arc<dyn TypeResolver>,
    ) -> Self {
        Self {
            contexts,
            listener,
            handlers,
            types,
        }
    }

    /// Dispatches `request` and returns the first response a handler sent,
    /// or [`DispatchResponse::Ack`].
    pub async fn dispatch(&self, request: InboundRequest) -> DispatchResult<DispatchResponse> {
        let first = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&first);
        let respond = Responder::new(move |response| {
            let mut first = sink.lock();
            if first.is_none() {
                *first = Some(response);
            }
            async { Ok(()) }
        });

        self.dispatch_with(request, respond).await?;
        let response = first.lock().take();
        Ok(response.unwrap_or_default())
    }

    /// Dispatches `request`, forwarding every response to `respond` as soon
    /// as a handler sends it.
    ///
    /// If no handler responded, `respond` receives an acknowledgement once
    /// the handlers are done.
    pub async fn dispatch_with(
        &self,
        request: InboundRequest,
        respond: Responder<DispatchResponse>,
    ) -> DispatchResult<()> {
        if let InboundRequest::UrlVerification(verification) = &request {
            debug!("Answering url verification");
            let challenge = DispatchResponse::Challenge(verification.challenge.clone());
            return respond
                .respond(challenge)
                .await
                .map_err(DispatchError::Handler);
        }

        let ctx = self.contexts.create_request_context();
        let span = debug_span!("dispatch", request_id = ctx.id(), kind = request.kind());

        async move {
            let responded = Arc::new(AtomicBool::new(false));
            let tracked = {
                let responded = Arc::clone(&responded);
                let respond = respond.clone();
                Responder::new(move |response| {
                    responded.store(true, Ordering::SeqCst);
                    let respond = respond.clone();
                    async move { respond.respond(response).await }
                })
            };

            let mut scope = ctx.begin_request(Arc::clone(&self.listener));
            let result = self.route(&ctx, &request, &tracked).await;
            scope.end();

            if let Err(err) = &result {
                debug!(error = %err, "Dispatch failed");
            }
            result?;

            if !responded.load(Ordering::SeqCst) {
                respond
                    .respond(DispatchResponse::Ack)
                    .await
                    .map_err(DispatchError::Handler)?;
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Classifies and decodes a raw JSON body.
    pub fn decode(&self, value: Value) -> DispatchResult<InboundRequest> {
        let kind = self
            .types
            .classify(&value)
            .ok_or_else(|| DispatchError::payload("unrecognized payload type"))?;
        Ok(InboundRequest::decode(kind, value)?)
    }

    /// Parses, classifies and dispatches a raw JSON body.
    pub async fn dispatch_json(&self, body: &str) -> DispatchResult<DispatchResponse> {
        let value: Value = serde_json::from_str(body)?;
        let request = self.decode(value)?;
        self.dispatch(request).await
    }

    async fn route(
        &self,
        ctx: &RequestContext,
        request: &InboundRequest,
        respond: &Responder<DispatchResponse>,
    ) -> DispatchResult<()> {
        match request {
            InboundRequest::Event(callback) => {
                let handler = self.handlers.create_event_handler(ctx)?;
                handler
                    .handle(callback)
                    .await
                    .map_err(DispatchError::from_handler)
            }
            InboundRequest::UrlVerification(verification) => {
                let challenge = DispatchResponse::Challenge(verification.challenge.clone());
                respond
                    .respond(challenge)
                    .await
                    .map_err(DispatchError::Handler)
            }
            InboundRequest::Interaction(payload) => self.route_interaction(ctx, payload, respond).await,
            InboundRequest::BlockOptions(options) => {
                let provider = self.handlers.create_block_option_provider(ctx)?;
                let response = provider
                    .get_options(options)
                    .await
                    .map_err(DispatchError::from_handler)?;
                respond
                    .respond(DispatchResponse::BlockOptions(response))
                    .await
                    .map_err(DispatchError::from_handler)
            }
            InboundRequest::LegacyOptions(options) => {
                let provider = self.handlers.create_option_provider(ctx)?;
                let response = provider
                    .get_options(options)
                    .await
                    .map_err(DispatchError::from_handler)?;
                respond
                    .respond(DispatchResponse::Options(response))
                    .await
                    .map_err(DispatchError::from_handler)
            }
            InboundRequest::SlashCommand(command) => {
                let handler = self.handlers.create_slash_command_handler(ctx)?;
                handler
                    .handle(command, respond.map(DispatchResponse::SlashCommand))
                    .await
                    .map_err(DispatchError::from_handler)
            }
        }
    }

    async fn route_interaction(
        &self,
        ctx: &RequestContext,
        payload: &InteractionPayload,
        respond: &Responder<DispatchResponse>,
    ) -> DispatchResult<()> {
        let ack = respond.map(|()| DispatchResponse::Ack);

        let result = match payload {
            InteractionPayload::BlockActions(request) => {
                let handler = self.handlers.create_block_action_handler(ctx)?;
                handler.handle(request, ack).await
            }
            InteractionPayload::MessageShortcut(shortcut) => {
                let handler = self.handlers.create_message_shortcut_handler(ctx)?;
                handler.handle(shortcut, ack).await
            }
            InteractionPayload::GlobalShortcut(shortcut) => {
                let handler = self.handlers.create_global_shortcut_handler(ctx)?;
                handler.handle(shortcut, ack).await
            }
            InteractionPayload::ViewSubmission(submission) => {
                let handler = self.handlers.create_view_submission_handler(ctx)?;
                handler
                    .handle(submission, respond.map(DispatchResponse::ViewSubmission))
                    .await
            }
            InteractionPayload::ViewClosed(closed) => {
                let handler = self.handlers.create_view_submission_handler(ctx)?;
                handler.handle_close(closed, ack).await
            }
            InteractionPayload::WorkflowStepEdit(edit) => {
                let handler = self.handlers.create_workflow_step_edit_handler(ctx)?;
                handler.handle(edit, ack).await
            }
            InteractionPayload::InteractiveMessage(message) => {
                let handler = self.handlers.create_interactive_message_handler(ctx)?;
                match handler.handle(message).await {
                    Ok(Some(reply)) => respond.respond(DispatchResponse::Message(reply)).await,
                    Ok(None) => Ok(()),
                    Err(err) => Err(err),
                }
            }
            InteractionPayload::DialogSubmission(submission) => {
                let handler = self.handlers.create_dialog_submission_handler(ctx)?;
                match handler.handle(submission).await {
                    Ok(errors) => respond.respond(DispatchResponse::DialogErrors(errors)).await,
                    Err(err) => Err(err),
                }
            }
            InteractionPayload::DialogCancellation(cancellation) => {
                let handler = self.handlers.create_dialog_submission_handler(ctx)?;
                handler.handle_cancel(cancellation).await
            }
        };
        result.map_err(DispatchError::from_handler)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl tower::Service<InboundRequest> for Dispatcher {
    type Response = DispatchResponse;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<DispatchResponse>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: InboundRequest) -> Self::Future {
        let dispatcher = self.clone();
        async move { dispatcher.dispatch(request).await }.boxed()
    }
}
