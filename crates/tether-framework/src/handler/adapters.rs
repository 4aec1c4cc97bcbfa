//! Adapters that let typed and sync handlers sit in a category's index.
//!
//! A category index stores one trait object type. Typed handlers are
//! wrapped so they extract their concrete payload (and skip payloads that do
//! not match); sync view and slash-command handlers are wrapped so they answer
//! through the responder like their async counterparts.

use std::sync::Arc;

use async_trait::async_trait;

use tether_core::{
    BlockActionRequest, BoxError, EventCallback, FromAction, FromEvent, Responder, SlashCommand,
    SlashCommandResponse, ViewClosed, ViewSubmission, ViewSubmissionResponse,
};

use super::traits::*;

/// Runs a [`TypedEventHandler`] as an [`EventHandler`].
pub struct TypedEvent<E: FromEvent>(pub Arc<dyn TypedEventHandler<E>>);

#[async_trait]
impl<E: FromEvent> EventHandler for TypedEvent<E> {
    async fn handle(&self, callback: &EventCallback) -> Result<(), BoxError> {
        match E::from_event(&callback.event) {
            Some(event) => self.0.handle(event).await,
            None => Ok(()),
        }
    }
}

/// Runs a [`TypedBlockActionHandler`] as a [`BlockActionHandler`].
pub struct TypedBlockAction<A: FromAction>(pub Arc<dyn TypedBlockActionHandler<A>>);

#[async_trait]
impl<A: FromAction> BlockActionHandler for TypedBlockAction<A> {
    async fn handle(&self, request: &BlockActionRequest) -> Result<(), BoxError> {
        match request.action().and_then(A::from_action) {
            Some(action) => self.0.handle(action, request).await,
            None => Ok(()),
        }
    }
}

/// Runs an [`AsyncTypedBlockActionHandler`] as an [`AsyncBlockActionHandler`].
pub struct AsyncTypedBlockAction<A: FromAction>(pub Arc<dyn AsyncTypedBlockActionHandler<A>>);

#[async_trait]
impl<A: FromAction> AsyncBlockActionHandler for AsyncTypedBlockAction<A> {
    async fn handle(
        &self,
        request: &BlockActionRequest,
        respond: Responder,
    ) -> Result<(), BoxError> {
        match request.action().and_then(A::from_action) {
            Some(action) => self.0.handle(action, request, respond).await,
            None => Ok(()),
        }
    }
}

/// Runs a [`ViewSubmissionHandler`] as an [`AsyncViewSubmissionHandler`].
pub struct SyncViewSubmission(pub Arc<dyn ViewSubmissionHandler>);

#[async_trait]
impl AsyncViewSubmissionHandler for SyncViewSubmission {
    async fn handle(
        &self,
        submission: &ViewSubmission,
        respond: Responder<ViewSubmissionResponse>,
    ) -> Result<(), BoxError> {
        if let Some(response) = self.0.handle(submission).await? {
            respond.respond(response).await?;
        }
        Ok(())
    }

    async fn handle_close(&self, closed: &ViewClosed, respond: Responder) -> Result<(), BoxError> {
        self.0.handle_close(closed).await?;
        respond.ack().await
    }
}

/// Runs a [`SlashCommandHandler`] as an [`AsyncSlashCommandHandler`].
pub struct SyncSlashCommand(pub Arc<dyn SlashCommandHandler>);

#[async_trait]
impl AsyncSlashCommandHandler for SyncSlashCommand {
    async fn handle(
        &self,
        command: &SlashCommand,
        respond: Responder<SlashCommandResponse>,
    ) -> Result<(), BoxError> {
        if let Some(response) = self.0.handle(command).await? {
            respond.respond(response).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tether_core::{ButtonAction, Goodbye, Hello, OverflowAction};

    struct HelloCounter(Mutex<usize>);

    #[async_trait]
    impl TypedEventHandler<Hello> for HelloCounter {
        async fn handle(&self, _event: &Hello) -> Result<(), BoxError> {
            *self.0.lock() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn typed_event_skips_other_types() {
        let counter = Arc::new(HelloCounter(Mutex::new(0)));
        let adapter = TypedEvent::<Hello>(counter.clone());

        adapter.handle(&EventCallback::new(Goodbye {})).await.unwrap();
        adapter.handle(&EventCallback::new(Hello {})).await.unwrap();
        assert_eq!(*counter.0.lock(), 1);
    }

    struct ButtonIds(Mutex<Vec<String>>);

    #[async_trait]
    impl TypedBlockActionHandler<ButtonAction> for ButtonIds {
        async fn handle(
            &self,
            action: &ButtonAction,
            _request: &BlockActionRequest,
        ) -> Result<(), BoxError> {
            self.0.lock().push(action.action_id.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn typed_block_action_extracts_first_action() {
        let ids = Arc::new(ButtonIds(Mutex::new(Vec::new())));
        let adapter = TypedBlockAction::<ButtonAction>(ids.clone());

        adapter
            .handle(&BlockActionRequest::new(OverflowAction::new("menu")))
            .await
            .unwrap();
        adapter
            .handle(&BlockActionRequest::new(ButtonAction::new("ok")))
            .await
            .unwrap();
        assert_eq!(*ids.0.lock(), vec!["ok".to_string()]);
    }

    struct Echo;

    #[async_trait]
    impl SlashCommandHandler for Echo {
        async fn handle(
            &self,
            command: &SlashCommand,
        ) -> Result<Option<SlashCommandResponse>, BoxError> {
            Ok((!command.text.is_empty()).then(|| SlashCommandResponse::text(&command.text)))
        }
    }

    #[tokio::test]
    async fn sync_slash_command_responds_only_with_some() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let respond = Responder::new(move |response: SlashCommandResponse| {
            let sink = sink.clone();
            async move {
                sink.lock().push(response.text);
                Ok(())
            }
        });

        let adapter = SyncSlashCommand(Arc::new(Echo));
        adapter
            .handle(&SlashCommand::new("/echo", ""), respond.clone())
            .await
            .unwrap();
        adapter
            .handle(&SlashCommand::new("/echo", "hi"), respond)
            .await
            .unwrap();
        assert_eq!(*seen.lock(), vec!["hi".to_string()]);
    }
}
