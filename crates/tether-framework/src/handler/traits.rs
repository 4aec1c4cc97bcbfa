//! Handler contracts, one set per payload category.
//!
//! Sync handlers answer through their return value. Async handlers receive a
//! [`Responder`] instead and may reply before they finish working; fire and
//! forget categories use `Responder<()>` as a plain acknowledgement.
//!
//! Every handler returns `Result<_, BoxError>`: an `Err` ends the request
//! and is handed back to the dispatch caller unchanged.

use async_trait::async_trait;

use tether_core::{
    BlockActionRequest, BlockOptionsRequest, BlockOptionsResponse, BoxError, DialogCancellation,
    DialogError, DialogSubmission, EventCallback, FromAction, FromEvent, GlobalShortcut,
    InteractiveMessage, MessageResponse, MessageShortcut, OptionsRequest, OptionsResponse,
    Responder, SlashCommand, SlashCommandResponse, ViewClosed, ViewSubmission,
    ViewSubmissionResponse, WorkflowStepEdit,
};

// ============================================================================
// Events
// ============================================================================

/// Receives every event callback.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &EventCallback) -> Result<(), BoxError>;
}

/// Receives one concrete event type.
#[async_trait]
pub trait TypedEventHandler<E: FromEvent>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), BoxError>;
}

// ============================================================================
// Block Actions
// ============================================================================

/// Handles block element actions.
#[async_trait]
pub trait BlockActionHandler: Send + Sync {
    async fn handle(&self, request: &BlockActionRequest) -> Result<(), BoxError>;
}

/// Handles actions of one element type, receiving the routing action
/// alongside the full request.
#[async_trait]
pub trait TypedBlockActionHandler<A: FromAction>: Send + Sync {
    async fn handle(&self, action: &A, request: &BlockActionRequest) -> Result<(), BoxError>;
}

/// Handles block element actions, acknowledging through `respond`.
#[async_trait]
pub trait AsyncBlockActionHandler: Send + Sync {
    async fn handle(
        &self,
        request: &BlockActionRequest,
        respond: Responder,
    ) -> Result<(), BoxError>;
}

/// Async counterpart of [`TypedBlockActionHandler`].
#[async_trait]
pub trait AsyncTypedBlockActionHandler<A: FromAction>: Send + Sync {
    async fn handle(
        &self,
        action: &A,
        request: &BlockActionRequest,
        respond: Responder,
    ) -> Result<(), BoxError>;
}

/// Supplies options for an external select menu.
#[async_trait]
pub trait BlockOptionProvider: Send + Sync {
    async fn get_options(
        &self,
        request: &BlockOptionsRequest,
    ) -> Result<BlockOptionsResponse, BoxError>;
}

// ============================================================================
// Shortcuts
// ============================================================================

#[async_trait]
pub trait MessageShortcutHandler: Send + Sync {
    async fn handle(&self, shortcut: &MessageShortcut) -> Result<(), BoxError>;
}

#[async_trait]
pub trait AsyncMessageShortcutHandler: Send + Sync {
    async fn handle(
        &self,
        shortcut: &MessageShortcut,
        respond: Responder,
    ) -> Result<(), BoxError>;
}

#[async_trait]
pub trait GlobalShortcutHandler: Send + Sync {
    async fn handle(&self, shortcut: &GlobalShortcut) -> Result<(), BoxError>;
}

#[async_trait]
pub trait AsyncGlobalShortcutHandler: Send + Sync {
    async fn handle(&self, shortcut: &GlobalShortcut, respond: Responder) -> Result<(), BoxError>;
}

// ============================================================================
// Views
// ============================================================================

/// Handles submission and dismissal of one modal.
///
/// Both methods are called on the same instance within a request.
#[async_trait]
pub trait ViewSubmissionHandler: Send + Sync {
    /// `None` closes the modal.
    async fn handle(
        &self,
        submission: &ViewSubmission,
    ) -> Result<Option<ViewSubmissionResponse>, BoxError>;

    async fn handle_close(&self, closed: &ViewClosed) -> Result<(), BoxError>;
}

/// Async counterpart of [`ViewSubmissionHandler`].
///
/// Not calling `respond` closes the modal.
#[async_trait]
pub trait AsyncViewSubmissionHandler: Send + Sync {
    async fn handle(
        &self,
        submission: &ViewSubmission,
        respond: Responder<ViewSubmissionResponse>,
    ) -> Result<(), BoxError>;

    async fn handle_close(&self, closed: &ViewClosed, respond: Responder) -> Result<(), BoxError>;
}

// ============================================================================
// Slash Commands
// ============================================================================

#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// `None` acknowledges without a visible reply.
    async fn handle(
        &self,
        command: &SlashCommand,
    ) -> Result<Option<SlashCommandResponse>, BoxError>;
}

#[async_trait]
pub trait AsyncSlashCommandHandler: Send + Sync {
    async fn handle(
        &self,
        command: &SlashCommand,
        respond: Responder<SlashCommandResponse>,
    ) -> Result<(), BoxError>;
}

// ============================================================================
// Workflow Steps
// ============================================================================

#[async_trait]
pub trait WorkflowStepEditHandler: Send + Sync {
    async fn handle(&self, edit: &WorkflowStepEdit) -> Result<(), BoxError>;
}

#[async_trait]
pub trait AsyncWorkflowStepEditHandler: Send + Sync {
    async fn handle(&self, edit: &WorkflowStepEdit, respond: Responder) -> Result<(), BoxError>;
}

// ============================================================================
// Legacy
// ============================================================================

/// Handles legacy attachment actions.
#[async_trait]
pub trait InteractiveMessageHandler: Send + Sync {
    /// `Some` replaces or follows up the original message.
    async fn handle(
        &self,
        message: &InteractiveMessage,
    ) -> Result<Option<MessageResponse>, BoxError>;
}

/// Supplies options for a legacy message menu or dialog select.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    async fn get_options(&self, request: &OptionsRequest) -> Result<OptionsResponse, BoxError>;
}

/// Handles submission and cancellation of one legacy dialog.
#[async_trait]
pub trait DialogSubmissionHandler: Send + Sync {
    /// An empty list accepts the submission.
    async fn handle(&self, submission: &DialogSubmission) -> Result<Vec<DialogError>, BoxError>;

    async fn handle_cancel(&self, cancellation: &DialogCancellation) -> Result<(), BoxError>;
}
