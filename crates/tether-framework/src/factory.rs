//! Handler factory: one category handler per category and request.
//!
//! Resolution follows three levels of override:
//!
//! 1. the whole [`HandlerFactory`] can be swapped on the service
//!    configuration;
//! 2. a category's handling can be replaced by a closure that receives the
//!    request context and the category's index, cached under
//!    [`Slot::Replaced`];
//! 3. otherwise the default category handler from [`crate::dispatch`] is
//!    built, cached under [`Slot::Category`], and resolves registered
//!    handlers lazily through the index.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use tether_core::ResolveResult;

use crate::category::HandlerCategory;
use crate::context::{RequestContext, Slot, SlotKey};
use crate::dispatch::*;
use crate::handler::*;

/// Builds a category handler in place of the default one.
///
/// The index is passed as the `Arc` the default handler is built from, so a
/// replacement can also wrap that handler (`EventDispatch::new(ctx,
/// Arc::clone(index))`).
pub type Replacement<I, H> =
    Arc<dyn Fn(&RequestContext, &Arc<I>) -> ResolveResult<Arc<H>> + Send + Sync>;

/// How one category obtains its handler.
pub struct Handling<I, H: ?Sized> {
    category: HandlerCategory,
    index: Arc<I>,
    replacement: Option<Replacement<I, H>>,
}

impl<I, H> Handling<I, H>
where
    I: Send + Sync + 'static,
    H: ?Sized + Send + Sync + 'static,
{
    pub fn new(category: HandlerCategory, index: I) -> Self {
        Self {
            category,
            index: Arc::new(index),
            replacement: None,
        }
    }

    /// Installs a replacement. The index stays available to it.
    pub fn with_replacement(mut self, replacement: Option<Replacement<I, H>>) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    pub fn is_replaced(&self) -> bool {
        self.replacement.is_some()
    }

    /// Returns the category handler for `ctx`, creating it on first use.
    pub fn create<T, B>(&self, ctx: &RequestContext, build: B) -> ResolveResult<Arc<H>>
    where
        T: Upcast<H>,
        B: FnOnce(&RequestContext, Arc<I>) -> T,
    {
        match &self.replacement {
            Some(replace) => {
                let slot = SlotKey::new(self.category, Slot::Replaced);
                ctx.get_or_create(slot, || {
                    trace!(category = %self.category, "Creating replaced handler");
                    replace(ctx, &self.index)
                })
            }
            None => {
                let slot = SlotKey::new(self.category, Slot::Category);
                ctx.get_or_create(slot, || {
                    trace!(category = %self.category, "Creating category handler");
                    Ok(Arc::new(build(ctx, Arc::clone(&self.index))).upcast())
                })
            }
        }
    }
}

impl<I, H: ?Sized> fmt::Debug for Handling<I, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handling")
            .field("category", &self.category)
            .field("replaced", &self.replacement.is_some())
            .finish_non_exhaustive()
    }
}

/// Built indexes and replacements of every category.
pub struct HandlerTable {
    pub events: Handling<EventIndex, dyn EventHandler>,
    pub block_actions: Handling<BlockActionIndex, dyn AsyncBlockActionHandler>,
    pub block_options: Handling<BlockOptionIndex, dyn BlockOptionProvider>,
    pub message_shortcuts: Handling<MessageShortcutIndex, dyn AsyncMessageShortcutHandler>,
    pub global_shortcuts: Handling<GlobalShortcutIndex, dyn AsyncGlobalShortcutHandler>,
    pub view_submissions: Handling<ViewSubmissionIndex, dyn AsyncViewSubmissionHandler>,
    pub slash_commands: Handling<SlashCommandIndex, dyn AsyncSlashCommandHandler>,
    pub workflow_step_edits: Handling<WorkflowStepEditIndex, dyn AsyncWorkflowStepEditHandler>,
    pub interactive_messages: Handling<InteractiveMessageIndex, dyn InteractiveMessageHandler>,
    pub options: Handling<OptionIndex, dyn OptionProvider>,
    pub dialog_submissions: Handling<DialogSubmissionIndex, dyn DialogSubmissionHandler>,
}

impl Default for HandlerTable {
    /// No registrations and no replacements.
    fn default() -> Self {
        use crate::category::{Flavor, HandlerCategory as C};
        use crate::index::{HandlerIndex, SplitIndex};

        Self {
            events: Handling::new(C::Events, HandlerIndex::empty(C::Events, Flavor::Sync)),
            block_actions: Handling::new(C::BlockActions, SplitIndex::empty(C::BlockActions)),
            block_options: Handling::new(
                C::BlockOptions,
                HandlerIndex::empty(C::BlockOptions, Flavor::Sync),
            ),
            message_shortcuts: Handling::new(
                C::MessageShortcuts,
                SplitIndex::empty(C::MessageShortcuts),
            ),
            global_shortcuts: Handling::new(
                C::GlobalShortcuts,
                SplitIndex::empty(C::GlobalShortcuts),
            ),
            view_submissions: Handling::new(
                C::ViewSubmissions,
                HandlerIndex::empty(C::ViewSubmissions, Flavor::Async),
            ),
            slash_commands: Handling::new(
                C::SlashCommands,
                HandlerIndex::empty(C::SlashCommands, Flavor::Async),
            ),
            workflow_step_edits: Handling::new(
                C::WorkflowStepEdits,
                SplitIndex::empty(C::WorkflowStepEdits),
            ),
            interactive_messages: Handling::new(
                C::InteractiveMessages,
                HandlerIndex::empty(C::InteractiveMessages, Flavor::Sync),
            ),
            options: Handling::new(
                C::LegacyOptions,
                HandlerIndex::empty(C::LegacyOptions, Flavor::Sync),
            ),
            dialog_submissions: Handling::new(
                C::DialogSubmissions,
                HandlerIndex::empty(C::DialogSubmissions, Flavor::Sync),
            ),
        }
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("events", &self.events)
            .field("block_actions", &self.block_actions)
            .field("block_options", &self.block_options)
            .field("message_shortcuts", &self.message_shortcuts)
            .field("global_shortcuts", &self.global_shortcuts)
            .field("view_submissions", &self.view_submissions)
            .field("slash_commands", &self.slash_commands)
            .field("workflow_step_edits", &self.workflow_step_edits)
            .field("interactive_messages", &self.interactive_messages)
            .field("options", &self.options)
            .field("dialog_submissions", &self.dialog_submissions)
            .finish()
    }
}

// =============================================================================
// HandlerFactory
// =============================================================================

/// Supplies the category handler for each payload category.
///
/// Repeated calls with the same context return the same instance.
pub trait HandlerFactory: Send + Sync {
    fn create_event_handler(&self, ctx: &RequestContext) -> ResolveResult<Arc<dyn EventHandler>>;

    fn create_block_action_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncBlockActionHandler>>;

    fn create_block_option_provider(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn BlockOptionProvider>>;

    fn create_message_shortcut_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncMessageShortcutHandler>>;

    fn create_global_shortcut_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncGlobalShortcutHandler>>;

    fn create_view_submission_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncViewSubmissionHandler>>;

    fn create_slash_command_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncSlashCommandHandler>>;

    fn create_workflow_step_edit_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncWorkflowStepEditHandler>>;

    fn create_interactive_message_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn InteractiveMessageHandler>>;

    fn create_option_provider(&self, ctx: &RequestContext) -> ResolveResult<Arc<dyn OptionProvider>>;

    fn create_dialog_submission_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn DialogSubmissionHandler>>;
}

/// Factory backed by a [`HandlerTable`].
#[derive(Debug, Clone)]
pub struct DefaultHandlerFactory {
    table: Arc<HandlerTable>,
}

impl DefaultHandlerFactory {
    pub fn new(table: Arc<HandlerTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<HandlerTable> {
        &self.table
    }
}

impl HandlerFactory for DefaultHandlerFactory {
    fn create_event_handler(&self, ctx: &RequestContext) -> ResolveResult<Arc<dyn EventHandler>> {
        self.table.events.create(ctx, EventDispatch::new)
    }

    fn create_block_action_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncBlockActionHandler>> {
        self.table.block_actions.create(ctx, BlockActionDispatch::new)
    }

    fn create_block_option_provider(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn BlockOptionProvider>> {
        self.table.block_options.create(ctx, BlockOptionDispatch::new)
    }

    fn create_message_shortcut_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncMessageShortcutHandler>> {
        self.table
            .message_shortcuts
            .create(ctx, MessageShortcutDispatch::new)
    }

    fn create_global_shortcut_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncGlobalShortcutHandler>> {
        self.table
            .global_shortcuts
            .create(ctx, GlobalShortcutDispatch::new)
    }

    fn create_view_submission_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncViewSubmissionHandler>> {
        self.table
            .view_submissions
            .create(ctx, ViewSubmissionDispatch::new)
    }

    fn create_slash_command_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncSlashCommandHandler>> {
        self.table
            .slash_commands
            .create(ctx, SlashCommandDispatch::new)
    }

    fn create_workflow_step_edit_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn AsyncWorkflowStepEditHandler>> {
        self.table
            .workflow_step_edits
            .create(ctx, WorkflowStepEditDispatch::new)
    }

    fn create_interactive_message_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn InteractiveMessageHandler>> {
        self.table
            .interactive_messages
            .create(ctx, InteractiveMessageDispatch::new)
    }

    fn create_option_provider(&self, ctx: &RequestContext) -> ResolveResult<Arc<dyn OptionProvider>> {
        self.table.options.create(ctx, OptionDispatch::new)
    }

    fn create_dialog_submission_handler(
        &self,
        ctx: &RequestContext,
    ) -> ResolveResult<Arc<dyn DialogSubmissionHandler>> {
        self.table
            .dialog_submissions
            .create(ctx, DialogSubmissionDispatch::new)
    }
}
