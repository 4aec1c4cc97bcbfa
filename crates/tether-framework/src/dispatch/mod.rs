//! Category handlers: the default handler the factory returns per category.
//!
//! Each one extracts the routing key (and subtype, where the category has
//! one) from the payload, resolves matching handlers through its index and
//! the request context, and invokes them in a fixed order:
//!
//! 1. the keyed handler, or the typed handler when no key matched
//!    (sync flavor first, then async);
//! 2. every generic handler in registration order (sync, then async).
//!
//! The first error stops the sequence and is returned unchanged.
//!
//! | category              | routing key                    | subtype          |
//! |-----------------------|--------------------------------|------------------|
//! | events                |                                | event `type`     |
//! | block actions         | first action's `action_id`     | its `type`       |
//! | block options         | `action_id`                    |                  |
//! | shortcuts             | `callback_id`                  |                  |
//! | view submissions      | `view.callback_id`             |                  |
//! | slash commands        | `command`                      |                  |
//! | workflow step edits   | `callback_id`                  |                  |
//! | interactive messages  | first action's `name`          |                  |
//! | legacy options        | `name`                         |                  |
//! | dialog submissions    | `callback_id`                  |                  |
//!
//! Category handlers are cached in the request context they resolve from,
//! so they only keep a weak handle to it.

mod block_actions;
mod commands;
mod events;
mod legacy;
mod options;
mod shortcuts;
mod views;
mod workflow;

pub use block_actions::BlockActionDispatch;
pub use commands::SlashCommandDispatch;
pub use events::EventDispatch;
pub use legacy::{DialogSubmissionDispatch, InteractiveMessageDispatch, OptionDispatch};
pub use options::BlockOptionDispatch;
pub use shortcuts::{GlobalShortcutDispatch, MessageShortcutDispatch};
pub use views::ViewSubmissionDispatch;
pub use workflow::WorkflowStepEditDispatch;

use crate::handler::*;
use crate::index::{HandlerIndex, SplitIndex};

pub type EventIndex = HandlerIndex<dyn EventHandler>;
pub type BlockActionIndex = SplitIndex<dyn BlockActionHandler, dyn AsyncBlockActionHandler>;
pub type BlockOptionIndex = HandlerIndex<dyn BlockOptionProvider>;
pub type MessageShortcutIndex =
    SplitIndex<dyn MessageShortcutHandler, dyn AsyncMessageShortcutHandler>;
pub type GlobalShortcutIndex = SplitIndex<dyn GlobalShortcutHandler, dyn AsyncGlobalShortcutHandler>;
pub type ViewSubmissionIndex = HandlerIndex<dyn AsyncViewSubmissionHandler>;
pub type SlashCommandIndex = HandlerIndex<dyn AsyncSlashCommandHandler>;
pub type WorkflowStepEditIndex =
    SplitIndex<dyn WorkflowStepEditHandler, dyn AsyncWorkflowStepEditHandler>;
pub type InteractiveMessageIndex = HandlerIndex<dyn InteractiveMessageHandler>;
pub type OptionIndex = HandlerIndex<dyn OptionProvider>;
pub type DialogSubmissionIndex = HandlerIndex<dyn DialogSubmissionHandler>;
