//! Payload categories and handler flavors.

use std::fmt;

/// One payload family, with its own registries, index and dispatch handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerCategory {
    Events,
    BlockActions,
    BlockOptions,
    MessageShortcuts,
    GlobalShortcuts,
    ViewSubmissions,
    SlashCommands,
    WorkflowStepEdits,
    InteractiveMessages,
    LegacyOptions,
    DialogSubmissions,
}

impl HandlerCategory {
    /// Every category, in declaration order.
    pub const ALL: [HandlerCategory; 11] = [
        Self::Events,
        Self::BlockActions,
        Self::BlockOptions,
        Self::MessageShortcuts,
        Self::GlobalShortcuts,
        Self::ViewSubmissions,
        Self::SlashCommands,
        Self::WorkflowStepEdits,
        Self::InteractiveMessages,
        Self::LegacyOptions,
        Self::DialogSubmissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::BlockActions => "block_actions",
            Self::BlockOptions => "block_options",
            Self::MessageShortcuts => "message_shortcuts",
            Self::GlobalShortcuts => "global_shortcuts",
            Self::ViewSubmissions => "view_submissions",
            Self::SlashCommands => "slash_commands",
            Self::WorkflowStepEdits => "workflow_step_edits",
            Self::InteractiveMessages => "interactive_messages",
            Self::LegacyOptions => "legacy_options",
            Self::DialogSubmissions => "dialog_submissions",
        }
    }
}

impl fmt::Display for HandlerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a handler answers with a return value or through a responder.
///
/// Sync and async handlers of the same category live in independent
/// registries and never share a cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Sync,
    Async,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sync => "sync",
            Self::Async => "async",
        })
    }
}
