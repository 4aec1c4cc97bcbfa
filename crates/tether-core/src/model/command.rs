//! Slash command invocations.

use serde::{Deserialize, Serialize};

/// A slash command invocation, decoded from the form body the platform posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlashCommand {
    /// The command name, including the leading `/`.
    pub command: String,
    /// Everything the user typed after the command.
    pub text: String,
    pub team_id: String,
    pub team_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<String>,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub api_app_id: String,
    pub response_url: String,
    pub trigger_id: String,
}

impl SlashCommand {
    /// Creates an invocation of `command` with the given text.
    pub fn new(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            text: text.into(),
            ..Default::default()
        }
    }
}
