//! Synchronous response bodies.
//!
//! Payload families that expect an answer in the HTTP response (or in the
//! socket-mode acknowledgement) produce one of these.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{OptionGroup, OptionItem};

/// Options returned for an external select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockOptionsResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_groups: Vec<OptionGroup>,
}

impl BlockOptionsResponse {
    /// Creates a flat options list.
    pub fn options(options: Vec<OptionItem>) -> Self {
        Self {
            options,
            option_groups: Vec::new(),
        }
    }
}

/// What to do with a submitted modal.
///
/// No response at all (`None` from the handler) closes the current view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response_action", rename_all = "snake_case")]
pub enum ViewSubmissionResponse {
    /// Close every view in the stack.
    Clear,
    /// Replace the current view.
    Update { view: Value },
    /// Push a new view onto the stack.
    Push { view: Value },
    /// Keep the view open and show errors next to the named blocks.
    Errors { errors: HashMap<String, String> },
}

impl ViewSubmissionResponse {
    /// Creates an `errors` response with a single block error.
    pub fn error(block_id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(block_id.into(), message.into());
        Self::Errors { errors }
    }
}

/// Visibility of a message posted in response to a command or action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the invoking user sees the message.
    #[default]
    Ephemeral,
    /// Everyone in the channel sees the message.
    InChannel,
}

/// The immediate answer to a slash command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlashCommandResponse {
    #[serde(default)]
    pub response_type: ResponseType,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Value>,
}

impl SlashCommandResponse {
    /// Creates an ephemeral text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Makes the response visible to the whole channel.
    pub fn in_channel(mut self) -> Self {
        self.response_type = ResponseType::InChannel;
        self
    }
}

/// A message sent back for a legacy interactive message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(default)]
    pub replace_original: bool,
    #[serde(default)]
    pub delete_original: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
}

impl MessageResponse {
    /// Creates a response that replaces the original message with `text`.
    pub fn replace(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            replace_original: true,
            ..Default::default()
        }
    }
}

/// One option of a legacy menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOption {
    pub text: String,
    pub value: String,
}

impl LegacyOption {
    /// Creates an option.
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Options returned for a legacy menu or dialog select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<LegacyOption>,
}

/// A validation error for one dialog element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogError {
    /// The element `name`.
    pub name: String,
    pub error: String,
}

impl DialogError {
    /// Creates an error for the element `name`.
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}
