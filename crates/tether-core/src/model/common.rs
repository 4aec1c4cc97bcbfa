//! Types shared by several payload families.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user who triggered an interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl User {
    /// Creates a user reference with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// The workspace an interaction came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// The conversation an interaction happened in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A text object (`plain_text` or `mrkdwn`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "type", default = "plain_text")]
    pub kind: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

fn plain_text() -> String {
    "plain_text".to_string()
}

impl Text {
    /// Creates a `plain_text` object.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: plain_text(),
            text: text.into(),
            emoji: None,
        }
    }
}

/// One selectable option of a block element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub text: Text,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Text>,
}

impl OptionItem {
    /// Creates an option with a plain-text label.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: Text::plain(label),
            value: value.into(),
            description: None,
        }
    }
}

/// A labelled group of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: Text,
    pub options: Vec<OptionItem>,
}

/// The modal or home-tab view an interaction refers to.
///
/// `state` and `blocks` are kept as raw JSON; reading input values is the
/// handler's business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewInfo {
    pub id: String,
    pub callback_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub private_metadata: String,
    pub hash: String,
    pub state: Value,
    pub blocks: Vec<Value>,
}

impl ViewInfo {
    /// Creates a modal view reference with the given callback id.
    pub fn modal(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            kind: "modal".to_string(),
            ..Default::default()
        }
    }
}
