//! Interactivity payloads.
//!
//! Everything delivered to the interactivity request URL except option
//! loads. The `type` field selects the variant of [`InteractionPayload`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::BlockAction;
use super::common::{Channel, Team, User, ViewInfo};

/// A decoded interactivity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// Block element actions.
    BlockActions(BlockActionRequest),
    /// Message shortcut.
    #[serde(rename = "message_action")]
    MessageShortcut(MessageShortcut),
    /// Global shortcut.
    #[serde(rename = "shortcut")]
    GlobalShortcut(GlobalShortcut),
    /// Modal submission.
    ViewSubmission(ViewSubmission),
    /// Modal dismissal.
    ViewClosed(ViewClosed),
    /// Workflow step configuration.
    WorkflowStepEdit(WorkflowStepEdit),
    /// Legacy attachment action.
    InteractiveMessage(InteractiveMessage),
    /// Legacy dialog submission.
    DialogSubmission(DialogSubmission),
    /// Legacy dialog cancellation.
    DialogCancellation(DialogCancellation),
}

impl InteractionPayload {
    /// The wire `type` tag of this payload.
    pub fn payload_type(&self) -> &'static str {
        match self {
            Self::BlockActions(_) => "block_actions",
            Self::MessageShortcut(_) => "message_action",
            Self::GlobalShortcut(_) => "shortcut",
            Self::ViewSubmission(_) => "view_submission",
            Self::ViewClosed(_) => "view_closed",
            Self::WorkflowStepEdit(_) => "workflow_step_edit",
            Self::InteractiveMessage(_) => "interactive_message",
            Self::DialogSubmission(_) => "dialog_submission",
            Self::DialogCancellation(_) => "dialog_cancellation",
        }
    }
}

// ============================================================================
// Block Kit
// ============================================================================

/// A `block_actions` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockActionRequest {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub api_app_id: String,
    pub trigger_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    /// Where the element lives (message, view, …), as raw JSON.
    pub container: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    pub actions: Vec<BlockAction>,
}

impl BlockActionRequest {
    /// Creates a request carrying a single action.
    pub fn new(action: impl Into<BlockAction>) -> Self {
        Self {
            actions: vec![action.into()],
            ..Default::default()
        }
    }

    /// The action that routes this request: the first one.
    pub fn action(&self) -> Option<&BlockAction> {
        self.actions.first()
    }
}

/// A `block_suggestion` options load for an external select.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockOptionsRequest {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub api_app_id: String,
    pub action_id: String,
    pub block_id: String,
    /// What the user has typed so far.
    pub value: String,
    pub container: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewInfo>,
}

impl BlockOptionsRequest {
    /// Creates an options request for `action_id`.
    pub fn new(action_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Shortcuts
// ============================================================================

/// A `message_action` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageShortcut {
    pub callback_id: String,
    pub trigger_id: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub message_ts: String,
    pub message: Value,
    pub response_url: String,
}

impl MessageShortcut {
    /// Creates a shortcut with the given `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }
}

/// A global `shortcut` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalShortcut {
    pub callback_id: String,
    pub trigger_id: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub action_ts: String,
}

impl GlobalShortcut {
    /// Creates a shortcut with the given `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// A `view_submission` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSubmission {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub api_app_id: String,
    pub trigger_id: String,
    pub view: ViewInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_urls: Vec<Value>,
}

impl ViewSubmission {
    /// Creates a submission for a modal with the given `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            view: ViewInfo::modal(callback_id),
            ..Default::default()
        }
    }
}

/// A `view_closed` interaction, sent when `notify_on_close` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewClosed {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub api_app_id: String,
    pub view: ViewInfo,
    /// Set when the whole view stack was closed.
    pub is_cleared: bool,
}

impl ViewClosed {
    /// Creates a close notification for a modal with the given `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            view: ViewInfo::modal(callback_id),
            ..Default::default()
        }
    }
}

// ============================================================================
// Workflow Steps
// ============================================================================

/// A `workflow_step_edit` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowStepEdit {
    pub callback_id: String,
    pub trigger_id: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub workflow_step: Value,
}

impl WorkflowStepEdit {
    /// Creates an edit request with the given `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Legacy
// ============================================================================

/// One action of a legacy attachment interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyAction {
    pub name: String,
    /// `button` or `select`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<HashMap<String, String>>,
}

impl LegacyAction {
    /// Creates a button action with the given name.
    pub fn button(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "button".to_string(),
            value: Some(value.into()),
            selected_options: Vec::new(),
        }
    }
}

/// A legacy `interactive_message` (attachment action) interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveMessage {
    pub callback_id: String,
    pub actions: Vec<LegacyAction>,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub action_ts: String,
    pub message_ts: String,
    pub attachment_id: String,
    pub response_url: String,
    pub trigger_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_message: Option<Value>,
}

impl InteractiveMessage {
    /// Creates an interaction carrying a single action.
    pub fn new(action: LegacyAction) -> Self {
        Self {
            actions: vec![action],
            ..Default::default()
        }
    }

    /// The action that routes this request: the first one.
    pub fn action(&self) -> Option<&LegacyAction> {
        self.actions.first()
    }
}

/// A legacy options load for a message menu or dialog select.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsRequest {
    /// `interactive_message` or `dialog_suggestion`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub value: String,
    pub callback_id: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub action_ts: String,
}

impl OptionsRequest {
    /// Creates an options request for the menu `name`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: "interactive_message".to_string(),
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

/// A legacy `dialog_submission` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogSubmission {
    pub callback_id: String,
    /// Opaque state echoed from the dialog.
    pub state: String,
    pub submission: HashMap<String, Value>,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub action_ts: String,
    pub response_url: String,
}

impl DialogSubmission {
    /// Creates a submission for the dialog `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }
}

/// A legacy `dialog_cancellation` interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogCancellation {
    pub callback_id: String,
    pub state: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub action_ts: String,
    pub response_url: String,
}

impl DialogCancellation {
    /// Creates a cancellation for the dialog `callback_id`.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: callback_id.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_block_actions_by_type() {
        let payload: InteractionPayload = serde_json::from_value(json!({
            "type": "block_actions",
            "user": { "id": "U1" },
            "trigger_id": "t1",
            "actions": [
                { "type": "overflow", "action_id": "menu", "block_id": "b" },
                { "type": "button", "action_id": "ok", "block_id": "b" }
            ]
        }))
        .unwrap();

        let InteractionPayload::BlockActions(request) = payload else {
            panic!("expected block actions");
        };
        assert_eq!(request.actions.len(), 2);
        assert_eq!(request.action().unwrap().action_id(), "menu");
    }

    #[test]
    fn decodes_view_submission_callback() {
        let payload: InteractionPayload = serde_json::from_value(json!({
            "type": "view_submission",
            "user": { "id": "U1" },
            "view": { "id": "V1", "type": "modal", "callback_id": "survey" }
        }))
        .unwrap();

        assert_eq!(payload.payload_type(), "view_submission");
        let InteractionPayload::ViewSubmission(submission) = payload else {
            panic!("expected view submission");
        };
        assert_eq!(submission.view.callback_id, "survey");
    }

    #[test]
    fn shortcut_tags_follow_wire_names() {
        let payload: InteractionPayload = serde_json::from_value(json!({
            "type": "message_action",
            "callback_id": "quote",
            "message": { "text": "hello" }
        }))
        .unwrap();
        assert!(matches!(payload, InteractionPayload::MessageShortcut(ref s) if s.callback_id == "quote"));

        let value = serde_json::to_value(InteractionPayload::GlobalShortcut(GlobalShortcut::new(
            "new_ticket",
        )))
        .unwrap();
        assert_eq!(value["type"], "shortcut");
    }
}
