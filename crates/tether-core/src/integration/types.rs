//! Classification of raw inbound JSON.

use serde_json::Value;

use crate::model::PayloadKind;

/// Decides which payload family a raw JSON document belongs to.
pub trait TypeResolver: Send + Sync {
    /// Returns `None` when the document is not recognized.
    fn classify(&self, payload: &Value) -> Option<PayloadKind>;
}

/// Classifies by the `type` discriminator; slash-command bodies, which have
/// none, are recognized by their `command` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeResolver;

impl TypeResolver for DefaultTypeResolver {
    fn classify(&self, payload: &Value) -> Option<PayloadKind> {
        let kind = match payload.get("type").and_then(Value::as_str) {
            Some("event_callback") => PayloadKind::EventCallback,
            Some("url_verification") => PayloadKind::UrlVerification,
            Some("block_suggestion") => PayloadKind::BlockSuggestion,
            Some("dialog_suggestion") => PayloadKind::LegacyOptions,
            // Attachment actions and attachment menu option loads share a tag.
            Some("interactive_message") if payload.get("actions").is_some() => {
                PayloadKind::Interaction
            }
            Some("interactive_message") => PayloadKind::LegacyOptions,
            Some(
                "block_actions" | "message_action" | "shortcut" | "view_submission"
                | "view_closed" | "workflow_step_edit" | "dialog_submission"
                | "dialog_cancellation",
            ) => PayloadKind::Interaction,
            Some(_) => return None,
            None if payload.get("command").and_then(Value::as_str).is_some() => {
                PayloadKind::SlashCommand
            }
            None => return None,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_families() {
        let resolver = DefaultTypeResolver;
        let cases = [
            (json!({ "type": "event_callback" }), Some(PayloadKind::EventCallback)),
            (json!({ "type": "url_verification" }), Some(PayloadKind::UrlVerification)),
            (json!({ "type": "block_actions" }), Some(PayloadKind::Interaction)),
            (json!({ "type": "block_suggestion" }), Some(PayloadKind::BlockSuggestion)),
            (
                json!({ "type": "interactive_message", "actions": [] }),
                Some(PayloadKind::Interaction),
            ),
            (
                json!({ "type": "interactive_message", "name": "menu" }),
                Some(PayloadKind::LegacyOptions),
            ),
            (json!({ "command": "/echo" }), Some(PayloadKind::SlashCommand)),
            (json!({ "type": "app_rate_limited" }), None),
            (json!({}), None),
        ];

        for (payload, expected) in cases {
            assert_eq!(resolver.classify(&payload), expected, "{payload}");
        }
    }
}
