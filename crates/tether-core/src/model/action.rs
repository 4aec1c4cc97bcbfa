//! Block element actions.
//!
//! A `block_actions` interaction carries one or more [`BlockAction`]s,
//! tagged by the element `type`. Typed block-action handlers are registered
//! per element type through [`FromAction`].

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::common::{OptionItem, Text};

/// Extracts a concrete element action from a [`BlockAction`].
pub trait FromAction: Send + Sync + 'static {
    /// The element `type` tag.
    const ACTION_TYPE: &'static str;

    /// Borrows the concrete action out of `action` if the variant matches.
    fn from_action(action: &BlockAction) -> Option<&Self>;
}

/// An action from an element type that is not modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownAction {
    /// The element `type` tag.
    pub action_type: String,
    /// The complete action object.
    pub raw: Value,
}

macro_rules! action_types {
    ($($(#[$meta:meta])* $variant:ident($ty:ident) => $tag:literal,)*) => {
        /// One element action of a `block_actions` interaction.
        #[derive(Debug, Clone)]
        pub enum BlockAction {
            $($(#[$meta])* $variant($ty),)*
            /// Any element type not listed above.
            Unknown(UnknownAction),
        }

        impl BlockAction {
            /// The `action_id` assigned to the element.
            pub fn action_id(&self) -> &str {
                match self {
                    $(Self::$variant(a) => a.action_id.as_str(),)*
                    Self::Unknown(a) => a.raw.get("action_id").and_then(Value::as_str).unwrap_or_default(),
                }
            }

            /// The `block_id` of the block containing the element.
            pub fn block_id(&self) -> &str {
                match self {
                    $(Self::$variant(a) => a.block_id.as_str(),)*
                    Self::Unknown(a) => a.raw.get("block_id").and_then(Value::as_str).unwrap_or_default(),
                }
            }

            /// The wire `type` tag of the element.
            pub fn action_type(&self) -> &str {
                match self {
                    $(Self::$variant(_) => $tag,)*
                    Self::Unknown(a) => a.action_type.as_str(),
                }
            }

            /// Returns the tag typed handlers are registered under, if this
            /// element type is modelled.
            pub fn type_tag(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant(_) => Some($tag),)*
                    Self::Unknown(_) => None,
                }
            }
        }

        $(
            impl FromAction for $ty {
                const ACTION_TYPE: &'static str = $tag;

                fn from_action(action: &BlockAction) -> Option<&Self> {
                    match action {
                        BlockAction::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for BlockAction {
                fn from(a: $ty) -> Self {
                    BlockAction::$variant(a)
                }
            }
        )*

        impl Serialize for BlockAction {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut value = match self {
                    $(Self::$variant(a) => serde_json::to_value(a).map_err(S::Error::custom)?,)*
                    Self::Unknown(a) => return a.raw.serialize(serializer),
                };
                if let Value::Object(map) = &mut value {
                    map.insert("type".to_string(), Value::String(self.action_type().to_string()));
                }
                value.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for BlockAction {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Value::deserialize(deserializer)?;
                let tag = raw
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| D::Error::missing_field("type"))?
                    .to_string();
                match tag.as_str() {
                    $($tag => serde_json::from_value(raw).map(Self::$variant).map_err(D::Error::custom),)*
                    _ => Ok(Self::Unknown(UnknownAction { action_type: tag, raw })),
                }
            }
        }
    };
}

action_types! {
    /// A button was clicked.
    Button(ButtonAction) => "button",
    /// An overflow menu item was chosen.
    Overflow(OverflowAction) => "overflow",
    /// A static select option was chosen.
    StaticSelect(StaticSelectAction) => "static_select",
    /// An external select option was chosen.
    ExternalSelect(ExternalSelectAction) => "external_select",
    /// A user was picked.
    UserSelect(UserSelectAction) => "users_select",
    /// A conversation was picked.
    ConversationSelect(ConversationSelectAction) => "conversations_select",
    /// A public channel was picked.
    ChannelSelect(ChannelSelectAction) => "channels_select",
    /// A date was picked.
    DatePicker(DatePickerAction) => "datepicker",
    /// Checkbox selection changed.
    Checkboxes(CheckboxesAction) => "checkboxes",
    /// A radio button was chosen.
    RadioButtons(RadioButtonsAction) => "radio_buttons",
    /// A plain-text input dispatched its value.
    PlainTextInput(PlainTextInputAction) => "plain_text_input",
}

// ============================================================================
// Element Actions
// ============================================================================

/// `button` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `primary`, `danger`, or absent for the default style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl ButtonAction {
    /// Creates a button action with the given `action_id`.
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            ..Default::default()
        }
    }
}

/// `overflow` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverflowAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionItem>,
}

impl OverflowAction {
    /// Creates an overflow action with the given `action_id`.
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            ..Default::default()
        }
    }
}

/// `static_select` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSelectAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionItem>,
}

/// `external_select` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSelectAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionItem>,
}

/// `users_select` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSelectAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_user: Option<String>,
}

/// `conversations_select` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSelectAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_conversation: Option<String>,
}

/// `channels_select` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSelectAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_channel: Option<String>,
}

/// `datepicker` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePickerAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<String>,
}

/// `checkboxes` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckboxesAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    pub selected_options: Vec<OptionItem>,
}

/// `radio_buttons` element action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioButtonsAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionItem>,
}

/// `plain_text_input` element action (dispatch-action inputs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextInputAction {
    pub action_id: String,
    pub block_id: String,
    pub action_ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_button_action() {
        let action: BlockAction = serde_json::from_value(json!({
            "type": "button",
            "action_id": "approve",
            "block_id": "b1",
            "value": "42",
            "text": { "type": "plain_text", "text": "Approve" }
        }))
        .unwrap();

        assert_eq!(action.action_id(), "approve");
        assert_eq!(action.type_tag(), Some("button"));
        let button = ButtonAction::from_action(&action).unwrap();
        assert_eq!(button.value.as_deref(), Some("42"));
        assert!(OverflowAction::from_action(&action).is_none());
    }

    #[test]
    fn unknown_element_keeps_action_id() {
        let action: BlockAction = serde_json::from_value(json!({
            "type": "rich_text_input",
            "action_id": "notes",
            "block_id": "b2"
        }))
        .unwrap();

        assert_eq!(action.action_type(), "rich_text_input");
        assert_eq!(action.action_id(), "notes");
        assert_eq!(action.block_id(), "b2");
        assert_eq!(action.type_tag(), None);
    }
}
