//! Events API payloads.
//!
//! # Hierarchy
//!
//! ```text
//! EventCallback { team_id, api_app_id, event_id, … }
//! └── Event (dispatch on `type`)
//!     ├── Hello(Hello)
//!     ├── Goodbye(Goodbye)
//!     ├── Message(MessageEvent)
//!     ├── … other event types …
//!     └── Unknown(UnknownEvent { event_type, raw })
//! ```
//!
//! Unrecognized event types are not an error: they decode to
//! [`Event::Unknown`] with the original JSON preserved, so generic handlers
//! still see them.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::common::User;

// ============================================================================
// Envelope
// ============================================================================

/// The `event_callback` envelope wrapping every Events API event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCallback {
    /// Workspace the event belongs to.
    #[serde(default)]
    pub team_id: String,
    /// App the event was delivered to.
    #[serde(default)]
    pub api_app_id: String,
    /// The wrapped event.
    pub event: Event,
    /// Unique id of this delivery.
    #[serde(default)]
    pub event_id: String,
    /// Epoch seconds when the event was dispatched.
    #[serde(default)]
    pub event_time: i64,
    /// Installations the event is visible to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizations: Vec<Value>,
}

impl EventCallback {
    /// Wraps an event in an otherwise empty envelope.
    pub fn new(event: impl Into<Event>) -> Self {
        Self {
            team_id: String::new(),
            api_app_id: String::new(),
            event: event.into(),
            event_id: String::new(),
            event_time: 0,
            authorizations: Vec::new(),
        }
    }
}

// ============================================================================
// FromEvent
// ============================================================================

/// Extracts a concrete event type from an [`Event`].
///
/// Typed event handlers are registered against `EVENT_TYPE` and only receive
/// events for which `from_event` returns `Some`.
pub trait FromEvent: Send + Sync + 'static {
    /// The wire `type` tag of this event.
    const EVENT_TYPE: &'static str;

    /// Borrows the concrete event out of `event` if the variant matches.
    fn from_event(event: &Event) -> Option<&Self>;
}

/// An event whose `type` is not modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEvent {
    /// The wire `type` tag.
    pub event_type: String,
    /// The complete event object.
    pub raw: Value,
}

macro_rules! event_types {
    ($($(#[$meta:meta])* $variant:ident($ty:ident) => $tag:literal,)*) => {
        /// A decoded Events API event.
        #[derive(Debug, Clone)]
        pub enum Event {
            $($(#[$meta])* $variant($ty),)*
            /// Any event type not listed above.
            Unknown(UnknownEvent),
        }

        impl Event {
            /// Returns the wire `type` tag of this event.
            pub fn event_type(&self) -> &str {
                match self {
                    $(Self::$variant(_) => $tag,)*
                    Self::Unknown(e) => e.event_type.as_str(),
                }
            }

            /// Returns the tag typed handlers are registered under, if this
            /// event type is modelled.
            pub fn type_tag(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant(_) => Some($tag),)*
                    Self::Unknown(_) => None,
                }
            }
        }

        $(
            impl FromEvent for $ty {
                const EVENT_TYPE: &'static str = $tag;

                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$variant(e) => Some(e),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Event {
                fn from(e: $ty) -> Self {
                    Event::$variant(e)
                }
            }
        )*

        impl Serialize for Event {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut value = match self {
                    $(Self::$variant(e) => serde_json::to_value(e).map_err(S::Error::custom)?,)*
                    Self::Unknown(e) => return e.raw.serialize(serializer),
                };
                if let Value::Object(map) = &mut value {
                    map.insert("type".to_string(), Value::String(self.event_type().to_string()));
                }
                value.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for Event {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Value::deserialize(deserializer)?;
                let tag = raw
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| D::Error::missing_field("type"))?
                    .to_string();
                match tag.as_str() {
                    $($tag => serde_json::from_value(raw).map(Self::$variant).map_err(D::Error::custom),)*
                    _ => Ok(Self::Unknown(UnknownEvent { event_type: tag, raw })),
                }
            }
        }
    };
}

event_types! {
    /// Sent when a socket-mode connection is established.
    Hello(Hello) => "hello",
    /// Sent before the platform closes a connection.
    Goodbye(Goodbye) => "goodbye",
    /// A message was posted.
    Message(MessageEvent) => "message",
    /// The app was mentioned.
    AppMention(AppMention) => "app_mention",
    /// A reaction was added to an item.
    ReactionAdded(ReactionAdded) => "reaction_added",
    /// A reaction was removed from an item.
    ReactionRemoved(ReactionRemoved) => "reaction_removed",
    /// A channel was created.
    ChannelCreated(ChannelCreated) => "channel_created",
    /// A user joined the workspace.
    TeamJoin(TeamJoin) => "team_join",
    /// A user opened the app's home tab or messages tab.
    AppHomeOpened(AppHomeOpened) => "app_home_opened",
}

// ============================================================================
// Event Types
// ============================================================================

/// Connection established.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hello {}

/// Connection about to close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goodbye {}

/// A message posted to a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub text: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Set for edits, deletions, bot messages and the like.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
}

/// A message mentioning the app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMention {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// The item a reaction refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

/// A reaction was added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionAdded {
    pub user: String,
    pub reaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_user: Option<String>,
    pub item: ReactionItem,
    pub event_ts: String,
}

/// A reaction was removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionRemoved {
    pub user: String,
    pub reaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_user: Option<String>,
    pub item: ReactionItem,
    pub event_ts: String,
}

/// Channel summary carried by `channel_created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedChannel {
    pub id: String,
    pub name: String,
    pub created: i64,
    pub creator: String,
}

/// A channel was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCreated {
    pub channel: CreatedChannel,
}

/// A new member joined the workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamJoin {
    pub user: User,
}

/// The app home was opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppHomeOpened {
    pub user: String,
    pub channel: String,
    /// `home` or `messages`.
    pub tab: String,
    pub event_ts: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_event_types() {
        let event: Event = serde_json::from_value(json!({
            "type": "message",
            "channel": "C1",
            "user": "U1",
            "text": "hi",
            "ts": "1.0"
        }))
        .unwrap();

        let message = MessageEvent::from_event(&event).unwrap();
        assert_eq!(message.text, "hi");
        assert_eq!(event.type_tag(), Some("message"));
        assert!(Hello::from_event(&event).is_none());
    }

    #[test]
    fn unknown_event_keeps_raw_json() {
        let raw = json!({ "type": "pin_added", "channel_id": "C1" });
        let event: Event = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(event.event_type(), "pin_added");
        assert_eq!(event.type_tag(), None);
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn serialized_event_carries_type_tag() {
        let value = serde_json::to_value(Event::from(Goodbye {})).unwrap();
        assert_eq!(value, json!({ "type": "goodbye" }));
    }

    #[test]
    fn callback_envelope_decodes() {
        let callback: EventCallback = serde_json::from_value(json!({
            "type": "event_callback",
            "team_id": "T1",
            "api_app_id": "A1",
            "event_id": "Ev1",
            "event_time": 1700000000,
            "event": { "type": "hello" }
        }))
        .unwrap();

        assert_eq!(callback.team_id, "T1");
        assert!(Hello::from_event(&callback.event).is_some());
    }
}
