//! Inbound payload model.
//!
//! Every payload family the platform delivers has a serde representation
//! here. The framework only reads the fields it needs for routing (callback
//! ids, action ids, command names, type tags); everything else is carried
//! through to handlers untouched.
//!
//! ```text
//! InboundRequest
//! ├── Event(EventCallback)          ── event: Event { hello | message | … }
//! ├── UrlVerification
//! ├── Interaction(InteractionPayload)
//! │   ├── BlockActions(BlockActionRequest)   ── actions: [BlockAction { button | … }]
//! │   ├── MessageShortcut / GlobalShortcut
//! │   ├── ViewSubmission / ViewClosed
//! │   ├── WorkflowStepEdit
//! │   └── InteractiveMessage / DialogSubmission / DialogCancellation   (legacy)
//! ├── BlockOptions(BlockOptionsRequest)
//! ├── LegacyOptions(OptionsRequest)
//! └── SlashCommand(SlashCommand)
//! ```

pub mod action;
pub mod command;
pub mod common;
pub mod event;
pub mod inbound;
pub mod interaction;
pub mod response;

pub use action::{
    BlockAction, ButtonAction, ChannelSelectAction, CheckboxesAction, ConversationSelectAction,
    DatePickerAction, ExternalSelectAction, FromAction, OverflowAction, PlainTextInputAction,
    RadioButtonsAction, StaticSelectAction, UnknownAction, UserSelectAction,
};
pub use command::SlashCommand;
pub use common::{Channel, OptionGroup, OptionItem, Team, Text, User, ViewInfo};
pub use event::{
    AppHomeOpened, AppMention, ChannelCreated, Event, EventCallback, FromEvent, Goodbye, Hello,
    MessageEvent, ReactionAdded, ReactionRemoved, TeamJoin, UnknownEvent,
};
pub use inbound::{DispatchResponse, InboundRequest, PayloadKind, UrlVerification};
pub use interaction::{
    BlockActionRequest, BlockOptionsRequest, DialogCancellation, DialogSubmission,
    GlobalShortcut, InteractionPayload, InteractiveMessage, LegacyAction, MessageShortcut,
    OptionsRequest, ViewClosed, ViewSubmission, WorkflowStepEdit,
};
pub use response::{
    BlockOptionsResponse, DialogError, LegacyOption, MessageResponse, OptionsResponse,
    ResponseType, SlashCommandResponse, ViewSubmissionResponse,
};
