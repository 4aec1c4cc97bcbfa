//! Service configuration and the finalized service provider.
//!
//! [`ServiceConfiguration`] is the single place an application registers
//! handlers, category replacements and service overrides. [`build`] consumes
//! it, folds every registry into its index and yields an immutable
//! [`ServiceProvider`]:
//!
//! ```text
//! ServiceConfiguration ──build()──► ServiceProvider
//!   register_*  ──► HandlerRegistry ──► HandlerIndex ─┐
//!   replace_*   ─────────────────────────────────────┴► HandlerTable
//!   use_*       ──► LazyService (value | factory | built-in default)
//! ```
//!
//! Every service is created at most once per provider, on first access.
//!
//! [`build`]: ServiceConfiguration::build

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use tether_core::{
    ApiClient, BaseUrlBuilder, ConfigError, ConfigResult, Container, DefaultTypeResolver,
    FromAction, FromEvent, HttpTransport, JsonSettings, ResolveResult, Resolver,
    SocketModeClient, TransportApiClient, TypeResolver, UnconfiguredTransport, UrlBuilder,
};

use crate::category::{Flavor, HandlerCategory as C};
use crate::context::{RequestContext, RequestContextFactory, ScopedContextFactory};
use crate::dispatch::*;
use crate::dispatcher::Dispatcher;
use crate::factory::{DefaultHandlerFactory, HandlerFactory, HandlerTable, Handling, Replacement};
use crate::handler::adapters::{
    AsyncTypedBlockAction, SyncSlashCommand, SyncViewSubmission, TypedBlockAction, TypedEvent,
};
use crate::handler::*;
use crate::listener::{LoggingRequestListener, RequestListener};
use crate::registry::{HandlerRegistry, Registration, SplitRegistry};
use crate::socket::DefaultSocketModeClient;
use crate::source::HandlerSource;

// =============================================================================
// LazyService
// =============================================================================

type ServiceFactory<T> = Arc<dyn Fn(&ServiceProvider) -> Arc<T> + Send + Sync>;

enum ServiceSource<T: ?Sized> {
    Default,
    Value(Arc<T>),
    Factory(ServiceFactory<T>),
}

/// A provider service: configured value, lazy factory or built-in default,
/// memoized on first access.
pub struct LazyService<T: ?Sized> {
    source: ServiceSource<T>,
    cell: OnceLock<Arc<T>>,
}

impl<T: ?Sized> LazyService<T> {
    fn set(&mut self, source: ServiceSource<T>) {
        self.source = source;
    }

    fn get<D>(&self, provider: &ServiceProvider, default: D) -> Arc<T>
    where
        D: FnOnce(&ServiceProvider) -> Arc<T>,
    {
        let service = self.cell.get_or_init(|| match &self.source {
            ServiceSource::Default => default(provider),
            ServiceSource::Value(value) => Arc::clone(value),
            ServiceSource::Factory(factory) => factory(provider),
        });
        Arc::clone(service)
    }

    /// Returns `true` once the service has been created.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Default for LazyService<T> {
    fn default() -> Self {
        Self {
            source: ServiceSource::Default,
            cell: OnceLock::new(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for LazyService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            ServiceSource::Default => "default",
            ServiceSource::Value(_) => "value",
            ServiceSource::Factory(_) => "factory",
        };
        f.debug_struct("LazyService")
            .field("source", &source)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[derive(Default, Debug)]
struct Services {
    http_transport: LazyService<dyn HttpTransport>,
    json_settings: LazyService<JsonSettings>,
    type_resolver: LazyService<dyn TypeResolver>,
    url_builder: LazyService<dyn UrlBuilder>,
    request_context_factory: LazyService<dyn RequestContextFactory>,
    request_listener: LazyService<dyn RequestListener>,
    handler_factory: LazyService<dyn HandlerFactory>,
    api_client: LazyService<dyn ApiClient>,
    socket_mode_client: LazyService<dyn SocketModeClient>,
}

#[derive(Default)]
struct Registries {
    events: HandlerRegistry<dyn EventHandler>,
    block_actions: SplitRegistry<dyn BlockActionHandler, dyn AsyncBlockActionHandler>,
    block_options: HandlerRegistry<dyn BlockOptionProvider>,
    message_shortcuts: SplitRegistry<dyn MessageShortcutHandler, dyn AsyncMessageShortcutHandler>,
    global_shortcuts: SplitRegistry<dyn GlobalShortcutHandler, dyn AsyncGlobalShortcutHandler>,
    view_submissions: HandlerRegistry<dyn AsyncViewSubmissionHandler>,
    slash_commands: HandlerRegistry<dyn AsyncSlashCommandHandler>,
    workflow_step_edits:
        SplitRegistry<dyn WorkflowStepEditHandler, dyn AsyncWorkflowStepEditHandler>,
    interactive_messages: HandlerRegistry<dyn InteractiveMessageHandler>,
    options: HandlerRegistry<dyn OptionProvider>,
    dialog_submissions: HandlerRegistry<dyn DialogSubmissionHandler>,
}

#[derive(Default)]
struct Replacements {
    events: Option<Replacement<EventIndex, dyn EventHandler>>,
    block_actions: Option<Replacement<BlockActionIndex, dyn AsyncBlockActionHandler>>,
    block_options: Option<Replacement<BlockOptionIndex, dyn BlockOptionProvider>>,
    message_shortcuts: Option<Replacement<MessageShortcutIndex, dyn AsyncMessageShortcutHandler>>,
    global_shortcuts: Option<Replacement<GlobalShortcutIndex, dyn AsyncGlobalShortcutHandler>>,
    view_submissions: Option<Replacement<ViewSubmissionIndex, dyn AsyncViewSubmissionHandler>>,
    slash_commands: Option<Replacement<SlashCommandIndex, dyn AsyncSlashCommandHandler>>,
    workflow_step_edits:
        Option<Replacement<WorkflowStepEditIndex, dyn AsyncWorkflowStepEditHandler>>,
    interactive_messages:
        Option<Replacement<InteractiveMessageIndex, dyn InteractiveMessageHandler>>,
    options: Option<Replacement<OptionIndex, dyn OptionProvider>>,
    dialog_submissions: Option<Replacement<DialogSubmissionIndex, dyn DialogSubmissionHandler>>,
}

// =============================================================================
// ServiceConfiguration
// =============================================================================

macro_rules! use_service {
    ($($field:ident: $ty:ty => $use_value:ident, $use_factory:ident;)*) => {
        $(
            #[doc = concat!("Uses `service` as the `", stringify!($field), "` service.")]
            pub fn $use_value(&mut self, service: Arc<$ty>) -> &mut Self {
                self.services.$field.set(ServiceSource::Value(service));
                self
            }

            #[doc = concat!("Creates the `", stringify!($field), "` service lazily from the provider.")]
            pub fn $use_factory<F>(&mut self, factory: F) -> &mut Self
            where
                F: Fn(&ServiceProvider) -> Arc<$ty> + Send + Sync + 'static,
            {
                self.services.$field.set(ServiceSource::Factory(Arc::new(factory)));
                self
            }
        )*
    };
}

/// Configuration-time builder of a [`ServiceProvider`].
///
/// Handlers of one category and flavor registered under the same key (or
/// subtype) replace each other; generic handlers accumulate in order.
#[derive(Default)]
pub struct ServiceConfiguration {
    resolver: Option<Arc<dyn Resolver>>,
    api_token: Option<String>,
    services: Services,
    registries: Registries,
    replacements: Replacements,
}

impl ServiceConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dependency resolver handlers are resolved from. Each request
    /// runs in its own scope of it.
    pub fn use_resolver(&mut self, resolver: Arc<dyn Resolver>) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the token the default API client sends.
    pub fn use_api_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.api_token = Some(token.into());
        self
    }

    use_service! {
        http_transport: dyn HttpTransport => use_http_transport, use_http_transport_with;
        json_settings: JsonSettings => use_json_settings, use_json_settings_with;
        type_resolver: dyn TypeResolver => use_type_resolver, use_type_resolver_with;
        url_builder: dyn UrlBuilder => use_url_builder, use_url_builder_with;
        request_context_factory: dyn RequestContextFactory
            => use_request_context_factory, use_request_context_factory_with;
        request_listener: dyn RequestListener => use_request_listener, use_request_listener_with;
        handler_factory: dyn HandlerFactory => use_handler_factory, use_handler_factory_with;
        api_client: dyn ApiClient => use_api_client, use_api_client_with;
        socket_mode_client: dyn SocketModeClient
            => use_socket_mode_client, use_socket_mode_client_with;
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Registers a handler receiving every event.
    pub fn register_event_handler(&mut self, source: HandlerSource<dyn EventHandler>) -> &mut Self {
        self.registries.events.register(Registration::Generic(source));
        self
    }

    /// Registers a handler receiving events of type `E` only.
    pub fn register_typed_event_handler<E: FromEvent>(
        &mut self,
        source: HandlerSource<dyn TypedEventHandler<E>>,
    ) -> &mut Self {
        let source = source.map(|handler| Arc::new(TypedEvent(handler)) as Arc<dyn EventHandler>);
        self.registries
            .events
            .register(Registration::Typed(E::EVENT_TYPE, source));
        self
    }

    // =========================================================================
    // Block Actions
    // =========================================================================

    pub fn register_block_action_handler(
        &mut self,
        source: HandlerSource<dyn BlockActionHandler>,
    ) -> &mut Self {
        self.registries
            .block_actions
            .sync
            .register(Registration::Generic(source));
        self
    }

    /// Registers a handler for actions whose `action_id` is `action_id`.
    pub fn register_keyed_block_action_handler(
        &mut self,
        action_id: impl Into<String>,
        source: HandlerSource<dyn BlockActionHandler>,
    ) -> &mut Self {
        self.registries
            .block_actions
            .sync
            .register(Registration::Keyed(action_id.into(), source));
        self
    }

    /// Registers a handler for actions of element type `A`.
    pub fn register_typed_block_action_handler<A: FromAction>(
        &mut self,
        source: HandlerSource<dyn TypedBlockActionHandler<A>>,
    ) -> &mut Self {
        let source = source
            .map(|handler| Arc::new(TypedBlockAction(handler)) as Arc<dyn BlockActionHandler>);
        self.registries
            .block_actions
            .sync
            .register(Registration::Typed(A::ACTION_TYPE, source));
        self
    }

    pub fn register_async_block_action_handler(
        &mut self,
        source: HandlerSource<dyn AsyncBlockActionHandler>,
    ) -> &mut Self {
        self.registries
            .block_actions
            .async_
            .register(Registration::Generic(source));
        self
    }

    pub fn register_keyed_async_block_action_handler(
        &mut self,
        action_id: impl Into<String>,
        source: HandlerSource<dyn AsyncBlockActionHandler>,
    ) -> &mut Self {
        self.registries
            .block_actions
            .async_
            .register(Registration::Keyed(action_id.into(), source));
        self
    }

    pub fn register_typed_async_block_action_handler<A: FromAction>(
        &mut self,
        source: HandlerSource<dyn AsyncTypedBlockActionHandler<A>>,
    ) -> &mut Self {
        let source = source.map(|handler| {
            Arc::new(AsyncTypedBlockAction(handler)) as Arc<dyn AsyncBlockActionHandler>
        });
        self.registries
            .block_actions
            .async_
            .register(Registration::Typed(A::ACTION_TYPE, source));
        self
    }

    /// Registers the option provider of the external select `action_id`.
    pub fn register_block_option_provider(
        &mut self,
        action_id: impl Into<String>,
        source: HandlerSource<dyn BlockOptionProvider>,
    ) -> &mut Self {
        self.registries
            .block_options
            .register(Registration::Keyed(action_id.into(), source));
        self
    }

    // =========================================================================
    // Shortcuts
    // =========================================================================

    pub fn register_message_shortcut_handler(
        &mut self,
        source: HandlerSource<dyn MessageShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .message_shortcuts
            .sync
            .register(Registration::Generic(source));
        self
    }

    pub fn register_message_shortcut_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn MessageShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .message_shortcuts
            .sync
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    pub fn register_async_message_shortcut_handler(
        &mut self,
        source: HandlerSource<dyn AsyncMessageShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .message_shortcuts
            .async_
            .register(Registration::Generic(source));
        self
    }

    pub fn register_async_message_shortcut_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn AsyncMessageShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .message_shortcuts
            .async_
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    pub fn register_global_shortcut_handler(
        &mut self,
        source: HandlerSource<dyn GlobalShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .global_shortcuts
            .sync
            .register(Registration::Generic(source));
        self
    }

    pub fn register_global_shortcut_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn GlobalShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .global_shortcuts
            .sync
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    pub fn register_async_global_shortcut_handler(
        &mut self,
        source: HandlerSource<dyn AsyncGlobalShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .global_shortcuts
            .async_
            .register(Registration::Generic(source));
        self
    }

    pub fn register_async_global_shortcut_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn AsyncGlobalShortcutHandler>,
    ) -> &mut Self {
        self.registries
            .global_shortcuts
            .async_
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Registers the handler of modal `callback_id`.
    ///
    /// Sync and async view handlers share one slot per callback id.
    pub fn register_view_submission_handler(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn ViewSubmissionHandler>,
    ) -> &mut Self {
        let source = source.map(|handler| {
            Arc::new(SyncViewSubmission(handler)) as Arc<dyn AsyncViewSubmissionHandler>
        });
        self.register_async_view_submission_handler(callback_id, source)
    }

    pub fn register_async_view_submission_handler(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn AsyncViewSubmissionHandler>,
    ) -> &mut Self {
        self.registries
            .view_submissions
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    // =========================================================================
    // Slash Commands
    // =========================================================================

    /// Registers the handler of `command`, which must start with `/`.
    pub fn register_slash_command_handler(
        &mut self,
        command: impl Into<String>,
        source: HandlerSource<dyn SlashCommandHandler>,
    ) -> ConfigResult<&mut Self> {
        let source = source.map(|handler| {
            Arc::new(SyncSlashCommand(handler)) as Arc<dyn AsyncSlashCommandHandler>
        });
        self.register_async_slash_command_handler(command, source)
    }

    /// Async counterpart of
    /// [`register_slash_command_handler`](Self::register_slash_command_handler).
    pub fn register_async_slash_command_handler(
        &mut self,
        command: impl Into<String>,
        source: HandlerSource<dyn AsyncSlashCommandHandler>,
    ) -> ConfigResult<&mut Self> {
        let command = command.into();
        validate_command(&command)?;
        self.registries
            .slash_commands
            .register(Registration::Keyed(command, source));
        Ok(self)
    }

    // =========================================================================
    // Workflow Steps
    // =========================================================================

    pub fn register_workflow_step_edit_handler(
        &mut self,
        source: HandlerSource<dyn WorkflowStepEditHandler>,
    ) -> &mut Self {
        self.registries
            .workflow_step_edits
            .sync
            .register(Registration::Generic(source));
        self
    }

    pub fn register_workflow_step_edit_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn WorkflowStepEditHandler>,
    ) -> &mut Self {
        self.registries
            .workflow_step_edits
            .sync
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    pub fn register_async_workflow_step_edit_handler(
        &mut self,
        source: HandlerSource<dyn AsyncWorkflowStepEditHandler>,
    ) -> &mut Self {
        self.registries
            .workflow_step_edits
            .async_
            .register(Registration::Generic(source));
        self
    }

    pub fn register_async_workflow_step_edit_handler_for(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn AsyncWorkflowStepEditHandler>,
    ) -> &mut Self {
        self.registries
            .workflow_step_edits
            .async_
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    // =========================================================================
    // Legacy
    // =========================================================================

    /// Registers the handler of interactive message actions named `name`.
    pub fn register_interactive_message_handler(
        &mut self,
        name: impl Into<String>,
        source: HandlerSource<dyn InteractiveMessageHandler>,
    ) -> &mut Self {
        self.registries
            .interactive_messages
            .register(Registration::Keyed(name.into(), source));
        self
    }

    /// Registers the option provider of the legacy menu `name`.
    pub fn register_option_provider(
        &mut self,
        name: impl Into<String>,
        source: HandlerSource<dyn OptionProvider>,
    ) -> &mut Self {
        self.registries
            .options
            .register(Registration::Keyed(name.into(), source));
        self
    }

    /// Registers the handler of dialog `callback_id`, receiving both
    /// submissions and cancellations.
    pub fn register_dialog_submission_handler(
        &mut self,
        callback_id: impl Into<String>,
        source: HandlerSource<dyn DialogSubmissionHandler>,
    ) -> &mut Self {
        self.registries
            .dialog_submissions
            .register(Registration::Keyed(callback_id.into(), source));
        self
    }

    // =========================================================================
    // Replacements
    // =========================================================================

    /// Replaces how the event category handler is obtained.
    ///
    /// `replace` runs once per request and receives the index of registered
    /// event handlers; registered handlers are only reached through it,
    /// either directly or by wrapping the default [`EventDispatch`].
    pub fn replace_event_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(&RequestContext, &Arc<EventIndex>) -> ResolveResult<Arc<dyn EventHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.events = Some(Arc::new(replace));
        self
    }

    pub fn replace_block_action_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<BlockActionIndex>,
            ) -> ResolveResult<Arc<dyn AsyncBlockActionHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.block_actions = Some(Arc::new(replace));
        self
    }

    pub fn replace_block_option_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<BlockOptionIndex>,
            ) -> ResolveResult<Arc<dyn BlockOptionProvider>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.block_options = Some(Arc::new(replace));
        self
    }

    pub fn replace_message_shortcut_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<MessageShortcutIndex>,
            ) -> ResolveResult<Arc<dyn AsyncMessageShortcutHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.message_shortcuts = Some(Arc::new(replace));
        self
    }

    pub fn replace_global_shortcut_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<GlobalShortcutIndex>,
            ) -> ResolveResult<Arc<dyn AsyncGlobalShortcutHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.global_shortcuts = Some(Arc::new(replace));
        self
    }

    pub fn replace_view_submission_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<ViewSubmissionIndex>,
            ) -> ResolveResult<Arc<dyn AsyncViewSubmissionHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.view_submissions = Some(Arc::new(replace));
        self
    }

    pub fn replace_slash_command_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<SlashCommandIndex>,
            ) -> ResolveResult<Arc<dyn AsyncSlashCommandHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.slash_commands = Some(Arc::new(replace));
        self
    }

    pub fn replace_workflow_step_edit_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<WorkflowStepEditIndex>,
            ) -> ResolveResult<Arc<dyn AsyncWorkflowStepEditHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.workflow_step_edits = Some(Arc::new(replace));
        self
    }

    pub fn replace_interactive_message_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<InteractiveMessageIndex>,
            ) -> ResolveResult<Arc<dyn InteractiveMessageHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.interactive_messages = Some(Arc::new(replace));
        self
    }

    pub fn replace_option_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(&RequestContext, &Arc<OptionIndex>) -> ResolveResult<Arc<dyn OptionProvider>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.options = Some(Arc::new(replace));
        self
    }

    pub fn replace_dialog_submission_handling<F>(&mut self, replace: F) -> &mut Self
    where
        F: Fn(
                &RequestContext,
                &Arc<DialogSubmissionIndex>,
            ) -> ResolveResult<Arc<dyn DialogSubmissionHandler>>
            + Send
            + Sync
            + 'static,
    {
        self.replacements.dialog_submissions = Some(Arc::new(replace));
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Finalizes the configuration.
    pub fn build(self) -> ServiceProvider {
        let Registries {
            events,
            block_actions,
            block_options,
            message_shortcuts,
            global_shortcuts,
            view_submissions,
            slash_commands,
            workflow_step_edits,
            interactive_messages,
            options,
            dialog_submissions,
        } = self.registries;
        let replace = self.replacements;

        let table = HandlerTable {
            events: Handling::new(C::Events, events.build_index(C::Events, Flavor::Sync))
                .with_replacement(replace.events),
            block_actions: Handling::new(C::BlockActions, block_actions.build_index(C::BlockActions))
                .with_replacement(replace.block_actions),
            block_options: Handling::new(
                C::BlockOptions,
                block_options.build_index(C::BlockOptions, Flavor::Sync),
            )
            .with_replacement(replace.block_options),
            message_shortcuts: Handling::new(
                C::MessageShortcuts,
                message_shortcuts.build_index(C::MessageShortcuts),
            )
            .with_replacement(replace.message_shortcuts),
            global_shortcuts: Handling::new(
                C::GlobalShortcuts,
                global_shortcuts.build_index(C::GlobalShortcuts),
            )
            .with_replacement(replace.global_shortcuts),
            view_submissions: Handling::new(
                C::ViewSubmissions,
                view_submissions.build_index(C::ViewSubmissions, Flavor::Async),
            )
            .with_replacement(replace.view_submissions),
            slash_commands: Handling::new(
                C::SlashCommands,
                slash_commands.build_index(C::SlashCommands, Flavor::Async),
            )
            .with_replacement(replace.slash_commands),
            workflow_step_edits: Handling::new(
                C::WorkflowStepEdits,
                workflow_step_edits.build_index(C::WorkflowStepEdits),
            )
            .with_replacement(replace.workflow_step_edits),
            interactive_messages: Handling::new(
                C::InteractiveMessages,
                interactive_messages.build_index(C::InteractiveMessages, Flavor::Sync),
            )
            .with_replacement(replace.interactive_messages),
            options: Handling::new(
                C::LegacyOptions,
                options.build_index(C::LegacyOptions, Flavor::Sync),
            )
            .with_replacement(replace.options),
            dialog_submissions: Handling::new(
                C::DialogSubmissions,
                dialog_submissions.build_index(C::DialogSubmissions, Flavor::Sync),
            )
            .with_replacement(replace.dialog_submissions),
        };
        debug!(?table, "Service configuration built");

        ServiceProvider {
            inner: Arc::new(ProviderInner {
                resolver: self
                    .resolver
                    .unwrap_or_else(|| Arc::new(Container::empty())),
                api_token: self.api_token,
                table: Arc::new(table),
                services: self.services,
            }),
        }
    }
}

impl fmt::Debug for ServiceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfiguration")
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

fn validate_command(command: &str) -> ConfigResult<()> {
    if command.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::invalid_argument(
            "command",
            format!("slash command `{command}` must start with '/'"),
        ))
    }
}

// =============================================================================
// ServiceProvider
// =============================================================================

struct ProviderInner {
    resolver: Arc<dyn Resolver>,
    api_token: Option<String>,
    table: Arc<HandlerTable>,
    services: Services,
}

/// The finalized services of an application.
///
/// Cloning yields another handle to the same services.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    /// The application-level dependency resolver.
    pub fn resolver(&self) -> Arc<dyn Resolver> {
        Arc::clone(&self.inner.resolver)
    }

    pub fn api_token(&self) -> Option<&str> {
        self.inner.api_token.as_deref()
    }

    /// Built indexes and replacements of every category.
    pub fn handler_table(&self) -> &Arc<HandlerTable> {
        &self.inner.table
    }

    pub fn http_transport(&self) -> Arc<dyn HttpTransport> {
        self.inner
            .services
            .http_transport
            .get(self, |_| Arc::new(UnconfiguredTransport))
    }

    pub fn json_settings(&self) -> Arc<JsonSettings> {
        self.inner
            .services
            .json_settings
            .get(self, |_| Arc::new(JsonSettings::default()))
    }

    pub fn type_resolver(&self) -> Arc<dyn TypeResolver> {
        self.inner
            .services
            .type_resolver
            .get(self, |_| Arc::new(DefaultTypeResolver))
    }

    pub fn url_builder(&self) -> Arc<dyn UrlBuilder> {
        self.inner
            .services
            .url_builder
            .get(self, |_| Arc::new(BaseUrlBuilder::default()))
    }

    pub fn request_context_factory(&self) -> Arc<dyn RequestContextFactory> {
        self.inner
            .services
            .request_context_factory
            .get(self, |provider| {
                Arc::new(ScopedContextFactory::new(provider.resolver()))
            })
    }

    pub fn request_listener(&self) -> Arc<dyn RequestListener> {
        self.inner
            .services
            .request_listener
            .get(self, |_| Arc::new(LoggingRequestListener))
    }

    pub fn handler_factory(&self) -> Arc<dyn HandlerFactory> {
        self.inner
            .services
            .handler_factory
            .get(self, |provider| {
                Arc::new(DefaultHandlerFactory::new(Arc::clone(provider.handler_table())))
            })
    }

    pub fn api_client(&self) -> Arc<dyn ApiClient> {
        self.inner.services.api_client.get(self, |provider| {
            Arc::new(TransportApiClient::new(
                provider.http_transport(),
                provider.url_builder(),
                provider.json_settings(),
                provider.api_token().map(str::to_owned),
            ))
        })
    }

    pub fn socket_mode_client(&self) -> Arc<dyn SocketModeClient> {
        self.inner
            .services
            .socket_mode_client
            .get(self, |provider| {
                Arc::new(DefaultSocketModeClient::new(provider.dispatcher()))
            })
    }

    /// A dispatcher over this provider's services.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.request_context_factory(),
            self.request_listener(),
            self.handler_factory(),
            self.type_resolver(),
        )
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.services)
            .field("handlers", &self.inner.table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tether_core::{BoxError, EventCallback, SlashCommand, SlashCommandResponse};

    struct Quiet;

    #[async_trait]
    impl SlashCommandHandler for Quiet {
        async fn handle(
            &self,
            _command: &SlashCommand,
        ) -> Result<Option<SlashCommandResponse>, BoxError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl EventHandler for Counting {
        async fn handle(&self, _event: &EventCallback) -> Result<(), BoxError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn slash_command_must_start_with_slash() {
        let mut config = ServiceConfiguration::new();

        let err = config
            .register_slash_command_handler("foo", HandlerSource::instance(Quiet))
            .err()
            .unwrap();
        assert_eq!(err.param(), "command");

        assert!(
            config
                .register_slash_command_handler("/foo", HandlerSource::instance(Quiet))
                .is_ok()
        );
        let provider = config.build();
        let index = provider.handler_table().slash_commands.index();
        assert_eq!(index.keys().collect::<Vec<_>>(), ["/foo"]);
    }

    #[test]
    fn defaults_are_created_once() {
        let provider = ServiceConfiguration::new().build();
        assert!(Arc::ptr_eq(&provider.url_builder(), &provider.url_builder()));
        assert!(Arc::ptr_eq(
            &provider.handler_factory(),
            &provider.handler_factory()
        ));
        assert!(provider.json_settings().skip_nulls);
        assert_eq!(provider.url_builder().url("chat.postMessage"), "https://slack.com/api/chat.postMessage");
    }

    #[test]
    fn configured_services_win_over_defaults() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();

        let mut config = ServiceConfiguration::new();
        config
            .use_json_settings(Arc::new(JsonSettings { skip_nulls: false }))
            .use_url_builder_with(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(BaseUrlBuilder::new("http://localhost:8080/api"))
            });
        let provider = config.build();

        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!provider.json_settings().skip_nulls);
        assert_eq!(
            provider.url_builder().url("auth.test"),
            "http://localhost:8080/api/auth.test"
        );
        provider.url_builder();
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_factories_see_the_provider() {
        let mut config = ServiceConfiguration::new();
        config.use_api_token("xoxb-test").use_api_client_with(|provider| {
            Arc::new(TransportApiClient::new(
                provider.http_transport(),
                Arc::new(BaseUrlBuilder::new("http://mock")),
                provider.json_settings(),
                provider.api_token().map(str::to_owned),
            ))
        });
        let provider = config.build();

        assert_eq!(provider.api_token(), Some("xoxb-test"));
        let _client = provider.api_client();
        assert!(provider.inner.services.http_transport.is_initialized());
    }

    #[test]
    fn handler_factory_caches_category_handler_per_request() {
        let mut config = ServiceConfiguration::new();
        config.register_event_handler(HandlerSource::from_default::<Counting>());
        let provider = config.build();
        let factory = provider.handler_factory();
        let contexts = provider.request_context_factory();

        let ctx = contexts.create_request_context();
        let a = factory.create_event_handler(&ctx).unwrap();
        let b = factory.create_event_handler(&ctx).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = contexts.create_request_context();
        let c = factory.create_event_handler(&other).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn replacement_supersedes_registrations() {
        let registered = Arc::new(AtomicUsize::new(0));
        let replaced = Arc::new(AtomicUsize::new(0));

        let mut config = ServiceConfiguration::new();
        let counter = registered.clone();
        config.register_event_handler(HandlerSource::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Counting::default()
        }));
        let counter = replaced.clone();
        config.replace_event_handling(move |_, index: &Arc<EventIndex>| {
            assert_eq!(index.generic_len(), 1);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Counting::default()))
        });
        let provider = config.build();
        assert!(provider.handler_table().events.is_replaced());

        let factory = provider.handler_factory();
        let ctx = provider.request_context_factory().create_request_context();
        let a = factory.create_event_handler(&ctx).unwrap();
        let b = factory.create_event_handler(&ctx).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(replaced.load(Ordering::SeqCst), 1);
        assert_eq!(registered.load(Ordering::SeqCst), 0);
    }
}
