//! Conversion from concrete handler types to handler trait objects.
//!
//! Handler sources are generic over the trait object they produce
//! (`dyn EventHandler`, `dyn TypedEventHandler<Hello>`, ...). [`Upcast`] lets
//! them accept any concrete type implementing that trait and erase it
//! behind an `Arc` without naming the coercion at every call site.

use std::sync::Arc;

use tether_core::{FromAction, FromEvent};

use super::traits::*;

/// Erases `Arc<Self>` into `Arc<H>`.
pub trait Upcast<H: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<H>;
}

macro_rules! upcast_to {
    ($($handler:ident),* $(,)?) => {
        $(
            impl<T: $handler + 'static> Upcast<dyn $handler> for T {
                fn upcast(self: Arc<Self>) -> Arc<dyn $handler> {
                    self
                }
            }
        )*
    };
}

upcast_to! {
    EventHandler,
    BlockActionHandler,
    AsyncBlockActionHandler,
    BlockOptionProvider,
    MessageShortcutHandler,
    AsyncMessageShortcutHandler,
    GlobalShortcutHandler,
    AsyncGlobalShortcutHandler,
    ViewSubmissionHandler,
    AsyncViewSubmissionHandler,
    SlashCommandHandler,
    AsyncSlashCommandHandler,
    WorkflowStepEditHandler,
    AsyncWorkflowStepEditHandler,
    InteractiveMessageHandler,
    OptionProvider,
    DialogSubmissionHandler,
}

impl<E: FromEvent, T: TypedEventHandler<E> + 'static> Upcast<dyn TypedEventHandler<E>> for T {
    fn upcast(self: Arc<Self>) -> Arc<dyn TypedEventHandler<E>> {
        self
    }
}

impl<A: FromAction, T: TypedBlockActionHandler<A> + 'static> Upcast<dyn TypedBlockActionHandler<A>>
    for T
{
    fn upcast(self: Arc<Self>) -> Arc<dyn TypedBlockActionHandler<A>> {
        self
    }
}

impl<A: FromAction, T: AsyncTypedBlockActionHandler<A> + 'static>
    Upcast<dyn AsyncTypedBlockActionHandler<A>> for T
{
    fn upcast(self: Arc<Self>) -> Arc<dyn AsyncTypedBlockActionHandler<A>> {
        self
    }
}
