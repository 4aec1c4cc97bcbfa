//! Deferred replies for asynchronous handlers.
//!
//! An async handler receives a [`Responder`] next to its payload. Calling
//! [`Responder::respond`] hands a response to whoever is serving the
//! request (the HTTP layer, a socket-mode acknowledgement, or a test), which
//! lets the handler acknowledge quickly and keep working afterwards.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::BoxError;

type RespondFn<T> = dyn Fn(T) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

/// A cloneable async callback receiving a handler's response.
pub struct Responder<T = ()> {
    inner: Arc<RespondFn<T>>,
}

impl<T: Send + 'static> Responder<T> {
    /// Creates a responder from an async callback.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |value| f(value).boxed()),
        }
    }

    /// A responder that discards every response.
    pub fn noop() -> Self {
        Self::new(|_| async { Ok(()) })
    }

    /// Sends `value` to the request's owner.
    pub async fn respond(&self, value: T) -> Result<(), BoxError> {
        (self.inner)(value).await
    }

    /// Adapts this responder to accept another response type.
    pub fn map<U, F>(&self, f: F) -> Responder<U>
    where
        U: Send + 'static,
        F: Fn(U) -> T + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.inner);
        Responder {
            inner: Arc::new(move |value| inner(f(value))),
        }
    }
}

impl Responder<()> {
    /// Sends the empty acknowledgement.
    pub async fn ack(&self) -> Result<(), BoxError> {
        self.respond(()).await
    }
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Responder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn respond_forwards_value() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let responder = Responder::new(move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push(value);
                Ok(())
            }
        });

        responder.respond(1).await.unwrap();
        responder.clone().respond(2).await.unwrap();
        assert_eq!(*received.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn mapped_responder_converts() {
        let received = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&received);
        let responder = Responder::new(move |value: String| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock() = Some(value);
                Ok(())
            }
        });

        let unit: Responder<()> = responder.map(|()| "ack".to_string());
        unit.ack().await.unwrap();
        assert_eq!(received.lock().as_deref(), Some("ack"));
    }
}
