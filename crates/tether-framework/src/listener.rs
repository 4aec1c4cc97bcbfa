//! Request begin/end notifications.

use std::sync::Arc;

use tracing::debug;

use crate::context::RequestContext;

/// Observes the lifecycle of every request context.
///
/// `on_request_end` fires exactly once per begun request, including when a
/// handler fails.
pub trait RequestListener: Send + Sync {
    fn on_request_begin(&self, ctx: &RequestContext);

    fn on_request_end(&self, ctx: &RequestContext);
}

/// Default listener: logs both transitions at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRequestListener;

impl RequestListener for LoggingRequestListener {
    fn on_request_begin(&self, ctx: &RequestContext) {
        debug!(request_id = ctx.id(), "Request begin");
    }

    fn on_request_end(&self, ctx: &RequestContext) {
        debug!(
            request_id = ctx.id(),
            handlers = ctx.slot_count(),
            "Request end"
        );
    }
}

/// Forwards to several listeners in order.
pub struct CompositeRequestListener {
    listeners: Vec<Arc<dyn RequestListener>>,
}

impl CompositeRequestListener {
    pub fn new(listeners: Vec<Arc<dyn RequestListener>>) -> Self {
        Self { listeners }
    }
}

impl RequestListener for CompositeRequestListener {
    fn on_request_begin(&self, ctx: &RequestContext) {
        for listener in &self.listeners {
            listener.on_request_begin(ctx);
        }
    }

    /// Ends in reverse order of beginning.
    fn on_request_end(&self, ctx: &RequestContext) {
        for listener in self.listeners.iter().rev() {
            listener.on_request_end(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tether_core::Container;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RequestListener for Recorder {
        fn on_request_begin(&self, _ctx: &RequestContext) {
            self.log.lock().push(format!("begin {}", self.name));
        }

        fn on_request_end(&self, _ctx: &RequestContext) {
            self.log.lock().push(format!("end {}", self.name));
        }
    }

    #[test]
    fn composite_nests_listeners() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeRequestListener::new(vec![
            Arc::new(Recorder {
                name: "outer",
                log: log.clone(),
            }),
            Arc::new(Recorder {
                name: "inner",
                log: log.clone(),
            }),
        ]);

        let ctx = RequestContext::new(Arc::new(Container::empty()));
        drop(ctx.begin_request(Arc::new(composite)));

        assert_eq!(
            *log.lock(),
            vec!["begin outer", "begin inner", "end inner", "end outer"]
        );
    }
}
