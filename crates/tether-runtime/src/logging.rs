//! Subscriber setup on `tracing-subscriber`.
//!
//! The framework only emits `tracing` events: a `dispatch` span per inbound
//! request, handler resolution at `trace`, request begin/end at `debug`.
//! This module installs the global subscriber that renders them.
//!
//! ```rust,ignore
//! use tether_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! // From configuration
//! logging::init_from_config(&config.logging);
//!
//! // By hand
//! LoggingBuilder::new()
//!     .directive("tether_framework=trace")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "tether.log";

/// Which span lifecycle events are rendered.
///
/// [`SpanEvents::LIFECYCLE`] shows one line when a `dispatch` span opens and
/// one when it closes, with its busy/idle timings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    pub const ACTIVE: Self = Self {
        new: false,
        enter: true,
        exit: true,
        close: false,
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing when a subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

// =============================================================================
// LoggingBuilder
// =============================================================================

/// Builder of the global subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
    with_thread_ids: bool,
    with_file_location: bool,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            with_target: true,
            with_thread_ids: false,
            with_file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new()
            .with_level(config.level.to_tracing_level())
            .span_events(SpanEvents::from(&config.span_events))
            .format(config.format)
            .output(config.output)
            .with_thread_ids(config.thread_ids)
            .with_file_location(config.file_location)
            .rotation(config.rotation);
        builder.file_path.clone_from(&config.file_path);
        for (target, level) in &config.filters {
            builder = builder.directive(&format!("{target}={}", level.to_lowercase()));
        }
        builder
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds an `EnvFilter` directive such as `tether_framework=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file and line number of each call site.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.with_file_location = enabled;
        self
    }

    /// Log file used with [`LogOutput::File`].
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// `RUST_LOG` when set, otherwise the configured level; directives are
    /// added on top of either.
    fn build_filter(&self) -> EnvFilter {
        let base = self.level.to_string().to_lowercase();
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => warn!(directive = %directive, error = %e, "Ignoring log directive"),
            }
        }
        filter
    }

    fn make_writer(&self) -> BoxMakeWriter {
        match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let Some(path) = &self.file_path else {
                    warn!("File output requested without a file path, logging to stdout");
                    return BoxMakeWriter::new(std::io::stdout);
                };
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(DEFAULT_LOG_FILE);
                match RollingFileAppender::builder()
                    .rotation(self.rotation.into())
                    .filename_prefix(name)
                    .build(dir)
                {
                    Ok(appender) => BoxMakeWriter::new(appender),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Cannot open log file, logging to stdout");
                        BoxMakeWriter::new(std::io::stdout)
                    }
                }
            }
        }
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let writer = self.make_writer();
        let span_events = self.span_events.to_fmt_span();

        macro_rules! decorate {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events)
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file_location)
                    .with_line_number(self.with_file_location)
                    .with_writer(writer)
                    .boxed()
            };
        }

        match self.format {
            #[cfg(feature = "json-log")]
            LogFormat::Json => fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_writer(writer)
                .boxed(),
            LogFormat::Compact => decorate!(fmt::layer().compact()),
            LogFormat::Pretty => decorate!(fmt::layer().pretty()),
            _ => decorate!(fmt::layer()),
        }
    }

    /// Installs the subscriber, ignoring an already installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> Result<(), TryInitError> {
        let layer = self.layer();
        let filter = self.build_filter();
        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn span_event_presets() {
        assert_eq!(SpanEvents::NONE.to_fmt_span(), FmtSpan::NONE);
        assert_eq!(
            SpanEvents::LIFECYCLE.to_fmt_span(),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
        assert_eq!(SpanEvents::FULL.to_fmt_span(), FmtSpan::FULL);
    }

    #[test]
    fn builder_follows_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            thread_ids: true,
            ..Default::default()
        };
        config
            .filters
            .insert("tether_framework".into(), "TRACE".into());

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, tracing::Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert!(builder.with_thread_ids);
        assert_eq!(builder.directives, vec!["tether_framework=trace"]);
    }

    #[test]
    fn directives_reach_filter() {
        let filter = LoggingBuilder::new()
            .directive("tether_framework=trace")
            .build_filter();
        assert!(filter.to_string().contains("tether_framework=trace"));
    }
}
