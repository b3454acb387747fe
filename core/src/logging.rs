//! Routing `tracing` events into the host's log interface.
//!
//! Frontends give cores a printf-style log callback. [`HostLogLayer`] is a
//! `tracing_subscriber::Layer` that renders each event to a string and hands
//! it to a [`HostLogger`]. The verbosity is held in a [`LogLevelHandle`] so the
//! `dolphin_log_level` option can change it while the core runs.

use std::fmt::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tracing::subscriber::Interest;
use tracing::{Level, Metadata, debug};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::options::OptionValue;

/// Host log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    #[serde(alias = "notice")]
    Info = 1,
    #[serde(alias = "warning")]
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Host severity for a `tracing` level. TRACE folds into DEBUG.
    pub fn from_tracing(level: &Level) -> Self {
        if *level == Level::ERROR {
            LogLevel::Error
        } else if *level == Level::WARN {
            LogLevel::Warn
        } else if *level == Level::INFO {
            LogLevel::Info
        } else {
            LogLevel::Debug
        }
    }
}

impl OptionValue for LogLevel {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw {
            "Debug" => Some(LogLevel::Debug),
            "Info" | "Notice" => Some(LogLevel::Info),
            "Warning" => Some(LogLevel::Warn),
            "Error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn format_option(&self) -> String {
        let raw = match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warning",
            LogLevel::Error => "Error",
        };
        raw.to_string()
    }
}

/// Destination for rendered log lines.
pub trait HostLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Shared, runtime-adjustable minimum level.
#[derive(Debug, Clone, Default)]
pub struct LogLevelHandle(Arc<AtomicU8>);

impl LogLevelHandle {
    pub fn new(level: LogLevel) -> Self {
        Self(Arc::new(AtomicU8::new(level as u8)))
    }

    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: LogLevel) {
        let previous = LogLevel::from_u8(self.0.swap(level as u8, Ordering::Relaxed));
        if previous != level {
            debug!("Log level changed: {:?} -> {:?}", previous, level);
        }
    }

    pub fn allows(&self, level: &Level) -> bool {
        LogLevel::from_tracing(level) >= self.get()
    }
}

/// Layer forwarding events to a [`HostLogger`].
pub struct HostLogLayer {
    host: Arc<dyn HostLogger>,
    level: LogLevelHandle,
}

impl HostLogLayer {
    pub fn new(host: Arc<dyn HostLogger>, level: LogLevelHandle) -> Self {
        Self { host, level }
    }

    pub fn level(&self) -> &LogLevelHandle {
        &self.level
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: tracing::Subscriber,
{
    // The level can change at runtime, so no callsite may be cached as "never".
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.level.allows(metadata.level())
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.level.allows(metadata.level()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.host.log(
            LogLevel::from_tracing(metadata.level()),
            &visitor.finish(metadata.target()),
        );
    }
}

/// Collects the `message` field first, then the remaining fields as `k=v`.
#[derive(Debug, Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self, target: &str) -> String {
        let mut line = format!("[{}] {}", target, self.message);
        if !self.fields.is_empty() {
            if !self.message.is_empty() {
                line.push(' ');
            }
            line.push_str(self.fields.trim_end());
        }
        line
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, "{}={} ", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, "{}={:?} ", field.name(), value);
        }
    }
}

/// Install the global subscriber.
///
/// With a host logger, events go through [`HostLogLayer`] at `level`.
/// Without one, `tracing_subscriber::fmt` writes to stderr filtered by
/// `RUST_LOG` (default `info`). A subscriber installed earlier is kept.
pub fn init(host: Option<Arc<dyn HostLogger>>, level: LogLevel) -> LogLevelHandle {
    let handle = LogLevelHandle::new(level);

    let installed = match host {
        Some(host) => tracing_subscriber::registry()
            .with(HostLogLayer::new(host, handle.clone()))
            .try_init()
            .is_ok(),
        None => tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .try_init()
            .is_ok(),
    };

    if !installed {
        debug!("Global tracing subscriber already installed, keeping it");
    }
    handle
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing::{error, info, trace, warn};

    use super::*;

    #[derive(Default)]
    struct RecordingLogger(Mutex<Vec<(LogLevel, String)>>);

    impl HostLogger for RecordingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn capture(level: &LogLevelHandle, f: impl FnOnce()) -> Vec<(LogLevel, String)> {
        let logger = Arc::new(RecordingLogger::default());
        let layer = HostLogLayer::new(logger.clone(), level.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let lines = logger.0.lock().unwrap().clone();
        lines
    }

    #[test]
    fn test_levels_are_mapped() {
        let handle = LogLevelHandle::new(LogLevel::Debug);
        let lines = capture(&handle, || {
            error!(target: "audio", "e");
            warn!(target: "audio", "w");
            info!(target: "audio", "i");
            trace!(target: "audio", "t");
        });

        let levels: Vec<LogLevel> = lines.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug]
        );
        assert_eq!(lines[0].1, "[audio] e");
    }

    #[test]
    fn test_fields_follow_message() {
        let handle = LogLevelHandle::new(LogLevel::Info);
        let lines = capture(&handle, || {
            info!(target: "options", rate = 48000, "mixer rate changed");
        });
        assert_eq!(lines[0].1, "[options] mixer rate changed rate=48000");
    }

    #[test]
    fn test_level_handle_filters_at_runtime() {
        let handle = LogLevelHandle::new(LogLevel::Warn);
        let lines = capture(&handle, || {
            info!("hidden");
            warn!("shown");
            handle.set(LogLevel::Debug);
            info!("now shown");
        });

        let messages: Vec<&str> = lines.iter().map(|(_, m)| m.as_str()).collect();
        assert!(!messages.iter().any(|m| m.ends_with("hidden")));
        assert!(messages.iter().any(|m| m.ends_with("] shown")));
        assert!(messages.iter().any(|m| m.ends_with("] now shown")));
    }

    #[test]
    fn test_option_values() {
        assert_eq!(LogLevel::parse_option("Notice"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse_option("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse_option("warning"), None);
        assert_eq!(LogLevel::Warn.format_option(), "Warning");
    }
}
