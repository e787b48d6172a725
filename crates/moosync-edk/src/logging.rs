//! Log forwarding: a tracing layer that hands every event to a sink.
//!
//! Inside the sandbox the sink is the Extism host log, so extension output
//! shows up in Moosync's own logs. Tests use an in-memory ring buffer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::config::EdkConfig;

/// Default ring buffer capacity (how many log entries to keep).
const DEFAULT_CAPACITY: usize = 256;

/// A single captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields as `key=value` pairs.
    pub fields: Vec<String>,
}

impl LogEntry {
    /// Message followed by its fields, as written to the host log.
    pub fn line(&self) -> String {
        if self.fields.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

/// Bounded buffer of recent log entries.
#[derive(Debug)]
pub struct LogBuffer {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Push a new entry, evicting the oldest if at capacity.
    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where captured events go.
#[derive(Debug, Clone)]
pub enum LogSink {
    /// The Extism host log.
    #[cfg(target_arch = "wasm32")]
    Host,
    Buffer(Arc<LogBuffer>),
}

impl LogSink {
    fn write(&self, entry: LogEntry) {
        match self {
            #[cfg(target_arch = "wasm32")]
            LogSink::Host => {
                let host_level = match entry.level {
                    Level::ERROR => extism_pdk::LogLevel::Error,
                    Level::WARN => extism_pdk::LogLevel::Warn,
                    Level::INFO => extism_pdk::LogLevel::Info,
                    Level::DEBUG => extism_pdk::LogLevel::Debug,
                    _ => extism_pdk::LogLevel::Trace,
                };
                extism_pdk::log!(host_level, "{}", entry.line());
            }
            LogSink::Buffer(buffer) => buffer.push(entry),
        }
    }
}

/// Visitor that extracts the message and structured fields from a tracing event.
struct FieldCollector {
    message: String,
    fields: Vec<String>,
}

impl FieldCollector {
    fn new() -> Self {
        Self {
            message: String::new(),
            fields: Vec::new(),
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.push(format!("{}={}", field.name(), value));
    }
}

/// Tracing layer that forwards every event to a [`LogSink`].
#[derive(Debug, Clone)]
pub struct HostLogLayer {
    sink: LogSink,
}

impl HostLogLayer {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }

    /// A layer writing into `buffer`.
    pub fn buffered(buffer: Arc<LogBuffer>) -> Self {
        Self::new(LogSink::Buffer(buffer))
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut collector = FieldCollector::new();
        event.record(&mut collector);

        self.sink.write(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}

/// Build a subscriber filtered by `config.log_filter` and writing to `sink`.
///
/// An invalid filter falls back to `info`.
pub fn subscriber(config: &EdkConfig, sink: LogSink) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(HostLogLayer::new(sink))
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init_with_sink(config: &EdkConfig, sink: LogSink) -> bool {
    tracing::subscriber::set_global_default(subscriber(config, sink)).is_ok()
}

/// Install the global subscriber writing to the host log.
#[cfg(target_arch = "wasm32")]
pub fn init(config: &EdkConfig) -> bool {
    init_with_sink(config, LogSink::Host)
}
