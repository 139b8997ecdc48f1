//! Time and Logging Abstractions
//!
//! Provides the injectable time source that drives the visibility scheduler's
//! dwell and retry timers, and the sink through which core logs reach the host
//! logging pipeline.

use chrono::{DateTime, TimeZone, Utc};
use core_async::time::{millis_since, Instant};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{error::Result, platform::PlatformSendSync};

/// Time source trait
///
/// Abstracts system time so timer-driven behaviour (visibility dwell, play
/// retries) can be tested without real sleeps.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn deadline(clock: &dyn Clock, delay_ms: u64) -> u64 {
///     clock.monotonic_millis() + delay_ms
/// }
/// ```
pub trait Clock: PlatformSendSync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }

    /// Get current Unix timestamp in milliseconds
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Milliseconds on a clock that never goes backwards.
    ///
    /// Timer deadlines are expressed on this scale. The default derives it from
    /// wall-clock time; implementations with a real monotonic source override it.
    fn monotonic_millis(&self) -> u64 {
        u64::try_from(self.unix_timestamp_millis()).unwrap_or(0)
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic_millis(&self) -> u64 {
        millis_since(self.origin)
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Starts at the Unix epoch; [`advance`](ManualClock::advance) moves both the
/// wall-clock and monotonic readings forward.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: Mutex<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock positioned at `millis` on the monotonic scale.
    pub fn starting_at(millis: u64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        let mut current = self.millis.lock();
        *current = current.saturating_add(millis);
    }

    pub fn set(&self, millis: u64) {
        *self.millis.lock() = millis;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = i64::try_from(*self.millis.lock()).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }

    fn monotonic_millis(&self) -> u64 {
        *self.millis.lock()
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Target module/component
    pub target: String,
    pub message: String,
    /// Structured fields (e.g. `player_id`)
    pub fields: HashMap<String, String>,
    /// Name of the enclosing span, when one is active
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

/// Logger sink trait
///
/// Forwards structured logs from the core to host logging pipelines
/// (OSLog on iOS, Logcat on Android, console or files on desktop).
#[async_trait::async_trait]
pub trait LoggerSink: PlatformSendSync {
    /// Forward a log entry to the host logging system
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered logs
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Logs below this level are filtered out before they reach the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Sink that keeps every entry in memory.
///
/// Useful for hosts that surface recent coordinator logs in a debug overlay,
/// and for asserting on log output in tests.
#[derive(Debug)]
pub struct MemoryLogSink {
    min_level: LogLevel,
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MemoryLogSink {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait::async_trait]
impl LoggerSink for MemoryLogSink {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            self.entries.lock().push(entry);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
