//! # Core Configuration Module
//!
//! Runtime configuration shared by every screen that hosts players.
//!
//! ## Overview
//!
//! `CoreConfig` bundles the capabilities the playback core needs from the host:
//!
//! - `Clock` - required; drives dwell and retry timers. When the `system-clock`
//!   feature is enabled (the default) a [`SystemClock`] is injected if none is
//!   provided.
//! - `LoggerSink` - optional; mirrors `tracing` events into the host log pipeline.
//! - Event bus sizing.
//!
//! ## Usage
//!
//! ```
//! use bridge_traits::ManualClock;
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .clock(Arc::new(ManualClock::new()))
//!     .event_buffer_size(64)
//!     .build()
//!     .expect("valid config");
//!
//! let bus = config.event_bus();
//! assert_eq!(bus.subscriber_count(), 0);
//! ```

use crate::error::{Error, Result};
use crate::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use crate::logging::LoggingConfig;
use bridge_traits::time::{LogLevel, LoggerSink};
use bridge_traits::Clock;
#[cfg(feature = "system-clock")]
use bridge_traits::SystemClock;
use std::sync::Arc;

/// Upper bound on the event buffer; larger buffers only hide a stuck subscriber.
const MAX_EVENT_BUFFER_SIZE: usize = 16_384;

/// Runtime configuration for the playback core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Time source for timers
    pub clock: Arc<dyn Clock>,

    /// Per-subscriber event buffer
    pub event_buffer_size: usize,

    /// Logging setup, including the optional host sink
    pub logging: LoggingConfig,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("clock", &"Clock { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("log_level", &self.logging.level)
            .field(
                "logger_sink",
                &self.logging.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }

    /// Creates an event bus sized according to this configuration.
    pub fn event_bus(&self) -> EventBus {
        EventBus::new(self.event_buffer_size)
    }
}

#[cfg(not(feature = "system-clock"))]
fn clock_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "Clock".to_string(),
        message: "A Clock implementation is required to drive visibility and retry timers. \
                  Enable the 'system-clock' feature to use the default SystemClock, \
                  or inject the host's frame clock."
            .to_string(),
    }
}

#[cfg(feature = "system-clock")]
fn provide_default_clock() -> Result<Arc<dyn Clock>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    Ok(clock)
}

#[cfg(not(feature = "system-clock"))]
fn provide_default_clock() -> Result<Arc<dyn Clock>> {
    Err(clock_missing_error())
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// Sets the time source. Tests inject a `ManualClock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`].
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Replaces the whole logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.logging = Some(self.logging.take().unwrap_or_default().with_level(level));
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logging = Some(
            self.logging
                .take()
                .unwrap_or_default()
                .with_logger_sink(sink),
        );
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when no clock was provided and the `system-clock`
    ///   feature is disabled
    /// - `Config` when a value is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let clock = match self.clock {
            Some(clock) => clock,
            None => provide_default_clock()?,
        };

        let config = CoreConfig {
            clock,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{ManualClock, MemoryLogSink};

    #[test]
    fn test_builder_with_injected_clock() {
        let clock = Arc::new(ManualClock::starting_at(500));
        let config = CoreConfig::builder()
            .clock(clock.clone())
            .event_buffer_size(32)
            .build()
            .unwrap();

        assert_eq!(config.clock.monotonic_millis(), 500);
        clock.advance(20);
        assert_eq!(config.clock.monotonic_millis(), 520);
        assert_eq!(config.event_buffer_size, 32);
    }

    #[cfg(feature = "system-clock")]
    #[test]
    fn test_builder_defaults_to_system_clock() {
        let config = CoreConfig::builder().build().unwrap();
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.clock.unix_timestamp() > 0);
    }

    #[cfg(not(feature = "system-clock"))]
    #[test]
    fn test_builder_requires_clock() {
        let err = CoreConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { .. }));
    }

    #[test]
    fn test_rejects_zero_event_buffer() {
        let result = CoreConfig::builder()
            .clock(Arc::new(ManualClock::new()))
            .event_buffer_size(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_event_buffer() {
        let result = CoreConfig::builder()
            .clock(Arc::new(ManualClock::new()))
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_logging_setters_compose() {
        let config = CoreConfig::builder()
            .clock(Arc::new(ManualClock::new()))
            .log_level(LogLevel::Debug)
            .logger_sink(Arc::new(MemoryLogSink::default()))
            .build()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.logger_sink.is_some());
        assert!(format!("{:?}", config).contains("LoggerSink { ... }"));
    }
}
