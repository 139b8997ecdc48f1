//! # Core Runtime Module
//!
//! Ambient infrastructure shared by the playback crates:
//! - Logging and tracing initialisation
//! - Runtime configuration (clock, log sink, event buffer)
//! - Event bus for media events
//!
//! The playback core is synchronous and UI-thread driven; nothing here spawns
//! background work except forwarding log entries to an async host sink.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream, MediaEvent};
