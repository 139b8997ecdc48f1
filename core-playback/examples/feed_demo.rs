//! Simulated reel feed.
//!
//! Mounts a short feed, scrolls through it, taps a voice note and then
//! backgrounds the app, logging every decision the core makes.
//!
//! Run with: `cargo run -p core-playback --example feed_demo`

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{LogLevel, PlayerHandle, PlayerKind, StopFn};
use core_playback::{run_until_idle, PlaybackConfig, PlaybackCoordinator, VisibilityScheduler};
use core_runtime::config::CoreConfig;
use core_runtime::events::MediaEvent;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;
use std::time::Duration;

struct PrintingHandle {
    name: String,
    kind: PlayerKind,
}

impl PlayerHandle for PrintingHandle {
    fn kind(&self) -> PlayerKind {
        self.kind
    }

    fn play(&self) -> BridgeResult<()> {
        println!("  ▶ {}", self.name);
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        println!("  ⏸ {}", self.name);
        Ok(())
    }

    fn seek(&self, _position: Duration) -> BridgeResult<()> {
        Ok(())
    }

    fn dispose(&self) -> BridgeResult<()> {
        println!("  ✕ {}", self.name);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let core = CoreConfig::builder().build()?;
    let coordinator = PlaybackCoordinator::from_config(&core);
    let mut events = coordinator
        .event_bus()
        .map(|bus| bus.subscribe())
        .ok_or("coordinator has no event bus")?;

    let mut feed = VisibilityScheduler::from_config(&core, PlaybackConfig::reels())?
        .with_coordinator(coordinator.clone());

    for index in 0..6 {
        let id = format!("reel-{}", index);
        let handle = Arc::new(PrintingHandle {
            name: id.clone(),
            kind: PlayerKind::Video,
        });
        feed.manage_player(id, index, handle)?;
    }
    feed.mark_audible("reel-2", true)?;

    for visible in ["reel-0", "reel-1", "reel-2"] {
        println!("scroll to {}", visible);
        feed.update_visibility([visible]);
        run_until_idle(&mut feed).await;
    }

    println!("tap voice note");
    coordinator.register_player(
        "voice-note-1",
        PlayerKind::Audio,
        StopFn::shared(|| {
            println!("  ⏹ voice-note-1");
            Ok(())
        }),
    )?;
    coordinator.request_playback("voice-note-1");

    println!("app backgrounded");
    feed.set_focused(false);
    let report = coordinator.stop_all();
    println!("swept {} players, {} failures", report.stopped, report.failed.len());

    while let Ok(event) = events.try_recv() {
        if let MediaEvent::Ownership(_) = event {
            println!("event: {}", event.description());
        }
    }

    feed.shutdown();
    Ok(())
}
