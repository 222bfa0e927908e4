//! Drop Tones entry point
//!
//! Headless native session: plays a scripted sequence of taps against a
//! simulated 60 Hz host loop and logs every note that would go out over MIDI.
//!
//! Usage: `drop-tones [settings.json]`

use std::path::PathBuf;

use drop_tones::consts::*;
use drop_tones::sim::Command;
use drop_tones::{DropEngine, LogSink, ManualClock, NoteSink, Settings};

/// Host frame period (~60 Hz)
const FRAME_MS: u64 = 16;
/// Simulated session length
const SESSION_MS: u64 = 8000;

/// Taps delivered at the given session times
fn script() -> Vec<(u64, Command)> {
    vec![
        (0, Command::Touch { x: 90.0, y: 70.0 }),
        (300, Command::Touch { x: 190.0, y: 65.0 }),
        (600, Command::Touch { x: 130.0, y: 62.0 }),
        (900, Command::ToggleMode),
        (950, Command::Touch { x: 250.0, y: 150.0 }),
        (1000, Command::Touch { x: 40.0, y: 130.0 }),
        (1100, Command::ToggleMode),
        (1200, Command::KeyUp),
        (1250, Command::CycleScale),
        (1300, Command::Touch { x: 250.0, y: 80.0 }),
        (1400, Command::Touch { x: 45.0, y: 75.0 }),
        (2500, Command::CycleOctave),
        (2600, Command::Touch { x: 160.0, y: 60.0 }),
        (5000, Command::Touch { x: 120.0, y: 70.0 }),
        (6500, Command::ClearAll),
        (6600, Command::Touch { x: 160.0, y: 70.0 }),
    ]
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Drop Tones (native) starting...");

    let settings = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .map(|path| Settings::load(&path))
        .unwrap_or_default();

    let clock = ManualClock::new(0);
    let mut engine = DropEngine::from_settings(&settings, clock.clone(), LogSink::new());

    let mut pending = script().into_iter().peekable();
    let mut steps = 0u64;
    let mut now = 0;
    while now <= SESSION_MS {
        while let Some((_, command)) = pending.next_if(|(at, _)| *at <= now) {
            log::debug!("t={now} {command:?}");
            engine.handle(command);
        }
        if engine.frame() {
            steps += 1;
        }
        if now % 1000 < FRAME_MS {
            log::info!("t={now}ms {}", engine.snapshot().status_line());
        }
        clock.advance(FRAME_MS);
        now += FRAME_MS;
    }

    let snapshot = engine.snapshot();
    println!(
        "{} physics steps ({} ms period), {} MIDI messages, {} ball(s) and {} platform(s) left",
        steps,
        TICK_PERIOD_MS,
        engine.sink().sent(),
        snapshot.balls.len(),
        snapshot.platforms.len()
    );
    println!("MIDI {}", if engine.sink().is_connected() { "connected" } else { "disconnected" });
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("Could not serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front-end; the library is driven by the host page
}
