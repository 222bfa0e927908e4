//! Single-loop driver
//!
//! Owns the drop state together with its clock and note sink. The host calls
//! `handle` for input and `frame` as often as it likes; physics is gated to
//! the tick period internally.

use crate::audio::NoteSink;
use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{Command, DropState, RefreshReport, Snapshot, apply_command, refresh, tick};

pub struct DropEngine<C: Clock, S: NoteSink> {
    state: DropState,
    clock: C,
    sink: S,
}

impl<C: Clock, S: NoteSink> DropEngine<C, S> {
    pub fn new(state: DropState, clock: C, sink: S) -> Self {
        Self { state, clock, sink }
    }

    pub fn from_settings(settings: &Settings, clock: C, sink: S) -> Self {
        let seed = settings.resolve_seed();
        log::info!("Drop mode initialized with seed: {}", seed);
        Self::new(DropState::from_settings(settings, seed), clock, sink)
    }

    pub fn handle(&mut self, command: Command) {
        let now = self.clock.now_ms();
        apply_command(&mut self.state, command, now);
    }

    /// One pass of the control loop: maybe step physics, then run the
    /// lifecycle checks. Returns whether physics stepped.
    pub fn frame(&mut self) -> bool {
        let now = self.clock.now_ms();
        let stepped = tick(&mut self.state, now, &mut self.sink);
        let RefreshReport {
            expired_balls,
            flashes_cleared,
        } = refresh(&mut self.state, now);
        if expired_balls + flashes_cleared > 0 {
            log::trace!("frame {now}: {expired_balls} expired, {flashes_cleared} flashes cleared");
        }
        stepped
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn state(&self) -> &DropState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::consts::*;
    use crate::platform::ManualClock;

    fn engine() -> (DropEngine<ManualClock, RecordingSink>, ManualClock) {
        let clock = ManualClock::new(0);
        let settings = Settings {
            seed: Some(2024),
            default_platforms: false,
            ..Default::default()
        };
        let sink = RecordingSink::connected();
        let engine = DropEngine::from_settings(&settings, clock.clone(), sink);
        (engine, clock)
    }

    #[test]
    fn test_frames_step_at_tick_rate() {
        let (mut engine, clock) = engine();
        let mut steps = 0;
        // 1 second polled every 10 ms
        for _ in 0..100 {
            if engine.frame() {
                steps += 1;
            }
            clock.advance(10);
        }
        assert_eq!(steps as u64, 1000 / TICK_PERIOD_MS);
    }

    #[test]
    fn test_balls_expire_through_frames() {
        let (mut engine, clock) = engine();
        engine.handle(Command::SpawnBall { x: 100.0, y: 70.0 });
        clock.advance(BALL_TTL_MS);
        engine.frame();
        assert_eq!(engine.state().num_active_balls(), 1);
        clock.advance(1);
        engine.frame();
        assert_eq!(engine.state().num_active_balls(), 0);
        assert!(engine.snapshot().balls.is_empty());
    }

    #[test]
    fn test_dropped_ball_eventually_sounds_on_floor() {
        let (mut engine, clock) = engine();
        engine.handle(Command::SpawnBall { x: 160.0, y: 60.0 });
        for _ in 0..60 {
            engine.frame();
            clock.advance(TICK_PERIOD_MS);
        }
        assert!(!engine.sink().note_ons().is_empty());
    }

    #[test]
    fn test_disconnect_mid_session() {
        let (mut engine, clock) = engine();
        engine.sink_mut().connected = false;
        engine.handle(Command::SpawnBall { x: 160.0, y: 60.0 });
        for _ in 0..60 {
            engine.frame();
            clock.advance(TICK_PERIOD_MS);
        }
        assert!(engine.sink().messages.is_empty());
        assert_eq!(engine.state().num_active_balls(), 1);
    }
}
