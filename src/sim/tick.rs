//! Fixed timestep simulation tick
//!
//! `tick` advances physics at most once per gate period. `refresh` is the
//! per-frame lifecycle pass (ball TTL, platform flash windows) and runs on
//! every call regardless of the gate.

use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{Bounds, bounce_off_platform, first_platform_contact, resolve_boundaries};
use super::state::{Ball, BallPool, DropState, FlashState, PlatformPool};
use crate::audio::NoteSink;
use crate::consts::*;

/// What the lifecycle pass removed or reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub expired_balls: usize,
    pub flashes_cleared: usize,
}

/// Advance the drop state by one physics step if the gate allows it.
/// Returns whether a step ran.
pub fn tick(state: &mut DropState, now_ms: u64, sink: &mut dyn NoteSink) -> bool {
    if !state.gate.try_advance(now_ms) {
        return false;
    }

    let bounds = Bounds::default();
    let (balls, platforms, rng) = state.split_mut();

    for (_, ball) in balls.iter_mut() {
        integrate(ball);
        let hits = resolve_boundaries(ball, &bounds);

        // Floor impact: short percussive note for the ball's own pitch
        if hits.floor && sink.is_connected() && ball.vel.y.abs() > FLOOR_NOTE_MIN_SPEED {
            let velocity = rng.random_range(FLOOR_VELOCITY_MIN..FLOOR_VELOCITY_MAX);
            log::trace!("floor hit note {} vel {}", ball.note(), velocity);
            sink.emit_note(ball.note(), velocity);
        }
    }

    resolve_platform_contacts(balls, platforms, rng, sink, now_ms);
    true
}

/// Gravity, horizontal friction, then position. vy is never damped.
fn integrate(ball: &mut Ball) {
    ball.vel.y += ball.gravity;
    ball.vel.x *= ball.friction;
    ball.pos += ball.vel;
}

/// Each ball bounces off at most one platform per tick: the first one in
/// index order that it is landing on.
fn resolve_platform_contacts(
    balls: &mut BallPool,
    platforms: &mut PlatformPool,
    rng: &mut Pcg32,
    sink: &mut dyn NoteSink,
    now_ms: u64,
) {
    for (_, ball) in balls.iter_mut() {
        let Some(handle) = first_platform_contact(ball, platforms) else {
            continue;
        };
        let Some(platform) = platforms.get_mut(handle) else {
            continue;
        };

        bounce_off_platform(ball, platform);

        // A lit platform still bounces but stays silent
        if sink.is_connected() && !platform.is_flashing() {
            let velocity = rng.random_range(PLATFORM_VELOCITY_MIN..PLATFORM_VELOCITY_MAX);
            log::trace!(
                "platform {} note {} vel {}",
                handle.index(),
                platform.note(),
                velocity
            );
            sink.emit_note(platform.note(), velocity);
            platform.flash = FlashState::Flashing { since_ms: now_ms };
        }
    }
}

/// Lifecycle pass: retire balls past their TTL and end elapsed flashes
pub fn refresh(state: &mut DropState, now_ms: u64) -> RefreshReport {
    let before = state.balls.len();
    state.balls.retain(|ball| !ball.is_expired(now_ms));
    let expired_balls = before - state.balls.len();
    if expired_balls > 0 {
        log::debug!("{expired_balls} ball(s) expired");
    }

    let flashes_cleared = state
        .platforms
        .iter_mut()
        .filter(|(_, p)| p.is_flashing())
        .map(|(_, p)| p.flash.expire(now_ms))
        .filter(|cleared| *cleared)
        .count();

    RefreshReport {
        expired_balls,
        flashes_cleared,
    }
}
