//! Collision detection and response
//!
//! Everything is axis-aligned: balls are tested by their bounding square and
//! platforms by their unrotated rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Handle;
use super::state::{Ball, Platform, PlatformPool};
use crate::consts::*;

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether the square `center ± half` touches this rectangle (edges inclusive)
    pub fn overlaps_square(&self, center: Vec2, half: f32) -> bool {
        center.x + half >= self.x
            && center.x - half <= self.right()
            && center.y + half >= self.y
            && center.y - half <= self.bottom()
    }
}

/// Walls and floor of the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x_min: X_MIN,
            x_max: X_MAX,
            y_max: Y_MAX,
        }
    }
}

/// Which boundaries a ball touched this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryHits {
    pub left: bool,
    pub right: bool,
    pub floor: bool,
}

impl BoundaryHits {
    pub fn any(&self) -> bool {
        self.left || self.right || self.floor
    }
}

/// Clamp and reflect against left, right, then floor.
///
/// Checks run in sequence, so a ball in a corner can reflect on both axes
/// within one tick.
pub fn resolve_boundaries(ball: &mut Ball, bounds: &Bounds) -> BoundaryHits {
    let r = ball.radius_f();
    let mut hits = BoundaryHits::default();

    if ball.pos.x - r <= bounds.x_min {
        ball.pos.x = bounds.x_min + r;
        ball.vel.x = -ball.vel.x * ball.bounce;
        hits.left = true;
    }
    if ball.pos.x + r >= bounds.x_max {
        ball.pos.x = bounds.x_max - r;
        ball.vel.x = -ball.vel.x * ball.bounce;
        hits.right = true;
    }
    if ball.pos.y + r >= bounds.y_max {
        ball.pos.y = bounds.y_max - r;
        ball.vel.y = -ball.vel.y * ball.bounce;
        hits.floor = true;
    }

    hits
}

/// Overlapping a platform while descending. Rising balls pass through, which
/// keeps a ball from re-hitting the platform it just left.
pub fn ball_platform_contact(ball: &Ball, platform: &Platform) -> bool {
    ball.vel.y > 0.0 && platform.rect().overlaps_square(ball.pos, ball.radius_f())
}

/// First platform (in index order) the ball is landing on
pub fn first_platform_contact(ball: &Ball, platforms: &PlatformPool) -> Option<Handle> {
    platforms
        .iter()
        .find(|(_, p)| ball_platform_contact(ball, p))
        .map(|(h, _)| h)
}

/// Rest the ball on top of the platform and send it back up, nudged
/// sideways by the platform's tilt.
pub fn bounce_off_platform(ball: &mut Ball, platform: &Platform) {
    ball.pos.y = platform.rect().y - ball.radius_f();
    ball.vel.y = -ball.vel.y.abs() * ball.bounce;
    ball.vel.x += platform.angle() * ANGLE_IMPULSE;
}
