//! Read-only view of drop mode for rendering
//!
//! Built once per frame. Entities can vanish between snapshots (TTL, clear).

use serde::Serialize;

use super::collision::Rect;
use super::state::{DropState, EditMode, NoteConfig, Rgb565};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub slot: usize,
    pub x: f32,
    pub y: f32,
    pub radius: i32,
    pub color: Rgb565,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformView {
    pub slot: usize,
    pub rect: Rect,
    /// Already inverted while flashing
    pub color: Rgb565,
    pub flashing: bool,
    pub note_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub balls: Vec<BallView>,
    pub platforms: Vec<PlatformView>,
    pub config: NoteConfig,
    pub scale_name: String,
    pub mode: EditMode,
}

impl Snapshot {
    pub fn capture(state: &DropState) -> Self {
        let balls = state
            .balls
            .iter()
            .map(|(h, b)| BallView {
                slot: h.index(),
                x: b.pos.x,
                y: b.pos.y,
                radius: b.radius,
                color: b.color,
            })
            .collect();

        let platforms = state
            .platforms
            .iter()
            .map(|(h, p)| PlatformView {
                slot: h.index(),
                rect: p.rect(),
                color: p.display_color(),
                flashing: p.is_flashing(),
                note_name: p.note_name().to_string(),
            })
            .collect();

        Self {
            balls,
            platforms,
            config: state.config,
            scale_name: state.notes().scale_name(state.config.scale).to_string(),
            mode: state.mode,
        }
    }

    /// Status line text, e.g. "D Major Oct:4 Balls:2"
    pub fn status_line(&self) -> String {
        format!(
            "{} {} Oct:{} Balls:{}",
            crate::scale::key_name(self.config.key),
            self.scale_name,
            self.config.octave,
            self.balls.len()
        )
    }
}
