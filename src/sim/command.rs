//! Input commands
//!
//! Everything the input layer can ask of drop mode. Commands apply
//! immediately; invalid or over-capacity requests do nothing.

use serde::{Deserialize, Serialize};

use super::state::{DropState, EditMode};
use crate::consts::{PLAY_AREA_BOTTOM, PLAY_AREA_TOP};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Tap at screen position; routed by the current edit mode
    Touch { x: f32, y: f32 },
    SpawnBall { x: f32, y: f32 },
    AddPlatform { x: f32, y: f32 },
    ClearAll,
    ToggleMode,
    CycleScale,
    KeyDown,
    KeyUp,
    CycleOctave,
    SetScale(usize),
    SetKey(u8),
    SetOctave(u8),
}

/// Apply a command to the state at time `now_ms`
pub fn apply_command(state: &mut DropState, command: Command, now_ms: u64) {
    match command {
        Command::Touch { x, y } => {
            if !(PLAY_AREA_TOP..=PLAY_AREA_BOTTOM).contains(&y) {
                return;
            }
            match state.mode {
                EditMode::Drop => {
                    state.spawn_ball(x, y, now_ms);
                }
                EditMode::Platform => {
                    state.add_platform(x, y);
                }
            }
        }
        Command::SpawnBall { x, y } => {
            state.spawn_ball(x, y, now_ms);
        }
        Command::AddPlatform { x, y } => {
            state.add_platform(x, y);
        }
        Command::ClearAll => state.clear_all(),
        Command::ToggleMode => state.toggle_mode(),
        Command::CycleScale => state.cycle_scale(),
        Command::KeyDown => state.key_down(),
        Command::KeyUp => state.key_up(),
        Command::CycleOctave => state.cycle_octave(),
        Command::SetScale(scale) => state.set_scale(scale),
        Command::SetKey(key) => state.set_key(key),
        Command::SetOctave(octave) => state.set_octave(octave),
    }
}
