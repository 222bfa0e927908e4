//! Deterministic simulation module
//!
//! All drop mode logic lives here. This module must be pure and deterministic:
//! - Time only via `now_ms` arguments
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or transport dependencies

pub mod collision;
pub mod command;
pub mod pool;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Bounds, BoundaryHits, Rect, resolve_boundaries};
pub use command::{Command, apply_command};
pub use pool::{Handle, Slot, SlotPool};
pub use scheduler::TickGate;
pub use snapshot::{BallView, PlatformView, Snapshot};
pub use state::{
    Ball, BallPool, BallTuning, DropState, EditMode, FlashState, NoteConfig, Platform,
    PlatformPool, Rgb565,
};
pub use tick::{RefreshReport, refresh, tick};
