//! Drop Tones - a gravity drop musical toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pools, physics, collisions, note triggers)
//! - `engine`: Single-loop driver tying state, clock and note sink together
//! - `audio`: MIDI note sink abstraction
//! - `scale`: Scale/note lookup
//! - `platform`: Time source abstraction
//! - `settings`: JSON configuration

pub mod audio;
pub mod engine;
pub mod platform;
pub mod scale;
pub mod settings;
pub mod sim;

pub use audio::{LogSink, MidiMessage, NoteSink, RecordingSink};
pub use engine::DropEngine;
pub use platform::{Clock, ManualClock, SystemClock};
pub use scale::{NoteProvider, ScaleTable};
pub use settings::Settings;

/// Drop mode configuration constants
pub mod consts {
    /// Physics tick period (20 Hz)
    pub const TICK_PERIOD_MS: u64 = 50;

    /// Pool capacities
    pub const MAX_BALLS: usize = 8;
    pub const MAX_PLATFORMS: usize = 6;

    /// Ball lifetime before forced deactivation
    pub const BALL_TTL_MS: u64 = 5000;
    /// How long a platform stays lit (and muted) after triggering
    pub const FLASH_WINDOW_MS: u64 = 200;

    /// Arena bounds (screen units). There is no ceiling.
    pub const X_MIN: f32 = 10.0;
    pub const X_MAX: f32 = 310.0;
    pub const Y_MAX: f32 = 175.0;

    /// Touches inside this vertical band reach the play area
    pub const PLAY_AREA_TOP: f32 = 60.0;
    pub const PLAY_AREA_BOTTOM: f32 = 175.0;

    /// Ball defaults
    pub const BALL_GRAVITY: f32 = 0.15;
    pub const BALL_BOUNCE: f32 = 0.6;
    pub const BALL_FRICTION: f32 = 0.98;
    /// Radius range (half-open)
    pub const BALL_MIN_RADIUS: i32 = 3;
    pub const BALL_MAX_RADIUS: i32 = 6;
    /// RGB565 hue range for balls (half-open)
    pub const BALL_COLOR_MIN: u16 = 0x2000;
    pub const BALL_COLOR_MAX: u16 = 0x8FFF;

    /// Placed platform size
    pub const PLATFORM_WIDTH: f32 = 50.0;
    pub const PLATFORM_HEIGHT: f32 = 8.0;
    /// RGB565 hue range for platforms (half-open)
    pub const PLATFORM_COLOR_MIN: u16 = 0x2000;
    pub const PLATFORM_COLOR_MAX: u16 = 0xFFFF;
    /// Lateral nudge per radian of platform tilt
    pub const ANGLE_IMPULSE: f32 = 1.5;

    /// Floor impacts slower than this stay silent
    pub const FLOOR_NOTE_MIN_SPEED: f32 = 1.0;
    /// Note velocity (loudness) ranges, half-open
    pub const FLOOR_VELOCITY_MIN: u8 = 60;
    pub const FLOOR_VELOCITY_MAX: u8 = 100;
    pub const PLATFORM_VELOCITY_MIN: u8 = 70;
    pub const PLATFORM_VELOCITY_MAX: u8 = 110;

    /// Scale degrees drawn for new balls / cycled through by platforms
    pub const NOTE_DEGREES: usize = 8;

    /// Octave selector range (cycling wraps top to bottom)
    pub const MIN_OCTAVE: u8 = 2;
    pub const MAX_OCTAVE: u8 = 7;
    pub const DEFAULT_OCTAVE: u8 = 4;
}
