//! Drop mode state and entity types
//!
//! Both pools are owned here and only mutated through the simulation.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::pool::{Handle, SlotPool};
use super::scheduler::TickGate;
use crate::consts::*;
use crate::scale::{NoteProvider, ScaleTable, note_for};
use crate::settings::Settings;

/// 16-bit RGB565 display colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const PRIMARY: Rgb565 = Rgb565(0x05FF);
    pub const SECONDARY: Rgb565 = Rgb565(0xF81F);
    pub const ACCENT: Rgb565 = Rgb565(0xFFE0);

    /// Bitwise inverse, used while a platform flashes
    pub fn inverted(self) -> Self {
        Rgb565(!self.0)
    }
}

/// Per-ball motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    /// Added to vy every tick
    pub gravity: f32,
    /// Restitution on every reflection
    pub bounce: f32,
    /// vx multiplier every tick
    pub friction: f32,
}

impl BallTuning {
    /// Restitution and friction that never add speed
    pub fn is_stable(&self) -> bool {
        (0.0..=1.0).contains(&self.bounce)
            && (0.0..=1.0).contains(&self.friction)
            && self.gravity.is_finite()
    }
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            gravity: BALL_GRAVITY,
            bounce: BALL_BOUNCE,
            friction: BALL_FRICTION,
        }
    }
}

/// A falling ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub bounce: f32,
    pub friction: f32,
    pub radius: i32,
    pub color: Rgb565,
    pub spawn_ms: u64,
    note: u8,
    note_name: String,
}

impl Ball {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pos: Vec2,
        vel: Vec2,
        radius: i32,
        color: Rgb565,
        tuning: BallTuning,
        spawn_ms: u64,
        note: u8,
        note_name: String,
    ) -> Self {
        Self {
            pos,
            vel,
            gravity: tuning.gravity,
            bounce: tuning.bounce,
            friction: tuning.friction,
            radius,
            color,
            spawn_ms,
            note,
            note_name,
        }
    }

    /// Note assigned at spawn
    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn note_name(&self) -> &str {
        &self.note_name
    }

    #[inline]
    pub fn radius_f(&self) -> f32 {
        self.radius as f32
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawn_ms)
    }

    /// Past its time-to-live
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) > BALL_TTL_MS
    }
}

/// Debounce/highlight state of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlashState {
    #[default]
    Idle,
    /// Lit since the given time; further hits stay silent
    Flashing { since_ms: u64 },
}

impl FlashState {
    pub fn is_flashing(&self) -> bool {
        matches!(self, FlashState::Flashing { .. })
    }

    /// Go back to Idle once the window has passed. Returns true on transition.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match *self {
            FlashState::Flashing { since_ms }
                if now_ms.saturating_sub(since_ms) > FLASH_WINDOW_MS =>
            {
                *self = FlashState::Idle;
                true
            }
            _ => false,
        }
    }
}

/// A user-placed platform. Geometry and note are fixed at creation.
#[derive(Debug, Clone)]
pub struct Platform {
    rect: Rect,
    angle: f32,
    color: Rgb565,
    note: u8,
    note_name: String,
    pub(crate) flash: FlashState,
}

impl Platform {
    pub fn new(rect: Rect, angle: f32, color: Rgb565, note: u8, note_name: String) -> Self {
        Self {
            rect,
            angle,
            color,
            note,
            note_name,
            flash: FlashState::Idle,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Tilt in radians. Only nudges vx on bounce; the rectangle is never rotated.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn note_name(&self) -> &str {
        &self.note_name
    }

    pub fn flash(&self) -> FlashState {
        self.flash
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_flashing()
    }

    /// Colour to draw this frame
    pub fn display_color(&self) -> Rgb565 {
        if self.is_flashing() {
            self.color.inverted()
        } else {
            self.color
        }
    }
}

/// Scale/key/octave used for newly created entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteConfig {
    pub scale: usize,
    /// Pitch class 0-11
    pub key: u8,
    pub octave: u8,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            scale: 0,
            key: 0,
            octave: DEFAULT_OCTAVE,
        }
    }
}

/// What a touch in the play area does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditMode {
    /// Touch drops a ball
    #[default]
    Drop,
    /// Touch places a platform
    Platform,
}

impl EditMode {
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Drop => EditMode::Platform,
            EditMode::Platform => EditMode::Drop,
        }
    }
}

pub type BallPool = SlotPool<Ball, MAX_BALLS>;
pub type PlatformPool = SlotPool<Platform, MAX_PLATFORMS>;

/// Complete drop mode state
pub struct DropState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(super) balls: BallPool,
    /// Append-only until `clear_all`
    pub(super) platforms: PlatformPool,
    pub config: NoteConfig,
    pub mode: EditMode,
    /// Motion constants given to new balls
    pub tuning: BallTuning,
    pub gate: TickGate,
    rng: Pcg32,
    notes: Box<dyn NoteProvider>,
}

impl fmt::Debug for DropState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropState")
            .field("seed", &self.seed)
            .field("balls", &self.balls)
            .field("platforms", &self.platforms)
            .field("config", &self.config)
            .field("mode", &self.mode)
            .field("tuning", &self.tuning)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl DropState {
    /// Empty state using the built-in scale table
    pub fn new(seed: u64) -> Self {
        Self::with_notes(seed, Box::new(ScaleTable))
    }

    pub fn with_notes(seed: u64, notes: Box<dyn NoteProvider>) -> Self {
        Self {
            seed,
            balls: SlotPool::new(),
            platforms: SlotPool::new(),
            config: NoteConfig::default(),
            mode: EditMode::Drop,
            tuning: BallTuning::default(),
            gate: TickGate::default(),
            rng: Pcg32::seed_from_u64(seed),
            notes,
        }
    }

    /// State configured from settings, default layout included if enabled
    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        let mut state = Self::new(seed);
        state.tuning = settings.ball_tuning();
        state.set_scale(settings.scale);
        state.set_key(settings.key);
        state.set_octave(settings.octave);
        if settings.default_platforms {
            state.place_default_platforms();
        }
        state
    }

    /// The starting layout: a C major triad of three platforms
    pub fn place_default_platforms(&mut self) {
        let layout = [
            (Rect::new(80.0, 160.0, 60.0, 8.0), 0.2, Rgb565::PRIMARY, 60),
            (Rect::new(180.0, 140.0, 50.0, 8.0), -0.3, Rgb565::SECONDARY, 64),
            (Rect::new(120.0, 120.0, 40.0, 8.0), 0.1, Rgb565::ACCENT, 67),
        ];
        for (rect, angle, color, note) in layout {
            let name = self.notes.note_name(note);
            self.place_platform(Platform::new(rect, angle, color, note, name));
        }
    }

    pub fn balls(&self) -> &BallPool {
        &self.balls
    }

    /// Mutable access to one ball, e.g. for a host that nudges it
    pub fn ball_mut(&mut self, handle: Handle) -> Option<&mut Ball> {
        self.balls.get_mut(handle)
    }

    /// Read-only; platforms are only removed by `clear_all`
    ///
    /// ```compile_fail
    /// let mut state = drop_tones::sim::DropState::new(0);
    /// let h = state.add_platform(100.0, 100.0).unwrap();
    /// state.platforms.remove(h);
    /// ```
    pub fn platforms(&self) -> &PlatformPool {
        &self.platforms
    }

    pub fn notes(&self) -> &dyn NoteProvider {
        self.notes.as_ref()
    }

    /// Disjoint borrows for the tick loop
    pub(crate) fn split_mut(&mut self) -> (&mut BallPool, &mut PlatformPool, &mut Pcg32) {
        (&mut self.balls, &mut self.platforms, &mut self.rng)
    }

    pub fn num_active_balls(&self) -> usize {
        self.balls.len()
    }

    pub fn num_platforms(&self) -> usize {
        self.platforms.len()
    }

    fn current_note(&self, degree: usize) -> (u8, String) {
        note_for(
            self.notes.as_ref(),
            self.config.scale,
            degree,
            self.config.key,
            self.config.octave,
        )
    }

    /// Drop a ball at (x, y). No-op when every slot is taken.
    pub fn spawn_ball(&mut self, x: f32, y: f32, now_ms: u64) -> Option<Handle> {
        if self.balls.is_full() {
            log::debug!("ball pool full, ignoring spawn at ({x}, {y})");
            return None;
        }

        let vx = self.rng.random_range(-10i32..=10) as f32 / 10.0;
        let color = Rgb565(self.rng.random_range(BALL_COLOR_MIN..BALL_COLOR_MAX));
        let radius = self.rng.random_range(BALL_MIN_RADIUS..BALL_MAX_RADIUS);
        let degree = self.rng.random_range(0..NOTE_DEGREES);
        let (note, note_name) = self.current_note(degree);

        let ball = Ball::new(
            Vec2::new(x, y),
            Vec2::new(vx, 0.0),
            radius,
            color,
            self.tuning,
            now_ms,
            note,
            note_name,
        );
        let handle = self.balls.insert(ball)?;
        log::debug!("spawned ball {} at ({x}, {y}) note {note}", handle.index());
        Some(handle)
    }

    /// Place a platform centred on (x, y). No-op at capacity.
    pub fn add_platform(&mut self, x: f32, y: f32) -> Option<Handle> {
        if self.platforms.is_full() {
            log::debug!("platform capacity reached, ignoring ({x}, {y})");
            return None;
        }
        let index = self.platforms.len();

        let angle = self.rng.random_range(-5i32..=5) as f32 / 10.0;
        let color = Rgb565(self.rng.random_range(PLATFORM_COLOR_MIN..PLATFORM_COLOR_MAX));
        let (note, note_name) = self.current_note(index % NOTE_DEGREES);
        let rect = Rect::new(
            x - PLATFORM_WIDTH / 2.0,
            y - PLATFORM_HEIGHT / 2.0,
            PLATFORM_WIDTH,
            PLATFORM_HEIGHT,
        );
        self.place_platform(Platform::new(rect, angle, color, note, note_name))
    }

    /// Insert a fully specified platform at the next index
    pub fn place_platform(&mut self, platform: Platform) -> Option<Handle> {
        let note = platform.note();
        // Nothing removes a single platform, so the first free slot is the next index
        debug_assert_eq!(
            self.platforms.first_free().map(Handle::index),
            Some(self.platforms.len()).filter(|&n| n < MAX_PLATFORMS)
        );
        let handle = self.platforms.insert(platform)?;
        log::debug!("placed platform {} note {note}", handle.index());
        Some(handle)
    }

    /// Drop every ball and platform
    pub fn clear_all(&mut self) {
        self.balls.clear();
        self.platforms.clear();
        log::debug!("cleared all balls and platforms");
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Next scale, wrapping to the first
    pub fn cycle_scale(&mut self) {
        let count = self.notes.scale_count().max(1);
        self.config.scale = (self.config.scale + 1) % count;
    }

    pub fn set_scale(&mut self, scale: usize) {
        if scale < self.notes.scale_count() {
            self.config.scale = scale;
        }
    }

    pub fn key_up(&mut self) {
        self.config.key = (self.config.key + 1) % 12;
    }

    pub fn key_down(&mut self) {
        self.config.key = (self.config.key + 11) % 12;
    }

    pub fn set_key(&mut self, key: u8) {
        if key < 12 {
            self.config.key = key;
        }
    }

    /// Next octave; the top of the range wraps to the bottom
    pub fn cycle_octave(&mut self) {
        self.config.octave = if self.config.octave >= MAX_OCTAVE {
            MIN_OCTAVE
        } else {
            self.config.octave + 1
        };
    }

    pub fn set_octave(&mut self, octave: u8) {
        if (MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            self.config.octave = octave;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_fills_first_free_slot() {
        let mut state = DropState::new(7);
        let a = state.spawn_ball(100.0, 80.0, 0).unwrap();
        let b = state.spawn_ball(120.0, 80.0, 0).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        state.balls.remove(a);
        assert_eq!(state.spawn_ball(140.0, 80.0, 0), Some(a));
        assert_eq!(state.num_active_balls(), 2);
    }

    #[test]
    fn test_spawned_ball_ranges() {
        let mut state = DropState::new(42);
        for i in 0..MAX_BALLS {
            let h = state.spawn_ball(50.0 + i as f32, 70.0, 1234).unwrap();
            let ball = state.balls.get(h).unwrap();
            assert!((-1.0..=1.0).contains(&ball.vel.x));
            assert_eq!(ball.vel.y, 0.0);
            assert!((BALL_MIN_RADIUS..BALL_MAX_RADIUS).contains(&ball.radius));
            assert!((BALL_COLOR_MIN..BALL_COLOR_MAX).contains(&ball.color.0));
            assert_eq!(ball.spawn_ms, 1234);
            assert_eq!(ball.gravity, BALL_GRAVITY);
            assert_eq!(ball.bounce, BALL_BOUNCE);
            assert_eq!(ball.friction, BALL_FRICTION);
            assert_eq!(ball.note_name(), crate::scale::note_name(ball.note()));
        }
    }

    #[test]
    fn test_spawn_beyond_capacity_is_noop() {
        let mut state = DropState::new(1);
        for _ in 0..MAX_BALLS {
            assert!(state.spawn_ball(100.0, 100.0, 0).is_some());
        }
        assert_eq!(state.spawn_ball(100.0, 100.0, 0), None);
        assert_eq!(state.num_active_balls(), MAX_BALLS);
    }

    #[test]
    fn test_platform_geometry_and_note() {
        let mut state = DropState::new(3);
        state.set_key(2);
        let h = state.add_platform(100.0, 100.0).unwrap();
        let p = state.platforms.get(h).unwrap();
        assert_eq!(p.rect(), Rect::new(75.0, 96.0, 50.0, 8.0));
        assert!((-0.5..=0.5).contains(&p.angle()));
        // Index 0 of C major, up a whole tone
        assert_eq!(p.note(), 62);
        assert_eq!(p.note_name(), "D4");
        assert!(!p.is_flashing());
    }

    #[test]
    fn test_platform_notes_follow_index() {
        let mut state = DropState::new(3);
        let notes: Vec<u8> = (0..MAX_PLATFORMS)
            .map(|i| {
                let h = state.add_platform(50.0 + 40.0 * i as f32, 100.0).unwrap();
                state.platforms.get(h).unwrap().note()
            })
            .collect();
        assert_eq!(notes, vec![60, 62, 64, 65, 67, 69]);
        assert_eq!(state.add_platform(10.0, 100.0), None);
    }

    #[test]
    fn test_existing_notes_ignore_config_changes() {
        let mut state = DropState::new(9);
        let h = state.add_platform(100.0, 100.0).unwrap();
        let before = state.platforms.get(h).unwrap().note();
        state.cycle_scale();
        state.key_up();
        state.cycle_octave();
        assert_eq!(state.platforms.get(h).unwrap().note(), before);
    }

    #[test]
    fn test_default_layout() {
        let mut state = DropState::new(0);
        state.place_default_platforms();
        let notes: Vec<(u8, String)> = state
            .platforms
            .iter()
            .map(|(_, p)| (p.note(), p.note_name().to_string()))
            .collect();
        assert_eq!(
            notes,
            vec![
                (60, "C4".to_string()),
                (64, "E4".to_string()),
                (67, "G4".to_string())
            ]
        );
    }

    #[test]
    fn test_config_wrapping() {
        let mut state = DropState::new(0);
        state.key_down();
        assert_eq!(state.config.key, 11);
        state.key_up();
        assert_eq!(state.config.key, 0);

        state.set_octave(7);
        state.cycle_octave();
        assert_eq!(state.config.octave, 2);

        let count = state.notes().scale_count();
        state.set_scale(count - 1);
        state.cycle_scale();
        assert_eq!(state.config.scale, 0);
    }

    #[test]
    fn test_out_of_range_setters_are_noops() {
        let mut state = DropState::new(0);
        state.set_key(12);
        state.set_octave(1);
        state.set_octave(8);
        state.set_scale(99);
        assert_eq!(state.config, NoteConfig::default());
    }

    #[test]
    fn test_flash_expires_after_window() {
        let mut flash = FlashState::Flashing { since_ms: 1000 };
        assert!(!flash.expire(1000 + FLASH_WINDOW_MS));
        assert!(flash.is_flashing());
        assert!(flash.expire(1001 + FLASH_WINDOW_MS));
        assert_eq!(flash, FlashState::Idle);
        assert!(!flash.expire(5000));
    }

    #[test]
    fn test_flashing_platform_shows_inverted_color() {
        let mut p = Platform::new(
            Rect::new(0.0, 0.0, 10.0, 2.0),
            0.0,
            Rgb565(0x1234),
            60,
            "C4".into(),
        );
        assert_eq!(p.display_color(), Rgb565(0x1234));
        p.flash = FlashState::Flashing { since_ms: 0 };
        assert_eq!(p.display_color(), Rgb565(!0x1234));
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = DropState::new(555);
        let mut b = DropState::new(555);
        for _ in 0..4 {
            let ha = a.spawn_ball(100.0, 70.0, 0).unwrap();
            let hb = b.spawn_ball(100.0, 70.0, 0).unwrap();
            let (ba, bb) = (a.balls.get(ha).unwrap(), b.balls.get(hb).unwrap());
            assert_eq!(ba.vel, bb.vel);
            assert_eq!(ba.radius, bb.radius);
            assert_eq!(ba.note(), bb.note());
        }
    }

    #[test]
    fn test_platform_indices_are_append_only() {
        let mut state = DropState::new(8);
        state.place_default_platforms();
        let h = state.add_platform(250.0, 150.0).unwrap();
        assert_eq!(h.index(), 3);
        // Fourth platform takes degree 3 of C major
        assert_eq!(state.platforms().get(h).unwrap().note(), 65);

        for x in [40.0, 160.0] {
            state.add_platform(x, 90.0).unwrap();
        }
        assert_eq!(state.num_platforms(), MAX_PLATFORMS);
        assert_eq!(state.add_platform(300.0, 150.0), None);

        state.clear_all();
        let h = state.add_platform(300.0, 150.0).unwrap();
        assert_eq!(h.index(), 0);
        assert_eq!(state.platforms().get(h).unwrap().note(), 60);
    }

    #[test]
    fn test_unstable_tuning_is_detected() {
        assert!(BallTuning::default().is_stable());
        let unstable = [
            BallTuning {
                friction: 1.01,
                ..Default::default()
            },
            BallTuning {
                bounce: 1.2,
                ..Default::default()
            },
            BallTuning {
                friction: -0.5,
                ..Default::default()
            },
            BallTuning {
                gravity: f32::NAN,
                ..Default::default()
            },
        ];
        for tuning in unstable {
            assert!(!tuning.is_stable(), "{tuning:?}");
        }
    }

    #[test]
    fn test_from_settings_rejects_unstable_tuning() {
        let settings = Settings {
            ball: BallTuning {
                gravity: 0.3,
                bounce: 1.1,
                friction: 1.5,
            },
            default_platforms: false,
            ..Default::default()
        };
        let state = DropState::from_settings(&settings, 1);
        assert_eq!(state.tuning, BallTuning::default());
        assert_eq!(state.num_platforms(), 0);

        let settings = Settings {
            ball: BallTuning {
                gravity: 0.3,
                bounce: 0.5,
                friction: 0.9,
            },
            ..Default::default()
        };
        let state = DropState::from_settings(&settings, 1);
        assert_eq!(state.tuning, settings.ball);
    }
}
