//! Drop mode settings
//!
//! Stored as JSON. Missing fields fall back to defaults, and an unreadable
//! file falls back to defaults entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_OCTAVE;
use crate::sim::BallTuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` picks one at startup
    pub seed: Option<u64>,

    // === Notes ===
    /// Starting scale index
    pub scale: usize,
    /// Starting key (0 = C .. 11 = B)
    pub key: u8,
    /// Starting octave (2-7)
    pub octave: u8,

    // === Physics ===
    /// Motion constants for new balls
    pub ball: BallTuning,

    // === Layout ===
    /// Start with the three-platform triad
    pub default_platforms: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            scale: 0,
            key: 0,
            octave: DEFAULT_OCTAVE,
            ball: BallTuning::default(),
            default_platforms: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Seed to use for this run
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        })
    }

    /// Ball tuning, or the defaults if the stored values would add speed
    pub fn ball_tuning(&self) -> BallTuning {
        if self.ball.is_stable() {
            self.ball
        } else {
            log::warn!("Ignoring unstable ball tuning {:?}, using defaults", self.ball);
            BallTuning::default()
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            },
            Err(e) => log::info!("No settings at {} ({}), using defaults", path.display(), e),
        }
        Self::default()
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) {
        match self.to_json() {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings to {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "key": 5, "ball": { "bounce": 0.8 } }"#).unwrap();
        assert_eq!(settings.key, 5);
        assert_eq!(settings.octave, DEFAULT_OCTAVE);
        assert_eq!(settings.ball.bounce, 0.8);
        assert_eq!(settings.ball.gravity, crate::consts::BALL_GRAVITY);
        assert!(settings.default_platforms);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ key: }").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load(Path::new("/nonexistent/drop-tones.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("drop-tones-{}.json", std::process::id()));
        let settings = Settings {
            seed: Some(77),
            scale: 2,
            default_platforms: false,
            ..Default::default()
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unstable_tuning_falls_back() {
        let json = r#"{ "ball": { "friction": 1.05, "bounce": 1.3 } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.ball_tuning(), BallTuning::default());

        let settings = Settings::from_json(r#"{ "ball": { "friction": 0.95 } }"#).unwrap();
        assert_eq!(settings.ball_tuning().friction, 0.95);
    }

    #[test]
    fn test_fixed_seed_is_kept() {
        let settings = Settings {
            seed: Some(1234),
            ..Default::default()
        };
        assert_eq!(settings.resolve_seed(), 1234);
    }
}
