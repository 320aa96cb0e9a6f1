//! Player preferences
//!
//! Held in memory for the session; the Settings screen edits them in place.

use serde::{Deserialize, Serialize};

/// Step applied by Left/Right on the Settings screen
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Visual Effects ===
    /// Screen shake on impacts and the avalanche rumble
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, softer flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            sfx_volume: 1.0,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Nudge music volume by `delta`, clamped to [0, 1]; returns the new value
    pub fn adjust_music_volume(&mut self, delta: f32) -> f32 {
        // Round to the step grid so repeated presses land on 0.0 and 1.0 exactly
        let stepped = ((self.music_volume + delta) / VOLUME_STEP).round() * VOLUME_STEP;
        self.music_volume = stepped.clamp(0.0, 1.0);
        self.music_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamps() {
        let mut s = Settings::default();
        for _ in 0..20 {
            s.adjust_music_volume(VOLUME_STEP);
        }
        assert_eq!(s.music_volume, 1.0);
        for _ in 0..20 {
            s.adjust_music_volume(-VOLUME_STEP);
        }
        assert_eq!(s.music_volume, 0.0);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let s = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!s.effective_screen_shake());
        assert!(Settings::default().effective_screen_shake());
    }
}
