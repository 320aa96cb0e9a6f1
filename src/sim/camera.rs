//! Camera and scroll coordinator
//!
//! The rider is pinned horizontally, so the camera only tracks vertically.
//! It also accumulates the horizontal world distance (in chunks) that drives
//! checkpoint spawning.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Event-driven shake parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeRequest {
    /// Max offset in pixels per axis
    pub magnitude: f32,
    /// Seconds
    pub duration: f32,
}

impl ShakeRequest {
    pub const fn new(magnitude: f32, duration: f32) -> Self {
        Self {
            magnitude,
            duration,
        }
    }
}

pub const SATELLITE_IMPACT_SHAKE: ShakeRequest = ShakeRequest::new(20.0, 0.45);
pub const CRYSTAL_IMPACT_SHAKE: ShakeRequest = ShakeRequest::new(8.0, 0.3);
pub const AVALANCHE_RUMBLE_SHAKE: ShakeRequest = ShakeRequest::new(8.0, 0.6);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub magnitude: f32,
    pub duration: f32,
    pub timer: f32,
}

impl ScreenShake {
    /// Replace any running shake
    pub fn request(&mut self, req: ShakeRequest) {
        self.magnitude = req.magnitude;
        self.duration = req.duration;
        self.timer = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.timer < self.duration && self.magnitude > 0.0
    }

    pub fn update(&mut self, dt: f32) {
        if self.timer < self.duration {
            self.timer += dt;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        random_offset(rng, self.magnitude)
    }
}

/// Integer offset in [-m, m] on each axis
fn random_offset(rng: &mut impl Rng, magnitude: f32) -> Vec2 {
    let m = magnitude.round() as i32;
    if m <= 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.random_range(-m..=m) as f32,
        rng.random_range(-m..=m) as f32,
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Added to world y to get screen y
    pub y_offset: f32,
    /// Horizontal distance travelled this attempt, in chunks
    pub world_distance: f64,
    pub shake: ScreenShake,
    /// Offset applied to the current frame (event shake plus avalanche rumble)
    pub shake_offset: Vec2,
}

impl Camera {
    pub fn new(rider_y: f32) -> Self {
        let mut camera = Self::default();
        camera.follow(rider_y);
        camera
    }

    /// Keep the rider's centre at `PLAYER_TARGET_SCREEN_Y`
    pub fn follow(&mut self, rider_y: f32) {
        let rider_center = rider_y - PLAYER_HEIGHT / 2.0;
        self.y_offset = PLAYER_TARGET_SCREEN_Y - rider_center;
    }

    pub fn advance(&mut self, scroll_dx: f32) {
        self.world_distance += (scroll_dx / CHUNK) as f64;
    }

    pub fn to_screen_y(&self, world_y: f32) -> f32 {
        world_y + self.y_offset
    }

    /// Advance the event shake and roll this frame's offsets
    pub fn update_shake(
        &mut self,
        dt: f32,
        continuous: f32,
        enabled: bool,
        rng: &mut impl Rng,
    ) {
        self.shake.update(dt);
        if !enabled {
            self.shake_offset = Vec2::ZERO;
            return;
        }
        self.shake_offset = self.shake.sample(rng) + random_offset(rng, continuous);
    }
}
