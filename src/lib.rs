//! Avalanche Rider - a downhill side-scroller with pursuit hazards
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, rider, hazards, game state machine)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `audio` / `video` / `render`: Collaborator seams driven by simulation events
//! - `game`: Frame-loop shell wiring the simulation to its collaborators

pub mod audio;
pub mod game;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod video;

pub use game::Game;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Reference frame rate; per-frame speeds are scaled by `dt * TARGET_FPS`
    pub const TARGET_FPS: f32 = 60.0;

    /// Screen dimensions
    pub const WIDTH: f32 = 960.0;
    pub const HEIGHT: f32 = 540.0;

    /// Horizontal width of one terrain sample, in pixels
    pub const CHUNK: f32 = 64.0;
    /// Base ground line (world y grows downward)
    pub const GROUND_Y: f32 = 400.0;
    /// World y added per chunk of distance
    pub const DOWNHILL_SLOPE_FACTOR: f32 = 2.0;
    /// Base ceiling line for the cave biome
    pub const LEVEL2_CEILING_Y: f32 = 60.0;

    /// Rider is pinned at this screen x
    pub const PLAYER_SCREEN_X: f32 = 200.0;
    /// Camera keeps the rider's centre at this screen y
    pub const PLAYER_TARGET_SCREEN_Y: f32 = 300.0;
    pub const PLAYER_WIDTH: f32 = 48.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;

    /// Gravity in px/frame²
    pub const GRAVITY: f32 = 0.6;
    /// Jump impulse in px/frame (negative is up)
    pub const JUMP_VEL: f32 = -12.0;
    pub const MAX_JUMPS: u8 = 2;
    pub const MAX_PLAYER_HEALTH: i32 = 100;
    pub const MAX_BULLETS: u32 = 10;
    /// World scroll in px/frame
    pub const PLAYER_DOWNHILL_SPEED: f32 = 6.0;

    /// Minimum gap between shots (ms)
    pub const SHOT_COOLDOWN_MS: f64 = 200.0;
    pub const LASER_SPEED: f32 = 14.0;
    pub const LASER_GRAVITY: f32 = 0.15;

    /// Scroll multiplier and duration after a recoverable hit; the
    /// recoverable hit animation spans the same duration
    pub const SLOWDOWN_FACTOR: f32 = 0.5;
    pub const SLOWDOWN_DURATION_MS: f64 = 1500.0;

    /// Frames in the dying / shooting sprite strips
    pub const DYING_FRAME_COUNT: u32 = 3;
    pub const SHOOTING_FRAME_COUNT: u32 = 3;
}

/// Convert a frame delta in seconds to "reference frames" (1.0 at 60 FPS)
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt * consts::TARGET_FPS
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
