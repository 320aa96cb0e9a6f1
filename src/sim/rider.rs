//! The player's rider: kinematics, rotation and hit/death animation
//!
//! Physics runs in "reference frames" (`frame_scale(dt)`), so per-frame
//! constants like `GRAVITY` and `JUMP_VEL` keep their meaning at any rate.
//! Rotation and animation timers run in seconds.

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::ramp::Ramp;
use super::terrain::Terrain;
use crate::consts::*;
use crate::{frame_scale, wrap_degrees};

/// Per-frame exponential smoothing toward the ground slope angle
pub const GROUND_ROTATION_SMOOTHING: f32 = 0.2;
/// Distance above the ground that still counts as contact
pub const GROUND_DETECTION_TOLERANCE: f32 = 3.0;
/// Air flip speed, degrees per second
pub const FLIP_ROTATION_SPEED: f32 = 360.0;
/// Landing assist engages this far above the ground
pub const LANDING_ASSIST_DISTANCE: f32 = PLAYER_HEIGHT * 1.25;
/// Proportional gain of the landing assist (1/s)
pub const LANDING_ASSIST_GAIN: f32 = 7.0;
/// A ramp surface only counts if it is at most this far below the ground
pub const RAMP_GROUND_MARGIN: f32 = 5.0;

pub const SHOOTING_FRAME_SECS: f32 = 0.07;
pub const IDLE_FRAME_SECS: f32 = 0.12;
pub const IDLE_FRAME_COUNT: u32 = 4;

/// Recoverable hit: fixed fall and rise windows inside the slowdown duration
pub const RECOVERY_FALL_SECS: f32 = 0.5;
pub const RECOVERY_RISE_SECS: f32 = 0.5;

fn recovery_total_secs() -> f32 {
    (SLOWDOWN_DURATION_MS / 1000.0) as f32
}

/// Seconds per frame of the fatal animation
fn fatal_frame_secs() -> f32 {
    recovery_total_secs() / DYING_FRAME_COUNT as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DyingKind {
    Fatal,
    Recoverable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DyingPhase {
    /// Fatal fall; freezes on the last frame
    FatalFall,
    Falling,
    Holding,
    Rising,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dying {
    pub kind: DyingKind,
    pub phase: DyingPhase,
    /// Seconds since the hit
    pub elapsed: f32,
    /// Seconds since the current phase began
    pub phase_elapsed: f32,
    pub frame: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shooting {
    pub timer: f32,
    pub frame: u32,
}

/// What happened during one rider update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiderUpdate {
    /// Touched down this frame after being airborne
    pub landed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    /// Fixed screen x of the rider's centre
    pub x: f32,
    /// World y of the rider's feet
    pub y: f32,
    /// Vertical velocity, px/frame (positive is down)
    pub vy: f32,
    pub on_ground: bool,
    pub jump_count: u8,
    pub bullets_remaining: u32,
    /// Inactive riders are frozen (portal reached)
    pub active: bool,
    /// Hidden riders stick to the ground and are not drawn (entered the stairs)
    pub hidden: bool,
    pub is_flipping: bool,
    pub flip_angle: f32,
    pub landing_assist: bool,
    pub ground_rotation: f32,
    pub smoothed_rotation: f32,
    pub shooting: Option<Shooting>,
    pub dying: Option<Dying>,
    pub idle_frame: u32,
    idle_timer: f32,
}

impl Rider {
    /// Spawn standing on the terrain at the fixed screen x
    pub fn new(terrain: &Terrain) -> Self {
        Self {
            x: PLAYER_SCREEN_X,
            y: terrain.height_at(PLAYER_SCREEN_X),
            vy: 0.0,
            on_ground: true,
            jump_count: 0,
            bullets_remaining: MAX_BULLETS,
            active: true,
            hidden: false,
            is_flipping: false,
            flip_angle: 0.0,
            landing_assist: false,
            ground_rotation: 0.0,
            smoothed_rotation: 0.0,
            shooting: None,
            dying: None,
            idle_frame: 0,
            idle_timer: 0.0,
        }
    }

    /// Unrotated collision box
    pub fn rect(&self) -> Rect {
        Rect::from_midbottom(self.x, self.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn is_dying(&self) -> bool {
        self.dying.is_some()
    }

    pub fn is_fatally_dying(&self) -> bool {
        self.dying.is_some_and(|d| d.kind == DyingKind::Fatal)
    }

    /// Angle to draw the sprite at, in degrees
    pub fn display_angle(&self) -> f32 {
        if self.is_flipping || self.landing_assist {
            wrap_degrees(self.flip_angle)
        } else {
            self.smoothed_rotation
        }
    }

    /// Start a jump; fails past `MAX_JUMPS` or while dying
    pub fn perform_jump(&mut self) -> bool {
        if self.jump_count >= MAX_JUMPS || self.is_dying() {
            return false;
        }
        self.vy = JUMP_VEL;
        self.on_ground = false;
        self.ground_rotation = 0.0;
        self.jump_count += 1;
        self.is_flipping = true;
        self.landing_assist = false;
        true
    }

    pub fn start_shooting_animation(&mut self) {
        if self.is_dying() {
            return;
        }
        self.shooting = Some(Shooting { timer: 0.0, frame: 0 });
    }

    /// Begin a hit animation. A fatal hit overrides a recoverable one,
    /// never the other way round.
    pub fn start_dying_animation(&mut self, fatal: bool) {
        let kind = if fatal {
            DyingKind::Fatal
        } else {
            DyingKind::Recoverable
        };
        if let Some(current) = self.dying
            && (current.kind == kind || current.kind == DyingKind::Fatal)
        {
            return;
        }
        self.dying = Some(Dying {
            kind,
            phase: if fatal {
                DyingPhase::FatalFall
            } else {
                DyingPhase::Falling
            },
            elapsed: 0.0,
            phase_elapsed: 0.0,
            frame: 0,
        });
        self.shooting = None;
        self.is_flipping = false;
        self.flip_angle = 0.0;
        self.landing_assist = false;
        self.hidden = false;
    }

    /// Ground height under `x`, letting a ramp surface override the terrain
    fn effective_ground_at(x: f32, terrain: &Terrain, ramp: Option<&Ramp>) -> f32 {
        let ground = terrain.height_at(x);
        match ramp.and_then(|r| r.on_ramp(x)) {
            Some(ramp_y) if ramp_y < ground + RAMP_GROUND_MARGIN => ramp_y,
            _ => ground,
        }
    }

    /// Corpse freezes once the fatal animation reaches its last frame
    fn physics_frozen(&self) -> bool {
        self.dying.is_some_and(|d| {
            d.kind == DyingKind::Fatal && d.frame >= DYING_FRAME_COUNT.saturating_sub(1)
        })
    }

    pub fn update(&mut self, terrain: &Terrain, ramp: Option<&Ramp>, dt: f32) -> RiderUpdate {
        let mut result = RiderUpdate::default();
        if !self.active {
            return result;
        }
        if self.hidden {
            self.y = terrain.height_at(self.x);
            return result;
        }

        let f = frame_scale(dt);
        let apply_physics = !self.physics_frozen();

        if apply_physics {
            self.vy += GRAVITY * f;
            self.y += self.vy * f;

            if terrain.has_ceiling() {
                let ceiling = terrain.ceiling_height_at(self.x);
                if self.y - PLAYER_HEIGHT < ceiling && self.vy < 0.0 {
                    self.y = ceiling + PLAYER_HEIGHT;
                    self.vy = 0.0;
                }
            }
        } else {
            self.vy = 0.0;
            self.y = terrain.height_at(self.x);
            self.on_ground = true;
            self.smoothed_rotation = 0.0;
            self.ground_rotation = 0.0;
        }

        let ground = Self::effective_ground_at(self.x, terrain, ramp);

        let was_on_ground = self.on_ground;
        if apply_physics {
            if self.y >= ground - GROUND_DETECTION_TOLERANCE {
                if self.vy >= 0.0 {
                    self.y = ground;
                    self.vy = 0.0;
                    self.on_ground = true;
                    if !was_on_ground {
                        self.jump_count = 0;
                        result.landed = true;
                    }
                    if !self.is_dying() {
                        self.is_flipping = false;
                        self.flip_angle = 0.0;
                    }
                    self.landing_assist = false;
                }
            } else {
                self.on_ground = false;
            }
        }

        self.update_air_rotation(ground, dt);
        self.update_ground_rotation(terrain, ramp, apply_physics, f);
        self.update_dying(dt);
        self.update_shooting(dt);

        self.idle_timer += dt;
        if self.idle_timer >= IDLE_FRAME_SECS {
            self.idle_timer -= IDLE_FRAME_SECS;
            self.idle_frame = (self.idle_frame + 1) % IDLE_FRAME_COUNT;
        }

        result
    }

    /// Constant-rate flip, handing over to a P-controller just before landing
    fn update_air_rotation(&mut self, ground: f32, dt: f32) {
        if self.is_dying() {
            self.is_flipping = false;
            self.flip_angle = 0.0;
            self.landing_assist = false;
            return;
        }
        if self.on_ground {
            self.is_flipping = false;
            self.landing_assist = false;
            return;
        }

        let distance_to_ground = ground - self.y;
        let can_assist = self.is_flipping
            && self.vy > 0.0
            && distance_to_ground < LANDING_ASSIST_DISTANCE
            && distance_to_ground > -PLAYER_HEIGHT * 0.5;
        self.landing_assist = can_assist;

        if self.landing_assist {
            let angle = wrap_degrees(self.flip_angle);
            if angle > 1.0 && (angle - 360.0).abs() > 1.0 {
                let error = if angle <= 180.0 { angle } else { -(360.0 - angle) };
                self.flip_angle += -error * LANDING_ASSIST_GAIN * dt;
            }
        } else if self.is_flipping {
            self.flip_angle += FLIP_ROTATION_SPEED * dt;
        }
    }

    /// Follow the local slope (sampled half a body-width either side)
    fn update_ground_rotation(
        &mut self,
        terrain: &Terrain,
        ramp: Option<&Ramp>,
        apply_physics: bool,
        f: f32,
    ) {
        let grounded = self.on_ground && apply_physics;
        if grounded {
            let half = (PLAYER_WIDTH * 0.5).max(1.0);
            let y_left = Self::effective_ground_at(self.x - half, terrain, ramp);
            let y_right = Self::effective_ground_at(self.x + half, terrain, ramp);
            self.ground_rotation = -(y_right - y_left).atan2(2.0 * half).to_degrees();
        } else {
            self.ground_rotation = 0.0;
        }
        let alpha = 1.0 - (1.0 - GROUND_ROTATION_SMOOTHING).powf(f);
        self.smoothed_rotation += (self.ground_rotation - self.smoothed_rotation) * alpha;
    }

    fn update_dying(&mut self, dt: f32) {
        let Some(mut dying) = self.dying else { return };
        dying.elapsed += dt;
        dying.phase_elapsed += dt;
        let last = DYING_FRAME_COUNT.saturating_sub(1);

        match dying.phase {
            DyingPhase::FatalFall => {
                let step = fatal_frame_secs();
                if dying.phase_elapsed >= step {
                    dying.phase_elapsed -= step;
                    if dying.frame < last {
                        dying.frame += 1;
                    } else {
                        self.dying = None;
                        return;
                    }
                }
            }
            DyingPhase::Falling => {
                let steps = DYING_FRAME_COUNT.max(1);
                let per_step = RECOVERY_FALL_SECS / steps as f32;
                dying.frame = ((dying.phase_elapsed / per_step) as u32).min(last);
                if dying.elapsed >= RECOVERY_FALL_SECS {
                    dying.frame = last;
                    dying.phase = if rising_start_secs() > RECOVERY_FALL_SECS + 0.001 {
                        DyingPhase::Holding
                    } else {
                        DyingPhase::Rising
                    };
                    dying.phase_elapsed = 0.0;
                }
            }
            DyingPhase::Holding => {
                dying.frame = last;
                if dying.elapsed >= rising_start_secs() {
                    dying.phase = DyingPhase::Rising;
                    dying.phase_elapsed = 0.0;
                }
            }
            DyingPhase::Rising => {
                let duration = recovery_total_secs() - rising_start_secs();
                let steps = DYING_FRAME_COUNT.max(1);
                let per_step = duration / steps as f32;
                if duration <= 0.001 || dying.phase_elapsed >= duration {
                    self.dying = None;
                    return;
                }
                let step = ((dying.phase_elapsed / per_step) as u32).min(last);
                dying.frame = last - step;
            }
        }
        self.dying = Some(dying);
    }

    fn update_shooting(&mut self, dt: f32) {
        let Some(mut shooting) = self.shooting else { return };
        shooting.timer += dt;
        if shooting.timer >= SHOOTING_FRAME_SECS {
            shooting.timer -= SHOOTING_FRAME_SECS;
            shooting.frame += 1;
        }
        self.shooting = (shooting.frame < SHOOTING_FRAME_COUNT).then_some(shooting);
    }
}

/// Start of the rise window inside the recovery
fn rising_start_secs() -> f32 {
    RECOVERY_FALL_SECS.max(recovery_total_secs() - RECOVERY_RISE_SECS)
}
