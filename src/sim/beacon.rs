//! Beacon checkpoints and their activation sequence
//!
//! A collected beacon freezes horizontally and runs a fixed chain of
//! timed phases: charging, ignition, ray, sky burst, fade. Phase changes
//! are driven by `PhaseTimer` against the simulation clock.

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::terrain::Terrain;
use super::timer::PhaseTimer;
use crate::consts::*;
use crate::frame_scale;

pub const BEACON_SIZE: (f32, f32) = (100.0, 120.0);
pub const BEACON_FLOAT_OFFSET: f32 = 8.0;
/// Upward flight speed once collected, px/frame
pub const BEACON_FLY_SPEED: f32 = 35.0;
pub const BEACON_RAY_SPEED: f32 = 90.0;
/// World y at which the ray stops climbing
pub const BEACON_RAY_MAX_REACH: f32 = -HEIGHT;
pub const BEACON_MAX_RAY_ALPHA: f32 = 255.0;
pub const BEACON_RAY_FADE_SPEED: f32 = 25.0;

pub const CHARGING_MS: f64 = 350.0;
pub const IGNITION_MS: f64 = 150.0;
pub const RAY_MS: f64 = 800.0;
pub const BURST_MS: f64 = 250.0;
pub const FADE_MS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeaconPhase {
    Idle,
    Charging,
    IgnitionBlast,
    RayShooting,
    SkyBurst,
    FadingOut,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beacon {
    /// Screen x of the centre
    pub x: f32,
    /// World y of the centre
    pub y: f32,
    pub collected: bool,
    pub phase: PhaseTimer<BeaconPhase>,
    pub ray_origin_y: f32,
    pub ray_top_y: f32,
    pub ray_alpha: f32,
}

impl Beacon {
    pub fn new(x: f32, terrain: &Terrain, now_ms: f64) -> Self {
        Self {
            x,
            y: Self::resting_y(x, terrain),
            collected: false,
            phase: PhaseTimer::new(BeaconPhase::Idle, now_ms, 0.0),
            ray_origin_y: 0.0,
            ray_top_y: 0.0,
            ray_alpha: 0.0,
        }
    }

    fn resting_y(x: f32, terrain: &Terrain) -> f32 {
        terrain.height_at(x) - BEACON_FLOAT_OFFSET - BEACON_SIZE.1 / 2.0
    }

    pub fn rect(&self) -> Rect {
        let (w, h) = BEACON_SIZE;
        Rect::new(self.x - w / 2.0, self.y - h / 2.0, w, h)
    }

    pub fn is_removed(&self) -> bool {
        self.phase.is(BeaconPhase::Removed)
    }

    /// Start the activation sequence; false if already collected
    pub fn collect(&mut self, now_ms: f64) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        self.phase.set(BeaconPhase::Charging, now_ms, CHARGING_MS);
        self.ray_origin_y = self.y;
        self.ray_top_y = self.y;
        self.ray_alpha = 0.0;
        true
    }

    /// Returns true on the frame the beacon ignites
    pub fn update(&mut self, scroll_dx: f32, terrain: &Terrain, now_ms: f64, dt: f32) -> bool {
        let f = frame_scale(dt);
        if !self.collected {
            self.x -= scroll_dx;
            if (0.0..WIDTH).contains(&self.x) {
                self.y = Self::resting_y(self.x, terrain);
            }
            if self.rect().right() < 0.0 {
                self.phase.set(BeaconPhase::Removed, now_ms, 0.0);
            }
            return false;
        }

        let done = self.phase.is_done(now_ms);
        match self.phase.phase {
            BeaconPhase::Idle | BeaconPhase::Removed => {}
            BeaconPhase::Charging => {
                self.y -= BEACON_FLY_SPEED * 0.05 * f;
                if done {
                    self.phase.set(BeaconPhase::IgnitionBlast, now_ms, IGNITION_MS);
                    return true;
                }
            }
            BeaconPhase::IgnitionBlast => {
                if done {
                    self.phase.set(BeaconPhase::RayShooting, now_ms, RAY_MS);
                    self.ray_alpha = BEACON_MAX_RAY_ALPHA;
                }
            }
            BeaconPhase::RayShooting => {
                self.ray_top_y -= BEACON_RAY_SPEED * f;
                self.y -= BEACON_FLY_SPEED * f;
                if self.ray_top_y <= BEACON_RAY_MAX_REACH || done {
                    self.phase.set(BeaconPhase::SkyBurst, now_ms, BURST_MS);
                }
            }
            BeaconPhase::SkyBurst => {
                let progress = self.phase.progress(now_ms);
                self.ray_alpha = BEACON_MAX_RAY_ALPHA * (1.0 - progress * 0.9);
                self.y -= BEACON_FLY_SPEED * 0.4 * f;
                if done {
                    self.phase.set(BeaconPhase::FadingOut, now_ms, FADE_MS);
                }
            }
            BeaconPhase::FadingOut => {
                self.ray_alpha = (self.ray_alpha - BEACON_RAY_FADE_SPEED * f * 0.35).max(0.0);
                self.y -= BEACON_FLY_SPEED * 0.2 * f;
                if done && self.ray_alpha <= 0.0 {
                    self.phase.set(BeaconPhase::Removed, now_ms, 0.0);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainKind;

    #[test]
    fn test_floats_above_terrain() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let beacon = Beacon::new(WIDTH + 50.0, &terrain, 0.0);
        assert_eq!(beacon.rect().bottom(), GROUND_Y - BEACON_FLOAT_OFFSET);
    }

    #[test]
    fn test_collect_once() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut beacon = Beacon::new(300.0, &terrain, 0.0);
        assert!(beacon.collect(10.0));
        assert!(!beacon.collect(20.0));
        assert!(beacon.phase.is(BeaconPhase::Charging));
    }

    #[test]
    fn test_activation_runs_to_removal() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut beacon = Beacon::new(300.0, &terrain, 0.0);
        beacon.collect(0.0);
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        let mut seen = vec![beacon.phase.phase];
        let mut ignitions = 0;
        while !beacon.is_removed() && now < 5000.0 {
            now += 1000.0 / 60.0;
            if beacon.update(6.0, &terrain, now, dt) {
                ignitions += 1;
                assert!(beacon.phase.is(BeaconPhase::IgnitionBlast));
            }
            if seen.last() != Some(&beacon.phase.phase) {
                seen.push(beacon.phase.phase);
            }
            assert_eq!(beacon.x, 300.0, "collected beacons do not scroll");
        }
        assert_eq!(
            seen,
            vec![
                BeaconPhase::Charging,
                BeaconPhase::IgnitionBlast,
                BeaconPhase::RayShooting,
                BeaconPhase::SkyBurst,
                BeaconPhase::FadingOut,
                BeaconPhase::Removed,
            ]
        );
        assert!(now >= CHARGING_MS + IGNITION_MS + BURST_MS + FADE_MS);
        assert_eq!(ignitions, 1);
    }

    #[test]
    fn test_uncollected_scrolls_off() {
        let terrain = Terrain::new(TerrainKind::Slope);
        let mut beacon = Beacon::new(40.0, &terrain, 0.0);
        beacon.update(100.0, &terrain, 16.0, 1.0 / 60.0);
        assert!(beacon.is_removed());
    }
}
