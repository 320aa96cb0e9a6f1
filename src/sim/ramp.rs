//! Transient linear ramp laid over the terrain

use serde::{Deserialize, Serialize};

use super::terrain::Terrain;
use crate::consts::WIDTH;

pub const RAMP_LENGTH: f32 = 350.0;
pub const RAMP_RISE: f32 = 250.0;
pub const FINAL_RAMP_RISE: f32 = 160.0;
/// Visual thickness of the ramp deck
pub const RAMP_THICKNESS: f32 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ramp {
    /// Screen x of the low end
    pub start_x: f32,
    pub length: f32,
    pub rise: f32,
    /// Terrain height under `start_x`
    pub base_y: f32,
    pub is_final: bool,
}

impl Ramp {
    pub fn new(start_x: f32, terrain: &Terrain, is_final: bool) -> Self {
        Self {
            start_x,
            length: RAMP_LENGTH,
            rise: if is_final { FINAL_RAMP_RISE } else { RAMP_RISE },
            base_y: terrain.height_at(start_x),
            is_final,
        }
    }

    pub fn end_x(&self) -> f32 {
        self.start_x + self.length
    }

    /// Scroll with the world; the base re-anchors while the low end is on screen
    pub fn update(&mut self, dx: f32, terrain: &Terrain) {
        self.start_x -= dx;
        if (0.0..WIDTH).contains(&self.start_x) {
            self.base_y = terrain.height_at(self.start_x);
        }
    }

    /// Ramp surface height under `x`, or `None` off the ramp
    pub fn on_ramp(&self, x: f32) -> Option<f32> {
        if x < self.start_x || x > self.end_x() {
            return None;
        }
        if self.length == 0.0 {
            return Some(self.base_y);
        }
        let progression = (x - self.start_x) / self.length;
        Some(self.base_y - progression * self.rise)
    }

    pub fn is_off_screen(&self) -> bool {
        self.end_x() < 0.0
    }
}
