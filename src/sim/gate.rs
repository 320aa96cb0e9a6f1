//! Level exits: the level-1 portal and the level-2 stairs

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::terrain::Terrain;

pub const PORTAL_SIZE: (f32, f32) = (100.0, 150.0);
/// Portal sits slightly sunk into the ground
pub const PORTAL_GROUND_SINK: f32 = 5.0;
pub const PORTAL_FRAME_COUNT: u32 = 5;
pub const PORTAL_FRAME_SECS: f32 = 0.12;

pub const STAIRS_SIZE: (f32, f32) = (180.0, 200.0);
/// Fraction of the stairs' width the rider must pass to enter
pub const STAIRS_ENTRANCE_FRACTION: f32 = 0.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portal {
    /// Screen x of the left edge
    pub x: f32,
    /// World y of the bottom edge
    pub bottom: f32,
    pub frame: u32,
    anim_timer: f32,
    pub dead: bool,
}

impl Portal {
    pub fn new(x: f32, terrain: &Terrain) -> Self {
        let mut portal = Self {
            x,
            bottom: 0.0,
            frame: 0,
            anim_timer: 0.0,
            dead: false,
        };
        portal.settle(terrain);
        portal
    }

    fn settle(&mut self, terrain: &Terrain) {
        self.bottom = terrain.height_at(self.x + PORTAL_SIZE.0 / 2.0) + PORTAL_GROUND_SINK;
    }

    pub fn rect(&self) -> Rect {
        let (w, h) = PORTAL_SIZE;
        Rect::new(self.x, self.bottom - h, w, h)
    }

    pub fn update(&mut self, scroll_dx: f32, terrain: &Terrain, dt: f32) {
        self.x -= scroll_dx;
        self.settle(terrain);
        self.anim_timer += dt;
        if self.anim_timer >= PORTAL_FRAME_SECS {
            self.anim_timer = 0.0;
            self.frame = (self.frame + 1) % PORTAL_FRAME_COUNT;
        }
        if self.rect().right() < 0.0 {
            self.dead = true;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stairs {
    /// Screen x of the left edge
    pub x: f32,
    /// World y of the bottom edge
    pub bottom: f32,
}

impl Stairs {
    pub fn new(x: f32, terrain: &Terrain) -> Self {
        let mut stairs = Self { x, bottom: 0.0 };
        stairs.settle(terrain);
        stairs
    }

    fn settle(&mut self, terrain: &Terrain) {
        self.bottom = terrain.height_at(self.x + STAIRS_SIZE.0 / 2.0);
    }

    pub fn rect(&self) -> Rect {
        let (w, h) = STAIRS_SIZE;
        Rect::new(self.x, self.bottom - h, w, h)
    }

    pub fn update(&mut self, scroll_dx: f32, terrain: &Terrain) {
        self.x -= scroll_dx;
        self.settle(terrain);
    }

    /// Rider has walked into the doorway
    pub fn is_entered_by(&self, rider: &Rect) -> bool {
        let r = self.rect();
        let threshold = r.left() + r.w * STAIRS_ENTRANCE_FRACTION;
        rider.center_x() >= threshold && rider.right() > r.left() && rider.overlaps(&r)
    }
}
