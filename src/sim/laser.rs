//! Rider lasers: homing onto a chosen obstacle, ballistic otherwise

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::ObstacleId;
use super::geom::Rect;
use super::obstacle::{Obstacle, ObstacleType};
use crate::consts::*;
use crate::frame_scale;

pub const LASER_SIZE: (f32, f32) = (15.0, 4.0);
/// Vertical off-screen margin (camera-relative)
pub const LASER_SCREEN_MARGIN: f32 = 50.0;
/// Targets must be at least this far ahead of the rider
const TARGET_MIN_AHEAD: f32 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    /// Centre, screen x / world y
    pub pos: Vec2,
    /// px/frame
    pub vel: Vec2,
    pub target: Option<ObstacleId>,
    pub dead: bool,
}

impl Laser {
    /// Fire from `origin` toward `target_center` (straight ahead without one)
    pub fn new(origin: Vec2, target: Option<(ObstacleId, Vec2)>) -> Self {
        let dir = target
            .map(|(_, c)| (c - origin).normalize_or_zero())
            .filter(|d| *d != Vec2::ZERO)
            .unwrap_or(Vec2::X);
        Self {
            pos: origin,
            vel: dir * LASER_SPEED,
            target: target.map(|(id, _)| id),
            dead: false,
        }
    }

    pub fn rect(&self) -> Rect {
        let (w, h) = LASER_SIZE;
        Rect::new(self.pos.x - w / 2.0, self.pos.y - h / 2.0, w, h)
    }

    /// Heading in degrees, for drawing
    pub fn angle(&self) -> f32 {
        self.vel.y.atan2(self.vel.x).to_degrees()
    }

    /// `target_center` is the live target's centre, `None` once it is gone
    pub fn update(&mut self, target_center: Option<Vec2>, camera_y_offset: f32, dt: f32) {
        let f = frame_scale(dt);
        if self.target.is_some() && target_center.is_none() {
            self.target = None;
        }
        match target_center.filter(|_| self.target.is_some()) {
            Some(center) => {
                let to_target = center - self.pos;
                let dist = to_target.length();
                if dist < LASER_SPEED * 1.5 {
                    self.pos = center;
                } else {
                    if dist > f32::EPSILON {
                        self.vel = to_target / dist * LASER_SPEED;
                    }
                    self.pos += self.vel * f;
                }
            }
            None => {
                self.vel.y += LASER_GRAVITY * f;
                self.pos += self.vel * f;
            }
        }

        let r = self.rect();
        let screen_top = r.top() + camera_y_offset;
        if r.left() > WIDTH
            || r.right() < 0.0
            || screen_top > HEIGHT + LASER_SCREEN_MARGIN
            || screen_top + r.h < -LASER_SCREEN_MARGIN
        {
            self.dead = true;
        }
    }
}

/// Nearest obstacle ahead of the rider within half a screen vertically.
/// In the cave level lasers only home while a bug is around.
pub fn select_target(obstacles: &[Obstacle], from: Vec2, cave: bool) -> Option<(ObstacleId, Vec2)> {
    if cave
        && !obstacles
            .iter()
            .any(|o| !o.dead && o.obstacle_type() == ObstacleType::Bug)
    {
        return None;
    }
    obstacles
        .iter()
        .filter(|o| !o.dead)
        .map(|o| (o.id, o.rect().center()))
        .filter(|(_, c)| c.x > from.x + TARGET_MIN_AHEAD && (c.y - from.y).abs() < HEIGHT / 2.0)
        .min_by(|(_, a), (_, b)| {
            a.distance_squared(from)
                .total_cmp(&b.distance_squared(from))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::{Terrain, TerrainKind};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_ballistic_without_target() {
        let mut laser = Laser::new(Vec2::new(200.0, 300.0), None);
        assert_eq!(laser.vel, Vec2::new(LASER_SPEED, 0.0));
        laser.update(None, 0.0, DT);
        assert!((laser.vel.y - LASER_GRAVITY).abs() < 1e-6);
        assert!(laser.pos.y > 300.0);
        for _ in 0..100 {
            laser.update(None, 0.0, DT);
        }
        assert!(laser.dead);
    }

    #[test]
    fn test_homing_snaps_onto_target() {
        let target = Vec2::new(400.0, 250.0);
        let mut laser = Laser::new(Vec2::new(200.0, 300.0), Some((7, target)));
        for _ in 0..30 {
            laser.update(Some(target), 0.0, DT);
            if laser.pos == target {
                break;
            }
        }
        assert_eq!(laser.pos, target);
    }

    #[test]
    fn test_zero_distance_keeps_heading() {
        let p = Vec2::new(300.0, 300.0);
        let mut laser = Laser::new(p, Some((1, p)));
        assert_eq!(laser.vel, Vec2::new(LASER_SPEED, 0.0));
        laser.update(Some(p), 0.0, DT);
        assert!(laser.pos.is_finite());
        assert!(laser.vel.is_finite());
    }

    #[test]
    fn test_lost_target_goes_ballistic() {
        let mut laser = Laser::new(Vec2::new(200.0, 300.0), Some((3, Vec2::new(800.0, 300.0))));
        laser.update(None, 0.0, DT);
        assert_eq!(laser.target, None);
        assert!(laser.vel.y > 0.0);
    }

    #[test]
    fn test_select_nearest_ahead() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let obstacles = vec![
            Obstacle::bug(1, 700.0, &terrain),
            Obstacle::bug(2, 400.0, &terrain),
            Obstacle::bug(3, 50.0, &terrain),
        ];
        let from = Vec2::new(PLAYER_SCREEN_X, GROUND_Y - 30.0);
        let (id, _) = select_target(&obstacles, from, false).expect("target");
        assert_eq!(id, 2);
    }

    #[test]
    fn test_cave_homes_only_with_bugs() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let from = Vec2::new(PLAYER_SCREEN_X, 300.0);
        let mut crystal = Obstacle::crystal(1, 500.0, &terrain);
        crystal.bottom = terrain.height_at(520.0);
        let obstacles = vec![crystal];
        assert!(select_target(&obstacles, from, true).is_none());
        assert!(select_target(&obstacles, from, false).is_some());
    }
}
