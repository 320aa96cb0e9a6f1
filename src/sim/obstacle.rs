//! Obstacle family
//!
//! All variants share a small contract (rect, damage, debris material,
//! update, destroy) and are dispatched through `ObstacleKind`. Horizontal
//! positions are screen-space; vertical positions are world-space.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::{CRYSTAL_IMPACT_SHAKE, SATELLITE_IMPACT_SHAKE, ShakeRequest};
use super::event::{GameEvent, LoopId, Material, ObstacleId, SoundCue};
use super::geom::Rect;
use super::terrain::Terrain;
use crate::consts::*;
use crate::frame_scale;

pub const ICE_SIZE: (f32, f32) = (70.0, 90.0);
pub const ICE_ERUPTION_SPEED: (f32, f32) = (350.0, 550.0);
pub const ICE_PROXIMITY: f32 = WIDTH * 0.45;
pub const ICE_GLINT_DURATION: (f32, f32) = (0.08, 0.2);
pub const ICE_FIRST_GLINT_DELAY: (f32, f32) = (0.5, 1.5);
pub const ICE_GLINT_INTERVAL: (f32, f32) = (0.8, 2.5);

pub const SATELLITE_SIZE: (f32, f32) = (200.0, 220.0);
pub const SATELLITE_FALL_HEIGHT: f32 = 660.0;
pub const SATELLITE_FALL_SECS: f32 = 1.4;
pub const SATELLITE_DRIFT: f32 = 50.0;
pub const SATELLITE_SINK: f32 = 80.0;

pub const BUG_SIZE: (f32, f32) = (50.0, 40.0);
pub const BUG_SPEED: f32 = 1.5;
pub const BUG_FRAME_SECS: f32 = 0.15;

pub const CRYSTAL_SIZE: (f32, f32) = (40.0, 70.0);
pub const CRYSTAL_SPAWN_ABOVE_CEILING: f32 = 20.0;
pub const CRYSTAL_INITIAL_FALL: f32 = 1.0;
pub const CRYSTAL_ACCEL: f32 = 0.35;
/// Crystals linger a little past the left edge
pub const CRYSTAL_KILL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleType {
    Ice,
    Satellite,
    Bug,
    Crystal,
}

impl ObstacleType {
    pub fn damage(self) -> i32 {
        match self {
            ObstacleType::Ice => 25,
            ObstacleType::Satellite => 35,
            ObstacleType::Bug => 20,
            ObstacleType::Crystal => 30,
        }
    }

    pub fn material(self) -> Material {
        match self {
            ObstacleType::Ice => Material::Ice,
            ObstacleType::Satellite => Material::Machinery,
            ObstacleType::Bug => Material::BugGoo,
            ObstacleType::Crystal => Material::Crystal,
        }
    }

    pub fn size(self) -> (f32, f32) {
        match self {
            ObstacleType::Ice => ICE_SIZE,
            ObstacleType::Satellite => SATELLITE_SIZE,
            ObstacleType::Bug => BUG_SIZE,
            ObstacleType::Crystal => CRYSTAL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EruptionState {
    Dormant,
    Erupting,
    Erupted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceFormation {
    pub state: EruptionState,
    pub visible_height: f32,
    /// px/s
    pub eruption_speed: f32,
    /// Seconds until the next glint (after eruption)
    pub glint_cooldown: f32,
    /// Seconds of glint left (> 0 while flashing)
    pub glint_remaining: f32,
}

/// Particle emitter state for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emitter {
    Flames,
    Smoke,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokenSatellite {
    pub impacted: bool,
    /// px/s
    pub vy: f32,
    /// px/s²
    pub accel: f32,
    pub emitter: Emitter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugObstacle {
    pub facing_left: bool,
    pub frame: u32,
    anim_timer: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrystalObstacle {
    pub landed: bool,
    /// px/frame
    pub vy: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObstacleKind {
    Ice(IceFormation),
    Satellite(BrokenSatellite),
    Bug(BugObstacle),
    Crystal(CrystalObstacle),
}

/// Frame context shared by every obstacle update
#[derive(Debug, Clone, Copy)]
pub struct ObstacleEnv<'a> {
    pub terrain: &'a Terrain,
    pub scroll_dx: f32,
    pub in_tutorial: bool,
    pub player_x: f32,
    pub dt: f32,
}

/// Side effects of one obstacle update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObstacleUpdate {
    pub shake: Option<ShakeRequest>,
}

/// What the caller needs after an obstacle is destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyInfo {
    pub material: Material,
    pub x: f32,
    pub y: f32,
    pub kind: ObstacleType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// Screen x of the left edge
    pub x: f32,
    /// World y of the bottom edge
    pub bottom: f32,
    pub kind: ObstacleKind,
    /// Marked for removal at the end of the frame
    pub dead: bool,
}

impl Obstacle {
    /// Dormant ice formation sitting on the terrain
    pub fn ice(id: ObstacleId, x: f32, terrain: &Terrain, rng: &mut impl Rng) -> Self {
        let (w, _) = ICE_SIZE;
        Self {
            id,
            x,
            bottom: terrain.height_at(x + w / 2.0),
            kind: ObstacleKind::Ice(IceFormation {
                state: EruptionState::Dormant,
                visible_height: 0.0,
                eruption_speed: rng.random_range(ICE_ERUPTION_SPEED.0..=ICE_ERUPTION_SPEED.1),
                glint_cooldown: 0.0,
                glint_remaining: 0.0,
            }),
            dead: false,
        }
    }

    /// Satellite high above its landing spot; the caller starts the fall loop
    pub fn satellite(id: ObstacleId, x: f32, terrain: &Terrain) -> Self {
        let (w, _) = SATELLITE_SIZE;
        let ground = terrain.height_at(x + w / 2.0);
        Self {
            id,
            x,
            bottom: ground - SATELLITE_FALL_HEIGHT,
            kind: ObstacleKind::Satellite(BrokenSatellite {
                impacted: false,
                vy: 0.0,
                accel: 2.0 * SATELLITE_FALL_HEIGHT / (SATELLITE_FALL_SECS * SATELLITE_FALL_SECS),
                emitter: Emitter::Flames,
            }),
            dead: false,
        }
    }

    pub fn bug(id: ObstacleId, x: f32, terrain: &Terrain) -> Self {
        let (w, _) = BUG_SIZE;
        Self {
            id,
            x,
            bottom: terrain.height_at(x + w / 2.0),
            kind: ObstacleKind::Bug(BugObstacle {
                facing_left: true,
                frame: 0,
                anim_timer: 0.0,
            }),
            dead: false,
        }
    }

    /// Crystal hanging just above the cave ceiling
    pub fn crystal(id: ObstacleId, x: f32, terrain: &Terrain) -> Self {
        let (w, _) = CRYSTAL_SIZE;
        let cx = x + w / 2.0;
        let top = if terrain.has_ceiling() {
            terrain.ceiling_height_at(cx)
        } else {
            terrain.height_at(cx) - HEIGHT
        };
        Self {
            id,
            x,
            bottom: top - CRYSTAL_SPAWN_ABOVE_CEILING,
            kind: ObstacleKind::Crystal(CrystalObstacle {
                landed: false,
                vy: CRYSTAL_INITIAL_FALL,
            }),
            dead: false,
        }
    }

    pub fn obstacle_type(&self) -> ObstacleType {
        match self.kind {
            ObstacleKind::Ice(_) => ObstacleType::Ice,
            ObstacleKind::Satellite(_) => ObstacleType::Satellite,
            ObstacleKind::Bug(_) => ObstacleType::Bug,
            ObstacleKind::Crystal(_) => ObstacleType::Crystal,
        }
    }

    pub fn damage(&self) -> i32 {
        self.obstacle_type().damage()
    }

    pub fn material(&self) -> Material {
        self.obstacle_type().material()
    }

    /// Every variant can be shot
    pub fn is_destructible(&self) -> bool {
        true
    }

    /// Collision rect; an ice formation only collides with its erupted part
    pub fn rect(&self) -> Rect {
        let (w, h) = self.obstacle_type().size();
        let h = match &self.kind {
            ObstacleKind::Ice(ice) => ice.visible_height,
            _ => h,
        };
        Rect::new(self.x, self.bottom - h, w, h)
    }

    fn center_x(&self) -> f32 {
        self.x + self.obstacle_type().size().0 / 2.0
    }

    fn on_screen(&self) -> bool {
        let r = self.rect();
        r.right() > 0.0 && r.left() < WIDTH
    }

    pub fn is_off_screen(&self) -> bool {
        let margin = match self.kind {
            ObstacleKind::Crystal(_) => CRYSTAL_KILL_MARGIN,
            _ => 0.0,
        };
        self.x + self.obstacle_type().size().0 < -margin
    }

    pub fn update(
        &mut self,
        env: &ObstacleEnv,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) -> ObstacleUpdate {
        let mut out = ObstacleUpdate::default();
        let f = frame_scale(env.dt);
        let scrolls = !env.in_tutorial || matches!(self.kind, ObstacleKind::Crystal(_));
        if scrolls {
            self.x -= env.scroll_dx;
        }
        let on_screen = self.on_screen();
        let center_x = self.center_x();
        let (w, _) = self.obstacle_type().size();
        let terrain = env.terrain;

        match &mut self.kind {
            ObstacleKind::Ice(ice) => {
                self.bottom = terrain.height_at(center_x);
                if ice.state == EruptionState::Dormant
                    && on_screen
                    && (center_x - env.player_x).abs() < ICE_PROXIMITY
                {
                    ice.state = EruptionState::Erupting;
                }
                match ice.state {
                    EruptionState::Dormant => {}
                    EruptionState::Erupting => {
                        ice.visible_height += ice.eruption_speed * env.dt;
                        if ice.visible_height >= ICE_SIZE.1 {
                            ice.visible_height = ICE_SIZE.1;
                            ice.state = EruptionState::Erupted;
                            ice.glint_cooldown = rng
                                .random_range(ICE_FIRST_GLINT_DELAY.0..=ICE_FIRST_GLINT_DELAY.1);
                        }
                    }
                    EruptionState::Erupted => {
                        if ice.glint_remaining > 0.0 {
                            ice.glint_remaining = (ice.glint_remaining - env.dt).max(0.0);
                        } else {
                            ice.glint_cooldown -= env.dt;
                            if ice.glint_cooldown <= 0.0 {
                                ice.glint_remaining = rng
                                    .random_range(ICE_GLINT_DURATION.0..=ICE_GLINT_DURATION.1);
                                ice.glint_cooldown =
                                    rng.random_range(ICE_GLINT_INTERVAL.0..=ICE_GLINT_INTERVAL.1);
                            }
                        }
                    }
                }
            }
            ObstacleKind::Satellite(sat) => {
                if sat.impacted {
                    self.bottom = terrain.height_at(center_x) + SATELLITE_SINK;
                } else {
                    self.x -= SATELLITE_DRIFT * env.dt;
                    sat.vy += sat.accel * env.dt;
                    self.bottom += sat.vy * env.dt;
                    let ground = terrain.height_at(self.x + w / 2.0);
                    if self.bottom >= ground {
                        self.bottom = ground + SATELLITE_SINK;
                        sat.impacted = true;
                        sat.vy = 0.0;
                        sat.emitter = Emitter::Smoke;
                        out.shake = Some(SATELLITE_IMPACT_SHAKE);
                        let cx = self.x + w / 2.0;
                        events.push(GameEvent::Debris {
                            material: Material::Machinery,
                            x: cx,
                            y: ground,
                        });
                        events.push(GameEvent::Debris {
                            material: Material::SnowPuff,
                            x: cx,
                            y: ground,
                        });
                        events.push(GameEvent::LoopStop(LoopId::SatelliteFall(self.id)));
                        events.push(GameEvent::Sound(SoundCue::SatelliteImpact));
                    }
                }
            }
            ObstacleKind::Bug(bug) => {
                if on_screen {
                    let dx = env.player_x - center_x;
                    if dx.abs() > 1.0 {
                        let step = (BUG_SPEED * f).min(dx.abs());
                        self.x += step * dx.signum();
                        bug.facing_left = dx < 0.0;
                    }
                }
                self.bottom = terrain.height_at(self.x + w / 2.0);
                bug.anim_timer += env.dt;
                if bug.anim_timer >= BUG_FRAME_SECS {
                    bug.anim_timer -= BUG_FRAME_SECS;
                    bug.frame = (bug.frame + 1) % 2;
                }
            }
            ObstacleKind::Crystal(crystal) => {
                let floor = terrain.height_at(center_x);
                if crystal.landed {
                    self.bottom = floor;
                } else {
                    crystal.vy += CRYSTAL_ACCEL * f;
                    self.bottom += crystal.vy * f;
                    if self.bottom >= floor {
                        self.bottom = floor;
                        crystal.landed = true;
                        crystal.vy = 0.0;
                        out.shake = Some(CRYSTAL_IMPACT_SHAKE);
                        events.push(GameEvent::Debris {
                            material: Material::Crystal,
                            x: center_x,
                            y: floor,
                        });
                        events.push(GameEvent::Sound(SoundCue::CrystalImpact));
                    }
                }
            }
        }

        if self.is_off_screen() {
            self.dead = true;
        }
        out
    }

    /// Emit destruction sounds/loops and describe the debris to spawn
    pub fn on_destroy(&mut self, events: &mut Vec<GameEvent>) -> DestroyInfo {
        self.dead = true;
        match self.kind {
            ObstacleKind::Ice(_) => events.push(GameEvent::Sound(SoundCue::IceBreak)),
            ObstacleKind::Satellite(ref sat) => {
                if !sat.impacted {
                    events.push(GameEvent::LoopStop(LoopId::SatelliteFall(self.id)));
                }
                events.push(GameEvent::Sound(SoundCue::MetalBreak));
            }
            ObstacleKind::Bug(_) => {
                events.push(GameEvent::LoopStop(LoopId::BugSpawn(self.id)));
                events.push(GameEvent::Sound(SoundCue::BugDie));
            }
            ObstacleKind::Crystal(_) => events.push(GameEvent::Sound(SoundCue::CrystalShatter)),
        }
        let r = self.rect();
        DestroyInfo {
            material: self.material(),
            x: r.center_x(),
            y: r.center_y(),
            kind: self.obstacle_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn env(terrain: &Terrain, scroll_dx: f32, in_tutorial: bool) -> ObstacleEnv<'_> {
        ObstacleEnv {
            terrain,
            scroll_dx,
            in_tutorial,
            player_x: PLAYER_SCREEN_X,
            dt: DT,
        }
    }

    #[test]
    fn test_damage_table() {
        assert_eq!(ObstacleType::Ice.damage(), 25);
        assert_eq!(ObstacleType::Satellite.damage(), 35);
        assert_eq!(ObstacleType::Bug.damage(), 20);
        assert_eq!(ObstacleType::Crystal.damage(), 30);
        assert_eq!(ObstacleType::Bug.material(), Material::BugGoo);
    }

    #[test]
    fn test_ice_erupts_once_in_range() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut ice = Obstacle::ice(1, WIDTH + 100.0, &terrain, &mut rng);
        assert_eq!(ice.rect().h, 0.0);

        // Off screen: dormant
        ice.update(&env(&terrain, 0.0, false), &mut rng, &mut events);
        assert!(matches!(&ice.kind, ObstacleKind::Ice(i) if i.state == EruptionState::Dormant));

        ice.x = PLAYER_SCREEN_X + 300.0;
        for _ in 0..60 {
            ice.update(&env(&terrain, 0.0, true), &mut rng, &mut events);
        }
        let ObstacleKind::Ice(state) = &ice.kind else {
            panic!("variant changed");
        };
        assert_eq!(state.state, EruptionState::Erupted);
        assert_eq!(ice.rect().h, ICE_SIZE.1);
        assert_eq!(ice.rect().bottom(), GROUND_Y);
    }

    #[test]
    fn test_tutorial_suppresses_scroll() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut ice = Obstacle::ice(1, 500.0, &terrain, &mut rng);
        ice.update(&env(&terrain, 6.0, true), &mut rng, &mut events);
        assert_eq!(ice.x, 500.0);
        ice.update(&env(&terrain, 6.0, false), &mut rng, &mut events);
        assert_eq!(ice.x, 494.0);
    }

    #[test]
    fn test_satellite_lands_in_fall_time() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut sat = Obstacle::satellite(9, 600.0, &terrain);
        let mut shake = None;
        let mut frames = 0;
        while frames < 200 {
            frames += 1;
            let out = sat.update(&env(&terrain, 0.0, false), &mut rng, &mut events);
            if out.shake.is_some() {
                shake = out.shake;
                break;
            }
        }
        assert_eq!(shake, Some(SATELLITE_IMPACT_SHAKE));
        let secs = frames as f32 * DT;
        assert!((secs - SATELLITE_FALL_SECS).abs() < 0.05, "fell in {secs}s");
        assert_eq!(sat.bottom, GROUND_Y + SATELLITE_SINK);
        assert!(sat.x < 600.0, "drifts left while falling");
        assert!(events.contains(&GameEvent::LoopStop(LoopId::SatelliteFall(9))));
        assert!(events.contains(&GameEvent::Sound(SoundCue::SatelliteImpact)));
    }

    #[test]
    fn test_bug_steers_toward_player() {
        let terrain = Terrain::new(TerrainKind::Flat);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut bug = Obstacle::bug(2, 600.0, &terrain);
        bug.update(&env(&terrain, 0.0, false), &mut rng, &mut events);
        assert_eq!(bug.x, 600.0 - BUG_SPEED);
        let mut behind = Obstacle::bug(3, 50.0, &terrain);
        behind.update(&env(&terrain, 0.0, false), &mut rng, &mut events);
        assert_eq!(behind.x, 50.0 + BUG_SPEED);
        let ObstacleKind::Bug(state) = &behind.kind else {
            panic!("variant changed");
        };
        assert!(!state.facing_left);
    }

    #[test]
    fn test_crystal_falls_to_floor_and_shakes() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut crystal = Obstacle::crystal(4, 700.0, &terrain);
        assert!(crystal.bottom < terrain.ceiling_height_at(720.0));
        let mut impacts = 0;
        for _ in 0..300 {
            if crystal
                .update(&env(&terrain, 0.0, false), &mut rng, &mut events)
                .shake
                .is_some()
            {
                impacts += 1;
            }
        }
        assert_eq!(impacts, 1);
        assert_eq!(crystal.bottom, terrain.height_at(crystal.x + CRYSTAL_SIZE.0 / 2.0));
    }

    #[test]
    fn test_off_screen_kill_margins() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let mut bug = Obstacle::bug(1, -BUG_SIZE.0 - 0.5 + 6.0, &terrain);
        bug.update(&env(&terrain, 6.0, false), &mut rng, &mut events);
        assert!(bug.dead);

        let mut crystal = Obstacle::crystal(2, -CRYSTAL_SIZE.0 - 10.0, &terrain);
        crystal.update(&env(&terrain, 0.0, false), &mut rng, &mut events);
        assert!(!crystal.dead, "crystals linger past the edge");
        crystal.update(&env(&terrain, 45.0, false), &mut rng, &mut events);
        assert!(crystal.dead);
    }

    #[test]
    fn test_bug_destroy_stops_loop() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let mut events = Vec::new();
        let mut bug = Obstacle::bug(5, 400.0, &terrain);
        let info = bug.on_destroy(&mut events);
        assert!(bug.dead);
        assert_eq!(info.material, Material::BugGoo);
        assert_eq!(
            events,
            vec![
                GameEvent::LoopStop(LoopId::BugSpawn(5)),
                GameEvent::Sound(SoundCue::BugDie)
            ]
        );
    }
}
