//! Per-attempt world: everything rebuilt when a level (re)starts

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::announcer::Announcer;
use super::beacon::Beacon;
use super::camera::Camera;
use super::event::ObstacleId;
use super::gate::{Portal, Stairs};
use super::hazard::{Boulder, Escalation};
use super::laser::Laser;
use super::obstacle::Obstacle;
use super::ramp::Ramp;
use super::rider::Rider;
use super::spawn::{SpawnMode, SpawnScheduler};
use super::terrain::{Terrain, TerrainKind};
use super::timer::Deadline;
use crate::consts::*;
use crate::tuning::Tuning;

/// Which run the world was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Tutorial,
    /// Slope with checkpoints, avalanche and portal
    Level1,
    /// Cave with bugs, crystals, boulder and stairs
    Level2,
}

impl Stage {
    pub fn terrain_kind(self) -> TerrainKind {
        match self {
            Stage::Tutorial => TerrainKind::Flat,
            Stage::Level1 => TerrainKind::Slope,
            Stage::Level2 => TerrainKind::Cave,
        }
    }

    pub fn is_cave(self) -> bool {
        self == Stage::Level2
    }

    fn spawn_mode(self) -> SpawnMode {
        match self {
            Stage::Level2 => SpawnMode::Cave,
            _ => SpawnMode::Slope,
        }
    }
}

/// Tutorial objectives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialProgress {
    pub jump_done: bool,
    pub shoot_done: bool,
    pub complete: Deadline,
}

impl TutorialProgress {
    pub fn objectives_met(&self) -> bool {
        self.jump_done && self.shoot_done
    }
}

/// Timed announcer lines in the cave
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaveScript {
    pub bug_warning_done: bool,
    pub halfway_done: bool,
    pub stairs_ahead_done: bool,
}

pub const TUTORIAL_OBSTACLE_X: f32 = PLAYER_SCREEN_X + WIDTH / 2.5;
pub const TUTORIAL_COMPLETE_DELAY_MS: f64 = 1500.0;
pub const PORTAL_OUTCOME_DELAY_MS: f64 = 1500.0;
pub const BOULDER_DEATH_DELAY_MS: f64 = 2000.0;
pub const WIN_FLASH_MS: f64 = 2500.0;
pub const CAVE_BUG_WARNING_MS: f64 = 3000.0;
pub const CAVE_HALFWAY_MS: f64 = 20_000.0;
pub const CAVE_STAIRS_AHEAD_MS: f64 = 38_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub stage: Stage,
    /// Simulation clock; only advances while the world updates
    pub time_ms: f64,
    pub terrain: Terrain,
    pub rider: Rider,
    pub ramp: Option<Ramp>,
    pub final_ramp_spawned: bool,
    pub obstacles: Vec<Obstacle>,
    pub lasers: Vec<Laser>,
    pub beacons: Vec<Beacon>,
    pub portal: Option<Portal>,
    pub stairs: Option<Stairs>,
    pub boulder: Option<Boulder>,
    pub camera: Camera,
    pub announcer: Announcer,
    pub spawner: SpawnScheduler,
    pub escalation: Escalation,

    /// Next entry of the checkpoint table to spawn
    pub checkpoint_idx: usize,
    pub collected_checkpoints: usize,
    pub portal_message_pending: bool,
    pub portal_spawn_pending: bool,
    pub portal_spawned: bool,
    /// Armed when the rider enters the portal
    pub portal_outcome: Deadline,

    pub slowdown: Deadline,
    pub last_shot_ms: Option<f64>,
    /// Health hit zero; the failure screen waits for the death animation
    pub waiting_for_death_anim: bool,
    pub boulder_death: Deadline,
    pub stairs_visible: bool,
    pub win_sequence: Deadline,

    pub tutorial: TutorialProgress,
    pub cave_script: CaveScript,
    next_obstacle_id: ObstacleId,
}

impl World {
    pub fn new(stage: Stage, tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let terrain = Terrain::new(stage.terrain_kind());
        let rider = Rider::new(&terrain);
        let camera = Camera::new(rider.y);
        let spawner = SpawnScheduler::new(stage.spawn_mode(), 0.0, tuning, rng);
        let boulder = stage.is_cave().then(|| Boulder::new(&terrain));
        // The cave has no checkpoints
        let checkpoint_idx = if stage == Stage::Level1 {
            0
        } else {
            tuning.checkpoint_count()
        };
        let mut world = Self {
            stage,
            time_ms: 0.0,
            terrain,
            rider,
            ramp: None,
            final_ramp_spawned: false,
            obstacles: Vec::new(),
            lasers: Vec::new(),
            beacons: Vec::new(),
            portal: None,
            stairs: None,
            boulder,
            camera,
            announcer: Announcer::default(),
            spawner,
            escalation: Escalation::default(),
            checkpoint_idx,
            collected_checkpoints: 0,
            portal_message_pending: false,
            portal_spawn_pending: false,
            portal_spawned: false,
            portal_outcome: Deadline::default(),
            slowdown: Deadline::default(),
            last_shot_ms: None,
            waiting_for_death_anim: false,
            boulder_death: Deadline::default(),
            stairs_visible: false,
            win_sequence: Deadline::default(),
            tutorial: TutorialProgress::default(),
            cave_script: CaveScript::default(),
            next_obstacle_id: 1,
        };
        if stage == Stage::Tutorial {
            let id = world.next_obstacle_id();
            let ice = Obstacle::ice(id, TUTORIAL_OBSTACLE_X, &world.terrain, rng);
            world.obstacles.push(ice);
        }
        world
    }

    pub fn next_obstacle_id(&mut self) -> ObstacleId {
        let id = self.next_obstacle_id;
        self.next_obstacle_id += 1;
        id
    }

    pub fn is_slowed(&self) -> bool {
        self.slowdown.is_armed() && !self.slowdown.expired(self.time_ms)
    }

    pub fn all_checkpoints_collected(&self, tuning: &Tuning) -> bool {
        tuning.checkpoint_count() > 0 && self.collected_checkpoints >= tuning.checkpoint_count()
    }

    /// A terminal sequence (death wait, boulder kill, win flash, portal) is running
    pub fn sequence_active(&self) -> bool {
        self.waiting_for_death_anim
            || self.boulder_death.is_armed()
            || self.win_sequence.is_armed()
            || self.portal_outcome.is_armed()
    }

    /// Jump, shoot and pause are refused while a sequence runs or the stairs are up
    pub fn input_locked(&self) -> bool {
        self.sequence_active() || self.stairs_visible
    }

    /// Muzzle position for new lasers
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(
            self.rider.x + PLAYER_WIDTH / 2.0,
            self.rider.y - PLAYER_HEIGHT / 2.0,
        )
    }
}
