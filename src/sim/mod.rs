//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (re-seeded per attempt)
//! - Stable iteration order (spawn order)
//! - No rendering, audio or video dependencies; side effects leave as `GameEvent`s

pub mod announcer;
pub mod beacon;
pub mod camera;
pub mod event;
pub mod gate;
pub mod geom;
pub mod hazard;
pub mod laser;
pub mod obstacle;
pub mod playing;
pub mod ramp;
pub mod rider;
pub mod spawn;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod timer;
pub mod world;

pub use event::{GameEvent, LoopId, Material, MusicTrack, ObstacleId, SoundCue};
pub use geom::Rect;
pub use obstacle::{Obstacle, ObstacleKind, ObstacleType};
pub use playing::{Actions, WorldOutcome, update_world};
pub use state::{Cutscene, GameContext, GameState};
pub use terrain::{Terrain, TerrainKind};
pub use tick::{Key, TickInput, tick};
pub use world::{Stage, World};
