//! Events emitted by the simulation for the shell's collaborators
//!
//! The simulation never touches audio channels or video handles directly.
//! It pushes `GameEvent`s into `GameContext::events`; the shell drains them
//! once per frame and forwards them to the audio/video managers.

use serde::{Deserialize, Serialize};

use super::state::{Cutscene, GameState};

/// Stable identifier for a spawned obstacle
pub type ObstacleId = u32;

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Shoot,
    Land,
    Hit,
    IceBreak,
    MetalBreak,
    SatelliteImpact,
    BugSpawn,
    BugDie,
    CrystalImpact,
    CrystalShatter,
    Checkpoint,
    BeaconIgnite,
    PortalEnter,
    BoulderCrush,
    Announcer,
    MenuMove,
    MenuSelect,
}

/// Long-running sounds that need start/stop bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopId {
    AvalancheRumble,
    BoulderRumble,
    SatelliteFall(ObstacleId),
    BugSpawn(ObstacleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Menu,
    Level1,
    Level2,
    Credits,
}

/// Debris material, selects the particle palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Ice,
    Machinery,
    BugGoo,
    Crystal,
    SnowPuff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    LoopStart(LoopId),
    LoopStop(LoopId),
    /// Pause every active loop (game paused)
    PauseLoops,
    ResumeLoops,
    StopAllLoops,
    PlayMusic(MusicTrack),
    StopMusic,
    FadeOutMusic { ms: u32 },
    MusicVolume(f32),
    CutsceneStarted(Cutscene),
    CutsceneEnded(Cutscene),
    StateChanged { from: GameState, to: GameState },
    Debris { material: Material, x: f32, y: f32 },
    Explosion { x: f32, y: f32 },
    QuitRequested,
}
