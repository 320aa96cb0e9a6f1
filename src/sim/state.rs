//! Game state machine types and the process-wide game context
//!
//! `GameContext` replaces ambient globals: everything the controller reads
//! or writes per frame lives here and is handed to `tick`.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::{GameEvent, MusicTrack};
use super::hazard::{
    AVALANCHE_START_LEVEL1, AVALANCHE_START_LEVEL2, AVALANCHE_START_TUTORIAL, Avalanche,
};
use super::world::{Stage, World};
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Menu,
    /// Opening video
    Prologue,
    Tutorial,
    Playing,
    Paused,
    Failed,
    /// Video between level 1 and level 2
    MidCutscene,
    /// Ending video
    WinCutscene,
    Credits,
    Controls,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cutscene {
    Prologue,
    Mid,
    Win,
}

impl Cutscene {
    /// Asset name handed to the video collaborator
    pub fn asset(self) -> &'static str {
        match self {
            Cutscene::Prologue => "Prologue.mp4",
            Cutscene::Mid => "MiddleCutscene.mp4",
            Cutscene::Win => "EndCutscene.mp4",
        }
    }
}

pub const MAIN_MENU_ITEMS: [&str; 5] = [
    "Start Level 1",
    "Start Level 2",
    "Controls",
    "Settings",
    "Quit",
];

pub const PAUSE_MENU_ITEMS: [&str; 5] = [
    "Resume",
    "Restart Level",
    "Controls",
    "Settings",
    "Quit to Main Menu",
];

pub const SETTINGS_ITEMS: [&str; 3] = ["Music Volume", "Screen Shake", "Reduced Motion"];

pub const CREDITS_LINES: [&str; 12] = [
    "AVALANCHE RIDER",
    "",
    "Design & Programming",
    "The Rider Team",
    "",
    "Art",
    "Snowfield Studio",
    "",
    "Music & Sound",
    "Cave Echo Audio",
    "",
    "Thanks for playing!",
];

/// Prologue ends on its own after this long
pub const PROLOGUE_MAX_MS: f64 = 44_200.0;
pub const CREDITS_SCROLL_SPEED: f32 = 40.0;
pub const CREDITS_LINE_HEIGHT: f32 = 35.0;
pub const PORTAL_MUSIC_FADE_MS: u32 = 1000;

/// RNG state wrapper for reproducible attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Bumped on every attempt so retries differ but stay reproducible
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// A running cutscene and when it started
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutsceneRun {
    pub kind: Cutscene,
    pub started_ms: f64,
}

/// Complete game context
#[derive(Debug, Clone)]
pub struct GameContext {
    pub state: GameState,
    /// State to return to from Controls/Settings
    pub return_state: GameState,
    /// Wall clock (ms) since start; advances in every state
    pub now_ms: f64,
    pub rng_state: RngState,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub settings: Settings,
    pub player_health: i32,
    /// Persists across attempts; reset per attempt
    pub avalanche: Avalanche,
    pub world: World,
    pub menu_selection: usize,
    pub pause_selection: usize,
    pub settings_selection: usize,
    /// Screen y of the first credits line
    pub credits_y: f32,
    pub cutscene: Option<CutsceneRun>,
    pub quit_requested: bool,
    /// Drained by the shell every frame
    pub events: Vec<GameEvent>,
}

impl GameContext {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let world = World::new(Stage::Level1, &tuning, &mut rng);
        let avalanche = Avalanche::new(tuning.avalanche_speed);
        Self {
            state: GameState::Menu,
            return_state: GameState::Menu,
            now_ms: 0.0,
            rng_state,
            rng,
            tuning,
            settings,
            player_health: MAX_PLAYER_HEALTH,
            avalanche,
            world,
            menu_selection: 0,
            pause_selection: 0,
            settings_selection: 0,
            credits_y: HEIGHT,
            cutscene: None,
            quit_requested: false,
            events: vec![GameEvent::PlayMusic(MusicTrack::Menu)],
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Switch state, logging and announcing the transition
    pub fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::info!("State {:?} -> {:?}", from, to);
        self.state = to;
        self.emit(GameEvent::StateChanged { from, to });
    }

    /// Fresh world for `stage`, full health, avalanche repositioned
    pub fn start_attempt(&mut self, stage: Stage) {
        self.rng_state.stream += 1;
        self.rng = self.rng_state.to_rng();
        self.world = World::new(stage, &self.tuning, &mut self.rng);
        self.player_health = MAX_PLAYER_HEALTH;
        self.avalanche.speed = self.tuning.avalanche_speed;
        self.avalanche.reset(match stage {
            Stage::Tutorial => AVALANCHE_START_TUTORIAL,
            Stage::Level1 => AVALANCHE_START_LEVEL1,
            Stage::Level2 => AVALANCHE_START_LEVEL2,
        });
        self.emit(GameEvent::StopAllLoops);
        match stage {
            Stage::Tutorial => {
                self.emit(GameEvent::PlayMusic(MusicTrack::Level1));
                self.set_state(GameState::Tutorial);
            }
            Stage::Level1 => {
                self.emit(GameEvent::PlayMusic(MusicTrack::Level1));
                self.set_state(GameState::Playing);
            }
            Stage::Level2 => {
                self.emit(GameEvent::PlayMusic(MusicTrack::Level2));
                self.set_state(GameState::Playing);
            }
        }
        log::info!("Attempt started: {:?}", stage);
    }

    pub fn start_cutscene(&mut self, kind: Cutscene, state: GameState) {
        self.emit(GameEvent::StopAllLoops);
        self.emit(GameEvent::StopMusic);
        self.cutscene = Some(CutsceneRun {
            kind,
            started_ms: self.now_ms,
        });
        self.emit(GameEvent::CutsceneStarted(kind));
        self.set_state(state);
    }

    /// Close the running cutscene, if any
    pub fn end_cutscene(&mut self) {
        if let Some(run) = self.cutscene.take() {
            self.emit(GameEvent::CutsceneEnded(run.kind));
        }
    }

    pub fn go_to_menu(&mut self) {
        self.emit(GameEvent::StopAllLoops);
        self.emit(GameEvent::PlayMusic(MusicTrack::Menu));
        self.menu_selection = 0;
        self.set_state(GameState::Menu);
    }

    pub fn go_to_credits(&mut self) {
        self.credits_y = HEIGHT;
        self.emit(GameEvent::PlayMusic(MusicTrack::Credits));
        self.set_state(GameState::Credits);
    }

    /// Enter Controls/Settings, remembering where to return
    pub fn open_overlay(&mut self, overlay: GameState) {
        self.return_state = self.state;
        self.set_state(overlay);
    }
}
