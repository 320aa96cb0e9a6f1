//! Avalanche Rider entry point
//!
//! Native builds run a scripted headless session against the silent audio
//! and video backends: start level 1, play the tutorial, ride until the run
//! ends (or a frame cap), then quit from the main menu.

#[cfg(not(target_arch = "wasm32"))]
use avalanche_rider::{
    Game, Settings, Tuning,
    audio::SilentAudio,
    render::DrawList,
    sim::{GameEvent, GameState, Key},
    video::NoVideo,
};

#[cfg(not(target_arch = "wasm32"))]
const SEED: u64 = 0x5EED_CAFE;
#[cfg(not(target_arch = "wasm32"))]
const DT: f32 = 1.0 / 60.0;
/// Ten minutes of simulated play
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 600;

/// Keys the autopilot presses this frame
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: GameState, frame: u64, played: bool) -> Vec<Key> {
    match state {
        GameState::Menu if played => vec![Key::Up, Key::Enter],
        GameState::Menu => vec![Key::Enter],
        GameState::Tutorial if frame % 60 == 0 => vec![Key::Space],
        GameState::Tutorial if frame % 60 == 30 => vec![Key::F],
        GameState::Playing => {
            let mut keys = Vec::new();
            if frame % 45 == 0 {
                keys.push(Key::Space);
            }
            if frame % 20 == 0 {
                keys.push(Key::F);
            }
            keys
        }
        GameState::Failed => vec![Key::Q],
        GameState::Paused | GameState::Credits | GameState::Controls | GameState::Settings => {
            vec![Key::Escape]
        }
        _ => Vec::new(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Avalanche Rider (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load(&path).unwrap_or_else(|err| {
            log::warn!("Could not load tuning from {path}: {err}; using defaults");
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let mut game: Game<SilentAudio, NoVideo> = Game::new(
        SEED,
        tuning,
        Settings::default(),
        Some(SilentAudio::default()),
        Some(NoVideo),
    );
    let mut surface = DrawList::default();
    let mut played = false;

    for frame in 0..MAX_FRAMES {
        let keys = autopilot(game.state(), frame, played);
        for event in game.frame(&keys, DT) {
            if let GameEvent::StateChanged { to, .. } = event
                && to != GameState::Menu
            {
                played = true;
            }
        }
        surface.clear();
        game.draw(&mut surface);
        if game.quit_requested() {
            break;
        }
    }

    let world = &game.ctx.world;
    log::info!(
        "Session over in {:?}: distance {:.1} chunks, {} checkpoints, health {}",
        game.state(),
        world.camera.world_distance,
        world.collected_checkpoints,
        game.ctx.player_health
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser shell; the library is the deliverable on wasm
}
