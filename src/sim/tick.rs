//! Per-frame controller
//!
//! Dispatches input to the active state, runs the world update while
//! Playing/Tutorial and applies the resulting transitions.

use serde::{Deserialize, Serialize};

use super::event::{GameEvent, SoundCue};
use super::playing::{Actions, WorldOutcome, update_world};
use super::state::{
    CREDITS_LINE_HEIGHT, CREDITS_LINES, CREDITS_SCROLL_SPEED, Cutscene, GameContext, GameState,
    MAIN_MENU_ITEMS, PAUSE_MENU_ITEMS, PROLOGUE_MAX_MS, SETTINGS_ITEMS,
};
use super::world::Stage;
use crate::consts::*;
use crate::settings::VOLUME_STEP;

/// The fixed key set the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    F,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Enter,
    Q,
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keys pressed since the previous frame, in order
    pub keys: Vec<Key>,
    /// The video collaborator finished (or failed to open) the running cutscene
    pub cutscene_finished: bool,
}

impl TickInput {
    pub fn pressed(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn any(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.pressed(*k))
    }
}

/// Advance the game by one frame
pub fn tick(ctx: &mut GameContext, input: &TickInput, dt: f32) {
    ctx.now_ms += dt as f64 * 1000.0;

    match ctx.state {
        GameState::Menu => update_menu(ctx, input),
        GameState::Prologue | GameState::MidCutscene | GameState::WinCutscene => {
            update_cutscene(ctx, input)
        }
        GameState::Tutorial | GameState::Playing => update_live(ctx, input, dt),
        GameState::Paused => update_paused(ctx, input),
        GameState::Failed => update_failed(ctx, input),
        GameState::Credits => update_credits(ctx, input, dt),
        GameState::Controls => {
            if input.any(&[Key::Enter, Key::Escape]) {
                let back = ctx.return_state;
                ctx.set_state(back);
            }
        }
        GameState::Settings => update_settings(ctx, input),
    }
}

/// Up/Down with wrap-around; returns true if the cursor moved
fn navigate(selection: &mut usize, len: usize, input: &TickInput) -> bool {
    let mut moved = false;
    for key in &input.keys {
        match key {
            Key::Up => *selection = (*selection + len - 1) % len,
            Key::Down => *selection = (*selection + 1) % len,
            _ => continue,
        }
        moved = true;
    }
    moved
}

fn update_menu(ctx: &mut GameContext, input: &TickInput) {
    if navigate(&mut ctx.menu_selection, MAIN_MENU_ITEMS.len(), input) {
        ctx.emit(GameEvent::Sound(SoundCue::MenuMove));
    }
    if !input.pressed(Key::Enter) {
        return;
    }
    ctx.emit(GameEvent::Sound(SoundCue::MenuSelect));
    log::debug!("Menu select: {}", MAIN_MENU_ITEMS[ctx.menu_selection]);
    match ctx.menu_selection {
        0 => ctx.start_cutscene(Cutscene::Prologue, GameState::Prologue),
        1 => ctx.start_attempt(Stage::Level2),
        2 => ctx.open_overlay(GameState::Controls),
        3 => ctx.open_overlay(GameState::Settings),
        _ => {
            log::info!("Quit requested");
            ctx.quit_requested = true;
            ctx.emit(GameEvent::QuitRequested);
        }
    }
}

fn update_cutscene(ctx: &mut GameContext, input: &TickInput) {
    let Some(run) = ctx.cutscene else {
        // Nothing playing; behave as if it just finished
        finish_cutscene(ctx);
        return;
    };
    let timed_out =
        run.kind == Cutscene::Prologue && ctx.now_ms - run.started_ms >= PROLOGUE_MAX_MS;
    let skipped = input.any(&[Key::Enter, Key::Space, Key::Escape]);
    if input.cutscene_finished || timed_out || skipped {
        log::info!(
            "Cutscene {:?} over (finished: {}, timed out: {}, skipped: {})",
            run.kind,
            input.cutscene_finished,
            timed_out,
            skipped
        );
        finish_cutscene(ctx);
    }
}

fn finish_cutscene(ctx: &mut GameContext) {
    ctx.end_cutscene();
    match ctx.state {
        GameState::Prologue => ctx.start_attempt(Stage::Tutorial),
        GameState::MidCutscene => ctx.start_attempt(Stage::Level2),
        _ => ctx.go_to_credits(),
    }
}

fn update_live(ctx: &mut GameContext, input: &TickInput, dt: f32) {
    if input.pressed(Key::Escape) && !ctx.world.input_locked() {
        ctx.pause_selection = 0;
        ctx.emit(GameEvent::PauseLoops);
        ctx.set_state(GameState::Paused);
        return;
    }

    let actions = Actions {
        jump: input.pressed(Key::Space),
        shoot: input.pressed(Key::F),
    };
    match update_world(ctx, actions, dt) {
        WorldOutcome::Continue => {}
        WorldOutcome::Failed => {
            ctx.emit(GameEvent::StopAllLoops);
            ctx.set_state(GameState::Failed);
        }
        WorldOutcome::MidCutscene => ctx.start_cutscene(Cutscene::Mid, GameState::MidCutscene),
        WorldOutcome::WinCutscene => ctx.start_cutscene(Cutscene::Win, GameState::WinCutscene),
        WorldOutcome::TutorialComplete => ctx.start_attempt(Stage::Level1),
    }
}

fn resume(ctx: &mut GameContext) {
    ctx.emit(GameEvent::ResumeLoops);
    let state = if ctx.world.stage == Stage::Tutorial {
        GameState::Tutorial
    } else {
        GameState::Playing
    };
    ctx.set_state(state);
}

fn update_paused(ctx: &mut GameContext, input: &TickInput) {
    if input.pressed(Key::Escape) {
        resume(ctx);
        return;
    }
    if navigate(&mut ctx.pause_selection, PAUSE_MENU_ITEMS.len(), input) {
        ctx.emit(GameEvent::Sound(SoundCue::MenuMove));
    }
    if !input.pressed(Key::Enter) {
        return;
    }
    ctx.emit(GameEvent::Sound(SoundCue::MenuSelect));
    match ctx.pause_selection {
        0 => resume(ctx),
        1 => {
            let stage = ctx.world.stage;
            ctx.start_attempt(stage);
        }
        2 => ctx.open_overlay(GameState::Controls),
        3 => ctx.open_overlay(GameState::Settings),
        _ => ctx.go_to_menu(),
    }
}

fn update_failed(ctx: &mut GameContext, input: &TickInput) {
    if input.pressed(Key::Enter) {
        let stage = ctx.world.stage;
        log::info!("Retrying {:?}", stage);
        ctx.start_attempt(stage);
    } else if input.pressed(Key::Q) {
        ctx.go_to_menu();
    }
}

fn update_credits(ctx: &mut GameContext, input: &TickInput, dt: f32) {
    if input.any(&[Key::Enter, Key::Escape]) {
        ctx.go_to_menu();
        return;
    }
    ctx.credits_y -= CREDITS_SCROLL_SPEED * dt;
    let block_height = CREDITS_LINES.len() as f32 * CREDITS_LINE_HEIGHT;
    if ctx.credits_y + block_height < 0.0 {
        ctx.credits_y = HEIGHT;
    }
}

fn update_settings(ctx: &mut GameContext, input: &TickInput) {
    if input.any(&[Key::Enter, Key::Escape]) {
        let back = ctx.return_state;
        ctx.set_state(back);
        return;
    }
    if navigate(&mut ctx.settings_selection, SETTINGS_ITEMS.len(), input) {
        ctx.emit(GameEvent::Sound(SoundCue::MenuMove));
    }
    for key in &input.keys {
        let delta = match key {
            Key::Left => -VOLUME_STEP,
            Key::Right => VOLUME_STEP,
            _ => continue,
        };
        match ctx.settings_selection {
            0 => {
                let volume = ctx.settings.adjust_music_volume(delta);
                ctx.emit(GameEvent::MusicVolume(volume));
            }
            1 => ctx.settings.screen_shake = !ctx.settings.screen_shake,
            _ => ctx.settings.reduced_motion = !ctx.settings.reduced_motion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::event::MusicTrack;
    use crate::sim::world::{BOULDER_DEATH_DELAY_MS, WIN_FLASH_MS};
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    fn press(keys: &[Key]) -> TickInput {
        TickInput {
            keys: keys.to_vec(),
            ..Default::default()
        }
    }

    fn new_ctx() -> GameContext {
        let mut ctx = GameContext::new(12345, Tuning::default(), Settings::default());
        ctx.drain_events();
        ctx
    }

    #[test]
    fn test_menu_wraps() {
        let mut ctx = new_ctx();
        tick(&mut ctx, &press(&[Key::Up]), DT);
        assert_eq!(ctx.menu_selection, MAIN_MENU_ITEMS.len() - 1);
        tick(&mut ctx, &press(&[Key::Down]), DT);
        assert_eq!(ctx.menu_selection, 0);
        assert!(ctx.events.contains(&GameEvent::Sound(SoundCue::MenuMove)));
    }

    #[test]
    fn test_start_level1_runs_prologue_then_tutorial() {
        let mut ctx = new_ctx();
        tick(&mut ctx, &press(&[Key::Enter]), DT);
        assert_eq!(ctx.state, GameState::Prologue);
        assert!(ctx.events.contains(&GameEvent::CutsceneStarted(Cutscene::Prologue)));

        tick(&mut ctx, &TickInput::default(), DT);
        assert_eq!(ctx.state, GameState::Prologue);
        tick(&mut ctx, &press(&[Key::Space]), DT);
        assert_eq!(ctx.state, GameState::Tutorial);
        assert_eq!(ctx.world.stage, Stage::Tutorial);
        assert!(ctx.cutscene.is_none());
    }

    #[test]
    fn test_prologue_times_out() {
        let mut ctx = new_ctx();
        tick(&mut ctx, &press(&[Key::Enter]), DT);
        let frames = (PROLOGUE_MAX_MS / 1000.0 * 60.0) as usize + 2;
        for _ in 0..frames {
            tick(&mut ctx, &TickInput::default(), DT);
        }
        assert_eq!(ctx.state, GameState::Tutorial);
    }

    #[test]
    fn test_missing_video_skips_cutscene() {
        let mut ctx = new_ctx();
        tick(&mut ctx, &press(&[Key::Enter]), DT);
        let input = TickInput {
            cutscene_finished: true,
            ..Default::default()
        };
        tick(&mut ctx, &input, DT);
        assert_eq!(ctx.state, GameState::Tutorial);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut ctx = new_ctx();
        ctx.start_attempt(Stage::Level1);
        tick(&mut ctx, &TickInput::default(), DT);
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Paused);
        assert!(ctx.events.contains(&GameEvent::PauseLoops));

        let time = ctx.world.time_ms;
        let distance = ctx.world.camera.world_distance;
        for _ in 0..30 {
            tick(&mut ctx, &TickInput::default(), DT);
        }
        assert_eq!(ctx.world.time_ms, time);
        assert_eq!(ctx.world.camera.world_distance, distance);

        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Playing);
        assert!(ctx.events.contains(&GameEvent::ResumeLoops));
    }

    #[test]
    fn test_escape_ignored_during_sequences() {
        let mut ctx = new_ctx();
        ctx.start_attempt(Stage::Level2);
        ctx.world.spawner.next_delay_ms = f64::INFINITY;
        let now = ctx.world.time_ms;
        ctx.world.win_sequence.arm(now, WIN_FLASH_MS);
        ctx.drain_events();
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Playing);
        assert!(!ctx.events.contains(&GameEvent::PauseLoops));

        ctx.start_attempt(Stage::Level2);
        ctx.world.stairs_visible = true;
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Playing);

        ctx.start_attempt(Stage::Level1);
        ctx.world.spawner.next_delay_ms = f64::INFINITY;
        let now = ctx.world.time_ms;
        ctx.world.boulder_death.arm(now, BOULDER_DEATH_DELAY_MS);
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Playing);
    }

    #[test]
    fn test_pause_menu_quit_to_menu() {
        let mut ctx = new_ctx();
        ctx.start_attempt(Stage::Level2);
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        tick(&mut ctx, &press(&[Key::Up, Key::Enter]), DT);
        assert_eq!(ctx.state, GameState::Menu);
        assert!(ctx.events.contains(&GameEvent::PlayMusic(MusicTrack::Menu)));
    }

    #[test]
    fn test_settings_from_pause_returns_to_pause() {
        let mut ctx = new_ctx();
        ctx.start_attempt(Stage::Level1);
        tick(&mut ctx, &press(&[Key::Escape]), DT);
        tick(&mut ctx, &press(&[Key::Down, Key::Down, Key::Down, Key::Enter]), DT);
        assert_eq!(ctx.state, GameState::Settings);

        ctx.drain_events();
        tick(&mut ctx, &press(&[Key::Left]), DT);
        assert_eq!(ctx.settings.music_volume, 0.4);
        assert!(ctx.events.contains(&GameEvent::MusicVolume(0.4)));

        tick(&mut ctx, &press(&[Key::Down, Key::Right]), DT);
        assert!(!ctx.settings.screen_shake);

        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Paused);
    }

    #[test]
    fn test_failed_retry_and_quit() {
        let mut ctx = new_ctx();
        ctx.start_attempt(Stage::Level1);
        ctx.avalanche.offset = ctx.world.rider.x - 0.01;
        tick(&mut ctx, &TickInput::default(), DT);
        assert_eq!(ctx.state, GameState::Failed);

        tick(&mut ctx, &press(&[Key::Enter]), DT);
        assert_eq!(ctx.state, GameState::Playing);
        assert_eq!(ctx.world.stage, Stage::Level1);
        assert_eq!(ctx.player_health, MAX_PLAYER_HEALTH);
        assert!(ctx.avalanche.offset < 0.0);

        ctx.set_state(GameState::Failed);
        tick(&mut ctx, &press(&[Key::Q]), DT);
        assert_eq!(ctx.state, GameState::Menu);
    }

    #[test]
    fn test_mid_cutscene_leads_to_level2() {
        let mut ctx = new_ctx();
        ctx.start_cutscene(Cutscene::Mid, GameState::MidCutscene);
        tick(&mut ctx, &press(&[Key::Enter]), DT);
        assert_eq!(ctx.state, GameState::Playing);
        assert_eq!(ctx.world.stage, Stage::Level2);
        assert!(ctx.events.contains(&GameEvent::PlayMusic(MusicTrack::Level2)));
    }

    #[test]
    fn test_credits_scroll_and_exit() {
        let mut ctx = new_ctx();
        ctx.start_cutscene(Cutscene::Win, GameState::WinCutscene);
        let done = TickInput {
            cutscene_finished: true,
            ..Default::default()
        };
        tick(&mut ctx, &done, DT);
        assert_eq!(ctx.state, GameState::Credits);
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.credits_y, HEIGHT - CREDITS_SCROLL_SPEED);

        ctx.credits_y = -(CREDITS_LINES.len() as f32 * CREDITS_LINE_HEIGHT) + 1.0;
        tick(&mut ctx, &TickInput::default(), 0.1);
        assert_eq!(ctx.credits_y, HEIGHT);

        tick(&mut ctx, &press(&[Key::Escape]), DT);
        assert_eq!(ctx.state, GameState::Menu);
    }

    #[test]
    fn test_quit_from_menu() {
        let mut ctx = new_ctx();
        tick(&mut ctx, &press(&[Key::Up, Key::Enter]), DT);
        assert!(ctx.quit_requested);
        assert!(ctx.events.contains(&GameEvent::QuitRequested));
    }

    #[test]
    fn test_determinism() {
        let mut a = new_ctx();
        let mut b = new_ctx();
        a.start_attempt(Stage::Level1);
        b.start_attempt(Stage::Level1);
        let inputs = [
            press(&[Key::Space]),
            TickInput::default(),
            press(&[Key::F]),
            press(&[Key::Space, Key::F]),
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }
        assert_eq!(a.state, b.state);
        assert_eq!(a.player_health, b.player_health);
        assert_eq!(a.world.obstacles.len(), b.world.obstacles.len());
        assert_eq!(a.world.camera.world_distance, b.world.camera.world_distance);
        assert_eq!(a.events, b.events);
    }
}
