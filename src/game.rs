//! Frame-loop shell
//!
//! Owns the simulation context and its collaborators. One call to `frame`
//! is one update pass: poll the cutscene player, tick the simulation, then
//! hand every emitted event to audio and video.

use crate::audio::{AudioBackend, AudioManager};
use crate::render::{Surface, draw_frame};
use crate::settings::Settings;
use crate::sim::{GameContext, GameEvent, GameState, Key, TickInput, tick};
use crate::tuning::Tuning;
use crate::video::{CutscenePlayer, VideoBackend, VideoFrame};

pub struct Game<A: AudioBackend, V: VideoBackend> {
    pub ctx: GameContext,
    pub audio: AudioManager<A>,
    pub video: CutscenePlayer<V>,
    video_frame: Option<VideoFrame>,
}

impl<A: AudioBackend, V: VideoBackend> Game<A, V> {
    pub fn new(
        seed: u64,
        tuning: Tuning,
        settings: Settings,
        audio: Option<A>,
        video: Option<V>,
    ) -> Self {
        let audio = AudioManager::new(audio, &settings);
        let mut game = Self {
            ctx: GameContext::new(seed, tuning, settings),
            audio,
            video: CutscenePlayer::new(video),
            video_frame: None,
        };
        game.dispatch();
        game
    }

    pub fn state(&self) -> GameState {
        self.ctx.state
    }

    pub fn quit_requested(&self) -> bool {
        self.ctx.quit_requested
    }

    /// Run one frame; returns the events it produced
    pub fn frame(&mut self, keys: &[Key], dt: f32) -> Vec<GameEvent> {
        self.video_frame = match self.ctx.cutscene {
            Some(run) => self.video.frame_at((self.ctx.now_ms - run.started_ms) / 1000.0),
            None => None,
        };
        let input = TickInput {
            keys: keys.to_vec(),
            cutscene_finished: self.video.is_finished(),
        };
        tick(&mut self.ctx, &input, dt);
        self.dispatch()
    }

    fn dispatch(&mut self) -> Vec<GameEvent> {
        let events = self.ctx.drain_events();
        for event in &events {
            self.audio.handle(event);
            self.video.handle(event);
        }
        events
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        draw_frame(&self.ctx, self.video_frame.as_ref(), surface);
    }
}
