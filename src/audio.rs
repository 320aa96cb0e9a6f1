//! Audio collaborator seam
//!
//! The simulation only emits `GameEvent`s. `AudioManager` turns them into
//! backend calls and owns the loop bookkeeping (which looping sound is on
//! which channel). A missing backend or an exhausted channel pool is never
//! fatal: the effect is skipped and logged.

use std::collections::HashMap;

use crate::settings::Settings;
use crate::sim::{GameEvent, LoopId, MusicTrack, SoundCue};

/// Opaque channel id handed out by a backend
pub type ChannelHandle = u32;

/// What the mixer must provide
pub trait AudioBackend {
    /// Start a sound; `None` when no channel is free
    fn play(&mut self, asset: &str, volume: f32, looping: bool) -> Option<ChannelHandle>;
    fn stop(&mut self, channel: ChannelHandle);
    fn pause(&mut self, channel: ChannelHandle);
    fn resume(&mut self, channel: ChannelHandle);
    fn play_music(&mut self, asset: &str, volume: f32);
    fn stop_music(&mut self);
    fn fade_out_music(&mut self, ms: u32);
    fn set_music_volume(&mut self, volume: f32);
}

/// Backend that accepts everything and plays nothing
#[derive(Debug, Default)]
pub struct SilentAudio {
    next_channel: ChannelHandle,
}

impl AudioBackend for SilentAudio {
    fn play(&mut self, _asset: &str, _volume: f32, _looping: bool) -> Option<ChannelHandle> {
        self.next_channel = self.next_channel.wrapping_add(1);
        Some(self.next_channel)
    }
    fn stop(&mut self, _channel: ChannelHandle) {}
    fn pause(&mut self, _channel: ChannelHandle) {}
    fn resume(&mut self, _channel: ChannelHandle) {}
    fn play_music(&mut self, _asset: &str, _volume: f32) {}
    fn stop_music(&mut self) {}
    fn fade_out_music(&mut self, _ms: u32) {}
    fn set_music_volume(&mut self, _volume: f32) {}
}

pub fn sound_asset(cue: SoundCue) -> &'static str {
    match cue {
        SoundCue::Jump => "jump.wav",
        SoundCue::Shoot => "laser.wav",
        SoundCue::Land => "land.wav",
        SoundCue::Hit => "hit.wav",
        SoundCue::IceBreak => "ice_break.wav",
        SoundCue::MetalBreak => "metal_break.wav",
        SoundCue::SatelliteImpact => "satellite_impact.wav",
        SoundCue::BugSpawn => "bug_spawn.wav",
        SoundCue::BugDie => "bug_die.wav",
        SoundCue::CrystalImpact => "crystal_impact.wav",
        SoundCue::CrystalShatter => "crystal_shatter.wav",
        SoundCue::Checkpoint => "checkpoint.wav",
        SoundCue::BeaconIgnite => "beacon_ignite.wav",
        SoundCue::PortalEnter => "portal.wav",
        SoundCue::BoulderCrush => "boulder_crush.wav",
        SoundCue::Announcer => "announcer.wav",
        SoundCue::MenuMove => "menu_move.wav",
        SoundCue::MenuSelect => "menu_select.wav",
    }
}

pub fn loop_asset(id: LoopId) -> &'static str {
    match id {
        LoopId::AvalancheRumble => "avalanche_rumble.wav",
        LoopId::BoulderRumble => "boulder_rumble.wav",
        LoopId::SatelliteFall(_) => "satellite_fall.wav",
        LoopId::BugSpawn(_) => "bug_crawl.wav",
    }
}

pub fn music_asset(track: MusicTrack) -> &'static str {
    match track {
        MusicTrack::Menu => "music_menu.ogg",
        MusicTrack::Level1 => "music_slope.ogg",
        MusicTrack::Level2 => "music_cave.ogg",
        MusicTrack::Credits => "music_credits.ogg",
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: Option<B>,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    loops: HashMap<LoopId, ChannelHandle>,
}

impl<B: AudioBackend> AudioManager<B> {
    /// `None` runs with audio disabled
    pub fn new(backend: Option<B>, settings: &Settings) -> Self {
        if backend.is_none() {
            log::warn!("No audio backend - audio disabled");
        }
        Self {
            backend,
            music_volume: settings.music_volume,
            sfx_volume: settings.sfx_volume,
            muted: false,
            loops: HashMap::new(),
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn active_loops(&self) -> usize {
        self.loops.len()
    }

    pub fn is_looping(&self, id: LoopId) -> bool {
        self.loops.contains_key(&id)
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    /// Forward one simulation event to the backend
    pub fn handle(&mut self, event: &GameEvent) {
        let vol = self.effective_volume();
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match *event {
            GameEvent::Sound(cue) => {
                if backend.play(sound_asset(cue), vol, false).is_none() {
                    log::warn!("No free channel for {:?}, skipped", cue);
                }
            }
            GameEvent::LoopStart(id) => {
                if self.loops.contains_key(&id) {
                    return;
                }
                match backend.play(loop_asset(id), vol, true) {
                    Some(channel) => {
                        self.loops.insert(id, channel);
                    }
                    None => log::warn!("No free channel for loop {:?}, skipped", id),
                }
            }
            GameEvent::LoopStop(id) => {
                if let Some(channel) = self.loops.remove(&id) {
                    backend.stop(channel);
                }
            }
            GameEvent::PauseLoops => {
                for channel in self.loops.values() {
                    backend.pause(*channel);
                }
            }
            GameEvent::ResumeLoops => {
                for channel in self.loops.values() {
                    backend.resume(*channel);
                }
            }
            GameEvent::StopAllLoops => {
                for (_, channel) in self.loops.drain() {
                    backend.stop(channel);
                }
            }
            GameEvent::PlayMusic(track) => {
                let volume = if self.muted { 0.0 } else { self.music_volume };
                backend.play_music(music_asset(track), volume);
            }
            GameEvent::StopMusic => backend.stop_music(),
            GameEvent::FadeOutMusic { ms } => backend.fade_out_music(ms),
            GameEvent::MusicVolume(volume) => {
                self.music_volume = volume.clamp(0.0, 1.0);
                backend.set_music_volume(self.music_volume);
            }
            _ => {}
        }
    }
}
