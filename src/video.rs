//! Cutscene video collaborator
//!
//! The core never decodes video. It opens a cutscene through a
//! `VideoBackend`, polls for the frame at the current playback time and
//! asks whether one playthrough has completed. A backend that cannot open
//! the asset makes the cutscene count as finished immediately.

use crate::sim::{Cutscene, GameEvent};

pub type VideoHandle = u32;

/// A decoded frame, opaque to the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub index: u64,
}

pub trait VideoBackend {
    fn open(&mut self, asset: &str) -> Option<VideoHandle>;
    fn frame_at(&mut self, handle: VideoHandle, secs: f64) -> Option<VideoFrame>;
    fn is_one_playthrough_done(&self, handle: VideoHandle) -> bool;
    fn release(&mut self, handle: VideoHandle);
}

/// Backend with no decoder; every cutscene is skipped
#[derive(Debug, Default)]
pub struct NoVideo;

impl VideoBackend for NoVideo {
    fn open(&mut self, _asset: &str) -> Option<VideoHandle> {
        None
    }
    fn frame_at(&mut self, _handle: VideoHandle, _secs: f64) -> Option<VideoFrame> {
        None
    }
    fn is_one_playthrough_done(&self, _handle: VideoHandle) -> bool {
        true
    }
    fn release(&mut self, _handle: VideoHandle) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Playback {
    kind: Cutscene,
    /// `None` when the asset failed to open
    handle: Option<VideoHandle>,
}

pub struct CutscenePlayer<V: VideoBackend> {
    backend: Option<V>,
    current: Option<Playback>,
}

impl<V: VideoBackend> CutscenePlayer<V> {
    pub fn new(backend: Option<V>) -> Self {
        if backend.is_none() {
            log::warn!("No video backend - cutscenes will be skipped");
        }
        Self {
            backend,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Cutscene> {
        self.current.map(|p| p.kind)
    }

    pub fn handle(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::CutsceneStarted(kind) => self.start(kind),
            GameEvent::CutsceneEnded(kind) => {
                if self.current() == Some(kind) {
                    self.release();
                }
            }
            _ => {}
        }
    }

    fn start(&mut self, kind: Cutscene) {
        self.release();
        let handle = self.backend.as_mut().and_then(|b| b.open(kind.asset()));
        if handle.is_none() {
            log::warn!("Could not open {}, skipping cutscene", kind.asset());
        }
        self.current = Some(Playback { kind, handle });
    }

    fn release(&mut self) {
        let Some(playback) = self.current.take() else {
            return;
        };
        if let (Some(backend), Some(handle)) = (self.backend.as_mut(), playback.handle) {
            backend.release(handle);
        }
    }

    /// True once the running cutscene has played through (or never opened)
    pub fn is_finished(&self) -> bool {
        let Some(playback) = self.current else {
            return false;
        };
        match (self.backend.as_ref(), playback.handle) {
            (Some(backend), Some(handle)) => backend.is_one_playthrough_done(handle),
            _ => true,
        }
    }

    pub fn frame_at(&mut self, secs: f64) -> Option<VideoFrame> {
        let handle = self.current?.handle?;
        self.backend.as_mut()?.frame_at(handle, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays a fixed number of seconds per asset
    struct FakeDecoder {
        length_secs: f64,
        position: f64,
        released: Vec<VideoHandle>,
    }

    impl VideoBackend for FakeDecoder {
        fn open(&mut self, asset: &str) -> Option<VideoHandle> {
            (asset != Cutscene::Win.asset()).then_some(7)
        }
        fn frame_at(&mut self, _handle: VideoHandle, secs: f64) -> Option<VideoFrame> {
            self.position = secs;
            Some(VideoFrame {
                width: 960,
                height: 540,
                index: (secs * 30.0) as u64,
            })
        }
        fn is_one_playthrough_done(&self, _handle: VideoHandle) -> bool {
            self.position >= self.length_secs
        }
        fn release(&mut self, handle: VideoHandle) {
            self.released.push(handle);
        }
    }

    fn player() -> CutscenePlayer<FakeDecoder> {
        CutscenePlayer::new(Some(FakeDecoder {
            length_secs: 2.0,
            position: 0.0,
            released: Vec::new(),
        }))
    }

    #[test]
    fn test_plays_until_done() {
        let mut p = player();
        p.handle(&GameEvent::CutsceneStarted(Cutscene::Mid));
        assert_eq!(p.frame_at(1.0).map(|f| f.index), Some(30));
        assert!(!p.is_finished());
        p.frame_at(2.0);
        assert!(p.is_finished());

        p.handle(&GameEvent::CutsceneEnded(Cutscene::Mid));
        assert!(p.current().is_none());
        assert_eq!(p.backend.as_ref().unwrap().released, vec![7]);
    }

    #[test]
    fn test_unopenable_asset_finishes_immediately() {
        let mut p = player();
        p.handle(&GameEvent::CutsceneStarted(Cutscene::Win));
        assert!(p.is_finished());
        assert!(p.frame_at(0.5).is_none());
    }

    #[test]
    fn test_no_backend_skips() {
        let mut p: CutscenePlayer<NoVideo> = CutscenePlayer::new(None);
        p.handle(&GameEvent::CutsceneStarted(Cutscene::Prologue));
        assert!(p.is_finished());
    }
}
