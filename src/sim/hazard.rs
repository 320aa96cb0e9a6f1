//! Pursuit hazards: the avalanche wall and the level-2 boulder
//!
//! Both report side effects through explicit update results instead of
//! flags the controller has to poll.

use serde::{Deserialize, Serialize};

use super::event::{GameEvent, LoopId};
use super::geom::Rect;
use super::terrain::Terrain;
use crate::consts::*;
use crate::frame_scale;

/// Rumble starts once the wall is nearly on screen
pub const AVALANCHE_SOUND_TRIGGER_OFFSET: f32 = -50.0;
/// Peak continuous shake when the wall reaches the rider
pub const AVALANCHE_MAX_SHAKE: f32 = 7.0;
/// Continuous shake saturates at this fraction of the rider's x
pub const AVALANCHE_SHAKE_RANGE: f32 = 0.8;
/// Speed multiplier near the finish once every checkpoint is collected
pub const AVALANCHE_CATCHUP_SLOWDOWN: f32 = 0.4;
/// Gap (to the rider) inside which the finish slowdown applies
pub const AVALANCHE_CATCHUP_WINDOW: f32 = WIDTH * 0.33;

pub const AVALANCHE_START_LEVEL1: f32 = -WIDTH / 3.0;
pub const AVALANCHE_START_LEVEL2: f32 = -WIDTH * 10.0;
pub const AVALANCHE_START_TUTORIAL: f32 = -WIDTH * 5.0;

pub const BOULDER_SIZE: f32 = 160.0;
pub const BOULDER_INITIAL_OFFSET: f32 = -600.0;
pub const BOULDER_SPEED: f32 = 0.25;
pub const BOULDER_CATCHUP_BONUS: f32 = 1.0;
pub const BOULDER_ROTATION_DEG_PER_PX: f32 = 0.72;
pub const BOULDER_APPEAR_OFFSET: f32 = 0.0;
pub const BOULDER_COLLISION_INSET: (f32, f32) = (20.0, 20.0);
/// Stairs appear when the boulder closes to within this distance of the rider
pub const BOULDER_WIN_PROXIMITY: f32 = 150.0;
pub const BOULDER_VISIBLE_HITS: u32 = 2;
pub const BOULDER_CATCHUP_HITS: u32 = 3;

/// Which run the avalanche is chasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chase {
    /// Inert wall far off screen
    Tutorial,
    /// Live race, optionally in the final stretch (all checkpoints collected)
    Race { final_stretch: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AvalancheUpdate {
    /// One-shot rumble shake when the wall first nears the screen
    pub shake_requested: bool,
    /// Wall reached the rider this frame
    pub caught: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avalanche {
    /// Screen x of the leading edge
    pub offset: f32,
    /// px/frame
    pub speed: f32,
    pub rumble_playing: bool,
    /// Continuous shake magnitude derived from proximity
    pub shake: f32,
    caught: bool,
}

impl Avalanche {
    pub fn new(speed: f32) -> Self {
        Self {
            offset: AVALANCHE_START_LEVEL1,
            speed,
            rumble_playing: false,
            shake: 0.0,
            caught: false,
        }
    }

    pub fn reset(&mut self, offset: f32) {
        self.offset = offset;
        self.rumble_playing = false;
        self.shake = 0.0;
        self.caught = false;
    }

    pub fn has_caught(&self) -> bool {
        self.caught
    }

    fn stop_rumble(&mut self, events: &mut Vec<GameEvent>) {
        if self.rumble_playing {
            events.push(GameEvent::LoopStop(LoopId::AvalancheRumble));
            self.rumble_playing = false;
        }
    }

    pub fn update(
        &mut self,
        player_x: f32,
        chase: Chase,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) -> AvalancheUpdate {
        let mut out = AvalancheUpdate::default();
        let final_stretch = match chase {
            Chase::Tutorial => {
                self.stop_rumble(events);
                self.shake = 0.0;
                return out;
            }
            Chase::Race { final_stretch } => final_stretch,
        };
        if self.caught {
            return out;
        }

        let gap = player_x - self.offset;
        let mut advance = self.speed * frame_scale(dt);
        if final_stretch && gap > 0.0 && gap < AVALANCHE_CATCHUP_WINDOW {
            advance *= AVALANCHE_CATCHUP_SLOWDOWN;
        }
        self.offset += advance;

        if self.offset > AVALANCHE_SOUND_TRIGGER_OFFSET && !self.rumble_playing {
            events.push(GameEvent::LoopStart(LoopId::AvalancheRumble));
            self.rumble_playing = true;
            out.shake_requested = true;
        }

        let range = player_x * AVALANCHE_SHAKE_RANGE;
        let ratio = if range > 0.0 {
            (self.offset / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.shake = AVALANCHE_MAX_SHAKE * ratio;

        if self.offset >= player_x {
            log::info!("Avalanche caught the rider at offset {:.1}", self.offset);
            self.caught = true;
            self.shake = 0.0;
            self.stop_rumble(events);
            events.push(GameEvent::StopMusic);
            out.caught = true;
        }
        out
    }

    /// Region covered by the wall, for drawing
    pub fn rect(&self) -> Rect {
        Rect::new(self.offset - WIDTH, -HEIGHT, WIDTH, HEIGHT * 4.0)
    }
}

/// Escalation latches driven by consecutive obstacle hits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub consecutive_hits: u32,
    pub boulder_visible: bool,
    pub catch_up: bool,
}

impl Escalation {
    pub fn record_hit(&mut self) {
        self.consecutive_hits += 1;
        if self.consecutive_hits >= BOULDER_VISIBLE_HITS && !self.boulder_visible {
            log::info!("Boulder threat active after {} hits", self.consecutive_hits);
            self.boulder_visible = true;
        }
        if self.consecutive_hits >= BOULDER_CATCHUP_HITS && !self.catch_up {
            log::info!("Boulder catch-up after {} hits", self.consecutive_hits);
            self.catch_up = true;
        }
    }

    /// A shoot-kill resets the streak; the latches stay set
    pub fn record_kill(&mut self) {
        self.consecutive_hits = 0;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boulder {
    /// Screen x of the right edge
    pub offset: f32,
    /// World y of the bottom edge
    pub bottom: f32,
    pub rotation: f32,
    pub rumble_playing: bool,
}

impl Boulder {
    pub fn new(terrain: &Terrain) -> Self {
        let mut boulder = Self {
            offset: BOULDER_INITIAL_OFFSET,
            bottom: 0.0,
            rotation: 0.0,
            rumble_playing: false,
        };
        boulder.settle(terrain);
        boulder
    }

    fn settle(&mut self, terrain: &Terrain) {
        self.bottom = terrain.height_at(self.offset - BOULDER_SIZE / 2.0);
    }

    pub fn update(&mut self, catch_up: bool, terrain: &Terrain, dt: f32) {
        let mut speed = BOULDER_SPEED;
        if catch_up {
            speed += BOULDER_CATCHUP_BONUS;
        }
        let step = speed * frame_scale(dt);
        self.offset += step;
        self.rotation = (self.rotation - step * BOULDER_ROTATION_DEG_PER_PX).rem_euclid(360.0);
        self.settle(terrain);
    }

    /// Right edge has rolled onto the screen
    pub fn has_appeared(&self) -> bool {
        self.offset >= BOULDER_APPEAR_OFFSET
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.offset - BOULDER_SIZE,
            self.bottom - BOULDER_SIZE,
            BOULDER_SIZE,
            BOULDER_SIZE,
        )
    }

    pub fn collision_rect(&self) -> Rect {
        let (ix, iy) = BOULDER_COLLISION_INSET;
        self.rect().inflate(-2.0 * ix, -2.0 * iy)
    }

    /// Close behind the rider, but not touching
    pub fn in_win_range(&self, player_x: f32) -> bool {
        let gap = player_x - self.offset;
        gap > 0.0 && gap <= BOULDER_WIN_PROXIMITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainKind;

    const DT: f32 = 1.0 / 60.0;
    const RACE: Chase = Chase::Race {
        final_stretch: false,
    };

    #[test]
    fn test_avalanche_catches_at_frame_260() {
        let mut av = Avalanche::new(2.0);
        av.reset(-320.0);
        let mut events = Vec::new();
        let mut caught_at = None;
        let mut last = av.offset;
        for frame in 1..=400 {
            let out = av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
            if caught_at.is_none() {
                assert!(av.offset > last, "offset must strictly increase");
                last = av.offset;
            }
            if out.caught {
                assert!(caught_at.is_none(), "caught fires once");
                caught_at = Some(frame);
            }
        }
        assert_eq!(caught_at, Some(260));
        assert!(av.has_caught());
        assert_eq!(av.shake, 0.0);
        assert!(events.contains(&GameEvent::StopMusic));
        assert!(events.contains(&GameEvent::LoopStop(LoopId::AvalancheRumble)));
    }

    #[test]
    fn test_rumble_starts_once_with_shake() {
        let mut av = Avalanche::new(2.0);
        av.reset(-52.0);
        let mut events = Vec::new();
        let first = av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert!(!first.shake_requested);
        let second = av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert!(second.shake_requested);
        let third = av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert!(!third.shake_requested);
        let starts = events
            .iter()
            .filter(|e| **e == GameEvent::LoopStart(LoopId::AvalancheRumble))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_continuous_shake_grows_with_proximity() {
        let mut av = Avalanche::new(1.0);
        let mut events = Vec::new();
        av.reset(-10.0);
        av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert_eq!(av.shake, 0.0);
        av.reset(79.0);
        av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert!((av.shake - 3.5).abs() < 1e-4);
        av.reset(170.0);
        av.update(PLAYER_SCREEN_X, RACE, DT, &mut events);
        assert_eq!(av.shake, AVALANCHE_MAX_SHAKE);
    }

    #[test]
    fn test_final_stretch_slows_wall() {
        let mut av = Avalanche::new(2.0);
        let mut events = Vec::new();
        av.reset(100.0);
        av.update(
            PLAYER_SCREEN_X,
            Chase::Race {
                final_stretch: true,
            },
            DT,
            &mut events,
        );
        assert!((av.offset - 100.8).abs() < 1e-4);
        // Outside the window the wall runs at full speed
        av.reset(-400.0);
        av.update(
            PLAYER_SCREEN_X,
            Chase::Race {
                final_stretch: true,
            },
            DT,
            &mut events,
        );
        assert_eq!(av.offset, -398.0);
    }

    #[test]
    fn test_tutorial_is_inert() {
        let mut av = Avalanche::new(2.0);
        av.reset(AVALANCHE_START_TUTORIAL);
        av.rumble_playing = true;
        let mut events = Vec::new();
        let out = av.update(PLAYER_SCREEN_X, Chase::Tutorial, DT, &mut events);
        assert_eq!(av.offset, AVALANCHE_START_TUTORIAL);
        assert_eq!(out, AvalancheUpdate::default());
        assert_eq!(events, vec![GameEvent::LoopStop(LoopId::AvalancheRumble)]);
    }

    #[test]
    fn test_boulder_escalation_latches() {
        let mut esc = Escalation::default();
        esc.record_hit();
        esc.record_kill();
        assert_eq!(esc.consecutive_hits, 0);
        assert!(!esc.boulder_visible);

        esc.record_hit();
        esc.record_hit();
        assert!(esc.boulder_visible);
        assert!(!esc.catch_up);

        esc.record_kill();
        assert_eq!(esc.consecutive_hits, 0);
        assert!(esc.boulder_visible, "visibility stays latched");

        esc.record_hit();
        esc.record_hit();
        assert!(!esc.catch_up);
        esc.record_hit();
        assert!(esc.catch_up);
        esc.record_kill();
        assert!(esc.catch_up, "catch-up stays latched");
    }

    #[test]
    fn test_boulder_rolls_and_rotates() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let mut boulder = Boulder::new(&terrain);
        boulder.update(false, &terrain, DT);
        assert_eq!(boulder.offset, BOULDER_INITIAL_OFFSET + BOULDER_SPEED);
        assert!((boulder.rotation - (360.0 - 0.18)).abs() < 1e-3);
        boulder.update(true, &terrain, DT);
        assert_eq!(
            boulder.offset,
            BOULDER_INITIAL_OFFSET + 2.0 * BOULDER_SPEED + BOULDER_CATCHUP_BONUS
        );
        assert!(!boulder.has_appeared());
        boulder.offset = 0.0;
        assert!(boulder.has_appeared());
    }

    #[test]
    fn test_boulder_collision_inset_and_win_range() {
        let terrain = Terrain::new(TerrainKind::Cave);
        let mut boulder = Boulder::new(&terrain);
        boulder.offset = 100.0;
        let r = boulder.collision_rect();
        assert_eq!(r.right(), 80.0);
        assert_eq!(r.w, BOULDER_SIZE - 40.0);
        assert!(boulder.in_win_range(PLAYER_SCREEN_X));
        boulder.offset = 49.0;
        assert!(!boulder.in_win_range(PLAYER_SCREEN_X));
        boulder.offset = PLAYER_SCREEN_X;
        assert!(!boulder.in_win_range(PLAYER_SCREEN_X));
    }
}
