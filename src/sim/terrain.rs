//! Procedural terrain height field
//!
//! Heights are sampled on a chunk grid indexed by absolute world chunk.
//! The window of samples covers the screen plus a small margin and rolls
//! forward as the world scrolls: pop the leading sample, push a freshly
//! sampled one at the trailing edge.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lerp;

/// Sentinel returned by `ceiling_height_at` where there is no ceiling
pub const NO_CEILING_Y: f32 = -HEIGHT * 2.0;

/// Terrain shape for the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Flat ground at `GROUND_Y`, never scrolls (tutorial)
    Flat,
    /// Rolling downhill slope (level 1)
    Slope,
    /// Rolling slope with a mirrored ceiling (level 2)
    Cave,
}

/// Number of samples kept in the rolling window
pub fn num_height_points() -> usize {
    (WIDTH / CHUNK) as usize + 3
}

/// Sampled height at an absolute world chunk index
pub fn sample_height(world_chunk: f64) -> f32 {
    let idx = world_chunk;
    (GROUND_Y as f64
        + idx * DOWNHILL_SLOPE_FACTOR as f64
        + 50.0 * (idx * 0.035).sin()
        + 25.0 * (idx * 0.09).sin()) as f32
}

/// Floor baseline (slope without undulation) at a world chunk
fn floor_baseline(world_chunk: f64) -> f64 {
    GROUND_Y as f64 + world_chunk * DOWNHILL_SLOPE_FACTOR as f64
}

/// Ceiling baseline at a world chunk
fn ceiling_baseline(world_chunk: f64) -> f64 {
    LEVEL2_CEILING_Y as f64 + world_chunk * DOWNHILL_SLOPE_FACTOR as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    kind: TerrainKind,
    heights: VecDeque<f32>,
    /// Absolute world chunk of `heights[0]`
    world_start_chunk_index: u64,
    /// Fractional scroll into the first chunk, in [0, 1)
    scroll_fractional_offset: f32,
}

impl Terrain {
    pub fn new(kind: TerrainKind) -> Self {
        let heights = (0..num_height_points())
            .map(|i| match kind {
                TerrainKind::Flat => GROUND_Y,
                _ => sample_height(i as f64),
            })
            .collect();
        Self {
            kind,
            heights,
            world_start_chunk_index: 0,
            scroll_fractional_offset: 0.0,
        }
    }

    pub fn kind(&self) -> TerrainKind {
        self.kind
    }

    pub fn has_ceiling(&self) -> bool {
        self.kind == TerrainKind::Cave
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn world_start_chunk_index(&self) -> u64 {
        self.world_start_chunk_index
    }

    pub fn scroll_fractional_offset(&self) -> f32 {
        self.scroll_fractional_offset
    }

    /// Raw sample window (for drawing the ground polygon)
    pub fn heights(&self) -> impl Iterator<Item = f32> + '_ {
        self.heights.iter().copied()
    }

    /// Screen x of the first sample in the window
    pub fn first_sample_screen_x(&self) -> f32 {
        -self.scroll_fractional_offset * CHUNK
    }

    /// Advance the window by `dx` pixels of world scroll
    pub fn update(&mut self, dx: f32) {
        if self.kind == TerrainKind::Flat {
            return;
        }
        self.scroll_fractional_offset += dx / CHUNK;
        while self.scroll_fractional_offset >= 1.0 {
            self.heights.pop_front();
            self.world_start_chunk_index += 1;
            let trailing = self.world_start_chunk_index + self.heights.len() as u64;
            self.heights.push_back(sample_height(trailing as f64));
            self.scroll_fractional_offset -= 1.0;
        }
    }

    /// Ground height (world y) under a screen x
    pub fn height_at(&self, screen_x: f32) -> f32 {
        if self.kind == TerrainKind::Flat {
            return GROUND_Y;
        }
        if self.heights.is_empty() {
            return HEIGHT * 2.0;
        }
        let index = screen_x / CHUNK + self.scroll_fractional_offset;
        if !index.is_finite() {
            return self.heights[0];
        }
        let i0 = index.floor();
        let t = index - i0;
        let last = self.heights.len() - 1;
        if i0 < 0.0 {
            return self.heights[0];
        }
        let i0 = i0 as usize;
        if i0 + 1 > last {
            return self.heights[last];
        }
        lerp(self.heights[i0], self.heights[i0 + 1], t)
    }

    /// Ceiling height (world y) under a screen x; `NO_CEILING_Y` outside the cave
    pub fn ceiling_height_at(&self, screen_x: f32) -> f32 {
        if self.kind != TerrainKind::Cave || !screen_x.is_finite() || self.heights.is_empty() {
            return NO_CEILING_Y;
        }
        let index = screen_x / CHUNK + self.scroll_fractional_offset;
        if !index.is_finite() {
            return NO_CEILING_Y;
        }
        let i0 = index.floor();
        let t = index - i0;
        let last = self.heights.len() - 1;
        if i0 < 0.0 {
            return self.mirrored_ceiling(0);
        }
        let i0 = i0 as usize;
        if i0 + 1 > last {
            return self.mirrored_ceiling(last);
        }
        lerp(self.mirrored_ceiling(i0), self.mirrored_ceiling(i0 + 1), t)
    }

    /// Ceiling sample reflecting the floor's deviation from its slope
    fn mirrored_ceiling(&self, local: usize) -> f32 {
        let world = (self.world_start_chunk_index + local as u64) as f64;
        let deviation = self.heights[local] as f64 - floor_baseline(world);
        (ceiling_baseline(world) - deviation) as f32
    }
}
