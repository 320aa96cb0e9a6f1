//! Obstacle spawn scheduler
//!
//! Decides *when* and *what* to spawn. Whether spawning is allowed at all
//! (death wait, portal present, stairs visible) is the caller's call.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleType;
use crate::consts::WIDTH;
use crate::tuning::{SpawnInterval, SpawnWindow, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Ice formations and satellites on the slope
    Slope,
    /// Bugs and crystals in the cave
    Cave,
}

/// A spawn decided this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub kind: ObstacleType,
    /// Screen x of the new obstacle's left edge
    pub x: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub mode: SpawnMode,
    pub last_spawn_ms: f64,
    pub next_delay_ms: f64,
}

fn draw_delay(rng: &mut impl Rng, interval: SpawnInterval) -> f64 {
    rng.random_range(interval.min_ms..=interval.max_ms) as f64
}

fn draw_x(rng: &mut impl Rng, window: SpawnWindow) -> f32 {
    WIDTH + rng.random_range(window.min_px..=window.max_px) as f32
}

impl SpawnScheduler {
    /// First delay is drawn from the mode's interval
    pub fn new(mode: SpawnMode, now_ms: f64, tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let interval = match mode {
            SpawnMode::Slope => tuning.obstacle_interval,
            SpawnMode::Cave => tuning.bug_interval,
        };
        Self {
            mode,
            last_spawn_ms: now_ms,
            next_delay_ms: draw_delay(rng, interval),
        }
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        now_ms - self.last_spawn_ms > self.next_delay_ms
    }

    /// Spawn if the delay has elapsed and the screen has room
    pub fn poll(
        &mut self,
        now_ms: f64,
        on_screen: usize,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> Option<SpawnPlan> {
        if on_screen >= tuning.max_obstacles_on_screen || !self.is_due(now_ms) {
            return None;
        }
        let (plan, interval) = match self.mode {
            SpawnMode::Slope => {
                let total = tuning.ice_weight + tuning.satellite_weight;
                let roll = rng.random_range(0.0..total);
                let plan = if roll < tuning.ice_weight {
                    SpawnPlan {
                        kind: ObstacleType::Ice,
                        x: draw_x(rng, tuning.ice_window),
                    }
                } else {
                    SpawnPlan {
                        kind: ObstacleType::Satellite,
                        x: draw_x(rng, tuning.satellite_window),
                    }
                };
                (plan, tuning.obstacle_interval)
            }
            SpawnMode::Cave => {
                let total = tuning.bug_weight + tuning.crystal_weight;
                if rng.random_range(0.0..total) < tuning.bug_weight {
                    let plan = SpawnPlan {
                        kind: ObstacleType::Bug,
                        x: draw_x(rng, tuning.bug_window),
                    };
                    (plan, tuning.bug_interval)
                } else {
                    let plan = SpawnPlan {
                        kind: ObstacleType::Crystal,
                        x: draw_x(rng, tuning.crystal_window),
                    };
                    (plan, tuning.crystal_interval)
                }
            }
        };
        self.last_spawn_ms = now_ms;
        self.next_delay_ms = draw_delay(rng, interval);
        log::debug!("Spawning {:?} at x={:.0}", plan.kind, plan.x);
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_respects_delay_and_cap() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut sched = SpawnScheduler::new(SpawnMode::Slope, 0.0, &tuning, &mut rng);
        assert!((1800.0..=3200.0).contains(&sched.next_delay_ms));
        assert!(sched.poll(1000.0, 0, &tuning, &mut rng).is_none());
        assert!(sched.poll(3300.0, 4, &tuning, &mut rng).is_none(), "cap");
        let plan = sched.poll(3300.0, 3, &tuning, &mut rng).expect("due");
        assert!(matches!(plan.kind, ObstacleType::Ice | ObstacleType::Satellite));
        assert_eq!(sched.last_spawn_ms, 3300.0);
        assert!(sched.poll(3301.0, 0, &tuning, &mut rng).is_none());
    }

    #[test]
    fn test_slope_mix_roughly_weighted() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut sched = SpawnScheduler::new(SpawnMode::Slope, 0.0, &tuning, &mut rng);
        let mut ice = 0;
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 4000.0;
            if let Some(plan) = sched.poll(now, 0, &tuning, &mut rng) {
                if plan.kind == ObstacleType::Ice {
                    ice += 1;
                }
            }
        }
        let ratio = ice as f64 / 2000.0;
        assert!((0.55..0.65).contains(&ratio), "ice ratio {ratio}");
    }

    #[test]
    fn test_cave_mix_follows_weights() {
        let tuning = Tuning {
            bug_weight: 0.8,
            crystal_weight: 0.2,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let mut sched = SpawnScheduler::new(SpawnMode::Cave, 0.0, &tuning, &mut rng);
        let mut bugs = 0;
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 4000.0;
            if let Some(plan) = sched.poll(now, 0, &tuning, &mut rng)
                && plan.kind == ObstacleType::Bug
            {
                bugs += 1;
            }
        }
        let ratio = bugs as f64 / 2000.0;
        assert!((0.75..0.85).contains(&ratio), "bug ratio {ratio}");

        let only_crystals = Tuning {
            bug_weight: 0.0,
            ..Tuning::default()
        };
        let plan = sched.poll(now + 4000.0, 0, &only_crystals, &mut rng).expect("due");
        assert_eq!(plan.kind, ObstacleType::Crystal);
    }

    proptest! {
        #[test]
        fn prop_spawn_positions_in_windows(seed in any::<u64>(), cave in any::<bool>()) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mode = if cave { SpawnMode::Cave } else { SpawnMode::Slope };
            let mut sched = SpawnScheduler::new(mode, 0.0, &tuning, &mut rng);
            let plan = sched.poll(10_000.0, 0, &tuning, &mut rng).unwrap();
            let window = match plan.kind {
                ObstacleType::Ice => tuning.ice_window,
                ObstacleType::Satellite => tuning.satellite_window,
                ObstacleType::Bug => tuning.bug_window,
                ObstacleType::Crystal => tuning.crystal_window,
            };
            prop_assert!(plan.x >= WIDTH + window.min_px as f32);
            prop_assert!(plan.x <= WIDTH + window.max_px as f32);
            prop_assert_eq!(cave, matches!(plan.kind, ObstacleType::Bug | ObstacleType::Crystal));
            let interval = match plan.kind {
                ObstacleType::Ice | ObstacleType::Satellite => tuning.obstacle_interval,
                ObstacleType::Bug => tuning.bug_interval,
                ObstacleType::Crystal => tuning.crystal_interval,
            };
            prop_assert!(sched.next_delay_ms >= interval.min_ms as f64);
            prop_assert!(sched.next_delay_ms <= interval.max_ms as f64);
        }
    }
}
