//! Phase timers driven by an injected simulation clock
//!
//! Animated entities keep `{phase, started_ms, duration_ms}` and compare
//! against the world clock instead of reading a wall clock.

use serde::{Deserialize, Serialize};

/// A named phase with a start time and an optional fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimer<P> {
    pub phase: P,
    pub started_ms: f64,
    pub duration_ms: f64,
}

impl<P: Copy + PartialEq> PhaseTimer<P> {
    pub fn new(phase: P, now_ms: f64, duration_ms: f64) -> Self {
        Self {
            phase,
            started_ms: now_ms,
            duration_ms,
        }
    }

    /// Enter a new phase starting at `now_ms`
    pub fn set(&mut self, phase: P, now_ms: f64, duration_ms: f64) {
        self.phase = phase;
        self.started_ms = now_ms;
        self.duration_ms = duration_ms;
    }

    pub fn elapsed(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_ms).max(0.0)
    }

    /// Progress through the phase in [0, 1]; zero-length phases are complete
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed(now_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    pub fn is(&self, phase: P) -> bool {
        self.phase == phase
    }
}

/// One-shot deadline (e.g. slowdown end, death-screen delay)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deadline {
    at_ms: Option<f64>,
}

impl Deadline {
    pub fn arm(&mut self, now_ms: f64, delay_ms: f64) {
        self.at_ms = Some(now_ms + delay_ms);
    }

    pub fn clear(&mut self) {
        self.at_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at_ms.is_some()
    }

    /// True once the deadline has been reached (stays true until cleared)
    pub fn expired(&self, now_ms: f64) -> bool {
        self.at_ms.is_some_and(|at| now_ms >= at)
    }

    /// Milliseconds left, or `None` when not armed
    pub fn remaining(&self, now_ms: f64) -> Option<f64> {
        self.at_ms.map(|at| (at - now_ms).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Demo {
        A,
        B,
    }

    #[test]
    fn test_phase_progress() {
        let mut t = PhaseTimer::new(Demo::A, 1000.0, 200.0);
        assert_eq!(t.progress(1000.0), 0.0);
        assert_eq!(t.progress(1100.0), 0.5);
        assert!(t.is_done(1200.0));
        t.set(Demo::B, 1200.0, 0.0);
        assert!(t.is(Demo::B));
        assert!(t.is_done(1200.0));
    }

    #[test]
    fn test_deadline() {
        let mut d = Deadline::default();
        assert!(!d.expired(1e9));
        d.arm(100.0, 50.0);
        assert!(!d.expired(149.0));
        assert!(d.expired(150.0));
        assert_eq!(d.remaining(120.0), Some(30.0));
        d.clear();
        assert!(!d.is_armed());
    }
}
