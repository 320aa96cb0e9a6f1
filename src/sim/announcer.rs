//! Floating announcer that slides in from the right with a message

use serde::{Deserialize, Serialize};

use super::timer::Deadline;
use crate::consts::WIDTH;

/// Horizontal slide speed, px/s
pub const ANNOUNCER_SPEED: f32 = 600.0;
pub const ANNOUNCER_TARGET_X: f32 = WIDTH - 220.0;
pub const ANNOUNCER_DISPLAY_MS: f64 = 3500.0;

const NODE_MESSAGES: [&str; 4] = [
    "Node 1 online. Keep moving!",
    "Node 2 online. The grid is waking up.",
    "Node 3 online. One more to go!",
    "Node 4 online. The colony is saved!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Checkpoint N (1-based) collected
    Node(u32),
    Portal,
    BugWarning,
    Halfway,
    StairsAhead,
}

impl Message {
    pub fn text(self) -> String {
        match self {
            Message::Node(n) => NODE_MESSAGES
                .get((n as usize).wrapping_sub(1))
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Node {n} online.")),
            Message::Portal => "The avalanche is catching up, hurry to the portal!".to_string(),
            Message::BugWarning => {
                "Be careful! The tunnel is filled with radioactive bugs!".to_string()
            }
            Message::Halfway => "Halfway to the tower".to_string(),
            Message::StairsAhead => "The stairs to the tower are just ahead!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnouncerState {
    Hidden,
    FloatingIn,
    Shown,
    FloatingOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcer {
    pub state: AnnouncerState,
    /// Screen x of the left edge
    pub x: f32,
    pub message: Option<Message>,
    display_ms: f64,
    shown_until: Deadline,
}

impl Default for Announcer {
    fn default() -> Self {
        Self {
            state: AnnouncerState::Hidden,
            x: WIDTH,
            message: None,
            display_ms: ANNOUNCER_DISPLAY_MS,
            shown_until: Deadline::default(),
        }
    }
}

impl Announcer {
    pub fn is_hidden(&self) -> bool {
        self.state == AnnouncerState::Hidden
    }

    /// Start sliding in with `message`, replacing whatever is on screen
    pub fn show(&mut self, message: Message, display_ms: f64) {
        log::debug!("Announcer: {:?}", message);
        self.state = AnnouncerState::FloatingIn;
        self.x = WIDTH;
        self.message = Some(message);
        self.display_ms = display_ms;
        self.shown_until.clear();
    }

    pub fn update(&mut self, now_ms: f64, dt: f32) {
        match self.state {
            AnnouncerState::Hidden => {}
            AnnouncerState::FloatingIn => {
                self.x -= ANNOUNCER_SPEED * dt;
                if self.x <= ANNOUNCER_TARGET_X {
                    self.x = ANNOUNCER_TARGET_X;
                    self.state = AnnouncerState::Shown;
                    self.shown_until.arm(now_ms, self.display_ms);
                }
            }
            AnnouncerState::Shown => {
                if self.shown_until.expired(now_ms) {
                    self.state = AnnouncerState::FloatingOut;
                }
            }
            AnnouncerState::FloatingOut => {
                self.x += ANNOUNCER_SPEED * dt;
                if self.x > WIDTH {
                    self.state = AnnouncerState::Hidden;
                    self.message = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut a = Announcer::default();
        a.show(Message::Node(1), ANNOUNCER_DISPLAY_MS);
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        let mut states = vec![a.state];
        while now < 10_000.0 {
            now += 1000.0 / 60.0;
            a.update(now, dt);
            if states.last() != Some(&a.state) {
                states.push(a.state);
            }
            if a.is_hidden() {
                break;
            }
        }
        assert_eq!(
            states,
            vec![
                AnnouncerState::FloatingIn,
                AnnouncerState::Shown,
                AnnouncerState::FloatingOut,
                AnnouncerState::Hidden,
            ]
        );
        assert!(now > ANNOUNCER_DISPLAY_MS);
        assert!(a.message.is_none());
    }

    #[test]
    fn test_node_text_fallback() {
        assert!(Message::Node(2).text().starts_with("Node 2"));
        assert_eq!(Message::Node(9).text(), "Node 9 online.");
        assert_eq!(Message::Node(0).text(), "Node 0 online.");
    }
}
