//! Render seam
//!
//! The core never touches pixels. `draw_frame` walks the game context and
//! emits `DrawCmd`s back to front into a `Surface`, translating world y
//! through the camera offset and adding the current shake.

use glam::Vec2;

use crate::consts::*;
use crate::sim::announcer::AnnouncerState;
use crate::sim::beacon::BeaconPhase;
use crate::sim::obstacle::{EruptionState, ObstacleKind};
use crate::sim::ramp::RAMP_THICKNESS;
use crate::sim::rider::DyingKind;
use crate::sim::state::{
    CREDITS_LINE_HEIGHT, CREDITS_LINES, MAIN_MENU_ITEMS, PAUSE_MENU_ITEMS, SETTINGS_ITEMS,
};
use crate::sim::world::{Stage, WIN_FLASH_MS};
use crate::sim::{GameContext, GameState, Rect, World};
use crate::video::VideoFrame;

pub type Color = [f32; 4];

pub const SKY: Color = [0.55, 0.75, 0.95, 1.0];
pub const CAVE_BACKDROP: Color = [0.08, 0.07, 0.1, 1.0];
pub const SNOW: Color = [0.96, 0.97, 1.0, 1.0];
pub const CAVE_ROCK: Color = [0.25, 0.22, 0.24, 1.0];
pub const RAMP: Color = [0.45, 0.55, 0.7, 1.0];
pub const AVALANCHE: Color = [0.9, 0.92, 0.98, 0.95];
pub const LASER: Color = [1.0, 0.2, 0.2, 1.0];
pub const BEACON_RAY: Color = [0.6, 0.9, 1.0, 1.0];
pub const HUD_TEXT: Color = [1.0, 1.0, 1.0, 1.0];
pub const HUD_HIGHLIGHT: Color = [1.0, 0.85, 0.2, 1.0];
pub const HEALTH_FILL: Color = [0.85, 0.15, 0.15, 1.0];
pub const HEALTH_BACK: Color = [0.2, 0.2, 0.2, 0.8];
pub const DIM: Color = [0.0, 0.0, 0.0, 0.6];
pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];

const HEALTH_BAR: Rect = Rect::new(20.0, 20.0, 200.0, 16.0);

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    /// Closed polygon in screen space
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Sprite {
        name: &'static str,
        frame: u32,
        rect: Rect,
        /// Degrees
        angle: f32,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
    },
    Video(VideoFrame),
}

pub trait Surface {
    fn blit(&mut self, cmd: DrawCmd);
}

/// Surface that records commands
#[derive(Debug, Default)]
pub struct DrawList {
    pub cmds: Vec<DrawCmd>,
}

impl Surface for DrawList {
    fn blit(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }
}

impl DrawList {
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn sprites(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Sprite { name, .. } => Some(*name),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// World -> screen mapping for one frame
#[derive(Debug, Clone, Copy)]
struct View {
    y_offset: f32,
    shake: Vec2,
}

impl View {
    fn of(world: &World) -> Self {
        Self {
            y_offset: world.camera.y_offset,
            shake: world.camera.shake_offset,
        }
    }

    fn point(&self, x: f32, world_y: f32) -> Vec2 {
        Vec2::new(x + self.shake.x, world_y + self.y_offset + self.shake.y)
    }

    fn rect(&self, r: Rect) -> Rect {
        let p = self.point(r.x, r.y);
        Rect::new(p.x, p.y, r.w, r.h)
    }
}

fn text(surface: &mut impl Surface, s: impl Into<String>, x: f32, y: f32, size: f32, color: Color) {
    surface.blit(DrawCmd::Text {
        text: s.into(),
        pos: Vec2::new(x, y),
        size,
        color,
    });
}

fn menu(surface: &mut impl Surface, title: &str, items: &[&str], selected: usize) {
    text(surface, title, WIDTH / 2.0, 120.0, 48.0, HUD_TEXT);
    for (i, item) in items.iter().enumerate() {
        let color = if i == selected { HUD_HIGHLIGHT } else { HUD_TEXT };
        text(surface, *item, WIDTH / 2.0, 220.0 + i as f32 * 50.0, 32.0, color);
    }
}

/// Draw the whole frame for the current state
pub fn draw_frame(ctx: &GameContext, video: Option<&VideoFrame>, surface: &mut impl Surface) {
    match ctx.state {
        GameState::Menu => {
            surface.blit(DrawCmd::Clear(BLACK));
            menu(surface, "AVALANCHE RIDER", &MAIN_MENU_ITEMS, ctx.menu_selection);
        }
        GameState::Prologue | GameState::MidCutscene | GameState::WinCutscene => {
            surface.blit(DrawCmd::Clear(BLACK));
            if let Some(frame) = video {
                surface.blit(DrawCmd::Video(frame.clone()));
            }
        }
        GameState::Tutorial | GameState::Playing => {
            draw_world(ctx, surface);
            draw_hud(ctx, surface);
        }
        GameState::Paused => {
            draw_world(ctx, surface);
            surface.blit(DrawCmd::Rect {
                rect: Rect::new(0.0, 0.0, WIDTH, HEIGHT),
                color: DIM,
            });
            menu(surface, "PAUSED", &PAUSE_MENU_ITEMS, ctx.pause_selection);
        }
        GameState::Failed => {
            draw_world(ctx, surface);
            surface.blit(DrawCmd::Rect {
                rect: Rect::new(0.0, 0.0, WIDTH, HEIGHT),
                color: DIM,
            });
            text(surface, "YOU DIED", WIDTH / 2.0, HEIGHT / 2.0 - 40.0, 56.0, HEALTH_FILL);
            text(
                surface,
                "Enter: retry    Q: main menu",
                WIDTH / 2.0,
                HEIGHT / 2.0 + 30.0,
                28.0,
                HUD_TEXT,
            );
        }
        GameState::Credits => {
            surface.blit(DrawCmd::Clear(BLACK));
            for (i, line) in CREDITS_LINES.iter().enumerate() {
                let y = ctx.credits_y + i as f32 * CREDITS_LINE_HEIGHT;
                if (-CREDITS_LINE_HEIGHT..HEIGHT).contains(&y) {
                    text(surface, *line, WIDTH / 2.0, y, 28.0, HUD_TEXT);
                }
            }
        }
        GameState::Controls => {
            surface.blit(DrawCmd::Clear(BLACK));
            let lines = [
                "Space: jump (twice for a double jump)",
                "F: shoot",
                "Escape: pause / back",
                "Arrows + Enter: menus",
            ];
            menu(surface, "CONTROLS", &lines, usize::MAX);
        }
        GameState::Settings => {
            surface.blit(DrawCmd::Clear(BLACK));
            let s = &ctx.settings;
            let on_off = |b: bool| if b { "On" } else { "Off" };
            let rows = [
                format!("{}: {:.0}%", SETTINGS_ITEMS[0], s.music_volume * 100.0),
                format!("{}: {}", SETTINGS_ITEMS[1], on_off(s.screen_shake)),
                format!("{}: {}", SETTINGS_ITEMS[2], on_off(s.reduced_motion)),
            ];
            let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
            menu(surface, "SETTINGS", &rows, ctx.settings_selection);
        }
    }
}

/// World layers, back to front
fn draw_world(ctx: &GameContext, surface: &mut impl Surface) {
    let world = &ctx.world;
    let view = View::of(world);
    let cave = world.stage.is_cave();
    surface.blit(DrawCmd::Clear(if cave { CAVE_BACKDROP } else { SKY }));

    draw_terrain(world, view, surface);

    if let Some(ramp) = &world.ramp {
        let base = ramp.base_y;
        surface.blit(DrawCmd::Polygon {
            points: vec![
                view.point(ramp.start_x, base),
                view.point(ramp.end_x(), base - ramp.rise),
                view.point(ramp.end_x(), base - ramp.rise + RAMP_THICKNESS),
                view.point(ramp.end_x(), base),
            ],
            color: RAMP,
        });
    }

    for beacon in &world.beacons {
        if beacon.phase.is(BeaconPhase::RayShooting) || beacon.phase.is(BeaconPhase::SkyBurst) {
            let top = view.point(beacon.x - 6.0, beacon.ray_top_y);
            let bottom = view.point(beacon.x + 6.0, beacon.ray_origin_y);
            let mut color = BEACON_RAY;
            color[3] = beacon.ray_alpha / 255.0;
            surface.blit(DrawCmd::Rect {
                rect: Rect::new(top.x, top.y, bottom.x - top.x, bottom.y - top.y),
                color,
            });
        }
        if !beacon.is_removed() {
            surface.blit(DrawCmd::Sprite {
                name: "beacon",
                frame: beacon.phase.phase as u32,
                rect: view.rect(beacon.rect()),
                angle: 0.0,
            });
        }
    }

    if let Some(portal) = &world.portal {
        surface.blit(DrawCmd::Sprite {
            name: "portal",
            frame: portal.frame,
            rect: view.rect(portal.rect()),
            angle: 0.0,
        });
    }
    if let Some(stairs) = &world.stairs {
        surface.blit(DrawCmd::Sprite {
            name: "stairs",
            frame: 0,
            rect: view.rect(stairs.rect()),
            angle: 0.0,
        });
    }

    for obstacle in &world.obstacles {
        let (name, frame) = match &obstacle.kind {
            ObstacleKind::Ice(ice) if ice.state == EruptionState::Dormant => continue,
            ObstacleKind::Ice(ice) => ("ice", u32::from(ice.glint_remaining > 0.0)),
            ObstacleKind::Satellite(sat) => ("satellite", u32::from(sat.impacted)),
            ObstacleKind::Bug(bug) => ("bug", bug.frame),
            ObstacleKind::Crystal(_) => ("crystal", 0),
        };
        surface.blit(DrawCmd::Sprite {
            name,
            frame,
            rect: view.rect(obstacle.rect()),
            angle: 0.0,
        });
    }

    if let Some(boulder) = world.boulder.as_ref().filter(|_| world.escalation.boulder_visible) {
        surface.blit(DrawCmd::Sprite {
            name: "boulder",
            frame: 0,
            rect: view.rect(boulder.rect()),
            angle: boulder.rotation,
        });
    }

    for laser in &world.lasers {
        surface.blit(DrawCmd::Sprite {
            name: "laser",
            frame: 0,
            rect: view.rect(laser.rect()),
            angle: laser.angle(),
        });
    }

    draw_rider(world, view, surface);

    if world.stage == Stage::Level1 {
        let wall = ctx.avalanche.rect();
        surface.blit(DrawCmd::Rect {
            rect: Rect::new(wall.x + view.shake.x, wall.y, wall.w, wall.h),
            color: AVALANCHE,
        });
    }

    let announcer = &world.announcer;
    if announcer.state != AnnouncerState::Hidden {
        surface.blit(DrawCmd::Sprite {
            name: "announcer",
            frame: 0,
            rect: Rect::new(announcer.x, 40.0, 200.0, 120.0),
            angle: 0.0,
        });
        if let Some(message) = announcer.message {
            text(surface, message.text(), announcer.x, 170.0, 22.0, HUD_TEXT);
        }
    }

    if let Some(left) = world.win_sequence.remaining(world.time_ms) {
        let alpha = (1.0 - left / WIN_FLASH_MS).clamp(0.0, 1.0) as f32;
        surface.blit(DrawCmd::Rect {
            rect: Rect::new(0.0, 0.0, WIDTH, HEIGHT),
            color: [1.0, 1.0, 1.0, alpha],
        });
    }
}

fn draw_terrain(world: &World, view: View, surface: &mut impl Surface) {
    let terrain = &world.terrain;
    let x0 = terrain.first_sample_screen_x();
    let ground: Vec<Vec2> = terrain
        .heights()
        .enumerate()
        .map(|(i, h)| view.point(x0 + i as f32 * CHUNK, h))
        .collect();
    let (Some(first), Some(last)) = (ground.first().copied(), ground.last().copied()) else {
        return;
    };
    let cave = terrain.has_ceiling();

    let mut floor = ground;
    floor.push(Vec2::new(last.x, HEIGHT + 20.0));
    floor.push(Vec2::new(first.x, HEIGHT + 20.0));
    surface.blit(DrawCmd::Polygon {
        points: floor,
        color: if cave { CAVE_ROCK } else { SNOW },
    });

    if cave {
        let mut ceiling: Vec<Vec2> = (0..terrain.len())
            .map(|i| {
                let x = x0 + i as f32 * CHUNK;
                view.point(x, terrain.ceiling_height_at(x.clamp(0.0, WIDTH)))
            })
            .collect();
        ceiling.push(Vec2::new(last.x, -20.0));
        ceiling.push(Vec2::new(first.x, -20.0));
        surface.blit(DrawCmd::Polygon {
            points: ceiling,
            color: CAVE_ROCK,
        });
    }
}

fn draw_rider(world: &World, view: View, surface: &mut impl Surface) {
    let rider = &world.rider;
    if !rider.active || rider.hidden {
        return;
    }
    let rect = view.rect(rider.rect());
    let (name, frame) = match rider.dying {
        Some(d) if d.kind == DyingKind::Fatal => ("rider_dead", d.frame),
        Some(d) => ("rider_hit", d.frame),
        None => ("rider", rider.idle_frame),
    };
    surface.blit(DrawCmd::Sprite {
        name,
        frame,
        rect,
        angle: rider.display_angle(),
    });
    if let Some(shooting) = rider.shooting {
        surface.blit(DrawCmd::Sprite {
            name: "rider_shoot",
            frame: shooting.frame,
            rect,
            angle: rider.display_angle(),
        });
    }
}

fn draw_hud(ctx: &GameContext, surface: &mut impl Surface) {
    let world = &ctx.world;
    surface.blit(DrawCmd::Rect {
        rect: HEALTH_BAR,
        color: HEALTH_BACK,
    });
    let fill = ctx.player_health.clamp(0, MAX_PLAYER_HEALTH) as f32 / MAX_PLAYER_HEALTH as f32;
    surface.blit(DrawCmd::Rect {
        rect: Rect::new(HEALTH_BAR.x, HEALTH_BAR.y, HEALTH_BAR.w * fill, HEALTH_BAR.h),
        color: HEALTH_FILL,
    });
    text(
        surface,
        format!("Lasers: {}", world.rider.bullets_remaining),
        HEALTH_BAR.x,
        50.0,
        20.0,
        HUD_TEXT,
    );

    match world.stage {
        Stage::Tutorial => {
            let jump = if world.tutorial.jump_done { "[x]" } else { "[ ]" };
            let shoot = if world.tutorial.shoot_done { "[x]" } else { "[ ]" };
            text(surface, format!("{jump} Press SPACE to jump"), WIDTH / 2.0, 80.0, 24.0, HUD_TEXT);
            text(surface, format!("{shoot} Press F to shoot the ice"), WIDTH / 2.0, 110.0, 24.0, HUD_TEXT);
        }
        Stage::Level1 => {
            text(
                surface,
                format!(
                    "Checkpoints: {}/{}",
                    world.collected_checkpoints,
                    ctx.tuning.checkpoint_count()
                ),
                HEALTH_BAR.x,
                75.0,
                20.0,
                HUD_TEXT,
            );
        }
        Stage::Level2 => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::hazard::Boulder;
    use crate::tuning::Tuning;

    fn ctx_in(stage: Stage) -> GameContext {
        let mut ctx = GameContext::new(3, Tuning::default(), Settings::default());
        ctx.start_attempt(stage);
        ctx
    }

    #[test]
    fn test_menu_highlights_selection() {
        let mut ctx = GameContext::new(3, Tuning::default(), Settings::default());
        ctx.menu_selection = 2;
        let mut list = DrawList::default();
        draw_frame(&ctx, None, &mut list);
        let highlighted: Vec<_> = list
            .cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, color, .. } if *color == HUD_HIGHLIGHT => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(highlighted, vec!["Controls".to_string()]);
    }

    #[test]
    fn test_world_layers_back_to_front() {
        let ctx = ctx_in(Stage::Level1);
        let mut list = DrawList::default();
        draw_frame(&ctx, None, &mut list);
        assert_eq!(list.cmds[0], DrawCmd::Clear(SKY));
        assert!(matches!(list.cmds[1], DrawCmd::Polygon { .. }));
        let sprites: Vec<_> = list.sprites().collect();
        assert_eq!(sprites, vec!["rider"]);
    }

    #[test]
    fn test_rider_drawn_at_camera_target() {
        let ctx = ctx_in(Stage::Level1);
        let mut list = DrawList::default();
        draw_frame(&ctx, None, &mut list);
        let rect = list
            .cmds
            .iter()
            .find_map(|c| match c {
                DrawCmd::Sprite { name: "rider", rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!((rect.center_y() - PLAYER_TARGET_SCREEN_Y).abs() < 1e-3);
        assert!((rect.center_x() - PLAYER_SCREEN_X).abs() < 1e-3);
    }

    #[test]
    fn test_boulder_hidden_until_visible() {
        let mut ctx = ctx_in(Stage::Level2);
        let mut list = DrawList::default();
        draw_frame(&ctx, None, &mut list);
        assert!(!list.sprites().any(|s| s == "boulder"));

        ctx.world.escalation.boulder_visible = true;
        ctx.world.boulder = Some(Boulder::new(&ctx.world.terrain));
        list.clear();
        draw_frame(&ctx, None, &mut list);
        assert!(list.sprites().any(|s| s == "boulder"));
        assert!(list.cmds.iter().filter(|c| matches!(c, DrawCmd::Polygon { .. })).count() >= 2);
    }

    #[test]
    fn test_cutscene_blits_video_frame() {
        let mut ctx = GameContext::new(3, Tuning::default(), Settings::default());
        ctx.state = GameState::Prologue;
        let frame = VideoFrame {
            width: 960,
            height: 540,
            index: 4,
        };
        let mut list = DrawList::default();
        draw_frame(&ctx, Some(&frame), &mut list);
        assert_eq!(list.cmds.last(), Some(&DrawCmd::Video(frame)));
    }

    #[test]
    fn test_failed_screen_prompts_retry() {
        let mut ctx = ctx_in(Stage::Level1);
        ctx.state = GameState::Failed;
        let mut list = DrawList::default();
        draw_frame(&ctx, None, &mut list);
        assert!(list.texts().any(|t| t.contains("retry")));
    }
}
