//! One frame of live gameplay (Playing and Tutorial)
//!
//! Order per frame: actions, scroll (terrain, spawns, obstacles, beacons,
//! gates), rider, lasers, laser hits, rider hits, boulder, avalanche,
//! checkpoints and portal, cave script, announcer, camera. Obstacle hits
//! resolve before the boulder, so a frame with both applies obstacle
//! damage first.

use super::announcer::{ANNOUNCER_DISPLAY_MS, Message};
use super::beacon::Beacon;
use super::camera::AVALANCHE_RUMBLE_SHAKE;
use super::event::{GameEvent, LoopId, SoundCue};
use super::gate::{Portal, Stairs};
use super::hazard::Chase;
use super::laser::{Laser, select_target};
use super::obstacle::{DestroyInfo, Obstacle, ObstacleEnv, ObstacleType};
use super::ramp::Ramp;
use super::spawn::SpawnPlan;
use super::state::{GameContext, PORTAL_MUSIC_FADE_MS};
use super::world::{
    BOULDER_DEATH_DELAY_MS, CAVE_BUG_WARNING_MS, CAVE_HALFWAY_MS, CAVE_STAIRS_AHEAD_MS,
    PORTAL_OUTCOME_DELAY_MS, Stage, TUTORIAL_COMPLETE_DELAY_MS, WIN_FLASH_MS,
};
use crate::consts::*;
use crate::frame_scale;

/// Beacons and the final ramp appear just past the right edge
pub const CHECKPOINT_SPAWN_X: f32 = WIDTH + 50.0;
pub const PORTAL_SPAWN_X: f32 = WIDTH + 100.0;

/// Player intents for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub jump: bool,
    pub shoot: bool,
}

/// What the controller should do after the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldOutcome {
    Continue,
    Failed,
    /// Portal reached with every checkpoint collected
    MidCutscene,
    /// Stairs reached and the white flash finished
    WinCutscene,
    TutorialComplete,
}

pub fn update_world(ctx: &mut GameContext, actions: Actions, dt: f32) -> WorldOutcome {
    ctx.world.time_ms += dt as f64 * 1000.0;
    let now = ctx.world.time_ms;

    handle_actions(ctx, actions);

    if ctx.world.boulder_death.is_armed() {
        return update_boulder_death(ctx, dt);
    }
    if ctx.world.portal_outcome.is_armed() {
        update_camera(ctx, dt);
        if !ctx.world.portal_outcome.expired(now) {
            return WorldOutcome::Continue;
        }
        ctx.world.portal_outcome.clear();
        return if ctx.world.all_checkpoints_collected(&ctx.tuning) {
            WorldOutcome::MidCutscene
        } else {
            log::info!("Portal reached without every checkpoint");
            WorldOutcome::Failed
        };
    }
    if ctx.world.win_sequence.is_armed() {
        update_camera(ctx, dt);
        if ctx.world.win_sequence.expired(now) {
            ctx.world.win_sequence.clear();
            return WorldOutcome::WinCutscene;
        }
        return WorldOutcome::Continue;
    }

    let in_tutorial = ctx.world.stage == Stage::Tutorial;
    if ctx.world.slowdown.expired(now) {
        ctx.world.slowdown.clear();
    }
    let scroll = scroll_this_frame(ctx, dt);

    if !ctx.world.waiting_for_death_anim {
        ctx.world.camera.advance(scroll);
        ctx.world.terrain.update(scroll);
        spawn_obstacles(ctx);
        update_obstacles(ctx, scroll, in_tutorial, dt);
        update_scenery(ctx, scroll, dt);
    }

    {
        let world = &mut ctx.world;
        let report = world.rider.update(&world.terrain, world.ramp.as_ref(), dt);
        if report.landed {
            ctx.events.push(GameEvent::Sound(SoundCue::Land));
        }
    }

    update_lasers(ctx, dt);
    resolve_laser_hits(ctx);
    resolve_rider_hits(ctx);
    update_boulder(ctx, dt);

    if update_avalanche(ctx, in_tutorial, dt) {
        return WorldOutcome::Failed;
    }

    update_checkpoints(ctx);
    update_cave_script(ctx);
    update_stairs_trigger(ctx);
    ctx.world.announcer.update(now, dt);
    update_portal_flow(ctx);
    update_camera(ctx, dt);
    cleanup(ctx);

    let world = &mut ctx.world;
    if world.waiting_for_death_anim && !world.rider.is_dying() {
        log::info!("Death animation finished");
        world.waiting_for_death_anim = false;
        return WorldOutcome::Failed;
    }

    if in_tutorial {
        if world.tutorial.objectives_met() && !world.tutorial.complete.is_armed() {
            log::info!("Tutorial objectives complete");
            world.tutorial.complete.arm(now, TUTORIAL_COMPLETE_DELAY_MS);
        }
        if world.tutorial.complete.expired(now) {
            return WorldOutcome::TutorialComplete;
        }
    }
    WorldOutcome::Continue
}

fn scroll_this_frame(ctx: &GameContext, dt: f32) -> f32 {
    let world = &ctx.world;
    if world.stage == Stage::Tutorial || world.waiting_for_death_anim {
        return 0.0;
    }
    let base = PLAYER_DOWNHILL_SPEED * frame_scale(dt);
    if world.is_slowed() && !world.stairs_visible {
        base * SLOWDOWN_FACTOR
    } else {
        base
    }
}

fn handle_actions(ctx: &mut GameContext, actions: Actions) {
    let rider = &ctx.world.rider;
    if !rider.active || rider.hidden || ctx.world.input_locked() {
        return;
    }
    if actions.jump && ctx.world.rider.perform_jump() {
        ctx.events.push(GameEvent::Sound(SoundCue::Jump));
        if ctx.world.stage == Stage::Tutorial {
            ctx.world.tutorial.jump_done = true;
        }
    }
    if actions.shoot {
        try_shoot(ctx);
    }
}

/// Fire a laser if the rider has ammo, is off cooldown and not dying
pub fn try_shoot(ctx: &mut GameContext) -> bool {
    let world = &mut ctx.world;
    let rider = &world.rider;
    if rider.bullets_remaining == 0 || rider.is_dying() || !rider.active || rider.hidden {
        return false;
    }
    if let Some(last) = world.last_shot_ms
        && world.time_ms - last < SHOT_COOLDOWN_MS
    {
        return false;
    }

    let origin = world.muzzle();
    let target = if world.stage == Stage::Tutorial {
        world
            .obstacles
            .iter()
            .find(|o| !o.dead)
            .map(|o| (o.id, o.rect().center()))
    } else {
        select_target(&world.obstacles, origin, world.stage.is_cave())
    };
    world.lasers.push(Laser::new(origin, target));
    world.rider.bullets_remaining -= 1;
    world.rider.start_shooting_animation();
    world.last_shot_ms = Some(world.time_ms);
    ctx.events.push(GameEvent::Sound(SoundCue::Shoot));
    true
}

fn spawn_obstacles(ctx: &mut GameContext) {
    let GameContext {
        world,
        rng,
        events,
        tuning,
        ..
    } = ctx;
    let allowed = world.rider.active
        && match world.stage {
            Stage::Tutorial => false,
            Stage::Level1 => {
                world.checkpoint_idx < tuning.checkpoint_count() && !world.portal_spawned
            }
            Stage::Level2 => !world.stairs_visible,
        };
    if !allowed {
        return;
    }
    let live = world.obstacles.iter().filter(|o| !o.dead).count();
    let Some(SpawnPlan { kind, x }) = world.spawner.poll(world.time_ms, live, tuning, rng) else {
        return;
    };
    let id = world.next_obstacle_id();
    let obstacle = match kind {
        ObstacleType::Ice => Obstacle::ice(id, x, &world.terrain, rng),
        ObstacleType::Satellite => {
            events.push(GameEvent::LoopStart(LoopId::SatelliteFall(id)));
            Obstacle::satellite(id, x, &world.terrain)
        }
        ObstacleType::Bug => {
            events.push(GameEvent::Sound(SoundCue::BugSpawn));
            events.push(GameEvent::LoopStart(LoopId::BugSpawn(id)));
            Obstacle::bug(id, x, &world.terrain)
        }
        ObstacleType::Crystal => Obstacle::crystal(id, x, &world.terrain),
    };
    world.obstacles.push(obstacle);
}

fn update_obstacles(ctx: &mut GameContext, scroll: f32, in_tutorial: bool, dt: f32) {
    let GameContext {
        world, rng, events, ..
    } = ctx;
    let env = ObstacleEnv {
        terrain: &world.terrain,
        scroll_dx: scroll,
        in_tutorial,
        player_x: world.rider.x,
        dt,
    };
    for obstacle in world.obstacles.iter_mut().filter(|o| !o.dead) {
        if let Some(shake) = obstacle.update(&env, rng, events).shake {
            world.camera.shake.request(shake);
        }
    }
}

/// Beacons, portal, stairs and ramp ride along with the scroll
fn update_scenery(ctx: &mut GameContext, scroll: f32, dt: f32) {
    let GameContext { world, events, .. } = ctx;
    for beacon in &mut world.beacons {
        if beacon.update(scroll, &world.terrain, world.time_ms, dt) {
            events.push(GameEvent::Sound(SoundCue::BeaconIgnite));
        }
    }
    if let Some(portal) = &mut world.portal {
        portal.update(scroll, &world.terrain, dt);
    }
    if let Some(stairs) = &mut world.stairs {
        stairs.update(scroll, &world.terrain);
    }
    if let Some(ramp) = &mut world.ramp {
        ramp.update(scroll, &world.terrain);
    }
}

fn update_lasers(ctx: &mut GameContext, dt: f32) {
    let world = &mut ctx.world;
    let camera_y = world.camera.y_offset;
    for laser in &mut world.lasers {
        let target = laser
            .target
            .and_then(|id| world.obstacles.iter().find(|o| o.id == id && !o.dead))
            .map(|o| o.rect().center());
        laser.update(target, camera_y, dt);
    }
}

fn push_destroy_effects(events: &mut Vec<GameEvent>, info: &DestroyInfo) {
    events.push(GameEvent::Debris {
        material: info.material,
        x: info.x,
        y: info.y,
    });
    if info.kind == ObstacleType::Satellite {
        events.push(GameEvent::Explosion {
            x: info.x,
            y: info.y,
        });
    }
}

fn resolve_laser_hits(ctx: &mut GameContext) {
    let GameContext { world, events, .. } = ctx;
    let mut kills = 0;
    for laser in world.lasers.iter_mut().filter(|l| !l.dead) {
        let r = laser.rect();
        let Some(obstacle) = world
            .obstacles
            .iter_mut()
            .find(|o| !o.dead && o.is_destructible() && o.rect().overlaps(&r))
        else {
            continue;
        };
        laser.dead = true;
        let info = obstacle.on_destroy(events);
        push_destroy_effects(events, &info);
        kills += 1;
    }
    if kills == 0 {
        return;
    }
    match world.stage {
        Stage::Level2 => world.escalation.record_kill(),
        Stage::Tutorial => world.tutorial.shoot_done = true,
        Stage::Level1 => {}
    }
}

fn resolve_rider_hits(ctx: &mut GameContext) {
    let GameContext {
        world,
        events,
        player_health,
        ..
    } = ctx;
    if !world.rider.active || world.rider.hidden {
        return;
    }
    let rider_rect = world.rider.rect();
    let mut hit = false;
    for obstacle in world.obstacles.iter_mut().filter(|o| !o.dead) {
        if !obstacle.rect().overlaps(&rider_rect) {
            continue;
        }
        hit = true;
        *player_health -= obstacle.damage();
        let fatal = *player_health <= 0;
        world.rider.start_dying_animation(fatal);
        events.push(GameEvent::Sound(SoundCue::Hit));
        let info = obstacle.on_destroy(events);
        push_destroy_effects(events, &info);
        log::debug!(
            "Rider hit {:?}, health now {}",
            info.kind,
            (*player_health).max(0)
        );
        if world.stage.is_cave() {
            world.escalation.record_hit();
        }
    }
    if !hit {
        return;
    }
    world.slowdown.arm(world.time_ms, SLOWDOWN_DURATION_MS);
    if *player_health <= 0 && !world.waiting_for_death_anim {
        *player_health = 0;
        world.waiting_for_death_anim = true;
        events.push(GameEvent::StopMusic);
        log::info!("Rider out of health");
    }
}

fn update_boulder(ctx: &mut GameContext, dt: f32) {
    let GameContext {
        world,
        events,
        player_health,
        ..
    } = ctx;
    let Some(boulder) = world.boulder.as_mut() else {
        return;
    };
    boulder.update(world.escalation.catch_up, &world.terrain, dt);
    if boulder.has_appeared() && !world.escalation.boulder_visible {
        log::info!("Boulder rolled into view");
        world.escalation.boulder_visible = true;
    }

    let crushed = world.escalation.boulder_visible
        && world.rider.active
        && *player_health > 0
        && boulder.collision_rect().overlaps(&world.rider.rect());
    if crushed {
        log::info!("Boulder crushed the rider");
        *player_health = 0;
        world.rider.start_dying_animation(true);
        world.waiting_for_death_anim = true;
        world.boulder_death.arm(world.time_ms, BOULDER_DEATH_DELAY_MS);
        events.push(GameEvent::StopMusic);
        events.push(GameEvent::Sound(SoundCue::BoulderCrush));
    }

    let want_rumble = world.escalation.boulder_visible
        && !world.waiting_for_death_anim
        && !world.boulder_death.is_armed()
        && !world.win_sequence.is_armed();
    if let Some(boulder) = world.boulder.as_mut()
        && want_rumble != boulder.rumble_playing
    {
        boulder.rumble_playing = want_rumble;
        events.push(if want_rumble {
            GameEvent::LoopStart(LoopId::BoulderRumble)
        } else {
            GameEvent::LoopStop(LoopId::BoulderRumble)
        });
    }
}

/// Rider keeps animating while the world holds still, then Failed
fn update_boulder_death(ctx: &mut GameContext, dt: f32) -> WorldOutcome {
    {
        let world = &mut ctx.world;
        world.rider.update(&world.terrain, world.ramp.as_ref(), dt);
        if let Some(boulder) = world.boulder.as_mut() {
            boulder.update(false, &world.terrain, dt);
        }
    }
    update_camera(ctx, dt);
    let world = &mut ctx.world;
    if world.boulder_death.expired(world.time_ms) {
        world.boulder_death.clear();
        world.waiting_for_death_anim = false;
        return WorldOutcome::Failed;
    }
    WorldOutcome::Continue
}

/// Returns true when the wall caught the rider
fn update_avalanche(ctx: &mut GameContext, in_tutorial: bool, dt: f32) -> bool {
    let chase = if in_tutorial {
        Chase::Tutorial
    } else {
        Chase::Race {
            final_stretch: ctx.world.all_checkpoints_collected(&ctx.tuning),
        }
    };
    let out = ctx
        .avalanche
        .update(ctx.world.rider.x, chase, dt, &mut ctx.events);
    if out.shake_requested {
        ctx.world.camera.shake.request(AVALANCHE_RUMBLE_SHAKE);
    }
    out.caught
}

fn update_checkpoints(ctx: &mut GameContext) {
    let GameContext {
        world,
        events,
        tuning,
        ..
    } = ctx;
    if world.stage != Stage::Level1 || !world.rider.active {
        return;
    }
    let count = tuning.checkpoint_count();
    let rider_rect = world.rider.rect();

    for beacon in &mut world.beacons {
        if beacon.collected || !beacon.rect().overlaps(&rider_rect) {
            continue;
        }
        if !beacon.collect(world.time_ms) {
            continue;
        }
        world.collected_checkpoints += 1;
        let n = world.collected_checkpoints;
        log::info!("Checkpoint {}/{} collected", n, count);
        events.push(GameEvent::Sound(SoundCue::Checkpoint));
        world
            .announcer
            .show(Message::Node(n as u32), ANNOUNCER_DISPLAY_MS);
        if n == count {
            world.portal_message_pending = true;
            world.portal_spawn_pending = true;
            if !world.final_ramp_spawned {
                world.ramp = Some(Ramp::new(CHECKPOINT_SPAWN_X, &world.terrain, true));
                world.final_ramp_spawned = true;
            }
        }
    }

    let entered = world
        .portal
        .as_ref()
        .is_some_and(|p| p.rect().overlaps(&rider_rect));
    if entered {
        log::info!("Rider reached the portal");
        world.rider.active = false;
        world.portal = None;
        world.portal_outcome.arm(world.time_ms, PORTAL_OUTCOME_DELAY_MS);
        events.push(GameEvent::Sound(SoundCue::PortalEnter));
        events.push(GameEvent::FadeOutMusic {
            ms: PORTAL_MUSIC_FADE_MS,
        });
        return;
    }

    if world.checkpoint_idx < count
        && world.camera.world_distance >= tuning.checkpoint_distances[world.checkpoint_idx]
    {
        log::debug!(
            "Beacon {} spawned at distance {:.1}",
            world.checkpoint_idx + 1,
            world.camera.world_distance
        );
        world.beacons.push(Beacon::new(
            CHECKPOINT_SPAWN_X,
            &world.terrain,
            world.time_ms,
        ));
        world.checkpoint_idx += 1;
    }
}

fn update_cave_script(ctx: &mut GameContext) {
    let GameContext { world, events, .. } = ctx;
    if world.stage != Stage::Level2
        || !world.rider.active
        || world.sequence_active()
        || world.stairs_visible
        || !world.announcer.is_hidden()
    {
        return;
    }
    let t = world.time_ms;
    let script = &mut world.cave_script;
    let message = if !script.bug_warning_done && t >= CAVE_BUG_WARNING_MS {
        script.bug_warning_done = true;
        Message::BugWarning
    } else if !script.halfway_done && t >= CAVE_HALFWAY_MS {
        script.halfway_done = true;
        Message::Halfway
    } else if !script.stairs_ahead_done && script.bug_warning_done && t >= CAVE_STAIRS_AHEAD_MS {
        script.stairs_ahead_done = true;
        Message::StairsAhead
    } else {
        return;
    };
    events.push(GameEvent::Sound(SoundCue::Announcer));
    world.announcer.show(message, ANNOUNCER_DISPLAY_MS);
}

fn update_stairs_trigger(ctx: &mut GameContext) {
    let GameContext { world, events, .. } = ctx;
    if world.stage != Stage::Level2 || !world.rider.active {
        return;
    }
    if !world.stairs_visible && !world.sequence_active() {
        let in_range = world
            .boulder
            .as_ref()
            .is_some_and(|b| b.in_win_range(world.rider.x));
        if in_range && world.escalation.boulder_visible {
            log::info!("Boulder closing in, stairs ahead");
            world.stairs_visible = true;
            world.stairs = Some(Stairs::new(world.rider.x + WIDTH, &world.terrain));
        }
    }
    if world.win_sequence.is_armed() || world.rider.hidden {
        return;
    }
    let entered = world
        .stairs
        .as_ref()
        .is_some_and(|s| s.is_entered_by(&world.rider.rect()));
    if entered {
        log::info!("Rider entered the stairs");
        world.rider.hidden = true;
        world.win_sequence.arm(world.time_ms, WIN_FLASH_MS);
        events.push(GameEvent::FadeOutMusic {
            ms: WIN_FLASH_MS as u32,
        });
        if world.boulder.as_ref().is_some_and(|b| b.rumble_playing) {
            events.push(GameEvent::LoopStop(LoopId::BoulderRumble));
        }
        if let Some(boulder) = world.boulder.as_mut() {
            boulder.rumble_playing = false;
        }
    }
}

/// Portal message first, then the portal itself once the announcer leaves
fn update_portal_flow(ctx: &mut GameContext) {
    let GameContext { world, events, .. } = ctx;
    if world.stage != Stage::Level1 {
        return;
    }
    if world.portal_message_pending && world.announcer.is_hidden() {
        world.portal_message_pending = false;
        world.announcer.show(Message::Portal, ANNOUNCER_DISPLAY_MS);
        events.push(GameEvent::Sound(SoundCue::Announcer));
    }
    if world.announcer.is_hidden() && world.portal_spawn_pending && !world.portal_spawned {
        log::info!("Portal spawned");
        world.portal = Some(Portal::new(PORTAL_SPAWN_X, &world.terrain));
        world.portal_spawn_pending = false;
        world.portal_spawned = true;
    }
}

fn update_camera(ctx: &mut GameContext, dt: f32) {
    let GameContext {
        world,
        rng,
        settings,
        avalanche,
        ..
    } = ctx;
    world.camera.follow(world.rider.y);
    let continuous = if world.stage == Stage::Tutorial {
        0.0
    } else {
        avalanche.shake
    };
    world
        .camera
        .update_shake(dt, continuous, settings.effective_screen_shake(), rng);
}

fn cleanup(ctx: &mut GameContext) {
    let world = &mut ctx.world;
    world.obstacles.retain(|o| !o.dead);
    world.lasers.retain(|l| !l.dead);
    world.beacons.retain(|b| !b.is_removed());
    if world.portal.as_ref().is_some_and(|p| p.dead) {
        world.portal = None;
    }
    if world.ramp.as_ref().is_some_and(|r| r.is_off_screen()) {
        world.ramp = None;
    }
}
