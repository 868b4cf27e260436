//! tacmap - tactical map overview demo: a simulated skirmish drives the
//! radar/inset/full overview and a pack of shambler NPCs, rendered as
//! ASCII frames on stdout.

mod ai;
mod config;
mod events;
mod mapinfo;
mod overview;
mod shambler;
mod state;

use anyhow::Result;
use engine_core::{GameClock, Health, Team, Transform, Vec2, Vec3, Velocity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{AsciiCanvas, DrawList, TextureCatalog};

use config::Prefs;
use events::{EventQueue, GameEvent};
use mapinfo::MapInfo;
use overview::{DisplayMode, IconSet, MapOverview, RadarPanel};
use shambler::{Door, Shambler, SoundCue};
use state::{GameSnapshot, PlayerInfo, UserId};

/// Fixed simulation step, 60 Hz.
const TICK: f32 = 1.0 / 60.0;
/// Simulated match length in seconds.
const MATCH_LENGTH: f32 = 30.0;
/// One ASCII frame per this many seconds.
const FRAME_INTERVAL: f32 = 5.0;
/// Enemies within this range of any crimson player count as spotted.
const SPOT_RANGE: f32 = 600.0;

const MAP_INFO: &str = r#"(
    name: "outpost",
    texture: "overviews/outpost",
    origin: (-2048.0, 2048.0),
    scale: 4.0,
    goals: [
        (icon: "sprites/goal_flag", position: (512.0, -256.0, 0.0)),
        (icon: "sprites/goal_flag", position: (-768.0, 640.0, 0.0)),
    ],
)"#;

const TEXTURE_MANIFEST: &str = r#"(
    textures: [
        "overviews/outpost",
        "sprites/goal_flag",
        "sprites/player_crimson",
        "sprites/player_cobalt",
        "sprites/player_offscreen_crimson",
        "sprites/player_offscreen_cobalt",
        "sprites/player_dead_crimson",
        "sprites/player_dead_cobalt",
        "sprites/player_dead_offscreen_crimson",
        "sprites/player_dead_offscreen_cobalt",
        "sprites/player_self_crimson",
        "sprites/player_self_cobalt",
        "sprites/facing_pip",
        "sprites/voice_ring",
        "sprites/voice_ring_offscreen",
    ],
)"#;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting tacmap overview demo");

    let catalog = TextureCatalog::from_manifest(TEXTURE_MANIFEST)?;
    let map = MapInfo::from_ron(MAP_INFO)?;
    let prefs = Prefs::load();

    let mut overview = MapOverview::new(prefs, IconSet::load(&catalog));
    overview.set_map(&map, &catalog);
    overview.set_screen_size(Vec2::new(1280.0, 720.0));
    overview.set_radar_panel(RadarPanel {
        pos: Vec2::new(16.0, 16.0),
        size: Vec2::new(176.0, 176.0),
        visible: true,
    });

    let mut rng = StdRng::seed_from_u64(0x7ac);
    let mut world = World::new();
    let local = spawn_match(&mut world, &mut rng);

    let mut clock = GameClock::new();
    let mut queue = EventQueue::new();
    let mut cues: Vec<SoundCue> = Vec::new();
    let mut next_frame_at = FRAME_INTERVAL;

    while clock.now() < MATCH_LENGTH {
        clock.tick(TICK);

        simulate(&mut world, &clock, &mut rng, &mut queue, local);
        shambler::update_shamblers(&mut world, &clock, &mut rng, &mut cues);
        for cue in cues.drain(..) {
            log::debug!("cue {} at {:.0},{:.0}", cue.name, cue.position.x, cue.position.y);
        }

        let snapshot = GameSnapshot::capture(&world, Some(local));
        overview.update(&clock, &snapshot);
        if !queue.is_empty() {
            for event in queue.drain() {
                log::debug!("event {event:?}");
                overview.handle_event(&event);
            }
        }

        // While dead, flip the spectating view to the fullscreen map.
        if clock.frame_count() == 1260 {
            overview.request_mode(DisplayMode::Full);
        }

        if clock.now() >= next_frame_at {
            next_frame_at += FRAME_INTERVAL;
            for (_, shambler) in world.query::<&Shambler>().iter() {
                log::debug!(
                    "shambler {:?} conditions {:?}",
                    shambler.schedule_id(),
                    shambler.conditions()
                );
            }
            if overview.should_draw() {
                let mut list = DrawList::new();
                overview.draw(&mut list);
                let panel = overview.panel_size();
                let mut canvas = AsciiCanvas::new(64, 24, panel);
                canvas.replay(&list);
                let pos = overview.panel_pos();
                println!(
                    "t={:.1}s mode={:?} panel={}x{} at {},{}",
                    clock.now(),
                    overview.mode(),
                    panel.x as i32,
                    panel.y as i32,
                    pos.x as i32,
                    pos.y as i32
                );
                println!("{}", canvas.render());
            } else {
                println!("t={:.1}s overview hidden", clock.now());
            }
        }
    }

    overview.prefs().save();
    log::info!("Demo finished after {:.1}s", clock.now());
    Ok(())
}

/// Populate the world: two squads, a couple of doors, and shamblers.
/// Returns the local player's identity.
fn spawn_match(world: &mut World, rng: &mut StdRng) -> UserId {
    let local = UserId(1);
    world.spawn((
        PlayerInfo::new(local, "rico"),
        Transform::from_position_yaw(Vec3::new(-400.0, -200.0, 0.0), 45.0),
        Velocity::default(),
        Health::new(100),
        Team::Crimson,
    ));
    for (id, name, pos) in [
        (2, "dizzy", Vec3::new(-480.0, -120.0, 0.0)),
        (3, "ace", Vec3::new(-320.0, -280.0, 0.0)),
    ] {
        world.spawn((
            PlayerInfo::new(UserId(id), name),
            Transform::from_position(pos),
            Velocity::default(),
            Health::new(100),
            Team::Crimson,
        ));
    }
    for (id, name, pos) in [
        (10, "raider-1", Vec3::new(700.0, 500.0, 0.0)),
        (11, "raider-2", Vec3::new(820.0, 380.0, 120.0)),
        (12, "raider-3", Vec3::new(600.0, 660.0, -150.0)),
    ] {
        world.spawn((
            PlayerInfo::new(UserId(id), name),
            Transform::from_position(pos),
            Velocity::default(),
            Health::new(100),
            Team::Cobalt,
        ));
    }

    world.spawn((
        Door { open: false },
        Transform::from_position(Vec3::new(100.0, 100.0, 0.0)),
        Health::new(30),
    ));
    for _ in 0..3 {
        let pos = Vec3::new(rng.gen_range(-200.0..600.0), rng.gen_range(-200.0..600.0), 0.0);
        world.spawn((Shambler::new(rng), Transform::from_position(pos), Health::new(150)));
    }

    local
}

/// Scripted skirmish: everyone drifts, enemies get spotted by proximity,
/// somebody talks, somebody dies, and the round resets near the end.
fn simulate(
    world: &mut World,
    clock: &GameClock,
    rng: &mut StdRng,
    queue: &mut EventQueue,
    local: UserId,
) {
    let now = clock.now();
    let dt = clock.delta_seconds();

    // Wander everyone a little, smoothing the drift through velocity.
    for (_, (info, transform, velocity)) in
        world.query_mut::<(&PlayerInfo, &mut Transform, &mut Velocity)>()
    {
        let drift = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        velocity.linear = velocity.linear * 0.9 + drift * 30.0 * 0.1;
        transform.position += velocity.linear * dt;
        if info.user_id == local {
            transform.yaw = (transform.yaw + 10.0 * dt) % 360.0;
        }
    }

    // Proximity spotting: crimson eyes on cobalt raiders.
    let crimson: Vec<Vec3> = world
        .query::<(&Transform, &Team, &Health)>()
        .iter()
        .filter(|(_, (_, team, health))| **team == Team::Crimson && !health.is_dead())
        .map(|(_, (t, _, _))| t.position)
        .collect();
    for (_, (info, transform, team)) in
        world.query_mut::<(&mut PlayerInfo, &Transform, &Team)>()
    {
        if *team != Team::Cobalt {
            continue;
        }
        info.spotted = crimson
            .iter()
            .any(|eye| eye.distance(transform.position) < SPOT_RANGE);
    }

    // One-shot scripted beats.
    let frame = clock.frame_count();
    if frame == 120 {
        queue.push(GameEvent::VoiceFlash { user_id: UserId(2) });
        set_speaking(world, UserId(2), true);
    }
    if frame == 240 {
        set_speaking(world, UserId(2), false);
    }
    if frame == 600 {
        kill_player(world, UserId(11));
        queue.push(GameEvent::PlayerDeath { user_id: UserId(11) });
    }
    if frame == 900 {
        log::info!("raider-3 switches to {}", Team::Crimson.name());
        queue.push(GameEvent::PlayerTeam {
            user_id: UserId(12),
            team: Team::Crimson,
        });
    }
    if frame == 450 {
        // A physics prop clatters through the pack.
        for (_, shambler) in world.query_mut::<&mut Shambler>() {
            shambler.notify_physics_damage();
        }
    }
    if frame == 1200 {
        kill_player(world, local);
        queue.push(GameEvent::PlayerDeath { user_id: local });
    }
    if frame == 1500 {
        for (_, health) in world.query_mut::<&mut Health>() {
            health.heal(health.max);
        }
        queue.push(GameEvent::RoundReset);
        log::info!("round reset at t={:.1}s", now);
    }
}

fn set_speaking(world: &mut World, id: UserId, speaking: bool) {
    for (_, info) in world.query_mut::<&mut PlayerInfo>() {
        if info.user_id == id {
            info.speaking = speaking;
        }
    }
}

fn kill_player(world: &mut World, id: UserId) {
    for (_, (info, health)) in world.query_mut::<(&PlayerInfo, &mut Health)>() {
        if info.user_id == id {
            health.current = 0;
        }
    }
}
