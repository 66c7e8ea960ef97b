//! Freerun - Headless Parkour Sandbox
//!
//! Runs a body through a scripted course: vault a rail, slide, then run
//! along a wall and jump off it. Locomotion label changes are logged as
//! they happen.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec3;

use freerun_locomotion::{
    JumpOutcome, LocalServices, MontagePlayer, ParkourConfig, ParkourMovement,
};
use freerun_physics::{BodyConfig, CharacterBody, CollisionWorld, ContentFlags, LocomotionBody};

const DT: f32 = 1.0 / 60.0;

/// Rail the runner vaults over.
const RAIL_X: f32 = 300.0;
/// Where the slide starts.
const SLIDE_X: f32 = 800.0;
/// Wall beside the course, face at z = 60.
const WALL_START_X: f32 = 1600.0;
const WALL_END_X: f32 = 2800.0;
/// Where the runner leaves the wall.
const WALL_JUMP_X: f32 = 2200.0;

/// Gap between the capsule and the rail face that triggers the vault.
const VAULT_TRIGGER_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    Default,
    Arcade,
    Grounded,
}

impl Preset {
    fn config(self) -> ParkourConfig {
        match self {
            Preset::Default => ParkourConfig::default(),
            Preset::Arcade => ParkourConfig::arcade(),
            Preset::Grounded => ParkourConfig::grounded(),
        }
    }
}

/// Headless parkour sandbox
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON tuning file; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in tuning
    #[arg(short, long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Simulation ticks at 60 Hz
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Cue {
    Jump,
    CrouchPress,
    CrouchRelease,
}

fn build_course() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_block(Vec3::new(2000.0, -100.0, 0.0), 4000.0, 1000.0, 100.0, ContentFlags::SOLID);
    world.add_block(Vec3::new(RAIL_X + 10.0, 0.0, 0.0), 10.0, 300.0, 80.0, ContentFlags::SOLID);
    world.add_box(
        Vec3::new((WALL_START_X + WALL_END_X) * 0.5, 400.0, 110.0),
        Vec3::new((WALL_END_X - WALL_START_X) * 0.5, 400.0, 50.0),
        ContentFlags::SOLID,
    );
    world
}

/// Cues fired once the body passes an x coordinate, in order.
fn script() -> Vec<(f32, Cue)> {
    vec![
        (SLIDE_X, Cue::CrouchPress),
        (SLIDE_X + 400.0, Cue::CrouchRelease),
        (WALL_START_X + 50.0, Cue::Jump),
        (WALL_JUMP_X, Cue::Jump),
    ]
}

/// Position along the traversal path for clip progress `t`: up to the start
/// target over the first half, then across to the end target.
fn warp_path(origin: Vec3, start: Vec3, end: Vec3, t: f32) -> Vec3 {
    if t < 0.5 {
        origin.lerp(start, t * 2.0)
    } else {
        start.lerp(end, (t - 0.5) * 2.0)
    }
}

struct TraversalPath {
    origin: Vec3,
    start: Vec3,
    end: Vec3,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => ParkourConfig::load(path)
            .with_context(|| format!("loading parkour config from {}", path.display()))?,
        None => args.preset.config(),
    };

    let world = build_course();
    let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
    body.spawn_at(Vec3::new(0.0, 90.0, 0.0), &world);
    body.set_input(Vec3::X);

    let animation = MontagePlayer::new(0.6)
        .with_clip(config.traversal.vault_clip.clone(), 0.5)
        .with_clip(config.traversal.mantle_clip.clone(), 0.9);
    let mut services = LocalServices::new(animation);
    let start_target = config.traversal.start_warp_target.clone();
    let end_target = config.traversal.end_warp_target.clone();

    let mut movement = ParkourMovement::bind(body, config);
    let script = script();
    let mut next_cue = 0;
    let mut path: Option<TraversalPath> = None;

    log::info!("running {} ticks", args.ticks);

    for frame in 0..args.ticks {
        let x = movement.body().location().x;

        if !movement.is_traversing() && near_traversable(&movement, &world) {
            jump(&mut movement, &mut services, &world, frame);
        }

        while let Some(&(at_x, cue)) = script.get(next_cue) {
            if x < at_x {
                break;
            }
            next_cue += 1;
            log::info!("[{frame:4}] cue {cue:?} at x={x:.0}");
            match cue {
                Cue::Jump => jump(&mut movement, &mut services, &world, frame),
                Cue::CrouchPress => movement.handle_crouch_input(true, &mut services.context(&world)),
                Cue::CrouchRelease => movement.handle_crouch_input(false, &mut services.context(&world)),
            }
        }

        if movement.is_traversing() && path.is_none() {
            let lift = -movement.body().gravity_direction() * movement.body().capsule().scaled_half_height();
            let start = services.warp_targets.get(&start_target).map(|target| target.position);
            let end = services.warp_targets.get(&end_target).map(|target| target.position);
            if let (Some(start), Some(end)) = (start, end) {
                path = Some(TraversalPath {
                    origin: movement.body().location(),
                    start: start + lift,
                    end: end + lift,
                });
            }
        }
        if let (Some(path), Some(progress)) = (&path, services.animation.progress()) {
            let location = warp_path(path.origin, path.start, path.end, progress);
            movement.body_mut().set_location(location);
        }

        movement.tick(DT, &mut services.context(&world));

        if let Some(finished) = services.advance(DT) {
            log::info!("[{frame:4}] clip {} finished", finished.clip);
            if let Some(path) = path.take() {
                movement.body_mut().set_location(path.end);
            }
            movement.reset_traversal(&mut services.context(&world));
        }

        for change in movement.take_changes() {
            log::info!("[{frame:4}] {change:?}");
        }
        log::trace!(
            "[{frame:4}] at {:?} moving {:?} roll {:.1}",
            movement.body().location(),
            movement.body().velocity(),
            movement.camera_roll()
        );
    }

    movement.teardown(&mut services.context(&world));

    let body = movement.body();
    println!(
        "finished at {:?} with speed {:.0}, mode {:?}, stance {}, action {:?}",
        body.location(),
        body.velocity().length(),
        movement.locomotion_mode(),
        movement.stance(),
        movement.action()
    );
    Ok(())
}

/// Whether an obstacle is close enough ahead to vault or mantle.
fn near_traversable(movement: &ParkourMovement<CharacterBody>, world: &CollisionWorld) -> bool {
    let result = movement.check_for_traversal(world);
    if !result.found {
        return false;
    }
    let body = movement.body();
    let gap = (result.front_edge - body.location()).dot(body.forward_vector()) - body.capsule().scaled_radius();
    gap <= VAULT_TRIGGER_GAP
}

fn jump(
    movement: &mut ParkourMovement<CharacterBody>,
    services: &mut LocalServices,
    world: &CollisionWorld,
    frame: u32,
) {
    let outcome = movement.do_jump(&mut services.context(world));
    if outcome == JumpOutcome::Rejected {
        log::warn!("[{frame:4}] jump rejected");
    } else {
        log::info!("[{frame:4}] jump: {outcome:?}");
    }
}
