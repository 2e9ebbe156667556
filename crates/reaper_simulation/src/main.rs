//! Headless симуляция REAPER
//!
//! Гоняет CharacterController со случайным (seeded) input: сначала в
//! SandboxWorld, затем тот же контроллер внутри Bevy + Rapier.
//! Один seed = один и тот же прогон.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use reaper_simulation::physics::rapier::Surface;
use reaper_simulation::plugin::{spawn_level_box, spawn_locomotion_character};
use reaper_simulation::{
    create_headless_app, init_logger, log_error, log_info, log_warning, run_fixed_tick,
    CharacterController, DeterministicRng, InputSample, LocomotionController, LocomotionTuning,
    PlayerInput, SandboxWorld, SurfaceTag, SIMULATION_HZ,
};

const TUNING_PATH: &str = "assets/locomotion.ron";
const TICKS: u32 = 1000;
const RAPIER_TICKS: u32 = 300;

/// Случайный input на один tick (edge-кнопки редкие)
fn random_input(rng: &mut ChaCha8Rng) -> InputSample {
    let axis = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-0.2..=1.0));
    InputSample {
        move_axis: if rng.gen_bool(0.8) { axis } else { Vec2::ZERO },
        look_delta: Vec2::new(rng.gen_range(-20.0..=20.0), rng.gen_range(-5.0..=5.0)),
        jump: rng.gen_bool(0.03),
        crouch_toggle: rng.gen_bool(0.01),
        dash: rng.gen_bool(0.01),
        attack: rng.gen_bool(0.02),
        grapple: rng.gen_bool(0.01),
    }
}

/// Арена: пол, стены по периметру, пара врагов
fn build_arena() -> SandboxWorld {
    let mut world = SandboxWorld::with_floor(60.0);
    for (center, half) in [
        (Vec3::new(0.0, 5.0, -40.0), Vec3::new(40.0, 10.0, 1.0)),
        (Vec3::new(0.0, 5.0, 40.0), Vec3::new(40.0, 10.0, 1.0)),
        (Vec3::new(-40.0, 5.0, 0.0), Vec3::new(1.0, 10.0, 40.0)),
        (Vec3::new(40.0, 5.0, 0.0), Vec3::new(1.0, 10.0, 40.0)),
    ] {
        world.add_wall(center, half);
    }
    world.add_enemy(Vec3::new(0.0, 1.0, -6.0), Vec3::splat(0.5));
    world.add_enemy(Vec3::new(8.0, 1.0, 3.0), Vec3::splat(0.5));
    world
}

/// Та же арена из Rapier коллайдеров + персонаж
fn spawn_rapier_arena(
    mut commands: Commands,
    tuning: Res<LocomotionTuning>,
) -> Entity {
    spawn_level_box(
        &mut commands,
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(60.0, 0.5, 60.0),
        Surface(SurfaceTag::Ground),
    );
    for (center, half) in [
        (Vec3::new(0.0, 5.0, -40.0), Vec3::new(40.0, 10.0, 1.0)),
        (Vec3::new(0.0, 5.0, 40.0), Vec3::new(40.0, 10.0, 1.0)),
        (Vec3::new(-40.0, 5.0, 0.0), Vec3::new(1.0, 10.0, 40.0)),
        (Vec3::new(40.0, 5.0, 0.0), Vec3::new(1.0, 10.0, 40.0)),
    ] {
        spawn_level_box(&mut commands, center, half, Surface(SurfaceTag::Wall));
    }
    spawn_locomotion_character(&mut commands, Vec3::new(0.0, 0.9, 0.0), &tuning)
}

/// Сэмпл → буфер `PlayerInput` (как это делал бы host input system)
fn feed_input(input: &mut PlayerInput, sample: InputSample) {
    input.set_move_axis(sample.move_axis);
    input.add_look_delta(sample.look_delta);
    if sample.jump {
        input.press_jump();
    }
    if sample.crouch_toggle {
        input.press_crouch_toggle();
    }
    if sample.dash {
        input.press_dash();
    }
    if sample.attack {
        input.press_attack();
    }
    if sample.grapple {
        input.press_grapple();
    }
}

fn run_sandbox(tuning: LocomotionTuning, seed: u64) {
    let dt = (1.0 / SIMULATION_HZ) as f32;
    let mut rng = DeterministicRng::new(seed).rng;
    let mut world = build_arena();
    let mut controller = CharacterController::new(tuning);

    let mut transitions = 0;
    let mut hits = 0;

    for tick in 0..TICKS {
        let report = world.tick(&mut controller, random_input(&mut rng), dt);
        transitions += usize::from(report.transition.is_some());
        hits += report.hits.len();

        if let Some(event) = report.grapple {
            log_info(&format!("Tick {}: grapple {:?}", tick, event));
        }

        if tick % 100 == 0 {
            println!(
                "Tick {}: {} ({:?}), stamina {}, position {:?}",
                tick,
                report.state,
                report.owner,
                controller.stamina(),
                world.body.position
            );
        }
    }

    println!(
        "Sandbox complete! {} transitions, {} hits, final state {}",
        transitions,
        hits,
        controller.state()
    );
}

fn run_rapier(tuning: LocomotionTuning, seed: u64) {
    let mut app = create_headless_app();
    app.insert_resource(tuning);
    // PreStartup: Rapier context
    app.update();

    let character = match app.world_mut().run_system_once(spawn_rapier_arena) {
        Ok(entity) => entity,
        Err(err) => {
            log_error(&format!("Rapier arena spawn failed: {err}"));
            return;
        }
    };

    let mut rng = DeterministicRng::new(seed).rng;
    for tick in 0..RAPIER_TICKS {
        let sample = random_input(&mut rng);
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(character) {
            feed_input(&mut input, sample);
        }
        run_fixed_tick(&mut app);

        if tick % 100 == 0 {
            let world = app.world();
            if let (Some(locomotion), Some(transform)) = (
                world.get::<LocomotionController>(character),
                world.get::<Transform>(character),
            ) {
                println!(
                    "Rapier tick {}: {}, position {:?}",
                    tick,
                    locomotion.controller.state(),
                    transform.translation
                );
            }
        }
    }

    println!("Rapier run complete! {} ticks", RAPIER_TICKS);
}

fn main() {
    init_logger();

    let seed = 42;
    println!("Starting REAPER headless simulation (seed: {})", seed);

    let tuning = match LocomotionTuning::load(TUNING_PATH) {
        Ok(tuning) => tuning,
        Err(err) => {
            log_warning(&format!("{err}; using default tuning"));
            LocomotionTuning::default()
        }
    };

    run_sandbox(tuning.clone(), seed);
    run_rapier(tuning, seed);
}
