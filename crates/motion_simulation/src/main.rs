//! Headless демо контроллера движения
//!
//! Камера сзади-сверху, персонаж на плоскости. Скрипт input:
//! вперёд → вправо → стоп. Каждые 50 тиков (1 сек) печатаем состояние.
//!
//! `motion_simulation [config.json]`. Без аргумента берётся Default
//! со стандартными материалами.

use anyhow::Context;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use motion_simulation::{
    create_headless_app, init_logger, log_error, log_info, spawn_motion_camera,
    spawn_motion_character, ActiveSurface, MotionConfig, MotionSimulationPlugin, MotionState,
    MoveInput, SurfaceMaterial, MOTION_FORWARD,
};

const TICK_COUNT: u32 = 500;

fn load_config() -> anyhow::Result<MotionConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(MotionConfig::default()
            .with_surfaces(SurfaceMaterial::FRICTIONLESS, SurfaceMaterial::GRIPPY));
    };

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading motion config {}", path))?;
    let config = MotionConfig::from_json_str(&json)
        .with_context(|| format!("parsing motion config {}", path))?;
    log_info(&format!("Loaded motion config from {}", path));

    Ok(config)
}

/// Input скрипт по номеру тика
fn scripted_input(tick: u32) -> Vec2 {
    match tick {
        0..150 => Vec2::new(0.0, 1.0),
        150..300 => Vec2::new(1.0, 0.0),
        _ => Vec2::ZERO,
    }
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log_error(&format!("Motion config rejected: {:#}", e));
            return Err(e);
        }
    };

    let mut app = create_headless_app();
    app.add_plugins((
        bevy::transform::TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        MotionSimulationPlugin,
    ));

    let (camera, character) = {
        let mut commands = app.world_mut().commands();

        // Пол
        commands.spawn((
            Transform::from_xyz(0.0, -0.1, 0.0),
            Collider::cuboid(50.0, 0.1, 50.0),
            SurfaceMaterial::default().friction(),
        ));

        let camera = spawn_motion_camera(
            &mut commands,
            Transform::from_xyz(0.0, 6.0, -8.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
        );
        let character = spawn_motion_character(&mut commands, Vec3::new(0.0, 0.9, 0.0), config);

        (camera, character)
    };
    app.world_mut().flush();

    log_info(&format!(
        "Starting motion demo: camera {:?}, character {:?}, {} ticks",
        camera, character, TICK_COUNT
    ));

    for tick in 0..TICK_COUNT {
        app.world_mut().send_event(MoveInput {
            entity: character,
            value: scripted_input(tick),
        });
        app.update();

        if tick % 50 == 0 {
            let world = app.world();
            let Some(transform) = world.get::<Transform>(character) else {
                anyhow::bail!("character {:?} despawned", character);
            };
            let speed = world
                .get::<Velocity>(character)
                .map(|v| v.linvel.length())
                .unwrap_or(0.0);
            let state = world.get::<MotionState>(character).copied().unwrap_or_default();
            let surface = world.get::<ActiveSurface>(character).copied().unwrap_or_default();

            log_info(&format!(
                "Tick {}: pos {:.2?}, facing {:.2?}, speed {:.2}, {:?}, {:?}",
                tick,
                transform.translation,
                transform.rotation * MOTION_FORWARD,
                speed,
                state,
                surface.0,
            ));
        }
    }

    log_info("Motion demo complete");
    Ok(())
}
