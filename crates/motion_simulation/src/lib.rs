//! Rigid-body character motion (Bevy 0.16 + Rapier)
//!
//! Контроллер персонажа поверх физического движка:
//! - input (raw axes или MoveInput events) → InputState
//! - InputState → camera-relative / world-relative направление
//! - acceleration-mode сила до soft cap скорости
//! - смена физического материала (moving / stopping)
//! - плавный поворот к направлению движения (slerp)
//!
//! Интеграцию сил, коллизии и трение считает Rapier.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// Публичные модули
pub mod config;
pub mod controller;
pub mod direction;
pub mod input;
pub mod locomotion;
pub mod logger;
pub mod orientation;
pub mod surface;

// Re-export основных типов
pub use config::{DirectionMode, MotionConfig, MotionConfigError};
pub use controller::{
    physics_tick, plan_physics_step, spawn_motion_camera, spawn_motion_character,
    CharacterMotionPlugin, MotionSet, MotionState, MotionStep,
};
pub use direction::{look_rotation, resolve_direction, MotionCamera, MOTION_FORWARD};
pub use input::{InputAxes, InputState, MoveInput, PolledAxisInput};
pub use locomotion::AppliedAcceleration;
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use surface::{ActiveSurface, SurfaceCombine, SurfaceMaterial, SurfaceState};

/// Частота physics step (Hz)
///
/// turn_speed применяется за step, поэтому скорость поворота привязана к этой частоте.
pub const PHYSICS_TICK_HZ: f64 = 50.0;

/// Главный plugin симуляции: fixed timestep + контроллер
pub struct MotionSimulationPlugin;

impl Plugin for MotionSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(PHYSICS_TICK_HZ))
            .add_plugins(CharacterMotionPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: один `app.update()` = ровно один physics step.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / PHYSICS_TICK_HZ,
        )));

    app
}

/// Snapshot персонажей для сравнения детерминизма
///
/// Entity index + translation + rotation + linvel + surface, little-endian.
pub fn motion_snapshot(world: &mut World) -> Vec<u8> {
    use bevy_rapier3d::prelude::Velocity;

    let mut snapshot = Vec::new();

    let mut query = world
        .query_filtered::<(Entity, &Transform, &Velocity, &ActiveSurface), With<MotionConfig>>();
    let mut characters: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    characters.sort_by_key(|(entity, ..)| entity.index());

    for (entity, transform, velocity, surface) in characters {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());

        let floats = transform
            .translation
            .to_array()
            .into_iter()
            .chain(transform.rotation.to_array())
            .chain(velocity.linvel.to_array());
        for value in floats {
            snapshot.extend_from_slice(&value.to_le_bytes());
        }

        snapshot.push(match surface.0 {
            SurfaceState::Moving => 1,
            SurfaceState::Stopping => 0,
        });
    }

    snapshot
}
