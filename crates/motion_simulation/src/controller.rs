//! Character motion controller (rigid body + Rapier)
//!
//! Архитектура:
//! - Update: input sampling → InputState (input.rs)
//! - FixedUpdate: physics_tick делает один проход на персонажа
//!   (input → direction → surface → locomotion → orientation)
//! - Rapier интегрирует velocity, считает коллизии и трение
//!
//! Вся логика шага живёт в чистой функции `plan_physics_step`,
//! система только применяет `MotionStep` к компонентам.
//!
//! Контроллер не хранит velocity/rotation, а читает их из body каждый шаг.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::config::{DirectionMode, MotionConfig};
use crate::direction::{resolve_direction, MotionCamera};
use crate::input::{
    apply_move_input_events, sample_axis_input, InputAxes, InputState, MoveInput,
};
use crate::locomotion::{integrate_acceleration, locomotion_acceleration, AppliedAcceleration};
use crate::logger::{is_enabled, log, log_warning, LogLevel};
use crate::orientation::orientation_step;
use crate::surface::{
    apply_surface, select_surface, surface_for, ActiveSurface, SurfaceState,
};

/// Логическое состояние контроллера
///
/// Idle: input = 0 → нет силы, stopping material, rotation не меняется.
/// Moving: input ≠ 0 → сила до soft cap, moving material, поворот к направлению.
/// Переход зависит только от текущего |input|, без гистерезиса.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum MotionState {
    #[default]
    Idle,
    Moving,
}

impl From<SurfaceState> for MotionState {
    fn from(surface: SurfaceState) -> Self {
        match surface {
            SurfaceState::Moving => MotionState::Moving,
            SurfaceState::Stopping => MotionState::Idle,
        }
    }
}

/// Результат одного physics step (что применить к body)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub state: MotionState,
    /// Мировое направление (y = 0), длина = |input|
    pub direction: Vec3,
    pub surface: SurfaceState,
    /// Acceleration-mode ускорение; None = сила не применяется
    pub acceleration: Option<Vec3>,
    /// Новая ориентация; None = не трогаем
    pub rotation: Option<Quat>,
    /// CameraRelative без валидной камеры → посчитали world-relative
    pub camera_fallback: bool,
}

/// Чистый расчёт physics step
///
/// Порядок как в контроллере: direction → surface → locomotion → orientation.
pub fn plan_physics_step(
    config: &MotionConfig,
    input: Vec2,
    camera_forward: Option<Vec3>,
    velocity: Vec3,
    rotation: Quat,
) -> MotionStep {
    let resolved = resolve_direction(input, config.direction_mode, camera_forward);

    // Surface по input ДО camera transform
    let surface = select_surface(input);

    let acceleration = locomotion_acceleration(
        resolved.direction,
        config.acceleration_force,
        config.max_speed,
        velocity,
    );

    let rotation = orientation_step(rotation, resolved.direction, config.turn_speed);

    MotionStep {
        state: surface.into(),
        direction: resolved.direction,
        surface,
        acceleration,
        rotation,
        camera_fallback: resolved.camera_fallback,
    }
}

/// Система: physics tick всех персонажей
///
/// Работает в FixedUpdate, ДО rapier sync (velocity/transform попадают в этот же step).
/// dt = fixed timestep (acceleration-mode: Δv = a · dt).
#[allow(clippy::type_complexity)]
pub fn physics_tick(
    time: Res<Time<Fixed>>,
    cameras: Query<&GlobalTransform, With<MotionCamera>>,
    mut characters: Query<(
        Entity,
        &MotionConfig,
        &InputState,
        &mut Velocity,
        &mut Transform,
        Option<&mut Friction>,
        Option<&mut Restitution>,
        &mut MotionState,
        &mut ActiveSurface,
        &mut AppliedAcceleration,
    )>,
    mut fallback_warned: Local<bool>,
) {
    let dt = time.timestep().as_secs_f32();

    // Первая MotionCamera = активная
    let camera_forward = cameras.iter().next().map(|camera| camera.forward().as_vec3());

    let mut any_fallback = false;

    for (
        entity,
        config,
        input,
        mut velocity,
        mut transform,
        mut friction,
        mut restitution,
        mut state,
        mut active_surface,
        mut applied,
    ) in characters.iter_mut()
    {
        let step = plan_physics_step(
            config,
            input.value(),
            camera_forward,
            velocity.linvel,
            transform.rotation,
        );

        if step.camera_fallback && config.direction_mode == DirectionMode::CameraRelative {
            any_fallback = true;
        }

        // 1. Surface (Friction и Restitution независимо, у хоста может быть только один)
        let material = surface_for(step.surface, config.moving_surface, config.stopping_surface);
        if let Some(material) = material {
            apply_surface(&material, friction.as_deref_mut(), restitution.as_deref_mut());
        }
        active_surface.0 = step.surface;

        // 2. Locomotion (soft cap уже учтён в step)
        if let Some(acceleration) = step.acceleration {
            velocity.linvel = integrate_acceleration(velocity.linvel, acceleration, dt);
        }
        applied.0 = step.acceleration;

        // 3. Orientation
        if let Some(rotation) = step.rotation {
            transform.rotation = rotation;
        }

        if *state != step.state {
            if is_enabled(LogLevel::Debug) {
                log(&format!("Motion {:?}: {:?} → {:?}", entity, *state, step.state));
            }
            *state = step.state;
        }
    }

    // Warning один раз на серию fallback-тиков, иначе спам 50 раз/сек
    if any_fallback && !*fallback_warned {
        log_warning(
            "Camera-relative motion without usable MotionCamera \
             (missing or looking straight up/down), using world axes",
        );
    }
    *fallback_warned = any_fallback;
}

/// SystemSet контроллера (для ordering внешних систем)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MotionSet {
    /// Update: InputState обновлён
    SampleInput,
    /// FixedUpdate: сила/материал/поворот применены
    PhysicsTick,
}

/// Plugin контроллера движения
///
/// Регистрирует MoveInput event, InputAxes и системы.
/// Fixed timestep НЕ задаёт (это делает MotionSimulationPlugin или хост).
pub struct CharacterMotionPlugin;

impl Plugin for CharacterMotionPlugin {
    fn build(&self, app: &mut App) {
        use bevy_rapier3d::plugin::PhysicsSet;

        app.add_event::<MoveInput>()
            .init_resource::<InputAxes>()
            .register_type::<MotionConfig>()
            .register_type::<InputState>()
            .register_type::<MotionState>()
            .register_type::<ActiveSurface>()
            .register_type::<AppliedAcceleration>();

        app.add_systems(
            Update,
            (
                sample_axis_input,
                apply_move_input_events, // Events после polling: pushed input побеждает
            )
                .chain()
                .in_set(MotionSet::SampleInput),
        );

        app.add_systems(
            FixedUpdate,
            physics_tick
                .in_set(MotionSet::PhysicsTick)
                .before(PhysicsSet::SyncBackend),
        );
    }
}

/// Spawn helper: dynamic capsule со всеми компонентами контроллера
///
/// - RigidBody::Dynamic + Velocity (силу интегрируем в linvel)
/// - LockedAxes::ROTATION_LOCKED: heading задаёт только контроллер
/// - начальный материал = stopping (персонаж стоит)
///
/// Keyboard control: `commands.entity(e).insert(PolledAxisInput)`.
pub fn spawn_motion_character(
    commands: &mut Commands,
    position: Vec3,
    config: MotionConfig,
) -> Entity {
    let initial_surface = config.stopping_surface.unwrap_or_default();

    commands
        .spawn((
            Transform::from_translation(position),
            // Контроллер
            config,
            InputState::default(),
            MotionState::default(),
            ActiveSurface::default(),
            AppliedAcceleration::default(),
            // Rapier
            RigidBody::Dynamic,
            Collider::capsule_y(0.5, 0.4), // Высота 1.8m (0.5 * 2 + 0.4 * 2)
            Velocity::default(),
            LockedAxes::ROTATION_LOCKED,
            initial_surface.friction(),
            initial_surface.restitution(),
        ))
        .id()
}

/// Spawn helper: камера для camera-relative движения
///
/// GlobalTransform задаём сразу, чтобы forward был валиден до transform propagation.
pub fn spawn_motion_camera(commands: &mut Commands, transform: Transform) -> Entity {
    commands
        .spawn((transform, GlobalTransform::from(transform), MotionCamera))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::MOTION_FORWARD;
    use crate::surface::SurfaceMaterial;

    const EPS: f32 = 1e-5;

    fn config() -> MotionConfig {
        MotionConfig::default()
            .with_surfaces(SurfaceMaterial::FRICTIONLESS, SurfaceMaterial::GRIPPY)
    }

    #[test]
    fn test_lateral_input_with_forward_camera() {
        // input (1,0), camera +Z, max 2, speed 0, accel 10
        let input = Vec2::new(1.0, 0.0);
        let step = plan_physics_step(&config(), input, Some(Vec3::Z), Vec3::ZERO, Quat::IDENTITY);

        assert!((step.direction - Vec3::X).length() < EPS);
        let acceleration = step.acceleration.unwrap();
        assert!((acceleration - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(step.surface, SurfaceState::Moving);
        assert_eq!(step.state, MotionState::Moving);
    }

    #[test]
    fn test_zero_input_is_idle() {
        let rotation = Quat::from_rotation_y(1.0);
        let velocity = Vec3::new(1.0, 0.0, 0.0);
        let step = plan_physics_step(&config(), Vec2::ZERO, Some(Vec3::Z), velocity, rotation);

        assert_eq!(step.acceleration, None);
        assert_eq!(step.rotation, None);
        assert_eq!(step.surface, SurfaceState::Stopping);
        assert_eq!(step.state, MotionState::Idle);
    }

    #[test]
    fn test_forward_input_snaps_with_full_turn_speed() {
        let config = MotionConfig {
            turn_speed: 1.0,
            ..config()
        };
        let input = Vec2::new(0.0, 1.0);
        let step = plan_physics_step(&config, input, Some(Vec3::Z), Vec3::ZERO, Quat::IDENTITY);

        let facing = step.rotation.unwrap() * MOTION_FORWARD;
        assert!((facing - Vec3::Z).length() < EPS);
    }

    #[test]
    fn test_at_speed_cap_keeps_surface_and_rotation() {
        let step = plan_physics_step(
            &config(),
            Vec2::new(0.0, 1.0),
            Some(Vec3::X),
            Vec3::new(0.0, 0.0, 2.5),
            Quat::IDENTITY,
        );

        // Soft cap: силы нет, но материал и поворот работают
        assert_eq!(step.acceleration, None);
        assert_eq!(step.surface, SurfaceState::Moving);
        assert!(step.rotation.is_some());
    }

    #[test]
    fn test_world_relative_ignores_camera() {
        let config = config().with_direction_mode(DirectionMode::WorldRelative);
        let input = Vec2::new(0.0, 1.0);
        let step = plan_physics_step(&config, input, Some(Vec3::NEG_X), Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(step.direction, Vec3::Z);
        assert!(!step.camera_fallback);
    }

    #[test]
    fn test_missing_camera_falls_back() {
        let input = Vec2::new(0.0, 1.0);
        let step = plan_physics_step(&config(), input, None, Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(step.direction, Vec3::Z);
        assert!(step.camera_fallback);
        assert!(step.acceleration.is_some());
    }

    #[test]
    fn test_motion_state_from_surface() {
        assert_eq!(MotionState::from(SurfaceState::Moving), MotionState::Moving);
        assert_eq!(MotionState::from(SurfaceState::Stopping), MotionState::Idle);
    }
}
