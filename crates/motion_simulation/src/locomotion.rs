//! Locomotion: acceleration-mode сила к направлению input
//!
//! Soft cap: при |velocity| ≥ max_speed input-ускорение не применяется,
//! но и активного торможения нет (внешние силы могут разогнать выше лимита).

use bevy::prelude::*;

/// Ускорение за этот physics step, None = сила не применяется
///
/// - нулевое направление → None
/// - max_speed = None → без лимита (ранняя версия)
/// - speed ≥ max_speed → None
pub fn locomotion_acceleration(
    direction: Vec3,
    acceleration_force: f32,
    max_speed: Option<f32>,
    velocity: Vec3,
) -> Option<Vec3> {
    if direction.length_squared() == 0.0 {
        return None;
    }

    if let Some(max_speed) = max_speed {
        if velocity.length() >= max_speed {
            return None;
        }
    }

    Some(direction * acceleration_force)
}

/// Acceleration-mode интеграция: Δv = a · dt (масса не участвует)
pub fn integrate_acceleration(velocity: Vec3, acceleration: Vec3, dt: f32) -> Vec3 {
    velocity + acceleration * dt
}

/// Последнее применённое ускорение (для отладки и тестов)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AppliedAcceleration(pub Option<Vec3>);
