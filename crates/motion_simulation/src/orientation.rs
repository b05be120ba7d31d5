//! Orientation controller: плавный поворот к направлению движения
//!
//! turn_speed задаёт долю slerp за один physics step (не масштабируется по dt).

use bevy::prelude::*;

use crate::direction::look_rotation;

/// Новая ориентация или None (направление нулевое → не трогаем rotation)
///
/// turn_speed ≤ 0 → текущая ориентация без изменений,
/// turn_speed ≥ 1 → ровно target (без float-погрешности slerp).
pub fn orientation_step(current: Quat, direction: Vec3, turn_speed: f32) -> Option<Quat> {
    if direction.length_squared() == 0.0 {
        return None;
    }

    let target = look_rotation(direction, Vec3::Y)?;

    let next = if turn_speed <= 0.0 {
        current
    } else if turn_speed >= 1.0 {
        target
    } else {
        current.slerp(target, turn_speed)
    };

    Some(next)
}
