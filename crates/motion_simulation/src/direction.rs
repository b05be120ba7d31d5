//! Direction resolver: 2D input → 3D направление движения (y всегда 0)
//!
//! Конвенция осей контроллера:
//! - input (x, y) → локальный вектор (x, 0, y): x = lateral, +Z = forward
//! - "look rotation" = поворот, переводящий +Z в заданное направление (up = +Y)
//!
//! Ориентация персонажа использует ту же конвенцию (см. orientation.rs):
//! меши персонажа смотрят вдоль локального +Z.

use bevy::prelude::*;

use crate::config::DirectionMode;

/// Локальная ось "вперёд" персонажа и камерного фрейма
pub const MOTION_FORWARD: Vec3 = Vec3::Z;

/// Короче этого flattened forward камеры считается вертикальным
///
/// Камера, смотрящая строго вниз, из-за float-шума в GlobalTransform может
/// дать x/z порядка 1e-8. Такой heading не нормализуем.
pub const MIN_CAMERA_HEADING: f32 = 1e-4;

/// Marker: камера, чей forward задаёт camera-relative движение
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MotionCamera;

/// Обнуляет вертикальную компоненту
pub fn flatten(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}

/// Поворот, у которого +Z смотрит в `forward`, +Y максимально близко к `up`
///
/// None если forward нулевой или коллинеарен up (базис не определён).
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z = forward.try_normalize()?;
    let x = up.cross(z).try_normalize()?;
    let y = z.cross(x);

    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Поворот камерного фрейма по flattened forward
///
/// None когда камера смотрит (почти) строго вверх/вниз.
pub fn camera_rotation(camera_forward: Vec3) -> Option<Quat> {
    let heading = flatten(camera_forward);
    if heading.length() < MIN_CAMERA_HEADING * camera_forward.length() {
        return None;
    }

    look_rotation(heading, Vec3::Y)
}

/// Input в мировых осях: (x, 0, y)
pub fn world_direction(input: Vec2) -> Vec3 {
    Vec3::new(input.x, 0.0, input.y)
}

/// Результат resolve: направление + был ли fallback на world-relative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDirection {
    pub direction: Vec3,
    pub camera_fallback: bool,
}

/// Input → мировое направление
///
/// CameraRelative без камеры или с вертикальным forward → world-relative
/// (camera_fallback = true). Длина сохраняется: |direction| == |input|.
pub fn resolve_direction(
    input: Vec2,
    mode: DirectionMode,
    camera_forward: Option<Vec3>,
) -> ResolvedDirection {
    let raw = world_direction(input);

    match mode {
        DirectionMode::WorldRelative => ResolvedDirection {
            direction: raw,
            camera_fallback: false,
        },
        DirectionMode::CameraRelative => match camera_forward.and_then(camera_rotation) {
            Some(rotation) => ResolvedDirection {
                // Поворот вокруг Y: вертикаль остаётся нулевой, снимаем float-шум
                direction: flatten(rotation * raw),
                camera_fallback: false,
            },
            None => ResolvedDirection {
                direction: raw,
                camera_fallback: true,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_look_rotation_identity_for_forward() {
        let rotation = look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!(rotation.angle_between(Quat::IDENTITY) < EPS);
    }

    #[test]
    fn test_look_rotation_maps_forward_axis() {
        for forward in [Vec3::X, Vec3::NEG_X, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 1.0)] {
            let rotation = look_rotation(forward, Vec3::Y).unwrap();
            let mapped = rotation * MOTION_FORWARD;
            assert!(
                (mapped - forward.normalize()).length() < EPS,
                "forward {:?} → {:?}",
                forward,
                mapped
            );
            // Up не заваливается (нет roll)
            assert!((rotation * Vec3::Y - Vec3::Y).length() < EPS);
        }
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        assert!(look_rotation(Vec3::Y, Vec3::Y).is_none());
        assert!(camera_rotation(Vec3::NEG_Y).is_none());
    }

    #[test]
    fn test_near_vertical_camera_noise_is_degenerate() {
        // Шум от looking_to(NEG_Y, Z): x/z ~1e-8 не должны задавать heading
        assert!(camera_rotation(Vec3::new(3e-8, -1.0, -2e-8)).is_none());

        let down = Transform::IDENTITY.looking_to(Vec3::NEG_Y, Vec3::Z);
        assert!(camera_rotation(down.forward().as_vec3()).is_none());

        // Крутой, но не вертикальный наклон ещё даёт heading
        assert!(camera_rotation(Vec3::new(0.0, -1.0, 0.01)).is_some());
    }

    #[test]
    fn test_camera_forward_along_z_keeps_input() {
        // Камера смотрит вдоль +Z: input (1, 0) → (1, 0, 0)
        let resolved =
            resolve_direction(Vec2::new(1.0, 0.0), DirectionMode::CameraRelative, Some(Vec3::Z));
        assert!((resolved.direction - Vec3::X).length() < EPS);
        assert!(!resolved.camera_fallback);
    }

    #[test]
    fn test_camera_pitch_is_ignored() {
        // Камера смотрит вперёд-вниз: результат как у горизонтальной
        let tilted = Vec3::new(0.0, -0.8, 0.6);
        let resolved =
            resolve_direction(Vec2::new(0.0, 1.0), DirectionMode::CameraRelative, Some(tilted));
        assert!((resolved.direction - Vec3::Z).length() < EPS);
        assert_eq!(resolved.direction.y, 0.0);
    }

    #[test]
    fn test_camera_relative_forward_follows_camera() {
        let input = Vec2::new(0.0, 1.0);
        let resolved = resolve_direction(input, DirectionMode::CameraRelative, Some(Vec3::NEG_X));
        assert!((resolved.direction - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_world_relative_ignores_camera() {
        let input = Vec2::new(0.5, -1.0);
        let resolved = resolve_direction(input, DirectionMode::WorldRelative, Some(Vec3::NEG_X));
        assert_eq!(resolved.direction, Vec3::new(0.5, 0.0, -1.0));
    }

    #[test]
    fn test_vertical_camera_falls_back_to_world() {
        let input = Vec2::new(1.0, 1.0);
        let resolved = resolve_direction(input, DirectionMode::CameraRelative, Some(Vec3::NEG_Y));
        assert_eq!(resolved.direction, Vec3::new(1.0, 0.0, 1.0));
        assert!(resolved.camera_fallback);

        let resolved = resolve_direction(input, DirectionMode::CameraRelative, None);
        assert!(resolved.camera_fallback);
    }

    #[test]
    fn test_zero_input_zero_direction() {
        let forward = Vec3::new(0.3, 0.0, -0.9);
        let resolved = resolve_direction(Vec2::ZERO, DirectionMode::CameraRelative, Some(forward));
        assert_eq!(resolved.direction.length(), 0.0);
    }
}
