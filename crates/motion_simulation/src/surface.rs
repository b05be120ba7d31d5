//! Surface-friction switch
//!
//! Пока есть input, стоит "скользкий" материал (персонаж не цепляется за пол).
//! Без input стоит "цепкий", и персонаж быстро останавливается трением.
//! Выбор зависит только от |input|, без гистерезиса.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CoefficientCombineRule, Friction, Restitution};
use serde::{Deserialize, Serialize};

/// Правило комбинирования коэффициентов двух контактирующих коллайдеров
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum SurfaceCombine {
    #[default]
    Average,
    Min,
    Multiply,
    Max,
}

impl From<SurfaceCombine> for CoefficientCombineRule {
    fn from(combine: SurfaceCombine) -> Self {
        match combine {
            SurfaceCombine::Average => CoefficientCombineRule::Average,
            SurfaceCombine::Min => CoefficientCombineRule::Min,
            SurfaceCombine::Multiply => CoefficientCombineRule::Multiply,
            SurfaceCombine::Max => CoefficientCombineRule::Max,
        }
    }
}

/// Физический материал коллайдера персонажа
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    pub friction: f32,
    pub friction_combine: SurfaceCombine,
    pub restitution: f32,
    pub restitution_combine: SurfaceCombine,
}

impl SurfaceMaterial {
    /// Для движения: Min гарантирует нулевое трение с любым полом
    pub const FRICTIONLESS: Self = Self {
        friction: 0.0,
        friction_combine: SurfaceCombine::Min,
        restitution: 0.0,
        restitution_combine: SurfaceCombine::Min,
    };

    /// Для остановки: Max берёт наибольшее трение из пары
    pub const GRIPPY: Self = Self {
        friction: 1.0,
        friction_combine: SurfaceCombine::Max,
        restitution: 0.0,
        restitution_combine: SurfaceCombine::Min,
    };

    pub fn friction(&self) -> Friction {
        Friction {
            coefficient: self.friction,
            combine_rule: self.friction_combine.into(),
        }
    }

    pub fn restitution(&self) -> Restitution {
        Restitution {
            coefficient: self.restitution,
            combine_rule: self.restitution_combine.into(),
        }
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            friction_combine: SurfaceCombine::Average,
            restitution: 0.0,
            restitution_combine: SurfaceCombine::Average,
        }
    }
}

/// Какой материал выбран на текущем physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum SurfaceState {
    Moving,
    #[default]
    Stopping,
}

/// Последний выбранный материал персонажа
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct ActiveSurface(pub SurfaceState);

/// SurfaceSelector: moving если |input| > 0 (до camera transform), иначе stopping
pub fn select_surface(input: Vec2) -> SurfaceState {
    if input.length() > 0.0 {
        SurfaceState::Moving
    } else {
        SurfaceState::Stopping
    }
}

/// Материал для состояния; None = коллайдер не трогаем
pub fn surface_for(
    state: SurfaceState,
    moving: Option<SurfaceMaterial>,
    stopping: Option<SurfaceMaterial>,
) -> Option<SurfaceMaterial> {
    match state {
        SurfaceState::Moving => moving,
        SurfaceState::Stopping => stopping,
    }
}

/// Записывает материал в Rapier коллайдер
///
/// Каждый компонент пишется независимо: отсутствующий просто пропускается.
pub fn apply_surface(
    material: &SurfaceMaterial,
    friction: Option<&mut Friction>,
    restitution: Option<&mut Restitution>,
) {
    if let Some(friction) = friction {
        *friction = material.friction();
    }
    if let Some(restitution) = restitution {
        *restitution = material.restitution();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_surface_by_input_magnitude() {
        assert_eq!(select_surface(Vec2::ZERO), SurfaceState::Stopping);
        assert_eq!(select_surface(Vec2::new(1.0, 0.0)), SurfaceState::Moving);
        assert_eq!(select_surface(Vec2::new(0.0, -0.01)), SurfaceState::Moving);
    }

    #[test]
    fn test_surface_for_missing_material() {
        let moving = Some(SurfaceMaterial::FRICTIONLESS);

        assert_eq!(surface_for(SurfaceState::Moving, moving, None), moving);
        assert_eq!(surface_for(SurfaceState::Stopping, moving, None), None);
    }

    #[test]
    fn test_apply_surface_writes_rapier_components() {
        let mut friction = Friction::default();
        let mut restitution = Restitution::default();

        apply_surface(&SurfaceMaterial::GRIPPY, Some(&mut friction), Some(&mut restitution));

        assert_eq!(friction.coefficient, 1.0);
        assert_eq!(friction.combine_rule, CoefficientCombineRule::Max);
        assert_eq!(restitution.coefficient, 0.0);
        assert_eq!(restitution.combine_rule, CoefficientCombineRule::Min);
    }

    #[test]
    fn test_apply_surface_without_restitution_still_sets_friction() {
        let mut friction = Friction::default();

        apply_surface(&SurfaceMaterial::FRICTIONLESS, Some(&mut friction), None);

        assert_eq!(friction.coefficient, 0.0);
        assert_eq!(friction.combine_rule, CoefficientCombineRule::Min);

        let mut restitution = Restitution::coefficient(0.7);
        apply_surface(&SurfaceMaterial::GRIPPY, None, Some(&mut restitution));
        assert_eq!(restitution.coefficient, 0.0);
    }
}
