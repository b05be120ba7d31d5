//! Tuning персонажа: MotionConfig + валидация
//!
//! Дизайнерские параметры (сила, лимит скорости, скорость поворота, материалы).
//! Создаётся один раз при spawn, дальше только читается.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::surface::SurfaceMaterial;

/// Как 2D input превращается в мировое направление
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum DirectionMode {
    /// Input поворачивается по flattened forward активной камеры
    #[default]
    CameraRelative,
    /// Input = (x, 0, y) в мировых осях
    WorldRelative,
}

/// Параметры движения персонажа
///
/// Инварианты (проверяются в `validated`):
/// - acceleration_force > 0, конечное
/// - max_speed ≥ 0 (None = без лимита)
/// - 0 ≤ turn_speed ≤ 1
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MotionConfig {
    /// Ускорение (m/s²), mass-independent
    pub acceleration_force: f32,
    /// Soft cap скорости (m/s): выше него input-ускорение не применяется
    pub max_speed: Option<f32>,
    /// Доля поворота к цели за один physics step (0 = не поворачивается, 1 = мгновенно)
    pub turn_speed: f32,
    pub moving_surface: Option<SurfaceMaterial>,
    pub stopping_surface: Option<SurfaceMaterial>,
    pub direction_mode: DirectionMode,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            acceleration_force: 10.0,
            max_speed: Some(2.0),
            turn_speed: 0.1,
            moving_surface: None,
            stopping_surface: None,
            direction_mode: DirectionMode::CameraRelative,
        }
    }
}

impl MotionConfig {
    pub fn new(
        acceleration_force: f32,
        max_speed: Option<f32>,
        turn_speed: f32,
    ) -> Result<Self, MotionConfigError> {
        Self {
            acceleration_force,
            max_speed,
            turn_speed,
            ..default()
        }
        .validated()
    }

    pub fn with_surfaces(mut self, moving: SurfaceMaterial, stopping: SurfaceMaterial) -> Self {
        self.moving_surface = Some(moving);
        self.stopping_surface = Some(stopping);
        self
    }

    pub fn with_direction_mode(mut self, mode: DirectionMode) -> Self {
        self.direction_mode = mode;
        self
    }

    /// Проверяет инварианты, возвращает self если всё ок
    pub fn validated(self) -> Result<Self, MotionConfigError> {
        if !self.acceleration_force.is_finite() || self.acceleration_force <= 0.0 {
            return Err(MotionConfigError::NonPositiveAcceleration(self.acceleration_force));
        }

        if let Some(max_speed) = self.max_speed {
            if max_speed.is_nan() || max_speed < 0.0 {
                return Err(MotionConfigError::NegativeMaxSpeed(max_speed));
            }
        }

        if !(0.0..=1.0).contains(&self.turn_speed) {
            return Err(MotionConfigError::TurnSpeedOutOfRange(self.turn_speed));
        }

        Ok(self)
    }

    /// Парсит JSON (отсутствующие поля = Default) и валидирует
    pub fn from_json_str(json: &str) -> Result<Self, MotionConfigError> {
        let config: MotionConfig =
            serde_json::from_str(json).map_err(|err| MotionConfigError::Parse(err.to_string()))?;
        config.validated()
    }
}

/// Ошибки построения MotionConfig
#[derive(Debug, Clone, PartialEq)]
pub enum MotionConfigError {
    NonPositiveAcceleration(f32),
    NegativeMaxSpeed(f32),
    TurnSpeedOutOfRange(f32),
    Parse(String),
}

impl std::fmt::Display for MotionConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveAcceleration(value) => {
                write!(f, "acceleration_force must be a positive finite number, got {}", value)
            }
            Self::NegativeMaxSpeed(value) => write!(f, "max_speed must be >= 0, got {}", value),
            Self::TurnSpeedOutOfRange(value) => {
                write!(f, "turn_speed must be in [0, 1], got {}", value)
            }
            Self::Parse(reason) => write!(f, "invalid motion config: {}", reason),
        }
    }
}

impl std::error::Error for MotionConfigError {}
