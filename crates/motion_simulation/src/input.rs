//! Input sampling (Update, раз в display frame)
//!
//! Два источника, оба пишут в один InputState:
//! - polled axes: "Horizontal"/"Vertical" из ButtonInput<KeyCode> (raw, без dead zone)
//! - pushed events: MoveInput от input-action слоя хоста
//!
//! InputState всегда = последний sample, истории нет.
//! FixedUpdate читает его на каждом physics step.

use bevy::prelude::*;

/// Последний 2D input персонажа
///
/// - `x`: lateral axis, [-1, 1]. В world-relative режиме +x = мировой +X.
///   В camera-relative +x = `Y × forward` камеры, то есть ЛЕВАЯ сторона
///   экрана в правой системе координат Bevy (камера вдоль +Z → мировой +X).
/// - `y`: forward axis, -1 (back) → +1 (forward по камере или мировому +Z)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct InputState(pub Vec2);

impl InputState {
    /// Перезаписывает sample (clamp в [-1, 1], NaN/inf → 0)
    pub fn set(&mut self, raw: Vec2) {
        self.0 = sanitize_axes(raw);
    }

    pub fn value(&self) -> Vec2 {
        self.0
    }
}

/// Marker: персонаж читает input с клавиатуры (polled axes)
///
/// Без marker'а InputState обновляется только через MoveInput events.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PolledAxisInput;

/// Event: input-action система хоста прислала новый вектор движения
///
/// Последний event за frame побеждает (overwrite, не накопление).
#[derive(Event, Debug, Clone, Copy)]
pub struct MoveInput {
    pub entity: Entity,
    pub value: Vec2,
}

/// Одна именованная ось: positive pressed − negative pressed
#[derive(Debug, Clone)]
pub struct AxisBinding {
    pub name: &'static str,
    pub negative: Vec<KeyCode>,
    pub positive: Vec<KeyCode>,
}

impl AxisBinding {
    /// Raw значение оси: -1, 0 или 1 (обе стороны зажаты → 0)
    pub fn raw_value(&self, keys: &ButtonInput<KeyCode>) -> f32 {
        let positive = keys.any_pressed(self.positive.iter().copied());
        let negative = keys.any_pressed(self.negative.iter().copied());

        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Привязки осей "Horizontal" и "Vertical"
#[derive(Resource, Debug, Clone)]
pub struct InputAxes {
    pub horizontal: AxisBinding,
    pub vertical: AxisBinding,
}

/// Раскладка WASD + стрелки
///
/// D/ArrowRight дают +x, поэтому в camera-relative режиме персонаж уходит
/// влево по экрану (см. `InputState`). Хосту, которому нужен screen-right,
/// достаточно поменять местами `negative`/`positive` у `horizontal`.
impl Default for InputAxes {
    fn default() -> Self {
        Self {
            horizontal: AxisBinding {
                name: "Horizontal",
                negative: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
                positive: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            },
            vertical: AxisBinding {
                name: "Vertical",
                negative: vec![KeyCode::KeyS, KeyCode::ArrowDown],
                positive: vec![KeyCode::KeyW, KeyCode::ArrowUp],
            },
        }
    }
}

impl InputAxes {
    /// Ось по имени (как GetAxisRaw)
    pub fn axis(&self, name: &str) -> Option<&AxisBinding> {
        [&self.horizontal, &self.vertical]
            .into_iter()
            .find(|binding| binding.name == name)
    }

    pub fn sample(&self, keys: &ButtonInput<KeyCode>) -> Vec2 {
        Vec2::new(self.horizontal.raw_value(keys), self.vertical.raw_value(keys))
    }
}

fn sanitize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

pub fn sanitize_axes(raw: Vec2) -> Vec2 {
    Vec2::new(sanitize_axis(raw.x), sanitize_axis(raw.y))
}

/// Система: polled input (raw axes) → InputState
///
/// Нет ButtonInput resource (нет input плагина) → ноль, как "нет устройства".
pub fn sample_axis_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    axes: Res<InputAxes>,
    mut query: Query<&mut InputState, With<PolledAxisInput>>,
) {
    let sample = keys.map(|keys| axes.sample(&keys)).unwrap_or(Vec2::ZERO);

    for mut input in query.iter_mut() {
        input.set(sample);
    }
}

/// Система: MoveInput events → InputState
///
/// Event для entity без InputState (despawned, не персонаж) игнорируем.
pub fn apply_move_input_events(
    mut events: EventReader<MoveInput>,
    mut query: Query<&mut InputState>,
) {
    for event in events.read() {
        if let Ok(mut input) = query.get_mut(event.entity) {
            input.set(event.value);
        }
    }
}
