use bevy::prelude::*;

/// Eases the chest toward the head's yaw.
///
/// Each tick does `chest = slerp(chest, head_yaw, dt * rate)`. That is a
/// first-order smoothing step rather than an exact time constant, so it is
/// only deterministic when driven with the fixed tick duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationController {
    chest_rotation: Quat,
    smoothing_rate: f32,
}

impl OrientationController {
    pub fn new(initial_chest_rotation: Quat, smoothing_rate: f32) -> Self {
        let chest_rotation = if initial_chest_rotation.is_finite()
            && initial_chest_rotation.length_squared() > f32::EPSILON
        {
            initial_chest_rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Self {
            chest_rotation,
            smoothing_rate,
        }
    }

    pub fn chest_rotation(&self) -> Quat {
        self.chest_rotation
    }

    pub fn step(&mut self, head_yaw: Quat, dt: f32) -> Quat {
        let t = (dt * self.smoothing_rate).clamp(0.0, 1.0);
        self.chest_rotation = self.chest_rotation.slerp(head_yaw, t).normalize();
        self.chest_rotation
    }
}
