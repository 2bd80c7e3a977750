use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::error::{HexaBodyError, Result};

/// Tuning for the whole avatar. Every field falls back to its default when
/// missing from a config file.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HexaBodyConfig {
    /// Axis magnitudes below this are treated as no input
    pub deadzone_threshold: f32,
    /// Torque at the edge of the deadzone
    pub walk_force: f32,
    /// Torque at full axis deflection
    pub sprint_force: f32,
    pub angular_damping_on_move: f32,
    pub angular_brake_damping: f32,
    /// While braking, the ball is frozen once its angular speed drops below this
    pub freeze_speed_threshold: f32,
    pub lowest_crouch: f32,
    pub highest_crouch: f32,
    /// Slerp rate per second for the chest following head yaw
    pub orientation_smoothing_rate: f32,
}

impl Default for HexaBodyConfig {
    fn default() -> Self {
        Self {
            deadzone_threshold: 0.1,
            walk_force: 5.0,
            sprint_force: 15.0,
            angular_damping_on_move: 0.05,
            angular_brake_damping: 50.0,
            freeze_speed_threshold: 0.01,
            lowest_crouch: 0.05,
            highest_crouch: 1.8,
            orientation_smoothing_rate: 5.0,
        }
    }
}

impl HexaBodyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: HexaBodyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("deadzone_threshold", self.deadzone_threshold),
            ("walk_force", self.walk_force),
            ("sprint_force", self.sprint_force),
            ("angular_damping_on_move", self.angular_damping_on_move),
            ("angular_brake_damping", self.angular_brake_damping),
            ("freeze_speed_threshold", self.freeze_speed_threshold),
            ("lowest_crouch", self.lowest_crouch),
            ("highest_crouch", self.highest_crouch),
            ("orientation_smoothing_rate", self.orientation_smoothing_rate),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite")));
        }

        if !(0.0..1.0).contains(&self.deadzone_threshold) {
            return Err(invalid(format!(
                "deadzone_threshold must be in [0, 1), got {}",
                self.deadzone_threshold
            )));
        }
        if self.sprint_force < self.walk_force {
            return Err(invalid(format!(
                "sprint_force ({}) is below walk_force ({})",
                self.sprint_force, self.walk_force
            )));
        }
        if self.lowest_crouch > self.highest_crouch {
            return Err(invalid(format!(
                "lowest_crouch ({}) is above highest_crouch ({})",
                self.lowest_crouch, self.highest_crouch
            )));
        }
        for (name, value) in [
            ("angular_damping_on_move", self.angular_damping_on_move),
            ("angular_brake_damping", self.angular_brake_damping),
            ("freeze_speed_threshold", self.freeze_speed_threshold),
            ("orientation_smoothing_rate", self.orientation_smoothing_rate),
        ] {
            if value < 0.0 {
                return Err(invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> HexaBodyError {
    HexaBodyError::InvalidConfig(msg)
}
