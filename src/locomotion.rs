use bevy::prelude::*;

use crate::config::HexaBodyConfig;
use crate::sim::{ForceMode, Simulator};

/// What the locomotion ball did on the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocomotionPhase {
    /// Input inside the deadzone, ball still spinning down under brake damping.
    #[default]
    Braking,
    /// Input inside the deadzone and the ball has stopped; rotation is locked.
    Frozen,
    /// Torque is being applied.
    Moving,
}

/// Turns the locomotion axis into torque on the rolling ball.
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionController {
    deadzone_threshold: f32,
    walk_force: f32,
    sprint_force: f32,
    angular_damping_on_move: f32,
    angular_brake_damping: f32,
    freeze_speed_threshold: f32,
    phase: LocomotionPhase,
    applied_force: f32,
}

impl LocomotionController {
    pub fn new(config: &HexaBodyConfig) -> Self {
        Self {
            deadzone_threshold: config.deadzone_threshold,
            walk_force: config.walk_force,
            sprint_force: config.sprint_force,
            angular_damping_on_move: config.angular_damping_on_move,
            angular_brake_damping: config.angular_brake_damping,
            freeze_speed_threshold: config.freeze_speed_threshold,
            phase: LocomotionPhase::default(),
            applied_force: 0.0,
        }
    }

    pub fn phase(&self) -> LocomotionPhase {
        self.phase
    }

    /// Torque magnitude applied on the last tick, 0 when braking or skipped.
    pub fn applied_force(&self) -> f32 {
        self.applied_force
    }

    /// Walk force at the deadzone edge, sprint force at full deflection,
    /// linear in between.
    pub fn blended_force(&self, magnitude: f32) -> f32 {
        let t = inverse_lerp(self.deadzone_threshold, 1.0, magnitude);
        lerp(self.walk_force, self.sprint_force, t)
    }

    pub fn step<S: Simulator>(
        &mut self,
        sim: &mut S,
        ball: S::Body,
        axis: Vec2,
        head_yaw: Quat,
    ) -> LocomotionPhase {
        let magnitude = axis.length();
        // A zero axis has no direction to roll in, even with the deadzone off
        if magnitude < self.deadzone_threshold || magnitude <= f32::EPSILON {
            self.stop(sim, ball);
        } else {
            let torque = torque_axis(move_direction(head_yaw, axis));
            self.drive(sim, ball, torque, self.blended_force(magnitude));
        }
        self.phase
    }

    fn stop<S: Simulator>(&mut self, sim: &mut S, ball: S::Body) {
        self.applied_force = 0.0;
        sim.set_angular_damping(ball, self.angular_brake_damping);

        if sim.angular_velocity(ball).length() < self.freeze_speed_threshold {
            if self.phase != LocomotionPhase::Frozen {
                debug!("locomotion ball at rest, freezing rotation");
            }
            sim.set_rotation_frozen(ball, true);
            self.phase = LocomotionPhase::Frozen;
        } else if self.phase != LocomotionPhase::Frozen {
            self.phase = LocomotionPhase::Braking;
        }
    }

    fn drive<S: Simulator>(&mut self, sim: &mut S, ball: S::Body, torque: Vec3, force: f32) {
        if self.phase == LocomotionPhase::Frozen {
            debug!("locomotion input resumed, unfreezing rotation");
        }
        sim.set_rotation_frozen(ball, false);
        sim.set_angular_damping(ball, self.angular_damping_on_move);
        self.phase = LocomotionPhase::Moving;

        match torque.try_normalize() {
            Some(direction) => {
                sim.apply_torque(ball, direction * force, ForceMode::Force);
                self.applied_force = force;
            }
            None => {
                trace!("degenerate torque direction, skipping this tick");
                self.applied_force = 0.0;
            }
        }
    }
}

/// Flat input rotated into the head's heading.
pub fn move_direction(head_yaw: Quat, axis: Vec2) -> Vec3 {
    head_yaw * Vec3::new(axis.x, 0.0, axis.y)
}

/// Quarter turn from the travel direction to the axis the ball must spin about.
pub fn torque_axis(move_direction: Vec3) -> Vec3 {
    Vec3::new(move_direction.z, 0.0, move_direction.x)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `value` sits between `a` and `b`, clamped to `[0, 1]`.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
