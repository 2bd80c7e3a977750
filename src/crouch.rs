use bevy::prelude::*;

use crate::config::HexaBodyConfig;
use crate::sim::Simulator;

/// Rig measurements taken once at activation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RestPose {
    /// Full height of the locomotion ball.
    pub ball_height: f32,
    /// Full height of the fender collar.
    pub fender_height: f32,
    pub head_y: f32,
    pub chest_y: f32,
    pub chest_rotation: Quat,
}

/// Vertical distance subtracted from tracked head height before it drives the spine.
/// Fixed for the lifetime of an avatar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationOffset(pub f32);

impl CalibrationOffset {
    pub fn from_rest_pose(rest: &RestPose) -> Self {
        Self(0.5 * rest.ball_height + 0.5 * rest.fender_height + (rest.head_y - rest.chest_y))
    }
}

/// Only `Grounded` is driven; `Airborne` exists so a jump can suspend the spine later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpState {
    #[default]
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrouchController {
    offset: CalibrationOffset,
    lowest: f32,
    highest: f32,
    pub jump_state: JumpState,
}

impl CrouchController {
    pub fn new(config: &HexaBodyConfig, offset: CalibrationOffset) -> Self {
        Self {
            offset,
            lowest: config.lowest_crouch,
            highest: config.highest_crouch,
            jump_state: JumpState::Grounded,
        }
    }

    pub fn offset(&self) -> CalibrationOffset {
        self.offset
    }

    /// `head_height` is the head's height in tracking space.
    pub fn crouch_amount(&self, head_height: f32) -> f32 {
        (head_height - self.offset.0).clamp(self.lowest, self.highest)
    }

    /// Writes the spine target and returns it, or `None` while airborne.
    pub fn step<S: Simulator>(&self, sim: &mut S, spine: S::Joint, head_height: f32) -> Option<Vec3> {
        if self.jump_state == JumpState::Airborne {
            return None;
        }
        let target = Vec3::new(0.0, self.crouch_amount(head_height), 0.0);
        sim.set_target_position(spine, target);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mock::RecordingSimulator;

    const SPINE: usize = 3;

    fn controller(offset: f32) -> CrouchController {
        CrouchController::new(&HexaBodyConfig::default(), CalibrationOffset(offset))
    }

    #[test]
    fn offset_from_rest_pose() {
        let rest = RestPose {
            ball_height: 0.4,
            fender_height: 0.2,
            head_y: 1.7,
            chest_y: 1.3,
            chest_rotation: Quat::IDENTITY,
        };
        let offset = CalibrationOffset::from_rest_pose(&rest);
        assert!((offset.0 - 0.7).abs() < 1e-6);
    }

    #[test]
    fn head_at_one_metre_with_offset_point_three() {
        let ctrl = controller(0.3);
        let mut sim = RecordingSimulator::default();
        let target = ctrl.step(&mut sim, SPINE, 1.0).unwrap();
        assert!((target.y - 0.7).abs() < 1e-6);
        assert_eq!(target.x, 0.0);
        assert_eq!(target.z, 0.0);
        assert_eq!(sim.last_target_position(SPINE), Some(target));
    }

    #[test]
    fn crouch_never_leaves_bounds() {
        let ctrl = controller(0.3);
        for i in -50..=100 {
            let h = i as f32 * 0.05;
            let amount = ctrl.crouch_amount(h);
            assert!((0.05..=1.8).contains(&amount), "h = {h} gave {amount}");
        }
        assert_eq!(ctrl.crouch_amount(-10.0), 0.05);
        assert_eq!(ctrl.crouch_amount(10.0), 1.8);
    }

    #[test]
    fn airborne_leaves_spine_alone() {
        let mut ctrl = controller(0.3);
        ctrl.jump_state = JumpState::Airborne;
        let mut sim = RecordingSimulator::default();
        assert_eq!(ctrl.step(&mut sim, SPINE, 1.0), None);
        assert!(sim.calls.is_empty());
    }
}
