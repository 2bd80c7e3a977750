//! The whole avatar: one sampler and four controllers switched on and off together.

use bevy::prelude::*;

use crate::config::HexaBodyConfig;
use crate::crouch::{CalibrationOffset, CrouchController, JumpState, RestPose};
use crate::error::{HexaBodyError, Result, RigPart};
use crate::hands::place_hands;
use crate::locomotion::{LocomotionController, LocomotionPhase};
use crate::orientation::OrientationController;
use crate::pose::{PoseSnapshot, Tracker};
use crate::sim::Simulator;

/// Handles to the host's bodies (`B`) and joints (`J`). Everything must be
/// set before [`HexaBody::activate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigHandles<B, J> {
    pub ball: Option<B>,
    pub chest: Option<B>,
    pub head_anchor: Option<B>,
    pub spine: Option<J>,
    pub right_hand: Option<J>,
    pub left_hand: Option<J>,
}

impl<B, J> Default for RigHandles<B, J> {
    fn default() -> Self {
        Self {
            ball: None,
            chest: None,
            head_anchor: None,
            spine: None,
            right_hand: None,
            left_hand: None,
        }
    }
}

impl<B: Copy, J: Copy> RigHandles<B, J> {
    fn resolve(&self) -> Result<Rig<B, J>> {
        Ok(Rig {
            ball: self.ball.ok_or(HexaBodyError::MissingDependency(RigPart::Ball))?,
            chest: self.chest.ok_or(HexaBodyError::MissingDependency(RigPart::Chest))?,
            head_anchor: self
                .head_anchor
                .ok_or(HexaBodyError::MissingDependency(RigPart::HeadAnchor))?,
            spine: self.spine.ok_or(HexaBodyError::MissingDependency(RigPart::Spine))?,
            right_hand: self
                .right_hand
                .ok_or(HexaBodyError::MissingDependency(RigPart::RightHand))?,
            left_hand: self
                .left_hand
                .ok_or(HexaBodyError::MissingDependency(RigPart::LeftHand))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rig<B, J> {
    ball: B,
    chest: B,
    head_anchor: B,
    spine: J,
    right_hand: J,
    left_hand: J,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexaBody<B, J> {
    rig: Rig<B, J>,
    snapshot: PoseSnapshot,
    orientation: OrientationController,
    locomotion: LocomotionController,
    crouch: CrouchController,
    enabled: bool,
}

impl<B: Copy, J: Copy> HexaBody<B, J> {
    /// Validates configuration and handles, then calibrates against the rest pose.
    pub fn activate(config: &HexaBodyConfig, handles: &RigHandles<B, J>, rest: &RestPose) -> Result<Self> {
        config.validate()?;
        let rig = handles.resolve()?;
        Ok(Self {
            rig,
            snapshot: PoseSnapshot::default(),
            orientation: OrientationController::new(rest.chest_rotation, config.orientation_smoothing_rate),
            locomotion: LocomotionController::new(config),
            crouch: CrouchController::new(config, CalibrationOffset::from_rest_pose(rest)),
            enabled: true,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn snapshot(&self) -> &PoseSnapshot {
        &self.snapshot
    }

    pub fn calibration(&self) -> CalibrationOffset {
        self.crouch.offset()
    }

    pub fn chest_rotation(&self) -> Quat {
        self.orientation.chest_rotation()
    }

    pub fn locomotion_phase(&self) -> LocomotionPhase {
        self.locomotion.phase()
    }

    pub fn applied_force(&self) -> f32 {
        self.locomotion.applied_force()
    }

    pub fn jump_state(&self) -> JumpState {
        self.crouch.jump_state
    }

    pub fn set_jump_state(&mut self, state: JumpState) {
        self.crouch.jump_state = state;
    }

    /// Frame-rate entry point: keeps the head anchor on the tracked head.
    pub fn on_frame<S>(&mut self, tracker: &impl Tracker, sim: &mut S)
    where
        S: Simulator<Body = B, Joint = J>,
    {
        if !self.enabled {
            return;
        }
        self.snapshot = PoseSnapshot::sample(tracker);
        sim.set_body_position(self.rig.head_anchor, self.snapshot.head_world_position());
    }

    /// Fixed-step entry point. `dt` is the physics tick duration.
    pub fn on_fixed_tick<S>(&mut self, tracker: &impl Tracker, sim: &mut S, dt: f32)
    where
        S: Simulator<Body = B, Joint = J>,
    {
        if !self.enabled {
            return;
        }
        self.snapshot = PoseSnapshot::sample(tracker);
        let snapshot = self.snapshot;

        self.locomotion
            .step(sim, self.rig.ball, snapshot.axis, snapshot.head_yaw);
        self.crouch
            .step(sim, self.rig.spine, snapshot.head.position.y);
        let chest = self.orientation.step(snapshot.head_yaw, dt);
        sim.set_body_rotation(self.rig.chest, chest);
        place_hands(sim, &snapshot, self.rig.right_hand, self.rig.left_hand);
    }
}
