use bevy::prelude::*;

/// A tracked device pose in tracking space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for TrackedPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TrackedPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Replaces anything that would poison the physics step with a neutral value.
    pub fn sanitized(self) -> Self {
        Self {
            position: if self.position.is_finite() {
                self.position
            } else {
                Vec3::ZERO
            },
            rotation: sanitize_rotation(self.rotation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSide {
    Right,
    Left,
}

/// Source of tracked input. Calls return the latest available sample and never block.
pub trait Tracker {
    fn head_pose(&self) -> TrackedPose;
    fn hand_pose(&self, side: HandSide) -> TrackedPose;
    fn locomotion_axis(&self) -> Vec2;

    /// Maps tracking space into world space.
    fn tracking_origin(&self) -> Transform {
        Transform::IDENTITY
    }
}

/// Everything the controllers read in one tick, sampled once up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSnapshot {
    pub head: TrackedPose,
    pub right_hand: TrackedPose,
    pub left_hand: TrackedPose,
    pub axis: Vec2,
    /// Head rotation with pitch and roll removed.
    pub head_yaw: Quat,
    pub origin: Transform,
}

impl Default for PoseSnapshot {
    fn default() -> Self {
        Self {
            head: TrackedPose::default(),
            right_hand: TrackedPose::default(),
            left_hand: TrackedPose::default(),
            axis: Vec2::ZERO,
            head_yaw: Quat::IDENTITY,
            origin: Transform::IDENTITY,
        }
    }
}

impl PoseSnapshot {
    pub fn sample(tracker: &impl Tracker) -> Self {
        let head = tracker.head_pose().sanitized();
        Self {
            head,
            right_hand: tracker.hand_pose(HandSide::Right).sanitized(),
            left_hand: tracker.hand_pose(HandSide::Left).sanitized(),
            axis: sanitize_axis(tracker.locomotion_axis()),
            head_yaw: yaw_only(head.rotation),
            origin: tracker.tracking_origin(),
        }
    }

    pub fn hand(&self, side: HandSide) -> TrackedPose {
        match side {
            HandSide::Right => self.right_hand,
            HandSide::Left => self.left_hand,
        }
    }

    /// Head position in world space.
    pub fn head_world_position(&self) -> Vec3 {
        self.origin.transform_point(self.head.position)
    }
}

/// Keeps only the rotation about +Y.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _, _) = sanitize_rotation(rotation).to_euler(EulerRot::YXZ);
    if yaw.is_finite() {
        Quat::from_rotation_y(yaw)
    } else {
        Quat::IDENTITY
    }
}

fn sanitize_rotation(rotation: Quat) -> Quat {
    if !rotation.is_finite() || rotation.length_squared() < f32::EPSILON {
        return Quat::IDENTITY;
    }
    rotation.normalize()
}

fn sanitize_axis(axis: Vec2) -> Vec2 {
    if !axis.is_finite() {
        return Vec2::ZERO;
    }
    axis.clamp_length_max(1.0)
}
