use bevy::prelude::*;

/// How a torque is applied over a physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMode {
    /// Accumulated over the step.
    #[default]
    Force,
    /// Applied instantly as a change in angular momentum.
    Impulse,
}

/// The physics engine as seen by the controllers.
///
/// Bodies and joints are opaque handles owned by the host. Everything here is
/// a write except [`Simulator::angular_velocity`], which the braking policy
/// reads to decide when to freeze the ball.
pub trait Simulator {
    type Body: Copy;
    type Joint: Copy;

    fn set_angular_damping(&mut self, body: Self::Body, damping: f32);
    fn set_rotation_frozen(&mut self, body: Self::Body, frozen: bool);
    fn apply_torque(&mut self, body: Self::Body, torque: Vec3, mode: ForceMode);
    fn angular_velocity(&self, body: Self::Body) -> Vec3;

    /// Kinematic pose writes, used for the chest and the head anchor.
    fn set_body_position(&mut self, body: Self::Body, position: Vec3);
    fn set_body_rotation(&mut self, body: Self::Body, rotation: Quat);

    fn set_target_position(&mut self, joint: Self::Joint, position: Vec3);
    fn set_target_rotation(&mut self, joint: Self::Joint, rotation: Quat);
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Damping(usize, f32),
        Frozen(usize, bool),
        Torque(usize, Vec3, ForceMode),
        Position(usize, Vec3),
        Rotation(usize, Quat),
        TargetPosition(usize, Vec3),
        TargetRotation(usize, Quat),
    }

    /// Records every write and serves angular velocities from a table.
    #[derive(Debug, Default)]
    pub struct RecordingSimulator {
        pub calls: Vec<Call>,
        pub angular_velocities: Vec<(usize, Vec3)>,
    }

    impl RecordingSimulator {
        pub fn with_angular_velocity(mut self, body: usize, velocity: Vec3) -> Self {
            self.angular_velocities.push((body, velocity));
            self
        }

        pub fn torques(&self) -> Vec<Vec3> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Torque(_, t, _) => Some(*t),
                    _ => None,
                })
                .collect()
        }

        pub fn last_damping(&self, body: usize) -> Option<f32> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Damping(b, d) if *b == body => Some(*d),
                _ => None,
            })
        }

        pub fn last_frozen(&self, body: usize) -> Option<bool> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Frozen(b, f) if *b == body => Some(*f),
                _ => None,
            })
        }

        pub fn last_target_position(&self, joint: usize) -> Option<Vec3> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::TargetPosition(j, p) if *j == joint => Some(*p),
                _ => None,
            })
        }

        pub fn last_target_rotation(&self, joint: usize) -> Option<Quat> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::TargetRotation(j, r) if *j == joint => Some(*r),
                _ => None,
            })
        }

        pub fn last_rotation(&self, body: usize) -> Option<Quat> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Rotation(b, r) if *b == body => Some(*r),
                _ => None,
            })
        }

        pub fn last_position(&self, body: usize) -> Option<Vec3> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Position(b, p) if *b == body => Some(*p),
                _ => None,
            })
        }
    }

    impl Simulator for RecordingSimulator {
        type Body = usize;
        type Joint = usize;

        fn set_angular_damping(&mut self, body: usize, damping: f32) {
            self.calls.push(Call::Damping(body, damping));
        }

        fn set_rotation_frozen(&mut self, body: usize, frozen: bool) {
            self.calls.push(Call::Frozen(body, frozen));
        }

        fn apply_torque(&mut self, body: usize, torque: Vec3, mode: ForceMode) {
            self.calls.push(Call::Torque(body, torque, mode));
        }

        fn angular_velocity(&self, body: usize) -> Vec3 {
            self.angular_velocities
                .iter()
                .rev()
                .find(|(b, _)| *b == body)
                .map(|(_, v)| *v)
                .unwrap_or(Vec3::ZERO)
        }

        fn set_body_position(&mut self, body: usize, position: Vec3) {
            self.calls.push(Call::Position(body, position));
        }

        fn set_body_rotation(&mut self, body: usize, rotation: Quat) {
            self.calls.push(Call::Rotation(body, rotation));
        }

        fn set_target_position(&mut self, joint: usize, position: Vec3) {
            self.calls.push(Call::TargetPosition(joint, position));
        }

        fn set_target_rotation(&mut self, joint: usize, rotation: Quat) {
            self.calls.push(Call::TargetRotation(joint, rotation));
        }
    }
}
