use bevy::prelude::*;

use crate::pose::{HandSide, PoseSnapshot};
use crate::sim::Simulator;

/// Passes tracked hand poses straight into the hand joint targets, positioned
/// relative to the head so arm placement ignores where the play space origin is.
pub fn hand_target(snapshot: &PoseSnapshot, side: HandSide) -> (Vec3, Quat) {
    let hand = snapshot.hand(side);
    (hand.position - snapshot.head.position, hand.rotation)
}

pub fn place_hands<S: Simulator>(sim: &mut S, snapshot: &PoseSnapshot, right: S::Joint, left: S::Joint) {
    for (side, joint) in [(HandSide::Right, right), (HandSide::Left, left)] {
        let (position, rotation) = hand_target(snapshot, side);
        sim.set_target_position(joint, position);
        sim.set_target_rotation(joint, rotation);
    }
}
