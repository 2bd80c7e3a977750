use std::f32::consts::*;

use bevy::{input::mouse::MouseMotion, prelude::*, transform::helper::TransformHelper};

use crate::plugin::{HexaBodyRig, TrackedInput, hexabody_frame};
use crate::pose::TrackedPose;

/// Stands in for a headset when none is attached: keyboard for the locomotion
/// axis and crouching, mouse for head yaw.
pub struct DesktopInputPlugin;

impl Plugin for DesktopInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DesktopHead>().add_systems(
            Update,
            (mouse_look, keyboard_input, follow_ball)
                .chain()
                .before(hexabody_frame),
        );
    }
}

#[derive(Resource)]
pub struct DesktopHead {
    pub yaw: f32,
    pub standing_height: f32,
    pub crouched_height: f32,
    pub sensitivity: f32,
    /// Where the hands hang relative to the head, before yaw is applied
    pub right_hand_offset: Vec3,
}

impl Default for DesktopHead {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            standing_height: 1.7,
            crouched_height: 1.1,
            sensitivity: 0.001,
            right_hand_offset: Vec3::new(0.25, -0.45, 0.35),
        }
    }
}

fn mouse_look(mut mouse_events: EventReader<MouseMotion>, mut head: ResMut<DesktopHead>) {
    let mut mouse_delta = Vec2::ZERO;
    for mouse_event in mouse_events.read() {
        mouse_delta += mouse_event.delta;
    }
    mouse_delta *= head.sensitivity;

    head.yaw -= mouse_delta.x;
    if head.yaw.abs() > PI {
        head.yaw = head.yaw.rem_euclid(TAU);
    }
}

fn keyboard_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    head: Res<DesktopHead>,
    mut tracked: ResMut<TrackedInput>,
) {
    let up = keyboard_input.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]);
    let down = keyboard_input.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]);
    let left = keyboard_input.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    let right = keyboard_input.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);
    let crouch = keyboard_input.any_pressed([KeyCode::ControlLeft, KeyCode::KeyC]);

    let horizontal = right as i8 - left as i8;
    let vertical = up as i8 - down as i8;
    tracked.axis = Vec2::new(horizontal as f32, vertical as f32).clamp_length_max(1.0);

    let height = if crouch {
        head.crouched_height
    } else {
        head.standing_height
    };
    let rotation = Quat::from_rotation_y(head.yaw);
    let position = Vec3::Y * height;
    let mirrored = head.right_hand_offset * Vec3::new(-1.0, 1.0, 1.0);

    tracked.head = TrackedPose::new(position, rotation);
    tracked.right_hand = TrackedPose::new(position + rotation * head.right_hand_offset, rotation);
    tracked.left_hand = TrackedPose::new(position + rotation * mirrored, rotation);
}

/// Carries tracking space along with the ball, as walking in a real room would.
/// Only the horizontal position follows; the origin's height and heading are left alone.
fn follow_ball(
    rigs: Query<&HexaBodyRig>,
    transforms: TransformHelper,
    mut tracked: ResMut<TrackedInput>,
) {
    let Some(ball) = rigs.iter().find_map(|rig| rig.ball) else {
        return;
    };
    let Ok(global) = transforms.compute_global_transform(ball) else {
        return;
    };
    let ball = global.translation();
    let origin = &mut tracked.origin.translation;
    origin.x = ball.x;
    origin.z = ball.z;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::HexaBodyPlugin;
    use avian3d::prelude::AngularVelocity;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(HexaBodyPlugin::default())
            .add_event::<MouseMotion>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_plugins(DesktopInputPlugin);
        app
    }

    #[test]
    fn diagonal_keys_stay_on_the_unit_circle() {
        let mut app = app();
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::KeyW);
            keys.press(KeyCode::KeyD);
        }
        app.update();

        let axis = app.world().resource::<TrackedInput>().axis;
        assert!((axis.length() - 1.0).abs() < 1e-6);
        assert!(axis.x > 0.0 && axis.y > 0.0);
    }

    #[test]
    fn crouch_key_lowers_the_head() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::ControlLeft);
        app.update();

        let tracked = app.world().resource::<TrackedInput>();
        assert_eq!(tracked.head.position.y, 1.1);
        assert_eq!(tracked.axis, Vec2::ZERO);
    }

    #[test]
    fn mouse_turns_the_head() {
        let mut app = app();
        app.world_mut().send_event(MouseMotion {
            delta: Vec2::new(-500.0, 0.0),
        });
        app.update();

        let yaw = app.world().resource::<DesktopHead>().yaw;
        assert!((yaw - 0.5).abs() < 1e-6);
    }

    #[test]
    fn head_travels_with_the_ball() {
        let mut app = app();
        let world = app.world_mut();
        let ball = world
            .spawn((
                Transform::from_xyz(0.0, 0.2, 0.0).with_scale(Vec3::splat(0.4)),
                AngularVelocity::ZERO,
            ))
            .id();
        let fender = world
            .spawn(Transform::from_xyz(0.0, 0.4, 0.0).with_scale(Vec3::new(0.5, 0.2, 0.5)))
            .id();
        let chest = world.spawn(Transform::from_xyz(0.0, 1.3, 0.0)).id();
        let head = world.spawn(Transform::from_xyz(0.0, 1.7, 0.0)).id();
        let spine = world.spawn_empty().id();
        let right_hand = world.spawn_empty().id();
        let left_hand = world.spawn_empty().id();
        world.spawn(HexaBodyRig {
            ball: Some(ball),
            fender: Some(fender),
            chest: Some(chest),
            head: Some(head),
            spine: Some(spine),
            right_hand: Some(right_hand),
            left_hand: Some(left_hand),
        });
        app.update();

        app.world_mut()
            .get_mut::<Transform>(ball)
            .unwrap()
            .translation = Vec3::new(3.0, 0.2, -2.0);
        app.update();

        let origin = app.world().resource::<TrackedInput>().origin.translation;
        assert_eq!(origin, Vec3::new(3.0, 0.0, -2.0));
        let head = app.world().get::<Transform>(head).unwrap();
        assert!(head.translation.distance(Vec3::new(3.0, 1.7, -2.0)) < 1e-5);
    }
}
