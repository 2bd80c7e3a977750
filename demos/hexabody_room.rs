//! A physics-driven body walking around a room, driven from the keyboard and mouse.
//!
//! - WASD / arrows roll the locomotion ball relative to where the head faces
//! - The mouse turns the head; the chest eases round after it
//! - Ctrl or C lowers the head, contracting the spine
//!
//! Avian's joints have no drive targets, so `follow_joint_targets` below plays
//! the part of a joint motor and moves the spine and hand bodies to their
//! [`JointTarget`]s.

use avian3d::prelude::*;
use bevy::prelude::*;

use hexabody::*;

use bevy::{render::camera::Exposure, window::CursorGrabMode};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            DesktopInputPlugin,
            HexaBodyPlugin::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (manage_cursor, display_text))
        .add_systems(FixedUpdate, follow_joint_targets.after(hexabody_fixed_tick))
        .run();
}

/// Body that a [`JointTarget`] positions relative to its parent body.
#[derive(Component)]
struct DrivenBy {
    parent: Entity,
    target: Entity,
    /// Hands take the target rotation; the chest is turned by the plugin itself
    rotate: bool,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 7.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let skin = materials.add(Color::srgb(0.8, 0.7, 0.6));

    // Unit primitives scaled to size; the plugin reads ball and fender height from their world scale.y
    let ball = commands
        .spawn((
            RigidBody::Dynamic,
            Collider::sphere(0.5),
            Friction::new(0.99),
            Mass(20.0),
            Mesh3d(meshes.add(Sphere::new(0.5))),
            MeshMaterial3d(skin.clone()),
            Transform::from_xyz(0.0, 0.2, 0.0).with_scale(Vec3::splat(0.4)),
        ))
        .id();
    let fender = commands
        .spawn((
            RigidBody::Dynamic,
            Collider::cylinder(0.5, 1.0),
            Mass(5.0),
            LockedAxes::ROTATION_LOCKED,
            Transform::from_xyz(0.0, 0.4, 0.0).with_scale(Vec3::new(0.5, 0.2, 0.5)),
        ))
        .id();
    commands.spawn(SphericalJoint::new(fender, ball));

    let chest = commands
        .spawn((
            RigidBody::Kinematic,
            Collider::cuboid(0.4, 0.5, 0.25),
            Mesh3d(meshes.add(Cuboid::new(0.4, 0.5, 0.25))),
            MeshMaterial3d(skin.clone()),
            Transform::from_xyz(0.0, 1.3, 0.0),
        ))
        .id();
    let head = commands.spawn(Transform::from_xyz(0.0, 1.7, 0.0)).id();

    let spine = commands.spawn_empty().id();
    let right_hand = commands.spawn_empty().id();
    let left_hand = commands.spawn_empty().id();

    for target in [right_hand, left_hand] {
        commands.spawn((
            RigidBody::Kinematic,
            Collider::sphere(0.06),
            Mesh3d(meshes.add(Sphere::new(0.06))),
            MeshMaterial3d(skin.clone()),
            Transform::default(),
            DrivenBy {
                parent: head,
                target,
                rotate: true,
            },
        ));
    }
    commands.entity(chest).insert(DrivenBy {
        parent: fender,
        target: spine,
        rotate: false,
    });

    commands.spawn(HexaBodyRig {
        ball: Some(ball),
        fender: Some(fender),
        chest: Some(chest),
        head: Some(head),
        spine: Some(spine),
        right_hand: Some(right_hand),
        left_hand: Some(left_hand),
    });

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: std::f32::consts::TAU / 5.0,
            ..default()
        }),
        Exposure::SUNLIGHT,
        Transform::from_xyz(0.0, 2.5, 4.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    ));

    // A cube to roll into
    commands.spawn((
        RigidBody::Dynamic,
        Collider::cuboid(1.0, 1.0, 1.0),
        Mesh3d(meshes.add(Cuboid::default())),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.7))),
        Transform::from_xyz(3.0, 2.0, 3.0),
    ));

    // floor
    commands.spawn((
        Friction::new(0.99),
        RigidBody::Static,
        Collider::cuboid(100.0, 1.0, 100.0),
        Mesh3d(meshes.add(Cuboid::new(100.0, 1.0, 100.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    commands.spawn((Text::default(), Node::default()));
}

/// Keeps the chest above the fender by the spine target, and the hands on their targets.
fn follow_joint_targets(
    targets: Query<&JointTarget>,
    parents: Query<&Transform, Without<DrivenBy>>,
    mut driven: Query<(&DrivenBy, &mut Transform)>,
) {
    for (driven_by, mut transform) in &mut driven {
        let (Ok(target), Ok(parent)) = (targets.get(driven_by.target), parents.get(driven_by.parent)) else {
            continue;
        };
        transform.translation = parent.translation + target.position;
        if driven_by.rotate {
            transform.rotation = target.rotation;
        }
    }
}

fn manage_cursor(
    btn: Res<ButtonInput<MouseButton>>,
    key: Res<ButtonInput<KeyCode>>,
    mut window_query: Query<&mut Window>,
    mut avatars: Query<&mut HexaBodyAvatar>,
) {
    for mut window in &mut window_query {
        if btn.just_pressed(MouseButton::Left) {
            window.cursor_options.grab_mode = CursorGrabMode::Locked;
            window.cursor_options.visible = false;
            for mut avatar in &mut avatars {
                avatar.0.set_enabled(true);
            }
        }
        if key.just_pressed(KeyCode::Escape) {
            window.cursor_options.grab_mode = CursorGrabMode::None;
            window.cursor_options.visible = true;
            for mut avatar in &mut avatars {
                avatar.0.set_enabled(false);
            }
        }
    }
}

fn display_text(
    avatars: Query<&HexaBodyAvatar>,
    balls: Query<&AngularVelocity>,
    rigs: Query<&HexaBodyRig>,
    mut text_query: Query<&mut Text>,
) {
    for (avatar, rig) in avatars.iter().zip(rigs.iter()) {
        let spin = rig
            .ball
            .and_then(|ball| balls.get(ball).ok())
            .map(|v| v.0.length())
            .unwrap_or_default();
        for mut text in &mut text_query {
            text.0 = format!(
                "phase: {:?}\nforce: {:.2}\nspin: {:.2}\ncrouch offset: {:.2}",
                avatar.0.locomotion_phase(),
                avatar.0.applied_force(),
                spin,
                avatar.0.calibration().0,
            );
        }
    }
}
