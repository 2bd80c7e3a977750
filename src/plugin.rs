use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;

use crate::avatar::{HexaBody, RigHandles};
use crate::config::HexaBodyConfig;
use crate::crouch::RestPose;
use crate::error::{HexaBodyError, RigPart};
use crate::pose::{HandSide, TrackedPose, Tracker};
use crate::sim::{ForceMode, Simulator};

/// Drives every [`HexaBodyRig`] in the world.
///
/// Head following runs in `Update`, once per rendered frame. Locomotion,
/// crouch, chest orientation and hand placement run in `FixedUpdate`, ahead of
/// avian's own step in `FixedPostUpdate`.
///
/// Whatever writes [`TrackedInput`] (an XR backend, or [`DesktopInputPlugin`](crate::DesktopInputPlugin))
/// should run before these systems:
///
/// ```
/// # use bevy::prelude::*;
///
/// struct MyXrPlugin;
/// impl Plugin for MyXrPlugin {
///     fn build(&self, app: &mut App) {
///         app.add_systems(
///             Update,
///             read_headset.before(hexabody::hexabody_frame),
///         );
///     }
/// }
///
/// fn read_headset(_input: ResMut<hexabody::TrackedInput>) { }
/// ```
pub struct HexaBodyPlugin {
    pub config: HexaBodyConfig,
    pub physics_hz: f64,
}

pub static PHYSICS_HZ: f64 = 90.0;

impl Default for HexaBodyPlugin {
    fn default() -> Self {
        Self {
            config: HexaBodyConfig::default(),
            physics_hz: PHYSICS_HZ,
        }
    }
}

impl Plugin for HexaBodyPlugin {
    fn build(&self, app: &mut App) {
        if let Err(err) = self.config.validate() {
            error!("hexabody config rejected, rigs will not activate: {err}");
        }

        app.insert_resource(self.config.clone())
            .init_resource::<TrackedInput>()
            .insert_resource(Time::<Fixed>::from_hz(self.physics_hz))
            .add_systems(Update, (activate_hexabodies, hexabody_frame).chain())
            .add_systems(FixedUpdate, hexabody_fixed_tick);
    }
}

/// The latest tracked sample, in tracking space. Reused as-is until something overwrites it.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TrackedInput {
    pub head: TrackedPose,
    pub right_hand: TrackedPose,
    pub left_hand: TrackedPose,
    pub axis: Vec2,
    /// Tracking space to world space
    pub origin: Transform,
}

impl Tracker for TrackedInput {
    fn head_pose(&self) -> TrackedPose {
        self.head
    }

    fn hand_pose(&self, side: HandSide) -> TrackedPose {
        match side {
            HandSide::Right => self.right_hand,
            HandSide::Left => self.left_hand,
        }
    }

    fn locomotion_axis(&self) -> Vec2 {
        self.axis
    }

    fn tracking_origin(&self) -> Transform {
        self.origin
    }
}

/// Scene entities making up one avatar. Spawn this and the plugin does the rest.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HexaBodyRig {
    pub ball: Option<Entity>,
    pub fender: Option<Entity>,
    pub chest: Option<Entity>,
    pub head: Option<Entity>,
    pub spine: Option<Entity>,
    pub right_hand: Option<Entity>,
    pub left_hand: Option<Entity>,
}

impl HexaBodyRig {
    pub fn handles(&self) -> RigHandles<Entity, Entity> {
        RigHandles {
            ball: self.ball,
            chest: self.chest,
            head_anchor: self.head,
            spine: self.spine,
            right_hand: self.right_hand,
            left_hand: self.left_hand,
        }
    }

    /// Ball and fender are unit primitives, so their heights are their world Y scale.
    /// Heights are measured in world space, so parts parented under a root calibrate correctly.
    pub fn rest_pose(&self, transforms: &TransformHelper) -> crate::error::Result<RestPose> {
        let get = |entity: Option<Entity>, part: RigPart| {
            entity
                .and_then(|e| transforms.compute_global_transform(e).ok())
                .map(|global| global.to_scale_rotation_translation())
                .ok_or(HexaBodyError::MissingDependency(part))
        };
        let (ball_scale, _, _) = get(self.ball, RigPart::Ball)?;
        let (fender_scale, _, _) = get(self.fender, RigPart::Fender)?;
        let (_, chest_rotation, chest) = get(self.chest, RigPart::Chest)?;
        let (_, _, head) = get(self.head, RigPart::HeadAnchor)?;

        Ok(RestPose {
            ball_height: ball_scale.y,
            fender_height: fender_scale.y,
            head_y: head.y,
            chest_y: chest.y,
            chest_rotation,
        })
    }
}

/// A running avatar.
#[derive(Component, Debug)]
pub struct HexaBodyAvatar(pub HexaBody<Entity, Entity>);

/// Left on a rig that failed to activate so it is not retried every frame.
#[derive(Component, Debug)]
pub struct HexaBodyFault(pub String);

/// Drive target for a spine or hand joint, in the parent body's frame.
/// A joint motor on the host side follows it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct JointTarget {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for JointTarget {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

type BallData = (
    &'static mut AngularDamping,
    &'static mut LockedAxes,
    &'static mut ExternalTorque,
    Option<&'static mut ExternalAngularImpulse>,
    &'static AngularVelocity,
);

/// avian3d bodies and [`JointTarget`]s behind the [`Simulator`] seam.
#[derive(SystemParam)]
pub struct AvianSimulator<'w, 's> {
    poses: Query<'w, 's, &'static mut Transform>,
    balls: Query<'w, 's, BallData>,
    joints: Query<'w, 's, &'static mut JointTarget>,
}

impl Simulator for AvianSimulator<'_, '_> {
    type Body = Entity;
    type Joint = Entity;

    fn set_angular_damping(&mut self, body: Entity, damping: f32) {
        if let Ok((mut current, ..)) = self.balls.get_mut(body) {
            current.0 = damping;
        }
    }

    fn set_rotation_frozen(&mut self, body: Entity, frozen: bool) {
        if let Ok((_, mut locked, ..)) = self.balls.get_mut(body) {
            let axes = *locked;
            *locked = if frozen {
                axes.lock_rotation_x().lock_rotation_y().lock_rotation_z()
            } else {
                axes.unlock_rotation_x().unlock_rotation_y().unlock_rotation_z()
            };
        }
    }

    fn apply_torque(&mut self, body: Entity, torque: Vec3, mode: ForceMode) {
        let Ok((_, _, mut external, impulse, _)) = self.balls.get_mut(body) else {
            return;
        };
        match mode {
            ForceMode::Force => {
                external.apply_torque(torque);
            }
            ForceMode::Impulse => match impulse {
                Some(mut impulse) => {
                    impulse.apply_impulse(torque);
                }
                None => warn_once!("angular impulse requested on a body without ExternalAngularImpulse"),
            },
        }
    }

    fn angular_velocity(&self, body: Entity) -> Vec3 {
        self.balls
            .get(body)
            .map(|(.., velocity)| velocity.0)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_body_position(&mut self, body: Entity, position: Vec3) {
        if let Ok(mut transform) = self.poses.get_mut(body) {
            transform.translation = position;
        }
    }

    fn set_body_rotation(&mut self, body: Entity, rotation: Quat) {
        if let Ok(mut transform) = self.poses.get_mut(body) {
            transform.rotation = rotation;
        }
    }

    fn set_target_position(&mut self, joint: Entity, position: Vec3) {
        if let Ok(mut target) = self.joints.get_mut(joint) {
            target.position = position;
        }
    }

    fn set_target_rotation(&mut self, joint: Entity, rotation: Quat) {
        if let Ok(mut target) = self.joints.get_mut(joint) {
            target.rotation = rotation;
        }
    }
}

/// Calibrates new rigs and gives their bodies and joints the components the
/// controllers write to.
pub fn activate_hexabodies(
    mut commands: Commands,
    config: Res<HexaBodyConfig>,
    rigs: Query<(Entity, &HexaBodyRig), (Without<HexaBodyAvatar>, Without<HexaBodyFault>)>,
    transforms: TransformHelper,
) {
    for (entity, rig) in &rigs {
        let activated = rig
            .rest_pose(&transforms)
            .and_then(|rest| HexaBody::activate(&config, &rig.handles(), &rest));

        match activated {
            Ok(body) => {
                info!(
                    "hexabody {entity} active, calibration offset {:.3}",
                    body.calibration().0
                );
                if let Some(ball) = rig.ball {
                    commands
                        .entity(ball)
                        .insert_if_new((
                            AngularDamping(config.angular_brake_damping),
                            LockedAxes::new(),
                        ))
                        .insert(ExternalTorque::default().with_persistence(false));
                }
                for joint in [rig.spine, rig.right_hand, rig.left_hand].into_iter().flatten() {
                    commands.entity(joint).insert_if_new(JointTarget::default());
                }
                commands.entity(entity).insert(HexaBodyAvatar(body));
            }
            Err(err) => {
                error!("hexabody {entity} disabled: {err}");
                commands.entity(entity).insert(HexaBodyFault(err.to_string()));
            }
        }
    }
}

pub fn hexabody_frame(
    input: Res<TrackedInput>,
    mut sim: AvianSimulator,
    mut avatars: Query<&mut HexaBodyAvatar>,
) {
    for mut avatar in &mut avatars {
        avatar.0.on_frame(&*input, &mut sim);
    }
}

// ██╗      ██████╗  ██████╗ ██╗ ██████╗
// ██║     ██╔═══██╗██╔════╝ ██║██╔════╝
// ██║     ██║   ██║██║  ███╗██║██║
// ██║     ██║   ██║██║   ██║██║██║
// ███████╗╚██████╔╝╚██████╔╝██║╚██████╗
// ╚══════╝ ╚═════╝  ╚═════╝ ╚═╝ ╚═════╝

pub fn hexabody_fixed_tick(
    time: Res<Time<Fixed>>,
    input: Res<TrackedInput>,
    mut sim: AvianSimulator,
    mut avatars: Query<&mut HexaBodyAvatar>,
) {
    let dt = time.timestep().as_secs_f32();
    for mut avatar in &mut avatars {
        avatar.0.on_fixed_tick(&*input, &mut sim, dt);
    }
}
