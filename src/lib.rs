//! Physics-driven VR body: a rolling locomotion ball, a crouching spine, a chest
//! that follows head yaw, and hands pinned to the tracked controllers.

mod avatar;
mod config;
mod crouch;
mod error;
mod hands;
mod locomotion;
mod orientation;
mod pose;
mod sim;

pub use avatar::*;
pub use config::*;
pub use crouch::*;
pub use error::*;
pub use hands::*;
pub use locomotion::*;
pub use orientation::*;
pub use pose::*;
pub use sim::*;

mod plugin;
pub use plugin::*;
mod input_plugin;
pub use input_plugin::*;
