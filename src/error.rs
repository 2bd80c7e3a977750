use std::fmt;

use thiserror::Error;

/// The rig parts a [`HexaBody`](crate::HexaBody) needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigPart {
    Ball,
    Fender,
    Chest,
    HeadAnchor,
    Spine,
    RightHand,
    LeftHand,
}

impl fmt::Display for RigPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RigPart::Ball => "locomotion ball",
            RigPart::Fender => "fender",
            RigPart::Chest => "chest",
            RigPart::HeadAnchor => "head anchor",
            RigPart::Spine => "spine joint",
            RigPart::RightHand => "right hand joint",
            RigPart::LeftHand => "left hand joint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum HexaBodyError {
    #[error("rig is missing its {0}")]
    MissingDependency(RigPart),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, HexaBodyError>;
