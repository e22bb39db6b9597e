use std::error::Error;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Fatal problems with an arm description.
///
/// Solving never fails; these only come out of [`crate::ArmConfig::validate`]
/// and the constructors that call it. Joint numbers are 1-based.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    InvalidRange { joint: usize, min: f64, max: f64 },
    NonFiniteParameter { joint: usize },
    UnsupportedGeometry(String),
}

impl Error for KinematicsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KinematicsError::InvalidRange { joint, min, max } => {
                write!(f, "Joint {} has an invalid range [{}, {}]", joint, min, max)
            }
            KinematicsError::NonFiniteParameter { joint } => {
                write!(f, "Joint {} has a non-finite link parameter", joint)
            }
            KinematicsError::UnsupportedGeometry(ref msg) => write!(f, "Unsupported geometry: {}", msg),
        }
    }
}
