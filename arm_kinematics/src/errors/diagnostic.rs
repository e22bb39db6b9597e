use std::fmt;
use serde::{Deserialize, Serialize};

use crate::robot_config::JointRange;

/// Which degenerate configuration a solver ran into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingularityKind {
    /// Joint 5 near zero: axes 4 and 6 line up.
    Wrist,
    /// Wrist point over (or too close to) the joint 1 axis.
    Overhead,
}

/// Taxonomy tag of a [`Diagnostic`], handy for filtering.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    OutOfRange,
    Unreachable,
    Singularity,
}

/// A non-fatal finding raised while solving.
///
/// Solving always produces a full best-effort solution; everything that went
/// wrong along the way is reported here instead. `joint` is 1-based.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Diagnostic {
    /// A resolved angle lies outside the joint's configured range.
    OutOfRange { joint: usize, angle: f64, range: JointRange },
    /// A law-of-cosines or ratio argument left its domain; the angle is a fallback.
    Unreachable { joint: usize },
    /// The pose is within tolerance of a degenerate configuration.
    Singularity { joint: usize, kind: SingularityKind },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::OutOfRange { .. } => DiagnosticKind::OutOfRange,
            Diagnostic::Unreachable { .. } => DiagnosticKind::Unreachable,
            Diagnostic::Singularity { .. } => DiagnosticKind::Singularity,
        }
    }

    pub fn joint(&self) -> usize {
        match *self {
            Diagnostic::OutOfRange { joint, .. }
            | Diagnostic::Unreachable { joint }
            | Diagnostic::Singularity { joint, .. } => joint,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Diagnostic::OutOfRange { joint, angle, range } => write!(
                f,
                "Joint {} at {:.2}° is outside [{:.2}°, {:.2}°]",
                joint,
                angle.to_degrees(),
                range.min.to_degrees(),
                range.max.to_degrees()
            ),
            Diagnostic::Unreachable { joint } => write!(f, "Target unreachable (joint {})", joint),
            Diagnostic::Singularity { joint, kind: SingularityKind::Wrist } => {
                write!(f, "Near wrist singularity (joint {})", joint)
            }
            Diagnostic::Singularity { joint, kind: SingularityKind::Overhead } => {
                write!(f, "Near overhead singularity (joint {})", joint)
            }
        }
    }
}
