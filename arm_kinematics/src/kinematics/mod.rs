//! Closed-form kinematics per wrist topology.
//!
//! Each topology is a [`KinematicSolver`] strategy: it owns its DH twist and
//! offset table, its branch decoding rules, its forward chain and its inverse
//! solution. The solvers are stateless; geometry is passed in on every call.

use std::f64::consts::{PI, TAU};
use std::fmt;

use crate::configuration::{BranchSelection, BranchSelector};
use crate::errors::Diagnostic;
use crate::robot_config::{LinkGeometry, Topology};
use crate::transform::Transform;

mod offset;
mod spherical;

pub use offset::OffsetWrist;
pub use spherical::SphericalWrist;

/// Joint angles in radians, joint 1 first.
pub type Joints = [f64; 6];

/// Result of an inverse solve: best-effort angles plus whatever went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct IkOutcome {
    pub joints: Joints,
    pub diagnostics: Vec<Diagnostic>,
}

pub trait KinematicSolver: fmt::Debug + Send + Sync {
    fn topology(&self) -> Topology;

    /// Frames of joints 1..6 relative to the arm base.
    fn forward(&self, geometry: &LinkGeometry, joints: &Joints) -> [Transform; 6];

    /// Joint angles placing the flange (frame 6) at `flange`, given in base
    /// coordinates. Never fails; infeasible geometry is reported in the outcome.
    fn inverse(&self, geometry: &LinkGeometry, flange: &Transform, branch: BranchSelection) -> IkOutcome;

    fn decode(&self, selector: BranchSelector) -> BranchSelection {
        BranchSelection::decode(selector, self.topology())
    }

    /// Flange pose for `joints`, i.e. the last forward frame.
    fn flange(&self, geometry: &LinkGeometry, joints: &Joints) -> Transform {
        self.forward(geometry, joints)[5]
    }
}

impl Topology {
    pub fn solver(&self) -> &'static dyn KinematicSolver {
        match self {
            Topology::SphericalWrist => &SphericalWrist,
            Topology::OffsetWrist => &OffsetWrist,
        }
    }
}

/// Chains DH link transforms, returning every intermediate frame.
pub(crate) fn dh_chain(
    geometry: &LinkGeometry,
    alpha: &[f64; 6],
    theta: &[f64; 6],
) -> [Transform; 6] {
    let mut frames = [Transform::identity(); 6];
    let mut current = Transform::identity();

    for i in 0..6 {
        let link = Transform::from_dh(geometry.a(i), alpha[i], theta[i], geometry.d(i));
        current = current.compose(&link);
        frames[i] = current;
    }

    frames
}

/// Wraps an angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Shifts a negative angle up by one turn, after reducing it below one turn.
pub fn wrap_positive(angle: f64) -> f64 {
    let reduced = angle % TAU;
    if reduced >= 0.0 {
        return reduced;
    }
    // A tiny negative remainder rounds up to exactly one turn
    let shifted = reduced + TAU;
    if shifted < TAU {
        shifted
    } else {
        0.0
    }
}

// Rounding slack on acos arguments; exact stretch-out and aligned poses land here
const ACOS_SLACK: f64 = 1e-9;

/// acos of `x` when `x` is inside [-1, 1] up to rounding, `None` otherwise
/// (NaN included).
pub(crate) fn checked_acos(x: f64) -> Option<f64> {
    if (-1.0 - ACOS_SLACK..=1.0 + ACOS_SLACK).contains(&x) {
        Some(x.clamp(-1.0, 1.0).acos())
    } else {
        None
    }
}

/// Smallest distance between two angles, modulo a full turn.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}
