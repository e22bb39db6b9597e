// Offset wrist arms (Universal Robots style).
//
// Standard DH parameters, with a/d taken from the geometry:
// Link | α      | θ
// -----|--------|----
// L1   | +90°   | J1
// L2   | 0      | J2
// L3   | 0      | J3
// L4   | +90°   | J4
// L5   | -90°   | J5
// L6   | 0      | J6
//
// Joints 2, 3 and 4 share one axis direction, so the arm is planar once J1 is
// known. The wrist is not spherical: d4, d5 and d6 keep axes 4, 5 and 6 apart.
//
// Angle convention: J1, J2, J4 and J6 come back in [0, 2π). J3 is the signed
// elbow angle and J5 is either the principal angle or its explement.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use tracing::trace;

use super::{checked_acos, dh_chain, wrap_positive, IkOutcome, Joints, KinematicSolver};
use crate::configuration::BranchSelection;
use crate::errors::{Diagnostic, SingularityKind};
use crate::robot_config::{LinkGeometry, Topology};
use crate::transform::Transform;

const ALPHA: [f64; 6] = [FRAC_PI_2, 0.0, 0.0, FRAC_PI_2, -FRAC_PI_2, 0.0];

/// |sin J5| below this leaves J6 undetermined.
pub const WRIST_SINGULARITY_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetWrist;

impl OffsetWrist {
    fn link(geometry: &LinkGeometry, index: usize, theta: f64) -> Transform {
        Transform::from_dh(geometry.a(index), ALPHA[index], theta, geometry.d(index))
    }
}

impl KinematicSolver for OffsetWrist {
    fn topology(&self) -> Topology {
        Topology::OffsetWrist
    }

    fn forward(&self, geometry: &LinkGeometry, joints: &Joints) -> [Transform; 6] {
        dh_chain(geometry, &ALPHA, joints)
    }

    fn inverse(&self, geometry: &LinkGeometry, flange: &Transform, branch: BranchSelection) -> IkOutcome {
        let mut diagnostics = Vec::new();
        let a = geometry.lengths();
        let d = geometry.offsets();

        let p = flange.translation();
        let rotation = flange.rotation();

        // Joint 1: frame 5 origin sits d4 off the plane of the arm
        let p5 = p - d[5] * flange.z_axis();
        let psi = p5.y.atan2(p5.x);
        let phi = match checked_acos(d[3] / p5.x.hypot(p5.y)) {
            Some(phi) => phi,
            None => {
                diagnostics.push(Diagnostic::Singularity { joint: 1, kind: SingularityKind::Overhead });
                0.0
            }
        };
        let q1 = if branch.shoulder {
            psi + FRAC_PI_2 + phi
        } else {
            psi + FRAC_PI_2 - phi
        };
        let (s1, c1) = q1.sin_cos();

        // Joint 5: flange height along the joint 1 normal
        let principal = match checked_acos((p.x * s1 - p.y * c1 - d[3]) / d[5]) {
            Some(angle) => angle,
            None => {
                diagnostics.push(Diagnostic::Singularity { joint: 5, kind: SingularityKind::Overhead });
                diagnostics.push(Diagnostic::Unreachable { joint: 5 });
                PI
            }
        };
        let q5 = if branch.wrist { principal } else { TAU - principal };
        let s5 = q5.sin();

        // Joint 6: flange X and Y axes projected on the joint 1 normal
        if s5.abs() < WRIST_SINGULARITY_TOLERANCE {
            diagnostics.push(Diagnostic::Singularity { joint: 5, kind: SingularityKind::Wrist });
        }
        let sign = if s5 < 0.0 { -1.0 } else { 1.0 };
        let (nx, ny) = (rotation[(0, 0)], rotation[(1, 0)]);
        let (ox, oy) = (rotation[(0, 1)], rotation[(1, 1)]);
        let q6 = (sign * (-ox * s1 + oy * c1)).atan2(sign * (nx * s1 - ny * c1));

        // Joint 3: strip links 1, 5 and 6 to get the planar part T14
        let t14 = Self::link(geometry, 0, q1)
            .inverse()
            .compose(flange)
            .compose(&Self::link(geometry, 5, q6).inverse())
            .compose(&Self::link(geometry, 4, q5).inverse());
        let p13 = t14.translation() - d[3] * t14.y_axis();

        let cos3 = (p13.x * p13.x + p13.y * p13.y - a[1] * a[1] - a[2] * a[2]) / (2.0 * a[1] * a[2]);
        let elbow = match checked_acos(cos3) {
            Some(angle) => angle,
            None => {
                diagnostics.push(Diagnostic::Unreachable { joint: 3 });
                0.0
            }
        };
        let q3 = if branch.elbow { -elbow } else { elbow };

        // Joint 2: rotate the elbow triangle onto p13
        let (s3, c3) = q3.sin_cos();
        let k1 = a[1] + a[2] * c3;
        let k2 = a[2] * s3;
        let q2 = (k1 * p13.y - k2 * p13.x).atan2(k1 * p13.x + k2 * p13.y);

        // Joint 4: whatever is left of the planar rotation
        let planar = t14.matrix()[(1, 0)].atan2(t14.matrix()[(0, 0)]);
        let q4 = planar - q2 - q3;

        trace!(q1, q5, cos3, "offset wrist joint solve");

        let joints = [wrap_positive(q1), wrap_positive(q2), q3, wrap_positive(q4), q5, wrap_positive(q6)];
        IkOutcome { joints, diagnostics }
    }
}
