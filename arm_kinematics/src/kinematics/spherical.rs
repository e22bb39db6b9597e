// Spherical wrist arms (ABB, KUKA, Fanuc LR style).
//
// Standard DH parameters, with a/d taken from the geometry:
// Link | α      | θ
// -----|--------|-----------
// L1   | +90°   | J1
// L2   | 0      | J2 + 90°
// L3   | +90°   | J3
// L4   | -90°   | J4
// L5   | +90°   | J5
// L6   | 0      | J6
//
// At zero the upper arm points straight up and the forearm straight forward.
// The wrist centre sits d4 along the forearm and d6 behind the flange.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;
use tracing::trace;

use super::{checked_acos, dh_chain, normalize_angle, IkOutcome, Joints, KinematicSolver};
use crate::configuration::BranchSelection;
use crate::errors::{Diagnostic, SingularityKind};
use crate::robot_config::{LinkGeometry, Topology};
use crate::transform::Transform;

const ALPHA: [f64; 6] = [FRAC_PI_2, 0.0, FRAC_PI_2, -FRAC_PI_2, FRAC_PI_2, 0.0];
const THETA_OFFSET: [f64; 6] = [0.0, FRAC_PI_2, 0.0, 0.0, 0.0, 0.0];

/// How close R36(3,3) may get to 1 before the wrist counts as aligned.
pub const WRIST_SINGULARITY_TOLERANCE: f64 = 1e-4;

// Below this |sin J5| the J4/J6 split carries no information
const DEGENERATE_SIN_J5: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalWrist;

impl KinematicSolver for SphericalWrist {
    fn topology(&self) -> Topology {
        Topology::SphericalWrist
    }

    fn forward(&self, geometry: &LinkGeometry, joints: &Joints) -> [Transform; 6] {
        let mut theta = [0.0; 6];
        for i in 0..6 {
            theta[i] = joints[i] + THETA_OFFSET[i];
        }
        dh_chain(geometry, &ALPHA, &theta)
    }

    fn inverse(&self, geometry: &LinkGeometry, flange: &Transform, branch: BranchSelection) -> IkOutcome {
        let mut diagnostics = Vec::new();
        let a = geometry.lengths();
        let d = geometry.offsets();

        // Step 1: wrist centre, d6 back along the flange Z axis
        let mut center = flange.translation() - d[5] * flange.z_axis();

        // Step 2: J1 from the wrist centre heading
        let heading = center.y.atan2(center.x);
        let (sh, ch) = heading.sin_cos();
        let shoulder_origin = Vector3::new(a[0] * ch, a[0] * sh, d[0]);

        let mut j1 = heading;
        if branch.shoulder {
            // Reach backwards over the shoulder
            j1 += PI;
            center = Vector3::new(-center.x, -center.y, center.z);
        }

        // Step 3: J2, J3 from the shoulder/upper arm/forearm triangle
        let offset = center - shoulder_origin;
        let u = offset.x * ch + offset.y * sh;
        let v = offset.z;

        let l1 = a[1];
        let l2 = a[2].hypot(d[3]);
        let l3 = offset.norm();
        let forearm_angle = d[3].atan2(a[2]);

        let beta = checked_acos((l1 * l1 + l3 * l3 - l2 * l2) / (2.0 * l1 * l3));
        let gamma = checked_acos((l1 * l1 + l2 * l2 - l3 * l3) / (2.0 * l1 * l2));

        let (mut beta, mut gamma) = match (beta, gamma) {
            (Some(beta), Some(gamma)) => (beta, gamma),
            _ => {
                diagnostics.push(Diagnostic::Unreachable { joint: 3 });
                (0.0, PI)
            }
        };

        if branch.elbow {
            beta = -beta;
            gamma = -gamma;
        }

        let theta2 = v.atan2(u) + beta;
        let j2 = theta2 - THETA_OFFSET[1];
        let j3 = gamma - PI + forearm_angle;

        trace!(l1, l2, l3, beta, gamma, "spherical wrist arm triangle");

        // Step 4: J4, J5, J6 from R36 = inv(T03) * T06
        let t03 = self.forward(geometry, &[j1, j2, j3, 0.0, 0.0, 0.0])[2];
        let r36 = t03.inverse().compose(flange).rotation();

        let mut j5 = r36[(2, 2)].clamp(-1.0, 1.0).acos();
        let (mut j4, mut j6) = if r36[(0, 2)].hypot(r36[(1, 2)]) < DEGENERATE_SIN_J5 {
            // Axes 4 and 6 coincide: keep J4 at zero and give the whole turn to J6
            (0.0, r36[(1, 0)].atan2(r36[(1, 1)]))
        } else {
            (r36[(1, 2)].atan2(r36[(0, 2)]), r36[(2, 1)].atan2(-r36[(2, 0)]))
        };

        if branch.wrist {
            j4 += PI;
            j5 = -j5;
            j6 -= PI;
        }

        // Step 5: axes 4 and 6 aligned
        if (r36[(2, 2)] - 1.0).abs() < WRIST_SINGULARITY_TOLERANCE {
            diagnostics.push(Diagnostic::Singularity { joint: 5, kind: SingularityKind::Wrist });
        }

        let joints = [j1, j2, j3, j4, j5, j6].map(normalize_angle);
        IkOutcome { joints, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::BranchSelector;
    use crate::kinematics::angular_distance;
    use crate::robot_config::ArmConfig;

    fn geometry() -> LinkGeometry {
        ArmConfig::irb120().geometry
    }

    #[test]
    fn test_forward_kinematics_zero_position() {
        let frames = SphericalWrist.forward(&geometry(), &[0.0; 6]);

        // Upper arm vertical, elbow offset up, forearm and flange forward
        let wrist = frames[3].translation();
        let flange = frames[5];
        assert!((wrist - Vector3::new(302.0, 0.0, 630.0)).norm() < 1e-9, "wrist at {:?}", wrist);
        assert!((flange.translation() - Vector3::new(374.0, 0.0, 630.0)).norm() < 1e-9);
        assert!((flange.z_axis() - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_inverse_kinematics_roundtrip() {
        let g = geometry();
        let original = [0.3, -0.4, 0.5, 0.7, -0.9, 1.1];
        let flange = SphericalWrist.flange(&g, &original);

        let matches: Vec<BranchSelector> = BranchSelector::all()
            .filter(|&s| {
                let outcome = SphericalWrist.inverse(&g, &flange, SphericalWrist.decode(s));
                outcome
                    .joints
                    .iter()
                    .zip(original.iter())
                    .all(|(a, b)| angular_distance(*a, *b) < 1e-6)
            })
            .collect();

        // Shoulder and elbow pin the arm, wrist pins the sign of J5
        assert_eq!(matches.len(), 1, "matching selectors: {:?}", matches);
    }

    #[test]
    fn test_all_branches_reproduce_pose() {
        let g = geometry();
        let flange = SphericalWrist.flange(&g, &[0.2, 0.1, 0.3, 0.4, 0.6, -0.2]);

        for selector in BranchSelector::all() {
            let outcome = SphericalWrist.inverse(&g, &flange, SphericalWrist.decode(selector));
            assert!(outcome.diagnostics.is_empty(), "{:?}: {:?}", selector, outcome.diagnostics);

            let reached = SphericalWrist.flange(&g, &outcome.joints);
            assert!(reached.approx_eq(&flange, 1e-6), "{:?} reached {:?}", selector, reached);
        }
    }

    #[test]
    fn test_wrist_flip_negates_j5() {
        let g = geometry();
        let flange = SphericalWrist.flange(&g, &[0.2, 0.1, 0.3, 0.4, 0.6, -0.2]);

        let up = SphericalWrist.inverse(&g, &flange, SphericalWrist.decode(BranchSelector(BranchSelector::WRIST)));
        let flipped = SphericalWrist.inverse(&g, &flange, SphericalWrist.decode(BranchSelector(0)));

        assert!(up.joints[4] > 0.0);
        assert!((up.joints[4] + flipped.joints[4]).abs() < 1e-9);
        assert!(angular_distance(up.joints[3] + PI, flipped.joints[3]) < 1e-9);
        assert!(angular_distance(up.joints[5] - PI, flipped.joints[5]) < 1e-9);
    }

    #[test]
    fn test_unreachable_falls_back() {
        let flange = Transform::from_translation(5000.0, 0.0, 300.0);
        let outcome = SphericalWrist.inverse(&geometry(), &flange, BranchSelection::default());

        assert!(outcome.diagnostics.contains(&Diagnostic::Unreachable { joint: 3 }));
        assert!(outcome.joints.iter().all(|j| j.is_finite()));

        // Fallback stretches the arm straight at the target
        let wrist = SphericalWrist.forward(&geometry(), &outcome.joints)[3].translation();
        assert!(wrist.y.abs() < 1e-9);
        assert!(wrist.x > 0.0);
    }

    #[test]
    fn test_aligned_wrist_is_singular() {
        let g = geometry();
        let flange = SphericalWrist.flange(&g, &[0.2, 0.1, 0.3, 0.0, 0.0, 0.0]);
        let outcome = SphericalWrist.inverse(&g, &flange, SphericalWrist.decode(BranchSelector(0)));

        assert!(outcome
            .diagnostics
            .contains(&Diagnostic::Singularity { joint: 5, kind: SingularityKind::Wrist }));
        assert!(SphericalWrist.flange(&g, &outcome.joints).approx_eq(&flange, 1e-6));
    }
}
