//! Arm description: link geometry, joint ranges, wrist topology and placement.
//!
//! Geometry is expressed as six standard Denavit-Hartenberg `a`/`d` pairs.
//! Twists and joint-angle offsets are fixed per topology and live with the
//! solvers in [`crate::kinematics`]. Lengths are in mm, angles in radians.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::errors::KinematicsError;
use crate::transform::Transform;

/// Allowed rotation of one joint, inclusive on both ends.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointRange {
    pub min: f64,
    pub max: f64,
}

impl JointRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn from_degrees(min: f64, max: f64) -> Self {
        Self::new(min.to_radians(), max.to_radians())
    }

    /// One full turn either way.
    pub fn unlimited() -> Self {
        Self::new(-TAU, TAU)
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl Default for JointRange {
    fn default() -> Self {
        Self::new(-PI, PI)
    }
}

/// Per-joint link parameters and ranges, indexed 0..6.
///
/// Read-only once built. Ill-formed values are the caller's problem;
/// [`ArmConfig::validate`] is the place to catch them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkGeometry {
    a: [f64; 6],
    d: [f64; 6],
    ranges: [JointRange; 6],
}

impl LinkGeometry {
    pub fn new(a: [f64; 6], d: [f64; 6], ranges: [JointRange; 6]) -> Self {
        Self { a, d, ranges }
    }

    /// Geometry with every range set to [`JointRange::unlimited`].
    pub fn unlimited(a: [f64; 6], d: [f64; 6]) -> Self {
        Self::new(a, d, [JointRange::unlimited(); 6])
    }

    /// Link length of joint `index`.
    pub fn a(&self, index: usize) -> f64 {
        self.a[index]
    }

    /// Link offset of joint `index`.
    pub fn d(&self, index: usize) -> f64 {
        self.d[index]
    }

    pub fn range(&self, index: usize) -> JointRange {
        self.ranges[index]
    }

    pub fn lengths(&self) -> &[f64; 6] {
        &self.a
    }

    pub fn offsets(&self) -> &[f64; 6] {
        &self.d
    }

    pub fn is_within_range(&self, index: usize, angle: f64) -> bool {
        self.ranges[index].contains(angle)
    }

    /// Copy of this geometry with one range replaced.
    pub fn with_range(&self, index: usize, range: JointRange) -> Self {
        let mut ranges = self.ranges;
        ranges[index] = range;
        Self::new(self.a, self.d, ranges)
    }
}

/// Wrist family of the arm; selects the solver strategy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Axes 4, 5 and 6 intersect in one point.
    SphericalWrist,
    /// UR-style wrist with lateral offsets between axes 4, 5 and 6.
    OffsetWrist,
}

/// Complete arm description.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArmConfig {
    /// Display name
    pub name: String,

    pub topology: Topology,

    pub geometry: LinkGeometry,

    /// Arm base in world coordinates
    #[serde(default)]
    pub base: Transform,
}

// Link parameters the closed-form solvers assume to be zero
const SPHERICAL_ZERO_A: &[usize] = &[3, 4, 5];
const SPHERICAL_ZERO_D: &[usize] = &[1, 2, 4];
const OFFSET_ZERO_A: &[usize] = &[0, 3, 4, 5];
const OFFSET_ZERO_D: &[usize] = &[1, 2];

impl ArmConfig {
    /// ABB IRB 120 style arm with a spherical wrist.
    ///
    /// - Shoulder height (d1): 290 mm
    /// - Upper arm (a2): 270 mm
    /// - Elbow offset (a3): 70 mm
    /// - Forearm (d4): 302 mm
    /// - Flange distance (d6): 72 mm
    pub fn irb120() -> Self {
        Self {
            name: "IRB 120".to_string(),
            topology: Topology::SphericalWrist,
            geometry: LinkGeometry::new(
                [0.0, 270.0, 70.0, 0.0, 0.0, 0.0],
                [290.0, 0.0, 0.0, 302.0, 0.0, 72.0],
                [
                    JointRange::from_degrees(-165.0, 165.0),
                    JointRange::from_degrees(-110.0, 110.0),
                    JointRange::from_degrees(-110.0, 70.0),
                    JointRange::from_degrees(-160.0, 160.0),
                    JointRange::from_degrees(-120.0, 120.0),
                    JointRange::from_degrees(-180.0, 180.0),
                ],
            ),
            base: Transform::identity(),
        }
    }

    /// Universal Robots UR5e with its offset wrist.
    ///
    /// Parameters from the published UR DH table; upper arm and forearm
    /// lengths are negative in that convention.
    pub fn ur5e() -> Self {
        Self {
            name: "UR5e".to_string(),
            topology: Topology::OffsetWrist,
            geometry: LinkGeometry::unlimited(
                [0.0, -425.0, -392.2, 0.0, 0.0, 0.0],
                [162.5, 0.0, 0.0, 133.3, 99.7, 99.6],
            ),
            base: Transform::identity(),
        }
    }

    pub fn with_base(mut self, base: Transform) -> Self {
        self.base = base;
        self
    }

    /// Checks ranges, parameter finiteness and the zero-parameter layout the
    /// closed-form solver of this topology relies on.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        let g = &self.geometry;

        for i in 0..6 {
            let range = g.range(i);
            if !range.is_well_formed() {
                return Err(KinematicsError::InvalidRange { joint: i + 1, min: range.min, max: range.max });
            }
            if !g.a(i).is_finite() || !g.d(i).is_finite() {
                return Err(KinematicsError::NonFiniteParameter { joint: i + 1 });
            }
        }

        let (zero_a, zero_d) = match self.topology {
            Topology::SphericalWrist => (SPHERICAL_ZERO_A, SPHERICAL_ZERO_D),
            Topology::OffsetWrist => (OFFSET_ZERO_A, OFFSET_ZERO_D),
        };
        if let Some(&i) = zero_a.iter().find(|&&i| g.a(i) != 0.0) {
            return Err(KinematicsError::UnsupportedGeometry(format!(
                "{:?} requires a{} = 0, got {}",
                self.topology,
                i + 1,
                g.a(i)
            )));
        }
        if let Some(&i) = zero_d.iter().find(|&&i| g.d(i) != 0.0) {
            return Err(KinematicsError::UnsupportedGeometry(format!(
                "{:?} requires d{} = 0, got {}",
                self.topology,
                i + 1,
                g.d(i)
            )));
        }

        match self.topology {
            Topology::SphericalWrist => {
                if g.a(1) == 0.0 || g.a(2).hypot(g.d(3)) == 0.0 {
                    return Err(KinematicsError::UnsupportedGeometry(
                        "upper arm and forearm must have non-zero length".to_string(),
                    ));
                }
            }
            Topology::OffsetWrist => {
                if g.a(1) == 0.0 || g.a(2) == 0.0 || g.d(5) == 0.0 {
                    return Err(KinematicsError::UnsupportedGeometry(
                        "a2, a3 and d6 must be non-zero".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self::irb120()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(ArmConfig::irb120().validate().is_ok());
        assert!(ArmConfig::ur5e().validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = ArmConfig::irb120();
        config.geometry = config.geometry.with_range(3, JointRange::new(1.0, -1.0));

        assert_eq!(
            config.validate(),
            Err(KinematicsError::InvalidRange { joint: 4, min: 1.0, max: -1.0 })
        );
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let mut config = ArmConfig::ur5e();
        config.geometry = LinkGeometry::unlimited(
            [0.0, -425.0, f64::NAN, 0.0, 0.0, 0.0],
            [162.5, 0.0, 0.0, 133.3, 99.7, 99.6],
        );

        assert_eq!(config.validate(), Err(KinematicsError::NonFiniteParameter { joint: 3 }));
    }

    #[test]
    fn test_wrist_offset_rejected_for_spherical_wrist() {
        let mut config = ArmConfig::irb120();
        config.geometry = LinkGeometry::unlimited(
            [0.0, 270.0, 70.0, 0.0, 0.0, 0.0],
            [290.0, 0.0, 0.0, 302.0, 15.0, 72.0],
        );

        match config.validate() {
            Err(KinematicsError::UnsupportedGeometry(msg)) => assert!(msg.contains("d5"), "{}", msg),
            other => panic!("expected unsupported geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_range_predicate() {
        let geometry = ArmConfig::irb120().geometry.with_range(0, JointRange::new(-1.0, 1.0));

        assert!(geometry.is_within_range(0, 1.0));
        assert!(geometry.is_within_range(0, -1.0));
        assert!(!geometry.is_within_range(0, 2.0));
    }

    #[test]
    fn test_config_json_defaults_base() {
        let json = r#"{
            "name": "bench arm",
            "topology": "SphericalWrist",
            "geometry": {
                "a": [0.0, 270.0, 70.0, 0.0, 0.0, 0.0],
                "d": [290.0, 0.0, 0.0, 302.0, 0.0, 72.0],
                "ranges": [
                    {"min": -3.0, "max": 3.0}, {"min": -2.0, "max": 2.0}, {"min": -2.0, "max": 1.2},
                    {"min": -2.8, "max": 2.8}, {"min": -2.1, "max": 2.1}, {"min": -3.1, "max": 3.1}
                ]
            }
        }"#;

        let config: ArmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.topology, Topology::SphericalWrist);
        assert_eq!(config.base, Transform::identity());
        assert!(config.validate().is_ok());
    }
}
