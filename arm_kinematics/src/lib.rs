//! Closed-form forward and inverse kinematics for six-axis arms.
//!
//! Two wrist families are supported: spherical wrists (axes 4, 5 and 6 meet in
//! one point) and UR-style offset wrists. Pick one through [`Topology`] in an
//! [`ArmConfig`], then solve joint or Cartesian [`Target`]s with an [`Arm`].
//! Solving never fails; problems come back as [`Diagnostic`]s on the solution.

pub mod configuration;
pub use configuration::{BranchSelection, BranchSelector};

pub mod errors;
pub use errors::*;

pub mod kinematics;
pub use kinematics::{normalize_angle, IkOutcome, Joints, KinematicSolver, OffsetWrist, SphericalWrist};

pub mod robot_config;
pub use robot_config::{ArmConfig, JointRange, LinkGeometry, Topology};

pub mod solution;
pub use solution::{Arm, CartesianTarget, KinematicSolution, SolutionAssembler, Target};

pub mod transform;
pub use transform::Transform;
