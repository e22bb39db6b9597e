//! Target resolution and frame assembly.
//!
//! [`SolutionAssembler`] is the one entry point shared by both topologies: it
//! resolves a [`Target`] to joint angles (directly or through the topology's
//! inverse solver), checks the angles against the joint ranges and lays out
//! the eight world frames a viewer needs to place the arm's bodies.
//!
//! # Examples
//!
//! ```rust
//! use arm_kinematics::{Arm, ArmConfig, Target};
//!
//! let arm = Arm::from_config(ArmConfig::irb120()).unwrap();
//! let solution = arm.solve(&Target::Joint([0.0; 6]), None);
//!
//! assert!(solution.is_clean());
//! assert_eq!(solution.frames.len(), 8);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::configuration::BranchSelector;
use crate::errors::{Diagnostic, DiagnosticKind, KinematicsError};
use crate::kinematics::{Joints, KinematicSolver};
use crate::robot_config::{ArmConfig, LinkGeometry};
use crate::transform::Transform;

/// Where the arm should go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Target {
    /// Joint angles in radians, used as-is.
    Joint(Joints),
    /// A TCP pose in world coordinates, solved through inverse kinematics.
    Cartesian(CartesianTarget),
}

impl Target {
    fn kind_name(&self) -> &'static str {
        match self {
            Target::Joint(_) => "joint",
            Target::Cartesian(_) => "cartesian",
        }
    }
}

impl From<CartesianTarget> for Target {
    fn from(target: CartesianTarget) -> Self {
        Target::Cartesian(target)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartesianTarget {
    /// Desired TCP pose, world coordinates
    pub pose: Transform,

    /// TCP relative to the flange; overrides the tool handed to the solve call
    #[serde(default)]
    pub tool: Option<Transform>,

    #[serde(default)]
    pub selector: BranchSelector,
}

impl CartesianTarget {
    pub fn new(pose: Transform, selector: BranchSelector) -> Self {
        Self { pose, tool: None, selector }
    }

    pub fn with_tool(mut self, tool: Transform) -> Self {
        self.tool = Some(tool);
        self
    }
}

/// Resolved joints plus the frames of every body, in world coordinates.
///
/// `frames` is always `[base, joint 1, .., joint 6, tool]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KinematicSolution {
    pub joints: Joints,
    pub frames: [Transform; 8],
    pub diagnostics: Vec<Diagnostic>,
}

impl KinematicSolution {
    /// No diagnostics of any kind.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind() == kind)
    }

    pub fn base_frame(&self) -> &Transform {
        &self.frames[0]
    }

    /// Joint 6 frame.
    pub fn flange_frame(&self) -> &Transform {
        &self.frames[6]
    }

    pub fn tool_frame(&self) -> &Transform {
        &self.frames[7]
    }
}

/// Runs one topology's solver against one arm's geometry and placement.
#[derive(Debug, Clone, Copy)]
pub struct SolutionAssembler<'a> {
    solver: &'a dyn KinematicSolver,
    geometry: &'a LinkGeometry,
    base: Transform,
}

impl<'a> SolutionAssembler<'a> {
    pub fn new(solver: &'a dyn KinematicSolver, geometry: &'a LinkGeometry, base: Transform) -> Self {
        Self { solver, geometry, base }
    }

    /// Resolves `target` and assembles the frame chain.
    ///
    /// `tool` is the TCP relative to the flange. A Cartesian target carrying
    /// its own tool uses that one instead. Without any tool the TCP is the
    /// flange itself.
    ///
    /// Never fails: unreachable poses, singular configurations and joints
    /// out of range all come back as diagnostics on a full solution.
    pub fn solve(&self, target: &Target, tool: Option<&Transform>) -> KinematicSolution {
        debug!(
            kind = target.kind_name(),
            topology = ?self.solver.topology(),
            "Solving kinematics"
        );

        let (joints, mut diagnostics, tool) = match target {
            Target::Joint(joints) => (*joints, Vec::new(), tool.copied()),
            Target::Cartesian(cartesian) => {
                let tool = cartesian.tool.or_else(|| tool.copied());
                let tcp_to_flange = tool.map(|t| t.inverse()).unwrap_or_default();
                let flange = self.base.inverse().compose(&cartesian.pose).compose(&tcp_to_flange);

                let branch = self.solver.decode(cartesian.selector);
                let outcome = self.solver.inverse(self.geometry, &flange, branch);
                (outcome.joints, outcome.diagnostics, tool)
            }
        };

        diagnostics.extend(self.validate(&joints));
        for diagnostic in &diagnostics {
            warn!(%diagnostic, "Kinematic diagnostic");
        }

        let frames = self.assemble(&joints, tool.as_ref());
        KinematicSolution { joints, frames, diagnostics }
    }

    pub fn solve_all(&self, targets: &[Target], tool: Option<&Transform>) -> Vec<KinematicSolution> {
        targets.iter().map(|target| self.solve(target, tool)).collect()
    }

    fn validate(&self, joints: &Joints) -> Vec<Diagnostic> {
        joints
            .iter()
            .enumerate()
            .filter(|&(i, &angle)| !self.geometry.is_within_range(i, angle))
            .map(|(i, &angle)| Diagnostic::OutOfRange { joint: i + 1, angle, range: self.geometry.range(i) })
            .collect()
    }

    fn assemble(&self, joints: &Joints, tool: Option<&Transform>) -> [Transform; 8] {
        let links = self.solver.forward(self.geometry, joints);

        let mut frames = [self.base; 8];
        for (frame, link) in frames[1..7].iter_mut().zip(links.iter()) {
            *frame = self.base.compose(link);
        }
        frames[7] = match tool {
            Some(tool) => frames[6].compose(tool),
            None => frames[6],
        };
        frames
    }
}

/// A validated arm description bound to its topology's solver.
#[derive(Debug, Clone)]
pub struct Arm {
    config: ArmConfig,
    solver: &'static dyn KinematicSolver,
}

impl Arm {
    pub fn from_config(config: ArmConfig) -> Result<Self, KinematicsError> {
        config.validate()?;
        let solver = config.topology.solver();
        debug!(name = %config.name, topology = ?config.topology, "Arm ready");
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn solver(&self) -> &'static dyn KinematicSolver {
        self.solver
    }

    pub fn assembler(&self) -> SolutionAssembler<'_> {
        SolutionAssembler::new(self.solver, &self.config.geometry, self.config.base)
    }

    pub fn solve(&self, target: &Target, tool: Option<&Transform>) -> KinematicSolution {
        self.assembler().solve(target, tool)
    }

    pub fn solve_all(&self, targets: &[Target], tool: Option<&Transform>) -> Vec<KinematicSolution> {
        self.assembler().solve_all(targets, tool)
    }

    /// Frames for a joint vector, flange as TCP.
    pub fn forward(&self, joints: &Joints) -> KinematicSolution {
        self.solve(&Target::Joint(*joints), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SingularityKind;
    use crate::kinematics::SphericalWrist;
    use crate::robot_config::{JointRange, Topology};

    fn irb120() -> Arm {
        Arm::from_config(ArmConfig::irb120()).unwrap()
    }

    #[test]
    fn test_joint_target_passes_through() {
        let joints = [0.1, 0.2, -0.3, 0.4, 0.5, -0.6];
        let solution = irb120().forward(&joints);

        assert_eq!(solution.joints, joints);
        assert!(solution.is_clean());
        assert_eq!(*solution.base_frame(), Transform::identity());
        assert_eq!(solution.tool_frame(), solution.flange_frame());
    }

    #[test]
    fn test_out_of_range_names_joint() {
        let geometry = ArmConfig::irb120().geometry.with_range(1, JointRange::new(-1.0, 1.0));
        let assembler = SolutionAssembler::new(&SphericalWrist, &geometry, Transform::identity());

        let solution = assembler.solve(&Target::Joint([0.0, 2.0, 0.0, 0.0, 0.0, 0.0]), None);

        assert_eq!(
            solution.diagnostics,
            vec![Diagnostic::OutOfRange { joint: 2, angle: 2.0, range: JointRange::new(-1.0, 1.0) }]
        );
        assert!(solution.has(DiagnosticKind::OutOfRange));
        assert!(!solution.has(DiagnosticKind::Unreachable));
        assert_eq!(solution.frames.len(), 8);
    }

    #[test]
    fn test_ik_diagnostics_come_first() {
        let arm = irb120();
        let target = CartesianTarget::new(Transform::from_translation(5000.0, 0.0, 300.0), BranchSelector(0));
        let solution = arm.solve(&target.into(), None);

        assert_eq!(solution.diagnostics[0], Diagnostic::Unreachable { joint: 3 });
        assert!(solution.diagnostics.len() > 1);
        assert!(solution.diagnostics[1..].iter().all(|d| d.kind() == DiagnosticKind::OutOfRange));
    }

    #[test]
    fn test_tool_frame_offsets_flange() {
        let tool = Transform::from_translation(0.0, 0.0, 100.0);
        let solution = irb120().solve(&Target::Joint([0.0; 6]), Some(&tool));

        // Flange Z points along base X at zero
        let tcp = solution.tool_frame().translation();
        assert!((tcp.x - 474.0).abs() < 1e-9, "tcp at {:?}", tcp);
        assert!(tcp.y.abs() < 1e-9 && (tcp.z - 630.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_tool_overrides_call_tool() {
        let arm = irb120();
        let target_tool = Transform::from_translation(0.0, 0.0, 50.0);
        let call_tool = Transform::from_translation(0.0, 0.0, 200.0);

        let reference = arm.solve(&Target::Joint([0.2, 0.1, 0.3, 0.4, 0.6, -0.2]), Some(&target_tool));
        let target = CartesianTarget::new(*reference.tool_frame(), BranchSelector(BranchSelector::WRIST))
            .with_tool(target_tool);
        let solution = arm.solve(&target.into(), Some(&call_tool));

        assert!(solution.is_clean(), "{:?}", solution.diagnostics);
        assert!(solution.tool_frame().approx_eq(reference.tool_frame(), 1e-6));
        assert!(solution.flange_frame().approx_eq(reference.flange_frame(), 1e-6));
    }

    #[test]
    fn test_aligned_wrist_reports_singularity() {
        let arm = irb120();
        let reference = arm.forward(&[0.2, 0.1, 0.3, 0.0, 0.0, 0.0]);
        let target = CartesianTarget::new(*reference.tool_frame(), BranchSelector(0));
        let solution = arm.solve(&target.into(), None);

        assert!(solution
            .diagnostics
            .contains(&Diagnostic::Singularity { joint: 5, kind: SingularityKind::Wrist }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ArmConfig::ur5e();
        config.geometry = config.geometry.with_range(5, JointRange::new(2.0, -2.0));

        assert_eq!(
            Arm::from_config(config).unwrap_err(),
            KinematicsError::InvalidRange { joint: 6, min: 2.0, max: -2.0 }
        );
    }

    #[test]
    fn test_arm_picks_solver_for_topology() {
        let arm = Arm::from_config(ArmConfig::ur5e()).unwrap();
        assert_eq!(arm.solver().topology(), Topology::OffsetWrist);
        assert_eq!(arm.config().name, "UR5e");
    }
}
