//! Arm configuration (solution branch) selection.
//!
//! A closed-form solver has up to eight answers for one pose. Callers pick one
//! with a [`BranchSelector`] bit set; [`BranchSelection::decode`] turns it into
//! the three decisions the solvers act on. The coupling between the bits is
//! different for each wrist topology and is spelled out per topology below.

use serde::{Deserialize, Serialize};

use crate::robot_config::Topology;

/// Raw branch selector as stored with a target.
///
/// Bits: `SHOULDER = 1`, `ELBOW = 2`, `WRIST = 4`. Higher bits are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BranchSelector(pub u8);

impl BranchSelector {
    pub const SHOULDER: u8 = 1;
    pub const ELBOW: u8 = 2;
    pub const WRIST: u8 = 4;

    pub fn new(shoulder: bool, elbow: bool, wrist: bool) -> Self {
        let mut bits = 0;
        if shoulder {
            bits |= Self::SHOULDER;
        }
        if elbow {
            bits |= Self::ELBOW;
        }
        if wrist {
            bits |= Self::WRIST;
        }
        Self(bits)
    }

    /// All eight selectors, in bit order.
    pub fn all() -> impl Iterator<Item = BranchSelector> {
        (0..8).map(BranchSelector)
    }

    pub fn shoulder(&self) -> bool {
        self.0 & Self::SHOULDER != 0
    }

    pub fn elbow(&self) -> bool {
        self.0 & Self::ELBOW != 0
    }

    pub fn wrist(&self) -> bool {
        self.0 & Self::WRIST != 0
    }
}

impl From<u8> for BranchSelector {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

/// Decoded branch decisions handed to an inverse solver.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BranchSelection {
    /// Reach over the shoulder: joint 1 turned by half a revolution.
    pub shoulder: bool,
    /// Negate the elbow triangle (spherical) or the joint 3 cosine branch (offset).
    pub elbow: bool,
    /// Flip the wrist.
    pub wrist: bool,
}

impl BranchSelection {
    pub fn decode(selector: BranchSelector, topology: Topology) -> Self {
        match topology {
            Topology::SphericalWrist => Self::decode_spherical(selector),
            Topology::OffsetWrist => Self::decode_offset(selector),
        }
    }

    /// Spherical wrist:
    /// - shoulder follows its bit
    /// - elbow follows its bit, inverted when the shoulder bit is set
    /// - wrist is the negated wrist bit
    fn decode_spherical(selector: BranchSelector) -> Self {
        let shoulder = selector.shoulder();
        let elbow = selector.elbow() != shoulder;
        let wrist = !selector.wrist();

        Self { shoulder, elbow, wrist }
    }

    /// Offset wrist:
    /// - shoulder follows its bit
    /// - elbow follows its bit, inverted when the shoulder bit is set
    /// - wrist is the negated wrist bit, inverted again when the shoulder bit is set
    fn decode_offset(selector: BranchSelector) -> Self {
        let shoulder = selector.shoulder();
        let elbow = selector.elbow() != shoulder;
        let wrist = !selector.wrist() != shoulder;

        Self { shoulder, elbow, wrist }
    }
}
