mod diagnostic;
pub use diagnostic::*;

mod kinematics_error;
pub use kinematics_error::*;
