//! Homogeneous transforms used by the solvers.
//!
//! A [`Transform`] is a 4x4 rigid-body matrix. Composition is a plain matrix
//! product and inversion assumes an orthonormal rotation block, which is what
//! every link transform and tool frame in this crate is.
//!
//! # Examples
//!
//! ```rust
//! use arm_kinematics::Transform;
//!
//! let flange = Transform::from_xyzwpr(300.0, 0.0, 600.0, 0.0, 90.0_f64.to_radians(), 0.0);
//! let tool = Transform::from_translation(0.0, 0.0, 120.0);
//!
//! let tcp = flange.compose(&tool);
//! assert!(tcp.compose(&tool.inverse()).approx_eq(&flange, 1e-9));
//! ```
//!
//! # Notes
//!
//! - Serialises as row-major `[[f64; 4]; 4]`
//! - W, P, R follow the Cardan convention `R = Rz(r) * Ry(p) * Rx(w)`, radians

use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[[f64; 4]; 4]", into = "[[f64; 4]; 4]")]
pub struct Transform(Matrix4<f64>);

impl Transform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_rotation_translation(&Matrix3::identity(), &Vector3::new(x, y, z))
    }

    pub fn from_rotation_translation(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        Self(m)
    }

    /// Standard Denavit-Hartenberg link transform `Rz(theta) * Tz(d) * Tx(a) * Rx(alpha)`.
    ///
    /// # Arguments
    /// * `a` - Link length along the new X axis
    /// * `alpha` - Link twist about the new X axis
    /// * `theta` - Joint angle about the previous Z axis
    /// * `d` - Link offset along the previous Z axis
    #[rustfmt::skip]
    pub fn from_dh(a: f64, alpha: f64, theta: f64, d: f64) -> Self {
        let (st, ct) = theta.sin_cos();
        let (sa, ca) = alpha.sin_cos();

        Self(Matrix4::new(
            ct, -st * ca, st * sa, a * ct,
            st, ct * ca, -ct * sa, a * st,
            0.0, sa, ca, d,
            0.0, 0.0, 0.0, 1.0,
        ))
    }

    /// Pose from a position and Cardan angles (W about X, P about Y, R about Z).
    #[rustfmt::skip]
    pub fn from_xyzwpr(x: f64, y: f64, z: f64, w: f64, p: f64, r: f64) -> Self {
        let (sw, cw) = w.sin_cos();
        let (sp, cp) = p.sin_cos();
        let (sr, cr) = r.sin_cos();

        let rotation = Matrix3::new(
            cr * cp, cr * sp * sw - sr * cw, cr * sp * cw + sr * sw,
            sr * cp, sr * sp * sw + cr * cw, sr * sp * cw - cr * sw,
            -sp, cp * sw, cp * cw,
        );
        Self::from_rotation_translation(&rotation, &Vector3::new(x, y, z))
    }

    /// Inverse of [`Transform::from_xyzwpr`]: `[x, y, z, w, p, r]`.
    ///
    /// At `p = ±90°` the split between W and R is arbitrary; W is reported as 0.
    pub fn to_xyzwpr(&self) -> [f64; 6] {
        let m = &self.0;
        let p = (-m[(2, 0)]).clamp(-1.0, 1.0).asin();
        let cp = p.cos();

        let (w, r) = if cp.abs() > 1e-9 {
            (m[(2, 1)].atan2(m[(2, 2)]), m[(1, 0)].atan2(m[(0, 0)]))
        } else {
            (0.0, (-m[(0, 1)]).atan2(m[(1, 1)]))
        };

        [m[(0, 3)], m[(1, 3)], m[(2, 3)], w, p, r]
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// `self * other`: `other` is expressed in the frame described by `self`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform(self.0 * other.0)
    }

    /// Rigid inverse, `[R^T | -R^T p]`.
    pub fn inverse(&self) -> Transform {
        let rt = self.rotation().transpose();
        let p = -(rt * self.translation());
        Self::from_rotation_translation(&rt, &p)
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.0.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn x_axis(&self) -> Vector3<f64> {
        self.0.fixed_view::<3, 1>(0, 0).into_owned()
    }

    pub fn y_axis(&self) -> Vector3<f64> {
        self.0.fixed_view::<3, 1>(0, 1).into_owned()
    }

    pub fn z_axis(&self) -> Vector3<f64> {
        self.0.fixed_view::<3, 1>(0, 2).into_owned()
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation() * point + self.translation()
    }

    /// Element-wise comparison; `tolerance` applies to every entry.
    pub fn approx_eq(&self, other: &Transform, tolerance: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 4]; 4]> for Transform {
    fn from(rows: [[f64; 4]; 4]) -> Self {
        Self(Matrix4::from_fn(|r, c| rows[r][c]))
    }
}

impl From<Transform> for [[f64; 4]; 4] {
    fn from(t: Transform) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = t.0[(r, c)];
            }
        }
        rows
    }
}

impl From<Isometry3<f64>> for Transform {
    fn from(iso: Isometry3<f64>) -> Self {
        Self(iso.to_homogeneous())
    }
}

/// The rotation block is re-orthonormalised through a quaternion, so a
/// transform that drifted numerically comes back as a proper isometry.
impl From<Transform> for Isometry3<f64> {
    fn from(t: Transform) -> Self {
        let rotation = Rotation3::from_matrix(&t.rotation());
        let translation = Translation3::from(t.translation());
        Isometry3::from_parts(translation, UnitQuaternion::from_rotation_matrix(&rotation))
    }
}

impl From<&Transform> for Isometry3<f64> {
    fn from(t: &Transform) -> Self {
        (*t).into()
    }
}
