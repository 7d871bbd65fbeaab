// Released under MIT License.
// Copyright (c) 2026 The grist_rs developers

//! Implementation of the SimBox structure and its methods.

use crate::structures::vector3d::Vector3D;
use std::ops::Deref;

/// Structure defining simulation box shape and dimensions.
/// All lengths are in ångströms, following the Amber convention.
#[derive(Debug, Clone, Default)]
pub struct SimBox {
    /// You can also use `.x` to reach this value.
    pub v1x: f32,
    /// You can also use `.y` to reach this value.
    pub v2y: f32,
    /// You can also use `.z` to reach this value.
    pub v3z: f32,
    pub v1y: f32,
    pub v1z: f32,
    pub v2x: f32,
    pub v2z: f32,
    pub v3x: f32,
    pub v3y: f32,
}

impl From<[f32; 3]> for SimBox {
    /// Convert 3-member array of box lengths to an orthogonal SimBox structure.
    fn from(arr: [f32; 3]) -> Self {
        SimBox {
            v1x: arr[0],
            v2y: arr[1],
            v3z: arr[2],
            ..Default::default()
        }
    }
}

impl SimBox {
    /// Create new simulation box from lengths (in ångströms) and angles (in degrees).
    ///
    /// This matches how box information is stored in Amber NetCDF trajectories
    /// (`cell_lengths` + `cell_angles`) and in the prmtop `BOX_DIMENSIONS` section.
    ///
    /// ## Example
    /// ```
    /// # use grist_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let simbox = SimBox::from_lengths_angles([50.0, 40.0, 30.0].into(), [80.0, 70.0, 120.0].into());
    ///
    /// assert_approx_eq!(f32, simbox.v1x, 50.000000, epsilon = 0.001);
    /// assert_approx_eq!(f32, simbox.v2y, 34.641020, epsilon = 0.001);
    /// assert_approx_eq!(f32, simbox.v3z, 25.537680, epsilon = 0.001);
    /// assert_approx_eq!(f32, simbox.v2x, -20.000000, epsilon = 0.001);
    /// assert_approx_eq!(f32, simbox.v3x, 10.260600, epsilon = 0.001);
    /// assert_approx_eq!(f32, simbox.v3y, 11.939300, epsilon = 0.001);
    /// ```
    pub fn from_lengths_angles(lengths: Vector3D, angles: Vector3D) -> Self {
        let mut simbox = SimBox {
            v1x: lengths.x,
            ..Default::default()
        };

        if angles.x == 90.0 && angles.y == 90.0 && angles.z == 90.0 {
            simbox.v2y = lengths.y;
            simbox.v3z = lengths.z;
        } else {
            // convert to radians
            let alpha = angles.x * std::f32::consts::PI / 180.0;
            let beta = angles.y * std::f32::consts::PI / 180.0;
            let gamma = angles.z * std::f32::consts::PI / 180.0;

            simbox.v2x = lengths.y * gamma.cos();
            simbox.v2y = lengths.y * gamma.sin();

            simbox.v3x = lengths.z * beta.cos();
            simbox.v3y = lengths.z * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
            simbox.v3z =
                (lengths.z * lengths.z - simbox.v3x * simbox.v3x - simbox.v3y * simbox.v3y).sqrt();

            // v1y, v1z, v2z are guaranteed to be zero
        }

        simbox
    }

    /// Calculate box lengths (ångströms) and angles (degrees) from the simulation box.
    ///
    /// ## Returns
    /// (`lengths`, `angles`) of the simulation box.
    pub fn to_lengths_angles(&self) -> (Vector3D, Vector3D) {
        if self.is_orthogonal() {
            return (
                [self.v1x, self.v2y, self.v3z].into(),
                [90.0, 90.0, 90.0].into(),
            );
        }

        let v1 = Vector3D::new(self.v1x, self.v1y, self.v1z);
        let v2 = Vector3D::new(self.v2x, self.v2y, self.v2z);
        let v3 = Vector3D::new(self.v3x, self.v3y, self.v3z);

        let to_deg = 180.0 / std::f32::consts::PI;

        let alpha = (v2.dot(&v3) / (v2.len() * v3.len())).acos() * to_deg;
        let beta = (v1.dot(&v3) / (v1.len() * v3.len())).acos() * to_deg;
        let gamma = (v1.dot(&v2) / (v1.len() * v2.len())).acos() * to_deg;

        (
            [v1.len(), v2.len(), v3.len()].into(),
            [alpha, beta, gamma].into(),
        )
    }

    /// Check whether the simulation box is orthogonal.
    pub fn is_orthogonal(&self) -> bool {
        self.v1y == 0.0
            && self.v1z == 0.0
            && self.v2x == 0.0
            && self.v2z == 0.0
            && self.v3x == 0.0
            && self.v3y == 0.0
    }

    /// Check whether all dimensions of the simulation box are zero.
    pub fn is_zero(&self) -> bool {
        self.v1x == 0.0
            && self.v2y == 0.0
            && self.v3z == 0.0
            && self.is_orthogonal()
    }
}

/// Allows accessing the diagonal of `SimBox` as `.x`, `.y`, and `.z`.
pub struct SimBoxRaw {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Deref for SimBox {
    type Target = SimBoxRaw;

    #[inline]
    fn deref(&self) -> &Self::Target {
        // safety: v1x, v2y, v3z are the first three fields of the structure
        unsafe { &*(self as *const SimBox as *const SimBoxRaw) }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn from_lengths() {
        let simbox = SimBox::from([35.0, 40.0, 45.0]);

        assert_approx_eq!(f32, simbox.x, 35.0);
        assert_approx_eq!(f32, simbox.y, 40.0);
        assert_approx_eq!(f32, simbox.z, 45.0);
        assert!(simbox.is_orthogonal());
        assert!(!simbox.is_zero());
    }

    #[test]
    fn default_is_zero() {
        let simbox = SimBox::default();
        assert!(simbox.is_zero());
    }

    #[test]
    fn orthogonal_from_lengths_angles() {
        let simbox = SimBox::from_lengths_angles([35.0, 40.0, 45.0].into(), [90.0, 90.0, 90.0].into());

        assert_approx_eq!(f32, simbox.x, 35.0);
        assert_approx_eq!(f32, simbox.y, 40.0);
        assert_approx_eq!(f32, simbox.z, 45.0);
        assert!(simbox.is_orthogonal());
    }

    #[test]
    fn truncated_octahedron_roundtrip() {
        // the truncated octahedral box used by Amber has all angles equal to ~109.47 degrees
        let angle = 109.471_22_f32;
        let simbox = SimBox::from_lengths_angles([60.0, 60.0, 60.0].into(), [angle, angle, angle].into());

        assert!(!simbox.is_orthogonal());

        let (lengths, angles) = simbox.to_lengths_angles();

        assert_approx_eq!(f32, lengths.x, 60.0, epsilon = 0.001);
        assert_approx_eq!(f32, lengths.y, 60.0, epsilon = 0.001);
        assert_approx_eq!(f32, lengths.z, 60.0, epsilon = 0.001);

        assert_approx_eq!(f32, angles.x, angle, epsilon = 0.001);
        assert_approx_eq!(f32, angles.y, angle, epsilon = 0.001);
        assert_approx_eq!(f32, angles.z, angle, epsilon = 0.001);
    }

    #[test]
    fn deref_matches_fields() {
        let simbox = SimBox::from([10.0, 20.0, 30.0]);

        assert_eq!(simbox.x, simbox.v1x);
        assert_eq!(simbox.y, simbox.v2y);
        assert_eq!(simbox.z, simbox.v3z);
    }
}
