//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::{
    functions::{clamped_sqrt, sqr},
    Float,
};
use nalgebra::{SVector, Vector3};

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Position in the detector frame (meters)
pub type Position = Vector3<Float>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Build a 4-momentum from its energy and spatial components
pub fn four_momentum(e: Float, px: Float, py: Float, pz: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Squared norm of the spatial part of a 4-momentum
pub fn xyz_norm_squared(p: &Momentum) -> Float {
    p.fixed_rows::<3>(X).norm_squared()
}

/// Minkowski square E² - |p|², which may be negative for inconsistent data
pub fn mass_squared(p: &Momentum) -> Float {
    sqr(p[E]) - xyz_norm_squared(p)
}

/// Invariant mass of a 4-momentum
///
/// Negative mass-squared values, which can only come from inconsistent input
/// data, are clamped to zero. The second member of the result tells whether
/// that happened.
pub fn clamped_mass(p: &Momentum) -> (Float, bool) {
    clamped_sqrt(mass_squared(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn component_layout() {
        let p = four_momentum(4., 1., 2., 3.);
        assert_eq!(p[E], 4.);
        assert_eq!(p[X], 1.);
        assert_eq!(p[Y], 2.);
        assert_eq!(p[Z], 3.);
        assert_relative_eq!(xyz_norm_squared(&p), 14.);
    }

    #[test]
    fn massive_momentum() {
        let (m, clamped) = clamped_mass(&four_momentum(5., 3., 0., 0.));
        assert_relative_eq!(m, 4.);
        assert!(!clamped);
    }

    #[test]
    fn spacelike_momentum_is_clamped() {
        let p = four_momentum(1., 2., 2., 1.);
        assert!(mass_squared(&p) < 0.);
        assert_eq!(clamped_mass(&p), (0., true));
    }
}
