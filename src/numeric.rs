//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f32")]
pub use std::f32 as floats;
#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(not(feature = "f32"))]
pub use std::f64 as floats;

/// Mathematical functions
pub mod functions {
    use super::Float;
    use prefix_num_ops::real::*;

    /// Square of a number
    pub fn sqr(x: Float) -> Float {
        x * x
    }

    /// Square root of a quantity which should be positive, clamping negative
    /// inputs to zero. Also tells whether clamping occured.
    pub fn clamped_sqrt(x: Float) -> (Float, bool) {
        if x < 0. {
            (0., true)
        } else {
            (sqrt(x), false)
        }
    }
}
