//! Deterministic fixed-point mathematics.
//!
//! All world-space math (positions, velocities, radii, sampling weights)
//! runs on fixed-point numbers so that two machines stepping the same crowd
//! produce bit-identical results.

use fixed::types::I48F16;

pub use vec2::FixedVec2;

mod vec2;

/// Fixed-point number type used throughout the crate.
///
/// I48F16: 48 integer bits, 16 fractional bits (precision ~0.000015).
pub type FixedNum = I48F16;
