//! Numeric integration and complementary filtering
//!
//! The two primitives everything else in this crate is built from. Both are
//! pure and total over their f32 domain; NaN and infinity propagate as-is.

/// Integrates numerically at the configured update rate.
///
/// Example: `position = integrate(position, velocity, update_freq)`.
///
/// `update_freq` is the tick rate in Hz and must be strictly positive; this
/// is a configuration-time invariant of the caller, not re-validated here.
#[inline]
pub fn integrate(last: f32, derivative: f32, update_freq: f32) -> f32 {
    last + derivative / update_freq
}

/// Applies a complementary filter.
///
/// Returns `factor * a + (1 - factor) * b` for `factor` in `[0, 1]`. Values
/// near 1 trust `a` (typically the integrated, drift-prone estimate), values
/// near 0 trust `b` (typically the noisy, drift-free estimate).
#[inline]
pub fn comp_filter(a: f32, b: f32, factor: f32) -> f32 {
    factor * a + (1.0 - factor) * b
}
