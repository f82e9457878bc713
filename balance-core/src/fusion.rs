//! Tilt sensor fusion
//!
//! Produces a filtered tilt angle and a low-pass-filtered tilt rate from the
//! raw gyro rate and the two accelerometer components, once per tick.
//!
//! The accelerometer alone gives an absolute but noisy tilt angle (only
//! valid while gravity dominates the measured acceleration); the gyro alone
//! gives a smooth but drifting one. The complementary filter takes the gyro
//! path short-term and lets the accelerometer slowly pull the estimate back,
//! which cancels the drift without importing the noise.

use libm::atan2f;

use crate::config::ControllerConfig;
use crate::filter::{comp_filter, integrate};

/// Fused tilt state, updated once per control tick.
#[derive(Debug, Clone, Copy)]
pub struct TiltFilter {
    /// Filtered tilt angle in radians, zero when upright
    angle_rad: f32,
    /// Low-pass-filtered tilt rate in rad/s
    angle_rate: f32,
    filter_factor: f32,
    low_pass_factor: f32,
    update_freq: f32,
}

impl TiltFilter {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            angle_rad: 0.0,
            angle_rate: 0.0,
            filter_factor: config.filter_factor,
            low_pass_factor: config.low_pass_factor,
            update_freq: config.update_freq_hz,
        }
    }

    /// Clears the fused state back to upright-at-rest.
    pub fn reset(&mut self) {
        self.angle_rad = 0.0;
        self.angle_rate = 0.0;
    }

    /// Folds one sensor sample into the tilt estimate.
    ///
    /// `angle_rate_rad` is the rotation rate about the wheel axis in rad/s,
    /// `accel_hor`/`accel_ver` the accelerations along the driving direction
    /// and downwards. Units of the accelerations cancel in the `atan2`, only
    /// relative magnitude and sign matter. Inputs are not range-checked;
    /// that is the acquisition task's job.
    pub fn update(&mut self, angle_rate_rad: f32, accel_hor: f32, accel_ver: f32) {
        // Tilt angle as seen by the accelerometer alone. Only exact while
        // the vehicle is near-static, good enough as the drift reference.
        let angle_accel_rad = atan2f(-accel_hor, -accel_ver);
        self.angle_rad = comp_filter(
            integrate(self.angle_rad, angle_rate_rad, self.update_freq),
            angle_accel_rad,
            self.filter_factor,
        );

        // Low pass on the rate to prevent higher frequency oscillations
        // (forward - backward).
        self.angle_rate = comp_filter(angle_rate_rad, self.angle_rate, self.low_pass_factor);
    }

    /// Current filtered tilt angle in radians.
    pub fn angle_rad(&self) -> f32 {
        self.angle_rad
    }

    /// Current filtered tilt rate in rad/s.
    pub fn angle_rate(&self) -> f32 {
        self.angle_rate
    }
}

#[cfg(test)]
mod tests {
    use core::f32::consts::FRAC_PI_4;

    use super::*;

    fn filter() -> TiltFilter {
        TiltFilter::new(&ControllerConfig::default())
    }

    #[test]
    fn upright_at_rest_stays_zero() {
        let mut f = filter();
        // Gravity pulls straight down: accel_ver = -1 g, no horizontal part.
        for _ in 0..100 {
            f.update(0.0, 0.0, -1.0);
        }
        assert_eq!(f.angle_rad(), 0.0);
        assert_eq!(f.angle_rate(), 0.0);
    }

    #[test]
    fn accelerometer_estimate_pulls_angle_toward_true_tilt() {
        let mut f = filter();
        // Static vehicle leaning 45 degrees forward, no rotation. The gyro
        // path contributes nothing, so the angle must creep toward the
        // accelerometer estimate, by (1 - filter_factor) of the gap per tick.
        f.update(0.0, -1.0, -1.0);
        let first = f.angle_rad();
        assert!((first - 0.005 * FRAC_PI_4).abs() < 1e-6);

        for _ in 0..10_000 {
            f.update(0.0, -1.0, -1.0);
        }
        assert!((f.angle_rad() - FRAC_PI_4).abs() < 0.01);
    }

    #[test]
    fn gyro_rate_integrates_into_angle() {
        let mut f = filter();
        // 0.1 rad/s for one second with the accelerometer reading upright.
        // The integrated angle leaks a little through the complementary
        // filter each tick, so expect slightly under 0.1 rad.
        for _ in 0..100 {
            f.update(0.1, 0.0, -1.0);
        }
        assert!(f.angle_rad() > 0.07 && f.angle_rad() < 0.1);
    }

    #[test]
    fn rate_filter_is_low_pass() {
        let mut f = filter();
        f.update(1.0, 0.0, -1.0);
        // First sample only passes through by the low-pass weight.
        assert!((f.angle_rate() - 0.1).abs() < 1e-6);

        // Held input converges toward the raw rate.
        for _ in 0..200 {
            f.update(1.0, 0.0, -1.0);
        }
        assert!((f.angle_rate() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn reset_clears_state() {
        let mut f = filter();
        for _ in 0..50 {
            f.update(0.5, -0.3, -1.0);
        }
        f.reset();
        assert_eq!(f.angle_rad(), 0.0);
        assert_eq!(f.angle_rate(), 0.0);
    }
}
