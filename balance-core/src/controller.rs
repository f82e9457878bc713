//! Balance control law
//!
//! Determines the two motor drive speeds from the fused tilt state and the
//! steering position. Based on the P(I)D scooter controller by Trevor
//! Blackwell (http://www.tlb.org/#scooter) — careful, that writeup and this
//! code both work in radians.
//!
//! One [`Controller`] instance is owned by the control loop task and ticked
//! exactly once per sensor sample via [`Controller::update`]. All gains are
//! experimental values from the reference vehicle at 100 Hz.

use libm::fabsf;

use crate::config::ControllerConfig;
use crate::filter::integrate;
use crate::fusion::TiltFilter;
use crate::telemetry::{self, DebugSink};

/// Proportional gain, torque per radian of tilt error.
const KP: f32 = 5.0;

/// Derivative gain, torque per rad/s of tilt rate.
///
/// Reduced from 0.4 to 0.2 to prevent higher frequency oscillations
/// (forward - backward).
const KD: f32 = 0.2;

/// Cap on the instantaneous overspeed fed to the limiter.
const OVERSPEED_MAX: f32 = 0.2;

/// Hysteresis margin added to any positive overspeed, so the limiter reacts
/// firmly as soon as the ceiling is crossed.
const OVERSPEED_MARGIN: f32 = 0.05;

/// Ceiling of the overspeed integral term.
const OVERSPEED_INT_MAX: f32 = 0.4;

/// Decay of the overspeed integral per second once back below the ceiling.
const OVERSPEED_INT_DECAY: f32 = 0.04;

/// Weight of the instantaneous overspeed in the equilibrium angle shift.
const STABLE_ANGLE_OVERSPEED_GAIN: f32 = 0.4;

/// Weight of the overspeed integral in the equilibrium angle shift.
const STABLE_ANGLE_INT_GAIN: f32 = 0.7;

/// Steering authority numerator; full authority is reached at standstill.
const STEERING_GAIN: f32 = 0.07;

/// Softening constant in the steering attenuation denominator.
const STEERING_SPEED_SOFTENING: f32 = 0.3;

/// Coupling from balance torque into drive speed.
const TORQUE_SPEED_GAIN: f32 = 1.2;

/// Saturates one raw wheel command to the valid duty cycle range.
///
/// Saturating, not scaling: during a sharp turn at the speed ceiling the two
/// wheels may clip asymmetrically, which is intended.
#[inline]
pub fn clamp_command(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// Balance controller for one two-wheeled vehicle.
///
/// Generic over the telemetry sink so the firmware can plug in its debug
/// transport and tests can record what was emitted. Use
/// [`NullSink`](crate::telemetry::NullSink) to disable telemetry.
pub struct Controller<S> {
    max_speed: f32,
    update_freq: f32,
    tilt: TiltFilter,
    /// Balance torque of the current tick
    torque: f32,
    /// Tilt angle currently treated as balanced; drifts backward under
    /// sustained overspeed so the torque law leans into deceleration
    angle_stable_rad: f32,
    /// Overspeed integral, always within [0, OVERSPEED_INT_MAX]
    overspeed_int: f32,
    /// Integrated drive speed, the common-mode part of both wheel commands
    drive_speed: f32,
    /// Raw wheel commands before clamping
    left_speed: f32,
    right_speed: f32,
    sink: S,
}

impl<S: DebugSink> Controller<S> {
    /// Creates a controller in its zeroed rest state.
    ///
    /// `sink` receives one telemetry record per tick, see [`telemetry`].
    pub fn new(config: ControllerConfig, sink: S) -> Self {
        Self {
            max_speed: config.max_speed,
            update_freq: config.update_freq_hz,
            tilt: TiltFilter::new(&config),
            torque: 0.0,
            angle_stable_rad: 0.0,
            overspeed_int: 0.0,
            drive_speed: 0.0,
            left_speed: 0.0,
            right_speed: 0.0,
            sink,
        }
    }

    /// Resets all speeds and filter state to 0, keeping the configuration.
    ///
    /// Called by the surrounding application when leaving active driving;
    /// the next tick then starts from rest.
    pub fn reset(&mut self) {
        self.tilt.reset();
        self.torque = 0.0;
        self.angle_stable_rad = 0.0;
        self.overspeed_int = 0.0;
        self.drive_speed = 0.0;
        self.left_speed = 0.0;
        self.right_speed = 0.0;
    }

    /// Runs one control tick.
    ///
    /// `steering_value` is the normalized steering position in [-1, 1],
    /// `angle_rate_rad` the tilt rate in rad/s, `accel_hor`/`accel_ver` the
    /// accelerometer components (driving direction / downwards positive).
    /// Results are read back through [`left_speed`](Self::left_speed) and
    /// [`right_speed`](Self::right_speed) until the next tick overwrites
    /// them.
    pub fn update(
        &mut self,
        steering_value: f32,
        angle_rate_rad: f32,
        accel_hor: f32,
        accel_ver: f32,
    ) {
        self.tilt.update(angle_rate_rad, accel_hor, accel_ver);
        let angle_rad = self.tilt.angle_rad();
        let angle_rate = self.tilt.angle_rate();

        // Torque needed for balance, driving the tilt toward the current
        // equilibrium angle.
        self.torque = KP * (angle_rad - self.angle_stable_rad) + KD * angle_rate;

        // Speed limiter. Sustained overspeed charges the integral term; back
        // below the ceiling it bleeds off again, never past zero.
        let mut overspeed = self.drive_speed - self.max_speed;
        if overspeed > 0.0 {
            // too fast
            overspeed = OVERSPEED_MAX.min(overspeed + OVERSPEED_MARGIN);
            self.overspeed_int = OVERSPEED_INT_MAX
                .min(integrate(self.overspeed_int, overspeed, self.update_freq));
        } else {
            overspeed = 0.0;

            // stop speed limiter
            if self.overspeed_int > 0.0 {
                self.overspeed_int =
                    (self.overspeed_int - OVERSPEED_INT_DECAY / self.update_freq).max(0.0);
            }
        }

        // New stable position. Leaning the equilibrium backward is what
        // actually slows the vehicle down; there is no hard cutoff.
        self.angle_stable_rad = STABLE_ANGLE_OVERSPEED_GAIN * overspeed
            + STABLE_ANGLE_INT_GAIN * self.overspeed_int;

        // Reduce steering when driving faster.
        let steering_adjusted =
            STEERING_GAIN / (STEERING_SPEED_SOFTENING + fabsf(self.drive_speed)) * steering_value;

        // Update current drive speed.
        self.drive_speed = integrate(
            self.drive_speed,
            TORQUE_SPEED_GAIN * self.torque,
            self.update_freq,
        );

        // Apply steering.
        self.left_speed = self.torque + self.drive_speed + steering_adjusted;
        self.right_speed = self.torque + self.drive_speed - steering_adjusted;

        self.sink.send_record(telemetry::record(
            angle_rad,
            steering_value,
            self.left_speed,
            self.right_speed,
        ));
    }

    /// Duty cycle for the left motor as float from -1.0 to 1.0.
    ///
    /// The control law itself has no limitation, therefore it is done here.
    pub fn left_speed(&self) -> f32 {
        clamp_command(self.left_speed)
    }

    /// Duty cycle for the right motor as float from -1.0 to 1.0.
    pub fn right_speed(&self) -> f32 {
        clamp_command(self.right_speed)
    }

    /// Current drive speed ceiling.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Changes the drive speed ceiling, effective from the next tick.
    pub fn set_max_speed(&mut self, speed: f32) {
        self.max_speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use crate::telemetry::NullSink;

    use super::*;

    /// Sink recording every emitted record for inspection.
    #[derive(Default)]
    struct RecordingSink {
        records: Vec<[i32; 6]>,
    }

    impl DebugSink for RecordingSink {
        fn send_record(&mut self, values: [i32; 6]) {
            self.records.push(values);
        }
    }

    fn controller() -> Controller<NullSink> {
        Controller::new(ControllerConfig::default(), NullSink)
    }

    /// One neutral tick: upright, at rest, hands off the steering.
    fn neutral_tick(c: &mut Controller<impl DebugSink>) {
        c.update(0.0, 0.0, 0.0, -1.0);
    }

    #[test]
    fn clamp_limits_and_passes_through() {
        assert_eq!(clamp_command(2.5), 1.0);
        assert_eq!(clamp_command(-1.001), -1.0);
        assert_eq!(clamp_command(0.73), 0.73);
        assert_eq!(clamp_command(-1.0), -1.0);
    }

    #[test]
    fn clamp_is_idempotent() {
        for v in [-1e9, -1.5, -0.2, 0.0, 0.9, 3.7, 1e9] {
            let once = clamp_command(v);
            assert_eq!(clamp_command(once), once);
            assert!((-1.0..=1.0).contains(&once));
        }
    }

    #[test]
    fn accessors_before_first_tick_return_zero() {
        let c = controller();
        assert_eq!(c.left_speed(), 0.0);
        assert_eq!(c.right_speed(), 0.0);
    }

    #[test]
    fn max_speed_is_adjustable() {
        let mut c = controller();
        assert_eq!(c.max_speed(), 0.5);
        c.set_max_speed(0.8);
        assert_eq!(c.max_speed(), 0.8);
    }

    // Scenario: first tick of a fresh controller with the vehicle upright
    // and at rest. atan2(0, 1) = 0, so nothing moves.
    #[test]
    fn first_tick_upright_produces_no_drive() {
        let mut c = controller();
        neutral_tick(&mut c);
        assert_eq!(c.tilt.angle_rad(), 0.0);
        assert_eq!(c.torque, 0.0);
        assert!(c.left_speed().abs() < 1e-6);
        assert!(c.right_speed().abs() < 1e-6);
    }

    // Scenario: vehicle falling forward. Torque and drive speed go positive
    // and both wheels speed up together, with no steering differential.
    #[test]
    fn falling_forward_drives_both_wheels_forward() {
        let mut c = controller();
        let mut last_left = 0.0;
        for tick in 0..50 {
            c.update(0.0, 0.5, 0.0, -1.0);
            assert_eq!(c.left_speed, c.right_speed);
            if tick > 0 {
                assert!(c.left_speed > last_left, "command must keep growing");
            }
            last_left = c.left_speed;
        }
        assert!(c.torque > 0.0);
        assert!(c.drive_speed > 0.0);
        assert!(c.left_speed() > 0.0);
    }

    // Scenario: drive speed held above the ceiling saturates the overspeed
    // integral at its cap; removing the condition bleeds it back to zero.
    #[test]
    fn overspeed_integral_saturates_and_decays() {
        let mut c = controller();
        // A ceiling far below any reachable drive speed keeps the limiter
        // engaged on every tick without having to build up real speed.
        c.set_max_speed(-10.0);
        for _ in 0..300 {
            neutral_tick(&mut c);
            assert!(c.overspeed_int >= 0.0);
            assert!(c.overspeed_int <= OVERSPEED_INT_MAX + 1e-6);
        }
        assert!((c.overspeed_int - OVERSPEED_INT_MAX).abs() < 1e-5);

        // Back below the ceiling: decay at 0.04/s drains 0.4 in 10 s, i.e.
        // 1000 ticks at 100 Hz, monotonically and never below zero.
        c.set_max_speed(1e6);
        let mut last = c.overspeed_int;
        for _ in 0..1000 {
            neutral_tick(&mut c);
            assert!(c.overspeed_int <= last);
            assert!(c.overspeed_int >= 0.0);
            last = c.overspeed_int;
        }
        assert!(c.overspeed_int < 1e-5);
        neutral_tick(&mut c);
        assert_eq!(c.overspeed_int, 0.0);
    }

    // The integral bound must survive arbitrary input sequences, including
    // ceiling changes mid-flight and wild sensor values.
    #[test]
    fn overspeed_integral_stays_bounded_under_abuse() {
        let mut c = controller();
        let rates = [4.0, -3.0, 0.0, 7.5, -0.2, 1.0];
        for i in 0..2000 {
            if i % 400 == 0 {
                c.set_max_speed(if i % 800 == 0 { -5.0 } else { 0.3 });
            }
            let r = rates[i % rates.len()];
            c.update(0.5, r, r * 0.1, -1.0);
            assert!(c.overspeed_int >= 0.0);
            assert!(c.overspeed_int <= OVERSPEED_INT_MAX + 1e-6);
        }
    }

    // Decay to rest: after a small disturbance, holding neutral inputs lets
    // the torque die out and the wheel commands settle near zero.
    #[test]
    fn settles_after_disturbance() {
        let mut c = controller();
        for _ in 0..5 {
            c.update(0.0, 0.1, 0.0, -1.0);
        }
        for _ in 0..5000 {
            neutral_tick(&mut c);
        }
        assert!(c.torque.abs() < 1e-4);
        assert!(c.drive_speed.abs() < 0.1);
        assert!(c.left_speed().abs() < 0.1);
        assert!(c.right_speed().abs() < 0.1);

        // Fully settled: one more tick changes nothing measurable.
        let before = c.left_speed;
        neutral_tick(&mut c);
        assert!((c.left_speed - before).abs() < 1e-6);
    }

    // Scenario: steering creates an exact differential between the wheels,
    // and the differential shrinks as the vehicle gets faster.
    #[test]
    fn steering_differential_shrinks_with_speed() {
        let mut diffs = Vec::new();
        for drive_speed in [0.0, 0.25, 0.5, 1.0, 2.0] {
            let mut c = controller();
            c.drive_speed = drive_speed;
            // Ceiling out of the way so the limiter does not interfere.
            c.set_max_speed(1e6);
            c.update(0.8, 0.0, 0.0, -1.0);

            let expected = STEERING_GAIN / (STEERING_SPEED_SOFTENING + drive_speed) * 0.8;
            let diff = c.left_speed - c.right_speed;
            assert!((diff - 2.0 * expected).abs() < 1e-6);
            diffs.push(diff);
        }
        for pair in diffs.windows(2) {
            assert!(pair[1] < pair[0], "differential must shrink with speed");
        }
    }

    #[test]
    fn reset_zeroes_state_but_keeps_config() {
        let mut c = controller();
        c.set_max_speed(0.7);
        for _ in 0..100 {
            c.update(0.5, 1.0, -0.4, -0.9);
        }
        assert!(c.left_speed() != 0.0);

        c.reset();
        assert_eq!(c.left_speed(), 0.0);
        assert_eq!(c.right_speed(), 0.0);
        assert_eq!(c.torque, 0.0);
        assert_eq!(c.drive_speed, 0.0);
        assert_eq!(c.overspeed_int, 0.0);
        assert_eq!(c.angle_stable_rad, 0.0);
        assert_eq!(c.max_speed(), 0.7);
    }

    #[test]
    fn emits_one_telemetry_record_per_tick() {
        let mut c = Controller::new(ControllerConfig::default(), RecordingSink::default());
        for _ in 0..3 {
            c.update(0.5, 0.0, 0.0, -1.0);
        }
        assert_eq!(c.sink.records.len(), 3);
        // Steering column is percent, truncated toward zero.
        assert_eq!(c.sink.records[0][1], 50);
        // Reserved columns stay empty.
        assert_eq!(c.sink.records[0][4], 0);
        assert_eq!(c.sink.records[0][5], 0);
    }
}
