//! Controller configuration
//!
//! Collects the tuning values that are fixed for one driving session. All
//! defaults come from the reference vehicle and were found experimentally at
//! a 100 Hz update rate; changing the update frequency means re-tuning the
//! two filter factors.

/// Control loop update frequency in Hz.
///
/// One controller tick runs per sensor sample, so this must match the IMU
/// sampling rate configured in the acquisition task.
pub const UPDATE_FREQ_HZ: f32 = 100.0;

/// Default drive speed ceiling as a duty cycle fraction.
///
/// Conservative half throttle; the limiter in the control law leans the
/// vehicle back when the integrated drive speed exceeds this.
pub const MAX_SPEED_DEFAULT: f32 = 0.5;

/// Complementary filter weight for the tilt angle fusion.
///
/// Weight of the gyro-integrated angle versus the accelerometer-derived
/// angle. Close to 1: the gyro dominates short-term, the accelerometer only
/// bleeds in slowly to cancel drift. Experimental, valid at 100 Hz.
pub const FILTER_FACTOR: f32 = 0.995;

/// Low-pass weight for the tilt rate filter.
///
/// Weight of the fresh gyro reading versus the previous filtered rate. Small
/// value = heavy smoothing, damping the forward/backward oscillation the raw
/// rate otherwise excites. Experimental, valid at 100 Hz.
pub const LOW_PASS_FACTOR: f32 = 0.1;

/// Immutable per-session configuration of the [`Controller`].
///
/// Invariants expected by the control law (not re-checked per tick):
/// `update_freq_hz > 0`, both filter factors in `[0, 1]`.
///
/// [`Controller`]: crate::controller::Controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Drive speed ceiling, duty cycle fraction, typically <= 1.0
    pub max_speed: f32,
    /// Ticks per second
    pub update_freq_hz: f32,
    /// Complementary filter weight for angle fusion
    pub filter_factor: f32,
    /// Low-pass weight for rate fusion
    pub low_pass_factor: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED_DEFAULT,
            update_freq_hz: UPDATE_FREQ_HZ,
            filter_factor: FILTER_FACTOR,
            low_pass_factor: LOW_PASS_FACTOR,
        }
    }
}
