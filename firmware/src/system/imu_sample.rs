//! IMU Sample Hand-Off
//!
//! Carries one pre-scaled sensor sample per control tick from the
//! acquisition task to the balance control task. The signal holds only the
//! latest sample: if the control task ever lags, stale samples are replaced,
//! never queued.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal carrying the most recent IMU sample
static IMU_SAMPLE: Signal<CriticalSectionRawMutex, ImuSample> = Signal::new();

/// Publishes a fresh sample, replacing any unconsumed one
pub fn update(sample: ImuSample) {
    IMU_SAMPLE.signal(sample);
}

/// Waits for the next sample; this paces the control loop
pub async fn wait() -> ImuSample {
    IMU_SAMPLE.wait().await
}

/// One sensor sample, already mapped into the vehicle frame
///
/// Sign conventions (fixed by the sensor mounting, applied in the
/// acquisition task): rotating in driving direction is a positive tilt
/// rate, driving direction is positive horizontal, downwards is positive
/// vertical.
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct ImuSample {
    /// Tilt rate about the wheel axis in rad/s
    pub angle_rate_rad: f32,
    /// Acceleration along the driving direction, in g
    pub accel_hor: f32,
    /// Acceleration downwards, in g
    pub accel_ver: f32,
}
