//! Steering Position Hand-Off
//!
//! Publishes the latest normalized steering position from the ADC task.
//! Unlike the IMU samples, steering must never pace the control loop: the
//! control task polls with [`try_take`] each tick and keeps the last value
//! it saw when no fresh reading arrived.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal carrying the most recent steering position, -1.0 (full left)
/// to 1.0 (full right)
static STEERING: Signal<CriticalSectionRawMutex, f32> = Signal::new();

/// Publishes a new steering position
pub fn update(position: f32) {
    STEERING.signal(position);
}

/// Takes the latest steering position without waiting, if one is pending
pub fn try_take() -> Option<f32> {
    STEERING.try_take()
}
