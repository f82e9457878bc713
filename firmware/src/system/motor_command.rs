//! Motor Command Hand-Off
//!
//! Carries the clamped per-wheel duty cycles from the balance control task
//! to the motor drive task. One command per control tick; the signal keeps
//! only the newest one, so the drive stage always applies the freshest
//! output the controller produced.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for the per-tick motor command
static MOTOR_COMMAND: Signal<CriticalSectionRawMutex, MotorCommand> = Signal::new();

/// Publishes the motor command for this tick
pub fn update(command: MotorCommand) {
    MOTOR_COMMAND.signal(command);
}

/// Waits for the next motor command
pub async fn wait() -> MotorCommand {
    MOTOR_COMMAND.wait().await
}

/// Per-wheel duty cycles, each already clamped to [-1.0, 1.0]
///
/// Positive values drive forward. This is the only controller output the
/// rest of the system ever sees.
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct MotorCommand {
    /// Left wheel duty cycle fraction
    pub left: f32,
    /// Right wheel duty cycle fraction
    pub right: f32,
}
