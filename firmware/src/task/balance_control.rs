//! Balance control loop
//!
//! The one task with hard real-time duties: it owns the single
//! [`Controller`] instance and runs exactly one control tick per IMU
//! sample, then publishes the clamped wheel commands for the drive task.
//! The tick itself is plain bounded arithmetic; the only awaits are the
//! hand-off signals on either side.
//!
//! Telemetry goes out through defmt-rtt, which is fire-and-forget and can
//! never stall a tick; silence it entirely via the `DEFMT_LOG` level.

use balance_core::telemetry::DebugSink;
use balance_core::{Controller, ControllerConfig};
use defmt::{debug, info};

use crate::system::{
    imu_sample,
    motor_command::{self, MotorCommand},
    steering,
};

/// Telemetry sink printing the six tab-separated integer columns the
/// PC-side plotting scripts consume
struct RttSink;

impl DebugSink for RttSink {
    fn send_record(&mut self, v: [i32; 6]) {
        debug!("{}\t{}\t{}\t{}\t{}\t{}", v[0], v[1], v[2], v[3], v[4], v[5]);
    }
}

/// Control loop task: one controller tick per IMU sample
#[embassy_executor::task]
pub async fn balance_control() {
    let config = ControllerConfig::default();
    info!(
        "Balance control running: {} Hz, max speed {}",
        config.update_freq_hz, config.max_speed
    );

    let mut controller = Controller::new(config, RttSink);

    // Last seen steering position; held when no fresh reading is pending
    let mut steering_position = 0.0;

    loop {
        // The IMU task paces the loop: one sample, one tick
        let sample = imu_sample::wait().await;

        if let Some(position) = steering::try_take() {
            steering_position = position;
        }

        controller.update(
            steering_position,
            sample.angle_rate_rad,
            sample.accel_hor,
            sample.accel_ver,
        );

        motor_command::update(MotorCommand {
            left: controller.left_speed(),
            right: controller.right_speed(),
        });
    }
}
