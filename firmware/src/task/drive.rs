//! Motor drive output
//!
//! Consumes the per-tick [`MotorCommand`] and applies it to the TB6612FNG
//! dual motor driver. This is pure output plumbing: the duty cycles arrive
//! already clamped, so all that happens here is mapping a signed fraction
//! onto the driver's direction-plus-percent interface.

use defmt::info;
use embassy_rp::gpio;
use embassy_rp::pwm;
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

use crate::system::motor_command;
use crate::system::resources::MotorDriverResources;

/// Maps a duty cycle fraction in [-1.0, 1.0] onto a driver command.
///
/// Truncation means sub-percent commands become `Stop`; around zero that
/// doubles as a small deadband, so the motors do not hum at the balance
/// point.
fn to_drive_command(duty: f32) -> DriveCommand {
    let percent = (duty * 100.0) as i32;
    if percent > 0 {
        DriveCommand::Forward(percent.min(100) as u8)
    } else if percent < 0 {
        DriveCommand::Backward((-percent).min(100) as u8)
    } else {
        DriveCommand::Stop
    }
}

/// Motor output task
#[embassy_executor::task]
pub async fn drive(r: MotorDriverResources) {
    // Configure PWM for motor control
    // We use 10kHz frequency as cheaper DC motors often work better at lower frequencies
    let desired_freq_hz = 10_000;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    // Configure PWM
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // Initialize TB6612FNG motor driver pins
    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // motor A, here defined to be the left motor
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // motor B, here defined to be the right motor
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config.clone());
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    // Create motor driver controller instance
    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();

    // The balance loop needs the motors live from the first command
    control.disable_standby().unwrap();
    info!("Motor driver ready");

    loop {
        let command = motor_command::wait().await;

        control
            .motor_a
            .drive(to_drive_command(command.left))
            .unwrap();
        control
            .motor_b
            .drive(to_drive_command(command.right))
            .unwrap();
    }
}
