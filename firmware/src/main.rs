//! Balance robot firmware entry point
//!
//! Initializes the system and spawns the acquisition, control and output
//! tasks. The balance algorithm itself lives in the hardware-free
//! `balance-core` crate; everything in this binary is the thin shim between
//! that core and the board.

#![no_std]
#![no_main]

use crate::task::{
    balance_control::balance_control, drive::drive, imu_read::imu_read,
    steering_read::steering_read,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{self, AssignedResources, ImuResources, MotorDriverResources, SteeringResources};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // The ADC is a shared global; it must be ready before any task that
    // reads analog values is spawned.
    resources::init_adc(p.ADC);

    // Split the remaining peripherals into one resource group per task
    let r = split_resources!(p);

    // Output side first so the first motor command finds a ready consumer,
    // then the control loop, then the producers that pace it
    spawner.spawn(drive(r.motor_driver)).unwrap();
    spawner.spawn(balance_control()).unwrap();
    spawner.spawn(steering_read(r.steering)).unwrap();
    spawner.spawn(imu_read(r.imu)).unwrap();
}
