//! System core modules: hardware resource map and inter-task hand-off signals
pub mod imu_sample;
pub mod motor_command;
pub mod resources;
pub mod steering;
