//! Task implementations
pub mod balance_control;
pub mod drive;
pub mod imu_read;
pub mod steering_read;
