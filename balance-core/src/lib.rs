//! Balance control core for a self-balancing two-wheeled robot
//!
//! Everything in this crate is plain arithmetic on pre-sampled values: the
//! surrounding firmware hands in one IMU sample and the current steering
//! position once per tick, and reads back two clamped motor duty cycles.
//! Nothing here blocks, allocates or touches hardware, which keeps the crate
//! testable on the host and keeps tick execution time bounded on the target.
//!
//! # Data flow per tick
//!
//! ```text
//! angle rate + accelerations ──> TiltFilter ──> filtered angle/rate
//!                                                      │
//! steering position ──────────────────────────> Controller::update
//!                                                      │
//!                                        raw left/right commands
//!                                                      │
//!                                   clamped accessors (left_speed/right_speed)
//! ```
//!
//! The control law is based on the P(I)D scooter controller by Trevor
//! Blackwell (http://www.tlb.org/#scooter); see [`controller`] for the
//! details and the tuning constants.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod filter;
pub mod fusion;
pub mod telemetry;

pub use config::ControllerConfig;
pub use controller::Controller;
pub use telemetry::{DebugSink, NullSink};
