//! Per-tick debug telemetry
//!
//! The control law emits one six-column record per tick so a PC-side plotter
//! can watch angle, steering and the two wheel commands live. The sink is a
//! trait seam: the firmware plugs in its transport, tests plug in a recorder
//! and [`NullSink`] disables telemetry entirely.
//!
//! Values are scaled for human-readable integer columns and truncated toward
//! zero, matching what the existing plotting scripts expect. Do not switch
//! to rounding without updating those consumers.

use core::f32::consts::PI;

/// Scales radians to tenths of a degree.
const RAD_TO_DECIDEG: f32 = 1800.0 / PI;

/// Scales a fraction to a percent column.
const TO_PERCENT: f32 = 100.0;

/// Receiver for one telemetry record per tick.
///
/// Implementations must be fire-and-forget: they run inside the control
/// tick and may neither block nor fail outward. A sink that loses records
/// under pressure is acceptable, one that stalls the tick is not.
pub trait DebugSink {
    /// Consumes one record of six integer columns.
    fn send_record(&mut self, values: [i32; 6]);
}

/// Sink that drops every record; telemetry disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn send_record(&mut self, _values: [i32; 6]) {}
}

/// Builds the per-tick record.
///
/// Columns: tilt angle in tenths of a degree, steering in percent, raw left
/// and right commands in percent, two reserved columns (always zero, the
/// wire format has six columns).
pub fn record(angle_rad: f32, steering: f32, left_raw: f32, right_raw: f32) -> [i32; 6] {
    [
        (angle_rad * RAD_TO_DECIDEG) as i32,
        (steering * TO_PERCENT) as i32,
        (left_raw * TO_PERCENT) as i32,
        (right_raw * TO_PERCENT) as i32,
        0,
        0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_column_is_decidegrees() {
        // 0.1 rad = 5.7295... degrees = 57.29... decidegrees, truncated.
        let r = record(0.1, 0.0, 0.0, 0.0);
        assert_eq!(r[0], 57);
    }

    #[test]
    fn fractions_become_percent_columns() {
        let r = record(0.0, 0.5, -0.25, 1.0);
        assert_eq!(&r[1..4], &[50, -25, 100]);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.999 * 100 = 99.9 -> 99, and -0.999 -> -99, not -100.
        let r = record(0.0, 0.999, -0.999, 0.0);
        assert_eq!(r[1], 99);
        assert_eq!(r[2], -99);
    }

    #[test]
    fn reserved_columns_are_zero() {
        let r = record(1.0, 1.0, 1.0, 1.0);
        assert_eq!(r[4], 0);
        assert_eq!(r[5], 0);
    }
}
