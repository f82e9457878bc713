//! Steering potentiometer reading
//!
//! Samples the handlebar potentiometer through the ADC, median-filters the
//! raw readings to suppress wiper noise, and publishes the position
//! normalized to [-1.0, 1.0]. The control loop picks up whatever the latest
//! published value is; steering is a slow human input and does not need the
//! full control rate.

use embassy_rp::{adc::Channel, gpio::Pull};
use embassy_time::{Duration, Timer};
use moving_median::MovingMedian;

use crate::system::{
    resources::{get_adc, SteeringResources},
    steering,
};

/// Time between steering measurements; 50 ms is well below human reaction
/// time while keeping ADC traffic low
const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(50);

/// ADC reading with the potentiometer centered (12-bit midpoint)
const STEERING_CENTER: f32 = 2048.0;

/// Median filter window (5 samples suppress single-reading wiper glitches
/// without adding noticeable steering lag)
const MEDIAN_WINDOW_SIZE: usize = 5;

/// Steering acquisition task
#[embassy_executor::task]
pub async fn steering_read(r: SteeringResources) {
    let mut channel = Channel::new_pin(r.adc_pin, Pull::None);

    let mut median_filter = MovingMedian::<f32, MEDIAN_WINDOW_SIZE>::new();

    // Initial delay to ensure system stabilization before first reading
    Timer::after(Duration::from_millis(500)).await;

    loop {
        let raw = {
            // ADC lock is released again at the end of this scope
            let mut adc_guard = get_adc().lock().await;
            let adc = adc_guard.as_mut().unwrap();
            f32::from(adc.read(&mut channel).await.unwrap_or(STEERING_CENTER as u16))
        };

        median_filter.add_value(raw);

        // Normalize the 12-bit reading around the mechanical center and
        // clamp, since the end stops sit slightly inside the ADC range
        let position = ((median_filter.median() - STEERING_CENTER) / STEERING_CENTER)
            .clamp(-1.0, 1.0);
        steering::update(position);

        Timer::after(MEASUREMENT_INTERVAL).await;
    }
}
