//! IMU reading from the MPU6050 gyro/accelerometer over I2C.
//!
//! Samples the sensor at the control loop rate and publishes one
//! [`ImuSample`] per period, already scaled to physical units and mapped
//! into the vehicle frame. Everything downstream runs off these samples, so
//! this task sets the pace of the whole balance loop.
//!
//! # Axis mapping
//!
//! The sensor sits in the steering column with its Y axis along the wheel
//! axis and its X axis pointing up:
//! - gyro Y: tilt rate (inverted so rotating in driving direction is positive)
//! - accel Z: horizontal component (driving direction positive)
//! - accel X: vertical component (inverted so downwards is positive)
//!
//! The register-level driver is kept in here deliberately; the handful of
//! registers the balance loop needs does not justify an external crate.

use balance_core::config::UPDATE_FREQ_HZ;
use defmt::info;
use embassy_rp::i2c::{self, Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker, Timer};

use crate::system::imu_sample::{self, ImuSample};
use crate::system::resources::{ImuResources, Irqs};

/// Sampling period; one controller tick runs per sample, so this must stay
/// consistent with `balance_core::config::UPDATE_FREQ_HZ`
const SAMPLE_INTERVAL: Duration = Duration::from_hz(UPDATE_FREQ_HZ as u64);

/// Consecutive bus errors tolerated before the task gives up
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

// MPU6050, AD0 pin low
const MPU6050_ADDR: u8 = 0x68;

const REG_SMPLRT_DIV: u8 = 0x19;
const REG_CONFIG: u8 = 0x1a;
const REG_GYRO_CONFIG: u8 = 0x1b;
const REG_ACCEL_CONFIG: u8 = 0x1c;
const REG_ACCEL_XOUT_H: u8 = 0x3b;
const REG_PWR_MGMT_1: u8 = 0x6b;
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_VALUE: u8 = 0x68;

/// Gyro sensitivity at the +/-250 dps range, LSB per deg/s
const GYRO_SENS: f32 = 131.0;

/// Accelerometer sensitivity at the +/-2 g range, LSB per g
const ACCEL_SENS: f32 = 16384.0;

const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;

// Mounting sign conventions, see module docs
const INVERT_ANGLE_RATE: f32 = -1.0;
const INVERT_HOR: f32 = 1.0;
const INVERT_VER: f32 = -1.0;

/// Minimal MPU6050 register driver over the async I2C bus
struct Mpu6050 {
    i2c: I2c<'static, I2C0, Async>,
}

/// One raw sensor readout in sensor-frame units
struct RawSample {
    accel: [i16; 3],
    gyro: [i16; 3],
}

impl Mpu6050 {
    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), i2c::Error> {
        self.i2c.write_async(MPU6050_ADDR, [reg, value]).await
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u8, i2c::Error> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read_async(MPU6050_ADDR, [reg], &mut buf)
            .await?;
        Ok(buf[0])
    }

    /// Wakes the sensor and configures ranges and filtering for balancing:
    /// +/-250 dps and +/-2 g full scale (maximum resolution, the vehicle
    /// never exceeds either), 44 Hz DLPF against motor vibration, sample
    /// rate divider matching the control loop frequency.
    async fn init(&mut self) -> Result<(), i2c::Error> {
        // Clock from the X gyro PLL, more stable than the internal RC
        self.write_reg(REG_PWR_MGMT_1, 0x01).await?;
        // DLPF at 44 Hz (accel) / 42 Hz (gyro); internal rate 1 kHz
        self.write_reg(REG_CONFIG, 0x03).await?;
        // 1 kHz / (1 + 9) = 100 Hz register update rate
        self.write_reg(REG_SMPLRT_DIV, (1000.0 / UPDATE_FREQ_HZ) as u8 - 1)
            .await?;
        self.write_reg(REG_GYRO_CONFIG, 0x00).await?;
        self.write_reg(REG_ACCEL_CONFIG, 0x00).await?;
        Ok(())
    }

    /// Burst-reads accel and gyro in one transaction (14 bytes, big-endian,
    /// temperature in the middle is skipped)
    async fn read_sample(&mut self) -> Result<RawSample, i2c::Error> {
        let mut buf = [0u8; 14];
        self.i2c
            .write_read_async(MPU6050_ADDR, [REG_ACCEL_XOUT_H], &mut buf)
            .await?;

        let word = |hi: usize| i16::from_be_bytes([buf[hi], buf[hi + 1]]);
        Ok(RawSample {
            accel: [word(0), word(2), word(4)],
            gyro: [word(8), word(10), word(12)],
        })
    }
}

/// Acquisition task: configures the MPU6050 and streams samples at the
/// control loop rate
#[embassy_executor::task]
pub async fn imu_read(r: ImuResources) {
    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(r.i2c, r.scl_pin, r.sda_pin, Irqs, config);
    let mut sensor = Mpu6050 { i2c };

    // Give the sensor time to come out of power-on before probing it
    Timer::after(Duration::from_millis(100)).await;

    match sensor.read_reg(REG_WHO_AM_I).await {
        Ok(WHO_AM_I_VALUE) => info!("MPU6050 detected"),
        Ok(id) => {
            info!("Unexpected WHO_AM_I value {}, IMU task parking", id);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
        Err(e) => {
            info!("Failed to probe MPU6050: {:?}, IMU task parking", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    }

    if let Err(e) = sensor.init().await {
        info!("Failed to configure MPU6050: {:?}, IMU task parking", e);
        loop {
            Timer::after(Duration::from_secs(1)).await;
        }
    }
    info!("MPU6050 configured: ±250°/s, ±2g, 44Hz DLPF, {} Hz", UPDATE_FREQ_HZ);

    let mut consecutive_failures = 0u32;
    let mut ticker = Ticker::every(SAMPLE_INTERVAL);
    loop {
        ticker.next().await;

        let raw = match sensor.read_sample().await {
            Ok(raw) => {
                consecutive_failures = 0;
                raw
            }
            Err(e) => {
                consecutive_failures += 1;
                info!(
                    "IMU read failed: {:?} (failure {} of {})",
                    e, consecutive_failures, MAX_CONSECUTIVE_FAILURES
                );
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    info!("Max consecutive IMU failures reached, IMU task terminating");
                    return;
                }
                continue;
            }
        };

        // Scale to physical units and map into the vehicle frame
        imu_sample::update(ImuSample {
            angle_rate_rad: INVERT_ANGLE_RATE * f32::from(raw.gyro[1]) / GYRO_SENS * DEG_TO_RAD,
            accel_hor: INVERT_HOR * f32::from(raw.accel[2]) / ACCEL_SENS,
            accel_ver: INVERT_VER * f32::from(raw.accel[0]) / ACCEL_SENS,
        });
    }
}
