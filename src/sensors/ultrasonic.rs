//! HC-SR04 ultrasonic ranger.
//!
//! A 10 µs HIGH pulse on TRIG starts a measurement; ECHO then goes HIGH for
//! the round-trip time of the burst.  Distance = echo_us * 0.034 / 2 cm.
//! The whole cycle, waiting for the echo edge included, is bounded by
//! [`ECHO_TIMEOUT_US`].
//!
//! ## Dual-target design
//!
//! [`Hcsr04`] is generic over `embedded-hal` 1.0 pins and delay, so it runs
//! on `esp-idf-hal` drivers on the device and on mock pins in host tests.
//! On host builds [`SimRanger`] stands in for the physical sensor; its
//! distance is injected with [`sim_set_distance`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::RangingPort;
use crate::error::SensorError;

/// Upper bound on one measurement, echo wait included.
pub const ECHO_TIMEOUT_US: u64 = 30_000;

/// Speed of sound in cm/µs, halved for the round trip.
const CM_PER_ECHO_US: f32 = 0.034 / 2.0;

/// Blocking single-shot HC-SR04 driver.
pub struct Hcsr04<T, E, D> {
    trig: T,
    echo: E,
    delay: D,
    /// Monotonic microsecond clock.
    clock: fn() -> u64,
}

impl<T, E, D> Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    pub fn new(trig: T, echo: E, delay: D, clock: fn() -> u64) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
        }
    }

    fn pulse_trigger(&mut self) -> Result<(), SensorError> {
        self.trig.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(2);
        self.trig.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(10);
        self.trig.set_low().map_err(|_| SensorError::GpioFailed)
    }

    /// Spin until ECHO reads `high`, or fail once the cycle started at
    /// `armed_at` exceeds the timeout.
    fn wait_for_level(&mut self, high: bool, armed_at: u64) -> Result<(), SensorError> {
        loop {
            if self.echo.is_high().map_err(|_| SensorError::GpioFailed)? == high {
                return Ok(());
            }
            if (self.clock)().saturating_sub(armed_at) > ECHO_TIMEOUT_US {
                return Err(SensorError::EchoTimeout);
            }
        }
    }
}

impl<T, E, D> RangingPort for Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    fn ping(&mut self) -> Result<f32, SensorError> {
        self.pulse_trigger()?;

        let armed_at = (self.clock)();
        self.wait_for_level(true, armed_at)?;
        let rise = (self.clock)();
        self.wait_for_level(false, armed_at)?;
        let fall = (self.clock)();

        Ok(fall.saturating_sub(rise) as f32 * CM_PER_ECHO_US)
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU32, Ordering};

    /// f32 bit pattern of the simulated distance; NaN means "no echo".
    static SIM_DISTANCE_BITS: AtomicU32 = AtomicU32::new(0x7FC0_0000);

    /// Set the distance the simulated ranger reports.  `None` simulates an
    /// echo timeout.
    pub fn sim_set_distance(cm: Option<f32>) {
        let bits = cm.unwrap_or(f32::NAN).to_bits();
        SIM_DISTANCE_BITS.store(bits, Ordering::Relaxed);
    }

    pub(super) fn sim_distance() -> f32 {
        f32::from_bits(SIM_DISTANCE_BITS.load(Ordering::Relaxed))
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::sim_set_distance;

/// Stand-in ranger for host builds.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimRanger;

#[cfg(not(target_os = "espidf"))]
impl RangingPort for SimRanger {
    fn ping(&mut self) -> Result<f32, SensorError> {
        let d = sim::sim_distance();
        if d.is_nan() {
            Err(SensorError::EchoTimeout)
        } else {
            Ok(d)
        }
    }
}
