//! Battery voltage sensing.
//!
//! Both batteries are read through resistor dividers into the ADC. The
//! divider ratios are fixed by the board layout: 39k/68k for the IC battery
//! and 180k/82k for the motor battery, against a 3.3 V reference over 12
//! bits.

use carrt_link::CarrtError;

use crate::config::{IC_BATTERY_ADC_CHANNEL, MOTOR_BATTERY_ADC_CHANNEL};
use crate::drivers::BatteryMonitor;

const ADC_CONVERSION_FACTOR: f32 = 3.3 / (1 << 12) as f32;

const IC_DIVIDER_FACTOR: f32 = (39.0 + 68.0) / 68.0;
const IC_CONVERSION_FACTOR: f32 = IC_DIVIDER_FACTOR * ADC_CONVERSION_FACTOR;

const MOTOR_DIVIDER_FACTOR: f32 = (180.0 + 82.0) / 82.0;
const MOTOR_CONVERSION_FACTOR: f32 = MOTOR_DIVIDER_FACTOR * ADC_CONVERSION_FACTOR;

/// Raw ADC access; `embedded-hal` has no ADC trait, so this is ours.
pub trait AdcReader {
	fn read(&mut self, channel: u8) -> Result<u16, CarrtError>;
}

/// Converts a raw IC-battery sample to volts at the battery terminals.
pub fn ic_volts_from_raw(raw: u16) -> f32 {
	IC_CONVERSION_FACTOR * f32::from(raw)
}

/// Converts a raw motor-battery sample to volts at the battery terminals.
pub fn motor_volts_from_raw(raw: u16) -> f32 {
	MOTOR_CONVERSION_FACTOR * f32::from(raw)
}

pub struct Batteries<A> {
	adc: A,
}

impl<A: AdcReader> Batteries<A> {
	pub fn new(adc: A) -> Self {
		Self { adc }
	}
}

impl<A: AdcReader> BatteryMonitor for Batteries<A> {
	fn ic_volts(&mut self) -> Result<f32, CarrtError> {
		Ok(ic_volts_from_raw(self.adc.read(IC_BATTERY_ADC_CHANNEL)?))
	}

	fn motor_volts(&mut self) -> Result<f32, CarrtError> {
		Ok(motor_volts_from_raw(self.adc.read(MOTOR_BATTERY_ADC_CHANNEL)?))
	}
}
