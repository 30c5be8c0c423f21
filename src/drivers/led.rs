//! Heartbeat LED.

use embedded_hal::digital::StatefulOutputPin;

use carrt_link::{make_pico_error_id, CarrtError, ErrorKind, ErrorModule};

use crate::drivers::Heartbeat;

/// The on-board LED, pulsed once a second so a glance tells whether the
/// event core is alive.
pub struct HeartbeatLed<P> {
	pin: P,
}

impl<P> HeartbeatLed<P> {
	pub fn new(pin: P) -> Self {
		Self { pin }
	}
}

impl<P: StatefulOutputPin> Heartbeat for HeartbeatLed<P> {
	fn toggle(&mut self) -> Result<(), CarrtError> {
		self.pin.toggle().map_err(|_| {
			CarrtError::new(
				make_pico_error_id(ErrorModule::MainProcess, 1, 0),
				ErrorKind::Pwm,
			)
		})
	}
}

#[cfg(test)]
mod tests {
	use core::convert::Infallible;

	use embedded_hal::digital::{ErrorType, OutputPin};

	use super::*;

	#[derive(Default)]
	struct FakePin {
		high: bool,
		toggles: u32,
	}

	impl ErrorType for FakePin {
		type Error = Infallible;
	}

	impl OutputPin for FakePin {
		fn set_low(&mut self) -> Result<(), Infallible> {
			self.high = false;
			Ok(())
		}

		fn set_high(&mut self) -> Result<(), Infallible> {
			self.high = true;
			Ok(())
		}
	}

	impl StatefulOutputPin for FakePin {
		fn is_set_high(&mut self) -> Result<bool, Infallible> {
			Ok(self.high)
		}

		fn is_set_low(&mut self) -> Result<bool, Infallible> {
			Ok(!self.high)
		}

		fn toggle(&mut self) -> Result<(), Infallible> {
			self.high = !self.high;
			self.toggles += 1;
			Ok(())
		}
	}

	#[test]
	fn toggle_flips_the_pin() {
		let mut led = HeartbeatLed::new(FakePin::default());
		led.toggle().unwrap();
		assert!(led.pin.high);
		led.toggle().unwrap();
		assert!(!led.pin.high);
		assert_eq!(led.pin.toggles, 2);
	}
}
