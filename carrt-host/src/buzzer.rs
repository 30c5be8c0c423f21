//! The host's alert buzzer.
//!
//! Alert-class traffic from the embedded node (a stop demand, a low
//! battery) gets an audible chirp on top of the log entry. The buzzer
//! hangs off a hardware-PWM pin.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

use carrt_link::{make_rpi0_error_id, CarrtError, ErrorKind, ErrorModule};

/// Something that can chirp.
pub trait AlertBuzzer {
	fn chirp(&mut self) -> Result<(), CarrtError>;
}

const CHIRP_MS: u32 = 80;

/// PWM-driven buzzer: half duty for the chirp interval, then silence.
pub struct PwmBuzzer<P, D> {
	pwm: P,
	delay: D,
}

impl<P, D> PwmBuzzer<P, D> {
	pub fn new(pwm: P, delay: D) -> Self {
		Self { pwm, delay }
	}
}

fn pwm_error(function: u8) -> CarrtError {
	CarrtError::new(
		make_rpi0_error_id(ErrorModule::Buzzer, function, 0),
		ErrorKind::Pwm,
	)
}

impl<P: SetDutyCycle, D: DelayNs> AlertBuzzer for PwmBuzzer<P, D> {
	fn chirp(&mut self) -> Result<(), CarrtError> {
		self.pwm.set_duty_cycle_percent(50).map_err(|_| pwm_error(1))?;
		self.delay.delay_ms(CHIRP_MS);
		self.pwm.set_duty_cycle_fully_off().map_err(|_| pwm_error(2))
	}
}

#[cfg(test)]
mod tests {
	use core::convert::Infallible;

	use super::*;

	#[derive(Default)]
	struct FakePwm {
		duties: Vec<u16>,
	}

	impl embedded_hal::pwm::ErrorType for FakePwm {
		type Error = Infallible;
	}

	impl SetDutyCycle for FakePwm {
		fn max_duty_cycle(&self) -> u16 {
			100
		}

		fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
			self.duties.push(duty);
			Ok(())
		}
	}

	struct NoDelay;

	impl DelayNs for NoDelay {
		fn delay_ns(&mut self, _ns: u32) {}
	}

	#[test]
	fn chirp_raises_then_silences_the_pin() {
		let mut buzzer = PwmBuzzer::new(FakePwm::default(), NoDelay);
		buzzer.chirp().unwrap();
		assert_eq!(buzzer.pwm.duties, vec![50, 0]);
	}
}
