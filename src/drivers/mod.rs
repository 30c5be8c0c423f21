//! Peripheral contracts and the thin drivers behind them.
//!
//! Every peripheral Core-D touches is reached through one of the traits
//! here, so the event core never depends on a particular chip or SDK. The
//! real implementations are thin adapters over `embedded-hal`/`embedded-io`
//! interfaces; the hosted platform substitutes mocks.

pub mod battery;
pub mod bno055;
pub mod i2c;
pub mod led;
pub mod serial;

use alloc::boxed::Box;
use alloc::sync::Arc;

use carrt_link::{CalibrationScores, CarrtError};

use crate::core1::Core1Channel;
use crate::time::Clock;

/// The inertial measurement unit as the handlers see it.
///
/// `init` performs the full bring-up including the driver-internal settle
/// delay; `reset` only pulls the reset trigger, and the caller owes the
/// device its post-reset wait before the next `init`.
pub trait Inertial {
	fn init(&mut self) -> Result<(), CarrtError>;

	fn reset(&mut self) -> Result<(), CarrtError>;

	/// Current heading in degrees, `[0, 360)`.
	fn heading(&mut self) -> Result<f32, CarrtError>;

	fn calibration(&mut self) -> Result<CalibrationScores, CarrtError>;
}

/// Battery voltage readout.
pub trait BatteryMonitor {
	fn ic_volts(&mut self) -> Result<f32, CarrtError>;

	fn motor_volts(&mut self) -> Result<f32, CarrtError>;
}

/// The heartbeat LED.
pub trait Heartbeat {
	fn toggle(&mut self) -> Result<(), CarrtError>;
}

/// Platform reboot hook.
///
/// On the target this arms the watchdog and never returns; the hosted
/// implementation records the request and returns so tests can observe it.
pub trait SystemReset {
	fn reboot(&mut self);
}

/// Everything Core-D hands its handlers besides the queue, the link, and
/// the state flags.
pub struct Board {
	pub imu: Box<dyn Inertial>,
	pub batteries: Box<dyn BatteryMonitor>,
	pub led: Box<dyn Heartbeat>,
	pub clock: Box<dyn Clock>,
	pub reset: Box<dyn SystemReset>,
	pub core1: Arc<Core1Channel>,
}
