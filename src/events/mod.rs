//! The event core: ids, queue, and dispatch.

pub mod handlers;
pub mod processor;
pub mod queue;

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub use self::processor::{EventHandler, EventProcessor};
pub use self::queue::EventQueue;

/// Everything that can be enqueued for Core-D to act on.
///
/// The numbering is stable; new events append before the count changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EventId {
	NullEvent = 0,

	// Timer events
	QuarterSecondTimer,
	OneSecondTimer,
	EightSecondTimer,

	// Nav update events
	NavUpdate,

	// IMU events
	Bno055Initialize,
	Bno055Reset,
	Bno055BeginCalibration,
	SendCalibrationInfo,

	// Encoder events
	InitEncoders,
	EncoderLeft,
	EncoderRight,

	// Pulse LED events
	PulsePicoLed,

	// Battery events
	BatteryLow,

	// Reset
	PicoReset,

	// Test events
	GpioInterruptTestFalling,
	GpioInterruptTestRising,
	GpioInterruptTestFailure,
	GpioInterruptWrongPin,

	// Error event
	Error,
}

impl EventId {
	/// One past the last event id.
	pub const COUNT: usize = 20;
}

/// What flows through the queue: an id, an event-specific parameter, and
/// the millisecond clock at the moment the producer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
	pub id: EventId,
	pub param: i32,
	pub time: u32,
}

impl Event {
	pub fn new(id: EventId, param: i32, time: u32) -> Self {
		Self { id, param, time }
	}
}

/// Queue selector. High-priority events are always dispatched before any
/// low-priority event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
	High,
	#[default]
	Low,
}
