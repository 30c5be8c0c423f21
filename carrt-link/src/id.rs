//! Message Identifiers

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The identifier byte that opens every frame on the serial link.
///
/// Ids are stable across firmware versions: new messages append to the end
/// of the list, and ids are never reused or renumbered. `Unknown` is a
/// reserved sentinel that never appears on the wire as a sender id; it is
/// what a receiver turns an unrecognized id into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MsgId {
	Ping = 0,
	PingReply,
	PicoReady,
	PicoNavStatusUpdate,
	PicoSaysStop,
	MsgControl,
	ResetPico,
	TimerEvent,
	TimerControl,
	BeginCalibration,
	RequestCalibStatus,
	CalibrationInfoUpdate,
	SetAutoCalibrate,
	ResetBno055,
	TimerNavUpdate,
	NavUpdateControl,
	DrivingStatusUpdate,
	EncoderUpdate,
	EncoderUpdateControl,
	BatteryLevelRequest,
	BatteryLevelUpdate,
	BatteryLowAlert,
	ErrorReportFromPico,
	TestPicoReportError,
	TestPicoMessages,
	PicoReceivedTest,
	DebugSerialLink,

	Unknown = 0xFF,
}

impl MsgId {
	/// One past the last real id; `Unknown` is not counted.
	pub const COUNT: usize = 27;
}
