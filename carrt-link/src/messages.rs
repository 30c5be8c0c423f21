//! The concrete serial messages.
//!
//! Every message knows how to read its body from the link (`read_in`, after
//! the dispatcher has consumed the id byte) and how to write itself out
//! (`send_out`, id byte first). What a node does upon *receiving* a message
//! is node business and lives in the node crates; the transient
//! `needs_action` flag spans the gap, going up when a message is decoded (or
//! built locally with payload) and back down once the node has acted.
//!
//! Direction notes ("never sent by the Pico" and the like) describe the
//! protocol's intent; traffic in the wrong direction is logged and otherwise
//! inert rather than fatal, since the link is a trusted bus.

use log::{debug, warn};

use crate::calib::CalibrationScores;
use crate::control::{BatteryId, DriveState, EncoderSide, MsgMask, TimerWhich};
use crate::error::{make_shared_error_id, CarrtError, ErrorKind, ErrorModule};
use crate::id::MsgId;
use crate::link::SerialLink;
use crate::wire::RawMessage;

/// Object-safe contract every message implements.
pub trait SerialMessage: core::fmt::Debug {
	fn id(&self) -> MsgId;

	/// Decodes the body. The id byte must already have been consumed.
	fn read_in(&mut self, link: &mut dyn SerialLink) -> Result<(), CarrtError>;

	/// Encodes the id byte followed by the body.
	fn send_out(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError>;

	/// True between decode (or payload-carrying construction) and the
	/// node's action on the message.
	fn needs_action(&self) -> bool;

	/// Marks the pending action as done.
	fn finish_action(&mut self);
}

/// Factory constructors must only build the variant matching the id they
/// were handed; a mismatch means the registry is misconfigured.
fn verify_id(expected: MsgId, got: MsgId) -> Result<(), CarrtError> {
	if expected == got {
		Ok(())
	} else {
		Err(CarrtError::new(
			make_shared_error_id(ErrorModule::SerialMessage, 1, u8::from(expected).into()),
			ErrorKind::IdMismatch {
				expected: expected.into(),
				got: got.into(),
			},
		))
	}
}

macro_rules! no_content_message {
	($(#[$meta:meta])* $name:ident, $id:expr) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		pub struct $name {
			needs_action: bool,
		}

		impl $name {
			pub const ID: MsgId = $id;

			#[allow(clippy::new_without_default)]
			pub fn new() -> Self {
				Self { needs_action: true }
			}

			/// Factory constructor; fails fast on a registry mix-up.
			pub fn from_wire(id: MsgId) -> Result<Self, CarrtError> {
				verify_id(Self::ID, id)?;
				Ok(Self { needs_action: false })
			}
		}

		impl SerialMessage for $name {
			fn id(&self) -> MsgId {
				Self::ID
			}

			fn read_in(&mut self, _link: &mut dyn SerialLink) -> Result<(), CarrtError> {
				// The id byte is the whole message.
				self.needs_action = true;
				debug!("got {}", stringify!($name));
				Ok(())
			}

			fn send_out(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
				link.put_byte(Self::ID.into())?;
				debug!("sent {}", stringify!($name));
				Ok(())
			}

			fn needs_action(&self) -> bool {
				self.needs_action
			}

			fn finish_action(&mut self) {
				self.needs_action = false;
			}
		}
	};
}

macro_rules! data_message {
	(
		$(#[$meta:meta])*
		$name:ident, $id:expr, ($($ty:ty),+)
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq)]
		pub struct $name {
			content: RawMessage<($($ty,)+)>,
			needs_action: bool,
		}

		impl $name {
			pub const ID: MsgId = $id;

			/// Builds a payload-carrying instance ready to send or act on.
			pub fn from_data(data: ($($ty,)+)) -> Self {
				Self {
					content: RawMessage::new(Self::ID, data),
					needs_action: true,
				}
			}

			/// Factory constructor; empty until `read_in`, and fails fast
			/// on a registry mix-up.
			pub fn from_wire(id: MsgId) -> Result<Self, CarrtError> {
				verify_id(Self::ID, id)?;
				Ok(Self {
					content: RawMessage::new(Self::ID, <($($ty,)+)>::default()),
					needs_action: false,
				})
			}

			pub fn data(&self) -> ($($ty,)+) {
				self.content.data
			}
		}

		impl SerialMessage for $name {
			fn id(&self) -> MsgId {
				Self::ID
			}

			fn read_in(&mut self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
				self.content.read_in(link)?;
				self.needs_action = true;
				debug!("got {} {:?}", stringify!($name), self.content.data);
				Ok(())
			}

			fn send_out(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
				self.content.send_out(link)?;
				debug!("sent {} {:?}", stringify!($name), self.content.data);
				Ok(())
			}

			fn needs_action(&self) -> bool {
				self.needs_action
			}

			fn finish_action(&mut self) {
				self.needs_action = false;
			}
		}
	};
}

no_content_message!(
	/// Liveness probe; either node may send it and expects a
	/// [`PingReplyMsg`] back.
	PingMsg,
	MsgId::Ping
);

no_content_message!(
	/// Answer to a [`PingMsg`].
	PingReplyMsg,
	MsgId::PingReply
);

no_content_message!(
	/// The embedded node tells the host to stop all motion now.
	PicoSaysStopMsg,
	MsgId::PicoSaysStop
);

no_content_message!(
	/// Host orders the embedded node to reboot. Acknowledged by echoing the
	/// same id just before the watchdog fires.
	ResetPicoMsg,
	MsgId::ResetPico
);

no_content_message!(
	/// Host orders an IMU calibration cycle.
	BeginCalibrationMsg,
	MsgId::BeginCalibration
);

no_content_message!(
	/// Host asks for the current calibration status; always answered with a
	/// [`PicoNavStatusUpdateMsg`] regardless of the telemetry mask.
	RequestCalibStatusMsg,
	MsgId::RequestCalibStatus
);

no_content_message!(
	/// Host orders an IMU hard reset and re-initialization.
	ResetBno055Msg,
	MsgId::ResetBno055
);

data_message!(
	/// Boot handshake from the embedded node: milliseconds since boot at
	/// the time the node came up.
	PicoReadyMsg,
	MsgId::PicoReady,
	(u32)
);

impl PicoReadyMsg {
	pub fn new(time: u32) -> Self {
		Self::from_data((time,))
	}

	pub fn time(&self) -> u32 {
		self.content.data.0
	}
}

data_message!(
	/// Navigation-readiness edge report: the good/bad verdict plus the four
	/// raw calibration scores behind it.
	PicoNavStatusUpdateMsg,
	MsgId::PicoNavStatusUpdate,
	(u8, u8, u8, u8, u8)
);

impl PicoNavStatusUpdateMsg {
	pub fn new(good: bool, scores: CalibrationScores) -> Self {
		Self::from_data((
			u8::from(good),
			scores.mag,
			scores.accel,
			scores.gyro,
			scores.system,
		))
	}

	pub fn good(&self) -> bool {
		self.content.data.0 != 0
	}

	pub fn scores(&self) -> CalibrationScores {
		let (_, mag, accel, gyro, system) = self.content.data;
		CalibrationScores::new(mag, accel, gyro, system)
	}
}

data_message!(
	/// Host sets the full telemetry mask in one shot.
	MsgControlMsg,
	MsgId::MsgControl,
	(u8)
);

impl MsgControlMsg {
	pub fn new(mask: MsgMask) -> Self {
		Self::from_data((mask.bits(),))
	}

	pub fn mask(&self) -> MsgMask {
		MsgMask::from_bits_retain(self.content.data.0)
	}
}

data_message!(
	/// One periodic timer firing: which stream (in eighth-second units),
	/// the stream's rolling count, and the millisecond clock at the tick.
	TimerEventMsg,
	MsgId::TimerEvent,
	(u8, i32, u32)
);

impl TimerEventMsg {
	pub fn new(which: TimerWhich, count: i32, time: u32) -> Self {
		Self::from_data((which.into(), count, time))
	}

	pub fn which(&self) -> u8 {
		self.content.data.0
	}

	pub fn count(&self) -> i32 {
		self.content.data.1
	}

	pub fn time(&self) -> u32 {
		self.content.data.2
	}
}

data_message!(
	/// Host sets just the three timer-stream bits of the telemetry mask.
	TimerControlMsg,
	MsgId::TimerControl,
	(u8)
);

impl TimerControlMsg {
	pub fn new(mask: MsgMask) -> Self {
		Self::from_data((mask.bits(),))
	}

	pub fn mask(&self) -> MsgMask {
		MsgMask::from_bits_retain(self.content.data.0)
	}
}

data_message!(
	/// Routine calibration report while the scores are unchanged.
	CalibrationInfoUpdateMsg,
	MsgId::CalibrationInfoUpdate,
	(u8, u8, u8, u8)
);

impl CalibrationInfoUpdateMsg {
	pub fn new(scores: CalibrationScores) -> Self {
		Self::from_data((scores.mag, scores.accel, scores.gyro, scores.system))
	}

	pub fn scores(&self) -> CalibrationScores {
		let (mag, accel, gyro, system) = self.content.data;
		CalibrationScores::new(mag, accel, gyro, system)
	}
}

data_message!(
	/// Host toggles automatic recalibration mode.
	SetAutoCalibrateMsg,
	MsgId::SetAutoCalibrate,
	(u8)
);

impl SetAutoCalibrateMsg {
	pub fn new(on: bool) -> Self {
		Self::from_data((u8::from(on),))
	}

	pub fn enabled(&self) -> bool {
		self.content.data.0 != 0
	}
}

data_message!(
	/// Heading sample from the 8 Hz navigation tick.
	NavUpdateMsg,
	MsgId::TimerNavUpdate,
	(f32, u32)
);

impl NavUpdateMsg {
	pub fn new(heading: f32, time: u32) -> Self {
		Self::from_data((heading, time))
	}

	pub fn heading(&self) -> f32 {
		self.content.data.0
	}

	pub fn time(&self) -> u32 {
		self.content.data.1
	}
}

data_message!(
	/// Host toggles the nav-update and nav-status streams independently.
	NavUpdateControlMsg,
	MsgId::NavUpdateControl,
	(u8, u8)
);

impl NavUpdateControlMsg {
	pub fn new(want_nav: bool, want_status: bool) -> Self {
		Self::from_data((u8::from(want_nav), u8::from(want_status)))
	}

	pub fn want_nav(&self) -> bool {
		self.content.data.0 != 0
	}

	pub fn want_status(&self) -> bool {
		self.content.data.1 != 0
	}
}

data_message!(
	/// Host informs the embedded node of the current driving state.
	DrivingStatusUpdateMsg,
	MsgId::DrivingStatusUpdate,
	(u8)
);

impl DrivingStatusUpdateMsg {
	pub fn new(state: DriveState) -> Self {
		Self::from_data((state.into(),))
	}

	pub fn state(&self) -> u8 {
		self.content.data.0
	}

	pub fn drive_state(&self) -> Option<DriveState> {
		DriveState::try_from(self.content.data.0).ok()
	}
}

data_message!(
	/// One accepted wheel-encoder edge: side, signed direction, and the
	/// millisecond clock at the interrupt.
	EncoderUpdateMsg,
	MsgId::EncoderUpdate,
	(u8, i32, u32)
);

impl EncoderUpdateMsg {
	pub fn new(side: EncoderSide, count: i32, time: u32) -> Self {
		Self::from_data((side.into(), count, time))
	}

	pub fn side(&self) -> u8 {
		self.content.data.0
	}

	pub fn count(&self) -> i32 {
		self.content.data.1
	}

	pub fn time(&self) -> u32 {
		self.content.data.2
	}
}

data_message!(
	/// Host toggles the encoder stream.
	EncoderUpdateControlMsg,
	MsgId::EncoderUpdateControl,
	(u8)
);

impl EncoderUpdateControlMsg {
	pub fn new(on: bool) -> Self {
		Self::from_data((u8::from(on),))
	}

	pub fn enabled(&self) -> bool {
		self.content.data.0 != 0
	}
}

data_message!(
	/// Host asks for a battery voltage; `Both` is answered with two
	/// updates, IC battery first.
	BatteryLevelRequestMsg,
	MsgId::BatteryLevelRequest,
	(u8)
);

impl BatteryLevelRequestMsg {
	pub fn new(which: BatteryId) -> Self {
		Self::from_data((which.into(),))
	}

	pub fn which(&self) -> u8 {
		self.content.data.0
	}
}

data_message!(
	/// One battery voltage reading.
	BatteryLevelUpdateMsg,
	MsgId::BatteryLevelUpdate,
	(u8, f32)
);

impl BatteryLevelUpdateMsg {
	pub fn new(which: BatteryId, volts: f32) -> Self {
		Self::from_data((which.into(), volts))
	}

	pub fn which(&self) -> u8 {
		self.content.data.0
	}

	pub fn volts(&self) -> f32 {
		self.content.data.1
	}
}

data_message!(
	/// Unsolicited warning that a battery has sagged below its floor.
	BatteryLowAlertMsg,
	MsgId::BatteryLowAlert,
	(u8, f32)
);

impl BatteryLowAlertMsg {
	pub fn new(which: BatteryId, volts: f32) -> Self {
		Self::from_data((which.into(), volts))
	}

	pub fn which(&self) -> u8 {
		self.content.data.0
	}

	pub fn volts(&self) -> f32 {
		self.content.data.1
	}
}

data_message!(
	/// Error report from the embedded node: fatality flag, structured error
	/// id, and the millisecond clock at detection.
	ErrorReportMsg,
	MsgId::ErrorReportFromPico,
	(u8, i32, u32)
);

impl ErrorReportMsg {
	pub fn new(fatal: bool, code: i32, time: u32) -> Self {
		Self::from_data((u8::from(fatal), code, time))
	}

	pub fn is_fatal(&self) -> bool {
		self.content.data.0 != 0
	}

	pub fn code(&self) -> i32 {
		self.content.data.1
	}

	pub fn time(&self) -> u32 {
		self.content.data.2
	}
}

data_message!(
	/// Test hook: host asks the embedded node to fabricate an error report
	/// with the given fatality and code.
	TestPicoErrorRptMsg,
	MsgId::TestPicoReportError,
	(u8, i32)
);

impl TestPicoErrorRptMsg {
	pub fn new(fatal: bool, code: i32) -> Self {
		Self::from_data((u8::from(fatal), code))
	}

	pub fn make_fatal(&self) -> bool {
		self.content.data.0 != 0
	}

	pub fn code(&self) -> i32 {
		self.content.data.1
	}
}

data_message!(
	/// Test hook: host asks the embedded node to send back a sample of the
	/// named message type.
	TestPicoMessagesMsg,
	MsgId::TestPicoMessages,
	(u8)
);

impl TestPicoMessagesMsg {
	pub fn new(id_to_send: u8) -> Self {
		Self::from_data((id_to_send,))
	}

	pub fn requested(&self) -> u8 {
		self.content.data.0
	}
}

data_message!(
	/// Acknowledgment used by the message test hook for variants the
	/// embedded node never sends for real.
	PicoReceivedTestMsg,
	MsgId::PicoReceivedTest,
	(u8)
);

impl PicoReceivedTestMsg {
	pub fn new(received: u8) -> Self {
		Self::from_data((received,))
	}

	pub fn received(&self) -> u8 {
		self.content.data.0
	}
}

data_message!(
	/// Link exerciser carrying one of each field type; the receiver answers
	/// with a transformed copy.
	DebugLinkMsg,
	MsgId::DebugSerialLink,
	(i32, u8, f32, u32)
);

impl DebugLinkMsg {
	pub fn new(int_val: i32, byte_val: u8, float_val: f32, uint_val: u32) -> Self {
		Self::from_data((int_val, byte_val, float_val, uint_val))
	}

	pub fn int_val(&self) -> i32 {
		self.content.data.0
	}

	pub fn byte_val(&self) -> u8 {
		self.content.data.1
	}

	pub fn float_val(&self) -> f32 {
		self.content.data.2
	}

	pub fn uint_val(&self) -> u32 {
		self.content.data.3
	}
}

/// Stand-in for an id the receiving node does not recognize.
///
/// The body length of an unknown id is unknowable, so nothing is read; the
/// node reports the error and the link resynchronizes on the next
/// recognizable id byte. Never sent on the wire itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMsg {
	rcvd_id: u8,
	err_code: i32,
	needs_action: bool,
}

impl UnknownMsg {
	pub const ID: MsgId = MsgId::Unknown;

	pub fn new(rcvd_id: u8, err_code: i32) -> Self {
		Self {
			rcvd_id,
			err_code,
			needs_action: true,
		}
	}

	pub fn rcvd_id(&self) -> u8 {
		self.rcvd_id
	}

	pub fn err_code(&self) -> i32 {
		self.err_code
	}
}

impl SerialMessage for UnknownMsg {
	fn id(&self) -> MsgId {
		Self::ID
	}

	fn read_in(&mut self, _link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		// Unknown message; don't try to read a body.
		self.needs_action = true;
		warn!("received unknown message id {:#04x}", self.rcvd_id);
		Ok(())
	}

	fn send_out(&self, _link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		warn!("suppressed attempt to send UnknownMsg for id {:#04x}", self.rcvd_id);
		Ok(())
	}

	fn needs_action(&self) -> bool {
		self.needs_action
	}

	fn finish_action(&mut self) {
		self.needs_action = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestLink;

	fn round_trip<M>(msg: &M) -> M
	where
		M: SerialMessage + Clone,
	{
		let mut link = TestLink::new();
		msg.send_out(&mut link).unwrap();
		let bytes = link.take_sent();
		link.push_inbound(&bytes);

		assert_eq!(link.try_get_id(), Some(msg.id().into()));
		let mut back = msg.clone();
		back.read_in(&mut link).unwrap();
		assert!(link.inbound_is_empty(), "body length mismatch");
		back
	}

	#[test]
	fn every_variant_round_trips_bitwise() {
		let ready = PicoReadyMsg::new(123_456);
		assert_eq!(round_trip(&ready).data(), ready.data());

		let nav_status =
			PicoNavStatusUpdateMsg::new(true, CalibrationScores::new(3, 2, 2, 2));
		assert_eq!(round_trip(&nav_status).data(), nav_status.data());

		let cases_one_byte = MsgControlMsg::new(MsgMask::NAV | MsgMask::ENCODER);
		assert_eq!(round_trip(&cases_one_byte).data(), cases_one_byte.data());

		let timer = TimerEventMsg::new(TimerWhich::OneSecond, 123, 123_456);
		assert_eq!(round_trip(&timer).data(), timer.data());

		let timer_ctl = TimerControlMsg::new(MsgMask::QTR_SEC_TIMER);
		assert_eq!(round_trip(&timer_ctl).data(), timer_ctl.data());

		let calib = CalibrationInfoUpdateMsg::new(CalibrationScores::new(2, 4, 6, 8));
		assert_eq!(round_trip(&calib).data(), calib.data());

		let auto_cal = SetAutoCalibrateMsg::new(true);
		assert_eq!(round_trip(&auto_cal).data(), auto_cal.data());

		let nav = NavUpdateMsg::new(180.081, 456_123);
		assert_eq!(round_trip(&nav).data(), nav.data());

		let nav_ctl = NavUpdateControlMsg::new(true, false);
		assert_eq!(round_trip(&nav_ctl).data(), nav_ctl.data());

		let driving = DrivingStatusUpdateMsg::new(DriveState::Forward);
		assert_eq!(round_trip(&driving).data(), driving.data());

		let encoder = EncoderUpdateMsg::new(EncoderSide::Right, -10, 654_321);
		assert_eq!(round_trip(&encoder).data(), encoder.data());

		let encoder_ctl = EncoderUpdateControlMsg::new(true);
		assert_eq!(round_trip(&encoder_ctl).data(), encoder_ctl.data());

		let batt_req = BatteryLevelRequestMsg::new(BatteryId::Both);
		assert_eq!(round_trip(&batt_req).data(), batt_req.data());

		let batt = BatteryLevelUpdateMsg::new(BatteryId::Motor, 5.2);
		assert_eq!(round_trip(&batt).data(), batt.data());

		let batt_low = BatteryLowAlertMsg::new(BatteryId::Ic, 3.1);
		assert_eq!(round_trip(&batt_low).data(), batt_low.data());

		let err = ErrorReportMsg::new(false, 10_203_017, 99);
		assert_eq!(round_trip(&err).data(), err.data());

		let test_err = TestPicoErrorRptMsg::new(true, -5);
		assert_eq!(round_trip(&test_err).data(), test_err.data());

		let test_msgs = TestPicoMessagesMsg::new(7);
		assert_eq!(round_trip(&test_msgs).data(), test_msgs.data());

		let rcvd = PicoReceivedTestMsg::new(9);
		assert_eq!(round_trip(&rcvd).data(), rcvd.data());

		let dbg = DebugLinkMsg::new(1, 4, 16.25, 36);
		assert_eq!(round_trip(&dbg).data(), dbg.data());
	}

	#[test]
	fn no_content_messages_are_one_byte() {
		let mut link = TestLink::new();
		PingMsg::new().send_out(&mut link).unwrap();
		PingReplyMsg::new().send_out(&mut link).unwrap();
		ResetPicoMsg::new().send_out(&mut link).unwrap();
		assert_eq!(link.sent(), &[0x00, 0x01, 0x06]);
	}

	#[test]
	fn from_wire_rejects_mismatched_ids() {
		let err = PingMsg::from_wire(MsgId::PingReply).unwrap_err();
		assert!(matches!(err.kind, ErrorKind::IdMismatch { .. }));

		let err = TimerEventMsg::from_wire(MsgId::Ping).unwrap_err();
		assert!(matches!(err.kind, ErrorKind::IdMismatch { .. }));
	}

	#[test]
	fn needs_action_spans_decode_to_action() {
		let mut msg = TimerEventMsg::from_wire(MsgId::TimerEvent).unwrap();
		assert!(!msg.needs_action());

		let mut link = TestLink::new();
		TimerEventMsg::new(TimerWhich::EightSecond, 1, 2)
			.send_out(&mut link)
			.unwrap();
		link.poll_byte(); // dispatcher consumes the id
		msg.read_in(&mut link).unwrap();
		assert!(msg.needs_action());

		msg.finish_action();
		assert!(!msg.needs_action());
	}

	#[test]
	fn unknown_reads_no_body() {
		let mut link = TestLink::new();
		link.push_inbound(&[0xAA, 0xBB, 0xCC]);
		let mut msg = UnknownMsg::new(0x7F, 42);
		msg.read_in(&mut link).unwrap();
		// The stray bytes stay put for the resync scan.
		assert_eq!(link.poll_byte(), Some(0xAA));
	}
}
