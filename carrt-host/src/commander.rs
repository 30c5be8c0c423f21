//! Outbound control traffic.

use carrt_link::messages::{
	BatteryLevelRequestMsg, BeginCalibrationMsg, DebugLinkMsg, DrivingStatusUpdateMsg,
	EncoderUpdateControlMsg, MsgControlMsg, NavUpdateControlMsg, PingMsg, RequestCalibStatusMsg,
	ResetBno055Msg, ResetPicoMsg, SerialMessage, SetAutoCalibrateMsg, TestPicoErrorRptMsg,
	TestPicoMessagesMsg, TimerControlMsg,
};
use carrt_link::{BatteryId, CarrtError, DriveState, MsgMask, SerialLink};

/// Assembles and sends the host's requests. One method per request kind;
/// replies come back through the inbound pump.
pub struct Commander<'a> {
	link: &'a mut dyn SerialLink,
}

impl<'a> Commander<'a> {
	pub fn new(link: &'a mut dyn SerialLink) -> Self {
		Self { link }
	}

	pub fn ping(&mut self) -> Result<(), CarrtError> {
		PingMsg::new().send_out(self.link)
	}

	/// Sets the full telemetry mask in one message.
	pub fn set_telemetry(&mut self, mask: MsgMask) -> Result<(), CarrtError> {
		MsgControlMsg::new(mask).send_out(self.link)
	}

	/// Sets only the three timer streams.
	pub fn set_timer_streams(&mut self, mask: MsgMask) -> Result<(), CarrtError> {
		TimerControlMsg::new(mask).send_out(self.link)
	}

	pub fn set_nav_streams(
		&mut self,
		want_nav: bool,
		want_status: bool,
	) -> Result<(), CarrtError> {
		NavUpdateControlMsg::new(want_nav, want_status).send_out(self.link)
	}

	pub fn set_encoder_stream(&mut self, on: bool) -> Result<(), CarrtError> {
		EncoderUpdateControlMsg::new(on).send_out(self.link)
	}

	pub fn begin_calibration(&mut self) -> Result<(), CarrtError> {
		BeginCalibrationMsg::new().send_out(self.link)
	}

	pub fn request_calibration_status(&mut self) -> Result<(), CarrtError> {
		RequestCalibStatusMsg::new().send_out(self.link)
	}

	pub fn set_auto_calibrate(&mut self, on: bool) -> Result<(), CarrtError> {
		SetAutoCalibrateMsg::new(on).send_out(self.link)
	}

	pub fn reset_imu(&mut self) -> Result<(), CarrtError> {
		ResetBno055Msg::new().send_out(self.link)
	}

	/// Orders a full reboot of the embedded node.
	pub fn reset_pico(&mut self) -> Result<(), CarrtError> {
		ResetPicoMsg::new().send_out(self.link)
	}

	pub fn request_battery_level(&mut self, which: BatteryId) -> Result<(), CarrtError> {
		BatteryLevelRequestMsg::new(which).send_out(self.link)
	}

	pub fn report_driving_status(&mut self, state: DriveState) -> Result<(), CarrtError> {
		DrivingStatusUpdateMsg::new(state).send_out(self.link)
	}

	pub fn debug_link(
		&mut self,
		int_val: i32,
		byte_val: u8,
		float_val: f32,
		uint_val: u32,
	) -> Result<(), CarrtError> {
		DebugLinkMsg::new(int_val, byte_val, float_val, uint_val).send_out(self.link)
	}

	/// Test hook: ask the pico to fabricate an error report.
	pub fn request_test_error(&mut self, fatal: bool, code: i32) -> Result<(), CarrtError> {
		TestPicoErrorRptMsg::new(fatal, code).send_out(self.link)
	}

	/// Test hook: ask the pico to send back a sample of the given id.
	pub fn request_test_message(&mut self, id: u8) -> Result<(), CarrtError> {
		TestPicoMessagesMsg::new(id).send_out(self.link)
	}
}
