//! What the embedded node does with each message it receives.
//!
//! The message types and their codecs are shared with the host in
//! `carrt-link`; this module supplies the Pico-side `act_on` behavior and
//! the registration list. Only ids the Pico can receive get a factory
//! entry; everything else that arrives is treated as unknown and reported.

use alloc::boxed::Box;

use log::{info, warn};

use carrt_link::messages::{
	BatteryLevelRequestMsg, BatteryLevelUpdateMsg, BeginCalibrationMsg, CalibrationInfoUpdateMsg,
	DebugLinkMsg, DrivingStatusUpdateMsg, EncoderUpdateControlMsg, EncoderUpdateMsg,
	ErrorReportMsg, MsgControlMsg, NavUpdateControlMsg, NavUpdateMsg, PicoNavStatusUpdateMsg,
	PicoReadyMsg, PicoReceivedTestMsg, PicoSaysStopMsg, PingMsg, PingReplyMsg,
	RequestCalibStatusMsg, ResetBno055Msg, ResetPicoMsg, SerialMessage, SetAutoCalibrateMsg,
	TestPicoErrorRptMsg, TestPicoMessagesMsg, TimerControlMsg, TimerEventMsg, UnknownMsg,
};
use carrt_link::{
	make_pico_error_id, BatteryId, CarrtError, EncoderSide, ErrorKind, ErrorModule,
	MessageFactory, MsgId, MsgMask, TimerWhich,
};

use crate::dispatch::Context;
use crate::events::{EventId, Priority};

/// A message as Core-D dispatches it: the shared wire behavior plus the
/// Pico's action on receipt.
pub trait PicoMessage: SerialMessage {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError>;
}

pub type BoxedMessage = Box<dyn PicoMessage>;

impl PicoMessage for PingMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// The expected action is simply to answer.
			info!("ping from host, sending reply");
			PingReplyMsg::new().send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for PingReplyMsg {
	fn act_on(&mut self, _ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// Debug aid; no request tracking, just a note in the log.
			info!("ping reply from host");
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for MsgControlMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let mask = self.mask();
			ctx.state
				.send_qtr_sec_timer_msgs(mask.contains(MsgMask::QTR_SEC_TIMER));
			ctx.state
				.send_1_sec_timer_msgs(mask.contains(MsgMask::ONE_SEC_TIMER));
			ctx.state
				.send_8_sec_timer_msgs(mask.contains(MsgMask::EIGHT_SEC_TIMER));
			ctx.state.send_nav_msgs(mask.contains(MsgMask::NAV));
			ctx.state
				.send_nav_status_msgs(mask.contains(MsgMask::NAV_STATUS));
			ctx.state.send_encoder_msgs(mask.contains(MsgMask::ENCODER));
			ctx.state
				.send_calibration_msgs(mask.contains(MsgMask::CALIBRATION));
			ctx.state.send_battery_msgs(mask.contains(MsgMask::BATTERY));
			info!("telemetry mask set to {mask:?}");
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for ResetPicoMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!("host ordered a reset");
			ctx.events
				.queue_event(EventId::PicoReset, 0, 0, Priority::High);
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for TimerControlMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let mask = self.mask();
			ctx.state
				.send_qtr_sec_timer_msgs(mask.contains(MsgMask::QTR_SEC_TIMER));
			ctx.state
				.send_1_sec_timer_msgs(mask.contains(MsgMask::ONE_SEC_TIMER));
			ctx.state
				.send_8_sec_timer_msgs(mask.contains(MsgMask::EIGHT_SEC_TIMER));
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for BeginCalibrationMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			ctx.events
				.queue_event(EventId::Bno055BeginCalibration, 0, 0, Priority::Low);
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for RequestCalibStatusMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// A direct request is always answered, whatever the telemetry
			// mask says.
			let scores = ctx.board.imu.calibration()?;
			let good = scores.is_good();
			ctx.state.nav_calibrated(good);
			PicoNavStatusUpdateMsg::new(good, scores).send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for SetAutoCalibrateMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let on = self.enabled();
			ctx.state.set_auto_calibrate(on);
			info!("auto-calibrate set to {on}");
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for ResetBno055Msg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			ctx.events
				.queue_event(EventId::Bno055Reset, 0, 0, Priority::Low);
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for NavUpdateControlMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			ctx.state.send_nav_msgs(self.want_nav());
			ctx.state.send_nav_status_msgs(self.want_status());
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for DrivingStatusUpdateMsg {
	fn act_on(&mut self, _ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			match self.drive_state() {
				Some(state) => info!("host driving status: {state:?}"),
				None => warn!("host sent unrecognized driving status {}", self.state()),
			}
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for EncoderUpdateControlMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			ctx.state.send_encoder_msgs(self.enabled());
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for BatteryLevelRequestMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let which = self.which();
			match BatteryId::try_from(which) {
				Ok(BatteryId::Ic) => {
					let volts = ctx.board.batteries.ic_volts()?;
					BatteryLevelUpdateMsg::new(BatteryId::Ic, volts).send_out(ctx.link)?;
				}
				Ok(BatteryId::Motor) => {
					let volts = ctx.board.batteries.motor_volts()?;
					BatteryLevelUpdateMsg::new(BatteryId::Motor, volts).send_out(ctx.link)?;
				}
				Ok(BatteryId::Both) => {
					// Two updates, IC first.
					let volts = ctx.board.batteries.ic_volts()?;
					BatteryLevelUpdateMsg::new(BatteryId::Ic, volts).send_out(ctx.link)?;
					let volts = ctx.board.batteries.motor_volts()?;
					BatteryLevelUpdateMsg::new(BatteryId::Motor, volts).send_out(ctx.link)?;
				}
				Err(_) => {
					warn!("bad battery request code {which}");
					let err = CarrtError::new(
						make_pico_error_id(ErrorModule::SerialMessage, 2, which.into()),
						ErrorKind::BadBatteryId(which),
					);
					ErrorReportMsg::new(false, err.id, ctx.board.clock.millis())
						.send_out(ctx.link)?;
				}
			}
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for TestPicoErrorRptMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// Fabricate exactly the report the tester asked for.
			let time = ctx.board.clock.millis();
			ErrorReportMsg::new(self.make_fatal(), self.code(), time).send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for TestPicoMessagesMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if !self.needs_action() {
			return Ok(());
		}
		self.finish_action();

		let requested = self.requested();
		let Ok(wanted) = MsgId::try_from(requested) else {
			// Not a legitimate id; nothing sensible to send back.
			return Ok(());
		};
		if wanted == MsgId::Unknown || wanted == MsgId::PicoReceivedTest {
			return Ok(());
		}

		info!("message test: asked to send id {requested}");
		match wanted {
			MsgId::Ping => PingMsg::new().send_out(ctx.link),
			MsgId::PingReply => PingReplyMsg::new().send_out(ctx.link),
			MsgId::PicoReady => PicoReadyMsg::new(123_456).send_out(ctx.link),
			MsgId::PicoNavStatusUpdate => PicoNavStatusUpdateMsg::new(
				true,
				carrt_link::CalibrationScores::new(6, 7, 8, 9),
			)
			.send_out(ctx.link),
			MsgId::PicoSaysStop => PicoSaysStopMsg::new().send_out(ctx.link),
			MsgId::ResetPico => ResetPicoMsg::new().send_out(ctx.link),
			MsgId::TimerEvent => {
				TimerEventMsg::new(TimerWhich::OneSecond, 123, 123_456).send_out(ctx.link)
			}
			MsgId::CalibrationInfoUpdate => {
				CalibrationInfoUpdateMsg::new(carrt_link::CalibrationScores::new(2, 4, 6, 8))
					.send_out(ctx.link)
			}
			MsgId::TimerNavUpdate => NavUpdateMsg::new(180.081, 456_123).send_out(ctx.link),
			MsgId::EncoderUpdate => {
				EncoderUpdateMsg::new(EncoderSide::Right, -10, 654_321).send_out(ctx.link)
			}
			MsgId::BatteryLevelUpdate => {
				BatteryLevelUpdateMsg::new(BatteryId::Both, 5.2).send_out(ctx.link)
			}
			MsgId::ErrorReportFromPico => ErrorReportMsg::new(
				false,
				make_pico_error_id(ErrorModule::Test, 1, 1),
				ctx.board.clock.millis(),
			)
			.send_out(ctx.link),
			MsgId::DebugSerialLink => DebugLinkMsg::new(1, 4, 16.25, 36).send_out(ctx.link),
			// Inbound-only variants are acknowledged instead of faked.
			_ => PicoReceivedTestMsg::new(requested).send_out(ctx.link),
		}
	}
}

impl PicoMessage for DebugLinkMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// Transform every field and echo, so the host can verify both
			// directions and all four field types in one exchange.
			let response = DebugLinkMsg::new(
				self.int_val().wrapping_mul(-2),
				self.byte_val().wrapping_add(255),
				self.float_val() * -0.5,
				self.uint_val().wrapping_mul(5),
			);
			response.send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

impl PicoMessage for UnknownMsg {
	fn act_on(&mut self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// The only action is to tell the host what we could not parse.
			ErrorReportMsg::new(false, self.err_code(), ctx.board.clock.millis())
				.send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

pub(crate) fn unknown_message(raw_id: u8) -> BoxedMessage {
	Box::new(UnknownMsg::new(
		raw_id,
		make_pico_error_id(ErrorModule::SerialMessage, 5, raw_id.into()),
	))
}

macro_rules! creator {
	($name:ident, $ty:ty) => {
		fn $name(id: MsgId) -> Result<BoxedMessage, CarrtError> {
			Ok(Box::new(<$ty>::from_wire(id)?))
		}
	};
}

creator!(create_ping, PingMsg);
creator!(create_ping_reply, PingReplyMsg);
creator!(create_msg_control, MsgControlMsg);
creator!(create_reset_pico, ResetPicoMsg);
creator!(create_timer_control, TimerControlMsg);
creator!(create_begin_calibration, BeginCalibrationMsg);
creator!(create_request_calib_status, RequestCalibStatusMsg);
creator!(create_set_auto_calibrate, SetAutoCalibrateMsg);
creator!(create_reset_bno055, ResetBno055Msg);
creator!(create_nav_update_control, NavUpdateControlMsg);
creator!(create_driving_status, DrivingStatusUpdateMsg);
creator!(create_encoder_update_control, EncoderUpdateControlMsg);
creator!(create_battery_level_request, BatteryLevelRequestMsg);
creator!(create_test_error_rpt, TestPicoErrorRptMsg);
creator!(create_test_messages, TestPicoMessagesMsg);
creator!(create_debug_link, DebugLinkMsg);

/// Builds the embedded node's factory: exactly the ids it can receive.
pub fn pico_factory() -> Result<MessageFactory<BoxedMessage>, CarrtError> {
	let mut factory = MessageFactory::new(unknown_message);
	factory.register(MsgId::Ping, create_ping)?;
	factory.register(MsgId::PingReply, create_ping_reply)?;
	factory.register(MsgId::MsgControl, create_msg_control)?;
	factory.register(MsgId::ResetPico, create_reset_pico)?;
	factory.register(MsgId::TimerControl, create_timer_control)?;
	factory.register(MsgId::BeginCalibration, create_begin_calibration)?;
	factory.register(MsgId::RequestCalibStatus, create_request_calib_status)?;
	factory.register(MsgId::SetAutoCalibrate, create_set_auto_calibrate)?;
	factory.register(MsgId::ResetBno055, create_reset_bno055)?;
	factory.register(MsgId::NavUpdateControl, create_nav_update_control)?;
	factory.register(MsgId::DrivingStatusUpdate, create_driving_status)?;
	factory.register(MsgId::EncoderUpdateControl, create_encoder_update_control)?;
	factory.register(MsgId::BatteryLevelRequest, create_battery_level_request)?;
	factory.register(MsgId::TestPicoReportError, create_test_error_rpt)?;
	factory.register(MsgId::TestPicoMessages, create_test_messages)?;
	factory.register(MsgId::DebugSerialLink, create_debug_link)?;
	Ok(factory)
}
