//! What the host does with each message it receives.
//!
//! The host side is bookkeeping: telemetry lands in the status snapshot,
//! alert-class traffic additionally chirps the buzzer, and every error
//! report is logged with its decoded structured id.

use log::{debug, error, info, warn};

use carrt_link::messages::{
	BatteryLevelUpdateMsg, BatteryLowAlertMsg, CalibrationInfoUpdateMsg, DebugLinkMsg,
	EncoderUpdateMsg, ErrorReportMsg, NavUpdateMsg, PicoNavStatusUpdateMsg, PicoReadyMsg,
	PicoReceivedTestMsg, PicoSaysStopMsg, PingMsg, PingReplyMsg, ResetPicoMsg, SerialMessage,
	TimerEventMsg, UnknownMsg,
};
use carrt_link::{
	error_cause, error_function, error_module, error_node, make_rpi0_error_id, BatteryId,
	CarrtError, EncoderSide, ErrorModule, MessageFactory, MsgId, SerialLink, TimerWhich,
};

use crate::buzzer::AlertBuzzer;
use crate::status::RoverStatus;

/// The collaborators a host-side action works against.
pub struct HostContext<'a> {
	pub link: &'a mut dyn SerialLink,
	pub status: &'a mut RoverStatus,
	pub buzzer: Option<&'a mut dyn AlertBuzzer>,
}

impl HostContext<'_> {
	fn chirp(&mut self) {
		if let Some(buzzer) = self.buzzer.as_deref_mut() {
			if let Err(err) = buzzer.chirp() {
				warn!("alert buzzer failed: {err}");
			}
		}
	}
}

/// A message as the host pump dispatches it.
pub trait HostMessage: SerialMessage {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError>;
}

pub type BoxedMessage = Box<dyn HostMessage>;

impl HostMessage for PingMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!("ping from the pico, sending reply");
			PingReplyMsg::new().send_out(ctx.link)?;
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for PingReplyMsg {
	fn act_on(&mut self, _ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!("ping reply from the pico");
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for PicoReadyMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!("pico ready, boot clock {} ms", self.time());
			ctx.status.note_boot(self.time());
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for PicoNavStatusUpdateMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let scores = self.scores();
			info!(
				"nav status changed: good={} (mag {}, accel {}, gyro {}, sys {})",
				self.good(),
				scores.mag,
				scores.accel,
				scores.gyro,
				scores.system
			);
			ctx.status.nav_good = self.good();
			ctx.status.calibration = Some(scores);
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for PicoSaysStopMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			warn!("pico demands an immediate stop");
			ctx.status.stop_requested = true;
			ctx.chirp();
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for ResetPicoMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// The echo of our reset order (or a self-initiated reboot):
			// nav state is about to become stale.
			info!("pico announced a reboot");
			ctx.status.note_reboot_pending();
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for TimerEventMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let entry = Some((self.count(), self.time()));
			match TimerWhich::try_from(self.which()) {
				Ok(TimerWhich::QuarterSecond) => ctx.status.quarter_second = entry,
				Ok(TimerWhich::OneSecond) => ctx.status.one_second = entry,
				Ok(TimerWhich::EightSecond) => ctx.status.eight_second = entry,
				Err(_) => warn!("timer event with unknown stream tag {}", self.which()),
			}
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for CalibrationInfoUpdateMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let scores = self.scores();
			debug!(
				"calibration: mag {}, accel {}, gyro {}, sys {}",
				scores.mag, scores.accel, scores.gyro, scores.system
			);
			ctx.status.calibration = Some(scores);
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for NavUpdateMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			debug!("heading {:.3}° at {} ms", self.heading(), self.time());
			ctx.status.heading = Some((self.heading(), self.time()));
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for EncoderUpdateMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			match EncoderSide::try_from(self.side()) {
				Ok(EncoderSide::Left) => {
					ctx.status.left_encoder_count += i64::from(self.count());
				}
				Ok(EncoderSide::Right) => {
					ctx.status.right_encoder_count += i64::from(self.count());
				}
				Err(_) => warn!("encoder update with unknown side {}", self.side()),
			}
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for BatteryLevelUpdateMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			match BatteryId::try_from(self.which()) {
				Ok(BatteryId::Ic) => ctx.status.ic_battery_volts = Some(self.volts()),
				Ok(BatteryId::Motor) => ctx.status.motor_battery_volts = Some(self.volts()),
				_ => warn!("battery update with unexpected id {}", self.which()),
			}
			info!("battery {} at {:.2} V", self.which(), self.volts());
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for BatteryLowAlertMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			warn!("battery {} LOW at {:.2} V", self.which(), self.volts());
			ctx.status.battery_low = Some((self.which(), self.volts()));
			ctx.chirp();
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for ErrorReportMsg {
	fn act_on(&mut self, ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			let code = self.code();
			let located = format!(
				"node {} module {} function {} cause {}",
				error_node(code),
				error_module(code),
				error_function(code),
				error_cause(code)
			);
			if self.is_fatal() {
				error!(
					"FATAL error from pico at {} ms: code {code} ({located})",
					self.time()
				);
			} else {
				warn!(
					"error from pico at {} ms: code {code} ({located})",
					self.time()
				);
			}
			ctx.status.last_error = Some((self.is_fatal(), code, self.time()));
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for PicoReceivedTestMsg {
	fn act_on(&mut self, _ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!("pico acknowledged test message id {}", self.received());
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for DebugLinkMsg {
	fn act_on(&mut self, _ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			info!(
				"debug link echo: i={} b={} f={} u={}",
				self.int_val(),
				self.byte_val(),
				self.float_val(),
				self.uint_val()
			);
			self.finish_action();
		}
		Ok(())
	}
}

impl HostMessage for UnknownMsg {
	fn act_on(&mut self, _ctx: &mut HostContext<'_>) -> Result<(), CarrtError> {
		if self.needs_action() {
			// Unlike the pico, the host keeps its complaint local: there is
			// nobody upstream to report to.
			error!(
				"unknown message id {:#04x} from pico (code {})",
				self.rcvd_id(),
				self.err_code()
			);
			self.finish_action();
		}
		Ok(())
	}
}

pub(crate) fn unknown_message(raw_id: u8) -> BoxedMessage {
	Box::new(UnknownMsg::new(
		raw_id,
		make_rpi0_error_id(ErrorModule::SerialMessage, 5, raw_id.into()),
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
creator!(create_pico_ready, PicoReadyMsg);
creator!(create_nav_status, PicoNavStatusUpdateMsg);
creator!(create_pico_says_stop, PicoSaysStopMsg);
creator!(create_reset_pico, ResetPicoMsg);
creator!(create_timer_event, TimerEventMsg);
creator!(create_calibration_info, CalibrationInfoUpdateMsg);
creator!(create_nav_update, NavUpdateMsg);
creator!(create_encoder_update, EncoderUpdateMsg);
creator!(create_battery_update, BatteryLevelUpdateMsg);
creator!(create_battery_low, BatteryLowAlertMsg);
creator!(create_error_report, ErrorReportMsg);
creator!(create_received_test, PicoReceivedTestMsg);
creator!(create_debug_link, DebugLinkMsg);

/// Builds the host's factory: exactly the ids it can receive.
pub fn host_factory() -> Result<MessageFactory<BoxedMessage>, CarrtError> {
	let mut factory = MessageFactory::new(unknown_message);
	factory.register(MsgId::Ping, create_ping)?;
	factory.register(MsgId::PingReply, create_ping_reply)?;
	factory.register(MsgId::PicoReady, create_pico_ready)?;
	factory.register(MsgId::PicoNavStatusUpdate, create_nav_status)?;
	factory.register(MsgId::PicoSaysStop, create_pico_says_stop)?;
	factory.register(MsgId::ResetPico, create_reset_pico)?;
	factory.register(MsgId::TimerEvent, create_timer_event)?;
	factory.register(MsgId::CalibrationInfoUpdate, create_calibration_info)?;
	factory.register(MsgId::TimerNavUpdate, create_nav_update)?;
	factory.register(MsgId::EncoderUpdate, create_encoder_update)?;
	factory.register(MsgId::BatteryLevelUpdate, create_battery_update)?;
	factory.register(MsgId::BatteryLowAlert, create_battery_low)?;
	factory.register(MsgId::ErrorReportFromPico, create_error_report)?;
	factory.register(MsgId::PicoReceivedTest, create_received_test)?;
	factory.register(MsgId::DebugSerialLink, create_debug_link)?;
	Ok(factory)
}
