//! The handlers behind each event kind.
//!
//! A handler translates one popped event into at most one peripheral action
//! and/or one outbound message. Telemetry handlers consult the send flags
//! first, so a disabled stream costs one flag read per event and no link
//! traffic.

use alloc::boxed::Box;

use log::{debug, info};

use carrt_link::messages::{
	BatteryLowAlertMsg, CalibrationInfoUpdateMsg, EncoderUpdateMsg, ErrorReportMsg, NavUpdateMsg,
	PicoNavStatusUpdateMsg, SerialMessage, TimerEventMsg,
};
use carrt_link::{
	make_pico_error_id, BatteryId, CarrtError, EncoderSide, ErrorKind, ErrorModule, TimerWhich,
};

use crate::config::BNO055_WAIT_AFTER_RESET_MS;
use crate::dispatch::Context;
use crate::events::processor::{EventHandler, EventProcessor};
use crate::events::{Event, EventId, Priority};
use crate::state;

pub struct NullEventHandler;

impl EventHandler for NullEventHandler {
	fn handle(&self, _ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		debug!("null event popped");
		Ok(())
	}
}

// ********************** Timer event handlers

pub struct QuarterSecondTimerHandler;

impl EventHandler for QuarterSecondTimerHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		if ctx.state.want_qtr_sec_timer_msgs() {
			TimerEventMsg::new(TimerWhich::QuarterSecond, event.param, event.time)
				.send_out(ctx.link)?;
		}
		Ok(())
	}
}

pub struct OneSecondTimerHandler;

impl EventHandler for OneSecondTimerHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		if ctx.state.want_1_sec_timer_msgs() {
			TimerEventMsg::new(TimerWhich::OneSecond, event.param, event.time)
				.send_out(ctx.link)?;
		}
		Ok(())
	}
}

pub struct EightSecondTimerHandler;

impl EventHandler for EightSecondTimerHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		if ctx.state.want_8_sec_timer_msgs() {
			TimerEventMsg::new(TimerWhich::EightSecond, event.param, event.time)
				.send_out(ctx.link)?;
		}
		Ok(())
	}
}

// ********************** IMU / navigation event handlers

pub struct NavUpdateHandler;

impl EventHandler for NavUpdateHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		if ctx.state.is_nav_calibrated() && ctx.state.want_nav_msgs() {
			let heading = ctx.board.imu.heading()?;
			NavUpdateMsg::new(heading, event.time).send_out(ctx.link)?;
		}
		Ok(())
	}
}

pub struct InitializeBno055Handler;

impl EventHandler for InitializeBno055Handler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		info!("initializing the IMU");
		// The settle delay lives inside the driver, so calibration can be
		// kicked off with no further wait.
		ctx.board.imu.init()?;
		ctx.events
			.queue_event(EventId::Bno055BeginCalibration, 0, event.time, Priority::Low);

		// Start-up is done once the IMU is up (also reached again after an
		// IMU reset).
		ctx.state.start_up_finished(true);
		Ok(())
	}
}

pub struct Bno055ResetHandler;

impl EventHandler for Bno055ResetHandler {
	fn handle(&self, ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		info!("resetting the IMU");
		ctx.board.imu.reset()?;
		ctx.state.nav_calibrated(false);
		// The device needs its post-reset interval before init; Core-T owns
		// the delayed wake-up.
		ctx.board
			.core1
			.post(EventId::Bno055Initialize, BNO055_WAIT_AFTER_RESET_MS)?;

		ctx.state.start_up_finished(false);
		Ok(())
	}
}

pub struct BeginCalibrationHandler;

impl EventHandler for BeginCalibrationHandler {
	fn handle(&self, ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		info!("starting an IMU calibration cycle");
		ctx.state.nav_calibrated(false);
		state::set_calibration_in_progress(true);
		Ok(())
	}
}

pub struct SendCalibrationInfoHandler;

impl EventHandler for SendCalibrationInfoHandler {
	fn handle(&self, ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		let scores = ctx.board.imu.calibration()?;
		let good = scores.is_good();
		let was_good = ctx.state.nav_calibrated(good);

		if good != was_good {
			// A readiness edge outranks the routine calibration stream.
			if ctx.state.want_nav_status_msgs() {
				PicoNavStatusUpdateMsg::new(good, scores).send_out(ctx.link)?;
			}
			if good {
				info!("navigation now CALIBRATED");
			} else {
				info!("navigation lost calibration");
			}
		} else if ctx.state.want_calibration_msgs() {
			CalibrationInfoUpdateMsg::new(scores).send_out(ctx.link)?;
		}
		Ok(())
	}
}

// ********************** Pulse LED event handlers

pub struct PulseLedHandler;

impl EventHandler for PulseLedHandler {
	fn handle(&self, ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		ctx.board.led.toggle()
	}
}

// ********************** Encoder event handlers

pub struct EncoderHandler {
	side: EncoderSide,
}

impl EncoderHandler {
	pub fn new(side: EncoderSide) -> Self {
		Self { side }
	}
}

impl EventHandler for EncoderHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		if ctx.state.want_encoder_msgs() {
			EncoderUpdateMsg::new(self.side, event.param, event.time).send_out(ctx.link)?;
		}
		Ok(())
	}
}

// ********************** Battery event handlers

pub struct BatteryLowHandler;

impl EventHandler for BatteryLowHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		let which = event.param as u8;
		let (id, volts) = match BatteryId::try_from(which) {
			Ok(id @ BatteryId::Ic) => (id, ctx.board.batteries.ic_volts()?),
			Ok(id @ BatteryId::Motor) => (id, ctx.board.batteries.motor_volts()?),
			_ => {
				return Err(CarrtError::new(
					make_pico_error_id(ErrorModule::MainProcess, 2, which.into()),
					ErrorKind::BadBatteryId(which),
				));
			}
		};
		BatteryLowAlertMsg::new(id, volts).send_out(ctx.link)
	}
}

// ********************** Pico reset event handlers

pub struct PicoResetHandler;

impl EventHandler for PicoResetHandler {
	fn handle(&self, ctx: &mut Context<'_>, _event: Event) -> Result<(), CarrtError> {
		crate::reset::announce_and_reboot(ctx)
	}
}

// ********************** Error event handlers

pub struct ErrorEventHandler;

impl EventHandler for ErrorEventHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError> {
		info!("error event in the queue, code {}", event.param);
		let code = make_pico_error_id(ErrorModule::EventProcessor, 3, event.param);
		ErrorReportMsg::new(false, code, ctx.board.clock.millis()).send_out(ctx.link)
	}
}

/// Installs the full handler set.
pub fn register_all(processor: &mut EventProcessor) -> Result<(), CarrtError> {
	processor.register(EventId::NullEvent, Box::new(NullEventHandler))?;
	processor.register(EventId::QuarterSecondTimer, Box::new(QuarterSecondTimerHandler))?;
	processor.register(EventId::OneSecondTimer, Box::new(OneSecondTimerHandler))?;
	processor.register(EventId::EightSecondTimer, Box::new(EightSecondTimerHandler))?;
	processor.register(EventId::NavUpdate, Box::new(NavUpdateHandler))?;
	processor.register(EventId::Bno055Initialize, Box::new(InitializeBno055Handler))?;
	processor.register(EventId::Bno055Reset, Box::new(Bno055ResetHandler))?;
	processor.register(EventId::Bno055BeginCalibration, Box::new(BeginCalibrationHandler))?;
	processor.register(EventId::SendCalibrationInfo, Box::new(SendCalibrationInfoHandler))?;
	processor.register(EventId::EncoderLeft, Box::new(EncoderHandler::new(EncoderSide::Left)))?;
	processor.register(
		EventId::EncoderRight,
		Box::new(EncoderHandler::new(EncoderSide::Right)),
	)?;
	processor.register(EventId::PulsePicoLed, Box::new(PulseLedHandler))?;
	processor.register(EventId::BatteryLow, Box::new(BatteryLowHandler))?;
	processor.register(EventId::PicoReset, Box::new(PicoResetHandler))?;
	processor.register(EventId::Error, Box::new(ErrorEventHandler))?;
	Ok(())
}
