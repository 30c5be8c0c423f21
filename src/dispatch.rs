//! The Core-D dispatch loop.
//!
//! One iteration consumes at most one inbound message and at most one
//! event, in that order, so a chatty host cannot starve the event queues
//! and a full event queue cannot starve the link. When both streams are
//! dry the core takes a short cooperative sleep.
//!
//! Faults inside a handler or a message action do not stop the loop: they
//! are converted into non-fatal error reports to the host, whose policy
//! decides what happens next. Only a failure to *write* the link escapes,
//! since at that point not even the report can get out.

use log::{error, warn};

use carrt_link::messages::{ErrorReportMsg, PicoReadyMsg, SerialMessage};
use carrt_link::{
	make_pico_error_id, CarrtError, ErrorKind, ErrorModule, MessageFactory, SerialLink,
};

use crate::config::{CORE1_SUCCESS, IDLE_SLEEP_MS};
use crate::core1::CoreLauncher;
use crate::drivers::Board;
use crate::events::processor::EventProcessor;
use crate::events::{handlers, EventId, EventQueue, Priority};
use crate::messages::{self, BoxedMessage, PicoMessage as _};
use crate::state::PicoState;

/// The collaborators a handler or message action works against, passed by
/// parameter on every call.
pub struct Context<'a> {
	pub events: &'a EventQueue,
	pub link: &'a mut dyn SerialLink,
	pub state: &'a mut PicoState,
	pub board: &'a mut Board,
}

/// Owns the two registries and drives the loop.
pub struct Dispatcher {
	factory: MessageFactory<BoxedMessage>,
	processor: EventProcessor,
}

impl Dispatcher {
	/// Builds the registries. Runs once at start-up; a registration error
	/// here is a build mistake and is surfaced, not worked around.
	pub fn new() -> Result<Self, CarrtError> {
		let factory = messages::pico_factory()?;
		let mut processor = EventProcessor::new();
		handlers::register_all(&mut processor)?;
		Ok(Self { factory, processor })
	}

	/// Start-up sequence: launch Core-T, announce readiness, kick off the
	/// IMU bring-up.
	pub fn boot(
		&self,
		ctx: &mut Context<'_>,
		launcher: &mut dyn CoreLauncher,
	) -> Result<(), CarrtError> {
		let word = launcher.launch_core1();
		if word != CORE1_SUCCESS {
			// Proceed degraded; the host owns the recovery policy
			// (typically a power-cycle).
			error!("Core-T handshake failed with word {word}");
			let code = make_pico_error_id(ErrorModule::Multicore, 1, word as i32);
			ErrorReportMsg::new(true, code, ctx.board.clock.millis()).send_out(ctx.link)?;
		}

		PicoReadyMsg::new(ctx.board.clock.millis()).send_out(ctx.link)?;
		ctx.events.queue_event(
			EventId::Bno055Initialize,
			0,
			ctx.board.clock.millis(),
			Priority::Low,
		);
		Ok(())
	}

	/// One loop iteration. `Ok(true)` when anything was consumed.
	pub fn poll_once(&self, ctx: &mut Context<'_>) -> Result<bool, CarrtError> {
		let mut worked = false;

		// A queue overflow since the last pass is reported exactly once.
		if ctx.events.has_overflowed() {
			ctx.events.clear_overflow();
			worked = true;
			self.report_non_fatal(
				ctx,
				CarrtError::new(
					make_pico_error_id(ErrorModule::EventProcessor, 4, 0),
					ErrorKind::QueueOverflow,
				),
			)?;
		}

		if let Some(raw_id) = ctx.link.try_get_id() {
			worked = true;
			if let Err(err) = self.dispatch_message(ctx, raw_id) {
				self.report_non_fatal(ctx, err)?;
			}
		}

		match self.processor.dispatch_one(ctx) {
			Ok(dispatched) => worked |= dispatched,
			Err(err) => {
				worked = true;
				self.report_non_fatal(ctx, err)?;
			}
		}

		Ok(worked)
	}

	/// The loop proper. On the target this never returns; under the hosted
	/// platform a reboot request makes the platform's `reboot` observable
	/// and the loop keeps polling until the test stops driving it.
	pub fn run(&self, ctx: &mut Context<'_>) -> Result<(), CarrtError> {
		loop {
			if !self.poll_once(ctx)? {
				ctx.board.clock.sleep_ms(IDLE_SLEEP_MS);
			}
		}
	}

	fn dispatch_message(&self, ctx: &mut Context<'_>, raw_id: u8) -> Result<(), CarrtError> {
		let mut msg = self.factory.create(raw_id)?;
		msg.read_in(ctx.link)?;
		msg.act_on(ctx)
	}

	fn report_non_fatal(&self, ctx: &mut Context<'_>, err: CarrtError) -> Result<(), CarrtError> {
		warn!("reporting non-fatal error to host: {err}");
		ErrorReportMsg::new(false, err.id, ctx.board.clock.millis()).send_out(ctx.link)
	}
}
