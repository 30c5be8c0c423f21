//! The announce-then-reboot path.

use log::{error, info};

use carrt_link::messages::{ErrorReportMsg, ResetPicoMsg, SerialMessage};
use carrt_link::CarrtError;

use crate::config::RESET_ANNOUNCE_DELAY_MS;
use crate::dispatch::Context;

/// Orderly reboot: echo the reset id so the host knows it is coming, give
/// the UART a moment to drain, then hand control to the watchdog. On the
/// target `reboot` does not return and the next byte the host sees is the
/// post-boot `PicoReady`.
pub fn announce_and_reboot(ctx: &mut Context<'_>) -> Result<(), CarrtError> {
	info!("rebooting via watchdog");
	ResetPicoMsg::new().send_out(ctx.link)?;
	ctx.board.clock.sleep_ms(RESET_ANNOUNCE_DELAY_MS);
	ctx.board.reset.reboot();
	Ok(())
}

/// Last-resort path for unrecoverable bring-up errors: one attempt at a
/// fatal error report, then reboot regardless of whether it got out.
pub fn fatal_reset(ctx: &mut Context<'_>, code: i32) {
	error!("fatal error {code}, rebooting");
	let report = ErrorReportMsg::new(true, code, ctx.board.clock.millis());
	let _ = report.send_out(ctx.link);
	ctx.board.clock.sleep_ms(RESET_ANNOUNCE_DELAY_MS);
	ctx.board.reset.reboot();
}
