//! The host's inbound poll pump.

use log::warn;

use carrt_link::{CarrtError, MessageFactory, SerialMessage as _};

use crate::messages::{self, BoxedMessage, HostContext, HostMessage as _};

/// Single-threaded intake: one message per poll, decoded through the
/// factory and acted on. Decode faults are logged and skipped (the link
/// will resynchronize on the next recognizable id); only write failures
/// escape, since the host cannot even answer a ping without the link.
pub struct HostPump {
	factory: MessageFactory<BoxedMessage>,
}

impl HostPump {
	pub fn new() -> Result<Self, CarrtError> {
		Ok(Self {
			factory: messages::host_factory()?,
		})
	}

	/// Consumes at most one inbound message. `Ok(true)` if one arrived.
	pub fn poll_once(&self, ctx: &mut HostContext<'_>) -> Result<bool, CarrtError> {
		let Some(raw_id) = ctx.link.try_get_id() else {
			return Ok(false);
		};

		match self.dispatch(ctx, raw_id) {
			Ok(()) => {}
			Err(err) if err.kind == carrt_link::ErrorKind::WriteFailed => return Err(err),
			Err(err) => warn!("inbound message fault: {err}"),
		}
		Ok(true)
	}

	/// Drains everything currently waiting.
	pub fn poll_all(&self, ctx: &mut HostContext<'_>) -> Result<usize, CarrtError> {
		let mut handled = 0;
		while self.poll_once(ctx)? {
			handled += 1;
		}
		Ok(handled)
	}

	fn dispatch(&self, ctx: &mut HostContext<'_>, raw_id: u8) -> Result<(), CarrtError> {
		let mut msg = self.factory.create(raw_id)?;
		msg.read_in(ctx.link)?;
		msg.act_on(ctx)
	}
}

#[cfg(test)]
mod tests {
	use carrt_link::messages::{NavUpdateMsg, PicoReadyMsg, SerialMessage, TimerEventMsg};
	use carrt_link::testing::TestLink;
	use carrt_link::{MsgId, TimerWhich};

	use crate::status::RoverStatus;

	use super::*;

	fn feed(link: &TestLink, msg: &impl SerialMessage) {
		let mut scratch = TestLink::new();
		msg.send_out(&mut scratch).unwrap();
		link.push_inbound(&scratch.sent());
	}

	#[test]
	fn telemetry_lands_in_the_status_snapshot() {
		let pump = HostPump::new().unwrap();
		let mut link = TestLink::new();
		let mut status = RoverStatus::new();

		feed(&link, &PicoReadyMsg::new(1_000));
		feed(&link, &NavUpdateMsg::new(180.081, 2_000));
		feed(&link, &TimerEventMsg::new(TimerWhich::OneSecond, 3, 1_234));

		let mut ctx = HostContext {
			link: &mut link,
			status: &mut status,
			buzzer: None,
		};
		assert_eq!(pump.poll_all(&mut ctx).unwrap(), 3);

		assert_eq!(status.boot_time, Some(1_000));
		let (heading, time) = status.heading.unwrap();
		assert_eq!(time, 2_000);
		assert!((heading - 180.081).abs() < 1e-4);
		assert_eq!(status.one_second, Some((3, 1_234)));
	}

	#[test]
	fn ping_is_answered_with_a_reply() {
		let pump = HostPump::new().unwrap();
		let mut link = TestLink::new();
		let mut status = RoverStatus::new();

		link.push_inbound(&[u8::from(MsgId::Ping)]);
		let mut ctx = HostContext {
			link: &mut link,
			status: &mut status,
			buzzer: None,
		};
		pump.poll_once(&mut ctx).unwrap();

		assert_eq!(link.sent(), &[u8::from(MsgId::PingReply)]);
	}

	#[test]
	fn unknown_ids_are_swallowed_and_logged() {
		let pump = HostPump::new().unwrap();
		let mut link = TestLink::new();
		let mut status = RoverStatus::new();

		link.push_inbound(&[0xEE]);
		let mut ctx = HostContext {
			link: &mut link,
			status: &mut status,
			buzzer: None,
		};
		assert!(pump.poll_once(&mut ctx).unwrap());
		// Nothing sent back and nothing consumed beyond the id byte.
		assert!(link.sent().is_empty());
	}
}
