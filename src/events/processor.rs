//! Handler registry and per-event dispatch.

use alloc::boxed::Box;

use log::warn;

use carrt_link::{make_shared_error_id, CarrtError, ErrorKind, ErrorModule};

use crate::dispatch::Context;
use crate::events::{Event, EventId};

/// One event kind's behavior.
///
/// Handlers get their collaborators through the [`Context`] on every call
/// and hold no references of their own, so the ownership graph stays a
/// tree: the processor owns the handlers, the loop owns the processor.
/// Handlers may enqueue further events, send messages, or mutate state, but
/// must not block beyond the bounded driver delays.
pub trait EventHandler {
	fn handle(&self, ctx: &mut Context<'_>, event: Event) -> Result<(), CarrtError>;
}

/// Owned handler table, one slot per event id.
pub struct EventProcessor {
	handlers: [Option<Box<dyn EventHandler>>; EventId::COUNT],
}

impl EventProcessor {
	pub fn new() -> Self {
		Self {
			handlers: core::array::from_fn(|_| None),
		}
	}

	/// Takes ownership of `handler` for `id`. A second registration for
	/// the same id is a hard error.
	pub fn register(
		&mut self,
		id: EventId,
		handler: Box<dyn EventHandler>,
	) -> Result<(), CarrtError> {
		let slot = &mut self.handlers[u8::from(id) as usize];
		if slot.is_some() {
			return Err(CarrtError::new(
				make_shared_error_id(ErrorModule::EventProcessor, 1, u8::from(id).into()),
				ErrorKind::DuplicateRegistration(id.into()),
			));
		}
		*slot = Some(handler);
		Ok(())
	}

	/// Pops and dispatches at most one event. `Ok(true)` when an event was
	/// handled, `Ok(false)` when the queues were empty.
	pub fn dispatch_one(&self, ctx: &mut Context<'_>) -> Result<bool, CarrtError> {
		let Some(event) = ctx.events.next_event() else {
			return Ok(false);
		};

		match &self.handlers[u8::from(event.id) as usize] {
			Some(handler) => handler.handle(ctx, event)?,
			None => {
				warn!("event {:?} has no handler", event.id);
				return Err(CarrtError::new(
					make_shared_error_id(
						ErrorModule::EventProcessor,
						2,
						u8::from(event.id).into(),
					),
					ErrorKind::UnhandledEvent(event.id.into()),
				));
			}
		}
		Ok(true)
	}

	pub fn is_registered(&self, id: EventId) -> bool {
		self.handlers[u8::from(id) as usize].is_some()
	}
}

impl Default for EventProcessor {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use alloc::boxed::Box;

	use super::*;
	use crate::events::handlers::NullEventHandler;

	#[test]
	fn reregistration_is_a_hard_error() {
		let mut processor = EventProcessor::new();
		processor
			.register(EventId::NullEvent, Box::new(NullEventHandler))
			.unwrap();

		let err = processor
			.register(EventId::NullEvent, Box::new(NullEventHandler))
			.unwrap_err();
		assert_eq!(err.kind, ErrorKind::DuplicateRegistration(0));
		assert!(processor.is_registered(EventId::NullEvent));
	}

	#[test]
	fn the_full_handler_set_registers_once() {
		let mut processor = EventProcessor::new();
		crate::events::handlers::register_all(&mut processor).unwrap();
		assert!(processor.is_registered(EventId::NavUpdate));
		assert!(processor.is_registered(EventId::PicoReset));
		// The GPIO interrupt test events deliberately have no handler.
		assert!(!processor.is_registered(EventId::GpioInterruptTestRising));
	}
}
