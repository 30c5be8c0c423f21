//! Wheel-encoder edge capture with per-pin debounce.
//!
//! The two encoder pins are edge-interrupt inputs owned by Core-T. The
//! interrupt glue is platform code; what lives here is the part worth
//! getting right once: reject chatter closer together than the debounce
//! window, tag the edge with its wheel and direction, and enqueue it.

use carrt_link::EncoderSide;

use crate::config::GPIO_DEBOUNCE_MS;
use crate::events::{EventId, EventQueue, Priority};

/// Edge polarity as reported by the GPIO interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
	Rising,
	Falling,
}

impl Edge {
	/// The direction convention on the wire: rise `+1`, fall `-1`.
	fn direction(self) -> i32 {
		match self {
			Edge::Rising => 1,
			Edge::Falling => -1,
		}
	}
}

/// Debounce state for one pin.
#[derive(Debug, Default)]
struct DebouncedPin {
	last_accepted_ms: u32,
}

impl DebouncedPin {
	/// Accepts the edge unless it lands inside the debounce window of the
	/// previously accepted one.
	fn accept(&mut self, now_ms: u32) -> bool {
		if now_ms.wrapping_sub(self.last_accepted_ms) < GPIO_DEBOUNCE_MS {
			return false;
		}
		self.last_accepted_ms = now_ms;
		true
	}
}

/// Both wheels' capture state.
#[derive(Debug, Default)]
pub struct Encoders {
	left: DebouncedPin,
	right: DebouncedPin,
}

impl Encoders {
	pub const fn new() -> Self {
		Self {
			left: DebouncedPin { last_accepted_ms: 0 },
			right: DebouncedPin { last_accepted_ms: 0 },
		}
	}

	/// Called from the edge interrupt. Returns `true` if the edge survived
	/// debounce and was enqueued.
	pub fn on_edge(
		&mut self,
		side: EncoderSide,
		edge: Edge,
		now_ms: u32,
		events: &EventQueue,
	) -> bool {
		let (pin, event_id) = match side {
			EncoderSide::Left => (&mut self.left, EventId::EncoderLeft),
			EncoderSide::Right => (&mut self.right, EventId::EncoderRight),
		};
		if !pin.accept(now_ms) {
			return false;
		}
		events.queue_event(event_id, edge.direction(), now_ms, Priority::Low)
	}
}
