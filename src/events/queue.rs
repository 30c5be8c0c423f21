//! The dual-priority event queue shared by both cores.
//!
//! Producers are the Core-T timer tick, GPIO interrupt callbacks, Core-D
//! handlers, and Core-T alarm callbacks; the sole consumer is the Core-D
//! dispatch loop. Every access happens inside the process-wide critical
//! section, which is what makes enqueueing legal from interrupt context.
//!
//! Enqueue never blocks. When a ring is full the offending event is dropped,
//! a sticky overflow flag goes up, and everything already queued is left
//! intact; the dispatcher observes and clears the flag at its convenience.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::config::EVENT_QUEUE_DEPTH;
use crate::events::{Event, EventId, Priority};

struct Rings {
	high: Deque<Event, EVENT_QUEUE_DEPTH>,
	low: Deque<Event, EVENT_QUEUE_DEPTH>,
	overflow: bool,
}

impl Rings {
	const fn new() -> Self {
		Self {
			high: Deque::new(),
			low: Deque::new(),
			overflow: false,
		}
	}

	fn ring(&self, pri: Priority) -> &Deque<Event, EVENT_QUEUE_DEPTH> {
		match pri {
			Priority::High => &self.high,
			Priority::Low => &self.low,
		}
	}
}

pub struct EventQueue {
	rings: Mutex<RefCell<Rings>>,
}

impl EventQueue {
	pub const fn new() -> Self {
		Self {
			rings: Mutex::new(RefCell::new(Rings::new())),
		}
	}

	/// Tries to insert an event; `true` on success, `false` (and the sticky
	/// overflow flag) when the selected ring is full.
	pub fn queue_event(&self, id: EventId, param: i32, time: u32, pri: Priority) -> bool {
		critical_section::with(|cs| {
			let mut rings = self.rings.borrow_ref_mut(cs);
			let ring = match pri {
				Priority::High => &mut rings.high,
				Priority::Low => &mut rings.low,
			};
			if ring.push_back(Event::new(id, param, time)).is_ok() {
				true
			} else {
				// Intentionally sticky: stays up until explicitly cleared
				// so the dispatcher can notice at its own pace.
				rings.overflow = true;
				false
			}
		})
	}

	/// The next event, high priority strictly first, FIFO within each
	/// priority.
	pub fn next_event(&self) -> Option<Event> {
		critical_section::with(|cs| {
			let mut rings = self.rings.borrow_ref_mut(cs);
			rings.high.pop_front().or_else(|| rings.low.pop_front())
		})
	}

	/// Purges both rings and clears the overflow flag.
	pub fn reset(&self) {
		critical_section::with(|cs| {
			*self.rings.borrow_ref_mut(cs) = Rings::new();
		});
	}

	pub fn is_empty(&self, pri: Priority) -> bool {
		critical_section::with(|cs| self.rings.borrow_ref(cs).ring(pri).is_empty())
	}

	pub fn is_full(&self, pri: Priority) -> bool {
		critical_section::with(|cs| self.rings.borrow_ref(cs).ring(pri).is_full())
	}

	pub fn len(&self, pri: Priority) -> usize {
		critical_section::with(|cs| self.rings.borrow_ref(cs).ring(pri).len())
	}

	pub fn has_overflowed(&self) -> bool {
		critical_section::with(|cs| self.rings.borrow_ref(cs).overflow)
	}

	pub fn clear_overflow(&self) {
		critical_section::with(|cs| self.rings.borrow_ref_mut(cs).overflow = false);
	}
}

impl Default for EventQueue {
	fn default() -> Self {
		Self::new()
	}
}
