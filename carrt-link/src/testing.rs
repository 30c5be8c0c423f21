//! In-memory links for protocol tests.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::error::CarrtError;
use crate::link::SerialLink;

/// A loopback-style link endpoint backed by byte queues.
///
/// A standalone endpoint ([`TestLink::new`]) keeps what it sends for
/// inspection via [`sent`](TestLink::sent) and is fed inbound bytes with
/// [`push_inbound`](TestLink::push_inbound). A connected pair
/// ([`TestLink::pair`]) cross-wires two endpoints so that what one sends the
/// other receives, which is enough to run both nodes against each other in
/// one test.
pub struct TestLink {
	rx: Rc<RefCell<VecDeque<u8>>>,
	tx: Rc<RefCell<VecDeque<u8>>>,
	pauses: Cell<u32>,
}

impl TestLink {
	/// A standalone endpoint; outbound bytes accumulate for inspection.
	pub fn new() -> Self {
		Self {
			rx: Rc::new(RefCell::new(VecDeque::new())),
			tx: Rc::new(RefCell::new(VecDeque::new())),
			pauses: Cell::new(0),
		}
	}

	/// Two endpoints wired back to back.
	pub fn pair() -> (Self, Self) {
		let a_to_b = Rc::new(RefCell::new(VecDeque::new()));
		let b_to_a = Rc::new(RefCell::new(VecDeque::new()));
		let a = Self {
			rx: b_to_a.clone(),
			tx: a_to_b.clone(),
			pauses: Cell::new(0),
		};
		let b = Self {
			rx: a_to_b,
			tx: b_to_a,
			pauses: Cell::new(0),
		};
		(a, b)
	}

	/// Queues bytes for this endpoint to receive.
	pub fn push_inbound(&self, bytes: &[u8]) {
		self.rx.borrow_mut().extend(bytes.iter().copied());
	}

	/// Everything this endpoint has sent and nobody has consumed yet.
	pub fn sent(&self) -> Vec<u8> {
		self.tx.borrow().iter().copied().collect()
	}

	/// Drains and returns the sent bytes.
	pub fn take_sent(&self) -> Vec<u8> {
		self.tx.borrow_mut().drain(..).collect()
	}

	/// True if no inbound bytes are waiting.
	pub fn inbound_is_empty(&self) -> bool {
		self.rx.borrow().is_empty()
	}

	/// How often the bounded-retry reads backed off.
	pub fn pauses(&self) -> u32 {
		self.pauses.get()
	}
}

impl Default for TestLink {
	fn default() -> Self {
		Self::new()
	}
}

impl SerialLink for TestLink {
	fn poll_byte(&mut self) -> Option<u8> {
		self.rx.borrow_mut().pop_front()
	}

	fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), CarrtError> {
		self.tx.borrow_mut().extend(bytes.iter().copied());
		Ok(())
	}

	fn pause(&mut self) {
		self.pauses.set(self.pauses.get() + 1);
	}
}
