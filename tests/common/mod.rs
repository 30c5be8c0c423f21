//! Shared test rig: a fully mocked embedded node on an inspectable link.

// Each scenario binary uses its own subset of the rig.
#![allow(dead_code)]

use carrt_link::testing::TestLink;
use carrt_link::SerialMessage;
use carrt_pico::drivers::Board;
use carrt_pico::hosted::{mock_board, BoardHandles};
use carrt_pico::{Context, Dispatcher, EventQueue, PicoState};

pub struct Rig {
	pub dispatcher: Dispatcher,
	pub events: EventQueue,
	pub state: PicoState,
	pub board: Board,
	pub handles: BoardHandles,
	pub link: TestLink,
}

impl Rig {
	pub fn new() -> Self {
		let (board, handles) = mock_board();
		Self {
			dispatcher: Dispatcher::new().expect("registries must build"),
			events: EventQueue::new(),
			state: PicoState::init(),
			board,
			handles,
			link: TestLink::new(),
		}
	}

	/// One dispatcher iteration.
	pub fn poll(&mut self) -> bool {
		let mut ctx = Context {
			events: &self.events,
			link: &mut self.link,
			state: &mut self.state,
			board: &mut self.board,
		};
		self.dispatcher
			.poll_once(&mut ctx)
			.expect("link writes cannot fail in the rig")
	}

	/// Polls until both streams are idle.
	pub fn poll_until_idle(&mut self) {
		while self.poll() {}
	}

	/// Queues inbound bytes as if the host had sent them.
	pub fn host_sends(&self, bytes: &[u8]) {
		self.link.push_inbound(bytes);
	}

	/// Queues an inbound message built with the shared codec.
	pub fn host_sends_msg(&self, msg: &impl SerialMessage) {
		let mut scratch = TestLink::new();
		msg.send_out(&mut scratch).expect("encode cannot fail");
		self.link.push_inbound(&scratch.sent());
	}

	/// Everything the node has sent since the last call.
	pub fn node_output(&self) -> Vec<u8> {
		self.link.take_sent()
	}
}
