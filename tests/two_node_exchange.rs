//! Both nodes against each other over an in-memory duplex link.

use carrt_host::{Commander, HostContext, HostPump, RoverStatus};
use carrt_link::testing::TestLink;
use carrt_link::{BatteryId, MsgMask, SerialLink};
use carrt_pico::hosted::mock_board;
use carrt_pico::{Context, Dispatcher, EventId, EventQueue, PicoState, Priority};

struct Nodes {
	pico: Dispatcher,
	events: EventQueue,
	state: PicoState,
	board: carrt_pico::drivers::Board,
	handles: carrt_pico::hosted::BoardHandles,
	pico_link: TestLink,

	host: HostPump,
	status: RoverStatus,
	host_link: TestLink,
}

impl Nodes {
	fn new() -> Self {
		let (pico_link, host_link) = TestLink::pair();
		let (board, handles) = mock_board();
		Self {
			pico: Dispatcher::new().unwrap(),
			events: EventQueue::new(),
			state: PicoState::init(),
			board,
			handles,
			pico_link,
			host: HostPump::new().unwrap(),
			status: RoverStatus::new(),
			host_link,
		}
	}

	/// Runs both loops until neither has anything left to do.
	fn settle(&mut self) {
		loop {
			let mut ctx = Context {
				events: &self.events,
				link: &mut self.pico_link,
				state: &mut self.state,
				board: &mut self.board,
			};
			let pico_worked = self.pico.poll_once(&mut ctx).unwrap();

			let mut host_ctx = HostContext {
				link: &mut self.host_link,
				status: &mut self.status,
				buzzer: None,
			};
			let host_worked = self.host.poll_once(&mut host_ctx).unwrap();

			if !pico_worked && !host_worked {
				break;
			}
		}
	}

	fn command(&mut self, f: impl FnOnce(&mut Commander<'_>)) {
		let mut commander = Commander::new(&mut self.host_link);
		f(&mut commander);
		self.settle();
	}
}

#[test]
fn ping_from_the_host_comes_back_as_a_reply() {
	let mut nodes = Nodes::new();
	nodes.command(|c| c.ping().unwrap());
	// Nothing stuck on either side.
	assert!(nodes.pico_link.inbound_is_empty());
	assert!(nodes.host_link.inbound_is_empty());
}

#[test]
fn battery_round_trip_fills_the_status_snapshot() {
	let mut nodes = Nodes::new();

	nodes.command(|c| c.request_battery_level(BatteryId::Both).unwrap());

	let ic = nodes.status.ic_battery_volts.unwrap();
	let motor = nodes.status.motor_battery_volts.unwrap();
	assert!((ic - 4.9).abs() < 1e-6);
	assert!((motor - 8.2).abs() < 1e-6);
}

#[test]
fn telemetry_masks_flow_end_to_end() {
	let mut nodes = Nodes::new();

	nodes.command(|c| c.set_telemetry(MsgMask::all()).unwrap());
	assert!(nodes.state.want_nav_msgs());
	assert!(nodes.state.want_battery_msgs());

	// A one-second tick now reaches the host's snapshot.
	nodes
		.events
		.queue_event(EventId::OneSecondTimer, 5, 5_000, Priority::Low);
	nodes.settle();
	assert_eq!(nodes.status.one_second, Some((5, 5_000)));

	nodes.command(|c| c.set_telemetry(MsgMask::empty()).unwrap());
	assert!(!nodes.state.want_nav_msgs());
}

#[test]
fn nav_stream_reaches_the_host_after_calibration() {
	let mut nodes = Nodes::new();
	nodes.handles.imu.borrow_mut().heading = 42.5;
	nodes.handles.imu.borrow_mut().scores = carrt_link::CalibrationScores::new(3, 3, 3, 3);

	nodes.command(|c| {
		c.set_nav_streams(true, true).unwrap();
		c.request_calibration_status().unwrap();
	});
	assert!(nodes.status.nav_good);

	nodes
		.events
		.queue_event(EventId::NavUpdate, 0, 2_000, Priority::High);
	nodes.settle();

	let (heading, time) = nodes.status.heading.unwrap();
	assert!((heading - 42.5).abs() < 1e-4);
	assert_eq!(time, 2_000);
}

#[test]
fn pico_error_reports_land_in_the_host_log_state() {
	let mut nodes = Nodes::new();

	// An unknown id on the pico side turns into an error report the host
	// records.
	nodes.host_link.put_bytes(&[0xEE]).unwrap();
	nodes.settle();

	let (fatal, code, _time) = nodes.status.last_error.unwrap();
	assert!(!fatal);
	assert_eq!(carrt_link::error_cause(code), 0xEE);
}

#[test]
fn reset_order_round_trips_to_a_fresh_greeting() {
	let mut nodes = Nodes::new();
	nodes.status.nav_good = true;

	nodes.command(|c| c.reset_pico().unwrap());

	// The host saw the announcement...
	assert!(nodes.status.rebooting);
	assert_eq!(nodes.handles.reboots.get(), 1);

	// ...and the reborn node's greeting clears it.
	let mut ctx = Context {
		events: &nodes.events,
		link: &mut nodes.pico_link,
		state: &mut nodes.state,
		board: &mut nodes.board,
	};
	let mut launcher = carrt_pico::hosted::FixedLauncher {
		word: carrt_pico::config::CORE1_SUCCESS,
	};
	nodes.pico.boot(&mut ctx, &mut launcher).unwrap();
	nodes.settle();

	assert!(!nodes.status.rebooting);
	assert!(nodes.status.boot_time.is_some());
}
