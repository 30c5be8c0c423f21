//! std-backed platform pieces: a real clock, a thread as Core-T, and mock
//! peripherals.
//!
//! This is what stands in for the SDK glue when the runtime is exercised on
//! a development machine. The mocks hand out shared handles
//! (`Rc<Cell<_>>`/`Rc<RefCell<_>>`) so a test can steer readings and
//! observe side effects while the `Board` owns the trait objects.

use std::boxed::Box;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use carrt_link::{CalibrationScores, CarrtError};

use crate::config::{
	CORE1_IDLE_SLEEP_MS, CORE1_SUCCESS, NAV_TIMER_PERIOD_MS,
};
use crate::core1::{core1_step, AlarmSet, Core1Channel, CoreLauncher, TimerTick};
use crate::drivers::{BatteryMonitor, Board, Heartbeat, Inertial, SystemReset};
use crate::events::EventQueue;
use crate::state;
use crate::time::Clock;

/// Wall-clock time since construction.
pub struct SystemClock {
	start: Instant,
}

impl SystemClock {
	pub fn new() -> Self {
		Self {
			start: Instant::now(),
		}
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn millis(&self) -> u32 {
		self.start.elapsed().as_millis() as u32
	}

	fn sleep_ms(&self, ms: u32) {
		thread::sleep(Duration::from_millis(ms.into()));
	}

	fn sleep_us(&self, us: u32) {
		thread::sleep(Duration::from_micros(us.into()));
	}
}

/// A clock tests move by hand. Sleeps advance it, so code that waits for
/// time to pass observes it passing.
#[derive(Clone)]
pub struct MockClock {
	now: Rc<Cell<u32>>,
}

impl MockClock {
	pub fn new(start_ms: u32) -> Self {
		Self {
			now: Rc::new(Cell::new(start_ms)),
		}
	}

	pub fn advance(&self, ms: u32) {
		self.now.set(self.now.get().wrapping_add(ms));
	}

	pub fn set(&self, ms: u32) {
		self.now.set(ms);
	}
}

impl Clock for MockClock {
	fn millis(&self) -> u32 {
		self.now.get()
	}

	fn sleep_ms(&self, ms: u32) {
		self.advance(ms);
	}

	fn sleep_us(&self, _us: u32) {}
}

/// Scriptable IMU state shared between a test and the mock.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImuScript {
	pub heading: f32,
	pub scores: CalibrationScores,
	pub init_calls: u32,
	pub reset_calls: u32,
}

pub struct MockImu {
	script: Rc<RefCell<ImuScript>>,
}

impl MockImu {
	pub fn new() -> (Self, Rc<RefCell<ImuScript>>) {
		let script = Rc::new(RefCell::new(ImuScript::default()));
		(
			Self {
				script: script.clone(),
			},
			script,
		)
	}
}

impl Inertial for MockImu {
	fn init(&mut self) -> Result<(), CarrtError> {
		self.script.borrow_mut().init_calls += 1;
		Ok(())
	}

	fn reset(&mut self) -> Result<(), CarrtError> {
		self.script.borrow_mut().reset_calls += 1;
		Ok(())
	}

	fn heading(&mut self) -> Result<f32, CarrtError> {
		Ok(self.script.borrow().heading)
	}

	fn calibration(&mut self) -> Result<CalibrationScores, CarrtError> {
		Ok(self.script.borrow().scores)
	}
}

pub struct MockBatteries {
	pub ic: f32,
	pub motor: f32,
}

impl BatteryMonitor for MockBatteries {
	fn ic_volts(&mut self) -> Result<f32, CarrtError> {
		Ok(self.ic)
	}

	fn motor_volts(&mut self) -> Result<f32, CarrtError> {
		Ok(self.motor)
	}
}

pub struct MockLed {
	toggles: Rc<Cell<u32>>,
}

impl MockLed {
	pub fn new() -> (Self, Rc<Cell<u32>>) {
		let toggles = Rc::new(Cell::new(0));
		(
			Self {
				toggles: toggles.clone(),
			},
			toggles,
		)
	}
}

impl Heartbeat for MockLed {
	fn toggle(&mut self) -> Result<(), CarrtError> {
		self.toggles.set(self.toggles.get() + 1);
		Ok(())
	}
}

/// Records reboot requests instead of rebooting.
pub struct RecordingReset {
	reboots: Rc<Cell<u32>>,
}

impl RecordingReset {
	pub fn new() -> (Self, Rc<Cell<u32>>) {
		let reboots = Rc::new(Cell::new(0));
		(
			Self {
				reboots: reboots.clone(),
			},
			reboots,
		)
	}
}

impl SystemReset for RecordingReset {
	fn reboot(&mut self) {
		self.reboots.set(self.reboots.get() + 1);
	}
}

/// Observation handles for a [`mock_board`].
pub struct BoardHandles {
	pub imu: Rc<RefCell<ImuScript>>,
	pub led_toggles: Rc<Cell<u32>>,
	pub reboots: Rc<Cell<u32>>,
	pub clock: MockClock,
	pub core1: Arc<Core1Channel>,
}

/// A fully mocked board plus the handles to drive it.
pub fn mock_board() -> (Board, BoardHandles) {
	let (imu, imu_script) = MockImu::new();
	let (led, led_toggles) = MockLed::new();
	let (reset, reboots) = RecordingReset::new();
	let clock = MockClock::new(0);
	let core1 = Arc::new(Core1Channel::new());

	let board = Board {
		imu: Box::new(imu),
		batteries: Box::new(MockBatteries {
			ic: 4.9,
			motor: 8.2,
		}),
		led: Box::new(led),
		clock: Box::new(clock.clone()),
		reset: Box::new(reset),
		core1: core1.clone(),
	};
	let handles = BoardHandles {
		imu: imu_script,
		led_toggles,
		reboots,
		clock,
		core1,
	};
	(board, handles)
}

/// Core-T as a thread: 8 Hz tick plus channel/alarm service, stopped on
/// drop.
pub struct HostedCore1 {
	stop: Arc<AtomicBool>,
	handle: Option<thread::JoinHandle<()>>,
}

impl HostedCore1 {
	pub fn spawn(events: Arc<EventQueue>, channel: Arc<Core1Channel>) -> Self {
		let stop = Arc::new(AtomicBool::new(false));
		let stop_flag = stop.clone();

		let handle = thread::spawn(move || {
			let start = Instant::now();
			let mut tick = TimerTick::new();
			let mut alarms = AlarmSet::new();
			let mut next_tick_ms = NAV_TIMER_PERIOD_MS;

			while !stop_flag.load(Ordering::Relaxed) {
				let now_ms = start.elapsed().as_millis() as u32;
				if now_ms >= next_tick_ms {
					tick.tick(now_ms, state::calibration_in_progress(), &events);
					next_tick_ms += NAV_TIMER_PERIOD_MS;
				}
				core1_step(&channel, &mut alarms, now_ms, &events);
				thread::sleep(Duration::from_millis(CORE1_IDLE_SLEEP_MS.into()));
			}
		});

		Self {
			stop,
			handle: Some(handle),
		}
	}
}

impl Drop for HostedCore1 {
	fn drop(&mut self) {
		self.stop.store(true, Ordering::Relaxed);
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

/// Launcher that brings up [`HostedCore1`] and always hands back the
/// success word.
pub struct HostedLauncher {
	events: Arc<EventQueue>,
	channel: Arc<Core1Channel>,
	pub runner: Option<HostedCore1>,
}

impl HostedLauncher {
	pub fn new(events: Arc<EventQueue>, channel: Arc<Core1Channel>) -> Self {
		Self {
			events,
			channel,
			runner: None,
		}
	}
}

impl CoreLauncher for HostedLauncher {
	fn launch_core1(&mut self) -> u32 {
		self.runner = Some(HostedCore1::spawn(self.events.clone(), self.channel.clone()));
		CORE1_SUCCESS
	}
}

/// Launcher standing in for a Core-T that failed to start.
pub struct FixedLauncher {
	pub word: u32,
}

impl CoreLauncher for FixedLauncher {
	fn launch_core1(&mut self) -> u32 {
		self.word
	}
}
