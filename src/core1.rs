//! Core-T: the timer/producer core.
//!
//! Core-T owns the 8 Hz navigation timer and services one-shot requests
//! posted by Core-D. It enqueues events and nothing else: no UART, no I²C,
//! no blocking. Its main loop drains the Core-D→Core-T channel, arms the
//! requested alarms, fires due alarms, and sleeps when idle; the repeating
//! tick and the GPIO edge callbacks pre-empt that loop on real hardware.
//!
//! At start-up Core-D launches Core-T and blocks briefly on a handshake
//! word. A failed handshake is reported to the host as a fatal error, after
//! which Core-D proceeds degraded (no timer events) and leaves recovery
//! policy to the host.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{Deque, Vec};

use crate::config::{CORE1_ALARM_SLOTS, CORE1_QUEUE_DEPTH};
use crate::events::{EventId, EventQueue, Priority};
use carrt_link::{
	make_pico_error_id, CarrtError, ErrorKind, ErrorModule,
};

/// One request posted from Core-D: after `wait_ms`, enqueue `event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Core1Request {
	pub event: EventId,
	pub wait_ms: u32,
}

/// The bounded Core-D → Core-T request channel.
///
/// Posts are rare (an IMU re-init after a reset, and little else), so a full
/// channel means something upstream is badly wrong and is reported as a
/// multicore error rather than retried.
pub struct Core1Channel {
	requests: Mutex<RefCell<Deque<Core1Request, CORE1_QUEUE_DEPTH>>>,
}

impl Core1Channel {
	pub const fn new() -> Self {
		Self {
			requests: Mutex::new(RefCell::new(Deque::new())),
		}
	}

	/// Posts a request from Core-D.
	pub fn post(&self, event: EventId, wait_ms: u32) -> Result<(), CarrtError> {
		critical_section::with(|cs| {
			self.requests
				.borrow_ref_mut(cs)
				.push_back(Core1Request { event, wait_ms })
		})
		.map_err(|_| {
			CarrtError::new(
				make_pico_error_id(ErrorModule::Multicore, 2, 0),
				ErrorKind::ChannelFull,
			)
		})
	}

	/// Takes the oldest pending request, from Core-T.
	pub fn take(&self) -> Option<Core1Request> {
		critical_section::with(|cs| self.requests.borrow_ref_mut(cs).pop_front())
	}

	pub fn is_empty(&self) -> bool {
		critical_section::with(|cs| self.requests.borrow_ref(cs).is_empty())
	}
}

impl Default for Core1Channel {
	fn default() -> Self {
		Self::new()
	}
}

/// Starts Core-T and reports its handshake word.
///
/// On the target this wraps the SDK's multicore launch plus the blocking
/// FIFO pop; the hosted platform spawns a thread instead.
pub trait CoreLauncher {
	fn launch_core1(&mut self) -> u32;
}

/// The 8 Hz repeating-timer state.
///
/// The eighth-second counter runs modulo 64, which makes the eight-second
/// boundary the counter's own wrap to zero.
#[derive(Debug, Default)]
pub struct TimerTick {
	count: u32,
}

impl TimerTick {
	pub const fn new() -> Self {
		Self { count: 0 }
	}

	/// One 125 ms tick: enqueue the due events for this eighth-second.
	///
	/// `calibrating` is the cross-core calibration flag, sampled by the
	/// caller at tick entry.
	pub fn tick(&mut self, now_ms: u32, calibrating: bool, events: &EventQueue) {
		self.count = (self.count + 1) % 64;
		let count = self.count;

		// Nav updates get the high-priority ring so a backlog of telemetry
		// can never delay them. Parameter counts eighth-seconds 0..=7.
		events.queue_event(
			EventId::NavUpdate,
			(count % 8) as i32,
			now_ms,
			Priority::High,
		);

		if count % 2 == 0 {
			// Parameter counts quarter-seconds 0..=3.
			events.queue_event(
				EventId::QuarterSecondTimer,
				((count / 2) % 4) as i32,
				now_ms,
				Priority::Low,
			);
		}

		if count % 8 == 0 {
			// Parameter counts seconds 0..=7.
			events.queue_event(
				EventId::OneSecondTimer,
				(count / 8) as i32,
				now_ms,
				Priority::Low,
			);
			events.queue_event(EventId::PulsePicoLed, 0, now_ms, Priority::Low);

			if calibrating {
				events.queue_event(EventId::SendCalibrationInfo, 0, now_ms, Priority::Low);
			}
		}

		if count == 0 {
			events.queue_event(EventId::EightSecondTimer, 0, now_ms, Priority::Low);
			events.queue_event(EventId::SendCalibrationInfo, 0, now_ms, Priority::Low);
		}
	}
}

/// The one-shot alarms Core-T arms on behalf of Core-D.
#[derive(Debug, Default)]
pub struct AlarmSet {
	armed: Vec<(u32, EventId), CORE1_ALARM_SLOTS>,
}

impl AlarmSet {
	pub const fn new() -> Self {
		Self { armed: Vec::new() }
	}

	/// Arms `event` to fire once `fire_at_ms` is reached.
	pub fn arm(&mut self, fire_at_ms: u32, event: EventId) -> Result<(), CarrtError> {
		self.armed.push((fire_at_ms, event)).map_err(|_| {
			CarrtError::new(
				make_pico_error_id(ErrorModule::Multicore, 3, 0),
				ErrorKind::ChannelFull,
			)
		})
	}

	/// Fires every due alarm into the event queue.
	pub fn service(&mut self, now_ms: u32, events: &EventQueue) {
		let mut i = 0;
		while i < self.armed.len() {
			let (fire_at, event) = self.armed[i];
			// Wrapping compare keeps this correct across the 49-day
			// millisecond rollover.
			if now_ms.wrapping_sub(fire_at) < u32::MAX / 2 {
				events.queue_event(event, 0, now_ms, Priority::Low);
				self.armed.swap_remove(i);
			} else {
				i += 1;
			}
		}
	}

	pub fn pending(&self) -> usize {
		self.armed.len()
	}
}

/// One pass of the Core-T main loop body: drain the channel into the alarm
/// set, then fire whatever is due. Returns `true` if anything happened.
pub fn core1_step(
	channel: &Core1Channel,
	alarms: &mut AlarmSet,
	now_ms: u32,
	events: &EventQueue,
) -> bool {
	let mut worked = false;
	while let Some(request) = channel.take() {
		worked = true;
		if alarms
			.arm(now_ms.wrapping_add(request.wait_ms), request.event)
			.is_err()
		{
			// Out of alarm slots; surface through the event path so the
			// host hears about it.
			events.queue_event(
				EventId::Error,
				make_pico_error_id(ErrorModule::Multicore, 4, 0),
				now_ms,
				Priority::Low,
			);
		}
	}

	let before = alarms.pending();
	alarms.service(now_ms, events);
	worked || alarms.pending() != before
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::Event;

	fn drain(events: &EventQueue) -> std::vec::Vec<Event> {
		core::iter::from_fn(|| events.next_event()).collect()
	}

	#[test]
	fn tick_cadence_over_a_full_cycle() {
		let events = EventQueue::new();
		let mut tick = TimerTick::new();

		let mut nav = 0;
		let mut quarter = 0;
		let mut one_sec = 0;
		let mut eight_sec = 0;
		let mut led = 0;
		let mut calib = 0;

		for n in 0..64 {
			tick.tick(n * 125, false, &events);
			for event in drain(&events) {
				match event.id {
					EventId::NavUpdate => nav += 1,
					EventId::QuarterSecondTimer => quarter += 1,
					EventId::OneSecondTimer => one_sec += 1,
					EventId::EightSecondTimer => eight_sec += 1,
					EventId::PulsePicoLed => led += 1,
					EventId::SendCalibrationInfo => calib += 1,
					other => panic!("unexpected event {other:?}"),
				}
			}
		}

		assert_eq!(nav, 64);
		assert_eq!(quarter, 32);
		assert_eq!(one_sec, 8);
		assert_eq!(eight_sec, 1);
		assert_eq!(led, 8);
		// The eight-second wrap polls calibration even outside a cycle.
		assert_eq!(calib, 1);
	}

	#[test]
	fn nav_updates_are_high_priority_with_subsecond_param() {
		let events = EventQueue::new();
		let mut tick = TimerTick::new();

		tick.tick(125, false, &events);
		// The nav update outruns the other products of the same tick.
		let first = events.next_event().unwrap();
		assert_eq!(first.id, EventId::NavUpdate);
		assert_eq!(first.param, 1);
		assert_eq!(first.time, 125);
	}

	#[test]
	fn calibration_polls_ride_the_one_second_boundary() {
		let events = EventQueue::new();
		let mut tick = TimerTick::new();

		// Seven ticks reach count 7: no one-second boundary crossed yet.
		for n in 1..=7 {
			tick.tick(n * 125, true, &events);
		}
		let calib_events = drain(&events)
			.iter()
			.filter(|e| e.id == EventId::SendCalibrationInfo)
			.count();
		assert_eq!(calib_events, 0);

		// The eighth tick lands on count 8.
		tick.tick(1000, true, &events);
		let calib_events = drain(&events)
			.iter()
			.filter(|e| e.id == EventId::SendCalibrationInfo)
			.count();
		assert_eq!(calib_events, 1);
	}

	#[test]
	fn eight_second_wrap_always_polls_calibration() {
		let events = EventQueue::new();
		let mut tick = TimerTick::new();

		for n in 1..=64 {
			tick.tick(n * 125, false, &events);
		}
		let all = drain(&events);
		assert_eq!(
			all.iter()
				.filter(|e| e.id == EventId::SendCalibrationInfo)
				.count(),
			1
		);
		assert_eq!(
			all.iter()
				.filter(|e| e.id == EventId::EightSecondTimer)
				.count(),
			1
		);
	}

	#[test]
	fn channel_posts_become_alarms_become_events() {
		let events = EventQueue::new();
		let channel = Core1Channel::new();
		let mut alarms = AlarmSet::new();

		channel.post(EventId::Bno055Initialize, 650).unwrap();
		assert!(core1_step(&channel, &mut alarms, 1_000, &events));
		assert_eq!(alarms.pending(), 1);
		assert!(events.next_event().is_none());

		// Not due yet.
		core1_step(&channel, &mut alarms, 1_600, &events);
		assert!(events.next_event().is_none());

		// Due.
		core1_step(&channel, &mut alarms, 1_650, &events);
		let fired = events.next_event().unwrap();
		assert_eq!(fired.id, EventId::Bno055Initialize);
		assert_eq!(fired.time, 1_650);
		assert_eq!(alarms.pending(), 0);
	}

	#[test]
	fn full_channel_reports_a_multicore_error() {
		let channel = Core1Channel::new();
		for _ in 0..CORE1_QUEUE_DEPTH {
			channel.post(EventId::Bno055Initialize, 1).unwrap();
		}
		let err = channel.post(EventId::Bno055Initialize, 1).unwrap_err();
		assert_eq!(err.kind, ErrorKind::ChannelFull);
		assert_eq!(carrt_link::error_module(err.id), ErrorModule::Multicore as u8 as i32);
	}
}
