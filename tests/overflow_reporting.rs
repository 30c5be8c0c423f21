//! A queue overflow is sticky, reported once, and non-destructive.

mod common;

use carrt_link::{error_cause, error_module, ErrorModule, MsgId};
use carrt_pico::{EventId, Priority};
use common::Rig;

#[test]
fn overflow_is_reported_on_the_next_iteration() {
	let mut rig = Rig::new();

	for _ in 0..carrt_pico::config::EVENT_QUEUE_DEPTH {
		assert!(rig
			.events
			.queue_event(EventId::NullEvent, 0, 0, Priority::Low));
	}
	assert!(!rig
		.events
		.queue_event(EventId::NullEvent, 0, 0, Priority::Low));

	rig.poll();

	let output = rig.node_output();
	assert_eq!(output[0], u8::from(MsgId::ErrorReportFromPico));
	// Non-fatal, with an event-processor error id.
	assert_eq!(output[1], 0);
	let code = i32::from_le_bytes(output[2..6].try_into().unwrap());
	assert_eq!(error_module(code), ErrorModule::EventProcessor as u8 as i32);

	// Reported exactly once; the stored events survive.
	assert!(!rig.events.has_overflowed());
	rig.poll_until_idle();
	assert!(rig.node_output().is_empty());
	assert!(rig.events.is_empty(Priority::Low));
}

#[test]
fn unknown_inbound_id_becomes_an_error_report() {
	let mut rig = Rig::new();

	rig.host_sends(&[0xEE]);
	rig.poll();

	let output = rig.node_output();
	assert_eq!(output[0], u8::from(MsgId::ErrorReportFromPico));
	assert_eq!(output[1], 0);
	let code = i32::from_le_bytes(output[2..6].try_into().unwrap());
	assert_eq!(error_module(code), ErrorModule::SerialMessage as u8 as i32);
	assert_eq!(error_cause(code), 0xEE);
}

#[test]
fn unhandled_event_id_becomes_an_error_report() {
	let mut rig = Rig::new();

	// The GPIO interrupt test events ship with no handler registered.
	rig.events
		.queue_event(EventId::GpioInterruptTestRising, 0, 0, Priority::Low);
	rig.poll();

	let output = rig.node_output();
	assert_eq!(output[0], u8::from(MsgId::ErrorReportFromPico));
	let code = i32::from_le_bytes(output[2..6].try_into().unwrap());
	assert_eq!(error_module(code), ErrorModule::EventProcessor as u8 as i32);
}
