//! Encoder capture: chatter collapses, accepted edges reach the host.

mod common;

use carrt_link::messages::EncoderUpdateControlMsg;
use carrt_link::EncoderSide;
use carrt_pico::encoders::{Edge, Encoders};
use common::Rig;

#[test]
fn two_close_edges_produce_one_update() {
	let mut rig = Rig::new();
	let mut encoders = Encoders::new();

	rig.host_sends_msg(&EncoderUpdateControlMsg::new(true));
	rig.poll();

	// Two rising edges 5 ms apart with a 10 ms window.
	encoders.on_edge(EncoderSide::Left, Edge::Rising, 100, &rig.events);
	encoders.on_edge(EncoderSide::Left, Edge::Rising, 105, &rig.events);
	rig.poll_until_idle();

	// Exactly one update: side=Left(0), count=+1, time=100.
	let mut expected = vec![0x11, 0x00];
	expected.extend_from_slice(&1i32.to_le_bytes());
	expected.extend_from_slice(&100u32.to_le_bytes());
	assert_eq!(rig.node_output(), expected);
}

#[test]
fn falling_edges_carry_negative_direction() {
	let mut rig = Rig::new();
	let mut encoders = Encoders::new();
	rig.state.send_encoder_msgs(true);

	encoders.on_edge(EncoderSide::Right, Edge::Falling, 500, &rig.events);
	rig.poll();

	let output = rig.node_output();
	assert_eq!(output[1], 1); // right side
	assert_eq!(
		i32::from_le_bytes(output[2..6].try_into().unwrap()),
		-1
	);
}

#[test]
fn encoder_stream_respects_its_flag() {
	let mut rig = Rig::new();
	let mut encoders = Encoders::new();

	encoders.on_edge(EncoderSide::Left, Edge::Rising, 100, &rig.events);
	rig.poll_until_idle();

	assert!(rig.node_output().is_empty());
}
