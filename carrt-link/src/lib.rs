//! Definitions for the CARRT serial-link protocol.
//!
//! The rover consists of two nodes joined by a point-to-point UART: the
//! embedded node ("Pico") that runs the hard-real-time event core, and the
//! host node ("RPi0") that runs the mission logic. Both sides speak the same
//! binary, self-delimiting request/response/telemetry protocol, and this
//! crate is the single place where that protocol is defined: the stable
//! message-id registry, the byte-exact wire codec, the concrete message
//! types, the factory used to construct messages from inbound ids, and the
//! structured error-id scheme both nodes use in error reports.
//!
//! What a node *does* with a received message diverges per node and lives in
//! the node crates; everything wire-visible lives here exactly once.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod calib;
mod control;
mod error;
mod factory;
mod id;
mod link;
pub mod messages;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod wire;

pub use self::calib::CalibrationScores;
pub use self::control::{BatteryId, DriveState, EncoderSide, MsgMask, TimerWhich};
pub use self::error::{
	error_cause, error_function, error_module, error_node, make_pico_error_id,
	make_rpi0_error_id, make_shared_error_id, CarrtError, ErrorKind, ErrorModule, NODE_PICO,
	NODE_RPI0, NODE_SHARED,
};
pub use self::factory::{MessageCreator, MessageFactory};
pub use self::id::MsgId;
pub use self::link::{SerialLink, MAX_READ_ATTEMPTS};
pub use self::messages::SerialMessage;
pub use self::wire::{RawMessage, WireField, WireTuple};
