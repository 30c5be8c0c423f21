//! Structured error codes shared by both nodes.
//!
//! Every error that crosses the link (inside an `ErrorReportMsg`) carries a
//! single `i32` that packs the originating node, module, a per-module
//! function index, and a cause value. The packing is decimal so the codes
//! stay readable in remote logs: `10_203_017` reads off as node 1, module 2,
//! function 3, cause 17.
//!
//! Layout: `node * 10_000_000 + module * 100_000 + function * 1_000 + cause`
//! with `cause < 1_000`. Causes larger than three decimal digits (message
//! ids always fit; errno-style values may not) are reduced modulo 1_000 at
//! pack time.

use thiserror::Error;

/// Node prefix for codes originating in shared code paths.
pub const NODE_SHARED: i32 = 0;
/// Node prefix for the embedded node.
pub const NODE_PICO: i32 = 1;
/// Node prefix for the host node.
pub const NODE_RPI0: i32 = 2;

/// The subsystem an error code points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorModule {
	I2c = 1,
	SerialMessage = 2,
	SerialCommand = 3,
	Multicore = 4,
	EventProcessor = 5,
	MainProcess = 6,
	Buzzer = 7,
	Test = 8,
}

fn pack(node: i32, module: ErrorModule, function: u8, cause: i32) -> i32 {
	node * 10_000_000 + i32::from(module as u8) * 100_000 + i32::from(function) * 1_000
		+ cause.rem_euclid(1_000)
}

/// Builds an error id for a fault detected on the embedded node.
pub fn make_pico_error_id(module: ErrorModule, function: u8, cause: i32) -> i32 {
	pack(NODE_PICO, module, function, cause)
}

/// Builds an error id for a fault detected on the host node.
pub fn make_rpi0_error_id(module: ErrorModule, function: u8, cause: i32) -> i32 {
	pack(NODE_RPI0, module, function, cause)
}

/// Builds an error id for a fault detected in node-agnostic shared code.
pub fn make_shared_error_id(module: ErrorModule, function: u8, cause: i32) -> i32 {
	pack(NODE_SHARED, module, function, cause)
}

/// Extracts the node prefix of a structured error id.
pub fn error_node(id: i32) -> i32 {
	id / 10_000_000
}

/// Extracts the module field of a structured error id.
pub fn error_module(id: i32) -> i32 {
	(id / 100_000) % 100
}

/// Extracts the function index of a structured error id.
pub fn error_function(id: i32) -> i32 {
	(id / 1_000) % 100
}

/// Extracts the cause field of a structured error id.
pub fn error_cause(id: i32) -> i32 {
	id % 1_000
}

/// What went wrong, for local handling; the error-id carries the where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
	#[error("unknown message id {0:#04x}")]
	UnknownMessageId(u8),
	#[error("message id {0:#04x} is already registered")]
	DuplicateRegistration(u8),
	#[error("id mismatch at construction: variant {expected:#04x} handed id {got:#04x}")]
	IdMismatch { expected: u8, got: u8 },
	#[error("truncated frame: read retries exhausted")]
	TruncatedFrame,
	#[error("serial link write failed")]
	WriteFailed,
	#[error("i2c transfer failed")]
	I2c,
	#[error("pwm hardware call failed")]
	Pwm,
	#[error("event queue overflow")]
	QueueOverflow,
	#[error("cross-core channel full")]
	ChannelFull,
	#[error("second core failed its start-up handshake")]
	HandshakeFailed,
	#[error("no valid range")]
	NoValidRange,
	#[error("bad battery id {0}")]
	BadBatteryId(u8),
	#[error("no handler for event id {0}")]
	UnhandledEvent(u8),
}

/// An error with a wire-reportable structured id attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (error id {id})")]
pub struct CarrtError {
	/// Structured error id, suitable for an `ErrorReportMsg`.
	pub id: i32,
	pub kind: ErrorKind,
}

impl CarrtError {
	pub fn new(id: i32, kind: ErrorKind) -> Self {
		Self { id, kind }
	}
}
