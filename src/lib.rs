//! The CARRT embedded node: a dual-core cooperative event runtime.
//!
//! Core-T (the timer/producer core) owns the 8 Hz navigation timer and the
//! encoder edge interrupts, and does nothing but enqueue events. Core-D
//! (the dispatcher core) owns the UART to the host, the I²C peripheral
//! network, and all peripheral state; it pulls events from the shared
//! dual-priority queue, looks up their handlers, and runs them, interleaved
//! with decoding one inbound serial message per iteration.
//!
//! The wire protocol itself lives in `carrt-link`, shared with the host
//! node; platform glue (SDK init, interrupt wiring, the real multicore
//! launch) is expected to sit above this crate, with the `hosted` feature
//! providing a std substitute for development and tests.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(all(feature = "hosted", not(test)))]
extern crate std;

pub mod config;
pub mod core1;
pub mod dispatch;
pub mod drivers;
pub mod encoders;
pub mod events;
#[cfg(any(test, feature = "hosted"))]
pub mod hosted;
pub mod messages;
pub mod reset;
pub mod state;
pub mod synch;
pub mod time;

pub use carrt_link;

pub use self::dispatch::{Context, Dispatcher};
pub use self::events::{Event, EventId, EventQueue, Priority};
pub use self::state::PicoState;
