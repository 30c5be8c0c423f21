//! Time source contract.

/// Millisecond clock and sleep provider for one node.
///
/// `millis` is milliseconds since boot and wraps after ~49 days; everything
/// that compares timestamps uses wrapping arithmetic. Sleeps are cooperative
/// pauses, not deadlines.
pub trait Clock {
	fn millis(&self) -> u32;

	fn sleep_ms(&self, ms: u32);

	fn sleep_us(&self, us: u32);
}
