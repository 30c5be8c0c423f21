//! Transport contract for the serial link.
//!
//! The link is byte oriented and trusted; there is no flow control and no
//! message-level timeout. Reads while hunting for the start of a frame are
//! non-blocking; reads inside a frame body retry a bounded number of times
//! with a small pause between attempts, because the sender is mid-frame and
//! the remaining bytes are expected imminently. Exhausting the retries means
//! the frame was truncated and the caller reports it.

use crate::error::{
	make_shared_error_id, CarrtError, ErrorKind, ErrorModule,
};

/// Retry cap for reads inside a message body. Attempts are only counted when
/// a poll comes up empty; successful byte reads reset nothing and cost no
/// attempt.
pub const MAX_READ_ATTEMPTS: u32 = 16;

/// A node's end of the serial link.
///
/// Implementations supply the three primitives; the framing-aware read
/// helpers are shared. `pause` is the small backoff between body-read
/// attempts (tens of microseconds on real hardware).
pub trait SerialLink {
	/// Non-blocking: the next byte if one is waiting, else `None`.
	fn poll_byte(&mut self) -> Option<u8>;

	/// Blocking write of the whole buffer.
	fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), CarrtError>;

	/// Short backoff between read attempts inside a message body.
	fn pause(&mut self);

	/// Non-blocking check for the start of a frame. Consumes and returns
	/// only the id byte; the body remains unread for the message's
	/// `read_in`.
	fn try_get_id(&mut self) -> Option<u8> {
		self.poll_byte()
	}

	/// Bounded-retry read of one body byte.
	fn get_byte(&mut self) -> Result<u8, CarrtError> {
		let mut attempts = 0;
		while attempts < MAX_READ_ATTEMPTS {
			if let Some(byte) = self.poll_byte() {
				return Ok(byte);
			}
			self.pause();
			attempts += 1;
		}

		Err(CarrtError::new(
			make_shared_error_id(ErrorModule::SerialMessage, 2, 0),
			ErrorKind::TruncatedFrame,
		))
	}

	/// Bounded-retry read of a four-byte field. `poll_byte` only promises
	/// one byte at a time, so this collects byte by byte; empty polls cost
	/// an attempt, successful reads do not.
	fn get_4_bytes(&mut self) -> Result<[u8; 4], CarrtError> {
		let mut bytes = [0u8; 4];
		let mut have = 0;
		let mut attempts = 0;
		while have < 4 && attempts < MAX_READ_ATTEMPTS {
			match self.poll_byte() {
				Some(byte) => {
					bytes[have] = byte;
					have += 1;
				}
				None => {
					self.pause();
					attempts += 1;
				}
			}
		}

		if have == 4 {
			Ok(bytes)
		} else {
			Err(CarrtError::new(
				make_shared_error_id(ErrorModule::SerialMessage, 3, have as i32),
				ErrorKind::TruncatedFrame,
			))
		}
	}

	fn put_byte(&mut self, byte: u8) -> Result<(), CarrtError> {
		self.put_bytes(&[byte])
	}

	fn put_4_bytes(&mut self, bytes: [u8; 4]) -> Result<(), CarrtError> {
		self.put_bytes(&bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestLink;

	#[test]
	fn try_get_id_is_non_blocking() {
		let mut link = TestLink::new();
		assert_eq!(link.try_get_id(), None);
		link.push_inbound(&[0x2A]);
		assert_eq!(link.try_get_id(), Some(0x2A));
		assert_eq!(link.try_get_id(), None);
	}

	#[test]
	fn body_reads_fail_after_bounded_retries() {
		let mut link = TestLink::new();
		let err = link.get_byte().unwrap_err();
		assert_eq!(err.kind, ErrorKind::TruncatedFrame);
		assert_eq!(link.pauses(), MAX_READ_ATTEMPTS);
	}

	#[test]
	fn partial_field_is_a_truncated_frame() {
		let mut link = TestLink::new();
		link.push_inbound(&[1, 2, 3]);
		let err = link.get_4_bytes().unwrap_err();
		assert_eq!(err.kind, ErrorKind::TruncatedFrame);
	}

	#[test]
	fn full_field_costs_no_attempts() {
		let mut link = TestLink::new();
		link.push_inbound(&[1, 2, 3, 4]);
		assert_eq!(link.get_4_bytes().unwrap(), [1, 2, 3, 4]);
		assert_eq!(link.pauses(), 0);
	}
}
