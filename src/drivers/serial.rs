//! The embedded node's end of the serial link.
//!
//! A thin adapter from any `embedded-io` UART to the shared [`SerialLink`]
//! contract. The SDK-level UART has no error reporting on reads, so a read
//! failure here is treated as "nothing available"; write failures are
//! surfaced, though on the target they cannot happen either.

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};

use carrt_link::{make_pico_error_id, CarrtError, ErrorKind, ErrorModule, SerialLink};

/// Backoff between body-read attempts.
const READ_PAUSE_US: u32 = 50;

pub struct UartLink<U, D> {
	uart: U,
	delay: D,
}

impl<U, D> UartLink<U, D> {
	pub fn new(uart: U, delay: D) -> Self {
		Self { uart, delay }
	}
}

impl<U, D> SerialLink for UartLink<U, D>
where
	U: Read + ReadReady + Write,
	D: DelayNs,
{
	fn poll_byte(&mut self) -> Option<u8> {
		// Reads block, so only read once readiness is confirmed.
		match self.uart.read_ready() {
			Ok(true) => {
				let mut byte = [0u8; 1];
				match self.uart.read(&mut byte) {
					Ok(1..) => Some(byte[0]),
					_ => None,
				}
			}
			_ => None,
		}
	}

	fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), CarrtError> {
		self.uart.write_all(bytes).map_err(|_| {
			CarrtError::new(
				make_pico_error_id(ErrorModule::SerialMessage, 7, 0),
				ErrorKind::WriteFailed,
			)
		})
	}

	fn pause(&mut self) {
		self.delay.delay_us(READ_PAUSE_US);
	}
}

#[cfg(test)]
mod tests {
	use core::convert::Infallible;

	use embedded_io::ErrorType;

	use super::*;

	#[derive(Default)]
	struct FakeUart {
		inbound: std::collections::VecDeque<u8>,
		outbound: std::vec::Vec<u8>,
	}

	impl ErrorType for FakeUart {
		type Error = Infallible;
	}

	impl Read for FakeUart {
		fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
			match self.inbound.pop_front() {
				Some(byte) => {
					buf[0] = byte;
					Ok(1)
				}
				None => Ok(0),
			}
		}
	}

	impl ReadReady for FakeUart {
		fn read_ready(&mut self) -> Result<bool, Infallible> {
			Ok(!self.inbound.is_empty())
		}
	}

	impl Write for FakeUart {
		fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
			self.outbound.extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> Result<(), Infallible> {
			Ok(())
		}
	}

	struct NoDelay;

	impl DelayNs for NoDelay {
		fn delay_ns(&mut self, _ns: u32) {}
	}

	#[test]
	fn polling_respects_readiness() {
		let mut link = UartLink::new(FakeUart::default(), NoDelay);
		assert_eq!(link.poll_byte(), None);

		link.uart.inbound.extend([0x07, 0x04]);
		assert_eq!(link.poll_byte(), Some(0x07));
		assert_eq!(link.poll_byte(), Some(0x04));
		assert_eq!(link.poll_byte(), None);
	}

	#[test]
	fn writes_pass_through_whole() {
		let mut link = UartLink::new(FakeUart::default(), NoDelay);
		link.put_bytes(&[1, 2, 3]).unwrap();
		link.put_byte(4).unwrap();
		assert_eq!(link.uart.outbound, vec![1, 2, 3, 4]);
	}

	#[test]
	fn body_reads_use_the_shared_retry_discipline() {
		let mut link = UartLink::new(FakeUart::default(), NoDelay);
		link.uart.inbound.extend(1234u32.to_le_bytes());
		assert_eq!(link.get_4_bytes().unwrap(), 1234u32.to_le_bytes());

		let err = link.get_byte().unwrap_err();
		assert_eq!(err.kind, ErrorKind::TruncatedFrame);
	}
}
