//! The host's end of the serial link over `std::io`.
//!
//! The serial device is expected to be opened in non-blocking mode (or
//! with a zero read timeout); `WouldBlock`/`TimedOut` reads map onto the
//! link contract's "nothing available".

use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::thread;
use std::time::Duration;

use log::warn;

use carrt_link::{make_rpi0_error_id, CarrtError, ErrorKind, ErrorModule, SerialLink};

const READ_PAUSE: Duration = Duration::from_micros(50);

pub struct StdLink<R, W> {
	reader: R,
	writer: W,
}

impl<R, W> StdLink<R, W> {
	pub fn new(reader: R, writer: W) -> Self {
		Self { reader, writer }
	}
}

impl<R: Read, W: Write> SerialLink for StdLink<R, W> {
	fn poll_byte(&mut self) -> Option<u8> {
		let mut byte = [0u8; 1];
		match self.reader.read(&mut byte) {
			Ok(0) => None,
			Ok(_) => Some(byte[0]),
			Err(err)
				if err.kind() == IoErrorKind::WouldBlock
					|| err.kind() == IoErrorKind::TimedOut =>
			{
				None
			}
			Err(err) => {
				warn!("serial read error: {err}");
				None
			}
		}
	}

	fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), CarrtError> {
		self.writer
			.write_all(bytes)
			.and_then(|()| self.writer.flush())
			.map_err(|err| {
				warn!("serial write error: {err}");
				CarrtError::new(
					make_rpi0_error_id(ErrorModule::SerialMessage, 7, 0),
					ErrorKind::WriteFailed,
				)
			})
	}

	fn pause(&mut self) {
		thread::sleep(READ_PAUSE);
	}
}
