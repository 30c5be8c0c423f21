//! Byte-exact wire codec.
//!
//! A frame is one id byte followed by the message's fields in declaration
//! order. Fields come from a closed set of fixed-width types: `u8` as one
//! byte, `i32`/`u32`/`f32` as four bytes little-endian (`f32` is IEEE-754
//! single precision). Anything narrower or wider is widened to one of these
//! at the message boundary. There is no framing, no checksum, and no
//! escaping; resynchronization after a fault is by rescanning for the next
//! recognizable id byte.

use crate::error::CarrtError;
use crate::id::MsgId;
use crate::link::SerialLink;

/// A fixed-width field that can cross the link.
///
/// Sealed by construction: exactly `u8`, `i32`, `u32` and `f32` implement
/// this, which is what keeps every message constant-size and allocation
/// free.
pub trait WireField: Sized {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError>;
	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError>;
}

impl WireField for u8 {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError> {
		link.get_byte()
	}

	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		link.put_byte(*self)
	}
}

impl WireField for u32 {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError> {
		Ok(u32::from_le_bytes(link.get_4_bytes()?))
	}

	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		link.put_4_bytes(self.to_le_bytes())
	}
}

impl WireField for i32 {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError> {
		Ok(i32::from_le_bytes(link.get_4_bytes()?))
	}

	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		link.put_4_bytes(self.to_le_bytes())
	}
}

impl WireField for f32 {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError> {
		Ok(f32::from_le_bytes(link.get_4_bytes()?))
	}

	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		link.put_4_bytes(self.to_le_bytes())
	}
}

/// A message body: an ordered tuple of [`WireField`]s.
pub trait WireTuple: Sized {
	fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError>;
	fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError>;
}

macro_rules! impl_wire_tuple {
	($($field:ident: $idx:tt),+) => {
		impl<$($field: WireField),+> WireTuple for ($($field,)+) {
			fn get(link: &mut dyn SerialLink) -> Result<Self, CarrtError> {
				Ok(($($field::get(link)?,)+))
			}

			fn put(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
				$(self.$idx.put(link)?;)+
				Ok(())
			}
		}
	};
}

impl_wire_tuple!(A: 0);
impl_wire_tuple!(A: 0, B: 1);
impl_wire_tuple!(A: 0, B: 1, C: 2);
impl_wire_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_wire_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);

/// The id-plus-body pair every data-bearing message is built around.
///
/// `send_out` writes the id byte and then the body; `read_in` assumes the
/// dispatcher has already consumed the id byte and reads exactly the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMessage<T: WireTuple> {
	pub id: MsgId,
	pub data: T,
}

impl<T: WireTuple> RawMessage<T> {
	pub fn new(id: MsgId, data: T) -> Self {
		Self { id, data }
	}

	pub fn read_in(&mut self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		self.data = T::get(link)?;
		Ok(())
	}

	pub fn send_out(&self, link: &mut dyn SerialLink) -> Result<(), CarrtError> {
		link.put_byte(self.id.into())?;
		self.data.put(link)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::TestLink;

	#[test]
	fn fields_are_little_endian() {
		let mut link = TestLink::new();
		let raw = RawMessage::new(MsgId::TimerEvent, (4u8, 3i32, 1234u32));
		raw.send_out(&mut link).unwrap();
		assert_eq!(
			link.sent(),
			&[0x07, 0x04, 0x03, 0x00, 0x00, 0x00, 0xD2, 0x04, 0x00, 0x00]
		);
	}

	#[test]
	fn negative_counts_are_twos_complement() {
		let mut link = TestLink::new();
		let raw = RawMessage::new(MsgId::EncoderUpdate, (1u8, -1i32, 0u32));
		raw.send_out(&mut link).unwrap();
		assert_eq!(
			link.sent(),
			&[0x11, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]
		);
	}

	#[test]
	fn body_round_trips() {
		let mut link = TestLink::new();
		let out = RawMessage::new(MsgId::DebugSerialLink, (1i32, 4u8, 16.25f32, 36u32));
		out.send_out(&mut link).unwrap();

		let sent = link.sent();
		link.push_inbound(&sent);
		assert_eq!(link.try_get_id(), Some(MsgId::DebugSerialLink.into()));

		let mut back = RawMessage::new(MsgId::DebugSerialLink, (0i32, 0u8, 0.0f32, 0u32));
		back.read_in(&mut link).unwrap();
		assert_eq!(back, out);
	}
}
