//! Control-plane value types: telemetry masks and small id enums.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
	/// Which periodic outbound streams the embedded node should emit.
	///
	/// Carried by `MsgControlMsg` (all bits) and `TimerControlMsg` (the
	/// three timer bits only). `0x00` silences everything, `0xFF` enables
	/// everything.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct MsgMask: u8 {
		const QTR_SEC_TIMER = 0x01;
		const ONE_SEC_TIMER = 0x02;
		const EIGHT_SEC_TIMER = 0x04;
		const NAV = 0x08;
		const NAV_STATUS = 0x10;
		const ENCODER = 0x20;
		const CALIBRATION = 0x40;
		const BATTERY = 0x80;
	}
}

/// Which timer stream a `TimerEventMsg` belongs to, in eighth-second units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TimerWhich {
	QuarterSecond = 1,
	OneSecond = 4,
	EightSecond = 32,
}

/// Which battery a level request or update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BatteryId {
	Ic = 0,
	Motor = 1,
	Both = 2,
}

/// Host-reported driving state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum DriveState {
	Stopped = 0,
	Forward = 1,
	Backward = 2,
	Left = 3,
	Right = 4,
}

/// Which wheel an encoder update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EncoderSide {
	Left = 0,
	Right = 1,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mask_bits_match_the_wire_assignment() {
		assert_eq!(MsgMask::QTR_SEC_TIMER.bits(), 0x01);
		assert_eq!(MsgMask::ONE_SEC_TIMER.bits(), 0x02);
		assert_eq!(MsgMask::EIGHT_SEC_TIMER.bits(), 0x04);
		assert_eq!(MsgMask::NAV.bits(), 0x08);
		assert_eq!(MsgMask::NAV_STATUS.bits(), 0x10);
		assert_eq!(MsgMask::ENCODER.bits(), 0x20);
		assert_eq!(MsgMask::CALIBRATION.bits(), 0x40);
		assert_eq!(MsgMask::BATTERY.bits(), 0x80);
		assert_eq!(MsgMask::all().bits(), 0xFF);
	}

	#[test]
	fn timer_stream_tags_count_eighth_seconds() {
		assert_eq!(u8::from(TimerWhich::QuarterSecond), 1);
		assert_eq!(u8::from(TimerWhich::OneSecond), 4);
		assert_eq!(u8::from(TimerWhich::EightSecond), 32);
	}
}
