//! Thin driver for the BNO055 absolute-orientation IMU.
//!
//! Only what the event core consumes: bring-up, reset trigger, fused Euler
//! heading, and the four calibration scores. The part is known to mishandle
//! I²C repeated starts, so every register read goes through
//! `read_without_restart`.

use embedded_hal::delay::DelayNs;
use log::info;

use carrt_link::{make_pico_error_id, CalibrationScores, CarrtError, ErrorKind, ErrorModule};

use crate::config::{BNO055_I2C_ADDR, BNO055_INIT_SETTLE_MS};
use crate::drivers::i2c::SmbusBus;
use crate::drivers::Inertial;

const REG_CHIP_ID: u8 = 0x00;
const REG_PAGE_ID: u8 = 0x07;
const REG_EULER_H_LSB: u8 = 0x1A;
const REG_CALIB_STAT: u8 = 0x35;
const REG_OPR_MODE: u8 = 0x3D;
const REG_PWR_MODE: u8 = 0x3E;
const REG_SYS_TRIGGER: u8 = 0x3F;

const CHIP_ID: u8 = 0xA0;
const MODE_CONFIG: u8 = 0x00;
const MODE_NDOF: u8 = 0x0C;
const PWR_NORMAL: u8 = 0x00;
const TRIGGER_RST_SYS: u8 = 0x20;

/// Mode switches need a short settle per the datasheet.
const MODE_SWITCH_MS: u32 = 25;

pub struct Bno055<B, D> {
	bus: B,
	delay: D,
	addr: u8,
}

impl<B: SmbusBus, D: DelayNs> Bno055<B, D> {
	pub fn new(bus: B, delay: D) -> Self {
		Self {
			bus,
			delay,
			addr: BNO055_I2C_ADDR,
		}
	}

	fn read_reg(&mut self, reg: u8) -> Result<u8, CarrtError> {
		let mut buf = [0u8; 1];
		self.bus.read_without_restart(self.addr, reg, &mut buf)?;
		Ok(buf[0])
	}
}

impl<B: SmbusBus, D: DelayNs> Inertial for Bno055<B, D> {
	fn init(&mut self) -> Result<(), CarrtError> {
		let chip_id = self.read_reg(REG_CHIP_ID)?;
		if chip_id != CHIP_ID {
			return Err(CarrtError::new(
				make_pico_error_id(ErrorModule::I2c, 9, chip_id.into()),
				ErrorKind::I2c,
			));
		}

		self.bus.write_byte_data(self.addr, REG_PAGE_ID, 0)?;
		self.bus
			.write_byte_data(self.addr, REG_OPR_MODE, MODE_CONFIG)?;
		self.delay.delay_ms(MODE_SWITCH_MS);
		self.bus
			.write_byte_data(self.addr, REG_PWR_MODE, PWR_NORMAL)?;
		self.bus.write_byte_data(self.addr, REG_SYS_TRIGGER, 0)?;
		self.bus
			.write_byte_data(self.addr, REG_OPR_MODE, MODE_NDOF)?;

		// Fusion start-up; the handlers rely on init being safe to follow
		// immediately with calibration traffic.
		self.delay.delay_ms(BNO055_INIT_SETTLE_MS);

		info!("BNO055 initialized in NDOF mode");
		Ok(())
	}

	fn reset(&mut self) -> Result<(), CarrtError> {
		// The device drops off the bus while rebooting; the caller waits
		// out the post-reset interval before calling `init` again.
		self.bus
			.write_byte_data(self.addr, REG_SYS_TRIGGER, TRIGGER_RST_SYS)
	}

	fn heading(&mut self) -> Result<f32, CarrtError> {
		let mut buf = [0u8; 2];
		self.bus
			.read_without_restart(self.addr, REG_EULER_H_LSB, &mut buf)?;
		// 1 degree = 16 LSB in the fused Euler output.
		Ok(f32::from(u16::from_le_bytes(buf)) / 16.0)
	}

	fn calibration(&mut self) -> Result<CalibrationScores, CarrtError> {
		let stat = self.read_reg(REG_CALIB_STAT)?;
		Ok(CalibrationScores::new(
			stat & 0x03,
			(stat >> 2) & 0x03,
			(stat >> 4) & 0x03,
			(stat >> 6) & 0x03,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Register-level fake of the device.
	struct FakeChip {
		regs: [u8; 0x40],
	}

	impl FakeChip {
		fn new() -> Self {
			let mut regs = [0u8; 0x40];
			regs[REG_CHIP_ID as usize] = CHIP_ID;
			Self { regs }
		}
	}

	impl SmbusBus for FakeChip {
		fn write_byte(&mut self, _addr: u8, _value: u8) -> Result<(), CarrtError> {
			Ok(())
		}

		fn write_byte_data(&mut self, _addr: u8, reg: u8, value: u8) -> Result<(), CarrtError> {
			self.regs[reg as usize] = value;
			Ok(())
		}

		fn write_word_data(&mut self, _addr: u8, reg: u8, value: u16) -> Result<(), CarrtError> {
			let [lo, hi] = value.to_le_bytes();
			self.regs[reg as usize] = lo;
			self.regs[reg as usize + 1] = hi;
			Ok(())
		}

		fn write_block_data(&mut self, _addr: u8, reg: u8, data: &[u8]) -> Result<(), CarrtError> {
			for (i, b) in data.iter().enumerate() {
				self.regs[reg as usize + i] = *b;
			}
			Ok(())
		}

		fn read_byte_data(&mut self, _addr: u8, reg: u8) -> Result<u8, CarrtError> {
			Ok(self.regs[reg as usize])
		}

		fn read_word_data(&mut self, _addr: u8, reg: u8) -> Result<u16, CarrtError> {
			Ok(u16::from_le_bytes([
				self.regs[reg as usize],
				self.regs[reg as usize + 1],
			]))
		}

		fn read_block_data(
			&mut self,
			_addr: u8,
			reg: u8,
			buf: &mut [u8],
		) -> Result<(), CarrtError> {
			for (i, slot) in buf.iter_mut().enumerate() {
				*slot = self.regs[reg as usize + i];
			}
			Ok(())
		}

		fn read_without_restart(
			&mut self,
			addr: u8,
			reg: u8,
			buf: &mut [u8],
		) -> Result<(), CarrtError> {
			self.read_block_data(addr, reg, buf)
		}
	}

	struct NoDelay;

	impl DelayNs for NoDelay {
		fn delay_ns(&mut self, _ns: u32) {}
	}

	#[test]
	fn init_lands_in_ndof_mode() {
		let mut imu = Bno055::new(FakeChip::new(), NoDelay);
		imu.init().unwrap();
		assert_eq!(imu.bus.regs[REG_OPR_MODE as usize], MODE_NDOF);
		assert_eq!(imu.bus.regs[REG_PWR_MODE as usize], PWR_NORMAL);
	}

	#[test]
	fn init_rejects_a_foreign_chip() {
		let mut chip = FakeChip::new();
		chip.regs[REG_CHIP_ID as usize] = 0x55;
		let mut imu = Bno055::new(chip, NoDelay);
		assert!(imu.init().is_err());
	}

	#[test]
	fn heading_scales_euler_lsb() {
		let mut chip = FakeChip::new();
		// 180.0° = 2880 LSB.
		chip.regs[REG_EULER_H_LSB as usize] = (2880u16 & 0xFF) as u8;
		chip.regs[REG_EULER_H_LSB as usize + 1] = (2880u16 >> 8) as u8;
		let mut imu = Bno055::new(chip, NoDelay);
		let heading = imu.heading().unwrap();
		assert!((heading - 180.0).abs() < f32::EPSILON);
	}

	#[test]
	fn calibration_unpacks_the_status_byte() {
		let mut chip = FakeChip::new();
		// sys=2, gyro=3, accel=1, mag=0.
		chip.regs[REG_CALIB_STAT as usize] = 0b10_11_01_00;
		let mut imu = Bno055::new(chip, NoDelay);
		let scores = imu.calibration().unwrap();
		assert_eq!(scores.mag, 0);
		assert_eq!(scores.accel, 1);
		assert_eq!(scores.gyro, 3);
		assert_eq!(scores.system, 2);
	}

	#[test]
	fn reset_pulls_the_system_reset_trigger() {
		let mut imu = Bno055::new(FakeChip::new(), NoDelay);
		imu.reset().unwrap();
		assert_eq!(imu.bus.regs[REG_SYS_TRIGGER as usize], TRIGGER_RST_SYS);
	}
}
