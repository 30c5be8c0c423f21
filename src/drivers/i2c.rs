//! SMBus-style access to the peripheral I²C network.
//!
//! The devices on the bus are all register-addressed, so the contract is
//! the usual SMBus set rather than raw transfers. Block operations are
//! capped at 32 bytes. `read_without_restart` exists for devices that
//! mishandle the I²C repeated-start: it sends the register address as its
//! own write transaction and then reads with no intervening restart
//! condition.

use embedded_hal::i2c::I2c;

use carrt_link::{make_pico_error_id, CarrtError, ErrorKind, ErrorModule};

/// Block transfers are limited to this many bytes.
pub const I2C_BLOCK_MAX: usize = 32;

/// The bus as the drivers see it.
pub trait SmbusBus {
	fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), CarrtError>;

	fn write_byte_data(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), CarrtError>;

	fn write_word_data(&mut self, addr: u8, reg: u8, value: u16) -> Result<(), CarrtError>;

	fn write_block_data(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), CarrtError>;

	fn read_byte_data(&mut self, addr: u8, reg: u8) -> Result<u8, CarrtError>;

	fn read_word_data(&mut self, addr: u8, reg: u8) -> Result<u16, CarrtError>;

	fn read_block_data(&mut self, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), CarrtError>;

	/// Register read for repeated-start-intolerant devices: address write,
	/// stop, then the data read as a separate transaction.
	fn read_without_restart(
		&mut self,
		addr: u8,
		reg: u8,
		buf: &mut [u8],
	) -> Result<(), CarrtError>;
}

fn bus_error(function: u8, addr: u8) -> CarrtError {
	CarrtError::new(
		make_pico_error_id(ErrorModule::I2c, function, addr.into()),
		ErrorKind::I2c,
	)
}

fn block_too_long(function: u8, len: usize) -> CarrtError {
	CarrtError::new(
		make_pico_error_id(ErrorModule::I2c, function, len as i32),
		ErrorKind::I2c,
	)
}

/// Adapter from any `embedded-hal` I²C master to the SMBus contract.
pub struct SmbusI2c<T> {
	bus: T,
}

impl<T> SmbusI2c<T> {
	pub fn new(bus: T) -> Self {
		Self { bus }
	}

	pub fn release(self) -> T {
		self.bus
	}
}

impl<T: I2c> SmbusBus for SmbusI2c<T> {
	fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), CarrtError> {
		self.bus.write(addr, &[value]).map_err(|_| bus_error(1, addr))
	}

	fn write_byte_data(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), CarrtError> {
		self.bus
			.write(addr, &[reg, value])
			.map_err(|_| bus_error(2, addr))
	}

	fn write_word_data(&mut self, addr: u8, reg: u8, value: u16) -> Result<(), CarrtError> {
		let [lo, hi] = value.to_le_bytes();
		self.bus
			.write(addr, &[reg, lo, hi])
			.map_err(|_| bus_error(3, addr))
	}

	fn write_block_data(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), CarrtError> {
		if data.len() > I2C_BLOCK_MAX {
			return Err(block_too_long(4, data.len()));
		}
		let mut frame = [0u8; I2C_BLOCK_MAX + 1];
		frame[0] = reg;
		frame[1..=data.len()].copy_from_slice(data);
		self.bus
			.write(addr, &frame[..=data.len()])
			.map_err(|_| bus_error(4, addr))
	}

	fn read_byte_data(&mut self, addr: u8, reg: u8) -> Result<u8, CarrtError> {
		let mut buf = [0u8; 1];
		self.bus
			.write_read(addr, &[reg], &mut buf)
			.map_err(|_| bus_error(5, addr))?;
		Ok(buf[0])
	}

	fn read_word_data(&mut self, addr: u8, reg: u8) -> Result<u16, CarrtError> {
		let mut buf = [0u8; 2];
		self.bus
			.write_read(addr, &[reg], &mut buf)
			.map_err(|_| bus_error(6, addr))?;
		Ok(u16::from_le_bytes(buf))
	}

	fn read_block_data(&mut self, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), CarrtError> {
		if buf.len() > I2C_BLOCK_MAX {
			return Err(block_too_long(7, buf.len()));
		}
		self.bus
			.write_read(addr, &[reg], buf)
			.map_err(|_| bus_error(7, addr))
	}

	fn read_without_restart(
		&mut self,
		addr: u8,
		reg: u8,
		buf: &mut [u8],
	) -> Result<(), CarrtError> {
		if buf.len() > I2C_BLOCK_MAX {
			return Err(block_too_long(8, buf.len()));
		}
		// Two independent transactions, deliberately: no repeated start.
		self.bus.write(addr, &[reg]).map_err(|_| bus_error(8, addr))?;
		self.bus.read(addr, buf).map_err(|_| bus_error(8, addr))
	}
}
