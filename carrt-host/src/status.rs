//! Latest-known state of the embedded node, as reported over the link.

use carrt_link::CalibrationScores;

/// One snapshot the inbound pump keeps current and the mission logic
/// reads. Every field is "latest received"; `None` means nothing has
/// arrived yet (or not since the last reboot announcement cleared it).
#[derive(Debug, Default, Clone)]
pub struct RoverStatus {
	/// Millisecond clock the embedded node reported at boot.
	pub boot_time: Option<u32>,
	/// Latest heading sample with its timestamp.
	pub heading: Option<(f32, u32)>,
	/// The current calibration verdict.
	pub nav_good: bool,
	/// Latest raw calibration scores.
	pub calibration: Option<CalibrationScores>,
	pub ic_battery_volts: Option<f32>,
	pub motor_battery_volts: Option<f32>,
	/// Net encoder edge counts per wheel since this snapshot was created.
	pub left_encoder_count: i64,
	pub right_encoder_count: i64,
	/// Latest timer event per stream: `(count, time)`.
	pub quarter_second: Option<(i32, u32)>,
	pub one_second: Option<(i32, u32)>,
	pub eight_second: Option<(i32, u32)>,
	/// The embedded node demanded an immediate stop.
	pub stop_requested: bool,
	/// The embedded node announced it is about to reboot.
	pub rebooting: bool,
	/// A battery dropped below its floor: `(battery id, volts)`.
	pub battery_low: Option<(u8, f32)>,
	/// Latest error report: `(fatal, code, time)`.
	pub last_error: Option<(bool, i32, u32)>,
}

impl RoverStatus {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resets the fields a reboot invalidates while keeping odometry.
	pub fn note_reboot_pending(&mut self) {
		self.rebooting = true;
		self.boot_time = None;
		self.heading = None;
		self.nav_good = false;
		self.calibration = None;
	}

	/// A `PicoReady` ends any pending reboot.
	pub fn note_boot(&mut self, time: u32) {
		self.boot_time = Some(time);
		self.rebooting = false;
		self.stop_requested = false;
	}
}
