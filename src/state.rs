//! System-wide state for the embedded node.
//!
//! Almost every flag here is owned by Core-D: written by message actions,
//! read by event handlers, all on the dispatch loop. Those are plain fields
//! behind `&mut`. The one exception is `calibration_in_progress`, which the
//! Core-T timer tick reads to decide whether to emit calibration-info
//! events, so it lives in a process-wide [`CoreAtomic`].
//!
//! Setters return the prior value so callers can observe edges without a
//! second read.

use crate::synch::CoreAtomic;

static CALIBRATION_IN_PROGRESS: CoreAtomic<bool> = CoreAtomic::new(false);

/// Whether an IMU calibration cycle is running. Readable from either core.
pub fn calibration_in_progress() -> bool {
	CALIBRATION_IN_PROGRESS.load()
}

/// Sets the calibration-cycle flag and returns the prior value.
pub fn set_calibration_in_progress(on: bool) -> bool {
	CALIBRATION_IN_PROGRESS.exchange(on)
}

/// The Core-D-owned flags.
#[derive(Debug, Default)]
pub struct PicoState {
	send_qtr_sec_timer_msgs: bool,
	send_1_sec_timer_msgs: bool,
	send_8_sec_timer_msgs: bool,
	send_nav_msgs: bool,
	send_nav_status_msgs: bool,
	send_encoder_msgs: bool,
	send_calibration_msgs: bool,
	send_battery_msgs: bool,

	start_up_finished: bool,
	nav_calibrated: bool,
	auto_calibrate: bool,
}

macro_rules! flag_accessors {
	($($(#[$meta:meta])* $field:ident => $setter:ident / $getter:ident),+ $(,)?) => {
		$(
			$(#[$meta])*
			pub fn $setter(&mut self, new_val: bool) -> bool {
				let old_val = self.$field;
				self.$field = new_val;
				old_val
			}

			pub fn $getter(&self) -> bool {
				self.$field
			}
		)+
	};
}

impl PicoState {
	/// The start-up state: everything off. Must run exactly once, before
	/// the dispatcher starts, so both cores begin from a known state; it
	/// also clears the cross-core calibration flag.
	pub fn init() -> Self {
		CALIBRATION_IN_PROGRESS.store(false);
		Self::default()
	}

	flag_accessors! {
		send_qtr_sec_timer_msgs => send_qtr_sec_timer_msgs / want_qtr_sec_timer_msgs,
		send_1_sec_timer_msgs => send_1_sec_timer_msgs / want_1_sec_timer_msgs,
		send_8_sec_timer_msgs => send_8_sec_timer_msgs / want_8_sec_timer_msgs,
		send_nav_msgs => send_nav_msgs / want_nav_msgs,
		send_nav_status_msgs => send_nav_status_msgs / want_nav_status_msgs,
		send_encoder_msgs => send_encoder_msgs / want_encoder_msgs,
		send_calibration_msgs => send_calibration_msgs / want_calibration_msgs,
		send_battery_msgs => send_battery_msgs / want_battery_msgs,
		/// Goes up once the IMU init completes; cleared by an IMU reset.
		start_up_finished => start_up_finished / is_start_up_finished,
		/// The current calibration verdict; re-evaluated on every
		/// calibration-info pass.
		nav_calibrated => nav_calibrated / is_nav_calibrated,
		auto_calibrate => set_auto_calibrate / want_auto_calibrate,
	}

	/// Sets the three timer-stream flags at once.
	pub fn send_all_timer_msgs(&mut self, new_val: bool) {
		self.send_qtr_sec_timer_msgs = new_val;
		self.send_1_sec_timer_msgs = new_val;
		self.send_8_sec_timer_msgs = new_val;
	}

	/// Sets every telemetry flag at once.
	pub fn send_all_msgs(&mut self, new_val: bool) {
		self.send_all_timer_msgs(new_val);
		self.send_nav_msgs = new_val;
		self.send_nav_status_msgs = new_val;
		self.send_encoder_msgs = new_val;
		self.send_calibration_msgs = new_val;
		self.send_battery_msgs = new_val;
	}
}
