//! The CARRT host node.
//!
//! The host end of the serial link: single threaded, driven by a poll
//! pump over the same message registry the embedded node uses. Inbound
//! telemetry lands in a [`RoverStatus`] snapshot for the mission logic to
//! read; outbound control traffic goes through the [`Commander`].
//!
//! Mission logic, mapping, and the user interface sit above this crate.

pub mod buzzer;
pub mod commander;
pub mod link;
pub mod messages;
pub mod pump;
pub mod status;

pub use self::buzzer::AlertBuzzer;
pub use self::commander::Commander;
pub use self::link::StdLink;
pub use self::messages::HostContext;
pub use self::pump::HostPump;
pub use self::status::RoverStatus;
