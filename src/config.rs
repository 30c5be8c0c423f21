//! Build-time constants for the embedded node.

/// Capacity of each event queue (one per priority).
pub const EVENT_QUEUE_DEPTH: usize = 24;

/// Capacity of the Core-D → Core-T request channel.
pub const CORE1_QUEUE_DEPTH: usize = 8;

/// Maximum one-shot alarms Core-T will hold armed at once.
pub const CORE1_ALARM_SLOTS: usize = 4;

/// Handshake word Core-T pushes after a successful start.
pub const CORE1_SUCCESS: u32 = 1234;

/// Handshake word Core-T pushes when its timer could not be started.
pub const CORE1_FAILURE: u32 = 21;

/// Minimum interval between accepted edges on an encoder pin.
pub const GPIO_DEBOUNCE_MS: u32 = 10;

/// Core-D sleep when both the link and the event queues are idle.
pub const IDLE_SLEEP_MS: u32 = 10;

/// Core-T sleep between channel-drain passes.
pub const CORE1_IDLE_SLEEP_MS: u32 = 10;

/// Period of the navigation timer.
pub const NAV_TIMER_PERIOD_MS: u32 = 125;

/// Drain time between the reset announcement and the watchdog reboot.
pub const RESET_ANNOUNCE_DELAY_MS: u32 = 100;

/// The IMU needs this long after a power-on reset before `init` may run.
pub const BNO055_WAIT_AFTER_RESET_MS: u32 = 650;

/// Settle time inside the IMU init sequence.
pub const BNO055_INIT_SETTLE_MS: u32 = 600;

/// I²C address of the IMU.
pub const BNO055_I2C_ADDR: u8 = 0x28;

// Pin and bus assignments. The serial link runs on UART1, the peripheral
// network on I2C0 at 400 kHz.
pub const SERIAL_LINK_BAUD: u32 = 115_200;
pub const SERIAL_LINK_TX_GPIO: u8 = 4;
pub const SERIAL_LINK_RX_GPIO: u8 = 5;
pub const I2C_SDA_GPIO: u8 = 8;
pub const I2C_SCL_GPIO: u8 = 9;
pub const I2C_SPEED_HZ: u32 = 400_000;
pub const ENCODER_LEFT_GPIO: u8 = 20;
pub const ENCODER_RIGHT_GPIO: u8 = 19;

// Battery sense inputs.
pub const IC_BATTERY_ADC_CHANNEL: u8 = 0;
pub const MOTOR_BATTERY_ADC_CHANNEL: u8 = 1;
