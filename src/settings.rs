//! Settings related to the mexflash serial session and flashing behavior.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values.

use std::time::Duration;

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

// =============================================================================
// Public Interface
// =============================================================================

/// Groups all settings for the serial console session and acts as a
/// [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
/// for the settings.
///
/// The framing defaults (8 data bits, no parity, 1 stop bit, no flow control)
/// match what the AP121 class bootloader console speaks and are not exposed
/// on the command line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The port name, usually the device path.
    pub path: Option<String>,
    /// The baud rate in symbols-per-second.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// External program launched when a board is ready to be swapped.
    pub alert_command: String,

    /// How long a single bounded read waits for a byte before reporting a
    /// timeout. A timeout is not an error, the monitor loop just polls again.
    pub read_timeout: Duration,

    /// Minimum spacing between idle liveness ticks while no data arrives.
    pub idle_tick: Duration,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```ignore
/// let settings = SettingsBuilder::default().path("/dev/ttyUSB0").finalize();
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl Default for SettingsBuilder {
    /// Start building the settings using default values and no path for the
    /// port.
    fn default() -> Self {
        SettingsBuilder {
            settings: Settings {
                path: None,
                baud_rate: 115_200,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                alert_command: "flash-alert".into(),
                read_timeout: Duration::from_secs(10),
                idle_tick: Duration::from_millis(500),
                _private_use_builder: (),
            },
        }
    }
}
impl SettingsBuilder {
    /// Set the path to the serial port
    pub fn path<'a>(mut self, path: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.path = Some(path.into().as_ref().to_owned());
        self
    }

    /// Set the baud rate in symbols-per-second
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    /// Set the external program launched to alert the operator
    pub fn alert_command<'a>(mut self, command: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.alert_command = command.into().as_ref().to_owned();
        self
    }

    /// Set the per-read timeout for the bounded serial read
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.settings.read_timeout = read_timeout;
        self
    }

    /// Set the spacing between idle liveness ticks
    pub fn idle_tick(mut self, idle_tick: Duration) -> Self {
        self.settings.idle_tick = idle_tick;
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::default().finalize();
    assert_eq!(
        settings,
        Settings {
            path: None,
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            alert_command: "flash-alert".into(),
            read_timeout: Duration::from_secs(10),
            idle_tick: Duration::from_millis(500),
            _private_use_builder: (),
        }
    )
}

#[test]
fn path() {
    let settings = SettingsBuilder::default().path("/dev/ttyUSB0").finalize();
    assert_eq!(settings.path.unwrap(), "/dev/ttyUSB0");
}

#[test]
fn baud_rate() {
    let baud_rate = 57_600;
    let settings = SettingsBuilder::default().baud_rate(baud_rate).finalize();
    assert_eq!(settings.baud_rate, baud_rate);
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Seven;
    let settings = SettingsBuilder::default().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn flow_control() {
    let flow_control = FlowControl::Hardware;
    let settings = SettingsBuilder::default()
        .flow_control(flow_control)
        .finalize();
    assert_eq!(settings.flow_control, flow_control);
}

#[test]
fn stop_bits() {
    let stop_bits = StopBits::Two;
    let settings = SettingsBuilder::default().stop_bits(stop_bits).finalize();
    assert_eq!(settings.stop_bits, stop_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::default().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn alert_command() {
    let settings = SettingsBuilder::default()
        .alert_command("beep-loudly")
        .finalize();
    assert_eq!(settings.alert_command, "beep-loudly");
}

#[test]
fn read_timeout() {
    let settings = SettingsBuilder::default()
        .read_timeout(Duration::from_millis(20))
        .finalize();
    assert_eq!(settings.read_timeout, Duration::from_millis(20));
}

#[test]
fn idle_tick() {
    let settings = SettingsBuilder::default()
        .idle_tick(Duration::from_millis(100))
        .finalize();
    assert_eq!(settings.idle_tick, Duration::from_millis(100));
}
