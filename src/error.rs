//! Error taxonomy for the flashing session.
//!
//! A read that simply saw no data is not an error here: the bounded read on
//! the serial link reports it as a timed-out outcome and the monitor loop
//! keeps polling. Everything that can actually go wrong gets a
//! named variant so the log output tells the operator which boundary failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlashError {
    /// The serial device could not be opened, even after retries.
    #[error("could not open serial device `{path}`: {source}")]
    DeviceOpen {
        path: String,
        source: serialport::Error,
    },

    /// The device opened but refused the requested line configuration.
    #[error("could not configure serial device: {0}")]
    DeviceConfig(#[source] serialport::Error),

    /// A console command write completed only partially. Console commands are
    /// a handful of bytes, so a partial write means the link is unhealthy and
    /// retrying bytes mid-command would only confuse the bootloader.
    #[error("short write to console: {written} of {wanted} bytes")]
    ShortWrite { wanted: usize, written: usize },

    /// A console command write failed outright.
    #[error("console write failed: {0}")]
    Write(#[source] std::io::Error),

    /// The console sent more than a line buffer's worth of bytes without a
    /// line terminator. The partial line is discarded.
    #[error("console line exceeds {max} bytes, discarded")]
    LineTooLong { max: usize },

    /// The external alert program could not be launched.
    #[error("failed to launch alert command `{command}`: {source}")]
    AlertLaunch {
        command: String,
        source: std::io::Error,
    },
}
