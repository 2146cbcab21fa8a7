//! Serial port device manipulation.
//!
//! The bootloader console is an unreliable, character-at-a-time stream:
//! reads are non-blocking polls of the port's input buffer (so a read call
//! never wedges on a silent board), and outbound console commands are a
//! handful of bytes that either go out whole or are reported as failed.

use std::io::{Read, Write};
use std::{thread, time::Duration, time::Instant};

use log::{debug, info, trace, warn};
use serialport::SerialPort;

use crate::{error::FlashError, Settings};

/// Baud rates the transport accepts, the classic termios set.
const SUPPORTED_BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115_200, 230_400,
];

/// Used when the requested baud rate is not in the supported table.
const FALLBACK_BAUD: u32 = 57_600;

/// Spacing between polls of the port's input buffer while waiting for a byte.
const POLL_SLEEP: Duration = Duration::from_millis(2);

//==============================================================================
// Crate-Public Interface
//==============================================================================

/// Outcome of one bounded read attempt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    Byte(u8),
    /// No byte arrived within the allotted time. Not an error: the caller
    /// simply polls again.
    TimedOut,
}

/// Outbound side of the console as the flashing state machine sees it.
///
/// The pacing pauses go through the link too, so a test double can record
/// them instead of sleeping.
pub(crate) trait ConsoleLink {
    /// Send a console command, whole or not at all. A partial write is
    /// [`FlashError::ShortWrite`] and is not retried; the board's console
    /// reveals a dropped command by never printing the next expected line.
    fn send(&mut self, bytes: &[u8]) -> Result<(), FlashError>;

    /// Block for the given duration between command bytes.
    fn pause(&mut self, wait: Duration);
}

/// An open, configured serial console session. Owned by the session for the
/// life of the process; never closed explicitly.
pub(crate) struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open and configure the device named in `settings`: 8-N-1 framing, no
    /// flow control, raw byte-level access (the `serialport` crate disables
    /// canonical processing, echo and signal generation on open). A baud
    /// rate outside the supported table falls back to 57600.
    ///
    /// The open is retried a few times with a fixed delay; boards enumerate
    /// their USB serial adapter a moment after being plugged in.
    pub(crate) fn open(settings: &Settings) -> Result<Self, FlashError> {
        use retry::{delay, retry_with_index};

        let path = settings.path.clone().unwrap_or_default();
        let baud_rate = normalize_baud(settings.baud_rate);

        let result = retry_with_index(
            delay::Fixed::from_millis(1000).take(4),
            |index| -> Result<Box<dyn SerialPort>, serialport::Error> {
                debug!("Trying to connect {}", index);
                serialport::new(&path, baud_rate)
                    .data_bits(settings.data_bits)
                    .stop_bits(settings.stop_bits)
                    .parity(settings.parity)
                    .flow_control(settings.flow_control)
                    .open()
            },
        );

        let mut port = match result {
            Ok(port) => port,
            Err(retry::Error::Operation {
                error,
                total_delay,
                tries,
            }) => {
                info!(
                    "Failed to open the port after {:?} and {} tries: {}",
                    total_delay, tries, error,
                );
                return Err(FlashError::DeviceOpen {
                    path,
                    source: error,
                });
            }
            Err(retry::Error::Internal(msg)) => {
                info!("Internal retry error while opening port: {}", msg);
                return Err(FlashError::DeviceOpen {
                    path,
                    source: serialport::Error {
                        kind: serialport::ErrorKind::Unknown,
                        description: msg,
                    },
                });
            }
        };

        // Re-apply the line configuration after open; some platforms only
        // honor it on the open handle.
        port.set_baud_rate(baud_rate)
            .map_err(FlashError::DeviceConfig)?;
        port.set_data_bits(settings.data_bits)
            .map_err(FlashError::DeviceConfig)?;
        port.set_stop_bits(settings.stop_bits)
            .map_err(FlashError::DeviceConfig)?;
        port.set_parity(settings.parity)
            .map_err(FlashError::DeviceConfig)?;
        port.set_flow_control(settings.flow_control)
            .map_err(FlashError::DeviceConfig)?;

        info!("Connected to {} at {} baud", path, baud_rate);
        debug!("data_bits    : {:#?}", settings.data_bits);
        debug!("stop_bits    : {:#?}", settings.stop_bits);
        debug!("parity       : {:#?}", settings.parity);
        debug!("flow control : {:#?}", settings.flow_control);

        Ok(SerialLink { port })
    }

    /// Wait up to `timeout` for one byte from the console.
    ///
    /// To handle the unreliable behavior of blocking/non-blocking reads over
    /// the serial port, the input buffer level is checked first and a byte is
    /// only read when one is known to be there, so the read itself always
    /// returns immediately. While waiting, `on_idle` is invoked at most once
    /// per `idle_tick` to keep the operator's liveness indicator moving.
    pub(crate) fn read_byte(
        &mut self,
        timeout: Duration,
        idle_tick: Duration,
        on_idle: &mut dyn FnMut(),
    ) -> Result<ReadOutcome, serialport::Error> {
        let started = Instant::now();
        let mut last_tick = started;

        loop {
            let available = self.port.bytes_to_read()?;
            if available > 0 {
                trace!("Bytes available to read: {}", available);
                let mut byte = [0u8; 1];
                self.port.read_exact(&mut byte).map_err(|e| serialport::Error {
                    kind: serialport::ErrorKind::Io(e.kind()),
                    description: e.to_string(),
                })?;
                return Ok(ReadOutcome::Byte(byte[0]));
            }

            if started.elapsed() >= timeout {
                return Ok(ReadOutcome::TimedOut);
            }
            if last_tick.elapsed() >= idle_tick {
                on_idle();
                last_tick = Instant::now();
            }

            thread::sleep(POLL_SLEEP);
        }
    }

    pub(crate) fn port_name(&self) -> Option<String> {
        self.port.name()
    }

    pub(crate) fn baud(&self) -> Option<u32> {
        self.port.baud_rate().ok()
    }
}

impl ConsoleLink for SerialLink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), FlashError> {
        let written = self.port.write(bytes).map_err(FlashError::Write)?;
        if written != bytes.len() {
            return Err(FlashError::ShortWrite {
                wanted: bytes.len(),
                written,
            });
        }
        trace!("{} bytes written to serial port", written);
        Ok(())
    }

    fn pause(&mut self, wait: Duration) {
        thread::sleep(wait);
    }
}

/// Clamp a requested baud rate to the supported table.
pub(crate) fn normalize_baud(requested: u32) -> u32 {
    if SUPPORTED_BAUD_RATES.contains(&requested) {
        requested
    } else {
        warn!(
            "unsupported baud rate {}, falling back to {}",
            requested, FALLBACK_BAUD
        );
        FALLBACK_BAUD
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_baud_rates_pass_through() {
        assert_eq!(normalize_baud(115_200), 115_200);
        assert_eq!(normalize_baud(50), 50);
        assert_eq!(normalize_baud(230_400), 230_400);
    }

    #[test]
    fn unsupported_baud_rates_fall_back() {
        assert_eq!(normalize_baud(0), 57_600);
        assert_eq!(normalize_baud(12_345), 57_600);
        assert_eq!(normalize_baud(1_000_000), 57_600);
    }
}
