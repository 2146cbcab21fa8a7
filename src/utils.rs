//! Boundary helpers: the serial console link and the operator alert.

mod alert;
mod ports;

pub(crate) use alert::{CommandNotifier, Notifier};
pub(crate) use ports::{ConsoleLink, ReadOutcome, SerialLink};
