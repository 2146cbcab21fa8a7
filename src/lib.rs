//! Mexflash babysits the production line for mesh-extender boards: it watches
//! the board's U-Boot console over a serial line, recognizes the bootloader
//! banners, and drives the flashing command sequence so the operator only has
//! to plug a board in, wait for the alert, and swap it for the next one.
//!
//! The tool handles two kinds of boards in a single two-phase cycle:
//!
//! * A board still running the factory-default bootloader announces itself
//!   with the stock `AP121` banner. Its console cannot be interrupted into
//!   the custom bootloader, so the only thing to do is wait for the flash
//!   success marker and then alert the operator.
//! * A board already carrying the custom bootloader prints an auto-boot
//!   countdown. Mexflash types into that window, waits for the bootloader's
//!   network stack to come up, and triggers the firmware load.
//!
//! The session lifecycle is implemented as a state machine in terms of
//! **states** and **transitions** between them with the following
//! characteristics:
//!
//! * Can only be in one state at any time.
//! * Each state can have its own associated data if needed.
//! * Transitions between states are triggered via typed **events** and follow
//!   defined semantics.
//! * Only explicitly defined transitions should be permitted and as many
//!   errors should be detected at **compile-time**.
//! * Transitioning from one state to another consumes the original state and
//!   renders it unusable. Data can be transferred from one state to the next
//!   by attaching it to the transition event.
//!
//! State transitions leverage `rust`'s `From` and `Into` pattern: the `From`
//! trait converts an `event` into the next `state`, and only transitions for
//! which `From` is implemented exist at all, so an illegal transition is a
//! compile-time error.
//!
//! The decision core inside the monitoring state is deliberately not a typed
//! state machine: it is a pair of boolean flags updated per recognized
//! console line, kept as plain data so its transition table can be unit
//! tested without a serial port.

mod error;
mod flasher;
mod session;
mod settings;
mod utils;

pub use error::FlashError;
pub use session::{factory, FlashSession};
pub use settings::{Settings, SettingsBuilder};
