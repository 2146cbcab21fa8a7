//! The mexflash serial flashing session.
//!
//! **Example** - Executing the state machine event loop:
//! ```ignore
//! let settings = SettingsBuilder::default()
//!     .path("/dev/ttyUSB0")
//!     .baud_rate(115_200)
//!     .finalize();
//! let mut session = session::factory(settings);
//! session.run();
//! ```

#[macro_use]
mod macros;

mod events;
mod state_machine;
mod states;

pub use state_machine::{factory, FlashSession};
