//! The flashing decision core.
//!
//! Bytes from the console are assembled into lines ([`line`]), each line is
//! compared against the small set of bootloader messages we care about
//! ([`banner`]), and the match drives the two-flag flashing state machine
//! ([`state`]) which types commands back into the console and decides when
//! the operator should be alerted.
//!
//! Everything in here is plain data plus two small capability traits for the
//! side effects, so the whole transition table is unit tested without a
//! board on the bench.

mod banner;
mod line;
mod state;

pub(crate) use line::{Feed, LineAssembler};
pub(crate) use state::FlashState;
