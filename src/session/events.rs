//! Events for the mexflash session state machine.
//!
//! This module is private and restricted to the [`session`](crate::session)
//! scope. The public interface of the session state machine is provided by
//! [`session`](crate::session).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an
//! overview of states, events and transitions.

use std::fmt;

use crate::utils::SerialLink;
use crate::Settings;

// =============================================================================
// Crate-Public Interface
// =============================================================================

// SwitchToMonitorEvent ========================================================

/// Event fired to trigger a transition to the monitoring state, after the
/// serial console has been successfully opened and configured.
pub(crate) struct SwitchToMonitorEvent {
    pub settings: Settings,
    /// The open console link. Consumed and moved to the next state.
    pub link: SerialLink,
}
impl fmt::Debug for SwitchToMonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = &self.link;
        debug_fmt_console_link!(link, f).finish()
    }
}

// DoneEvent ===================================================================

/// Event fired when the session is about to terminate. It triggers a
/// transition to the `Done` state.
///
/// The only normal way out of a flashing session is the operator terminating
/// the process, so in practice this event is fired when the serial console
/// could not be brought up at startup.
#[derive(Debug)]
pub(crate) struct DoneEvent {
    pub settings: Settings,
    /// When `true`, indicates an abnormal completion caused by an error.
    pub with_errors: bool,
}

// ExitEvent ===================================================================

/// The last event in the session state machine: terminates the event loop
/// with an exit status handed back to the caller of `run()`.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub settings: Settings,
    pub with_error: bool,
}

// Events enum =================================================================

/// Events that can be triggered within the mexflash session state machine.
///
/// Each possible value holds an `event`, which in turn may hold additional
/// data for the state transition. Such data is passed by the origin state for
/// potential use by the target state.
#[derive(Debug)]
pub(crate) enum Event {
    SwitchToMonitor(SwitchToMonitorEvent),
    Done(DoneEvent),
    Exit(ExitEvent),
}
