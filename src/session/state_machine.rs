//! The mexflash session state machine.
//!
//! A session owns exactly one serial console for the life of the process.
//! The `Init` state brings the console up and is the only place where a
//! failure is fatal; the `Monitor` state then watches the line stream and
//! drives the flashing cycle until the operator terminates the process.
//!
//! ```text
//!        START
//!          |
//!          v
//!      .-------.
//!      | Init  |
//!      '-------'
//!       |     |
//!  console   console
//!    ready    error
//!       |     |
//!       v     v
//! .---------. .------.
//! | Monitor | | Done |
//! '---------' '------'
//!       |        |
//!   (runs until  v
//!    terminated) END
//! ```

use super::events::*;
use super::states::*;
use crate::settings::Settings;

// =============================================================================
// Public Interface
// =============================================================================

/// Represents the mexflash session state machine. Use the [`factory()`]
/// function to get an instance then run it by calling its `run()` method.
pub struct FlashSession {
    sm: SessionStates,
}
impl FlashSession {
    /// The session event loop runs until the `Done` state is reached and its
    /// `should_exit` flag is set, which only happens when the serial console
    /// could not be brought up; a healthy session never exits on its own.
    ///
    /// Returns **`0`** on a clean termination and **`2`** when the serial
    /// console could not be opened or configured, distinct from the exit
    /// code the argument parser uses for usage errors.
    pub fn run(&mut self) -> i8 {
        loop {
            self.sm = self.sm.step();
            if let SessionStates::Done(sm) = &self.sm {
                if sm.state.should_exit {
                    return if sm.state.with_error { 2 } else { 0 };
                }
            }
        }
    }
}

/// Factory function for the mexflash session state machine. Use it to get an
/// instance of the state machine, which you can run by invoking its `run()`
/// method.
pub fn factory(settings: Settings) -> FlashSession {
    FlashSession {
        // The machine naturally starts in the `Init` state.
        sm: SessionStates::Init(SessionSM::new(settings)),
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The raw state machine implementing the mexflash session.
///
/// This is a private interface, abstracted for a simpler and more intuitive
/// use in the public [`FlashSession`] interface.
///
/// Note that using a generic type that holds the current state serves two
/// purposes. It allows for also having shared data by all states that is not
/// really part of state data (e.g. the settings). Additionally, it's nicer
/// when debugging to see the state machine and the current state it is
/// holding at any time.
#[derive(Debug)]
struct SessionSM<S: Runnable> {
    settings: Settings,
    state: S,
}
impl<S: Runnable> SessionSM<S> {
    fn run(&mut self) -> Event {
        self.state.run(&self.settings)
    }
}

/// The state machine starts in the `InitState`.
impl SessionSM<InitState> {
    fn new(settings: Settings) -> Self {
        SessionSM {
            settings,
            state: InitState {},
        }
    }
}

/// An enum wrapper around the states of the session state machine. It
/// provides a simpler and more intuitive model for manipulating states and
/// their transitions.
enum SessionStates {
    Init(SessionSM<InitState>),
    Monitor(SessionSM<MonitorState>),
    Done(SessionSM<DoneState>),
}
impl SessionStates {
    /// The unit of work in the state machine event loop. It checks the
    /// current state and the current event and decides the next transition.
    /// State transitions from events are implemented using the rust
    /// `From`/`Into` pattern. Most of the potential errors of
    /// state/event/transition mismatches can be caught at compile time.
    fn step(&mut self) -> Self {
        match self {
            SessionStates::Init(sm) => {
                let event = sm.run();
                match event {
                    Event::SwitchToMonitor(ev) => SessionStates::Monitor(ev.into()),
                    Event::Done(ev) => SessionStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            SessionStates::Monitor(sm) => {
                // The monitor loop never hands control back; the arm exists
                // so the enum stays total.
                let event = sm.run();
                unreachable!("illegal event {:#?} at current state {:#?}", event, sm)
            }
            SessionStates::Done(sm) => {
                let event = sm.run();
                match event {
                    Event::Exit(ev) => SessionStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<SwitchToMonitorEvent> for SessionSM<MonitorState> {
    fn from(event: SwitchToMonitorEvent) -> SessionSM<MonitorState> {
        SessionSM {
            settings: event.settings,
            state: MonitorState {
                link: Some(event.link),
            },
        }
    }
}

impl From<DoneEvent> for SessionSM<DoneState> {
    fn from(event: DoneEvent) -> SessionSM<DoneState> {
        SessionSM {
            settings: event.settings,
            state: DoneState {
                with_error: event.with_errors,
                should_exit: false,
            },
        }
    }
}
impl From<ExitEvent> for SessionSM<DoneState> {
    fn from(event: ExitEvent) -> SessionSM<DoneState> {
        SessionSM {
            settings: event.settings,
            state: DoneState {
                with_error: event.with_error,
                should_exit: true,
            },
        }
    }
}
