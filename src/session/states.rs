//! States for the mexflash session state machine.
//!
//! This module is private and restricted to the [`session`](crate::session)
//! scope. The public interface of the session state machine is provided by
//! [`session`](crate::session).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an
//! overview of states, events and transitions.

use std::{fmt, thread, time::Duration};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, log_enabled, trace, warn, Level::Debug};

use super::events::*;

use crate::flasher::{Feed, FlashState, LineAssembler};
use crate::settings::Settings;
use crate::utils::{CommandNotifier, ReadOutcome, SerialLink};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// A state implements this method so it can be `run` after the state
    /// machine transitions into it.
    ///
    /// During this call, the state can do any work that needs to be done and
    /// when finished, requests a transition to a `new state` by returning the
    /// appropriate `event`. The `state` and the `event` are consumed to
    /// create the `new state` using the corresponding [`From`] trait
    /// implementation (provided such implementation exists).
    fn run(&mut self, settings: &Settings) -> Event;
}

// Init State ==================================================================

/// The initial state of the session state machine.
///
/// From the `InitState`, the state machine can evolve via the following
/// transitions:
///
///  * **[`SwitchToMonitorEvent`] => [`MonitorState`]** which happens after
///    the serial console is opened and configured,
///  * **[`DoneEvent`] => [`DoneState`]** when the console could not be
///    brought up. Without a working serial session there is nothing to
///    monitor, so this is fatal for the whole tool.
#[derive(Debug)]
pub(crate) struct InitState {}
impl Runnable for InitState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> Init");
        assert_ne!(settings.path, None);

        match SerialLink::open(settings) {
            Ok(link) => Event::SwitchToMonitor(SwitchToMonitorEvent {
                settings: settings.clone(),
                link,
            }),
            Err(e) => {
                error!("{}", e);
                Event::Done(DoneEvent {
                    settings: settings.clone(),
                    with_errors: true,
                })
            }
        }
    }
}

// Monitor State ===============================================================

/// The working state: reads the console byte stream, assembles lines, and
/// lets the flashing state machine react to each recognized line while an
/// idle spinner keeps the operator informed that mexflash is alive.
///
/// This state never transitions out on its own. The session services one
/// bench seat until the process is externally terminated; everything that
/// can go wrong mid-cycle (dropped writes, garbage lines, a briefly absent
/// device, an alert program that will not launch) is logged and the loop
/// carries on, so a board is never stranded by a crash.
pub(crate) struct MonitorState {
    /// The serial console link, already configured and open.
    pub link: Option<SerialLink>,
}
impl Runnable for MonitorState {
    fn run(&mut self, settings: &Settings) -> Event {
        use hexplay::HexViewBuilder;

        info!("=> Monitor");

        if let Some(mut link) = self.link.take() {
            let mut assembler = LineAssembler::new();
            let mut flash = FlashState::new();
            let mut notifier = CommandNotifier::new(settings.alert_command.clone());

            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
                    .template("[MF] {spinner:.blue} {msg}"),
            );
            pb.set_message("⏳ Watching the console, plug a board in...");

            loop {
                let outcome =
                    link.read_byte(settings.read_timeout, settings.idle_tick, &mut || {
                        pb.tick()
                    });
                match outcome {
                    Ok(ReadOutcome::Byte(byte)) => match assembler.feed(byte) {
                        Ok(Feed::Line(line)) => {
                            // Echo the console verbatim for the operator.
                            println!("{}", line);

                            // Dump the received line in a hex table for
                            // debugging.
                            if log_enabled!(Debug) {
                                let view = HexViewBuilder::new(line.as_bytes())
                                    .address_offset(0)
                                    .row_width(16)
                                    .finish();
                                println!("{}", view);
                            }

                            flash.handle_line(&line, &mut link, &mut notifier);
                        }
                        Ok(Feed::Pending) => {}
                        Err(e) => {
                            warn!("{}", e);
                        }
                    },
                    Ok(ReadOutcome::TimedOut) => {
                        trace!("no console data for {:?}", settings.read_timeout);
                    }
                    Err(ref e) => {
                        // The device may be mid-swap; keep watching for it.
                        warn!("serial read failed: {}", e.to_string());
                        thread::sleep(Duration::from_secs(1));
                    }
                }
            }
        }

        // We should never reach here!
        unreachable!()
    }
}
impl fmt::Debug for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.link {
            Some(link) => debug_fmt_console_link!(link, f).finish(),
            None => f.debug_tuple("MonitorState").finish(),
        }
    }
}

// Done State ==================================================================

/// Reached when the session is about to terminate, in practice only when the
/// serial console could not be opened or configured at startup.
///
/// This state goes into a 2-phase execution. During the initial phase, it
/// runs like any other state to report the failure to the operator. It then
/// triggers the [`ExitEvent`] to cause the session state machine to
/// terminate and exit.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DoneState {
    /// When `true`, indicates an abnormal completion caused by an error.
    pub with_error: bool,
    /// When `true` instructs the session state machine to exit its event
    /// loop.
    pub should_exit: bool,
}
impl Runnable for DoneState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!(
            "=> Done with{}errors",
            if self.with_error { " " } else { " no " }
        );
        if self.with_error {
            println!(
                "{}",
                style("[MF] 💥 Could not open the serial console!").red()
            );
            println!("[MF] 🔌 Check the device path and the cable, then start again.");
        }

        Event::Exit(ExitEvent {
            settings: settings.clone(),
            with_error: self.with_error,
        })
    }
}
