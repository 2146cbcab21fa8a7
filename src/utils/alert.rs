//! The operator alert: an external program launched at each board-swap point.

use std::process::{Command, Stdio};

use log::debug;

use crate::error::FlashError;

/// Capability to get the operator's attention. One method, fire-and-forget,
/// so the flashing state machine can be tested with a recording fake.
pub(crate) trait Notifier {
    fn raise_alert(&mut self) -> Result<(), FlashError>;
}

/// Launches a pre-configured external program (an audible or visual cue at
/// the bench). The program's outcome is not inspected beyond launch success.
pub(crate) struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub(crate) fn new(command: String) -> Self {
        CommandNotifier { command }
    }
}

impl Notifier for CommandNotifier {
    fn raise_alert(&mut self) -> Result<(), FlashError> {
        debug!("launching alert command `{}`", self.command);
        // The child is intentionally not awaited; the cue plays while the
        // loop keeps watching the console.
        match Command::new(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => Ok(()),
            Err(source) => Err(FlashError::AlertLaunch {
                command: self.command.clone(),
                source,
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlaunchable_command_reports_launch_failure() {
        let mut notifier = CommandNotifier::new("/nonexistent/alert-program".into());
        match notifier.raise_alert() {
            Err(FlashError::AlertLaunch { command, .. }) => {
                assert_eq!(command, "/nonexistent/alert-program");
            }
            other => panic!("expected AlertLaunch, got {:?}", other),
        }
    }
}
