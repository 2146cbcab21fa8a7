//! The two-flag flashing state machine.
//!
//! One flashing cycle has two phases. Phase one handles a board still on the
//! factory-default bootloader: nothing can be typed into it, so mexflash
//! waits for the flash success marker, resets the board and alerts the
//! operator. Phase two handles a board already running the custom
//! bootloader: the auto-boot countdown is interrupted, the firmware load is
//! triggered, and the success marker again ends in a reset and an alert.
//!
//! The `skip_next_boot_interrupt` flag glues the phases together: right
//! after the bootloader itself was flashed, the very next countdown belongs
//! to that bootloader's own first boot and must run through undisturbed
//! instead of being hijacked as if the board were a stable unit.
//!
//! All writes are best effort. A dropped command is not retried; the board's
//! console reveals it soon enough by never printing the next expected line.

use std::time::Duration;

use log::{info, warn};

use crate::utils::{ConsoleLink, Notifier};

use super::banner::{self, Banner};

/// Pause between typing the interrupt keys and the carriage return, the
/// bootloader polls its console slowly during the countdown.
const CONSOLE_KEY_DELAY: Duration = Duration::from_millis(100);

/// Pause before triggering the firmware load; the now-interactive
/// bootloader needs this long to bring its network stack up.
const NETWORK_SETTLE_DELAY: Duration = Duration::from_secs(3);

const INTERRUPT_KEYS: &[u8] = b"gl";
const CARRIAGE_RETURN: &[u8] = b"\r";
const LOAD_FIRMWARE_CMD: &[u8] = b"run lf\r";
const RESET_CMD: &[u8] = b"reset\r";

/// Cross-line state of the flashing cycle.
///
/// Created once per session; both flags start `false` and are only ever
/// touched by [`FlashState::handle_line`].
#[derive(Debug)]
pub(crate) struct FlashState {
    /// A flash command sequence went out and we are waiting for the board's
    /// success marker or reboot before alerting the operator.
    pending_alert_on_reset: bool,
    /// The next auto-boot countdown belongs to a bootloader we just flashed
    /// and must not be interrupted.
    skip_next_boot_interrupt: bool,
}

impl FlashState {
    pub(crate) fn new() -> Self {
        FlashState {
            pending_alert_on_reset: false,
            skip_next_boot_interrupt: false,
        }
    }

    /// React to one assembled console line.
    ///
    /// Unrecognized lines change nothing. Recognized lines update the flags
    /// and type commands back through `link`; a write or alert failure is
    /// logged and the cycle carries on, crashing here would strand a board
    /// with the operator waiting.
    pub(crate) fn handle_line(
        &mut self,
        line: &str,
        link: &mut dyn ConsoleLink,
        notifier: &mut dyn Notifier,
    ) {
        let matched = match banner::recognize(line) {
            Some(matched) => matched,
            None => return,
        };
        info!("matched {:?}: {:?}", matched, line);

        match matched {
            Banner::DefaultBootloader => {
                if self.pending_alert_on_reset {
                    // The freshly flashed bootloader came back up; this board
                    // is done.
                    self.alert(notifier);
                    self.pending_alert_on_reset = false;
                    self.skip_next_boot_interrupt = true;
                }
            }
            Banner::InterruptWindow => {
                if self.skip_next_boot_interrupt {
                    info!("first boot of a freshly flashed bootloader, letting it through");
                    self.skip_next_boot_interrupt = false;
                } else {
                    info!("interrupting auto-boot to push firmware");
                    self.send(link, INTERRUPT_KEYS);
                    link.pause(CONSOLE_KEY_DELAY);
                    self.send(link, CARRIAGE_RETURN);
                    link.pause(NETWORK_SETTLE_DELAY);
                    self.send(link, LOAD_FIRMWARE_CMD);
                    self.pending_alert_on_reset = true;
                }
            }
            Banner::Prompt => {
                // Deliberately idle. Typing "reset\r" here would also reboot
                // boards parked at the console for manual inspection.
            }
            Banner::FlashSuccess => {
                self.send(link, RESET_CMD);
                if self.pending_alert_on_reset {
                    self.alert(notifier);
                    self.pending_alert_on_reset = false;
                    self.skip_next_boot_interrupt = true;
                }
            }
        }
    }

    fn send(&self, link: &mut dyn ConsoleLink, bytes: &[u8]) {
        if let Err(e) = link.send(bytes) {
            warn!("console command dropped: {}", e);
        }
    }

    fn alert(&self, notifier: &mut dyn Notifier) {
        info!("board ready, alerting the operator");
        if let Err(e) = notifier.raise_alert() {
            warn!("{}", e);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlashError;

    /// Records outbound commands and pauses instead of touching hardware.
    struct RecordingLink {
        sends: Vec<Vec<u8>>,
        pauses: Vec<Duration>,
    }
    impl RecordingLink {
        fn new() -> Self {
            RecordingLink {
                sends: vec![],
                pauses: vec![],
            }
        }
    }
    impl ConsoleLink for RecordingLink {
        fn send(&mut self, bytes: &[u8]) -> Result<(), FlashError> {
            self.sends.push(bytes.to_vec());
            Ok(())
        }
        fn pause(&mut self, wait: Duration) {
            self.pauses.push(wait);
        }
    }

    struct CountingNotifier {
        alerts: usize,
    }
    impl CountingNotifier {
        fn new() -> Self {
            CountingNotifier { alerts: 0 }
        }
    }
    impl Notifier for CountingNotifier {
        fn raise_alert(&mut self) -> Result<(), FlashError> {
            self.alerts += 1;
            Ok(())
        }
    }

    const COUNTDOWN: &str = "Autobooting in:2 s (type 'gl' to run U-Boot console)";

    #[test]
    fn default_banner_with_pending_alert_fires_exactly_once() {
        let mut state = FlashState::new();
        state.pending_alert_on_reset = true;
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line("AP121 (AR9331) U-Boot for", &mut link, &mut notifier);

        assert_eq!(notifier.alerts, 1);
        assert!(link.sends.is_empty());
        assert!(!state.pending_alert_on_reset);
        assert!(state.skip_next_boot_interrupt);
    }

    #[test]
    fn default_banner_without_pending_alert_is_ignored() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line("AP121 (AR9331) U-Boot for", &mut link, &mut notifier);

        assert_eq!(notifier.alerts, 0);
        assert!(link.sends.is_empty());
        assert!(!state.pending_alert_on_reset);
        assert!(!state.skip_next_boot_interrupt);
    }

    #[test]
    fn interrupt_window_sends_firmware_load_sequence() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line(COUNTDOWN, &mut link, &mut notifier);

        assert_eq!(
            link.sends,
            vec![b"gl".to_vec(), b"\r".to_vec(), b"run lf\r".to_vec()]
        );
        assert_eq!(
            link.pauses,
            vec![Duration::from_millis(100), Duration::from_secs(3)]
        );
        assert!(state.pending_alert_on_reset);
        assert!(!state.skip_next_boot_interrupt);
        assert_eq!(notifier.alerts, 0);
    }

    #[test]
    fn interrupt_window_is_skipped_after_a_bootloader_flash() {
        let mut state = FlashState::new();
        state.skip_next_boot_interrupt = true;
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line(COUNTDOWN, &mut link, &mut notifier);

        assert!(link.sends.is_empty());
        assert!(link.pauses.is_empty());
        assert!(!state.skip_next_boot_interrupt);
        assert_eq!(notifier.alerts, 0);
    }

    #[test]
    fn flash_success_with_pending_alert_resets_and_alerts() {
        let mut state = FlashState::new();
        state.pending_alert_on_reset = true;
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line("OK!", &mut link, &mut notifier);

        assert_eq!(link.sends, vec![b"reset\r".to_vec()]);
        assert_eq!(notifier.alerts, 1);
        assert!(!state.pending_alert_on_reset);
        assert!(state.skip_next_boot_interrupt);
    }

    #[test]
    fn flash_success_without_pending_alert_only_resets() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line("OK!", &mut link, &mut notifier);

        assert_eq!(link.sends, vec![b"reset\r".to_vec()]);
        assert_eq!(notifier.alerts, 0);
        assert!(!state.pending_alert_on_reset);
        assert!(!state.skip_next_boot_interrupt);
    }

    #[test]
    fn console_prompt_is_a_no_op() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        state.handle_line("uboot> ", &mut link, &mut notifier);

        assert!(link.sends.is_empty());
        assert_eq!(notifier.alerts, 0);
        assert!(!state.pending_alert_on_reset);
        assert!(!state.skip_next_boot_interrupt);
    }

    #[test]
    fn unrecognized_lines_are_idempotent() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        for _ in 0..2 {
            state.handle_line("U-Boot 1.1.4 (Jan  1 2015)", &mut link, &mut notifier);
            assert!(link.sends.is_empty());
            assert_eq!(notifier.alerts, 0);
            assert!(!state.pending_alert_on_reset);
            assert!(!state.skip_next_boot_interrupt);
        }
    }

    #[test]
    fn full_default_board_cycle() {
        let mut state = FlashState::new();
        let mut link = RecordingLink::new();
        let mut notifier = CountingNotifier::new();

        // Flash completes on a factory-default board, the board resets, the
        // reflashed bootloader's first countdown must boot through, and the
        // second countdown starts the firmware push.
        state.handle_line("OK!", &mut link, &mut notifier);
        assert!(!state.pending_alert_on_reset);
        state.handle_line(COUNTDOWN, &mut link, &mut notifier);
        assert!(state.pending_alert_on_reset);

        state.handle_line("OK!", &mut link, &mut notifier);
        assert_eq!(notifier.alerts, 1);
        assert!(state.skip_next_boot_interrupt);

        // Next boot is the freshly flashed unit again: left alone.
        let sends_so_far = link.sends.len();
        state.handle_line(COUNTDOWN, &mut link, &mut notifier);
        assert_eq!(link.sends.len(), sends_so_far);
        assert!(!state.skip_next_boot_interrupt);
    }
}
