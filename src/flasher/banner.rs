//! Recognition of the console lines that drive the flashing cycle.
//!
//! Matching is exact string equality, trailing spaces included. The strings
//! are tied to a specific bootloader build; a board printing anything else is
//! simply ignored line by line.

/// Startup banner of the factory-default U-Boot still on unflashed boards.
pub(crate) const DEFAULT_UBOOT_BANNER: &str = "AP121 (AR9331) U-Boot for";

/// The custom bootloader's auto-boot countdown, the window during which a
/// keypress diverts it into the interactive console.
pub(crate) const AUTOBOOT_COUNTDOWN: &str = "Autobooting in:2 s (type 'gl' to run U-Boot console)";

/// The custom bootloader's interactive prompt. Note the trailing space.
pub(crate) const CONSOLE_PROMPT: &str = "uboot> ";

/// Printed by the bootloader when a flash operation completed.
pub(crate) const FLASH_SUCCESS: &str = "OK!";

/// A console line mexflash knows how to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Banner {
    /// The factory-default bootloader announced itself.
    DefaultBootloader,
    /// The auto-boot countdown opened its interrupt window.
    InterruptWindow,
    /// The interactive console prompt.
    Prompt,
    /// A flash operation reported success.
    FlashSuccess,
}

/// Match one assembled line against the recognized console messages.
pub(crate) fn recognize(line: &str) -> Option<Banner> {
    match line {
        DEFAULT_UBOOT_BANNER => Some(Banner::DefaultBootloader),
        AUTOBOOT_COUNTDOWN => Some(Banner::InterruptWindow),
        CONSOLE_PROMPT => Some(Banner::Prompt),
        FLASH_SUCCESS => Some(Banner::FlashSuccess),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_console_messages() {
        assert_eq!(
            recognize("AP121 (AR9331) U-Boot for"),
            Some(Banner::DefaultBootloader)
        );
        assert_eq!(
            recognize("Autobooting in:2 s (type 'gl' to run U-Boot console)"),
            Some(Banner::InterruptWindow)
        );
        assert_eq!(recognize("uboot> "), Some(Banner::Prompt));
        assert_eq!(recognize("OK!"), Some(Banner::FlashSuccess));
    }

    #[test]
    fn matching_is_exact() {
        // The prompt carries a trailing space; without it there is no match.
        assert_eq!(recognize("uboot>"), None);
        // Substrings and supersets do not count either.
        assert_eq!(recognize("AP121 (AR9331) U-Boot"), None);
        assert_eq!(recognize("OK! "), None);
        assert_eq!(recognize(""), None);
        assert_eq!(recognize("random console chatter"), None);
    }
}
