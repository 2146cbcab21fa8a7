//! Helper macros for the session state machine modules.

/// Generate debug formatting code for a state or event holding a
/// [`SerialLink`](crate::utils::SerialLink).
#[macro_export]
macro_rules! debug_fmt_console_link {
    ($link:ident, $f:ident) => {
        $f.debug_tuple("")
            .field(&$link.port_name())
            .field(&$link.baud())
    };
}
