//! Line assembly over the raw console byte stream.
//!
//! The bootloader console arrives one byte at a time, interleaved with
//! control characters and the occasional garbage byte from a board being
//! plugged in. The assembler keeps only printable bytes, emits a completed
//! line on CR or LF, and treats a line that outgrows its buffer as an error
//! with a clean reset rather than truncating silently.

use crate::error::FlashError;

/// Total buffer capacity. The longest real console line (the auto-boot
/// countdown) is well under 100 bytes, so hitting the limit means the stream
/// is garbage, not a long message.
pub(crate) const LINE_CAPACITY: usize = 1024;

/// Longest line the assembler will emit. One byte of the buffer is reserved,
/// matching the console's own line length limit.
pub(crate) const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// Outcome of feeding one byte to the assembler.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Feed {
    /// A CR or LF arrived and the buffer held text: here is the line.
    Line(String),
    /// Nothing to report yet, keep feeding.
    Pending,
}

/// Accumulates printable console bytes into lines.
///
/// The internal buffer is allocated once and reused for the life of the
/// session; emitting a line copies the text out and resets the buffer.
#[derive(Debug)]
pub(crate) struct LineAssembler {
    buf: String,
}

impl LineAssembler {
    pub(crate) fn new() -> Self {
        LineAssembler {
            buf: String::with_capacity(LINE_CAPACITY),
        }
    }

    /// Feed one byte from the console.
    ///
    /// * CR/LF terminates the current line: a non-empty buffer emits
    ///   [`Feed::Line`], an empty one is swallowed. The buffer is reset
    ///   either way.
    /// * Printable bytes (`>= 0x20`) accumulate.
    /// * Other control bytes are dropped, the bootloader sprinkles them
    ///   around its countdown output.
    /// * A printable byte that would not fit discards the whole partial line
    ///   and reports [`FlashError::LineTooLong`].
    pub(crate) fn feed(&mut self, byte: u8) -> Result<Feed, FlashError> {
        if byte == b'\r' || byte == b'\n' {
            if self.buf.is_empty() {
                return Ok(Feed::Pending);
            }
            let line = self.buf.clone();
            self.buf.clear();
            return Ok(Feed::Line(line));
        }

        if byte < b' ' {
            return Ok(Feed::Pending);
        }

        if self.buf.len() >= MAX_LINE_LEN {
            self.buf.clear();
            return Err(FlashError::LineTooLong { max: MAX_LINE_LEN });
        }

        self.buf.push(byte as char);
        Ok(Feed::Pending)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(assembler: &mut LineAssembler, text: &str) {
        for byte in text.bytes() {
            assert_eq!(assembler.feed(byte).unwrap(), Feed::Pending);
        }
    }

    #[test]
    fn emits_line_on_carriage_return() {
        let mut assembler = LineAssembler::new();
        feed_str(&mut assembler, "OK!");
        assert_eq!(assembler.feed(b'\r').unwrap(), Feed::Line("OK!".into()));
    }

    #[test]
    fn emits_line_on_line_feed() {
        let mut assembler = LineAssembler::new();
        feed_str(&mut assembler, "uboot> ");
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Line("uboot> ".into()));
    }

    #[test]
    fn empty_lines_are_swallowed() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.feed(b'\r').unwrap(), Feed::Pending);
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Pending);
    }

    #[test]
    fn crlf_emits_exactly_one_line() {
        let mut assembler = LineAssembler::new();
        feed_str(&mut assembler, "hello");
        assert_eq!(assembler.feed(b'\r').unwrap(), Feed::Line("hello".into()));
        // The trailing LF finds an empty buffer.
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Pending);
    }

    #[test]
    fn control_bytes_are_discarded() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.feed(0x1b).unwrap(), Feed::Pending);
        assert_eq!(assembler.feed(0x07).unwrap(), Feed::Pending);
        feed_str(&mut assembler, "ab");
        assert_eq!(assembler.feed(0x08).unwrap(), Feed::Pending);
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Line("ab".into()));
    }

    #[test]
    fn buffer_resets_between_lines() {
        let mut assembler = LineAssembler::new();
        feed_str(&mut assembler, "first");
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Line("first".into()));
        feed_str(&mut assembler, "second");
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Line("second".into()));
    }

    #[test]
    fn max_length_line_emits_intact() {
        let mut assembler = LineAssembler::new();
        for _ in 0..MAX_LINE_LEN {
            assert_eq!(assembler.feed(b'x').unwrap(), Feed::Pending);
        }
        match assembler.feed(b'\r').unwrap() {
            Feed::Line(line) => assert_eq!(line.len(), MAX_LINE_LEN),
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[test]
    fn overflow_reports_error_and_resets() {
        let mut assembler = LineAssembler::new();
        for _ in 0..MAX_LINE_LEN {
            assert_eq!(assembler.feed(b'x').unwrap(), Feed::Pending);
        }
        match assembler.feed(b'y') {
            Err(FlashError::LineTooLong { max }) => assert_eq!(max, MAX_LINE_LEN),
            other => panic!("expected LineTooLong, got {:?}", other),
        }
        // The partial line is gone and the assembler is usable again.
        feed_str(&mut assembler, "ok");
        assert_eq!(assembler.feed(b'\n').unwrap(), Feed::Line("ok".into()));
    }
}
