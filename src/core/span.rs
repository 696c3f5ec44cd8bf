//! Span - byte range into the input document
//!
//! The walker passes spans around instead of slices so that the attribute
//! buffer can be reused across tags without borrowing the scanner.

use std::borrow::Cow;

/// A byte range of the input document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset into the input
    pub offset: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Span covering `start..end`
    #[inline]
    pub const fn between(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            len: end.saturating_sub(start),
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// End offset (exclusive)
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }

    /// The bytes under the span; empty if it runs past the input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        input.get(self.offset..self.end()).unwrap_or(&[])
    }

    /// The span as text, invalid UTF-8 replaced
    #[inline]
    pub fn text<'a>(&self, input: &'a [u8]) -> Cow<'a, str> {
        String::from_utf8_lossy(self.slice(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice() {
        let input = b"<root>hello</root>";
        let span = Span::between(6, 11);
        assert_eq!(span.slice(input), b"hello");
        assert_eq!(span.end(), 11);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let span = Span::new(100, 10);
        assert_eq!(span.slice(b"short"), b"");
    }

    #[test]
    fn test_lossy_text() {
        let input = b"a\xFFb";
        assert_eq!(Span::new(0, 3).text(input), "a\u{FFFD}b");
        assert!(matches!(Span::new(0, 1).text(input), Cow::Borrowed("a")));
    }
}
