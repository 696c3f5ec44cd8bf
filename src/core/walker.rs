//! XML Tree Walker
//!
//! Single lenient pass over an XML byte slice that reports the document as
//! tree events:
//!
//! - start tag: `enter_group(name)`, then one leaf per attribute
//!   (`xmlns` declarations skipped); a self-closing tag also exits
//! - end tag: closes open elements up to the matching name; an end tag
//!   matching nothing is ignored
//! - text and CDATA: buffered, then one `leaf(None, text)` at the next
//!   start or end tag unless whitespace-only
//! - comments, processing instructions and DOCTYPE: skipped, so text on
//!   either side of them stays one value
//!
//! Elements still open at end of input are closed. Names and text are
//! decoded as UTF-8, invalid sequences replaced.

use super::entities::decode_text;
use super::scanner::{is_name_start_char, Scanner};
use super::span::Span;
use crate::tree::{Leaf, TreeEvents};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Walk a whole document
pub fn walk<H: TreeEvents>(input: &[u8], handler: &mut H) {
    XmlWalker::new(input).walk(handler);
}

pub struct XmlWalker<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    /// Reusable attribute buffer to avoid per-element allocations
    attrs_buf: Vec<(Span, Span)>,
    /// Names of the open elements
    open: Vec<Span>,
    /// Text and CDATA of the innermost element not yet emitted
    pending: String,
}

impl<'a> XmlWalker<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut scanner = Scanner::new(input);
        if scanner.starts_with(UTF8_BOM) {
            scanner.advance(UTF8_BOM.len());
        }
        Self {
            input,
            scanner,
            attrs_buf: Vec::with_capacity(8),
            open: Vec::with_capacity(32),
            pending: String::new(),
        }
    }

    /// Emit events until the input ends or the handler is done
    pub fn walk<H: TreeEvents>(&mut self, handler: &mut H) {
        while !self.scanner.is_eof() && !handler.is_done() {
            match self.scanner.peek() {
                Some(b'<') => self.scan_markup(handler),
                Some(_) => {
                    let start = self.scanner.position();
                    self.scan_text(start);
                }
                None => break,
            }
        }

        self.flush_text(handler);
        while self.open.pop().is_some() {
            handler.exit_group();
        }
    }

    fn scan_markup<H: TreeEvents>(&mut self, handler: &mut H) {
        let start = self.scanner.position();
        self.scanner.advance(1);

        match self.scanner.peek() {
            Some(b'/') => {
                self.scanner.advance(1);
                self.scan_end_tag(handler);
            }
            Some(b'!') => {
                self.scanner.advance(1);
                if self.scanner.starts_with(b"--") {
                    self.scanner.advance(2);
                    self.skip_past(b"-->");
                } else if self.scanner.starts_with(b"[CDATA[") {
                    self.scanner.advance(7);
                    self.scan_cdata();
                } else if matches!(self.scanner.peek(), Some(b'D' | b'd')) {
                    self.skip_doctype();
                } else {
                    self.skip_to_tag_end();
                }
            }
            Some(b'?') => {
                self.scanner.advance(1);
                self.skip_past(b"?>");
            }
            Some(c) if is_name_start_char(c) => self.scan_start_tag(handler),
            // A '<' that starts no markup is literal text
            _ => self.scan_text(start),
        }
    }

    /// Start tag, positioned just after '<'
    fn scan_start_tag<H: TreeEvents>(&mut self, handler: &mut H) {
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return;
        }
        let name = Span::between(name_start, self.scanner.position());

        self.attrs_buf.clear();
        self.scanner.skip_whitespace();

        while !self.scanner.is_eof() {
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.advance(1);
                    self.emit_start(name, false, handler);
                    return;
                }
                Some(b'/') if self.scanner.peek_at(1) == Some(b'>') => {
                    self.scanner.advance(2);
                    self.emit_start(name, true, handler);
                    return;
                }
                Some(c) if is_name_start_char(c) => {
                    if let Some(attr) = self.scan_attribute() {
                        self.attrs_buf.push(attr);
                    }
                }
                _ => self.scanner.advance(1),
            }
            self.scanner.skip_whitespace();
        }
        // Unterminated start tag at end of input: dropped
    }

    fn emit_start<H: TreeEvents>(&mut self, name: Span, self_closing: bool, handler: &mut H) {
        self.flush_text(handler);
        let input = self.input;
        handler.enter_group(&name.text(input));

        for (attr_name, value) in &self.attrs_buf {
            let attr_name = attr_name.slice(input);
            if attr_name == b"xmlns" || attr_name.starts_with(b"xmlns:") {
                continue;
            }
            let attr_name = String::from_utf8_lossy(attr_name);
            let value = decode_text(value.slice(input));
            handler.leaf(Some(&*attr_name), Leaf::Text(&value));
        }

        if self_closing {
            handler.exit_group();
        } else {
            self.open.push(name);
        }
    }

    /// `name = "value"`, returning (name, value) spans
    fn scan_attribute(&mut self) -> Option<(Span, Span)> {
        let name_start = self.scanner.position();
        self.scanner.read_name()?;
        let name = Span::between(name_start, self.scanner.position());

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'=') {
            return None;
        }
        self.scanner.advance(1);
        self.scanner.skip_whitespace();

        let quote = self.scanner.peek()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        self.scanner.advance(1);

        let value_start = self.scanner.position();
        let value_end = self.scanner.find_byte(quote).unwrap_or(self.input.len());
        self.scanner.set_position(value_end);
        if self.scanner.peek() == Some(quote) {
            self.scanner.advance(1);
        }

        Some((name, Span::between(value_start, value_end)))
    }

    /// End tag, positioned just after `</`
    fn scan_end_tag<H: TreeEvents>(&mut self, handler: &mut H) {
        self.scanner.skip_whitespace();
        let name = self.scanner.read_name();
        self.skip_to_tag_end();

        let Some(name) = name else {
            return;
        };
        let input = self.input;
        let Some(matching) = self.open.iter().rposition(|open| open.slice(input) == name) else {
            return;
        };
        self.flush_text(handler);
        while self.open.len() > matching {
            self.open.pop();
            handler.exit_group();
        }
    }

    /// Text from `start` up to the next '<'
    fn scan_text(&mut self, start: usize) {
        // `start` may sit on a literal '<'
        self.scanner.set_position(start + 1);
        let end = self.scanner.find_tag_start();
        self.scanner.set_position(end);

        if self.open.is_empty() {
            return;
        }
        let raw = Span::between(start, end).slice(self.input);
        self.pending.push_str(&decode_text(raw));
    }

    /// CDATA content, positioned after `<![CDATA[`
    fn scan_cdata(&mut self) {
        let start = self.scanner.position();
        let end = self.scanner.find_sequence(b"]]>").unwrap_or(self.input.len());
        self.scanner.set_position(end);
        self.scanner.advance(3);

        if self.open.is_empty() {
            return;
        }
        let raw = Span::between(start, end).slice(self.input);
        self.pending.push_str(&String::from_utf8_lossy(raw));
    }

    /// Emit the buffered text of the innermost element
    fn flush_text<H: TreeEvents>(&mut self, handler: &mut H) {
        if !is_whitespace_only(self.pending.as_bytes()) {
            handler.leaf(None, Leaf::Text(&self.pending));
        }
        self.pending.clear();
    }

    /// DOCTYPE, including an internal subset in brackets
    fn skip_doctype(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.scanner.peek() {
            self.scanner.advance(1);
            match c {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Move past the next `terminator`, or to end of input
    fn skip_past(&mut self, terminator: &[u8]) {
        match self.scanner.find_sequence(terminator) {
            Some(pos) => self.scanner.set_position(pos + terminator.len()),
            None => self.scanner.set_position(self.input.len()),
        }
    }

    fn skip_to_tag_end(&mut self) {
        match self.scanner.find_tag_end_quoted() {
            Some(pos) => self.scanner.set_position(pos + 1),
            None => self.scanner.set_position(self.input.len()),
        }
    }
}

#[inline]
fn is_whitespace_only(raw: &[u8]) -> bool {
    raw.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}
