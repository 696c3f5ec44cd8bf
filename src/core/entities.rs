//! XML Entity Decoding
//!
//! Lenient decoding of text and attribute values:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Common HTML entities (&nbsp;, &copy;, ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Unknown or malformed references are kept as written. Invalid UTF-8 is
//! replaced rather than rejected.

use memchr::memchr;
use std::borrow::Cow;

/// Longest span searched for the ';' closing a reference, '&' included
const MAX_REFERENCE_LEN: usize = 32;

/// Decode entity references and convert to text
///
/// Borrows the input when it is valid UTF-8 without any '&'.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, str> {
    if memchr(b'&', input).is_none() {
        return String::from_utf8_lossy(input);
    }
    let decoded = decode_entities(input);
    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

/// Replace every known entity reference in the input
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &input[pos..]) {
        result.extend_from_slice(&input[pos..pos + amp]);
        pos += amp;

        let window = &input[pos..input.len().min(pos + MAX_REFERENCE_LEN)];
        let decoded = memchr(b';', window)
            .and_then(|semi| decode_entity(&input[pos + 1..pos + semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                pos += semi + 1;
            }
            None => {
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result.extend_from_slice(&input[pos..]);
    result
}

/// Decode a single reference (without '&' and ';')
fn decode_entity(entity: &[u8]) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix(b"#") {
        return decode_numeric_entity(numeric);
    }

    let c = match entity {
        b"lt" => '<',
        b"gt" => '>',
        b"amp" => '&',
        b"quot" => '"',
        b"apos" => '\'',
        b"nbsp" => '\u{00A0}',
        b"copy" => '\u{00A9}',
        b"reg" => '\u{00AE}',
        b"trade" => '\u{2122}',
        b"mdash" => '\u{2014}',
        b"ndash" => '\u{2013}',
        b"lsquo" => '\u{2018}',
        b"rsquo" => '\u{2019}',
        b"ldquo" => '\u{201C}',
        b"rdquo" => '\u{201D}',
        b"hellip" => '\u{2026}',
        _ => return None,
    };
    Some(c)
}

/// `#DDDD` or `#xHHHH`, the '#' already stripped
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let codepoint = match entity.split_first()? {
        (b'x' | b'X', hex) => u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?,
        _ => std::str::from_utf8(entity).ok()?.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}
