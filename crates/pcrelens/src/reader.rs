//! Source reader: splits a delimited regex literal into delimiter, body, and
//! flags (`spec.md` §4.1).

use crate::error::{Error, Result};

/// The result of splitting a delimited regex source, e.g. `/foo/i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexSource {
    pub body: String,
    pub flags: String,
    pub opening_delimiter: u8,
    pub closing_delimiter: u8,
    /// Byte offset of the body's first byte within the original source.
    pub body_start: u32,
    /// Byte offset one past the body's last byte within the original source.
    pub body_end: u32,
}

impl RegexSource {
    pub fn byte_len(&self) -> u32 {
        self.body.len() as u32
    }
}

fn matching_closer(opening: u8) -> u8 {
    match opening {
        b'{' => b'}',
        b'(' => b')',
        b'[' => b']',
        b'<' => b'>',
        other => other,
    }
}

fn is_valid_delimiter(b: u8) -> bool {
    !b.is_ascii_alphanumeric() && b != b'\\' && !b.is_ascii_whitespace() && b.is_ascii()
}

/// Splits `source` (e.g. `"/(a+)+b/i"`) into delimiter, body, and flags.
///
/// The closing delimiter is found by scanning from the end for the last
/// unescaped occurrence of the closing delimiter byte; everything after it
/// is the flags. Escaped delimiters inside the body (`\/`) do not terminate
/// the body, matching PCRE conventions.
pub fn split(source: &str) -> Result<RegexSource> {
    let bytes = source.as_bytes();
    let Some(&opening) = bytes.first() else {
        return Err(Error::syntax(
            source,
            crate::span::ByteSpan::empty_at(0),
            "empty source: expected a delimited regex literal",
        ));
    };

    if !is_valid_delimiter(opening) {
        return Err(Error::syntax(
            source,
            crate::span::ByteSpan::empty_at(0),
            format!("'{}' is not a valid delimiter", opening as char),
        ));
    }

    let closing = matching_closer(opening);

    // Scan forward, tracking escapes, to find the matching closing
    // delimiter. For paired bracket delimiters this also tracks nesting
    // depth, matching PCRE's behavior for e.g. `{a{b}c}flags`.
    let is_paired = opening != closing;
    let mut depth: i32 = 1;
    let mut i = 1;
    let mut close_at: Option<usize> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && i + 1 < bytes.len() {
            i += 2;
            continue;
        }
        if is_paired && b == opening {
            depth += 1;
        } else if b == closing {
            depth -= 1;
            if depth == 0 {
                close_at = Some(i);
                break;
            }
        }
        i += 1;
    }

    let Some(close_at) = close_at else {
        return Err(Error::syntax(
            source,
            crate::span::ByteSpan::empty_at(bytes.len() as u32),
            format!(
                "unmatched delimiter: expected closing '{}'",
                closing as char
            ),
        ));
    };

    let body = &source[1..close_at];
    let flags = &source[close_at + 1..];

    Ok(RegexSource {
        body: body.to_owned(),
        flags: flags.to_owned(),
        opening_delimiter: opening,
        closing_delimiter: closing,
        body_start: 1,
        body_end: close_at as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_slash_delimited() {
        let r = split("/(a+)+b/i").unwrap();
        assert_eq!(r.body, "(a+)+b");
        assert_eq!(r.flags, "i");
        assert_eq!(r.opening_delimiter, b'/');
        assert_eq!(r.closing_delimiter, b'/');
    }

    #[test]
    fn escaped_delimiter_does_not_terminate() {
        let r = split(r"/a\/b/").unwrap();
        assert_eq!(r.body, r"a\/b");
        assert_eq!(r.flags, "");
    }

    #[test]
    fn paired_brace_delimiter() {
        let r = split("{a{b}c}msx").unwrap();
        assert_eq!(r.body, "a{b}c");
        assert_eq!(r.flags, "msx");
    }

    #[test]
    fn unmatched_delimiter_errors() {
        assert!(split("/abc").is_err());
    }

    #[test]
    fn invalid_delimiter_byte_errors() {
        assert!(split("aabca").is_err());
    }
}
