// RouterOS API wire framing
//
// Every word on the wire is a length-prefixed byte string; a sentence is a
// run of words terminated by a zero-length word. The length prefix uses a
// variable 1-5 byte encoding keyed off the high bits of the first byte.
// Reference: the RouterOS API protocol documentation.

use crate::error::Error;

/// Encode a word length into its variable-width wire prefix.
#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
pub fn encode_length(len: u32) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else if len < 0x4000 {
        let v = len | 0x8000;
        vec![(v >> 8) as u8, v as u8]
    } else if len < 0x20_0000 {
        let v = len | 0xC0_0000;
        vec![(v >> 16) as u8, (v >> 8) as u8, v as u8]
    } else if len < 0x1000_0000 {
        let v = len | 0xE000_0000;
        vec![(v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8, v as u8]
    } else {
        let mut out = vec![0xF0];
        out.extend_from_slice(&len.to_be_bytes());
        out
    }
}

/// How many continuation bytes follow `first` in a length prefix.
///
/// Bytes `0xF8..` are reserved control bytes and are rejected.
pub fn continuation_bytes(first: u8) -> Result<usize, Error> {
    match first {
        0x00..=0x7F => Ok(0),
        0x80..=0xBF => Ok(1),
        0xC0..=0xDF => Ok(2),
        0xE0..=0xEF => Ok(3),
        0xF0..=0xF7 => Ok(4),
        _ => Err(Error::Protocol(format!(
            "reserved control byte 0x{first:02X} in length prefix"
        ))),
    }
}

/// Decode a length prefix from its first byte plus continuation bytes.
///
/// `rest` must have exactly `continuation_bytes(first)` entries.
pub fn decode_length(first: u8, rest: &[u8]) -> u32 {
    let mut len = u32::from(match rest.len() {
        0 => first,
        1 => first & 0x7F,
        2 => first & 0x3F,
        3 => first & 0x1F,
        _ => 0, // 0xF0 marker carries no length bits
    });
    for &b in rest {
        len = (len << 8) | u32::from(b);
    }
    len
}

/// One reply sentence from the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub words: Vec<String>,
}

impl Sentence {
    /// The reply tag (`!re`, `!done`, `!trap`, `!fatal`), if present.
    pub fn reply_tag(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Look up an attribute word `=key=value` and return the value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        let prefix = format!("={key}=");
        self.words
            .iter()
            .find_map(|w| w.strip_prefix(prefix.as_str()))
    }
}
