//! Label bytes.
//!
//! A label is a run of plain ASCII bytes closed by a byte with the high bit
//! set. The closing byte is either the last character of the label
//! (`<end_char>`, `0xA0..=0xFF`) or a return value (`0x80..=0x9F`, of which
//! only `0x80..=0x8F` are produced).

/// High bit marking the last byte of a label.
pub const END_OF_LABEL: u8 = 0x80;

/// Encodes the final character of a node's label.
#[inline]
pub fn encode_label(ch: u8) -> u8 {
    debug_assert!(ch < END_OF_LABEL);
    ch | END_OF_LABEL
}

/// Encodes a character that continues into the label of the node placed
/// right after it.
#[inline]
pub fn encode_prefix(ch: u8) -> u8 {
    debug_assert!(ch < END_OF_LABEL);
    ch
}

/// Encodes the `<return value>` byte of an end sentinel.
#[inline]
pub fn encode_value(value: u8) -> u8 {
    debug_assert!(value <= super::node::MAX_VALUE);
    END_OF_LABEL | value
}

/// A decoded label byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelByte {
    /// A character with more label bytes after it.
    Char(u8),
    /// The last character of a label; a link run follows.
    EndChar(u8),
    /// A return value; the word ends here.
    Value(u8),
}

impl LabelByte {
    /// Classifies a byte read at a label position.
    #[inline]
    pub fn decode(byte: u8) -> Self {
        if byte & END_OF_LABEL == 0 {
            LabelByte::Char(byte)
        } else if byte & 0xE0 == END_OF_LABEL {
            LabelByte::Value(byte & 0x0F)
        } else {
            LabelByte::EndChar(byte & !END_OF_LABEL)
        }
    }

    /// Name of the grammar production this byte belongs to.
    pub fn production(self) -> &'static str {
        match self {
            LabelByte::Char(_) => "<char>",
            LabelByte::EndChar(_) => "<end_char>",
            LabelByte::Value(_) => "<return_value>",
        }
    }
}
