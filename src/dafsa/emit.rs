//! Output formats for an encoded DAFSA.

use std::fmt::Write as _;

use super::builder::build_dafsa;
use super::encoder::Encoder;
use crate::Error;

const HEADER: &str = "/* This file is generated. DO NOT EDIT!\n\n\
The byte array encodes a dictionary of strings and values. \
See make-dafsa for documentation.*/\n\n";

const BYTES_PER_LINE: usize = 12;

/// Renders `bytes` as a C++ array named `kDafsa`.
///
/// The preamble, if any and non-empty, is copied between the header comment
/// and the array.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::emit::to_cxx;
///
/// let text = to_cxx(&[0x81, 0xE1, 0x02], None);
/// assert!(text.ends_with("const unsigned char kDafsa[3] = {\n  0x81, 0xe1, 0x02,\n};\n"));
/// ```
pub fn to_cxx(bytes: &[u8], preamble: Option<&str>) -> String {
    let mut text = String::from(HEADER);
    if let Some(preamble) = preamble.filter(|p| !p.is_empty()) {
        text.push_str(preamble);
        text.push_str("\n\n");
    }

    writeln!(text, "const unsigned char kDafsa[{}] = {{", bytes.len()).unwrap();
    for chunk in bytes.chunks(BYTES_PER_LINE) {
        text.push_str("  ");
        for (i, byte) in chunk.iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            write!(text, "0x{byte:02x}").unwrap();
        }
        text.push_str(",\n");
    }
    text.push_str("};\n");
    text
}

fn compile<W: AsRef<[u8]>>(
    words: impl IntoIterator<Item = (W, u8)>,
    encoder: &Encoder,
) -> Result<Vec<u8>, Error> {
    let graph = build_dafsa(words)?;
    Ok(encoder.encode(&graph)?)
}

/// Builds, encodes and renders `words` as C++.
pub fn words_to_cxx<W: AsRef<[u8]>>(
    words: impl IntoIterator<Item = (W, u8)>,
    preamble: Option<&str>,
    encoder: &Encoder,
) -> Result<String, Error> {
    let bytes = compile(words, encoder)?;
    Ok(to_cxx(&bytes, preamble))
}

/// Builds and encodes `words`, returning the raw bytes.
pub fn words_to_bin<W: AsRef<[u8]>>(
    words: impl IntoIterator<Item = (W, u8)>,
    encoder: &Encoder,
) -> Result<Vec<u8>, Error> {
    compile(words, encoder)
}
