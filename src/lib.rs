//! # libdafsa
//!
//! Compiles a dictionary of words, each carrying a small value in `0..=15`,
//! into a [DAFSA](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Deterministic Acyclic Finite State Automaton) packed into a flat byte
//! array. The array holds no pointers: children are reached through relative
//! forward offsets, so it can be embedded as a constant and searched in
//! place.
//!
//! Shared prefixes and shared suffixes are both stored once. Lookups walk
//! the array from the start and never backtrack.
//!
//! ## Quick Start
//!
//! ```
//! use libdafsa::dafsa::{Dafsa, build_dafsa, encode};
//!
//! let graph = build_dafsa([("example.com", 1), ("example.org", 4), ("com", 0)]).unwrap();
//! let bytes = encode(&graph).unwrap();
//!
//! let dafsa = Dafsa::new(&bytes);
//! assert_eq!(dafsa.lookup("example.org"), Some(4));
//! assert_eq!(dafsa.lookup("example.net"), None);
//! ```
//!
//! ## From a gperf file
//!
//! The input format of the `make-dafsa` tool is a gperf-style word list, and
//! the usual output is a C++ array:
//!
//! ```
//! use libdafsa::dafsa::emit::words_to_cxx;
//! use libdafsa::dafsa::{Encoder, parse_gperf};
//!
//! let dict = parse_gperf("%%\naa, 1\na, 2\n%%\n").unwrap();
//! let cxx = words_to_cxx(dict.entries, Some(dict.preamble.as_str()), &Encoder::default()).unwrap();
//! assert!(cxx.contains("0x81, 0xe1, 0x02, 0x81, 0x82, 0x61, 0x81,"));
//! ```
//!
//! ## Byte format
//!
//! ```text
//! <graph>         ::= <links> <node>*
//! <links>         ::= <link>* <end_link>
//! <node>          ::= <char>* (<end_char> <links> | <return_value>)
//! <offset1>       ::= 0x00..0x3F                     (6-bit distance)
//! <offset2>       ::= 0x40..0x5F <byte>              (13-bit distance)
//! <offset3>       ::= 0x60..0x7F <byte> <byte>       (21-bit distance)
//! <end_link>      ::= <offsetN> with bit 7 set
//! <char>          ::= 0x20..0x7F
//! <end_char>      ::= 0xA0..0xFF
//! <return_value>  ::= 0x80..0x8F
//! ```

#![warn(missing_docs)]

use thiserror::Error;

/// DAFSA construction, encoding and decoding.
pub mod dafsa;

use dafsa::{BuilderError, EncodeError, FormatError};

/// Any error produced on the way from a dictionary file to encoded bytes.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),
    /// The dictionary file is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A word or value was rejected.
    #[error(transparent)]
    Builder(#[from] BuilderError),
    /// The graph could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Parses a gperf dictionary and encodes it with default settings.
///
/// # Examples
///
/// ```
/// let bytes = libdafsa::compile("%%\naa, 1\na, 2\n%%\n").unwrap();
/// assert_eq!(bytes, [0x81, 0xE1, 0x02, 0x81, 0x82, 0x61, 0x81]);
/// ```
pub fn compile(text: &str) -> Result<Vec<u8>, Error> {
    let dict = dafsa::parse_gperf(text)?;
    dafsa::emit::words_to_bin(dict.entries, &dafsa::Encoder::default())
}
