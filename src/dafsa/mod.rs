/// Builds the minimized graph from word/value pairs.
pub mod builder;
/// Read-only lookups over an encoded buffer.
pub mod decoder;
/// Byte-per-line listing of an encoded buffer.
pub mod dump;
/// C++ and binary output.
pub mod emit;
/// Serializes a graph into bytes.
pub mod encoder;
/// Parser for gperf dictionary files.
pub mod gperf;
/// Label byte encoding.
pub mod label;
/// Link run encoding and decoding.
pub mod links;
/// Graph nodes and the arena that owns them.
pub mod node;
/// Parents-first ordering of graph nodes.
pub mod topo;

pub use builder::{Builder, BuilderError, build_dafsa};
pub use decoder::{Dafsa, DecodeError};
pub use encoder::{EncodeError, Encoder, EncoderConfig, encode};
pub use gperf::{Dictionary, FormatError, ParseOptions, parse_gperf};
pub use node::{Graph, Node, NodeId};

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;

    fn compile(words: &[(&str, u8)]) -> Vec<u8> {
        encode(&build_dafsa(words.iter().copied()).unwrap()).unwrap()
    }

    fn sorted(words: &[(&str, u8)]) -> Vec<(String, u8)> {
        words
            .iter()
            .map(|&(w, v)| (w.to_string(), v))
            .sorted()
            .collect()
    }

    const DOMAINS: [(&str, u8); 10] = [
        ("com", 0),
        ("co.uk", 0),
        ("ac.uk", 0),
        ("gov.uk", 1),
        ("example.com", 4),
        ("example.org", 4),
        ("*.kawasaki.jp", 2),
        ("!city.kawasaki.jp", 1),
        ("org", 0),
        ("jp", 0),
    ];

    #[test]
    fn round_trip() {
        let bytes = compile(&DOMAINS);
        let dafsa = Dafsa::new(&bytes);
        assert_eq!(dafsa.entries().unwrap(), sorted(&DOMAINS));
        for (word, value) in DOMAINS {
            assert_eq!(dafsa.lookup(word), Some(value), "{word}");
        }
        for missing in ["uk", "co", "example", "example.co", "comm", "kawasaki.jp"] {
            assert_eq!(dafsa.lookup(missing), None, "{missing}");
        }
    }

    #[test]
    fn every_input_order_round_trips() {
        // Different orders may lay nodes out differently, but every order
        // has to describe the same dictionary.
        let words = [("ab", 1), ("b", 2), ("abc", 4), ("cb", 2)];
        for order in words.iter().copied().permutations(words.len()) {
            let bytes = compile(&order);
            assert_eq!(Dafsa::new(&bytes).entries().unwrap(), sorted(&words));
        }
    }

    #[test]
    fn every_link_points_forward() {
        let bytes = compile(&DOMAINS);
        for link in Dafsa::new(&bytes).links().unwrap() {
            assert!(link.target > link.position, "{link:?}");
            assert!(link.target < bytes.len(), "{link:?}");
        }
    }

    #[test]
    fn gperf_to_lookup() {
        let dict = parse_gperf("%%\naa, 1\nbbb, 2\nbaa, 1\n%%\n").unwrap();
        let bytes = encode(&build_dafsa(dict.entries).unwrap()).unwrap();
        assert_eq!(
            bytes,
            [0x02, 0x83, 0xE2, 0x02, 0x83, 0x61, 0x61, 0x81, 0x62, 0x62, 0x82]
        );
    }
}
