//! Example: compiling a small suffix list and querying the encoded bytes.
//!
//! This shows the whole path from a gperf word list to lookups on the flat
//! byte array, plus the human-readable dump of the encoding.
//!
//! Run with: cargo run --example lookup

use libdafsa::dafsa::dump::dump;
use libdafsa::dafsa::{Dafsa, build_dafsa, encode, parse_gperf};

const SUFFIXES: &str = "\
%%
com, 0
co.uk, 0
gov.uk, 1
*.kawasaki.jp, 2
!city.kawasaki.jp, 1
%%
";

fn main() {
    let dict = parse_gperf(SUFFIXES).unwrap();
    let graph = build_dafsa(dict.entries).unwrap();
    let bytes = encode(&graph).unwrap();
    println!("{} nodes encoded in {} bytes", graph.len(), bytes.len());

    let dafsa = Dafsa::new(&bytes);

    // Word lookup
    println!("\nLookup:");
    for key in ["com", "co.uk", "gov.uk", "uk", "!city.kawasaki.jp", "kawasaki.jp"] {
        match dafsa.lookup(key) {
            Some(value) => println!("  {key}: {value}"),
            None => println!("  {key}: not found"),
        }
    }

    // Everything stored, read back from the bytes
    println!("\nEntries:");
    for (word, value) in dafsa.entries().unwrap() {
        println!("  {word}, {value}");
    }

    println!("\nDump:\n{}", dump(&bytes).unwrap());
}
