use hashbrown::HashMap;
use mark_last::MarkLastIterator;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use super::node::{Children, Graph, MAX_VALUE, Node, NodeId};

const ROOT: usize = 0;

/// Errors that can occur when adding words to a [`Builder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Words must contain at least one character.
    #[error("empty word")]
    EmptyWord,
    /// Only printable 7-bit ASCII (`0x20..=0x7E`) can be encoded.
    #[error("{word:?} contains byte {ch:#04x}, which is not printable 7-bit ASCII")]
    InvalidChar {
        /// The offending word.
        word: String,
        /// The first byte outside the printable range.
        ch: u8,
    },
    /// Return values are limited to four bits.
    #[error("value {value} of {word:?} is out of range 0..=15")]
    InvalidValue {
        /// The word the value belongs to.
        word: String,
        /// The rejected value.
        value: u8,
    },
    /// The same word was added more than once.
    #[error("{word:?} was added twice")]
    Duplicate {
        /// The repeated word.
        word: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Root,
    Char(u8),
    Value(u8),
}

struct TrieNode {
    kind: Kind,
    children: SmallVec<[usize; 2]>,
}

/// Register key: a node is equivalent to another if it has the same label
/// and the same set of (already canonical) children.
#[derive(PartialEq, Eq, Hash)]
struct Signature {
    kind: Kind,
    children: SmallVec<[NodeId; 4]>,
}

/// Builds a minimal [`Graph`] from `(word, value)` pairs.
///
/// Words can be added in any order. They are first collected into a trie
/// that remembers the order in which every edge was first seen, then the
/// trie is folded bottom-up into a graph where nodes with equal right
/// languages are shared. The first node registered for an equivalence class
/// is the one that survives, together with its child order, so the same
/// input sequence always produces the same graph.
pub struct Builder {
    trie: Vec<TrieNode>,
    words: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Builder {
            trie: vec![TrieNode {
                kind: Kind::Root,
                children: SmallVec::new(),
            }],
            words: 0,
        }
    }

    /// Number of words added so far.
    pub fn word_count(&self) -> usize {
        self.words
    }

    /// Adds a word and the value a lookup of that word should return.
    ///
    /// # Errors
    ///
    /// Fails if the word is empty, contains anything but printable 7-bit
    /// ASCII, was already added, or if `value` does not fit in four bits.
    /// A failed call leaves the builder unchanged.
    pub fn add_word(&mut self, word: impl AsRef<[u8]>, value: u8) -> Result<(), BuilderError> {
        let word = word.as_ref();
        if word.is_empty() {
            return Err(BuilderError::EmptyWord);
        }
        if let Some(&ch) = word.iter().find(|ch| !is_printable(**ch)) {
            return Err(BuilderError::InvalidChar {
                word: lossy(word),
                ch,
            });
        }
        if value > MAX_VALUE {
            return Err(BuilderError::InvalidValue {
                word: lossy(word),
                value,
            });
        }
        if self.contains(word) {
            return Err(BuilderError::Duplicate { word: lossy(word) });
        }

        let mut cursor = ROOT;
        for (last, &ch) in word.iter().mark_last() {
            cursor = self.child_or_insert(cursor, Kind::Char(ch));
            if last {
                self.insert(cursor, Kind::Value(value));
            }
        }
        self.words += 1;
        Ok(())
    }

    /// Minimizes the collected trie into a graph.
    pub fn build(self) -> Graph {
        let mut graph = Graph::new();
        let mut register: HashMap<Signature, NodeId> = HashMap::new();
        let mut canonical: Vec<Option<NodeId>> = vec![None; self.trie.len()];

        // Post-order over the trie; children are pushed in reverse so they
        // are visited in insertion order.
        let mut stack = vec![(ROOT, false)];
        while let Some((index, expanded)) = stack.pop() {
            let node = &self.trie[index];
            if !expanded {
                stack.push((index, true));
                stack.extend(node.children.iter().rev().map(|&c| (c, false)));
                continue;
            }

            let children: Children = node
                .children
                .iter()
                .map(|&c| canonical[c].expect("children are folded before their parent"))
                .collect();

            let (kind, folded) = match node.kind {
                Kind::Root => {
                    graph.set_root(children);
                    continue;
                }
                Kind::Char(ch) => (node.kind, Node::Char { ch, children }),
                Kind::Value(value) => (node.kind, Node::Value(value)),
            };
            let mut key: SmallVec<[NodeId; 4]> = folded.children().iter().copied().collect();
            key.sort_unstable();
            let signature = Signature {
                kind,
                children: key,
            };
            let id = *register
                .entry(signature)
                .or_insert_with(|| graph.push(folded));
            canonical[index] = Some(id);
        }

        debug!(
            words = self.words,
            trie_nodes = self.trie.len() - 1,
            graph_nodes = graph.len(),
            "minimized dictionary"
        );
        graph
    }

    fn contains(&self, word: &[u8]) -> bool {
        word.iter()
            .try_fold(ROOT, |index, &ch| self.find(index, Kind::Char(ch)))
            .is_some_and(|index| {
                self.trie[index]
                    .children
                    .iter()
                    .any(|&c| matches!(self.trie[c].kind, Kind::Value(_)))
            })
    }

    fn find(&self, index: usize, kind: Kind) -> Option<usize> {
        self.trie[index]
            .children
            .iter()
            .copied()
            .find(|&c| self.trie[c].kind == kind)
    }

    fn child_or_insert(&mut self, index: usize, kind: Kind) -> usize {
        match self.find(index, kind) {
            Some(child) => child,
            None => self.insert(index, kind),
        }
    }

    fn insert(&mut self, parent: usize, kind: Kind) -> usize {
        let index = self.trie.len();
        self.trie.push(TrieNode {
            kind,
            children: SmallVec::new(),
        });
        self.trie[parent].children.push(index);
        index
    }
}

/// Builds a minimal graph from an iterator of `(word, value)` pairs.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::builder::build_dafsa;
///
/// let graph = build_dafsa([("aa", 1), ("a", 2)]).unwrap();
/// assert_eq!(graph.get(b"aa"), Some(1));
/// assert_eq!(graph.get(b"a"), Some(2));
/// assert_eq!(graph.get(b"b"), None);
/// ```
pub fn build_dafsa<W: AsRef<[u8]>>(
    words: impl IntoIterator<Item = (W, u8)>,
) -> Result<Graph, BuilderError> {
    let mut builder = Builder::new();
    for (word, value) in words {
        builder.add_word(word, value)?;
    }
    Ok(builder.build())
}

/// True for bytes that can appear in a word.
#[inline]
pub(crate) fn is_printable(ch: u8) -> bool {
    (0x20..0x7F).contains(&ch)
}

fn lossy(word: &[u8]) -> String {
    String::from_utf8_lossy(word).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    fn chars(graph: &Graph) -> usize {
        graph.nodes().filter(|(_, node)| !node.is_value()).count()
    }

    #[test]
    fn graph_shares_nodes() {
        let single = build_dafsa([("ABCDEF", 1)]).unwrap();
        assert_eq!(single.len(), "ABCDEF".len() + 1);

        let shared = build_dafsa([("ABCDEF", 1), ("ABDEF", 1), ("ABEF", 1), ("AF", 1)]).unwrap();
        assert_eq!(single.len(), shared.len());
    }

    #[test]
    fn different_values_are_not_shared() {
        let graph = build_dafsa([("aa", 1), ("ba", 2)]).unwrap();
        // a, b, two trailing a's and two values.
        assert_eq!(graph.len(), 6);
        assert_eq!(chars(&graph), 4);
    }

    #[test]
    fn suffixes_are_shared() {
        let testdata = [
            "ASUFFIX",
            "BSUFFIX",
            "CDESUFFIX",
            "FFFFFFFSUFFIX",
            "INBETWEEN",
            "JSUFFIX",
            "XXSUFFIX",
        ];
        let graph = build_dafsa(testdata.iter().map(|w| (w, 4))).unwrap();

        let walk = |prefix: &str| -> Option<NodeId> {
            let mut children = graph.root();
            let mut node = None;
            for ch in prefix.bytes() {
                let next = graph.child(children, ch)?;
                children = graph.node(next).children();
                node = Some(next);
            }
            node
        };
        let suffix_node = walk("AS").unwrap();
        for word in testdata {
            if word.ends_with("SUFFIX") {
                let prefix_len = word.len() - "SUFFIX".len();
                assert_eq!(walk(&word[..prefix_len + 1]), Some(suffix_node), "{word}");
            }
        }
    }

    #[test]
    fn children_keep_insertion_order() {
        let graph = build_dafsa([("aa", 1), ("bbb", 2), ("baa", 1)]).unwrap();
        let keys = |children: &[NodeId]| -> Vec<u8> {
            children.iter().map(|&c| graph.node(c).key()).collect()
        };
        assert_eq!(keys(graph.root()), b"ab");
        let b = graph.child(graph.root(), b'b').unwrap();
        assert_eq!(keys(graph.node(b).children()), b"ba");

        let a = graph.child(graph.root(), b'a').unwrap();
        assert_eq!(graph.child(graph.node(b).children(), b'a'), Some(a));
    }

    #[test]
    fn value_child_keeps_insertion_order() {
        let graph = build_dafsa([("aa", 1), ("a", 2)]).unwrap();
        let a = graph.child(graph.root(), b'a').unwrap();
        let keys: Vec<u8> = graph
            .node(a)
            .children()
            .iter()
            .map(|&c| graph.node(c).key())
            .collect();
        assert_eq!(keys, [b'a', 2]);
    }

    #[test]
    fn input_order_does_not_change_the_language() {
        let words = [("alfa", 0), ("bravo", 1), ("brave", 2), ("charlie", 4), ("alf", 1)];
        for permutation in words.iter().permutations(words.len()) {
            let graph = build_dafsa(permutation.iter().map(|&&(w, v)| (w, v))).unwrap();
            for (word, value) in words {
                assert_eq!(graph.get(word.as_bytes()), Some(value), "{word}");
            }
            assert_eq!(graph.get(b"br"), None);
            assert_eq!(graph.get(b"alfas"), None);
        }
    }

    #[test]
    fn same_input_gives_same_graph() {
        let words = [("one", 1), ("two", 2), ("three", 4), ("tree", 4)];
        assert_eq!(build_dafsa(words).unwrap(), build_dafsa(words).unwrap());
    }

    #[test]
    fn empty_word_gives_error() {
        assert_eq!(build_dafsa([("", 1)]), Err(BuilderError::EmptyWord));
    }

    #[test]
    fn non_printable_gives_error() {
        let err = build_dafsa([("tab\there", 1)]).unwrap_err();
        assert_eq!(
            err,
            BuilderError::InvalidChar {
                word: "tab\there".into(),
                ch: b'\t'
            }
        );

        let err = build_dafsa([("caf\u{e9}", 1)]).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidChar { ch: 0xC3, .. }));
    }

    #[test]
    fn value_out_of_range_gives_error() {
        let err = build_dafsa([("ok", 15), ("wide", 16)]).unwrap_err();
        assert_eq!(
            err,
            BuilderError::InvalidValue {
                word: "wide".into(),
                value: 16
            }
        );
    }

    #[test]
    fn same_word_twice_gives_error() {
        let res = build_dafsa([("ALFA", 1), ("BRAVO", 1), ("ALFA", 2)]);
        assert_eq!(
            res.unwrap_err(),
            BuilderError::Duplicate {
                word: "ALFA".into()
            }
        );
    }

    #[test]
    fn failed_add_leaves_builder_unchanged() {
        let mut builder = Builder::new();
        builder.add_word("abc", 1).unwrap();
        assert!(builder.add_word("abc", 2).is_err());
        assert!(builder.add_word("ab\x7f", 2).is_err());
        assert_eq!(builder.word_count(), 1);
        let graph = builder.build();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get(b"abc"), Some(1));
    }

    #[test]
    fn prefix_and_extension_coexist() {
        let graph = build_dafsa([("car", 1), ("carpet", 2), ("ca", 4)]).unwrap();
        assert_eq!(graph.get(b"ca"), Some(4));
        assert_eq!(graph.get(b"car"), Some(1));
        assert_eq!(graph.get(b"carpet"), Some(2));
        assert_eq!(graph.get(b"carp"), None);
    }
}
