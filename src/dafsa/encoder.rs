use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::label::{encode_label, encode_prefix, encode_value};
use super::links::encode_links;
use super::node::{Graph, Node, NodeId};
use super::topo::top_sort;

/// The node a link run belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    /// The unlabelled root.
    Root,
    /// Any other node.
    Node(NodeId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Root => f.write_str("root"),
            Owner::Node(id) => write!(f, "node {id}"),
        }
    }
}

/// Errors that can occur while encoding a graph.
///
/// All of them mean the graph cannot be represented, either because it is
/// too large for the offset widths or because it breaks the graph contract.
/// No bytes are produced when encoding fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The root has no children, so there is nothing to link to.
    #[error("the dictionary is empty")]
    EmptyGraph,
    /// An internal node without children cannot end a word.
    #[error("node {node} has no children")]
    NoChildren {
        /// The childless node.
        node: NodeId,
    },
    /// A link would need more than 21 bits.
    #[error("{owner} needs a link distance of {distance}, outside of 1..2^21")]
    DistanceOutOfRange {
        /// Node whose link run overflowed.
        owner: Owner,
        /// The distance that did not fit.
        distance: usize,
    },
    /// The link run of a node kept changing size.
    #[error("link run of {owner} did not settle after {rounds} sizing rounds")]
    SizingDidNotConverge {
        /// Node whose link run did not settle.
        owner: Owner,
        /// Number of rounds tried.
        rounds: usize,
    },
    /// Some nodes could never be released by the topological sort.
    #[error("{remaining} nodes are part of a cycle")]
    Cycle {
        /// Number of nodes left unordered.
        remaining: usize,
    },
}

/// Tuning knobs for [`Encoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// How many times a link run may be re-encoded before giving up.
    ///
    /// Only the first link of a run depends on the run's size, and it can
    /// only shrink from three bytes to one, so real graphs settle in at most
    /// four rounds.
    pub max_sizing_rounds: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            max_sizing_rounds: 8,
        }
    }
}

/// Serializes a [`Graph`] into the DAFSA byte format.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Creates an encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Encoder { config }
    }

    /// Encodes `graph`.
    ///
    /// Nodes are emitted children first into a buffer that grows towards
    /// the root, and the buffer is reversed at the end so that the root's
    /// link run comes first and every link points forward.
    pub fn encode(&self, graph: &Graph) -> Result<Vec<u8>, EncodeError> {
        if graph.root().is_empty() {
            return Err(EncodeError::EmptyGraph);
        }
        let order = top_sort(graph)?;
        let rounds = self.config.max_sizing_rounds;

        let mut output = Vec::new();
        let mut offsets: Vec<Option<usize>> = vec![None; graph.len()];
        for &id in order.iter().rev() {
            match graph.node(id) {
                Node::Value(value) => output.push(encode_value(*value)),
                Node::Char { ch, children } => match children.as_slice() {
                    [] => return Err(EncodeError::NoChildren { node: id }),
                    [only] if offsets[only.index()] == Some(output.len()) => {
                        output.push(encode_prefix(*ch));
                    }
                    _ => {
                        let links =
                            encode_links(Owner::Node(id), children, &offsets, output.len(), rounds)?;
                        output.extend(links);
                        output.push(encode_label(*ch));
                    }
                },
            }
            offsets[id.index()] = Some(output.len());
        }

        let links = encode_links(Owner::Root, graph.root(), &offsets, output.len(), rounds)?;
        output.extend(links);
        output.reverse();

        debug!(nodes = order.len(), bytes = output.len(), "encoded dafsa");
        Ok(output)
    }
}

/// Encodes `graph` with the default configuration.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::builder::build_dafsa;
/// use libdafsa::dafsa::encoder::encode;
///
/// let graph = build_dafsa([("aa", 1), ("a", 2)]).unwrap();
/// let bytes = encode(&graph).unwrap();
/// assert_eq!(bytes, [0x81, 0xE1, 0x02, 0x81, 0x82, 0x61, 0x81]);
/// ```
pub fn encode(graph: &Graph) -> Result<Vec<u8>, EncodeError> {
    Encoder::default().encode(graph)
}
