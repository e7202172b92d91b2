use std::fmt;

use smallvec::SmallVec;

/// Largest return value a node can carry.
pub const MAX_VALUE: u8 = 0x0F;

/// Identity of a node inside a [`Graph`].
///
/// Two nodes are the same node only if they have the same id; structurally
/// identical nodes with different ids are distinct as far as the encoder is
/// concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the graph's arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Child list of a node, in the order the children were first inserted.
pub type Children = SmallVec<[NodeId; 2]>;

/// A node in the DAFSA.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// An internal node labelled with a printable ASCII character.
    Char {
        /// The label character.
        ch: u8,
        /// Outgoing edges. Each child is keyed by its own label.
        children: Children,
    },
    /// End sentinel carrying the return value of the word that ends here.
    Value(u8),
}

impl Node {
    /// The byte a parent matches against when choosing this child: the
    /// character for [`Node::Char`], the raw value for [`Node::Value`].
    #[inline]
    pub fn key(&self) -> u8 {
        match self {
            Node::Char { ch, .. } => *ch,
            Node::Value(value) => *value,
        }
    }

    /// Outgoing edges of this node. Empty for end sentinels.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Char { children, .. } => children,
            Node::Value(_) => &[],
        }
    }

    /// True for end sentinels.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Node::Value(_))
    }
}

/// An immutable DAFSA graph: an arena of nodes plus the root's edges.
///
/// The root has no label and no value, so it is not stored in the arena.
/// Graphs are normally produced by [`Builder`](super::builder::Builder), but
/// can be assembled by hand with [`Graph::push`] and [`Graph::set_root`].
/// Nodes can only reference nodes pushed before them, so a hand-built graph
/// is acyclic by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    root: Children,
}

impl Graph {
    /// Assembles a graph without checking that children precede parents.
    #[cfg(test)]
    pub(crate) fn from_parts(nodes: Vec<Node>, root: Children) -> Self {
        Graph { nodes, root }
    }

    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the arena and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `node` references an id that is not in the graph yet.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        assert!(
            node.children().iter().all(|c| *c < id),
            "child of {id} is not in the graph"
        );
        self.nodes.push(node);
        id
    }

    /// Adds a character node with the given children.
    pub fn push_char(&mut self, ch: u8, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(Node::Char {
            ch,
            children: children.into_iter().collect(),
        })
    }

    /// Adds an end sentinel carrying `value`.
    pub fn push_value(&mut self, value: u8) -> NodeId {
        self.push(Node::Value(value))
    }

    /// Replaces the root's edges.
    ///
    /// # Panics
    ///
    /// Panics if a child is not in the graph.
    pub fn set_root(&mut self, children: impl IntoIterator<Item = NodeId>) {
        let root: Children = children.into_iter().collect();
        assert!(
            root.iter().all(|c| c.index() < self.nodes.len()),
            "root child is not in the graph"
        );
        self.root = root;
    }

    /// The root's edges.
    #[inline]
    pub fn root(&self) -> &[NodeId] {
        &self.root
    }

    /// Returns the node with the given id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Iterates over all nodes in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    /// Number of nodes in the arena, the root excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the child of `children` whose key is `key`, if any.
    pub fn child(&self, children: &[NodeId], key: u8) -> Option<NodeId> {
        children.iter().copied().find(|&c| self.node(c).key() == key)
    }

    /// Walks `word` from the root and returns the value stored for it.
    pub fn get(&self, word: &[u8]) -> Option<u8> {
        let children = word
            .iter()
            .try_fold(self.root(), |children, &ch| {
                self.child(children, ch).map(|c| self.node(c).children())
            })?;
        children.iter().find_map(|&c| match self.node(c) {
            Node::Value(value) => Some(*value),
            Node::Char { .. } => None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_graph() {
        let graph = Graph::new();
        assert!(graph.is_empty());
        assert!(graph.root().is_empty());
        assert_eq!(graph.get(b"a"), None);
    }

    #[test]
    fn keys() {
        assert_eq!(Node::Value(3).key(), 3);
        let node = Node::Char {
            ch: b'x',
            children: Children::new(),
        };
        assert_eq!(node.key(), b'x');
        assert!(!node.is_value());
    }

    #[test]
    fn get_follows_edges() {
        let mut graph = Graph::new();
        let one = graph.push_value(1);
        let two = graph.push_value(2);
        let inner = graph.push_char(b'a', [one]);
        let outer = graph.push_char(b'a', [inner, two]);
        graph.set_root([outer]);

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get(b"a"), Some(2));
        assert_eq!(graph.get(b"aa"), Some(1));
        assert_eq!(graph.get(b"aaa"), None);
        assert_eq!(graph.get(b"b"), None);
        assert_eq!(graph.get(b""), None);
    }

    #[test]
    #[should_panic(expected = "is not in the graph")]
    fn forward_reference_panics() {
        let mut graph = Graph::new();
        graph.push_char(b'a', [NodeId(5)]);
    }

    #[test]
    #[should_panic(expected = "is not in the graph")]
    fn root_from_another_graph_panics() {
        let mut other = Graph::new();
        other.push_value(1);
        let foreign = other.push_char(b'a', [NodeId(0)]);

        let mut graph = Graph::new();
        graph.push_value(1);
        graph.set_root([foreign]);
    }
}
