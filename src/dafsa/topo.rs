use tracing::debug;

use super::encoder::EncodeError;
use super::node::{Graph, NodeId};

/// Lists every node reachable from the root, parents before children.
///
/// Each node is released once all of its parents have been listed. The root
/// itself never blocks its children. Released nodes are kept on a stack, so
/// the most recently released node is listed next.
pub fn top_sort(graph: &Graph) -> Result<Vec<NodeId>, EncodeError> {
    let mut incoming = vec![0usize; graph.len()];
    let mut seen = vec![false; graph.len()];
    let mut reachable = 0;

    // Count one incoming edge per parent reference, expanding each node the
    // first time it is reached.
    let mut stack: Vec<NodeId> = graph.root().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        incoming[id.index()] += 1;
        if !seen[id.index()] {
            seen[id.index()] = true;
            reachable += 1;
            stack.extend(graph.node(id).children().iter().rev());
        }
    }
    for id in graph.root() {
        incoming[id.index()] -= 1;
    }

    let mut waiting: Vec<NodeId> = graph
        .root()
        .iter()
        .copied()
        .filter(|id| incoming[id.index()] == 0)
        .collect();
    let mut nodes = Vec::with_capacity(reachable);
    while let Some(id) = waiting.pop() {
        nodes.push(id);
        for &child in graph.node(id).children() {
            let count = &mut incoming[child.index()];
            *count -= 1;
            if *count == 0 {
                waiting.push(child);
            }
        }
    }

    if nodes.len() != reachable {
        return Err(EncodeError::Cycle {
            remaining: reachable - nodes.len(),
        });
    }
    debug!(nodes = nodes.len(), "ordered graph");
    Ok(nodes)
}
