//! Dependency graph construction and traversal using petgraph.
//!
//! Backs the `imports://` adapter: nodes are file paths (or any other
//! caller-chosen identifier), edges are import/call/extends/implements
//! relationships. Used for:
//! - `imports://?circular` (Tarjan's SCC, any component with >1 node is a cycle)
//! - `imports://<path>?depth=N` upstream/downstream traversal
//! - `imports://?violations` (edges crossing a configured layer boundary
//!   the wrong way, via `edges()`)
//!
//! `?unused` (imported names never referenced locally) is a per-file name
//! scan over the Parser Frontend's output, not a graph property, and lives
//! in `adapters::imports` instead.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::RwLock;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{RevealError, RevealResult};
use crate::model::DependencyKind;

/// Thread-safe dependency graph over an arbitrary, hashable node identifier
/// `N` (a file path for `imports://`, a symbol id for a future symbol-level
/// graph).
pub struct DependencyGraph<N: Eq + Hash + Clone> {
    inner: RwLock<GraphInner<N>>,
}

struct GraphInner<N: Eq + Hash + Clone> {
    graph: DiGraph<N, DependencyKind>,
    node_index: HashMap<N, NodeIndex>,
}

impl<N: Eq + Hash + Clone> DependencyGraph<N> {
    /// Create a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphInner { graph: DiGraph::new(), node_index: HashMap::new() }),
        }
    }

    fn lock_read(&self) -> RevealResult<std::sync::RwLockReadGuard<'_, GraphInner<N>>> {
        self.inner.read().map_err(|e| RevealError::Internal(format!("graph lock poisoned: {e}")))
    }

    fn lock_write(&self) -> RevealResult<std::sync::RwLockWriteGuard<'_, GraphInner<N>>> {
        self.inner.write().map_err(|e| RevealError::Internal(format!("graph lock poisoned: {e}")))
    }

    /// Add a node to the graph if it isn't already present.
    pub fn add_node(&self, id: N) -> RevealResult<()> {
        let mut inner = self.lock_write()?;
        if !inner.node_index.contains_key(&id) {
            let idx = inner.graph.add_node(id.clone());
            inner.node_index.insert(id, idx);
        }
        Ok(())
    }

    /// Add a directed edge, creating either endpoint's node if needed.
    pub fn add_edge(&self, source: N, target: N, kind: DependencyKind) -> RevealResult<()> {
        let mut inner = self.lock_write()?;
        let source_idx = *inner
            .node_index
            .entry(source.clone())
            .or_insert_with(|| inner.graph.add_node(source));
        let target_idx = *inner
            .node_index
            .entry(target.clone())
            .or_insert_with(|| inner.graph.add_node(target));
        inner.graph.add_edge(source_idx, target_idx, kind);
        Ok(())
    }

    /// Nodes the given node depends on (outgoing edges), BFS up to `depth` hops.
    pub fn upstream(&self, id: &N, depth: usize) -> RevealResult<Vec<N>> {
        let inner = self.lock_read()?;
        let Some(&node) = inner.node_index.get(id) else {
            return Ok(Vec::new());
        };
        Ok(bfs_collect(&inner.graph, node, depth, Direction::Outgoing))
    }

    /// Nodes that depend on the given node (incoming edges), BFS up to `depth` hops.
    pub fn downstream(&self, id: &N, depth: usize) -> RevealResult<Vec<N>> {
        let inner = self.lock_read()?;
        let Some(&node) = inner.node_index.get(id) else {
            return Ok(Vec::new());
        };
        Ok(bfs_collect(&inner.graph, node, depth, Direction::Incoming))
    }

    /// Whether the graph has any cycle.
    pub fn has_cycles(&self) -> bool {
        self.inner.read().map(|inner| is_cyclic_directed(&inner.graph)).unwrap_or(false)
    }

    /// Strongly connected components with more than one node -- circular
    /// import groups -- via Tarjan's algorithm.
    pub fn find_cycles(&self) -> RevealResult<Vec<Vec<N>>> {
        let inner = self.lock_read()?;
        let sccs = petgraph::algo::tarjan_scc(&inner.graph);
        Ok(sccs
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(|n| inner.graph[n].clone()).collect())
            .collect())
    }

    /// All edges as `(source, target)` node-id pairs, in insertion order.
    pub fn edges(&self) -> RevealResult<Vec<(N, N)>> {
        let inner = self.lock_read()?;
        Ok(inner
            .graph
            .edge_indices()
            .filter_map(|e| inner.graph.edge_endpoints(e))
            .map(|(s, t)| (inner.graph[s].clone(), inner.graph[t].clone()))
            .collect())
    }

    /// Shortest undirected hop distance between two nodes, if connected.
    pub fn distance(&self, from: &N, to: &N) -> RevealResult<Option<usize>> {
        let inner = self.lock_read()?;
        let (Some(&from_node), Some(&to_node)) = (inner.node_index.get(from), inner.node_index.get(to)) else {
            return Ok(None);
        };

        let mut visited = HashMap::new();
        let mut queue = VecDeque::new();
        visited.insert(from_node, 0usize);
        queue.push_back(from_node);

        while let Some(current) = queue.pop_front() {
            let dist = visited[&current];
            if current == to_node {
                return Ok(Some(dist));
            }
            for direction in [Direction::Outgoing, Direction::Incoming] {
                for neighbor in inner.graph.neighbors_directed(current, direction) {
                    if let std::collections::hash_map::Entry::Vacant(e) = visited.entry(neighbor) {
                        e.insert(dist + 1);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Total node count.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.read().map(|i| i.graph.node_count()).unwrap_or(0)
    }

    /// Total edge count.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.read().map(|i| i.graph.edge_count()).unwrap_or(0)
    }
}

impl<N: Eq + Hash + Clone> Default for DependencyGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn bfs_collect<N: Eq + Hash + Clone>(
    graph: &DiGraph<N, DependencyKind>,
    start: NodeIndex,
    depth: usize,
    direction: Direction,
) -> Vec<N> {
    let mut visited = Vec::new();
    let mut seen_idx = std::collections::HashSet::new();
    seen_idx.insert(start);
    let mut frontier = vec![start];

    for _ in 0..depth {
        let mut next_frontier = Vec::new();
        for &n in &frontier {
            for neighbor in graph.neighbors_directed(n, direction) {
                if seen_idx.insert(neighbor) {
                    visited.push(graph[neighbor].clone());
                    next_frontier.push(neighbor);
                }
            }
        }
        frontier = next_frontier;
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_query_dependencies() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        graph.add_node(1).unwrap();
        graph.add_node(2).unwrap();
        graph.add_edge(1, 2, DependencyKind::Calls).unwrap();

        let upstream = graph.upstream(&1, 1).unwrap();
        assert_eq!(upstream, vec![2]);
    }

    #[test]
    fn upstream_unknown_node_is_empty() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        assert!(graph.upstream(&999, 1).unwrap().is_empty());
    }

    #[test]
    fn downstream_dependencies() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        graph.add_edge(1, 2, DependencyKind::Calls).unwrap();
        graph.add_edge(3, 2, DependencyKind::Imports).unwrap();

        let downstream = graph.downstream(&2, 1).unwrap();
        assert_eq!(downstream.len(), 2);
        assert!(downstream.contains(&1));
        assert!(downstream.contains(&3));
    }

    #[test]
    fn cycle_detection_via_tarjan() {
        let graph: DependencyGraph<String> = DependencyGraph::new();
        graph.add_edge("a".into(), "b".into(), DependencyKind::Imports).unwrap();
        graph.add_edge("b".into(), "c".into(), DependencyKind::Imports).unwrap();
        graph.add_edge("c".into(), "a".into(), DependencyKind::Imports).unwrap();

        assert!(graph.has_cycles());
        let cycles = graph.find_cycles().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
    }

    #[test]
    fn no_cycles() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        graph.add_edge(1, 2, DependencyKind::Imports).unwrap();
        graph.add_edge(2, 3, DependencyKind::Imports).unwrap();

        assert!(!graph.has_cycles());
        assert!(graph.find_cycles().unwrap().is_empty());
    }

    #[test]
    fn distance_between_nodes() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        graph.add_edge(1, 2, DependencyKind::Calls).unwrap();
        graph.add_edge(2, 3, DependencyKind::Calls).unwrap();

        assert_eq!(graph.distance(&1, &3).unwrap(), Some(2));
        assert_eq!(graph.distance(&1, &2).unwrap(), Some(1));
        assert_eq!(graph.distance(&1, &99).unwrap(), None);
    }

    #[test]
    fn edges_lists_source_target_pairs() {
        let graph: DependencyGraph<i64> = DependencyGraph::new();
        graph.add_edge(1, 2, DependencyKind::Imports).unwrap();
        graph.add_edge(2, 3, DependencyKind::Imports).unwrap();
        let edges = graph.edges().unwrap();
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&(1, 2)));
        assert!(edges.contains(&(2, 3)));
    }
}
