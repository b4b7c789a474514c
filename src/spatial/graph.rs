//! Spatial graph used by roadmap planners
//!
//! An undirected, weighted, append-only graph over sampled configurations.
//! Nodes live in a dense arena and are addressed by the index they were
//! inserted at, so handles stay valid until the graph is dropped.
//!
//! Neighbor queries and edge lookups are linear scans. Node budgets are in
//! the hundreds, so `find_nn` costs O(n) and `edge_exists` O(degree).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{self, Write};

use itertools::Itertools;
use log::{debug, error, trace, warn};
use ordered_float::OrderedFloat;

use crate::common::{euclidean, Configuration, SharedMetric};

/// Dense vertex handle, assigned in insertion order
pub type NodeId = usize;

pub const DEFAULT_MAX_NODES: usize = 100;
pub const DEFAULT_NEIGHBOR_THRESHOLD: f64 = 5.0;

/// A roadmap vertex and the configuration it stands for
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub config: Configuration,
}

/// Result of a best-first search over the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStatus {
    /// The goal vertex was expanded
    Found,
    /// The open set emptied without reaching the goal
    Exhausted,
}

pub struct SpatialGraph {
    max_nodes: usize,
    neighbor_threshold: f64,
    metric: SharedMetric,
    nodes: Vec<GraphNode>,
    adjacency: Vec<Vec<(NodeId, f64)>>,
    edge_count: usize,
}

impl Default for SpatialGraph {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NODES, DEFAULT_NEIGHBOR_THRESHOLD)
    }
}

impl SpatialGraph {
    pub fn new(max_nodes: usize, neighbor_threshold: f64) -> Self {
        Self::with_metric(max_nodes, neighbor_threshold, euclidean())
    }

    pub fn with_metric(max_nodes: usize, neighbor_threshold: f64, metric: SharedMetric) -> Self {
        SpatialGraph {
            max_nodes,
            neighbor_threshold,
            metric,
            nodes: Vec::with_capacity(max_nodes),
            adjacency: Vec::with_capacity(max_nodes),
            edge_count: 0,
        }
    }

    /// Append a node. Never deduplicates or rejects.
    pub fn add_node(&mut self, config: Configuration) -> NodeId {
        let id = self.nodes.len();
        if id >= self.max_nodes {
            warn!(
                "graph holds {} nodes, beyond its configured maximum of {}",
                id + 1,
                self.max_nodes
            );
        }
        self.nodes.push(GraphNode { id, config });
        self.adjacency.push(Vec::new());
        id
    }

    /// Join `u` and `v` with an edge weighted by their distance.
    ///
    /// Fails without touching the graph for self-loops, duplicate edges,
    /// unknown handles, and pairs further apart than the neighbor threshold.
    /// Collision checking is the caller's job.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        if u >= self.nodes.len() || v >= self.nodes.len() {
            error!("add_edge on non-existent vertex ({}, {}), {} vertices", u, v, self.nodes.len());
            return false;
        }
        if self.edge_exists(u, v) {
            debug!("edge ({}, {}) already exists", u, v);
            return false;
        }

        let dist = self.distance(u, v);
        // also rejects a NaN distance
        if !(dist <= self.neighbor_threshold) {
            debug!(
                "edge ({}, {}) rejected, length {:.4} over threshold {:.4}",
                u, v, dist, self.neighbor_threshold
            );
            return false;
        }

        self.adjacency[u].push((v, dist));
        self.adjacency[v].push((u, dist));
        self.edge_count += 1;
        true
    }

    /// Drop every node with id `len` or above together with its edges.
    /// Handles below `len` stay valid.
    pub fn truncate(&mut self, len: NodeId) {
        while self.nodes.len() > len {
            let id = self.nodes.len() - 1;
            self.nodes.pop();
            for (w, _) in self.adjacency.pop().unwrap_or_default() {
                // each edge is counted once, at its higher endpoint
                if w < id {
                    self.adjacency[w].retain(|&(x, _)| x != id);
                    self.edge_count -= 1;
                }
            }
        }
    }

    /// Every node within the neighbor threshold of `n` that is not already
    /// joined to it. `n` itself is never included.
    pub fn find_nn(&self, n: NodeId) -> Vec<GraphNode> {
        if self.nodes.len() <= 1 {
            return Vec::new();
        }
        if n >= self.nodes.len() {
            error!("vertex non existent vertexid = [{}] num_vert[{}]", n, self.nodes.len());
            return Vec::new();
        }

        let query = &self.nodes[n].config;
        self.nodes
            .iter()
            .filter(|node| !self.edge_exists(n, node.id))
            .filter(|node| self.metric.eval(query, &node.config) <= self.neighbor_threshold)
            .cloned()
            .collect()
    }

    /// True if `u` and `v` are adjacent. A node counts as adjacent to itself.
    pub fn edge_exists(&self, u: NodeId, v: NodeId) -> bool {
        if u == v {
            return true;
        }
        match self.adjacency.get(v) {
            Some(adjacent) => adjacent.iter().any(|&(w, _)| w == u),
            None => false,
        }
    }

    /// Shortest path by Dijkstra, `from` first and `to` last.
    ///
    /// Returns `None` when `to` lies in a different connected component.
    pub fn find_path_dijkstra(&self, from: NodeId, to: NodeId) -> Option<Vec<GraphNode>> {
        if !self.contains(from) || !self.contains(to) {
            error!("dijkstra between unknown vertices {} and {}", from, to);
            return None;
        }

        let mut predecessor: Vec<NodeId> = (0..self.nodes.len()).collect();
        self.best_first(from, None, &mut predecessor);
        self.trace_predecessors(&predecessor, from, to)
    }

    /// Shortest path by A*, using the metric distance to `to` as heuristic.
    ///
    /// The search stops as soon as `to` is expanded. Returns `None` if the
    /// open set runs dry first.
    pub fn find_path_astar(&self, from: NodeId, to: NodeId) -> Option<Vec<GraphNode>> {
        if !self.contains(from) || !self.contains(to) {
            error!("A* between unknown vertices {} and {}", from, to);
            return None;
        }

        debug!("Running A* from {} to {}", from, to);
        let mut predecessor: Vec<NodeId> = (0..self.nodes.len()).collect();
        match self.best_first(from, Some(to), &mut predecessor) {
            SearchStatus::Found => self.trace_predecessors(&predecessor, from, to),
            SearchStatus::Exhausted => None,
        }
    }

    /// Best-first expansion from `from`. With a goal, it is guided by the
    /// distance heuristic and stops once the goal is popped; without one it
    /// is plain Dijkstra over the whole component.
    fn best_first(&self, from: NodeId, goal: Option<NodeId>, predecessor: &mut [NodeId]) -> SearchStatus {
        let heuristic = |v: NodeId| match goal {
            Some(g) => self.distance(v, g),
            None => 0.0,
        };

        let mut cost = vec![f64::INFINITY; self.nodes.len()];
        let mut closed = vec![false; self.nodes.len()];
        let mut open = BinaryHeap::new();

        cost[from] = 0.0;
        open.push(Reverse((OrderedFloat(heuristic(from)), from)));

        while let Some(Reverse((_, u))) = open.pop() {
            if closed[u] {
                continue;
            }
            closed[u] = true;

            if Some(u) == goal {
                return SearchStatus::Found;
            }

            for &(v, weight) in &self.adjacency[u] {
                if closed[v] {
                    continue;
                }
                let new_cost = cost[u] + weight;
                if new_cost < cost[v] {
                    cost[v] = new_cost;
                    predecessor[v] = u;
                    open.push(Reverse((OrderedFloat(new_cost + heuristic(v)), v)));
                }
            }
        }

        SearchStatus::Exhausted
    }

    /// Walk predecessor links back from `to` until a fixed point. The path is
    /// only valid if that fixed point is `from`.
    fn trace_predecessors(&self, predecessor: &[NodeId], from: NodeId, to: NodeId) -> Option<Vec<GraphNode>> {
        let mut path = vec![to];
        let mut child = to;
        while predecessor[child] != child {
            child = predecessor[child];
            path.push(child);
        }

        if child != from {
            trace!("walk from {} ended at {} instead of {}", to, child, from);
            return None;
        }

        Some(path.into_iter().rev().map(|id| self.nodes[id].clone()).collect())
    }

    pub fn get_node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn neighbor_threshold(&self) -> f64 {
        self.neighbor_threshold
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Nodes adjacent to `u` with the stored edge weights
    pub fn neighbors(&self, u: NodeId) -> &[(NodeId, f64)] {
        self.adjacency.get(u).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weight stored when the edge was inserted
    pub fn weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.neighbors(u).iter().find(|&&(w, _)| w == v).map(|&(_, weight)| weight)
    }

    /// Each undirected edge once, as `(u, v, weight)` with `u < v`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, adjacent)| {
            adjacent
                .iter()
                .filter(move |&&(v, _)| u < v)
                .map(move |&(v, weight)| (u, v, weight))
        })
    }

    /// Summed edge weights along a node sequence, `None` if two consecutive
    /// nodes are not adjacent
    pub fn path_cost(&self, path: &[GraphNode]) -> Option<f64> {
        path.iter()
            .tuple_windows()
            .map(|(a, b)| self.weight(a.id, b.id))
            .sum()
    }

    /// Dump the graph in Graphviz format
    pub fn write_graphviz<W: Write>(&self, out: &mut W) -> io::Result<()> {
        crate::utils::graphviz::write_graph(self, out)
    }

    fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    fn distance(&self, u: NodeId, v: NodeId) -> f64 {
        self.metric.eval(&self.nodes[u].config, &self.nodes[v].config)
    }
}
