//! Vertex graph value type and stateless graph utilities
//!
//! A `VertexGraph` is the shared shape passed between the Voronoi builder,
//! the partition tracker and the pathfinder. Vertex ids are stable: removing
//! a vertex blanks its slot instead of shifting later ids, so every split of
//! the graph keeps addressing vertices by their original index.

pub mod state;

pub use state::{GraphPartition, GraphState, PartitionOperation, SplitSource};

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Directed edge key `(from, to)`; every edge is stored in both directions
pub type EdgeKey = (usize, usize);

/// Vertices, adjacency and weighted edges over stable vertex ids
///
/// `Clone` is the deep copy: all three containers are owned values, so a
/// clone can be split and mutated without touching the original.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexGraph {
    /// Coordinates by vertex id; `None` for degenerate or removed vertices
    pub vertices: Vec<Option<DVec2>>,
    /// Vertex id -> sorted neighbor ids
    pub adjacency: BTreeMap<usize, Vec<usize>>,
    /// `(u, v)` -> weight, present in both directions
    pub edges: BTreeMap<EdgeKey, f64>,
}

/// Centroid estimation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentroidMethod {
    /// Arithmetic mean of valid vertex coordinates
    Geometric,
    /// Mean weighted by adjacency degree, pulling towards well-connected hubs
    Weighted,
    /// The existing vertex minimizing total distance to all others
    Medoid,
}

/// Structural health report produced by `VertexGraph::validate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphValidation {
    /// Slots holding `None`
    pub null_vertices: usize,
    /// Slots holding a coordinate
    pub valid_vertices: usize,
    /// Valid vertices with no adjacency entry
    pub orphaned_vertices: usize,
    /// Edges with a missing endpoint or a non-finite weight
    pub invalid_edges: usize,
    /// Adjacency links or edges without their reverse counterpart
    pub asymmetric_links: usize,
    /// True only when every issue count above is zero
    pub is_valid: bool,
}

impl VertexGraph {
    /// Graph over the given vertices with an empty adjacency entry for each valid one
    pub fn with_vertices(vertices: Vec<Option<DVec2>>) -> Self {
        let adjacency = vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some())
            .map(|(id, _)| (id, Vec::new()))
            .collect();

        Self {
            vertices,
            adjacency,
            edges: BTreeMap::new(),
        }
    }

    /// Insert an undirected edge as two directed entries with equal weight
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) {
        if u == v {
            return;
        }
        for (a, b) in [(u, v), (v, u)] {
            let list = self.adjacency.entry(a).or_default();
            if let Err(pos) = list.binary_search(&b) {
                list.insert(pos, b);
            }
            self.edges.insert((a, b), weight);
        }
    }

    /// Coordinate of a vertex, `None` if the slot is empty or out of range
    #[inline]
    pub fn coordinate(&self, id: usize) -> Option<DVec2> {
        self.vertices.get(id).copied().flatten()
    }

    /// True when the vertex holds a coordinate
    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        self.coordinate(id).is_some()
    }

    /// Neighbor ids, empty if the vertex has no adjacency entry
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weight of the directed edge `u -> v`
    #[inline]
    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        self.edges.get(&(u, v)).copied()
    }

    /// Keys of every edge leaving `id`
    pub fn incident_edges(&self, id: usize) -> Vec<EdgeKey> {
        self.neighbors(id)
            .iter()
            .map(|&n| (id, n))
            .filter(|key| self.edges.contains_key(key))
            .collect()
    }

    /// Ids of every vertex holding a coordinate, ascending
    pub fn valid_vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(id, v)| v.map(|_| id))
    }

    /// Number of vertices holding a coordinate
    pub fn valid_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_some()).count()
    }

    /// Number of undirected edges
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Sum of edge weights along a vertex path, `None` if a hop has no edge
    pub fn path_cost(&self, path: &[usize]) -> Option<f64> {
        path.windows(2)
            .map(|pair| self.edge_weight(pair[0], pair[1]))
            .sum()
    }

    /// Remove vertices in place
    ///
    /// Blanks each slot, drops its adjacency entry, strips it from every other
    /// adjacency list and deletes every edge touching it.
    pub fn remove_vertices(&mut self, ids: &[usize]) {
        let removed: BTreeSet<usize> = ids
            .iter()
            .copied()
            .filter(|&id| id < self.vertices.len())
            .collect();
        if removed.is_empty() {
            return;
        }

        for &id in &removed {
            self.vertices[id] = None;
            self.adjacency.remove(&id);
        }
        for list in self.adjacency.values_mut() {
            list.retain(|n| !removed.contains(n));
        }
        self.edges
            .retain(|(u, v), _| !removed.contains(u) && !removed.contains(v));
    }

    /// Split into one subgraph per connected component
    ///
    /// Flood fill starts from every unvisited valid vertex in ascending id
    /// order. Each subgraph keeps the full vertex slot range with vertices
    /// outside its component blanked, so ids stay comparable across splits.
    pub fn connected_subgraphs(&self) -> Vec<VertexGraph> {
        let mut visited = vec![false; self.vertices.len()];
        let mut components = Vec::new();

        for start in self.valid_vertices() {
            if visited[start] {
                continue;
            }

            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            visited[start] = true;

            while let Some(current) = queue.pop_front() {
                component.insert(current);
                for &next in self.neighbors(current) {
                    if next < visited.len() && !visited[next] && self.contains(next) {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            components.push(self.induced_subgraph(&component));
        }

        components
    }

    /// Subgraph restricted to `members`, preserving vertex ids
    pub fn induced_subgraph(&self, members: &BTreeSet<usize>) -> VertexGraph {
        let mut vertices = vec![None; self.vertices.len()];
        for &id in members {
            vertices[id] = self.coordinate(id);
        }

        let adjacency = members
            .iter()
            .filter(|id| self.contains(**id))
            .map(|&id| {
                let list = self
                    .neighbors(id)
                    .iter()
                    .copied()
                    .filter(|n| members.contains(n))
                    .collect();
                (id, list)
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .filter(|((u, v), _)| members.contains(u) && members.contains(v))
            .map(|(&key, &weight)| (key, weight))
            .collect();

        VertexGraph {
            vertices,
            adjacency,
            edges,
        }
    }

    /// Estimate a representative point of the graph
    ///
    /// Returns `None` if no valid vertex remains.
    pub fn centroid(&self, method: CentroidMethod) -> Option<DVec2> {
        let points: Vec<(usize, DVec2)> = self
            .valid_vertices()
            .filter_map(|id| self.coordinate(id).map(|p| (id, p)))
            .collect();
        if points.is_empty() {
            return None;
        }

        match method {
            CentroidMethod::Geometric => {
                let sum: DVec2 = points.iter().map(|(_, p)| *p).sum();
                Some(sum / points.len() as f64)
            }
            CentroidMethod::Weighted => {
                let total: f64 = points
                    .iter()
                    .map(|(id, _)| self.neighbors(*id).len() as f64)
                    .sum();
                if total == 0.0 {
                    return self.centroid(CentroidMethod::Geometric);
                }
                let sum: DVec2 = points
                    .iter()
                    .map(|(id, p)| *p * self.neighbors(*id).len() as f64)
                    .sum();
                Some(sum / total)
            }
            CentroidMethod::Medoid => points
                .iter()
                .map(|(_, candidate)| {
                    let total: f64 = points.iter().map(|(_, p)| candidate.distance(*p)).sum();
                    (*candidate, total)
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(p, _)| p),
        }
    }

    /// Count structural problems; any non-zero count makes the graph invalid
    ///
    /// Diagnostic only; generation never calls this on its own.
    pub fn validate(&self) -> GraphValidation {
        let mut report = GraphValidation::default();

        for (id, vertex) in self.vertices.iter().enumerate() {
            match vertex {
                Some(_) => {
                    report.valid_vertices += 1;
                    if !self.adjacency.contains_key(&id) {
                        report.orphaned_vertices += 1;
                    }
                }
                None => report.null_vertices += 1,
            }
        }

        for (&(u, v), &weight) in &self.edges {
            if !self.contains(u) || !self.contains(v) || !weight.is_finite() {
                report.invalid_edges += 1;
            }
            if self.edge_weight(v, u) != Some(weight) {
                report.asymmetric_links += 1;
            }
        }

        for (&u, list) in &self.adjacency {
            for &v in list {
                if !self.neighbors(v).contains(&u) {
                    report.asymmetric_links += 1;
                }
            }
        }

        report.is_valid = report.orphaned_vertices == 0
            && report.invalid_edges == 0
            && report.asymmetric_links == 0;
        report
    }
}
