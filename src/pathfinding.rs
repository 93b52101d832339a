//! A* search over a vertex graph
//!
//! Works on any `VertexGraph`: the full base graph, a partition, or a routing
//! graph with carved vertices removed. Edge weights are never smaller than
//! the Euclidean length of the edge (boundary penalties only inflate them),
//! so the straight-line heuristic is admissible and returned paths are optimal.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::graph::VertexGraph;

/// Default hard cap on expanded nodes per search
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// A* pathfinder with an iteration cap
///
/// The default cap suits diagrams of up to about a thousand sites. Denser
/// diagrams need `Pathfinder::with_max_iterations`, passed through
/// `RiverGenerator::with_pathfinder` or `RiverConfig::max_path_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pathfinder {
    /// Searches expanding more nodes than this give up with an empty path
    pub max_iterations: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Pathfinder {
    /// Create a pathfinder with a custom iteration cap
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Shortest path from `start` to `goal`, inclusive of both ends
    ///
    /// An empty vector means "no route": either endpoint is missing from the
    /// graph, the open set ran dry, or the iteration cap was reached.
    pub fn find_path(&self, graph: &VertexGraph, start: usize, goal: usize) -> Vec<usize> {
        let (Some(_), Some(goal_pos)) = (graph.coordinate(start), graph.coordinate(goal)) else {
            warn!(start, goal, "path endpoint is not a valid vertex");
            return Vec::new();
        };
        if start == goal {
            return vec![start];
        }

        let heuristic = |v: usize| {
            graph
                .coordinate(v)
                .map(|p| p.distance(goal_pos))
                .unwrap_or(f64::INFINITY)
        };

        let mut open: Vec<usize> = vec![start];
        let mut in_open: HashSet<usize> = HashSet::from([start]);
        let mut closed: HashSet<usize> = HashSet::new();
        let mut came_from: HashMap<usize, usize> = HashMap::new();
        let mut g_score: HashMap<usize, f64> = HashMap::from([(start, 0.0)]);
        let mut f_score: HashMap<usize, f64> = HashMap::from([(start, heuristic(start))]);

        let mut iterations = 0;
        while !open.is_empty() {
            if iterations >= self.max_iterations {
                debug!(start, goal, iterations, "search hit the iteration cap");
                return Vec::new();
            }
            iterations += 1;

            // Linear scan for the lowest f; first entry wins ties
            let (slot, current) = open
                .iter()
                .copied()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let fa = f_score.get(a).copied().unwrap_or(f64::INFINITY);
                    let fb = f_score.get(b).copied().unwrap_or(f64::INFINITY);
                    fa.total_cmp(&fb)
                })
                .unwrap_or((0, start));

            if current == goal {
                return reconstruct_path(&came_from, current);
            }

            open.remove(slot);
            in_open.remove(&current);
            closed.insert(current);

            let Some(neighbors) = graph.adjacency.get(&current) else {
                debug!(vertex = current, "no adjacency entry, skipping");
                continue;
            };
            let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

            for &next in neighbors {
                if closed.contains(&next) || !graph.contains(next) {
                    continue;
                }
                let Some(weight) = graph.edge_weight(current, next) else {
                    debug!(from = current, to = next, "missing edge weight, skipping neighbor");
                    continue;
                };

                let tentative = current_g + weight;
                if tentative < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative);
                    f_score.insert(next, tentative + heuristic(next));
                    if in_open.insert(next) {
                        open.push(next);
                    }
                }
            }
        }

        debug!(start, goal, iterations, "open set exhausted, no route");
        Vec::new()
    }
}

fn reconstruct_path(came_from: &HashMap<usize, usize>, goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Shortest path with the default iteration cap
pub fn find_path(graph: &VertexGraph, start: usize, goal: usize) -> Vec<usize> {
    Pathfinder::default().find_path(graph, start, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use proptest::prelude::*;

    fn euclidean_graph(coords: &[(f64, f64)], edges: &[(usize, usize)]) -> VertexGraph {
        let mut graph = VertexGraph::with_vertices(
            coords.iter().map(|&(x, z)| Some(DVec2::new(x, z))).collect(),
        );
        for &(u, v) in edges {
            let w = graph.coordinate(u).unwrap().distance(graph.coordinate(v).unwrap());
            graph.add_edge(u, v, w);
        }
        graph
    }

    #[test]
    fn test_straight_line() {
        let graph = euclidean_graph(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], &[(0, 1), (1, 2)]);
        assert_eq!(find_path(&graph, 0, 2), vec![0, 1, 2]);
        assert_eq!(find_path(&graph, 2, 0), vec![2, 1, 0]);
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = euclidean_graph(&[(0.0, 0.0)], &[]);
        assert_eq!(find_path(&graph, 0, 0), vec![0]);
    }

    #[test]
    fn test_avoids_penalized_edge() {
        // Direct 0-2 edge is heavily weighted, the detour through 1 is cheaper
        let mut graph = euclidean_graph(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], &[(0, 1), (1, 2)]);
        graph.add_edge(0, 2, 1000.0);
        assert_eq!(find_path(&graph, 0, 2), vec![0, 1, 2]);
    }

    #[test]
    fn test_disconnected_returns_empty() {
        let graph = euclidean_graph(&[(0.0, 0.0), (1.0, 0.0), (5.0, 0.0)], &[(0, 1)]);
        assert!(find_path(&graph, 0, 2).is_empty());
    }

    #[test]
    fn test_missing_endpoint_returns_empty() {
        let mut graph = euclidean_graph(&[(0.0, 0.0), (1.0, 0.0)], &[(0, 1)]);
        graph.remove_vertices(&[1]);
        assert!(find_path(&graph, 0, 1).is_empty());
        assert!(find_path(&graph, 0, 17).is_empty());
    }

    #[test]
    fn test_missing_edge_weight_is_skipped() {
        let mut graph = euclidean_graph(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 3.0)],
            &[(0, 1), (1, 2), (0, 3), (3, 2)],
        );
        graph.edges.remove(&(1, 2));
        assert_eq!(find_path(&graph, 0, 2), vec![0, 3, 2]);
    }

    #[test]
    fn test_iteration_cap() {
        let coords: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, 0.0)).collect();
        let edges: Vec<(usize, usize)> = (0..49).map(|i| (i, i + 1)).collect();
        let graph = euclidean_graph(&coords, &edges);

        assert_eq!(find_path(&graph, 0, 49).len(), 50);
        assert!(Pathfinder::with_max_iterations(10).find_path(&graph, 0, 49).is_empty());
    }

    /// Cheapest simple-path cost by exhaustive DFS
    fn brute_force_cost(graph: &VertexGraph, start: usize, goal: usize) -> Option<f64> {
        fn walk(graph: &VertexGraph, at: usize, goal: usize, seen: &mut Vec<usize>, cost: f64, best: &mut Option<f64>) {
            if at == goal {
                if best.map_or(true, |b| cost < b) {
                    *best = Some(cost);
                }
                return;
            }
            for &next in graph.neighbors(at) {
                if seen.contains(&next) {
                    continue;
                }
                let w = graph.edge_weight(at, next).unwrap();
                seen.push(next);
                walk(graph, next, goal, seen, cost + w, best);
                seen.pop();
            }
        }

        let mut best = None;
        walk(graph, start, goal, &mut vec![start], 0.0, &mut best);
        best
    }

    proptest! {
        #[test]
        fn prop_astar_matches_brute_force(
            coords in prop::collection::vec((0.0f64..10.0, 0.0f64..10.0), 2..8),
            edge_bits in prop::collection::vec(any::<bool>(), 28),
            inflation in prop::collection::vec(1.0f64..3.0, 28),
        ) {
            let n = coords.len();
            let mut graph = VertexGraph::with_vertices(
                coords.iter().map(|&(x, z)| Some(DVec2::new(x, z))).collect(),
            );
            let mut k = 0;
            for u in 0..n {
                for v in (u + 1)..n {
                    if edge_bits[k] {
                        let length = graph.coordinate(u).unwrap().distance(graph.coordinate(v).unwrap());
                        graph.add_edge(u, v, length * inflation[k]);
                    }
                    k += 1;
                }
            }

            let path = find_path(&graph, 0, n - 1);
            match brute_force_cost(&graph, 0, n - 1) {
                Some(best) => {
                    prop_assert_eq!(path.first().copied(), Some(0));
                    prop_assert_eq!(path.last().copied(), Some(n - 1));
                    let cost = graph.path_cost(&path).unwrap();
                    prop_assert!((cost - best).abs() < 1e-9, "A* cost {} vs optimum {}", cost, best);
                }
                None => prop_assert!(path.is_empty()),
            }
        }
    }
}
