//! Terrain features carved onto the Voronoi graph
//!
//! Region features (coastline, lakes) claim cells by budget-limited growth
//! over cell adjacency. Path features (rivers, tributaries) claim vertex
//! sequences found by A* and remove them from future routing.

pub mod coastline;
pub mod lake;
pub mod river;
pub mod tributary;

pub use coastline::{Coastline, CoastlineGenerator, COASTLINE_MARGIN, MAX_COASTLINE_DEPTH};
pub use lake::{Lake, LakeGenerator};
pub use river::RiverGenerator;
pub use tributary::{TributaryGenerator, MIN_FALLBACK_VERTICES};

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::graph::VertexGraph;

/// Predicate marking cells a region generator must not claim
///
/// Shared between generators so one feature can keep another out of its cells.
pub type ExclusionHook<'a> = &'a dyn Fn(&Cell) -> bool;

/// Exclusion hook that excludes nothing
pub fn no_exclusion(_: &Cell) -> bool {
    false
}

/// What a path feature is
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    River,
    Tributary {
        /// Id of the river this tributary branches from
        parent: usize,
    },
}

/// An ordered vertex path from start to end
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PathFeature {
    /// Index of the feature among features of the same kind
    pub id: usize,
    /// River or tributary
    pub kind: PathKind,
    /// Vertex ids from start to end
    pub vertices: Vec<usize>,
    /// Summed Euclidean length of the path
    pub length: f64,
    /// Mean of the path vertex coordinates
    pub centroid: Option<DVec2>,
}

impl PathFeature {
    /// Build a path feature, deriving length and centroid from `graph` coordinates
    pub fn new(id: usize, kind: PathKind, vertices: Vec<usize>, graph: &VertexGraph) -> Self {
        let points: Vec<DVec2> = vertices.iter().filter_map(|&v| graph.coordinate(v)).collect();
        let length = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let centroid = (!points.is_empty())
            .then(|| points.iter().copied().sum::<DVec2>() / points.len() as f64);

        Self {
            id,
            kind,
            vertices,
            length,
            centroid,
        }
    }

    /// Number of vertices on the path
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// First vertex
    pub fn start(&self) -> Option<usize> {
        self.vertices.first().copied()
    }

    /// Last vertex
    pub fn end(&self) -> Option<usize> {
        self.vertices.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_feature_metadata() {
        let mut graph = VertexGraph::with_vertices(vec![
            Some(DVec2::new(0.0, 0.0)),
            Some(DVec2::new(3.0, 4.0)),
            Some(DVec2::new(3.0, 10.0)),
        ]);
        graph.add_edge(0, 1, 5.0);
        graph.add_edge(1, 2, 6.0);

        let river = PathFeature::new(0, PathKind::River, vec![0, 1, 2], &graph);
        assert_eq!(river.vertex_count(), 3);
        assert!((river.length - 11.0).abs() < 1e-12);
        assert_eq!(river.centroid, Some(DVec2::new(2.0, 14.0 / 3.0)));
        assert_eq!(river.start(), Some(0));
        assert_eq!(river.end(), Some(2));
    }

    #[test]
    fn test_empty_path_feature() {
        let graph = VertexGraph::default();
        let empty = PathFeature::new(1, PathKind::Tributary { parent: 0 }, Vec::new(), &graph);
        assert_eq!(empty.length, 0.0);
        assert!(empty.centroid.is_none());
        assert!(empty.start().is_none());
    }
}
