//! North-to-south rivers routed by A*
//!
//! Each river picks a random vertex inside the north border window and one
//! inside the south window of the largest live partition, connects them with
//! the pathfinder and splits the partition along the result. Endpoints are
//! drawn from window vertices with at least one edge below
//! `BOUNDARY_EDGE_WEIGHT` whenever such vertices exist.

use tracing::{info, warn};

use super::{PathFeature, PathKind};
use crate::config::RiverConfig;
use crate::error::{Result, TerrainError};
use crate::generation::BOUNDARY_EDGE_WEIGHT;
use crate::graph::{GraphState, SplitSource, VertexGraph};
use crate::pathfinding::Pathfinder;
use crate::rng::RngHandle;

/// Carves rivers across the grid
#[derive(Debug, Clone, Copy)]
pub struct RiverGenerator {
    config: RiverConfig,
    pathfinder: Pathfinder,
}

impl RiverGenerator {
    /// Create a generator with the default pathfinder
    pub fn new(config: RiverConfig) -> Self {
        Self {
            config,
            pathfinder: Pathfinder::default(),
        }
    }

    /// Replace the pathfinder (e.g. to change the iteration cap)
    pub fn with_pathfinder(mut self, pathfinder: Pathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Settings used by this generator
    pub fn config(&self) -> &RiverConfig {
        &self.config
    }

    /// Carve river number `index`
    ///
    /// Returns `Ok(None)` when a border window holds no routable vertex or
    /// no path exists; that is a missing feature, not a failure. On success
    /// the path is removed from the partition it was routed in.
    ///
    /// # Errors
    ///
    /// `GraphNotInitialized` if `state` was never initialized.
    pub fn carve(
        &self,
        index: usize,
        grid_size: f64,
        state: &mut GraphState,
        rng: &mut RngHandle,
    ) -> Result<Option<PathFeature>> {
        let Some(partition) = state.largest_partition() else {
            return Err(TerrainError::GraphNotInitialized);
        };
        let partition_id = partition.id.clone();
        let graph = &partition.graph;

        let band = self.config.border_band * grid_size;
        let north = border_vertices(graph, |z| z <= band);
        let south = border_vertices(graph, |z| z >= grid_size - band);

        let (Some(&start), Some(&goal)) = (rng.choose(&north), rng.choose(&south)) else {
            warn!(
                river = index,
                north = north.len(),
                south = south.len(),
                "no routable vertex in a border window"
            );
            return Ok(None);
        };

        let path = self.pathfinder.find_path(graph, start, goal);
        if path.is_empty() {
            warn!(river = index, start, goal, "no route between border vertices");
            return Ok(None);
        }

        let feature = PathFeature::new(index, PathKind::River, path, graph);
        state.split_by_path(&partition_id, &feature.vertices, SplitSource::River(index))?;

        info!(
            river = index,
            vertices = feature.vertex_count(),
            length = feature.length,
            "river carved"
        );
        Ok(Some(feature))
    }
}

/// Vertices that have a neighbor and whose z coordinate passes `in_window`
///
/// Narrowed to vertices with an unpenalized edge when any exist.
fn border_vertices(graph: &VertexGraph, in_window: impl Fn(f64) -> bool) -> Vec<usize> {
    let window: Vec<usize> = graph
        .valid_vertices()
        .filter(|&v| !graph.neighbors(v).is_empty())
        .filter(|&v| graph.coordinate(v).map(|p| in_window(p.y)).unwrap_or(false))
        .collect();

    let open: Vec<usize> = window
        .iter()
        .copied()
        .filter(|&v| {
            graph
                .neighbors(v)
                .iter()
                .any(|&n| graph.edge_weight(v, n).is_some_and(|w| w < BOUNDARY_EDGE_WEIGHT))
        })
        .collect();

    if open.is_empty() {
        window
    } else {
        open
    }
}
