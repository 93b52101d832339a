//! Tributaries branching off carved rivers
//!
//! A branch vertex is drawn from the middle third of the parent river. A
//! generation-capped BFS over vertices not claimed by any path collects
//! candidate endpoints; candidates are tried farthest-first for a path no
//! longer than a third of the parent, then nearest-first for any path of
//! more than `MIN_FALLBACK_VERTICES` vertices.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{PathFeature, PathKind};
use crate::config::TributaryConfig;
use crate::error::{Result, TerrainError};
use crate::graph::{GraphState, SplitSource, VertexGraph};
use crate::pathfinding::Pathfinder;
use crate::rng::RngHandle;

/// Fallback paths must have more vertices than this
pub const MIN_FALLBACK_VERTICES: usize = 3;

/// Carves tributaries off existing rivers
#[derive(Debug, Clone, Copy)]
pub struct TributaryGenerator {
    config: TributaryConfig,
    pathfinder: Pathfinder,
}

impl TributaryGenerator {
    /// Create a generator with the default pathfinder
    pub fn new(config: TributaryConfig) -> Self {
        Self {
            config,
            pathfinder: Pathfinder::default(),
        }
    }

    /// Replace the pathfinder
    pub fn with_pathfinder(mut self, pathfinder: Pathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Settings used by this generator
    pub fn config(&self) -> &TributaryConfig {
        &self.config
    }

    /// Target length in vertices for a tributary of `parent`
    pub fn target_length(&self, parent: &PathFeature) -> usize {
        let from_parent = parent.vertex_count() / 3;
        match self.config.max_tributary_length {
            0 => from_parent,
            max => from_parent.min(max),
        }
    }

    /// Carve tributary number `index` off `parent`
    ///
    /// The returned path starts at the branch vertex on the parent river.
    /// Returns `Ok(None)` when the parent is too short or no viable path
    /// exists. Every vertex after the branch is removed from routing.
    ///
    /// # Errors
    ///
    /// `GraphNotInitialized` if `state` was never initialized.
    pub fn carve(
        &self,
        index: usize,
        parent: &PathFeature,
        state: &mut GraphState,
        rng: &mut RngHandle,
    ) -> Result<Option<PathFeature>> {
        let parent_len = parent.vertex_count();
        if parent_len < 3 {
            debug!(tributary = index, parent = parent.id, "parent river too short to branch");
            return Ok(None);
        }

        // Middle third of the parent: indices in [30%, 70%]
        let low = (parent_len as f64 * 0.3).floor() as usize;
        let high = ((parent_len as f64 * 0.7).ceil() as usize).clamp(low, parent_len - 1);
        let branch = parent.vertices[rng.index_inclusive(low, high)];

        let routing = state
            .routing_graph(&[branch])
            .ok_or(TerrainError::GraphNotInitialized)?;
        let Some(origin) = routing.coordinate(branch) else {
            return Ok(None);
        };

        let generations = (parent_len / 3).max(1);
        let mut candidates = candidate_pool(&routing, branch, generations);
        candidates.sort_by(|&a, &b| {
            let da = routing.coordinate(a).map(|p| p.distance(origin)).unwrap_or(0.0);
            let db = routing.coordinate(b).map(|p| p.distance(origin)).unwrap_or(0.0);
            db.total_cmp(&da).then(a.cmp(&b))
        });

        let target = self.target_length(parent);
        let ideal = candidates.iter().find_map(|&goal| {
            let path = self.pathfinder.find_path(&routing, branch, goal);
            (path.len() > 1 && path.len() <= target).then_some(path)
        });

        let path = match ideal {
            Some(path) => path,
            None => {
                let fallback = candidates.iter().rev().find_map(|&goal| {
                    let path = self.pathfinder.find_path(&routing, branch, goal);
                    (path.len() > MIN_FALLBACK_VERTICES).then_some(path)
                });
                match fallback {
                    Some(path) => {
                        debug!(tributary = index, target, length = path.len(), "using fallback tributary");
                        path
                    }
                    None => {
                        debug!(
                            tributary = index,
                            candidates = candidates.len(),
                            "no viable tributary path"
                        );
                        return Ok(None);
                    }
                }
            }
        };

        let feature = PathFeature::new(index, PathKind::Tributary { parent: parent.id }, path, &routing);
        let carved = &feature.vertices[1..];
        let holder = carved
            .first()
            .and_then(|&v| state.partition_containing(v))
            .map(|p| p.id.clone());
        if let Some(holder) = holder {
            state.split_by_path(&holder, carved, SplitSource::Tributary(index))?;
        }

        info!(
            tributary = index,
            parent = parent.id,
            vertices = feature.vertex_count(),
            target,
            "tributary carved"
        );
        Ok(Some(feature))
    }
}

/// Vertices reachable from `branch` within `generations` BFS layers
fn candidate_pool(graph: &VertexGraph, branch: usize, generations: usize) -> Vec<usize> {
    let mut visited = HashSet::from([branch]);
    let mut frontier = vec![branch];
    let mut pool = Vec::new();

    for _ in 0..generations {
        let mut next = Vec::new();
        for &v in &frontier {
            for &n in graph.neighbors(v) {
                if graph.contains(n) && visited.insert(n) {
                    pool.push(n);
                    next.push(n);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    pool
}
