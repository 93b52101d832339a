//! Partition tracker for the routable vertex graph
//!
//! `GraphState` starts from a deep copy of the base graph as a single
//! partition. Each carved path is removed from the partition holding it and
//! the remainder is re-split into connected components, so the live
//! partitions always cover exactly the vertices no path has consumed yet.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use super::VertexGraph;
use crate::error::{Result, TerrainError};

/// Id of the single partition created by `initialize`
pub const BASE_PARTITION: &str = "base";

/// Feature that triggered a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSource {
    /// The `n`-th river
    River(usize),
    /// The `n`-th tributary
    Tributary(usize),
}

impl fmt::Display for SplitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitSource::River(i) => write!(f, "river-{}", i),
            SplitSource::Tributary(i) => write!(f, "tributary-{}", i),
        }
    }
}

/// A vertex-disjoint slice of the live graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPartition {
    /// Unique partition id
    pub id: String,
    /// Owned vertex graph of this partition
    pub graph: VertexGraph,
    /// Human readable origin, e.g. "river-0 component 1 of 3"
    pub description: String,
    /// Partition this one was split from, `None` for the base partition
    pub parent: Option<String>,
}

impl GraphPartition {
    /// Number of vertices in this partition
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.graph.valid_vertex_count()
    }
}

/// Log entry appended on every state change
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionOperation {
    /// "initialize" or the split source, e.g. "river-2"
    pub kind: String,
    /// Time since `initialize`
    pub at: Duration,
    /// Number of live partitions after the operation
    pub partition_count: usize,
    /// Vertices removed by the operation
    pub removed_vertices: usize,
    /// Valid vertices across all live partitions after the operation
    pub remaining_vertices: usize,
}

/// Stateful partition tracker
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    base: Option<VertexGraph>,
    partitions: BTreeMap<String, GraphPartition>,
    consumed: BTreeSet<usize>,
    operations: Vec<PartitionOperation>,
    highlighted: Option<String>,
    started: Option<Instant>,
}

impl GraphState {
    /// Create an uninitialized tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all state and track `base` as one partition
    pub fn initialize(&mut self, base: &VertexGraph) {
        *self = Self::default();
        self.started = Some(Instant::now());
        self.base = Some(base.clone());
        self.partitions.insert(
            BASE_PARTITION.to_string(),
            GraphPartition {
                id: BASE_PARTITION.to_string(),
                graph: base.clone(),
                description: "full base graph".to_string(),
                parent: None,
            },
        );
        self.log("initialize".to_string(), 0);
    }

    /// True once `initialize` has run
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.base.is_some()
    }

    /// Snapshot of the graph passed to `initialize`
    pub fn base_graph(&self) -> Option<&VertexGraph> {
        self.base.as_ref()
    }

    /// Remove `path` from a partition and replace it with its remaining components
    ///
    /// Returns the ids of the new partitions (possibly none if the path
    /// consumed the whole partition). Path vertices not present in the
    /// partition are ignored.
    ///
    /// # Errors
    ///
    /// `GraphNotInitialized` before `initialize`, `PartitionNotFound` for an unknown id.
    pub fn split_by_path(&mut self, partition_id: &str, path: &[usize], source: SplitSource) -> Result<Vec<String>> {
        if !self.is_initialized() {
            return Err(TerrainError::GraphNotInitialized);
        }
        let partition = self
            .partitions
            .remove(partition_id)
            .ok_or_else(|| TerrainError::PartitionNotFound(partition_id.to_string()))?;

        let removed: Vec<usize> = path
            .iter()
            .copied()
            .filter(|&v| partition.graph.contains(v))
            .collect();

        let mut remainder = partition.graph;
        remainder.remove_vertices(&removed);
        self.consumed.extend(removed.iter().copied());

        let components = remainder.connected_subgraphs();
        let total = components.len();
        let mut ids = Vec::with_capacity(total);
        for (index, graph) in components.into_iter().enumerate() {
            let id = format!("{}-{}", source, index);
            self.partitions.insert(
                id.clone(),
                GraphPartition {
                    id: id.clone(),
                    graph,
                    description: format!("{} component {} of {}", source, index + 1, total),
                    parent: Some(partition_id.to_string()),
                },
            );
            ids.push(id);
        }

        if self.highlighted.as_deref() == Some(partition_id) {
            self.highlighted = None;
        }

        debug!(
            partition = partition_id,
            source = %source,
            removed = removed.len(),
            components = total,
            "split partition by path"
        );
        self.log(source.to_string(), removed.len());
        Ok(ids)
    }

    /// Partition with the most valid vertices (first by id on ties)
    pub fn largest_partition(&self) -> Option<&GraphPartition> {
        self.partitions
            .values()
            .fold(None, |best: Option<&GraphPartition>, p| match best {
                Some(b) if b.vertex_count() >= p.vertex_count() => Some(b),
                _ => Some(p),
            })
    }

    /// Partition containing vertex `id`
    pub fn partition_containing(&self, vertex: usize) -> Option<&GraphPartition> {
        self.partitions.values().find(|p| p.graph.contains(vertex))
    }

    /// Look up a partition by id
    pub fn partition(&self, id: &str) -> Option<&GraphPartition> {
        self.partitions.get(id)
    }

    /// All live partitions ordered by id
    pub fn partitions(&self) -> impl Iterator<Item = &GraphPartition> {
        self.partitions.values()
    }

    /// Number of live partitions
    #[inline]
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Every vertex removed by a split so far
    pub fn consumed_vertices(&self) -> &BTreeSet<usize> {
        &self.consumed
    }

    /// Base graph minus every consumed vertex except those in `keep`
    ///
    /// Used to route a branch that starts on an already carved path.
    pub fn routing_graph(&self, keep: &[usize]) -> Option<VertexGraph> {
        let mut graph = self.base.clone()?;
        let removed: Vec<usize> = self
            .consumed
            .iter()
            .copied()
            .filter(|v| !keep.contains(v))
            .collect();
        graph.remove_vertices(&removed);
        Some(graph)
    }

    /// Operation log, oldest first
    pub fn operations(&self) -> &[PartitionOperation] {
        &self.operations
    }

    /// Mark a partition for display; has no effect on routing
    pub fn highlight_partition(&mut self, id: &str) -> bool {
        if self.partitions.contains_key(id) {
            self.highlighted = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Clear the display highlight
    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Currently highlighted partition id
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    fn log(&mut self, kind: String, removed_vertices: usize) {
        let at = self.started.map(|s| s.elapsed()).unwrap_or_default();
        let remaining_vertices = self.partitions.values().map(GraphPartition::vertex_count).sum();
        self.operations.push(PartitionOperation {
            kind,
            at,
            partition_count: self.partitions.len(),
            removed_vertices,
            remaining_vertices,
        });
    }
}
