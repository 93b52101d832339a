//! Voronoi-based terrain map generation
//!
//! Builds a Voronoi region graph on a flat square grid from a Delaunay
//! triangulation and carves deterministic terrain features onto it:
//! coastlines and lakes grow over cell adjacency under a cell budget,
//! rivers and tributaries are routed over the Voronoi vertex graph with A*
//! and removed from later routing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_voronoi_terrain::*;
//!
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .grid_size(100.0).unwrap()
//!     .poisson_radius(4.0).unwrap()
//!     .coastline(Direction::West, 60)
//!     .lakes(LakeConfig { budget: 30, num_lakes: 3, avoid_coastline: true })
//!     .rivers(RiverConfig::new(2))
//!     .tributaries(TributaryConfig { num_tributaries: 4, max_tributary_length: 0 })
//!     .build().unwrap();
//!
//! let map = TerrainMap::generate(config).unwrap();
//! println!("{} cells, {} rivers", map.cell_count(), map.rivers().len());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization of configuration, cells and `MapSnapshot`

// Modules
pub mod error;
pub mod config;
pub mod rng;
pub mod cell;
pub mod generation;
pub mod graph;
pub mod pathfinding;
pub mod features;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

#[cfg(feature = "serde")]
pub mod export;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export core types for convenience
pub use error::{TerrainError, Result};
pub use config::{
    CoastlineConfig, Direction, LakeConfig, MapConfig, MapConfigBuilder, RiverConfig, SiteDistribution,
    TributaryConfig, VoronoiConfig,
};
pub use rng::RngHandle;
pub use cell::{Cell, CellMetadata, CoastalTag, Site};
pub use generation::{generate_diagram, Triangulation, VoronoiDiagram};
pub use graph::{CentroidMethod, GraphPartition, GraphState, GraphValidation, SplitSource, VertexGraph};
pub use pathfinding::{find_path, Pathfinder};
pub use features::{
    Coastline, CoastlineGenerator, Lake, LakeGenerator, PathFeature, PathKind, RiverGenerator, TributaryGenerator,
};
pub use map::TerrainMap;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

#[cfg(feature = "serde")]
pub use export::MapSnapshot;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
