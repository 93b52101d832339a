//! Core Voronoi generation
//!
//! Samples sites on a flat grid, triangulates them and derives the Voronoi
//! cell/vertex/edge graph used by every terrain feature.

pub mod delaunay;
pub mod points;
pub mod voronoi;

pub use delaunay::{circumcenter, next_halfedge, Triangulation};
pub use points::{boundary_ring, generate_sites, poisson_sites, uniform_sites};
pub use voronoi::{VoronoiDiagram, BOUNDARY_EDGE_WEIGHT};

use tracing::info;

use crate::config::MapConfig;
use crate::rng::RngHandle;

/// Sample sites and build the Voronoi diagram for a configuration
///
/// Site sampling is the first consumer of `rng` in a generation pass.
pub fn generate_diagram(config: &MapConfig, rng: &mut RngHandle) -> VoronoiDiagram {
    let sites = generate_sites(config.voronoi.sites, config.grid_size, rng);
    info!(
        interior = sites.iter().filter(|s| !s.is_boundary).count(),
        boundary = sites.iter().filter(|s| s.is_boundary).count(),
        "sampled sites"
    );
    VoronoiDiagram::build(sites, config.grid_size, config.voronoi.boundary_tolerance)
}
