//! JSON snapshot of a generated map
//!
//! Field-for-field dump of the sites, triangles, edges, cells, circumcenters
//! and features of a `TerrainMap`. Floats are rounded to 9 decimal digits so
//! that snapshots of two identical passes compare byte for byte.
//!
//! Only available with the `serde` feature.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::cell::CellMetadata;
use crate::config::{Direction, MapConfig};
use crate::features::{PathFeature, PathKind};
use crate::map::TerrainMap;

/// Decimal digits kept for every float in a snapshot
pub const SNAPSHOT_PRECISION: i32 = 9;

/// Round `value` to `SNAPSHOT_PRECISION` decimal digits
pub fn normalize(value: f64) -> f64 {
    let scale = 10f64.powi(SNAPSHOT_PRECISION);
    (value * scale).round() / scale
}

fn point(x: f64, z: f64) -> [f64; 2] {
    [normalize(x), normalize(z)]
}

/// Settings and element counts of the snapshotted pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Configuration the pass was generated from
    pub settings: MapConfig,
    /// Number of Voronoi cells
    pub cell_count: usize,
    /// Number of Voronoi vertices with a position
    pub vertex_count: usize,
    /// Number of directed edge entries
    pub edge_count: usize,
}

/// A triangulation site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPoint {
    /// X coordinate
    pub x: f64,
    /// Z coordinate (north is 0)
    pub z: f64,
    /// Synthetic site from the ring outside the grid
    pub is_boundary: bool,
}

/// One directed edge entry; every edge appears once per direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    /// Source vertex id
    pub from: usize,
    /// Target vertex id
    pub to: usize,
    /// Routing weight, including any boundary penalty
    pub weight: f64,
}

/// A Voronoi cell with its feature tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCell {
    /// Cell id, equal to its interior site index
    pub id: usize,
    /// Site position as `[x, z]`
    pub site: [f64; 2],
    /// Polygon vertex ids in counter-clockwise order
    pub vertices: Vec<usize>,
    /// Neighboring cell ids, sorted
    pub neighbors: Vec<usize>,
    /// Whether the polygon touches the boundary band
    pub on_border: bool,
    /// Coastline, lake and river tags
    pub metadata: CellMetadata,
}

/// A carved river or tributary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPath {
    /// Path id, unique within its kind
    pub id: usize,
    /// Parent river id for tributaries
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<usize>,
    /// Vertex ids from source to end
    pub vertices: Vec<usize>,
    /// Summed Euclidean length of the path segments
    pub length: f64,
}

/// A coastline region grown from one grid side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCoastline {
    /// Coastline id
    pub id: usize,
    /// Grid side the coastline grew from
    pub direction: Direction,
    /// Tagged cell ids in claim order
    pub cells: Vec<usize>,
    /// `(cell id, depth)` pairs sorted by cell id
    pub depths: Vec<(usize, u32)>,
}

/// A lake region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLake {
    /// Lake id
    pub id: usize,
    /// Tagged cell ids in claim order
    pub cells: Vec<usize>,
}

/// Serializable view of a whole map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Settings and counts
    pub metadata: SnapshotMetadata,
    /// Triangulation sites, interior first
    pub points: Vec<SnapshotPoint>,
    /// Site indices of each triangle
    pub triangles: Vec<[usize; 3]>,
    /// Weighted vertex graph edges
    pub edges: Vec<SnapshotEdge>,
    /// One entry per cell
    pub voronoi_cells: Vec<SnapshotCell>,
    /// Voronoi vertex per triangle, `None` for degenerate triangles
    pub delaunay_circumcenters: Vec<Option<[f64; 2]>>,
    /// Carved rivers
    pub rivers: Vec<SnapshotPath>,
    /// Carved tributaries with their parent river
    pub tributaries: Vec<SnapshotPath>,
    /// Coastline regions
    pub coastlines: Vec<SnapshotCoastline>,
    /// Lake regions
    pub lakes: Vec<SnapshotLake>,
}

impl MapSnapshot {
    /// Capture `map`
    pub fn from_map(map: &TerrainMap) -> Self {
        let triangulation = map.triangulation();
        let path = |p: &PathFeature, parent: Option<usize>| SnapshotPath {
            id: p.id,
            parent,
            vertices: p.vertices.clone(),
            length: normalize(p.length),
        };

        Self {
            metadata: SnapshotMetadata {
                settings: map.config().clone(),
                cell_count: map.cell_count(),
                vertex_count: map.graph().valid_vertex_count(),
                edge_count: map.edges().len(),
            },
            points: map
                .sites()
                .iter()
                .map(|s| SnapshotPoint {
                    x: normalize(s.x()),
                    z: normalize(s.z()),
                    is_boundary: s.is_boundary,
                })
                .collect(),
            triangles: (0..triangulation.triangle_count())
                .map(|t| triangulation.triangle(t))
                .collect(),
            edges: map
                .edges()
                .iter()
                .map(|(&(from, to), &weight)| SnapshotEdge {
                    from,
                    to,
                    weight: normalize(weight),
                })
                .collect(),
            voronoi_cells: map
                .cells()
                .iter()
                .map(|c| SnapshotCell {
                    id: c.id,
                    site: point(c.site.x, c.site.y),
                    vertices: c.vertices.clone(),
                    neighbors: c.neighbors.clone(),
                    on_border: c.on_border,
                    metadata: c.metadata,
                })
                .collect(),
            delaunay_circumcenters: map
                .vertices()
                .iter()
                .map(|v| v.map(|p| point(p.x, p.y)))
                .collect(),
            rivers: map.rivers().iter().map(|r| path(r, None)).collect(),
            tributaries: map
                .tributaries()
                .iter()
                .map(|t| {
                    let parent = match t.kind {
                        PathKind::Tributary { parent } => Some(parent),
                        PathKind::River => None,
                    };
                    path(t, parent)
                })
                .collect(),
            coastlines: map
                .coastlines()
                .iter()
                .map(|c| SnapshotCoastline {
                    id: c.id,
                    direction: c.direction,
                    cells: c.cells.clone(),
                    depths: c.depths.iter().map(|(&id, &d)| (id, d)).collect(),
                })
                .collect(),
            lakes: map
                .lakes()
                .iter()
                .map(|l| SnapshotLake {
                    id: l.id,
                    cells: l.cells.clone(),
                })
                .collect(),
        }
    }
}
