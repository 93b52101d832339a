//! Voronoi Cell Structure
//!
//! Sites are the triangulation input; every non-boundary site owns one cell
//! with an ordered polygon, neighbor ids and feature metadata.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::Direction;

/// A triangulation input point
///
/// `position.x` is the grid x axis and `position.y` holds the grid z axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Position on the grid (`x`, `z`)
    pub position: DVec2,
    /// Synthetic point outside the grid used only to bound the diagram
    pub is_boundary: bool,
}

impl Site {
    /// Create an interior site
    pub fn new(x: f64, z: f64) -> Self {
        Self {
            position: DVec2::new(x, z),
            is_boundary: false,
        }
    }

    /// Create a boundary site
    pub fn boundary(x: f64, z: f64) -> Self {
        Self {
            position: DVec2::new(x, z),
            is_boundary: true,
        }
    }

    /// Grid x coordinate
    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Grid z coordinate
    #[inline]
    pub fn z(&self) -> f64 {
        self.position.y
    }
}

/// Coastline membership of a cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoastalTag {
    /// Growth wave that claimed the cell (0 = seed band)
    pub depth: u32,
    /// Edge the coastline grew from
    pub direction: Direction,
}

/// Feature flags written by the generators
///
/// A cell with every field empty is untagged.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMetadata {
    /// Set when a coastline claimed the cell
    pub coastal: Option<CoastalTag>,
    /// Lake id when a lake claimed the cell
    pub lake: Option<usize>,
    /// Set when a river or tributary passes through one of the cell's vertices
    pub river: bool,
}

impl CellMetadata {
    /// True when no generator has tagged the cell
    pub fn is_untagged(&self) -> bool {
        self.coastal.is_none() && self.lake.is_none() && !self.river
    }

    /// True when the cell is water of any kind
    pub fn is_water(&self) -> bool {
        self.coastal.is_some() || self.lake.is_some()
    }
}

/// A single Voronoi cell on the grid
///
/// Cell ids are equal to the index of the owning site; boundary sites come
/// after every interior site so they never own a cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Unique identifier (index of the owning site)
    pub id: usize,

    /// Position of the owning site
    pub site: DVec2,

    /// Vertex ids of the boundary polygon, counter-clockwise around the site
    ///
    /// A vertex id is the index of the Delaunay triangle whose circumcenter it is.
    pub vertices: Vec<usize>,

    /// Clamped coordinates of `vertices`, in the same order
    pub polygon: Vec<DVec2>,

    /// IDs of adjacent interior cells, sorted ascending
    pub neighbors: Vec<usize>,

    /// Set when any polygon vertex lies in the boundary tolerance band
    pub on_border: bool,

    /// Feature flags
    pub metadata: CellMetadata,
}

impl Cell {
    /// Get the number of neighboring cells
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this cell is a neighbor of another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_cell_id: usize) -> bool {
        self.neighbors.binary_search(&other_cell_id).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Signed-area shoelace formula over the polygon
    ///
    /// Returns the absolute area; 0 for cells with fewer than 3 vertices.
    pub fn area(&self) -> f64 {
        if self.polygon.len() < 3 {
            return 0.0;
        }

        let n = self.polygon.len();
        let twice_area: f64 = (0..n)
            .map(|i| {
                let a = self.polygon[i];
                let b = self.polygon[(i + 1) % n];
                a.perp_dot(b)
            })
            .sum();

        twice_area.abs() * 0.5
    }

    /// Euclidean distance between the two sites
    pub fn distance_to(&self, other: &Cell) -> f64 {
        self.site.distance(other.site)
    }
}
