//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

use std::fmt;

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over cell sites
///
/// The nearest site to a point inside the grid owns the Voronoi cell that
/// contains it, so a nearest-neighbor query is a point-in-cell query.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from cell sites, indexed by cell id
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_terrain::*;
    /// use glam::DVec2;
    ///
    /// let sites = vec![DVec2::new(10.0, 10.0), DVec2::new(90.0, 10.0), DVec2::new(50.0, 90.0)];
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(80.0, 20.0)), 1);
    /// ```
    pub fn new(sites: &[DVec2]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            len: points.len(),
        }
    }

    /// Number of indexed sites
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no site is indexed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cell id of the site nearest to `position`
    pub fn find_nearest(&self, position: DVec2) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        result.item
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}
