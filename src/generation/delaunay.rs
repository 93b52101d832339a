//! Delaunay triangulation adapter
//!
//! Wraps spade's incremental Delaunay triangulation and flattens it into
//! index arrays: triangle `t` owns half-edges `3t`, `3t + 1` and `3t + 2`,
//! half-edge `e` starts at `triangles[e]`, and `halfedges[e]` is the opposite
//! half-edge in the neighbouring triangle (`None` on the convex hull).

use std::collections::HashMap;

use spade::handles::FixedDirectedEdgeHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation as _};
use tracing::{debug, warn};

use crate::cell::Site;

/// Flat triangle / half-edge arrays over site indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Site index at the start of each half-edge (`3 × triangle_count` entries)
    pub triangles: Vec<usize>,
    /// Opposite half-edge, `None` on the hull
    pub halfedges: Vec<Option<usize>>,
    /// For each site, one half-edge ending at it (a hull half-edge if the site is on the hull)
    pub incoming: Vec<Option<usize>>,
}

/// Next half-edge within the same triangle
#[inline]
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

impl Triangulation {
    /// Triangulate the sites
    ///
    /// Sites with non-finite coordinates are logged and skipped. Fewer than 3
    /// usable sites (or an all-collinear input) yields an empty triangulation.
    pub fn new(sites: &[Site]) -> Self {
        let mut delaunay: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
        // spade vertex index -> first site inserted at that position
        let mut vertex_sites: Vec<usize> = Vec::with_capacity(sites.len());
        let mut usable = 0usize;

        for (idx, site) in sites.iter().enumerate() {
            if !site.position.is_finite() {
                warn!(site = idx, x = site.x(), z = site.z(), "skipping site with non-finite coordinates");
                continue;
            }
            match delaunay.insert(Point2::new(site.x(), site.z())) {
                Ok(handle) => {
                    let vertex = handle.index();
                    if vertex == vertex_sites.len() {
                        vertex_sites.push(idx);
                        usable += 1;
                    } else {
                        debug!(site = idx, duplicate_of = vertex_sites[vertex], "duplicate site position");
                    }
                }
                Err(err) => {
                    warn!(site = idx, error = ?err, "triangulation rejected site");
                }
            }
        }

        if usable < 3 {
            warn!(usable, "fewer than 3 usable sites, triangulation is empty");
            return Self {
                incoming: vec![None; sites.len()],
                ..Default::default()
            };
        }

        let face_count = delaunay.num_inner_faces();
        let mut triangles = Vec::with_capacity(face_count * 3);
        let mut edge_ids: HashMap<FixedDirectedEdgeHandle, usize> = HashMap::with_capacity(face_count * 3);

        for face in delaunay.inner_faces() {
            for edge in face.adjacent_edges() {
                edge_ids.insert(edge.fix(), triangles.len());
                triangles.push(vertex_sites[edge.from().fix().index()]);
            }
        }

        let mut halfedges = vec![None; triangles.len()];
        for face in delaunay.inner_faces() {
            for edge in face.adjacent_edges() {
                let id = edge_ids[&edge.fix()];
                halfedges[id] = edge_ids.get(&edge.rev().fix()).copied();
            }
        }

        let mut incoming = vec![None; sites.len()];
        for e in 0..triangles.len() {
            let end = triangles[next_halfedge(e)];
            if halfedges[e].is_none() || incoming[end].is_none() {
                incoming[end] = Some(e);
            }
        }

        debug!(
            sites = sites.len(),
            triangles = triangles.len() / 3,
            "triangulation complete"
        );

        Self {
            triangles,
            halfedges,
            incoming,
        }
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// True when no triangle could be formed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Site indices of triangle `t`
    #[inline]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        [self.triangles[3 * t], self.triangles[3 * t + 1], self.triangles[3 * t + 2]]
    }

    /// Half-edges ending at `site`, walking around it until the start or the hull
    pub fn edges_around_site(&self, site: usize) -> Vec<usize> {
        let Some(start) = self.incoming.get(site).copied().flatten() else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut incoming = start;
        loop {
            result.push(incoming);
            let outgoing = next_halfedge(incoming);
            match self.halfedges[outgoing] {
                Some(next) if next != start => incoming = next,
                _ => break,
            }
        }
        result
    }
}

/// Circumcenter of three points, `None` when they are (nearly) collinear
pub fn circumcenter(a: glam::DVec2, b: glam::DVec2, c: glam::DVec2) -> Option<glam::DVec2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }

    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    let x = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let y = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;

    let center = glam::DVec2::new(x, y);
    center.is_finite().then_some(center)
}
