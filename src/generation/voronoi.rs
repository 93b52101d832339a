//! Voronoi diagram construction from the Delaunay triangulation
//!
//! Voronoi vertices are triangle circumcenters, clamped into the grid. Each
//! interior site's cell is gathered by walking the half-edges around it,
//! neighbors come from the triangles it shares, and edges join the
//! circumcenters of triangles on either side of each interior half-edge.

use std::collections::{BTreeSet, HashSet};

use glam::DVec2;
use tracing::info;

use super::delaunay::{circumcenter, Triangulation};
use crate::cell::{Cell, CellMetadata, Site};
use crate::graph::VertexGraph;

/// Weight floor for edges touching the boundary band
pub const BOUNDARY_EDGE_WEIGHT: f64 = 1000.0;

/// Decimal digits kept when detecting coincident circumcenters
const DEDUP_SCALE: f64 = 1_000_000.0;

/// The immutable base graph of a generation pass
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiDiagram {
    /// Side length of the grid
    pub grid_size: f64,
    /// Width of the boundary band
    pub boundary_tolerance: f64,
    /// Triangulation input, interior sites first
    pub sites: Vec<Site>,
    /// Flat triangle and half-edge arrays
    pub triangulation: Triangulation,
    /// One cell per interior site
    pub cells: Vec<Cell>,
    /// Vertex id -> cells whose polygon touches it
    ///
    /// Includes cells where the vertex collapsed into a coincident one during
    /// dedup, so such a cell may list the vertex without holding its id.
    pub vertex_cells: Vec<Vec<usize>>,
    /// Clamped circumcenters, adjacency and weighted edges
    pub graph: VertexGraph,
}

impl VoronoiDiagram {
    /// Build the diagram for `sites` on `[0, grid_size]²`
    ///
    /// Never fails: an empty or degenerate triangulation produces a diagram
    /// with cells that have no vertices.
    pub fn build(sites: Vec<Site>, grid_size: f64, boundary_tolerance: f64) -> Self {
        let triangulation = Triangulation::new(&sites);

        // Circumcenters are clamped before any cell or edge refers to them
        let vertices: Vec<Option<DVec2>> = (0..triangulation.triangle_count())
            .map(|t| {
                let [a, b, c] = triangulation.triangle(t);
                circumcenter(sites[a].position, sites[b].position, sites[c].position)
                    .map(|p| p.clamp(DVec2::ZERO, DVec2::splat(grid_size)))
            })
            .collect();

        let mut diagram = Self {
            grid_size,
            boundary_tolerance,
            sites,
            triangulation,
            cells: Vec::new(),
            vertex_cells: vec![Vec::new(); vertices.len()],
            graph: VertexGraph::with_vertices(vertices),
        };

        diagram.build_cells();
        diagram.build_edges();
        diagram.apply_boundary_weights();

        info!(
            cells = diagram.cells.len(),
            vertices = diagram.graph.valid_vertex_count(),
            edges = diagram.graph.edge_count(),
            "voronoi diagram built"
        );
        diagram
    }

    /// True if `p` lies within the boundary tolerance of any grid edge
    pub fn in_boundary_band(&self, p: DVec2) -> bool {
        let tol = self.boundary_tolerance;
        let max = self.grid_size - tol;
        p.x <= tol || p.y <= tol || p.x >= max || p.y >= max
    }

    /// True if vertex `id` exists and lies in the boundary band
    pub fn is_boundary_vertex(&self, id: usize) -> bool {
        self.graph
            .coordinate(id)
            .map(|p| self.in_boundary_band(p))
            .unwrap_or(false)
    }

    /// Vertex coordinates by id (`None` for degenerate triangles)
    #[inline]
    pub fn vertices(&self) -> &[Option<DVec2>] {
        &self.graph.vertices
    }

    fn build_cells(&mut self) {
        let cell_of_site: Vec<Option<usize>> = {
            let mut next = 0;
            self.sites
                .iter()
                .map(|s| {
                    if s.is_boundary {
                        None
                    } else {
                        next += 1;
                        Some(next - 1)
                    }
                })
                .collect()
        };

        for (site_idx, site) in self.sites.iter().enumerate() {
            let Some(cell_id) = cell_of_site[site_idx] else {
                continue;
            };

            let incoming = self.triangulation.edges_around_site(site_idx);

            let mut neighbor_set = BTreeSet::new();
            let mut seen_positions = HashSet::new();
            let mut candidates: Vec<(usize, DVec2)> = Vec::with_capacity(incoming.len());

            for &e in &incoming {
                let t = e / 3;
                for other in self.triangulation.triangle(t) {
                    if other != site_idx {
                        if let Some(neighbor) = cell_of_site[other] {
                            neighbor_set.insert(neighbor);
                        }
                    }
                }

                let Some(p) = self.graph.coordinate(t) else {
                    continue;
                };
                self.vertex_cells[t].push(cell_id);
                let key = (
                    (p.x * DEDUP_SCALE).round() as i64,
                    (p.y * DEDUP_SCALE).round() as i64,
                );
                if seen_positions.insert(key) {
                    candidates.push((t, p));
                }
            }

            let ordered = order_counter_clockwise(candidates, site.position);
            let on_border = ordered.iter().any(|(_, p)| self.in_boundary_band(*p));

            self.cells.push(Cell {
                id: cell_id,
                site: site.position,
                vertices: ordered.iter().map(|(id, _)| *id).collect(),
                polygon: ordered.iter().map(|(_, p)| *p).collect(),
                neighbors: neighbor_set.into_iter().collect(),
                on_border,
                metadata: CellMetadata::default(),
            });
        }
    }

    fn build_edges(&mut self) {
        for e in 0..self.triangulation.halfedges.len() {
            let Some(opposite) = self.triangulation.halfedges[e] else {
                continue;
            };
            if opposite < e {
                continue;
            }

            let (t1, t2) = (e / 3, opposite / 3);
            if t1 == t2 {
                continue;
            }
            let (Some(a), Some(b)) = (self.graph.coordinate(t1), self.graph.coordinate(t2)) else {
                continue;
            };

            // Both ends on the outer band would form a phantom chord along the edge
            if self.in_boundary_band(a) && self.in_boundary_band(b) {
                continue;
            }

            self.graph.add_edge(t1, t2, a.distance(b));
        }
    }

    /// Raise every edge touching the boundary band to at least `BOUNDARY_EDGE_WEIGHT`
    fn apply_boundary_weights(&mut self) {
        let band: HashSet<usize> = self
            .graph
            .valid_vertices()
            .filter(|&v| self.is_boundary_vertex(v))
            .collect();

        for ((u, v), weight) in self.graph.edges.iter_mut() {
            if band.contains(u) || band.contains(v) {
                *weight = weight.max(BOUNDARY_EDGE_WEIGHT);
            }
        }
    }
}

/// Sort vertices by angle around `center`, counter-clockwise from +x
fn order_counter_clockwise(mut vertices: Vec<(usize, DVec2)>, center: DVec2) -> Vec<(usize, DVec2)> {
    if vertices.len() < 3 {
        return vertices;
    }
    vertices.sort_by(|(_, a), (_, b)| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });
    vertices
}
