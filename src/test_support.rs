//! Small hand-built fixtures shared by unit tests

use glam::DVec2;

use crate::cell::{Cell, CellMetadata};
use crate::graph::VertexGraph;

/// `n × n` square cells of side `spacing`, 4-connected, id `z * n + x`
///
/// The outer ring of cells is flagged `on_border`.
pub(crate) fn lattice_cells(n: usize, spacing: f64) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(n * n);
    for z in 0..n {
        for x in 0..n {
            let mut neighbors = Vec::with_capacity(4);
            if z > 0 {
                neighbors.push((z - 1) * n + x);
            }
            if x > 0 {
                neighbors.push(z * n + x - 1);
            }
            if x + 1 < n {
                neighbors.push(z * n + x + 1);
            }
            if z + 1 < n {
                neighbors.push((z + 1) * n + x);
            }

            let (x0, z0) = (x as f64 * spacing, z as f64 * spacing);
            cells.push(Cell {
                id: z * n + x,
                site: DVec2::new(x0 + spacing / 2.0, z0 + spacing / 2.0),
                vertices: Vec::new(),
                polygon: vec![
                    DVec2::new(x0, z0),
                    DVec2::new(x0 + spacing, z0),
                    DVec2::new(x0 + spacing, z0 + spacing),
                    DVec2::new(x0, z0 + spacing),
                ],
                neighbors,
                on_border: x == 0 || z == 0 || x + 1 == n || z + 1 == n,
                metadata: CellMetadata::default(),
            });
        }
    }
    cells
}

/// `n × n` vertex lattice at `(x * spacing, z * spacing)`, 4-connected with Euclidean weights
pub(crate) fn lattice_graph(n: usize, spacing: f64) -> VertexGraph {
    let vertices = (0..n * n)
        .map(|id| Some(DVec2::new((id % n) as f64 * spacing, (id / n) as f64 * spacing)))
        .collect();
    let mut graph = VertexGraph::with_vertices(vertices);
    for z in 0..n {
        for x in 0..n {
            let id = z * n + x;
            if x + 1 < n {
                graph.add_edge(id, id + 1, spacing);
            }
            if z + 1 < n {
                graph.add_edge(id, id + n, spacing);
            }
        }
    }
    graph
}
