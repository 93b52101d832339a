//! Integration tests for full generation passes
//!
//! These tests exercise the public API end to end: diagram construction,
//! region growth, path carving and the partition tracker.

use rust_voronoi_terrain::*;
use std::collections::{BTreeSet, HashSet};

fn config(seed: u64) -> MapConfig {
    MapConfigBuilder::new()
        .seed(seed)
        .grid_size(100.0)
        .unwrap()
        .num_sites(400)
        .unwrap()
        .coastline(Direction::South, 45)
        .lakes(LakeConfig {
            budget: 25,
            num_lakes: 3,
            avoid_coastline: true,
        })
        .rivers(RiverConfig::new(3))
        .tributaries(TributaryConfig {
            num_tributaries: 4,
            max_tributary_length: 0,
        })
        .build()
        .unwrap()
}

#[test]
fn test_generation_is_deterministic() {
    let a = TerrainMap::generate(config(777)).unwrap();
    let b = TerrainMap::generate(config(777)).unwrap();

    assert_eq!(a.cells(), b.cells());
    assert_eq!(a.vertices(), b.vertices());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.rivers(), b.rivers());
    assert_eq!(a.tributaries(), b.tributaries());
    assert_eq!(a.coastlines(), b.coastlines());
    assert_eq!(a.lakes(), b.lakes());
}

#[test]
fn test_different_seeds_differ() {
    let a = TerrainMap::generate(config(1)).unwrap();
    let b = TerrainMap::generate(config(2)).unwrap();
    assert_ne!(a.sites(), b.sites());
}

#[test]
fn test_vertex_adjacency_is_symmetric() {
    let map = TerrainMap::generate(config(31)).unwrap();
    let graph = map.graph();

    for (&u, neighbors) in &graph.adjacency {
        for &v in neighbors {
            assert!(graph.neighbors(v).contains(&u), "{} -> {} has no reverse link", u, v);
            assert_eq!(graph.edge_weight(u, v), graph.edge_weight(v, u));
        }
    }
    assert!(graph.validate().is_valid);
}

#[test]
fn test_cell_adjacency_is_symmetric() {
    let map = TerrainMap::generate(config(32)).unwrap();
    for cell in map.cells() {
        for &n in &cell.neighbors {
            assert!(map.cells()[n].is_neighbor_of(cell.id));
        }
    }
}

#[test]
fn test_no_edge_inside_boundary_band() {
    let map = TerrainMap::generate(config(33)).unwrap();
    let diagram = map.diagram();
    for &(u, v) in map.edges().keys() {
        assert!(
            !(diagram.is_boundary_vertex(u) && diagram.is_boundary_vertex(v)),
            "edge {}-{} lies inside the boundary band",
            u,
            v
        );
    }
}

#[test]
fn test_edge_weights_never_below_length() {
    let map = TerrainMap::generate(config(34)).unwrap();
    let graph = map.graph();
    for (&(u, v), &weight) in map.edges() {
        let length = graph.coordinate(u).unwrap().distance(graph.coordinate(v).unwrap());
        assert!(weight >= length - 1e-9);
    }
}

#[test]
fn test_partitions_cover_unconsumed_vertices() {
    let map = TerrainMap::generate(config(35)).unwrap();
    let state = map.graph_state();
    let consumed = state.consumed_vertices();

    let expected: BTreeSet<usize> = state
        .base_graph()
        .unwrap()
        .valid_vertices()
        .filter(|v| !consumed.contains(v))
        .collect();

    let mut covered = BTreeSet::new();
    for partition in state.partitions() {
        for v in partition.graph.valid_vertices() {
            assert!(covered.insert(v), "vertex {} appears in two partitions", v);
        }
    }
    assert_eq!(covered, expected);
}

#[test]
fn test_carved_paths_are_consumed() {
    let map = TerrainMap::generate(config(36)).unwrap();
    let consumed = map.graph_state().consumed_vertices();

    for river in map.rivers() {
        assert!(river.vertices.iter().all(|v| consumed.contains(v)));
    }
    for tributary in map.tributaries() {
        assert!(tributary.vertices.iter().all(|v| consumed.contains(v)));
        let PathKind::Tributary { parent } = tributary.kind else {
            panic!("tributary with river kind");
        };
        let parent_river = map.rivers().iter().find(|r| r.id == parent).unwrap();
        assert!(parent_river.vertices.contains(&tributary.vertices[0]));
    }
}

#[test]
fn test_region_budgets_are_ceilings() {
    for seed in [3, 4, 5] {
        let map = TerrainMap::generate(config(seed)).unwrap();
        assert!(map.coastline_cells().len() <= 45);
        assert!(map.lake_cells().len() <= 25);

        let coast: HashSet<usize> = map.coastline_cells().into_iter().collect();
        for id in map.lake_cells() {
            assert!(!coast.contains(&id));
            assert!(!map.cells()[id].on_border);
        }
    }
}

#[test]
fn test_coastline_budget_is_met_on_large_grid() {
    let config = MapConfigBuilder::new()
        .seed(90)
        .num_sites(600)
        .unwrap()
        .coastline(Direction::North, 40)
        .build()
        .unwrap();
    let map = TerrainMap::generate(config).unwrap();
    assert_eq!(map.coastline_cells().len(), 40);
}

#[test]
fn test_clear_is_idempotent() {
    let mut map = TerrainMap::generate(config(40)).unwrap();

    for _ in 0..2 {
        map.clear_lakes();
        map.clear_coastlines();
        assert!(map.lake_cells().is_empty());
        assert!(map.coastline_cells().is_empty());
        assert!(map
            .cells()
            .iter()
            .all(|c| c.metadata.lake.is_none() && c.metadata.coastal.is_none()));
    }
}

#[test]
fn test_cells_have_polygons() {
    let map = TerrainMap::generate(config(41)).unwrap();
    for cell in map.cells().iter().filter(|c| !c.on_border) {
        assert!(cell.vertex_count() >= 3);
        assert!(cell.area() > 0.0);
    }
}

#[test]
fn test_features_can_be_disabled() {
    let config = MapConfigBuilder::new().seed(5).num_sites(50).unwrap().build().unwrap();
    let map = TerrainMap::generate(config).unwrap();

    assert!(map.coastlines().is_empty());
    assert!(map.lakes().is_empty());
    assert!(map.rivers().is_empty());
    assert!(map.cells().iter().all(|c| c.metadata.is_untagged()));
    assert_eq!(map.graph_state().partition_count(), 1);
}

#[test]
fn test_missing_seed_is_rejected() {
    let result = MapConfigBuilder::new().num_sites(50).unwrap().build();
    assert!(matches!(result, Err(TerrainError::InvalidConfig(_))));
}

#[test]
fn test_oversized_site_distribution_fails_before_generation() {
    let mut config = MapConfigBuilder::new().seed(1).build().unwrap();
    config.voronoi.sites = SiteDistribution::Poisson { radius: 0.0001 };

    let result = TerrainMap::generate(config);
    assert!(matches!(result, Err(TerrainError::InvalidConfig(_))));
}
