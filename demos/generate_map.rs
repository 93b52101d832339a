//! Example: Generate a terrain map
//!
//! Runs a full generation pass with every feature enabled and prints a
//! summary. With the `serde` feature the snapshot is written as JSON to the
//! path given as the first argument.

use rust_voronoi_terrain::*;
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();

    let config = MapConfigBuilder::new()
        .seed(12345)
        .grid_size(100.0)?
        .poisson_radius(4.5)?
        .coastline(Direction::West, 120)
        .lakes(LakeConfig {
            budget: 40,
            num_lakes: 4,
            avoid_coastline: true,
        })
        .rivers(RiverConfig::new(3))
        .tributaries(TributaryConfig {
            num_tributaries: 6,
            max_tributary_length: 20,
        })
        .build()?;

    let map = TerrainMap::generate(config)?;

    println!("Terrain Map Generation Example");
    println!("==============================\n");
    println!("  Cells:    {}", map.cell_count());
    println!("  Vertices: {}", map.graph().valid_vertex_count());
    println!("  Edges:    {}", map.edges().len() / 2);

    for coastline in map.coastlines() {
        println!(
            "  Coastline {} ({}): {} cells, max depth {:?}",
            coastline.id,
            coastline.direction.name(),
            coastline.len(),
            coastline.max_depth()
        );
    }
    for lake in map.lakes() {
        println!("  Lake {}: {} cells", lake.id, lake.len());
    }
    for river in map.rivers() {
        println!("  River {}: {} vertices, length {:.1}", river.id, river.vertex_count(), river.length);
    }
    for tributary in map.tributaries() {
        println!(
            "  Tributary {} ({:?}): {} vertices",
            tributary.id,
            tributary.kind,
            tributary.vertex_count()
        );
    }
    println!("  Live partitions: {}", map.graph_state().partition_count());

    #[cfg(feature = "spatial-index")]
    if let Some(cell_id) = map.find_cell_at(DVec2::new(50.0, 50.0)) {
        println!("  Grid center lies in cell {}", cell_id);
    }

    #[cfg(feature = "serde")]
    if let Some(path) = std::env::args().nth(1) {
        let snapshot = MapSnapshot::from_map(&map);
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("\nSnapshot written to {}", path),
                Err(e) => eprintln!("failed to write {}: {}", path, e),
            },
            Err(e) => eprintln!("failed to serialize snapshot: {}", e),
        }
    }

    Ok(())
}
