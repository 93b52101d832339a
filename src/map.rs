//! TerrainMap main structure

use std::collections::{BTreeMap, HashSet};

use glam::DVec2;
use tracing::info;

use crate::cell::{Cell, Site};
use crate::config::{LakeConfig, MapConfig};
use crate::error::{Result, TerrainError};
use crate::features::{
    no_exclusion, Coastline, CoastlineGenerator, Lake, LakeGenerator, PathFeature, RiverGenerator,
    TributaryGenerator,
};
use crate::generation::{generate_diagram, Triangulation, VoronoiDiagram};
use crate::graph::{EdgeKey, GraphState, VertexGraph};
use crate::pathfinding::Pathfinder;
use crate::rng::RngHandle;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A generated map: the Voronoi base graph plus every carved feature
///
/// The map owns the base diagram, the partition tracker and the feature
/// generators for one generation pass. Nothing is updated incrementally;
/// a new pass means a new `TerrainMap`.
///
/// # Examples
///
/// ```
/// use rust_voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .num_sites(150)
///     .unwrap()
///     .coastline(Direction::West, 20)
///     .rivers(RiverConfig::new(1))
///     .build()
///     .unwrap();
///
/// let map = TerrainMap::generate(config).unwrap();
/// println!("Generated {} cells", map.cell_count());
///
/// if let Some(cell) = map.get_cell(0) {
///     println!("Cell 0 has {} neighbors", cell.neighbor_count());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TerrainMap {
    /// Configuration used to generate this map
    config: MapConfig,

    /// Sites, triangulation, cells and the base vertex graph
    diagram: VoronoiDiagram,

    /// Live routing partitions
    graph_state: GraphState,

    coastline_generator: Option<CoastlineGenerator>,
    coastlines: Vec<Coastline>,
    lake_generator: Option<LakeGenerator>,
    rivers: Vec<PathFeature>,
    tributaries: Vec<PathFeature>,

    /// Nearest-site lookup (requires spatial-index feature, absent when there are no cells)
    #[cfg(feature = "spatial-index")]
    spatial_index: Option<SpatialIndex>,
}

impl TerrainMap {
    /// Run a full generation pass
    ///
    /// Random draws happen in a fixed order: site sampling, coastline,
    /// lakes, rivers, tributaries. Missing features (no route, empty
    /// border window, exhausted frontier) are logged and skipped.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation. No generation work is
    /// done in that case.
    pub fn generate(config: MapConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = RngHandle::new(config.seed);

        let diagram = generate_diagram(&config, &mut rng);
        let mut graph_state = GraphState::new();
        graph_state.initialize(&diagram.graph);

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let sites: Vec<DVec2> = diagram.cells.iter().map(|c| c.site).collect();
            (!sites.is_empty()).then(|| SpatialIndex::new(&sites))
        };

        let mut map = Self {
            config,
            diagram,
            graph_state,
            coastline_generator: None,
            coastlines: Vec::new(),
            lake_generator: None,
            rivers: Vec::new(),
            tributaries: Vec::new(),
            #[cfg(feature = "spatial-index")]
            spatial_index,
        };

        map.generate_coastlines(&mut rng);
        if let Some(lakes) = map.config.lakes {
            map.regenerate_lakes(lakes, &mut rng);
        }
        map.generate_rivers(&mut rng)?;
        map.generate_tributaries(&mut rng)?;
        map.mark_river_cells();

        info!(
            seed = map.config.seed,
            cells = map.cell_count(),
            coastlines = map.coastlines.len(),
            lakes = map.lakes().len(),
            rivers = map.rivers.len(),
            tributaries = map.tributaries.len(),
            "terrain map generated"
        );
        Ok(map)
    }

    fn generate_coastlines(&mut self, rng: &mut RngHandle) {
        let Some(coast_config) = self.config.coastlines else {
            return;
        };
        let mut generator = CoastlineGenerator::new(coast_config);
        let keep_out_lakes = |cell: &Cell| cell.metadata.lake.is_some();
        let coastline = generator.generate(
            self.coastlines.len(),
            &mut self.diagram.cells,
            self.config.grid_size,
            rng,
            &keep_out_lakes,
        );
        self.coastlines.push(coastline);
        self.coastline_generator = Some(generator);
    }

    fn generate_rivers(&mut self, rng: &mut RngHandle) -> Result<()> {
        let Some(river_config) = self.config.rivers else {
            return Ok(());
        };
        let generator = RiverGenerator::new(river_config)
            .with_pathfinder(Pathfinder::with_max_iterations(river_config.max_path_iterations));
        for index in 0..river_config.num_rivers {
            if let Some(river) = generator.carve(index, self.config.grid_size, &mut self.graph_state, rng)? {
                self.rivers.push(river);
            }
        }
        Ok(())
    }

    fn generate_tributaries(&mut self, rng: &mut RngHandle) -> Result<()> {
        let Some(tributary_config) = self.config.tributaries else {
            return Ok(());
        };
        if self.rivers.is_empty() {
            return Ok(());
        }
        let pathfinder = self
            .config
            .rivers
            .map(|r| Pathfinder::with_max_iterations(r.max_path_iterations))
            .unwrap_or_default();
        let generator = TributaryGenerator::new(tributary_config).with_pathfinder(pathfinder);
        for index in 0..tributary_config.num_tributaries {
            let parent = &self.rivers[index % self.rivers.len()];
            if let Some(tributary) = generator.carve(index, parent, &mut self.graph_state, rng)? {
                self.tributaries.push(tributary);
            }
        }
        Ok(())
    }

    /// Flag every cell touching a river or tributary vertex
    fn mark_river_cells(&mut self) {
        let touched: Vec<usize> = self
            .rivers
            .iter()
            .chain(&self.tributaries)
            .flat_map(|path| path.vertices.iter())
            .filter_map(|&v| self.diagram.vertex_cells.get(v))
            .flatten()
            .copied()
            .collect();
        for cell_id in touched {
            self.diagram.cells[cell_id].metadata.river = true;
        }
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Get the number of cells on this map
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.diagram.cells.len()
    }

    /// Get a cell by ID
    ///
    /// Returns `None` if the cell ID is out of bounds.
    #[inline]
    pub fn get_cell(&self, id: usize) -> Option<&Cell> {
        self.diagram.cells.get(id)
    }

    /// Get a cell by ID
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` if the cell ID is out of bounds
    pub fn cell(&self, id: usize) -> Result<&Cell> {
        self.diagram.cells.get(id).ok_or(TerrainError::CellNotFound(id))
    }

    /// Get all cells as a slice
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.diagram.cells
    }

    /// Triangulation input, interior sites first, then the boundary ring
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.diagram.sites
    }

    /// Triangle and half-edge arrays
    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.diagram.triangulation
    }

    /// Voronoi vertices by id (`None` for degenerate triangles)
    #[inline]
    pub fn vertices(&self) -> &[Option<DVec2>] {
        self.diagram.vertices()
    }

    /// Weighted edges of the base graph, both directions
    #[inline]
    pub fn edges(&self) -> &BTreeMap<EdgeKey, f64> {
        &self.diagram.graph.edges
    }

    /// The base vertex graph, before any path was carved
    #[inline]
    pub fn graph(&self) -> &VertexGraph {
        &self.diagram.graph
    }

    /// The full Voronoi diagram
    #[inline]
    pub fn diagram(&self) -> &VoronoiDiagram {
        &self.diagram
    }

    /// Partition tracker after all rivers and tributaries were carved
    #[inline]
    pub fn graph_state(&self) -> &GraphState {
        &self.graph_state
    }

    /// Cells whose polygon touches vertex `id`
    pub fn vertex_cells(&self, id: usize) -> &[usize] {
        self.diagram
            .vertex_cells
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Carved rivers, in carve order
    #[inline]
    pub fn rivers(&self) -> &[PathFeature] {
        &self.rivers
    }

    /// Carved tributaries, in carve order
    #[inline]
    pub fn tributaries(&self) -> &[PathFeature] {
        &self.tributaries
    }

    /// Generated coastlines
    #[inline]
    pub fn coastlines(&self) -> &[Coastline] {
        &self.coastlines
    }

    /// Generated lakes
    pub fn lakes(&self) -> &[Lake] {
        self.lake_generator.as_ref().map(|g| g.lakes()).unwrap_or(&[])
    }

    /// Get neighbor IDs for a cell
    ///
    /// Returns an empty slice if the cell ID is invalid.
    pub fn get_neighbors(&self, cell_id: usize) -> &[usize] {
        self.diagram
            .cells
            .get(cell_id)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Find the cell whose site is nearest to `point` (requires spatial-index feature)
    ///
    /// For points inside the grid this is the Voronoi cell containing `point`.
    /// Returns `None` only for a map without cells.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, point: DVec2) -> Option<usize> {
        self.spatial_index.as_ref().map(|index| index.find_nearest(point))
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// # Returns
    ///
    /// Sorted cell IDs within `hops`, including the center cell.
    /// Returns an empty vec if `center_id` is invalid.
    pub fn find_cells_within_hops(&self, center_id: usize, hops: usize) -> Vec<usize> {
        if center_id >= self.diagram.cells.len() {
            return vec![];
        }

        let mut visited = HashSet::from([center_id]);
        let mut current = vec![center_id];

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell_id in &current {
                for &neighbor in self.get_neighbors(cell_id) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut found: Vec<usize> = visited.into_iter().collect();
        found.sort_unstable();
        found
    }

    /// Cells tagged by any coastline
    pub fn coastline_cells(&self) -> Vec<usize> {
        self.coastline_generator
            .as_ref()
            .map(|g| g.cells().to_vec())
            .unwrap_or_default()
    }

    /// Cells tagged by any lake
    pub fn lake_cells(&self) -> Vec<usize> {
        self.lake_generator.as_ref().map(|g| g.cells()).unwrap_or_default()
    }

    /// Remove every coastline and its cell tags
    pub fn clear_coastlines(&mut self) {
        if let Some(generator) = self.coastline_generator.as_mut() {
            generator.clear(&mut self.diagram.cells);
        }
        self.coastlines.clear();
    }

    /// Remove every lake and its cell tags
    pub fn clear_lakes(&mut self) {
        if let Some(generator) = self.lake_generator.as_mut() {
            generator.clear(&mut self.diagram.cells);
        }
    }

    /// Replace the current lakes with a fresh growth pass
    ///
    /// Draws from `rng`; pass a handle seeded independently of the map seed
    /// to explore variations without regenerating the diagram.
    pub fn regenerate_lakes(&mut self, lakes: LakeConfig, rng: &mut RngHandle) -> &[Lake] {
        self.clear_lakes();
        let generator = self.lake_generator.insert(LakeGenerator::new(lakes));
        generator.generate(&mut self.diagram.cells, rng, &no_exclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Direction, MapConfigBuilder, RiverConfig, TributaryConfig};

    fn full_config(seed: u64) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .num_sites(300)
            .unwrap()
            .coastline(Direction::West, 30)
            .lakes(LakeConfig {
                budget: 20,
                num_lakes: 3,
                avoid_coastline: true,
            })
            .rivers(RiverConfig::new(2))
            .tributaries(TributaryConfig {
                num_tributaries: 2,
                max_tributary_length: 0,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_map_generation() {
        let map = TerrainMap::generate(full_config(42)).unwrap();

        assert_eq!(map.cell_count(), 300);
        assert_eq!(map.coastlines().len(), 1);
        assert!(map.coastlines()[0].len() <= 30);
        assert!(map.lake_cells().len() <= 20);
        assert!(map.graph_state().is_initialized());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = full_config(1);
        config.grid_size = -5.0;
        assert!(TerrainMap::generate(config).is_err());
    }

    #[test]
    fn test_get_cell() {
        let map = TerrainMap::generate(full_config(42)).unwrap();
        assert!(map.get_cell(0).is_some());
        assert!(map.get_cell(map.cell_count()).is_none());
    }

    #[test]
    fn test_cell_lookup_reports_unknown_ids() {
        let map = TerrainMap::generate(full_config(42)).unwrap();
        assert_eq!(map.cell(3).unwrap().id, 3);

        let missing = map.cell_count();
        assert_eq!(map.cell(missing), Err(TerrainError::CellNotFound(missing)));
        assert_eq!(
            TerrainError::CellNotFound(missing).to_string(),
            format!("cell not found: {}", missing)
        );
    }

    #[test]
    fn test_river_search_cap_comes_from_config() {
        let mut config = full_config(42);
        config.rivers = Some(RiverConfig::new(2).with_max_path_iterations(5));
        let capped = TerrainMap::generate(config).unwrap();
        assert!(capped.rivers().is_empty());
        assert!(capped.tributaries().is_empty());

        let mut config = full_config(42);
        config.rivers = Some(RiverConfig::new(2).with_max_path_iterations(100_000));
        let generous = TerrainMap::generate(config).unwrap();
        assert!(!generous.rivers().is_empty());
    }

    #[test]
    fn test_lakes_never_claim_coastline() {
        let map = TerrainMap::generate(full_config(7)).unwrap();
        let coast: HashSet<usize> = map.coastline_cells().into_iter().collect();
        assert!(map.lake_cells().iter().all(|id| !coast.contains(id)));
    }

    #[test]
    fn test_river_cells_are_flagged() {
        let map = TerrainMap::generate(full_config(3)).unwrap();
        for river in map.rivers().iter().chain(map.tributaries()) {
            for &v in &river.vertices {
                for &cell_id in map.vertex_cells(v) {
                    assert!(map.cells()[cell_id].metadata.river);
                }
            }
        }
    }

    #[test]
    fn test_paths_are_vertex_disjoint() {
        let map = TerrainMap::generate(full_config(11)).unwrap();
        let mut seen = HashSet::new();
        for river in map.rivers() {
            for &v in &river.vertices {
                assert!(seen.insert(v), "vertex {} shared by two rivers", v);
            }
        }
        for tributary in map.tributaries() {
            // The branch vertex belongs to the parent river
            for &v in &tributary.vertices[1..] {
                assert!(seen.insert(v), "vertex {} carved twice", v);
            }
        }
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_cell_at() {
        let map = TerrainMap::generate(full_config(42)).unwrap();
        let site = map.get_cell(5).unwrap().site;
        assert_eq!(map.find_cell_at(site), Some(5));
    }

    #[test]
    fn test_find_cells_within_hops() {
        let map = TerrainMap::generate(full_config(42)).unwrap();

        let r0 = map.find_cells_within_hops(0, 0);
        assert_eq!(r0, vec![0]);

        let r1 = map.find_cells_within_hops(0, 1);
        assert_eq!(r1.len(), 1 + map.get_neighbors(0).len());

        let r2 = map.find_cells_within_hops(0, 2);
        assert!(r2.len() > r1.len());

        assert!(map.find_cells_within_hops(999_999, 3).is_empty());
    }

    #[test]
    fn test_clear_coastlines_and_lakes() {
        let mut map = TerrainMap::generate(full_config(5)).unwrap();
        map.clear_coastlines();
        map.clear_lakes();

        assert!(map.coastline_cells().is_empty());
        assert!(map.lake_cells().is_empty());
        assert!(map.coastlines().is_empty());
        assert!(map.lakes().is_empty());
        assert!(map
            .cells()
            .iter()
            .all(|c| c.metadata.coastal.is_none() && c.metadata.lake.is_none()));
    }

    #[test]
    fn test_regenerate_lakes() {
        let mut map = TerrainMap::generate(full_config(5)).unwrap();
        let lakes = LakeConfig {
            budget: 12,
            num_lakes: 2,
            avoid_coastline: true,
        };
        let regenerated = map.regenerate_lakes(lakes, &mut RngHandle::new(99)).to_vec();
        assert!(regenerated.len() <= 2);

        let tagged = map.cells().iter().filter(|c| c.metadata.lake.is_some()).count();
        assert_eq!(tagged, map.lake_cells().len());
        assert!(tagged <= 12);
    }
}
