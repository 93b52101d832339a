//! Terrain Map Configuration and Builder
//!
//! This module provides the settings object consumed by a generation pass:
//! grid bounds, site sampling, and one optional block per terrain feature.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::pathfinding::DEFAULT_MAX_ITERATIONS;

/// Upper bound on the number of interior sites a pass may sample
///
/// Poisson sampling is bounded by its estimated site count `(grid_size / radius)²`.
pub const MAX_SITES: usize = 250_000;

/// How interior sites are sampled on the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteDistribution {
    /// Exactly this many uniformly random sites
    Count(usize),
    /// Poisson-disc sampling: no two sites closer than `radius`
    Poisson {
        /// Minimum spacing between sites in grid units
        radius: f64,
    },
}

impl SiteDistribution {
    /// Approximate spacing between neighbouring sites on a grid of `grid_size`
    ///
    /// Used to lay out the synthetic boundary ring at a density matching the interior.
    pub fn spacing(self, grid_size: f64) -> f64 {
        match self {
            SiteDistribution::Count(n) => grid_size / (n.max(1) as f64).sqrt(),
            SiteDistribution::Poisson { radius } => radius,
        }
    }

    /// Rough number of interior sites this distribution yields on a grid of `grid_size`
    pub fn estimated_sites(self, grid_size: f64) -> f64 {
        match self {
            SiteDistribution::Count(n) => n as f64,
            SiteDistribution::Poisson { radius } => (grid_size / radius).powi(2),
        }
    }
}

impl Default for SiteDistribution {
    fn default() -> Self {
        SiteDistribution::Count(500)
    }
}

/// Cardinal edge of the grid
///
/// North is the `z = 0` edge, south is `z = grid_size`, west is `x = 0`
/// and east is `x = grid_size`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Get a human-readable name for this direction
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

/// Voronoi diagram settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiConfig {
    /// Interior site sampling strategy
    pub sites: SiteDistribution,
    /// Distance from a grid edge within which a vertex counts as "on the boundary"
    ///
    /// Edges with both endpoints inside this band are dropped; edges with one
    /// endpoint inside it are heavily weighted to discourage routing.
    pub boundary_tolerance: f64,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            sites: SiteDistribution::default(),
            boundary_tolerance: 0.5,
        }
    }
}

/// Coastline growth settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoastlineConfig {
    /// Grid edge the coastline grows from
    pub direction: Direction,
    /// Maximum number of cells the coastline may claim
    pub budget: usize,
}

/// Lake growth settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LakeConfig {
    /// Maximum number of cells claimed by all lakes combined
    pub budget: usize,
    /// Number of lake seeds
    pub num_lakes: usize,
    /// Never seed or grow a lake into a coastal cell
    pub avoid_coastline: bool,
}

/// River carving settings
///
/// The A* cap also bounds tributary searches. A search expands roughly one
/// node per vertex it passes, so diagrams much denser than about a thousand
/// sites need a larger `max_path_iterations` or rivers give up silently.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverConfig {
    /// Number of rivers to attempt
    pub num_rivers: usize,
    /// Width of the north/south endpoint windows as a fraction of the grid size
    pub border_band: f64,
    /// Node expansions allowed per river or tributary search
    #[cfg_attr(feature = "serde", serde(default = "default_max_path_iterations"))]
    pub max_path_iterations: usize,
}

#[cfg(feature = "serde")]
fn default_max_path_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl RiverConfig {
    /// Create river settings with the default 5% endpoint window and search cap
    pub fn new(num_rivers: usize) -> Self {
        Self {
            num_rivers,
            border_band: 0.05,
            max_path_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Same settings with a different search cap
    pub fn with_max_path_iterations(mut self, max_path_iterations: usize) -> Self {
        self.max_path_iterations = max_path_iterations;
        self
    }
}

/// Tributary carving settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TributaryConfig {
    /// Total number of tributaries, distributed round-robin across rivers
    pub num_tributaries: usize,
    /// Upper bound on tributary length in vertices (0 = only the parent-derived bound)
    pub max_tributary_length: usize,
}

/// Configuration for one deterministic generation pass
///
/// The same configuration always produces the identical map: every random
/// decision is drawn from a single stream seeded with `seed`.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .grid_size(100.0).unwrap()
///     .num_sites(200).unwrap()
///     .lakes(LakeConfig { budget: 20, num_lakes: 3, avoid_coastline: true })
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 42);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Random seed for deterministic generation
    pub seed: u64,

    /// Side length of the square coordinate grid `[0, grid_size]²`
    pub grid_size: f64,

    /// Site sampling and boundary handling
    pub voronoi: VoronoiConfig,

    /// Coastline settings, `None` to skip coastline growth
    pub coastlines: Option<CoastlineConfig>,

    /// Lake settings, `None` to skip lakes
    pub lakes: Option<LakeConfig>,

    /// River settings, `None` to skip rivers (and therefore tributaries)
    pub rivers: Option<RiverConfig>,

    /// Tributary settings, `None` to skip tributaries
    pub tributaries: Option<TributaryConfig>,
}

impl MapConfig {
    /// Check every field for values that would make generation meaningless
    ///
    /// Called at the entry of `TerrainMap::generate`, before any work begins.
    pub fn validate(&self) -> Result<()> {
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "grid size must be positive (got {})",
                self.grid_size
            )));
        }

        match self.voronoi.sites {
            SiteDistribution::Count(n) if n < 3 => {
                return Err(TerrainError::InvalidConfig(format!(
                    "at least 3 sites are required (got {})",
                    n
                )));
            }
            SiteDistribution::Poisson { radius } if !radius.is_finite() || radius <= 0.0 => {
                return Err(TerrainError::InvalidConfig(format!(
                    "Poisson radius must be positive (got {})",
                    radius
                )));
            }
            _ => {}
        }

        let estimated = self.voronoi.sites.estimated_sites(self.grid_size);
        if estimated > MAX_SITES as f64 {
            return Err(TerrainError::InvalidConfig(format!(
                "site distribution yields about {:.0} sites, more than the limit of {}",
                estimated, MAX_SITES
            )));
        }

        let tolerance = self.voronoi.boundary_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 || tolerance * 2.0 >= self.grid_size {
            return Err(TerrainError::InvalidConfig(format!(
                "boundary tolerance must lie in [0, grid_size / 2) (got {})",
                tolerance
            )));
        }

        if let Some(lakes) = &self.lakes {
            if lakes.budget > 0 && lakes.num_lakes == 0 {
                return Err(TerrainError::InvalidConfig(
                    "lake budget is set but num_lakes is 0".to_string(),
                ));
            }
        }

        if let Some(rivers) = &self.rivers {
            if !(rivers.border_band > 0.0 && rivers.border_band < 0.5) {
                return Err(TerrainError::InvalidConfig(format!(
                    "river border band must lie in (0, 0.5) (got {})",
                    rivers.border_band
                )));
            }
        }

        Ok(())
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use rust_voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(7)
///     .poisson_radius(4.0)
///     .unwrap()
///     .coastline(Direction::West, 40)
///     .rivers(RiverConfig::new(2))
///     .build()
///     .unwrap();
///
/// assert!(config.coastlines.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    grid_size: f64,
    voronoi: VoronoiConfig,
    coastlines: Option<CoastlineConfig>,
    lakes: Option<LakeConfig>,
    rivers: Option<RiverConfig>,
    tributaries: Option<TributaryConfig>,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: none (must be supplied, `build()` fails otherwise)
    /// - grid_size: 100.0
    /// - sites: 500 uniformly random sites
    /// - boundary_tolerance: 0.5
    /// - no terrain features
    pub fn new() -> Self {
        Self {
            seed: None,
            grid_size: 100.0,
            voronoi: VoronoiConfig::default(),
            coastlines: None,
            lakes: None,
            rivers: None,
            tributaries: None,
        }
    }

    /// Set the random seed for map generation
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the grid side length
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the size is not a positive finite number
    pub fn grid_size(mut self, size: f64) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "grid size must be positive (got {})",
                size
            )));
        }
        self.grid_size = size;
        Ok(self)
    }

    /// Sample exactly `count` uniformly random interior sites
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if fewer than 3 or more than `MAX_SITES` sites are requested
    pub fn num_sites(mut self, count: usize) -> Result<Self> {
        if !(3..=MAX_SITES).contains(&count) {
            return Err(TerrainError::InvalidConfig(format!(
                "site count must lie in [3, {}] (got {})",
                MAX_SITES, count
            )));
        }
        self.voronoi.sites = SiteDistribution::Count(count);
        Ok(self)
    }

    /// Sample interior sites with Poisson-disc spacing `radius`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the radius is not positive. A radius too
    /// small for the grid is rejected by `build()`, once the grid size is known.
    pub fn poisson_radius(mut self, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "Poisson radius must be positive (got {})",
                radius
            )));
        }
        self.voronoi.sites = SiteDistribution::Poisson { radius };
        Ok(self)
    }

    /// Set the boundary tolerance band width
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tolerance is negative
    pub fn boundary_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "boundary tolerance must be >= 0 (got {})",
                tolerance
            )));
        }
        self.voronoi.boundary_tolerance = tolerance;
        Ok(self)
    }

    /// Grow a coastline of at most `budget` cells from the given edge
    pub fn coastline(mut self, direction: Direction, budget: usize) -> Self {
        self.coastlines = Some(CoastlineConfig { direction, budget });
        self
    }

    /// Enable lake growth
    pub fn lakes(mut self, lakes: LakeConfig) -> Self {
        self.lakes = Some(lakes);
        self
    }

    /// Enable river carving
    pub fn rivers(mut self, rivers: RiverConfig) -> Self {
        self.rivers = Some(rivers);
        self
    }

    /// Enable tributary carving
    pub fn tributaries(mut self, tributaries: TributaryConfig) -> Self {
        self.tributaries = Some(tributaries);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if no seed was supplied or any field fails validation
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.ok_or_else(|| {
            TerrainError::InvalidConfig("a seed is required for deterministic generation".to_string())
        })?;

        let config = MapConfig {
            seed,
            grid_size: self.grid_size,
            voronoi: self.voronoi,
            coastlines: self.coastlines,
            lakes: self.lakes,
            rivers: self.rivers,
            tributaries: self.tributaries,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MapConfigBuilder::new().seed(1).build().unwrap();
        assert_eq!(config.grid_size, 100.0);
        assert_eq!(config.voronoi.sites, SiteDistribution::Count(500));
        assert_eq!(config.voronoi.boundary_tolerance, 0.5);
        assert!(config.coastlines.is_none());
        assert!(config.lakes.is_none());
        assert!(config.rivers.is_none());
        assert!(config.tributaries.is_none());
    }

    #[test]
    fn test_builder_requires_seed() {
        let result = MapConfigBuilder::new().build();
        assert!(matches!(result, Err(TerrainError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_custom() {
        let config = MapConfigBuilder::new()
            .seed(42)
            .grid_size(50.0)
            .unwrap()
            .poisson_radius(2.5)
            .unwrap()
            .coastline(Direction::East, 30)
            .lakes(LakeConfig {
                budget: 12,
                num_lakes: 2,
                avoid_coastline: true,
            })
            .rivers(RiverConfig::new(1))
            .tributaries(TributaryConfig {
                num_tributaries: 2,
                max_tributary_length: 10,
            })
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.grid_size, 50.0);
        assert_eq!(config.voronoi.sites, SiteDistribution::Poisson { radius: 2.5 });
        assert_eq!(config.coastlines.unwrap().direction, Direction::East);
        assert_eq!(config.lakes.unwrap().num_lakes, 2);
        assert_eq!(config.rivers.unwrap().border_band, 0.05);
        assert_eq!(config.rivers.unwrap().max_path_iterations, 1000);
        assert_eq!(config.tributaries.unwrap().max_tributary_length, 10);
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(MapConfigBuilder::new().grid_size(0.0).is_err());
        assert!(MapConfigBuilder::new().grid_size(f64::NAN).is_err());
        assert!(MapConfigBuilder::new().num_sites(2).is_err());
        assert!(MapConfigBuilder::new().poisson_radius(-1.0).is_err());
        assert!(MapConfigBuilder::new().boundary_tolerance(-0.1).is_err());
    }

    #[test]
    fn test_validate_lake_without_seeds() {
        let result = MapConfigBuilder::new()
            .seed(3)
            .lakes(LakeConfig {
                budget: 5,
                num_lakes: 0,
                avoid_coastline: false,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_tolerance_wider_than_grid() {
        let result = MapConfigBuilder::new()
            .seed(3)
            .grid_size(10.0)
            .unwrap()
            .boundary_tolerance(6.0)
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_oversized_site_counts() {
        assert!(MapConfigBuilder::new().num_sites(MAX_SITES).is_ok());
        assert!(matches!(
            MapConfigBuilder::new().num_sites(MAX_SITES + 1),
            Err(TerrainError::InvalidConfig(_))
        ));

        let tiny_radius = MapConfigBuilder::new().seed(1).poisson_radius(0.0001).unwrap().build();
        assert!(matches!(tiny_radius, Err(TerrainError::InvalidConfig(_))));

        let dense = MapConfigBuilder::new().seed(1).poisson_radius(0.25).unwrap().build();
        assert!(dense.is_ok());

        let mut config = MapConfigBuilder::new().seed(1).build().unwrap();
        config.voronoi.sites = SiteDistribution::Count(MAX_SITES * 4);
        assert!(matches!(config.validate(), Err(TerrainError::InvalidConfig(_))));
    }

    #[test]
    fn test_site_spacing() {
        assert_eq!(SiteDistribution::Count(100).spacing(100.0), 10.0);
        assert_eq!(SiteDistribution::Poisson { radius: 3.0 }.spacing(100.0), 3.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MapConfigBuilder::new()
            .seed(12345)
            .coastline(Direction::North, 10)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: MapConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_missing_seed_is_rejected() {
        let json = r#"{"gridSize":100.0,"voronoi":{"sites":{"Count":50},"boundary_tolerance":0.5},
            "coastlines":null,"lakes":null,"rivers":null,"tributaries":null}"#;
        let parsed: std::result::Result<MapConfig, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
