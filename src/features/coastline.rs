//! Coastline growth from one grid edge
//!
//! Seeds are the cells whose site lies in a margin band along the chosen
//! edge. The remaining budget is spent in synchronized waves: every cell of
//! depth `d` offers its unclaimed neighbors as depth `d + 1` candidates.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::ExclusionHook;
use crate::cell::{Cell, CoastalTag};
use crate::config::{CoastlineConfig, Direction};
use crate::rng::RngHandle;

/// Seed band width as a fraction of the grid size
pub const COASTLINE_MARGIN: f64 = 0.10;

/// Deepest wave ever admitted
pub const MAX_COASTLINE_DEPTH: u32 = 10;

/// Cells claimed by a coastline
#[derive(Debug, Clone, PartialEq)]
pub struct Coastline {
    /// Coastline id
    pub id: usize,
    /// Edge the coastline grew from
    pub direction: Direction,
    /// Claimed cell ids in admission order
    pub cells: Vec<usize>,
    /// Cell id -> wave depth
    pub depths: BTreeMap<usize, u32>,
}

impl Coastline {
    /// Number of claimed cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when nothing was claimed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Deepest wave reached
    pub fn max_depth(&self) -> Option<u32> {
        self.depths.values().copied().max()
    }
}

/// Budget-limited wavefront growth from a grid edge
#[derive(Debug, Clone)]
pub struct CoastlineGenerator {
    config: CoastlineConfig,
    claimed: Vec<usize>,
}

impl CoastlineGenerator {
    /// Create a generator for one coastline
    pub fn new(config: CoastlineConfig) -> Self {
        Self {
            config,
            claimed: Vec::new(),
        }
    }

    /// Settings used by this generator
    pub fn config(&self) -> &CoastlineConfig {
        &self.config
    }

    /// Cells currently tagged by this generator
    pub fn cells(&self) -> &[usize] {
        &self.claimed
    }

    /// Grow the coastline and tag claimed cells
    ///
    /// Never claims more than the budget; stops early without error when a
    /// wave has no candidates or the depth cap is reached.
    pub fn generate(
        &mut self,
        id: usize,
        cells: &mut [Cell],
        grid_size: f64,
        rng: &mut RngHandle,
        exclude: ExclusionHook<'_>,
    ) -> Coastline {
        let direction = self.config.direction;
        let budget = self.config.budget;
        let margin = COASTLINE_MARGIN * grid_size;

        let mut coastline = Coastline {
            id,
            direction,
            cells: Vec::new(),
            depths: BTreeMap::new(),
        };
        if budget == 0 {
            return coastline;
        }

        let claimable = |cell: &Cell| cell.metadata.coastal.is_none() && !exclude(cell);

        let mut seeds: Vec<usize> = cells
            .iter()
            .filter(|c| in_margin(c, direction, margin, grid_size) && claimable(c))
            .map(|c| c.id)
            .collect();
        rng.shuffle(&mut seeds);
        seeds.truncate(budget);

        let mut claimed: BTreeSet<usize> = BTreeSet::new();
        for &cell_id in &seeds {
            claimed.insert(cell_id);
            coastline.cells.push(cell_id);
            coastline.depths.insert(cell_id, 0);
        }

        let mut wave = seeds;
        let mut depth = 0;
        while coastline.cells.len() < budget && depth < MAX_COASTLINE_DEPTH {
            depth += 1;

            let mut seen = BTreeSet::new();
            let mut candidates = Vec::new();
            for &cell_id in &wave {
                for &neighbor in &cells[cell_id].neighbors {
                    if !claimed.contains(&neighbor) && claimable(&cells[neighbor]) && seen.insert(neighbor) {
                        candidates.push(neighbor);
                    }
                }
            }
            if candidates.is_empty() {
                debug!(depth, claimed = coastline.cells.len(), budget, "coastline frontier exhausted");
                break;
            }

            rng.shuffle(&mut candidates);
            candidates.truncate(budget - coastline.cells.len());
            for &cell_id in &candidates {
                claimed.insert(cell_id);
                coastline.cells.push(cell_id);
                coastline.depths.insert(cell_id, depth);
            }
            wave = candidates;
        }

        for (&cell_id, &depth) in &coastline.depths {
            cells[cell_id].metadata.coastal = Some(CoastalTag { depth, direction });
        }
        self.claimed.extend(coastline.cells.iter().copied());

        info!(
            direction = direction.name(),
            cells = coastline.cells.len(),
            budget,
            "coastline generated"
        );
        coastline
    }

    /// Remove every coastal tag this generator wrote
    pub fn clear(&mut self, cells: &mut [Cell]) {
        for cell_id in self.claimed.drain(..) {
            if let Some(cell) = cells.get_mut(cell_id) {
                cell.metadata.coastal = None;
            }
        }
    }
}

fn in_margin(cell: &Cell, direction: Direction, margin: f64, grid_size: f64) -> bool {
    match direction {
        Direction::North => cell.site.y <= margin,
        Direction::South => cell.site.y >= grid_size - margin,
        Direction::West => cell.site.x <= margin,
        Direction::East => cell.site.x >= grid_size - margin,
    }
}
