//! Stochastic lake growth
//!
//! Lakes start from random interior cells and grow one cell at a time: pick
//! a random lake that can still grow, pick one of its free neighbor cells
//! uniformly, commit it. All lakes share one cell budget.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::ExclusionHook;
use crate::cell::Cell;
use crate::config::LakeConfig;
use crate::rng::RngHandle;

/// Growth attempts allowed per budgeted cell
const RETRIES_PER_CELL: usize = 5;

/// Cells claimed by one lake
#[derive(Debug, Clone, PartialEq)]
pub struct Lake {
    /// Lake id, also written to each cell's metadata
    pub id: usize,
    /// Claimed cell ids in commit order, seed first
    pub cells: Vec<usize>,
}

impl Lake {
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
}

/// Budget-limited random growth of several lakes
#[derive(Debug, Clone)]
pub struct LakeGenerator {
    config: LakeConfig,
    lakes: Vec<Lake>,
}

impl LakeGenerator {
    /// Create a generator
    pub fn new(config: LakeConfig) -> Self {
        Self {
            config,
            lakes: Vec::new(),
        }
    }

    /// Settings used by this generator
    pub fn config(&self) -> &LakeConfig {
        &self.config
    }

    /// Lakes produced by the last `generate`
    pub fn lakes(&self) -> &[Lake] {
        &self.lakes
    }

    /// Every cell currently tagged by this generator
    pub fn cells(&self) -> Vec<usize> {
        self.lakes.iter().flat_map(|l| l.cells.iter().copied()).collect()
    }

    /// Seed and grow lakes, tagging claimed cells
    ///
    /// Border cells and cells rejected by `exclude` are never claimed; with
    /// `avoid_coastline` coastal cells are excluded as well. Growth stops at
    /// the budget, when no lake can grow, or after `budget × 5` attempts.
    pub fn generate(&mut self, cells: &mut [Cell], rng: &mut RngHandle, exclude: ExclusionHook<'_>) -> &[Lake] {
        self.clear(cells);

        let budget = self.config.budget;
        let avoid_coastline = self.config.avoid_coastline;
        let claimable = |cell: &Cell| {
            !cell.on_border
                && cell.metadata.lake.is_none()
                && !(avoid_coastline && cell.metadata.coastal.is_some())
                && !exclude(cell)
        };

        let mut eligible: Vec<usize> = cells.iter().filter(|c| claimable(c)).map(|c| c.id).collect();
        rng.shuffle(&mut eligible);
        let seed_count = self.config.num_lakes.min(budget).min(eligible.len());

        for (lake_id, &cell_id) in eligible[..seed_count].iter().enumerate() {
            cells[cell_id].metadata.lake = Some(lake_id);
            self.lakes.push(Lake {
                id: lake_id,
                cells: vec![cell_id],
            });
        }

        let mut claimed = seed_count;
        let mut growing: Vec<usize> = (0..self.lakes.len()).collect();
        let max_attempts = budget * RETRIES_PER_CELL;
        let mut attempts = 0;

        while claimed < budget && attempts < max_attempts {
            let Some(slot) = rng.index(growing.len()) else {
                break;
            };
            attempts += 1;
            let lake_idx = growing[slot];

            let frontier: Vec<usize> = self.lakes[lake_idx]
                .cells
                .iter()
                .flat_map(|&id| cells[id].neighbors.iter().copied())
                .filter(|&n| claimable(&cells[n]))
                .collect::<BTreeSet<usize>>()
                .into_iter()
                .collect();

            let Some(&next) = rng.choose(&frontier) else {
                growing.remove(slot);
                continue;
            };

            cells[next].metadata.lake = Some(self.lakes[lake_idx].id);
            self.lakes[lake_idx].cells.push(next);
            claimed += 1;
        }

        if claimed < budget {
            debug!(claimed, budget, attempts, "lake growth stopped before the budget was spent");
        }
        info!(lakes = self.lakes.len(), cells = claimed, budget, "lakes generated");
        &self.lakes
    }

    /// Remove every lake tag this generator wrote
    pub fn clear(&mut self, cells: &mut [Cell]) {
        for lake in self.lakes.drain(..) {
            for cell_id in lake.cells {
                if let Some(cell) = cells.get_mut(cell_id) {
                    cell.metadata.lake = None;
                }
            }
        }
    }
}
