//! Site sampling on a flat square grid
//!
//! Interior sites come from either uniform sampling or Bridson's Poisson-disc
//! algorithm. A ring of boundary sites just outside the grid bounds the
//! diagram so that every interior cell is closed.

use glam::DVec2;

use crate::cell::Site;
use crate::config::SiteDistribution;
use crate::rng::RngHandle;

/// Candidate attempts per active point in Bridson's algorithm
const POISSON_ATTEMPTS: usize = 30;

/// Generate interior sites followed by the boundary ring
///
/// Interior sites occupy indices `0..n`; boundary sites follow. The interior
/// draws are the first values taken from `rng` in a generation pass.
pub fn generate_sites(distribution: SiteDistribution, grid_size: f64, rng: &mut RngHandle) -> Vec<Site> {
    let mut sites = match distribution {
        SiteDistribution::Count(count) => uniform_sites(count, grid_size, rng),
        SiteDistribution::Poisson { radius } => poisson_sites(radius, grid_size, rng),
    };
    sites.extend(boundary_ring(grid_size, distribution.spacing(grid_size)));
    sites
}

/// Uniformly random sites in `[0, grid_size)²`
pub fn uniform_sites(count: usize, grid_size: f64, rng: &mut RngHandle) -> Vec<Site> {
    (0..count)
        .map(|_| {
            let x = rng.range_f64(0.0, grid_size);
            let z = rng.range_f64(0.0, grid_size);
            Site::new(x, z)
        })
        .collect()
}

/// Poisson-disc sites in `[0, grid_size)²` (Bridson, 2007)
///
/// No two sites are closer than `radius`. A background grid with cell size
/// `radius / √2` holds at most one site per cell.
pub fn poisson_sites(radius: f64, grid_size: f64, rng: &mut RngHandle) -> Vec<Site> {
    let cell_size = radius / std::f64::consts::SQRT_2;
    let cols = (grid_size / cell_size).ceil().max(1.0) as usize;
    let mut background: Vec<Option<usize>> = vec![None; cols * cols];
    let mut points: Vec<DVec2> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let cell_of = |p: DVec2| -> (usize, usize) {
        let cx = ((p.x / cell_size) as usize).min(cols - 1);
        let cz = ((p.y / cell_size) as usize).min(cols - 1);
        (cx, cz)
    };

    let first = DVec2::new(rng.range_f64(0.0, grid_size), rng.range_f64(0.0, grid_size));
    let (cx, cz) = cell_of(first);
    background[cz * cols + cx] = Some(0);
    points.push(first);
    active.push(0);

    while let Some(slot) = rng.index(active.len()) {
        let origin = points[active[slot]];
        let mut placed = false;

        for _ in 0..POISSON_ATTEMPTS {
            let angle = rng.range_f64(0.0, std::f64::consts::TAU);
            let distance = rng.range_f64(radius, 2.0 * radius);
            let candidate = origin + DVec2::new(angle.cos(), angle.sin()) * distance;

            if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x >= grid_size || candidate.y >= grid_size {
                continue;
            }

            let (cx, cz) = cell_of(candidate);
            let x_range = cx.saturating_sub(2)..=(cx + 2).min(cols - 1);
            let too_close = x_range.clone().any(|nx| {
                (cz.saturating_sub(2)..=(cz + 2).min(cols - 1)).any(|nz| {
                    background[nz * cols + nx]
                        .map(|idx| points[idx].distance_squared(candidate) < radius * radius)
                        .unwrap_or(false)
                })
            });
            if too_close {
                continue;
            }

            let idx = points.len();
            background[cz * cols + cx] = Some(idx);
            points.push(candidate);
            active.push(idx);
            placed = true;
            break;
        }

        if !placed {
            active.swap_remove(slot);
        }
    }

    points.into_iter().map(|p| Site::new(p.x, p.y)).collect()
}

/// Boundary sites on a square ring offset half a spacing outside the grid
///
/// Corners are emitted once each; sites are ordered clockwise from the
/// north-west corner.
pub fn boundary_ring(grid_size: f64, spacing: f64) -> Vec<Site> {
    let spacing = if spacing.is_finite() && spacing > 0.0 {
        spacing
    } else {
        grid_size
    };
    let offset = spacing * 0.5;
    let low = -offset;
    let high = grid_size + offset;
    let span = high - low;
    let per_side = (span / spacing).ceil().max(1.0) as usize;
    let step = span / per_side as f64;

    let mut ring = Vec::with_capacity(per_side * 4);
    for i in 0..per_side {
        let t = step * i as f64;
        ring.push(Site::boundary(low + t, low));
        ring.push(Site::boundary(high, low + t));
        ring.push(Site::boundary(high - t, high));
        ring.push(Site::boundary(low, high - t));
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_count_and_bounds() {
        let mut rng = RngHandle::new(42);
        let sites = uniform_sites(200, 50.0, &mut rng);
        assert_eq!(sites.len(), 200);
        for site in &sites {
            assert!(!site.is_boundary);
            assert!((0.0..50.0).contains(&site.x()));
            assert!((0.0..50.0).contains(&site.z()));
        }
    }

    #[test]
    fn test_poisson_spacing() {
        let mut rng = RngHandle::new(7);
        let radius = 5.0;
        let sites = poisson_sites(radius, 60.0, &mut rng);
        assert!(sites.len() > 20, "expected a reasonably dense sample, got {}", sites.len());

        for (i, a) in sites.iter().enumerate() {
            for b in &sites[i + 1..] {
                assert!(
                    a.position.distance(b.position) >= radius - 1e-9,
                    "sites closer than the Poisson radius"
                );
            }
        }
    }

    #[test]
    fn test_boundary_ring_outside_grid() {
        let ring = boundary_ring(100.0, 10.0);
        assert!(!ring.is_empty());
        for site in &ring {
            assert!(site.is_boundary);
            let outside = site.x() < 0.0 || site.z() < 0.0 || site.x() > 100.0 || site.z() > 100.0;
            assert!(outside, "boundary site {:?} lies inside the grid", site.position);
        }
    }

    #[test]
    fn test_generate_sites_order() {
        let mut rng = RngHandle::new(3);
        let sites = generate_sites(SiteDistribution::Count(50), 100.0, &mut rng);
        assert!(sites[..50].iter().all(|s| !s.is_boundary));
        assert!(sites[50..].iter().all(|s| s.is_boundary));
    }

    #[test]
    fn test_determinism() {
        let a = generate_sites(SiteDistribution::Poisson { radius: 4.0 }, 40.0, &mut RngHandle::new(11));
        let b = generate_sites(SiteDistribution::Poisson { radius: 4.0 }, 40.0, &mut RngHandle::new(11));
        assert_eq!(a, b);
    }
}
