//! Topology-preserving thinning of a binary volume.
//!
//! Directional border erosion in the style of Lee, Kashyap & Chu:
//!
//! ```text
//! cycle:
//!   for face in [-Y, +Y, +X, -X, +Z, -Z]:
//!     ┌──────────────────────────────┐     ┌────────────────────────────┐
//!     │ classify (parallel, snapshot)├────►│ confirm + delete (in order)│
//!     └──────────────────────────────┘     └────────────────────────────┘
//!      border along `face`                  still simple, still not an
//!      simple, not an endpoint              endpoint on the live grid
//! until a whole cycle deletes nothing
//! ```
//!
//! Classification only reads the grid as it was when the sub-pass started,
//! so it runs over Z planes in parallel. Two candidates can be simple on
//! their own but not together (a 2×2 square would vanish), so each candidate
//! is re-tested against the live grid right before it is removed.

use rayon::prelude::*;

use crate::grid::Mask;
use crate::neighborhood::{is_endpoint, is_simple, Face};

/// Thinning parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThinningConfig {
  /// Stop after this many cycles even if deletions are still happening.
  /// `None` runs to the fixed point.
  pub max_cycles: Option<usize>,
}

impl ThinningConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
    self.max_cycles = Some(max_cycles);
    self
  }
}

/// Counters reported by [`thin`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThinningStats {
  /// Cycles run, including the final cycle that deleted nothing.
  pub cycles: usize,
  /// Voxels removed in total.
  pub deleted: usize,
  /// Foreground voxels left in the skeleton.
  pub remaining: usize,
  /// False when `max_cycles` stopped the run early.
  pub converged: bool,
}

/// Skeleton plus run counters.
#[derive(Clone, Debug)]
pub struct ThinningOutput {
  pub skeleton: Mask,
  pub stats: ThinningStats,
}

/// Thin `mask` down to its topological skeleton.
///
/// The result has the same 26-connected component count and the same Euler
/// characteristic as the input; an empty input yields an empty skeleton.
#[tracing::instrument(skip_all, name = "thinning::thin", fields(dims = ?mask.dims()))]
pub fn thin(mask: &Mask, config: &ThinningConfig) -> ThinningOutput {
  let mut grid = mask.clone();
  let mut stats = ThinningStats {
    remaining: grid.foreground_count(),
    converged: true,
    ..Default::default()
  };

  if stats.remaining == 0 {
    tracing::debug!("empty mask, nothing to thin");
    return ThinningOutput {
      skeleton: grid,
      stats,
    };
  }

  loop {
    if config.max_cycles.is_some_and(|max| stats.cycles >= max) {
      stats.converged = false;
      tracing::warn!(cycles = stats.cycles, "thinning stopped before reaching a fixed point");
      break;
    }

    let mut deleted = 0;
    for face in Face::ALL {
      let candidates = collect_candidates(&grid, face);
      deleted += confirm_deletions(&mut grid, &candidates);
    }

    stats.cycles += 1;
    stats.deleted += deleted;
    stats.remaining -= deleted;
    tracing::debug!(cycle = stats.cycles, deleted, remaining = stats.remaining, "thinning cycle");

    if deleted == 0 {
      break;
    }
  }

  ThinningOutput {
    skeleton: grid,
    stats,
  }
}

/// Thin with the default configuration and keep only the skeleton.
pub fn skeletonize(mask: &Mask) -> Mask {
  thin(mask, &ThinningConfig::default()).skeleton
}

/// Whether no voxel of `mask` could be removed by another thinning pass.
///
/// A voxel that is not a border point in any direction has all six face
/// neighbors set and is never simple, so checking simplicity alone covers
/// every sub-pass.
pub fn is_thin(mask: &Mask) -> bool {
  let [nx, ny, nz] = mask.dims();
  (0..nz).into_par_iter().all(|z| {
    (0..ny).all(|y| {
      (0..nx).all(|x| {
        let idx = mask.index_of(x, y, z);
        if !mask.as_slice()[idx] {
          return true;
        }
        let hood = mask.neighborhood_mask(x, y, z);
        is_endpoint(hood) || !is_simple(hood)
      })
    })
  })
}

/// Deletable border points for one sub-pass, in index order.
fn collect_candidates(grid: &Mask, face: Face) -> Vec<usize> {
  let [nx, ny, nz] = grid.dims();
  let [fx, fy, fz] = face.offset();
  let data = grid.as_slice();

  let per_plane: Vec<Vec<usize>> = (0..nz)
    .into_par_iter()
    .map(|z| {
      let mut found = Vec::new();
      for y in 0..ny {
        for x in 0..nx {
          let idx = grid.index_of(x, y, z);
          if !data[idx] {
            continue;
          }
          let facing = grid.get_or(
            x as i64 + fx as i64,
            y as i64 + fy as i64,
            z as i64 + fz as i64,
            false,
          );
          if facing {
            continue;
          }
          let hood = grid.neighborhood_mask(x, y, z);
          if !is_endpoint(hood) && is_simple(hood) {
            found.push(idx);
          }
        }
      }
      found
    })
    .collect();

  per_plane.concat()
}

/// Re-test candidates on the live grid and delete the ones still removable.
fn confirm_deletions(grid: &mut Mask, candidates: &[usize]) -> usize {
  let mut deleted = 0;
  for &idx in candidates {
    let [x, y, z] = grid.coord_of(idx);
    let hood = grid.neighborhood_mask(x, y, z);
    if !is_endpoint(hood) && is_simple(hood) {
      grid.as_mut_slice()[idx] = false;
      deleted += 1;
    }
  }
  deleted
}

#[cfg(test)]
#[path = "thinning_test.rs"]
mod thinning_test;
