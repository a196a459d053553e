//! Local thickness by maximal inscribed balls.
//!
//! The thickness at a foreground voxel `v` is the diameter of the largest
//! ball that fits inside the object and still contains `v`:
//!
//! ```text
//! τ(v) = max { 2·d(c) : c foreground, |v - c| ≤ d(c) }
//! ```
//!
//! where `d` is the Euclidean distance transform. Only centers on the
//! distance ridge matter: if a neighbor `n` satisfies `d(c) + |n - c| ≤ d(n)`
//! the ball at `c` lies inside the ball at `n` and is dropped before
//! painting. Painting then runs per Z plane in parallel, each plane taking
//! the max over every ball that crosses it.

use rayon::prelude::*;

use crate::distance::squared_edt;
use crate::grid::{Field, Mask, VoxelGrid};
use crate::neighborhood::{CENTER, OFFSETS};

/// Relative slack on `r²` so voxels exactly on a sphere survive rounding.
const PAINT_TOLERANCE: f64 = 1e-9;

/// Local thickness parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThicknessConfig {
  /// Drop balls contained in a neighbor's ball before painting.
  pub prune_ridge: bool,
}

impl Default for ThicknessConfig {
  fn default() -> Self {
    Self { prune_ridge: true }
  }
}

impl ThicknessConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_prune_ridge(mut self, prune_ridge: bool) -> Self {
    self.prune_ridge = prune_ridge;
    self
  }
}

#[derive(Clone, Copy, Debug)]
struct Ball {
  center: [usize; 3],
  radius_sq: f64,
  diameter: f32,
}

/// Thickness of every foreground voxel in physical units; 0 on background.
#[tracing::instrument(skip_all, name = "thickness::local_thickness", fields(dims = ?mask.dims()))]
pub fn local_thickness(mask: &Mask, config: &ThicknessConfig) -> Field {
  let distance_sq = squared_edt(mask);
  let balls = {
    let _span = tracing::info_span!("collect_balls").entered();
    collect_balls(mask, &distance_sq, config.prune_ridge)
  };
  tracing::debug!(
    balls = balls.iter().map(Vec::len).sum::<usize>(),
    foreground = mask.foreground_count(),
    pruned = config.prune_ridge,
    "collected inscribed balls"
  );
  let _span = tracing::info_span!("paint").entered();
  paint(mask, &balls)
}

/// Ball centers grouped by Z plane, optionally restricted to the ridge.
fn collect_balls(mask: &Mask, distance_sq: &VoxelGrid<f64>, prune_ridge: bool) -> Vec<Vec<Ball>> {
  let [nx, ny, nz] = mask.dims();
  let spacing = mask.spacing();
  let data = distance_sq.as_slice();
  let step = |offset: [i64; 3]| spacing.length_sq(offset).sqrt();

  (0..nz)
    .into_par_iter()
    .map(|z| {
      let mut plane = Vec::new();
      for y in 0..ny {
        for x in 0..nx {
          let d2 = data[distance_sq.index_of(x, y, z)];
          if d2 <= 0.0 {
            continue;
          }
          if prune_ridge && is_covered_by_neighbor(distance_sq, [x, y, z], d2.sqrt(), &step) {
            continue;
          }
          plane.push(Ball {
            center: [x, y, z],
            radius_sq: d2,
            diameter: (2.0 * d2.sqrt()) as f32,
          });
        }
      }
      plane
    })
    .collect()
}

/// Whether a 26-neighbor's ball swallows the ball of radius `radius` at `c`.
fn is_covered_by_neighbor(
  distance_sq: &VoxelGrid<f64>,
  c: [usize; 3],
  radius: f64,
  step: &impl Fn([i64; 3]) -> f64,
) -> bool {
  OFFSETS.iter().enumerate().any(|(bit, &[dx, dy, dz])| {
    if bit == CENTER {
      return false;
    }
    let offset = [dx as i64, dy as i64, dz as i64];
    let n2 = distance_sq.get_or(
      c[0] as i64 + offset[0],
      c[1] as i64 + offset[1],
      c[2] as i64 + offset[2],
      0.0,
    );
    n2 > 0.0 && radius + step(offset) <= n2.sqrt()
  })
}

/// Max-paint every ball's diameter onto the foreground voxels it contains.
fn paint(mask: &Mask, balls: &[Vec<Ball>]) -> Field {
  let [nx, ny, nz] = mask.dims();
  let spacing = mask.spacing();
  let mut out = VoxelGrid::new(mask.dims(), spacing, 0.0f32);
  if out.is_empty() {
    return out;
  }

  // Widest reach of any ball along Z, in planes.
  let max_radius = balls
    .iter()
    .flatten()
    .map(|b| b.radius_sq.sqrt())
    .fold(0.0f64, f64::max);
  let reach_z = (max_radius / spacing.z()).ceil() as usize + 1;
  let fg = mask.as_slice();

  out
    .as_mut_slice()
    .par_chunks_mut(mask.plane_len())
    .enumerate()
    .for_each(|(z, slab)| {
      let lo = z.saturating_sub(reach_z);
      let hi = (z + reach_z).min(nz - 1);
      for ball in balls[lo..=hi].iter().flatten() {
        let limit = ball.radius_sq * (1.0 + PAINT_TOLERANCE);
        let [cx, cy, cz] = ball.center;
        let dz = (z as f64 - cz as f64) * spacing.z();
        let rem_z = limit - dz * dz;
        if rem_z < 0.0 {
          continue;
        }

        let half_y = (rem_z.sqrt() / spacing.y()).floor() as usize + 1;
        let y0 = cy.saturating_sub(half_y);
        let y1 = (cy + half_y).min(ny - 1);
        for y in y0..=y1 {
          let dy = (y as f64 - cy as f64) * spacing.y();
          let rem_y = rem_z - dy * dy;
          if rem_y < 0.0 {
            continue;
          }
          let half_x = (rem_y.sqrt() / spacing.x()).floor() as usize + 1;
          let x0 = cx.saturating_sub(half_x);
          let x1 = (cx + half_x).min(nx - 1);
          let row = nx * y;
          for x in x0..=x1 {
            let dx = (x as f64 - cx as f64) * spacing.x();
            if dx * dx > rem_y || !fg[row + x + nx * ny * z] {
              continue;
            }
            let slot = &mut slab[row + x];
            if ball.diameter > *slot {
              *slot = ball.diameter;
            }
          }
        }
      }
    });

  out
}

#[cfg(test)]
#[path = "thickness_test.rs"]
mod thickness_test;
