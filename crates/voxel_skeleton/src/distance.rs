//! Exact Euclidean distance transform.
//!
//! Separable squared EDT (Felzenszwalb & Huttenlocher): the squared distance
//! field is the composition of three 1D lower-envelope-of-parabolas passes,
//! one per axis, each folding in that axis' physical spacing.
//!
//! ```text
//! f0(v) = 0 background, ∞ foreground
//! f1 = envelope_x(f0)     rows      (contiguous, parallel per row)
//! f2 = envelope_y(f1)     columns   (parallel per Z plane)
//! f3 = envelope_z(f2)     pillars   (parallel per pillar, scattered back)
//! d  = sqrt(min(f3, shell²))
//! ```
//!
//! `shell` is the distance to the virtual background surrounding the grid,
//! so an object touching the grid edge still gets finite distances. Every
//! pass is independent of scan order, so the result is deterministic.

use rayon::prelude::*;

use crate::grid::{Field, Mask, VoxelGrid};

/// Reusable scratch for one 1D envelope pass.
struct LineScratch {
  input: Vec<f64>,
  output: Vec<f64>,
  sites: Vec<usize>,
  bounds: Vec<f64>,
}

impl LineScratch {
  fn new(len: usize) -> Self {
    Self {
      input: vec![0.0; len],
      output: vec![0.0; len],
      sites: vec![0; len],
      bounds: vec![0.0; len + 1],
    }
  }

  /// Run the envelope over `self.input` into `self.output`.
  fn transform(&mut self, step: f64) {
    lower_envelope(
      &self.input,
      &mut self.output,
      step,
      &mut self.sites,
      &mut self.bounds,
    );
  }
}

/// Squared distance to the nearest background voxel for a 1D line.
///
/// `f` holds squared distances from earlier passes (`∞` where no background
/// has been seen); sample `q` sits at physical position `q * step`.
fn lower_envelope(f: &[f64], out: &mut [f64], step: f64, sites: &mut [usize], bounds: &mut [f64]) {
  let n = f.len();
  let mut k = 0usize;
  let mut any = false;

  for q in 0..n {
    if !f[q].is_finite() {
      continue;
    }
    if !any {
      sites[0] = q;
      bounds[0] = f64::NEG_INFINITY;
      bounds[1] = f64::INFINITY;
      any = true;
      continue;
    }

    let xq = q as f64 * step;
    let intersect = |p: usize| {
      let xp = p as f64 * step;
      ((f[q] + xq * xq) - (f[p] + xp * xp)) / (2.0 * (xq - xp))
    };
    // bounds[0] is -∞, so k never underflows.
    let mut s = intersect(sites[k]);
    while s <= bounds[k] {
      k -= 1;
      s = intersect(sites[k]);
    }
    k += 1;
    sites[k] = q;
    bounds[k] = s;
    bounds[k + 1] = f64::INFINITY;
  }

  if !any {
    out.fill(f64::INFINITY);
    return;
  }

  k = 0;
  for (q, slot) in out.iter_mut().enumerate() {
    let x = q as f64 * step;
    while bounds[k + 1] < x {
      k += 1;
    }
    let dx = x - sites[k] as f64 * step;
    *slot = dx * dx + f[sites[k]];
  }
}

/// Squared Euclidean distance (physical units) from each foreground voxel to
/// the nearest background voxel; 0 on background.
#[tracing::instrument(skip_all, name = "distance::squared_edt", fields(dims = ?mask.dims()))]
pub fn squared_edt(mask: &Mask) -> VoxelGrid<f64> {
  let [nx, ny, nz] = mask.dims();
  let spacing = mask.spacing();
  let mut field = mask.map(|&fg| if fg { f64::INFINITY } else { 0.0 });

  if field.is_empty() {
    return field;
  }

  let plane = field.plane_len();
  let data = field.as_mut_slice();

  // X: rows are contiguous.
  {
    let _span = tracing::info_span!("x_pass").entered();
    data
      .par_chunks_mut(nx)
      .for_each_init(|| LineScratch::new(nx), |scratch, row| {
        scratch.input.copy_from_slice(row);
        scratch.transform(spacing.x());
        row.copy_from_slice(&scratch.output);
      });
  }

  // Y: columns live inside one Z plane.
  {
    let _span = tracing::info_span!("y_pass").entered();
    data
      .par_chunks_mut(plane)
      .for_each_init(|| LineScratch::new(ny), |scratch, slab| {
        for x in 0..nx {
          for y in 0..ny {
            scratch.input[y] = slab[x + nx * y];
          }
          scratch.transform(spacing.y());
          for y in 0..ny {
            slab[x + nx * y] = scratch.output[y];
          }
        }
      });
  }

  // Z: pillars span every plane; transform into pillar-major scratch and
  // scatter back plane by plane.
  let _span = tracing::info_span!("z_pass").entered();
  let mut pillars = vec![0.0f64; data.len()];
  {
    let source: &[f64] = data;
    pillars
      .par_chunks_mut(nz)
      .enumerate()
      .for_each_init(|| LineScratch::new(nz), |scratch, (col, pillar)| {
        for z in 0..nz {
          scratch.input[z] = source[col + plane * z];
        }
        scratch.transform(spacing.z());
        pillar.copy_from_slice(&scratch.output);
      });
  }
  data.par_chunks_mut(plane).enumerate().for_each(|(z, slab)| {
    for (col, value) in slab.iter_mut().enumerate() {
      *value = pillars[col * nz + z];
    }
  });

  clamp_to_shell(&mut field);
  field
}

/// Cap every value by the squared distance to the background shell around
/// the grid.
fn clamp_to_shell(field: &mut VoxelGrid<f64>) {
  let [nx, ny, nz] = field.dims();
  let s = field.spacing();
  let plane = field.plane_len();

  field
    .as_mut_slice()
    .par_chunks_mut(plane)
    .enumerate()
    .for_each(|(z, slab)| {
      let dz = ((z + 1).min(nz - z) as f64) * s.z();
      for y in 0..ny {
        let dy = ((y + 1).min(ny - y) as f64) * s.y();
        for x in 0..nx {
          let dx = ((x + 1).min(nx - x) as f64) * s.x();
          let shell = dx.min(dy).min(dz);
          let v = &mut slab[x + nx * y];
          *v = v.min(shell * shell);
        }
      }
    });
}

/// Euclidean distance field (physical units) of a mask.
pub fn distance_transform(mask: &Mask) -> Field {
  squared_edt(mask).map(|&d2| d2.sqrt() as f32)
}

#[cfg(test)]
#[path = "distance_test.rs"]
mod distance_test;
