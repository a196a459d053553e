//! Shape fixtures and brute-force references for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::{Dims, Mask, Spacing, VoxelGrid};

// =============================================================================
// Shape fixtures
// =============================================================================

/// Axis-aligned box `[min, max)` inside a background grid.
pub fn solid_box(dims: Dims, min: [usize; 3], max: [usize; 3]) -> Mask {
  let mut mask = VoxelGrid::new(dims, Spacing::UNIT, false);
  for z in min[2]..max[2] {
    for y in min[1]..max[1] {
      for x in min[0]..max[0] {
        mask.set(x, y, z, true).unwrap();
      }
    }
  }
  mask
}

/// Solid cube of the given side with a one-voxel background border.
pub fn cube_with_border(side: usize) -> Mask {
  let n = side + 2;
  solid_box([n, n, n], [1, 1, 1], [side + 1, side + 1, side + 1])
}

/// Straight cylinder along Z, centered in X/Y, `pad` voxels of background
/// on every side.
pub fn cylinder_z(radius: f64, length: usize, pad: usize) -> Mask {
  let half = radius.ceil() as usize + pad;
  let side = 2 * half + 1;
  let dims = [side, side, length + 2 * pad];
  let mut mask = VoxelGrid::new(dims, Spacing::UNIT, false);
  for z in pad..pad + length {
    for y in 0..side {
      for x in 0..side {
        let dx = x as f64 - half as f64;
        let dy = y as f64 - half as f64;
        if dx * dx + dy * dy <= radius * radius {
          mask.set(x, y, z, true).unwrap();
        }
      }
    }
  }
  mask
}

/// Center (in voxel coordinates) of a [`cylinder_z`] cross-section.
pub fn cylinder_axis(radius: f64, pad: usize) -> usize {
  radius.ceil() as usize + pad
}

/// Solid torus in the XY plane with a 2-voxel background margin.
pub fn torus(major: f64, minor: f64) -> Mask {
  let half_xy = (major + minor).ceil() as usize + 2;
  let half_z = minor.ceil() as usize + 2;
  let dims = [2 * half_xy + 1, 2 * half_xy + 1, 2 * half_z + 1];
  let mut mask = VoxelGrid::new(dims, Spacing::UNIT, false);
  for z in 0..dims[2] {
    for y in 0..dims[1] {
      for x in 0..dims[0] {
        let dx = x as f64 - half_xy as f64;
        let dy = y as f64 - half_xy as f64;
        let dz = z as f64 - half_z as f64;
        let ring = (dx * dx + dy * dy).sqrt() - major;
        if ring * ring + dz * dz <= minor * minor {
          mask.set(x, y, z, true).unwrap();
        }
      }
    }
  }
  mask
}

/// Uniform random noise with the given foreground probability.
pub fn random_blob(dims: Dims, density: f64, seed: u64) -> Mask {
  let mut rng = StdRng::seed_from_u64(seed);
  let data = (0..dims[0] * dims[1] * dims[2])
    .map(|_| rng.random_bool(density))
    .collect();
  VoxelGrid::from_vec(dims, Spacing::UNIT, data).unwrap()
}

/// Random union of solid balls; smoother than noise, still has tunnels.
pub fn random_balls(dims: Dims, count: usize, max_radius: f64, seed: u64) -> Mask {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut mask = VoxelGrid::new(dims, Spacing::UNIT, false);
  for _ in 0..count {
    let center = [
      rng.random_range(0.0..dims[0] as f64),
      rng.random_range(0.0..dims[1] as f64),
      rng.random_range(0.0..dims[2] as f64),
    ];
    let radius = rng.random_range(1.0..max_radius);
    for z in 0..dims[2] {
      for y in 0..dims[1] {
        for x in 0..dims[0] {
          let d = [
            x as f64 - center[0],
            y as f64 - center[1],
            z as f64 - center[2],
          ];
          if d[0] * d[0] + d[1] * d[1] + d[2] * d[2] <= radius * radius {
            mask.set(x, y, z, true).unwrap();
          }
        }
      }
    }
  }
  mask
}

// =============================================================================
// Brute-force references
// =============================================================================

/// Distance from every foreground voxel to the nearest background voxel by
/// exhaustive search, including the virtual background around the grid.
pub fn brute_force_distance(mask: &Mask) -> Vec<f64> {
  let spacing = mask.spacing();
  let dims = mask.dims();
  let background: Vec<[usize; 3]> = (0..mask.len())
    .filter(|&i| !mask.as_slice()[i])
    .map(|i| mask.coord_of(i))
    .collect();

  (0..mask.len())
    .map(|i| {
      if !mask.as_slice()[i] {
        return 0.0;
      }
      let c = mask.coord_of(i);
      let shell = (0..3)
        .map(|a| (c[a] + 1).min(dims[a] - c[a]) as f64 * spacing.0[a])
        .fold(f64::INFINITY, f64::min);
      background
        .iter()
        .map(|b| {
          spacing
            .length_sq([
              b[0] as i64 - c[0] as i64,
              b[1] as i64 - c[1] as i64,
              b[2] as i64 - c[2] as i64,
            ])
            .sqrt()
        })
        .fold(shell, f64::min)
    })
    .collect()
}

/// Voxels of a mask as coordinates.
pub fn foreground_coords(mask: &Mask) -> Vec<[usize; 3]> {
  (0..mask.len())
    .filter(|&i| mask.as_slice()[i])
    .map(|i| mask.coord_of(i))
    .collect()
}
