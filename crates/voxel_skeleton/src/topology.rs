//! Global topology measures of a binary volume.
//!
//! Used to report what thinning preserved and to check it in tests:
//!
//! - 26-connected foreground component count
//! - Euler characteristic χ = components − tunnels + cavities, computed as
//!   V − E + F − C over the closed cubical complex of the foreground voxels
//!   (closed cubes share corners, which matches 26-adjacency)

use rayon::prelude::*;

use crate::grid::Mask;

/// Voxel count, component count and Euler characteristic of a mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TopologySummary {
  pub voxels: usize,
  pub components: usize,
  pub euler: i64,
}

impl TopologySummary {
  /// Tunnels minus cavities, i.e. `components - euler`.
  pub fn tunnels_minus_cavities(&self) -> i64 {
    self.components as i64 - self.euler
  }
}

/// Summarize a mask.
pub fn summarize(mask: &Mask) -> TopologySummary {
  TopologySummary {
    voxels: mask.foreground_count(),
    components: component_count(mask),
    euler: euler_characteristic(mask),
  }
}

/// Number of 26-connected foreground components.
pub fn component_count(mask: &Mask) -> usize {
  let data = mask.as_slice();
  let mut visited = vec![false; data.len()];
  let mut stack = Vec::new();
  let mut components = 0;

  for start in 0..data.len() {
    if !data[start] || visited[start] {
      continue;
    }
    components += 1;
    visited[start] = true;
    stack.push(start);

    while let Some(idx) = stack.pop() {
      let [x, y, z] = mask.coord_of(idx);
      for [nx, ny, nz] in mask.neighbors26(x, y, z) {
        let next = mask.index_of(nx, ny, nz);
        if data[next] && !visited[next] {
          visited[next] = true;
          stack.push(next);
        }
      }
    }
  }

  components
}

/// Euler characteristic of the foreground.
///
/// Each cell of the lattice complex is identified by a corner `(i, j, k)` and
/// a kind: per axis it is either a lattice point (touching voxels `i - 1`
/// and `i`) or a unit interval (touching voxel `i` only). A cell belongs to
/// the complex when any voxel it touches is foreground.
pub fn euler_characteristic(mask: &Mask) -> i64 {
  let dims = mask.dims().map(|d| d as i64);
  let mut chi = 0i64;

  for kind in 0..8u32 {
    let interval = [kind & 1 != 0, kind & 2 != 0, kind & 4 != 0];
    let extent = |axis: usize| if interval[axis] { dims[axis] } else { dims[axis] + 1 };
    let reach = interval.map(|spans| if spans { 1 } else { 2 });

    let count: i64 = (0..extent(2))
      .into_par_iter()
      .map(|k| {
        let mut n = 0i64;
        for j in 0..extent(1) {
          for i in 0..extent(0) {
            if touches_foreground(mask, [i, j, k], reach) {
              n += 1;
            }
          }
        }
        n
      })
      .sum();

    if kind.count_ones() % 2 == 0 {
      chi += count;
    } else {
      chi -= count;
    }
  }

  chi
}

#[inline]
fn touches_foreground(mask: &Mask, corner: [i64; 3], reach: [i64; 3]) -> bool {
  for dz in 0..reach[2] {
    for dy in 0..reach[1] {
      for dx in 0..reach[0] {
        if mask.get_or(corner[0] - dx, corner[1] - dy, corner[2] - dz, false) {
          return true;
        }
      }
    }
  }
  false
}

#[cfg(test)]
#[path = "topology_test.rs"]
mod topology_test;
