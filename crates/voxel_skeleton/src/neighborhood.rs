//! Precomputed 3×3×3 neighborhood tables and topological numbers.
//!
//! A neighborhood is packed into a 27-bit mask, bit `i` set when the voxel at
//! offset `OFFSETS[i]` is foreground:
//!
//! ```text
//! i = (dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)
//!
//!      dz = -1          dz = 0           dz = +1
//!   ┌──┬──┬──┐      ┌──┬──┬──┐      ┌──┬──┬──┐
//!   │ 6│ 7│ 8│ +y   │15│16│17│      │24│25│26│
//!   ├──┼──┼──┤      ├──┼──┼──┤      ├──┼──┼──┤
//!   │ 3│ 4│ 5│      │12│13│14│      │21│22│23│
//!   ├──┼──┼──┤      ├──┼──┼──┤      ├──┼──┼──┤
//!   │ 0│ 1│ 2│ -y   │ 9│10│11│      │18│19│20│
//!   └──┴──┴──┘      └──┴──┴──┘      └──┴──┴──┘
//!    -x     +x       center = 13
//! ```
//!
//! # Topological numbers
//!
//! For the (26, 6) adjacency pair a foreground point `p` is simple iff
//!
//! - `T26 = 1`: the foreground of N26(p) \ {p} forms one 26-component, and
//! - `T6 = 1`: the background of N18(p) \ {p} has exactly one 6-component
//!   that is 6-adjacent to `p`.
//!
//! Both counts are evaluated with a bit-parallel flood fill over the
//! adjacency tables below, so a test costs a handful of `u32` operations.

/// Number of cells in a 3×3×3 neighborhood.
pub const NEIGHBORHOOD_SIZE: usize = 27;

/// Bit index of the center voxel.
pub const CENTER: usize = 13;

/// Offsets `[dx, dy, dz]` for each neighborhood bit.
pub const OFFSETS: [[i32; 3]; NEIGHBORHOOD_SIZE] = build_offsets();

/// 26-adjacency between cells of the 3×3×3 block (excluding self).
pub const ADJ26: [u32; NEIGHBORHOOD_SIZE] = build_adjacency(3);

/// 6-adjacency between cells of the 3×3×3 block (excluding self).
pub const ADJ6: [u32; NEIGHBORHOOD_SIZE] = build_adjacency(1);

/// The 6 face neighbors of the center.
pub const N6: u32 = build_ring(1);

/// Face and edge neighbors of the center (18 cells).
pub const N18: u32 = build_ring(2);

/// All 26 neighbors of the center.
pub const N26: u32 = build_ring(3);

const fn build_offsets() -> [[i32; 3]; NEIGHBORHOOD_SIZE] {
  let mut out = [[0i32; 3]; NEIGHBORHOOD_SIZE];
  let mut i = 0;
  while i < NEIGHBORHOOD_SIZE {
    out[i] = [(i % 3) as i32 - 1, ((i / 3) % 3) as i32 - 1, (i / 9) as i32 - 1];
    i += 1;
  }
  out
}

/// Number of non-zero axes between two cells, or `u32::MAX` when they are
/// further apart than one step on some axis.
const fn step_axes(a: [i32; 3], b: [i32; 3]) -> u32 {
  let mut axes = 0;
  let mut k = 0;
  while k < 3 {
    let d = a[k] - b[k];
    if d < -1 || d > 1 {
      return u32::MAX;
    }
    if d != 0 {
      axes += 1;
    }
    k += 1;
  }
  axes
}

/// Cells reachable in one step that differ on `1..=max_axes` axes.
const fn build_adjacency(max_axes: u32) -> [u32; NEIGHBORHOOD_SIZE] {
  let offsets = build_offsets();
  let mut out = [0u32; NEIGHBORHOOD_SIZE];
  let mut i = 0;
  while i < NEIGHBORHOOD_SIZE {
    let mut j = 0;
    while j < NEIGHBORHOOD_SIZE {
      let axes = step_axes(offsets[i], offsets[j]);
      if axes >= 1 && axes <= max_axes {
        out[i] |= 1 << j;
      }
      j += 1;
    }
    i += 1;
  }
  out
}

const fn build_ring(max_axes: u32) -> u32 {
  build_adjacency(max_axes)[CENTER]
}

/// Bit index for a neighbor offset, each component in `-1..=1`.
#[inline(always)]
pub const fn bit_of(dx: i32, dy: i32, dz: i32) -> usize {
  ((dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)) as usize
}

/// Count connected components of `set` under the given adjacency table.
///
/// When `touching` is non-zero only components intersecting it are counted.
#[inline]
pub fn count_components(set: u32, adjacency: &[u32; NEIGHBORHOOD_SIZE], touching: u32) -> u32 {
  let mut remaining = set;
  let mut count = 0;

  while remaining != 0 {
    let seed = remaining.trailing_zeros();
    let mut component = 1u32 << seed;
    let mut frontier = component;

    while frontier != 0 {
      let i = frontier.trailing_zeros() as usize;
      frontier &= frontier - 1;
      let grown = adjacency[i] & remaining & !component;
      component |= grown;
      frontier |= grown;
    }

    remaining &= !component;
    if touching == 0 || component & touching != 0 {
      count += 1;
    }
  }

  count
}

/// Foreground topological number: 26-components of N26(p) \ {p}.
#[inline]
pub fn t26(mask: u32) -> u32 {
  count_components(mask & N26, &ADJ26, 0)
}

/// Background topological number: 6-components of the background in
/// N18(p) \ {p} that are 6-adjacent to `p`.
#[inline]
pub fn t6_background(mask: u32) -> u32 {
  count_components(!mask & N18, &ADJ6, N6)
}

/// Whether removing the center changes neither the local component count
/// nor the local tunnel/cavity structure.
#[inline]
pub fn is_simple(mask: u32) -> bool {
  t26(mask) == 1 && t6_background(mask) == 1
}

/// Number of foreground voxels among the 26 neighbors.
#[inline]
pub fn foreground_neighbors(mask: u32) -> u32 {
  (mask & N26).count_ones()
}

/// Curve extremity (or isolated voxel): at most one foreground neighbor.
#[inline]
pub fn is_endpoint(mask: u32) -> bool {
  foreground_neighbors(mask) <= 1
}

/// Face directions, one per thinning sub-pass.
///
/// The order is the sub-pass order within a thinning cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
  NegY,
  PosY,
  PosX,
  NegX,
  PosZ,
  NegZ,
}

impl Face {
  /// Sub-pass order.
  pub const ALL: [Face; 6] = [
    Face::NegY,
    Face::PosY,
    Face::PosX,
    Face::NegX,
    Face::PosZ,
    Face::NegZ,
  ];

  /// Unit offset of the face neighbor.
  pub const fn offset(self) -> [i32; 3] {
    match self {
      Face::NegY => [0, -1, 0],
      Face::PosY => [0, 1, 0],
      Face::PosX => [1, 0, 0],
      Face::NegX => [-1, 0, 0],
      Face::PosZ => [0, 0, 1],
      Face::NegZ => [0, 0, -1],
    }
  }

  /// Bit of the face neighbor in a neighborhood mask.
  pub const fn bit(self) -> usize {
    let [dx, dy, dz] = self.offset();
    bit_of(dx, dy, dz)
  }
}

#[cfg(test)]
#[path = "neighborhood_test.rs"]
mod neighborhood_test;
