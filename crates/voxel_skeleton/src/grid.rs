//! Dense 3D voxel grid over an owned contiguous buffer.
//!
//! # Memory Layout
//!
//! ```text
//! index = x + X * (y + Y * z)
//!
//! Address:  0      1      ...  X-1      X      ...  X*Y    ...
//! Content: [0,0,0][1,0,0]...[X-1,0,0][0,1,0]...[0,0,1]...
//!          └────────── X ──────────┘
//! ```
//!
//! X is the fastest axis, matching the MetaImage payload order, so a loaded
//! volume is used as-is. A Z plane (`X * Y` elements) is contiguous, which is
//! the unit of parallel work for the stages that write a grid.

use smallvec::SmallVec;

use crate::error::{Result, SkeletonError};
use crate::neighborhood::{CENTER, NEIGHBORHOOD_SIZE, OFFSETS};

/// Grid dimensions `[X, Y, Z]`.
pub type Dims = [usize; 3];

/// Physical voxel spacing per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing(pub [f64; 3]);

impl Spacing {
  /// Unit isotropic spacing.
  pub const UNIT: Spacing = Spacing([1.0; 3]);

  /// Validate and wrap a spacing triple.
  pub fn new(spacing: [f64; 3]) -> Result<Self> {
    if spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
      Ok(Self(spacing))
    } else {
      Err(SkeletonError::InvalidSpacing(spacing))
    }
  }

  #[inline]
  pub fn x(&self) -> f64 {
    self.0[0]
  }

  #[inline]
  pub fn y(&self) -> f64 {
    self.0[1]
  }

  #[inline]
  pub fn z(&self) -> f64 {
    self.0[2]
  }

  /// Squared physical length of an index-space offset.
  #[inline]
  pub fn length_sq(&self, offset: [i64; 3]) -> f64 {
    let dx = offset[0] as f64 * self.0[0];
    let dy = offset[1] as f64 * self.0[1];
    let dz = offset[2] as f64 * self.0[2];
    dx * dx + dy * dy + dz * dz
  }
}

impl Default for Spacing {
  fn default() -> Self {
    Self::UNIT
  }
}

/// Dense 3D array with physical spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid<T> {
  dims: Dims,
  spacing: Spacing,
  data: Vec<T>,
}

/// Binary mask grid (`true` = foreground).
pub type Mask = VoxelGrid<bool>;

/// Floating point scalar field (distance, thickness, merged output).
pub type Field = VoxelGrid<f32>;

impl<T: Clone> VoxelGrid<T> {
  /// Allocate a grid with every voxel set to `fill`.
  pub fn new(dims: Dims, spacing: Spacing, fill: T) -> Self {
    Self {
      dims,
      spacing,
      data: vec![fill; dims[0] * dims[1] * dims[2]],
    }
  }

  /// Bounds-checked read.
  pub fn get(&self, x: usize, y: usize, z: usize) -> Result<T> {
    let idx = self.checked_index(x as i64, y as i64, z as i64)?;
    Ok(self.data[idx].clone())
  }

  /// Read with signed coordinates; outside the grid yields `outside`.
  #[inline]
  pub fn get_or(&self, x: i64, y: i64, z: i64, outside: T) -> T {
    match self.checked_index(x, y, z) {
      Ok(idx) => self.data[idx].clone(),
      Err(_) => outside,
    }
  }

  /// New grid of the same shape and spacing with `f` applied per voxel.
  pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> VoxelGrid<U> {
    VoxelGrid {
      dims: self.dims,
      spacing: self.spacing,
      data: self.data.iter().map(f).collect(),
    }
  }
}

impl<T> VoxelGrid<T> {
  /// Wrap an existing buffer laid out `x + X * (y + Y * z)`.
  pub fn from_vec(dims: Dims, spacing: Spacing, data: Vec<T>) -> Result<Self> {
    let expected = dims[0] * dims[1] * dims[2];
    if data.len() != expected {
      return Err(SkeletonError::ShapeMismatch {
        expected: format!("{} voxels for {:?}", expected, dims),
        found: format!("{} voxels", data.len()),
      });
    }
    Ok(Self {
      dims,
      spacing,
      data,
    })
  }

  /// Same grid with a different physical spacing.
  pub fn with_spacing(mut self, spacing: Spacing) -> Self {
    self.spacing = spacing;
    self
  }

  /// Bounds-checked write.
  pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) -> Result<()> {
    let idx = self.checked_index(x as i64, y as i64, z as i64)?;
    self.data[idx] = value;
    Ok(())
  }

  #[inline]
  pub fn dims(&self) -> Dims {
    self.dims
  }

  #[inline]
  pub fn spacing(&self) -> Spacing {
    self.spacing
  }

  /// Total voxel count.
  #[inline]
  pub fn len(&self) -> usize {
    self.data.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Elements per Z plane.
  #[inline]
  pub fn plane_len(&self) -> usize {
    self.dims[0] * self.dims[1]
  }

  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }

  #[inline]
  pub fn as_mut_slice(&mut self) -> &mut [T] {
    &mut self.data
  }

  /// Whether dims and spacing both agree.
  pub fn same_shape<U>(&self, other: &VoxelGrid<U>) -> bool {
    self.dims == other.dims && self.spacing == other.spacing
  }

  /// Error unless `other` has the same dims and spacing.
  pub fn check_same_shape<U>(&self, other: &VoxelGrid<U>) -> Result<()> {
    if self.same_shape(other) {
      Ok(())
    } else {
      Err(SkeletonError::ShapeMismatch {
        expected: format!("{:?} @ {:?}", self.dims, self.spacing.0),
        found: format!("{:?} @ {:?}", other.dims, other.spacing.0),
      })
    }
  }

  /// Linear index of an in-bounds coordinate (unchecked).
  #[inline(always)]
  pub fn index_of(&self, x: usize, y: usize, z: usize) -> usize {
    x + self.dims[0] * (y + self.dims[1] * z)
  }

  /// Coordinate of a linear index.
  #[inline(always)]
  pub fn coord_of(&self, idx: usize) -> [usize; 3] {
    let x = idx % self.dims[0];
    let rest = idx / self.dims[0];
    [x, rest % self.dims[1], rest / self.dims[1]]
  }

  #[inline]
  pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
    x >= 0
      && y >= 0
      && z >= 0
      && (x as usize) < self.dims[0]
      && (y as usize) < self.dims[1]
      && (z as usize) < self.dims[2]
  }

  fn checked_index(&self, x: i64, y: i64, z: i64) -> Result<usize> {
    if self.contains(x, y, z) {
      Ok(self.index_of(x as usize, y as usize, z as usize))
    } else {
      Err(SkeletonError::OutOfRange {
        coord: [x, y, z],
        dims: self.dims,
      })
    }
  }

  /// In-bounds 26-neighbors of a coordinate (3×3×3 minus center).
  ///
  /// Neighbors outside the grid are omitted; callers treat them as
  /// background.
  pub fn neighbors26(&self, x: usize, y: usize, z: usize) -> SmallVec<[[usize; 3]; 26]> {
    let mut out = SmallVec::new();
    for (i, &[dx, dy, dz]) in OFFSETS.iter().enumerate() {
      if i == CENTER {
        continue;
      }
      let (nx, ny, nz) = (x as i64 + dx as i64, y as i64 + dy as i64, z as i64 + dz as i64);
      if self.contains(nx, ny, nz) {
        out.push([nx as usize, ny as usize, nz as usize]);
      }
    }
    out
  }

  /// Count voxels matching a predicate.
  pub fn count<F: Fn(&T) -> bool>(&self, pred: F) -> usize {
    self.data.iter().filter(|v| pred(v)).count()
  }
}

impl VoxelGrid<bool> {
  /// Number of foreground voxels.
  pub fn foreground_count(&self) -> usize {
    self.count(|&v| v)
  }

  /// 27-bit occupancy mask of the 3×3×3 block around `(x, y, z)`.
  ///
  /// Bit layout follows [`crate::neighborhood`]; out-of-bounds cells are
  /// background.
  #[inline]
  pub fn neighborhood_mask(&self, x: usize, y: usize, z: usize) -> u32 {
    let [nx, ny, nz] = self.dims;
    let interior = x > 0 && y > 0 && z > 0 && x + 1 < nx && y + 1 < ny && z + 1 < nz;

    let mut mask = 0u32;
    if interior {
      let base = self.index_of(x - 1, y - 1, z - 1);
      let mut bit = 0;
      for dz in 0..3 {
        for dy in 0..3 {
          let row = base + nx * (dy + ny * dz);
          for dx in 0..3 {
            if self.data[row + dx] {
              mask |= 1 << bit;
            }
            bit += 1;
          }
        }
      }
    } else {
      for bit in 0..NEIGHBORHOOD_SIZE {
        let [dx, dy, dz] = OFFSETS[bit];
        if self.get_or(x as i64 + dx as i64, y as i64 + dy as i64, z as i64 + dz as i64, false) {
          mask |= 1 << bit;
        }
      }
    }
    mask
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
