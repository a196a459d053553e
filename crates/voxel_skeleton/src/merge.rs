//! Combine a skeleton with a thickness field into the final output map.

use rayon::prelude::*;

use crate::error::Result;
use crate::grid::{Field, Mask, VoxelGrid};

/// Value written wherever the skeleton is background.
pub const NOT_ON_SKELETON: f32 = -1.0;

/// Thickness at skeleton voxels, [`NOT_ON_SKELETON`] everywhere else.
///
/// Fails with `ShapeMismatch` when the two grids differ in dimensions.
/// The output takes the skeleton's spacing.
pub fn merge(skeleton: &Mask, thickness: &Field) -> Result<Field> {
  skeleton.check_same_shape(thickness)?;

  let data = skeleton
    .as_slice()
    .par_iter()
    .zip(thickness.as_slice().par_iter())
    .map(|(&on, &t)| if on { t } else { NOT_ON_SKELETON })
    .collect();

  VoxelGrid::from_vec(skeleton.dims(), skeleton.spacing(), data)
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;
