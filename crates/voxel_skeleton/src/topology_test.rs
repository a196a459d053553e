use super::*;
use crate::grid::{Spacing, VoxelGrid};
use crate::test_utils::*;

fn mask_with(dims: [usize; 3], voxels: &[[usize; 3]]) -> Mask {
  let mut mask = VoxelGrid::new(dims, Spacing::UNIT, false);
  for &[x, y, z] in voxels {
    mask.set(x, y, z, true).unwrap();
  }
  mask
}

#[test]
fn test_empty_mask() {
  let mask = VoxelGrid::new([4, 4, 4], Spacing::UNIT, false);
  assert_eq!(summarize(&mask), TopologySummary::default());
}

#[test]
fn test_single_voxel() {
  let mask = mask_with([3, 3, 3], &[[1, 1, 1]]);
  assert_eq!(component_count(&mask), 1);
  assert_eq!(euler_characteristic(&mask), 1);
}

#[test]
fn test_corner_touching_voxels_are_one_component() {
  let mask = mask_with([3, 3, 3], &[[0, 0, 0], [1, 1, 1]]);
  assert_eq!(component_count(&mask), 1);
  assert_eq!(euler_characteristic(&mask), 1);
}

#[test]
fn test_separate_voxels() {
  let mask = mask_with([5, 1, 1], &[[0, 0, 0], [2, 0, 0], [4, 0, 0]]);
  assert_eq!(component_count(&mask), 3);
  assert_eq!(euler_characteristic(&mask), 3);
}

#[test]
fn test_ring_has_one_tunnel() {
  let mut voxels = Vec::new();
  for x in 0..3 {
    for y in 0..3 {
      if (x, y) != (1, 1) {
        voxels.push([x, y, 0]);
      }
    }
  }
  let summary = summarize(&mask_with([3, 3, 1], &voxels));
  assert_eq!(summary.voxels, 8);
  assert_eq!(summary.components, 1);
  assert_eq!(summary.euler, 0);
  assert_eq!(summary.tunnels_minus_cavities(), 1);
}

#[test]
fn test_hollow_cube_has_one_cavity() {
  let mut mask = solid_box([3, 3, 3], [0, 0, 0], [3, 3, 3]);
  mask.set(1, 1, 1, false).unwrap();
  assert_eq!(component_count(&mask), 1);
  assert_eq!(euler_characteristic(&mask), 2);
}

#[test]
fn test_solid_box_is_contractible() {
  let mask = solid_box([6, 5, 4], [1, 1, 1], [5, 4, 3]);
  assert_eq!(euler_characteristic(&mask), 1);
}

#[test]
fn test_torus_fixture() {
  let mask = torus(8.0, 3.0);
  let summary = summarize(&mask);
  assert_eq!(summary.components, 1);
  assert_eq!(summary.euler, 0);
}
