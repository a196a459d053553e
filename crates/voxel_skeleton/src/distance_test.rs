use super::*;
use crate::grid::Spacing;
use crate::test_utils::*;

fn assert_matches_brute_force(mask: &Mask) {
  let expected = brute_force_distance(mask);
  let actual = distance_transform(mask);
  for (i, (&want, &got)) in expected.iter().zip(actual.as_slice()).enumerate() {
    assert!(
      (want - got as f64).abs() <= 1e-4 * want.max(1.0),
      "voxel {:?}: expected {}, got {}",
      mask.coord_of(i),
      want,
      got
    );
  }
}

#[test]
fn test_background_is_zero() {
  let mask = VoxelGrid::new([4, 4, 4], Spacing::UNIT, false);
  let field = distance_transform(&mask);
  assert!(field.as_slice().iter().all(|&d| d == 0.0));
}

#[test]
fn test_isolated_voxel() {
  let mut mask = VoxelGrid::new([3, 3, 3], Spacing::UNIT, false);
  mask.set(1, 1, 1, true).unwrap();
  let field = distance_transform(&mask);
  assert_eq!(field.get(1, 1, 1).unwrap(), 1.0);
  assert_eq!(field.get(0, 1, 1).unwrap(), 0.0);
}

#[test]
fn test_full_grid_uses_outer_shell() {
  let mask = VoxelGrid::new([3, 3, 3], Spacing::UNIT, true);
  let field = distance_transform(&mask);
  assert_eq!(field.get(1, 1, 1).unwrap(), 2.0);
  assert_eq!(field.get(0, 0, 0).unwrap(), 1.0);
  assert_eq!(field.get(0, 1, 1).unwrap(), 1.0);
  assert_matches_brute_force(&mask);
}

#[test]
fn test_cube_center() {
  let mask = cube_with_border(5);
  let field = distance_transform(&mask);
  // Cube spans 1..=5; the center is three steps from the border voxels.
  assert_eq!(field.get(3, 3, 3).unwrap(), 3.0);
  assert_eq!(field.get(1, 3, 3).unwrap(), 1.0);
}

#[test]
fn test_matches_brute_force_on_shapes() {
  assert_matches_brute_force(&cube_with_border(6));
  assert_matches_brute_force(&cylinder_z(3.5, 10, 1));
  assert_matches_brute_force(&torus(5.0, 2.0));
}

#[test]
fn test_matches_brute_force_on_random_masks() {
  for seed in 0..3 {
    assert_matches_brute_force(&random_balls([14, 12, 10], 6, 4.0, seed));
    assert_matches_brute_force(&random_blob([9, 9, 9], 0.8, seed));
  }
}

#[test]
fn test_anisotropic_spacing() {
  let mask = random_balls([12, 10, 8], 5, 4.0, 7).with_spacing(Spacing::new([0.5, 1.0, 2.5]).unwrap());
  assert_matches_brute_force(&mask);

  let mut line = VoxelGrid::new([1, 1, 7], Spacing::new([1.0, 1.0, 0.25]).unwrap(), true);
  line.set(0, 0, 0, false).unwrap();
  let field = distance_transform(&line);
  // The last voxel sits next to the shell, the middle one is nearest the hole.
  assert_eq!(field.get(0, 0, 6).unwrap(), 0.25);
  assert_eq!(field.get(0, 0, 3).unwrap(), 0.75);
  assert_eq!(field.get(0, 0, 1).unwrap(), 0.25);
}

#[test]
fn test_squared_field_is_exact_on_unit_grid() {
  let mask = random_balls([10, 10, 10], 4, 4.0, 3);
  let squared = squared_edt(&mask);
  for &d2 in squared.as_slice() {
    assert_eq!(d2, d2.round(), "unit-grid squared distances are integers");
  }
}
