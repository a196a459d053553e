use super::*;

fn mask_of(offsets: &[[i32; 3]]) -> u32 {
  offsets
    .iter()
    .fold(1 << CENTER, |m, &[dx, dy, dz]| m | 1 << bit_of(dx, dy, dz))
}

#[test]
fn test_ring_sizes() {
  assert_eq!(N6.count_ones(), 6);
  assert_eq!(N18.count_ones(), 18);
  assert_eq!(N26.count_ones(), 26);
  assert_eq!(N26 & (1 << CENTER), 0);
  assert_eq!(N6 & !N18, 0, "N6 must be contained in N18");
}

#[test]
fn test_offsets_roundtrip() {
  for (i, &[dx, dy, dz]) in OFFSETS.iter().enumerate() {
    assert_eq!(bit_of(dx, dy, dz), i);
  }
  assert_eq!(OFFSETS[CENTER], [0, 0, 0]);
}

#[test]
fn test_adjacency_is_symmetric() {
  for i in 0..NEIGHBORHOOD_SIZE {
    for j in 0..NEIGHBORHOOD_SIZE {
      let a = ADJ26[i] >> j & 1;
      let b = ADJ26[j] >> i & 1;
      assert_eq!(a, b, "ADJ26 asymmetric at ({}, {})", i, j);
      assert_eq!(ADJ6[i] >> j & 1, ADJ6[j] >> i & 1);
    }
  }
  // Corner cell has 7 neighbors in the block under 26-adjacency, 3 under 6.
  assert_eq!(ADJ26[0].count_ones(), 7);
  assert_eq!(ADJ6[0].count_ones(), 3);
}

#[test]
fn test_isolated_point_is_not_simple() {
  let mask = 1 << CENTER;
  assert_eq!(t26(mask), 0);
  assert!(!is_simple(mask));
  assert!(is_endpoint(mask));
}

#[test]
fn test_interior_point_is_not_simple() {
  let mask = (1u32 << NEIGHBORHOOD_SIZE) - 1;
  assert_eq!(t26(mask), 1);
  assert_eq!(t6_background(mask), 0);
  assert!(!is_simple(mask));
}

#[test]
fn test_curve_end_is_simple_endpoint() {
  let mask = mask_of(&[[1, 0, 0]]);
  assert!(is_simple(mask));
  assert!(is_endpoint(mask));
}

#[test]
fn test_curve_middle_is_not_simple() {
  let mask = mask_of(&[[-1, 0, 0], [1, 0, 0]]);
  assert_eq!(t26(mask), 2);
  assert!(!is_simple(mask));
  assert!(!is_endpoint(mask));
}

#[test]
fn test_plate_center_would_punch_hole() {
  let mut offsets = Vec::new();
  for dx in -1..=1 {
    for dy in -1..=1 {
      if dx != 0 || dy != 0 {
        offsets.push([dx, dy, 0]);
      }
    }
  }
  let mask = mask_of(&offsets);
  assert_eq!(t26(mask), 1);
  assert_eq!(t6_background(mask), 2);
  assert!(!is_simple(mask));
}

#[test]
fn test_block_corner_is_simple() {
  let mut offsets = Vec::new();
  for dx in 0..=1 {
    for dy in 0..=1 {
      for dz in 0..=1 {
        if (dx, dy, dz) != (0, 0, 0) {
          offsets.push([dx, dy, dz]);
        }
      }
    }
  }
  let mask = mask_of(&offsets);
  assert!(is_simple(mask));
  assert!(!is_endpoint(mask));
}

#[test]
fn test_diagonal_neighbors_count_as_connected() {
  // Two corner-adjacent voxels stay one 26-component.
  let mask = mask_of(&[[1, 1, 1], [1, 1, 0]]);
  assert_eq!(t26(mask), 1);
  // Opposite corners are two components.
  let mask = mask_of(&[[1, 1, 1], [-1, -1, -1]]);
  assert_eq!(t26(mask), 2);
}

#[test]
fn test_face_bits_match_offsets() {
  for face in Face::ALL {
    let [dx, dy, dz] = face.offset();
    assert_eq!(OFFSETS[face.bit()], [dx, dy, dz]);
    assert!(N6 >> face.bit() & 1 == 1);
  }
}
