//! End-to-end tests exercising the crate's public surface rather than a
//! single module in isolation.

use crate::algorithms::intersection::{find_intersections, naive};
use crate::data::dcel::Dcel;
use crate::data::line_segment::Segment;
use crate::data::point::Point;
use proptest::prelude::*;

fn p(x: i64, y: i64) -> Point {
  Point::new(x, y)
}

fn seg(x1: i64, y1: i64, x2: i64, y2: i64) -> Segment {
  Segment::new(p(x1, y1), p(x2, y2))
}

fn arb_segment() -> impl Strategy<Value = (i64, i64, i64, i64)> {
  let coord = -40i64..40;
  (coord.clone(), coord.clone(), coord.clone(), coord).prop_filter("distinct endpoints", |(x1, y1, x2, y2)| {
    (x1, y1) != (x2, y2)
  })
}

proptest! {
  #[test]
  fn sweep_matches_naive_over_random_segment_sets(raw in prop::collection::vec(arb_segment(), 0..60)) {
    let segments: Vec<Segment> = raw.into_iter().map(|(x1, y1, x2, y2)| seg(x1, y1, x2, y2)).collect();
    let swept = match find_intersections(&segments) {
      Ok(found) => found.into_iter().map(|(l, r, _)| (l.0.min(r.0), l.0.max(r.0))).collect::<std::collections::HashSet<_>>(),
      // Coincident/degenerate inputs are rejected rather than silently
      // mis-handled; skip them rather than asserting on an error shape.
      Err(_) => return Ok(()),
    };
    let naive = naive::segment_intersections(&segments)
      .into_iter()
      .map(|(i, j, _)| (i, j))
      .collect::<std::collections::HashSet<_>>();
    prop_assert_eq!(swept, naive);
  }
}

#[test]
fn overlaying_two_disjoint_squares_produces_two_inner_faces_and_the_outer_face() {
  let square_a = Dcel::from_points_and_segments(
    vec![p(0, 0), p(0, 2), p(2, 2), p(2, 0)],
    &[(0, 1), (1, 2), (2, 3), (3, 0)],
  )
  .unwrap();
  let square_b = Dcel::from_points_and_segments(
    vec![p(10, 0), p(10, 2), p(12, 2), p(12, 0)],
    &[(0, 1), (1, 2), (2, 3), (3, 0)],
  )
  .unwrap();
  let merged = Dcel::overlay(&square_a, &square_b, true).unwrap();
  assert_eq!(merged.vertex_count(), 8);
  assert_eq!(merged.edge_count(), 8);
  assert_eq!(merged.face_count(), 3);
}

#[test]
fn overlaying_a_square_with_a_crossing_square_matches_the_documented_edge_edge_counts() {
  let a = Dcel::from_points_and_segments(
    vec![p(0, 0), p(0, 4), p(4, 4), p(4, 0)],
    &[(0, 1), (1, 2), (2, 3), (3, 0)],
  )
  .unwrap();
  let b = Dcel::from_points_and_segments(
    vec![p(2, 2), p(2, 6), p(6, 6), p(6, 2)],
    &[(0, 1), (1, 2), (2, 3), (3, 0)],
  )
  .unwrap();
  let merged = Dcel::overlay(&a, &b, true).unwrap();
  assert_eq!(merged.vertex_count(), 10);
  assert_eq!(merged.edge_count(), 12);
  assert_eq!(merged.face_count(), 4);
}
