//! `O(n^2)` brute-force segment intersection, used as the correctness
//! baseline [`bentley_ottmann`](crate::algorithms::intersection::bentley_ottmann)
//! is checked against.

use crate::data::line_segment::Segment;
use crate::data::point::Point;
use crate::intersection::Intersects;

/// Finds every pairwise intersection among `segments` by comparing all
/// `O(n^2)` pairs directly.
pub fn segment_intersections(segments: &[Segment]) -> Vec<(usize, usize, Point)> {
  let mut out = Vec::new();
  for i in 0..segments.len() {
    for j in (i + 1)..segments.len() {
      if let Some(p) = segments[i].intersect(&segments[j]) {
        out.push((i, j, p));
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
  }

  fn seg(x1: i64, y1: i64, x2: i64, y2: i64) -> Segment {
    Segment::new(p(x1, y1), p(x2, y2))
  }

  #[test]
  fn finds_the_one_crossing_pair() {
    let segments = [seg(0, 0, 2, 2), seg(0, 2, 2, 0), seg(5, 5, 6, 6)];
    let found = segment_intersections(&segments);
    assert_eq!(found, vec![(0, 1, p(1, 1))]);
  }

  #[test]
  fn empty_input_yields_no_pairs() {
    assert_eq!(segment_intersections(&[]), vec![]);
  }
}
