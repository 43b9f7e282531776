//! Segments and lines over [`Point`], and the exact intersection predicate
//! shared by both.
//!
//! [`Segment::generic_intersect`] is the workhorse: it locates the
//! intersection of the two *supporting lines* and classifies where that
//! point falls relative to each input, before `self` and `other` decide
//! whether that classification means they actually intersect.

use crate::data::point::{collinear_in_order, cw_cmp_around, Point};
use crate::intersection::Intersects;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Where an intersection point falls on a segment, relative to its
/// `p1 -> p2` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionLocation {
  Before,
  On,
  After,
}

/// A closed line segment between two distinct points.
///
/// `top`/`bottom`/`left`/`right` are the endpoints re-labeled by a canonical
/// tie-break (higher y first, then smaller x) so that sweep-line code can
/// talk about "the upper endpoint" without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
  pub p1: Point,
  pub p2: Point,
}

impl Segment {
  /// # Panics
  ///
  /// Panics if `p1 == p2`; a segment must have two distinct endpoints.
  pub fn new(p1: Point, p2: Point) -> Segment {
    assert_ne!(p1, p2, "a segment requires two distinct endpoints");
    Segment { p1, p2 }
  }

  pub fn top(&self) -> &Point {
    if self.p1.is_above(&self.p2) || (self.p1.equal_y(&self.p2) && self.p1.is_left_of(&self.p2)) {
      &self.p1
    } else {
      &self.p2
    }
  }

  pub fn bottom(&self) -> &Point {
    if std::ptr::eq(self.top(), &self.p1) {
      &self.p2
    } else {
      &self.p1
    }
  }

  pub fn left(&self) -> &Point {
    if self.p1.is_left_of(&self.p2) || (self.p1.equal_x(&self.p2) && self.p1.is_above(&self.p2)) {
      &self.p1
    } else {
      &self.p2
    }
  }

  pub fn right(&self) -> &Point {
    if std::ptr::eq(self.left(), &self.p1) {
      &self.p2
    } else {
      &self.p1
    }
  }

  pub fn is_horizontal(&self) -> bool {
    self.p1.equal_y(&self.p2)
  }

  pub fn is_vertical(&self) -> bool {
    self.p1.equal_x(&self.p2)
  }

  pub fn contains_interior_point(&self, point: &Point) -> bool {
    *point != self.p1 && *point != self.p2 && collinear_in_order(&self.p1, point, &self.p2)
  }

  pub fn contains_point(&self, point: &Point) -> bool {
    self.p1 == *point || self.p2 == *point || self.contains_interior_point(point)
  }

  pub fn contains_segment(&self, other: &Segment) -> bool {
    self.contains_point(&other.p1) && self.contains_point(&other.p2)
  }

  /// The (infinite) line through this segment's endpoints.
  pub fn support(&self) -> Line {
    Line { p1: self.p1.clone(), p2: self.p2.clone() }
  }

  /// Intersects the lines supporting `self` and `other`, returning the
  /// intersection point together with where it falls on each of the two
  /// *segments* (treated as directed `p1 -> p2`).
  ///
  /// Returns `None` in the point's place when the two supporting lines are
  /// parallel (including coincident).
  pub fn generic_intersect(&self, other: &Segment) -> (Option<Point>, Option<(IntersectionLocation, IntersectionLocation)>) {
    let (x1, y1, w1) = (&self.p1.x, &self.p1.y, &self.p1.w);
    let (x2, y2, w2) = (&self.p2.x, &self.p2.y, &self.p2.w);
    let (x3, y3, w3) = (&other.p1.x, &other.p1.y, &other.p1.w);
    let (x4, y4, w4) = (&other.p2.x, &other.p2.y, &other.p2.w);

    let nw1 = w2 * w3 * w4;
    let nw2 = w1 * w3 * w4;
    let nw3 = w1 * w2 * w4;
    let nw4 = w1 * w2 * w3;

    let sx1 = x1 * &nw1;
    let sy1 = y1 * &nw1;
    let sx2 = x2 * &nw2;
    let sy2 = y2 * &nw2;
    let sx3 = x3 * &nw3;
    let sy3 = y3 * &nw3;
    let sx4 = x4 * &nw4;
    let sy4 = y4 * &nw4;

    let mut den = (&sx1 - &sx2) * (&sy3 - &sy4) - (&sy1 - &sy2) * (&sx3 - &sx4);
    if den.is_zero() {
      return (None, None);
    }

    let mut t_num = (&sx1 - &sx3) * (&sy3 - &sy4) - (&sy1 - &sy3) * (&sx3 - &sx4);
    let mut u_num = -(&sx1 - &sx2) * (&sy1 - &sy3) + (&sy1 - &sy2) * (&sx1 - &sx3);

    if den.is_negative() {
      den = -den;
      t_num = -t_num;
      u_num = -u_num;
    }

    let classify = |num: &BigInt, den: &BigInt| {
      if num.is_negative() {
        IntersectionLocation::Before
      } else if num <= den {
        IntersectionLocation::On
      } else {
        IntersectionLocation::After
      }
    };
    let t_loc = classify(&t_num, &den);
    let u_loc = classify(&u_num, &den);

    let x = &sx1 * &den + &t_num * (&sx2 - &sx1);
    let y = &sy1 * &den + &t_num * (&sy2 - &sy1);
    let w = &den * w1 * w2 * w3 * w4;

    (Some(Point::new_homogeneous(x, y, w)), Some((t_loc, u_loc)))
  }

  /// The point where `self` crosses the *line* supporting `other`, or `None`
  /// if that point does not lie within `self`.
  pub fn intersect_line(&self, other: &Line) -> Option<Point> {
    let as_segment = Segment { p1: other.p1.clone(), p2: other.p2.clone() };
    let (point, locs) = self.generic_intersect(&as_segment);
    match locs {
      Some((IntersectionLocation::On, _)) => point,
      _ => None,
    }
  }
}

impl Intersects for Segment {
  type Result = Point;

  fn intersect(&self, other: &Segment) -> Option<Point> {
    let (point, locs) = self.generic_intersect(other);
    match locs {
      Some((IntersectionLocation::On, IntersectionLocation::On)) => point,
      _ => None,
    }
  }
}

/// An infinite line, represented by two distinct points it passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
  pub p1: Point,
  pub p2: Point,
}

impl Line {
  pub fn new(p1: Point, p2: Point) -> Line {
    assert_ne!(p1, p2, "a line requires two distinct points");
    Line { p1, p2 }
  }

  /// Intersects two lines; `None` when they are parallel (including
  /// coincident).
  pub fn intersect(&self, other: &Line) -> Option<Point> {
    let as_self_segment = Segment { p1: self.p1.clone(), p2: self.p2.clone() };
    let as_other_segment = Segment { p1: other.p1.clone(), p2: other.p2.clone() };
    let (point, _) = as_self_segment.generic_intersect(&as_other_segment);
    point
  }

  pub fn intersect_segment(&self, segment: &Segment) -> Option<Point> {
    segment.intersect_line(self)
  }
}

/// Sorts the half-edges leaving `origin` in clockwise order by the point
/// each one departs towards.
pub fn cw_cmp_around_origin(origin: &Point, a: &Point, b: &Point) -> Ordering {
  cw_cmp_around(origin, a, b)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
  }

  #[test]
  fn top_bottom_left_right_tie_break() {
    let s = Segment::new(p(0, 0), p(0, 2));
    assert_eq!(s.top(), &p(0, 2));
    assert_eq!(s.bottom(), &p(0, 0));
    assert_eq!(s.left(), &p(0, 2));
    assert_eq!(s.right(), &p(0, 0));
  }

  #[test]
  fn crossing_segments_intersect_at_midpoint() {
    let a = Segment::new(p(0, 0), p(2, 2));
    let b = Segment::new(p(0, 2), p(2, 0));
    let inter = a.intersect(&b).unwrap();
    assert_eq!(inter, p(1, 1));
  }

  #[test]
  fn disjoint_segments_do_not_intersect() {
    let a = Segment::new(p(0, 0), p(1, 0));
    let b = Segment::new(p(0, 1), p(1, 1));
    assert_eq!(a.intersect(&b), None);
  }

  #[test]
  fn collinear_overlapping_segments_report_no_single_point() {
    let a = Segment::new(p(0, 0), p(2, 0));
    let b = Segment::new(p(1, 0), p(3, 0));
    assert_eq!(a.intersect(&b), None);
  }

  #[test]
  fn intersect_is_symmetric() {
    let a = Segment::new(p(0, 0), p(4, 4));
    let b = Segment::new(p(0, 4), p(4, 0));
    assert_eq!(a.intersect(&b), b.intersect(&a));
  }

  #[test]
  fn segment_crosses_line_beyond_its_own_extent() {
    let seg = Segment::new(p(0, 0), p(1, 1));
    let line = Line::new(p(0, 2), p(2, 0));
    assert_eq!(seg.intersect_line(&line), None);
    let longer = Segment::new(p(0, 0), p(4, 4));
    assert_eq!(longer.intersect_line(&line), Some(p(1, 1)));
  }

  #[test]
  fn contains_interior_point_excludes_endpoints() {
    let s = Segment::new(p(0, 0), p(4, 0));
    assert!(s.contains_interior_point(&p(2, 0)));
    assert!(!s.contains_interior_point(&p(0, 0)));
  }
}
