//! Points in homogeneous integer coordinates, and the exact orientation
//! predicates built on top of them.
//!
//! A `Point { x, y, w }` represents the Cartesian point `(x/w, y/w)`. Every
//! point is kept in canonical form (`w > 0`, `gcd(x, y, w) == 1`) so that two
//! points are `==` exactly when they denote the same Cartesian location,
//! which lets `Point` derive `Eq`/`Hash` and be used directly as a map key
//! (see [`crate::data::event_queue`]).
//!
//! All predicates below (`orient`, `ccw`, `cw`, `collinear`,
//! `collinear_in_order`) are computed with exact bignum arithmetic and never
//! consult a tolerance.

use crate::array::{self, Direction, Orientation};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
  pub x: BigInt,
  pub y: BigInt,
  pub w: BigInt,
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

impl Point {
  /// Constructs a point from integer Cartesian coordinates (`w = 1`).
  pub fn new(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Point {
    Point {
      x: x.into(),
      y: y.into(),
      w: BigInt::one(),
    }
  }

  /// Constructs a point from homogeneous coordinates, normalizing so that
  /// `w > 0` and `gcd(x, y, w) == 1`.
  ///
  /// # Panics
  ///
  /// Panics if `w` is zero.
  pub fn new_homogeneous(x: impl Into<BigInt>, y: impl Into<BigInt>, w: impl Into<BigInt>) -> Point {
    let (mut x, mut y, mut w) = (x.into(), y.into(), w.into());
    assert!(!w.is_zero(), "homogeneous weight must be non-zero");
    if w.is_negative() {
      x = -x;
      y = -y;
      w = -w;
    }
    let g = x.gcd(&y).gcd(&w);
    if !g.is_zero() && g != BigInt::one() {
      x /= &g;
      y /= &g;
      w /= &g;
    }
    Point { x, y, w }
  }

  /// Exact Cartesian x-coordinate, as a rational number.
  pub fn x_rational(&self) -> BigRational {
    BigRational::new(self.x.clone(), self.w.clone())
  }

  /// Exact Cartesian y-coordinate, as a rational number.
  pub fn y_rational(&self) -> BigRational {
    BigRational::new(self.y.clone(), self.w.clone())
  }

  /// Cartesian x-coordinate, rounded to `f64`. Never used by a predicate;
  /// intended for diagnostics and the sweep-line comparator's float
  /// fast path.
  pub fn x_f64(&self) -> f64 {
    self.x_rational().to_f64_lossy()
  }

  /// Cartesian y-coordinate, rounded to `f64`. See [`Point::x_f64`].
  pub fn y_f64(&self) -> f64 {
    self.y_rational().to_f64_lossy()
  }

  /// An un-normalized direction vector from `self` to `other`, suitable for
  /// [`array::ccw_cmp_around`]/[`array::cw_cmp_around`].
  pub fn direction_to(&self, other: &Point) -> Direction {
    let dx = &other.x * &self.w - &self.x * &other.w;
    let dy = &other.y * &self.w - &self.y * &other.w;
    (dx, dy)
  }

  pub fn is_left_of(&self, other: &Point) -> bool {
    self.cmp_x(other) == Ordering::Less
  }

  pub fn is_right_of(&self, other: &Point) -> bool {
    self.cmp_x(other) == Ordering::Greater
  }

  pub fn is_above(&self, other: &Point) -> bool {
    self.cmp_y(other) == Ordering::Greater
  }

  pub fn is_below(&self, other: &Point) -> bool {
    self.cmp_y(other) == Ordering::Less
  }

  pub fn equal_x(&self, other: &Point) -> bool {
    self.cmp_x(other) == Ordering::Equal
  }

  pub fn equal_y(&self, other: &Point) -> bool {
    self.cmp_y(other) == Ordering::Equal
  }

  /// Exact comparison of Cartesian x-coordinates.
  pub fn cmp_x(&self, other: &Point) -> Ordering {
    (&self.x * &other.w).cmp(&(&other.x * &self.w))
  }

  /// Exact comparison of Cartesian y-coordinates.
  pub fn cmp_y(&self, other: &Point) -> Ordering {
    (&self.y * &other.w).cmp(&(&other.y * &self.w))
  }

  /// The turn made by walking `self -> q -> r`.
  pub fn orient(&self, q: &Point, r: &Point) -> Orientation {
    Orientation::new(&orient_sign(self, q, r))
  }
}

/// Lexicographic order: by x, then by y. Used by [`crate::data::event_queue`]
/// to break ties between events at the same y-coordinate.
impl PartialOrd for Point {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Point {
  fn cmp(&self, other: &Self) -> Ordering {
    self.cmp_x(other).then_with(|| self.cmp_y(other))
  }
}

fn orient_sign(p: &Point, q: &Point, r: &Point) -> BigInt {
  let nwp = &q.w * &r.w;
  let nwq = &p.w * &r.w;
  let nwr = &p.w * &q.w;
  let ax = &q.x * &nwq - &p.x * &nwp;
  let ay = &q.y * &nwq - &p.y * &nwp;
  let bx = &r.x * &nwr - &p.x * &nwp;
  let by = &r.y * &nwr - &p.y * &nwp;
  &ax * &by - &ay * &bx
}

/// Sign-exact orientation test: whether `p -> q -> r` turns left, right, or
/// not at all.
pub fn orient(p: &Point, q: &Point, r: &Point) -> Orientation {
  p.orient(q, r)
}

pub fn ccw(p: &Point, q: &Point, r: &Point) -> bool {
  orient(p, q, r).is_ccw()
}

pub fn cw(p: &Point, q: &Point, r: &Point) -> bool {
  orient(p, q, r).is_cw()
}

pub fn collinear(p: &Point, q: &Point, r: &Point) -> bool {
  orient(p, q, r).is_colinear()
}

/// Whether `b` lies on the segment from `a` to `c` (inclusive of the
/// endpoints): `a`, `b`, `c` must be collinear, and `b` must lie between `a`
/// and `c`, not merely on their common line.
pub fn collinear_in_order(a: &Point, b: &Point, c: &Point) -> bool {
  if !collinear(a, b, c) {
    return false;
  }
  let nwa = &b.w * &c.w;
  let nwb = &a.w * &c.w;
  let nwc = &a.w * &b.w;
  let ax = &a.x * &nwa - &b.x * &nwb;
  let ay = &a.y * &nwa - &b.y * &nwb;
  let bx = &b.x * &nwb - &c.x * &nwc;
  let by = &b.y * &nwb - &c.y * &nwc;
  let dot = &ax * &bx + &ay * &by;
  !dot.is_negative()
}

/// A named helper for [`array::ccw_cmp_around`], used to sort the half-edges
/// leaving `origin` clockwise by the direction in which they depart.
pub fn cw_cmp_around(origin: &Point, a: &Point, b: &Point) -> Ordering {
  array::cw_cmp_around(&origin.direction_to(a), &origin.direction_to(b))
}

trait ToF64Lossy {
  fn to_f64_lossy(&self) -> f64;
}

impl ToF64Lossy for BigRational {
  fn to_f64_lossy(&self) -> f64 {
    use num_traits::ToPrimitive;
    self.to_f64().unwrap_or(f64::NAN)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use test_strategy::proptest;

  fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
  }

  #[test]
  fn homogeneous_points_normalize_to_same_value() {
    assert_eq!(Point::new_homogeneous(2, 4, 2), Point::new_homogeneous(1, 2, 1));
    assert_eq!(Point::new_homogeneous(-1, -2, -1), Point::new_homogeneous(1, 2, 1));
  }

  #[test]
  fn orient_basic_cases() {
    assert_eq!(orient(&p(0, 0), &p(1, 0), &p(1, 1)), Orientation::CounterClockWise);
    assert_eq!(orient(&p(0, 0), &p(1, 1), &p(1, 0)), Orientation::ClockWise);
    assert_eq!(orient(&p(0, 0), &p(1, 1), &p(2, 2)), Orientation::CoLinear);
  }

  #[test]
  fn collinear_in_order_requires_betweenness() {
    assert!(collinear_in_order(&p(0, 0), &p(1, 1), &p(2, 2)));
    assert!(!collinear_in_order(&p(0, 0), &p(3, 3), &p(2, 2)));
    assert!(collinear_in_order(&p(0, 0), &p(0, 0), &p(2, 2)));
  }

  #[test]
  fn fractional_points_compare_by_cartesian_value() {
    let half = Point::new_homogeneous(1, 0, 2);
    let one = Point::new_homogeneous(1, 0, 1);
    assert_eq!(half.cmp_x(&one), Ordering::Less);
  }

  fn arb_small_point() -> impl Strategy<Value = Point> {
    (-8i64..8, -8i64..8).prop_map(|(x, y)| p(x, y))
  }

  #[proptest]
  fn orient_is_antisymmetric(#[strategy(arb_small_point())] a: Point, #[strategy(arb_small_point())] b: Point, #[strategy(arb_small_point())] c: Point) {
    prop_assert_eq!(orient(&a, &b, &c), orient(&c, &b, &a).reverse());
  }

  #[proptest]
  fn orient_is_rotation_invariant(#[strategy(arb_small_point())] a: Point, #[strategy(arb_small_point())] b: Point, #[strategy(arb_small_point())] c: Point) {
    prop_assert_eq!(orient(&a, &b, &c), orient(&b, &c, &a));
  }
}
