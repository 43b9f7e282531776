//! Orientation of ordered point triples, and a total circular order of
//! directions around a fixed origin.
//!
//! The circular-order comparator is the exact (no-float) analogue of sorting
//! by `atan2`: it classifies a direction vector into a half-plane (north-ish
//! vs south-ish) and then falls back to a cross-product sign within each
//! half. It is used to sort the half-edges leaving a vertex in clockwise
//! order without ever rounding.

use num_bigint::BigInt;
use std::cmp::Ordering;

/// The orientation of an ordered triple of points (or, equivalently, the
/// turn made by walking `p -> q -> r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
  CounterClockWise,
  ClockWise,
  CoLinear,
}

impl Orientation {
  pub fn new(sign: &BigInt) -> Orientation {
    use std::cmp::Ordering::*;
    match sign.cmp(&BigInt::from(0)) {
      Greater => Orientation::CounterClockWise,
      Less => Orientation::ClockWise,
      Equal => Orientation::CoLinear,
    }
  }

  pub fn is_ccw(&self) -> bool {
    matches!(self, Orientation::CounterClockWise)
  }

  pub fn is_cw(&self) -> bool {
    matches!(self, Orientation::ClockWise)
  }

  pub fn is_colinear(&self) -> bool {
    matches!(self, Orientation::CoLinear)
  }

  pub fn reverse(&self) -> Orientation {
    match self {
      Orientation::CounterClockWise => Orientation::ClockWise,
      Orientation::ClockWise => Orientation::CounterClockWise,
      Orientation::CoLinear => Orientation::CoLinear,
    }
  }
}

/// A direction vector given as an un-normalized `(dx, dy)` pair. Only the
/// sign of each component and cross products between pairs are ever
/// inspected, so no normalization is needed even when two vectors are scaled
/// by different positive factors.
pub type Direction = (BigInt, BigInt);

fn half(d: &Direction) -> u8 {
  use std::cmp::Ordering::*;
  let (dx, dy) = d;
  match (dy.cmp(&BigInt::from(0)), dx.cmp(&BigInt::from(0))) {
    (Greater, _) => 0,
    (Equal, Greater) => 0,
    (Equal, Equal) => 0,
    (Equal, Less) => 1,
    (Less, _) => 1,
  }
}

fn cross(a: &Direction, b: &Direction) -> BigInt {
  &a.0 * &b.1 - &a.1 * &b.0
}

/// Total order of directions around a fixed origin, starting at the
/// positive x-axis and sweeping counter-clockwise.
///
/// Equivalent to comparing `atan2(dy, dx)` values but computed exactly via
/// cross-product signs.
pub fn ccw_cmp_around(p: &Direction, q: &Direction) -> Ordering {
  let hp = half(p);
  let hq = half(q);
  if hp != hq {
    return hp.cmp(&hq);
  }
  match cross(p, q).cmp(&BigInt::from(0)) {
    Ordering::Greater => Ordering::Less,
    Ordering::Less => Ordering::Greater,
    Ordering::Equal => Ordering::Equal,
  }
}

/// Clockwise variant of [`ccw_cmp_around`], used to sort the half-edges
/// leaving a vertex in clockwise rotational order.
pub fn cw_cmp_around(p: &Direction, q: &Direction) -> Ordering {
  ccw_cmp_around(p, q).reverse()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(x: i64, y: i64) -> Direction {
    (BigInt::from(x), BigInt::from(y))
  }

  #[test]
  fn orientation_new() {
    assert_eq!(Orientation::new(&BigInt::from(1)), Orientation::CounterClockWise);
    assert_eq!(Orientation::new(&BigInt::from(-1)), Orientation::ClockWise);
    assert_eq!(Orientation::new(&BigInt::from(0)), Orientation::CoLinear);
  }

  #[test]
  fn reverse_is_involution() {
    for o in [Orientation::CounterClockWise, Orientation::ClockWise, Orientation::CoLinear] {
      assert_eq!(o.reverse().reverse(), o);
    }
  }

  #[test]
  fn ccw_cmp_sweeps_quadrants() {
    let east = d(1, 0);
    let north = d(0, 1);
    let west = d(-1, 0);
    let south = d(0, -1);
    assert_eq!(ccw_cmp_around(&east, &north), Ordering::Less);
    assert_eq!(ccw_cmp_around(&north, &west), Ordering::Less);
    assert_eq!(ccw_cmp_around(&west, &south), Ordering::Less);
    assert_eq!(ccw_cmp_around(&south, &east), Ordering::Less);
  }

  #[test]
  fn cw_cmp_is_reverse_of_ccw() {
    let a = d(3, 1);
    let b = d(-1, 2);
    assert_eq!(cw_cmp_around(&a, &b), ccw_cmp_around(&a, &b).reverse());
  }
}
