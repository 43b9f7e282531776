//! Bentley-Ottmann sweep-line intersection detection.
//!
//! A horizontal sweep line travels top to bottom across the plane. The
//! [`EventQueue`] pops segment endpoints (and, once discovered, crossing
//! points) in decreasing-y order; the status structure — an [`AvlTree`]
//! ordered by each active segment's current x-coordinate along the sweep
//! line — tracks which segments are left-to-right neighbors at any instant.
//!
//! # Workflow
//! 1. Every segment contributes an `Insert` event at its top endpoint and a
//!    `Delete` event at its bottom endpoint.
//! 2. On `Insert`, the segment is added to the status structure and checked
//!    against its new left/right neighbors for a future crossing.
//! 3. On `Delete`, the segment's former left/right neighbors are checked
//!    against each other (they are now adjacent).
//! 4. On `Intersect`, the two segments are reported, their status-structure
//!    positions are exchanged via [`AvlTree::swap_keys`] (the tree shape
//!    does not change, only which segment each node now represents does),
//!    and the two new cross-pair neighbors are checked for further
//!    crossings.
//!
//! [`SweepLineComparator`] orders active segments by evaluating each one's
//! x-coordinate at the sweep line's current y. It tries `f64` arithmetic
//! first and only falls back to exact `BigRational` arithmetic when the two
//! results are too close to trust — the one place in this crate floating
//! point is used at all, and never to decide correctness, only to skip exact
//! arithmetic when it plainly isn't needed.
//!
//! Two segments can also tie exactly (sharing an endpoint, or genuinely
//! crossing at the instant being compared); that tie is broken by comparing
//! which one points further right as the sweep continues downward, via an
//! exact cross product of their top-to-bottom direction vectors.

use crate::data::avl::{AvlTree, Comparator};
use crate::data::event_queue::{sweep_order, Event, EventKind, EventQueue, SegmentId};
use crate::data::line_segment::Segment;
use crate::data::point::Point;
use crate::intersection::Intersects;
use crate::Error;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

const FLOAT_FAST_PATH_EPSILON: f64 = 1e-9;

fn x_at_f64(seg: &Segment, y: f64) -> f64 {
  let (x1, y1) = (seg.p1.x_f64(), seg.p1.y_f64());
  let (x2, y2) = (seg.p2.x_f64(), seg.p2.y_f64());
  if (y2 - y1).abs() < f64::EPSILON {
    return x1.min(x2);
  }
  x1 + (x2 - x1) * (y - y1) / (y2 - y1)
}

fn x_at_exact(seg: &Segment, y: &BigRational) -> BigRational {
  let (x1, y1) = (seg.p1.x_rational(), seg.p1.y_rational());
  let (x2, y2) = (seg.p2.x_rational(), seg.p2.y_rational());
  if y1 == y2 {
    return x1.min(x2);
  }
  &x1 + (&x2 - &x1) * (y - &y1) / (&y2 - &y1)
}

/// Breaks an exact tie by comparing which segment points further right as
/// the sweep continues downward from the tied position.
fn downward_direction_tie_break(a: &Segment, b: &Segment) -> Ordering {
  let (adx, ady) = a.top().direction_to(a.bottom());
  let (bdx, bdy) = b.top().direction_to(b.bottom());
  let cross = &adx * &bdy - &ady * &bdx;
  match cross.cmp(&BigInt::from(0)) {
    Ordering::Greater => Ordering::Less,
    Ordering::Less => Ordering::Greater,
    Ordering::Equal => Ordering::Equal,
  }
}

/// Orders active segments by x-coordinate along the current sweep line.
pub struct SweepLineComparator {
  segments: Rc<Vec<Segment>>,
  sweep_y: RefCell<BigRational>,
}

impl SweepLineComparator {
  pub fn new(segments: Rc<Vec<Segment>>) -> SweepLineComparator {
    use num_traits::Zero;
    SweepLineComparator { segments, sweep_y: RefCell::new(BigRational::zero()) }
  }

  pub fn set_sweep_y(&self, y: BigRational) {
    *self.sweep_y.borrow_mut() = y;
  }
}

impl Comparator<SegmentId> for SweepLineComparator {
  fn compare(&self, a: &SegmentId, b: &SegmentId) -> Ordering {
    if a == b {
      return Ordering::Equal;
    }
    let sa = &self.segments[a.0];
    let sb = &self.segments[b.0];
    let y = self.sweep_y.borrow().clone();
    let yf = y.to_f64().unwrap_or(0.0);
    let (xa_f, xb_f) = (x_at_f64(sa, yf), x_at_f64(sb, yf));
    if (xa_f - xb_f).abs() > FLOAT_FAST_PATH_EPSILON {
      return xa_f.partial_cmp(&xb_f).unwrap_or(Ordering::Equal);
    }
    match x_at_exact(sa, &y).cmp(&x_at_exact(sb, &y)) {
      Ordering::Equal => downward_direction_tie_break(sa, sb),
      other => other,
    }
  }
}

fn schedule_intersection(
  queue: &mut EventQueue,
  segments: &[Segment],
  left: SegmentId,
  right: SegmentId,
  current: &Point,
) -> Result<(), Error> {
  if let Some(p) = segments[left.0].intersect(&segments[right.0]) {
    if sweep_order(current, &p) != Ordering::Less {
      queue.push(Event { point: p, kind: EventKind::Intersect(left, right) })?;
    }
  }
  Ok(())
}

fn handle_insert(
  tree: &mut AvlTree<SegmentId, SweepLineComparator>,
  queue: &mut EventQueue,
  segments: &[Segment],
  id: SegmentId,
  point: &Point,
) -> Result<(), Error> {
  let left = tree.left_neighbor(&id).copied();
  tree.insert(id)?;
  let right = tree.right_neighbor(&id).copied();
  if let Some(l) = left {
    schedule_intersection(queue, segments, l, id, point)?;
  }
  if let Some(r) = right {
    schedule_intersection(queue, segments, id, r, point)?;
  }
  Ok(())
}

fn handle_delete(
  tree: &mut AvlTree<SegmentId, SweepLineComparator>,
  queue: &mut EventQueue,
  segments: &[Segment],
  id: SegmentId,
  point: &Point,
) -> Result<(), Error> {
  let left = tree.left_neighbor(&id).copied();
  let right = tree.right_neighbor(&id).copied();
  tree.delete(&id)?;
  if let (Some(l), Some(r)) = (left, right) {
    schedule_intersection(queue, segments, l, r, point)?;
  }
  Ok(())
}

fn handle_intersection(
  tree: &mut AvlTree<SegmentId, SweepLineComparator>,
  queue: &mut EventQueue,
  segments: &[Segment],
  left: SegmentId,
  right: SegmentId,
  point: &Point,
  found: &mut Vec<(SegmentId, SegmentId, Point)>,
  reported: &mut HashSet<(usize, usize)>,
) -> Result<(), Error> {
  let key = (left.0.min(right.0), left.0.max(right.0));
  if reported.insert(key) {
    found.push((left, right, point.clone()));
  }
  // The swap must happen while the comparator still sees the sweep line at
  // its pre-crossing position: `left`/`right` only compare equal (and are
  // therefore findable by `search`) under the ordering that held just above
  // `point`. Only once they have traded places is it safe to move the sweep
  // line down to `point` itself.
  tree.swap_keys(&left, &right)?;
  tree.comparator().set_sweep_y(point.y_rational());
  let far_left = tree.left_neighbor(&right).copied();
  let far_right = tree.right_neighbor(&left).copied();
  if let Some(fl) = far_left {
    schedule_intersection(queue, segments, fl, right, point)?;
  }
  if let Some(fr) = far_right {
    schedule_intersection(queue, segments, left, fr, point)?;
  }
  Ok(())
}

/// Finds every pairwise intersection among `segments` in
/// `O((n + k) log n)` time, where `k` is the number of intersections found.
///
/// Fails if two segments are found to intersect at a point that coincides
/// with a different, already-scheduled event — a degenerate three-or-more
/// way concurrence. See [`EventQueue::push`].
pub fn find_intersections(segments: &[Segment]) -> Result<Vec<(SegmentId, SegmentId, Point)>, Error> {
  let segments = Rc::new(segments.to_vec());
  let mut queue = EventQueue::new();
  for (i, s) in segments.iter().enumerate() {
    let id = SegmentId(i);
    queue.push(Event { point: s.top().clone(), kind: EventKind::Insert(id) })?;
    queue.push(Event { point: s.bottom().clone(), kind: EventKind::Delete(id) })?;
  }

  let comparator = SweepLineComparator::new(segments.clone());
  let mut tree = AvlTree::new(comparator);
  let mut found = Vec::new();
  let mut reported = HashSet::new();

  while !queue.is_empty() {
    let event = queue.pop()?;
    match event.kind {
      EventKind::Insert(id) => {
        tree.comparator().set_sweep_y(event.point.y_rational());
        handle_insert(&mut tree, &mut queue, &segments, id, &event.point)?
      }
      EventKind::Delete(id) => {
        tree.comparator().set_sweep_y(event.point.y_rational());
        handle_delete(&mut tree, &mut queue, &segments, id, &event.point)?
      }
      EventKind::Intersect(left, right) => {
        // The sweep line must still be at its pre-crossing position when
        // `handle_intersection` looks up `left`/`right` to swap them; it
        // advances the line itself immediately after the swap.
        handle_intersection(&mut tree, &mut queue, &segments, left, right, &event.point, &mut found, &mut reported)?
      }
    }
  }
  Ok(found)
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

  fn by_pair(found: &[(SegmentId, SegmentId, Point)], a: usize, b: usize) -> Option<Point> {
    found.iter().find(|(l, r, _)| (l.0 == a && r.0 == b) || (l.0 == b && r.0 == a)).map(|(_, _, p)| p.clone())
  }

  #[test]
  fn finds_a_single_crossing() {
    let segments = [seg(0, 0, 2, 2), seg(0, 2, 2, 0)];
    let found = find_intersections(&segments).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(by_pair(&found, 0, 1), Some(p(1, 1)));
  }

  #[test]
  fn disjoint_segments_report_nothing() {
    let segments = [seg(0, 0, 1, 0), seg(0, 1, 1, 1)];
    assert_eq!(find_intersections(&segments).unwrap(), vec![]);
  }

  #[test]
  fn segments_sharing_a_top_endpoint_do_not_falsely_collide_in_the_status_structure() {
    let segments = [seg(0, 0, -4, -4), seg(0, 0, 4, -4), seg(-4, -4, 4, -4)];
    let found = find_intersections(&segments).unwrap();
    assert_eq!(found.len(), 3);
  }

  #[test]
  fn matches_naive_baseline_on_a_small_mixed_set() {
    let segments = [
      seg(0, 10, 10, 0),
      seg(0, 0, 10, 10),
      seg(2, 8, 8, 8),
      seg(5, 0, 5, 10),
      seg(-2, 4, 12, 6),
    ];
    let swept: HashSet<(usize, usize)> =
      find_intersections(&segments).unwrap().into_iter().map(|(l, r, _)| (l.0.min(r.0), l.0.max(r.0))).collect();
    let naive: HashSet<(usize, usize)> = crate::algorithms::intersection::naive::segment_intersections(&segments)
      .into_iter()
      .map(|(i, j, _)| (i, j))
      .collect();
    assert_eq!(swept, naive);
  }
}
