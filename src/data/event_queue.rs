//! The sweep-line's event queue: a min-priority queue over points, ordered
//! by decreasing y (then increasing x), with de-duplication by point so
//! that two segments sharing an endpoint only ever produce one `Insert`
//! event there.

use crate::data::point::Point;
use crate::Error;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A segment identifier within a single sweep. Segments are owned by the
/// caller (see [`crate::algorithms::intersection::bentley_ottmann`]); events
/// and tree nodes only ever refer to them by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
  Insert(SegmentId),
  Delete(SegmentId),
  /// An intersection between two segments that were adjacent in the status
  /// structure; `(left, right)` names which was to the left just before the
  /// crossing.
  Intersect(SegmentId, SegmentId),
}

#[derive(Debug, Clone)]
pub struct Event {
  pub point: Point,
  pub kind: EventKind,
}

impl PartialEq for Event {
  fn eq(&self, other: &Self) -> bool {
    self.point == other.point
  }
}
impl Eq for Event {}

impl Event {
  /// Ordering used by the priority queue: events are popped in decreasing y,
  /// then increasing x.
  fn priority(&self, other: &Self) -> Ordering {
    sweep_order(&self.point, &other.point)
  }
}

/// The sweep order of two points: decreasing y, then increasing x. Exposed
/// standalone so callers that schedule new events mid-sweep (intersections
/// discovered by [`crate::algorithms::intersection::bentley_ottmann`]) can
/// tell whether a candidate point has already been passed.
pub fn sweep_order(a: &Point, b: &Point) -> Ordering {
  a.cmp_y(b).then_with(|| b.cmp_x(a))
}

impl PartialOrd for Event {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for Event {
  fn cmp(&self, other: &Self) -> Ordering {
    self.priority(other)
  }
}

/// A min-priority queue of sweep events, keyed by point so that re-pushing
/// an event already seen at that point is either a silent no-op (same kind)
/// or a fatal error (a genuinely different, coinciding event).
pub struct EventQueue {
  heap: BinaryHeap<Event>,
  seen: HashMap<Point, EventKind>,
  last_popped: Option<Point>,
}

impl EventQueue {
  pub fn new() -> EventQueue {
    EventQueue { heap: BinaryHeap::new(), seen: HashMap::new(), last_popped: None }
  }

  pub fn len(&self) -> usize {
    self.heap.len()
  }

  pub fn is_empty(&self) -> bool {
    self.heap.is_empty()
  }

  /// Pushes `event`. If an event at the same point with the same kind was
  /// already pushed, this is a no-op. If an event at the same point but a
  /// *different* kind was already pushed, the two coincide and cannot both
  /// be honored: this is a fatal error.
  pub fn push(&mut self, event: Event) -> Result<(), Error> {
    match self.seen.get(&event.point) {
      Some(existing) if *existing == event.kind => Ok(()),
      Some(_) => Err(Error::CoincidentEvents),
      None => {
        self.seen.insert(event.point.clone(), event.kind);
        self.heap.push(event);
        Ok(())
      }
    }
  }

  /// Pops the next event in sweep order. Fails on an empty queue.
  pub fn pop(&mut self) -> Result<Event, Error> {
    let event = self.heap.pop().ok_or(Error::EmptyQueue)?;
    if let Some(last) = &self.last_popped {
      debug_assert!(
        last.cmp_y(&event.point) == Ordering::Greater
          || (last.cmp_y(&event.point) == Ordering::Equal && last.cmp_x(&event.point) != Ordering::Greater),
        "sweep events must be popped in non-decreasing sweep order"
      );
    }
    self.last_popped = Some(event.point.clone());
    Ok(event)
  }
}

impl Default for EventQueue {
  fn default() -> Self {
    EventQueue::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::point::Point;

  fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
  }

  #[test]
  fn pops_in_decreasing_y_then_increasing_x() {
    let mut q = EventQueue::new();
    q.push(Event { point: p(0, 0), kind: EventKind::Insert(SegmentId(0)) }).unwrap();
    q.push(Event { point: p(1, 5), kind: EventKind::Insert(SegmentId(1)) }).unwrap();
    q.push(Event { point: p(-1, 5), kind: EventKind::Insert(SegmentId(2)) }).unwrap();
    assert_eq!(q.pop().unwrap().point, p(-1, 5));
    assert_eq!(q.pop().unwrap().point, p(1, 5));
    assert_eq!(q.pop().unwrap().point, p(0, 0));
    assert_eq!(q.pop(), Err(Error::EmptyQueue));
  }

  #[test]
  fn repushing_the_same_event_is_a_no_op() {
    let mut q = EventQueue::new();
    let e = Event { point: p(0, 0), kind: EventKind::Insert(SegmentId(0)) };
    q.push(e.clone()).unwrap();
    q.push(e).unwrap();
    assert_eq!(q.len(), 1);
  }

  #[test]
  fn distinct_events_at_the_same_point_are_fatal() {
    let mut q = EventQueue::new();
    q.push(Event { point: p(0, 0), kind: EventKind::Insert(SegmentId(0)) }).unwrap();
    let result = q.push(Event { point: p(0, 0), kind: EventKind::Delete(SegmentId(1)) });
    assert_eq!(result, Err(Error::CoincidentEvents));
  }
}
