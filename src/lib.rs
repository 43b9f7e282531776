//! Exact-arithmetic planar subdivision overlay and segment-intersection
//! toolkit.
//!
//! Three layers build on each other:
//! - [`data::point`] and [`data::line_segment`]: homogeneous-coordinate
//!   points and the orientation/intersection predicates built on them, all
//!   exact (no floating point, no tolerances).
//! - [`algorithms::intersection`]: a Bentley-Ottmann sweep-line intersection
//!   finder (backed by [`data::avl`] and [`data::event_queue`]), plus an
//!   `O(n^2)` baseline to check it against.
//! - [`data::dcel`]: a doubly-connected edge list with face identification
//!   and a planar overlay operator that merges two subdivisions, repairing
//!   topology at every edge-edge, vertex-edge, and vertex-vertex coincidence.

#![doc(html_playground_url = "https://rgeometry.org/rgeometry-playground/")]

pub mod algorithms;
mod array;
pub mod data;
mod intersection;
mod utils;

pub use array::Orientation;
pub use data::{Dcel, Point, Segment};
pub use intersection::Intersects;

/// Every fallible operation in this crate returns one of these. Most
/// variants name a broken invariant rather than an expected runtime
/// condition: hitting one means the caller fed the algorithm a malformed or
/// degenerate input (duplicate keys, coincident events, non-general-position
/// segments) rather than that something went transiently wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// An [`data::avl::AvlTree`] insert found an equal key already present.
  DuplicateKey,
  /// An [`data::avl::AvlTree`] delete, search, or swap did not find the key.
  MissingKey,
  /// An [`data::avl::AvlTree::validate`] invariant failed; carries which one.
  MalformedTree(&'static str),
  /// Two distinct sweep events were scheduled at the same point.
  CoincidentEvents,
  /// [`data::event_queue::EventQueue::pop`] was called on an empty queue.
  EmptyQueue,
  /// A [`data::dcel::Dcel`] invariant failed; carries which one.
  MalformedDcel(&'static str),
  /// A ray cast against a [`data::dcel::Dcel`] grazed a vertex or ran along
  /// an edge instead of crossing it cleanly.
  ImpossibleOrientation,
}

#[cfg(test)]
mod tests;
