pub mod avl;
pub mod dcel;
pub mod event_queue;
pub mod line_segment;
pub mod point;

pub use avl::{AvlTree, Comparator};
pub use dcel::{CycleId, Dcel, EdgeId, Face, FaceId, HalfEdgeId, VertexId};
pub use event_queue::{Event, EventKind, EventQueue, SegmentId};
pub use line_segment::{IntersectionLocation, Line, Segment};
pub use point::Point;
