//! The doubly-connected edge list: vertex/edge/half-edge/face records, face
//! identification (`set_faces`), cross-DCEL face annotation
//! (`annotate_faces`), and the overlay operator's local topological
//! repairs.
//!
//! Every record lives in an [`Arena`] and refers to others by small integer
//! id, per the "arenas + indices" idiom used throughout this crate. A
//! single primitive, [`Dcel::rewire_vertex`], rebuilds the clockwise
//! rotation of outgoing half-edges at a vertex and is reused for both
//! initial construction and every overlay repair case, rather than each
//! case hand-rolling its own next/prev patch.

use crate::array::Orientation;
use crate::data::line_segment::{Line, Segment};
use crate::data::point::{ccw, cw_cmp_around, orient, Point};
use crate::intersection::Intersects;
use crate::utils::{Arena, ArenaIndex};
use crate::Error;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId(ArenaIndex);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(ArenaIndex);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfEdgeId(ArenaIndex);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(ArenaIndex);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(ArenaIndex);

/// Identifies a particular [`Dcel`] instance, so that a [`Face`]'s overlay
/// annotation map can key on "which source DCEL" without relying on object
/// identity (which Rust, unlike the reference implementation's host
/// language, has no hash for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DcelId(usize);

static NEXT_DCEL_ID: AtomicUsize = AtomicUsize::new(0);

fn fresh_dcel_id() -> DcelId {
  DcelId(NEXT_DCEL_ID.fetch_add(1, AtomicOrd::Relaxed))
}

#[derive(Debug, Clone)]
struct VertexRec {
  point: Point,
  half_edge: Option<HalfEdgeId>,
}

#[derive(Debug, Clone, Copy)]
struct EdgeRec {
  h1: HalfEdgeId,
  h2: HalfEdgeId,
}

#[derive(Debug, Clone, Copy)]
struct HalfEdgeRec {
  origin: VertexId,
  edge: EdgeId,
  twin: HalfEdgeId,
  next: Option<HalfEdgeId>,
  prev: Option<HalfEdgeId>,
  cycle: Option<CycleId>,
}

#[derive(Debug, Clone)]
struct CycleRec {
  half_edges: Vec<HalfEdgeId>,
  leftmost: HalfEdgeId,
  is_outer: bool,
  parent: Option<CycleId>,
  face: Option<FaceId>,
}

#[derive(Debug, Clone)]
pub struct Face {
  pub outer: Option<CycleId>,
  pub inners: Vec<CycleId>,
  overlay_data: HashMap<DcelId, FaceId>,
}

impl Face {
  /// The face of `source` that this face's overlay annotation maps to, if
  /// `annotate_faces(source)` has been run.
  pub fn overlay_face_in(&self, source: &Dcel) -> Option<FaceId> {
    self.overlay_data.get(&source.id).copied()
  }
}

/// A doubly-connected edge list over one planar subdivision.
#[derive(Debug, Clone)]
pub struct Dcel {
  id: DcelId,
  vertices: Arena<VertexRec>,
  edges: Arena<EdgeRec>,
  half_edges: Arena<HalfEdgeRec>,
  cycles: Arena<CycleRec>,
  faces: Arena<Face>,
  infinite_face: Option<FaceId>,
}

impl Dcel {
  fn empty() -> Dcel {
    Dcel {
      id: fresh_dcel_id(),
      vertices: Arena::new(),
      edges: Arena::new(),
      half_edges: Arena::new(),
      cycles: Arena::new(),
      faces: Arena::new(),
      infinite_face: None,
    }
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }

  pub fn face_count(&self) -> usize {
    self.faces.len()
  }

  pub fn infinite_face(&self) -> Option<FaceId> {
    self.infinite_face
  }

  pub fn face(&self, id: FaceId) -> &Face {
    &self.faces[id.0]
  }

  pub fn point(&self, v: VertexId) -> &Point {
    &self.vertices[v.0].point
  }

  pub fn origin(&self, h: HalfEdgeId) -> VertexId {
    self.half_edges[h.0].origin
  }

  pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
    self.half_edges[h.0].twin
  }

  pub fn next(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
    self.half_edges[h.0].next
  }

  pub fn prev(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
    self.half_edges[h.0].prev
  }

  pub fn face_of(&self, h: HalfEdgeId) -> Option<FaceId> {
    self.cycles[self.half_edges[h.0].cycle?.0].face
  }

  fn cycle_of(&self, h: HalfEdgeId) -> CycleId {
    self.half_edges[h.0].cycle.expect("half-edge has no cycle; call set_faces first")
  }

  fn target(&self, h: HalfEdgeId) -> VertexId {
    self.origin(self.twin(h))
  }

  fn edge_segment(&self, e: EdgeId) -> Segment {
    let rec = self.edges[e.0];
    Segment::new(self.point(self.origin(rec.h1)).clone(), self.point(self.origin(rec.h2)).clone())
  }

  /// A point strictly between two points this crate extracts coordinates
  /// from is never needed; this is the "leftmost wins" tie-break used for
  /// boundary-cycle leftmost half-edges: smallest x, then largest y.
  fn more_leftmost(&self, a: &Point, b: &Point) -> bool {
    match a.cmp_x(b) {
      Ordering::Less => true,
      Ordering::Greater => false,
      Ordering::Equal => a.cmp_y(b) == Ordering::Greater,
    }
  }

  /// Walks the clockwise rotation of half-edges leaving `v`, starting from
  /// its stored outgoing half-edge. Requires a fully-wired DCEL (valid
  /// `next` pointers); used to recover a vertex's current fan before a
  /// local overlay repair changes it.
  fn outgoing_half_edges(&self, v: VertexId) -> Vec<HalfEdgeId> {
    let start = match self.vertices[v.0].half_edge {
      Some(h) => h,
      None => return Vec::new(),
    };
    let mut out = vec![start];
    let mut cur = self.half_edges[self.twin(start).0].next.expect("wired DCEL");
    while cur != start {
      out.push(cur);
      cur = self.half_edges[self.twin(cur).0].next.expect("wired DCEL");
    }
    out
  }

  /// Clockwise-sorts `outgoing` (half-edges whose origin is `v`) by the
  /// direction each departs towards, then rewires `next`/`prev` so that for
  /// consecutive entries `cur`, `nxt`: `cur.twin.next = nxt` and
  /// `nxt.prev = cur.twin`. This is the one operation construction and
  /// every overlay repair case reduce to.
  fn rewire_vertex(&mut self, v: VertexId, mut outgoing: Vec<HalfEdgeId>) {
    let origin = self.point(v).clone();
    outgoing.sort_by(|&a, &b| {
      let pa = self.point(self.target(a)).clone();
      let pb = self.point(self.target(b)).clone();
      cw_cmp_around(&origin, &pa, &pb)
    });
    let n = outgoing.len();
    for i in 0..n {
      let cur = outgoing[i];
      let nxt = outgoing[(i + 1) % n];
      let cur_twin = self.twin(cur);
      self.half_edges[cur_twin.0].next = Some(nxt);
      self.half_edges[nxt.0].prev = Some(cur_twin);
    }
    self.vertices[v.0].half_edge = outgoing.first().copied();
  }

  fn new_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
    let h1 = self.half_edges.push(HalfEdgeRec { origin: a, edge: EdgeId(0), twin: HalfEdgeId(0), next: None, prev: None, cycle: None });
    let h2 = self.half_edges.push(HalfEdgeRec { origin: b, edge: EdgeId(0), twin: HalfEdgeId(0), next: None, prev: None, cycle: None });
    let (h1, h2) = (HalfEdgeId(h1), HalfEdgeId(h2));
    self.half_edges[h1.0].twin = h2;
    self.half_edges[h2.0].twin = h1;
    let eid = EdgeId(self.edges.push(EdgeRec { h1, h2 }));
    self.half_edges[h1.0].edge = eid;
    self.half_edges[h2.0].edge = eid;
    eid
  }

  fn remove_edge(&mut self, e: EdgeId) {
    let rec = self.edges.remove(e.0);
    self.half_edges.remove(rec.h1.0);
    self.half_edges.remove(rec.h2.0);
  }

  /// Builds a DCEL from a set of points and a set of segments (given as
  /// index pairs into `points`), which must already form a planar
  /// embedding (no crossings): overlay's coincidence handling is performed
  /// separately.
  pub fn from_points_and_segments(points: Vec<Point>, segments: &[(usize, usize)]) -> Result<Dcel, Error> {
    let mut dcel = Dcel::empty();
    for p in points {
      dcel.vertices.push(VertexRec { point: p, half_edge: None });
    }
    let mut outgoing: HashMap<VertexId, Vec<HalfEdgeId>> = HashMap::new();
    for &(a, b) in segments {
      let (va, vb) = (VertexId(a), VertexId(b));
      let eid = dcel.new_edge(va, vb);
      let rec = dcel.edges[eid.0];
      outgoing.entry(va).or_default().push(rec.h1);
      outgoing.entry(vb).or_default().push(rec.h2);
    }
    for (v, outs) in outgoing {
      dcel.rewire_vertex(v, outs);
    }
    dcel.set_faces()?;
    let self_id = dcel.id;
    dcel.annotate_faces_against_id(self_id);
    dcel.verify()?;
    Ok(dcel)
  }

  /// A face maps to itself after self-annotation; this avoids borrowing
  /// `&self` and `&mut self` simultaneously inside [`Dcel::annotate_faces`].
  fn annotate_faces_against_id(&mut self, id: DcelId) {
    let faces: Vec<FaceId> = self.faces.indices().map(FaceId).collect();
    for f in faces {
      self.faces[f.0].overlay_data.insert(id, f);
    }
  }

  /// Deep-copies this DCEL by re-extracting its points and segments and
  /// reconstructing from scratch, so the copy shares no records with the
  /// original.
  pub fn copy(&self) -> Result<Dcel, Error> {
    let mut ordered: Vec<(VertexId, Point)> = self.vertices.iter().map(|(i, rec)| (VertexId(i), rec.point.clone())).collect();
    ordered.sort_by_key(|(v, _)| v.0);
    let mut point_index: HashMap<VertexId, usize> = HashMap::new();
    let mut points = Vec::with_capacity(ordered.len());
    for (new_idx, (v, p)) in ordered.into_iter().enumerate() {
      point_index.insert(v, new_idx);
      points.push(p);
    }
    let segments: Vec<(usize, usize)> = self
      .edges
      .values()
      .map(|e| (point_index[&self.origin(e.h1)], point_index[&self.origin(e.h2)]))
      .collect();
    Dcel::from_points_and_segments(points, &segments)
  }

  /// Checks the invariants listed for a well-formed DCEL: twin/next/prev
  /// reciprocity, vertex/edge membership, and clockwise rotation ordering.
  pub fn verify(&self) -> Result<(), Error> {
    for (idx, h) in self.half_edges.iter() {
      let h_id = HalfEdgeId(idx);
      if self.half_edges[self.twin(h_id).0].twin != h_id {
        return Err(Error::MalformedDcel("half-edge twin is not involutive"));
      }
      if let Some(n) = h.next {
        if self.half_edges[n.0].prev != Some(h_id) {
          return Err(Error::MalformedDcel("next.prev does not point back"));
        }
      } else {
        return Err(Error::MalformedDcel("half-edge has no next"));
      }
      if let Some(p) = h.prev {
        if self.half_edges[p.0].next != Some(h_id) {
          return Err(Error::MalformedDcel("prev.next does not point back"));
        }
      } else {
        return Err(Error::MalformedDcel("half-edge has no prev"));
      }
    }
    for (idx, v) in self.vertices.iter() {
      if let Some(h) = v.half_edge {
        if self.half_edges.get(h.0).is_none() || self.origin(h) != VertexId(idx) {
          return Err(Error::MalformedDcel("vertex's stored half-edge is inconsistent"));
        }
      }
    }
    for e in self.edges.values() {
      if self.half_edges.get(e.h1.0).is_none() || self.half_edges.get(e.h2.0).is_none() {
        return Err(Error::MalformedDcel("edge references a missing half-edge"));
      }
    }
    for (idx, _) in self.vertices.iter() {
      let v = VertexId(idx);
      let outs = self.outgoing_half_edges(v);
      for window in outs.windows(2) {
        let (a, b) = (window[0], window[1]);
        let origin = self.point(v);
        let pa = self.point(self.target(a));
        let pb = self.point(self.target(b));
        if cw_cmp_around(origin, pa, pb) == Ordering::Greater {
          return Err(Error::MalformedDcel("outgoing half-edges are not clockwise ordered"));
        }
      }
    }
    Ok(())
  }

  /// Identifies faces: walks every half-edge cycle, classifies each as
  /// outer (bounds a face from inside) or inner (a hole), determines hole
  /// nesting via leftward ray casting, and builds [`Face`] records.
  pub fn set_faces(&mut self) -> Result<(), Error> {
    for f in self.faces.indices().collect::<Vec<_>>() {
      self.faces.remove(f);
    }
    for c in self.cycles.indices().collect::<Vec<_>>() {
      self.cycles.remove(c);
    }
    for idx in self.half_edges.indices().collect::<Vec<_>>() {
      self.half_edges[idx].cycle = None;
    }

    let all_half_edges: Vec<HalfEdgeId> = self.half_edges.indices().map(HalfEdgeId).collect();
    let mut visited: HashSet<HalfEdgeId> = HashSet::new();
    let mut inner_cycles = Vec::new();
    let mut outer_cycles = Vec::new();

    for &start in &all_half_edges {
      if visited.contains(&start) {
        continue;
      }
      let mut members = Vec::new();
      let mut leftmost = start;
      let mut cur = start;
      loop {
        visited.insert(cur);
        members.push(cur);
        if self.more_leftmost(self.point(self.origin(cur)), self.point(self.origin(leftmost))) {
          leftmost = cur;
        }
        cur = self.half_edges[cur.0].next.expect("DCEL must be fully wired before set_faces");
        if cur == start {
          break;
        }
      }
      let cycle_id = CycleId(self.cycles.push(CycleRec { half_edges: members.clone(), leftmost, is_outer: false, parent: None, face: None }));
      for &h in &members {
        self.half_edges[h.0].cycle = Some(cycle_id);
      }
      let prev = self.half_edges[leftmost.0].prev.unwrap();
      let next = self.half_edges[leftmost.0].next.unwrap();
      let is_outer = ccw(self.point(self.origin(prev)), self.point(self.origin(leftmost)), self.point(self.origin(next)));
      self.cycles[cycle_id.0].is_outer = is_outer;
      if is_outer {
        outer_cycles.push(cycle_id);
      } else {
        inner_cycles.push(cycle_id);
      }
    }

    for &ic in &inner_cycles {
      let leftmost = self.cycles[ic.0].leftmost;
      let parent_half_edge = self.find_visible_half_edge(self.point(self.origin(leftmost)).clone())?;
      self.cycles[ic.0].parent = parent_half_edge.map(|h| self.cycle_of(h));
    }

    let mut groups: HashMap<Option<CycleId>, Vec<CycleId>> = HashMap::new();
    for &ic in &inner_cycles {
      let outer = self.resolve_outer(ic);
      groups.entry(outer).or_default().push(ic);
    }

    for &oc in &outer_cycles {
      let inners = groups.remove(&Some(oc)).unwrap_or_default();
      self.build_face(Some(oc), inners, false)?;
    }
    let infinite_inners = groups.remove(&None).unwrap_or_default();
    self.build_face(None, infinite_inners, true)?;
    Ok(())
  }

  fn build_face(&mut self, outer: Option<CycleId>, inners: Vec<CycleId>, is_infinite: bool) -> Result<(), Error> {
    let fid = FaceId(self.faces.push(Face { outer, inners: inners.clone(), overlay_data: HashMap::new() }));
    let mut cycles_in_face = inners;
    if let Some(oc) = outer {
      cycles_in_face.push(oc);
    }
    for c in cycles_in_face {
      self.cycles[c.0].face = Some(fid);
    }
    if is_infinite {
      self.infinite_face = Some(fid);
    }
    Ok(())
  }

  fn resolve_outer(&self, mut c: CycleId) -> Option<CycleId> {
    loop {
      let rec = &self.cycles[c.0];
      if rec.is_outer {
        return Some(c);
      }
      match rec.parent {
        Some(p) => c = p,
        None => return None,
      }
    }
  }

  /// Finds the edge incident to this DCEL that a leftward horizontal ray
  /// from `origin` hits first, and returns whichever of its two half-edges
  /// lies above the ray (so that the region just left of `origin` belongs
  /// to that half-edge's eventual face).
  fn find_visible_half_edge(&self, origin: Point) -> Result<Option<HalfEdgeId>, Error> {
    let ray_far = Point::new_homogeneous(&origin.x - &origin.w, origin.y.clone(), origin.w.clone());
    let ray = Line::new(origin.clone(), ray_far);
    let mut best: Option<(Point, EdgeId)> = None;
    for (idx, _) in self.edges.iter() {
      let eid = EdgeId(idx);
      let seg = self.edge_segment(eid);
      if seg.is_horizontal() {
        continue;
      }
      if seg.p1 == origin || seg.p2 == origin {
        continue;
      }
      if let Some(q) = seg.intersect_line(&ray) {
        if q.cmp_x(&origin) == Ordering::Less {
          let better = match &best {
            None => true,
            Some((bq, _)) => q.cmp_x(bq) == Ordering::Greater,
          };
          if better {
            best = Some((q, eid));
          }
        }
      }
    }
    let (q, eid) = match best {
      None => return Ok(None),
      Some(x) => x,
    };
    let rec = self.edges[eid.0];
    let (mut h1, mut h2) = (rec.h1, rec.h2);
    if self.point(self.origin(h1)) == &q {
      std::mem::swap(&mut h1, &mut h2);
    }
    match orient(&origin, &q, self.point(self.origin(h1))) {
      Orientation::ClockWise => Ok(Some(h1)),
      Orientation::CounterClockWise => Ok(Some(h2)),
      Orientation::CoLinear => Err(Error::ImpossibleOrientation),
    }
  }

  /// Determines, for every face of `self`, which face of `source` contains
  /// it, recording the result in each face's overlay-annotation map.
  pub fn annotate_faces(&mut self, source: &Dcel) -> Result<(), Error> {
    let face_ids: Vec<FaceId> = self.faces.indices().map(FaceId).collect();
    for fid in face_ids {
      let target = self.annotate_one_face(fid, source)?;
      self.faces[fid.0].overlay_data.insert(source.id, target);
    }
    Ok(())
  }

  fn annotate_one_face(&self, fid: FaceId, source: &Dcel) -> Result<FaceId, Error> {
    let outer = match self.faces[fid.0].outer {
      None => return Ok(source.infinite_face.expect("source DCEL has no infinite face")),
      Some(oc) => oc,
    };
    let leftmost = self.cycles[outer.0].leftmost;
    let l_origin = self.point(self.origin(leftmost)).clone();
    let l_terminus = self.point(self.target(leftmost)).clone();

    // Case 1: some half-edge of `source` contains leftmost as a
    // segment-prefix (same or collinear-in-order origin and terminus).
    for (idx, _) in source.half_edges.iter() {
      let h = HalfEdgeId(idx);
      let h_origin = source.point(source.origin(h));
      let h_terminus = source.point(source.target(h));
      let origin_ok = *h_origin == l_origin || crate::data::point::collinear_in_order(h_origin, &l_origin, &l_terminus);
      let terminus_ok = *h_terminus == l_terminus || crate::data::point::collinear_in_order(&l_origin, &l_terminus, h_terminus);
      if origin_ok && terminus_ok {
        return Ok(source.cycles[source.cycle_of(h).0].face.expect("set_faces must run before annotate_faces"));
      }
    }

    // Case 2: an other-half-edge's origin coincides with leftmost's origin
    // and leftmost departs into that half-edge's interior side.
    let adjacent: Vec<HalfEdgeId> = source
      .half_edges
      .indices()
      .map(HalfEdgeId)
      .filter(|&h| *source.point(source.origin(h)) == l_origin)
      .collect();
    for &h in &adjacent {
      let h_terminus = source.point(source.target(h)).clone();
      if !crate::data::point::cw(&l_origin, &h_terminus, &l_terminus) {
        return Ok(source.cycles[source.cycle_of(h).0].face.expect("set_faces must run before annotate_faces"));
      }
    }

    // Case 3: leftmost's origin coincides with some other-half-edge's
    // origin, but none aligned with it directionally; splice it into the
    // clockwise rotation and take the half-edge that would follow it.
    if !adjacent.is_empty() {
      let mut entries: Vec<(Point, Option<HalfEdgeId>)> =
        adjacent.iter().map(|&h| (source.point(source.target(h)).clone(), Some(h))).collect();
      entries.push((l_terminus.clone(), None));
      entries.sort_by(|a, b| cw_cmp_around(&l_origin, &a.0, &b.0));
      let pos = entries.iter().position(|(_, h)| h.is_none()).unwrap();
      let next = &entries[(pos + 1) % entries.len()];
      let next_h = next.1.expect("at least one adjacent half-edge besides leftmost");
      return Ok(source.cycles[source.cycle_of(next_h).0].face.expect("set_faces must run before annotate_faces"));
    }

    // Case 4: cast the leftward ray and take the nearest visible edge.
    match source.find_visible_half_edge(l_origin)? {
      Some(h) => Ok(source.cycles[source.cycle_of(h).0].face.expect("set_faces must run before annotate_faces")),
      None => Ok(source.infinite_face.expect("source DCEL has no infinite face")),
    }
  }

  /// Collects the intersection points between edges of `a` and edges of
  /// `b`, deduplicated. Used as the (naive, O(|a|·|b|)) intersection
  /// enumerator for [`Dcel::overlay`].
  fn naive_overlay_intersect(a: &Dcel, b: &Dcel) -> Vec<Point> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for ea in a.edges.values() {
      let sa = Segment::new(a.point(a.origin(ea.h1)).clone(), a.point(a.origin(ea.h2)).clone());
      for eb in b.edges.values() {
        let sb = Segment::new(b.point(b.origin(eb.h1)).clone(), b.point(b.origin(eb.h2)).clone());
        if let Some(p) = sa.intersect(&sb) {
          if seen.insert(p.clone()) {
            out.push(p);
          }
        }
      }
    }
    out
  }

  /// Overlays `a` and `b` into a new DCEL whose edge set is the union of
  /// both, refined at every crossing, vertex-edge, and vertex-vertex
  /// coincidence into a proper planar subdivision. When `compute_faces` is
  /// set, faces are rebuilt and annotated against both originals.
  pub fn overlay(a: &Dcel, b: &Dcel, compute_faces: bool) -> Result<Dcel, Error> {
    let points = Self::naive_overlay_intersect(a, b);
    let mut merged = a.copy()?.union_with(b.copy()?);

    for p in points {
      let crossing: Vec<EdgeId> = merged
        .edges
        .iter()
        .map(|(idx, _)| EdgeId(idx))
        .filter(|&e| {
          let seg = merged.edge_segment(e);
          seg.p1 != p && seg.p2 != p && seg.contains_interior_point(&p)
        })
        .collect();
      let incident: Vec<EdgeId> = merged
        .edges
        .iter()
        .map(|(idx, _)| EdgeId(idx))
        .filter(|&e| {
          let seg = merged.edge_segment(e);
          seg.p1 == p || seg.p2 == p
        })
        .collect();

      match (crossing.len(), incident.len()) {
        (2, 0) => merged.repair_edge_edge(crossing[0], crossing[1], p.clone()),
        (1, n) if n >= 1 => {
          let v = merged.vertex_at(&p).expect("incident edge implies a vertex exists at p");
          merged.repair_vertex_edge(v, crossing[0]);
        }
        (0, n) if n >= 2 => {
          let mut vertices_at_p: Vec<VertexId> = incident
            .iter()
            .flat_map(|&e| {
              let rec = merged.edges[e.0];
              [merged.origin(rec.h1), merged.origin(rec.h2)]
            })
            .filter(|&v| *merged.point(v) == p)
            .collect();
          vertices_at_p.sort_by_key(|v| v.0);
          vertices_at_p.dedup();
          if vertices_at_p.len() >= 2 {
            merged.repair_vertex_vertex(vertices_at_p[0], vertices_at_p[1]);
          }
        }
        _ => {}
      }
    }

    if compute_faces {
      merged.set_faces()?;
      merged.annotate_faces(a)?;
      merged.annotate_faces(b)?;
    }
    Ok(merged)
  }

  fn vertex_at(&self, p: &Point) -> Option<VertexId> {
    self.vertices.iter().find(|(_, v)| v.point == *p).map(|(idx, _)| VertexId(idx))
  }

  /// Merges `other`'s records into `self` by index offset; used only as the
  /// first step of [`Dcel::overlay`], before any repair runs. Faces are
  /// dropped (they must be rebuilt).
  fn union_with(mut self, other: Dcel) -> Dcel {
    let mut vertex_map = HashMap::new();
    for (idx, rec) in other.vertices.iter() {
      let new_idx = self.vertices.push(VertexRec { point: rec.point.clone(), half_edge: None });
      vertex_map.insert(VertexId(idx), VertexId(new_idx));
    }
    let mut half_edge_map = HashMap::new();
    for (idx, _) in other.half_edges.iter() {
      let new_idx = self.half_edges.push(HalfEdgeRec {
        origin: VertexId(0),
        edge: EdgeId(0),
        twin: HalfEdgeId(0),
        next: None,
        prev: None,
        cycle: None,
      });
      half_edge_map.insert(HalfEdgeId(idx), HalfEdgeId(new_idx));
    }
    for (idx, rec) in other.half_edges.iter() {
      let new_id = half_edge_map[&HalfEdgeId(idx)];
      self.half_edges[new_id.0] = HalfEdgeRec {
        origin: vertex_map[&rec.origin],
        edge: EdgeId(0),
        twin: half_edge_map[&rec.twin],
        next: rec.next.map(|n| half_edge_map[&n]),
        prev: rec.prev.map(|p| half_edge_map[&p]),
        cycle: None,
      };
    }
    for e in other.edges.values() {
      let (h1, h2) = (half_edge_map[&e.h1], half_edge_map[&e.h2]);
      let new_eid = EdgeId(self.edges.push(EdgeRec { h1, h2 }));
      self.half_edges[h1.0].edge = new_eid;
      self.half_edges[h2.0].edge = new_eid;
    }
    for (idx, rec) in other.vertices.iter() {
      if let Some(h) = rec.half_edge {
        let new_v = vertex_map[&VertexId(idx)];
        self.vertices[new_v.0].half_edge = Some(half_edge_map[&h]);
      }
    }
    self.infinite_face = None;
    self
  }

  fn repair_edge_edge(&mut self, a: EdgeId, b: EdgeId, p: Point) {
    let a_rec = self.edges[a.0];
    let b_rec = self.edges[b.0];
    let (ap1, ap2) = (self.origin(a_rec.h1), self.origin(a_rec.h2));
    let (bp1, bp2) = (self.origin(b_rec.h1), self.origin(b_rec.h2));

    let outgoing_ap1 = self.outgoing_half_edges(ap1);
    let outgoing_ap2 = self.outgoing_half_edges(ap2);
    let outgoing_bp1 = self.outgoing_half_edges(bp1);
    let outgoing_bp2 = self.outgoing_half_edges(bp2);

    let v = VertexId(self.vertices.push(VertexRec { point: p, half_edge: None }));
    let a1 = self.new_edge(ap1, v);
    let a2 = self.new_edge(v, ap2);
    let b1 = self.new_edge(bp1, v);
    let b2 = self.new_edge(v, bp2);
    let (a1r, a2r, b1r, b2r) = (self.edges[a1.0], self.edges[a2.0], self.edges[b1.0], self.edges[b2.0]);

    self.remove_edge(a);
    self.remove_edge(b);

    self.rewire_vertex(ap1, replace(outgoing_ap1, a_rec.h1, a1r.h1));
    self.rewire_vertex(ap2, replace(outgoing_ap2, a_rec.h2, a2r.h2));
    self.rewire_vertex(bp1, replace(outgoing_bp1, b_rec.h1, b1r.h1));
    self.rewire_vertex(bp2, replace(outgoing_bp2, b_rec.h2, b2r.h2));
    self.rewire_vertex(v, vec![a1r.h2, a2r.h1, b1r.h2, b2r.h1]);
  }

  fn repair_vertex_edge(&mut self, v: VertexId, e: EdgeId) {
    let e_rec = self.edges[e.0];
    let (ep1, ep2) = (self.origin(e_rec.h1), self.origin(e_rec.h2));

    let outgoing_ep1 = self.outgoing_half_edges(ep1);
    let outgoing_ep2 = self.outgoing_half_edges(ep2);
    let outgoing_v = self.outgoing_half_edges(v);

    let e1 = self.new_edge(ep1, v);
    let e2 = self.new_edge(v, ep2);
    let (e1r, e2r) = (self.edges[e1.0], self.edges[e2.0]);

    self.remove_edge(e);

    self.rewire_vertex(ep1, replace(outgoing_ep1, e_rec.h1, e1r.h1));
    self.rewire_vertex(ep2, replace(outgoing_ep2, e_rec.h2, e2r.h2));
    let mut new_outgoing_v = outgoing_v;
    new_outgoing_v.push(e1r.h2);
    new_outgoing_v.push(e2r.h1);
    self.rewire_vertex(v, new_outgoing_v);
  }

  fn repair_vertex_vertex(&mut self, v1: VertexId, v2: VertexId) {
    let outgoing_v1 = self.outgoing_half_edges(v1);
    let outgoing_v2 = self.outgoing_half_edges(v2);
    for &h in &outgoing_v2 {
      self.half_edges[h.0].origin = v1;
    }
    let mut combined = outgoing_v1;
    combined.extend(outgoing_v2);
    self.rewire_vertex(v1, combined);
    self.vertices.remove(v2.0);
  }
}

fn replace(mut v: Vec<HalfEdgeId>, old: HalfEdgeId, new: HalfEdgeId) -> Vec<HalfEdgeId> {
  for x in v.iter_mut() {
    if *x == old {
      *x = new;
    }
  }
  v
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
  }

  fn rectangle() -> Dcel {
    let points = vec![p(0, 0), p(0, 2), p(2, 2), p(2, 0)];
    let segments = [(0, 1), (1, 2), (2, 3), (3, 0)];
    Dcel::from_points_and_segments(points, &segments).unwrap()
  }

  #[test]
  fn rectangle_has_two_faces() {
    let dcel = rectangle();
    assert_eq!(dcel.vertex_count(), 4);
    assert_eq!(dcel.edge_count(), 4);
    assert_eq!(dcel.face_count(), 2);
    dcel.verify().unwrap();
  }

  #[test]
  fn star_has_only_the_infinite_face() {
    let points = vec![p(1, 1), p(0, 1), p(2, 1), p(1, 0), p(1, 2)];
    let segments = [(0, 1), (0, 2), (0, 3), (0, 4)];
    let dcel = Dcel::from_points_and_segments(points, &segments).unwrap();
    assert_eq!(dcel.face_count(), 1);
    assert_eq!(dcel.face(dcel.infinite_face().unwrap()).outer, None);
    dcel.verify().unwrap();
  }

  #[test]
  fn euler_relation_holds_for_a_connected_rectangle() {
    let dcel = rectangle();
    let v = dcel.vertex_count() as i64;
    let e = dcel.edge_count() as i64;
    let f = dcel.face_count() as i64;
    assert_eq!(v - e + f, 1 + 1);
  }

  #[test]
  fn edge_edge_overlay_matches_the_documented_counts() {
    let a = Dcel::from_points_and_segments(
      vec![p(4, 0), p(6, 1), p(4, 4), p(3, 1)],
      &[(0, 1), (1, 2), (2, 3), (3, 0)],
    )
    .unwrap();
    let b = Dcel::from_points_and_segments(
      vec![p(2, 2), p(8, 3), p(6, 6), p(4, 5)],
      &[(0, 1), (1, 2), (2, 3), (3, 0)],
    )
    .unwrap();
    let overlay = Dcel::overlay(&a, &b, true).unwrap();
    overlay.verify().unwrap();
    assert_eq!(overlay.vertex_count(), 10);
    assert_eq!(overlay.edge_count(), 12);
    assert_eq!(overlay.face_count(), 4);
  }

  #[test]
  fn vertex_vertex_overlay_matches_the_documented_counts() {
    let a = Dcel::from_points_and_segments(vec![p(0, 0), p(4, 0), p(2, 4)], &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let b = Dcel::from_points_and_segments(vec![p(2, 4), p(0, 6), p(4, 6)], &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let overlay = Dcel::overlay(&a, &b, true).unwrap();
    overlay.verify().unwrap();
    assert_eq!(overlay.vertex_count(), 5);
    assert_eq!(overlay.edge_count(), 6);
    assert_eq!(overlay.face_count(), 3);
  }
}
