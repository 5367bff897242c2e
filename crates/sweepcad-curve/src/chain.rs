//! Linked segments: an arena with explicit previous/next links, and ordered
//! chains (open or closed) built on top of it.

use slotmap::{new_key_type, SlotMap};
use sweepcad_math::{PointN, Tolerance};

use crate::{EditError, Segment};

new_key_type! {
    /// Stable identifier of a segment inside a [`SegmentArena`].
    pub struct SegmentId;
}

/// A segment plus its links to neighbors.
#[derive(Debug, Clone)]
struct LinkedSegment<const D: usize> {
    segment: Segment<D>,
    previous: Option<SegmentId>,
    next: Option<SegmentId>,
}

/// Arena of segments with bidirectional links.
///
/// Invariant: if `a.next == Some(b)` then `b.previous == Some(a)`, and, unless
/// a link was made with `sync = false`, `a.end() == b.start()` within
/// [`Tolerance::DEFAULT`].
#[derive(Debug, Clone)]
pub struct SegmentArena<const D: usize> {
    segments: SlotMap<SegmentId, LinkedSegment<D>>,
}

impl<const D: usize> Default for SegmentArena<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> SegmentArena<D> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            segments: SlotMap::with_key(),
        }
    }

    /// Add an unlinked segment.
    pub fn insert(&mut self, segment: Segment<D>) -> SegmentId {
        self.segments.insert(LinkedSegment {
            segment,
            previous: None,
            next: None,
        })
    }

    /// Remove a segment, detaching it from its neighbors.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment<D>> {
        let record = self.segments.remove(id)?;
        if let Some(prev) = record.previous.and_then(|p| self.segments.get_mut(p)) {
            if prev.next == Some(id) {
                prev.next = None;
            }
        }
        if let Some(next) = record.next.and_then(|n| self.segments.get_mut(n)) {
            if next.previous == Some(id) {
                next.previous = None;
            }
        }
        Some(record.segment)
    }

    /// Whether `id` refers to a live segment.
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains_key(id)
    }

    /// The segment stored under `id`.
    pub fn get(&self, id: SegmentId) -> Option<&Segment<D>> {
        self.segments.get(id).map(|r| &r.segment)
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment linked after `id`.
    pub fn next(&self, id: SegmentId) -> Option<SegmentId> {
        self.segments.get(id).and_then(|r| r.next)
    }

    /// The segment linked before `id`.
    pub fn previous(&self, id: SegmentId) -> Option<SegmentId> {
        self.segments.get(id).and_then(|r| r.previous)
    }

    fn record(&self, id: SegmentId) -> Result<&LinkedSegment<D>, EditError> {
        self.segments.get(id).ok_or(EditError::UnknownSegment)
    }

    fn record_mut(&mut self, id: SegmentId) -> Result<&mut LinkedSegment<D>, EditError> {
        self.segments.get_mut(id).ok_or(EditError::UnknownSegment)
    }

    /// Replace the geometry of `id` without touching links or neighbors.
    pub fn set_segment(&mut self, id: SegmentId, segment: Segment<D>) -> Result<(), EditError> {
        self.record_mut(id)?.segment = segment;
        Ok(())
    }

    /// Link `next` after `id` (or unlink with `None`).
    ///
    /// Former partners of both segments are unlinked so the reciprocal
    /// invariant holds. With `sync`, `next`'s start is moved onto `id`'s end.
    pub fn set_next(
        &mut self,
        id: SegmentId,
        next: Option<SegmentId>,
        sync: bool,
    ) -> Result<(), EditError> {
        let old_next = self.record(id)?.next;
        if let Some(n) = next {
            self.record(n)?;
        }
        if old_next == next {
            if let (Some(n), true) = (next, sync) {
                self.sync_shared_vertex(id, n, false)?;
            }
            return Ok(());
        }

        if let Some(old) = old_next.and_then(|o| self.segments.get_mut(o)) {
            old.previous = None;
        }
        self.record_mut(id)?.next = next;

        if let Some(n) = next {
            let old_prev = self.record(n)?.previous;
            if let Some(old) = old_prev
                .filter(|&p| p != id)
                .and_then(|p| self.segments.get_mut(p))
            {
                old.next = None;
            }
            self.record_mut(n)?.previous = Some(id);
            if sync {
                self.sync_shared_vertex(id, n, false)?;
            }
        }
        Ok(())
    }

    /// Link `previous` before `id` (or unlink with `None`).
    ///
    /// With `sync`, `previous`'s end is moved onto `id`'s start.
    pub fn set_previous(
        &mut self,
        id: SegmentId,
        previous: Option<SegmentId>,
        sync: bool,
    ) -> Result<(), EditError> {
        match previous {
            Some(p) => {
                self.set_next(p, Some(id), false)?;
                if sync {
                    self.sync_shared_vertex(p, id, true)?;
                }
                Ok(())
            }
            None => match self.record(id)?.previous {
                Some(p) => self.set_next(p, None, false),
                None => Ok(()),
            },
        }
    }

    /// Make `a.end()` and `b.start()` coincide, moving `b` (or `a` when
    /// `move_first`).
    fn sync_shared_vertex(
        &mut self,
        a: SegmentId,
        b: SegmentId,
        move_first: bool,
    ) -> Result<(), EditError> {
        if move_first {
            let p = self.record(b)?.segment.start();
            let rec = self.record_mut(a)?;
            rec.segment = rec.segment.with_end(p);
        } else {
            let p = self.record(a)?.segment.end();
            let rec = self.record_mut(b)?;
            rec.segment = rec.segment.with_start(p);
        }
        Ok(())
    }

    /// Move the start of `id` and the end of its linked predecessor.
    pub fn move_start(&mut self, id: SegmentId, p: PointN<D>) -> Result<(), EditError> {
        let rec = self.record_mut(id)?;
        rec.segment = rec.segment.with_start(p);
        if let Some(prev) = rec.previous {
            let rec = self.record_mut(prev)?;
            rec.segment = rec.segment.with_end(p);
        }
        Ok(())
    }

    /// Move the end of `id` and the start of its linked successor.
    pub fn move_end(&mut self, id: SegmentId, p: PointN<D>) -> Result<(), EditError> {
        let rec = self.record_mut(id)?;
        rec.segment = rec.segment.with_end(p);
        if let Some(next) = rec.next {
            let rec = self.record_mut(next)?;
            rec.segment = rec.segment.with_start(p);
        }
        Ok(())
    }

    /// `id` merged with its linked predecessor into one spanning segment.
    pub fn combine_previous(&self, id: SegmentId) -> Result<Segment<D>, EditError> {
        let rec = self.record(id)?;
        let prev = rec.previous.ok_or(EditError::NoPredecessor)?;
        Ok(rec.segment.combine_previous(&self.record(prev)?.segment))
    }

    /// Whether `a` links to `b` reciprocally with a shared vertex.
    pub fn is_linked(&self, a: SegmentId, b: SegmentId) -> bool {
        match (self.segments.get(a), self.segments.get(b)) {
            (Some(ra), Some(rb)) => {
                ra.next == Some(b)
                    && rb.previous == Some(a)
                    && Tolerance::DEFAULT.points_equal(&ra.segment.end(), &rb.segment.start())
            }
            _ => false,
        }
    }
}

/// An ordered chain of linked segments, open or closed.
///
/// The ordered id list is the source of truth: every structural edit updates
/// it and then rebuilds the links from it.
#[derive(Debug, Clone)]
pub struct Chain<const D: usize> {
    arena: SegmentArena<D>,
    order: Vec<SegmentId>,
    closed: bool,
}

impl<const D: usize> Chain<D> {
    /// Chain the segments in order. Each start is snapped onto the previous
    /// end, and with `closed` the first start onto the last end.
    pub fn new(segments: impl IntoIterator<Item = Segment<D>>, closed: bool) -> Self {
        let mut arena = SegmentArena::new();
        let order = segments.into_iter().map(|s| arena.insert(s)).collect();
        let mut chain = Self {
            arena,
            order,
            closed,
        };
        chain.relink();
        chain
    }

    /// Whether the last segment links back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the chain has no segments.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Segment ids in chain order.
    pub fn ids(&self) -> &[SegmentId] {
        &self.order
    }

    /// Segments in chain order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment<D>> + '_ {
        self.order.iter().filter_map(|&id| self.arena.get(id))
    }

    /// The segment stored under `id`.
    pub fn get(&self, id: SegmentId) -> Option<&Segment<D>> {
        self.arena.get(id)
    }

    /// The underlying arena, for link queries.
    pub fn arena(&self) -> &SegmentArena<D> {
        &self.arena
    }

    /// Position of `id` in the chain.
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.order.iter().position(|&s| s == id)
    }

    /// The segment after `id`.
    pub fn next(&self, id: SegmentId) -> Option<SegmentId> {
        self.arena.next(id)
    }

    /// The segment before `id`.
    pub fn previous(&self, id: SegmentId) -> Option<SegmentId> {
        self.arena.previous(id)
    }

    /// Rebuild all links from the ordered id list, syncing shared vertices.
    fn relink(&mut self) {
        // Ids in `order` are always live.
        for &id in &self.order {
            let linked = self.arena.set_next(id, None, false);
            debug_assert!(linked.is_ok(), "dead id {id:?} in chain order");
        }
        for pair in self.order.windows(2) {
            let linked = self.arena.set_next(pair[0], Some(pair[1]), true);
            debug_assert!(linked.is_ok(), "dead id in chain order");
        }
        if self.closed && self.order.len() > 1 {
            let (first, last) = (self.order[0], self.order[self.order.len() - 1]);
            let linked = self.arena.set_next(last, Some(first), true);
            debug_assert!(linked.is_ok(), "dead id in closed chain");
        }
    }

    /// Nearest segment to `point` and its distance.
    pub fn closest(&self, point: &PointN<D>) -> Option<(SegmentId, f64)> {
        self.order
            .iter()
            .filter_map(|&id| self.arena.get(id).map(|s| (id, s.distance(point))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Replace `id` by the two halves of splitting it at `point`.
    ///
    /// Returns `(first, second)`; `first` ends at `point`.
    pub fn split(
        &mut self,
        id: SegmentId,
        point: PointN<D>,
    ) -> Result<(SegmentId, SegmentId), EditError> {
        let index = self.index_of(id).ok_or(EditError::UnknownSegment)?;
        let segment = *self.arena.get(id).ok_or(EditError::UnknownSegment)?;
        let (a, b) = segment.split(point);
        self.arena.remove(id);
        let first = self.arena.insert(a);
        let second = self.arena.insert(b);
        self.order.splice(index..=index, [first, second]);
        self.relink();
        Ok((first, second))
    }

    /// Merge `id` into its predecessor, removing the vertex between them.
    ///
    /// Refuses when the chain would drop below `min_len` segments.
    pub fn merge_with_previous(
        &mut self,
        id: SegmentId,
        min_len: usize,
    ) -> Result<SegmentId, EditError> {
        let index = self.index_of(id).ok_or(EditError::UnknownSegment)?;
        if self.order.len() <= min_len {
            return Err(EditError::TooFewSegments {
                len: self.order.len(),
                min: min_len,
            });
        }
        let prev = self.arena.previous(id).ok_or(EditError::NoPredecessor)?;
        let prev_index = self.index_of(prev).ok_or(EditError::UnknownSegment)?;
        let merged = self.arena.combine_previous(id)?;

        self.arena.remove(id);
        self.arena.remove(prev);
        let merged_id = self.arena.insert(merged);
        if prev_index + 1 == index {
            self.order.splice(prev_index..=index, [merged_id]);
        } else {
            // Closed ring, deleting the first segment: its predecessor is last.
            self.order.remove(prev_index);
            self.order.remove(index);
            self.order.push(merged_id);
        }
        self.relink();
        Ok(merged_id)
    }

    /// Swap `old` for `segment`, keeping its place and connectivity.
    ///
    /// The new segment's endpoints are snapped onto the neighbors.
    pub fn replace(&mut self, old: SegmentId, segment: Segment<D>) -> Result<SegmentId, EditError> {
        let index = self.index_of(old).ok_or(EditError::UnknownSegment)?;
        let current = *self.arena.get(old).ok_or(EditError::UnknownSegment)?;
        let segment = segment.with_start(current.start()).with_end(current.end());
        self.arena.remove(old);
        let id = self.arena.insert(segment);
        self.order[index] = id;
        self.relink();
        Ok(id)
    }

    /// Move the vertex at the start of `id`, dragging the neighbor with it.
    pub fn move_vertex(&mut self, id: SegmentId, p: PointN<D>) -> Result<(), EditError> {
        self.index_of(id).ok_or(EditError::UnknownSegment)?;
        self.arena.move_start(id, p)
    }

    /// Whether every consecutive pair is reciprocally linked with a shared
    /// vertex.
    pub fn is_consistent(&self) -> bool {
        let n = self.order.len();
        let pairs = if self.closed { n } else { n.saturating_sub(1) };
        (0..pairs).all(|i| self.arena.is_linked(self.order[i], self.order[(i + 1) % n]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepcad_math::Point2;

    fn square() -> Chain<2> {
        let p = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        Chain::new((0..4).map(|i| Segment::straight(p[i], p[(i + 1) % 4])), true)
    }

    #[test]
    fn test_closed_chain_links_around() {
        let chain = square();
        assert_eq!(chain.len(), 4);
        assert!(chain.is_consistent());
        let ids = chain.ids();
        assert_eq!(chain.next(ids[3]), Some(ids[0]));
        assert_eq!(chain.previous(ids[0]), Some(ids[3]));
    }

    #[test]
    fn test_open_chain_has_loose_ends() {
        let segs = [
            Segment::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            Segment::straight(Point2::new(1.0, 0.0), Point2::new(2.0, 1.0)),
        ];
        let chain = Chain::new(segs, false);
        let ids = chain.ids();
        assert_eq!(chain.previous(ids[0]), None);
        assert_eq!(chain.next(ids[1]), None);
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_new_snaps_gaps() {
        let segs = [
            Segment::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            Segment::straight(Point2::new(1.5, 0.0), Point2::new(0.0, 0.0)),
        ];
        let chain = Chain::new(segs, true);
        assert_eq!(chain.segments().nth(1).unwrap().start(), Point2::new(1.0, 0.0));
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_set_next_sync_and_reciprocity() {
        let mut arena = SegmentArena::new();
        let a = arena.insert(Segment::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)));
        let b = arena.insert(Segment::straight(Point2::new(2.0, 0.0), Point2::new(3.0, 0.0)));
        let c = arena.insert(Segment::straight(Point2::new(5.0, 0.0), Point2::new(6.0, 0.0)));

        arena.set_next(a, Some(b), false).unwrap();
        assert_eq!(arena.previous(b), Some(a));
        assert!(!arena.is_linked(a, b));

        arena.set_next(a, Some(b), true).unwrap();
        assert!(arena.is_linked(a, b));

        // Relinking a to c detaches b.
        arena.set_next(a, Some(c), true).unwrap();
        assert_eq!(arena.previous(b), None);
        assert_eq!(arena.get(c).unwrap().start(), Point2::new(1.0, 0.0));

        // set_previous with sync moves the predecessor's end instead; b's start
        // was already snapped to (1, 0) by the first synced link.
        assert_eq!(arena.get(b).unwrap().start(), Point2::new(1.0, 0.0));
        arena.set_previous(b, Some(c), true).unwrap();
        assert_eq!(arena.get(c).unwrap().end(), Point2::new(1.0, 0.0));
        assert_eq!(arena.get(b).unwrap().start(), Point2::new(1.0, 0.0));
        assert!(arena.is_linked(c, b));

        arena.set_previous(b, None, false).unwrap();
        assert_eq!(arena.next(c), None);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut arena = SegmentArena::<2>::new();
        let a = arena.insert(Segment::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)));
        let gone = arena.insert(Segment::straight(Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)));
        arena.remove(gone);
        assert_eq!(arena.set_next(a, Some(gone), true), Err(EditError::UnknownSegment));
        assert_eq!(arena.combine_previous(a), Err(EditError::NoPredecessor));
    }

    #[test]
    fn test_move_vertex_drags_neighbor() {
        let mut chain = square();
        let ids = chain.ids().to_vec();
        chain.move_vertex(ids[0], Point2::new(-0.5, -0.5)).unwrap();
        assert_eq!(chain.get(ids[3]).unwrap().end(), Point2::new(-0.5, -0.5));
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_split_and_merge_round_trip() {
        let mut chain = square();
        let id = chain.ids()[1];
        let (first, second) = chain.split(id, Point2::new(1.0, 0.5)).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.get(first).unwrap().end(), Point2::new(1.0, 0.5));
        assert!(chain.is_consistent());

        let merged = chain.merge_with_previous(second, 2).unwrap();
        assert_eq!(chain.len(), 4);
        let seg = chain.get(merged).unwrap();
        assert_eq!(seg.start(), Point2::new(1.0, 0.0));
        assert_eq!(seg.end(), Point2::new(1.0, 1.0));
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_merge_first_segment_of_ring() {
        let mut chain = square();
        let first = chain.ids()[0];
        let merged = chain.merge_with_previous(first, 2).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(*chain.ids().last().unwrap(), merged);
        let seg = chain.get(merged).unwrap();
        assert_eq!(seg.start(), Point2::new(0.0, 1.0));
        assert_eq!(seg.end(), Point2::new(1.0, 0.0));
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_merge_respects_minimum() {
        let segs = [
            Segment::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            Segment::straight(Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)),
        ];
        let mut chain = Chain::new(segs, true);
        let id = chain.ids()[1];
        assert_eq!(
            chain.merge_with_previous(id, 2),
            Err(EditError::TooFewSegments { len: 2, min: 2 })
        );
    }

    #[test]
    fn test_replace_keeps_connectivity() {
        let mut chain = square();
        let old = chain.ids()[2];
        let arc = Segment::arc(
            Point2::new(9.0, 9.0),
            Point2::new(0.5, 1.5),
            Point2::new(8.0, 8.0),
        );
        let new_id = chain.replace(old, arc).unwrap();
        assert!(chain.get(old).is_none());
        let seg = chain.get(new_id).unwrap();
        assert_eq!(seg.start(), Point2::new(1.0, 1.0));
        assert_eq!(seg.end(), Point2::new(0.0, 1.0));
        assert!(chain.is_consistent());
        assert_eq!(chain.replace(old, arc), Err(EditError::UnknownSegment));
    }
}
