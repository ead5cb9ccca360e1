// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! History tracker: memory of the engine's own moves.
//!
//! Two pieces of state bias future resolution:
//!
//! - The **chain** of `(from, to, direction)` moves. A move back along the
//!   same axis from the last destination prefers the last source, so
//!   right-then-left returns to where focus started.
//! - The **band**: the perpendicular interval shared by consecutive moves on
//!   one axis. Candidates overlapping it score higher, which keeps a long run
//!   of moves in the same row or column.
//!
//! Both are dropped as soon as focus changes behind the engine's back.

use alloc::collections::VecDeque;

use kurbo::Rect;

use crate::direction::{Axis, Direction};
use crate::geometry::Band;

/// One recorded move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry<E> {
    /// Element focus moved away from.
    pub from: E,
    /// Element focus moved to.
    pub to: E,
    /// Direction of the move.
    pub direction: Direction,
}

/// Chain of recent engine moves plus the active history band.
#[derive(Clone, Debug)]
pub struct HistoryTracker<E> {
    chain: VecDeque<HistoryEntry<E>>,
    band: Option<(Axis, Band)>,
    last_target: Option<(E, Rect)>,
    capacity: usize,
}

impl<E: Copy + Eq> Default for HistoryTracker<E> {
    fn default() -> Self {
        Self::new(32)
    }
}

impl<E: Copy + Eq> HistoryTracker<E> {
    /// Create a tracker keeping at most `capacity` chain entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            chain: VecDeque::new(),
            band: None,
            last_target: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a completed move.
    ///
    /// `from_rect`/`to_rect` are the reference and target rectangles used by
    /// the resolution. Moves taken through an override clear the band, since
    /// they need not overlap the reference at all.
    pub fn record_move(
        &mut self,
        from: E,
        to: E,
        direction: Direction,
        from_rect: Rect,
        to_rect: Rect,
        via_override: bool,
    ) {
        if self.chain.len() == self.capacity {
            self.chain.pop_front();
        }
        self.chain.push_back(HistoryEntry { from, to, direction });
        self.last_target = Some((to, to_rect));

        if via_override {
            self.band = None;
            return;
        }
        let axis = direction.axis();
        let target = Band::across(to_rect, axis);
        let mut shared = target.intersect(&Band::across(from_rect, axis));
        if let (Some(s), Some((prev_axis, prev))) = (shared, self.band)
            && prev_axis == axis
        {
            shared = s.intersect(&prev);
        }
        self.band = Some((axis, shared.unwrap_or(target)));
    }

    /// Record that focus landed on `to` without a source inside this context
    /// (for example when entering a frame from its parent).
    pub fn record_entry(&mut self, to: E, to_rect: Rect) {
        self.reset();
        self.last_target = Some((to, to_rect));
    }

    /// Preferred return target for a move from `current` in `direction`.
    ///
    /// Yields the source of the most recent move when `direction` reverses it
    /// and `current` is that move's destination. Callers must still check the
    /// suggestion is a legal candidate.
    pub fn suggest_return(&self, current: E, direction: Direction) -> Option<E> {
        let last = self.chain.back()?;
        (last.to == current && last.direction == direction.opposite()).then_some(last.from)
    }

    /// History band for moves in `direction`, if one is active on its axis.
    pub fn band(&self, direction: Direction) -> Option<Band> {
        self.band
            .filter(|(axis, _)| *axis == direction.axis())
            .map(|(_, b)| b)
    }

    /// Drop history if focus moved since the engine's last move.
    ///
    /// Returns `true` if history was cleared. History is stale when the active
    /// element is not the last target, or the last target has moved
    /// (for example because the page scrolled).
    pub fn sync(&mut self, active: Option<E>, rect_of: impl FnOnce(E) -> Rect) -> bool {
        if self.last_target.is_none() || self.is_current(active, rect_of) {
            return false;
        }
        self.reset();
        true
    }

    /// Whether recorded history still describes the live focus.
    ///
    /// Empty history is never current.
    pub fn is_current(&self, active: Option<E>, rect_of: impl FnOnce(E) -> Rect) -> bool {
        self.last_target.is_some_and(|(last, cached)| {
            active == Some(last) && rect_of(last).origin() == cached.origin()
        })
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.chain.clear();
        self.band = None;
        self.last_target = None;
    }

    /// The element the engine last moved focus to.
    pub fn last_target(&self) -> Option<E> {
        self.last_target.map(|(e, _)| e)
    }

    /// Recorded moves, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<E>> + '_ {
        self.chain.iter()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
