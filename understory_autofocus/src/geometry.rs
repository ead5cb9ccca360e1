// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shadow geometry and proximity scoring.
//!
//! A reference rectangle casts a *shadow* in the direction of travel: the
//! band spanned by its perpendicular extent, extended infinitely along the
//! direction. A candidate is a legal target only if it
//!
//! 1. advances past the reference's leading edge in that direction, and
//! 2. overlaps the shadow on the perpendicular axis.
//!
//! Legal candidates are ranked by [`Score`]: a larger share of the reference's
//! shadow and a shorter gap both raise the score. When a history band is
//! active, overlapping it adds a bonus large enough to dominate geometry.
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_autofocus::Direction;
//! use understory_autofocus::geometry::{ScoreWeights, score};
//!
//! let center = Rect::new(250.0, 250.0, 400.0, 400.0);
//! let above = Rect::new(250.0, 50.0, 400.0, 200.0);
//! let diagonal = Rect::new(450.0, 50.0, 600.0, 200.0);
//!
//! let weights = ScoreWeights::default();
//! assert!(score(center, above, Direction::Up, None, &weights).is_some());
//! // Outside the shadow: never a candidate.
//! assert!(score(center, diagonal, Direction::Up, None, &weights).is_none());
//! ```

use core::cmp::Ordering;

use kurbo::Rect;

use crate::direction::{Axis, Direction};

/// Weights used by [`score`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreWeights {
    /// Gap (in coordinate units) at which the distance term halves.
    ///
    /// Smaller values make distance matter more relative to shadow overlap.
    pub distance_scale: f64,
    /// Bonus per unit of history-band overlap.
    ///
    /// Must exceed the largest geometric term (2.0) for history to win ties
    /// against geometrically better candidates.
    pub history_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance_scale: 100.0,
            history_weight: 1000.0,
        }
    }
}

/// A closed interval on the axis perpendicular to a move.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Band {
    /// Create a band; bounds are reordered if needed.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The perpendicular span of `rect` for moves along `axis`.
    pub fn across(rect: Rect, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::new(rect.y0, rect.y1),
            Axis::Vertical => Self::new(rect.x0, rect.x1),
        }
    }

    /// Length of the band.
    pub fn len(&self) -> f64 {
        self.max - self.min
    }

    /// Whether the band has no extent.
    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Length of the overlap with `other` (zero when disjoint).
    pub fn overlap(&self, other: &Self) -> f64 {
        (self.max.min(other.max) - self.min.max(other.min)).max(0.0)
    }

    /// Intersection with `other`, if non-empty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let b = Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        (!b.is_empty()).then_some(b)
    }

    /// Overlap measured against the shorter of the two bands.
    pub fn overlap_ratio(&self, other: &Self) -> f64 {
        let short = self.len().min(other.len());
        if short <= 0.0 {
            return 0.0;
        }
        self.overlap(other) / short
    }
}

/// Result of scoring one candidate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Score {
    /// Higher is better.
    pub value: f64,
    /// Squared distance between the reference and candidate centers; lower wins ties.
    pub center_distance_sq: f64,
}

impl Score {
    /// Whether `self` should replace `other` as the best candidate.
    ///
    /// Exact ties keep `other`, so earlier candidates (document order) win.
    pub fn beats(&self, other: &Self) -> bool {
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) | None => false,
            Some(Ordering::Equal) => self.center_distance_sq < other.center_distance_sq,
        }
    }
}

/// Whether a rectangle has no area (or non-finite coordinates).
pub fn is_degenerate(rect: Rect) -> bool {
    !(rect.is_finite() && rect.width() > 0.0 && rect.height() > 0.0)
}

/// Whether `candidate`'s leading edge advances past `reference`'s in `direction`.
pub fn advances(reference: Rect, candidate: Rect, direction: Direction) -> bool {
    match direction {
        Direction::Left => candidate.x0 < reference.x0,
        Direction::Right => candidate.x1 > reference.x1,
        Direction::Up => candidate.y0 < reference.y0,
        Direction::Down => candidate.y1 > reference.y1,
    }
}

/// Distance to travel from `reference`'s leading edge to `candidate`'s facing edge.
///
/// Overlapping rectangles have a gap of zero.
pub fn primary_gap(reference: Rect, candidate: Rect, direction: Direction) -> f64 {
    let gap = match direction {
        Direction::Left => reference.x0 - candidate.x1,
        Direction::Right => candidate.x0 - reference.x1,
        Direction::Up => reference.y0 - candidate.y1,
        Direction::Down => candidate.y0 - reference.y1,
    };
    gap.max(0.0)
}

/// Fraction of `reference`'s shadow occupied by `candidate`, in `[0, 1]`.
///
/// A zero-width reference (a line or point) counts as fully covered when its
/// position lies within the candidate's span.
pub fn shadow_fraction(reference: Rect, candidate: Rect, direction: Direction) -> f64 {
    let axis = direction.axis();
    let shadow = Band::across(reference, axis);
    let span = Band::across(candidate, axis);
    if shadow.is_empty() {
        return if span.min <= shadow.min && shadow.min <= span.max {
            1.0
        } else {
            0.0
        };
    }
    shadow.overlap(&span) / shadow.len()
}

/// Score `candidate` as a move target from `reference` in `direction`.
///
/// Returns `None` when the candidate is not a legal target: it is degenerate,
/// does not advance in `direction`, or misses the reference's shadow.
pub fn score(
    reference: Rect,
    candidate: Rect,
    direction: Direction,
    history: Option<Band>,
    weights: &ScoreWeights,
) -> Option<Score> {
    if is_degenerate(candidate) || !advances(reference, candidate, direction) {
        return None;
    }
    let fraction = shadow_fraction(reference, candidate, direction);
    if fraction <= 0.0 {
        return None;
    }
    let gap = primary_gap(reference, candidate, direction);
    let scale = weights.distance_scale.max(f64::EPSILON);
    let mut value = (1.0 + fraction) * scale / (scale + gap);
    if let Some(band) = history {
        value += band.overlap_ratio(&Band::across(candidate, direction.axis())) * weights.history_weight;
    }
    if !value.is_finite() {
        return None;
    }
    Some(Score {
        value,
        center_distance_sq: (candidate.center() - reference.center()).hypot2(),
    })
}

/// Ordering key for picking a starting candidate when nothing is focused.
///
/// Smaller keys sit closer to the edge a move in `direction` would enter
/// from: moving right starts at the left-most element, ties broken by the
/// top-most (and vice versa for vertical moves).
pub fn entry_key(candidate: Rect, direction: Direction) -> (f64, f64) {
    match direction {
        Direction::Right => (candidate.x0, candidate.y0),
        Direction::Left => (-candidate.x1, candidate.y0),
        Direction::Down => (candidate.y0, candidate.x0),
        Direction::Up => (-candidate.y1, candidate.x0),
    }
}
