// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation resolver: answers "which element should receive focus next".
//!
//! Resolution runs in a fixed order:
//!
//! 1. An override declared on the reference element wins, provided its target
//!    is focusable and inside the focus root.
//! 2. A history suggestion (the source of the move being reversed) wins if it
//!    is still a legal geometric candidate.
//! 3. Otherwise every focusable element under the root is scored and the best
//!    one is returned.
//!
//! With no reference at all (nothing focused and no reference rectangle), the
//! candidate nearest the edge the move enters from is chosen. A query with
//! [`Query::edge_fallback`] set makes the same choice when scoring finds
//! nothing, so a move entering a nested context always lands somewhere.

use kurbo::Rect;

use crate::direction::Direction;
use crate::geometry::{Score, ScoreWeights, entry_key, score};
use crate::history::HistoryTracker;
use crate::host::FocusHost;
use crate::overrides::resolve_override;
use crate::registry::{Candidate, enumerate, in_scope, is_focusable};

/// Per-call navigation options.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigateOptions<E> {
    /// Compute geometry from this element instead of the live focus.
    pub reference_element: Option<E>,
    /// Compute geometry from this rectangle instead of any element.
    ///
    /// Takes precedence over `reference_element` for geometry; the element
    /// still supplies overrides.
    pub reference_rect: Option<Rect>,
    /// Scope for this call only, replacing the engine's focus root.
    pub focus_root: Option<E>,
}

impl<E> Default for NavigateOptions<E> {
    fn default() -> Self {
        Self {
            reference_element: None,
            reference_rect: None,
            focus_root: None,
        }
    }
}

impl<E> NavigateOptions<E> {
    /// Options using `element` as the reference.
    pub fn from_element(element: E) -> Self {
        Self {
            reference_element: Some(element),
            ..Self::default()
        }
    }

    /// Options using `rect` as the reference.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            reference_rect: Some(rect),
            ..Self::default()
        }
    }

    /// Restrict this call to `root`.
    pub fn within(mut self, root: E) -> Self {
        self.focus_root = Some(root);
        self
    }

    /// Whether the caller supplied an explicit reference.
    pub fn has_reference(&self) -> bool {
        self.reference_element.is_some() || self.reference_rect.is_some()
    }
}

/// How a target was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolutionSource {
    /// An override declared on the reference element.
    Override,
    /// The history chain's return suggestion.
    History,
    /// Shadow scoring.
    Geometry,
    /// No reference existed, or nothing scored and the query asked for an
    /// edge fallback; the entry-edge candidate was taken.
    Entry,
}

/// A resolved navigation target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution<E> {
    /// Element that should receive focus.
    pub target: E,
    /// Its rectangle at resolution time.
    pub target_rect: Rect,
    /// Element the move starts from, if any.
    pub reference: Option<E>,
    /// Rectangle the move was computed from, if any.
    pub reference_rect: Option<Rect>,
    /// Which rule picked the target.
    pub source: ResolutionSource,
}

/// Everything one resolution needs.
#[derive(Clone, Debug)]
pub struct Query<'a, E> {
    /// Direction of travel.
    pub direction: Direction,
    /// Element the move starts from.
    pub reference_element: Option<E>,
    /// Rectangle the move starts from; defaults to the reference element's.
    pub reference_rect: Option<Rect>,
    /// Scope; `None` is the whole document.
    pub focus_root: Option<E>,
    /// An element that is never a candidate (besides the reference itself).
    pub exclude: Option<E>,
    /// History to consult, if it is still valid.
    pub history: Option<&'a HistoryTracker<E>>,
    /// Scoring weights.
    pub weights: ScoreWeights,
    /// Take the entry-edge candidate when nothing scores.
    pub edge_fallback: bool,
}

impl<E> Query<'_, E> {
    /// A query with default weights and no history.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            reference_element: None,
            reference_rect: None,
            focus_root: None,
            exclude: None,
            history: None,
            weights: ScoreWeights::default(),
            edge_fallback: false,
        }
    }
}

/// Resolve the next focus target for `query`.
pub fn find_next<H: FocusHost>(
    host: &H,
    query: &Query<'_, H::Element>,
) -> Option<Resolution<H::Element>> {
    let direction = query.direction;
    let root = query.focus_root;
    let reference = query.reference_element;
    let reference_rect = query
        .reference_rect
        .or_else(|| reference.map(|e| host.bounding_rect(e)));

    if let Some(from) = reference
        && let Some(target) = resolve_override(host, from, direction)
    {
        if target != from && is_focusable(host, target) && in_scope(host, root, target) {
            tracing::debug!(?from, ?target, %direction, "override target chosen");
            return Some(Resolution {
                target,
                target_rect: host.bounding_rect(target),
                reference,
                reference_rect,
                source: ResolutionSource::Override,
            });
        }
        tracing::debug!(?target, "override target not focusable or out of scope");
    }

    let mut candidates = enumerate(host, root, reference);
    candidates.retain(|c| Some(c.element) != query.exclude);

    let Some(ref_rect) = reference_rect else {
        tracing::debug!(%direction, "no reference, entering at edge");
        return enter_at_edge(&candidates, direction);
    };

    let band = query.history.and_then(|h| h.band(direction));
    let suggested = query
        .history
        .zip(reference)
        .and_then(|(h, from)| h.suggest_return(from, direction));

    let mut best: Option<(&Candidate<H::Element>, Score)> = None;
    for candidate in &candidates {
        let Some(s) = score(ref_rect, candidate.rect, direction, band, &query.weights) else {
            continue;
        };
        tracing::trace!(element = ?candidate.element, value = s.value, "scored candidate");
        if Some(candidate.element) == suggested {
            tracing::debug!(target = ?candidate.element, %direction, "returning along history");
            return Some(Resolution {
                target: candidate.element,
                target_rect: candidate.rect,
                reference,
                reference_rect,
                source: ResolutionSource::History,
            });
        }
        if best.as_ref().is_none_or(|(_, b)| s.beats(b)) {
            best = Some((candidate, s));
        }
    }

    match best {
        Some((winner, _)) => Some(Resolution {
            target: winner.element,
            target_rect: winner.rect,
            reference,
            reference_rect,
            source: ResolutionSource::Geometry,
        }),
        None if query.edge_fallback => {
            tracing::debug!(%direction, "nothing in the shadow, entering at edge");
            enter_at_edge(&candidates, direction)
        }
        None => None,
    }
}

fn enter_at_edge<E: Copy>(candidates: &[Candidate<E>], direction: Direction) -> Option<Resolution<E>> {
    let first = candidates.iter().min_by(|a, b| {
        entry_key(a.rect, direction)
            .partial_cmp(&entry_key(b.rect, direction))
            .unwrap_or(core::cmp::Ordering::Equal)
    })?;
    Some(Resolution {
        target: first.element,
        target_rect: first.rect,
        reference: None,
        reference_rect: None,
        source: ResolutionSource::Entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OverrideMap;
    use crate::scene::{ElementId, Scene, SceneNode};

    fn cross(scene: &mut Scene, parent: Option<ElementId>) -> [ElementId; 5] {
        [(250.0, 50.0), (50.0, 250.0), (250.0, 250.0), (450.0, 250.0), (250.0, 450.0)].map(
            |(x, y)| scene.insert(parent, SceneNode::button(Rect::new(x, y, x + 150.0, y + 150.0))),
        )
    }

    fn query(direction: Direction, from: ElementId) -> Query<'static, ElementId> {
        Query {
            reference_element: Some(from),
            ..Query::new(direction)
        }
    }

    #[test]
    fn cross_layout_from_center() {
        let mut scene = Scene::new();
        let [up, left, center, right, down] = cross(&mut scene, None);
        let next = |d| find_next(&scene, &query(d, center)).map(|r| r.target);
        assert_eq!(next(Direction::Up), Some(up));
        assert_eq!(next(Direction::Left), Some(left));
        assert_eq!(next(Direction::Right), Some(right));
        assert_eq!(next(Direction::Down), Some(down));
    }

    #[test]
    fn edges_have_no_target() {
        let mut scene = Scene::new();
        let [up, left, ..] = cross(&mut scene, None);
        assert!(find_next(&scene, &query(Direction::Up, up)).is_none());
        assert!(find_next(&scene, &query(Direction::Left, left)).is_none());
        // Diagonal neighbors are never reached.
        assert!(find_next(&scene, &query(Direction::Right, up)).is_none());
    }

    #[test]
    fn disabled_and_hidden_elements_are_skipped() {
        let mut scene = Scene::new();
        let [up, _, center, _, down] = cross(&mut scene, None);
        scene.set_disabled(center, true);
        assert_eq!(
            find_next(&scene, &query(Direction::Up, down)).map(|r| r.target),
            Some(up)
        );
        scene.set_hidden(up, true);
        assert!(find_next(&scene, &query(Direction::Up, down)).is_none());
    }

    #[test]
    fn no_reference_enters_at_edge() {
        let mut scene = Scene::new();
        let [_, left, ..] = cross(&mut scene, None);
        let r = find_next(&scene, &Query::new(Direction::Right)).unwrap();
        assert_eq!(r.target, left);
        assert_eq!(r.source, ResolutionSource::Entry);
    }

    #[test]
    fn overrides_win_and_respect_scope() {
        let mut scene = Scene::new();
        let container = scene.insert(None, SceneNode::container(Rect::new(0.0, 0.0, 600.0, 600.0)));
        let [up, _, center, right, down] = cross(&mut scene, Some(container));
        let outside = scene.insert(
            None,
            SceneNode::button(Rect::new(700.0, 250.0, 850.0, 400.0)).with_id("far"),
        );
        scene.set_id(down, "bottom");
        scene.set_overrides(
            center,
            OverrideMap::parse("{ up: '#bottom', right: '#far', left: '#missing' }").unwrap(),
        );

        let r = find_next(&scene, &query(Direction::Up, center)).unwrap();
        assert_eq!(r.target, down);
        assert_eq!(r.source, ResolutionSource::Override);

        // Override target exists but lies outside the root: geometry decides.
        let scoped = Query {
            focus_root: Some(container),
            ..query(Direction::Right, center)
        };
        assert_eq!(find_next(&scene, &scoped).map(|r| r.target), Some(right));
        assert_eq!(
            find_next(&scene, &query(Direction::Right, center)).map(|r| r.target),
            Some(outside)
        );

        // Unmatched selector falls through to geometry.
        let r = find_next(&scene, &query(Direction::Left, center)).unwrap();
        assert_eq!(r.source, ResolutionSource::Geometry);
        assert_ne!(r.target, up);
    }

    #[test]
    fn focus_root_rejects_out_of_scope_targets() {
        let mut scene = Scene::new();
        let left_root = scene.insert(None, SceneNode::container(Rect::new(0.0, 0.0, 600.0, 600.0)));
        let right_root =
            scene.insert(None, SceneNode::container(Rect::new(700.0, 0.0, 1300.0, 600.0)));
        let [_, _, _, edge, _] = cross(&mut scene, Some(left_root));
        scene.insert(
            Some(right_root),
            SceneNode::button(Rect::new(750.0, 250.0, 900.0, 400.0)),
        );

        let scoped = Query {
            focus_root: Some(left_root),
            ..query(Direction::Right, edge)
        };
        assert!(find_next(&scene, &scoped).is_none());
        assert!(find_next(&scene, &query(Direction::Right, edge)).is_some());
    }

    #[test]
    fn history_suggestion_beats_geometry() {
        let mut scene = Scene::new();
        let one = scene.insert(None, SceneNode::button(Rect::new(50.0, 50.0, 250.0, 150.0)));
        let two = scene.insert(None, SceneNode::button(Rect::new(50.0, 200.0, 250.0, 500.0)));
        let three = scene.insert(None, SceneNode::button(Rect::new(350.0, 50.0, 550.0, 500.0)));

        assert_eq!(
            find_next(&scene, &query(Direction::Left, three)).map(|r| r.target),
            Some(two)
        );

        let mut history = HistoryTracker::default();
        history.record_move(
            one,
            three,
            Direction::Right,
            scene.bounding_rect(one),
            scene.bounding_rect(three),
            false,
        );
        let q = Query {
            history: Some(&history),
            ..query(Direction::Left, three)
        };
        let r = find_next(&scene, &q).unwrap();
        assert_eq!(r.target, one);
        assert_eq!(r.source, ResolutionSource::History);
    }

    #[test]
    fn stale_history_suggestion_is_ignored() {
        let mut scene = Scene::new();
        let one = scene.insert(None, SceneNode::button(Rect::new(50.0, 50.0, 250.0, 150.0)));
        let two = scene.insert(None, SceneNode::button(Rect::new(50.0, 200.0, 250.0, 500.0)));
        let three = scene.insert(None, SceneNode::button(Rect::new(350.0, 50.0, 550.0, 500.0)));
        let mut history = HistoryTracker::default();
        history.record_move(
            one,
            three,
            Direction::Right,
            scene.bounding_rect(one),
            scene.bounding_rect(three),
            true,
        );
        // The recorded source is now below the reference: no longer a legal "left" target.
        scene.set_rect(one, Rect::new(350.0, 600.0, 550.0, 700.0));
        let q = Query {
            history: Some(&history),
            ..query(Direction::Left, three)
        };
        assert_eq!(find_next(&scene, &q).map(|r| r.target), Some(two));
    }

    #[test]
    fn reference_rect_overrides_element_geometry() {
        let mut scene = Scene::new();
        let [up, _, center, ..] = cross(&mut scene, None);
        let q = Query {
            reference_rect: Some(Rect::new(250.0, 420.0, 400.0, 440.0)),
            exclude: Some(center),
            ..Query::new(Direction::Up)
        };
        // Center would win but is excluded.
        let r = find_next(&scene, &q).unwrap();
        assert_eq!(r.target, up);
        assert_eq!(r.reference, None);
    }

    #[test]
    fn edge_fallback_when_nothing_is_in_the_shadow() {
        let mut scene = Scene::new();
        let [_, _, _, right, _] = cross(&mut scene, None);
        // Below and to the right of the cross; only touches `down`'s bottom edge.
        let q = Query {
            reference_rect: Some(Rect::new(600.0, 600.0, 700.0, 700.0)),
            ..Query::new(Direction::Left)
        };
        assert!(find_next(&scene, &q).is_none());

        let q = Query {
            edge_fallback: true,
            ..q
        };
        let r = find_next(&scene, &q).unwrap();
        assert_eq!(r.target, right);
        assert_eq!(r.source, ResolutionSource::Entry);
        assert_eq!(r.reference_rect, None);
    }
}
