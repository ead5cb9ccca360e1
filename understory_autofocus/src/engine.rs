// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: owned state plus the key-driven and programmatic entry points.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;

use crate::direction::Direction;
use crate::events::{FocusChanged, FocusChanging, ListenerId, Listeners, Verdict};
use crate::frame::{FrameBridge, RelayToken};
use crate::geometry::ScoreWeights;
use crate::history::HistoryTracker;
use crate::host::{ElementFlags, FocusHost};
use crate::keymap::{KeyCode, KeyMappings};
use crate::resolver::{NavigateOptions, Query, Resolution, ResolutionSource, find_next};

/// Tunables for an [`AutoFocus`] engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AutoFocusConfig {
    /// Scoring weights.
    pub weights: ScoreWeights,
    /// Maximum number of moves kept in the history chain.
    pub history_capacity: usize,
    /// Maximum number of unanswered cross-frame relays; the oldest is evicted beyond this.
    pub max_pending_relays: usize,
}

impl Default for AutoFocusConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            history_capacity: 32,
            max_pending_relays: 16,
        }
    }
}

/// What a navigation attempt did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome<E> {
    /// Focus moved to the element.
    Moved(E),
    /// A `focuschanging` listener canceled the move to the element.
    Canceled(E),
    /// The host refused to focus the element.
    Refused(E),
    /// Nothing matched locally; the request was sent to the parent context.
    Relayed(RelayToken),
    /// No target exists.
    NoTarget,
}

impl<E> MoveOutcome<E> {
    /// The newly focused element, if focus moved.
    pub fn moved(self) -> Option<E> {
        match self {
            Self::Moved(e) => Some(e),
            _ => None,
        }
    }
}

/// How a navigation request entered the engine.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Request<E> {
    /// Fall back to the live focus when the options carry no reference.
    pub(crate) use_active: bool,
    /// Never resolve to this element.
    pub(crate) exclude: Option<E>,
    /// Relay to the parent context when nothing matches.
    pub(crate) relay_on_miss: bool,
    /// Enter at the near edge when nothing lies in the reference's shadow.
    pub(crate) edge_fallback: bool,
}

impl<E> Request<E> {
    pub(crate) const LOCAL: Self = Self {
        use_active: true,
        exclude: None,
        relay_on_miss: true,
        edge_fallback: false,
    };
}

/// A directional focus engine for one browsing context.
///
/// The host owns the engine and passes its [`FocusHost`] to every call. Key
/// handling starts disabled; programmatic calls always work.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_autofocus::scene::{Scene, SceneNode};
/// use understory_autofocus::{AutoFocus, Direction, FocusHost, KeyCode, NavigateOptions};
///
/// let mut scene = Scene::new();
/// let a = scene.insert(None, SceneNode::button(Rect::new(0.0, 0.0, 100.0, 100.0)));
/// let b = scene.insert(None, SceneNode::button(Rect::new(150.0, 0.0, 250.0, 100.0)));
/// scene.focus(a);
///
/// let mut engine = AutoFocus::new();
/// assert_eq!(engine.handle_key_down(&mut scene, KeyCode::ARROW_RIGHT), None);
///
/// engine.enable_auto_focus();
/// let outcome = engine.handle_key_down(&mut scene, KeyCode::ARROW_RIGHT).unwrap();
/// assert_eq!(outcome.moved(), Some(b));
///
/// let back = engine.move_focus(&mut scene, Direction::Left, &NavigateOptions::default());
/// assert_eq!(back, Some(a));
/// ```
#[derive(Debug)]
pub struct AutoFocus<E> {
    enabled: bool,
    focus_root: Option<E>,
    mappings: KeyMappings,
    pub(crate) history: HistoryTracker<E>,
    pub(crate) listeners: Listeners<E>,
    pub(crate) bridge: FrameBridge<E>,
    config: AutoFocusConfig,
}

impl<E: Copy + Eq + Hash + Debug> Default for AutoFocus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash + Debug> AutoFocus<E> {
    /// An engine with default configuration and arrow-key mappings.
    pub fn new() -> Self {
        Self::with_config(AutoFocusConfig::default())
    }

    /// An engine with the given configuration.
    pub fn with_config(config: AutoFocusConfig) -> Self {
        Self {
            enabled: false,
            focus_root: None,
            mappings: KeyMappings::default(),
            history: HistoryTracker::new(config.history_capacity),
            listeners: Listeners::new(),
            bridge: FrameBridge::new(config.max_pending_relays),
            config,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &AutoFocusConfig {
        &self.config
    }

    /// Start reacting to mapped keys.
    pub fn enable_auto_focus(&mut self) {
        self.enabled = true;
    }

    /// Stop reacting to keys. Programmatic calls keep working.
    pub fn disable_auto_focus(&mut self) {
        self.enabled = false;
    }

    /// Whether key handling is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The scope navigation is confined to, if any.
    pub fn focus_root(&self) -> Option<E> {
        self.focus_root
    }

    /// Set or clear the scope.
    pub fn set_focus_root(&mut self, root: Option<E>) {
        self.focus_root = root;
    }

    /// Key bindings.
    pub fn mappings(&self) -> &KeyMappings {
        &self.mappings
    }

    /// Mutable key bindings.
    pub fn mappings_mut(&mut self) -> &mut KeyMappings {
        &mut self.mappings
    }

    /// Recorded navigation history.
    pub fn history(&self) -> &HistoryTracker<E> {
        &self.history
    }

    /// Forget navigation history.
    ///
    /// Hosts that observe focus changes made outside the engine may call this
    /// eagerly; the engine also detects such changes on its next move.
    pub fn notify_focus_changed(&mut self) {
        self.history.reset();
    }

    /// Register a `focuschanging` listener.
    pub fn on_focus_changing(
        &mut self,
        listener: impl FnMut(&FocusChanging<E>) -> Verdict + 'static,
    ) -> ListenerId {
        self.listeners.on_changing(listener)
    }

    /// Register a `focuschanged` listener.
    pub fn on_focus_changed(&mut self, listener: impl FnMut(&FocusChanged<E>) + 'static) -> ListenerId {
        self.listeners.on_changed(listener)
    }

    /// Remove a listener of either kind.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Remove every listener.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// The element a move in `direction` would focus, without moving.
    ///
    /// Takes history into account only while it still describes the live focus.
    pub fn find_next_focus_element<H>(
        &self,
        host: &H,
        direction: Direction,
        options: &NavigateOptions<E>,
    ) -> Option<E>
    where
        H: FocusHost<Element = E>,
    {
        self.resolve(host, direction, options, &Request::LOCAL)
            .map(|r| r.target)
    }

    /// Move focus in `direction`, returning the newly focused element.
    ///
    /// Returns `None` when there is no target, the move was canceled, or the
    /// request was relayed to the parent context.
    pub fn move_focus<H>(
        &mut self,
        host: &mut H,
        direction: Direction,
        options: &NavigateOptions<E>,
    ) -> Option<E>
    where
        H: FocusHost<Element = E>,
    {
        self.navigate(host, direction, options).moved()
    }

    /// Move focus in `direction`, reporting exactly what happened.
    pub fn navigate<H>(
        &mut self,
        host: &mut H,
        direction: Direction,
        options: &NavigateOptions<E>,
    ) -> MoveOutcome<E>
    where
        H: FocusHost<Element = E>,
    {
        self.navigate_with(host, direction, None, options, Request::LOCAL)
    }

    /// Handle a key press.
    ///
    /// Returns `None` when the engine is disabled or `key` is unmapped; the
    /// host should then let the key through.
    pub fn handle_key_down<H>(&mut self, host: &mut H, key: KeyCode) -> Option<MoveOutcome<E>>
    where
        H: FocusHost<Element = E>,
    {
        if !self.enabled {
            return None;
        }
        let direction = self.mappings.direction_for(key)?;
        tracing::trace!(%key, %direction, "key mapped");
        Some(self.navigate_with(
            host,
            direction,
            Some(key),
            &NavigateOptions::default(),
            Request::LOCAL,
        ))
    }

    fn has_explicit_reference(options: &NavigateOptions<E>, request: &Request<E>) -> bool {
        options.has_reference() || !request.use_active
    }

    pub(crate) fn resolve<H>(
        &self,
        host: &H,
        direction: Direction,
        options: &NavigateOptions<E>,
        request: &Request<E>,
    ) -> Option<Resolution<E>>
    where
        H: FocusHost<Element = E>,
    {
        let active = host.active_element();
        let reference_element = options
            .reference_element
            .or(if request.use_active { active } else { None });
        let history = (!Self::has_explicit_reference(options, request)
            && self.history.is_current(active, |e| host.bounding_rect(e)))
        .then_some(&self.history);
        let query = Query {
            direction,
            reference_element,
            reference_rect: options.reference_rect,
            focus_root: options.focus_root.or(self.focus_root),
            exclude: request.exclude,
            history,
            weights: self.config.weights,
            edge_fallback: request.edge_fallback,
        };
        find_next(host, &query)
    }

    pub(crate) fn navigate_with<H>(
        &mut self,
        host: &mut H,
        direction: Direction,
        key_code: Option<KeyCode>,
        options: &NavigateOptions<E>,
        request: Request<E>,
    ) -> MoveOutcome<E>
    where
        H: FocusHost<Element = E>,
    {
        // An explicit reference starts a new chain, but only once the move lands.
        let restart = Self::has_explicit_reference(options, &request);
        if !restart {
            let active = host.active_element();
            if self.history.sync(active, |e| host.bounding_rect(e)) {
                tracing::debug!(?active, "focus moved outside the engine, history cleared");
            }
        }

        match self.resolve(&*host, direction, options, &request) {
            Some(resolution) => self.apply(host, direction, key_code, resolution, restart),
            None => self.relay_or_give_up(&*host, direction, options, &request),
        }
    }

    fn relay_or_give_up<H>(
        &mut self,
        host: &H,
        direction: Direction,
        options: &NavigateOptions<E>,
        request: &Request<E>,
    ) -> MoveOutcome<E>
    where
        H: FocusHost<Element = E>,
    {
        if !request.relay_on_miss || !self.bridge.is_embedded() {
            tracing::debug!(%direction, "no target");
            return MoveOutcome::NoTarget;
        }
        let from = options
            .reference_element
            .or(if request.use_active { host.active_element() } else { None });
        let rect: Option<Rect> = options
            .reference_rect
            .or_else(|| from.map(|e| host.bounding_rect(e)));
        match rect.and_then(|r| self.bridge.request_exit(direction, r)) {
            Some(token) => MoveOutcome::Relayed(token),
            None => {
                tracing::debug!(%direction, "no target and nothing to relay");
                MoveOutcome::NoTarget
            }
        }
    }

    fn apply<H>(
        &mut self,
        host: &mut H,
        direction: Direction,
        key_code: Option<KeyCode>,
        resolution: Resolution<E>,
        restart: bool,
    ) -> MoveOutcome<E>
    where
        H: FocusHost<Element = E>,
    {
        let previous = host.active_element();
        let target = resolution.target;
        let verdict = self.listeners.dispatch_changing(&FocusChanging {
            direction,
            key_code,
            previous_focus_element: previous,
            next_focus_element: target,
        });
        if verdict == Verdict::Cancel {
            tracing::debug!(?target, %direction, "move canceled by listener");
            return MoveOutcome::Canceled(target);
        }
        if !host.focus(target) {
            tracing::debug!(?target, "host refused focus");
            return MoveOutcome::Refused(target);
        }

        if restart {
            self.history.reset();
        }
        match (resolution.reference, resolution.reference_rect) {
            (Some(from), Some(from_rect)) => self.history.record_move(
                from,
                target,
                direction,
                from_rect,
                resolution.target_rect,
                resolution.source == ResolutionSource::Override,
            ),
            _ => self.history.record_entry(target, resolution.target_rect),
        }
        tracing::debug!(?previous, ?target, %direction, source = ?resolution.source, "focus moved");

        self.listeners.dispatch_changed(&FocusChanged {
            direction,
            key_code,
            previous_focus_element: previous,
        });

        if host.flags(target).contains(ElementFlags::FRAME) {
            let offset = resolution.target_rect.origin().to_vec2();
            self.bridge
                .request_enter(target, direction, resolution.reference_rect.map(|r| r - offset));
        }
        MoveOutcome::Moved(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OverrideMap;
    use crate::scene::{ElementId, Scene, SceneNode};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    fn square(scene: &mut Scene, parent: Option<ElementId>, x: f64, y: f64) -> ElementId {
        scene.insert(
            parent,
            SceneNode::button(Rect::new(x, y, x + 150.0, y + 150.0)),
        )
    }

    /// Up, left, center, right, down.
    fn cross() -> (Scene, [ElementId; 5]) {
        let mut s = Scene::new();
        let ids = [(250.0, 50.0), (50.0, 250.0), (250.0, 250.0), (450.0, 250.0), (250.0, 450.0)]
            .map(|(x, y)| square(&mut s, None, x, y));
        (s, ids)
    }

    fn none() -> NavigateOptions<ElementId> {
        NavigateOptions::default()
    }

    #[test]
    fn cross_layout_in_all_directions() {
        let (mut s, [up, left, center, right, down]) = cross();
        s.focus(center);
        let engine = AutoFocus::new();
        let find = |d| engine.find_next_focus_element(&s, d, &none());
        assert_eq!(find(Direction::Up), Some(up));
        assert_eq!(find(Direction::Left), Some(left));
        assert_eq!(find(Direction::Right), Some(right));
        assert_eq!(find(Direction::Down), Some(down));
        assert_eq!(s.active_element(), Some(center), "finding does not move focus");
    }

    #[test]
    fn reference_element_replaces_live_focus() {
        let (mut s, [up, left, center, right, _]) = cross();
        s.focus(up);
        let engine = AutoFocus::new();
        let opts = NavigateOptions::from_element(center);
        assert_eq!(
            engine.find_next_focus_element(&s, Direction::Left, &opts),
            Some(left)
        );
        assert_eq!(
            engine.find_next_focus_element(&s, Direction::Right, &opts),
            Some(right)
        );
    }

    #[test]
    fn no_initial_focus_still_finds_a_target() {
        let (s, [_, left, ..]) = cross();
        let engine = AutoFocus::new();
        assert_eq!(
            engine.find_next_focus_element(&s, Direction::Right, &none()),
            Some(left)
        );
        assert!(engine.find_next_focus_element(&s, Direction::Down, &none()).is_some());
    }

    #[test]
    fn move_focus_round_trips() {
        let (mut s, [up, left, center, right, down]) = cross();
        s.focus(center);
        let mut engine = AutoFocus::new();
        for (d, expected) in [
            (Direction::Left, left),
            (Direction::Right, center),
            (Direction::Up, up),
            (Direction::Down, center),
            (Direction::Right, right),
            (Direction::Left, center),
            (Direction::Down, down),
        ] {
            assert_eq!(engine.move_focus(&mut s, d, &none()), Some(expected));
            assert_eq!(s.active_element(), Some(expected));
        }
        assert_eq!(engine.move_focus(&mut s, Direction::Down, &none()), None);
        assert_eq!(s.active_element(), Some(down));
    }

    #[test]
    fn focus_root_scopes_moves() {
        let mut s = Scene::new();
        let left_root = s.insert(None, SceneNode::container(Rect::new(0.0, 0.0, 700.0, 700.0)));
        let right_root =
            s.insert(None, SceneNode::container(Rect::new(700.0, 0.0, 1400.0, 700.0)));
        let l3 = square(&mut s, Some(left_root), 250.0, 250.0);
        let l4 = square(&mut s, Some(left_root), 450.0, 250.0);
        let r2 = square(&mut s, Some(right_root), 750.0, 250.0);
        s.focus(l3);

        let mut engine = AutoFocus::new();
        engine.set_focus_root(Some(left_root));
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(l4));
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), None);
        assert_eq!(s.active_element(), Some(l4));

        // Per-call root wins over the global one.
        let opts = NavigateOptions::default().within(right_root);
        assert_eq!(
            engine.find_next_focus_element(&s, Direction::Right, &opts),
            Some(r2)
        );

        engine.set_focus_root(None);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(r2));
    }

    /// 1 sits above 2 on the left; 3 is a tall column on the right.
    fn history_layout() -> (Scene, [ElementId; 3]) {
        let mut s = Scene::new();
        let one = s.insert(None, SceneNode::button(Rect::new(50.0, 50.0, 250.0, 150.0)));
        let two = s.insert(None, SceneNode::button(Rect::new(50.0, 200.0, 250.0, 500.0)));
        let three = s.insert(None, SceneNode::button(Rect::new(350.0, 50.0, 550.0, 500.0)));
        (s, [one, two, three])
    }

    #[test]
    fn history_biases_reverse_moves() {
        let (mut s, [one, two, three]) = history_layout();
        let mut engine = AutoFocus::new();
        engine.enable_auto_focus();

        s.focus(three);
        assert_eq!(engine.move_focus(&mut s, Direction::Left, &none()), Some(two));

        s.focus(one);
        let right = engine.handle_key_down(&mut s, KeyCode::ARROW_RIGHT);
        assert_eq!(right, Some(MoveOutcome::Moved(three)));
        let left = engine.handle_key_down(&mut s, KeyCode::ARROW_LEFT);
        assert_eq!(left, Some(MoveOutcome::Moved(one)));
    }

    #[test]
    fn manual_focus_forgets_history() {
        let (mut s, [one, two, three]) = history_layout();
        let mut engine = AutoFocus::new();
        s.focus(one);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(three));

        // Focus placed elsewhere is noticed on the next move.
        s.focus(two);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(three));
        assert_eq!(engine.history().entries().count(), 1);

        s.focus(one);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(three));
        // Leaving and coming back is invisible to the engine unless reported.
        s.focus(two);
        s.focus(three);
        engine.notify_focus_changed();
        assert_eq!(engine.move_focus(&mut s, Direction::Left, &none()), Some(two));
    }

    #[test]
    fn moved_target_invalidates_history() {
        let (mut s, [one, two, three]) = history_layout();
        let mut engine = AutoFocus::new();
        s.focus(one);
        engine.move_focus(&mut s, Direction::Right, &none());
        s.set_rect(three, Rect::new(350.0, 60.0, 550.0, 510.0));
        assert_eq!(engine.move_focus(&mut s, Direction::Left, &none()), Some(two));
        assert_eq!(engine.history().entries().count(), 1);
    }

    #[test]
    fn canceled_moves_leave_state_untouched() {
        let (mut s, [_, _, center, right, _]) = cross();
        s.focus(center);
        let mut engine = AutoFocus::new();
        let changed = Rc::new(Cell::new(0));
        let c = changed.clone();
        engine.on_focus_changed(move |_| c.set(c.get() + 1));
        let veto = engine.on_focus_changing(|_| Verdict::Cancel);

        assert_eq!(
            engine.navigate(&mut s, Direction::Right, &none()),
            MoveOutcome::Canceled(right)
        );
        assert_eq!(s.active_element(), Some(center));
        assert_eq!(changed.get(), 0);
        assert!(engine.history().is_empty());

        assert!(engine.remove_listener(veto));
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(right));
        assert_eq!(changed.get(), 1);
    }

    #[test]
    fn canceled_move_from_explicit_reference_keeps_history() {
        let (mut s, [one, two, three]) = history_layout();
        let mut engine = AutoFocus::new();
        s.focus(one);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(three));

        let veto = engine.on_focus_changing(|_| Verdict::Cancel);
        assert_eq!(
            engine.navigate(&mut s, Direction::Left, &NavigateOptions::from_element(three)),
            MoveOutcome::Canceled(two)
        );
        assert_eq!(engine.history().entries().count(), 1);

        // The chain still reverses the recorded move.
        assert!(engine.remove_listener(veto));
        assert_eq!(engine.move_focus(&mut s, Direction::Left, &none()), Some(one));
    }

    #[test]
    fn explicit_reference_restarts_history_once_focus_moves() {
        let (mut s, [one, two, three]) = history_layout();
        let mut engine = AutoFocus::new();
        s.focus(one);
        assert_eq!(engine.move_focus(&mut s, Direction::Right, &none()), Some(three));

        assert_eq!(
            engine.move_focus(&mut s, Direction::Left, &NavigateOptions::from_element(three)),
            Some(two)
        );
        let entries: Vec<_> = engine.history().entries().map(|e| (e.from, e.to)).collect();
        assert_eq!(entries, [(three, two)]);
    }

    #[test]
    fn events_carry_key_and_elements() {
        let (mut s, [_, left, center, ..]) = cross();
        s.focus(center);
        let mut engine = AutoFocus::new();
        engine.enable_auto_focus();
        let seen: Rc<RefCell<Vec<(Option<KeyCode>, Option<ElementId>, Option<ElementId>)>>> =
            Rc::default();
        let log = seen.clone();
        engine.on_focus_changing(move |e| {
            log.borrow_mut()
                .push((e.key_code, e.previous_focus_element, Some(e.next_focus_element)));
            Verdict::Proceed
        });
        let log = seen.clone();
        engine.on_focus_changed(move |e| {
            log.borrow_mut().push((e.key_code, e.previous_focus_element, None));
        });

        engine.handle_key_down(&mut s, KeyCode::ARROW_LEFT);
        assert_eq!(
            *seen.borrow(),
            [
                (Some(KeyCode::ARROW_LEFT), Some(center), Some(left)),
                (Some(KeyCode::ARROW_LEFT), Some(center), None),
            ]
        );

        seen.borrow_mut().clear();
        engine.move_focus(&mut s, Direction::Right, &none());
        assert_eq!(seen.borrow()[0], (None, Some(left), Some(center)));

        // No target: no events.
        seen.borrow_mut().clear();
        s.focus(left);
        engine.move_focus(&mut s, Direction::Left, &none());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn disabled_engine_ignores_keys_only() {
        let (mut s, [_, left, center, ..]) = cross();
        s.focus(center);
        let mut engine = AutoFocus::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        engine.on_focus_changing(move |_| {
            f.set(true);
            Verdict::Proceed
        });

        assert!(!engine.is_enabled());
        assert_eq!(engine.handle_key_down(&mut s, KeyCode::ARROW_LEFT), None);
        assert_eq!(s.active_element(), Some(center));
        assert!(!fired.get());

        assert_eq!(engine.move_focus(&mut s, Direction::Left, &none()), Some(left));

        engine.enable_auto_focus();
        assert_eq!(
            engine.handle_key_down(&mut s, KeyCode::ARROW_RIGHT),
            Some(MoveOutcome::Moved(center))
        );
        engine.disable_auto_focus();
        assert_eq!(engine.handle_key_down(&mut s, KeyCode::ARROW_RIGHT), None);
    }

    #[test]
    fn custom_mappings_drive_navigation() {
        let (mut s, [up, left, center, right, down]) = cross();
        s.focus(center);
        let mut engine = AutoFocus::new();
        engine.enable_auto_focus();
        assert_eq!(engine.handle_key_down(&mut s, KeyCode::W), None);

        let m = engine.mappings_mut();
        m[Direction::Up].push(KeyCode::W);
        m[Direction::Down].push(KeyCode::S);
        m[Direction::Left].push(KeyCode::A);
        m[Direction::Right].push(KeyCode::D);

        for (key, expected) in [
            (KeyCode::W, up),
            (KeyCode::S, center),
            (KeyCode::A, left),
            (KeyCode::D, center),
            (KeyCode::D, right),
            (KeyCode::A, center),
            (KeyCode::S, down),
        ] {
            assert_eq!(
                engine.handle_key_down(&mut s, key),
                Some(MoveOutcome::Moved(expected))
            );
        }
    }

    #[test]
    fn overrides_beat_geometry() {
        let (mut s, [up, left, center, right, down]) = cross();
        let ids = ["btn1", "btn2", "btn3", "btn4", "btn5"];
        for (e, id) in [up, left, center, right, down].into_iter().zip(ids) {
            s.set_id(e, id);
        }
        s.set_overrides(
            center,
            OverrideMap::parse("{ left: '#btn4', right: '#btn2', up: '#btn5', down: '#btn1' }")
                .unwrap(),
        );
        let engine = AutoFocus::new();
        let from_center = NavigateOptions::from_element(center);
        let find = |d| engine.find_next_focus_element(&s, d, &from_center);
        assert_eq!(find(Direction::Left), Some(right));
        assert_eq!(find(Direction::Right), Some(left));
        assert_eq!(find(Direction::Up), Some(down));
        assert_eq!(find(Direction::Down), Some(up));
    }

    #[test]
    fn disabled_elements_are_passed_over() {
        let (mut s, [up, _, center, _, down]) = cross();
        s.set_disabled(center, true);
        s.focus(down);
        let mut engine = AutoFocus::new();
        assert_eq!(engine.move_focus(&mut s, Direction::Up, &none()), Some(up));
    }

    #[test]
    fn refused_focus_is_reported() {
        struct Stubborn(Scene);
        impl FocusHost for Stubborn {
            type Element = ElementId;
            fn active_element(&self) -> Option<ElementId> {
                self.0.active_element()
            }
            fn focus(&mut self, _: ElementId) -> bool {
                false
            }
            fn bounding_rect(&self, e: ElementId) -> Rect {
                self.0.bounding_rect(e)
            }
            fn flags(&self, e: ElementId) -> ElementFlags {
                self.0.flags(e)
            }
            fn descendants(&self, root: Option<ElementId>) -> impl Iterator<Item = ElementId> + '_ {
                self.0.descendants(root)
            }
            fn contains(&self, a: ElementId, e: ElementId) -> bool {
                self.0.contains(a, e)
            }
            fn query_selector(&self, sel: &crate::Selector) -> Option<ElementId> {
                self.0.query_selector(sel)
            }
            fn overrides(&self, e: ElementId) -> Option<&OverrideMap> {
                self.0.overrides(e)
            }
        }

        let (mut s, [_, left, center, ..]) = cross();
        s.focus(center);
        let mut host = Stubborn(s);
        let mut engine = AutoFocus::new();
        assert_eq!(
            engine.navigate(&mut host, Direction::Left, &none()),
            MoveOutcome::Refused(left)
        );
        assert!(engine.history().is_empty());
    }
}
