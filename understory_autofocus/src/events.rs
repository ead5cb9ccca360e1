// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus move notifications: a cancelable pre-move event and an
//! informational post-move event.
//!
//! Listeners are plain closures held by the engine. Every `focuschanging`
//! listener runs; the move is canceled if any of them returns
//! [`Verdict::Cancel`]. Listeners must not call back into the engine.
//!
//! ```rust
//! use understory_autofocus::events::{FocusChanging, Listeners, Verdict};
//! use understory_autofocus::Direction;
//!
//! let mut listeners: Listeners<u32> = Listeners::new();
//! let id = listeners.on_changing(|e| {
//!     if e.next_focus_element == 7 { Verdict::Cancel } else { Verdict::Proceed }
//! });
//!
//! let event = FocusChanging {
//!     direction: Direction::Up,
//!     key_code: None,
//!     previous_focus_element: Some(1),
//!     next_focus_element: 7,
//! };
//! assert_eq!(listeners.dispatch_changing(&event), Verdict::Cancel);
//!
//! listeners.remove(id);
//! assert_eq!(listeners.dispatch_changing(&event), Verdict::Proceed);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::direction::Direction;
use crate::keymap::KeyCode;

/// Sent before focus moves. Cancelable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusChanging<E> {
    /// Direction of the move.
    pub direction: Direction,
    /// Key that triggered the move; `None` for programmatic moves.
    pub key_code: Option<KeyCode>,
    /// Element focused before the move.
    pub previous_focus_element: Option<E>,
    /// Element about to receive focus.
    pub next_focus_element: E,
}

/// Sent after focus moved. Read the new focus from the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusChanged<E> {
    /// Direction of the move.
    pub direction: Direction,
    /// Key that triggered the move; `None` for programmatic moves.
    pub key_code: Option<KeyCode>,
    /// Element focused before the move.
    pub previous_focus_element: Option<E>,
}

/// What a `focuschanging` listener decided.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Let the move happen.
    #[default]
    Proceed,
    /// Prevent the move.
    Cancel,
}

/// Handle returned when registering a listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type ChangingFn<E> = Box<dyn FnMut(&FocusChanging<E>) -> Verdict>;
type ChangedFn<E> = Box<dyn FnMut(&FocusChanged<E>)>;

/// Registry of `focuschanging` and `focuschanged` listeners.
pub struct Listeners<E> {
    changing: Vec<(ListenerId, ChangingFn<E>)>,
    changed: Vec<(ListenerId, ChangedFn<E>)>,
    next_id: u64,
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("changing", &self.changing.len())
            .field("changed", &self.changed.len())
            .finish_non_exhaustive()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Listeners<E> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            changing: Vec::new(),
            changed: Vec::new(),
            next_id: 0,
        }
    }

    fn mint(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    /// Register a `focuschanging` listener.
    pub fn on_changing(
        &mut self,
        listener: impl FnMut(&FocusChanging<E>) -> Verdict + 'static,
    ) -> ListenerId {
        let id = self.mint();
        self.changing.push((id, Box::new(listener)));
        id
    }

    /// Register a `focuschanged` listener.
    pub fn on_changed(&mut self, listener: impl FnMut(&FocusChanged<E>) + 'static) -> ListenerId {
        let id = self.mint();
        self.changed.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if `id` was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.changing.len() + self.changed.len();
        self.changing.retain(|(i, _)| *i != id);
        self.changed.retain(|(i, _)| *i != id);
        before != self.changing.len() + self.changed.len()
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.changing.clear();
        self.changed.clear();
    }

    /// Number of registered listeners of both kinds.
    pub fn len(&self) -> usize {
        self.changing.len() + self.changed.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every `focuschanging` listener in registration order.
    ///
    /// All listeners see the event even after one has canceled it.
    pub fn dispatch_changing(&mut self, event: &FocusChanging<E>) -> Verdict {
        let mut verdict = Verdict::Proceed;
        for (_, listener) in &mut self.changing {
            if listener(event) == Verdict::Cancel {
                verdict = Verdict::Cancel;
            }
        }
        verdict
    }

    /// Run every `focuschanged` listener in registration order.
    pub fn dispatch_changed(&mut self, event: &FocusChanged<E>) {
        for (_, listener) in &mut self.changed {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    fn changing(next: u32) -> FocusChanging<u32> {
        FocusChanging {
            direction: Direction::Left,
            key_code: Some(KeyCode::ARROW_LEFT),
            previous_focus_element: Some(0),
            next_focus_element: next,
        }
    }

    #[test]
    fn any_cancel_wins_and_all_listeners_run() {
        let mut l: Listeners<u32> = Listeners::new();
        let calls = Rc::new(Cell::new(0));
        let c1 = calls.clone();
        l.on_changing(move |_| {
            c1.set(c1.get() + 1);
            Verdict::Cancel
        });
        let c2 = calls.clone();
        l.on_changing(move |_| {
            c2.set(c2.get() + 1);
            Verdict::Proceed
        });
        assert_eq!(l.dispatch_changing(&changing(3)), Verdict::Cancel);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn no_listeners_proceeds() {
        let mut l: Listeners<u32> = Listeners::default();
        assert!(l.is_empty());
        assert_eq!(l.dispatch_changing(&changing(1)), Verdict::Proceed);
    }

    #[test]
    fn remove_is_symmetric_across_kinds() {
        let mut l: Listeners<u32> = Listeners::new();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        let a = l.on_changed(move |e| s.set(e.previous_focus_element));
        let b = l.on_changing(|_| Verdict::Proceed);
        assert_ne!(a, b);
        assert_eq!(l.len(), 2);

        l.dispatch_changed(&FocusChanged {
            direction: Direction::Up,
            key_code: None,
            previous_focus_element: Some(9),
        });
        assert_eq!(seen.get(), Some(9));

        assert!(l.remove(a));
        assert!(!l.remove(a));
        assert!(l.remove(b));
        assert!(l.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut l: Listeners<u32> = Listeners::new();
        l.on_changing(|_| Verdict::Cancel);
        l.on_changed(|_| {});
        l.clear();
        assert_eq!(l.dispatch_changing(&changing(2)), Verdict::Proceed);
    }
}
