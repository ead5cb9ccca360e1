// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host boundary: how the engine reads and changes the element tree.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;

use crate::overrides::OverrideMap;
use crate::selector::Selector;

bitflags::bitflags! {
    /// Element state consulted by the focusable registry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Natively or explicitly focusable (for example a button, or a non-negative tab index).
        const FOCUSABLE = 0b0000_0001;
        /// Disabled elements never receive focus.
        const DISABLED  = 0b0000_0010;
        /// Hidden elements (and elements inside hidden subtrees) never receive focus.
        const HIDDEN    = 0b0000_0100;
        /// The element embeds a nested browsing context with its own engine.
        const FRAME     = 0b0000_1000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::FOCUSABLE
    }
}

impl ElementFlags {
    /// Whether these flags allow the element to take focus.
    pub fn can_focus(self) -> bool {
        self.contains(Self::FOCUSABLE) && !self.intersects(Self::DISABLED | Self::HIDDEN)
    }
}

/// Live view of an element tree, supplied by the host application.
///
/// The engine never owns elements or caches their geometry; every query
/// reads current state. Implementations must report rectangles in a single
/// coordinate space (viewport coordinates of the browsing context).
pub trait FocusHost {
    /// Small, copyable element handle.
    type Element: Copy + Eq + Hash + Debug;

    /// The element that currently has focus, if any.
    fn active_element(&self) -> Option<Self::Element>;

    /// Move focus to `element`. Returns `false` if the element refused focus.
    fn focus(&mut self, element: Self::Element) -> bool;

    /// Current bounding rectangle of `element`.
    fn bounding_rect(&self, element: Self::Element) -> Rect;

    /// Current flags of `element`.
    ///
    /// Hosts should report [`ElementFlags::HIDDEN`] for elements inside a hidden subtree.
    fn flags(&self, element: Self::Element) -> ElementFlags;

    /// Elements under `root` (the whole document when `None`) in document order.
    ///
    /// `root` itself is not included.
    fn descendants(&self, root: Option<Self::Element>) -> impl Iterator<Item = Self::Element> + '_;

    /// Whether `element` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: Self::Element, element: Self::Element) -> bool;

    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &Selector) -> Option<Self::Element>;

    /// Override map attached to `element`, if any.
    fn overrides(&self, element: Self::Element) -> Option<&OverrideMap>;
}
