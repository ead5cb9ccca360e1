// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focusable registry: which elements may receive focus.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::geometry::is_degenerate;
use crate::host::FocusHost;

/// A focusable element together with its rectangle at enumeration time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate<E> {
    /// The element.
    pub element: E,
    /// Its bounding rectangle.
    pub rect: Rect,
}

/// Whether `element` can take focus right now.
///
/// The element must be focusable, neither disabled nor hidden, and have a
/// non-empty rectangle.
pub fn is_focusable<H: FocusHost>(host: &H, element: H::Element) -> bool {
    host.flags(element).can_focus() && !is_degenerate(host.bounding_rect(element))
}

/// Enumerate focusable elements under `root` (the whole document when `None`),
/// in document order, skipping `exclude`.
pub fn enumerate<H: FocusHost>(
    host: &H,
    root: Option<H::Element>,
    exclude: Option<H::Element>,
) -> Vec<Candidate<H::Element>> {
    host.descendants(root)
        .filter(|&e| Some(e) != exclude && host.flags(e).can_focus())
        .filter_map(|element| {
            let rect = host.bounding_rect(element);
            (!is_degenerate(rect)).then_some(Candidate { element, rect })
        })
        .collect()
}

/// Whether `element` lies within `root`, treating `None` as the whole document.
pub fn in_scope<H: FocusHost>(host: &H, root: Option<H::Element>, element: H::Element) -> bool {
    root.is_none_or(|r| r != element && host.contains(r, element))
}
