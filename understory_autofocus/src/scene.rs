// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`FocusHost`]: a small element tree with absolute rectangles.
//!
//! `Scene` is enough to drive the engine from tests, demos and headless
//! tools. Rectangles are stored in the scene's own viewport coordinates;
//! nothing is laid out.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_autofocus::FocusHost;
//! use understory_autofocus::scene::{Scene, SceneNode};
//!
//! let mut scene = Scene::new();
//! let list = scene.insert(None, SceneNode::container(Rect::new(0.0, 0.0, 200.0, 400.0)));
//! let a = scene.insert(Some(list), SceneNode::button(Rect::new(0.0, 0.0, 200.0, 50.0)).with_id("a"));
//! let b = scene.insert(Some(list), SceneNode::button(Rect::new(0.0, 60.0, 200.0, 110.0)));
//!
//! assert_eq!(scene.descendants(None).collect::<Vec<_>>(), [list, a, b]);
//! assert!(scene.focus(b));
//! assert_eq!(scene.active_element(), Some(b));
//!
//! // Hidden containers hide their children.
//! scene.set_hidden(list, true);
//! assert!(!scene.flags(a).can_focus());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::host::{ElementFlags, FocusHost};
use crate::overrides::OverrideMap;
use crate::selector::Selector;

/// Identifier for an element in a [`Scene`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(u32);

impl ElementId {
    /// Id for the slot at `idx`, if it fits in 32 bits.
    fn for_slot(idx: usize) -> Option<Self> {
        u32::try_from(idx).ok().map(Self)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Data for one scene element.
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Bounding rectangle in scene coordinates.
    pub rect: Rect,
    /// Focus-relevant state.
    pub flags: ElementFlags,
    /// Tag name, lowercase.
    pub tag: String,
    /// Element id.
    pub id: Option<String>,
    /// Class list.
    pub classes: SmallVec<[String; 2]>,
    /// Directional overrides.
    pub overrides: Option<OverrideMap>,
}

impl SceneNode {
    /// A focusable `button`.
    pub fn button(rect: Rect) -> Self {
        Self {
            rect,
            flags: ElementFlags::FOCUSABLE,
            tag: String::from("button"),
            id: None,
            classes: SmallVec::new(),
            overrides: None,
        }
    }

    /// A non-focusable `div`.
    pub fn container(rect: Rect) -> Self {
        Self {
            flags: ElementFlags::empty(),
            tag: String::from("div"),
            ..Self::button(rect)
        }
    }

    /// A focusable `iframe` hosting a nested context.
    pub fn frame(rect: Rect) -> Self {
        Self {
            flags: ElementFlags::FOCUSABLE | ElementFlags::FRAME,
            tag: String::from("iframe"),
            ..Self::button(rect)
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the tag name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Attach directional overrides.
    pub fn with_overrides(mut self, overrides: OverrideMap) -> Self {
        self.overrides = Some(overrides);
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(
            &self.tag,
            self.id.as_deref(),
            self.classes.iter().map(String::as_str),
        )
    }
}

#[derive(Clone, Debug)]
struct Slot {
    node: SceneNode,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// In-memory element tree implementing [`FocusHost`].
#[derive(Clone, Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    roots: Vec<ElementId>,
    active: Option<ElementId>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node` as the last child of `parent` (a top-level element when `None`).
    ///
    /// # Panics
    ///
    /// Panics if the scene already holds `u32::MAX + 1` elements. Use
    /// [`Scene::try_insert`] to handle that case.
    pub fn insert(&mut self, parent: Option<ElementId>, node: SceneNode) -> ElementId {
        match self.try_insert(parent, node) {
            Some(id) => id,
            None => panic!("scene is out of element ids"),
        }
    }

    /// Like [`Scene::insert`], but returns `None` once element ids run out.
    pub fn try_insert(&mut self, parent: Option<ElementId>, node: SceneNode) -> Option<ElementId> {
        let id = ElementId::for_slot(self.slots.len())?;
        self.slots.push(Slot {
            node,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.slots.get_mut(p.idx())) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        Some(id)
    }

    /// Element data, if `id` belongs to this scene.
    pub fn node(&self, id: ElementId) -> Option<&SceneNode> {
        self.slots.get(id.idx()).map(|s| &s.node)
    }

    /// Mutable element data.
    pub fn node_mut(&mut self, id: ElementId) -> Option<&mut SceneNode> {
        self.slots.get_mut(id.idx()).map(|s| &mut s.node)
    }

    /// Parent of `id`.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.slots.get(id.idx()).and_then(|s| s.parent)
    }

    /// Children of `id` in document order.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        self.slots
            .get(id.idx())
            .map(|s| s.children.as_slice())
            .unwrap_or_default()
    }

    /// First element whose id is `id`.
    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.query_selector(&Selector::id(id))
    }

    /// Move `element` to `rect`.
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(n) = self.node_mut(element) {
            n.rect = rect;
        }
    }

    /// Set the element id.
    pub fn set_id(&mut self, element: ElementId, id: impl Into<String>) {
        if let Some(n) = self.node_mut(element) {
            n.id = Some(id.into());
        }
    }

    /// Toggle [`ElementFlags::DISABLED`].
    pub fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        self.set_flag(element, ElementFlags::DISABLED, disabled);
    }

    /// Toggle [`ElementFlags::HIDDEN`] on `element` and, implicitly, its subtree.
    pub fn set_hidden(&mut self, element: ElementId, hidden: bool) {
        self.set_flag(element, ElementFlags::HIDDEN, hidden);
    }

    fn set_flag(&mut self, element: ElementId, flag: ElementFlags, on: bool) {
        if let Some(n) = self.node_mut(element) {
            n.flags.set(flag, on);
        }
    }

    /// Attach or replace directional overrides.
    pub fn set_overrides(&mut self, element: ElementId, overrides: OverrideMap) {
        if let Some(n) = self.node_mut(element) {
            n.overrides = Some(overrides);
        }
    }

    /// Drop focus entirely.
    pub fn blur(&mut self) {
        self.active = None;
    }

    fn preorder(&self, start: &[ElementId]) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = start.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        out
    }
}

impl FocusHost for Scene {
    type Element = ElementId;

    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn focus(&mut self, element: ElementId) -> bool {
        if !self.flags(element).can_focus() {
            return false;
        }
        self.active = Some(element);
        true
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.node(element).map_or(Rect::ZERO, |n| n.rect)
    }

    fn flags(&self, element: ElementId) -> ElementFlags {
        let Some(node) = self.node(element) else {
            return ElementFlags::empty();
        };
        let mut flags = node.flags;
        let mut cursor = self.parent_of(element);
        while let Some(p) = cursor {
            if self.node(p).is_some_and(|n| n.flags.contains(ElementFlags::HIDDEN)) {
                flags |= ElementFlags::HIDDEN;
                break;
            }
            cursor = self.parent_of(p);
        }
        flags
    }

    fn descendants(&self, root: Option<ElementId>) -> impl Iterator<Item = ElementId> + '_ {
        let order = match root {
            Some(r) => self.preorder(self.children_of(r)),
            None => self.preorder(&self.roots),
        };
        order.into_iter()
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent_of(id);
        }
        false
    }

    fn query_selector(&self, selector: &Selector) -> Option<ElementId> {
        self.preorder(&self.roots)
            .into_iter()
            .find(|&id| self.node(id).is_some_and(|n| n.matches(selector)))
    }

    fn overrides(&self, element: ElementId) -> Option<&OverrideMap> {
        self.node(element).and_then(|n| n.overrides.as_ref())
    }
}
