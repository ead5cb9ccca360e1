// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory AutoFocus: directional (XY) focus navigation.
//!
//! Given the focused element and a direction, the engine picks the element a
//! user most likely means by "up", "down", "left" or "right". It is built from:
//!
//! - A **host boundary** ([`FocusHost`]): the engine reads live rectangles,
//!   flags and overrides from the host's element tree and asks it to move
//!   focus. It never owns elements or caches geometry.
//! - **Shadow scoring** ([`geometry`]): candidates must advance in the
//!   direction and overlap the reference's perpendicular extent; closer,
//!   better-aligned candidates score higher.
//! - **Overrides** ([`OverrideMap`]): per-element, per-direction selectors
//!   that bypass scoring. Selectors are resolved against the live tree.
//! - **History** ([`history`]): reversing a move returns where it came from,
//!   and runs of moves stay in their row or column.
//! - **Key mappings** ([`KeyMappings`]) and **events** ([`events`]): mapped
//!   keys drive moves while the engine is enabled, and listeners may cancel a
//!   move before it happens.
//! - A **cross-frame bridge** ([`frame`]): nested contexts hand moves to each
//!   other over a message channel the host provides.
//!
//! ## Minimal example
//!
//! Three buttons in a row, using the in-memory [`scene::Scene`] host:
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_autofocus::scene::{Scene, SceneNode};
//! use understory_autofocus::{AutoFocus, Direction, FocusHost, KeyCode, MoveOutcome};
//!
//! let mut scene = Scene::new();
//! let [a, b, c] = [0.0, 120.0, 240.0]
//!     .map(|x| scene.insert(None, SceneNode::button(Rect::new(x, 0.0, x + 100.0, 40.0))));
//! scene.focus(a);
//!
//! let mut engine = AutoFocus::new();
//! engine.enable_auto_focus();
//!
//! assert_eq!(
//!     engine.handle_key_down(&mut scene, KeyCode::ARROW_RIGHT),
//!     Some(MoveOutcome::Moved(b))
//! );
//! assert_eq!(
//!     engine.find_next_focus_element(&scene, Direction::Right, &Default::default()),
//!     Some(c)
//! );
//! // Unmapped keys are left to the host.
//! assert_eq!(engine.handle_key_down(&mut scene, KeyCode::W), None);
//! ```
//!
//! ## Overrides
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_autofocus::scene::{Scene, SceneNode};
//! use understory_autofocus::{AutoFocus, Direction, FocusHost, NavigateOptions, OverrideMap};
//!
//! let mut scene = Scene::new();
//! let menu = scene.insert(None, SceneNode::button(Rect::new(0.0, 0.0, 100.0, 40.0)).with_id("menu"));
//! let play = scene.insert(
//!     None,
//!     SceneNode::button(Rect::new(0.0, 100.0, 100.0, 140.0))
//!         .with_overrides(OverrideMap::parse("{ right: '#menu' }").unwrap()),
//! );
//! scene.focus(play);
//!
//! let mut engine = AutoFocus::new();
//! // Nothing lies to the right geometrically; the override decides.
//! assert_eq!(engine.move_focus(&mut scene, Direction::Right, &NavigateOptions::default()), Some(menu));
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo`, `tracing` and `thiserror`.
//! - `libm`: `no_std` float math for `kurbo`.
//! - `serde`: `Serialize`/`Deserialize` for [`Direction`], [`KeyCode`] and
//!   the [`frame`] wire types.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod direction;
pub mod engine;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod history;
pub mod host;
pub mod keymap;
pub mod overrides;
pub mod registry;
pub mod resolver;
pub mod scene;
pub mod selector;

pub use direction::{Axis, Direction, ParseDirectionError};
pub use engine::{AutoFocus, AutoFocusConfig, MoveOutcome};
pub use events::{FocusChanged, FocusChanging, ListenerId, Verdict};
pub use frame::{Delivery, DiscardReason, Envelope, FrameMessage, Peer, RelayToken};
pub use geometry::ScoreWeights;
pub use host::{ElementFlags, FocusHost};
pub use keymap::{KeyCode, KeyMappings};
pub use overrides::{OverrideMap, OverrideParseError};
pub use resolver::NavigateOptions;
pub use selector::{Selector, SelectorError};
