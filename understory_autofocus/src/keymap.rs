// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key mapping layer: physical key codes to navigation directions.
//!
//! ```rust
//! use understory_autofocus::{Direction, KeyCode, KeyMappings};
//!
//! let mut mappings = KeyMappings::default();
//! assert_eq!(mappings.direction_for(KeyCode::ARROW_UP), Some(Direction::Up));
//! assert_eq!(mappings.direction_for(KeyCode::W), None);
//!
//! mappings[Direction::Up].push(KeyCode::W);
//! assert_eq!(mappings.direction_for(KeyCode::W), Some(Direction::Up));
//! ```

use core::fmt;
use core::ops::{Index, IndexMut};

use smallvec::{SmallVec, smallvec};

use crate::direction::Direction;

/// A platform key code (DOM `keyCode` numbering).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyCode(pub u32);

impl KeyCode {
    /// Left arrow.
    pub const ARROW_LEFT: Self = Self(37);
    /// Up arrow.
    pub const ARROW_UP: Self = Self(38);
    /// Right arrow.
    pub const ARROW_RIGHT: Self = Self(39);
    /// Down arrow.
    pub const ARROW_DOWN: Self = Self(40);
    /// `A`.
    pub const A: Self = Self(65);
    /// `D`.
    pub const D: Self = Self(68);
    /// `S`.
    pub const S: Self = Self(83);
    /// `W`.
    pub const W: Self = Self(87);
    /// Navigation-up key reported by some remotes.
    pub const NAVIGATION_UP: Self = Self(138);
    /// Navigation-down key.
    pub const NAVIGATION_DOWN: Self = Self(139);
    /// Navigation-left key.
    pub const NAVIGATION_LEFT: Self = Self(140);
    /// Navigation-right key.
    pub const NAVIGATION_RIGHT: Self = Self(141);
    /// Gamepad d-pad up.
    pub const GAMEPAD_DPAD_UP: Self = Self(203);
    /// Gamepad d-pad down.
    pub const GAMEPAD_DPAD_DOWN: Self = Self(204);
    /// Gamepad d-pad left.
    pub const GAMEPAD_DPAD_LEFT: Self = Self(205);
    /// Gamepad d-pad right.
    pub const GAMEPAD_DPAD_RIGHT: Self = Self(206);
    /// Gamepad left thumbstick up.
    pub const GAMEPAD_LEFT_THUMBSTICK_UP: Self = Self(211);
    /// Gamepad left thumbstick down.
    pub const GAMEPAD_LEFT_THUMBSTICK_DOWN: Self = Self(212);
    /// Gamepad left thumbstick right.
    pub const GAMEPAD_LEFT_THUMBSTICK_RIGHT: Self = Self(213);
    /// Gamepad left thumbstick left.
    pub const GAMEPAD_LEFT_THUMBSTICK_LEFT: Self = Self(214);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key codes bound to one direction.
pub type KeyList = SmallVec<[KeyCode; 4]>;

/// Per-direction key bindings, mutable at runtime.
///
/// A key code should appear under at most one direction. If it appears under
/// several, [`KeyMappings::direction_for`] returns whichever it checks first;
/// that order is not part of the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMappings {
    lists: [KeyList; 4],
}

impl Default for KeyMappings {
    /// The four arrow keys.
    fn default() -> Self {
        let mut m = Self::empty();
        m[Direction::Up] = smallvec![KeyCode::ARROW_UP];
        m[Direction::Down] = smallvec![KeyCode::ARROW_DOWN];
        m[Direction::Left] = smallvec![KeyCode::ARROW_LEFT];
        m[Direction::Right] = smallvec![KeyCode::ARROW_RIGHT];
        m
    }
}

impl KeyMappings {
    /// Mappings with no bound keys.
    pub fn empty() -> Self {
        Self {
            lists: core::array::from_fn(|_| KeyList::new()),
        }
    }

    /// Default arrows plus gamepad d-pad, left thumbstick and navigation keys.
    pub fn with_gamepad() -> Self {
        let mut m = Self::default();
        m[Direction::Up].extend([
            KeyCode::GAMEPAD_DPAD_UP,
            KeyCode::GAMEPAD_LEFT_THUMBSTICK_UP,
            KeyCode::NAVIGATION_UP,
        ]);
        m[Direction::Down].extend([
            KeyCode::GAMEPAD_DPAD_DOWN,
            KeyCode::GAMEPAD_LEFT_THUMBSTICK_DOWN,
            KeyCode::NAVIGATION_DOWN,
        ]);
        m[Direction::Left].extend([
            KeyCode::GAMEPAD_DPAD_LEFT,
            KeyCode::GAMEPAD_LEFT_THUMBSTICK_LEFT,
            KeyCode::NAVIGATION_LEFT,
        ]);
        m[Direction::Right].extend([
            KeyCode::GAMEPAD_DPAD_RIGHT,
            KeyCode::GAMEPAD_LEFT_THUMBSTICK_RIGHT,
            KeyCode::NAVIGATION_RIGHT,
        ]);
        m
    }

    /// Direction bound to `key`, or `None` if unmapped.
    pub fn direction_for(&self, key: KeyCode) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.lists[d.index()].contains(&key))
    }

    /// Remove `key` from every direction.
    pub fn unbind(&mut self, key: KeyCode) {
        for list in &mut self.lists {
            list.retain(|k| *k != key);
        }
    }
}

impl Index<Direction> for KeyMappings {
    type Output = KeyList;

    fn index(&self, direction: Direction) -> &KeyList {
        &self.lists[direction.index()]
    }
}

impl IndexMut<Direction> for KeyMappings {
    fn index_mut(&mut self, direction: Direction) -> &mut KeyList {
        &mut self.lists[direction.index()]
    }
}
