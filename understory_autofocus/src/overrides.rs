// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element override maps: explicit "go here on direction X" targets.
//!
//! Maps are validated once when attached to an element. Their selectors stay
//! unresolved until navigation time, so a target may appear, move or vanish
//! between calls.
//!
//! ```rust
//! use understory_autofocus::{Direction, OverrideMap};
//!
//! let map = OverrideMap::parse("{ left: '#btn4', right: '#btn2' }").unwrap();
//! assert_eq!(map.get(Direction::Left).unwrap().id_name(), Some("btn4"));
//! assert!(map.get(Direction::Up).is_none());
//! ```

use core::str::FromStr;

use thiserror::Error;

use crate::direction::{Direction, ParseDirectionError};
use crate::host::FocusHost;
use crate::selector::{Selector, SelectorError};

/// Error produced while parsing a declarative override map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OverrideParseError {
    /// The text did not follow `{ direction: 'selector', ... }`.
    #[error("expected {expected} at byte {offset}")]
    Syntax {
        /// What the parser was looking for.
        expected: &'static str,
        /// Byte offset where parsing stopped.
        offset: usize,
    },
    /// A key did not name a direction.
    #[error(transparent)]
    Direction(#[from] ParseDirectionError),
    /// A value was not a supported selector.
    #[error("invalid selector for `{direction}`: {source}")]
    Selector {
        /// The direction whose value failed.
        direction: Direction,
        /// Underlying selector error.
        source: SelectorError,
    },
    /// The same direction was declared twice.
    #[error("direction `{0}` declared more than once")]
    Duplicate(Direction),
}

/// Explicit navigation targets for one element, keyed by direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverrideMap {
    targets: [Option<Selector>; 4],
}

impl OverrideMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, direction: Direction, selector: Selector) -> Self {
        self.set(direction, Some(selector));
        self
    }

    /// Set or clear the target for `direction`.
    pub fn set(&mut self, direction: Direction, selector: Option<Selector>) {
        self.targets[direction.index()] = selector;
    }

    /// Target selector for `direction`.
    pub fn get(&self, direction: Direction) -> Option<&Selector> {
        self.targets[direction.index()].as_ref()
    }

    /// Whether no direction has a target.
    pub fn is_empty(&self) -> bool {
        self.targets.iter().all(Option::is_none)
    }

    /// Parse the declarative form `{ left: '#a', right: "#b" }`.
    ///
    /// Braces are optional, keys may be quoted, and a trailing comma is accepted.
    pub fn parse(text: &str) -> Result<Self, OverrideParseError> {
        let mut p = Cursor { text, pos: 0 };
        let mut map = Self::default();
        p.skip_ws();
        let braced = p.eat('{');
        loop {
            p.skip_ws();
            if p.at_end() || (braced && p.peek() == Some('}')) {
                break;
            }
            let key = match p.peek() {
                Some(q @ ('\'' | '"')) => p.quoted(q)?,
                _ => p.word(),
            };
            if key.is_empty() {
                return Err(p.expected("a direction name"));
            }
            let direction: Direction = key.parse()?;
            p.skip_ws();
            if !p.eat(':') {
                return Err(p.expected("`:`"));
            }
            p.skip_ws();
            let value = match p.peek() {
                Some(q @ ('\'' | '"')) => p.quoted(q)?,
                _ => return Err(p.expected("a quoted selector")),
            };
            let selector = Selector::parse(value)
                .map_err(|source| OverrideParseError::Selector { direction, source })?;
            if map.get(direction).is_some() {
                return Err(OverrideParseError::Duplicate(direction));
            }
            map.set(direction, Some(selector));
            p.skip_ws();
            if !p.eat(',') {
                break;
            }
        }
        p.skip_ws();
        if braced && !p.eat('}') {
            return Err(p.expected("`}`"));
        }
        p.skip_ws();
        if !p.at_end() {
            return Err(p.expected("end of input"));
        }
        Ok(map)
    }
}

impl FromStr for OverrideMap {
    type Err = OverrideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn word(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn quoted(&mut self, quote: char) -> Result<&'a str, OverrideParseError> {
        self.eat(quote);
        let rest = self.rest();
        let Some(end) = rest.find(quote) else {
            return Err(self.expected("a closing quote"));
        };
        self.pos += end + quote.len_utf8();
        Ok(&rest[..end])
    }

    fn expected(&self, expected: &'static str) -> OverrideParseError {
        OverrideParseError::Syntax {
            expected,
            offset: self.pos,
        }
    }
}

/// Resolve `element`'s override target for `direction` against the live tree.
///
/// Returns `None` when the element has no map, the map has no entry for
/// `direction`, or the selector matches nothing.
pub fn resolve_override<H: FocusHost>(
    host: &H,
    element: H::Element,
    direction: Direction,
) -> Option<H::Element> {
    let selector = host.overrides(element)?.get(direction)?;
    let target = host.query_selector(selector);
    if target.is_none() {
        tracing::debug!(%selector, %direction, "override selector matched nothing");
    }
    target
}
