// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A compound selector subset used by override targets.
//!
//! Supported forms are a single compound selector made of an optional tag
//! name, an optional `#id`, and any number of `.class` parts, for example
//! `#save`, `.primary`, `button`, or `button#save.primary`. Combinators,
//! attribute selectors and pseudo-classes are rejected.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// Error produced while parsing a [`Selector`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector text was empty.
    #[error("empty selector")]
    Empty,
    /// A `#` or `.` was not followed by a name.
    #[error("missing name after `{marker}` at byte {offset}")]
    MissingName {
        /// The marker character.
        marker: char,
        /// Byte offset of the marker.
        offset: usize,
    },
    /// A second `#id` part was found.
    #[error("selector has more than one id")]
    DuplicateId,
    /// A character outside the supported grammar.
    #[error("unsupported character `{ch}` at byte {offset}")]
    Unsupported {
        /// The offending character.
        ch: char,
        /// Byte offset of the character.
        offset: usize,
    },
}

/// A parsed compound selector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: SmallVec<[String; 2]>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    /// Parse selector text.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut sel = Self::default();
        let mut chars = text.char_indices().peekable();
        while let Some(&(offset, c)) = chars.peek() {
            let marker = match c {
                '#' | '.' => {
                    chars.next();
                    Some(c)
                }
                c if is_name_char(c) && offset == 0 => None,
                ch => return Err(SelectorError::Unsupported { ch, offset }),
            };
            let mut name = String::new();
            while let Some(&(_, n)) = chars.peek() {
                if !is_name_char(n) {
                    break;
                }
                name.push(n);
                chars.next();
            }
            match marker {
                _ if name.is_empty() => {
                    return Err(SelectorError::MissingName {
                        marker: marker.unwrap_or(c),
                        offset,
                    });
                }
                None => sel.tag = Some(name.to_ascii_lowercase()),
                Some('#') if sel.id.is_some() => return Err(SelectorError::DuplicateId),
                Some('#') => sel.id = Some(name),
                Some(_) => sel.classes.push(name),
            }
        }
        Ok(sel)
    }

    /// Selector matching a single id.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Required tag name (lowercase), if any.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Required id, if any.
    pub fn id_name(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Required classes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Test an element described by its tag, id and class list.
    pub fn matches<'a>(
        &self,
        tag: &str,
        id: Option<&str>,
        classes: impl IntoIterator<Item = &'a str> + Clone,
    ) -> bool {
        if let Some(t) = &self.tag
            && !t.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(want) = &self.id
            && id != Some(want.as_str())
        {
            return false;
        }
        self.classes
            .iter()
            .all(|want| classes.clone().into_iter().any(|c| c == want.as_str()))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t) = &self.tag {
            f.write_str(t)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for c in &self.classes {
            write!(f, ".{c}")?;
        }
        Ok(())
    }
}
