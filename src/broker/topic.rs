//! Topic keys
//!
//! A `TopicKey` names one logical notification channel. Keys are never built
//! from free-form strings; they are derived from an ordered list of
//! `KeyPart`s joined with a separator (`-` unless configured otherwise), so
//! room `1` with kind `chat` becomes `1-chat`.
//!
//! Derivation rejects anything that would make the join ambiguous: an empty
//! list, an empty part, or a part that contains the separator. With those
//! rules gone, equal part lists give equal keys and different part lists give
//! different keys.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::utils::error::TopicError;

pub const DEFAULT_SEPARATOR: char = '-';

/// Identifier of a logical channel. Cheap to clone, compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopicKey(String);

impl TopicKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TopicKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One component of a topic key, stored in its canonical text form.
///
/// Two parts are the same component when they render the same, so
/// `KeyPart::from(1)` and `KeyPart::from("1")` are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPart(String);

impl KeyPart {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        Self(value.to_string())
    }
}

macro_rules! key_part_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyPart {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

key_part_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

/// Joins key parts with a fixed separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDeriver {
    separator: char,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl KeyDeriver {
    /// Build a deriver around `separator`.
    ///
    /// The separator has to be a visible punctuation-like character: letters,
    /// digits, whitespace and control characters routinely show up inside
    /// components and are refused.
    pub fn new(separator: char) -> Result<Self, TopicError> {
        if separator.is_alphanumeric() || separator.is_whitespace() || separator.is_control() {
            return Err(TopicError::InvalidSeparator(separator));
        }
        Ok(Self { separator })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn derive<I, P>(&self, components: I) -> Result<TopicKey, TopicError>
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        let mut key = String::new();
        let mut count = 0;

        for (index, part) in components.into_iter().map(Into::into).enumerate() {
            let part = part.as_str();
            if part.is_empty() {
                return Err(TopicError::EmptyComponent { index });
            }
            if part.contains(self.separator) {
                return Err(TopicError::ContainsSeparator {
                    component: part.to_string(),
                    separator: self.separator,
                });
            }
            if index > 0 {
                key.push(self.separator);
            }
            key.push_str(part);
            count += 1;
        }

        if count == 0 {
            return Err(TopicError::EmptySequence);
        }
        Ok(TopicKey(key))
    }
}

/// Derive a key with the default `-` separator.
pub fn derive_key<I, P>(components: I) -> Result<TopicKey, TopicError>
where
    I: IntoIterator<Item = P>,
    P: Into<KeyPart>,
{
    KeyDeriver::default().derive(components)
}
