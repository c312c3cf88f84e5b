use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

/// A categorical label attached to errors.
///
/// Tags compare by value: two tags built from the same string are equal and
/// collapse in a tag set. Declare them once as constants:
///
/// ```
/// use cerror::Tag;
/// const NOT_FOUND: Tag = Tag::new("not_found");
/// assert_eq!(NOT_FOUND, Tag::owned(String::from("not_found")));
/// ```
///
/// # Naming conventions
///
/// | Style          | Example                          |
/// |----------------|----------------------------------|
/// | snake_case     | `not_found`, `invalid_input`     |
/// | dotted domain  | `db.timeout`, `auth.expired`     |
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    value: Cow<'static, str>,
}

impl Tag {
    /// Construct a tag from a static string.
    pub const fn new(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }

    /// Construct a tag from a runtime string.
    pub fn owned(value: impl Into<String>) -> Self {
        Self {
            value: Cow::Owned(value.into()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl core::fmt::Debug for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Tag({})", self.value)
    }
}

impl core::fmt::Display for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

/// Local tag storage of one error.
pub(crate) type TagSet = BTreeSet<Tag>;
