//! Aggregate of independent errors treated as one.
//!
//! An empty aggregate is represented as `None`: [`join`] and [`append`] return
//! `Option<Errors>` and never `Some` of zero members. [`MaybeErrors`] gives
//! `Option<Errors>` the read surface of an aggregate, with `None` acting as
//! the empty one.
//!
//! ```
//! use cerror::{append, join, CError, MaybeErrors};
//!
//! let mut errs = None;
//! for field in ["name", "email"] {
//!     errs = append!(errs, CError::new(format!("{field} is required"), []));
//! }
//! assert_eq!(errs.len(), 2);
//! assert_eq!(errs.message(), "name is required\nemail is required");
//!
//! let none = join!(None::<CError>);
//! assert!(none.is_empty());
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::chain;
use crate::error::{BoxError, CError};
use crate::tag::Tag;

/// Ordered, heterogeneous list of errors.
#[derive(Default)]
pub struct Errors {
    errs: Vec<BoxError>,
}

/// Anything that can become one aggregate entry. `None` entries are skipped.
pub trait IntoEntry {
    fn into_entry(self) -> Option<BoxError>;
}

impl IntoEntry for CError {
    fn into_entry(self) -> Option<BoxError> {
        Some(Box::new(self))
    }
}

impl IntoEntry for Errors {
    fn into_entry(self) -> Option<BoxError> {
        Some(Box::new(self))
    }
}

impl IntoEntry for BoxError {
    fn into_entry(self) -> Option<BoxError> {
        Some(self)
    }
}

impl IntoEntry for io::Error {
    fn into_entry(self) -> Option<BoxError> {
        Some(Box::new(self))
    }
}

impl<T: IntoEntry> IntoEntry for Option<T> {
    fn into_entry(self) -> Option<BoxError> {
        self.and_then(IntoEntry::into_entry)
    }
}

/// Combine entries into an aggregate. Absent entries are dropped; nested
/// aggregates are kept as single members. `None` if nothing remains.
pub fn join<I>(entries: I) -> Option<Errors>
where
    I: IntoIterator,
    I::Item: IntoEntry,
{
    let errs: Vec<BoxError> = entries.into_iter().filter_map(IntoEntry::into_entry).collect();
    Errors { errs }.error_or_none()
}

/// Add entries to `base` (or to a new aggregate). Absent entries are dropped;
/// nested aggregates are flattened one level. `None` if nothing remains.
pub fn append<I>(base: Option<Errors>, entries: I) -> Option<Errors>
where
    I: IntoIterator,
    I::Item: IntoEntry,
{
    let mut errs = base.unwrap_or_default();
    for entry in entries {
        errs.push(entry);
    }
    errs.error_or_none()
}

#[inline]
fn as_dyn(err: &BoxError) -> &(dyn StdError + 'static) {
    &**err
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry, flattening a nested aggregate one level.
    pub fn push(&mut self, entry: impl IntoEntry) {
        let Some(err) = entry.into_entry() else {
            return;
        };
        match err.downcast::<Errors>() {
            Ok(nested) => self.errs.extend(nested.errs),
            Err(err) => self.errs.push(err),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errs.is_empty()
    }

    /// Members in insertion order.
    #[inline]
    pub fn errors(&self) -> &[BoxError] {
        &self.errs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxError> {
        self.errs.iter()
    }

    pub fn into_vec(self) -> Vec<BoxError> {
        self.errs
    }

    /// `Some(self)` unless empty.
    pub fn error_or_none(self) -> Option<Errors> {
        if self.errs.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// True if any member's chain matches `target`.
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        self.errs.iter().any(|err| chain::is(as_dyn(err), target))
    }

    /// First `T` found in the members' chains, in member order.
    pub fn find<T: StdError + 'static>(&self) -> Option<&T> {
        self.errs.iter().find_map(|err| chain::find::<T>(as_dyn(err)))
    }

    /// True if any member carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.errs.iter().any(|err| chain::has_tag(as_dyn(err), tag))
    }
}

impl IntoIterator for Errors {
    type Item = BoxError;
    type IntoIter = std::vec::IntoIter<BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errs.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a BoxError;
    type IntoIter = std::slice::Iter<'a, BoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errs.iter()
    }
}

impl StdError for Errors {}

impl fmt::Display for Errors {
    /// Member messages joined by newlines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errs.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Errors ({}):", self.errs.len())?;
        for (i, err) in self.errs.iter().enumerate() {
            writeln!(f, "  [{}] {:?}", i, err)?;
        }
        Ok(())
    }
}

// ── Nil-safe surface ──────────────────────────────────────────────

/// Aggregate queries on a possibly absent aggregate. `None` is the empty
/// aggregate.
pub trait MaybeErrors {
    fn maybe_errors(&self) -> Option<&Errors>;

    fn len(&self) -> usize {
        self.maybe_errors().map_or(0, Errors::len)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display form; empty for `None`.
    fn message(&self) -> String {
        self.maybe_errors().map(|errs| errs.to_string()).unwrap_or_default()
    }

    fn has_tag(&self, tag: &Tag) -> bool {
        self.maybe_errors().is_some_and(|errs| errs.has_tag(tag))
    }

    fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        self.maybe_errors().is_some_and(|errs| errs.is(target))
    }

    fn log_value(&self) -> crate::log::LogValue {
        self.maybe_errors()
            .map_or(crate::log::LogValue::Null, Errors::log_value)
    }

    /// The aggregate if it has members.
    fn error_or_none(&self) -> Option<&Errors> {
        self.maybe_errors().filter(|errs| !errs.is_empty())
    }
}

impl MaybeErrors for Option<Errors> {
    fn maybe_errors(&self) -> Option<&Errors> {
        self.as_ref()
    }
}

impl MaybeErrors for Option<&Errors> {
    fn maybe_errors(&self) -> Option<&Errors> {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id, tag};

    const NOT_FOUND: Tag = Tag::new("not_found");

    fn e(msg: &str) -> CError {
        CError::new(msg, [])
    }

    #[test]
    fn join_filters_absent() {
        let errs = join([Some(e("a")), None, Some(e("b"))]).unwrap();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs.to_string(), "a\nb");

        assert!(join([None::<CError>, None]).is_none());
        assert!(join(Vec::<CError>::new()).is_none());
    }

    #[test]
    fn join_keeps_nested() {
        let inner = join([e("a"), e("b")]);
        let outer = join([inner, join([e("c")])]).unwrap();
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn append_flattens_one_level() {
        let errs = append(None, [join([e("e1"), e("e2")])]);
        let errs = append(errs, [join([e("e3")])]);
        assert_eq!(errs.len(), 3);
        assert_eq!(errs.message(), "e1\ne2\ne3");
    }

    #[test]
    fn append_nothing_keeps_base() {
        let base = join([e("a")]);
        let errs = append(base, Vec::<CError>::new());
        assert_eq!(errs.len(), 1);
        assert!(append(None, [None::<CError>]).is_none());
    }

    #[test]
    fn display_single_and_empty() {
        assert_eq!(join([e("only")]).unwrap().to_string(), "only");
        assert_eq!(Errors::new().to_string(), "");
    }

    #[test]
    fn debug_lists_members() {
        let errs = join([e("first"), e("second")]).unwrap();
        let report = format!("{:?}", errs);
        assert!(report.starts_with("Errors (2):\n"));
        assert!(report.contains("  [0] first"));
        assert!(report.contains("  [1] second"));
    }

    #[test]
    fn is_and_has_tag_over_members() {
        let sentinel = CError::new("conflict", [id("E_CONFLICT")]);
        let errs = join([
            e("plain"),
            CError::wrap(CError::new("dup", [id("E_CONFLICT"), tag(NOT_FOUND)]), "insert", []),
        ])
        .unwrap();
        assert!(errs.is(&sentinel));
        assert!(errs.has_tag(&NOT_FOUND));
        assert!(!errs.has_tag(&Tag::new("timeout")));
        assert!(!errs.is(&e("plain")));
    }

    #[test]
    fn find_member_type() {
        let mut errs = Errors::new();
        errs.push(e("cerror"));
        errs.push(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        let kind = errs.find::<io::Error>().map(io::Error::kind);
        assert_eq!(kind, Some(io::ErrorKind::TimedOut));
        assert_eq!(errs.find::<CError>().map(CError::message), Some("cerror"));
    }

    #[test]
    fn nil_safety() {
        let none: Option<Errors> = None;
        assert_eq!(none.len(), 0);
        assert!(none.is_empty());
        assert_eq!(none.message(), "");
        assert!(!none.has_tag(&NOT_FOUND));
        assert!(!none.is(&e("x")));
        assert!(none.error_or_none().is_none());
        assert!(none.log_value().is_null());

        let some = join([e("x")]);
        assert_eq!(some.as_ref().len(), 1);
        assert!(some.error_or_none().is_some());
    }

    #[test]
    fn error_or_none_on_empty() {
        assert!(Errors::new().error_or_none().is_none());
        let mut errs = Errors::new();
        errs.push(None::<CError>);
        assert!(errs.is_empty());
        errs.push(e("x"));
        assert!(errs.error_or_none().is_some());
    }

    #[test]
    fn iteration() {
        let errs = join([e("a"), e("b")]).unwrap();
        let messages: Vec<String> = errs.iter().map(|err| err.to_string()).collect();
        assert_eq!(messages, vec!["a", "b"]);
        assert_eq!(errs.errors().len(), 2);
        assert_eq!((&errs).into_iter().count(), 2);
        assert_eq!(errs.into_vec().len(), 2);
    }
}
