//! Inspection of arbitrary error chains.
//!
//! These functions accept any `&(dyn Error + 'static)`. They walk the standard
//! `source()` chain (and the members of an [`Errors`] aggregate) to find the
//! outermost [`CError`], then delegate to its merge accessors.

use std::any::Any;
use std::error::Error as StdError;

use crate::error::CError;
use crate::errors::Errors;
use crate::tag::Tag;
use crate::typed::TypedKey;
use crate::value::Values;

/// First error of type `T` in the chain of `err`, `err` itself included.
///
/// An aggregate is searched member by member; its own `source()` is not
/// followed.
pub fn find<'a, T>(err: &'a (dyn StdError + 'static)) -> Option<&'a T>
where
    T: StdError + 'static,
{
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<T>() {
            return Some(found);
        }
        if let Some(errs) = e.downcast_ref::<Errors>() {
            return errs.find::<T>();
        }
        current = e.source();
    }
    None
}

/// The outermost `CError` in the chain of `err`.
#[inline]
pub fn unwrap<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a CError> {
    find::<CError>(err)
}

/// The first aggregate in the chain of `err`.
#[inline]
pub fn as_errors<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Errors> {
    find::<Errors>(err)
}

/// Merged string-keyed values, or `None` if the chain holds no `CError`.
pub fn values(err: &(dyn StdError + 'static)) -> Option<Values> {
    unwrap(err).map(CError::values)
}

/// Merged typed values, or `None` if the chain holds no `CError`.
pub fn typed_values(err: &(dyn StdError + 'static)) -> Option<Values> {
    unwrap(err).map(CError::typed_values)
}

/// Merged tags, or `None` if the chain holds no `CError`.
pub fn tags(err: &(dyn StdError + 'static)) -> Option<Vec<String>> {
    unwrap(err).map(CError::tags)
}

/// True if the chain of `err` carries `tag`. Aggregates match if any member
/// does.
pub fn has_tag(err: &(dyn StdError + 'static), tag: &Tag) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(own) = e.downcast_ref::<CError>() {
            return own.has_tag(tag);
        }
        if let Some(errs) = e.downcast_ref::<Errors>() {
            return errs.has_tag(tag);
        }
        current = e.source();
    }
    false
}

/// Typed value lookup on the outermost `CError` of the chain.
pub fn get_typed_value<'a, T: Any>(
    err: &'a (dyn StdError + 'static),
    key: &TypedKey<T>,
) -> Option<&'a T> {
    unwrap(err).and_then(|own| own.typed_value(key))
}

/// True if any error in the chain of `err` matches `target`.
///
/// A `CError` in the chain matches by identity (see [`CError::is`]); any
/// other error matches only if it is the very object `target` refers to.
pub fn is(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if std::ptr::addr_eq(e, target) {
            return true;
        }
        if let Some(own) = e.downcast_ref::<CError>() {
            if own.is(target) {
                return true;
            }
        }
        if let Some(errs) = e.downcast_ref::<Errors>() {
            return errs.is(target);
        }
        current = e.source();
    }
    false
}

/// True if `a` and `b` are the same error object.
#[inline]
pub fn same_error(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    std::ptr::addr_eq(a, b)
}
