//! Functional options applied to an error under construction.
//!
//! An [`Opt`] mutates exactly one field of a partially built error. Options
//! are applied left to right; for the same key, the later option wins.
//! Options are reusable: a [`Builder`](crate::Builder) applies the same set
//! to every error it creates.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Inner;
use crate::tag::Tag;
use crate::typed::TypedKey;
use crate::value::Value;

/// A reusable mutator over an error under construction.
#[derive(Clone)]
pub struct Opt {
    apply: Arc<dyn Fn(&mut Inner) + Send + Sync>,
    label: &'static str,
}

impl Opt {
    fn new<F>(label: &'static str, apply: F) -> Self
    where
        F: Fn(&mut Inner) + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(apply),
            label,
        }
    }

    #[inline]
    pub(crate) fn apply(&self, inner: &mut Inner) {
        (self.apply)(inner)
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opt({})", self.label)
    }
}

/// Set or override one string-keyed value.
pub fn value<T>(key: impl Into<String>, value: T) -> Opt
where
    T: Any + fmt::Debug + Serialize + Send + Sync,
{
    let key = key.into();
    let value = Value::new(value);
    Opt::new("value", move |inner| {
        inner.values.insert(key.clone(), value.clone());
    })
}

/// Set or override one typed value under `key.name()`.
///
/// Overwrites any prior typed value with that name, whatever its type.
/// String-keyed values with the same name are not affected.
pub fn typed_value<T>(key: &TypedKey<T>, value: T) -> Opt
where
    T: Any + fmt::Debug + Serialize + Send + Sync,
{
    let name = key.name().to_string();
    let value = Value::new(value);
    Opt::new("typed_value", move |inner| {
        inner.typed_values.insert(name.clone(), value.clone());
    })
}

/// Add one tag.
pub fn tag(tag: Tag) -> Opt {
    Opt::new("tag", move |inner| {
        inner.tags.insert(tag.clone());
    })
}

/// Set the identity used by [`CError::is`](crate::CError::is).
///
/// An empty identity means "compare by instance".
pub fn id(id: impl Into<String>) -> Opt {
    let id = id.into();
    Opt::new("id", move |inner| {
        inner.id.clone_from(&id);
    })
}
