//! Type-erased values attached to errors.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Anything that can be attached to an error: debuggable, serializable,
/// shareable across threads.
///
/// Blanket-implemented; never implement it by hand.
pub trait Attachment: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn to_json(&self) -> serde_json::Value;
}

impl<T> Attachment for T
where
    T: Any + fmt::Debug + Serialize + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::Value::String(format!("{:?}", self)))
    }
}

/// A shared, type-erased value. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Value(Arc<dyn Attachment>);

/// Key → value mapping as returned by the merge accessors.
pub type Values = BTreeMap<String, Value>;

impl Value {
    /// Wrap `value`. An existing `Value` is shared, not nested.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + Serialize + Send + Sync,
    {
        if let Some(existing) = (&value as &dyn Any).downcast_ref::<Value>() {
            return existing.clone();
        }
        Self(Arc::new(value))
    }

    /// Borrow the payload if it is exactly a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// The payload as a string slice, for `&'static str` and `String` payloads.
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.downcast_ref::<&'static str>() {
            return Some(s);
        }
        self.downcast_ref::<String>().map(String::as_str)
    }

    /// JSON form of the payload. Falls back to the `Debug` string if the
    /// payload cannot be represented as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        self.0.to_json()
    }
}

impl fmt::Display for Value {
    /// Strings render bare, everything else as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.as_str() {
            return f.write_str(s);
        }
        match self.to_json() {
            serde_json::Value::String(s) => f.write_str(&s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
