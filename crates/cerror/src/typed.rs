//! Type-safe keys for values attached to errors.
//!
//! A [`TypedKey<T>`] is a name plus a type. The type is checked when reading
//! the value back; it is not stored with the error.
//!
//! ```
//! use cerror::{CError, TypedKey, typed_value};
//!
//! const USER_ID: TypedKey<u64> = TypedKey::new("user_id");
//!
//! let err = CError::new("lookup failed", [typed_value(&USER_ID, 42)]);
//! assert_eq!(err.typed_value(&USER_ID), Some(&42));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// A name-carrying handle parameterized by the value type it addresses.
///
/// Keys are plain values: there is no registry and no uniqueness check.
/// Two keys with the same name address the same slot; if their types differ,
/// reads through the mismatching key return `None`.
pub struct TypedKey<T> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// Key with a runtime name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for TypedKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for TypedKey<T> {}

impl<T> fmt::Debug for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedKey<{}>({})", std::any::type_name::<T>(), self.name)
    }
}

impl<T> fmt::Display for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(Debug)]
    struct NotSendable(std::rc::Rc<u8>);

    #[test]
    fn name_and_display() {
        let key = TypedKey::<String>::new("user_id");
        assert_eq!(key.name(), "user_id");
        assert_eq!(key.to_string(), "user_id");

        let empty = TypedKey::<String>::named("");
        assert_eq!(empty.name(), "");
    }

    #[test]
    fn same_name_same_type_interchangeable() {
        let a = TypedKey::<i32>::new("count");
        let b = TypedKey::<i32>::named(String::from("count"));
        assert_eq!(a, b);
        assert_eq!(a.clone(), b);
    }

    #[test]
    fn debug_shows_type() {
        let key = TypedKey::<u64>::new("id");
        assert_eq!(format!("{:?}", key), "TypedKey<u64>(id)");
    }

    #[test]
    fn key_is_send_sync_for_any_t() {
        fn assert_send_sync<K: Send + Sync>() {}
        assert_send_sync::<TypedKey<NotSendable>>();
    }
}
