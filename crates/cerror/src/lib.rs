//! # cerror — Contextual Error
//!
//! Structured errors that carry a stack trace, key/value context, tags and a
//! stable identity, and merge that context as they are wrapped across call
//! boundaries.
//!
//! ## Design
//!
//! A [`CError`] is an ordinary `std::error::Error`. Each wrap allocates a new
//! node pointing at its cause; nothing is mutated on the way up. Readers ask
//! the outermost error for [`values`](CError::values),
//! [`typed_values`](CError::typed_values) or [`tags`](CError::tags) and get
//! the chain merged, deepest layer first, outer layer winning.
//!
//! - **String values**: `value("user", "alice")`, any `Debug + Serialize` payload.
//! - **Typed values**: `typed_value(&USER_ID, 42)`, read back as `Option<&T>`.
//! - **Tags**: `tag(NOT_FOUND)`, categorical labels declared as constants.
//! - **Identity**: `id("E_NOT_FOUND")`, so [`CError::is`] matches sentinel
//!   errors across independent chains.
//!
//! ## Quick Start
//!
//! ```rust
//! use cerror::{CError, CResult, Tag, TypedKey, id, tag, typed_value, value};
//!
//! const NOT_FOUND: Tag = Tag::new("not_found");
//! const USER_ID: TypedKey<u64> = TypedKey::new("user_id");
//!
//! fn find_user(user_id: u64) -> CResult<String> {
//!     Err(CError::new("user not found", [
//!         typed_value(&USER_ID, user_id),
//!         tag(NOT_FOUND),
//!         id("E_USER_NOT_FOUND"),
//!     ]))
//! }
//!
//! fn handle(user_id: u64) -> CResult<String> {
//!     find_user(user_id).map_err(|e| CError::wrap(e, "handler error", [value("route", "/users")]))
//! }
//!
//! let err = handle(7).unwrap_err();
//! assert_eq!(err.to_string(), "handler error: user not found");
//! assert_eq!(err.typed_value(&USER_ID), Some(&7));
//! assert!(err.has_tag(&NOT_FOUND));
//!
//! let sentinel = CError::new("user not found", [id("E_USER_NOT_FOUND")]);
//! assert!(cerror::chain::is(&err, &sentinel));
//! ```
//!
//! ## Presentation
//!
//! | Form               | Produces |
//! |--------------------|----------|
//! | `{}`               | message chain, `"outer: inner: root"` |
//! | `{:?}`             | message chain, stack, merged values |
//! | `serde_json`       | [`Printable`] tree with merged context |
//! | [`CError::log_value`] | [`LogValue`] attribute tree of local state |
//!
//! ## Environment
//!
//! Stack capture is configured by `CERROR_CAPTURE_STACK` and
//! `CERROR_MAX_FRAMES`; see [`config`].

mod error;
mod option;
mod stack;
mod tag;
mod typed;
mod value;
mod builder;
mod errors;
mod printable;
#[macro_use]
mod macros;
mod convert;

pub mod chain;
pub mod config;
pub mod log;

// ── Public API ────────────────────────────────────────────────────

pub use builder::Builder;
pub use convert::ResultExt;
pub use error::{with, BoxError, CError, SharedError};
pub use errors::{append, join, Errors, IntoEntry, MaybeErrors};
pub use log::LogValue;
pub use option::{id, tag, typed_value, value, Opt};
pub use printable::{Printable, PrintableCause};
pub use stack::{Frame, Stack};
pub use tag::Tag;
pub use typed::TypedKey;
pub use value::{Attachment, Value, Values};

/// Convenience Result alias.
pub type CResult<T> = Result<T, CError>;

/// Common imports.
pub mod prelude {
    pub use crate::{
        id, tag, typed_value, value, with, CError, CResult, Errors, MaybeErrors, ResultExt, Tag,
        TypedKey,
    };
}
