use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::chain;
use crate::option::Opt;
use crate::stack::{self, Frame, Stack};
use crate::tag::{Tag, TagSet};
use crate::typed::TypedKey;
use crate::value::Values;

/// Owned, type-erased error. Accepted wherever a cause is expected.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared, type-erased error. The cause link of a [`CError`].
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// An error value carrying a stack trace, key/value context, tags and an
/// optional identity.
///
/// Context is merged across the wrap chain on read: [`values`](Self::values),
/// [`typed_values`](Self::typed_values) and [`tags`](Self::tags) combine every
/// `CError` layer, deepest first, so the outermost layer wins on collisions.
/// Merging stops at the first cause that is not itself a `CError`.
///
/// ```
/// use cerror::{CError, Tag, tag, value};
///
/// const NOT_FOUND: Tag = Tag::new("not_found");
///
/// let base = CError::new("fail", [value("user", "bob"), tag(NOT_FOUND)]);
/// let err = CError::wrap(base, "handler error", [value("user", "alice")]);
///
/// assert_eq!(err.to_string(), "handler error: fail");
/// assert_eq!(err.values()["user"].as_str(), Some("alice"));
/// assert_eq!(err.tags(), vec!["not_found"]);
/// ```
///
/// # Identity
///
/// Errors created with an [`id`](crate::id) option compare equal through
/// [`is`](Self::is) when their ids match, across independent wrap chains.
/// Errors without an id only match themselves. A clone is a distinct instance.
#[derive(Clone)]
pub struct CError {
    inner: Box<Inner>,
}

/// Per-node state. Options mutate this while the error is being built.
#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) message: String,
    pub(crate) id: String,
    pub(crate) stack: Stack,
    pub(crate) cause: Option<SharedError>,
    pub(crate) values: Values,
    pub(crate) typed_values: Values,
    pub(crate) tags: TagSet,
}

impl Inner {
    pub(crate) fn blank(message: String, stack: Stack, cause: Option<SharedError>) -> Self {
        Self {
            message,
            id: String::new(),
            stack,
            cause,
            values: Values::new(),
            typed_values: Values::new(),
            tags: TagSet::new(),
        }
    }
}

// Unlinks uniquely owned `CError` causes one at a time so dropping a deep
// chain does not recurse once per layer.
impl Drop for Inner {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(mut shared) = next {
            next = Arc::get_mut(&mut shared)
                .and_then(|cause| cause.downcast_mut::<CError>())
                .and_then(|own| own.inner.cause.take());
        }
    }
}

// ── Constructors ──────────────────────────────────────────────────

impl CError {
    /// Create a new error with a message and options.
    pub fn new(message: impl Into<String>, opts: impl IntoIterator<Item = Opt>) -> Self {
        Self::build(Inner::blank(message.into(), stack::capture(), None), opts)
    }

    /// Create a new error caused by `cause`.
    ///
    /// `cause` may be another `CError` or any foreign error.
    pub fn wrap<E>(cause: E, message: impl Into<String>, opts: impl IntoIterator<Item = Opt>) -> Self
    where
        E: Into<BoxError>,
    {
        let cause: SharedError = Arc::from(cause.into());
        Self::build(Inner::blank(message.into(), stack::capture(), Some(cause)), opts)
    }

    /// Like [`wrap`](Self::wrap), but a `None` cause yields an error without
    /// a cause.
    pub fn wrap_opt<E>(
        cause: Option<E>,
        message: impl Into<String>,
        opts: impl IntoIterator<Item = Opt>,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        let cause = cause.map(|c| SharedError::from(c.into()));
        Self::build(Inner::blank(message.into(), stack::capture(), cause), opts)
    }

    /// Create an error around an already shared cause.
    pub fn wrap_shared(
        cause: SharedError,
        message: impl Into<String>,
        opts: impl IntoIterator<Item = Opt>,
    ) -> Self {
        Self::build(Inner::blank(message.into(), stack::capture(), Some(cause)), opts)
    }

    pub(crate) fn build(mut inner: Inner, opts: impl IntoIterator<Item = Opt>) -> Self {
        for opt in opts {
            opt.apply(&mut inner);
        }
        Self {
            inner: Box::new(inner),
        }
    }

    /// Member wrap: a new error with this error's message, id, values,
    /// typed values and tags, a fresh stack, and `cause` as its cause.
    /// `opts` are applied after the copy.
    ///
    /// ```
    /// use cerror::{CError, id, value};
    ///
    /// let template = CError::new("storage failure", [id("E_STORAGE"), value("shard", 3)]);
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    /// let err = template.rewrap(io, []);
    ///
    /// assert_eq!(err.to_string(), "storage failure: disk full");
    /// assert!(err.is(&template));
    /// ```
    pub fn rewrap<E>(&self, cause: E, opts: impl IntoIterator<Item = Opt>) -> CError
    where
        E: Into<BoxError>,
    {
        let mut inner = (*self.inner).clone();
        inner.stack = stack::capture();
        inner.cause = Some(Arc::from(cause.into()));
        Self::build(inner, opts)
    }

    /// A copy of this error, stack included, with `opts` applied.
    /// This error is left unchanged.
    pub fn with_options(&self, opts: impl IntoIterator<Item = Opt>) -> CError {
        Self::build((*self.inner).clone(), opts)
    }
}

/// Attach options to any error.
///
/// A `CError` keeps its message, id, cause and stack and gains `opts`.
/// Any other error is wrapped by a new `CError` with an empty message, so its
/// display is unchanged, and a stack captured here.
///
/// ```
/// use cerror::{with, value};
///
/// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
/// let err = with(io, [value("path", "/etc/app.toml")]);
/// assert_eq!(err.to_string(), "no such file");
/// assert_eq!(err.values()["path"].as_str(), Some("/etc/app.toml"));
/// ```
pub fn with<E>(err: E, opts: impl IntoIterator<Item = Opt>) -> CError
where
    E: Into<BoxError>,
{
    match err.into().downcast::<CError>() {
        Ok(own) => CError::build(*own.inner, opts),
        Err(foreign) => CError::build(
            Inner::blank(String::new(), stack::capture(), Some(Arc::from(foreign))),
            opts,
        ),
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl CError {
    /// The local message, without the cause chain.
    #[inline]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// The identity set by [`id`](crate::id); empty if none.
    #[inline]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[inline]
    pub fn stack(&self) -> &Stack {
        &self.inner.stack
    }

    /// Frames captured when this error was created.
    #[inline]
    pub fn stacks(&self) -> &[Frame] {
        self.inner.stack.frames()
    }

    #[inline]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.cause.as_deref()
    }

    /// The cause, if it is directly a `CError`.
    #[inline]
    pub(crate) fn cause_cerror(&self) -> Option<&CError> {
        self.inner
            .cause
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<CError>())
    }

    /// This error followed by every directly chained `CError` cause,
    /// outermost first.
    pub(crate) fn layers(&self) -> Vec<&CError> {
        let mut layers = vec![self];
        let mut current = self;
        while let Some(next) = current.cause_cerror() {
            layers.push(next);
            current = next;
        }
        layers
    }

    /// Local values of this node only.
    #[inline]
    pub fn local_values(&self) -> &Values {
        &self.inner.values
    }

    /// Local typed values of this node only.
    #[inline]
    pub fn local_typed_values(&self) -> &Values {
        &self.inner.typed_values
    }

    /// Local tags of this node only.
    pub fn local_tags(&self) -> impl Iterator<Item = &Tag> {
        self.inner.tags.iter()
    }

    /// String-keyed values merged over the chain; outer layers win.
    pub fn values(&self) -> Values {
        self.merged(pick_values)
    }

    /// Typed values merged over the chain, by key name; outer layers win.
    pub fn typed_values(&self) -> Values {
        self.merged(pick_typed_values)
    }

    fn merged(&self, pick: fn(&Inner) -> &Values) -> Values {
        let mut merged = Values::new();
        for layer in self.layers().into_iter().rev() {
            for (key, value) in pick(&layer.inner) {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Tags merged over the chain, sorted and de-duplicated.
    pub fn tags(&self) -> Vec<String> {
        let mut merged = TagSet::new();
        for layer in self.layers() {
            merged.extend(layer.inner.tags.iter().cloned());
        }
        merged.iter().map(|t| t.as_str().to_string()).collect()
    }

    /// True if any layer of the chain carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.layers().iter().any(|layer| layer.inner.tags.contains(tag))
    }

    /// Typed value lookup, outermost layer first.
    ///
    /// The first layer holding `key.name()` decides: if its value is not a
    /// `T`, the result is `None` and deeper layers are not searched.
    pub fn typed_value<T: Any>(&self, key: &TypedKey<T>) -> Option<&T> {
        for layer in self.layers() {
            if let Some(value) = layer.inner.typed_values.get(key.name()) {
                return value.downcast_ref::<T>();
            }
        }
        None
    }

    /// Identity match.
    ///
    /// True if `target` (or the first `CError` in its chain) has the same
    /// non-empty id, or if `target` is this very instance.
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        if !self.inner.id.is_empty() {
            if let Some(other) = chain::unwrap(target) {
                if other.inner.id == self.inner.id {
                    return true;
                }
            }
        }
        target
            .downcast_ref::<CError>()
            .is_some_and(|other| self.same_instance(other))
    }

    #[inline]
    pub(crate) fn same_instance(&self, other: &CError) -> bool {
        std::ptr::eq(&*self.inner, &*other.inner)
    }
}

fn pick_values(inner: &Inner) -> &Values {
    &inner.values
}

fn pick_typed_values(inner: &Inner) -> &Values {
    &inner.typed_values
}

// ── Mutators ──────────────────────────────────────────────────────

impl CError {
    /// Drop the top frame. For helpers that build errors on behalf of
    /// their caller.
    pub fn unstack(self) -> Self {
        self.unstack_n(1)
    }

    /// Drop the top `n` frames. Trimming past the end leaves no frames.
    pub fn unstack_n(mut self, n: usize) -> Self {
        self.trim_stack(n);
        self
    }

    /// In-place form of [`unstack_n`](Self::unstack_n).
    pub fn trim_stack(&mut self, n: usize) -> &mut Self {
        self.inner.stack = self.inner.stack.trim(n);
        self
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.inner.id = id.into();
        self
    }

    /// Apply one more option to this error.
    pub fn with_opt(mut self, opt: Opt) -> Self {
        opt.apply(&mut self.inner);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.inner.tags.extend(tags);
        self
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl StdError for CError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for CError {
    /// The message chain joined by `": "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty messages contribute no segment, except on the last layer.
        let mut pending_sep = false;
        let mut node = self;
        loop {
            let message = &node.inner.message;
            let Some(cause) = &node.inner.cause else {
                if pending_sep {
                    f.write_str(": ")?;
                }
                return f.write_str(message);
            };
            if !message.is_empty() {
                if pending_sep {
                    f.write_str(": ")?;
                }
                f.write_str(message)?;
                pending_sep = true;
            }
            match cause.downcast_ref::<CError>() {
                Some(next) => node = next,
                None => {
                    if pending_sep {
                        f.write_str(": ")?;
                    }
                    return write!(f, "{}", cause);
                }
            }
        }
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for CError {
    /// Detailed report: message chain, the stack of the deepest `CError`
    /// layer, then merged values and typed values sorted by key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)?;

        let layers = self.layers();
        if let Some(deepest) = layers.last() {
            write!(f, "{}", deepest.inner.stack)?;
        }
        writeln!(f)?;

        write_section(f, "Values", &self.values())?;
        write_section(f, "Typed Values", &self.typed_values())
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, values: &Values) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{}:", title)?;
    for (key, value) in values {
        writeln!(f, "  {}: {}", key, value)?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id, tag, typed_value, value};

    const NOT_FOUND: Tag = Tag::new("not_found");

    fn oops() -> CError {
        CError::new("oops", [])
    }

    #[test]
    fn new_message_only() {
        let err = CError::new("test error", []);
        assert_eq!(err.to_string(), "test error");
        assert_eq!(err.message(), "test error");
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
        assert_eq!(err.id(), "");
    }

    #[test]
    fn chain_message() {
        let err = CError::wrap(CError::wrap(CError::new("blue", []), "orange", []), "red", []);
        assert_eq!(err.to_string(), "red: orange: blue");
    }

    #[test]
    fn wrap_foreign_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "original error");
        let err = CError::wrap(io, "wrapped", []);
        assert_eq!(err.to_string(), "wrapped: original error");
        assert!(err.source().is_some());
        assert!(err.cause_cerror().is_none());
    }

    #[test]
    fn wrap_none_cause() {
        let err = CError::wrap_opt(None::<CError>, "standalone", []);
        assert_eq!(err.to_string(), "standalone");
        assert!(err.cause().is_none());
    }

    #[test]
    fn display_skips_empty_messages() {
        let base = CError::new("base", []);
        let silent = CError::wrap(base, "", [value("k", 1)]);
        let outer = CError::wrap(silent, "outer", []);
        assert_eq!(outer.to_string(), "outer: base");

        let empty_root = CError::wrap(CError::new("", []), "outer", []);
        assert_eq!(empty_root.to_string(), "outer: ");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let annotated = CError::wrap(with(io, []), "save", []);
        assert_eq!(annotated.to_string(), "save: disk");
    }

    #[test]
    fn dropping_one_owner_keeps_shared_cause() {
        let base = CError::new("base", [value("k", 1)]);
        let shared: SharedError = Arc::new(CError::wrap(base, "mid", []));
        let a = CError::wrap_shared(Arc::clone(&shared), "a", []);
        let b = CError::wrap_shared(shared, "b", []);
        drop(a);
        assert_eq!(b.to_string(), "b: mid: base");
        assert_eq!(b.values()["k"].downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn merge_override_law() {
        let base = CError::new("base", [value("k", "base")]);
        let inner = CError::wrap(base, "inner", [value("k", "inner")]);
        let outer = CError::wrap(inner, "outer", [value("k", "outer")]);
        assert_eq!(outer.values()["k"].as_str(), Some("outer"));
    }

    #[test]
    fn disjoint_key_union() {
        let base = CError::new("base", [value("a", 1)]);
        let inner = CError::wrap(base, "inner", [value("b", 2)]);
        let outer = CError::wrap(inner, "outer", [value("c", 3)]);
        let keys: Vec<_> = outer.values().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn foreign_cause_stops_merge() {
        let base = CError::new("base", [value("deep", true), tag(NOT_FOUND)]);
        let foreign = std::io::Error::new(std::io::ErrorKind::Other, base);
        let top = CError::wrap(foreign, "top", [value("top", true)]);
        assert!(top.values().contains_key("top"));
        assert!(!top.values().contains_key("deep"));
        assert!(top.tags().is_empty());
        assert!(!top.has_tag(&NOT_FOUND));
    }

    #[test]
    fn identity_law() {
        let a = CError::new("a", [id("X")]);
        let b = CError::new("b", [id("X")]);
        let c = CError::new("c", [id("Y")]);
        assert!(a.is(&b));
        assert!(b.is(&a));
        assert!(!a.is(&c));

        let plain1 = CError::new("p", []);
        let plain2 = CError::new("p", []);
        assert!(!plain1.is(&plain2));
        assert!(plain1.is(&plain1));
        assert!(!plain1.is(&plain1.clone()));
    }

    #[test]
    fn identity_uses_outermost_cerror_of_target() {
        let sentinel = CError::new("not found", [id("E_NOT_FOUND")]);
        let occurrence = CError::new("missing", [id("E_NOT_FOUND")]);

        let wrapped = CError::wrap(occurrence.clone(), "lookup", []);
        assert!(!sentinel.is(&wrapped));
        assert!(chain::is(&wrapped, &sentinel));

        let errs = crate::join([occurrence]).unwrap();
        assert!(sentinel.is(&errs));
    }

    #[test]
    fn typed_round_trip_and_miss() {
        let key = TypedKey::<String>::new("user");
        let missing = TypedKey::<String>::new("other");
        let err = CError::new("e", [typed_value(&key, String::from("v"))]);
        assert_eq!(err.typed_value(&key).map(String::as_str), Some("v"));
        assert_eq!(err.typed_value(&missing), None);
    }

    #[test]
    fn typed_conflict_short_circuits() {
        let string_key = TypedKey::<String>::new("k");
        let int_key = TypedKey::<i32>::new("k");
        let base = CError::new("base", [typed_value(&string_key, String::from("s"))]);
        let top = CError::wrap(base, "m", [typed_value(&int_key, 5)]);
        assert_eq!(top.typed_value(&int_key), Some(&5));
        assert_eq!(top.typed_value(&string_key), None);
    }

    #[test]
    fn typed_values_found_deeper() {
        let key = TypedKey::<u32>::new("retries");
        let base = CError::new("base", [typed_value(&key, 3)]);
        let top = CError::wrap(CError::wrap(base, "mid", []), "top", []);
        assert_eq!(top.typed_value(&key), Some(&3));
        assert!(top.typed_values()["retries"].is::<u32>());
    }

    #[test]
    fn tags_deduplicated() {
        let err = CError::new("e", [tag(NOT_FOUND), tag(NOT_FOUND)]);
        assert_eq!(err.tags(), vec!["not_found"]);
        let wrapped = CError::wrap(err, "w", [tag(NOT_FOUND)]);
        assert_eq!(wrapped.tags(), vec!["not_found"]);
        assert!(wrapped.has_tag(&NOT_FOUND));
    }

    #[test]
    fn rewrap_copies_context() {
        let original = CError::new("original", [id("test-id"), value("key", "value")]);
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "cause error");
        let wrapped = original.rewrap(cause, [value("extra", 1)]);
        assert_eq!(wrapped.to_string(), "original: cause error");
        assert_eq!(wrapped.values()["key"].as_str(), Some("value"));
        assert!(wrapped.values().contains_key("extra"));
        assert!(!original.values().contains_key("extra"));
        assert_eq!(wrapped.id(), "test-id");
    }

    #[test]
    fn with_preserves_stack_and_original() {
        let original = CError::new("original message", [value("orig_key", "orig_value")]);
        let added = with(original.clone(), [value("new_key", "new_value"), tag(NOT_FOUND)]);

        assert_eq!(added.stacks(), original.stacks());
        assert_eq!(added.to_string(), "original message");
        assert_eq!(added.values().len(), 2);
        assert_eq!(original.values().len(), 1);
        assert!(!original.has_tag(&NOT_FOUND));
        assert!(added.has_tag(&NOT_FOUND));

        let copy = original.with_options([value("k", 1)]);
        assert_eq!(copy.stacks(), original.stacks());
        assert!(!original.values().contains_key("k"));
    }

    #[test]
    fn with_foreign_wraps_silently() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "standard error");
        let added = with(io, [value("wrap_key", "wrap_value")]);
        assert_eq!(added.to_string(), "standard error");
        assert!(added.source().is_some());
        assert_eq!(added.message(), "");
    }

    #[test]
    fn with_key_precedence() {
        let original = CError::new("original error", []);
        let step1 = with(original.clone(), [value("key1", "first")]);
        let step2 = with(step1.clone(), [value("key1", "second")]);
        assert_eq!(step1.values()["key1"].as_str(), Some("first"));
        assert_eq!(step2.values()["key1"].as_str(), Some("second"));
        assert!(original.values().is_empty());
    }

    #[test]
    fn unstack_trims_in_place() {
        let full = oops();
        let len = full.stacks().len();
        assert!(len > 0);
        assert!(full.stacks()[0].function.contains("oops"));

        let trimmed = oops().unstack();
        assert_eq!(trimmed.stacks().len(), len - 1);
        assert!(oops().unstack_n(len + 5).stacks().is_empty());

        let mut err = oops();
        err.trim_stack(2);
        assert_eq!(err.stacks().len(), len.saturating_sub(2));
    }

    #[test]
    fn set_id_and_with_tags() {
        let mut err = CError::new("e", []);
        err.set_id("E1");
        let err = err.with_tags([Tag::new("a"), Tag::new("b")]).with_opt(value("k", 1));
        assert_eq!(err.id(), "E1");
        assert_eq!(err.tags(), vec!["a", "b"]);
        assert_eq!(err.local_values().len(), 1);
    }

    #[test]
    fn debug_report() {
        let base = CError::new("base error", [value("base_key", "base_value"), value("shared_key", "base_shared")]);
        let middle = CError::wrap(base, "middle error", [value("shared_key", "middle_shared")]);
        let key = TypedKey::<u32>::new("attempt");
        let top = CError::wrap(middle, "top error", [value("shared_key", "top_shared"), typed_value(&key, 2)]);

        let report = format!("{:?}", top);
        assert!(report.starts_with("top error: middle error: base error"));
        assert!(report.contains("Values:"));
        assert!(report.contains("  base_key: base_value"));
        assert!(report.contains("  shared_key: top_shared"));
        assert!(!report.contains("middle_shared"));
        assert!(report.contains("Typed Values:"));
        assert!(report.contains("  attempt: 2"));
        assert!(report.find("base_key").unwrap() < report.find("shared_key").unwrap());
        assert!(report.contains("debug_report"));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CError>();
    }
}
