use std::sync::Arc;

use crate::error::{BoxError, CError, Inner};
use crate::option::Opt;
use crate::stack;

/// A pre-bound option set applied to every error it creates.
///
/// Builder options are applied first and per-call options after, so a
/// per-call option wins on the same key.
///
/// ```
/// use cerror::{Builder, value};
///
/// let request = Builder::new([value("request_id", "r-17")]);
/// let err = request.error("quota exceeded", [value("limit", 100)]);
/// assert_eq!(err.values()["request_id"].as_str(), Some("r-17"));
/// assert_eq!(err.values().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    opts: Vec<Opt>,
}

impl Builder {
    pub fn new(opts: impl IntoIterator<Item = Opt>) -> Self {
        Self {
            opts: opts.into_iter().collect(),
        }
    }

    /// A copy of this builder with one more option. `self` is unchanged.
    pub fn with(&self, opt: Opt) -> Builder {
        let mut opts = self.opts.clone();
        opts.push(opt);
        Builder { opts }
    }

    /// Options bound to this builder, in application order.
    pub fn options(&self) -> &[Opt] {
        &self.opts
    }

    /// New error with the builder's options, then `opts`.
    pub fn error(&self, message: impl Into<String>, opts: impl IntoIterator<Item = Opt>) -> CError {
        let inner = Inner::blank(message.into(), stack::capture(), None);
        CError::build(inner, self.opts.iter().cloned().chain(opts))
    }

    /// New error caused by `cause`, with the builder's options, then `opts`.
    pub fn wrap<E>(
        &self,
        cause: E,
        message: impl Into<String>,
        opts: impl IntoIterator<Item = Opt>,
    ) -> CError
    where
        E: Into<BoxError>,
    {
        let inner = Inner::blank(message.into(), stack::capture(), Some(Arc::from(cause.into())));
        CError::build(inner, self.opts.iter().cloned().chain(opts))
    }
}
