use std::io;

use crate::{CError, CResult};
use crate::option::Opt;

// ── From<io::Error> ───────────────────────────────────────────────

impl From<io::Error> for CError {
    /// Wrap an `io::Error` with an empty message, so the display is the io
    /// error's own and `?` works on io results.
    fn from(err: io::Error) -> Self {
        CError::wrap(err, "", [])
    }
}

// ── Into<io::Error> ───────────────────────────────────────────────

impl From<CError> for io::Error {
    /// Wrap a `CError` as a custom io error of kind `Other`.
    fn from(err: CError) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

// ── Wrapping Result errors ────────────────────────────────────────

/// Extension trait for wrapping the error of any `Result` into a `CError`.
///
/// ```
/// use cerror::{ResultExt, value};
///
/// let result = std::fs::read("/definitely/not/here.toml")
///     .wrap_err_with("reading config", [value("path", "/definitely/not/here.toml")]);
/// let err = result.unwrap_err();
/// assert!(err.to_string().starts_with("reading config: "));
/// ```
pub trait ResultExt<T> {
    /// Wrap the error with a message.
    fn wrap_err(self, message: impl Into<String>) -> CResult<T>;

    /// Wrap the error with a message and options.
    fn wrap_err_with(self, message: impl Into<String>, opts: impl IntoIterator<Item = Opt>) -> CResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn wrap_err(self, message: impl Into<String>) -> CResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CError::wrap(e, message, [])),
        }
    }

    fn wrap_err_with(self, message: impl Into<String>, opts: impl IntoIterator<Item = Opt>) -> CResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(CError::wrap(e, message, opts)),
        }
    }
}
