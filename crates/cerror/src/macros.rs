/// Construct a `CError` with a captured stack.
///
/// # Forms
///
/// ```ignore
/// // Message only
/// cerr!("config missing")
///
/// // With options
/// cerr!("config missing", value("path", path), tag(NOT_FOUND))
///
/// // With source error
/// cerr!("read failed", source = io_err)
///
/// // With source + options
/// cerr!("read failed", source = io_err, value("path", path))
/// ```
#[macro_export]
macro_rules! cerr {
    ($msg:expr, source = $source:expr $(, $opt:expr)* $(,)?) => {
        $crate::CError::wrap($source, $msg, [$($opt),*])
    };
    ($msg:expr $(, $opt:expr)* $(,)?) => {
        $crate::CError::new($msg, [$($opt),*])
    };
}

/// Return early with a `CError`. Accepts the same forms as [`cerr!`].
///
/// ```ignore
/// bail!("unsupported version", value("version", v));
/// ```
#[macro_export]
macro_rules! bail {
    ($($args:tt)+) => {
        return ::core::result::Result::Err(::core::convert::From::from($crate::cerr!($($args)+)))
    };
}

/// Return early with a `CError` if a condition is false.
///
/// ```ignore
/// ensure!(user_id > 0, "bad user id", value("user_id", user_id));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($args:tt)+) => {
        if !$cond {
            $crate::bail!($($args)+);
        }
    };
}

/// Aggregate heterogeneous entries; see [`join`](crate::join()).
///
/// ```ignore
/// let errs = join!(validate_name(), validate_email(), io_result.err());
/// ```
#[macro_export]
macro_rules! join {
    ($($entry:expr),* $(,)?) => {{
        let entries: ::std::vec::Vec<::core::option::Option<$crate::BoxError>> =
            ::std::vec![$($crate::IntoEntry::into_entry($entry)),*];
        $crate::join(entries)
    }};
}

/// Append heterogeneous entries to an optional aggregate; see
/// [`append`](crate::append()).
#[macro_export]
macro_rules! append {
    ($base:expr $(, $entry:expr)* $(,)?) => {{
        let entries: ::std::vec::Vec<::core::option::Option<$crate::BoxError>> =
            ::std::vec![$($crate::IntoEntry::into_entry($entry)),*];
        $crate::append($base, entries)
    }};
}
