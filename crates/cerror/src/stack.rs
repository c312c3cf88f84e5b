//! Call-stack capture for error construction sites.
//!
//! A [`Stack`] is captured once when a [`CError`](crate::CError) is created.
//! Frames belonging to `backtrace` and to this crate are dropped from the top
//! so the first frame is the caller of the public constructor.
//!
//! ```text
//! backtrace::trace            ┐
//! cerror::stack::capture      │ dropped (leading internal run)
//! cerror::error::CError::new  ┘
//! app::load_config            ← frames()[0]
//! app::main
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config;

/// One resolved call-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    #[serde(rename = "func")]
    pub function: String,
    pub file: String,
    pub line: u32,
}

const UNKNOWN: &str = "unknown";

const INTERNAL_PREFIXES: [&str; 4] = ["backtrace::", "cerror::", "core::", "alloc::"];

impl Frame {
    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        Self {
            function: symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            line: symbol.lineno().unwrap_or(0),
        }
    }

    fn unresolved(ip: *mut std::ffi::c_void) -> Self {
        Self {
            function: format!("{:p}", ip),
            file: UNKNOWN.to_string(),
            line: 0,
        }
    }

    /// True for frames of the capture machinery, of this crate's non-test
    /// code, and of the `core` glue (`?`, `From`) between them and a caller.
    fn is_internal(&self) -> bool {
        let name = self.function.trim_start_matches('<');
        let ours = INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p))
            || name.contains(" as cerror::");
        ours && !name.contains("::tests::")
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.function)
    }
}

/// An immutable view over captured frames.
///
/// Trimming produces a new view over the same frame storage.
#[derive(Clone)]
pub struct Stack {
    frames: Arc<[Frame]>,
    start: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::from_frames(Vec::new())
    }
}

impl Stack {
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames: Arc::from(frames),
            start: 0,
        }
    }

    /// Frames from the capture point outward.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames[self.start..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len() - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the first `n` frames. Trimming past the end yields an empty stack.
    pub fn trim(&self, n: usize) -> Stack {
        Stack {
            frames: Arc::clone(&self.frames),
            start: self.start.saturating_add(n).min(self.frames.len()),
        }
    }
}

impl fmt::Display for Stack {
    /// One `function` / `\tfile:line` pair per frame, each preceded by a newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames() {
            write!(f, "\n{}\n\t{}:{}", frame.function, frame.file, frame.line)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames()).finish()
    }
}

/// Capture the caller's stack according to the current [`config`].
pub(crate) fn capture() -> Stack {
    let cfg = config::current();
    if !cfg.capture || cfg.max_frames == 0 {
        return Stack::default();
    }

    let mut frames: Vec<Frame> = Vec::with_capacity(cfg.max_frames);
    let mut leading = true;

    backtrace::trace(|raw| {
        let mut resolved = false;
        backtrace::resolve_frame(raw, |symbol| {
            resolved = true;
            if frames.len() >= cfg.max_frames {
                return;
            }
            let frame = Frame::from_symbol(symbol);
            if leading && frame.is_internal() {
                return;
            }
            leading = false;
            frames.push(frame);
        });
        if !resolved && !leading && frames.len() < cfg.max_frames {
            frames.push(Frame::unresolved(raw.ip()));
        }
        frames.len() < cfg.max_frames
    });

    Stack::from_frames(frames)
}
