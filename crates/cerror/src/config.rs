//! Stack capture configuration
//!
//! Provides library defaults with runtime environment overrides.
//!
//! # Environment Variables
//!
//! - `CERROR_CAPTURE_STACK=0` - Disable stack capture entirely (default: on)
//! - `CERROR_MAX_FRAMES=<n>` - Maximum frames kept per error (default: 32)
//!
//! # Configuration Priority (highest wins)
//!
//! 1. `config::set()` (programmatic)
//! 2. Environment variables, read once on first capture
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust
//! use cerror::config::{self, StackConfig};
//!
//! let cfg = StackConfig::from_env().max_frames(16);
//! assert!(cfg.validate().is_ok());
//! config::set(cfg);
//! assert_eq!(config::current().max_frames, 16);
//! ```

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;

/// Default number of frames kept per error.
pub const DEFAULT_MAX_FRAMES: usize = 32;

/// Upper bound accepted by [`StackConfig::validate`].
pub const MAX_FRAMES_LIMIT: usize = 256;

/// Stack capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// Capture a stack trace when an error is created
    pub capture: bool,
    /// Maximum number of frames kept (after internal frames are dropped)
    pub max_frames: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            capture: true,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl StackConfig {
    /// Library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with any environment variable overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capture: env_get_bool("CERROR_CAPTURE_STACK", defaults.capture),
            max_frames: env_get("CERROR_MAX_FRAMES", defaults.max_frames).min(MAX_FRAMES_LIMIT),
        }
    }

    /// Enable or disable stack capture
    pub fn capture(mut self, enable: bool) -> Self {
        self.capture = enable;
        self
    }

    /// Set the maximum number of frames kept per error
    pub fn max_frames(mut self, n: usize) -> Self {
        self.max_frames = n;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.capture && self.max_frames == 0 {
            return Err("max_frames must be at least 1 when capture is enabled");
        }
        if self.max_frames > MAX_FRAMES_LIMIT {
            return Err("max_frames exceeds maximum");
        }
        Ok(())
    }
}

// Process-wide settings (initialized once)
static CAPTURE: AtomicBool = AtomicBool::new(true);
static MAX_FRAMES: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_FRAMES);
static INIT: Once = Once::new();

/// Initialize settings from environment variables.
///
/// Called automatically on first capture, but can be called explicitly for
/// deterministic initialization. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let cfg = StackConfig::from_env();
        store(cfg);
        tracing::debug!(
            capture = cfg.capture,
            max_frames = cfg.max_frames,
            "cerror stack capture configured from environment"
        );
    });
}

/// Current process-wide settings.
#[inline]
pub fn current() -> StackConfig {
    init();
    StackConfig {
        capture: CAPTURE.load(Ordering::Relaxed),
        max_frames: MAX_FRAMES.load(Ordering::Relaxed),
    }
}

/// Replace the process-wide settings. Overrides the environment.
pub fn set(cfg: StackConfig) {
    init();
    store(cfg);
}

fn store(cfg: StackConfig) {
    CAPTURE.store(cfg.capture, Ordering::Relaxed);
    MAX_FRAMES.store(cfg.max_frames.min(MAX_FRAMES_LIMIT), Ordering::Relaxed);
}

// ── Environment helpers ───────────────────────────────────────────

fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Any other set value is false; unset returns the default.
fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
