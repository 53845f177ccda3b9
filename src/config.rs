//! Runtime configuration.
//!
//! All settings have defaults; environment overrides are best-effort and
//! invalid values are ignored with a warning.

use std::path::PathBuf;
use std::time::Duration;

/// Which fallback predictor to use when no model artifact can be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// Linear unit with zero weights: every base score is 0
    #[default]
    Untrained,
    /// Uniform random base in [0, 0.5)
    Random,
}

impl std::str::FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "untrained" | "zero" | "linear" => Ok(Self::Untrained),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown fallback mode {other:?}")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory (or file) holding `model.json`
    pub model_path: PathBuf,

    /// Predictor used when the artifact is missing or invalid
    pub fallback: FallbackMode,

    /// Delay before the predictor is loaded at startup
    pub boot_delay: Duration,

    /// Simulated processing time for each scoring run
    pub scoring_delay: Duration,

    /// Where exported reports are written
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            fallback: FallbackMode::Untrained,
            boot_delay: Duration::from_millis(1000),
            scoring_delay: Duration::from_millis(800),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - VITALIA_MODEL_PATH
    /// - VITALIA_FALLBACK="untrained|random"
    /// - VITALIA_BOOT_DELAY_MS
    /// - VITALIA_SCORING_DELAY_MS
    /// - VITALIA_EXPORT_DIR
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env_or_default`, with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("VITALIA_MODEL_PATH") {
            if !v.trim().is_empty() {
                cfg.model_path = PathBuf::from(v.trim());
            }
        }

        if let Some(v) = lookup("VITALIA_FALLBACK") {
            match v.parse::<FallbackMode>() {
                Ok(mode) => cfg.fallback = mode,
                Err(e) => tracing::warn!("Ignoring VITALIA_FALLBACK: {}", e),
            }
        }

        if let Some(v) = lookup("VITALIA_BOOT_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => cfg.boot_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!("Ignoring VITALIA_BOOT_DELAY_MS={:?}", v),
            }
        }

        if let Some(v) = lookup("VITALIA_SCORING_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => cfg.scoring_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!("Ignoring VITALIA_SCORING_DELAY_MS={:?}", v),
            }
        }

        if let Some(v) = lookup("VITALIA_EXPORT_DIR") {
            if !v.trim().is_empty() {
                cfg.export_dir = PathBuf::from(v.trim());
            }
        }

        cfg
    }
}
