//! Central Configuration Constants
//!
//! Single source of truth for the defaults the binary starts from.
//! Each can be overridden through an `ANTON_*` environment variable.

use std::path::PathBuf;

/// Trees in the ensemble
pub const DEFAULT_N_TREES: usize = 100;

/// Maximum tree depth
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Seed for the split and the bootstrap samples
pub const DEFAULT_SEED: u64 = 42;

/// Fewest labeled rows training accepts
pub const DEFAULT_MIN_ROWS: usize = 20;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Anton";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get tree count from environment or use default
pub fn get_n_trees() -> usize {
    env_parse("ANTON_N_TREES", DEFAULT_N_TREES).max(1)
}

/// Get max depth from environment or use default
pub fn get_max_depth() -> usize {
    env_parse("ANTON_MAX_DEPTH", DEFAULT_MAX_DEPTH).max(1)
}

/// Get training seed from environment or use default
pub fn get_seed() -> u64 {
    env_parse("ANTON_SEED", DEFAULT_SEED)
}

/// Get minimum training rows from environment or use default
pub fn get_min_rows() -> usize {
    env_parse("ANTON_MIN_ROWS", DEFAULT_MIN_ROWS)
}

/// Base directory for models and score logs
pub fn get_data_dir() -> PathBuf {
    std::env::var_os("ANTON_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("anton")
        })
}

/// Default score log directory
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("scores")
}
