//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the scoring schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Trained artifacts record the version and hash below; the scorer refuses
//! an artifact whose layout differs from the one compiled into the engine.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact column order the model consumes
pub const FEATURE_LAYOUT: &[&str] = &[
    "digital_score",      // 0: mobile ownership + online payment + cash payment
    "financial_activity", // 1: saved + borrowed + wages + utilities
    "engagement",         // 2: transfers + pension + agriculture receipts
    "income_weight",      // 3: income quintile scaled to 0.25..=1.0
    "employment_score",   // 4: employment category lookup
];

/// Total number of features
pub const FEATURE_COUNT: usize = 5;

pub const DIGITAL_SCORE: usize = 0;
pub const FINANCIAL_ACTIVITY: usize = 1;
pub const ENGAGEMENT: usize = 2;
pub const INCOME_WEIGHT: usize = 3;
pub const EMPLOYMENT_SCORE: usize = 4;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and every feature name in order
pub fn compute_layout_hash() -> u32 {
    compute_hash_for(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

/// Hash an arbitrary layout the same way the engine hashes its own
pub fn compute_hash_for<'a>(version: u8, names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout snapshot stored inside every trained artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Column index for a feature name, as recorded at training time
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Check that this snapshot describes exactly the engine's layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        let recomputed = compute_hash_for(
            self.version,
            self.feature_names.iter().map(String::as_str),
        );
        if recomputed != self.hash {
            return Err(LayoutMismatchError {
                expected_version: FEATURE_VERSION,
                expected_hash: layout_hash(),
                actual_version: self.version,
                actual_hash: recomputed,
            });
        }
        validate_layout(self.version, self.hash)
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
