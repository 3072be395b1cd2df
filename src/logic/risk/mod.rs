//! Risk Module
//!
//! Buckets the model probability into a coarse risk band.
//! A high probability means low risk.
//!
//! ## Structure
//! - `types`: `RiskBand`
//! - `rules`: cut points and the configurable `BandThresholds`
//! - `bander`: the banding function
//!
//! ## Usage
//! ```ignore
//! use anton_scoring::logic::risk::{RiskBander, RiskBand};
//!
//! match RiskBander::default().band(0.82) {
//!     RiskBand::Low => println!("approve"),
//!     RiskBand::Medium => println!("review"),
//!     RiskBand::High => println!("decline"),
//! }
//! ```

pub mod bander;
pub mod rules;
pub mod types;

// Re-export main types for convenience
pub use bander::{band, RiskBander};
pub use rules::{BandThresholds, HIGH_RISK_MAX, LOW_RISK_MIN};
pub use types::RiskBand;
