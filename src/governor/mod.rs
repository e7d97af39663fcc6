//! Pre-flight resource governor.
//!
//! Every job passes through [`validate`] before any frame is decoded, captured or resampled.

/// Limit constants and the tunable [`ResourceLimits`](limits::ResourceLimits).
pub mod limits;
/// Ordered validation checks.
pub mod validate;

pub use validate::validate;
