//! Frame-sequence transforms applied between acquisition and encoding.

/// Keep-every-k decimation with delay compensation.
pub mod decimate;
/// Aspect-preserving resampling to a common width.
pub mod resample;
