/// Output buffer arena.
pub mod artifacts;
/// Sequential job runner.
pub mod controller;
/// Job records and source assets.
#[allow(clippy::module_inception)]
pub mod job;
/// Progress and outcome callbacks.
pub mod observer;
/// Per-job settings and the caller-side handle.
pub mod settings;
