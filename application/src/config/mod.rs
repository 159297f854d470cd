//! Application-level configuration.
//!
//! - [`ExecutionParams`] — loop depth, decomposition retries, timeouts and fan-out

pub mod execution_params;

pub use execution_params::ExecutionParams;
