//! Orchestration domain
//!
//! Plans, tasks and reports exchanged between the strategic router, domain
//! handlers, the tactical dispatcher and atomic executors, plus the pure
//! parsing rules for decomposition answers.

pub mod decomposition;
pub mod entities;
pub mod value_objects;
