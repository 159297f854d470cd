//! Use cases
//!
//! Application-level operations that orchestrate domain logic, leaves first:
//! tool loop → executor → tactical dispatch → decomposition → domain handler →
//! strategic route.

pub mod decompose_task;
pub mod domain_handler;
pub mod executor;
pub mod hierarchy;
pub(crate) mod shared;
pub mod strategic_route;
pub mod tactical_dispatch;
pub mod tool_loop;
