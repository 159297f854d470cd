//! Prompt domain
//!
//! Instruction texts for atomic executors and for task decomposition.

mod decomposition;
mod executor;

pub use decomposition::DecompositionPromptTemplate;
pub use executor::ExecutorPromptTemplate;
