//! Agent behaviour policies.
//!
//! Pure heuristics applied by the invocation loop and the executors:
//! tool exposure for conversational input, forced tool selection, and
//! escalation detection.

pub mod tool_strategy;
