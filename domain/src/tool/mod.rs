//! Tool domain module
//!
//! Defines what a tool *is* to the engine, independent of how its body runs.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐
//! │ ParamDecl[]  │───▶│ ToolDefinition │───▶│ ToolCall     │
//! │ (signature)  │    │ (schema+roles) │    │ (invocation) │
//! └──────────────┘    └────────────────┘    └──────────────┘
//! ```
//!
//! A body declares its parameters as [`ParamDecl`](entities::ParamDecl)s. The
//! parameter schema is derived from that list: each declared type is mapped to
//! a [`ParamType`](entities::ParamType) and a parameter without a default is
//! required. The reserved [`CALLER_ROLE_PARAM`](entities::CALLER_ROLE_PARAM)
//! is injected at call time and never appears in the schema.
//!
//! # Role Gating
//!
//! A definition with a non-empty `allowed_roles` set may only be executed by
//! callers whose role is in the set; anything else is a
//! [`ToolError::PermissionDenied`](value_objects::ToolError::PermissionDenied).
//!
//! # Architecture
//!
//! - **Domain** (this module): definitions, argument validation, errors
//! - **Application** (`ToolExecutorPort`, `ToolBody`): the execution seam
//! - **Infrastructure** (`ToolRegistry`): storage, export and dispatch

pub mod entities;
pub mod value_objects;

pub use entities::{Caller, ExportFormat, ParamDecl, ParamType, ToolCall, ToolDefinition};
pub use value_objects::ToolError;
