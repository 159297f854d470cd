//! Permission filter over file-mutation operations.
//!
//! The filter is consulted around every tool call. Only operations in its
//! sensitive set are checked; for those, the caller's declared identity must
//! be on a static allow-list fixed at composition time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Canonical names and aliases of the file-mutation operation.
pub const FILE_MUTATION_OPERATIONS: [&str; 3] = ["write_file", "FileWriter", "file_writer"];

/// Identities allowed to mutate files unless configured otherwise.
pub const DEFAULT_AUTHORIZED_FILE_WRITERS: [&str; 2] = ["DocumentationAgent", "ProjectLeadAgent"];

/// A refused sensitive operation, suitable for audit logging.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "Unauthorized access: agent '{identity}' is not authorized to call '{operation}'. Authorized agents: {authorized}",
    authorized = .authorized.join(", ")
)]
pub struct PermissionDenial {
    pub operation: String,
    pub identity: String,
    pub authorized: Vec<String>,
}

/// Outcome of [`PermissionFilter::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny(PermissionDenial),
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermissionDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), PermissionDenial> {
        match self {
            PermissionDecision::Allow => Ok(()),
            PermissionDecision::Deny(denial) => Err(denial),
        }
    }
}

/// Allow-list gate keyed by caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionFilter {
    sensitive_operations: BTreeSet<String>,
    authorized: BTreeSet<String>,
}

impl PermissionFilter {
    pub fn new<O, A, S, T>(sensitive_operations: O, authorized: A) -> Self
    where
        O: IntoIterator<Item = S>,
        A: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            sensitive_operations: sensitive_operations.into_iter().map(Into::into).collect(),
            authorized: authorized.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter over the file-mutation operations with the given writers.
    pub fn file_mutation<A, T>(authorized: A) -> Self
    where
        A: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::new(FILE_MUTATION_OPERATIONS, authorized)
    }

    pub fn is_sensitive(&self, operation: &str) -> bool {
        self.sensitive_operations.contains(operation)
    }

    pub fn authorized(&self) -> impl Iterator<Item = &str> {
        self.authorized.iter().map(String::as_str)
    }

    /// Decide whether `identity` may perform `operation`.
    pub fn check(&self, operation: &str, identity: &str) -> PermissionDecision {
        if !self.is_sensitive(operation) || self.authorized.contains(identity) {
            return PermissionDecision::Allow;
        }

        PermissionDecision::Deny(PermissionDenial {
            operation: operation.to_string(),
            identity: identity.to_string(),
            authorized: self.authorized.iter().cloned().collect(),
        })
    }
}

impl Default for PermissionFilter {
    fn default() -> Self {
        Self::file_mutation(DEFAULT_AUTHORIZED_FILE_WRITERS)
    }
}
