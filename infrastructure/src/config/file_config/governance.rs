//! Governance configuration from TOML (`[governance]` section)

use serde::{Deserialize, Serialize};
use ube_domain::PermissionFilter;
use ube_domain::governance::permission_filter::{
    DEFAULT_AUTHORIZED_FILE_WRITERS, FILE_MUTATION_OPERATIONS,
};

/// Allow-list for sensitive operations, fixed at startup.
///
/// ```toml
/// [governance]
/// authorized_file_writers = ["DocumentationAgent", "ProjectLeadAgent"]
/// sensitive_operations = ["write_file", "FileWriter", "file_writer"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGovernanceConfig {
    pub authorized_file_writers: Vec<String>,
    pub sensitive_operations: Vec<String>,
}

impl Default for FileGovernanceConfig {
    fn default() -> Self {
        Self {
            authorized_file_writers: DEFAULT_AUTHORIZED_FILE_WRITERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sensitive_operations: FILE_MUTATION_OPERATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FileGovernanceConfig {
    pub fn to_permission_filter(&self) -> PermissionFilter {
        PermissionFilter::new(
            self.sensitive_operations.iter().cloned(),
            self.authorized_file_writers.iter().cloned(),
        )
    }
}
