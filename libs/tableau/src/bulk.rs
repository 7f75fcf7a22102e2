//! Bulk site role updates

use std::fmt;

use tracing::{error, info, warn};

use crate::directory::{RoleChange, UserDirectory};
use crate::models::RoleAssignment;

/// Per-outcome counters of a bulk update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkUpdateReport {
    pub already_same: usize,
    pub updated: usize,
    pub not_found: usize,
    pub errored: usize,
}

impl BulkUpdateReport {
    pub fn total(&self) -> usize {
        self.already_same + self.updated + self.not_found + self.errored
    }
}

impl fmt::Display for BulkUpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Already same role: {}", self.already_same)?;
        writeln!(f, "Updated: {}", self.updated)?;
        writeln!(f, "Not found: {}", self.not_found)?;
        write!(f, "Error: {}", self.errored)
    }
}

impl UserDirectory {
    /// Apply a list of role assignments one user at a time.
    ///
    /// A failure for one user is logged and counted; the remaining users are
    /// still processed.
    pub async fn bulk_update_roles(&self, assignments: &[RoleAssignment]) -> BulkUpdateReport {
        let mut report = BulkUpdateReport::default();
        let total = assignments.len();

        for (idx, assignment) in assignments.iter().enumerate() {
            let position = idx + 1;
            match self
                .apply_site_role(&assignment.username, &assignment.role)
                .await
            {
                Ok(RoleChange::Unchanged(user)) => {
                    report.already_same += 1;
                    info!(
                        "[{}/{}] User {} already has role {}",
                        position, total, assignment.username, user.role
                    );
                }
                Ok(RoleChange::Updated(user)) => {
                    report.updated += 1;
                    info!(
                        "[{}/{}] User {} updated to role {}",
                        position, total, assignment.username, user.role
                    );
                }
                Ok(RoleChange::NotFound) => {
                    report.not_found += 1;
                    warn!(
                        "[{}/{}] User {} does not exist! Skipping...",
                        position, total, assignment.username
                    );
                }
                Err(e) => {
                    report.errored += 1;
                    error!(
                        "[{}/{}] Failed to update user {} to role {}: {}",
                        position, total, assignment.username, assignment.role, e
                    );
                }
            }
        }

        report
    }
}
