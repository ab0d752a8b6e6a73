//! Bulk upgrade - apply pending updates one at a time.
//!
//! Each upgrade is independent: a failure is recorded and the batch moves
//! on to the next app. There is no retry.

use crate::cache::Session;
use crate::client::AppsApi;
use crate::model::PendingUpdate;
use crate::resolve::is_newer_version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeFailure {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Result of an "update all" run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Upgraded app ids, in request order
    pub succeeded: Vec<String>,
    pub failed: Vec<UpgradeFailure>,
    /// Offered versions that were not newer than the installed one
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("Upgraded {} apps", self.succeeded.len())
        } else {
            format!(
                "Upgraded {} apps, {} failed",
                self.succeeded.len(),
                self.failed.len()
            )
        }
    }
}

/// Upgrade every app in `updates`, sequentially.
pub async fn upgrade_all<A: AppsApi>(
    session: &Session<A>,
    updates: &[PendingUpdate],
) -> BatchReport {
    let mut report = BatchReport::default();

    for update in updates {
        if !is_newer_version(&update.available, &update.current) {
            tracing::debug!(
                app_id = %update.id,
                current = %update.current,
                available = %update.available,
                "Skipping update that is not newer"
            );
            report.skipped.push(update.id.clone());
            continue;
        }

        match session.upgrade(&update.id, &update.available).await {
            Ok(()) => {
                tracing::info!(
                    app_id = %update.id,
                    version = %update.available,
                    "Upgraded app"
                );
                report.succeeded.push(update.id.clone());
            }
            Err(e) => {
                tracing::warn!(app_id = %update.id, error = %e, "Upgrade failed");
                report.failed.push(UpgradeFailure {
                    id: update.id.clone(),
                    name: update.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(summary = %report.summary(), "Batch upgrade finished");
    report
}
