use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{LeaseAgreement, LeaseEvent, LeaseId, NewLease, SigningParty};
use super::lifecycle::LeaseTransitionError;
use super::repository::{LeaseRepository, RepositoryError};

/// Outcome of one expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub as_of: NaiveDate,
    pub examined: usize,
    pub expired: Vec<LeaseId>,
    pub skipped: usize,
}

/// Service that routes every lease status write through [`LeaseAgreement::apply`].
pub struct LeaseService<R> {
    repository: Arc<R>,
    sequence: AtomicU64,
}

impl<R> LeaseService<R>
where
    R: LeaseRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_lease_id(&self) -> LeaseId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        LeaseId(format!("lease-{id:06}"))
    }

    /// Record a new pending lease.
    pub fn create(&self, terms: NewLease) -> Result<LeaseAgreement, LeaseServiceError> {
        if terms.end_date <= terms.start_date {
            return Err(LeaseServiceError::InvalidTerm {
                start_date: terms.start_date,
                end_date: terms.end_date,
            });
        }

        let lease = LeaseAgreement::new(self.next_lease_id(), terms);
        let stored = self.repository.insert(lease)?;
        info!(lease_id = %stored.id, unit_id = %stored.unit_id, "lease created");
        Ok(stored)
    }

    pub fn get(&self, id: &LeaseId) -> Result<LeaseAgreement, LeaseServiceError> {
        let lease = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(lease)
    }

    pub fn sign(
        &self,
        id: &LeaseId,
        party: SigningParty,
        signed_on: NaiveDate,
    ) -> Result<LeaseAgreement, LeaseServiceError> {
        self.transition(id, LeaseEvent::Sign { party, signed_on })
    }

    pub fn cancel(&self, id: &LeaseId) -> Result<LeaseAgreement, LeaseServiceError> {
        self.transition(id, LeaseEvent::Cancel)
    }

    pub fn complete(&self, id: &LeaseId) -> Result<LeaseAgreement, LeaseServiceError> {
        self.transition(id, LeaseEvent::Complete)
    }

    /// Apply `event` and persist it, guarded by the status and revision it was validated against.
    pub fn transition(
        &self,
        id: &LeaseId,
        event: LeaseEvent,
    ) -> Result<LeaseAgreement, LeaseServiceError> {
        let mut lease = self.get(id)?;
        let previous = lease.status();
        let revision = lease.revision();
        let next = lease.apply(event)?;

        if !self
            .repository
            .update_if_current(&lease, previous, revision)?
        {
            warn!(lease_id = %id, action = event.action(), "lease changed concurrently");
            return Err(RepositoryError::Conflict.into());
        }

        info!(
            lease_id = %id,
            from = previous.label(),
            to = next.label(),
            "lease transitioned"
        );
        Ok(lease)
    }

    /// Expire every active lease whose term ended before `today`. Safe to re-run: leases
    /// already moved on are skipped by the conditional update.
    pub fn expire_elapsed(&self, today: NaiveDate) -> Result<SweepReport, LeaseServiceError> {
        let candidates = self.repository.active_ending_before(today)?;
        let mut report = SweepReport {
            as_of: today,
            examined: candidates.len(),
            expired: Vec::new(),
            skipped: 0,
        };

        for mut lease in candidates {
            let previous = lease.status();
            let revision = lease.revision();
            if let Err(err) = lease.apply(LeaseEvent::Expire { today }) {
                warn!(lease_id = %lease.id, error = %err, "lease not eligible for expiry");
                report.skipped += 1;
                continue;
            }

            if self
                .repository
                .update_if_current(&lease, previous, revision)?
            {
                report.expired.push(lease.id);
            } else {
                report.skipped += 1;
            }
        }

        info!(
            as_of = %today,
            examined = report.examined,
            expired = report.expired.len(),
            skipped = report.skipped,
            "lease expiry sweep completed"
        );
        Ok(report)
    }
}

/// Error raised by the lease service.
#[derive(Debug, thiserror::Error)]
pub enum LeaseServiceError {
    #[error("lease must end after it starts ({start_date} to {end_date})")]
    InvalidTerm {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[error(transparent)]
    Transition(#[from] LeaseTransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
