use chrono::NaiveDate;

use super::domain::{LeaseAgreement, LeaseId, LeaseStatus};

/// Storage abstraction for lease agreements.
pub trait LeaseRepository: Send + Sync {
    fn insert(&self, lease: LeaseAgreement) -> Result<LeaseAgreement, RepositoryError>;
    fn fetch(&self, id: &LeaseId) -> Result<Option<LeaseAgreement>, RepositoryError>;
    /// Stores `lease` only while the persisted copy still has the status and revision it was
    /// read with, returning whether the write happened
    /// (`UPDATE ... WHERE status = $expected AND revision = $revision`).
    fn update_if_current(
        &self,
        lease: &LeaseAgreement,
        expected: LeaseStatus,
        revision: u64,
    ) -> Result<bool, RepositoryError>;
    /// Active leases whose `end_date` is before `date`.
    fn active_ending_before(&self, date: NaiveDate) -> Result<Vec<LeaseAgreement>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record conflicts with stored state")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
