//! Lease agreement lifecycle: signatures, cancellation, completion, and the expiry sweep.

pub mod domain;
mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    LeaseAgreement, LeaseEvent, LeaseId, LeaseStatus, LeaseView, NewLease, SigningParty,
};
pub use lifecycle::LeaseTransitionError;
pub use repository::{LeaseRepository, RepositoryError};
pub use router::lease_router;
pub use service::{LeaseService, LeaseServiceError, SweepReport};
