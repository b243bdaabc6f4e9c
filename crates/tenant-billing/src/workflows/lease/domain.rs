use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for lease agreements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseId(pub String);

impl std::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a lease. `Expired`, `Cancelled`, and `Completed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
    Completed,
}

impl LeaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled | Self::Completed)
    }
}

/// The two parties whose signatures activate a lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningParty {
    Landlord,
    Tenant,
}

impl SigningParty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Landlord => "landlord",
            Self::Tenant => "tenant",
        }
    }
}

/// External triggers that drive the lease lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum LeaseEvent {
    Sign {
        party: SigningParty,
        signed_on: NaiveDate,
    },
    Expire {
        today: NaiveDate,
    },
    Cancel,
    Complete,
}

impl LeaseEvent {
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Sign { .. } => "sign",
            Self::Expire { .. } => "expire",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }
}

/// Lease between a tenant and a unit. Built only through [`LeaseAgreement::new`] and changed
/// only through [`LeaseAgreement::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaseAgreement {
    pub id: LeaseId,
    pub tenant_id: String,
    pub unit_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub(crate) status: LeaseStatus,
    pub(crate) landlord_signed_on: Option<NaiveDate>,
    pub(crate) tenant_signed_on: Option<NaiveDate>,
    /// Bumped by every accepted event.
    pub(crate) revision: u64,
}

impl LeaseAgreement {
    /// New leases always start out pending and unsigned.
    pub fn new(id: LeaseId, terms: NewLease) -> Self {
        Self {
            id,
            tenant_id: terms.tenant_id,
            unit_id: terms.unit_id,
            start_date: terms.start_date,
            end_date: terms.end_date,
            status: LeaseStatus::Pending,
            landlord_signed_on: None,
            tenant_signed_on: None,
            revision: 0,
        }
    }

    pub fn status(&self) -> LeaseStatus {
        self.status
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn signed_on(&self, party: SigningParty) -> Option<NaiveDate> {
        match party {
            SigningParty::Landlord => self.landlord_signed_on,
            SigningParty::Tenant => self.tenant_signed_on,
        }
    }

    pub fn fully_signed(&self) -> bool {
        self.landlord_signed_on.is_some() && self.tenant_signed_on.is_some()
    }

    /// True when the lease term ended before `today`.
    pub fn term_elapsed(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    pub fn view(&self) -> LeaseView {
        LeaseView {
            id: self.id.clone(),
            tenant_id: self.tenant_id.clone(),
            unit_id: self.unit_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            status_label: self.status.label(),
            landlord_signed_on: self.landlord_signed_on,
            tenant_signed_on: self.tenant_signed_on,
        }
    }
}

/// Terms supplied when a lease is initiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLease {
    pub tenant_id: String,
    pub unit_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Serialized representation returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct LeaseView {
    pub id: LeaseId,
    pub tenant_id: String,
    pub unit_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaseStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landlord_signed_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_signed_on: Option<NaiveDate>,
}
