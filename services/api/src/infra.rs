use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tenant_billing::workflows::billing::{BillStatus, DueDayOverflow, LateFeeType};
use tenant_billing::workflows::lease::{
    LeaseAgreement, LeaseId, LeaseRepository, LeaseStatus, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeaseRepository {
    leases: Arc<Mutex<HashMap<LeaseId, LeaseAgreement>>>,
}

impl InMemoryLeaseRepository {
    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<LeaseId, LeaseAgreement>>, RepositoryError> {
        self.leases
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lease mutex poisoned".to_string()))
    }
}

impl LeaseRepository for InMemoryLeaseRepository {
    fn insert(&self, lease: LeaseAgreement) -> Result<LeaseAgreement, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&lease.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(lease.id.clone(), lease.clone());
        Ok(lease)
    }

    fn fetch(&self, id: &LeaseId) -> Result<Option<LeaseAgreement>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn update_if_current(
        &self,
        lease: &LeaseAgreement,
        expected: LeaseStatus,
        revision: u64,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.guard()?;
        match guard.get(&lease.id) {
            Some(stored) if stored.status() == expected && stored.revision() == revision => {
                guard.insert(lease.id.clone(), lease.clone());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn active_ending_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<LeaseAgreement>, RepositoryError> {
        let mut leases: Vec<LeaseAgreement> = self
            .guard()?
            .values()
            .filter(|lease| lease.status() == LeaseStatus::Active && lease.end_date < date)
            .cloned()
            .collect();
        leases.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(leases)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))
}

pub(crate) fn parse_fee_type(raw: &str) -> Result<LateFeeType, String> {
    LateFeeType::parse(raw)
        .ok_or_else(|| format!("late fee type must be flat or percentage (got '{raw}')"))
}

pub(crate) fn parse_bill_status(raw: &str) -> Result<BillStatus, String> {
    BillStatus::parse(raw)
        .ok_or_else(|| format!("bill status must be unpaid, paid, or overdue (got '{raw}')"))
}

pub(crate) fn parse_overflow(raw: &str) -> Result<DueDayOverflow, String> {
    DueDayOverflow::parse(raw)
        .ok_or_else(|| format!("overflow must be clamp or roll (got '{raw}')"))
}
