use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Bill, BillStatus, BillingConfig, LateFeeType};
use super::period::BillingPeriodResolver;

/// Fee owed on a bill as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateFeeAssessment {
    pub late_fee: Decimal,
    pub days_late: u32,
}

impl LateFeeAssessment {
    pub const NONE: Self = Self {
        late_fee: Decimal::ZERO,
        days_late: 0,
    };

    pub fn is_charged(&self) -> bool {
        self.days_late > 0
    }
}

/// Applies a property's late fee policy to its bills. Never fails: incomplete
/// configuration produces [`LateFeeAssessment::NONE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LateFeeCalculator {
    resolver: BillingPeriodResolver,
}

impl LateFeeCalculator {
    pub fn new(resolver: BillingPeriodResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &BillingPeriodResolver {
        &self.resolver
    }

    pub fn assess(&self, bill: &Bill, today: NaiveDate) -> LateFeeAssessment {
        let Some(config) = bill.property_config.as_ref() else {
            debug!(bill_id = bill.id.as_deref().unwrap_or("-"), "bill has no property config");
            return LateFeeAssessment::NONE;
        };

        if bill.status == BillStatus::Paid {
            return LateFeeAssessment::NONE;
        }

        let Some(days_late) = self.days_late(config, today) else {
            return LateFeeAssessment::NONE;
        };

        LateFeeAssessment {
            late_fee: fee_for(config, bill.base_rent, days_late),
            days_late,
        }
    }

    /// Whole days between this month's due date and `today`; negative before the due date.
    pub fn days_past_due(&self, config: &BillingConfig, today: NaiveDate) -> Option<i64> {
        match self.resolver.due_date(config, today) {
            Some(due) => Some((today - due).num_days()),
            None => {
                debug!("property has no billing due day, skipping late fee");
                None
            }
        }
    }

    /// Days past the grace period, or `None` while still inside it.
    pub fn days_late(&self, config: &BillingConfig, today: NaiveDate) -> Option<u32> {
        let diff = self.days_past_due(config, today)?;
        let grace = i64::from(config.grace_period_days);
        if diff <= grace {
            return None;
        }

        u32::try_from(diff - grace).ok().map(|days| days.max(1))
    }

    /// Status a reader should see: unpaid bills past due date plus grace read as overdue.
    pub fn effective_status(&self, bill: &Bill, today: NaiveDate) -> BillStatus {
        match bill.status {
            BillStatus::Paid | BillStatus::Overdue => bill.status,
            BillStatus::Unpaid => match bill.property_config.as_ref() {
                Some(config) if self.days_late(config, today).is_some() => BillStatus::Overdue,
                _ => BillStatus::Unpaid,
            },
        }
    }
}

/// Fee owed for `days_late` days under the configured policy. A fee too large for
/// [`Decimal`] is logged and charged as 0.
pub fn fee_for(config: &BillingConfig, base_rent: Decimal, days_late: u32) -> Decimal {
    let fee = match config.late_fee_type {
        LateFeeType::Percentage => config
            .late_fee_amount
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|rate| base_rent.checked_mul(rate)),
        LateFeeType::Flat => config
            .late_fee_amount
            .checked_mul(Decimal::from(days_late.max(1))),
    };

    match fee {
        Some(fee) => round_currency(fee),
        None => {
            warn!(
                late_fee_type = config.late_fee_type.label(),
                late_fee_amount = %config.late_fee_amount,
                base_rent = %base_rent,
                days_late,
                "late fee overflows, defaulting to 0"
            );
            Decimal::ZERO
        }
    }
}

pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
