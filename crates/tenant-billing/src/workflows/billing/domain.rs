use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Highest due day a landlord can configure.
pub const MAX_DUE_DAY: u32 = 31;

/// Fee policy applied once a bill is past its grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateFeeType {
    /// `lateFeeAmount` charged per day late.
    #[default]
    Flat,
    /// One-time charge of `lateFeeAmount` percent of base rent.
    Percentage,
}

impl LateFeeType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Percentage => "percentage",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Property-level billing settings, normalized from the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    /// `None` means the property has no scheduled due day.
    pub billing_due_day: Option<u32>,
    pub grace_period_days: u32,
    pub late_fee_type: LateFeeType,
    pub late_fee_amount: Decimal,
}

impl BillingConfig {
    pub fn new(
        billing_due_day: u32,
        grace_period_days: u32,
        late_fee_type: LateFeeType,
        late_fee_amount: Decimal,
    ) -> Self {
        Self {
            billing_due_day: (1..=MAX_DUE_DAY)
                .contains(&billing_due_day)
                .then_some(billing_due_day),
            grace_period_days,
            late_fee_type,
            late_fee_amount,
        }
    }
}

/// Payment state persisted on a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Unpaid,
    Paid,
    Overdue,
}

impl BillStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// A unit's bill for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Option<String>,
    pub unit_id: Option<String>,
    pub status: BillStatus,
    pub base_rent: Decimal,
    pub property_config: Option<BillingConfig>,
}

/// Billing settings as stored on the property. Any JSON value is accepted for the
/// numeric fields; [`BillingConfigRecord::normalize`] coerces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfigRecord {
    #[serde(default)]
    pub billing_due_day: Option<Value>,
    #[serde(default)]
    pub grace_period_days: Option<Value>,
    #[serde(default)]
    pub late_fee_type: Option<Value>,
    #[serde(default)]
    pub late_fee_amount: Option<Value>,
}

impl BillingConfigRecord {
    pub fn normalize(&self) -> BillingConfig {
        let billing_due_day = match whole_field("billingDueDay", self.billing_due_day.as_ref()) {
            0 => None,
            day if (1..=i64::from(MAX_DUE_DAY)).contains(&day) => u32::try_from(day).ok(),
            day => {
                warn!(
                    field = "billingDueDay",
                    value = day,
                    "due day outside 1..=31, treating property as unscheduled"
                );
                None
            }
        };

        let grace_period_days = non_negative_days(
            "gracePeriodDays",
            whole_field("gracePeriodDays", self.grace_period_days.as_ref()),
        );

        let late_fee_type = match self.late_fee_type.as_ref() {
            Some(Value::String(raw)) => LateFeeType::parse(raw),
            _ => None,
        }
        .unwrap_or_else(|| {
            warn!(
                field = "lateFeeType",
                value = ?self.late_fee_type,
                "unrecognized late fee type, defaulting to flat"
            );
            LateFeeType::Flat
        });

        let late_fee_amount = non_negative_amount(
            "lateFeeAmount",
            decimal_field("lateFeeAmount", self.late_fee_amount.as_ref()),
        );

        BillingConfig {
            billing_due_day,
            grace_period_days,
            late_fee_type,
            late_fee_amount,
        }
    }
}

/// Rent components of a bill. Only the base rent participates in fee math.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillBreakdownRecord {
    #[serde(default)]
    pub base_rent: Option<Value>,
}

/// A bill as supplied by the persistence layer, with its property's config attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub breakdown: Option<BillBreakdownRecord>,
    #[serde(default)]
    pub property_config: Option<BillingConfigRecord>,
}

impl BillRecord {
    pub fn normalize(&self) -> Bill {
        let status = match self.status.as_deref().map(BillStatus::parse) {
            Some(Some(status)) => status,
            _ => {
                warn!(
                    bill_id = self.id.as_deref().unwrap_or("-"),
                    value = ?self.status,
                    "unrecognized bill status, treating bill as unpaid"
                );
                BillStatus::Unpaid
            }
        };

        let base_rent = non_negative_amount(
            "breakdown.base_rent",
            decimal_field(
                "breakdown.base_rent",
                self.breakdown
                    .as_ref()
                    .and_then(|breakdown| breakdown.base_rent.as_ref()),
            ),
        );

        Bill {
            id: self.id.clone(),
            unit_id: self.unit_id.clone(),
            status,
            base_rent,
            property_config: self
                .property_config
                .as_ref()
                .map(BillingConfigRecord::normalize),
        }
    }
}

/// Reads a lenient numeric value. Numbers and numeric strings are accepted; everything
/// else yields `None`.
pub(crate) fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(raw) => parse_decimal(raw.trim()),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn decimal_field(field: &'static str, value: Option<&Value>) -> Decimal {
    match value.map(|raw| (raw, coerce_decimal(raw))) {
        Some((_, Some(amount))) => amount,
        Some((raw, None)) => {
            warn!(field, value = %raw, "non-numeric billing value, defaulting to 0");
            Decimal::ZERO
        }
        None => {
            warn!(field, "missing billing value, defaulting to 0");
            Decimal::ZERO
        }
    }
}

fn whole_field(field: &'static str, value: Option<&Value>) -> i64 {
    decimal_field(field, value).trunc().to_i64().unwrap_or_else(|| {
        warn!(field, "billing value out of range, defaulting to 0");
        0
    })
}

fn non_negative_days(field: &'static str, days: i64) -> u32 {
    u32::try_from(days).unwrap_or_else(|_| {
        warn!(field, value = days, "negative or oversized day count, defaulting to 0");
        0
    })
}

fn non_negative_amount(field: &'static str, amount: Decimal) -> Decimal {
    if amount.is_sign_negative() && !amount.is_zero() {
        warn!(field, value = %amount, "negative billing amount, defaulting to 0");
        Decimal::ZERO
    } else {
        amount
    }
}
