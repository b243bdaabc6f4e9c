//! Billing period resolution, late fee assessment, bill status rules, and proration.

pub mod domain;
pub mod import;
pub mod late_fee;
pub mod period;
pub mod proration;
pub mod router;
mod status;

pub use domain::{
    Bill, BillBreakdownRecord, BillRecord, BillStatus, BillingConfig, BillingConfigRecord,
    LateFeeType, MAX_DUE_DAY,
};
pub use import::{BillCsvImporter, BillImportError};
pub use late_fee::{fee_for, LateFeeAssessment, LateFeeCalculator};
pub use period::{days_in_month, BillingPeriodResolver, DueDayOverflow};
pub use proration::{plan_change_adjustment, prorate, Proration};
pub use router::billing_router;
pub use status::{BillEvent, BillTransitionError};
