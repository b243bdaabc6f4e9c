use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::BillingConfig;

/// Placement of a due day that does not exist in the target month (e.g. the 31st in April).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDayOverflow {
    /// Bill on the last day of the month.
    #[default]
    Clamp,
    /// Carry the missing days into the following month (31 in a 28 day February is March 3).
    Roll,
}

impl DueDayOverflow {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clamp" => Some(Self::Clamp),
            "roll" | "rollover" => Some(Self::Roll),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Roll => "roll",
        }
    }
}

/// Resolves the due date of the billing period containing a given day.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingPeriodResolver {
    overflow: DueDayOverflow,
}

impl BillingPeriodResolver {
    pub fn new(overflow: DueDayOverflow) -> Self {
        Self { overflow }
    }

    pub fn overflow(&self) -> DueDayOverflow {
        self.overflow
    }

    /// Due date in `today`'s calendar month, or `None` when the property is unscheduled.
    pub fn due_date(&self, config: &BillingConfig, today: NaiveDate) -> Option<NaiveDate> {
        let due_day = config.billing_due_day?;
        self.due_date_in(due_day, today.year(), today.month())
    }

    /// First due date falling on or after `today`.
    pub fn next_due_date(&self, config: &BillingConfig, today: NaiveDate) -> Option<NaiveDate> {
        let due_day = config.billing_due_day?;
        let current = self.due_date_in(due_day, today.year(), today.month())?;
        if current >= today {
            return Some(current);
        }

        let (year, month) = following_month(today.year(), today.month());
        self.due_date_in(due_day, year, month)
    }

    pub fn due_date_in(&self, due_day: u32, year: i32, month: u32) -> Option<NaiveDate> {
        if due_day == 0 {
            return None;
        }

        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        match self.overflow {
            DueDayOverflow::Clamp => {
                let last = last_day_of_month(first).day();
                first.with_day(due_day.min(last))
            }
            DueDayOverflow::Roll => {
                first.checked_add_signed(Duration::days(i64::from(due_day) - 1))
            }
        }
    }
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = following_month(date.year(), date.month());
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|first| last_day_of_month(first).day())
}

fn following_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
