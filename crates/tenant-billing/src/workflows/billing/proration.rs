use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::late_fee::round_currency;
use super::period::last_day_of_month;

/// Partial-month charge for a monthly amount that starts mid-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proration {
    pub start_on: NaiveDate,
    pub period_end: NaiveDate,
    pub days_billed: u32,
    pub days_in_period: u32,
    pub amount: Decimal,
}

/// Charge `monthly_amount` for `start_on` through the end of its month, inclusive.
pub fn prorate(monthly_amount: Decimal, start_on: NaiveDate) -> Proration {
    let period_end = last_day_of_month(start_on);
    let days_in_period = period_end.day();
    let days_billed = days_in_period - start_on.day() + 1;

    let amount = if days_billed == days_in_period {
        monthly_amount
    } else {
        let billed = Decimal::from(days_billed);
        let period = Decimal::from(days_in_period);
        // Dividing first cannot overflow since the share is at most the monthly amount.
        let share = monthly_amount
            .checked_mul(billed)
            .and_then(|total| total.checked_div(period))
            .or_else(|| {
                monthly_amount
                    .checked_div(period)
                    .and_then(|daily| daily.checked_mul(billed))
            });
        match share {
            Some(share) => round_currency(share),
            None => {
                warn!(amount = %monthly_amount, %start_on, "proration overflows, defaulting to 0");
                Decimal::ZERO
            }
        }
    };

    Proration {
        start_on,
        period_end,
        days_billed,
        days_in_period,
        amount,
    }
}

/// Amount owed when switching from `current` to `next` monthly pricing on `change_on`.
/// Negative results are a credit for the remainder of the period.
pub fn plan_change_adjustment(current: Decimal, next: Decimal, change_on: NaiveDate) -> Decimal {
    let next_share = prorate(next, change_on).amount;
    let current_share = prorate(current, change_on).amount;
    next_share.checked_sub(current_share).unwrap_or_else(|| {
        warn!(%current, %next, %change_on, "plan change adjustment overflows, defaulting to 0");
        Decimal::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn mid_month_move_in_charges_remaining_days() {
        let proration = prorate(dec!(1500), date(2025, 6, 16));
        assert_eq!(proration.days_billed, 15);
        assert_eq!(proration.days_in_period, 30);
        assert_eq!(proration.amount, dec!(750));
        assert_eq!(proration.period_end, date(2025, 6, 30));
    }

    #[test]
    fn first_of_month_is_a_full_charge() {
        let proration = prorate(dec!(1180), date(2025, 2, 1));
        assert_eq!(proration.days_billed, 28);
        assert_eq!(proration.amount, dec!(1180));
    }

    #[test]
    fn last_day_charges_a_single_day() {
        let proration = prorate(dec!(3100), date(2025, 1, 31));
        assert_eq!(proration.days_billed, 1);
        assert_eq!(proration.amount, dec!(100));
    }

    #[test]
    fn oversized_amounts_prorate_without_panicking() {
        let huge = dec!(70000000000000000000000000000);
        let proration = prorate(huge, date(2025, 6, 16));
        let expected = dec!(35000000000000000000000000000);
        assert!((proration.amount - expected).abs() <= Decimal::ONE);

        let swing = plan_change_adjustment(-huge, huge, date(2025, 6, 1));
        assert_eq!(swing, Decimal::ZERO);
    }

    #[test]
    fn downgrade_produces_a_credit() {
        let adjustment = plan_change_adjustment(dec!(60), dec!(30), date(2025, 6, 16));
        assert_eq!(adjustment, dec!(-15));
        let upgrade = plan_change_adjustment(dec!(30), dec!(60), date(2025, 6, 16));
        assert_eq!(upgrade, dec!(15));
    }
}
