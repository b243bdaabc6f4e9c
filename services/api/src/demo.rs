use crate::infra::{
    parse_amount, parse_bill_status, parse_date, parse_fee_type, parse_overflow,
    InMemoryLeaseRepository,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tenant_billing::config::AppConfig;
use tenant_billing::error::AppError;
use tenant_billing::workflows::billing::{
    plan_change_adjustment, prorate, Bill, BillCsvImporter, BillStatus, BillingConfig,
    BillingPeriodResolver, DueDayOverflow, LateFeeCalculator, LateFeeType,
};
use tenant_billing::workflows::lease::{LeaseId, LeaseService, NewLease, SigningParty};

#[derive(Args, Debug)]
pub(crate) struct LateFeeArgs {
    /// Day of month rent is due (1-31)
    #[arg(long)]
    pub(crate) due_day: u32,
    /// Days after the due date before fees start
    #[arg(long, default_value_t = 0)]
    pub(crate) grace_days: u32,
    /// Fee policy: flat (per day) or percentage (of base rent, once)
    #[arg(long, default_value = "flat", value_parser = parse_fee_type)]
    pub(crate) fee_type: LateFeeType,
    /// Flat amount per day, or percent of base rent
    #[arg(long, value_parser = parse_amount)]
    pub(crate) fee_amount: Decimal,
    /// Base rent on the bill
    #[arg(long, value_parser = parse_amount)]
    pub(crate) base_rent: Decimal,
    /// Stored bill status
    #[arg(long, default_value = "unpaid", value_parser = parse_bill_status)]
    pub(crate) status: BillStatus,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Due-day overflow policy (defaults to BILLING_DUE_DAY_OVERFLOW)
    #[arg(long, value_parser = parse_overflow)]
    pub(crate) overflow: Option<DueDayOverflow>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// CSV export of bills with their property billing settings
    #[arg(long)]
    pub(crate) bills_csv: PathBuf,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Due-day overflow policy (defaults to BILLING_DUE_DAY_OVERFLOW)
    #[arg(long, value_parser = parse_overflow)]
    pub(crate) overflow: Option<DueDayOverflow>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the demo date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the lease lifecycle portion of the demo
    #[arg(long)]
    pub(crate) skip_lease: bool,
}

fn calculator_for(overflow: Option<DueDayOverflow>) -> Result<LateFeeCalculator, AppError> {
    let overflow = match overflow {
        Some(policy) => policy,
        None => AppConfig::load()?.billing.due_day_overflow,
    };
    Ok(LateFeeCalculator::new(BillingPeriodResolver::new(overflow)))
}

fn local_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.to_string())
        .unwrap_or_else(|| "unscheduled".to_string())
}

pub(crate) fn run_late_fee(args: LateFeeArgs) -> Result<(), AppError> {
    let calculator = calculator_for(args.overflow)?;
    let today = local_today(args.today);
    let bill = Bill {
        id: None,
        unit_id: None,
        status: args.status,
        base_rent: args.base_rent,
        property_config: Some(BillingConfig::new(
            args.due_day,
            args.grace_days,
            args.fee_type,
            args.fee_amount,
        )),
    };

    render_assessment(&calculator, &bill, today);
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let calculator = calculator_for(args.overflow)?;
    let today = local_today(args.today);
    let records = BillCsvImporter::from_path(&args.bills_csv)?;

    println!(
        "Late fee report for {} ({} bills, {} overflow)",
        today,
        records.len(),
        calculator.resolver().overflow().label()
    );
    println!(
        "{:<12} {:<10} {:<8} {:<12} {:>9} {:>12}",
        "bill", "unit", "status", "due", "days late", "late fee"
    );

    let mut total = Decimal::ZERO;
    let mut charged = 0usize;
    for record in &records {
        let bill = record.normalize();
        let assessment = calculator.assess(&bill, today);
        let due_date = bill
            .property_config
            .as_ref()
            .and_then(|config| calculator.resolver().due_date(config, today));

        if assessment.is_charged() {
            charged += 1;
            total = total.saturating_add(assessment.late_fee);
        }

        println!(
            "{:<12} {:<10} {:<8} {:<12} {:>9} {:>12}",
            bill.id.as_deref().unwrap_or("-"),
            bill.unit_id.as_deref().unwrap_or("-"),
            calculator.effective_status(&bill, today).label(),
            format_date(due_date),
            assessment.days_late,
            assessment.late_fee,
        );
    }

    println!("{charged} bills charged, {total} in late fees");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = local_today(args.today);
    println!("Tenant billing demo ({today})");

    let calculator = LateFeeCalculator::default();
    println!("\nLate fees for rent due on the 1st, 3 day grace, base rent 1500");
    for (label, fee_type, amount) in [
        ("flat 25/day", LateFeeType::Flat, Decimal::new(25, 0)),
        ("5 percent", LateFeeType::Percentage, Decimal::new(5, 0)),
    ] {
        let bill = Bill {
            id: Some(format!("demo-{}", fee_type.label())),
            unit_id: Some("A-101".to_string()),
            status: BillStatus::Unpaid,
            base_rent: Decimal::new(1500, 0),
            property_config: Some(BillingConfig::new(1, 3, fee_type, amount)),
        };
        println!("- {label}");
        render_assessment(&calculator, &bill, today);
    }

    println!("\nProration for a move-in today");
    let proration = prorate(Decimal::new(1500, 0), today);
    println!(
        "- {} of {} days billed through {} -> {}",
        proration.days_billed, proration.days_in_period, proration.period_end, proration.amount
    );
    println!(
        "- upgrading 1500 -> 1800 today adds {}",
        plan_change_adjustment(Decimal::new(1500, 0), Decimal::new(1800, 0), today)
    );

    if args.skip_lease {
        return Ok(());
    }

    println!("\nLease lifecycle");
    let service = LeaseService::new(Arc::new(InMemoryLeaseRepository::default()));
    let start_date = today - chrono::Duration::days(365);
    let lease = service.create(NewLease {
        tenant_id: "tenant-demo".to_string(),
        unit_id: "A-101".to_string(),
        start_date,
        end_date: today - chrono::Duration::days(1),
    })?;
    println!("- created {} -> {}", lease.id, lease.status().label());

    for party in [SigningParty::Landlord, SigningParty::Tenant] {
        let signed = service.sign(&lease.id, party, start_date)?;
        println!("- {} signed -> {}", party.label(), signed.status().label());
    }

    if let Err(err) = service.complete(&LeaseId("lease-unknown".to_string())) {
        println!("- completing an unknown lease fails: {err}");
    }

    let first = service.expire_elapsed(today)?;
    println!(
        "- expiry sweep: {} examined, {} expired",
        first.examined,
        first.expired.len()
    );
    let second = service.expire_elapsed(today)?;
    println!(
        "- second sweep: {} examined, {} expired",
        second.examined,
        second.expired.len()
    );

    if let Err(err) = service.cancel(&lease.id) {
        println!("- cancel after expiry rejected: {err}");
    }

    Ok(())
}

fn render_assessment(calculator: &LateFeeCalculator, bill: &Bill, today: NaiveDate) {
    let assessment = calculator.assess(bill, today);
    let due_date = bill
        .property_config
        .as_ref()
        .and_then(|config| calculator.resolver().due_date(config, today));

    println!(
        "  due {} | status {} | {} days late | late fee {}",
        format_date(due_date),
        calculator.effective_status(bill, today).label(),
        assessment.days_late,
        assessment.late_fee
    );
}
