use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{BillRecord, BillStatus, BillingConfigRecord};
use super::late_fee::LateFeeCalculator;
use super::proration::{prorate, Proration};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateRequest {
    #[serde(default)]
    pub property_config: Option<BillingConfigRecord>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateResponse {
    pub due_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateFeeRequest {
    pub bill: BillRecord,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LateFeeResponse {
    pub late_fee: Decimal,
    pub days_late: u32,
    pub status: BillStatus,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProrationRequest {
    pub amount: Decimal,
    pub start_on: NaiveDate,
}

/// Router exposing the pure billing calculations.
pub fn billing_router(calculator: Arc<LateFeeCalculator>) -> Router {
    Router::new()
        .route("/api/v1/billing/due-date", post(due_date_handler))
        .route("/api/v1/billing/late-fee", post(late_fee_handler))
        .route("/api/v1/billing/proration", post(proration_handler))
        .with_state(calculator)
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn due_date_handler(
    State(calculator): State<Arc<LateFeeCalculator>>,
    Json(request): Json<DueDateRequest>,
) -> Json<DueDateResponse> {
    let today = today_or_local(request.today);
    let Some(config) = request.property_config.map(|record| record.normalize()) else {
        return Json(DueDateResponse {
            due_date: None,
            next_due_date: None,
        });
    };

    let resolver = calculator.resolver();
    Json(DueDateResponse {
        due_date: resolver.due_date(&config, today),
        next_due_date: resolver.next_due_date(&config, today),
    })
}

pub(crate) async fn late_fee_handler(
    State(calculator): State<Arc<LateFeeCalculator>>,
    Json(request): Json<LateFeeRequest>,
) -> Json<LateFeeResponse> {
    let today = today_or_local(request.today);
    let bill = request.bill.normalize();
    let assessment = calculator.assess(&bill, today);
    let due_date = bill
        .property_config
        .as_ref()
        .and_then(|config| calculator.resolver().due_date(config, today));

    Json(LateFeeResponse {
        late_fee: assessment.late_fee,
        days_late: assessment.days_late,
        status: calculator.effective_status(&bill, today),
        due_date,
    })
}

pub(crate) async fn proration_handler(Json(request): Json<ProrationRequest>) -> Json<Proration> {
    Json(prorate(request.amount, request.start_on))
}
