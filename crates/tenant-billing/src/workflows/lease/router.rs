use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeaseId, NewLease, SigningParty};
use super::repository::{LeaseRepository, RepositoryError};
use super::service::{LeaseService, LeaseServiceError};

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub party: SigningParty,
    #[serde(default)]
    pub signed_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Router builder exposing lease lifecycle endpoints and the expiry sweep trigger.
pub fn lease_router<R>(service: Arc<LeaseService<R>>) -> Router
where
    R: LeaseRepository + 'static,
{
    Router::new()
        .route("/api/v1/leases", post(create_handler::<R>))
        .route("/api/v1/leases/:lease_id", get(status_handler::<R>))
        .route(
            "/api/v1/leases/:lease_id/signatures",
            post(signature_handler::<R>),
        )
        .route("/api/v1/leases/:lease_id/cancel", post(cancel_handler::<R>))
        .route(
            "/api/v1/leases/:lease_id/complete",
            post(complete_handler::<R>),
        )
        .route("/api/v1/lease-expiry-sweep", post(sweep_handler::<R>))
        .with_state(service)
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn error_response(error: LeaseServiceError) -> Response {
    let status = match &error {
        LeaseServiceError::InvalidTerm { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LeaseServiceError::Transition(_)
        | LeaseServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LeaseServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LeaseServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    Json(terms): Json<NewLease>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    match service.create(terms) {
        Ok(lease) => (StatusCode::CREATED, Json(lease.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    Path(lease_id): Path<String>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    match service.get(&LeaseId(lease_id)) {
        Ok(lease) => (StatusCode::OK, Json(lease.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn signature_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    Path(lease_id): Path<String>,
    Json(request): Json<SignatureRequest>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    let signed_on = today_or_local(request.signed_on);
    match service.sign(&LeaseId(lease_id), request.party, signed_on) {
        Ok(lease) => (StatusCode::OK, Json(lease.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    Path(lease_id): Path<String>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    match service.cancel(&LeaseId(lease_id)) {
        Ok(lease) => (StatusCode::OK, Json(lease.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    Path(lease_id): Path<String>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    match service.complete(&LeaseId(lease_id)) {
        Ok(lease) => (StatusCode::OK, Json(lease.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sweep_handler<R>(
    State(service): State<Arc<LeaseService<R>>>,
    request: Option<Json<SweepRequest>>,
) -> Response
where
    R: LeaseRepository + 'static,
{
    let today = request.and_then(|Json(body)| body.today);
    match service.expire_elapsed(today_or_local(today)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
