//! Payment Commands
//!
//! Stub payments: open one for an enrollment, then move it along.

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::domain::{DomainError, Payment, PaymentStatus};
use super::{created, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub status: PaymentStatus,
}

pub async fn open_payment(
    State(state): State<SharedState>,
    Path(enrollment_id): Path<String>,
) -> CreatedResult<Payment> {
    created(state.payment_repo.open_for_enrollment(&enrollment_id).await?)
}

pub async fn list_payments(
    State(state): State<SharedState>,
    Path(enrollment_id): Path<String>,
) -> ApiResult<Vec<Payment>> {
    ok(state.payment_repo.list_by_enrollment(&enrollment_id).await?)
}

pub async fn get_payment(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Payment> {
    let payment = state
        .payment_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Payment {} not found", id)))?;
    ok(payment)
}

pub async fn update_payment_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<PaymentStatusRequest>,
) -> ApiResult<Payment> {
    ok(state.payment_repo.set_status(&id, req.status).await?)
}
