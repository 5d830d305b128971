use axum::{extract::{Path, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::CurrentUser;
use crate::api::dtos::requests::{CreatePaymentRequest, UpdatePaymentRequest};
use crate::api::dtos::responses::PaymentListResponse;
use crate::domain::models::payment::{PaymentChanges, PaymentDraft};
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.workspace(&identity).await?;
    let mut payments = workspace.payments().to_vec();
    payments.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(PaymentListResponse {
        payments,
        total: workspace.payment_total(),
    }))
}

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = PaymentDraft {
        customer_id: payload.customer_id,
        sets: payload.sets.unwrap_or(1),
        unit_price: payload.unit_price,
        date: payload.date,
        for_period: payload.for_period,
        note: payload.note,
    };

    let mut workspace = state.workspace(&identity).await?;
    let created = workspace.add_payment(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(payment_id): Path<String>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = PaymentChanges {
        sets: payload.sets,
        unit_price: payload.unit_price,
        date: payload.date,
        for_period: payload.for_period,
        note: payload.note,
    };

    let mut workspace = state.workspace(&identity).await?;
    workspace.update_payment(&payment_id, changes).await?;

    let updated = workspace.payments().iter()
        .find(|p| p.id == payment_id)
        .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;
    Ok(Json(updated.clone()))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    workspace.delete_payment(&payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
