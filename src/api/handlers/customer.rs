use axum::{extract::{Path, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::CurrentUser;
use crate::api::dtos::requests::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::api::dtos::responses::{CustomerDetailResponse, CustomerSummary};
use crate::domain::models::customer::CustomerChanges;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.workspace(&identity).await?;
    let summaries: Vec<CustomerSummary> = workspace.customers().iter()
        .map(|c| CustomerSummary {
            payment_total: workspace.payment_total_for(&c.id),
            customer: c.clone(),
        })
        .collect();
    Ok(Json(summaries))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.workspace(&identity).await?;
    let customer = workspace.customer(&customer_id)
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?
        .clone();

    Ok(Json(CustomerDetailResponse {
        appointments: workspace.appointments_for(&customer_id).into_iter().cloned().collect(),
        payments: workspace.payments_for(&customer_id).into_iter().cloned().collect(),
        training_records: workspace.training_records_for(&customer_id).into_iter().cloned().collect(),
        payment_total: workspace.payment_total_for(&customer_id),
        customer,
    }))
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    let created = workspace.add_customer(&payload.name, payload.price_per_4_sessions).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(customer_id): Path<String>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    let changes = CustomerChanges {
        name: payload.name,
        price_per_4_sessions: payload.price_per_4_sessions,
    };
    workspace.update_customer(&customer_id, changes).await?;

    let updated = workspace.customer(&customer_id)
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;
    Ok(Json(updated.clone()))
}

pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    workspace.delete_customer(&customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
