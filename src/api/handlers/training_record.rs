use axum::{extract::{Path, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::CurrentUser;
use crate::api::dtos::requests::{CreateTrainingRecordRequest, UpdateTrainingRecordRequest};
use crate::domain::models::training_record::TrainingRecordChanges;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_training_records(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.workspace(&identity).await?;
    let mut records = workspace.training_records().to_vec();
    records.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(records))
}

pub async fn create_training_record(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<CreateTrainingRecordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    let created = workspace
        .add_training_record(&payload.customer_id, payload.date, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_training_record(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(record_id): Path<String>,
    Json(payload): Json<UpdateTrainingRecordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = TrainingRecordChanges {
        date: payload.date,
        content: payload.content,
    };

    let mut workspace = state.workspace(&identity).await?;
    workspace.update_training_record(&record_id, changes).await?;

    let updated = workspace.training_records().iter()
        .find(|t| t.id == record_id)
        .ok_or_else(|| AppError::NotFound("Training record not found".into()))?;
    Ok(Json(updated.clone()))
}

pub async fn delete_training_record(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    workspace.delete_training_record(&record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
