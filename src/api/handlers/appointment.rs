use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::CurrentUser;
use crate::api::dtos::requests::{parse_instant, ConflictQuery, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::domain::models::appointment::{AppointmentChanges, NewAppointment};
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let workspace = state.workspace(&identity).await?;
    let mut appointments = workspace.appointments().to_vec();
    appointments.sort_by_key(|a| a.datetime);
    Ok(Json(appointments))
}

pub async fn check_conflicts(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<ConflictQuery>,
) -> Result<impl IntoResponse, AppError> {
    let datetime = parse_instant(&query.datetime, state.config.timezone)?;
    let workspace = state.workspace(&identity).await?;
    let conflicts = workspace.find_conflicts(datetime, query.exclude.as_deref()).await?;
    Ok(Json(conflicts))
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let datetime = parse_instant(&payload.datetime, state.config.timezone)?;
    let draft = NewAppointment::new(payload.customer_id, datetime, payload.session_number, payload.notes);

    let mut workspace = state.workspace(&identity).await?;
    let created = workspace.schedule_appointment(draft, payload.force).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(appointment_id): Path<String>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let datetime = payload.datetime
        .map(|raw| parse_instant(&raw, state.config.timezone))
        .transpose()?;
    let changes = AppointmentChanges {
        datetime,
        session_number: payload.session_number,
        notes: payload.notes,
    };

    let mut workspace = state.workspace(&identity).await?;
    workspace.update_appointment(&appointment_id, changes, payload.force).await?;

    let updated = workspace.appointments().iter()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
    Ok(Json(updated.clone()))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(appointment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut workspace = state.workspace(&identity).await?;
    workspace.delete_appointment(&appointment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
