// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use scheduling_cell::models::WeeklyHours;

use crate::models::{
    CreateBreakRequest, CreateClientRequest, CreateProfessionalRequest, CreateRoomRequest,
    CreateVacationRequest, DirectoryError, ScheduleScope, UpdateClientRequest,
    UpdateProfessionalRequest, UpdateRoomRequest,
};
use crate::services::directory::DirectoryService;
use crate::services::schedule::ScheduleService;

fn map_error(e: DirectoryError) -> AppError {
    match e {
        DirectoryError::NotFound => AppError::NotFound("Record not found".to_string()),
        DirectoryError::ValidationError(msg) => AppError::ValidationError(msg),
        DirectoryError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn parse_scope(raw: &str) -> Result<ScheduleScope, AppError> {
    match raw {
        "clinic" => Ok(ScheduleScope::Clinic),
        "professional" => Ok(ScheduleScope::Professional),
        other => Err(AppError::BadRequest(format!(
            "Unknown schedule scope: {} (expected clinic or professional)",
            other
        ))),
    }
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ProfessionalListQuery {
    pub assistant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomListQuery {
    pub assistant_id: Option<String>,
}

// ==============================================================================
// CLIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ClientListQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let clients = service
        .list_clients(query.professional_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(clients)))
}

#[axum::debug_handler]
pub async fn create_client(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let client = service
        .create_client(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(client)))
}

#[axum::debug_handler]
pub async fn update_client(
    State(state): State<Arc<AppConfig>>,
    Path(client_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let client = service
        .update_client(client_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(client)))
}

#[axum::debug_handler]
pub async fn delete_client(
    State(state): State<Arc<AppConfig>>,
    Path(client_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    service
        .delete_client(client_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// PROFESSIONAL HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_professionals(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ProfessionalListQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let professionals = service
        .list_professionals(query.assistant_id.as_deref(), auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(professionals)))
}

#[axum::debug_handler]
pub async fn get_professional(
    State(state): State<Arc<AppConfig>>,
    Path(professional_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let professional = service
        .get_professional(professional_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(professional)))
}

#[axum::debug_handler]
pub async fn create_professional(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateProfessionalRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let professional = service
        .create_professional(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(professional)))
}

#[axum::debug_handler]
pub async fn update_professional(
    State(state): State<Arc<AppConfig>>,
    Path(professional_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateProfessionalRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let professional = service
        .update_professional(professional_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(professional)))
}

#[axum::debug_handler]
pub async fn delete_professional(
    State(state): State<Arc<AppConfig>>,
    Path(professional_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    service
        .delete_professional(professional_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// ROOM HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_rooms(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RoomListQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let rooms = service
        .list_rooms(query.assistant_id.as_deref(), auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(rooms)))
}

#[axum::debug_handler]
pub async fn create_room(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let room = service
        .create_room(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(room)))
}

#[axum::debug_handler]
pub async fn update_room(
    State(state): State<Arc<AppConfig>>,
    Path(room_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    let room = service
        .update_room(room_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(room)))
}

#[axum::debug_handler]
pub async fn delete_room(
    State(state): State<Arc<AppConfig>>,
    Path(room_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);
    service
        .delete_room(room_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// SCHEDULE CONFIGURATION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_working_hours(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let hours = service
        .get_working_hours(scope, &scope_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(hours)))
}

#[axum::debug_handler]
pub async fn put_working_hours(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(hours): Json<WeeklyHours>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let hours = service
        .put_working_hours(scope, &scope_id, hours, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(hours)))
}

#[axum::debug_handler]
pub async fn list_breaks(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let breaks = service
        .list_breaks(scope, &scope_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(breaks)))
}

#[axum::debug_handler]
pub async fn create_break(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateBreakRequest>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let break_record = service
        .create_break(scope, &scope_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(break_record)))
}

#[axum::debug_handler]
pub async fn delete_break(
    State(state): State<Arc<AppConfig>>,
    Path((scope, _scope_id, break_id)): Path<(String, String, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    service
        .delete_break(scope, break_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_vacations(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let vacations = service
        .list_vacations(scope, &scope_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(vacations)))
}

#[axum::debug_handler]
pub async fn create_vacation(
    State(state): State<Arc<AppConfig>>,
    Path((scope, scope_id)): Path<(String, String)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateVacationRequest>,
) -> Result<Json<Value>, AppError> {
    let scope = parse_scope(&scope)?;
    let service = ScheduleService::new(&state);

    let vacation = service
        .create_vacation(scope, &scope_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(vacation)))
}

#[axum::debug_handler]
pub async fn delete_vacation(
    State(state): State<Arc<AppConfig>>,
    Path((_scope, _scope_id, vacation_id)): Path<(String, String, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);

    service
        .delete_vacation(vacation_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true })))
}
