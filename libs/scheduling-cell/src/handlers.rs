// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DayAvailabilityQuery, RoomAvailabilityQuery};
use crate::services::availability::{AvailabilityError, AvailabilityService};

fn map_error(e: AvailabilityError) -> AppError {
    match e {
        AvailabilityError::Engine(e) => AppError::ValidationError(e.to_string()),
        AvailabilityError::InvalidTime(t) => {
            AppError::BadRequest(format!("Invalid time of day: {}", t))
        }
        AvailabilityError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_day_availability(
    State(state): State<Arc<AppConfig>>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<DayAvailabilityQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let availability = service
        .day_availability(professional_id, query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_room_availability(
    State(state): State<Arc<AppConfig>>,
    Path(professional_id): Path<Uuid>,
    Query(query): Query<RoomAvailabilityQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let availability = service
        .room_availability(professional_id, query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(availability)))
}
