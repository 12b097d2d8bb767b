// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, patch, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn directory_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        // Directory entities
        .route("/clients", get(handlers::list_clients))
        .route("/clients", post(handlers::create_client))
        .route("/clients/{client_id}", patch(handlers::update_client))
        .route("/clients/{client_id}", delete(handlers::delete_client))
        .route("/professionals", get(handlers::list_professionals))
        .route("/professionals", post(handlers::create_professional))
        .route("/professionals/{professional_id}", get(handlers::get_professional))
        .route("/professionals/{professional_id}", patch(handlers::update_professional))
        .route("/professionals/{professional_id}", delete(handlers::delete_professional))
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms", post(handlers::create_room))
        .route("/rooms/{room_id}", patch(handlers::update_room))
        .route("/rooms/{room_id}", delete(handlers::delete_room))
        // Schedule configuration, per scope (clinic or professional)
        .route("/schedule/{scope}/{scope_id}/hours", get(handlers::get_working_hours))
        .route("/schedule/{scope}/{scope_id}/hours", put(handlers::put_working_hours))
        .route("/schedule/{scope}/{scope_id}/breaks", get(handlers::list_breaks))
        .route("/schedule/{scope}/{scope_id}/breaks", post(handlers::create_break))
        .route("/schedule/{scope}/{scope_id}/breaks/{break_id}", delete(handlers::delete_break))
        .route("/schedule/{scope}/{scope_id}/vacations", get(handlers::list_vacations))
        .route("/schedule/{scope}/{scope_id}/vacations", post(handlers::create_vacation))
        .route("/schedule/{scope}/{scope_id}/vacations/{vacation_id}", delete(handlers::delete_vacation))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
