use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod rbac;
pub mod repo;
pub mod reset;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
