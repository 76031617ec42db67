use crate::state::AppState;
use axum::Router;

pub mod categories;
pub mod equipment;
pub mod requests;
pub mod teams;
pub mod technicians;
pub mod work_centers;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(teams::routes())
        .merge(technicians::routes())
        .merge(equipment::routes())
        .merge(categories::routes())
        .merge(work_centers::routes())
        .merge(requests::routes())
}
