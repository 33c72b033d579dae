use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_schedule, delete_schedule, get_schedule, list_schedules, update_schedule,
};

pub fn init_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route(
            "/{id}",
            get(get_schedule)
                .put(update_schedule)
                .delete(delete_schedule),
        )
}
