use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_family, join_family, leave_family, my_family};

pub fn init_families_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_family))
        .route("/unirse", post(join_family))
        .route("/mi-familia", get(my_family))
        .route("/salir", post(leave_family))
}
