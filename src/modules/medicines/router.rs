use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_medicine, delete_medicine, get_medicine, list_medicines, update_medicine,
};

pub fn init_medicines_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_medicines).post(create_medicine))
        .route(
            "/{id}",
            get(get_medicine)
                .put(update_medicine)
                .delete(delete_medicine),
        )
}
