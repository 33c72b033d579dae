use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

use super::controller::{login, register, verify};

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/registro", post(register))
        .route("/login", post(login))
        .route(
            "/verificar",
            get(verify).route_layer(middleware::from_fn_with_state(state, require_auth)),
        )
}
