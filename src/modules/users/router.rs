use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{change_password, get_profile, list_users, update_profile};

/// Mounted behind `require_auth`; the listing additionally requires an administrator.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users).route_layer(middleware::from_fn(require_admin)),
        )
        .route("/perfil", get(get_profile).put(update_profile))
        .route("/perfil/password", put(change_password))
}
