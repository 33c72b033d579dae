use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_expense, delete_expense, expense_summary, get_expense, list_expenses, update_expense,
};

pub fn init_expenses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/resumen", get(expense_summary))
        .route(
            "/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}
