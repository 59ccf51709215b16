//! The guide's route table.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Builds the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/messages", get(handlers::messages_page))
        .route(
            "/without-formwork",
            get(handlers::without_formwork_page).post(handlers::without_formwork_action),
        )
        .route(
            "/regular-form",
            get(handlers::regular_form_page).post(handlers::regular_form_action),
        )
        .route(
            "/array-form",
            get(handlers::array_form_page).post(handlers::array_form_action),
        )
        .route("/user", get(handlers::users_page))
        .route(
            "/nested-form",
            get(handlers::nested_form_page).post(handlers::nested_form_action),
        )
        .route("/addresses", get(handlers::addresses_page))
        .route(
            "/nested-array-form",
            get(handlers::nested_array_form_page).post(handlers::nested_array_form_action),
        )
        .route(
            "/async-valid",
            get(handlers::async_valid_page).post(handlers::async_valid_action),
        )
        .route("/form-fetcher", get(handlers::form_fetcher_page))
        .route("/todos", get(handlers::todos_page).post(handlers::todos_action))
        .route("/send-message", post(handlers::send_message_action))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
