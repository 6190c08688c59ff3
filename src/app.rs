use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/rules", get(handlers::get_rules))
        .route("/api/taxons", get(handlers::get_taxons))
        .route("/api/expiry", post(handlers::preview_expiry))
        .route("/api/items", get(handlers::get_items).post(handlers::create_item))
        .route("/api/items/:id/finish", post(handlers::finish))
        .route("/api/expiry-stats", get(handlers::get_expiry_stats))
        .route("/api/notifications/summary", get(handlers::get_notification_summary))
        .route("/api/notifications/mark-read", post(handlers::mark_notifications_read))
        .route("/api/suggest", post(handlers::suggest))
        .with_state(state)
}
