//! Route modules for the PDF OCR server

pub mod health;
pub mod pdf;

use axum::Router;

use crate::state::AppState;

/// All routes, with state attached
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/pdf", pdf::router())
        .with_state(state)
}
