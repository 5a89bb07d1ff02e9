mod export;
mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::Store;

pub fn create_router(store: Store) -> Router {
    let api = Router::new()
        .route("/test", get(handlers::test_connection))
        .route("/load", get(handlers::load_document))
        .route("/save", post(handlers::save_document))
        .route("/backup", post(handlers::create_backup))
        .route("/backups", get(handlers::list_backups))
        .route("/restore", post(handlers::restore_backup))
        .route("/export", get(handlers::export_document));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
