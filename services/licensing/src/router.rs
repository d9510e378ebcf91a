use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use zari_core::health::healthz;
use zari_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{list_users, login, register},
    definitions::{download_definitions, get_definitions},
    health::readyz,
    license::{create_license, delete_license, list_licenses, revoke_license, verify_license},
    signature::{add_signature, check_file, delete_signature, list_signatures, scan_file},
    statistics::get_statistics,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/users", get(list_users))
        // Client-facing
        .route("/api/verify-license", post(verify_license))
        .route("/api/check-file", post(check_file))
        .route("/api/definitions", get(get_definitions))
        .route("/api/download-definitions/{type}", get(download_definitions))
        .route(
            "/api/scan",
            post(scan_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // Licenses (admin)
        .route("/api/license/licenses", get(list_licenses).post(create_license))
        .route("/api/license/licenses/{id}", delete(delete_license))
        .route("/api/license/licenses/revoke/{id}", post(revoke_license))
        // Signatures (admin)
        .route("/api/signatures", get(list_signatures).post(add_signature))
        .route("/api/signatures/{id}", delete(delete_signature))
        // Statistics (admin)
        .route("/api/statistics", get(get_statistics))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
