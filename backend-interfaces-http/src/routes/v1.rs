use axum::routing::{get, patch, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    container_handlers, import_handlers, inventory_handlers, ops_handlers, price_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/import/preview", post(import_handlers::preview_import))
        .route("/v1/import/apply", post(import_handlers::apply_import))
        .route(
            "/v1/containers",
            get(container_handlers::list_containers).post(container_handlers::create_container),
        )
        .route(
            "/v1/containers/:id",
            patch(container_handlers::rename_container)
                .delete(container_handlers::delete_container),
        )
        .route(
            "/v1/containers/:id/records",
            get(container_handlers::container_contents),
        )
        .route(
            "/v1/containers/:id/deposit/preview",
            post(container_handlers::preview_deposit),
        )
        .route(
            "/v1/containers/:id/withdraw/preview",
            post(container_handlers::preview_withdraw),
        )
        .route(
            "/v1/containers/transfer/apply",
            post(container_handlers::apply_transfer),
        )
        .route("/v1/records/move", post(container_handlers::move_records))
        .route("/v1/inventory/value", get(inventory_handlers::inventory_value))
        .route("/v1/prices/trend", get(price_handlers::price_trend))
        .route("/v1/prices/samples", post(price_handlers::ingest_price_samples))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
