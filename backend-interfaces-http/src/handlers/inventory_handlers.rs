use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::inventory_queries;
use backend_application::AppState;
use backend_domain::InventoryValue;

use crate::error::HttpError;
use crate::middleware::authenticate;

pub async fn inventory_value(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InventoryValue>, HttpError> {
    let user = authenticate(&state.config, &headers)?;
    let value = inventory_queries::inventory_value(&state, &user).await?;
    Ok(Json(value))
}
