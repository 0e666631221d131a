use axum::{extract::State, response::Json, routing::get, Router};
use tracing::instrument;

use crate::error::{ApiError, ApiErrorResponse};
use crate::serializer::{serialize_pizza, PizzaSummary};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/pizzas", get(list_pizzas))
}

#[utoipa::path(
    get,
    path = "/pizzas",
    responses(
        (status = 200, description = "List of pizzas", body = [PizzaSummary]),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "pizzas"
)]
#[instrument(skip(state))]
pub async fn list_pizzas(State(state): State<AppState>) -> Result<Json<Vec<PizzaSummary>>, ApiError> {
    let pizzas = state.store.list_pizzas()?;

    Ok(Json(pizzas.iter().map(serialize_pizza).collect()))
}
