use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse, ValidationErrorResponse};
use crate::models::NewRestaurantPizza;
use crate::serializer::{serialize_restaurant_pizza_details, RestaurantPizzaView};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantPizzaRequest {
    /// Price in whole currency units, between 1 and 30
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body = CreateRestaurantPizzaRequest,
    responses(
        (status = 201, description = "Pizza priced at the restaurant", body = RestaurantPizzaView),
        (status = 400, description = "Price out of range, unknown restaurant or pizza, or malformed body", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: Result<Json<CreateRestaurantPizzaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RestaurantPizzaView>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(%rejection, "rejected restaurant pizza payload");
        ApiError::Validation
    })?;

    let new_restaurant_pizza =
        NewRestaurantPizza::new(payload.price, payload.restaurant_id, payload.pizza_id).map_err(
            |e| {
                warn!(error = %e, "invalid restaurant pizza");
                ApiError::Validation
            },
        )?;
    let details = state.store.create_restaurant_pizza(&new_restaurant_pizza)?;
    info!(
        id = details.restaurant_pizza.id,
        restaurant_id = details.restaurant.id,
        pizza_id = details.pizza.id,
        "restaurant pizza created"
    );

    Ok((
        StatusCode::CREATED,
        Json(serialize_restaurant_pizza_details(&details)),
    ))
}
