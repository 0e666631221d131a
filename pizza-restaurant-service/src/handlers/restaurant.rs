use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::error::{ApiError, ApiErrorResponse};
use crate::serializer::{
    serialize_restaurant, serialize_restaurant_details, RestaurantDetails, RestaurantSummary,
};

use super::AppState;

const RESTAURANT_NOT_FOUND: &str = "Restaurant not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).delete(delete_restaurant),
        )
}

/// Ids that do not parse as integers name no restaurant.
fn restaurant_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound(RESTAURANT_NOT_FOUND))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "List of restaurants", body = [RestaurantSummary]),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantSummary>>, ApiError> {
    let restaurants = state.store.list_restaurants()?;

    Ok(Json(restaurants.iter().map(serialize_restaurant).collect()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    responses(
        (status = 200, description = "Restaurant with its pizzas and prices", body = RestaurantDetails),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<RestaurantDetails>, ApiError> {
    let id = restaurant_id(path)?;

    let restaurant = state
        .store
        .find_restaurant(id)?
        .ok_or(ApiError::NotFound(RESTAURANT_NOT_FOUND))?;
    let restaurant_pizzas = state.store.restaurant_pizzas_of(&restaurant)?;

    Ok(Json(serialize_restaurant_details(
        &restaurant,
        &restaurant_pizzas,
    )))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    responses(
        (status = 204, description = "Restaurant and its pizza prices deleted"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = restaurant_id(path)?;

    if !state.store.delete_restaurant(id)? {
        return Err(ApiError::NotFound(RESTAURANT_NOT_FOUND));
    }
    info!(restaurant_id = id, "restaurant deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::json;

    use super::super::tests::*;
    use super::*;
    use crate::models::NewPizza;

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_restaurants_empty() {
        let (app, _) = setup_app();

        let response = send(&app, get_request("/restaurants")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_list_restaurants_omits_associations() {
        let (app, store) = setup_app();
        let (restaurant, pizza) = seed_pair(&store);
        associate(&store, 5, &restaurant, &pizza);

        let response = send(&app, get_request("/restaurants")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"id": restaurant.id, "name": "Karen's Pizza Shack", "address": "address1"}])
        );
    }

    #[tokio::test]
    async fn test_get_restaurant_with_pizzas() {
        let (app, store) = setup_app();
        let (restaurant, pizza) = seed_pair(&store);
        let geri = store
            .create_pizza(&NewPizza::new("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni").unwrap())
            .unwrap();
        associate(&store, 5, &restaurant, &pizza);
        associate(&store, 12, &restaurant, &geri);

        let response = send(&app, get_request(&format!("/restaurants/{}", restaurant.id))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], json!(restaurant.id));
        assert_eq!(body["name"], json!("Karen's Pizza Shack"));
        assert_eq!(body["address"], json!("address1"));

        let restaurant_pizzas = body["restaurant_pizzas"].as_array().unwrap();
        assert_eq!(restaurant_pizzas.len(), 2);
        assert_eq!(restaurant_pizzas[0]["price"], json!(5));
        assert_eq!(restaurant_pizzas[0]["pizza"]["name"], json!("Emma"));
        assert_eq!(restaurant_pizzas[1]["price"], json!(12));
        assert_eq!(restaurant_pizzas[1]["pizza_id"], json!(geri.id));
        for rp in restaurant_pizzas {
            assert_eq!(rp["restaurant_id"], json!(restaurant.id));
            assert!(rp.get("restaurant").is_none());
            assert!(rp["pizza"].get("restaurant_pizzas").is_none());
        }
    }

    #[tokio::test]
    async fn test_get_missing_restaurant() {
        let (app, _) = setup_app();

        let response = send(&app, get_request("/restaurants/999")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Restaurant not found"})
        );
    }

    #[tokio::test]
    async fn test_get_restaurant_with_non_integer_id() {
        let (app, _) = setup_app();

        let response = send(&app, get_request("/restaurants/abc")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Restaurant not found"})
        );
    }

    #[tokio::test]
    async fn test_delete_restaurant() {
        let (app, store) = setup_app();
        let (restaurant, pizza) = seed_pair(&store);
        associate(&store, 5, &restaurant, &pizza);
        associate(&store, 6, &restaurant, &pizza);
        let uri = format!("/restaurants/{}", restaurant.id);

        let response = send(&app, delete(&uri)).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());

        let response = send(&app, get_request(&uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Restaurant not found"})
        );

        assert_eq!(store.list_pizzas().unwrap(), vec![pizza]);
    }

    #[tokio::test]
    async fn test_delete_missing_restaurant() {
        let (app, _) = setup_app();

        let response = send(&app, delete("/restaurants/999")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Restaurant not found"})
        );
    }
}
