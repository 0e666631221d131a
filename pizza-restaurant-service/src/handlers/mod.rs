pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

pub use pizza::router as pizza_router;
pub use restaurant::router as restaurant_router;
pub use restaurant_pizza::router as restaurant_pizza_router;

use axum::{response::Html, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{ApiErrorResponse, ValidationErrorResponse};
use crate::serializer::{
    PizzaSummary, RestaurantDetails, RestaurantPizzaView, RestaurantSummary,
};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(restaurant_router())
        .merge(pizza_router())
        .merge(restaurant_pizza_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn index() -> Html<&'static str> {
    Html("<h1>Code Challenge: Pizza Restaurants</h1>")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        restaurant::delete_restaurant,
        pizza::list_pizzas,
        restaurant_pizza::create_restaurant_pizza,
    ),
    components(
        schemas(
            RestaurantSummary,
            RestaurantDetails,
            PizzaSummary,
            RestaurantPizzaView,
            restaurant_pizza::CreateRestaurantPizzaRequest,
            ApiErrorResponse,
            ValidationErrorResponse,
        )
    ),
    tags(
        (name = "restaurants", description = "Restaurant endpoints"),
        (name = "pizzas", description = "Pizza endpoints"),
        (name = "restaurant_pizzas", description = "Restaurant menu pricing endpoints")
    ),
    info(
        title = "Pizza Restaurants API",
        description = "Restaurants, pizzas and the prices restaurants charge for them",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
pub(crate) mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant};

    pub(crate) fn setup_app() -> (Router, Store) {
        let store = Store::in_memory().unwrap();
        let app = app(AppState {
            store: store.clone(),
        });
        (app, store)
    }

    pub(crate) fn seed_pair(store: &Store) -> (Restaurant, Pizza) {
        let restaurant = store
            .create_restaurant(&NewRestaurant::new("Karen's Pizza Shack", "address1").unwrap())
            .unwrap();
        let pizza = store
            .create_pizza(&NewPizza::new("Emma", "Dough, Tomato Sauce, Cheese").unwrap())
            .unwrap();
        (restaurant, pizza)
    }

    pub(crate) fn associate(store: &Store, price: i32, restaurant: &Restaurant, pizza: &Pizza) {
        store
            .create_restaurant_pizza(&NewRestaurantPizza::new(price, restaurant.id, pizza.id).unwrap())
            .unwrap();
    }

    pub(crate) async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    pub(crate) fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub(crate) async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub(crate) async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_index() {
        let (app, _) = setup_app();

        let response = send(&app, get_request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_bytes(response).await,
            b"<h1>Code Challenge: Pizza Restaurants</h1>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let (app, _) = setup_app();

        let response = send(&app, get_request("/api-docs/openapi.json")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = body_json(response).await;
        let paths = document["paths"].as_object().unwrap();
        assert!(paths.contains_key("/restaurants"));
        assert!(paths.contains_key("/restaurants/{id}"));
        assert!(paths.contains_key("/pizzas"));
        assert!(paths.contains_key("/restaurant_pizzas"));
    }
}
