//! JSON views of the domain models.
//!
//! Restaurants and pizzas reach each other only through `restaurant_pizzas`, so
//! every nested view is a summary without an association list. The types make
//! a restaurant -> association -> restaurant -> association chain unrepresentable.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models;

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct RestaurantSummary {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct RestaurantDetails {
    #[serde(flatten)]
    pub restaurant: RestaurantSummary,
    /// Associations in id order; each omits its `restaurant` back-reference
    pub restaurant_pizzas: Vec<RestaurantPizzaView>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PizzaSummary {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct RestaurantPizzaView {
    pub id: i32,
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<RestaurantSummary>,
    pub pizza: PizzaSummary,
}

pub fn serialize_restaurant(restaurant: &models::Restaurant) -> RestaurantSummary {
    RestaurantSummary {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
    }
}

pub fn serialize_restaurant_details(
    restaurant: &models::Restaurant,
    restaurant_pizzas: &[(models::RestaurantPizza, models::Pizza)],
) -> RestaurantDetails {
    RestaurantDetails {
        restaurant: serialize_restaurant(restaurant),
        restaurant_pizzas: restaurant_pizzas
            .iter()
            .map(|(rp, pizza)| serialize_restaurant_pizza(rp, None, pizza))
            .collect(),
    }
}

pub fn serialize_pizza(pizza: &models::Pizza) -> PizzaSummary {
    PizzaSummary {
        id: pizza.id,
        name: pizza.name.clone(),
        ingredients: pizza.ingredients.clone(),
    }
}

/// `restaurant` is `None` when the association is rendered inside its own
/// restaurant.
pub fn serialize_restaurant_pizza(
    restaurant_pizza: &models::RestaurantPizza,
    restaurant: Option<&models::Restaurant>,
    pizza: &models::Pizza,
) -> RestaurantPizzaView {
    RestaurantPizzaView {
        id: restaurant_pizza.id,
        price: restaurant_pizza.price.get(),
        restaurant_id: restaurant_pizza.restaurant_id,
        pizza_id: restaurant_pizza.pizza_id,
        restaurant: restaurant.map(serialize_restaurant),
        pizza: serialize_pizza(pizza),
    }
}

pub fn serialize_restaurant_pizza_details(
    details: &models::RestaurantPizzaDetails,
) -> RestaurantPizzaView {
    serialize_restaurant_pizza(
        &details.restaurant_pizza,
        Some(&details.restaurant),
        &details.pizza,
    )
}
