use tracing::info;

use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza};
use crate::store::{Store, StoreError};

#[derive(Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub restaurant_pizzas: usize,
}

const RESTAURANTS: [(&str, &str); 3] = [
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: [(&str, &str); 3] = [
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

/// (price, restaurant index, pizza index)
const RESTAURANT_PIZZAS: [(i32, usize, usize); 3] = [(1, 0, 0), (4, 1, 1), (5, 2, 2)];

/// Replaces the store contents with a small demo data set.
pub fn seed(store: &Store) -> Result<SeedSummary, StoreError> {
    store.clear()?;

    let restaurants = RESTAURANTS
        .iter()
        .map(|(name, address)| store.create_restaurant(&NewRestaurant::new(*name, *address)?))
        .collect::<Result<Vec<_>, StoreError>>()?;
    let pizzas = PIZZAS
        .iter()
        .map(|(name, ingredients)| store.create_pizza(&NewPizza::new(*name, *ingredients)?))
        .collect::<Result<Vec<_>, StoreError>>()?;
    let restaurant_pizzas = RESTAURANT_PIZZAS
        .iter()
        .map(|&(price, r, p)| {
            store.create_restaurant_pizza(&NewRestaurantPizza::new(
                price,
                restaurants[r].id,
                pizzas[p].id,
            )?)
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    let summary = SeedSummary {
        restaurants: restaurants.len(),
        pizzas: pizzas.len(),
        restaurant_pizzas: restaurant_pizzas.len(),
    };
    info!(?summary, "seeded store");
    Ok(summary)
}
