use std::collections::HashMap;

use diesel::{
    connection::SimpleConnection,
    prelude::*,
    r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PoolError},
    SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza,
    RestaurantPizzaDetails, ValidationError,
};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
}

/// SQLite leaves foreign keys off unless asked per connection.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Handle to the restaurant/pizza tables.
///
/// Cloning is cheap and every clone shares the same connection pool.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)?;
        Ok(Self { pool })
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Pinned to a single connection: every SQLite `:memory:` connection is a
    /// separate database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self::connect(":memory:", 1)?;
        store.run_pending_migrations()?;
        Ok(store)
    }

    pub fn run_pending_migrations(&self) -> Result<usize, StoreError> {
        let mut conn = self.pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        for version in &applied {
            info!(%version, "applied migration");
        }
        Ok(applied.len())
    }

    pub fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let mut conn = self.pool.get()?;
        let results = restaurants::table
            .order(restaurants::id)
            .select(Restaurant::as_select())
            .load(&mut conn)?;
        Ok(results)
    }

    pub fn find_restaurant(&self, restaurant_id: i32) -> Result<Option<Restaurant>, StoreError> {
        let mut conn = self.pool.get()?;
        let result = restaurants::table
            .find(restaurant_id)
            .select(Restaurant::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(result)
    }

    /// Associations of `restaurant`, each paired with its pizza, in id order.
    pub fn restaurant_pizzas_of(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Vec<(RestaurantPizza, Pizza)>, StoreError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let associations = RestaurantPizza::belonging_to(restaurant)
                .order(restaurant_pizzas::id)
                .select(RestaurantPizza::as_select())
                .load(conn)?;

            let pizza_ids: Vec<i32> = associations.iter().map(|rp| rp.pizza_id).collect();
            let pizzas_by_id: HashMap<i32, Pizza> = pizzas::table
                .filter(pizzas::id.eq_any(pizza_ids))
                .select(Pizza::as_select())
                .load(conn)?
                .into_iter()
                .map(|pizza| (pizza.id, pizza))
                .collect();

            associations
                .into_iter()
                .map(|rp| {
                    pizzas_by_id
                        .get(&rp.pizza_id)
                        .cloned()
                        .map(|pizza| (rp, pizza))
                        .ok_or(StoreError::MissingReference("pizza"))
                })
                .collect()
        })
    }

    pub fn list_pizzas(&self) -> Result<Vec<Pizza>, StoreError> {
        let mut conn = self.pool.get()?;
        let results = pizzas::table
            .order(pizzas::id)
            .select(Pizza::as_select())
            .load(&mut conn)?;
        Ok(results)
    }

    pub fn find_pizza(&self, pizza_id: i32) -> Result<Option<Pizza>, StoreError> {
        let mut conn = self.pool.get()?;
        let result = pizzas::table
            .find(pizza_id)
            .select(Pizza::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(result)
    }

    pub fn create_restaurant(&self, new_restaurant: &NewRestaurant) -> Result<Restaurant, StoreError> {
        let mut conn = self.pool.get()?;
        let restaurant = diesel::insert_into(restaurants::table)
            .values(new_restaurant)
            .returning(Restaurant::as_returning())
            .get_result(&mut conn)?;
        debug!(id = restaurant.id, "created restaurant");
        Ok(restaurant)
    }

    pub fn create_pizza(&self, new_pizza: &NewPizza) -> Result<Pizza, StoreError> {
        let mut conn = self.pool.get()?;
        let pizza = diesel::insert_into(pizzas::table)
            .values(new_pizza)
            .returning(Pizza::as_returning())
            .get_result(&mut conn)?;
        debug!(id = pizza.id, "created pizza");
        Ok(pizza)
    }

    /// Inserts a priced association after checking that both parents exist.
    ///
    /// Runs in a single transaction; nothing is written when either parent
    /// is missing.
    pub fn create_restaurant_pizza(
        &self,
        new_restaurant_pizza: &NewRestaurantPizza,
    ) -> Result<RestaurantPizzaDetails, StoreError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let restaurant = restaurants::table
                .find(new_restaurant_pizza.restaurant_id)
                .select(Restaurant::as_select())
                .first(conn)
                .optional()?
                .ok_or(StoreError::MissingReference("restaurant"))?;
            let pizza = pizzas::table
                .find(new_restaurant_pizza.pizza_id)
                .select(Pizza::as_select())
                .first(conn)
                .optional()?
                .ok_or(StoreError::MissingReference("pizza"))?;

            let restaurant_pizza = diesel::insert_into(restaurant_pizzas::table)
                .values(new_restaurant_pizza)
                .returning(RestaurantPizza::as_returning())
                .get_result(conn)?;
            debug!(
                id = restaurant_pizza.id,
                restaurant_id = restaurant.id,
                pizza_id = pizza.id,
                "created restaurant pizza"
            );

            Ok(RestaurantPizzaDetails {
                restaurant_pizza,
                restaurant,
                pizza,
            })
        })
    }

    /// Deletes a restaurant and all of its associations atomically.
    ///
    /// Returns `false` without touching anything when the restaurant does not
    /// exist.
    pub fn delete_restaurant(&self, restaurant_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let exists = restaurants::table
                .find(restaurant_id)
                .count()
                .get_result::<i64>(conn)?
                > 0;
            if !exists {
                return Ok(false);
            }

            let associations = diesel::delete(
                restaurant_pizzas::table.filter(restaurant_pizzas::restaurant_id.eq(restaurant_id)),
            )
            .execute(conn)?;
            diesel::delete(restaurants::table.find(restaurant_id)).execute(conn)?;
            debug!(restaurant_id, associations, "deleted restaurant");
            Ok(true)
        })
    }

    /// Deletes a pizza and all of its associations atomically.
    pub fn delete_pizza(&self, pizza_id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let exists = pizzas::table
                .find(pizza_id)
                .count()
                .get_result::<i64>(conn)?
                > 0;
            if !exists {
                return Ok(false);
            }

            let associations = diesel::delete(
                restaurant_pizzas::table.filter(restaurant_pizzas::pizza_id.eq(pizza_id)),
            )
            .execute(conn)?;
            diesel::delete(pizzas::table.find(pizza_id)).execute(conn)?;
            debug!(pizza_id, associations, "deleted pizza");
            Ok(true)
        })
    }

    /// Removes every row from all three tables.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::delete(restaurant_pizzas::table).execute(conn)?;
            diesel::delete(restaurants::table).execute(conn)?;
            diesel::delete(pizzas::table).execute(conn)?;
            Ok(())
        })
    }
}
