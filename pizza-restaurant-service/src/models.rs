use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::Integer,
    sqlite::Sqlite,
};

use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIN_PRICE: i32 = 1;
pub const MAX_PRICE: i32 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("price out of range: {0} (must be between 1 and 30)")]
    PriceOutOfRange(i32),
    #[error("{0} must not be blank")]
    Blank(&'static str),
}

/// Price of a pizza at a given restaurant.
///
/// The only way to obtain a `Price` is through [`Price::new`], so holding one
/// means the value is within `MIN_PRICE..=MAX_PRICE`. Values read back from the
/// database go through the same check.
#[derive(FromSqlRow, AsExpression, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
#[diesel(sql_type = Integer)]
pub struct Price(i32);

impl Price {
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if (MIN_PRICE..=MAX_PRICE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::PriceOutOfRange(value))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Price {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl ToSql<Integer, Sqlite> for Price {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        <i32 as ToSql<Integer, Sqlite>>::to_sql(&self.0, out)
    }
}

impl FromSql<Integer, Sqlite> for Price {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <i32 as FromSql<Integer, Sqlite>>::from_sql(bytes)?;
        Ok(Price::new(value)?)
    }
}

fn non_blank(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(value)
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Eq, Clone)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(Sqlite))]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Insertable, Debug, PartialEq, Eq)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    name: String,
    address: String,
}

impl NewRestaurant {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_blank("name", name.into())?,
            address: non_blank("address", address.into())?,
        })
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Eq, Clone)]
#[diesel(table_name = pizzas)]
#[diesel(check_for_backend(Sqlite))]
pub struct Pizza {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

#[derive(Insertable, Debug, PartialEq, Eq)]
#[diesel(table_name = pizzas)]
pub struct NewPizza {
    name: String,
    ingredients: String,
}

impl NewPizza {
    pub fn new(
        name: impl Into<String>,
        ingredients: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_blank("name", name.into())?,
            ingredients: non_blank("ingredients", ingredients.into())?,
        })
    }
}

/// Join row between a restaurant and a pizza, carrying the price the
/// restaurant charges for it.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, PartialEq, Eq, Clone)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(Pizza))]
#[diesel(table_name = restaurant_pizzas)]
#[diesel(check_for_backend(Sqlite))]
pub struct RestaurantPizza {
    pub id: i32,
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

impl RestaurantPizza {
    pub fn set_price(&mut self, price: i32) -> Result<(), ValidationError> {
        self.price = Price::new(price)?;
        Ok(())
    }
}

#[derive(Insertable, Debug, PartialEq, Eq)]
#[diesel(table_name = restaurant_pizzas)]
pub struct NewRestaurantPizza {
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

impl NewRestaurantPizza {
    pub fn new(price: i32, restaurant_id: i32, pizza_id: i32) -> Result<Self, ValidationError> {
        Ok(Self {
            price: Price::new(price)?,
            restaurant_id,
            pizza_id,
        })
    }
}

/// A freshly created association together with both of its parents.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RestaurantPizzaDetails {
    pub restaurant_pizza: RestaurantPizza,
    pub restaurant: Restaurant,
    pub pizza: Pizza,
}
