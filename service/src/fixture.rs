//! Shared fixtures of the [`Service`] tests.

use common::DateTime;
use jsonwebtoken::{DecodingKey, EncodingKey, Header};

use crate::{
    command::{create_food_items::NewFoodItem, CreateFoodItems, CreateTruck},
    domain::{
        food_flavor, food_item,
        user::{session, Session},
        FoodItem, Truck,
    },
    infra::Memory,
    Command as _, Config, Service,
};

/// Secret the [`Session`] tokens are signed with.
pub(crate) const JWT_SECRET: &[u8] = b"ice-cream-secret";

/// Creates a new [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(
        Config {
            jwt_decoding_key: DecodingKey::from_secret(JWT_SECRET),
        },
        Memory::new(),
    )
}

/// Signs a [`session::Token`] of the provided [`Session`].
pub(crate) fn token(session: &Session) -> session::Token {
    jsonwebtoken::encode(
        &Header::default(),
        session,
        &EncodingKey::from_secret(JWT_SECRET),
    )
    .unwrap()
    .parse()
    .unwrap()
}

/// Returns a [`session::ExpirationDateTime`] an hour from now.
pub(crate) fn in_an_hour() -> session::ExpirationDateTime {
    DateTime::from_unix_timestamp(DateTime::now().unix_timestamp() + 3600)
        .unwrap()
        .coerce()
}

/// Describes a new ice cream [`FoodItem`].
pub(crate) fn new_item(price: &str, quantity: u32) -> NewFoodItem {
    NewFoodItem {
        name: food_item::Name::new("Vanilla Cone").unwrap(),
        price: price.parse().unwrap(),
        quantity: food_item::Stock::new(quantity).unwrap(),
        item_type: food_item::ItemType::IceCream,
        flavor: food_flavor::Name::Chocolate,
        image: None,
    }
}

/// Creates a new [`Truck`] with the provided name.
pub(crate) async fn truck(svc: &Service<Memory>, name: &str) -> Truck {
    svc.execute(CreateTruck {
        name: name.parse().unwrap(),
    })
    .await
    .unwrap()
}

/// Creates a new [`Truck`] selling a single [`FoodItem`] with the provided
/// price and quantity.
pub(crate) async fn truck_with_item(
    svc: &Service<Memory>,
    price: &str,
    quantity: u32,
) -> (Truck, FoodItem) {
    let truck = truck(svc, "Test Truck").await;
    let mut listings = svc
        .execute(CreateFoodItems {
            truck_id: truck.id,
            items: vec![new_item(price, quantity)],
        })
        .await
        .unwrap();
    (truck, listings.remove(0).item)
}
