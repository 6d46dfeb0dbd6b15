//! Domain definitions.

pub mod food_flavor;
pub mod food_item;
pub mod sale;
pub mod truck;
pub mod user;

pub use self::{
    food_flavor::FoodFlavor, food_item::FoodItem, sale::Sale, truck::Truck,
    user::User,
};
