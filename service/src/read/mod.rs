//! Read entities definitions.

pub mod food_item;
pub mod truck;

pub use self::{food_item::Listing, truck::Inventory};
