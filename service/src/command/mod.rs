//! [`Command`] definition.

pub mod authorize_user;
pub mod create_food_items;
pub mod create_truck;
pub mod create_user;
pub mod delete_truck;
pub mod purchase;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user::AuthorizeUser, create_food_items::CreateFoodItems,
    create_truck::CreateTruck, create_user::CreateUser,
    delete_truck::DeleteTruck, purchase::Purchase,
};
