//! [`FoodFlavor`] definitions.

use common::define_kind;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::food_item;
#[cfg(doc)]
use crate::domain::FoodItem;

/// Flavor a [`FoodItem`] is offered in.
#[derive(Clone, Copy, Debug)]
pub struct FoodFlavor {
    /// ID of this [`FoodFlavor`].
    pub id: Id,

    /// ID of the [`FoodItem`] this [`FoodFlavor`] belongs to.
    pub food_item_id: food_item::Id,

    /// [`Name`] of this [`FoodFlavor`].
    pub name: Name,
}

/// ID of a [`FoodFlavor`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Name of a [`FoodFlavor`]."]
    enum Name {
        #[doc = "Chocolate flavor."]
        Chocolate = 1,

        #[doc = "Pistachio flavor."]
        Pistachio = 2,

        #[doc = "Strawberry flavor."]
        Strawberry = 3,

        #[doc = "Mint flavor."]
        Mint = 4,
    }
}
