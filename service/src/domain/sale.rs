//! [`Sale`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{food_item, truck, user};
#[cfg(doc)]
use crate::domain::{FoodItem, Truck, User};

/// Record of a [`FoodItem`] purchase.
#[derive(Clone, Copy, Debug)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// ID of the purchased [`FoodItem`].
    pub food_item_id: food_item::Id,

    /// ID of the [`Truck`] the [`FoodItem`] was purchased from.
    pub truck_id: truck::Id,

    /// ID of the [`User`] who made this [`Sale`].
    ///
    /// [`None`] for anonymous purchases.
    pub user_id: Option<user::Id>,

    /// Purchased [`Quantity`].
    pub quantity: Quantity,

    /// [`DateTime`] when this [`Sale`] happened.
    pub purchased_at: PurchaseDateTime,
}

/// ID of a [`Sale`].
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

/// Positive number of purchased units.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Quantity(u32);

impl Quantity {
    /// Maximum [`Quantity`] fitting into a database column.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Creates a new [`Quantity`] if the given `quantity` is positive and in
    /// range.
    #[must_use]
    pub fn new(quantity: u32) -> Option<Self> {
        (quantity > 0 && quantity <= Self::MAX).then_some(Self(quantity))
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        Self::try_from(quantity.0)
            .expect("`Quantity` never exceeds `i32::MAX`")
    }
}

impl TryFrom<i32> for Quantity {
    type Error = &'static str;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or("non-positive `Quantity`")
    }
}

/// [`DateTime`] when a [`Sale`] happened.
pub type PurchaseDateTime = DateTimeOf<(Sale, unit::Purchase)>;

#[cfg(test)]
mod spec {
    use super::Quantity;

    #[test]
    fn quantity() {
        assert!(Quantity::new(1).is_some());
        assert!(Quantity::new(Quantity::MAX).is_some());

        assert!(Quantity::new(0).is_none());
        assert!(Quantity::new(Quantity::MAX + 1).is_none());
        assert!(Quantity::try_from(-1).is_err());
        assert!(Quantity::try_from(0).is_err());
        assert_eq!(i32::from(Quantity::try_from(3).unwrap()), 3);
    }
}
