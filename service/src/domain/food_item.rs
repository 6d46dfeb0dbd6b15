//! [`FoodItem`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{sale, truck};
#[cfg(doc)]
use crate::domain::{Sale, Truck};

/// Sellable product of a [`Truck`].
#[derive(Clone, Debug)]
pub struct FoodItem {
    /// ID of this [`FoodItem`].
    pub id: Id,

    /// ID of the [`Truck`] this [`FoodItem`] belongs to.
    pub truck_id: truck::Id,

    /// [`Name`] of this [`FoodItem`].
    pub name: Name,

    /// [`Price`] of a single unit of this [`FoodItem`].
    pub price: Price,

    /// Remaining [`Stock`] of this [`FoodItem`].
    pub quantity: Stock,

    /// [`ItemType`] of this [`FoodItem`].
    pub item_type: ItemType,

    /// [`Image`] reference of this [`FoodItem`], if any.
    pub image: Option<Image>,

    /// [`DateTime`] when this [`FoodItem`] was created.
    pub created_at: CreationDateTime,
}

impl FoodItem {
    /// Indicates whether this [`FoodItem`] is still available for purchase.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        !self.quantity.is_empty()
    }
}

/// ID of a [`FoodItem`].
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

/// Name of a [`FoodItem`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name
            && !name.is_empty()
            && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Non-negative price of a [`FoodItem`] unit with a cent precision.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of fractional digits in a [`Price`].
    pub const SCALE: u32 = 2;

    /// Maximum number of digits in a [`Price`], fractional ones included.
    pub const PRECISION: u32 = 8;

    /// Creates a new [`Price`] if the given `amount` is valid.
    ///
    /// The returned [`Price`] always has exactly [`Price::SCALE`] fractional
    /// digits.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        let normalized = amount.normalize();
        let max = Decimal::from(10_u64.pow(Self::PRECISION - Self::SCALE));
        if normalized.is_sign_negative() && !normalized.is_zero()
            || normalized.scale() > Self::SCALE
            || normalized >= max
        {
            return None;
        }

        let mut amount = normalized.abs();
        amount.rescale(Self::SCALE);
        Some(Self(amount))
    }

    /// Returns the total cost of the provided [`sale::Quantity`] of units
    /// priced by this [`Price`].
    #[must_use]
    pub fn times(self, quantity: sale::Quantity) -> Decimal {
        self.0 * Decimal::from(u32::from(quantity))
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// Remaining stock of a [`FoodItem`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Stock(u32);

impl Stock {
    /// Maximum [`Stock`] fitting into a database column.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Creates a new [`Stock`] if the given `quantity` is in range.
    #[must_use]
    pub fn new(quantity: u32) -> Option<Self> {
        (quantity <= Self::MAX).then_some(Self(quantity))
    }

    /// Indicates whether nothing remains in this [`Stock`].
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Takes the provided [`sale::Quantity`] out of this [`Stock`].
    ///
    /// [`None`] is returned if this [`Stock`] is insufficient.
    #[must_use]
    pub fn take(self, quantity: sale::Quantity) -> Option<Self> {
        self.0.checked_sub(quantity.into()).map(Self)
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        Self::try_from(stock.0).expect("`Stock` never exceeds `i32::MAX`")
    }
}

impl TryFrom<i32> for Stock {
    type Error = &'static str;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| "negative `Stock`")
    }
}

define_kind! {
    #[doc = "Type of a [`FoodItem`]."]
    enum ItemType {
        #[doc = "Ice cream."]
        IceCream = 1,

        #[doc = "Shaved ice."]
        ShavedIce = 2,

        #[doc = "Snack bar."]
        SnackBar = 3,
    }
}

/// Reference to an image of a [`FoodItem`].
///
/// The image itself lives in an external storage.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Image(String);

impl Image {
    /// Creates a new [`Image`] if the given `reference` is valid.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        Self::check(&reference).then_some(Self(reference))
    }

    /// Checks whether the given `reference` is a valid [`Image`].
    fn check(reference: impl AsRef<str>) -> bool {
        let reference = reference.as_ref();
        reference.trim() == reference
            && !reference.is_empty()
            && reference.len() <= 512
    }
}

/// [`DateTime`] when a [`FoodItem`] was created.
pub type CreationDateTime = DateTimeOf<(FoodItem, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::domain::sale;

    use super::{ItemType, Price, Stock};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn price() {
        assert_eq!(
            Price::new(decimal("5")).unwrap().to_string(),
            "5.00",
        );
        assert_eq!(
            Price::new(decimal("5.5")).unwrap().to_string(),
            "5.50",
        );
        assert_eq!(
            Price::new(decimal("5.000")).unwrap().to_string(),
            "5.00",
        );
        assert_eq!(Price::new(decimal("0")).unwrap().to_string(), "0.00");
        assert_eq!(
            Price::new(decimal("999999.99")).unwrap().to_string(),
            "999999.99",
        );

        assert!(Price::new(decimal("-2.50")).is_none());
        assert!(Price::new(decimal("-0.01")).is_none());
        assert!(Price::new(decimal("0.001")).is_none());
        assert!(Price::new(decimal("1000000")).is_none());
    }

    #[test]
    fn price_times_quantity() {
        let price = Price::new(decimal("5.00")).unwrap();
        let quantity = sale::Quantity::new(2).unwrap();

        assert_eq!(price.times(quantity), decimal("10.00"));
    }

    #[test]
    fn stock_take() {
        let stock = Stock::new(10).unwrap();

        assert_eq!(
            stock.take(sale::Quantity::new(10).unwrap()),
            Some(Stock::new(0).unwrap()),
        );
        assert_eq!(
            stock.take(sale::Quantity::new(2).unwrap()),
            Some(Stock::new(8).unwrap()),
        );
        assert_eq!(stock.take(sale::Quantity::new(11).unwrap()), None);
        assert!(Stock::new(0).unwrap().is_empty());
    }

    #[test]
    fn stock_bounds() {
        assert!(Stock::new(Stock::MAX).is_some());
        assert!(Stock::new(Stock::MAX + 1).is_none());
        assert!(Stock::try_from(-1).is_err());
        assert_eq!(i32::from(Stock::try_from(8).unwrap()), 8);
    }

    #[test]
    fn item_type() {
        assert_eq!(ItemType::parse("ice_cream").unwrap(), ItemType::IceCream);
        assert_eq!(
            ItemType::parse("shaved_ice").unwrap(),
            ItemType::ShavedIce,
        );
        assert_eq!(ItemType::parse("snack_bar").unwrap(), ItemType::SnackBar);
        assert!(ItemType::parse("InvalidType").is_err());
    }
}
