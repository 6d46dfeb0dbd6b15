//! [`Truck`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{FoodItem, Sale};

/// Mobile food truck owning [`FoodItem`]s and [`Sale`]s.
#[derive(Clone, Debug)]
pub struct Truck {
    /// ID of this [`Truck`].
    pub id: Id,

    /// [`Name`] of this [`Truck`].
    pub name: Name,

    /// [`DateTime`] when this [`Truck`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Truck`].
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

/// Name of a [`Truck`].
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

/// [`DateTime`] when a [`Truck`] was created.
pub type CreationDateTime = DateTimeOf<(Truck, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Name;

    #[test]
    fn name() {
        assert!(Name::new("Test Truck").is_some());
        assert!(Name::new("x".repeat(Name::MAX_LEN)).is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new(" Test Truck").is_none());
        assert!(Name::new("Test Truck\n").is_none());
        assert!(Name::new("x".repeat(Name::MAX_LEN + 1)).is_none());
    }
}
