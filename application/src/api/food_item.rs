//! [`FoodItem`]-related definitions.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::{
    command::{self, Command as _},
    domain::{food_flavor, food_item, truck},
    query, read, Query as _,
};

use crate::{
    api::{self, field, truck::TruckError, Json, Path},
    define_error,
    error::FieldErrors,
    AsError, Context, Error,
};

/// Sellable product of a truck along with its flavors.
#[derive(Clone, Debug, Serialize)]
pub struct FoodItem {
    /// Unique identifier of this [`FoodItem`].
    pub id: food_item::Id,

    /// Identifier of the truck this [`FoodItem`] belongs to.
    pub truck_id: truck::Id,

    /// Name of this [`FoodItem`].
    pub name: String,

    /// Price of a single unit, with exactly two fractional digits.
    pub price: String,

    /// Remaining stock.
    pub quantity: u32,

    /// Type of this [`FoodItem`] in `snake_case`.
    pub item_type: String,

    /// [`Flavor`]s this [`FoodItem`] is offered in.
    pub flavors: Vec<Flavor>,

    /// Image reference, if any.
    pub image: Option<String>,

    /// [RFC 3339] date and time when this [`FoodItem`] was created.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<read::Listing> for FoodItem {
    fn from(listing: read::Listing) -> Self {
        let read::Listing { item, flavors } = listing;
        Self {
            id: item.id,
            truck_id: item.truck_id,
            name: item.name.to_string(),
            price: item.price.to_string(),
            quantity: item.quantity.into(),
            item_type: item.item_type.to_string(),
            flavors: flavors.into_iter().map(Flavor::from).collect(),
            image: item.image.map(|i| i.to_string()),
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// Flavor of a [`FoodItem`].
#[derive(Clone, Debug, Serialize)]
pub struct Flavor {
    /// Unique identifier of this [`Flavor`].
    pub id: food_flavor::Id,

    /// Name of this [`Flavor`] in `snake_case`.
    pub name: String,
}

impl From<food_flavor::FoodFlavor> for Flavor {
    fn from(flavor: food_flavor::FoodFlavor) -> Self {
        Self {
            id: flavor.id,
            name: flavor.name.to_string(),
        }
    }
}

/// Request body describing a new [`FoodItem`].
///
/// Fields are kept raw, so their malformed values are reported per field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewFoodItem {
    /// Name of a new [`FoodItem`].
    pub name: Option<Value>,

    /// Price of a new [`FoodItem`].
    pub price: Option<Value>,

    /// Initial stock of a new [`FoodItem`].
    pub quantity: Option<Value>,

    /// Type of a new [`FoodItem`].
    pub item_type: Option<Value>,

    /// Flavor a new [`FoodItem`] is offered in.
    pub flavor: Option<Value>,

    /// Image reference of a new [`FoodItem`].
    pub image: Option<Value>,
}

impl NewFoodItem {
    /// Parses a [`NewFoodItem`] out of the provided JSON `value`, recording
    /// the error named with the provided `prefix` if it's not an object.
    pub fn from_json(
        value: Value,
        errors: &mut FieldErrors,
        prefix: &str,
    ) -> Option<Self> {
        let field = format!("{prefix}{}", field::NON_FIELD_ERRORS);
        if !value.is_object() {
            errors.add(field, "Invalid data. Expected a dictionary.");
            return None;
        }
        errors.check_result(field, serde_json::from_value(value))
    }

    /// Validates this [`NewFoodItem`], recording the errors of its fields
    /// named with the provided `prefix`.
    ///
    /// [`None`] is returned if any of the fields is invalid.
    pub fn validate(
        self,
        errors: &mut FieldErrors,
        prefix: &str,
    ) -> Option<command::create_food_items::NewFoodItem> {
        let field = |name: &str| format!("{prefix}{name}");

        let name = errors
            .require_string(&field("name"), self.name)
            .and_then(|n| {
                errors.check(
                    field("name"),
                    food_item::Name::new(n.trim()),
                    format!(
                        "Ensure this field is not blank and has no more than \
                         {} characters.",
                        food_item::Name::MAX_LEN,
                    ),
                )
            });

        let price = errors
            .require_decimal(&field("price"), self.price)
            .and_then(|p| {
                let message = if p.is_sign_negative() && !p.is_zero() {
                    "Ensure this value is greater than or equal to 0."
                } else {
                    "Ensure that there are no more than 2 decimal places and \
                     6 digits before the decimal point."
                };
                errors.check(field("price"), food_item::Price::new(p), message)
            });

        let quantity = errors
            .require_integer(&field("quantity"), self.quantity)
            .and_then(|q| {
                errors.check(
                    field("quantity"),
                    u32::try_from(q)
                        .ok()
                        .filter(|q| *q > 0)
                        .and_then(food_item::Stock::new),
                    format!(
                        "Ensure this value is between 1 and {}.",
                        food_item::Stock::MAX,
                    ),
                )
            });

        let item_type = errors
            .require_string(&field("item_type"), self.item_type)
            .and_then(|t| {
                errors.check_result(
                    field("item_type"),
                    food_item::ItemType::parse(&t),
                )
            });

        let flavor = errors
            .require_string(&field("flavor"), self.flavor)
            .and_then(|f| {
                errors.check_result(
                    field("flavor"),
                    food_flavor::Name::parse(&f),
                )
            });

        let image = match self.image.filter(|i| !i.is_null()) {
            None => Some(None),
            Some(i) => errors
                .check(field("image"), field::string(i), field::INVALID_STRING)
                .and_then(|i| {
                    if i.trim().is_empty() {
                        return Some(None);
                    }
                    errors
                        .check(
                            field("image"),
                            food_item::Image::new(i.trim()),
                            "Ensure this field has no more than 512 \
                             characters.",
                        )
                        .map(Some)
                }),
        };

        Some(command::create_food_items::NewFoodItem {
            name: name?,
            price: price?,
            quantity: quantity?,
            item_type: item_type?,
            flavor: flavor?,
            image: image?,
        })
    }
}

/// Lists all the [`FoodItem`]s.
///
/// # Errors
///
/// Errors if the [`FoodItem`]s cannot be loaded.
#[tracing::instrument(skip_all, fields(otel.name = api::SPAN_NAME))]
pub async fn list(ctx: Context) -> Result<Json<Vec<FoodItem>>, Error> {
    ctx.service()
        .execute(query::food_items::Listings)
        .await
        .map(|l| Json(l.into_iter().map(FoodItem::from).collect()))
        .map_err(AsError::into_error)
}

/// Returns the [`FoodItem`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `FOOD_ITEM_NOT_EXISTS` - [`FoodItem`] with the provided ID doesn't
///                            exist.
#[tracing::instrument(
    skip_all,
    fields(food_item.id = %id, otel.name = api::SPAN_NAME),
)]
pub async fn get(
    ctx: Context,
    Path(id): Path<food_item::Id>,
) -> Result<Json<FoodItem>, Error> {
    ctx.service()
        .execute(query::food_item::Listing(id))
        .await
        .map_err(AsError::into_error)?
        .map(|l| Json(l.into()))
        .ok_or_else(|| FoodItemError::NotExists.into())
}

/// Creates new [`FoodItem`]s of the truck with the provided ID.
///
/// Accepts either a single [`NewFoodItem`] or an array of them. Either all
/// the [`FoodItem`]s are created, or none of them.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_FIELDS` - some of the [`NewFoodItem`] fields are invalid;
/// - `NO_FOOD_ITEMS` - empty array of [`NewFoodItem`]s is provided;
/// - `TRUCK_NOT_EXISTS` - truck with the provided ID doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(otel.name = api::SPAN_NAME, truck.id = %truck_id),
)]
pub async fn create(
    ctx: Context,
    Path(truck_id): Path<truck::Id>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<FoodItem>>), Error> {
    let bodies: Vec<(String, Value)> = match body {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (format!("[{i}]."), item))
            .collect(),
        item @ (Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Object(_)) => vec![(String::new(), item)],
    };

    let mut errors = FieldErrors::default();
    let items = bodies
        .into_iter()
        .map(|(prefix, item)| {
            NewFoodItem::from_json(item, &mut errors, &prefix)?
                .validate(&mut errors, &prefix)
        })
        .collect::<Vec<_>>();
    let Some(items) = items.into_iter().collect::<Option<Vec<_>>>() else {
        return Err(errors.into());
    };

    ctx.service()
        .execute(command::CreateFoodItems { truck_id, items })
        .await
        .map(|listings| {
            (
                StatusCode::CREATED,
                Json(listings.into_iter().map(FoodItem::from).collect()),
            )
        })
        .map_err(AsError::into_error)
}

define_error! {
    enum FoodItemError {
        #[code = "FOOD_ITEM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Food item not found"]
        NotExists,

        #[code = "NO_FOOD_ITEMS"]
        #[status = BAD_REQUEST]
        #[message = "At least one food item must be provided"]
        NoItems,
    }
}

impl AsError for command::create_food_items::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoItems => Some(FoodItemError::NoItems.into()),
            Self::TruckNotExists(_) => Some(TruckError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::{json, Value};
    use service::domain::{food_flavor, food_item};

    use crate::{api::field, error::FieldErrors};

    use super::NewFoodItem;

    fn valid() -> NewFoodItem {
        NewFoodItem {
            name: Some(json!(" Vanilla Cone ")),
            price: Some(json!(5)),
            quantity: Some(json!(10)),
            item_type: Some(json!("ice_cream")),
            flavor: Some(json!("chocolate")),
            image: None,
        }
    }

    #[test]
    fn accepts_valid_item() {
        let mut errors = FieldErrors::default();

        let item = valid().validate(&mut errors, "").unwrap();

        assert!(errors.is_empty());
        assert_eq!(item.name.to_string(), "Vanilla Cone");
        assert_eq!(item.price.to_string(), "5.00");
        assert_eq!(item.quantity, food_item::Stock::new(10).unwrap());
        assert_eq!(item.item_type, food_item::ItemType::IceCream);
        assert_eq!(item.flavor, food_flavor::Name::Chocolate);
        assert!(item.image.is_none());
    }

    #[test]
    fn accepts_numeric_strings() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem {
            price: Some(json!("2.50")),
            quantity: Some(json!("2")),
            image: Some(json!("  ")),
            ..valid()
        }
        .validate(&mut errors, "")
        .unwrap();

        assert!(errors.is_empty());
        assert_eq!(item.price.to_string(), "2.50");
        assert_eq!(item.quantity, food_item::Stock::new(2).unwrap());
        assert!(item.image.is_none());
    }

    #[test]
    fn rejects_malformed_numbers() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem {
            price: Some(json!("abc")),
            quantity: Some(json!(1.5)),
            ..valid()
        }
        .validate(&mut errors, "[0].");

        assert!(item.is_none());
        assert_eq!(errors.get("[0].price"), [field::INVALID_NUMBER]);
        assert_eq!(errors.get("[0].quantity"), [field::INVALID_INTEGER]);
        assert!(errors.get("[0].name").is_empty());
    }

    #[test]
    fn rejects_negative_price_and_non_positive_quantity() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem {
            price: Some(json!("-2.50")),
            quantity: Some(json!(0)),
            ..valid()
        }
        .validate(&mut errors, "");

        assert!(item.is_none());
        assert_eq!(
            errors.get("price"),
            ["Ensure this value is greater than or equal to 0."],
        );
        assert_eq!(errors.get("quantity").len(), 1);
        assert!(errors.get("name").is_empty());
    }

    #[test]
    fn rejects_unknown_kinds() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem {
            item_type: Some(json!("InvalidType")),
            flavor: Some(json!("vanilla")),
            ..valid()
        }
        .validate(&mut errors, "[1].");

        assert!(item.is_none());
        assert_eq!(errors.get("[1].item_type").len(), 1);
        assert_eq!(errors.get("[1].flavor").len(), 1);
    }

    #[test]
    fn requires_fields() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem::default().validate(&mut errors, "");

        assert!(item.is_none());
        for field in ["name", "price", "quantity", "item_type", "flavor"] {
            assert_eq!(errors.get(field), [FieldErrors::REQUIRED]);
        }
        assert!(errors.get("image").is_empty());
    }

    #[test]
    fn rejects_too_long_or_non_string_image() {
        let mut errors = FieldErrors::default();
        let item = NewFoodItem {
            image: Some(json!("x".repeat(513))),
            ..valid()
        }
        .validate(&mut errors, "");
        assert!(item.is_none());
        assert_eq!(errors.get("image").len(), 1);

        let mut errors = FieldErrors::default();
        let item = NewFoodItem {
            image: Some(json!({"url": "cone.png"})),
            ..valid()
        }
        .validate(&mut errors, "");
        assert!(item.is_none());
        assert_eq!(errors.get("image"), [field::INVALID_STRING]);
    }

    #[test]
    fn rejects_non_object_body() {
        let mut errors = FieldErrors::default();

        let item = NewFoodItem::from_json(Value::from(42), &mut errors, "[2].");

        assert!(item.is_none());
        assert_eq!(
            errors.get("[2].non_field_errors"),
            ["Invalid data. Expected a dictionary."],
        );
    }
}
