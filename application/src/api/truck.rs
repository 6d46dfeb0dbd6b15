//! [`Truck`]-related definitions.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::{
    command::{self, Command as _},
    domain::{self, food_item, sale, truck, user},
    query, read, Query as _,
};

use crate::{
    api::{self, FoodItem, Json, Path},
    define_error,
    error::FieldErrors,
    AsError, Context, Error,
};

/// Mobile food truck along with its [`FoodItem`]s and revenue.
#[derive(Clone, Debug, Serialize)]
pub struct Truck {
    /// Unique identifier of this [`Truck`].
    pub id: truck::Id,

    /// Name of this [`Truck`].
    pub name: String,

    /// [`FoodItem`]s of this [`Truck`].
    pub food_items: Vec<FoodItem>,

    /// Sum of price × quantity over all the sales of this [`Truck`], with
    /// exactly two fractional digits.
    pub total_sales: String,

    /// [RFC 3339] date and time when this [`Truck`] was created.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<read::Inventory> for Truck {
    fn from(inventory: read::Inventory) -> Self {
        let read::Inventory {
            truck,
            items,
            total_sales,
        } = inventory;
        Self {
            id: truck.id,
            name: truck.name.to_string(),
            food_items: items.into_iter().map(FoodItem::from).collect(),
            total_sales: total_sales.to_string(),
            created_at: truck.created_at.to_rfc3339(),
        }
    }
}

/// Inventory of all the [`Truck`]s.
#[derive(Clone, Debug, Serialize)]
pub struct Inventory {
    /// [`Truck`]s along with their [`FoodItem`]s and revenue.
    #[serde(rename = "Inventory")]
    pub trucks: Vec<Truck>,
}

/// Record of a [`FoodItem`] purchase from a [`Truck`].
#[derive(Clone, Debug, Serialize)]
pub struct Sale {
    /// Unique identifier of this [`Sale`].
    pub id: sale::Id,

    /// Identifier of the purchased [`FoodItem`].
    pub food_item_id: food_item::Id,

    /// Identifier of the [`Truck`] the [`FoodItem`] was purchased from.
    pub truck_id: truck::Id,

    /// Identifier of the purchasing user, if not anonymous.
    pub user_id: Option<user::Id>,

    /// Number of purchased units.
    pub quantity: u32,

    /// [RFC 3339] date and time of the purchase.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub purchase_time: String,
}

impl From<domain::Sale> for Sale {
    fn from(sale: domain::Sale) -> Self {
        Self {
            id: sale.id,
            food_item_id: sale.food_item_id,
            truck_id: sale.truck_id,
            user_id: sale.user_id,
            quantity: sale.quantity.into(),
            purchase_time: sale.purchased_at.to_rfc3339(),
        }
    }
}

/// Request body describing a new [`Truck`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewTruck {
    /// Name of a new [`Truck`].
    pub name: Option<Value>,
}

impl NewTruck {
    /// Validates this [`NewTruck`].
    ///
    /// # Errors
    ///
    /// Errors with the [`FieldErrors`] if any of the fields is invalid.
    pub fn validate(self) -> Result<command::CreateTruck, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = errors.require_string("name", self.name).and_then(|n| {
            errors.check(
                "name",
                truck::Name::new(n.trim()),
                format!(
                    "Ensure this field is not blank and has no more than {} \
                     characters.",
                    truck::Name::MAX_LEN,
                ),
            )
        });

        name.map(|name| command::CreateTruck { name })
            .ok_or(errors)
    }
}

/// Response to a [`Truck`] creation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Created {
    /// Human-readable message.
    pub message: &'static str,

    /// Unique identifier of the created [`Truck`].
    pub id: truck::Id,
}

/// Lists all the [`Truck`]s along with their [`FoodItem`]s and revenue.
///
/// # Errors
///
/// Errors if the [`Truck`]s cannot be loaded.
#[tracing::instrument(skip_all, fields(otel.name = api::SPAN_NAME))]
pub async fn list(ctx: Context) -> Result<Json<Vec<Truck>>, Error> {
    ctx.service()
        .execute(query::trucks::Inventories)
        .await
        .map(|i| Json(i.into_iter().map(Truck::from).collect()))
        .map_err(AsError::into_error)
}

/// Returns the [`Inventory`] of all the [`Truck`]s.
///
/// # Errors
///
/// Errors if the [`Truck`]s cannot be loaded.
#[tracing::instrument(skip_all, fields(otel.name = api::SPAN_NAME))]
pub async fn inventory(ctx: Context) -> Result<Json<Inventory>, Error> {
    ctx.service()
        .execute(query::trucks::Inventories)
        .await
        .map(|i| {
            Json(Inventory {
                trucks: i.into_iter().map(Truck::from).collect(),
            })
        })
        .map_err(AsError::into_error)
}

/// Returns the [`Truck`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `TRUCK_NOT_EXISTS` - [`Truck`] with the provided ID doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(otel.name = api::SPAN_NAME, truck.id = %id),
)]
pub async fn get(
    ctx: Context,
    Path(id): Path<truck::Id>,
) -> Result<Json<Truck>, Error> {
    ctx.service()
        .execute(query::truck::Inventory(id))
        .await
        .map_err(AsError::into_error)?
        .map(|i| Json(i.into()))
        .ok_or_else(|| TruckError::NotExists.into())
}

/// Lists all the [`Sale`]s of the [`Truck`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `TRUCK_NOT_EXISTS` - [`Truck`] with the provided ID doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(otel.name = api::SPAN_NAME, truck.id = %id),
)]
pub async fn sales(
    ctx: Context,
    Path(id): Path<truck::Id>,
) -> Result<Json<Vec<Sale>>, Error> {
    ctx.service()
        .execute(query::truck::Sales(id))
        .await
        .map_err(AsError::into_error)?
        .map(|s| Json(s.into_iter().map(Sale::from).collect()))
        .ok_or_else(|| TruckError::NotExists.into())
}

/// Creates a new [`Truck`].
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_FIELDS` - some of the [`NewTruck`] fields are invalid.
#[tracing::instrument(skip_all, fields(otel.name = api::SPAN_NAME))]
pub async fn create(
    ctx: Context,
    Json(body): Json<NewTruck>,
) -> Result<(StatusCode, Json<Created>), Error> {
    let cmd = body.validate()?;

    let truck = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        Json(Created {
            message: "Ice cream truck created successfully.",
            id: truck.id,
        }),
    ))
}

/// Deletes the [`Truck`] with the provided ID along with its [`FoodItem`]s
/// and [`Sale`]s.
///
/// # Errors
///
/// Possible error codes:
/// - `TRUCK_NOT_EXISTS` - [`Truck`] with the provided ID doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(otel.name = api::SPAN_NAME, truck.id = %id),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<truck::Id>,
) -> Result<StatusCode, Error> {
    ctx.service()
        .execute(command::DeleteTruck { truck_id: id })
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(AsError::into_error)
}

define_error! {
    enum TruckError {
        #[code = "TRUCK_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Truck not found"]
        NotExists,
    }
}

impl AsError for command::create_truck::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_truck::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::TruckNotExists(_) => Some(TruckError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::{
        domain::{self, food_flavor, food_item, sale, truck},
        read,
    };

    use super::{Inventory, NewTruck, Truck};

    /// Unix timestamp of `2023-10-21T15:59:00Z`.
    const TIMESTAMP: i64 = 1_697_903_940;

    #[test]
    fn serializes_inventory() {
        let truck = domain::Truck {
            id: truck::Id::new(),
            name: "Test Truck".parse().unwrap(),
            created_at: truck::CreationDateTime::from_unix_timestamp(
                TIMESTAMP,
            )
            .unwrap(),
        };
        let item = domain::FoodItem {
            id: food_item::Id::new(),
            truck_id: truck.id,
            name: food_item::Name::new("Vanilla Cone").unwrap(),
            price: "5".parse().unwrap(),
            quantity: food_item::Stock::new(8).unwrap(),
            item_type: food_item::ItemType::IceCream,
            image: None,
            created_at: food_item::CreationDateTime::from_unix_timestamp(
                TIMESTAMP,
            )
            .unwrap(),
        };
        let flavor = domain::FoodFlavor {
            id: food_flavor::Id::new(),
            food_item_id: item.id,
            name: food_flavor::Name::Chocolate,
        };
        let sale = domain::Sale {
            id: sale::Id::new(),
            food_item_id: item.id,
            truck_id: truck.id,
            user_id: None,
            quantity: sale::Quantity::new(2).unwrap(),
            purchased_at: sale::PurchaseDateTime::from_unix_timestamp(
                TIMESTAMP,
            )
            .unwrap(),
        };
        let (truck_id, item_id, flavor_id) = (truck.id, item.id, flavor.id);

        let inventory = read::Inventory::assemble(
            [truck],
            vec![item],
            vec![flavor],
            &[sale],
        );
        let json = serde_json::to_value(Inventory {
            trucks: inventory.into_iter().map(Truck::from).collect(),
        })
        .unwrap();

        assert_eq!(
            json,
            json!({
                "Inventory": [{
                    "id": truck_id.to_string(),
                    "name": "Test Truck",
                    "food_items": [{
                        "id": item_id.to_string(),
                        "truck_id": truck_id.to_string(),
                        "name": "Vanilla Cone",
                        "price": "5.00",
                        "quantity": 8,
                        "item_type": "ice_cream",
                        "flavors": [{
                            "id": flavor_id.to_string(),
                            "name": "chocolate",
                        }],
                        "image": null,
                        "created_at": "2023-10-21T15:59:00Z",
                    }],
                    "total_sales": "10.00",
                    "created_at": "2023-10-21T15:59:00Z",
                }],
            }),
        );
    }

    #[test]
    fn serializes_zero_total_sales_with_cents() {
        let truck = domain::Truck {
            id: truck::Id::new(),
            name: "Empty Truck".parse().unwrap(),
            created_at: truck::CreationDateTime::from_unix_timestamp(
                TIMESTAMP,
            )
            .unwrap(),
        };

        let json = serde_json::to_value(Truck::from(
            read::Inventory::assemble([truck], vec![], vec![], &[])
                .pop()
                .unwrap(),
        ))
        .unwrap();

        assert_eq!(json["total_sales"], "0.00");
        assert_eq!(json["food_items"], json!([]));
    }

    #[test]
    fn validates_name() {
        let cmd = NewTruck {
            name: Some(json!("  Test Truck ")),
        }
        .validate()
        .unwrap();
        assert_eq!(cmd.name.to_string(), "Test Truck");

        for name in [None, Some(json!("")), Some(json!("   ")), Some(json!({}))]
        {
            let errors = NewTruck { name }.validate().unwrap_err();
            assert_eq!(errors.get("name").len(), 1);
        }

        let errors = NewTruck {
            name: Some(json!("x".repeat(101))),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("name").len(), 1);
    }
}
