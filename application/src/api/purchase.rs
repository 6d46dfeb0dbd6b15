//! Purchase-related definitions.

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use service::{
    command::{self, Command as _},
    domain::{food_item, sale},
};

use crate::{
    api::{self, food_item::FoodItemError, Json, Message},
    define_error,
    error::FieldErrors,
    AsError, Context, Error,
};

#[cfg(doc)]
use crate::api::FoodItem;

/// Request body of a [`FoodItem`] purchase.
///
/// Fields are kept raw, so their malformed values are reported per field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Purchase {
    /// Identifier of the [`FoodItem`] to purchase.
    pub food_id: Option<Value>,

    /// Number of units to purchase.
    pub quantity: Option<Value>,
}

impl Purchase {
    /// Validates this [`Purchase`], returning the ID of the [`FoodItem`] to
    /// purchase and the [`sale::Quantity`] to purchase.
    ///
    /// # Errors
    ///
    /// Errors with the [`FieldErrors`] if any of the fields is invalid.
    pub fn validate(
        self,
    ) -> Result<(food_item::Id, sale::Quantity), FieldErrors> {
        let mut errors = FieldErrors::default();

        let food_item_id =
            errors.require_string("food_id", self.food_id).and_then(|id| {
                errors.check(
                    "food_id",
                    id.trim().parse::<food_item::Id>().ok(),
                    "Must be a valid UUID.",
                )
            });

        let quantity =
            errors.require_integer("quantity", self.quantity).and_then(|q| {
                errors.check(
                    "quantity",
                    u32::try_from(q).ok().and_then(sale::Quantity::new),
                    "Quantity must be a positive integer",
                )
            });

        food_item_id.zip(quantity).ok_or(errors)
    }
}

/// Purchases the requested quantity of a [`FoodItem`].
///
/// The purchase is attributed to the authenticated user, if any.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_FIELDS` - some of the [`Purchase`] fields are invalid;
/// - `INVALID_AUTHORIZATION` - provided authorization token is invalid;
/// - `FOOD_ITEM_NOT_EXISTS` - [`FoodItem`] with the provided ID doesn't
///                            exist;
/// - `INSUFFICIENT_STOCK` - [`FoodItem`] stock doesn't cover the requested
///                          quantity.
#[tracing::instrument(
    skip_all,
    fields(
        food_item.id = ?body.food_id,
        otel.name = api::SPAN_NAME,
        quantity = ?body.quantity,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(body): Json<Purchase>,
) -> Result<(StatusCode, Json<Message>), Error> {
    let (food_item_id, quantity) = body.validate()?;
    let session = ctx.try_current_session().await?;

    drop(
        ctx.service()
            .execute(command::Purchase {
                food_item_id,
                quantity,
                user_id: session.map(|s| s.user_id),
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok((StatusCode::CREATED, Json(Message { message: "ENJOY!" })))
}

define_error! {
    enum PurchaseError {
        #[code = "INSUFFICIENT_STOCK"]
        #[status = BAD_REQUEST]
        #[message = "SORRY!"]
        InsufficientStock,
    }
}

impl AsError for command::purchase::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FoodItemNotExists(_) => Some(FoodItemError::NotExists.into()),
            Self::InsufficientStock { .. } => {
                Some(PurchaseError::InsufficientStock.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::purchase::ExecutionError,
        domain::{food_item, sale},
    };

    use serde_json::json;

    use crate::{api::field, error::FieldErrors, AsError as _};

    use super::Purchase;

    #[test]
    fn validates_fields() {
        let id = food_item::Id::new();
        let (food_item_id, quantity) = Purchase {
            food_id: Some(json!(id.to_string())),
            quantity: Some(json!(2)),
        }
        .validate()
        .unwrap();
        assert_eq!(food_item_id, id);
        assert_eq!(u32::from(quantity), 2);

        let errors = Purchase {
            food_id: Some(json!("42")),
            quantity: Some(json!(0)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("food_id").len(), 1);
        assert_eq!(
            errors.get("quantity"),
            ["Quantity must be a positive integer"],
        );

        let errors = Purchase::default().validate().unwrap_err();
        assert_eq!(errors.get("food_id"), [FieldErrors::REQUIRED]);
        assert_eq!(errors.get("quantity"), [FieldErrors::REQUIRED]);
    }

    #[test]
    fn parses_quantity_leniently() {
        let id = food_item::Id::new();
        let (_, quantity) = Purchase {
            food_id: Some(json!(id.to_string())),
            quantity: Some(json!("2")),
        }
        .validate()
        .unwrap();
        assert_eq!(u32::from(quantity), 2);

        for quantity in [json!(1.5), json!("two"), json!([2])] {
            let errors = Purchase {
                food_id: Some(json!(id.to_string())),
                quantity: Some(quantity),
            }
            .validate()
            .unwrap_err();
            assert_eq!(errors.get("quantity"), [field::INVALID_INTEGER]);
            assert!(errors.get("food_id").is_empty());
        }

        let errors = Purchase {
            food_id: Some(json!(true)),
            quantity: Some(json!(1)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("food_id"), [field::INVALID_STRING]);
    }

    #[test]
    fn insufficient_stock_is_sorry() {
        let err = ExecutionError::InsufficientStock {
            available: food_item::Stock::new(10).unwrap(),
            requested: sale::Quantity::new(11).unwrap(),
        }
        .as_error();

        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "SORRY!");
    }
}
