//! REST API definitions.

pub mod field;
pub mod food_item;
pub mod purchase;
pub mod truck;
pub mod user;

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::Error;

pub use self::{food_item::FoodItem, truck::Truck, user::User};

/// Name of the [`tracing::Span`] for the REST API handlers.
const SPAN_NAME: &str = "REST API handler";

/// Builds the [`Router`] of all the REST API endpoints.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/purchase", post(purchase::create))
        .route("/inventory", get(truck::inventory))
        .route("/trucks", get(truck::list))
        .route("/trucks/create", post(truck::create))
        .route("/trucks/:id", get(truck::get).delete(truck::delete))
        .route("/trucks/:id/sales", get(truck::sales))
        .route("/trucks/:id/create-food-item", post(food_item::create))
        .route("/fooditem", get(food_item::list))
        .route("/fooditem/:id", get(food_item::get))
        .route("/users/create", post(user::create))
}

/// JSON request body or response.
///
/// Rejects malformed request bodies with an [`Error`].
#[derive(Clone, Copy, Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters of a request.
///
/// Rejects malformed parameters with an [`Error`].
#[derive(Clone, Copy, Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Response carrying a human-readable message.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Message {
    /// Message text.
    pub message: &'static str,
}
