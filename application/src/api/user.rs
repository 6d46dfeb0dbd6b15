//! [`User`]-related definitions.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::{
    command::{self, Command as _},
    domain::{self, user},
};

use crate::{
    api::{self, field, Json},
    define_error,
    error::FieldErrors,
    AsError, Context, Error,
};

/// Customer purchasing food items.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// Unique identifier of this [`User`].
    pub id: user::Id,

    /// Unique username of this [`User`].
    pub username: String,

    /// Email address of this [`User`], if any.
    pub email: Option<String>,

    /// [RFC 3339] date and time when this [`User`] was created.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.map(|e| e.to_string()),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Request body describing a new [`User`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewUser {
    /// Username of a new [`User`].
    pub username: Option<Value>,

    /// Email address of a new [`User`].
    pub email: Option<Value>,
}

impl NewUser {
    /// Validates this [`NewUser`].
    ///
    /// # Errors
    ///
    /// Errors with the [`FieldErrors`] if any of the fields is invalid.
    pub fn validate(self) -> Result<command::CreateUser, FieldErrors> {
        let mut errors = FieldErrors::default();

        let username =
            errors.require_string("username", self.username).and_then(|u| {
                errors.check(
                    "username",
                    user::Username::new(u),
                    "Enter a valid username. This value may contain only \
                     letters, numbers, and @/./+/-/_ characters.",
                )
            });

        let email = self
            .email
            .filter(|e| !e.is_null() && e.as_str() != Some(""))
            .map(|e| {
                errors
                    .check("email", field::string(e), field::INVALID_STRING)
                    .and_then(|e| {
                        errors.check(
                            "email",
                            user::Email::new(e),
                            "Enter a valid email address.",
                        )
                    })
            });

        match (username, email) {
            (Some(username), None) => Ok(command::CreateUser {
                username,
                email: None,
            }),
            (Some(username), Some(Some(email))) => Ok(command::CreateUser {
                username,
                email: Some(email),
            }),
            (None, _) | (Some(_), Some(None)) => Err(errors),
        }
    }
}

/// Creates a new [`User`].
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_FIELDS` - some of the [`NewUser`] fields are invalid;
/// - `USERNAME_OCCUPIED` - provided username is occupied by another [`User`].
#[tracing::instrument(
    skip_all,
    fields(
        email = ?body.email,
        otel.name = api::SPAN_NAME,
        username = ?body.username,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), Error> {
    let cmd = body.validate()?;

    ctx.service()
        .execute(cmd)
        .await
        .map(|u| (StatusCode::CREATED, Json(u.into())))
        .map_err(AsError::into_error)
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USERNAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "A user with that username already exists"]
                UsernameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
        }
    }
}
