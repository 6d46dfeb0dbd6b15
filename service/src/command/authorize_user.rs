//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token issued by an
/// external identity provider.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUser {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUser> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AuthorizeUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUser { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        command::{AuthorizeUser, CreateUser},
        domain::user::{self, Session},
        fixture, Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn authorizes_existing_user() {
        let svc = fixture::service();
        let user = svc
            .execute(CreateUser {
                username: user::Username::new("testuser").unwrap(),
                email: None,
            })
            .await
            .unwrap();
        let token = fixture::token(&Session {
            user_id: user.id,
            expires_at: fixture::in_an_hour(),
        });

        let session = svc.execute(AuthorizeUser { token }).await.unwrap();

        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let svc = fixture::service();
        let id = user::Id::new();
        let token = fixture::token(&Session {
            user_id: id,
            expires_at: fixture::in_an_hour(),
        });

        let err = svc.execute(AuthorizeUser { token }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(missing) if *missing == id,
        ));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = fixture::service();
        let token = fixture::token(&Session {
            user_id: user::Id::new(),
            expires_at: DateTime::from_unix_timestamp(
                DateTime::now().unix_timestamp() - 3600,
            )
            .unwrap()
            .coerce(),
        });

        let err = svc.execute(AuthorizeUser { token }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let svc = fixture::service();

        let err = svc
            .execute(AuthorizeUser {
                token: "not.a.token".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
