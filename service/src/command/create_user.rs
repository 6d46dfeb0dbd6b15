//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`user::Username`] of a new [`User`].
    pub username: user::Username,

    /// [`user::Email`] of a new [`User`], if any.
    pub email: Option<user::Email>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { username, email } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }

        let user = User {
            id: user::Id::new(),
            username,
            email,
            created_at: DateTime::now().coerce(),
        };
        let inserted = self.database().execute(Insert(user.clone())).await;
        if let Err(e) = &inserted {
            // Concurrently created `User` with the same `user::Username`.
            if e.as_ref()
                .is_unique_violation(Some(database::USERNAME_CONSTRAINT))
            {
                return Err(tracerr::new!(E::UsernameOccupied(user.username)));
            }
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    UsernameOccupied(#[error(not(source))] user::Username),
}

#[cfg(test)]
mod spec {
    use crate::{command::CreateUser, domain::user, fixture, Command as _};

    use super::ExecutionError;

    #[tokio::test]
    async fn creates_user() {
        let svc = fixture::service();

        let user = svc
            .execute(CreateUser {
                username: user::Username::new("testuser").unwrap(),
                email: Some(user::Email::new("test@example.com").unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(user.username.to_string(), "testuser");
        assert_eq!(
            user.email.map(|e| e.to_string()).as_deref(),
            Some("test@example.com"),
        );
    }

    #[tokio::test]
    async fn rejects_occupied_username() {
        let svc = fixture::service();
        let cmd = CreateUser {
            username: user::Username::new("testuser").unwrap(),
            email: None,
        };
        drop(svc.execute(cmd.clone()).await.unwrap());

        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UsernameOccupied(name) if name.to_string() == "testuser",
        ));
    }
}
