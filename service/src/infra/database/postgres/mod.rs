//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::{Config, PoolConfig};

/// Postgres [`Database`] client.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client pooling connections as the provided
    /// [`Config`] describes.
    ///
    /// No connection is established until the first statement runs.
    ///
    /// # Errors
    ///
    /// If the [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed to run.
    #[display("Statement failed: {_0}")]
    Statement(connection::Error),

    /// [`connection::Pool`] cannot be created from the provided [`Config`].
    #[display("Invalid `connection::Pool` config: {_0}")]
    PoolCreation(connection::PoolCreationError),

    /// [`Connection`] cannot be checked out from the [`connection::Pool`].
    #[display("Failed to check out `Connection`: {_0}")]
    Pool(connection::PoolError),
}

impl Error {
    /// Returns the name of the constraint violated by the failed statement,
    /// if its [`SqlState`] is the provided one.
    fn violated(&self, state: &SqlState) -> Option<&str> {
        let Self::Statement(e) = self else {
            return None;
        };
        (e.code() == Some(state))
            .then(|| e.as_db_error().and_then(|e| e.constraint()))
            .map(Option::unwrap_or_default)
    }

    /// Checks if the error is a unique violation of the specified constraint.
    ///
    /// Any constraint matches if [`None`] is specified.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        self.violated(&SqlState::UNIQUE_VIOLATION)
            .is_some_and(|c| constraint.map_or(true, |exp| c == exp))
    }
}
