//! Postgres database clients acquiring their [`Connection`]s lazily.

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{
        self,
        connection::{self, Params},
        Connection,
    },
};

/// Lazily initialized [`Connection`] shared between clones of a client.
#[derive(Debug)]
struct Slot<C>(Arc<RwLock<Option<C>>>);

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> Slot<C> {
    /// Creates a new empty [`Slot`].
    fn empty() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }

    /// Returns the [`Connection`] stored in this [`Slot`], storing the one
    /// returned by `init` first, if empty.
    async fn get_or_try_init<F, Fut>(
        &self,
        init: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let read = self.0.read().await;
        let read = if read.is_some() {
            read
        } else {
            drop(read);
            let mut write = self.0.write().await;
            if write.is_none() {
                *write = Some(init().await.map_err(tracerr::wrap!())?);
            }
            write.downgrade()
        };
        Ok(RwLockReadGuard::map(read, |c| {
            c.as_ref().expect("stored before the guard is taken")
        }))
    }

    /// Takes the [`Connection`] out of this [`Slot`], if any.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Checks out a new [`connection::NonTx`] from the provided
/// [`connection::Pool`].
async fn checkout(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check [`Connection`]s out from.
    pub(crate) pool: connection::Pool,

    /// [`Connection`] checked out on first use.
    conn: Slot<connection::NonTx>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Slot::empty(),
        }
    }

    /// Returns the [`Connection`] of this [`NonTx`] client.
    async fn conn(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.conn.get_or_try_init(|| checkout(&self.pool)).await
    }
}

/// Transactional Postgres database client.
///
/// The transaction is opened on the first executed statement, reusing the
/// [`Connection`] of the [`NonTx`] client it was created from, if any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check a [`Connection`] out from.
    pool: connection::Pool,

    /// [`NonTx`] client this [`Tx`] was created from, until its
    /// [`Connection`] is reused.
    origin: Arc<RwLock<Option<NonTx>>>,

    /// [`Connection`] with the open transaction.
    tx: Slot<connection::Tx>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            origin: Arc::new(RwLock::new(Some(client))),
            tx: Slot::empty(),
        }
    }

    /// Returns the [`Connection`] of this [`Tx`] client, opening the
    /// transaction if it isn't yet.
    async fn conn(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.tx
            .get_or_try_init(|| async {
                let reused = match self.origin.write().await.take() {
                    Some(origin) => origin.conn.take().await,
                    None => None,
                };
                let conn = match reused {
                    Some(c) => c,
                    None => checkout(&self.pool)
                        .await
                        .map_err(tracerr::wrap!())?,
                };
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// Does nothing if no statement has been executed.
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Implements [`Connection`] for a client by delegating to its lazily
/// acquired [`Connection`].
macro_rules! impl_client_connection {
    ($($ty:ty),+) => {$(
        impl Connection for $ty {
            async fn query(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>> {
                self.conn()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>> {
                self.conn()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<u64, Traced<database::Error>> {
                self.conn()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(sql, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    )+};
}

impl_client_connection!(NonTx, Tx);
