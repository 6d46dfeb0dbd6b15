//! Raw Postgres connections and the [`Connection`] abstraction over them.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters bound to a SQL statement.
pub type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// Pooled connection with an open transaction.
#[self_referencing]
pub struct Tx {
    /// Pooled [`NonTx`] connection owning the transaction.
    conn: NonTx,

    /// Open transaction, until committed.
    #[borrows(mut conn)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.with_tx(|tx| tx.is_some());
        f.debug_struct("Tx").field("open", &open).finish_non_exhaustive()
    }
}

impl Tx {
    /// Returns the open transaction of this [`Tx`].
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("used after commit"))
    }

    /// Opens a transaction in the provided pooled [`NonTx`] connection.
    ///
    /// # Errors
    ///
    /// If the `BEGIN` statement fails.
    pub async fn begin(conn: NonTx) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Commits the transaction of this [`Tx`].
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let tx = self.with_tx_mut(|tx| tx.take()).expect("committed twice");
        tx.commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

/// Connection able to run SQL statements.
///
/// Statements are prepared once per physical connection and cached, so `sql`
/// is expected to be a constant.
pub trait Connection {
    /// Runs the provided `sql` query returning all the resulting [`Row`]s.
    ///
    /// # Errors
    ///
    /// If the statement cannot be prepared or run.
    fn query(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` query returning at most one [`Row`].
    ///
    /// # Errors
    ///
    /// If the statement cannot be prepared or run, or returns more than one
    /// [`Row`].
    fn query_opt(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Runs the provided `sql` statement returning the number of affected
    /// rows.
    ///
    /// # Errors
    ///
    /// If the statement cannot be prepared or run.
    fn exec(
        &self,
        sql: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

/// Implements [`Connection`] for a raw connection type, given the expression
/// accessing its statement cache.
macro_rules! impl_raw_connection {
    ($ty:ty, |$this:ident| $conn:expr) => {
        impl Connection for $ty {
            async fn query(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>> {
                let $this = self;
                let conn = $conn;
                let stmt = conn
                    .prepare_cached(sql)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?;
                conn.query(&stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn query_opt(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>> {
                let $this = self;
                let conn = $conn;
                let stmt = conn
                    .prepare_cached(sql)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?;
                conn.query_opt(&stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn exec(
                &self,
                sql: &str,
                params: Params<'_>,
            ) -> Result<u64, Traced<database::Error>> {
                let $this = self;
                let conn = $conn;
                let stmt = conn
                    .prepare_cached(sql)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?;
                conn.execute(&stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }
        }
    };
}

impl_raw_connection!(NonTx, |this| &**this);

impl_raw_connection!(Tx, |this| this.tx());
