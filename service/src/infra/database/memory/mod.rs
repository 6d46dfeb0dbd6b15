//! In-memory [`Database`] implementation.
//!
//! Keeps every record in process memory and emulates the relational
//! constraints of the [`Postgres`] schema, so the [`Service`] logic may be
//! exercised without a running database server.
//!
//! [`Postgres`]: super::Postgres
//! [`Service`]: crate::Service

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    food_flavor, food_item, sale, truck, user, FoodFlavor, FoodItem, Sale,
    Truck, User,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Records stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Truck`]s.
    trucks: HashMap<truck::Id, Truck>,

    /// Stored [`FoodItem`]s.
    food_items: HashMap<food_item::Id, FoodItem>,

    /// Stored [`FoodFlavor`]s.
    food_flavors: HashMap<food_flavor::Id, FoodFlavor>,

    /// Stored [`Sale`]s.
    sales: HashMap<sale::Id, Sale>,

    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,
}

impl State {
    /// Removes the [`Truck`] with the provided ID along with everything
    /// referencing it.
    fn delete_truck(&mut self, id: truck::Id) -> Option<Truck> {
        let truck = self.trucks.remove(&id)?;

        self.food_items.retain(|_, i| i.truck_id != id);
        let items = &self.food_items;
        self.food_flavors
            .retain(|_, f| items.contains_key(&f.food_item_id));
        self.sales.retain(|_, s| {
            s.truck_id != id && items.contains_key(&s.food_item_id)
        });

        Some(truck)
    }
}

/// Storage of a [`State`] a [`Memory`] client operates on.
pub trait Storage {
    /// Runs the provided function with an exclusive access to the [`State`].
    ///
    /// # Errors
    ///
    /// With [`Error::TxClosed`] if the [`State`] is no longer accessible.
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = Result<R, Error>>;
}

/// Non-transactional [`Storage`] applying every operation immediately.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared committed [`State`].
    state: Arc<Mutex<State>>,
}

impl Storage for NonTx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Error> {
        Ok(f(&mut *self.state.lock().await))
    }
}

/// Transactional [`Storage`].
///
/// Holds the whole committed [`State`] locked until committed or dropped, so
/// transactions are fully serialized. Operations are applied to a working
/// copy, which replaces the committed [`State`] on [`Tx::commit()`], and is
/// discarded otherwise.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Pending transaction, if not committed yet.
    inner: Arc<Mutex<Option<Pending>>>,
}

/// Pending transaction of a [`Tx`].
#[derive(Debug)]
struct Pending {
    /// Locked committed [`State`].
    committed: OwnedMutexGuard<State>,

    /// Working copy of the committed [`State`].
    working: State,
}

impl Tx {
    /// Starts a new [`Tx`] over the provided [`NonTx`] storage, waiting for
    /// other [`Tx`]s to finish.
    async fn begin(non_tx: &NonTx) -> Self {
        let committed = Arc::clone(&non_tx.state).lock_owned().await;
        let working = committed.clone();
        Self {
            inner: Arc::new(Mutex::new(Some(Pending {
                committed,
                working,
            }))),
        }
    }

    /// Commits this [`Tx`], making its changes visible.
    ///
    /// Does nothing if already committed.
    pub async fn commit(&self) {
        if let Some(Pending {
            mut committed,
            working,
        }) = self.inner.lock().await.take()
        {
            *committed = working;
        }
    }
}

impl Storage for Tx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Error> {
        let mut inner = self.inner.lock().await;
        let pending = inner.as_mut().ok_or(Error::TxClosed)?;
        Ok(f(&mut pending.working))
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Referenced record doesn't exist.
    #[display("Foreign key constraint `{_0}` violated")]
    ForeignKeyViolation(#[error(not(source))] &'static str),

    /// Record with the same unique value already exists.
    #[display("Unique constraint `{_0}` violated")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Transaction is used after being committed.
    #[display("Transaction is already closed")]
    TxClosed,
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    ///
    /// Any constraint matches if [`None`] is specified.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |e| e == *c),
            Self::ForeignKeyViolation(..) | Self::TxClosed => false,
        }
    }
}
