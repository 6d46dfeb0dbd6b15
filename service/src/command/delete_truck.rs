//! [`Command`] for deleting a [`Truck`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{FoodFlavor, FoodItem, Sale};
use crate::{
    domain::{truck, Truck},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Truck`] along with its [`FoodItem`]s, their
/// [`FoodFlavor`]s and its [`Sale`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteTruck {
    /// ID of the [`Truck`] to delete.
    pub truck_id: truck::Id,
}

impl<Db> Command<DeleteTruck> for Service<Db>
where
    Db: Database<
        Delete<By<Option<Truck>, truck::Id>>,
        Ok = Option<Truck>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Truck;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteTruck) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteTruck { truck_id } = cmd;

        self.database()
            .execute(Delete(By::new(truck_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TruckNotExists(truck_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`DeleteTruck`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Truck`] with the provided ID does not exist.
    #[display("`Truck(id: {_0})` does not exist")]
    #[from(ignore)]
    TruckNotExists(#[error(not(source))] truck::Id),
}
