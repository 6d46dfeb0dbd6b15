//! [`Query`] collection related to the multiple [`Truck`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{food_item, truck, FoodFlavor, FoodItem, Sale, Truck},
    infra::{database, Database},
    read, Service,
};

use super::{DatabaseQuery, Query};

/// Queries all the [`Truck`]s.
pub type All = DatabaseQuery<By<Vec<Truck>, ()>>;

/// [`Query`] of [`read::Inventory`]s of all the [`Truck`]s.
#[derive(Clone, Copy, Debug)]
pub struct Inventories;

impl<Db> Query<Inventories> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Truck>, ()>>,
        Ok = Vec<Truck>,
        Err = Traced<database::Error>,
    >,
    Self: Query<
        InventoriesOf,
        Ok = Vec<read::Inventory>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::Inventory>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Inventories) -> Result<Self::Ok, Self::Err> {
        let trucks = self
            .database()
            .execute(Select(By::<Vec<Truck>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        self.execute(InventoriesOf(trucks))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] of [`read::Inventory`]s of the provided [`Truck`]s.
#[derive(Clone, Debug)]
pub struct InventoriesOf(pub Vec<Truck>);

impl<Db> Query<InventoriesOf> for Service<Db>
where
    Db: Database<
            Select<By<Vec<FoodItem>, Vec<truck::Id>>>,
            Ok = Vec<FoodItem>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>,
            Ok = Vec<FoodFlavor>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, Vec<truck::Id>>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<read::Inventory>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        InventoriesOf(trucks): InventoriesOf,
    ) -> Result<Self::Ok, Self::Err> {
        if trucks.is_empty() {
            return Ok(vec![]);
        }
        let truck_ids = trucks.iter().map(|t| t.id).collect::<Vec<_>>();

        let items = self
            .database()
            .execute(Select(By::<Vec<FoodItem>, _>::new(truck_ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;

        let item_ids = items.iter().map(|i| i.id).collect::<Vec<_>>();
        let flavors = self
            .database()
            .execute(Select(By::<Vec<FoodFlavor>, _>::new(item_ids)))
            .await
            .map_err(tracerr::wrap!())?;

        let sales = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(truck_ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::Inventory::assemble(trucks, items, flavors, &sales))
    }
}
