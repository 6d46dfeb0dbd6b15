//! [`Query`] collection related to a single [`FoodItem`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{food_item, FoodFlavor, FoodItem},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] of a [`read::Listing`] of the [`FoodItem`] with the provided ID.
#[derive(Clone, Copy, Debug)]
pub struct Listing(pub food_item::Id);

impl<Db> Query<Listing> for Service<Db>
where
    Db: Database<
            Select<By<Option<FoodItem>, food_item::Id>>,
            Ok = Option<FoodItem>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>,
            Ok = Vec<FoodFlavor>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Listing(id): Listing,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(item) = self
            .database()
            .execute(Select(By::<Option<FoodItem>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let flavors = self
            .database()
            .execute(Select(By::<Vec<FoodFlavor>, _>::new(vec![id])))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::Listing { item, flavors }))
    }
}
