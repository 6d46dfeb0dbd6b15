//! [`Query`] collection related to the multiple [`FoodItem`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{food_item, FoodFlavor, FoodItem},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] of [`read::Listing`]s of all the [`FoodItem`]s.
#[derive(Clone, Copy, Debug)]
pub struct Listings;

impl<Db> Query<Listings> for Service<Db>
where
    Db: Database<
            Select<By<Vec<FoodItem>, ()>>,
            Ok = Vec<FoodItem>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>,
            Ok = Vec<FoodFlavor>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<read::Listing>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Listings) -> Result<Self::Ok, Self::Err> {
        let items = self
            .database()
            .execute(Select(By::<Vec<FoodItem>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        let item_ids = items.iter().map(|i| i.id).collect::<Vec<_>>();
        let flavors = self
            .database()
            .execute(Select(By::<Vec<FoodFlavor>, _>::new(item_ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::Listing::group(items, flavors))
    }
}

#[cfg(test)]
mod spec {
    use crate::{fixture, query, Query as _};

    #[tokio::test]
    async fn lists_items_of_all_trucks() {
        let svc = fixture::service();
        assert!(svc
            .execute(query::food_items::Listings)
            .await
            .unwrap()
            .is_empty());

        let (_, first) = fixture::truck_with_item(&svc, "5.00", 10).await;
        let (_, second) = fixture::truck_with_item(&svc, "2.00", 3).await;

        let listings = svc.execute(query::food_items::Listings).await.unwrap();

        assert_eq!(listings.len(), 2);
        for id in [first.id, second.id] {
            let listing =
                listings.iter().find(|l| l.item.id == id).unwrap();
            assert_eq!(listing.flavors.len(), 1);
        }
    }
}
