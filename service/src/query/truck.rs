//! [`Query`] collection related to a single [`Truck`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{truck, Sale, Truck},
    infra::{database, Database},
    query::trucks::InventoriesOf,
    read, Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Truck`] by its [`truck::Id`].
pub type ById = DatabaseQuery<By<Option<Truck>, truck::Id>>;

/// [`Query`] of a [`read::Inventory`] of the [`Truck`] with the provided ID.
#[derive(Clone, Copy, Debug)]
pub struct Inventory(pub truck::Id);

impl<Db> Query<Inventory> for Service<Db>
where
    Db: Database<
        Select<By<Option<Truck>, truck::Id>>,
        Ok = Option<Truck>,
        Err = Traced<database::Error>,
    >,
    Self: Query<
        InventoriesOf,
        Ok = Vec<read::Inventory>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<read::Inventory>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Inventory(id): Inventory,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(truck) = self
            .database()
            .execute(Select(By::<Option<Truck>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        Ok(self
            .execute(InventoriesOf(vec![truck]))
            .await
            .map_err(tracerr::wrap!())?
            .pop())
    }
}

/// [`Query`] of all the [`Sale`]s of the [`Truck`] with the provided ID.
///
/// [`None`] is returned if the [`Truck`] doesn't exist.
#[derive(Clone, Copy, Debug)]
pub struct Sales(pub truck::Id);

impl<Db> Query<Sales> for Service<Db>
where
    Db: Database<
            Select<By<Option<Truck>, truck::Id>>,
            Ok = Option<Truck>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, Vec<truck::Id>>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Vec<Sale>>;
    type Err = Traced<database::Error>;

    async fn execute(&self, Sales(id): Sales) -> Result<Self::Ok, Self::Err> {
        let truck = self
            .database()
            .execute(Select(By::<Option<Truck>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?;
        if truck.is_none() {
            return Ok(None);
        }

        self.database()
            .execute(Select(By::<Vec<Sale>, _>::new(vec![id])))
            .await
            .map(Some)
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{CreateFoodItems, Purchase},
        domain::{sale, truck, FoodItem},
        fixture,
        infra::Memory,
        query, Command as _, Query as _, Service,
    };

    async fn buy(svc: &Service<Memory>, item: &FoodItem, quantity: u32) {
        drop(
            svc.execute(Purchase {
                food_item_id: item.id,
                quantity: sale::Quantity::new(quantity).unwrap(),
                user_id: None,
            })
            .await
            .unwrap(),
        );
    }

    #[tokio::test]
    async fn total_sales_follow_purchases() {
        let svc = fixture::service();
        let (truck, item) = fixture::truck_with_item(&svc, "5.00", 10).await;

        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.total_sales.to_string(), "0.00");

        buy(&svc, &item, 2).await;
        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.truck.name.to_string(), "Test Truck");
        assert_eq!(
            u32::from(inventory.item(item.id).unwrap().item.quantity),
            8,
        );
        assert_eq!(inventory.total_sales.to_string(), "10.00");

        buy(&svc, &item, 1).await;
        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.total_sales.to_string(), "15.00");
    }

    #[tokio::test]
    async fn total_sales_span_all_items() {
        let svc = fixture::service();
        let (truck, cone) = fixture::truck_with_item(&svc, "5.00", 10).await;
        let bar = svc
            .execute(CreateFoodItems {
                truck_id: truck.id,
                items: vec![fixture::new_item("1.25", 10)],
            })
            .await
            .unwrap()
            .remove(0)
            .item;

        buy(&svc, &cone, 1).await;
        buy(&svc, &bar, 4).await;

        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.items.len(), 2);
        assert_eq!(inventory.total_sales.to_string(), "10.00");

        let sales = svc
            .execute(query::truck::Sales(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sales.len(), 2);
    }

    #[tokio::test]
    async fn missing_truck_is_none() {
        let svc = fixture::service();
        let id = truck::Id::new();

        assert!(svc
            .execute(query::truck::ById::by(id))
            .await
            .unwrap()
            .is_none());
        assert!(svc
            .execute(query::truck::Inventory(id))
            .await
            .unwrap()
            .is_none());
        assert!(svc.execute(query::truck::Sales(id)).await.unwrap().is_none());
    }
}
