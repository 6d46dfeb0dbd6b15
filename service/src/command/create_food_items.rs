//! [`Command`] for creating new [`FoodItem`]s.

use common::{
    operations::{By, Commit, Insert, Lock, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{food_flavor, food_item, truck, FoodFlavor, FoodItem, Truck},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating new [`FoodItem`]s of a [`Truck`].
///
/// Either all the [`FoodItem`]s are created, or none of them.
#[derive(Clone, Debug)]
pub struct CreateFoodItems {
    /// ID of the [`Truck`] to create [`FoodItem`]s for.
    pub truck_id: truck::Id,

    /// Descriptions of new [`FoodItem`]s.
    pub items: Vec<NewFoodItem>,
}

/// Description of a new [`FoodItem`].
#[derive(Clone, Debug)]
pub struct NewFoodItem {
    /// [`food_item::Name`] of a new [`FoodItem`].
    pub name: food_item::Name,

    /// [`food_item::Price`] of a new [`FoodItem`].
    pub price: food_item::Price,

    /// Initial [`food_item::Stock`] of a new [`FoodItem`].
    pub quantity: food_item::Stock,

    /// [`food_item::ItemType`] of a new [`FoodItem`].
    pub item_type: food_item::ItemType,

    /// Name of the [`FoodFlavor`] a new [`FoodItem`] is offered in.
    pub flavor: food_flavor::Name,

    /// [`food_item::Image`] of a new [`FoodItem`], if any.
    pub image: Option<food_item::Image>,
}

impl<Db> Command<CreateFoodItems> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Option<Truck>, truck::Id>>,
            Ok = Option<Truck>,
            Err = Traced<database::Error>,
        > + Database<Insert<FoodItem>, Err = Traced<database::Error>>
        + Database<Insert<FoodFlavor>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vec<read::Listing>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateFoodItems,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFoodItems { truck_id, items } = cmd;

        if items.is_empty() {
            return Err(tracerr::new!(E::NoItems));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let truck = tx
            .execute(Lock(By::<Option<Truck>, _>::new(truck_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TruckNotExists(truck_id))
            .map_err(tracerr::wrap!())?;

        let created_at = DateTime::now();
        let mut listings = Vec::with_capacity(items.len());
        for new in items {
            let NewFoodItem {
                name,
                price,
                quantity,
                item_type,
                flavor,
                image,
            } = new;

            let item = FoodItem {
                id: food_item::Id::new(),
                truck_id: truck.id,
                name,
                price,
                quantity,
                item_type,
                image,
                created_at: created_at.coerce(),
            };
            tx.execute(Insert(item.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let flavor = FoodFlavor {
                id: food_flavor::Id::new(),
                food_item_id: item.id,
                name: flavor,
            };
            tx.execute(Insert(flavor))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            listings.push(read::Listing {
                item,
                flavors: vec![flavor],
            });
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listings)
    }
}

/// Error of [`CreateFoodItems`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No [`FoodItem`]s to create provided.
    #[display("No `FoodItem`s to create provided")]
    NoItems,

    /// [`Truck`] with the provided ID does not exist.
    #[display("`Truck(id: {_0})` does not exist")]
    #[from(ignore)]
    TruckNotExists(#[error(not(source))] truck::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreateFoodItems,
        domain::{food_flavor, food_item, truck},
        fixture, query, Command as _, Query as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn creates_items_with_flavors() {
        let svc = fixture::service();
        let truck = fixture::truck(&svc, "Test Truck").await;
        let mut bar = fixture::new_item("1.50", 3);
        bar.item_type = food_item::ItemType::SnackBar;
        bar.flavor = food_flavor::Name::Mint;

        let listings = svc
            .execute(CreateFoodItems {
                truck_id: truck.id,
                items: vec![fixture::new_item("5", 10), bar],
            })
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].item.price.to_string(), "5.00");
        assert_eq!(listings[0].flavors[0].name, food_flavor::Name::Chocolate);
        assert_eq!(listings[1].item.item_type, food_item::ItemType::SnackBar);

        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.items.len(), 2);
        let stored = inventory.item(listings[1].item.id).unwrap();
        assert_eq!(stored.item.quantity, food_item::Stock::new(3).unwrap());
        assert_eq!(stored.flavors.len(), 1);
        assert_eq!(stored.flavors[0].name, food_flavor::Name::Mint);
    }

    #[tokio::test]
    async fn fails_on_missing_truck() {
        let svc = fixture::service();
        let id = truck::Id::new();

        let err = svc
            .execute(CreateFoodItems {
                truck_id: id,
                items: vec![fixture::new_item("5.00", 10)],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TruckNotExists(missing) if *missing == id,
        ));
        let all = svc.execute(query::food_items::Listings).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn fails_without_items() {
        let svc = fixture::service();
        let truck = fixture::truck(&svc, "Test Truck").await;

        let err = svc
            .execute(CreateFoodItems {
                truck_id: truck.id,
                items: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoItems));
    }
}
