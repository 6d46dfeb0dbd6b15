//! [`Command`] for purchasing a [`FoodItem`].

use common::{
    operations::{By, Commit, Insert, Lock, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Truck, User};
use crate::{
    domain::{food_item, sale, user, FoodItem, Sale},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for purchasing a [`FoodItem`], decrementing its stock and
/// recording a [`Sale`].
#[derive(Clone, Copy, Debug)]
pub struct Purchase {
    /// ID of the [`FoodItem`] to purchase.
    pub food_item_id: food_item::Id,

    /// [`sale::Quantity`] to purchase.
    pub quantity: sale::Quantity,

    /// ID of the purchasing [`User`], if authenticated.
    pub user_id: Option<user::Id>,
}

impl<Db> Command<Purchase> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Option<FoodItem>, food_item::Id>>,
            Ok = Option<FoodItem>,
            Err = Traced<database::Error>,
        > + Database<Update<FoodItem>, Err = Traced<database::Error>>
        + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Purchase) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Purchase {
            food_item_id,
            quantity,
            user_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent purchases of the same `FoodItem`.
        let mut item = tx
            .execute(Lock(By::<Option<FoodItem>, _>::new(food_item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FoodItemNotExists(food_item_id))
            .map_err(tracerr::wrap!())?;

        item.quantity = item
            .quantity
            .take(quantity)
            .ok_or(E::InsufficientStock {
                available: item.quantity,
                requested: quantity,
            })
            .map_err(tracerr::wrap!())?;
        let truck_id = item.truck_id;
        tx.execute(Update(item))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let sale = Sale {
            id: sale::Id::new(),
            food_item_id,
            truck_id,
            user_id,
            quantity,
            purchased_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(sale))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(sale)
    }
}

/// Error of [`Purchase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`FoodItem`] with the provided ID does not exist.
    #[display("`FoodItem(id: {_0})` does not exist")]
    #[from(ignore)]
    FoodItemNotExists(#[error(not(source))] food_item::Id),

    /// [`FoodItem`] stock doesn't cover the requested [`sale::Quantity`].
    #[display("Requested {requested} units, but only {available} available")]
    #[from(ignore)]
    InsufficientStock {
        /// Remaining [`food_item::Stock`].
        available: food_item::Stock,

        /// Requested [`sale::Quantity`].
        requested: sale::Quantity,
    },
}

#[cfg(test)]
mod spec {
    use futures::future;

    use crate::{
        command::{CreateUser, Purchase},
        domain::{food_item, sale, user, FoodItem},
        fixture,
        infra::Memory,
        query, Command as _, Query as _, Service,
    };

    use super::ExecutionError;

    async fn stock(svc: &Service<Memory>, item: &FoodItem) -> u32 {
        svc.execute(query::food_item::Listing(item.id))
            .await
            .unwrap()
            .unwrap()
            .item
            .quantity
            .into()
    }

    fn purchase(item: &FoodItem, quantity: u32) -> Purchase {
        Purchase {
            food_item_id: item.id,
            quantity: sale::Quantity::new(quantity).unwrap(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn decrements_stock_and_records_sale() {
        let svc = fixture::service();
        let (truck, item) = fixture::truck_with_item(&svc, "5.00", 10).await;

        let sale = svc.execute(purchase(&item, 2)).await.unwrap();

        assert_eq!(sale.food_item_id, item.id);
        assert_eq!(sale.truck_id, truck.id);
        assert_eq!(u32::from(sale.quantity), 2);
        assert!(sale.user_id.is_none());
        assert_eq!(stock(&svc, &item).await, 8);

        let sales = svc
            .execute(query::truck::Sales(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, sale.id);
    }

    #[tokio::test]
    async fn sells_out_exact_stock() {
        let svc = fixture::service();
        let (_, item) = fixture::truck_with_item(&svc, "5.00", 10).await;

        drop(svc.execute(purchase(&item, 10)).await.unwrap());

        assert_eq!(stock(&svc, &item).await, 0);
        let listing = svc
            .execute(query::food_item::Listing(item.id))
            .await
            .unwrap()
            .unwrap();
        assert!(!listing.item.in_stock());
    }

    #[tokio::test]
    async fn rejects_exceeding_stock() {
        let svc = fixture::service();
        let (truck, item) = fixture::truck_with_item(&svc, "5.00", 10).await;

        let err = svc.execute(purchase(&item, 11)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InsufficientStock { available, requested }
                if *available == food_item::Stock::new(10).unwrap()
                    && u32::from(*requested) == 11,
        ));
        assert_eq!(stock(&svc, &item).await, 10);
        let sales = svc
            .execute(query::truck::Sales(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn fails_on_missing_item() {
        let svc = fixture::service();
        let id = food_item::Id::new();

        let err = svc
            .execute(Purchase {
                food_item_id: id,
                quantity: sale::Quantity::new(1).unwrap(),
                user_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::FoodItemNotExists(missing) if *missing == id,
        ));
    }

    #[tokio::test]
    async fn records_purchasing_user() {
        let svc = fixture::service();
        let (truck, item) = fixture::truck_with_item(&svc, "5.00", 10).await;
        let customer = svc
            .execute(CreateUser {
                username: user::Username::new("testuser").unwrap(),
                email: None,
            })
            .await
            .unwrap();

        let sale = svc
            .execute(Purchase {
                user_id: Some(customer.id),
                ..purchase(&item, 1)
            })
            .await
            .unwrap();

        assert_eq!(sale.user_id, Some(customer.id));
        let sales = svc
            .execute(query::truck::Sales(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sales[0].user_id, Some(customer.id));
    }

    #[tokio::test]
    async fn never_oversells_concurrently() {
        let svc = fixture::service();
        let (truck, item) = fixture::truck_with_item(&svc, "5.00", 10).await;

        let results = future::join_all(
            (0..8).map(|_| svc.execute(purchase(&item, 3))),
        )
        .await;

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 3);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                err.as_ref(),
                ExecutionError::InsufficientStock { .. },
            ));
        }
        assert_eq!(stock(&svc, &item).await, 1);

        let inventory = svc
            .execute(query::truck::Inventory(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inventory.total_sales.to_string(), "45.00");
    }
}
