//! [`Database`] implementations.

use std::convert;

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{food_item, truck, user, FoodFlavor, FoodItem, Sale, Truck, User},
    infra::{database, Database},
};

use super::{Error, Memory, NonTx, State, Storage, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await;
        Ok(())
    }
}

/// Returns clones of the provided records, ordered by the provided key.
fn sorted<'r, T, K>(
    records: impl IntoIterator<Item = &'r T>,
    key: impl Fn(&T) -> K,
) -> Vec<T>
where
    T: Clone + 'r,
    K: Ord,
{
    let mut records = records.into_iter().cloned().collect::<Vec<_>>();
    records.sort_by_key(key);
    records
}

impl<C> Database<Select<By<Option<Truck>, truck::Id>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.trucks.get(&id).cloned())
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Select<By<Vec<Truck>, ()>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Vec<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Truck>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self
            .with_state(|s| sorted(s.trucks.values(), |t| (t.created_at, t.id)))
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Insert<Truck>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(truck): Insert<Truck>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            if s.trucks.contains_key(&truck.id) {
                return Err(Error::UniqueViolation("trucks_pkey"));
            }
            drop(s.trucks.insert(truck.id, truck));
            Ok(())
        })
        .await
        .and_then(convert::identity)
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Lock<By<Option<Truck>, truck::Id>>> for Memory<C>
where
    C: Storage,
    Self: Database<
        Select<By<Option<Truck>, truck::Id>>,
        Ok = Option<Truck>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions lock the whole `State` already.
        self.execute(Select(by)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Option<Truck>, truck::Id>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.delete_truck(id))
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Select<By<Option<FoodItem>, food_item::Id>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Option<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<FoodItem>, food_item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.food_items.get(&id).cloned())
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Select<By<Vec<FoodItem>, ()>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Vec<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<FoodItem>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self
            .with_state(|s| {
                sorted(s.food_items.values(), |i| (i.created_at, i.id))
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Select<By<Vec<FoodItem>, Vec<truck::Id>>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Vec<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<FoodItem>, Vec<truck::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let truck_ids = by.into_inner();
        self
            .with_state(|s| {
                sorted(
                    s.food_items
                        .values()
                        .filter(|i| truck_ids.contains(&i.truck_id)),
                    |i| (i.created_at, i.id),
                )
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Insert<FoodItem>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<FoodItem>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            if !s.trucks.contains_key(&item.truck_id) {
                return Err(Error::ForeignKeyViolation(
                    "food_items_truck_id_fkey",
                ));
            }
            if s.food_items.contains_key(&item.id) {
                return Err(Error::UniqueViolation("food_items_pkey"));
            }
            drop(s.food_items.insert(item.id, item));
            Ok(())
        })
        .await
        .and_then(convert::identity)
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Update<FoodItem>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<FoodItem>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            if let Some(stored) = s.food_items.get_mut(&item.id) {
                // Ownership and creation time are immutable.
                *stored = FoodItem {
                    truck_id: stored.truck_id,
                    created_at: stored.created_at,
                    ..item
                };
            }
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Lock<By<Option<FoodItem>, food_item::Id>>> for Memory<C>
where
    C: Storage,
    Self: Database<
        Select<By<Option<FoodItem>, food_item::Id>>,
        Ok = Option<FoodItem>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Option<FoodItem>, food_item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions lock the whole `State` already.
        self.execute(Select(by)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>>
    for Memory<C>
where
    C: Storage,
{
    type Ok = Vec<FoodFlavor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let item_ids = by.into_inner();
        self
            .with_state(|s| {
                sorted(
                    s.food_flavors
                        .values()
                        .filter(|f| item_ids.contains(&f.food_item_id)),
                    |f| (f.name.u8(), f.id),
                )
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Insert<FoodFlavor>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(flavor): Insert<FoodFlavor>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            if !s.food_items.contains_key(&flavor.food_item_id) {
                return Err(Error::ForeignKeyViolation(
                    "food_flavors_food_item_id_fkey",
                ));
            }
            if s.food_flavors.contains_key(&flavor.id) {
                return Err(Error::UniqueViolation("food_flavors_pkey"));
            }
            drop(s.food_flavors.insert(flavor.id, flavor));
            Ok(())
        })
        .await
        .and_then(convert::identity)
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Select<By<Vec<Sale>, Vec<truck::Id>>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, Vec<truck::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let truck_ids = by.into_inner();
        self
            .with_state(|s| {
                sorted(
                    s.sales.values().filter(|s| truck_ids.contains(&s.truck_id)),
                    |s| (s.purchased_at, s.id),
                )
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Insert<Sale>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            check_sale_references(s, &sale)?;
            if s.sales.contains_key(&sale.id) {
                return Err(Error::UniqueViolation("sales_pkey"));
            }
            drop(s.sales.insert(sale.id, sale));
            Ok(())
        })
        .await
        .and_then(convert::identity)
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// Checks that everything the provided [`Sale`] references exists.
fn check_sale_references(state: &State, sale: &Sale) -> Result<(), Error> {
    if !state.food_items.contains_key(&sale.food_item_id) {
        return Err(Error::ForeignKeyViolation("sales_food_item_id_fkey"));
    }
    if !state.trucks.contains_key(&sale.truck_id) {
        return Err(Error::ForeignKeyViolation("sales_truck_id_fkey"));
    }
    if sale.user_id.is_some_and(|id| !state.users.contains_key(&id)) {
        return Err(Error::ForeignKeyViolation("sales_user_id_fkey"));
    }
    Ok(())
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Memory<C>
where
    C: Storage,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.users.get(&id).cloned())
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Username>>>
    for Memory<C>
where
    C: Storage,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        self
            .with_state(|s| {
                s.users.values().find(|u| &u.username == username).cloned()
            })
            .await
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Insert<User>> for Memory<C>
where
    C: Storage,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            if s.users.contains_key(&user.id) {
                return Err(Error::UniqueViolation("users_pkey"));
            }
            if s.users.values().any(|u| u.username == user.username) {
                return Err(Error::UniqueViolation(
                    database::USERNAME_CONSTRAINT,
                ));
            }
            drop(s.users.insert(user.id, user));
            Ok(())
        })
        .await
        .and_then(convert::identity)
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Delete, Insert, Select, Transact},
        DateTime,
    };

    use crate::{
        domain::{
            food_flavor, food_item, sale, truck, FoodFlavor, FoodItem, Sale,
            Truck,
        },
        infra::{database, Database as _, Memory},
    };

    fn truck() -> Truck {
        Truck {
            id: truck::Id::new(),
            name: truck::Name::new("Test Truck").unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    fn item(truck: &Truck) -> FoodItem {
        FoodItem {
            id: food_item::Id::new(),
            truck_id: truck.id,
            name: food_item::Name::new("Ice Cream").unwrap(),
            price: "5.00".parse().unwrap(),
            quantity: food_item::Stock::new(10).unwrap(),
            item_type: food_item::ItemType::IceCream,
            image: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn rejects_dangling_references() {
        let db = Memory::new();
        let truck = truck();

        let err = db.execute(Insert(item(&truck))).await.unwrap_err();

        let err: &database::Error = err.as_ref();
        assert!(err.to_string().contains("food_items_truck_id_fkey"));
        assert!(!err.is_unique_violation(None));
    }

    #[tokio::test]
    async fn discards_uncommitted_transaction() {
        let db = Memory::new();
        let truck = truck();

        {
            let tx = db.execute(Transact).await.unwrap();
            tx.execute(Insert(truck.clone())).await.unwrap();
            let seen = tx
                .execute(Select(By::<Option<Truck>, _>::new(truck.id)))
                .await
                .unwrap();
            assert!(seen.is_some());
        }

        let stored = db
            .execute(Select(By::<Option<Truck>, _>::new(truck.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn applies_committed_transaction() {
        let db = Memory::new();
        let truck = truck();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(truck.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<Truck>, _>::new(truck.id)))
            .await
            .unwrap();
        assert_eq!(stored.map(|t| t.name), Some(truck.name));
    }

    #[tokio::test]
    async fn rejects_use_after_commit() {
        let db = Memory::new();
        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let err = tx.execute(Insert(truck())).await.unwrap_err();

        let err: &database::Error = err.as_ref();
        assert!(err.to_string().contains("already closed"));
        tx.execute(Commit).await.unwrap();
    }

    #[tokio::test]
    async fn cascades_truck_deletion() {
        let db = Memory::new();
        let (kept, deleted) = (truck(), truck());
        db.execute(Insert(kept.clone())).await.unwrap();
        db.execute(Insert(deleted.clone())).await.unwrap();

        let (kept_item, deleted_item) = (item(&kept), item(&deleted));
        for i in [&kept_item, &deleted_item] {
            db.execute(Insert(i.clone())).await.unwrap();
            db.execute(Insert(FoodFlavor {
                id: food_flavor::Id::new(),
                food_item_id: i.id,
                name: food_flavor::Name::Mint,
            }))
            .await
            .unwrap();
            db.execute(Insert(Sale {
                id: sale::Id::new(),
                food_item_id: i.id,
                truck_id: i.truck_id,
                user_id: None,
                quantity: sale::Quantity::new(1).unwrap(),
                purchased_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap();
        }

        let removed = db
            .execute(Delete(By::<Option<Truck>, _>::new(deleted.id)))
            .await
            .unwrap();
        assert_eq!(removed.map(|t| t.id), Some(deleted.id));

        let items = db
            .execute(Select(By::<Vec<FoodItem>, ()>::new(())))
            .await
            .unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), [
            kept_item.id
        ]);
        let flavors = db
            .execute(Select(By::<Vec<FoodFlavor>, _>::new(vec![
                kept_item.id,
                deleted_item.id,
            ])))
            .await
            .unwrap();
        assert_eq!(flavors.len(), 1);
        assert_eq!(flavors[0].food_item_id, kept_item.id);
        let sales = db
            .execute(Select(By::<Vec<Sale>, _>::new(vec![kept.id, deleted.id])))
            .await
            .unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].truck_id, kept.id);

        let again = db
            .execute(Delete(By::<Option<Truck>, _>::new(deleted.id)))
            .await
            .unwrap();
        assert!(again.is_none());
    }
}
