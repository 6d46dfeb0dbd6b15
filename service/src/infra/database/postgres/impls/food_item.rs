//! [`FoodItem`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{food_item, truck, FoodItem},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`FoodItem`] out of the provided [`Row`].
fn from_row(row: &Row) -> FoodItem {
    FoodItem {
        id: row.get("id"),
        truck_id: row.get("truck_id"),
        name: row.get("name"),
        price: row.get("price"),
        quantity: row
            .get::<_, i32>("quantity")
            .try_into()
            .expect("`CHECK (quantity >= 0)` constraint"),
        item_type: row.get("item_type"),
        image: row.get("image"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<FoodItem>, food_item::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<FoodItem>, food_item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, truck_id, name, \
                   price, quantity, \
                   item_type, image, \
                   created_at \
            FROM food_items \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<FoodItem>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<FoodItem>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, truck_id, name, \
                   price, quantity, \
                   item_type, image, \
                   created_at \
            FROM food_items \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<FoodItem>, Vec<truck::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<FoodItem>, Vec<truck::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let truck_ids = by.into_inner();
        if truck_ids.is_empty() {
            return Ok(vec![]);
        }

        const SQL: &str = "\
            SELECT id, truck_id, name, \
                   price, quantity, \
                   item_type, image, \
                   created_at \
            FROM food_items \
            WHERE truck_id = ANY($1::UUID[]) \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&truck_ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<FoodItem>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<FoodItem>,
    ) -> Result<Self::Ok, Self::Err> {
        let FoodItem {
            id,
            truck_id,
            name,
            price,
            quantity,
            item_type,
            image,
            created_at,
        } = item;
        let quantity = i32::from(quantity);

        const SQL: &str = "\
            INSERT INTO food_items (\
                id, truck_id, name, \
                price, quantity, \
                item_type, image, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, \
                $4::NUMERIC, $5::INT4, \
                $6::INT2, $7::VARCHAR, \
                $8::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &truck_id,
                &name,
                &price,
                &quantity,
                &item_type,
                &image,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<FoodItem>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<FoodItem>,
    ) -> Result<Self::Ok, Self::Err> {
        let FoodItem {
            id,
            name,
            price,
            quantity,
            item_type,
            image,
            ..
        } = item;
        let quantity = i32::from(quantity);

        const SQL: &str = "\
            UPDATE food_items \
            SET name = $2::VARCHAR, \
                price = $3::NUMERIC, \
                quantity = $4::INT4, \
                item_type = $5::INT2, \
                image = $6::VARCHAR \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[&id, &name, &price, &quantity, &item_type, &image],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Option<FoodItem>, food_item::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<FoodItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Option<FoodItem>, food_item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, truck_id, name, \
                   price, quantity, \
                   item_type, image, \
                   created_at \
            FROM food_items \
            WHERE id = $1::UUID \
            FOR UPDATE";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}
