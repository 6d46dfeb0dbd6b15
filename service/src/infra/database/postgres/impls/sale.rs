//! [`Sale`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{truck, Sale},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Sale>, Vec<truck::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, Vec<truck::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let truck_ids = by.into_inner();
        if truck_ids.is_empty() {
            return Ok(vec![]);
        }

        const SQL: &str = "\
            SELECT id, food_item_id, truck_id, user_id, \
                   quantity, purchased_at \
            FROM sales \
            WHERE truck_id = ANY($1::UUID[]) \
            ORDER BY purchased_at, id";
        Ok(self
            .query(SQL, &[&truck_ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Sale {
                id: row.get("id"),
                food_item_id: row.get("food_item_id"),
                truck_id: row.get("truck_id"),
                user_id: row.get("user_id"),
                quantity: row
                    .get::<_, i32>("quantity")
                    .try_into()
                    .expect("`CHECK (quantity > 0)` constraint"),
                purchased_at: row.get("purchased_at"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            food_item_id,
            truck_id,
            user_id,
            quantity,
            purchased_at,
        } = sale;
        let quantity = i32::from(quantity);

        const SQL: &str = "\
            INSERT INTO sales (\
                id, food_item_id, truck_id, user_id, \
                quantity, purchased_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::INT4, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &food_item_id,
                &truck_id,
                &user_id,
                &quantity,
                &purchased_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
