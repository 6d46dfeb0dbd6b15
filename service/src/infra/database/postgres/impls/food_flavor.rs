//! [`FoodFlavor`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{food_item, FoodFlavor},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<FoodFlavor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<FoodFlavor>, Vec<food_item::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let item_ids = by.into_inner();
        if item_ids.is_empty() {
            return Ok(vec![]);
        }

        const SQL: &str = "\
            SELECT id, food_item_id, name \
            FROM food_flavors \
            WHERE food_item_id = ANY($1::UUID[]) \
            ORDER BY name, id";
        Ok(self
            .query(SQL, &[&item_ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| FoodFlavor {
                id: row.get("id"),
                food_item_id: row.get("food_item_id"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl<C> Database<Insert<FoodFlavor>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(flavor): Insert<FoodFlavor>,
    ) -> Result<Self::Ok, Self::Err> {
        let FoodFlavor {
            id,
            food_item_id,
            name,
        } = flavor;

        const SQL: &str = "\
            INSERT INTO food_flavors (id, food_item_id, name) \
            VALUES ($1::UUID, $2::UUID, $3::INT2)";
        self.exec(SQL, &[&id, &food_item_id, &name])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
