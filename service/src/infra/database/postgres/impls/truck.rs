//! [`Truck`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{truck, Truck},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`Truck`] out of the provided [`Row`].
fn from_row(row: &Row) -> Truck {
    Truck {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Truck>, truck::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM trucks \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Truck>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Truck>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM trucks \
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

impl<C> Database<Insert<Truck>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(truck): Insert<Truck>,
    ) -> Result<Self::Ok, Self::Err> {
        let Truck {
            id,
            name,
            created_at,
        } = truck;

        const SQL: &str = "\
            INSERT INTO trucks (id, name, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ)";
        self.exec(SQL, &[&id, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Option<Truck>, truck::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Keeps the `Truck` from being deleted until the transaction ends.
        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM trucks \
            WHERE id = $1::UUID \
            FOR SHARE";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Delete<By<Option<Truck>, truck::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Truck>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Truck>, truck::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // `food_items`, `food_flavors` and `sales` go by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM trucks \
            WHERE id = $1::UUID \
            RETURNING id, name, created_at";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}
