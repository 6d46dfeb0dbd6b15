//! [`Command`] for creating a new [`Truck`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{truck, Truck},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Truck`].
#[derive(Clone, Debug)]
pub struct CreateTruck {
    /// [`truck::Name`] of a new [`Truck`].
    pub name: truck::Name,
}

impl<Db> Command<CreateTruck> for Service<Db>
where
    Db: Database<Insert<Truck>, Err = Traced<database::Error>>,
{
    type Ok = Truck;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateTruck) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTruck { name } = cmd;

        let truck = Truck {
            id: truck::Id::new(),
            name,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(truck.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(truck)
    }
}

/// Error of [`CreateTruck`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, query, Query as _};

    #[tokio::test]
    async fn creates_truck() {
        let svc = fixture::service();

        let truck = fixture::truck(&svc, "Test Truck").await;

        assert_eq!(truck.name.to_string(), "Test Truck");
        let stored = svc
            .execute(query::truck::ById::by(truck.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, truck.id);
        assert_eq!(stored.name, truck.name);

        let all = svc
            .execute(query::trucks::All::by(()))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}
