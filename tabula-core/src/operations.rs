use crate::{
    AsValue, Driver, Entity, Error, Executor, QueryResult, Result, RowsAffected, Statement,
    Value, builder,
    stream::{StreamExt, TryStreamExt},
};
use futures::executor::block_on;
use std::{future::Future, pin::pin};

fn logged<T>(result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        log::error!("{:#}", error);
    }
    result
}

/// Run the whole batch, returning the aggregated modify results and the first
/// value of the last row produced.
async fn run_batch<X: Executor>(
    executor: &mut X,
    statement: Statement,
) -> Result<(RowsAffected, Option<Value>)> {
    log::debug!("{}", statement);
    let mut affected = RowsAffected::default();
    let mut last = None;
    let mut stream = pin!(executor.run(statement));
    while let Some(item) = stream.try_next().await? {
        match item {
            QueryResult::Row(row) => last = row.values.into_vec().into_iter().next(),
            QueryResult::Affected(v) => affected.extend([v]),
        }
    }
    Ok((affected, last))
}

async fn execute<X: Executor>(executor: &mut X, statement: Statement) -> Result<RowsAffected> {
    log::debug!("{}", statement);
    executor.execute(statement).await
}

/// CRUD operations on any [`Entity`], available on every [`Executor`].
///
/// Statements are rendered before the returned future is polled, so a mapping
/// error never reaches the database.
pub trait EntityOperations: Executor {
    /// Number of rows in the table of `T`.
    fn count<T: Entity>(&mut self) -> impl Future<Output = Result<u64>> + Send {
        let statement = Statement::from(builder::count(T::descriptor()));
        async move {
            logged(async {
                let (_, value) = run_batch(self, statement).await?;
                match value {
                    Some(value) => u64::try_from_value(value),
                    None => Err(Error::msg("The count query did not return any row")),
                }
            }
            .await)
        }
    }

    /// The row of `T` whose key equals `id`, restricted to `columns` when not empty.
    fn fetch<T: Entity>(
        &mut self,
        id: impl AsValue,
        columns: &[&str],
    ) -> impl Future<Output = Result<Option<T>>> + Send {
        let statement = builder::fetch(T::descriptor(), id, columns);
        async move {
            logged(async {
                let statement = statement?;
                log::debug!("{}", statement);
                let mut stream = pin!(self.fetch_rows(statement));
                stream.try_next().await?.map(T::from_row).transpose()
            }
            .await)
        }
    }

    /// Every row of `T`, restricted to `columns` when not empty.
    fn fetch_all<T: Entity>(
        &mut self,
        columns: &[&str],
    ) -> impl Future<Output = Result<Vec<T>>> + Send {
        let statement = Statement::from(builder::fetch_all(T::descriptor(), columns));
        async move {
            log::debug!("{}", statement);
            logged(
                self.fetch_rows(statement)
                    .map(|row| row.and_then(T::from_row))
                    .try_collect()
                    .await,
            )
        }
    }

    /// Insert `entity`. When its key is generated by the database, the new key
    /// is read back and written onto the entity.
    ///
    /// A type without key is inserted as it is, one marking more than one key
    /// fails before reaching the database.
    fn insert<T: Entity>(&mut self, entity: &mut T) -> impl Future<Output = Result<RowsAffected>> + Send {
        let statement = match T::descriptor().key() {
            Ok(key) if key.is_generated => {
                builder::insert_returning_id(&*entity, self.driver().dialect())
                    .map(|v| (v, Some(key)))
            }
            _ => builder::insert(&*entity).map(|v| (v, None)),
        };
        async move {
            logged(async {
                let (statement, key) = statement?;
                let (affected, id) = run_batch(self, statement).await?;
                if let Some(key) = key {
                    let id = id.ok_or_else(|| {
                        Error::msg(format!(
                            "The insert of `{}` did not return the generated key",
                            T::descriptor().entity_name()
                        ))
                    })?;
                    entity.set_field_value(key.name, id)?;
                }
                Ok(affected)
            }
            .await)
        }
    }

    /// Update the row of `entity`, only the given `columns` when not empty.
    fn update<T: Entity>(
        &mut self,
        entity: &T,
        columns: &[&str],
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let statement = builder::update(entity, columns);
        async move { logged(async { execute(self, statement?).await }.await) }
    }

    /// Delete the row of `entity`, identified by its key.
    fn delete<T: Entity>(&mut self, entity: &T) -> impl Future<Output = Result<RowsAffected>> + Send {
        let statement = builder::delete_entity(entity);
        async move { logged(async { execute(self, statement?).await }.await) }
    }

    /// Delete the row of `T` whose key equals `id`.
    fn delete_by_id<T: Entity>(
        &mut self,
        id: impl AsValue,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        let statement = builder::delete(T::descriptor(), id);
        async move { logged(async { execute(self, statement?).await }.await) }
    }

    /// Delete every row of `T`.
    fn delete_all<T: Entity>(&mut self) -> impl Future<Output = Result<RowsAffected>> + Send {
        let statement = Statement::from(builder::delete_all(T::descriptor()));
        async move { logged(execute(self, statement).await) }
    }

    /// Empty the table of `T` with the statement of the active dialect.
    fn truncate<T: Entity>(&mut self) -> impl Future<Output = Result<()>> + Send {
        let statement = Statement::from(builder::truncate(
            T::descriptor(),
            self.driver().dialect(),
        ));
        async move { logged(execute(self, statement).await.map(|_| ())) }
    }

}

impl<X: Executor> EntityOperations for X {}

/// Blocking forms of [`EntityOperations`].
///
/// Each call drives the non blocking operation to completion on the current
/// thread, it must not be used from inside an async runtime.
pub trait EntityOperationsBlocking: EntityOperations {
    fn count_blocking<T: Entity>(&mut self) -> Result<u64> {
        block_on(self.count::<T>())
    }

    fn fetch_blocking<T: Entity>(&mut self, id: impl AsValue, columns: &[&str]) -> Result<Option<T>> {
        block_on(self.fetch::<T>(id, columns))
    }

    fn fetch_all_blocking<T: Entity>(&mut self, columns: &[&str]) -> Result<Vec<T>> {
        block_on(self.fetch_all::<T>(columns))
    }

    fn insert_blocking<T: Entity>(&mut self, entity: &mut T) -> Result<RowsAffected> {
        block_on(self.insert(entity))
    }

    fn update_blocking<T: Entity>(&mut self, entity: &T, columns: &[&str]) -> Result<RowsAffected> {
        block_on(self.update(entity, columns))
    }

    fn delete_blocking<T: Entity>(&mut self, entity: &T) -> Result<RowsAffected> {
        block_on(self.delete(entity))
    }

    fn delete_by_id_blocking<T: Entity>(&mut self, id: impl AsValue) -> Result<RowsAffected> {
        block_on(self.delete_by_id::<T>(id))
    }

    fn delete_all_blocking<T: Entity>(&mut self) -> Result<RowsAffected> {
        block_on(self.delete_all::<T>())
    }

    fn truncate_blocking<T: Entity>(&mut self) -> Result<()> {
        block_on(self.truncate::<T>())
    }
}

impl<X: EntityOperations> EntityOperationsBlocking for X {}
