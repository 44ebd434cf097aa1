use crate::{
    CBox, SqliteDriver, bind::bind_parameters, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_changes64, sqlite3_close, sqlite3_column_count,
    sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt, sqlite3_stmt_readonly,
};
use std::{
    ffi::{CString, c_char, c_int},
    ptr,
    sync::Arc,
};
use tabula_core::{
    Connection, Context, Driver, Error, Executor, QueryResult, Result, RowLabeled, RowsAffected,
    Statement,
    stream::{self, Stream},
    truncate_long,
};

/// A connection to a SQLite database.
///
/// Statements run synchronously when the stream returned by [`Executor::run`]
/// is created, so the connection works from any executor, including a
/// blocking `block_on`.
pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
}

impl SqliteConnection {
    fn error_message(&self) -> String {
        unsafe { error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string() }
    }

    /// Prepare and step each statement of the batch in turn.
    fn execute_batch(
        &mut self,
        statement: &Statement,
        results: &mut Vec<Result<QueryResult>>,
    ) -> Result<()> {
        let sql = statement.sql().as_bytes();
        let mut offset = 0;
        while offset < sql.len() {
            let rest = &sql[offset..];
            let mut prepared = CBox::new(ptr::null_mut(), |p| unsafe {
                sqlite3_finalize(p);
            });
            let mut tail: *const c_char = ptr::null();
            let rc = unsafe {
                sqlite3_prepare_v2(
                    *self.connection,
                    rest.as_ptr() as *const c_char,
                    rest.len() as c_int,
                    &mut *prepared,
                    &mut tail,
                )
            };
            if rc != SQLITE_OK {
                return Err(Error::msg(self.error_message()));
            }
            let consumed = if tail.is_null() {
                rest.len()
            } else {
                tail as usize - rest.as_ptr() as usize
            };
            if consumed == 0 {
                break;
            }
            offset += consumed;
            if prepared.is_null() {
                // Only whitespace or comments
                continue;
            }
            bind_parameters(*prepared, statement.params())?;
            self.step(*prepared, results)?;
        }
        Ok(())
    }

    fn step(
        &mut self,
        statement: *mut sqlite3_stmt,
        results: &mut Vec<Result<QueryResult>>,
    ) -> Result<()> {
        unsafe {
            let count = sqlite3_column_count(statement);
            let labels = (0..count)
                .map(|i| extract_name(statement, i))
                .collect::<Result<Arc<[_]>>>()?;
            loop {
                match sqlite3_step(statement) {
                    SQLITE_BUSY => continue,
                    SQLITE_DONE => break,
                    SQLITE_ROW => results.push(Ok(QueryResult::Row(RowLabeled {
                        labels: labels.clone(),
                        values: (0..count)
                            .map(|i| extract_value(statement, i))
                            .collect::<Result<_>>()?,
                    }))),
                    _ => return Err(Error::msg(self.error_message())),
                }
            }
            if sqlite3_stmt_readonly(statement) == 0 {
                results.push(Ok(QueryResult::Affected(RowsAffected {
                    rows_affected: sqlite3_changes64(*self.connection) as u64,
                    last_affected_id: Some(sqlite3_last_insert_rowid(*self.connection)),
                })));
            }
        }
        Ok(())
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &SqliteDriver {}
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        let mut results = Vec::new();
        if let Err(error) = self.execute_batch(&statement, &mut results) {
            let error = error.context(format!(
                "While executing the query:\n{}",
                truncate_long!(statement.sql())
            ));
            log::error!("{:#}", error);
            results.push(Err(error));
        }
        stream::iter(results)
    }
}

impl Connection for SqliteConnection {
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let path = if location.starts_with(":memory:") {
            location.to_string()
        } else {
            format!("file:{}", location)
        };
        let path = CString::new(path).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            )
        };
        let result = Self { connection };
        if rc != SQLITE_OK {
            let error = Error::msg(result.error_message()).context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(result)
    }
}
