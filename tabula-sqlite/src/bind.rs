use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use std::ffi::{CStr, c_char, c_int, c_void};
use tabula_core::{Error, Parameters, Result, Value, truncate_long};

/// Bind every named parameter of `statement` from `params`.
///
/// SQLite reports names with their prefix (`@id`), the bindings are stored without it.
pub(crate) fn bind_parameters(statement: *mut sqlite3_stmt, params: &Parameters) -> Result<()> {
    unsafe {
        let count = sqlite3_bind_parameter_count(statement);
        for index in 1..=count {
            let name = sqlite3_bind_parameter_name(statement, index);
            if name.is_null() {
                return Err(Error::msg(format!(
                    "Parameter {} is positional, only named parameters like `@name` are supported",
                    index
                )));
            }
            let name = CStr::from_ptr(name).to_str()?;
            let Some(value) = name.get(1..).and_then(|key| params.get(key)) else {
                return Err(Error::msg(format!(
                    "No value was provided for parameter `{}`",
                    name
                )));
            };
            let rc = bind_value(statement, index, value)?;
            if rc != SQLITE_OK {
                let db = sqlite3_db_handle(statement);
                let query = sqlite3_sql(statement);
                return Err(
                    Error::msg(error_message_from_ptr(&sqlite3_errmsg(db)).to_string()).context(
                        format!(
                            "Cannot bind parameter `{}` to query:\n{}",
                            name,
                            truncate_long!(CStr::from_ptr(query).to_string_lossy())
                        ),
                    ),
                );
            }
        }
        Ok(())
    }
}

unsafe fn bind_text(statement: *mut sqlite3_stmt, index: c_int, v: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            v.as_ptr() as *const c_char,
            v.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

unsafe fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<c_int> {
    unsafe {
        Ok(match *value {
            _ if value.is_null() => sqlite3_bind_null(statement, index),
            Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, v),
            Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, v as c_int),
            Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, v as sqlite3_int64),
            Value::UInt64(Some(v)) => {
                let Ok(v) = sqlite3_int64::try_from(v) else {
                    return Err(Error::msg(format!(
                        "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                        v
                    )));
                };
                sqlite3_bind_int64(statement, index, v)
            }
            Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, v as f64),
            Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, v),
            Value::Varchar(Some(ref v)) => bind_text(statement, index, v),
            Value::Blob(Some(ref v)) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Uuid(Some(v)) => bind_text(statement, index, &v.to_string()),
            _ => {
                return Err(Error::msg(format!(
                    "Cannot use a {:?} as a query parameter",
                    value
                )));
            }
        })
    }
}
