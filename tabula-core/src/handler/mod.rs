//! Bidirectional converters between domain scalars and the text stored in the database.
mod mail_address;
mod string_enum;
mod uri;

pub use mail_address::*;
pub use string_enum::*;
pub use uri::*;

use crate::{Error, MappingError, Result, Value, truncate_long};
use std::any;

/// Converts a domain scalar to and from its stored form.
///
/// A missing value is stored as NULL, a present one as its canonical string.
/// Reading back yields `None` for anything that is not a non empty string, and
/// fails only when a string is present but cannot be parsed.
pub trait TypeHandler {
    type Target;

    fn to_storage(&self, value: Option<&Self::Target>) -> Value;

    fn from_storage(&self, value: &Value) -> Result<Option<Self::Target>, MappingError>;
}

/// The text carried by `value` when it is a non empty string.
pub(crate) fn stored_text(value: &Value) -> Option<&str> {
    match value {
        Value::Varchar(Some(v)) if !v.is_empty() => Some(v),
        _ => None,
    }
}

pub(crate) fn stored_value(text: impl ToString) -> Value {
    Value::Varchar(Some(text.to_string()))
}

/// `AsValue::try_from_value` through a handler, a value the handler maps to `None` is an error.
pub fn handler_try_from_value<H: TypeHandler>(handler: &H, value: Value) -> Result<H::Target> {
    match handler.from_storage(&value)? {
        Some(v) => Ok(v),
        None => Err(Error::msg(format!(
            "Cannot convert {} to {}",
            truncate_long!(value.to_string()),
            any::type_name::<H::Target>(),
        ))),
    }
}

/// `AsValue::try_from_nullable` through a handler.
pub fn handler_try_from_nullable<H: TypeHandler>(
    handler: &H,
    value: Value,
) -> Result<Option<H::Target>> {
    Ok(handler.from_storage(&value)?)
}
