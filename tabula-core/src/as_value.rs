use crate::{Error, Result, Value, truncate_long};
use std::any;
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`]
/// used for bound parameters and decoded rows.
///
/// # Conversion contract
/// - `as_value` produces the canonical variant for the type (`i32` becomes
///   `Value::Int32`, `String` becomes `Value::Varchar`, ...).
/// - `try_from_value` accepts the canonical variant and, for numbers, any other
///   integer width as long as the value fits. This is what lets a generated key
///   returned as a 64 bit integer land in an `i32` field.
/// - `try_from_nullable` decides what a NULL (or, for text backed types, a
///   value that cannot carry data) means. `Option<T>` delegates to it.
///
/// # Examples
/// ```rust
/// use tabula_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Like `try_from_value` but mapping NULL to `None`.
    fn try_from_nullable(value: Value) -> Result<Option<Self>>
    where
        Self: Sized,
    {
        if value.is_null() {
            return Ok(None);
        }
        Self::try_from_value(value).map(Some)
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {} to {}",
        truncate_long!(value.to_string()),
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Float64(Some(v)) if v.fract() == 0.0 => {
                        <$source>::try_from(v as i128).map_err(|_| {
                            Error::msg(format!(
                                "Value {v}: f64 is out of range for {}",
                                any::type_name::<Self>(),
                            ))
                        })
                    }
                    ref v => match v.as_i128() {
                        Some(integer) => <$source>::try_from(integer).map_err(|_| {
                            Error::msg(format!(
                                "Value {integer} is out of range for {}",
                                any::type_name::<Self>(),
                            ))
                        }),
                        None => Err(conversion_error::<Self>(&value)),
                    },
                }
            }
        }
    };
}
impl_as_value!(i8, Value::Int8);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(u16, Value::UInt16);
impl_as_value!(u32, Value::UInt32);
impl_as_value!(u64, Value::UInt64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            ref v => match v.as_i128() {
                Some(integer) => Ok(integer != 0),
                None => Err(conversion_error::<Self>(&value)),
            },
        }
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path, $other:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $other(Some(v)) => Ok(v as _),
                    ref v => match v.as_i128() {
                        Some(integer) => Ok(integer as _),
                        None => Err(conversion_error::<Self>(&value)),
                    },
                }
            }
        }
    };
}
impl_as_value!(f32, Value::Float32, Value::Float64);
impl_as_value!(f64, Value::Float64, Value::Float32);

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        <Box<[u8]> as AsValue>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => Uuid::parse_str(v)
                .map_err(|e| Error::new(e).context(format!("Cannot parse `{v}` as a Uuid"))),
            Value::Blob(Some(ref v)) => Uuid::from_slice(v).map_err(Error::new),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_nullable(value)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
    fn try_from_nullable(value: Value) -> Result<Option<Self>> {
        T::try_from_nullable(value).map(|v| v.map(Box::new))
    }
}
