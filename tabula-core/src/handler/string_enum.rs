use super::{TypeHandler, stored_text, stored_value};
use crate::{MappingError, Result, Value};
use std::marker::PhantomData;

/// Fieldless enum stored by variant name.
///
/// Implemented by `#[derive(StringEnum)]`, variants can be renamed with
/// `#[tabula(name = "...")]`.
pub trait StringEnum: Sized + 'static {
    /// Stored names, in variant order.
    const NAMES: &'static [&'static str];

    fn name(&self) -> &'static str;

    fn from_ordinal(ordinal: usize) -> Option<Self>;

    /// Variant stored as `name`, case folding is Unicode aware when `ignore_case` is set.
    fn from_name(name: &str, ignore_case: bool) -> Option<Self> {
        let position = if ignore_case {
            let name = name.to_lowercase();
            Self::NAMES.iter().position(|n| n.to_lowercase() == name)
        } else {
            Self::NAMES.iter().position(|n| *n == name)
        };
        position.and_then(Self::from_ordinal)
    }
}

/// Stores a [`StringEnum`] as its variant name.
#[derive(Debug, Clone, Copy)]
pub struct StringEnumHandler<E> {
    ignore_case: bool,
    _enum: PhantomData<fn() -> E>,
}

impl<E: StringEnum> StringEnumHandler<E> {
    pub const fn new(ignore_case: bool) -> Self {
        Self {
            ignore_case,
            _enum: PhantomData,
        }
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

impl<E: StringEnum> Default for StringEnumHandler<E> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<E: StringEnum> TypeHandler for StringEnumHandler<E> {
    type Target = E;

    fn to_storage(&self, value: Option<&E>) -> Value {
        match value {
            Some(v) => stored_value(v.name()),
            None => Value::Null,
        }
    }

    fn from_storage(&self, value: &Value) -> Result<Option<E>, MappingError> {
        let Some(text) = stored_text(value) else {
            return Ok(None);
        };
        E::from_name(text, self.ignore_case)
            .map(Some)
            .ok_or_else(|| {
                MappingError::invalid_literal::<E>(
                    text,
                    format!("expected one of {}", E::NAMES.join(", ")),
                )
            })
    }
}

/// `AsValue::as_value` for a [`StringEnum`], used by the derive.
pub fn string_enum_as_value<E: StringEnum>(value: &E) -> Value {
    StringEnumHandler::<E>::default().to_storage(Some(value))
}

impl<E: StringEnum> StringEnumHandler<E> {
    /// Decode with this handler's case sensitivity instead of the default one.
    pub fn decode(&self, value: Value) -> Result<Option<E>> {
        super::handler_try_from_nullable(self, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Tint {
        Red,
        Green,
        DeepBlue,
        Amber,
    }

    impl StringEnum for Tint {
        const NAMES: &'static [&'static str] = &["Red", "Green", "deep-blue", "Ámbar"];
        fn name(&self) -> &'static str {
            Self::NAMES[match self {
                Tint::Red => 0,
                Tint::Green => 1,
                Tint::DeepBlue => 2,
                Tint::Amber => 3,
            }]
        }
        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Tint::Red),
                1 => Some(Tint::Green),
                2 => Some(Tint::DeepBlue),
                3 => Some(Tint::Amber),
                _ => None,
            }
        }
    }

    fn text(v: &str) -> Value {
        Value::Varchar(Some(v.into()))
    }

    #[test]
    fn to_storage() {
        let handler = StringEnumHandler::<Tint>::default();
        assert_eq!(handler.to_storage(Some(&Tint::Green)), text("Green"));
        assert_eq!(handler.to_storage(Some(&Tint::DeepBlue)), text("deep-blue"));
        assert_eq!(handler.to_storage(None), Value::Null);
    }

    #[test]
    fn from_storage() {
        let handler = StringEnumHandler::<Tint>::default();
        assert_eq!(handler.from_storage(&text("Red")), Ok(Some(Tint::Red)));
        assert_eq!(
            handler.from_storage(&text("deep-blue")),
            Ok(Some(Tint::DeepBlue))
        );
        assert_eq!(handler.from_storage(&Value::Null), Ok(None));
        assert_eq!(handler.from_storage(&text("")), Ok(None));
        assert_eq!(handler.from_storage(&Value::Int32(Some(1))), Ok(None));
        assert!(matches!(
            handler.from_storage(&text("red")),
            Err(MappingError::InvalidScalarLiteral { .. })
        ));
    }

    #[test]
    fn ignore_case() {
        let handler = StringEnumHandler::<Tint>::new(true);
        assert!(handler.ignore_case());
        assert_eq!(handler.from_storage(&text("red")), Ok(Some(Tint::Red)));
        assert_eq!(
            handler.from_storage(&text("DEEP-BLUE")),
            Ok(Some(Tint::DeepBlue))
        );
        assert!(handler.from_storage(&text("Purple")).is_err());
        assert_eq!(handler.from_storage(&text("ámbar")), Ok(Some(Tint::Amber)));
        assert_eq!(handler.from_storage(&text("ÁMBAR")), Ok(Some(Tint::Amber)));
        let handler = StringEnumHandler::<Tint>::default();
        assert!(handler.from_storage(&text("ámbar")).is_err());
    }
}
