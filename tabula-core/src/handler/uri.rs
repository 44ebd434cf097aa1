use super::{TypeHandler, handler_try_from_nullable, handler_try_from_value, stored_text, stored_value};
use crate::{AsValue, MappingError, Result, Value};
use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::LazyLock,
};
use url::{ParseError, Url};

static RELATIVE_BASE: LazyLock<Option<Url>> =
    LazyLock::new(|| Url::parse("relative://localhost/").ok());

/// Which references a [`UriHandler`] accepts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriKind {
    #[default]
    Absolute,
    Relative,
    RelativeOrAbsolute,
}

/// An absolute url or a relative reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Uri {
    Absolute(Url),
    Relative(String),
}

impl Uri {
    /// Parse `text` accepting only the references allowed by `kind`.
    pub fn parse(text: &str, kind: UriKind) -> Result<Self, MappingError> {
        let error = |reason: &dyn Display| MappingError::invalid_literal::<Uri>(text, reason);
        match (Url::parse(text), kind) {
            (Ok(url), UriKind::Absolute | UriKind::RelativeOrAbsolute) => Ok(Uri::Absolute(url)),
            (Ok(..), UriKind::Relative) => Err(error(&"expected a relative reference")),
            (Err(ParseError::RelativeUrlWithoutBase), UriKind::Relative | UriKind::RelativeOrAbsolute) => {
                let Some(base) = RELATIVE_BASE.as_ref() else {
                    return Err(error(&"relative references are not supported"));
                };
                base.join(text).map_err(|e| error(&e))?;
                Ok(Uri::Relative(text.to_string()))
            }
            (Err(e), _) => Err(error(&e)),
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Uri::Absolute(..))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Uri::Absolute(url) => url.as_str(),
            Uri::Relative(path) => path,
        }
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Uri {
    type Err = MappingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s, UriKind::RelativeOrAbsolute)
    }
}

impl From<Url> for Uri {
    fn from(value: Url) -> Self {
        Uri::Absolute(value)
    }
}

/// Stores a [`Uri`] as its serialized form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UriHandler {
    pub kind: UriKind,
}

impl UriHandler {
    pub const fn new(kind: UriKind) -> Self {
        Self { kind }
    }
}

impl TypeHandler for UriHandler {
    type Target = Uri;

    fn to_storage(&self, value: Option<&Uri>) -> Value {
        match value {
            Some(v) => stored_value(v),
            None => Value::Null,
        }
    }

    fn from_storage(&self, value: &Value) -> Result<Option<Uri>, MappingError> {
        stored_text(value)
            .map(|text| Uri::parse(text, self.kind))
            .transpose()
    }
}

impl AsValue for Uri {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        UriHandler::default().to_storage(Some(&self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        handler_try_from_value(&UriHandler::new(UriKind::RelativeOrAbsolute), value)
    }
    fn try_from_nullable(value: Value) -> Result<Option<Self>> {
        handler_try_from_nullable(&UriHandler::new(UriKind::RelativeOrAbsolute), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> Value {
        Value::Varchar(Some(v.into()))
    }

    #[test]
    fn to_storage() {
        let handler = UriHandler::default();
        let uri = Uri::parse("https://belin.io", UriKind::Absolute).unwrap();
        assert_eq!(handler.to_storage(Some(&uri)), text("https://belin.io/"));
        assert_eq!(handler.to_storage(None), Value::Null);
        let uri = Uri::parse("docs/index.html", UriKind::Relative).unwrap();
        assert_eq!(handler.to_storage(Some(&uri)), text("docs/index.html"));
    }

    #[test]
    fn from_storage() {
        let handler = UriHandler::default();
        assert_eq!(
            handler.from_storage(&text("https://belin.io")),
            Ok(Some(Uri::Absolute(Url::parse("https://belin.io/").unwrap())))
        );
        assert_eq!(handler.from_storage(&Value::Null), Ok(None));
        assert_eq!(handler.from_storage(&text("")), Ok(None));
        assert_eq!(handler.from_storage(&Value::Int64(Some(123))), Ok(None));
        assert!(handler.from_storage(&text("docs/index.html")).is_err());
    }

    #[test]
    fn kinds() {
        assert!(Uri::parse("https://belin.io", UriKind::Relative).is_err());
        assert_eq!(
            Uri::parse("../up", UriKind::Relative),
            Ok(Uri::Relative("../up".into()))
        );
        assert!(
            Uri::parse("https://belin.io", UriKind::RelativeOrAbsolute)
                .unwrap()
                .is_absolute()
        );
        assert!(
            !Uri::parse("/root", UriKind::RelativeOrAbsolute)
                .unwrap()
                .is_absolute()
        );
        assert!(Uri::parse("http://[::1", UriKind::RelativeOrAbsolute).is_err());
    }
}
