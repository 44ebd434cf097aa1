use super::{TypeHandler, handler_try_from_nullable, handler_try_from_value, stored_text, stored_value};
use crate::{AsValue, MappingError, Result, Value};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// A mail address with an optional display name.
///
/// Accepts `user@host`, `Name <user@host>` and `"Name" <user@host>`.
/// ```rust
/// use tabula_core::MailAddress;
/// let address: MailAddress = "Cédric Belin <cedric@belin.io>".parse().unwrap();
/// assert_eq!(address.address(), "cedric@belin.io");
/// assert_eq!(address.to_string(), r#""Cédric Belin" <cedric@belin.io>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailAddress {
    address: String,
    display_name: Option<String>,
}

impl MailAddress {
    pub fn new(address: &str) -> Result<Self, MappingError> {
        validate_address(address)?;
        Ok(Self {
            address: address.to_string(),
            display_name: None,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        let name: String = display_name.into();
        self.display_name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn user(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map(|(user, _)| user)
            .unwrap_or_default()
    }

    pub fn host(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or_default()
    }
}

fn validate_address(address: &str) -> Result<(), MappingError> {
    let error = |reason: &str| MappingError::invalid_literal::<MailAddress>(address, reason);
    let Some((user, host)) = address.rsplit_once('@') else {
        return Err(error("missing `@`"));
    };
    if user.is_empty() || host.is_empty() {
        return Err(error("empty user or host"));
    }
    if host.contains('@')
        || address
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | ';'))
    {
        return Err(error("invalid character"));
    }
    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(error("malformed host"));
    }
    Ok(())
}

impl FromStr for MailAddress {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(open) = s.rfind('<') else {
            return MailAddress::new(s);
        };
        let Some(inner) = s[open + 1..].strip_suffix('>') else {
            return Err(MappingError::invalid_literal::<MailAddress>(
                s,
                "unterminated `<`",
            ));
        };
        let name = s[..open].trim();
        let name = name
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(name);
        Ok(MailAddress::new(inner.trim())?.with_display_name(name))
    }
}

impl Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "\"{}\" <{}>", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Stores a [`MailAddress`] in its canonical string form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MailAddressHandler;

impl TypeHandler for MailAddressHandler {
    type Target = MailAddress;

    fn to_storage(&self, value: Option<&MailAddress>) -> Value {
        match value {
            Some(v) => stored_value(v),
            None => Value::Null,
        }
    }

    fn from_storage(&self, value: &Value) -> Result<Option<MailAddress>, MappingError> {
        stored_text(value).map(str::parse).transpose()
    }
}

impl AsValue for MailAddress {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        MailAddressHandler.to_storage(Some(&self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        handler_try_from_value(&MailAddressHandler, value)
    }
    fn try_from_nullable(value: Value) -> Result<Option<Self>> {
        handler_try_from_nullable(&MailAddressHandler, value)
    }
}
