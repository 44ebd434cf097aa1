use crate::{AsValue, Value, truncate_long};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// Ordered named bindings of a statement, names are written without the `@` prefix.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Parameters(Vec<(Cow<'static, str>, Value)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Add a binding, replacing the value of a binding with the same name.
    pub fn bind(mut self, name: impl Into<Cow<'static, str>>, value: impl AsValue) -> Self {
        self.set(name.into(), value.as_value());
        self
    }

    pub(crate) fn set(&mut self, name: Cow<'static, str>, value: Value) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_ref(), v))
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<Cow<'static, str>>> FromIterator<(N, Value)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (N, Value)>>(iter: T) -> Self {
        let mut result = Parameters::new();
        for (name, value) in iter {
            result.set(name.into(), value);
        }
        result
    }
}

/// SQL text paired with its named bindings, ready to be handed to an [`Executor`](crate::Executor).
///
/// The text may hold more than one statement separated by `;`, the bindings are
/// shared by all of them.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Parameters,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Parameters) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn into_parts(self) -> (String, Parameters) {
        (self.sql, self.params)
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement::new(value, Parameters::new())
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::new(value, Parameters::new())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            f.write_str(" [")?;
            for (i, (name, value)) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "@{} = {}", name, truncate_long!(value.to_string()))?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
