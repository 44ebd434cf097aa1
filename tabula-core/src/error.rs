use thiserror::Error;

/// Failures raised while resolving an entity mapping, building a statement or
/// decoding a stored scalar.
///
/// Every variant except [`MappingError::InvalidScalarLiteral`] is raised before
/// any statement reaches the database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// No field is marked as key and no field is named `Id`.
    #[error("Entity `{entity}` has no resolvable key, mark a field with `#[tabula(key)]` or name it `Id`")]
    NoKeyResolvable { entity: &'static str },

    /// More than one field is marked as key.
    #[error("Entity `{entity}` declares more than one key field ({fields}), only a single key is supported")]
    AmbiguousKey { entity: &'static str, fields: String },

    /// An explicit column does not belong to any mapped field.
    #[error("Column `{column}` does not correspond to any mapped field of entity `{entity}`")]
    UnknownColumn { entity: &'static str, column: String },

    /// The update would not set any column.
    #[error("Entity `{entity}` has no column to update besides its key")]
    EmptyUpdate { entity: &'static str },

    /// A stored value could not be parsed into its target type.
    #[error("Cannot parse `{literal}` as {target}: {reason}")]
    InvalidScalarLiteral {
        target: &'static str,
        literal: String,
        reason: String,
    },
}

impl MappingError {
    pub(crate) fn invalid_literal<T>(literal: &str, reason: impl ToString) -> Self {
        MappingError::InvalidScalarLiteral {
            target: std::any::type_name::<T>(),
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }
}
