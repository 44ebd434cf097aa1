use crate::{EntityDescriptor, Result, RowLabeled, Value};

/// A record type mapped onto a table.
///
/// Usually implemented with `#[derive(Entity)]`, which resolves the mapping at
/// compile time and stores the [`EntityDescriptor`] in a static.
pub trait Entity: Send + Sized {
    /// Resolved mapping of the type, built once.
    fn descriptor() -> &'static EntityDescriptor;

    /// Current value of the field named `field`, `None` when there is no such field.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Assign a value to the field named `field`, converting it to the declared type.
    fn set_field_value(&mut self, field: &str, value: Value) -> Result<()>;

    /// Build an entity from a row, columns are matched by name.
    fn from_row(row: RowLabeled) -> Result<Self>;
}
