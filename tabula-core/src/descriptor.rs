use crate::{MappingError, builder::StatementCache};
use std::collections::HashMap;

/// Name of the field used as key when none is marked explicitly.
pub const IMPLICIT_KEY: &str = "Id";

/// Mapping annotations of a single declared field, as written on the struct.
///
/// This is the input of the resolver: `#[derive(Entity)]` emits one per field,
/// in declaration order. It can also be written by hand:
/// ```rust
/// use tabula_core::FieldDef;
/// let field = FieldDef::new("EntityName").column("Name");
/// assert_eq!(field.column, Some("Name"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Identifier of the field in code.
    pub name: &'static str,
    /// Explicit column name (`#[tabula(name = "...")]`).
    pub column: Option<&'static str>,
    /// Explicit key marker (`#[tabula(key)]`).
    pub key: bool,
    /// Explicit generation strategy (`#[tabula(generated)]`, `#[tabula(generated = false)]`).
    pub generated: Option<bool>,
    /// Not persisted (`#[tabula(skip)]`).
    pub skip: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            key: false,
            generated: None,
            skip: false,
        }
    }
    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }
    pub const fn generated(mut self, generated: bool) -> Self {
        self.generated = Some(generated);
        self
    }
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A mapped field after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Identifier of the field in code, also the name of its bound parameter.
    pub name: &'static str,
    /// Column the field is stored in.
    pub column: &'static str,
    /// This is the key of the entity (explicit or implicit).
    pub is_key: bool,
    /// The store assigns this value on insert.
    pub is_generated: bool,
}

/// Resolved mapping of a record type: table, ordered field catalogue and key.
///
/// Built once per type and kept for the process lifetime, the derive stores it
/// in a `LazyLock` static.
#[derive(Debug)]
pub struct EntityDescriptor {
    entity: &'static str,
    table: &'static str,
    fields: Box<[FieldDescriptor]>,
    key: Result<usize, MappingError>,
    by_column: HashMap<&'static str, usize>,
    pub(crate) statements: StatementCache,
}

impl EntityDescriptor {
    /// Resolve the mapping of type `entity`.
    ///
    /// `table` is the explicit table name, `keyless` disables the implicit `Id`
    /// key. Skipped fields are dropped, the remaining ones keep their order.
    pub fn new(
        entity: &'static str,
        table: Option<&'static str>,
        keyless: bool,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Self {
        let defs: Vec<FieldDef> = fields.into_iter().filter(|f| !f.skip).collect();
        let key = resolve_key(entity, &defs, keyless);
        let mut fields: Box<[FieldDescriptor]> = defs
            .iter()
            .map(|def| FieldDescriptor {
                name: def.name,
                column: def.column.unwrap_or(def.name),
                is_key: false,
                is_generated: def.generated.unwrap_or(def.key),
            })
            .collect();
        if let Ok(i) = key {
            fields[i].is_key = true;
        }
        let mut by_column = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            by_column.entry(field.column).or_insert(i);
        }
        if let Err(error) = &key {
            log::trace!("{}", error);
        }
        Self {
            entity,
            table: table.unwrap_or(entity),
            fields,
            key,
            by_column,
            statements: Default::default(),
        }
    }

    /// Name of the record type.
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    /// Explicit table name, otherwise the bare type name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Mapped fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The key field, or why there isn't one.
    pub fn key(&self) -> Result<&FieldDescriptor, MappingError> {
        match &self.key {
            Ok(i) => Ok(&self.fields[*i]),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field stored in `column` (exact match).
    pub fn field_for_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.by_column.get(column).map(|i| &self.fields[*i])
    }
}

fn resolve_key(
    entity: &'static str,
    fields: &[FieldDef],
    keyless: bool,
) -> Result<usize, MappingError> {
    let explicit: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.key.then_some(i))
        .collect();
    match explicit.as_slice() {
        [i] => Ok(*i),
        [] => {
            if keyless {
                return Err(MappingError::NoKeyResolvable { entity });
            }
            fields
                .iter()
                .position(|f| f.name == IMPLICIT_KEY)
                .ok_or(MappingError::NoKeyResolvable { entity })
        }
        _ => Err(MappingError::AmbiguousKey {
            entity,
            fields: explicit
                .iter()
                .map(|i| fields[*i].name)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
