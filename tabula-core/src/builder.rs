//! Renders the CRUD statements of an entity.
//!
//! Every function is pure: it reads the [`EntityDescriptor`] of the type and,
//! when values must be bound, the entity itself. Table and column names are
//! written verbatim, placeholders are `@` followed by the field name (or `id`
//! for statements addressing a row by key).
//!
//! The default forms (no explicit column list) only depend on the type, so
//! their text is rendered once and memoized inside the descriptor.
use crate::{
    AsValue, Dialect, Entity, EntityDescriptor, FieldDescriptor, MappingError, Parameters,
    Statement, separated_by,
};
use std::{borrow::Cow, fmt::Write, ptr, sync::OnceLock};

/// Name of the parameter holding the key in fetch and delete statements.
pub const ID_PARAMETER: &str = "id";

#[derive(Default, Debug)]
pub(crate) struct StatementCache {
    count: OnceLock<String>,
    fetch_all: OnceLock<String>,
    fetch: OnceLock<String>,
    insert: OnceLock<String>,
    update: OnceLock<String>,
    delete: OnceLock<String>,
    delete_all: OnceLock<String>,
}

fn write_projection(out: &mut String, columns: &[&str]) {
    if columns.is_empty() {
        out.push('*');
    } else {
        separated_by(out, columns, |out, v| out.push_str(v), ", ");
    }
}

fn write_key_condition(out: &mut String, key: &FieldDescriptor, parameter: &str) {
    let _ = write!(out, " WHERE {} = @{}", key.column, parameter);
}

/// `SELECT COUNT(*) FROM <table>`
pub fn count(descriptor: &EntityDescriptor) -> String {
    descriptor
        .statements
        .count
        .get_or_init(|| format!("SELECT COUNT(*) FROM {}", descriptor.table()))
        .clone()
}

fn render_fetch_all(descriptor: &EntityDescriptor, columns: &[&str]) -> String {
    let mut out = String::with_capacity(64);
    out.push_str("SELECT ");
    write_projection(&mut out, columns);
    let _ = write!(out, " FROM {}", descriptor.table());
    out
}

/// `SELECT <columns or *> FROM <table>`, columns are passed through as they are.
pub fn fetch_all(descriptor: &EntityDescriptor, columns: &[&str]) -> String {
    if columns.is_empty() {
        return descriptor
            .statements
            .fetch_all
            .get_or_init(|| render_fetch_all(descriptor, &[]))
            .clone();
    }
    render_fetch_all(descriptor, columns)
}

/// `SELECT <columns or *> FROM <table> WHERE <key> = @id`
pub fn fetch(
    descriptor: &EntityDescriptor,
    id: impl AsValue,
    columns: &[&str],
) -> Result<Statement, MappingError> {
    let key = descriptor.key()?;
    let render = || {
        let mut out = render_fetch_all(descriptor, columns);
        write_key_condition(&mut out, key, ID_PARAMETER);
        out
    };
    let sql = if columns.is_empty() {
        descriptor.statements.fetch.get_or_init(render).clone()
    } else {
        render()
    };
    Ok(Statement::new(
        sql,
        Parameters::new().bind(ID_PARAMETER, id),
    ))
}

fn read_field<E: Entity>(entity: &E, field: &FieldDescriptor) -> crate::Value {
    entity.field_value(field.name).unwrap_or_else(|| {
        log::warn!(
            "Entity `{}` did not provide a value for field `{}`, binding NULL",
            E::descriptor().entity_name(),
            field.name
        );
        crate::Value::Null
    })
}

/// `INSERT INTO <table> (<columns>) VALUES (<params>)` over the fields not generated by the database.
///
/// A type without key inserts normally, one marking more than one key fails.
pub fn insert<E: Entity>(entity: &E) -> Result<Statement, MappingError> {
    let descriptor = E::descriptor();
    if let Err(error @ MappingError::AmbiguousKey { .. }) = descriptor.key() {
        return Err(error);
    }
    let fields: Vec<&FieldDescriptor> = descriptor
        .fields()
        .iter()
        .filter(|f| !f.is_generated)
        .collect();
    let sql = descriptor
        .statements
        .insert
        .get_or_init(|| {
            let mut out = String::with_capacity(128);
            let _ = write!(out, "INSERT INTO {}", descriptor.table());
            if fields.is_empty() {
                out.push_str(" DEFAULT VALUES");
                return out;
            }
            out.push_str(" (");
            separated_by(&mut out, &fields, |out, f| out.push_str(f.column), ", ");
            out.push_str(") VALUES (");
            separated_by(
                &mut out,
                &fields,
                |out, f| {
                    out.push('@');
                    out.push_str(f.name);
                },
                ", ",
            );
            out.push(')');
            out
        })
        .clone();
    let params = fields
        .iter()
        .map(|f| (f.name, read_field(entity, f)))
        .collect();
    Ok(Statement::new(sql, params))
}

/// The insert statement followed by the dialect's query returning the generated key.
pub fn insert_returning_id<E: Entity>(
    entity: &E,
    dialect: Dialect,
) -> Result<Statement, MappingError> {
    let (mut sql, params) = insert(entity)?.into_parts();
    sql.push_str("; ");
    sql.push_str(&dialect.last_insert_id_statement());
    Ok(Statement::new(sql, params))
}

/// `UPDATE <table> SET c = @f, ... WHERE <key> = @<key field>`
///
/// Without explicit columns every non key field is updated, otherwise each
/// column must match the column name of a mapped field. A column listed more
/// than once is set once.
pub fn update<E: Entity>(entity: &E, columns: &[&str]) -> Result<Statement, MappingError> {
    let descriptor = E::descriptor();
    let key = descriptor.key()?;
    let fields: Vec<&FieldDescriptor> = if columns.is_empty() {
        descriptor.fields().iter().filter(|f| !f.is_key).collect()
    } else {
        let mut fields: Vec<&FieldDescriptor> = Vec::with_capacity(columns.len());
        for column in columns {
            let field = descriptor.field_for_column(column).ok_or_else(|| {
                MappingError::UnknownColumn {
                    entity: descriptor.entity_name(),
                    column: column.to_string(),
                }
            })?;
            if !fields.iter().any(|f| ptr::eq(*f, field)) {
                fields.push(field);
            }
        }
        fields
    };
    if fields.is_empty() {
        return Err(MappingError::EmptyUpdate {
            entity: descriptor.entity_name(),
        });
    }
    let render = || {
        let mut out = String::with_capacity(128);
        let _ = write!(out, "UPDATE {} SET ", descriptor.table());
        separated_by(
            &mut out,
            &fields,
            |out, f| {
                let _ = write!(out, "{} = @{}", f.column, f.name);
            },
            ", ",
        );
        write_key_condition(&mut out, key, key.name);
        out
    };
    let sql = if columns.is_empty() {
        descriptor.statements.update.get_or_init(render).clone()
    } else {
        render()
    };
    let mut params = Parameters::with_capacity(fields.len() + 1);
    for f in fields.iter().chain([&key]) {
        params.set(Cow::Borrowed(f.name), read_field(entity, f));
    }
    Ok(Statement::new(sql, params))
}

/// `DELETE FROM <table> WHERE <key> = @id`
pub fn delete(descriptor: &EntityDescriptor, id: impl AsValue) -> Result<Statement, MappingError> {
    let key = descriptor.key()?;
    let sql = descriptor
        .statements
        .delete
        .get_or_init(|| {
            let mut out = format!("DELETE FROM {}", descriptor.table());
            write_key_condition(&mut out, key, ID_PARAMETER);
            out
        })
        .clone();
    Ok(Statement::new(
        sql,
        Parameters::new().bind(ID_PARAMETER, id),
    ))
}

/// Delete statement for the row identified by the current key of `entity`.
pub fn delete_entity<E: Entity>(entity: &E) -> Result<Statement, MappingError> {
    let descriptor = E::descriptor();
    let key = descriptor.key()?;
    delete(descriptor, read_field(entity, key))
}

/// `DELETE FROM <table>`
pub fn delete_all(descriptor: &EntityDescriptor) -> String {
    descriptor
        .statements
        .delete_all
        .get_or_init(|| format!("DELETE FROM {}", descriptor.table()))
        .clone()
}

/// The dialect's statement emptying the table.
pub fn truncate(descriptor: &EntityDescriptor, dialect: Dialect) -> String {
    dialect.truncate_statement(descriptor.table())
}
