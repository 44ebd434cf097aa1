use std::fmt::Write;

/// SQL flavour of a backend.
///
/// A closed set: each variant decides how identifiers are quoted, how the id of
/// the last inserted row is read back and how a table is emptied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Fallback for unrecognized drivers, same rules as SQL Server.
    #[default]
    Default,
    MySql,
    Sqlite,
    SqlServer,
}

impl Dialect {
    /// Pick the dialect from a driver name, unknown names fall back to [`Dialect::Default`].
    pub fn from_driver_name(name: &str) -> Self {
        let dialect = match name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlserver" | "mssql" => Dialect::SqlServer,
            _ => Dialect::Default,
        };
        if dialect == Dialect::Default {
            log::debug!("Driver `{}` has no dedicated dialect, using the default one", name);
        }
        dialect
    }

    /// Quote `name` as an identifier, doubling the closing delimiter when it appears inside.
    pub fn escape_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_identifier_quoted(&mut out, name);
        out
    }

    pub fn write_identifier_quoted(&self, out: &mut String, name: &str) {
        let (open, close) = match self {
            Dialect::Default | Dialect::SqlServer => ('[', ']'),
            Dialect::MySql => ('`', '`'),
            Dialect::Sqlite => ('"', '"'),
        };
        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
    }

    /// Statement returning the identifier generated by the last insert on the same connection.
    pub fn last_insert_id_statement(&self) -> String {
        match self {
            Dialect::Default | Dialect::SqlServer => "SELECT SCOPE_IDENTITY()".into(),
            Dialect::MySql => "SELECT LAST_INSERT_ID()".into(),
            Dialect::Sqlite => {
                let mut out = String::from("SELECT last_insert_rowid() AS ");
                self.write_identifier_quoted(&mut out, "Id");
                out
            }
        }
    }

    /// Statement removing every row of `table`.
    pub fn truncate_statement(&self, table: &str) -> String {
        let mut out = String::with_capacity(16 + table.len());
        let _ = match self {
            Dialect::Default | Dialect::SqlServer | Dialect::MySql => {
                write!(out, "TRUNCATE TABLE {}", table)
            }
            // Sqlite has no TRUNCATE, an unconditional DELETE is optimized the same way
            Dialect::Sqlite => write!(out, "DELETE FROM {}", table),
        };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Dialect;

    #[test]
    fn escape_identifier() {
        assert_eq!(Dialect::MySql.escape_identifier("Foo"), "`Foo`");
        assert_eq!(Dialect::Sqlite.escape_identifier("Foo"), "\"Foo\"");
        assert_eq!(Dialect::Default.escape_identifier("Foo"), "[Foo]");
        assert_eq!(Dialect::SqlServer.escape_identifier("Foo"), "[Foo]");
        assert_eq!(Dialect::Sqlite.escape_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::SqlServer.escape_identifier("a]b"), "[a]]b]");
        assert_eq!(Dialect::MySql.escape_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn last_insert_id() {
        assert_eq!(
            Dialect::Default.last_insert_id_statement(),
            "SELECT SCOPE_IDENTITY()"
        );
        assert_eq!(
            Dialect::MySql.last_insert_id_statement(),
            "SELECT LAST_INSERT_ID()"
        );
        assert_eq!(
            Dialect::Sqlite.last_insert_id_statement(),
            r#"SELECT last_insert_rowid() AS "Id""#
        );
    }

    #[test]
    fn truncate() {
        assert_eq!(
            Dialect::SqlServer.truncate_statement("Entities"),
            "TRUNCATE TABLE Entities"
        );
        assert_eq!(
            Dialect::Sqlite.truncate_statement("Entities"),
            "DELETE FROM Entities"
        );
    }

    #[test]
    fn from_driver_name() {
        assert_eq!(Dialect::from_driver_name("sqlite"), Dialect::Sqlite);
        assert_eq!(Dialect::from_driver_name("MySQL"), Dialect::MySql);
        assert_eq!(Dialect::from_driver_name("mssql"), Dialect::SqlServer);
        assert_eq!(Dialect::from_driver_name("duckdb"), Dialect::Default);
        assert_eq!(Dialect::from_driver_name(""), Dialect::Default);
    }
}
