#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Mutex};
    use tabula_core::{Connection, Dialect, Driver, Executor, Parameters, QueryResult, Statement, Value, stream::TryStreamExt};
    use tabula_sqlite::SqliteConnection;
    use tabula_tests::{init_logs, silent_logs};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .await
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .await
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
                    .await
                    .is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                SqliteConnection::connect("duckdb://some_value")
                    .await
                    .is_err()
            );
        };
    }

    #[tokio::test]
    async fn dialect() {
        let connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        assert_eq!(connection.driver().dialect(), Dialect::Sqlite);
    }

    #[tokio::test]
    async fn batch() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        connection
            .execute("CREATE TABLE Numbers (Id INTEGER PRIMARY KEY AUTOINCREMENT, Amount REAL)".into())
            .await
            .expect("Failed to create the table");
        let results = connection
            .run(Statement::new(
                "INSERT INTO Numbers (Amount) VALUES (@Value); -- comment\n SELECT last_insert_rowid() AS \"Id\", @Value AS Value;",
                Parameters::new().bind("Value", 1.5),
            ))
            .try_collect::<Vec<_>>()
            .await
            .expect("The batch should run");
        assert_eq!(results.len(), 2);
        let QueryResult::Affected(affected) = &results[0] else {
            panic!("Expected the insert result first");
        };
        assert_eq!(affected.rows_affected, 1);
        assert_eq!(affected.last_affected_id, Some(1));
        let QueryResult::Row(row) = &results[1] else {
            panic!("Expected a row");
        };
        assert_eq!(row.get_column("Id"), Some(&Value::Int64(Some(1))));
        assert_eq!(row.get_column("Value"), Some(&Value::Float64(Some(1.5))));
    }

    #[tokio::test]
    async fn parameters() {
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        silent_logs! {
            assert!(
                connection
                    .execute(Statement::new("SELECT @missing", Parameters::new()))
                    .await
                    .is_err(),
                "A parameter without value should fail"
            );
            assert!(
                connection
                    .execute(Statement::new("SELECT ?", Parameters::new().bind("x", 1)))
                    .await
                    .is_err(),
                "Positional parameters are not supported"
            );
            assert!(
                connection.execute("SELEC 1".into()).await.is_err(),
                "Syntax errors are reported"
            );
        }
        let rows = connection
            .fetch_rows(Statement::new(
                "SELECT @text AS T, @blob AS B, @none AS N, @flag AS F",
                Parameters::new()
                    .bind("text", "hello".to_string())
                    .bind("blob", vec![1u8, 2, 3])
                    .bind("none", Option::<i32>::None)
                    .bind("flag", true),
            ))
            .try_collect::<Vec<_>>()
            .await
            .expect("The query should run");
        let values = rows[0].values();
        assert_eq!(values[0], Value::Varchar(Some("hello".into())));
        assert_eq!(values[1], Value::Blob(Some([1u8, 2, 3].into())));
        assert_eq!(values[2], Value::Null);
        assert_eq!(values[3], Value::Int64(Some(1)));
    }
}
