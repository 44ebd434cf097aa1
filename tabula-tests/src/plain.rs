use crate::PlainEntity;
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{EntityOperations, Executor, Parameters, Statement, Value, stream::TryStreamExt};
use tokio::sync::Mutex;

pub async fn plain<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .execute("DROP TABLE IF EXISTS PlainEntity".into())
        .await
        .expect("Failed to drop PlainEntity table");
    executor
        .execute(
            indoc! {"
                CREATE TABLE PlainEntity (
                    Id INTEGER PRIMARY KEY,
                    Name TEXT NOT NULL,
                    IsMapped INTEGER NOT NULL
                )
            "}
            .into(),
        )
        .await
        .expect("Failed to create PlainEntity table");

    // The implicit key is provided by the caller
    let mut first = PlainEntity {
        Id: 10,
        Name: "First".into(),
        IsMapped: true,
    };
    let mut second = PlainEntity {
        Id: 20,
        Name: "Second".into(),
        IsMapped: false,
    };
    executor
        .insert(&mut first)
        .await
        .expect("Failed to insert the first entity");
    executor
        .insert(&mut second)
        .await
        .expect("Failed to insert the second entity");
    assert_eq!(first.Id, 10);
    assert_eq!(second.Id, 20);
    assert_eq!(executor.count::<PlainEntity>().await.unwrap(), 2);

    let entity = executor
        .fetch::<PlainEntity>(10, &[])
        .await
        .expect("Failed to fetch the first entity")
        .expect("The first entity should exist");
    assert_eq!(entity, first);

    // Columns not projected keep their default value
    let entity = executor
        .fetch::<PlainEntity>(20i64, &["Id", "Name"])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entity.Name, "Second");
    assert!(!entity.IsMapped);

    // Update every column but the key
    second.Name = "Second (renamed)".into();
    second.IsMapped = true;
    executor
        .update(&second, &[])
        .await
        .expect("Failed to update the second entity");
    let rows = executor
        .fetch_rows(Statement::new(
            "SELECT Name, IsMapped FROM PlainEntity WHERE Id = @Id",
            Parameters::new().bind("Id", 20),
        ))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to read the updated row");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get_column("Name"),
        Some(&Value::Varchar(Some("Second (renamed)".into())))
    );
    assert_eq!(rows[0].get_column("IsMapped"), Some(&Value::Int64(Some(1))));

    // Update a subset of the columns
    first.Name = "Ignored".into();
    first.IsMapped = false;
    executor
        .update(&first, &["IsMapped"])
        .await
        .expect("Failed to update the first entity");
    let entity = executor.fetch::<PlainEntity>(10, &[]).await.unwrap().unwrap();
    assert_eq!(entity.Name, "First");
    assert!(!entity.IsMapped);

    executor
        .delete(&first)
        .await
        .expect("Failed to delete the first entity");
    assert_eq!(
        executor
            .fetch_all::<PlainEntity>(&[])
            .await
            .expect("Failed to fetch all"),
        [second]
    );
}
