use crate::{AttributedEntity, silent_logs};
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{EntityOperations, Executor, MappingError};
use tokio::sync::Mutex;

pub async fn attributed<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .execute("DROP TABLE IF EXISTS Entities".into())
        .await
        .expect("Failed to drop Entities table");
    executor
        .execute(
            indoc! {"
                CREATE TABLE Entities (
                    Id INTEGER PRIMARY KEY AUTOINCREMENT,
                    Name TEXT NOT NULL
                )
            "}
            .into(),
        )
        .await
        .expect("Failed to create Entities table");
    assert_eq!(
        executor
            .count::<AttributedEntity>()
            .await
            .expect("Failed to count the entities"),
        0
    );

    // Insert
    let mut alice = AttributedEntity {
        EntityName: "Alice".into(),
        IsAdmin: true,
        ..Default::default()
    };
    let mut bob = AttributedEntity {
        EntityName: "Bob".into(),
        ..Default::default()
    };
    let mut carol = AttributedEntity {
        EntityName: "Carol".into(),
        ..Default::default()
    };
    let affected = executor
        .insert(&mut alice)
        .await
        .expect("Failed to insert Alice");
    assert_eq!(affected.rows_affected, 1);
    executor
        .insert(&mut bob)
        .await
        .expect("Failed to insert Bob");
    executor
        .insert(&mut carol)
        .await
        .expect("Failed to insert Carol");
    assert!(alice.EntityId > 0);
    assert_eq!(bob.EntityId, alice.EntityId + 1);
    assert_eq!(carol.EntityId, bob.EntityId + 1);
    assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 3);

    // Fetch
    let entity = executor
        .fetch::<AttributedEntity>(alice.EntityId, &[])
        .await
        .expect("Failed to fetch Alice")
        .expect("Alice should exist");
    assert_eq!(entity.EntityId, alice.EntityId);
    assert_eq!(entity.EntityName, "Alice");
    assert!(!entity.IsAdmin, "Skipped fields are not persisted");
    let missing = executor
        .fetch::<AttributedEntity>(9999, &[])
        .await
        .expect("Failed to fetch a missing entity");
    assert_eq!(missing, None);

    // Fetch all
    let mut entities = executor
        .fetch_all::<AttributedEntity>(&[])
        .await
        .expect("Failed to fetch all the entities");
    entities.sort_by_key(|e| e.EntityId);
    assert_eq!(
        entities
            .iter()
            .map(|e| e.EntityName.as_str())
            .collect::<Vec<_>>(),
        ["Alice", "Bob", "Carol"]
    );
    let entities = executor
        .fetch_all::<AttributedEntity>(&["Id AS Alias", "Name"])
        .await
        .expect("Failed to fetch all the entities with explicit columns");
    assert_eq!(entities.len(), 3);
    assert!(entities.iter().all(|e| e.EntityId == 0));

    // Update
    alice.EntityName = "Alicia".into();
    let affected = executor
        .update(&alice, &[])
        .await
        .expect("Failed to update Alice");
    assert_eq!(affected.rows_affected, 1);
    bob.EntityName = "Robert".into();
    executor
        .update(&bob, &["Name"])
        .await
        .expect("Failed to update the name of Bob");
    let entity = executor
        .fetch::<AttributedEntity>(alice.EntityId, &["Name"])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entity.EntityName, "Alicia");
    let entity = executor
        .fetch::<AttributedEntity>(bob.EntityId, &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entity, bob);
    silent_logs! {
        let error = executor
            .update(&bob, &["EntityName"])
            .await
            .expect_err("Update of an unknown column should fail");
        assert!(matches!(
            error.downcast_ref::<MappingError>(),
            Some(MappingError::UnknownColumn { .. })
        ));
    }

    // Delete
    let affected = executor
        .delete(&bob)
        .await
        .expect("Failed to delete Bob");
    assert_eq!(affected.rows_affected, 1);
    assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 2);
    let affected = executor
        .delete_by_id::<AttributedEntity>(alice.EntityId)
        .await
        .expect("Failed to delete Alice");
    assert_eq!(affected.rows_affected, 1);
    let affected = executor
        .delete_by_id::<AttributedEntity>(alice.EntityId)
        .await
        .expect("Failed to delete Alice again");
    assert_eq!(affected.rows_affected, 0);
    assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 1);
    let affected = executor
        .delete_all::<AttributedEntity>()
        .await
        .expect("Failed to delete all the entities");
    assert_eq!(affected.rows_affected, 1);
    assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 0);

    // Truncate
    #[cfg(not(feature = "disable-truncate"))]
    {
        for name in ["Dave", "Erin"] {
            let mut entity = AttributedEntity {
                EntityName: name.into(),
                ..Default::default()
            };
            executor.insert(&mut entity).await.unwrap();
        }
        assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 2);
        executor
            .truncate::<AttributedEntity>()
            .await
            .expect("Failed to truncate Entities");
        assert_eq!(executor.count::<AttributedEntity>().await.unwrap(), 0);
    }
}
