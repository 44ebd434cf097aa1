use crate::{LogLine, silent_logs};
use std::sync::LazyLock;
use tabula::{EntityOperations, Executor, MappingError};
use tokio::sync::Mutex;

pub async fn keyless<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    executor
        .execute("DROP TABLE IF EXISTS Logs".into())
        .await
        .expect("Failed to drop Logs table");
    executor
        .execute("CREATE TABLE Logs (Id INTEGER NOT NULL, Message TEXT NOT NULL)".into())
        .await
        .expect("Failed to create Logs table");

    // Operations not needing a key work
    let mut line = LogLine {
        Id: 1,
        Message: "started".into(),
    };
    executor
        .insert(&mut line)
        .await
        .expect("Failed to insert a log line");
    assert_eq!(executor.count::<LogLine>().await.unwrap(), 1);
    assert_eq!(
        executor.fetch_all::<LogLine>(&[]).await.unwrap(),
        [line.clone()]
    );

    // The others fail before reaching the database
    silent_logs! {
        let error = executor
            .fetch::<LogLine>(1, &[])
            .await
            .expect_err("Fetch requires a key");
        assert_eq!(
            error.downcast_ref::<MappingError>(),
            Some(&MappingError::NoKeyResolvable { entity: "LogLine" })
        );
        assert!(executor.update(&line, &[]).await.is_err());
        assert!(executor.delete(&line).await.is_err());
        assert!(executor.delete_by_id::<LogLine>(1).await.is_err());
    }
    assert_eq!(executor.count::<LogLine>().await.unwrap(), 1);

    executor
        .delete_all::<LogLine>()
        .await
        .expect("Failed to delete the log lines");
    assert_eq!(executor.count::<LogLine>().await.unwrap(), 0);
}
