use crate::{Contact, Plan, silent_logs};
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{
    EntityOperations, Executor, MailAddress, MappingError, Parameters, Statement, Uri, UriKind,
    Value, stream::TryStreamExt,
};
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

pub async fn handlers<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .execute("DROP TABLE IF EXISTS Contacts".into())
        .await
        .expect("Failed to drop Contacts table");
    executor
        .execute(
            indoc! {"
                CREATE TABLE Contacts (
                    Id INTEGER PRIMARY KEY AUTOINCREMENT,
                    Subscription TEXT NOT NULL,
                    Website TEXT,
                    Email TEXT,
                    Token TEXT NOT NULL
                )
            "}
            .into(),
        )
        .await
        .expect("Failed to create Contacts table");

    let mut full = Contact {
        Subscription: Plan::Enterprise,
        Website: Some(Uri::Absolute(
            Url::parse("https://belin.io").expect("The url should be valid"),
        )),
        Email: Some(
            "Cédric Belin <cedric@belin.io>"
                .parse()
                .expect("The address should be valid"),
        ),
        Token: Uuid::new_v4(),
        ..Default::default()
    };
    let mut empty = Contact {
        Website: Some(Uri::parse("/contact", UriKind::Relative).unwrap()),
        ..Default::default()
    };
    executor.insert(&mut full).await.expect("Failed to insert");
    executor.insert(&mut empty).await.expect("Failed to insert");
    assert_ne!(full.Id, empty.Id);

    // Values come back through their handlers
    let contact = executor
        .fetch::<Contact>(full.Id, &[])
        .await
        .expect("Failed to fetch the contact")
        .expect("The contact should exist");
    assert_eq!(contact, full);
    let contact = executor
        .fetch::<Contact>(empty.Id, &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact, empty);
    assert_eq!(contact.Subscription, Plan::Free);
    assert_eq!(contact.Email, None);

    // Stored form
    let rows = executor
        .fetch_rows(Statement::new(
            "SELECT Subscription, Website, Email FROM Contacts WHERE Id = @Id",
            Parameters::new().bind("Id", full.Id),
        ))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to read the stored values");
    let text = |v: &str| Some(Value::Varchar(Some(v.into())));
    assert_eq!(rows[0].get_column("Subscription").cloned(), text("enterprise"));
    assert_eq!(rows[0].get_column("Website").cloned(), text("https://belin.io/"));
    assert_eq!(
        rows[0].get_column("Email").cloned(),
        text("\"Cédric Belin\" <cedric@belin.io>")
    );

    // Empty strings read back as missing values
    executor
        .execute(Statement::new(
            "UPDATE Contacts SET Website = '', Email = '' WHERE Id = @Id",
            Parameters::new().bind("Id", full.Id),
        ))
        .await
        .expect("Failed to blank the contact");
    let contact = executor
        .fetch::<Contact>(full.Id, &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.Website, None);
    assert_eq!(contact.Email, None);

    // Unparsable values are reported
    executor
        .execute(Statement::new(
            "UPDATE Contacts SET Subscription = 'Gold' WHERE Id = @Id",
            Parameters::new().bind("Id", full.Id),
        ))
        .await
        .expect("Failed to corrupt the contact");
    silent_logs! {
        let error = executor
            .fetch::<Contact>(full.Id, &[])
            .await
            .expect_err("An unknown variant name should not decode");
        assert!(matches!(
            error.downcast_ref::<MappingError>(),
            Some(MappingError::InvalidScalarLiteral { .. })
        ));
    }
    executor
        .delete_all::<Contact>()
        .await
        .expect("Failed to clear the contacts");
}
