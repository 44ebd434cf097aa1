use std::{collections::VecDeque, sync::LazyLock};
use tabula_core::{
    AsValue, Connection, Dialect, Driver, Entity, EntityDescriptor, EntityOperations,
    EntityOperationsBlocking, Error, Executor, FieldDef, MappingError, QueryResult, Result,
    RowLabeled, RowsAffected, Statement, Value,
    stream::{self, Stream},
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Product {
    id: i32,
    name: String,
    price: f64,
}

static PRODUCT: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::new(
        "Product",
        Some("Products"),
        false,
        [
            FieldDef::new("id").column("ProductId").key(),
            FieldDef::new("name"),
            FieldDef::new("price"),
        ],
    )
});

impl Entity for Product {
    fn descriptor() -> &'static EntityDescriptor {
        &PRODUCT
    }
    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.as_value()),
            "name" => Some(self.name.clone().as_value()),
            "price" => Some(self.price.as_value()),
            _ => None,
        }
    }
    fn set_field_value(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "id" => self.id = AsValue::try_from_value(value)?,
            "name" => self.name = AsValue::try_from_value(value)?,
            "price" => self.price = AsValue::try_from_value(value)?,
            _ => return Err(Error::msg(format!("Unknown field {}", field))),
        }
        Ok(())
    }
    fn from_row(row: RowLabeled) -> Result<Self> {
        let mut result = Product::default();
        for (label, value) in row.labels.iter().zip(row.values.into_vec()) {
            match label.as_str() {
                "ProductId" => result.set_field_value("id", value)?,
                "name" | "price" => result.set_field_value(label, value)?,
                _ => {}
            }
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Note {
    text: String,
}

static NOTE: LazyLock<EntityDescriptor> =
    LazyLock::new(|| EntityDescriptor::new("Note", None, false, [FieldDef::new("text")]));

impl Entity for Note {
    fn descriptor() -> &'static EntityDescriptor {
        &NOTE
    }
    fn field_value(&self, field: &str) -> Option<Value> {
        (field == "text").then(|| self.text.clone().as_value())
    }
    fn set_field_value(&mut self, _field: &str, value: Value) -> Result<()> {
        self.text = AsValue::try_from_value(value)?;
        Ok(())
    }
    fn from_row(row: RowLabeled) -> Result<Self> {
        let mut result = Note::default();
        if let Some(value) = row.get_column("text") {
            result.text = AsValue::try_from_value(value.clone())?;
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Route {
    from: i32,
    to: i32,
    label: String,
}

static ROUTE: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::new(
        "Route",
        None,
        false,
        [
            FieldDef::new("from").key(),
            FieldDef::new("to").key(),
            FieldDef::new("label"),
        ],
    )
});

impl Entity for Route {
    fn descriptor() -> &'static EntityDescriptor {
        &ROUTE
    }
    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "from" => Some(self.from.as_value()),
            "to" => Some(self.to.as_value()),
            "label" => Some(self.label.clone().as_value()),
            _ => None,
        }
    }
    fn set_field_value(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "from" => self.from = AsValue::try_from_value(value)?,
            "to" => self.to = AsValue::try_from_value(value)?,
            "label" => self.label = AsValue::try_from_value(value)?,
            _ => return Err(Error::msg(format!("Unknown field {}", field))),
        }
        Ok(())
    }
    fn from_row(_row: RowLabeled) -> Result<Self> {
        Ok(Route::default())
    }
}

#[derive(Default)]
struct MySqlDriver;
impl Driver for MySqlDriver {
    type Connection = Recorder<Self>;
    const NAME: &'static str = "mysql";
}

#[derive(Default)]
struct UnknownDriver;
impl Driver for UnknownDriver {
    type Connection = Recorder<Self>;
    const NAME: &'static str = "someday-db";
}

/// Records the statements it receives and answers with canned results.
#[derive(Default)]
struct Recorder<D> {
    driver: D,
    statements: Vec<Statement>,
    responses: VecDeque<Vec<QueryResult>>,
}

impl<D> Recorder<D> {
    fn respond(mut self, results: impl IntoIterator<Item = QueryResult>) -> Self {
        self.responses.push_back(results.into_iter().collect());
        self
    }
    fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(Statement::sql).collect()
    }
}

impl<D: Driver + Default> Executor for Recorder<D> {
    type Driver = D;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn run(&mut self, statement: Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.statements.push(statement);
        let results = self.responses.pop_front().unwrap_or_default();
        stream::iter(results.into_iter().map(Ok))
    }
}

impl<D: Driver<Connection = Self> + Default> Connection for Recorder<D> {
    async fn connect(_url: &str) -> Result<Self> {
        Ok(Self::default())
    }
}

fn row(labels: &[&str], values: impl IntoIterator<Item = Value>) -> QueryResult {
    QueryResult::Row(RowLabeled::new(
        labels.iter().map(|v| v.to_string()).collect(),
        values.into_iter().collect(),
    ))
}

fn affected(rows_affected: u64) -> QueryResult {
    QueryResult::Affected(RowsAffected {
        rows_affected,
        last_affected_id: None,
    })
}

#[tokio::test]
async fn insert_reads_back_generated_key() {
    let mut connection = Recorder::<MySqlDriver>::connect("mysql://localhost")
        .await
        .unwrap()
        .respond([
            affected(1),
            row(&["LAST_INSERT_ID()"], [Value::UInt64(Some(42))]),
        ]);
    let mut product = Product {
        id: 0,
        name: "Lamp".into(),
        price: 19.5,
    };
    let result = connection.insert(&mut product).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(product.id, 42);
    assert_eq!(
        connection.sql(),
        ["INSERT INTO Products (name, price) VALUES (@name, @price); SELECT LAST_INSERT_ID()"]
    );
    let params = connection.statements[0].params();
    assert_eq!(params.names().collect::<Vec<_>>(), ["name", "price"]);
    assert_eq!(params.get("price"), Some(&Value::Float64(Some(19.5))));
}

#[tokio::test]
async fn unknown_driver_uses_default_dialect() {
    let mut connection = Recorder::<UnknownDriver>::default().respond([
        affected(1),
        row(&[""], [Value::Float64(Some(7.0))]),
    ]);
    assert_eq!(connection.driver().dialect(), Dialect::Default);
    let mut product = Product::default();
    connection.insert(&mut product).await.unwrap();
    assert_eq!(product.id, 7);
    assert!(connection.sql()[0].ends_with("; SELECT SCOPE_IDENTITY()"));
    connection.truncate::<Product>().await.unwrap();
    assert_eq!(connection.sql()[1], "TRUNCATE TABLE Products");
}

#[tokio::test]
async fn insert_key_out_of_range() {
    let mut connection = Recorder::<MySqlDriver>::default()
        .respond([affected(1), row(&["Id"], [Value::Int64(Some(i64::MAX))])])
        .respond([affected(1)]);
    let mut product = Product::default();
    assert!(connection.insert(&mut product).await.is_err());
    assert_eq!(product.id, 0);
    // No id returned at all
    assert!(connection.insert(&mut product).await.is_err());
}

#[tokio::test]
async fn insert_without_key_is_plain() {
    let mut connection = Recorder::<MySqlDriver>::default().respond([affected(1)]);
    let mut note = Note {
        text: "hello".into(),
    };
    connection.insert(&mut note).await.unwrap();
    assert_eq!(connection.sql(), ["INSERT INTO Note (text) VALUES (@text)"]);
}

#[tokio::test]
async fn count_and_fetch() {
    let mut connection = Recorder::<MySqlDriver>::default()
        .respond([row(&["COUNT(*)"], [Value::Int64(Some(5))])])
        .respond([row(
            &["ProductId", "name", "price"],
            [
                Value::Int64(Some(3)),
                Value::Varchar(Some("Desk".into())),
                Value::Float64(Some(120.0)),
            ],
        )])
        .respond([]);
    assert_eq!(connection.count::<Product>().await.unwrap(), 5);
    let product = connection.fetch::<Product>(3, &[]).await.unwrap();
    assert_eq!(
        product,
        Some(Product {
            id: 3,
            name: "Desk".into(),
            price: 120.0,
        })
    );
    let product = connection
        .fetch::<Product>(4, &["ProductId", "name"])
        .await
        .unwrap();
    assert_eq!(product, None);
    assert_eq!(
        connection.sql(),
        [
            "SELECT COUNT(*) FROM Products",
            "SELECT * FROM Products WHERE ProductId = @id",
            "SELECT ProductId, name FROM Products WHERE ProductId = @id",
        ]
    );
    assert_eq!(
        connection.statements[1].params().get("id"),
        Some(&Value::Int32(Some(3)))
    );
}

#[tokio::test]
async fn fetch_all() {
    let mut connection = Recorder::<MySqlDriver>::default().respond([
        row(&["ProductId", "name"], [Value::Int64(Some(1)), Value::Varchar(Some("A".into()))]),
        affected(0),
        row(&["ProductId", "name"], [Value::Int64(Some(2)), Value::Varchar(Some("B".into()))]),
    ]);
    let products = connection.fetch_all::<Product>(&[]).await.unwrap();
    assert_eq!(
        products.iter().map(|p| p.id).collect::<Vec<_>>(),
        [1, 2]
    );
    assert_eq!(connection.sql(), ["SELECT * FROM Products"]);
}

#[tokio::test]
async fn update_and_delete() {
    let mut connection = Recorder::<MySqlDriver>::default()
        .respond([affected(1)])
        .respond([affected(1)])
        .respond([affected(1)])
        .respond([affected(3)]);
    let product = Product {
        id: 9,
        name: "Chair".into(),
        price: 45.0,
    };
    assert_eq!(
        connection.update(&product, &[]).await.unwrap().rows_affected,
        1
    );
    connection.delete(&product).await.unwrap();
    connection.delete_by_id::<Product>(10).await.unwrap();
    assert_eq!(
        connection.delete_all::<Product>().await.unwrap().rows_affected,
        3
    );
    assert_eq!(
        connection.sql(),
        [
            "UPDATE Products SET name = @name, price = @price WHERE ProductId = @id",
            "DELETE FROM Products WHERE ProductId = @id",
            "DELETE FROM Products WHERE ProductId = @id",
            "DELETE FROM Products",
        ]
    );
    assert_eq!(
        connection.statements[0].params().names().collect::<Vec<_>>(),
        ["name", "price", "id"]
    );
    assert_eq!(
        connection.statements[1].params().get("id"),
        Some(&Value::Int32(Some(9)))
    );
}

#[tokio::test]
async fn mapping_errors_never_reach_the_database() {
    let mut connection = Recorder::<MySqlDriver>::default();
    let note = Note::default();
    let error = connection.fetch::<Note>(1, &[]).await.unwrap_err();
    assert_eq!(
        error.downcast_ref::<MappingError>(),
        Some(&MappingError::NoKeyResolvable { entity: "Note" })
    );
    assert!(connection.update(&note, &[]).await.is_err());
    assert!(connection.delete(&note).await.is_err());
    let product = Product::default();
    let error = connection
        .update(&product, &["name", "color"])
        .await
        .unwrap_err();
    assert_eq!(
        error.downcast_ref::<MappingError>(),
        Some(&MappingError::UnknownColumn {
            entity: "Product",
            column: "color".into(),
        })
    );
    assert!(connection.statements.is_empty());
}

#[test]
fn blocking() {
    let mut connection = Recorder::<MySqlDriver>::default()
        .respond([row(&["COUNT(*)"], [Value::Int64(Some(2))])])
        .respond([affected(0)]);
    assert_eq!(connection.count_blocking::<Product>().unwrap(), 2);
    connection.truncate_blocking::<Product>().unwrap();
    assert_eq!(
        connection.sql(),
        ["SELECT COUNT(*) FROM Products", "TRUNCATE TABLE Products"]
    );
}

#[tokio::test]
async fn insert_with_two_keys_fails() {
    let mut connection = Recorder::<MySqlDriver>::default().respond([affected(1)]);
    let mut route = Route {
        from: 1,
        to: 2,
        label: "Coastal".into(),
    };
    let error = connection.insert(&mut route).await.unwrap_err();
    assert_eq!(
        error.downcast_ref::<MappingError>(),
        Some(&MappingError::AmbiguousKey {
            entity: "Route",
            fields: "from, to".into(),
        })
    );
    assert!(connection.statements.is_empty());
    // Operations without a key condition are unaffected
    connection.delete_all::<Route>().await.unwrap();
    assert_eq!(connection.sql(), ["DELETE FROM Route"]);
}
