use tabula::{Entity, MailAddress, StringEnum, Uri};
use uuid::Uuid;

/// Explicitly mapped: custom table, custom columns, generated key, a skipped field.
#[derive(Entity, Clone, Debug, Default, PartialEq)]
#[tabula(name = "Entities")]
#[allow(non_snake_case)]
pub struct AttributedEntity {
    #[tabula(key, name = "Id")]
    pub EntityId: i32,
    #[tabula(name = "Name")]
    pub EntityName: String,
    #[tabula(skip)]
    pub IsAdmin: bool,
}

/// No annotation at all, `Id` is the implicit key and it is not generated.
#[derive(Entity, Clone, Debug, Default, PartialEq)]
#[allow(non_snake_case)]
pub struct PlainEntity {
    pub Id: i64,
    pub Name: String,
    pub IsMapped: bool,
}

#[derive(StringEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Plan {
    #[default]
    Free,
    Pro,
    #[tabula(name = "enterprise")]
    Enterprise,
}

#[derive(Entity, Clone, Debug, Default, PartialEq)]
#[tabula(name = "Contacts")]
#[allow(non_snake_case)]
pub struct Contact {
    #[tabula(key)]
    pub Id: i64,
    pub Subscription: Plan,
    pub Website: Option<Uri>,
    pub Email: Option<MailAddress>,
    pub Token: Uuid,
}

/// Has a field named `Id` but opts out of the implicit key.
#[derive(Entity, Clone, Debug, Default, PartialEq)]
#[tabula(name = "Logs", keyless)]
#[allow(non_snake_case)]
pub struct LogLine {
    pub Id: i64,
    pub Message: String,
}
