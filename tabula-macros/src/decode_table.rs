use crate::decode_column::{ColumnMetadata, decode_column};
use quote::ToTokens;
use std::collections::HashSet;
use syn::{Fields, ItemStruct, LitStr, ext::IdentExt, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    /// Type name, without the `r#` prefix.
    pub(crate) entity: String,
    /// Table override.
    pub(crate) name: Option<String>,
    pub(crate) keyless: bool,
    pub(crate) columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Fields that are persisted.
    pub(crate) fn mapped(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| !c.skip)
    }
}

pub fn decode_table(item: ItemStruct) -> TableMetadata {
    if !item.generics.params.is_empty() {
        panic!(
            "Entity `{}` cannot have generic parameters",
            item.ident
        );
    }
    let Fields::Named(fields) = &item.fields else {
        panic!(
            "Entity `{}` must be a struct with named fields",
            item.ident
        );
    };
    let columns: Vec<_> = fields.named.iter().map(decode_column).collect();
    let mut name = None;
    let mut keyless = false;
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("tabula") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `tabula`, use it like: `#[tabula(attribute = value, ..)]`",);
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[tabula(name = \"MyTable\")]`"
                        );
                    };
                    name = Some(value.value());
                } else if arg.path.is_ident("keyless") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `keyless`, use it like: `#[tabula(keyless)]`");
                    };
                    keyless = true;
                } else {
                    panic!("Unknown attribute `{}` inside tabula macro", arg.path.to_token_stream().to_string());
                }
                Ok(())
            });
        }
    }
    let mut seen = HashSet::new();
    for column in columns.iter().filter(|c| !c.skip) {
        if !seen.insert(column.column()) {
            panic!(
                "Entity `{}` maps more than one field to column `{}`",
                item.ident,
                column.column()
            );
        }
    }
    TableMetadata {
        entity: item.ident.unraw().to_string(),
        item,
        name,
        keyless,
        columns,
    }
}
